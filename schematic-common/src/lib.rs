//! # Smart Schematic Common Library
//!
//! Shared code for the Smart Schematic services:
//! - Database schema and models
//! - Subscription tier limits
//! - Password hashing and session tokens
//! - Configuration loading
//! - AI service wire types
//! - Canvas viewport state (pan, zoom, hit-testing)

pub mod ai;
pub mod auth;
pub mod config;
#[cfg(feature = "sqlx")]
pub mod db;
pub mod error;
pub mod models;
pub mod tier;
pub mod viewport;

pub use error::{Error, Result};
pub use tier::Tier;

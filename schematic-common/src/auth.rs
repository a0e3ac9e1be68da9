//! Password hashing and session tokens
//!
//! Passwords are stored as SHA-256(salt || password) with a per-user random salt.
//! Session tokens are opaque random hex strings looked up in the `sessions` table.
//!
//! # Pure Functions
//!
//! No HTTP framework or database dependencies; the web API owns those.

use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use sha2::{Digest, Sha256};

/// Minimum accepted password length
pub const MIN_PASSWORD_LEN: usize = 6;

/// Session lifetime
pub const SESSION_TTL_DAYS: i64 = 30;

/// Random 32-byte value as 64 hex characters
fn random_hex() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Generate a fresh password salt
pub fn generate_salt() -> String {
    random_hex()
}

/// Generate a fresh bearer token
pub fn generate_session_token() -> String {
    random_hex()
}

/// Hash a password with its salt
///
/// # Examples
///
/// ```
/// use schematic_common::auth::hash_password;
///
/// let hash = hash_password("hunter22", "abc");
/// assert_eq!(hash.len(), 64);
/// assert_eq!(hash, hash_password("hunter22", "abc"));
/// ```
pub fn hash_password(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// Check a password against a stored salt and hash
pub fn verify_password(password: &str, salt: &str, expected_hash: &str) -> bool {
    let calculated = hash_password(password, salt);
    if calculated.len() != expected_hash.len() {
        return false;
    }
    // Compare every byte so timing does not reveal the matching prefix
    calculated
        .bytes()
        .zip(expected_hash.bytes())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

/// Expiry time for a session created at `now`
pub fn session_expiry(now: DateTime<Utc>) -> DateTime<Utc> {
    now + Duration::days(SESSION_TTL_DAYS)
}

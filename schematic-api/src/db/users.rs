//! Accounts and login sessions

use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

use schematic_common::auth::{
    generate_salt, generate_session_token, hash_password, session_expiry, verify_password,
};
use schematic_common::models::User;
use schematic_common::{Result, Tier};

use super::{format_timestamp, new_id, parse_timestamp};

/// Issued login session
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub user_id: String,
    pub expires_at: DateTime<Utc>,
}

/// Emails are matched case-insensitively
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn user_from_row(row: &SqliteRow) -> Result<User> {
    let tier: String = row.get("tier");
    let created_at: String = row.get("created_at");

    Ok(User {
        id: row.get("id"),
        email: row.get("email"),
        name: row.get("name"),
        tier: Tier::from_db(Some(&tier)),
        created_at: parse_timestamp(&created_at)?,
    })
}

/// Create a FREE-tier account
///
/// Returns `None` when the email is already registered.
pub async fn create_user(
    pool: &SqlitePool,
    email: &str,
    name: &str,
    password: &str,
) -> Result<Option<User>> {
    let id = new_id();
    let email = normalize_email(email);
    let salt = generate_salt();
    let hash = hash_password(password, &salt);
    let now = Utc::now();
    let now_text = format_timestamp(now);

    let result = sqlx::query(
        r#"
        INSERT INTO users (id, email, name, password_hash, password_salt, tier, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(&email)
    .bind(name)
    .bind(&hash)
    .bind(&salt)
    .bind(Tier::Free.as_str())
    .bind(&now_text)
    .bind(&now_text)
    .execute(pool)
    .await;

    match result {
        Ok(_) => Ok(Some(User {
            id,
            email,
            name: name.to_string(),
            tier: Tier::Free,
            created_at: now,
        })),
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Look up an account by email and check its password
///
/// Unknown email and wrong password are indistinguishable to the caller.
pub async fn authenticate(pool: &SqlitePool, email: &str, password: &str) -> Result<Option<User>> {
    let row = sqlx::query(
        r#"
        SELECT id, email, name, tier, created_at, password_hash, password_salt
        FROM users
        WHERE email = ?
        "#,
    )
    .bind(normalize_email(email))
    .fetch_optional(pool)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let hash: String = row.get("password_hash");
    let salt: String = row.get("password_salt");
    if !verify_password(password, &salt, &hash) {
        return Ok(None);
    }

    user_from_row(&row).map(Some)
}

pub async fn get_user(pool: &SqlitePool, user_id: &str) -> Result<Option<User>> {
    let row = sqlx::query("SELECT id, email, name, tier, created_at FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(user_from_row).transpose()
}

/// Tier of an account; missing accounts count as FREE
pub async fn user_tier(pool: &SqlitePool, user_id: &str) -> Result<Tier> {
    let tier: Option<String> = sqlx::query_scalar("SELECT tier FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

    Ok(Tier::from_db(tier.as_deref()))
}

pub async fn set_tier(pool: &SqlitePool, user_id: &str, tier: Tier) -> Result<()> {
    sqlx::query("UPDATE users SET tier = ?, updated_at = ? WHERE id = ?")
        .bind(tier.as_str())
        .bind(format_timestamp(Utc::now()))
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Issue a new session token for `user_id`
pub async fn create_session(pool: &SqlitePool, user_id: &str) -> Result<Session> {
    let token = generate_session_token();
    let now = Utc::now();
    let expires_at = session_expiry(now);

    sqlx::query("INSERT INTO sessions (token, user_id, created_at, expires_at) VALUES (?, ?, ?, ?)")
        .bind(&token)
        .bind(user_id)
        .bind(format_timestamp(now))
        .bind(format_timestamp(expires_at))
        .execute(pool)
        .await?;

    Ok(Session {
        token,
        user_id: user_id.to_string(),
        expires_at,
    })
}

/// Owner of an unexpired session
pub async fn session_user(
    pool: &SqlitePool,
    token: &str,
    now: DateTime<Utc>,
) -> Result<Option<String>> {
    let row = sqlx::query("SELECT user_id, expires_at FROM sessions WHERE token = ?")
        .bind(token)
        .fetch_optional(pool)
        .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let expires_at: String = row.get("expires_at");
    if parse_timestamp(&expires_at)? <= now {
        return Ok(None);
    }

    Ok(Some(row.get("user_id")))
}

pub async fn delete_session(pool: &SqlitePool, token: &str) -> Result<()> {
    sqlx::query("DELETE FROM sessions WHERE token = ?")
        .bind(token)
        .execute(pool)
        .await?;

    Ok(())
}

/// Remove expired sessions, returning how many were removed
pub async fn purge_expired_sessions(pool: &SqlitePool, now: DateTime<Utc>) -> Result<u64> {
    let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
        .bind(format_timestamp(now))
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

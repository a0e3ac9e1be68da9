//! Database initialization
//!
//! Creates the SQLite database on first run and brings the schema up to date.
//! Every statement is `CREATE ... IF NOT EXISTS`, so initialization is idempotent.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Open (creating if needed) the database file and initialize the schema
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // WAL allows concurrent readers while a request writes
    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;

    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    create_schema(&pool).await?;

    Ok(pool)
}

/// In-memory database with the full schema
///
/// Uses a single connection: every `sqlite::memory:` connection is a separate database.
pub async fn init_memory_database() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await?;

    create_schema(&pool).await?;
    Ok(pool)
}

/// Create all tables and indexes
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(pool)
        .await?;

    create_users_table(pool).await?;
    create_sessions_table(pool).await?;
    create_schematics_table(pool).await?;
    create_schematic_pages_table(pool).await?;
    create_components_table(pool).await?;
    create_text_blocks_table(pool).await?;
    create_bom_items_table(pool).await?;
    create_search_history_table(pool).await?;

    Ok(())
}

async fn create_users_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            password_hash TEXT NOT NULL,
            password_salt TEXT NOT NULL,
            tier TEXT NOT NULL DEFAULT 'FREE',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_sessions_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sessions (
            token TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            created_at TEXT NOT NULL,
            expires_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_schematics_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schematics (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            file_name TEXT NOT NULL,
            file_url TEXT NOT NULL DEFAULT '',
            file_size INTEGER NOT NULL,
            page_count INTEGER,
            status TEXT NOT NULL DEFAULT 'UPLOADED',
            ai_job_id TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_schematics_user_created ON schematics(user_id, created_at)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_schematic_pages_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schematic_pages (
            id TEXT PRIMARY KEY,
            schematic_id TEXT NOT NULL REFERENCES schematics(id) ON DELETE CASCADE,
            page_number INTEGER NOT NULL,
            image_url TEXT NOT NULL,
            width INTEGER NOT NULL,
            height INTEGER NOT NULL,
            connections TEXT NOT NULL DEFAULT '{}',
            UNIQUE(schematic_id, page_number)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_components_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS components (
            id TEXT PRIMARY KEY,
            schematic_id TEXT NOT NULL REFERENCES schematics(id) ON DELETE CASCADE,
            page_id TEXT NOT NULL REFERENCES schematic_pages(id) ON DELETE CASCADE,
            type TEXT NOT NULL,
            ref_designator TEXT,
            value TEXT,
            confidence REAL NOT NULL,
            bbox TEXT NOT NULL,
            attributes TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_components_schematic ON components(schematic_id)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_text_blocks_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS text_blocks (
            id TEXT PRIMARY KEY,
            page_id TEXT NOT NULL REFERENCES schematic_pages(id) ON DELETE CASCADE,
            text TEXT NOT NULL,
            confidence REAL NOT NULL,
            bbox TEXT NOT NULL,
            category TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_text_blocks_page ON text_blocks(page_id)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_bom_items_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS bom_items (
            id TEXT PRIMARY KEY,
            schematic_id TEXT NOT NULL REFERENCES schematics(id) ON DELETE CASCADE,
            ref_designator TEXT NOT NULL,
            component_type TEXT NOT NULL,
            value TEXT,
            quantity INTEGER NOT NULL,
            footprint TEXT,
            part_number TEXT,
            price REAL,
            in_stock INTEGER
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_search_history_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS search_history (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            query TEXT NOT NULL,
            component_type TEXT NOT NULL DEFAULT '',
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

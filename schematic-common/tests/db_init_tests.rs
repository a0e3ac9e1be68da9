//! Tests for database initialization

use schematic_common::db::{init_database, init_memory_database};

#[tokio::test]
async fn test_database_creation_when_missing() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("data").join("schematic.db");

    let result = init_database(&db_path).await;
    assert!(result.is_ok(), "Database initialization failed: {:?}", result.err());
    assert!(db_path.exists(), "Database file was not created");
}

#[tokio::test]
async fn test_database_opens_existing() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("schematic.db");

    let pool1 = init_database(&db_path).await;
    assert!(pool1.is_ok());
    drop(pool1);

    // Schema creation is idempotent
    let pool2 = init_database(&db_path).await;
    assert!(pool2.is_ok(), "Failed to open existing database: {:?}", pool2.err());
}

#[tokio::test]
async fn test_all_tables_created() {
    let pool = init_memory_database().await.unwrap();

    let tables: Vec<String> = sqlx::query_scalar(
        "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
    )
    .fetch_all(&pool)
    .await
    .unwrap();

    for expected in [
        "bom_items",
        "components",
        "schematic_pages",
        "schematics",
        "search_history",
        "sessions",
        "text_blocks",
        "users",
    ] {
        assert!(tables.iter().any(|t| t == expected), "missing table {}", expected);
    }
}

#[tokio::test]
async fn test_deleting_schematic_cascades() {
    let pool = init_memory_database().await.unwrap();
    let now = chrono::Utc::now().to_rfc3339();

    sqlx::query(
        "INSERT INTO users (id, email, name, password_hash, password_salt, created_at, updated_at)
         VALUES ('u1', 'a@b.c', 'A', 'h', 's', ?, ?)",
    )
    .bind(&now)
    .bind(&now)
    .execute(&pool)
    .await
    .unwrap();

    sqlx::query(
        "INSERT INTO schematics (id, user_id, file_name, file_size, created_at, updated_at)
         VALUES ('s1', 'u1', 'board.pdf', 100, ?, ?)",
    )
    .bind(&now)
    .bind(&now)
    .execute(&pool)
    .await
    .unwrap();

    sqlx::query(
        "INSERT INTO schematic_pages (id, schematic_id, page_number, image_url, width, height)
         VALUES ('p1', 's1', 1, 'mock://page-1.png', 2480, 3508)",
    )
    .execute(&pool)
    .await
    .unwrap();

    sqlx::query(
        "INSERT INTO text_blocks (id, page_id, text, confidence, bbox, category)
         VALUES ('t1', 'p1', 'VCC', 0.9, '{}', 'PIN')",
    )
    .execute(&pool)
    .await
    .unwrap();

    sqlx::query("DELETE FROM schematics WHERE id = 's1'")
        .execute(&pool)
        .await
        .unwrap();

    let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM text_blocks")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(remaining, 0);
}

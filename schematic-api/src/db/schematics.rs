//! Schematic records and their status transitions

use chrono::Utc;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

use schematic_common::models::{Schematic, SchematicStatus};
use schematic_common::{Error, Result};

use super::{format_timestamp, new_id, parse_timestamp};
use crate::pagination::PageWindow;

const SCHEMATIC_COLUMNS: &str = "s.id, s.user_id, s.file_name, s.file_url, s.file_size, \
     s.page_count, s.status, s.ai_job_id, s.created_at, s.updated_at";

/// A schematic with its detected-component count
#[derive(Debug, Clone)]
pub struct SchematicSummary {
    pub schematic: Schematic,
    pub component_count: i64,
}

fn schematic_from_row(row: &SqliteRow) -> Result<Schematic> {
    let status: String = row.get("status");
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");

    Ok(Schematic {
        id: row.get("id"),
        user_id: row.get("user_id"),
        file_name: row.get("file_name"),
        file_url: row.get("file_url"),
        file_size: row.get("file_size"),
        page_count: row.get("page_count"),
        status: status.parse().map_err(Error::Internal)?,
        ai_job_id: row.get("ai_job_id"),
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}

/// Insert a freshly uploaded schematic (status UPLOADED, no file key yet)
pub async fn insert_schematic(
    pool: &SqlitePool,
    user_id: &str,
    file_name: &str,
    file_size: i64,
) -> Result<Schematic> {
    let now = Utc::now();
    let schematic = Schematic {
        id: new_id(),
        user_id: user_id.to_string(),
        file_name: file_name.to_string(),
        file_url: String::new(),
        file_size,
        page_count: None,
        status: SchematicStatus::Uploaded,
        ai_job_id: None,
        created_at: now,
        updated_at: now,
    };

    sqlx::query(
        r#"
        INSERT INTO schematics (id, user_id, file_name, file_url, file_size, status, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&schematic.id)
    .bind(&schematic.user_id)
    .bind(&schematic.file_name)
    .bind(&schematic.file_url)
    .bind(schematic.file_size)
    .bind(schematic.status.as_str())
    .bind(format_timestamp(now))
    .bind(format_timestamp(now))
    .execute(pool)
    .await?;

    Ok(schematic)
}

/// Record the storage key of the uploaded file
pub async fn set_file_url(pool: &SqlitePool, schematic_id: &str, key: &str) -> Result<()> {
    sqlx::query("UPDATE schematics SET file_url = ?, updated_at = ? WHERE id = ?")
        .bind(key)
        .bind(format_timestamp(Utc::now()))
        .bind(schematic_id)
        .execute(pool)
        .await?;

    Ok(())
}

pub async fn count_for_user(pool: &SqlitePool, user_id: &str) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM schematics WHERE user_id = ?")
        .bind(user_id)
        .fetch_one(pool)
        .await?;

    Ok(count)
}

/// One page of a user's schematics, newest first
pub async fn list_for_user(
    pool: &SqlitePool,
    user_id: &str,
    window: PageWindow,
) -> Result<Vec<SchematicSummary>> {
    let sql = format!(
        r#"
        SELECT {},
               (SELECT COUNT(*) FROM components c WHERE c.schematic_id = s.id) AS component_count
        FROM schematics s
        WHERE s.user_id = ?
        ORDER BY s.created_at DESC, s.id DESC
        LIMIT ? OFFSET ?
        "#,
        SCHEMATIC_COLUMNS
    );

    let rows = sqlx::query(&sql)
        .bind(user_id)
        .bind(window.limit)
        .bind(window.offset)
        .fetch_all(pool)
        .await?;

    rows.iter()
        .map(|row| {
            Ok(SchematicSummary {
                schematic: schematic_from_row(row)?,
                component_count: row.get("component_count"),
            })
        })
        .collect()
}

/// The `limit` newest schematics of a user
pub async fn recent_for_user(
    pool: &SqlitePool,
    user_id: &str,
    limit: i64,
) -> Result<Vec<SchematicSummary>> {
    list_for_user(pool, user_id, PageWindow::new(1, limit)).await
}

/// A schematic, only if `user_id` owns it
pub async fn find_owned(
    pool: &SqlitePool,
    schematic_id: &str,
    user_id: &str,
) -> Result<Option<Schematic>> {
    let sql = format!(
        "SELECT {} FROM schematics s WHERE s.id = ? AND s.user_id = ?",
        SCHEMATIC_COLUMNS
    );

    let row = sqlx::query(&sql)
        .bind(schematic_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(schematic_from_row).transpose()
}

/// Delete a schematic; pages, components, text and BOM cascade
pub async fn delete_schematic(pool: &SqlitePool, schematic_id: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM schematics WHERE id = ?")
        .bind(schematic_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Move to PROCESSING unless already there
///
/// Returns `false` when another request got there first, so two concurrent
/// process requests cannot both start.
pub async fn begin_processing(pool: &SqlitePool, schematic_id: &str) -> Result<bool> {
    let result = sqlx::query(
        "UPDATE schematics SET status = ?, updated_at = ? WHERE id = ? AND status != ?",
    )
    .bind(SchematicStatus::Processing.as_str())
    .bind(format_timestamp(Utc::now()))
    .bind(schematic_id)
    .bind(SchematicStatus::Processing.as_str())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn set_status(
    pool: &SqlitePool,
    schematic_id: &str,
    status: SchematicStatus,
) -> Result<()> {
    sqlx::query("UPDATE schematics SET status = ?, updated_at = ? WHERE id = ?")
        .bind(status.as_str())
        .bind(format_timestamp(Utc::now()))
        .bind(schematic_id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Mark analysis finished with `page_count` pages
pub async fn mark_completed(pool: &SqlitePool, schematic_id: &str, page_count: i64) -> Result<()> {
    sqlx::query("UPDATE schematics SET status = ?, page_count = ?, updated_at = ? WHERE id = ?")
        .bind(SchematicStatus::Completed.as_str())
        .bind(page_count)
        .bind(format_timestamp(Utc::now()))
        .bind(schematic_id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Attach (or clear) the AI service job driving this schematic
pub async fn set_ai_job(pool: &SqlitePool, schematic_id: &str, job_id: Option<&str>) -> Result<()> {
    sqlx::query("UPDATE schematics SET ai_job_id = ?, updated_at = ? WHERE id = ?")
        .bind(job_id)
        .bind(format_timestamp(Utc::now()))
        .bind(schematic_id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Dashboard totals for one user
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserTotals {
    pub schematics: i64,
    pub components: i64,
    pub pages: i64,
}

pub async fn totals_for_user(pool: &SqlitePool, user_id: &str) -> Result<UserTotals> {
    let row = sqlx::query(
        r#"
        SELECT
            (SELECT COUNT(*) FROM schematics WHERE user_id = ?1) AS schematics,
            (SELECT COUNT(*) FROM components c
                JOIN schematics s ON s.id = c.schematic_id
                WHERE s.user_id = ?1) AS components,
            (SELECT COUNT(*) FROM schematic_pages p
                JOIN schematics s ON s.id = p.schematic_id
                WHERE s.user_id = ?1) AS pages
        "#,
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    Ok(UserTotals {
        schematics: row.get("schematics"),
        components: row.get("components"),
        pages: row.get("pages"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::users::create_user;
    use schematic_common::db::init_memory_database;

    async fn setup() -> (SqlitePool, String) {
        let pool = init_memory_database().await.unwrap();
        let user = create_user(&pool, "owner@x.io", "Owner", "secret1")
            .await
            .unwrap()
            .unwrap();
        (pool, user.id)
    }

    #[tokio::test]
    async fn test_insert_and_find_owned() {
        let (pool, user_id) = setup().await;
        let s = insert_schematic(&pool, &user_id, "amp.pdf", 1234).await.unwrap();
        assert_eq!(s.status, SchematicStatus::Uploaded);
        assert_eq!(s.file_url, "");

        set_file_url(&pool, &s.id, "schematics/u/s/amp.pdf").await.unwrap();
        let found = find_owned(&pool, &s.id, &user_id).await.unwrap().unwrap();
        assert_eq!(found.file_url, "schematics/u/s/amp.pdf");
        assert_eq!(found.file_size, 1234);
        assert!(found.page_count.is_none());

        assert!(find_owned(&pool, &s.id, "someone-else").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_newest_first_with_window() {
        let (pool, user_id) = setup().await;
        let mut ids = Vec::new();
        for i in 0..5 {
            let s = insert_schematic(&pool, &user_id, &format!("{}.pdf", i), 1)
                .await
                .unwrap();
            ids.push(s.id);
        }

        let first = list_for_user(&pool, &user_id, PageWindow::new(1, 2)).await.unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].schematic.id, ids[4]);
        assert_eq!(first[1].schematic.id, ids[3]);
        assert_eq!(first[0].component_count, 0);

        let last = list_for_user(&pool, &user_id, PageWindow::new(3, 2)).await.unwrap();
        assert_eq!(last.len(), 1);
        assert_eq!(last[0].schematic.id, ids[0]);

        assert_eq!(count_for_user(&pool, &user_id).await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_begin_processing_is_exclusive() {
        let (pool, user_id) = setup().await;
        let s = insert_schematic(&pool, &user_id, "a.pdf", 1).await.unwrap();

        assert!(begin_processing(&pool, &s.id).await.unwrap());
        assert!(!begin_processing(&pool, &s.id).await.unwrap());

        mark_completed(&pool, &s.id, 3).await.unwrap();
        let done = find_owned(&pool, &s.id, &user_id).await.unwrap().unwrap();
        assert_eq!(done.status, SchematicStatus::Completed);
        assert_eq!(done.page_count, Some(3));

        // Finished schematics can be processed again
        assert!(begin_processing(&pool, &s.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete() {
        let (pool, user_id) = setup().await;
        let s = insert_schematic(&pool, &user_id, "a.pdf", 1).await.unwrap();
        assert!(delete_schematic(&pool, &s.id).await.unwrap());
        assert!(!delete_schematic(&pool, &s.id).await.unwrap());
    }
}

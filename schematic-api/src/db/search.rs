//! Component and text search across a user's schematics

use chrono::Utc;
use sqlx::{Row, SqlitePool};

use schematic_common::models::TextBlock;
use schematic_common::Result;

use super::analysis::text_block_from_row;
use super::{format_timestamp, new_id};
use crate::pagination::PageWindow;

/// Maximum text blocks returned per search
pub const TEXT_RESULT_LIMIT: i64 = 10;

/// Component search hit
#[derive(Debug, Clone)]
pub struct ComponentHit {
    pub id: String,
    pub component_type: String,
    pub ref_designator: Option<String>,
    pub value: Option<String>,
    pub confidence: f64,
    pub schematic_id: String,
    pub schematic_name: String,
    pub page_number: i64,
}

/// Text search hit with its page and schematic
#[derive(Debug, Clone)]
pub struct TextHit {
    pub block: TextBlock,
    pub page_number: i64,
    pub schematic_id: String,
    pub schematic_name: String,
}

/// Escape `%`, `_` and `\` for a LIKE pattern using `ESCAPE '\'`
///
/// ```
/// use schematic_api::db::search::like_pattern;
///
/// assert_eq!(like_pattern("10%"), "%10\\%%");
/// ```
pub fn like_pattern(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len() + 2);
    escaped.push('%');
    for ch in query.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

/// WHERE clause shared by the component count and page queries
fn component_filter(query: Option<&str>, component_type: Option<&str>) -> String {
    let mut clause = String::from("s.user_id = ?");
    if component_type.is_some() {
        clause.push_str(" AND c.type = ?");
    }
    if query.is_some() {
        clause.push_str(
            " AND (c.ref_designator LIKE ? ESCAPE '\\' \
               OR c.value LIKE ? ESCAPE '\\' \
               OR c.type LIKE ? ESCAPE '\\')",
        );
    }
    clause
}

fn bind_component_filter<'q>(
    mut q: sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>>,
    user_id: &'q str,
    pattern: Option<&'q str>,
    component_type: Option<&'q str>,
) -> sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>> {
    q = q.bind(user_id);
    if let Some(t) = component_type {
        q = q.bind(t);
    }
    if let Some(p) = pattern {
        q = q.bind(p).bind(p).bind(p);
    }
    q
}

/// Components matching `query` and/or `component_type`, best confidence first
///
/// Returns the requested page of hits and the total match count.
///
/// Matching uses SQLite `LIKE`, which folds case for ASCII letters only:
/// `10KΩ` finds `10kΩ`, but `10kω` does not.
pub async fn search_components(
    pool: &SqlitePool,
    user_id: &str,
    query: Option<&str>,
    component_type: Option<&str>,
    window: PageWindow,
) -> Result<(Vec<ComponentHit>, i64)> {
    let pattern = query.map(like_pattern);
    let filter = component_filter(query, component_type);

    let count_sql = format!(
        "SELECT COUNT(*) AS total FROM components c \
         JOIN schematics s ON s.id = c.schematic_id \
         WHERE {}",
        filter
    );
    let count_row = bind_component_filter(
        sqlx::query(&count_sql),
        user_id,
        pattern.as_deref(),
        component_type,
    )
    .fetch_one(pool)
    .await?;
    let total: i64 = count_row.get("total");

    let page_sql = format!(
        r#"
        SELECT c.id, c.type, c.ref_designator, c.value, c.confidence,
               s.id AS schematic_id, s.file_name, p.page_number
        FROM components c
        JOIN schematics s ON s.id = c.schematic_id
        JOIN schematic_pages p ON p.id = c.page_id
        WHERE {}
        ORDER BY c.confidence DESC, c.id ASC
        LIMIT ? OFFSET ?
        "#,
        filter
    );
    let rows = bind_component_filter(
        sqlx::query(&page_sql),
        user_id,
        pattern.as_deref(),
        component_type,
    )
    .bind(window.limit)
    .bind(window.offset)
    .fetch_all(pool)
    .await?;

    let hits = rows
        .iter()
        .map(|row| ComponentHit {
            id: row.get("id"),
            component_type: row.get("type"),
            ref_designator: row.get("ref_designator"),
            value: row.get("value"),
            confidence: row.get("confidence"),
            schematic_id: row.get("schematic_id"),
            schematic_name: row.get("file_name"),
            page_number: row.get("page_number"),
        })
        .collect();

    Ok((hits, total))
}

/// Text blocks containing `query`: top matches by confidence, and the total count
///
/// Case folding is ASCII-only, as for [`search_components`].
pub async fn search_text(
    pool: &SqlitePool,
    user_id: &str,
    query: &str,
) -> Result<(Vec<TextHit>, i64)> {
    let pattern = like_pattern(query);

    let total: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*)
        FROM text_blocks t
        JOIN schematic_pages p ON p.id = t.page_id
        JOIN schematics s ON s.id = p.schematic_id
        WHERE s.user_id = ? AND t.text LIKE ? ESCAPE '\'
        "#,
    )
    .bind(user_id)
    .bind(&pattern)
    .fetch_one(pool)
    .await?;

    let rows = sqlx::query(
        r#"
        SELECT t.id, t.page_id, t.text, t.confidence, t.bbox, t.category,
               p.page_number, s.id AS schematic_id, s.file_name
        FROM text_blocks t
        JOIN schematic_pages p ON p.id = t.page_id
        JOIN schematics s ON s.id = p.schematic_id
        WHERE s.user_id = ? AND t.text LIKE ? ESCAPE '\'
        ORDER BY t.confidence DESC, t.id ASC
        LIMIT ?
        "#,
    )
    .bind(user_id)
    .bind(&pattern)
    .bind(TEXT_RESULT_LIMIT)
    .fetch_all(pool)
    .await?;

    let hits = rows
        .iter()
        .map(|row| {
            Ok(TextHit {
                block: text_block_from_row(row)?,
                page_number: row.get("page_number"),
                schematic_id: row.get("schematic_id"),
                schematic_name: row.get("file_name"),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok((hits, total))
}

/// Append a search to the user's history
pub async fn record_search(
    pool: &SqlitePool,
    user_id: &str,
    query: &str,
    component_type: &str,
) -> Result<()> {
    sqlx::query(
        "INSERT INTO search_history (id, user_id, query, component_type, created_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(new_id())
    .bind(user_id)
    .bind(query)
    .bind(component_type)
    .bind(format_timestamp(Utc::now()))
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn search_count(pool: &SqlitePool, user_id: &str) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM search_history WHERE user_id = ?")
        .bind(user_id)
        .fetch_one(pool)
        .await?;

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{analysis, schematics, users};
    use crate::mock;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use schematic_common::db::init_memory_database;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("R1"), "%R1%");
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
        assert_eq!(like_pattern("c:\\x"), "%c:\\\\x%");
        assert_eq!(like_pattern(""), "%%");
    }

    async fn user_with_component(value: &str) -> (SqlitePool, String) {
        let pool = init_memory_database().await.unwrap();
        let user = users::create_user(&pool, "s@x.io", "S", "secret1")
            .await
            .unwrap()
            .unwrap();
        let s = schematics::insert_schematic(&pool, &user.id, "a.pdf", 1)
            .await
            .unwrap();
        let generated = mock::generate(&s.id, &mut StdRng::seed_from_u64(3));
        analysis::store_analysis(&pool, &s.id, &generated).await.unwrap();

        sqlx::query("UPDATE components SET value = ? WHERE id = ?")
            .bind(value)
            .bind(&generated.components[0].id)
            .execute(&pool)
            .await
            .unwrap();
        (pool, user.id)
    }

    fn contains_value(hits: &[ComponentHit], value: &str) -> bool {
        hits.iter().any(|h| h.value.as_deref() == Some(value))
    }

    #[tokio::test]
    async fn test_case_folding_is_ascii_only() {
        let (pool, user_id) = user_with_component("10kΩ").await;
        let window = PageWindow::new(1, 100);

        let (hits, _) = search_components(&pool, &user_id, Some("10KΩ"), None, window)
            .await
            .unwrap();
        assert!(contains_value(&hits, "10kΩ"));

        let (hits, _) = search_components(&pool, &user_id, Some("10kω"), None, window)
            .await
            .unwrap();
        assert!(!contains_value(&hits, "10kΩ"));
    }

    #[test]
    fn test_filter_clause_shape() {
        assert_eq!(component_filter(None, None), "s.user_id = ?");
        assert!(component_filter(None, Some("ic")).contains("c.type = ?"));
        let both = component_filter(Some("x"), Some("ic"));
        assert_eq!(both.matches('?').count(), 5);
    }
}

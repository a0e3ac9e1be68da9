//! Analysis results: pages, components, text blocks and BOM lines

use sqlx::{sqlite::SqliteRow, Row, Sqlite, SqlitePool, Transaction};
use std::collections::HashMap;

use schematic_common::models::{BomItem, Component, SchematicPage, TextBlock};
use schematic_common::{Error, Result};

use super::{from_json_text, to_json_text};
use crate::mock::Analysis;

/// Remove all analysis rows of a schematic
///
/// Components and text blocks go with their pages.
pub async fn clear_analysis(pool: &SqlitePool, schematic_id: &str) -> Result<()> {
    let mut tx = pool.begin().await?;
    clear_in(&mut tx, schematic_id).await?;
    tx.commit().await?;
    Ok(())
}

async fn clear_in(tx: &mut Transaction<'_, Sqlite>, schematic_id: &str) -> Result<()> {
    sqlx::query("DELETE FROM bom_items WHERE schematic_id = ?")
        .bind(schematic_id)
        .execute(&mut **tx)
        .await?;
    sqlx::query("DELETE FROM components WHERE schematic_id = ?")
        .bind(schematic_id)
        .execute(&mut **tx)
        .await?;
    sqlx::query("DELETE FROM schematic_pages WHERE schematic_id = ?")
        .bind(schematic_id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

/// Replace a schematic's analysis in one transaction
pub async fn store_analysis(pool: &SqlitePool, schematic_id: &str, analysis: &Analysis) -> Result<()> {
    let mut tx = pool.begin().await?;
    clear_in(&mut tx, schematic_id).await?;

    for page in &analysis.pages {
        sqlx::query(
            r#"
            INSERT INTO schematic_pages (id, schematic_id, page_number, image_url, width, height, connections)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&page.id)
        .bind(schematic_id)
        .bind(page.page_number)
        .bind(&page.image_url)
        .bind(page.width)
        .bind(page.height)
        .bind(to_json_text(&page.connections)?)
        .execute(&mut *tx)
        .await?;

        for block in &page.text_blocks {
            sqlx::query(
                r#"
                INSERT INTO text_blocks (id, page_id, text, confidence, bbox, category)
                VALUES (?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&block.id)
            .bind(&page.id)
            .bind(&block.text)
            .bind(block.confidence)
            .bind(to_json_text(&block.bbox)?)
            .bind(block.category.as_str())
            .execute(&mut *tx)
            .await?;
        }
    }

    for component in &analysis.components {
        let attributes = component.attributes.as_ref().map(to_json_text).transpose()?;
        sqlx::query(
            r#"
            INSERT INTO components (id, schematic_id, page_id, type, ref_designator, value, confidence, bbox, attributes)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&component.id)
        .bind(schematic_id)
        .bind(&component.page_id)
        .bind(&component.component_type)
        .bind(&component.ref_designator)
        .bind(&component.value)
        .bind(component.confidence)
        .bind(to_json_text(&component.bbox)?)
        .bind(attributes)
        .execute(&mut *tx)
        .await?;
    }

    for item in &analysis.bom_items {
        sqlx::query(
            r#"
            INSERT INTO bom_items (id, schematic_id, ref_designator, component_type, value,
                                   quantity, footprint, part_number, price, in_stock)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&item.id)
        .bind(schematic_id)
        .bind(&item.ref_designator)
        .bind(&item.component_type)
        .bind(&item.value)
        .bind(item.quantity)
        .bind(&item.footprint)
        .bind(&item.part_number)
        .bind(item.price)
        .bind(item.in_stock)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    tracing::debug!(
        schematic_id = %schematic_id,
        pages = analysis.pages.len(),
        components = analysis.components.len(),
        bom_items = analysis.bom_items.len(),
        "Stored analysis"
    );

    Ok(())
}

pub(crate) fn component_from_row(row: &SqliteRow) -> Result<Component> {
    let bbox: String = row.get("bbox");
    let attributes: Option<String> = row.get("attributes");

    Ok(Component {
        id: row.get("id"),
        schematic_id: row.get("schematic_id"),
        page_id: row.get("page_id"),
        component_type: row.get("type"),
        ref_designator: row.get("ref_designator"),
        value: row.get("value"),
        confidence: row.get("confidence"),
        bbox: from_json_text("component bbox", &bbox)?,
        attributes: attributes
            .as_deref()
            .map(|a| from_json_text("component attributes", a))
            .transpose()?,
    })
}

pub(crate) fn text_block_from_row(row: &SqliteRow) -> Result<TextBlock> {
    let bbox: String = row.get("bbox");
    let category: String = row.get("category");

    Ok(TextBlock {
        id: row.get("id"),
        page_id: row.get("page_id"),
        text: row.get("text"),
        confidence: row.get("confidence"),
        bbox: from_json_text("text bbox", &bbox)?,
        category: category.parse().map_err(Error::Internal)?,
    })
}

/// Pages in page-number order, each with its text blocks
pub async fn pages_with_text(pool: &SqlitePool, schematic_id: &str) -> Result<Vec<SchematicPage>> {
    let page_rows = sqlx::query(
        r#"
        SELECT id, schematic_id, page_number, image_url, width, height, connections
        FROM schematic_pages
        WHERE schematic_id = ?
        ORDER BY page_number ASC
        "#,
    )
    .bind(schematic_id)
    .fetch_all(pool)
    .await?;

    let text_rows = sqlx::query(
        r#"
        SELECT t.id, t.page_id, t.text, t.confidence, t.bbox, t.category
        FROM text_blocks t
        JOIN schematic_pages p ON p.id = t.page_id
        WHERE p.schematic_id = ?
        ORDER BY t.rowid ASC
        "#,
    )
    .bind(schematic_id)
    .fetch_all(pool)
    .await?;

    let mut text_by_page: HashMap<String, Vec<TextBlock>> = HashMap::new();
    for row in &text_rows {
        let block = text_block_from_row(row)?;
        text_by_page.entry(block.page_id.clone()).or_default().push(block);
    }

    page_rows
        .iter()
        .map(|row| {
            let id: String = row.get("id");
            let connections: String = row.get("connections");
            Ok(SchematicPage {
                text_blocks: text_by_page.remove(&id).unwrap_or_default(),
                id,
                schematic_id: row.get("schematic_id"),
                page_number: row.get("page_number"),
                image_url: row.get("image_url"),
                width: row.get("width"),
                height: row.get("height"),
                connections: from_json_text("page connections", &connections)?,
            })
        })
        .collect()
}

/// Components in insertion order
pub async fn components(pool: &SqlitePool, schematic_id: &str) -> Result<Vec<Component>> {
    let rows = sqlx::query(
        r#"
        SELECT id, schematic_id, page_id, type, ref_designator, value, confidence, bbox, attributes
        FROM components
        WHERE schematic_id = ?
        ORDER BY rowid ASC
        "#,
    )
    .bind(schematic_id)
    .fetch_all(pool)
    .await?;

    rows.iter().map(component_from_row).collect()
}

pub async fn bom_items(pool: &SqlitePool, schematic_id: &str) -> Result<Vec<BomItem>> {
    let rows = sqlx::query(
        r#"
        SELECT id, schematic_id, ref_designator, component_type, value,
               quantity, footprint, part_number, price, in_stock
        FROM bom_items
        WHERE schematic_id = ?
        ORDER BY rowid ASC
        "#,
    )
    .bind(schematic_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .iter()
        .map(|row| BomItem {
            id: row.get("id"),
            schematic_id: row.get("schematic_id"),
            ref_designator: row.get("ref_designator"),
            component_type: row.get("component_type"),
            value: row.get("value"),
            quantity: row.get("quantity"),
            footprint: row.get("footprint"),
            part_number: row.get("part_number"),
            price: row.get("price"),
            in_stock: row.get("in_stock"),
        })
        .collect())
}

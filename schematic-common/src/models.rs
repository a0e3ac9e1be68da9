//! Domain models shared by the web API and the viewer
//!
//! JSON field names are camelCase to match the browser client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::Tier;

/// Ingestion and analysis status of a schematic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SchematicStatus {
    /// Record created, presigned upload handed out
    Uploaded,
    /// Analysis running
    Processing,
    /// Analysis results stored
    Completed,
    /// Analysis failed
    Failed,
}

impl SchematicStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SchematicStatus::Uploaded => "UPLOADED",
            SchematicStatus::Processing => "PROCESSING",
            SchematicStatus::Completed => "COMPLETED",
            SchematicStatus::Failed => "FAILED",
        }
    }
}

impl FromStr for SchematicStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "UPLOADED" => Ok(SchematicStatus::Uploaded),
            "PROCESSING" => Ok(SchematicStatus::Processing),
            "COMPLETED" => Ok(SchematicStatus::Completed),
            "FAILED" => Ok(SchematicStatus::Failed),
            other => Err(format!("Unknown schematic status: {}", other)),
        }
    }
}

impl fmt::Display for SchematicStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Axis-aligned box in page pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Edges are inclusive
    pub fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.x && px <= self.x + self.width && py >= self.y && py <= self.y + self.height
    }
}

/// Role of a recognized text block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TextCategory {
    Label,
    Value,
    Pin,
    Title,
    Note,
}

impl TextCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            TextCategory::Label => "LABEL",
            TextCategory::Value => "VALUE",
            TextCategory::Pin => "PIN",
            TextCategory::Title => "TITLE",
            TextCategory::Note => "NOTE",
        }
    }
}

impl FromStr for TextCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LABEL" => Ok(TextCategory::Label),
            "VALUE" => Ok(TextCategory::Value),
            "PIN" => Ok(TextCategory::Pin),
            "TITLE" => Ok(TextCategory::Title),
            "NOTE" => Ok(TextCategory::Note),
            other => Err(format!("Unknown text category: {}", other)),
        }
    }
}

/// Account as exposed over the API (no credentials)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub tier: Tier,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schematic {
    pub id: String,
    pub user_id: String,
    pub file_name: String,
    /// Object storage key; empty until the key is assigned
    pub file_url: String,
    pub file_size: i64,
    pub page_count: Option<i64>,
    pub status: SchematicStatus,
    pub ai_job_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchematicPage {
    pub id: String,
    pub schematic_id: String,
    pub page_number: i64,
    pub image_url: String,
    pub width: i64,
    pub height: i64,
    /// Connectivity graph `{nodes, edges}`
    pub connections: Value,
    #[serde(default)]
    pub text_blocks: Vec<TextBlock>,
}

/// Detected electronic component
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    pub id: String,
    pub schematic_id: String,
    pub page_id: String,
    #[serde(rename = "type")]
    pub component_type: String,
    pub ref_designator: Option<String>,
    pub value: Option<String>,
    pub confidence: f64,
    pub bbox: BoundingBox,
    pub attributes: Option<Value>,
}

/// Recognized text on a page
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextBlock {
    pub id: String,
    pub page_id: String,
    pub text: String,
    pub confidence: f64,
    pub bbox: BoundingBox,
    pub category: TextCategory,
}

/// Bill-of-materials line
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BomItem {
    pub id: String,
    pub schematic_id: String,
    /// Comma-separated reference designators, e.g. `R1, R4`
    pub ref_designator: String,
    pub component_type: String,
    pub value: Option<String>,
    pub quantity: i64,
    pub footprint: Option<String>,
    pub part_number: Option<String>,
    pub price: Option<f64>,
    pub in_stock: Option<bool>,
}

/// Totals shown under the BOM table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BomSummary {
    pub unique_items: usize,
    pub total_quantity: i64,
    /// Sum of price × quantity over priced lines, rounded to cents
    pub total_cost: f64,
}

impl BomSummary {
    pub fn from_items(items: &[BomItem]) -> Self {
        let total_quantity = items.iter().map(|i| i.quantity).sum();
        let total_cost: f64 = items
            .iter()
            .filter_map(|i| i.price.map(|p| p * i.quantity as f64))
            .sum();

        Self {
            unique_items: items.len(),
            total_quantity,
            total_cost: (total_cost * 100.0).round() / 100.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bom(quantity: i64, price: Option<f64>) -> BomItem {
        BomItem {
            id: "b".into(),
            schematic_id: "s".into(),
            ref_designator: "R1".into(),
            component_type: "resistor".into(),
            value: None,
            quantity,
            footprint: None,
            part_number: None,
            price,
            in_stock: None,
        }
    }

    #[test]
    fn test_bbox_contains_edges() {
        let b = BoundingBox::new(10.0, 20.0, 5.0, 5.0);
        assert!(b.contains(10.0, 20.0));
        assert!(b.contains(15.0, 25.0));
        assert!(!b.contains(15.1, 22.0));
        assert!(!b.contains(9.9, 22.0));
    }

    #[test]
    fn test_bom_summary_skips_unpriced() {
        let items = vec![bom(2, Some(1.25)), bom(3, None), bom(1, Some(0.333))];
        let summary = BomSummary::from_items(&items);
        assert_eq!(summary.unique_items, 3);
        assert_eq!(summary.total_quantity, 6);
        assert_eq!(summary.total_cost, 2.83);
    }

    #[test]
    fn test_component_serializes_type_field() {
        let c = Component {
            id: "c1".into(),
            schematic_id: "s1".into(),
            page_id: "p1".into(),
            component_type: "resistor".into(),
            ref_designator: Some("R1".into()),
            value: Some("10kΩ".into()),
            confidence: 0.9,
            bbox: BoundingBox::new(0.0, 0.0, 1.0, 1.0),
            attributes: None,
        };
        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(json["type"], "resistor");
        assert_eq!(json["refDesignator"], "R1");
        assert_eq!(json["pageId"], "p1");
    }

    #[test]
    fn test_status_round_trip_str() {
        for status in [
            SchematicStatus::Uploaded,
            SchematicStatus::Processing,
            SchematicStatus::Completed,
            SchematicStatus::Failed,
        ] {
            assert_eq!(status.as_str().parse::<SchematicStatus>().unwrap(), status);
        }
    }
}

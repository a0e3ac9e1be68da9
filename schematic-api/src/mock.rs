//! Mock analysis generator
//!
//! Used while no real detection pipeline is connected: fabricates pages,
//! components, text blocks and a bill of materials that look plausible in
//! the viewer. Generation is pure; randomness comes from the caller's RNG so
//! tests can seed it.

use rand::Rng;
use serde_json::json;

use schematic_common::models::{
    BomItem, BoundingBox, Component, SchematicPage, TextBlock, TextCategory,
};

pub const MOCK_PAGE_COUNT: i64 = 3;
/// A4 at 300 DPI
pub const MOCK_PAGE_WIDTH: i64 = 2480;
pub const MOCK_PAGE_HEIGHT: i64 = 3508;

struct ComponentTemplate {
    kind: &'static str,
    prefix: &'static str,
    values: &'static [&'static str],
}

const COMPONENT_TEMPLATES: &[ComponentTemplate] = &[
    ComponentTemplate {
        kind: "resistor",
        prefix: "R",
        values: &["10kΩ", "4.7kΩ", "100Ω", "1MΩ", "330Ω", "220Ω"],
    },
    ComponentTemplate {
        kind: "capacitor",
        prefix: "C",
        values: &["100nF", "10µF", "22pF", "1µF", "470µF"],
    },
    ComponentTemplate {
        kind: "ic",
        prefix: "U",
        values: &["LM7805", "ATmega328P", "NE555", "LM358", "CD4017"],
    },
    ComponentTemplate {
        kind: "diode",
        prefix: "D",
        values: &["1N4148", "1N4007", "LED Red", "LED Green"],
    },
    ComponentTemplate {
        kind: "transistor",
        prefix: "Q",
        values: &["2N2222", "BC547", "IRF540N", "2N3904"],
    },
    ComponentTemplate {
        kind: "inductor",
        prefix: "L",
        values: &["10µH", "100µH", "1mH"],
    },
    ComponentTemplate {
        kind: "connector",
        prefix: "J",
        values: &["USB-C", "2-pin Header", "RJ45", "DC Jack"],
    },
];

/// `None` text means "Page {n}"
const TEXT_TEMPLATES: &[(Option<&str>, TextCategory)] = &[
    (Some("VCC"), TextCategory::Pin),
    (Some("GND"), TextCategory::Pin),
    (None, TextCategory::Title),
    (Some("Rev 2.1"), TextCategory::Note),
    (Some("10kΩ"), TextCategory::Value),
    (Some("R1"), TextCategory::Label),
    (Some("Power Supply"), TextCategory::Title),
    (Some("Do not populate"), TextCategory::Note),
];

const PART_NUMBER_ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Everything produced by one mock processing run
#[derive(Debug, Clone)]
pub struct Analysis {
    /// Pages in page-number order, each carrying its text blocks
    pub pages: Vec<SchematicPage>,
    pub components: Vec<Component>,
    pub bom_items: Vec<BomItem>,
}

impl Analysis {
    pub fn page_count(&self) -> i64 {
        self.pages.len() as i64
    }
}

/// Generate a complete mock analysis for `schematic_id`
pub fn generate<R: Rng + ?Sized>(schematic_id: &str, rng: &mut R) -> Analysis {
    let mut pages = Vec::with_capacity(MOCK_PAGE_COUNT as usize);
    let mut components = Vec::new();
    // Reference designators are numbered across the whole schematic
    let mut component_index = 0u32;

    for page_number in 1..=MOCK_PAGE_COUNT {
        let page_id = random_id(rng);

        let count = rng.gen_range(5..=10);
        for _ in 0..count {
            component_index += 1;
            components.push(mock_component(schematic_id, &page_id, component_index, rng));
        }

        let text_count = rng.gen_range(4..=8);
        let text_blocks = (0..text_count)
            .map(|_| mock_text_block(&page_id, page_number, rng))
            .collect();

        pages.push(SchematicPage {
            id: page_id,
            schematic_id: schematic_id.to_string(),
            page_number,
            image_url: format!("mock://page-{}.png", page_number),
            width: MOCK_PAGE_WIDTH,
            height: MOCK_PAGE_HEIGHT,
            connections: json!({
                "nodes": [
                    format!("R{}", page_number),
                    format!("C{}", page_number),
                    format!("U{}", page_number),
                ],
                "edges": [
                    { "from": format!("R{}", page_number), "to": format!("U{}", page_number), "pin": "VCC" },
                    { "from": format!("C{}", page_number), "to": format!("U{}", page_number), "pin": "GND" },
                ],
            }),
            text_blocks,
        });
    }

    let bom_items = build_bom(schematic_id, &components, rng);

    Analysis {
        pages,
        components,
        bom_items,
    }
}

fn mock_component<R: Rng + ?Sized>(
    schematic_id: &str,
    page_id: &str,
    index: u32,
    rng: &mut R,
) -> Component {
    let template = &COMPONENT_TEMPLATES[rng.gen_range(0..COMPONENT_TEMPLATES.len())];
    let value = template.values[rng.gen_range(0..template.values.len())];

    Component {
        id: random_id(rng),
        schematic_id: schematic_id.to_string(),
        page_id: page_id.to_string(),
        component_type: template.kind.to_string(),
        ref_designator: Some(format!("{}{}", template.prefix, index)),
        value: Some(value.to_string()),
        confidence: 0.75 + rng.gen::<f64>() * 0.25,
        bbox: BoundingBox::new(
            100.0 + rng.gen::<f64>() * 2000.0,
            100.0 + rng.gen::<f64>() * 3000.0,
            80.0 + rng.gen::<f64>() * 120.0,
            60.0 + rng.gen::<f64>() * 100.0,
        ),
        attributes: Some(json!({ "footprint": footprint(template.kind) })),
    }
}

fn mock_text_block<R: Rng + ?Sized>(page_id: &str, page_number: i64, rng: &mut R) -> TextBlock {
    let (text, category) = TEXT_TEMPLATES[rng.gen_range(0..TEXT_TEMPLATES.len())];
    let text = match text {
        Some(t) => t.to_string(),
        None => format!("Page {}", page_number),
    };

    TextBlock {
        id: random_id(rng),
        page_id: page_id.to_string(),
        text,
        confidence: 0.8 + rng.gen::<f64>() * 0.2,
        bbox: BoundingBox::new(
            50.0 + rng.gen::<f64>() * 2200.0,
            50.0 + rng.gen::<f64>() * 3200.0,
            40.0 + rng.gen::<f64>() * 100.0,
            15.0 + rng.gen::<f64>() * 25.0,
        ),
        category,
    }
}

/// Group components by (type, value) into BOM lines, keeping first-seen order
pub fn build_bom<R: Rng + ?Sized>(
    schematic_id: &str,
    components: &[Component],
    rng: &mut R,
) -> Vec<BomItem> {
    let mut groups: Vec<(&str, Option<&str>, Vec<&str>)> = Vec::new();

    for component in components {
        let kind = component.component_type.as_str();
        let value = component.value.as_deref();
        let reference = component.ref_designator.as_deref().unwrap_or("");

        match groups.iter_mut().find(|(k, v, _)| *k == kind && *v == value) {
            Some((_, _, refs)) => refs.push(reference),
            None => groups.push((kind, value, vec![reference])),
        }
    }

    groups
        .into_iter()
        .map(|(kind, value, refs)| {
            let price = 0.05 + rng.gen::<f64>() * 10.0;
            BomItem {
                id: random_id(rng),
                schematic_id: schematic_id.to_string(),
                ref_designator: refs.join(", "),
                component_type: kind.to_string(),
                value: value.map(str::to_string),
                quantity: refs.len() as i64,
                footprint: Some(footprint(kind)),
                part_number: Some(part_number(rng)),
                price: Some((price * 100.0).round() / 100.0),
                in_stock: Some(rng.gen::<f64>() > 0.2),
            }
        })
        .collect()
}

fn footprint(kind: &str) -> String {
    format!("{}_SMD", kind.to_uppercase())
}

fn part_number<R: Rng + ?Sized>(rng: &mut R) -> String {
    let suffix: String = (0..6)
        .map(|_| PART_NUMBER_ALPHABET[rng.gen_range(0..PART_NUMBER_ALPHABET.len())] as char)
        .collect();
    format!("MFR-{}", suffix)
}

fn random_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    uuid::Builder::from_random_bytes(rng.gen()).into_uuid().to_string()
}

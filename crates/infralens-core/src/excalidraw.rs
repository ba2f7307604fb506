//! Excalidraw document serialization.
//!
//! Turns layout box primitives into an `.excalidraw` JSON document: one
//! `rectangle` element per box, plus a bound `text` element for
//! labelled boxes, linked through `boundElements`/`containerId` the way
//! the Excalidraw editor expects. Element seeds are derived from the
//! element ID so identical input produces an identical document.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::layout::BoxPrimitive;

/// Default hand-drawn-look corner roundness type used by Excalidraw.
const ROUNDNESS_KIND: u32 = 3;

#[derive(Debug, Serialize)]
struct Roundness {
    #[serde(rename = "type")]
    kind: u32,
    value: u32,
}

#[derive(Debug, Serialize)]
struct BoundElement {
    #[serde(rename = "type")]
    kind: &'static str,
    id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RectangleElement {
    id: String,
    #[serde(rename = "type")]
    kind: &'static str,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    angle: f64,
    stroke_color: String,
    background_color: String,
    fill_style: &'static str,
    stroke_width: u32,
    stroke_style: &'static str,
    roughness: u32,
    opacity: u32,
    group_ids: Vec<String>,
    roundness: Roundness,
    seed: u32,
    version: u32,
    version_nonce: u32,
    is_deleted: bool,
    bound_elements: Vec<BoundElement>,
    updated: u64,
    link: Option<String>,
    locked: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TextElement {
    id: String,
    #[serde(rename = "type")]
    kind: &'static str,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    angle: f64,
    stroke_color: String,
    background_color: String,
    fill_style: &'static str,
    stroke_width: u32,
    stroke_style: &'static str,
    roughness: u32,
    opacity: u32,
    group_ids: Vec<String>,
    seed: u32,
    version: u32,
    version_nonce: u32,
    is_deleted: bool,
    bound_elements: Vec<BoundElement>,
    updated: u64,
    link: Option<String>,
    locked: bool,
    text: String,
    font_size: u32,
    font_family: u32,
    text_align: &'static str,
    vertical_align: &'static str,
    container_id: String,
    original_text: String,
    auto_resize: bool,
    line_height: f64,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Element {
    Rectangle(Box<RectangleElement>),
    Text(Box<TextElement>),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AppState {
    grid_size: Option<u32>,
    view_background_color: &'static str,
}

#[derive(Debug, Serialize)]
struct Document {
    #[serde(rename = "type")]
    kind: &'static str,
    version: u32,
    source: &'static str,
    elements: Vec<Element>,
    #[serde(rename = "appState")]
    app_state: AppState,
    files: serde_json::Map<String, serde_json::Value>,
}

/// FNV-1a hash of the element ID, masked to Excalidraw's seed range.
fn seed_for(id: &str) -> u32 {
    let mut hash: u32 = 0x811c_9dc5;
    for byte in id.bytes() {
        hash ^= u32::from(byte);
        hash = hash.wrapping_mul(0x0100_0193);
    }
    hash & 0xFF_FFFF
}

fn elements_for_box(primitive: &BoxPrimitive) -> Vec<Element> {
    let mut bound = Vec::new();
    let text_id = format!("{}-label", primitive.id);
    if primitive.label.is_some() {
        bound.push(BoundElement {
            kind: "text",
            id: text_id.clone(),
        });
    }

    let rect = RectangleElement {
        id: primitive.id.clone(),
        kind: "rectangle",
        x: primitive.x,
        y: primitive.y,
        width: primitive.width,
        height: primitive.height,
        angle: 0.0,
        stroke_color: primitive.stroke.clone(),
        background_color: primitive.fill.clone(),
        fill_style: "solid",
        stroke_width: 1,
        stroke_style: "solid",
        roughness: 0,
        opacity: 100,
        group_ids: Vec::new(),
        roundness: Roundness {
            kind: ROUNDNESS_KIND,
            value: primitive.corner_radius,
        },
        seed: seed_for(&primitive.id),
        version: 1,
        version_nonce: 0,
        is_deleted: false,
        bound_elements: bound,
        updated: 1,
        link: None,
        locked: false,
    };

    let mut elements = vec![Element::Rectangle(Box::new(rect))];

    if let Some(label) = &primitive.label {
        // Bold is not native in Excalidraw; the editor convention is the
        // normal font family one size up.
        let (font_family, font_size) = if label.bold {
            (1, label.font_size + 1)
        } else {
            (3, label.font_size)
        };
        elements.push(Element::Text(Box::new(TextElement {
            id: text_id.clone(),
            kind: "text",
            x: primitive.x,
            y: primitive.y,
            width: primitive.width,
            height: primitive.height,
            angle: 0.0,
            stroke_color: label.color.clone(),
            background_color: "transparent".to_string(),
            fill_style: "solid",
            stroke_width: 1,
            stroke_style: "solid",
            roughness: 0,
            opacity: 100,
            group_ids: Vec::new(),
            seed: seed_for(&text_id),
            version: 1,
            version_nonce: 0,
            is_deleted: false,
            bound_elements: Vec::new(),
            updated: 1,
            link: None,
            locked: false,
            text: label.text.clone(),
            font_size,
            font_family,
            text_align: "center",
            vertical_align: "middle",
            container_id: primitive.id.clone(),
            original_text: label.text.clone(),
            auto_resize: true,
            line_height: 1.25,
        })));
    }

    elements
}

/// Serialize layout boxes into a pretty-printed `.excalidraw` document.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn render_document(boxes: &[BoxPrimitive]) -> Result<String> {
    let doc = Document {
        kind: "excalidraw",
        version: 2,
        source: "https://excalidraw.com",
        elements: boxes.iter().flat_map(elements_for_box).collect(),
        app_state: AppState {
            grid_size: None,
            view_background_color: "#F4F5F7",
        },
        files: serde_json::Map::new(),
    };
    serde_json::to_string_pretty(&doc).map_err(|e| Error::diagram(e.to_string()))
}

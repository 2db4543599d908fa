//! Core data model for a planner canvas.
//!
//! A planner is a set of hexagons placed in world space plus directed,
//! optionally labeled connections between them. Hexagons either link to a
//! curriculum concept or carry free text, never both. Planner metadata
//! (title, description, key-value bag) rides along untouched.

use crate::geometry::HEX_UNIT_PX;
use crate::id::{EdgeId, HexId};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Free-form key-value bag, forwarded to the store as-is.
pub type Settings = Map<String, Value>;

/// Placeholder shown for a hexagon with nothing to display.
pub const PLACEHOLDER_TEXT: &str = "Hex";

// ─── Content ─────────────────────────────────────────────────────────────

/// What a hexagon refers to.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum HexContent {
    /// No content yet.
    #[default]
    Empty,
    /// Linked to a curriculum concept by ID.
    Concept(String),
    /// User-entered text.
    FreeText(String),
}

impl HexContent {
    pub fn concept_id(&self) -> Option<&str> {
        match self {
            HexContent::Concept(id) => Some(id.as_str()),
            _ => None,
        }
    }

    pub fn free_text(&self) -> Option<&str> {
        match self {
            HexContent::FreeText(text) => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn is_concept(&self) -> bool {
        matches!(self, HexContent::Concept(_))
    }
}

/// A concept handed over by the palette for placement on the canvas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConceptRef {
    pub concept_id: String,
    /// Human-readable name, used as the initial label.
    #[serde(default)]
    pub title: Option<String>,
}

// ─── Hexagon ─────────────────────────────────────────────────────────────

/// A placeable unit on the canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct Hexagon {
    pub id: HexId,
    /// Centre, in world space.
    pub position: Point,
    /// Size in pixels. Always positive.
    pub size: f64,
    pub label: Option<String>,
    pub content: HexContent,
    pub settings: Settings,
    /// Loaded from the store (as opposed to created in this session).
    pub persisted: bool,
}

impl Hexagon {
    pub fn new(id: HexId, position: Point) -> Self {
        Self {
            id,
            position,
            size: HEX_UNIT_PX,
            label: None,
            content: HexContent::Empty,
            settings: Settings::new(),
            persisted: false,
        }
    }

    /// Text to draw: the label, else the free text, else the concept ID.
    pub fn display_text(&self) -> &str {
        if let Some(label) = self.label.as_deref() {
            return label;
        }
        match &self.content {
            HexContent::FreeText(text) => text.as_str(),
            HexContent::Concept(id) => id.as_str(),
            HexContent::Empty => PLACEHOLDER_TEXT,
        }
    }

    /// Commit a new display text. Free-text hexagons keep their text in sync
    /// with the label; concept links are left alone.
    pub fn apply_label(&mut self, text: String) {
        if !self.content.is_concept() {
            self.content = HexContent::FreeText(text.clone());
        }
        self.label = Some(text);
    }
}

/// Everything needed to create a hexagon; unset fields get defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HexSpec {
    pub position: Option<Point>,
    pub size: Option<f64>,
    pub label: Option<String>,
    pub content: HexContent,
    pub settings: Settings,
}

impl HexSpec {
    /// A free-text hexagon whose label and text are `text`.
    pub fn free_text(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            label: Some(text.clone()),
            content: HexContent::FreeText(text),
            ..Self::default()
        }
    }

    /// A hexagon linked to a palette concept.
    pub fn concept(concept: &ConceptRef) -> Self {
        Self {
            label: concept.title.clone(),
            content: HexContent::Concept(concept.concept_id.clone()),
            ..Self::default()
        }
    }

    pub fn at(mut self, position: Point) -> Self {
        self.position = Some(position);
        self
    }

    pub fn sized(mut self, size: f64) -> Self {
        self.size = Some(size);
        self
    }
}

// ─── Connection ──────────────────────────────────────────────────────────

/// A directed link between two distinct hexagons.
#[derive(Debug, Clone, PartialEq)]
pub struct Connection {
    pub id: EdgeId,
    pub from: HexId,
    pub to: HexId,
    pub label: Option<String>,
    pub persisted: bool,
}

impl Connection {
    pub fn touches(&self, id: HexId) -> bool {
        self.from == id || self.to == id
    }
}

// ─── Planner metadata ────────────────────────────────────────────────────

/// Planner-level fields that the canvas does not edit but must send back.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlannerMeta {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub metadata: Settings,
}

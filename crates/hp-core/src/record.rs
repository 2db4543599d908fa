//! Persistence records: the shapes exchanged with the planner store.
//!
//! Records arrive as loosely-typed JSON, so everything is validated here,
//! at the boundary, before it reaches the [`GraphStore`]:
//!
//! | Field | Missing / not a number | Policy |
//! |---|---|---|
//! | `x` | yes | `index × spacing` (default 120) |
//! | `y` | yes | `0` |
//! | `size` | yes | one unit |
//! | `concept_id` + `free_text` | both set | concept wins, free text dropped |
//! | connection endpoints | missing or equal | connection dropped |
//!
//! Every dropped or rewritten field is reported as a [`LoadIssue`].
//!
//! On the way out, entities loaded from the store keep their `id` so the
//! store can replace by ID; entities created in this session carry only a
//! `client_id`, which connections use to refer to them until the store
//! assigns real IDs.

use crate::error::{HexError, HexResult};
use crate::geometry::{DEFAULT_SPACING, px_to_units, units_to_px};
use crate::graph::{GraphSnapshot, GraphStore};
use crate::id::{EdgeId, HexId};
use crate::model::{Connection, HexContent, Hexagon, PlannerMeta, Settings};
use kurbo::Point;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// ─── Lenient field decoding ──────────────────────────────────────────────

fn lenient_number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    let value = Option::<Value>::deserialize(d)?;
    Ok(value.and_then(|v| v.as_f64()).filter(|n| n.is_finite()))
}

fn lenient_object<'de, D: Deserializer<'de>>(d: D) -> Result<Settings, D::Error> {
    match Option::<Value>::deserialize(d)? {
        Some(Value::Object(map)) => Ok(map),
        _ => Ok(Settings::new()),
    }
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.filter(|s| !s.trim().is_empty())
}

// ─── Load contract ───────────────────────────────────────────────────────

/// A planner as returned by the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlannerRecord {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_object")]
    pub metadata: Settings,
    #[serde(default)]
    pub hexagons: Vec<HexagonRecord>,
    #[serde(default)]
    pub connections: Vec<ConnectionRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HexagonRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub x: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub y: Option<f64>,
    /// Size in units (see [`crate::geometry::HEX_UNIT_PX`]).
    #[serde(default, deserialize_with = "lenient_number")]
    pub size: Option<f64>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub concept_id: Option<String>,
    #[serde(default)]
    pub free_text: Option<String>,
    #[serde(default, deserialize_with = "lenient_object")]
    pub settings: Settings,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConnectionRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub from_hexagon_id: Option<String>,
    #[serde(default)]
    pub to_hexagon_id: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
}

/// Something the boundary had to drop or rewrite while loading.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadIssue {
    /// A hexagon record had no ID and was given a session-local one.
    MintedHexagonId { assigned: HexId },
    /// A hexagon record repeated an earlier ID and was skipped.
    DuplicateHexagon { id: String },
    /// A hexagon had both a concept link and free text; the text was dropped.
    DroppedFreeText { id: HexId, text: String },
    /// A connection record was rejected.
    DroppedConnection { id: Option<String>, reason: HexError },
}

/// Result of validating a [`PlannerRecord`].
#[derive(Debug, Clone)]
pub struct LoadedPlanner {
    pub meta: PlannerMeta,
    pub graph: GraphStore,
    pub issues: Vec<LoadIssue>,
}

impl PlannerRecord {
    /// Parse a record from the store's JSON body.
    pub fn from_json(json: &str) -> HexResult<Self> {
        serde_json::from_str(json).map_err(|e| HexError::InvalidRecord(e.to_string()))
    }

    pub fn meta(&self) -> PlannerMeta {
        PlannerMeta {
            id: self.id.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            metadata: self.metadata.clone(),
        }
    }

    /// Validate every hexagon and connection and build the graph store.
    pub fn into_planner(self) -> HexResult<LoadedPlanner> {
        self.into_planner_with(DEFAULT_SPACING)
    }

    /// As [`into_planner`](Self::into_planner), placing hexagons without an
    /// `x` at `index × spacing`.
    pub fn into_planner_with(self, spacing: f64) -> HexResult<LoadedPlanner> {
        if self.id.trim().is_empty() {
            return Err(HexError::InvalidRecord("planner id is empty".into()));
        }
        let meta = self.meta();
        let mut graph = GraphStore::with_spacing(spacing);
        let mut issues = Vec::new();

        for (index, record) in self.hexagons.into_iter().enumerate() {
            let hex = record.into_hexagon(index, &graph, &mut issues);
            let id = hex.id;
            if let Err(HexError::DuplicateId(dup)) = graph.insert_hexagon(hex) {
                log::warn!("planner {}: skipping duplicate hexagon {dup}", meta.id);
                issues.push(LoadIssue::DuplicateHexagon { id: dup });
            } else {
                log::trace!("loaded hexagon {id:?}");
            }
        }

        for record in self.connections {
            let id = non_empty(record.id.clone());
            if let Err(reason) = record.into_connection(&mut graph) {
                log::warn!("planner {}: dropping connection {id:?}: {reason}", meta.id);
                issues.push(LoadIssue::DroppedConnection { id, reason });
            }
        }

        log::info!(
            "loaded planner {}: {} hexagons, {} connections, {} issues",
            meta.id,
            graph.hexagon_count(),
            graph.connection_count(),
            issues.len()
        );
        Ok(LoadedPlanner {
            meta,
            graph,
            issues,
        })
    }
}

impl HexagonRecord {
    fn into_hexagon(
        self,
        index: usize,
        graph: &GraphStore,
        issues: &mut Vec<LoadIssue>,
    ) -> Hexagon {
        let (id, persisted) = match non_empty(self.id) {
            Some(id) => (HexId::intern(&id), true),
            None => {
                let mut id = HexId::fresh();
                while graph.contains(id) {
                    id = HexId::fresh();
                }
                issues.push(LoadIssue::MintedHexagonId { assigned: id });
                (id, false)
            }
        };

        let fallback = graph.default_position(index);
        let position = Point::new(self.x.unwrap_or(fallback.x), self.y.unwrap_or(0.0));
        let size = units_to_px(self.size.filter(|s| *s > 0.0).unwrap_or(1.0));

        let content = match (non_empty(self.concept_id), self.free_text) {
            (Some(concept), text) => {
                if let Some(text) = non_empty(text) {
                    log::warn!("hexagon {id:?} has both concept and free text; keeping concept");
                    issues.push(LoadIssue::DroppedFreeText { id, text });
                }
                HexContent::Concept(concept)
            }
            (None, Some(text)) => HexContent::FreeText(text),
            (None, None) => HexContent::Empty,
        };

        Hexagon {
            id,
            position,
            size,
            label: self.label,
            content,
            settings: self.settings,
            persisted,
        }
    }
}

impl ConnectionRecord {
    fn into_connection(self, graph: &mut GraphStore) -> HexResult<()> {
        let from = non_empty(self.from_hexagon_id)
            .ok_or_else(|| HexError::InvalidRecord("connection without from_hexagon_id".into()))?;
        let to = non_empty(self.to_hexagon_id)
            .ok_or_else(|| HexError::InvalidRecord("connection without to_hexagon_id".into()))?;
        let (from, to) = (HexId::intern(&from), HexId::intern(&to));

        match non_empty(self.id) {
            Some(id) => graph.insert_connection(Connection {
                id: EdgeId::intern(&id),
                from,
                to,
                label: self.label,
                persisted: true,
            }),
            None => graph.add_edge(from, to, self.label).map(|_| ()),
        }
    }
}

// ─── Save contract ───────────────────────────────────────────────────────

/// The body sent to the store on save.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SavePayload {
    pub title: Option<String>,
    pub description: Option<String>,
    pub metadata: Settings,
    pub hexagons: Vec<HexagonPayload>,
    pub connections: Vec<ConnectionPayload>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HexagonPayload {
    /// Present only for hexagons loaded from the store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Present only for hexagons created in this session.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    pub x: f64,
    pub y: f64,
    /// Size in units.
    pub size: f64,
    pub label: Option<String>,
    pub concept_id: Option<String>,
    pub free_text: Option<String>,
    pub settings: Settings,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConnectionPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    /// Store ID of a persisted hexagon, or `client_id` of a new one.
    pub from_hexagon_id: String,
    pub to_hexagon_id: String,
    pub label: Option<String>,
}

fn split_id(key: &str, persisted: bool) -> (Option<String>, Option<String>) {
    if persisted {
        (Some(key.to_string()), None)
    } else {
        (None, Some(key.to_string()))
    }
}

impl From<&Hexagon> for HexagonPayload {
    fn from(hex: &Hexagon) -> Self {
        let (id, client_id) = split_id(hex.id.as_str(), hex.persisted);
        Self {
            id,
            client_id,
            x: hex.position.x,
            y: hex.position.y,
            size: px_to_units(hex.size),
            label: hex.label.clone(),
            concept_id: hex.content.concept_id().map(str::to_string),
            free_text: hex.content.free_text().map(str::to_string),
            settings: hex.settings.clone(),
        }
    }
}

impl From<&Connection> for ConnectionPayload {
    fn from(conn: &Connection) -> Self {
        let (id, client_id) = split_id(conn.id.as_str(), conn.persisted);
        Self {
            id,
            client_id,
            from_hexagon_id: conn.from.as_str().to_string(),
            to_hexagon_id: conn.to.as_str().to_string(),
            label: conn.label.clone(),
        }
    }
}

impl SavePayload {
    pub fn from_snapshot(meta: &PlannerMeta, snapshot: &GraphSnapshot) -> Self {
        Self {
            title: meta.title.clone(),
            description: meta.description.clone(),
            metadata: meta.metadata.clone(),
            hexagons: snapshot.hexagons.iter().map(HexagonPayload::from).collect(),
            connections: snapshot
                .connections
                .iter()
                .map(ConnectionPayload::from)
                .collect(),
        }
    }

    pub fn from_graph(meta: &PlannerMeta, graph: &GraphStore) -> Self {
        Self::from_snapshot(meta, &graph.snapshot())
    }

    pub fn to_json(&self) -> HexResult<String> {
        serde_json::to_string(self).map_err(|e| HexError::InvalidRecord(e.to_string()))
    }
}

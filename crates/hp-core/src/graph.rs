//! In-memory graph store for one planner.
//!
//! Hexagons are graph nodes and connections are directed graph edges in a
//! `StableDiGraph`, so removing a hexagon drops every connection touching it
//! in the same call. Two ID indexes give O(1) lookup, and explicit order
//! vectors keep iteration in insertion order (petgraph reuses vacant slots,
//! so index order alone would not be stable).

use crate::error::{EndpointProblem, HexError, HexResult};
use crate::geometry::{DEFAULT_SPACING, HEX_UNIT_PX};
use crate::id::{EdgeId, HexId};
use crate::model::{Connection, HexSpec, Hexagon};
use kurbo::Point;
use petgraph::Direction;
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;
use smallvec::SmallVec;
use std::collections::HashMap;

/// Owned, read-only copy of the graph for rendering and saving.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GraphSnapshot {
    /// Hexagons in insertion order (last = topmost).
    pub hexagons: Vec<Hexagon>,
    pub connections: Vec<Connection>,
}

impl GraphSnapshot {
    pub fn hexagon(&self, id: HexId) -> Option<&Hexagon> {
        self.hexagons.iter().find(|h| h.id == id)
    }

    pub fn connection(&self, id: EdgeId) -> Option<&Connection> {
        self.connections.iter().find(|c| c.id == id)
    }
}

#[derive(Debug, Clone)]
pub struct GraphStore {
    graph: StableDiGraph<Hexagon, Connection>,
    hex_index: HashMap<HexId, NodeIndex>,
    edge_index: HashMap<EdgeId, EdgeIndex>,
    hex_order: Vec<HexId>,
    edge_order: Vec<EdgeId>,
    /// Row spacing for synthesized positions.
    spacing: f64,
}

impl Default for GraphStore {
    fn default() -> Self {
        Self::with_spacing(DEFAULT_SPACING)
    }
}

impl GraphStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty store that lays out unpositioned hexagons `spacing` apart.
    /// Non-positive or non-finite spacing falls back to the default.
    #[must_use]
    pub fn with_spacing(spacing: f64) -> Self {
        Self {
            graph: StableDiGraph::default(),
            hex_index: HashMap::new(),
            edge_index: HashMap::new(),
            hex_order: Vec::new(),
            edge_order: Vec::new(),
            spacing: if spacing.is_finite() && spacing > 0.0 {
                spacing
            } else {
                DEFAULT_SPACING
            },
        }
    }

    pub fn spacing(&self) -> f64 {
        self.spacing
    }

    // ─── Hexagons ────────────────────────────────────────────────────────

    /// Create a hexagon with a fresh ID. Missing size defaults to one unit;
    /// missing position to `(count × spacing, 0)`.
    pub fn add_node(&mut self, spec: HexSpec) -> &Hexagon {
        let mut id = HexId::fresh();
        while self.hex_index.contains_key(&id) {
            id = HexId::fresh();
        }
        let position = spec
            .position
            .filter(|p| p.is_finite())
            .unwrap_or_else(|| self.default_position(self.hex_order.len()));
        let size = spec
            .size
            .filter(|s| s.is_finite() && *s > 0.0)
            .unwrap_or(HEX_UNIT_PX);

        let hex = Hexagon {
            id,
            position,
            size,
            label: spec.label,
            content: spec.content,
            settings: spec.settings,
            persisted: false,
        };
        log::trace!("add hexagon {id:?} at {position:?}");
        let idx = self.push_hexagon(hex);
        &self.graph[idx]
    }

    /// Insert a hexagon that already has an ID (the load path).
    pub fn insert_hexagon(&mut self, hex: Hexagon) -> HexResult<()> {
        if self.hex_index.contains_key(&hex.id) {
            return Err(HexError::DuplicateId(hex.id.to_string()));
        }
        self.push_hexagon(hex);
        Ok(())
    }

    fn push_hexagon(&mut self, hex: Hexagon) -> NodeIndex {
        let id = hex.id;
        let idx = self.graph.add_node(hex);
        self.hex_index.insert(id, idx);
        self.hex_order.push(id);
        idx
    }

    /// Position used when none was given: a row along the x axis.
    pub fn default_position(&self, index: usize) -> Point {
        Point::new(index as f64 * self.spacing, 0.0)
    }

    /// Remove a hexagon and every connection touching it. Absent IDs are a
    /// no-op.
    pub fn remove_node(&mut self, id: HexId) -> Option<Hexagon> {
        let idx = self.hex_index.remove(&id)?;
        let touching = self.incident_edges(idx);
        for edge_id in &touching {
            self.edge_index.remove(edge_id);
        }
        self.edge_order.retain(|e| !touching.contains(e));
        self.hex_order.retain(|h| *h != id);
        log::trace!("remove hexagon {id:?} (+{} connections)", touching.len());
        // StableGraph drops incident edges along with the node.
        self.graph.remove_node(idx)
    }

    /// Overwrite a hexagon's world position. No clamping.
    pub fn move_node(&mut self, id: HexId, position: Point) -> HexResult<()> {
        let hex = self
            .hexagon_mut(id)
            .ok_or_else(|| HexError::NotFound(id.to_string()))?;
        hex.position = position;
        Ok(())
    }

    /// Commit a new display label (see [`Hexagon::apply_label`]).
    pub fn set_label(&mut self, id: HexId, text: String) -> HexResult<()> {
        let hex = self
            .hexagon_mut(id)
            .ok_or_else(|| HexError::NotFound(id.to_string()))?;
        hex.apply_label(text);
        Ok(())
    }

    pub fn hexagon(&self, id: HexId) -> Option<&Hexagon> {
        self.hex_index.get(&id).map(|idx| &self.graph[*idx])
    }

    fn hexagon_mut(&mut self, id: HexId) -> Option<&mut Hexagon> {
        self.hex_index
            .get(&id)
            .copied()
            .map(|idx| &mut self.graph[idx])
    }

    pub fn contains(&self, id: HexId) -> bool {
        self.hex_index.contains_key(&id)
    }

    /// Hexagons in insertion order.
    pub fn hexagons(&self) -> impl DoubleEndedIterator<Item = &Hexagon> + '_ {
        self.hex_order
            .iter()
            .filter_map(|id| self.hex_index.get(id))
            .map(|idx| &self.graph[*idx])
    }

    pub fn hexagon_count(&self) -> usize {
        self.hex_order.len()
    }

    // ─── Connections ─────────────────────────────────────────────────────

    /// Connect two distinct, existing hexagons. Duplicates between the same
    /// pair are allowed.
    pub fn add_edge(
        &mut self,
        from: HexId,
        to: HexId,
        label: Option<String>,
    ) -> HexResult<&Connection> {
        let (a, b) = self.check_endpoints(from, to)?;
        let mut id = EdgeId::fresh();
        while self.edge_index.contains_key(&id) {
            id = EdgeId::fresh();
        }
        let conn = Connection {
            id,
            from,
            to,
            label,
            persisted: false,
        };
        log::trace!("connect {from:?} -> {to:?} as {id:?}");
        let idx = self.push_connection(a, b, conn);
        Ok(&self.graph[idx])
    }

    /// Insert a connection that already has an ID (the load path). Endpoints
    /// are validated exactly as in [`GraphStore::add_edge`].
    pub fn insert_connection(&mut self, conn: Connection) -> HexResult<()> {
        if self.edge_index.contains_key(&conn.id) {
            return Err(HexError::DuplicateId(conn.id.to_string()));
        }
        let (a, b) = self.check_endpoints(conn.from, conn.to)?;
        self.push_connection(a, b, conn);
        Ok(())
    }

    fn check_endpoints(&self, from: HexId, to: HexId) -> HexResult<(NodeIndex, NodeIndex)> {
        let invalid = |problem| HexError::InvalidEndpoint {
            from: from.to_string(),
            to: to.to_string(),
            problem,
        };
        let a = *self
            .hex_index
            .get(&from)
            .ok_or_else(|| invalid(EndpointProblem::MissingSource))?;
        let b = *self
            .hex_index
            .get(&to)
            .ok_or_else(|| invalid(EndpointProblem::MissingTarget))?;
        if from == to {
            return Err(invalid(EndpointProblem::SelfLoop));
        }
        Ok((a, b))
    }

    fn push_connection(&mut self, a: NodeIndex, b: NodeIndex, conn: Connection) -> EdgeIndex {
        let id = conn.id;
        let idx = self.graph.add_edge(a, b, conn);
        self.edge_index.insert(id, idx);
        self.edge_order.push(id);
        idx
    }

    /// Remove a connection. Absent IDs are a no-op.
    pub fn remove_edge(&mut self, id: EdgeId) -> Option<Connection> {
        let idx = self.edge_index.remove(&id)?;
        self.edge_order.retain(|e| *e != id);
        self.graph.remove_edge(idx)
    }

    pub fn connection(&self, id: EdgeId) -> Option<&Connection> {
        self.edge_index.get(&id).map(|idx| &self.graph[*idx])
    }

    /// Connections in insertion order.
    pub fn connections(&self) -> impl Iterator<Item = &Connection> + '_ {
        self.edge_order
            .iter()
            .filter_map(|id| self.edge_index.get(id))
            .map(|idx| &self.graph[*idx])
    }

    pub fn connection_count(&self) -> usize {
        self.edge_order.len()
    }

    /// IDs of every connection that starts or ends at `id`.
    pub fn edges_touching(&self, id: HexId) -> SmallVec<[EdgeId; 4]> {
        self.hex_index
            .get(&id)
            .map(|idx| self.incident_edges(*idx))
            .unwrap_or_default()
    }

    fn incident_edges(&self, idx: NodeIndex) -> SmallVec<[EdgeId; 4]> {
        self.graph
            .edges_directed(idx, Direction::Outgoing)
            .chain(self.graph.edges_directed(idx, Direction::Incoming))
            .map(|e| e.weight().id)
            .collect()
    }

    // ─── Whole-graph views ───────────────────────────────────────────────

    /// Copy out the current state. Always reflects the latest mutation.
    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot {
            hexagons: self.hexagons().cloned().collect(),
            connections: self.connections().cloned().collect(),
        }
    }
}

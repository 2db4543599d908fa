//! Render-ready scene snapshot.
//!
//! Projects the graph through the view transform into screen-space sprites.
//! The host draws these however it likes; nothing here depends on a
//! rendering backend.

use crate::hit::{connection_handle_rect, delete_badge_rect};
use hp_core::geometry::{hexagon_outline, hexagon_radius};
use hp_core::{EdgeId, GraphStore, HexId, ViewTransform};
use kurbo::{Point, Rect, Vec2};
use serde::Serialize;

/// Per-frame flags that are not part of the graph.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SceneOverlay {
    /// Connect-mode source hexagon.
    pub connect_source: Option<HexId>,
    /// Hexagon under an active drag.
    pub dragging: Option<HexId>,
    /// Draw delete badges (off in read-only mode).
    pub delete_badges: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HexSprite {
    pub id: HexId,
    /// Screen-space centre.
    pub center: Point,
    /// Screen-space vertices.
    pub outline: [Point; 6],
    pub text: String,
    pub concept_linked: bool,
    pub connect_source: bool,
    pub dragging: bool,
    /// Screen-space delete badge, when badges are shown.
    pub delete_badge: Option<Rect>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectorSprite {
    pub id: EdgeId,
    pub from: Point,
    pub to: Point,
    /// Screen-space tap target at the midpoint.
    pub handle: Rect,
    pub label: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Scene {
    /// Drawn first.
    pub connections: Vec<ConnectorSprite>,
    /// Drawn in order over the connections.
    pub hexagons: Vec<HexSprite>,
    pub zoom: f64,
    pub offset: Vec2,
}

impl Scene {
    pub fn hexagon(&self, id: HexId) -> Option<&HexSprite> {
        self.hexagons.iter().find(|h| h.id == id)
    }
}

/// Build the scene for the current graph and view.
pub fn build_scene(graph: &GraphStore, view: &ViewTransform, overlay: &SceneOverlay) -> Scene {
    let m = view.world_to_screen();

    let connections = graph
        .connections()
        .filter_map(|conn| {
            let a = graph.hexagon(conn.from)?;
            let b = graph.hexagon(conn.to)?;
            Some(ConnectorSprite {
                id: conn.id,
                from: m * a.position,
                to: m * b.position,
                handle: m.transform_rect_bbox(connection_handle_rect(a.position, b.position)),
                label: conn.label.clone(),
            })
        })
        .collect();

    let hexagons = graph
        .hexagons()
        .map(|hex| {
            let outline = hexagon_outline(hex.position, hexagon_radius(hex.size)).map(|p| m * p);
            HexSprite {
                id: hex.id,
                center: m * hex.position,
                outline,
                text: hex.display_text().to_string(),
                concept_linked: hex.content.is_concept(),
                connect_source: overlay.connect_source == Some(hex.id),
                dragging: overlay.dragging == Some(hex.id),
                delete_badge: overlay
                    .delete_badges
                    .then(|| m.transform_rect_bbox(delete_badge_rect(hex))),
            }
        })
        .collect();

    let scene = Scene {
        connections,
        hexagons,
        zoom: view.zoom,
        offset: view.offset,
    };
    log::trace!(
        "scene: {} hexagons, {} connections, zoom {:.2}",
        scene.hexagons.len(),
        scene.connections.len(),
        scene.zoom
    );
    scene
}

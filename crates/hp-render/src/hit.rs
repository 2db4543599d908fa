//! Hit testing: screen point → canvas target.
//!
//! Walks the paint order in reverse (front-to-back). Hexagons are painted
//! after connections and in insertion order, each followed by its delete
//! badge, so the topmost candidate is the last hexagon's badge and the
//! bottom-most is a connection's midpoint handle.

use hp_core::geometry::{hexagon_radius, point_in_hexagon, to_world};
use hp_core::{EdgeId, GraphStore, HexId, Hexagon, ViewTransform};
use kurbo::{Point, Rect};

/// Delete badge size, world units.
pub const DELETE_BADGE_WIDTH: f64 = 24.0;
pub const DELETE_BADGE_HEIGHT: f64 = 18.0;
/// Side of the square tap target at a connection's midpoint.
pub const CONNECTION_HANDLE_SIZE: f64 = 36.0;

/// What a pointer landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    Hexagon(HexId),
    /// The small delete button in a hexagon's top-right corner.
    DeleteBadge(HexId),
    /// The tap target at a connection's midpoint.
    Connection(EdgeId),
    Background,
}

/// Delete badge rectangle for a hexagon, in world space.
pub fn delete_badge_rect(hex: &Hexagon) -> Rect {
    let r = hexagon_radius(hex.size);
    let x0 = hex.position.x + r - DELETE_BADGE_WIDTH / 2.0;
    let y0 = hex.position.y - r;
    Rect::new(x0, y0, x0 + DELETE_BADGE_WIDTH, y0 + DELETE_BADGE_HEIGHT)
}

/// Midpoint tap target for a connection, in world space.
pub fn connection_handle_rect(from: Point, to: Point) -> Rect {
    Rect::from_center_size(from.midpoint(to), (CONNECTION_HANDLE_SIZE, CONNECTION_HANDLE_SIZE))
}

/// Find the topmost target under the screen point.
///
/// Badges are only considered when `with_badges` is set (they are not drawn
/// in read-only mode).
pub fn hit_test(
    graph: &GraphStore,
    view: &ViewTransform,
    screen: Point,
    with_badges: bool,
) -> HitTarget {
    let world = to_world(screen, view);

    for hex in graph.hexagons().rev() {
        if with_badges && delete_badge_rect(hex).contains(world) {
            return HitTarget::DeleteBadge(hex.id);
        }
        if point_in_hexagon(world, hex.position, hexagon_radius(hex.size)) {
            return HitTarget::Hexagon(hex.id);
        }
    }

    let handles: Vec<_> = graph.connections().collect();
    for conn in handles.into_iter().rev() {
        let (Some(a), Some(b)) = (graph.hexagon(conn.from), graph.hexagon(conn.to)) else {
            continue;
        };
        if connection_handle_rect(a.position, b.position).contains(world) {
            return HitTarget::Connection(conn.id);
        }
    }

    HitTarget::Background
}

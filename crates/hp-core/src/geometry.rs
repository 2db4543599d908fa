//! Coordinate spaces and hexagon geometry.
//!
//! Three spaces are involved:
//!
//! - **screen**: pointer coordinates as delivered by the host (client pixels).
//! - **view**: the canvas element's own coordinate system. The host supplies
//!   the view → screen matrix as [`ViewTransform::base`] (identity when the
//!   canvas sits at the page origin with no CSS scaling).
//! - **world**: where hexagon positions are stored, independent of pan/zoom.
//!
//! The forward mapping is `screen = base · scale(zoom) · translate(offset) · world`.
//! `to_world` applies the exact matrix inverse of that product, so the two
//! directions round-trip up to floating-point error.

use kurbo::{Affine, Point, Vec2};
use serde::{Deserialize, Serialize};

/// Pixel size of one stored hexagon size unit.
pub const HEX_UNIT_PX: f64 = 48.0;
/// Smallest on-canvas hexagon size, in pixels.
pub const MIN_HEX_PX: f64 = 36.0;
/// Drawn radius as a fraction of a hexagon's size.
pub const HEX_RADIUS_RATIO: f64 = 0.9;
/// Horizontal spacing used when a position has to be synthesized.
pub const DEFAULT_SPACING: f64 = 120.0;

/// Inclusive bounds for the zoom factor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomLimits {
    pub min: f64,
    pub max: f64,
}

impl Default for ZoomLimits {
    fn default() -> Self {
        Self { min: 0.25, max: 4.0 }
    }
}

impl ZoomLimits {
    /// Clamp `zoom` into the limits. Total for any bounds: a NaN or
    /// non-positive bound is ignored and inverted bounds are swapped.
    pub fn clamp(&self, zoom: f64) -> f64 {
        let usable = |b: f64| (b > 0.0).then_some(b);
        let lo = usable(self.min).unwrap_or(f64::MIN_POSITIVE);
        let hi = usable(self.max).unwrap_or(f64::INFINITY);
        let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
        zoom.clamp(lo, hi)
    }
}

/// Session-local camera state. Never persisted with the planner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    /// View → screen matrix of the canvas element.
    pub base: Affine,
    /// Uniform zoom factor applied before the base matrix.
    pub zoom: f64,
    /// Pan offset, in world units.
    pub offset: Vec2,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            base: Affine::IDENTITY,
            zoom: 1.0,
            offset: Vec2::ZERO,
        }
    }
}

impl ViewTransform {
    /// A view with identity base and zoom, panned by `offset`.
    pub fn panned(offset: Vec2) -> Self {
        Self {
            offset,
            ..Self::default()
        }
    }

    /// Replace the view → screen matrix. Singular matrices are rejected and
    /// leave the transform unchanged.
    pub fn set_base(&mut self, base: Affine) -> bool {
        let det = base.determinant();
        if !det.is_finite() || det.abs() < f64::EPSILON {
            log::debug!("rejecting singular view base {base:?}");
            return false;
        }
        self.base = base;
        true
    }

    /// The full world → screen matrix.
    pub fn world_to_screen(&self) -> Affine {
        self.lens() * Affine::translate(self.offset)
    }

    /// The full screen → world matrix.
    pub fn screen_to_world(&self) -> Affine {
        self.world_to_screen().inverse()
    }

    /// Base and zoom without the pan offset.
    fn lens(&self) -> Affine {
        self.base * Affine::scale(self.zoom)
    }

    /// Pan so that the world point under `from` ends up under `to`.
    ///
    /// With identity base and zoom 1 this is exactly `offset += to - from`.
    pub fn pan(&mut self, from: Point, to: Point) {
        let inv = self.lens().inverse();
        self.offset += (inv * to) - (inv * from);
    }

    /// Scale by `factor` about a screen-space anchor, keeping the world point
    /// under the anchor fixed. Returns `false` when the clamped zoom is
    /// unchanged.
    pub fn zoom_at(&mut self, anchor: Point, factor: f64, limits: ZoomLimits) -> bool {
        if !factor.is_finite() || factor <= 0.0 {
            return false;
        }
        let zoom = limits.clamp(self.zoom * factor);
        if (zoom - self.zoom).abs() < f64::EPSILON {
            return false;
        }
        let pinned = to_world(anchor, self);
        self.zoom = zoom;
        let view = (self.base * Affine::scale(zoom)).inverse() * anchor;
        self.offset = view - pinned;
        true
    }

    /// Back to origin and unit zoom. The base matrix belongs to the host and
    /// is kept.
    pub fn reset(&mut self) {
        self.zoom = 1.0;
        self.offset = Vec2::ZERO;
    }
}

/// Map a screen point into world space.
pub fn to_world(screen: Point, view: &ViewTransform) -> Point {
    view.screen_to_world() * screen
}

/// Map a world point onto the screen.
pub fn to_screen(world: Point, view: &ViewTransform) -> Point {
    view.world_to_screen() * world
}

/// Hexagon vertices at 60° steps starting from -30°.
pub fn hexagon_outline(center: Point, radius: f64) -> [Point; 6] {
    std::array::from_fn(|i| {
        let angle = (60.0 * i as f64 - 30.0).to_radians();
        Point::new(
            center.x + radius * angle.cos(),
            center.y + radius * angle.sin(),
        )
    })
}

/// Whether `p` lies inside (or on the edge of) the hexagon.
pub fn point_in_hexagon(p: Point, center: Point, radius: f64) -> bool {
    if (p - center).hypot() > radius {
        return false;
    }
    let outline = hexagon_outline(center, radius);
    let mut sign = 0.0_f64;
    for i in 0..outline.len() {
        let a = outline[i];
        let b = outline[(i + 1) % outline.len()];
        let cross = (b - a).cross(p - a);
        if cross.abs() < 1e-9 {
            continue;
        }
        if sign == 0.0 {
            sign = cross.signum();
        } else if cross.signum() != sign {
            return false;
        }
    }
    true
}

/// Drawn radius for a hexagon of `size` pixels.
pub fn hexagon_radius(size: f64) -> f64 {
    size * HEX_RADIUS_RATIO
}

/// Stored size units → on-canvas pixels.
pub fn units_to_px(units: f64) -> f64 {
    (units * HEX_UNIT_PX).max(MIN_HEX_PX)
}

/// On-canvas pixels → stored size units (at least one).
pub fn px_to_units(px: f64) -> f64 {
    (px / HEX_UNIT_PX).round().max(1.0)
}

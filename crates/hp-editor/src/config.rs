//! Editor configuration handed over by the shell at mount.

use hp_core::geometry::{DEFAULT_SPACING, HEX_UNIT_PX};
use hp_core::{HexError, HexResult, ZoomLimits};
use kurbo::Point;
use serde::Deserialize;

/// Canvas element size in view pixels.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
        }
    }
}

impl Viewport {
    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// View-only mode: pan and zoom, nothing else.
    pub read_only: bool,
    pub viewport: Viewport,
    /// Size of newly created hexagons, pixels.
    pub hex_size: f64,
    /// Spacing of synthesized positions.
    pub default_spacing: f64,
    /// A press-release that moves less than this (screen pixels) is a click.
    pub click_slop: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Factor applied per zoom shortcut.
    pub zoom_step: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        let limits = ZoomLimits::default();
        Self {
            read_only: false,
            viewport: Viewport::default(),
            hex_size: HEX_UNIT_PX,
            default_spacing: DEFAULT_SPACING,
            click_slop: 4.0,
            min_zoom: limits.min,
            max_zoom: limits.max,
            zoom_step: 1.2,
        }
    }
}

impl EditorConfig {
    /// Parse the shell's JSON config. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> HexResult<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| HexError::InvalidRecord(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn read_only() -> Self {
        Self {
            read_only: true,
            ..Self::default()
        }
    }

    pub fn zoom_limits(&self) -> ZoomLimits {
        ZoomLimits {
            min: self.min_zoom,
            max: self.max_zoom,
        }
    }

    fn validate(&self) -> HexResult<()> {
        let positive = |v: f64| v.is_finite() && v > 0.0;
        if !positive(self.hex_size) || !positive(self.default_spacing) {
            return Err(HexError::InvalidRecord(
                "hex_size and default_spacing must be positive".into(),
            ));
        }
        if !positive(self.min_zoom) || !positive(self.max_zoom) || self.min_zoom > self.max_zoom {
            return Err(HexError::InvalidRecord(format!(
                "bad zoom range {}..{}",
                self.min_zoom, self.max_zoom
            )));
        }
        if !positive(self.zoom_step) || !(self.click_slop.is_finite() && self.click_slop >= 0.0) {
            return Err(HexError::InvalidRecord("bad zoom_step or click_slop".into()));
        }
        Ok(())
    }
}

//! Input abstraction layer.
//!
//! Normalizes mouse, touch, and pen events from the host into a single
//! `InputEvent` enum consumed by the interaction state machine. Coordinates
//! are screen space (client pixels).

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// A normalized input event from any pointing device or the keyboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputEvent {
    /// Pointer pressed (mouse down, touch start, pen contact).
    PointerDown { x: f64, y: f64 },

    /// Pointer moved, pressed or not.
    PointerMove { x: f64, y: f64 },

    /// Pointer released.
    PointerUp { x: f64, y: f64 },

    /// The host lost the pointer (touch cancel, capture lost).
    PointerCancel,

    /// Pointer left the canvas element.
    PointerLeave,

    /// Wheel or pinch zoom about a screen anchor.
    Scroll {
        x: f64,
        y: f64,
        /// Zoom factor (1.0 = no change; >1 = zoom in).
        zoom: f64,
    },

    /// Keyboard shortcut.
    Key {
        key: String,
        #[serde(default)]
        ctrl: bool,
        #[serde(default)]
        shift: bool,
        #[serde(default)]
        alt: bool,
        #[serde(default)]
        meta: bool,
    },
}

impl InputEvent {
    pub fn down(x: f64, y: f64) -> Self {
        Self::PointerDown { x, y }
    }

    pub fn moved(x: f64, y: f64) -> Self {
        Self::PointerMove { x, y }
    }

    pub fn up(x: f64, y: f64) -> Self {
        Self::PointerUp { x, y }
    }

    /// A key press without modifiers.
    pub fn key(key: impl Into<String>) -> Self {
        Self::Key {
            key: key.into(),
            ctrl: false,
            shift: false,
            alt: false,
            meta: false,
        }
    }

    /// Extract position if this is a positioned pointer event.
    pub fn position(&self) -> Option<Point> {
        match self {
            Self::PointerDown { x, y }
            | Self::PointerMove { x, y }
            | Self::PointerUp { x, y }
            | Self::Scroll { x, y, .. } => Some(Point::new(*x, *y)),
            _ => None,
        }
    }

    /// Up, cancel and leave all end a gesture.
    pub fn is_release(&self) -> bool {
        matches!(
            self,
            Self::PointerUp { .. } | Self::PointerCancel | Self::PointerLeave
        )
    }

    /// Whether the event carries non-finite coordinates.
    pub fn is_degenerate(&self) -> bool {
        self.position().is_some_and(|p| !p.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn releases() {
        assert!(InputEvent::up(1.0, 2.0).is_release());
        assert!(InputEvent::PointerCancel.is_release());
        assert!(InputEvent::PointerLeave.is_release());
        assert!(!InputEvent::moved(1.0, 2.0).is_release());
    }

    #[test]
    fn parses_host_json() {
        let ev: InputEvent = serde_json::from_str(r#"{"type":"pointer_down","x":3,"y":4}"#).unwrap();
        assert_eq!(ev, InputEvent::down(3.0, 4.0));
        assert_eq!(ev.position(), Some(Point::new(3.0, 4.0)));

        let key: InputEvent = serde_json::from_str(r#"{"type":"key","key":"s","meta":true}"#).unwrap();
        assert!(matches!(key, InputEvent::Key { meta: true, ctrl: false, .. }));
        assert_eq!(key.position(), None);
    }

    #[test]
    fn nan_is_degenerate() {
        assert!(InputEvent::moved(f64::NAN, 0.0).is_degenerate());
        assert!(!InputEvent::PointerCancel.is_degenerate());
    }
}

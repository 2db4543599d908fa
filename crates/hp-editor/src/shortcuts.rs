//! Keyboard shortcut mapping.
//!
//! Maps key + modifier combos to semantic `ShortcutAction`s. Lives in Rust so
//! the web shell and native tests resolve keys the same way.

/// Actions that keyboard shortcuts can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    // ── Edit ──
    ToggleConnect,
    AddHexagon,
    /// Handed back to the shell, which owns the save button.
    Save,

    // ── View ──
    ZoomIn,
    ZoomOut,
    ResetView,

    // ── UI ──
    /// Dismiss the open dialog, else disarm connect mode.
    Cancel,
}

/// Resolves key events into shortcut actions.
///
/// On macOS `meta` is ⌘; elsewhere `ctrl` serves the same role.
pub struct ShortcutMap;

impl ShortcutMap {
    /// `key` is the `KeyboardEvent.key` value (e.g. `"c"`, `"Escape"`).
    /// Returns `None` if the combo has no binding.
    pub fn resolve(
        key: &str,
        ctrl: bool,
        shift: bool,
        _alt: bool,
        meta: bool,
    ) -> Option<ShortcutAction> {
        let cmd = ctrl || meta;

        if cmd {
            return match key {
                "s" | "S" => Some(ShortcutAction::Save),
                "=" | "+" => Some(ShortcutAction::ZoomIn),
                "-" => Some(ShortcutAction::ZoomOut),
                _ => None,
            };
        }

        if shift {
            return None;
        }

        match key {
            "c" | "C" => Some(ShortcutAction::ToggleConnect),
            "n" | "N" => Some(ShortcutAction::AddHexagon),
            "0" => Some(ShortcutAction::ResetView),
            "Escape" => Some(ShortcutAction::Cancel),
            _ => None,
        }
    }
}

//! Modal request/response exchanges with the user.
//!
//! The session never blocks on the user. It parks a [`PendingDialog`], the
//! shell renders it, and the user's answer comes back through
//! `EditorSession::submit_label`, `confirm`, or `cancel`.

use hp_core::{EdgeId, HexId, Hexagon};
use serde::Serialize;

/// What a delete confirmation would remove.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum DeleteTarget {
    Hexagon(HexId),
    Connection(EdgeId),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "dialog", rename_all = "snake_case")]
pub enum PendingDialog {
    /// Label prompt, prefilled with `initial`.
    EditLabel { id: HexId, initial: String },
    /// Yes/no before deleting.
    ConfirmDelete { target: DeleteTarget },
}

impl PendingDialog {
    /// Prompt for a hexagon's label. Prefilled with the label, else the free
    /// text, else empty.
    pub fn edit_label(hex: &Hexagon) -> Self {
        let initial = hex
            .label
            .as_deref()
            .or_else(|| hex.content.free_text())
            .unwrap_or_default()
            .to_string();
        Self::EditLabel {
            id: hex.id,
            initial,
        }
    }

    pub fn confirm_delete(target: DeleteTarget) -> Self {
        Self::ConfirmDelete { target }
    }

    /// Text for the shell to show.
    pub fn message(&self) -> &'static str {
        match self {
            Self::EditLabel { .. } => "Edit hex label",
            Self::ConfirmDelete {
                target: DeleteTarget::Hexagon(_),
            } => "Delete hexagon?",
            Self::ConfirmDelete {
                target: DeleteTarget::Connection(_),
            } => "Delete connection?",
        }
    }
}

//! Editor session: the single owner of one planner's editing state.
//!
//! Holds the graph, the view transform, the interaction machine, the pending
//! dialog, and the planner metadata. Every mutation goes through here on the
//! caller's thread:
//!
//! - **Pointer → graph**: events are hit-tested, run through the
//!   [`Interaction`] machine, and the resulting [`Effect`]s are applied.
//!   Errors on this path (vanished nodes, bad endpoints) are absorbed.
//! - **Shell → graph**: buttons and palette drops call `add_hex`,
//!   `place_concept`, the delete requests, and the dialog responses.
//! - **Graph → shell**: `scene()` for drawing, `save_payload()` for saving.

use crate::config::EditorConfig;
use crate::dialog::{DeleteTarget, PendingDialog};
use crate::input::InputEvent;
use crate::interaction::{ConnectMode, Effect, Interaction, Pointer};
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use hp_core::geometry::to_world;
use hp_core::{
    ConceptRef, EdgeId, GraphStore, HexId, HexResult, HexSpec, LoadIssue, PlannerMeta,
    PlannerRecord, SavePayload, ViewTransform,
};
use hp_render::{Scene, SceneOverlay, build_scene, hit_test};
use kurbo::{Affine, Point};

/// Label given to hexagons added from the toolbar or shortcut.
pub const NEW_HEX_LABEL: &str = "New idea";

pub struct EditorSession {
    graph: GraphStore,
    view: ViewTransform,
    interaction: Interaction,
    dialog: Option<PendingDialog>,
    meta: PlannerMeta,
    config: EditorConfig,
    issues: Vec<LoadIssue>,
    /// Bumped on every graph mutation.
    revision: u64,
    /// Revision last known to match the store.
    clean_revision: u64,
    save_requested: bool,
}

impl EditorSession {
    /// An empty planner.
    pub fn new(meta: PlannerMeta, config: EditorConfig) -> Self {
        let graph = GraphStore::with_spacing(config.default_spacing);
        Self::with_graph(meta, graph, Vec::new(), config)
    }

    fn with_graph(
        meta: PlannerMeta,
        graph: GraphStore,
        issues: Vec<LoadIssue>,
        config: EditorConfig,
    ) -> Self {
        Self {
            graph,
            view: ViewTransform::default(),
            interaction: Interaction::new(config.read_only, config.click_slop),
            dialog: None,
            meta,
            config,
            issues,
            revision: 0,
            clean_revision: 0,
            save_requested: false,
        }
    }

    /// Mount a planner loaded from the store.
    pub fn from_record(record: PlannerRecord, config: EditorConfig) -> HexResult<Self> {
        let loaded = record.into_planner_with(config.default_spacing)?;
        Ok(Self::with_graph(
            loaded.meta,
            loaded.graph,
            loaded.issues,
            config,
        ))
    }

    pub fn from_json(json: &str, config: EditorConfig) -> HexResult<Self> {
        Self::from_record(PlannerRecord::from_json(json)?, config)
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn graph(&self) -> &GraphStore {
        &self.graph
    }

    pub fn view(&self) -> &ViewTransform {
        &self.view
    }

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    pub fn dialog(&self) -> Option<&PendingDialog> {
        self.dialog.as_ref()
    }

    pub fn meta(&self) -> &PlannerMeta {
        &self.meta
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Records adjusted or dropped while loading.
    pub fn load_issues(&self) -> &[LoadIssue] {
        &self.issues
    }

    pub fn read_only(&self) -> bool {
        self.config.read_only
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_dirty(&self) -> bool {
        self.revision != self.clean_revision
    }

    pub fn mark_clean(&mut self) {
        self.clean_revision = self.revision;
    }

    fn touch(&mut self) {
        self.revision += 1;
    }

    /// Whether a save shortcut fired since the last call.
    pub fn take_save_request(&mut self) -> bool {
        std::mem::take(&mut self.save_requested)
    }

    // ─── Input ───────────────────────────────────────────────────────────

    /// Feed one input event. Returns whether anything visible changed.
    pub fn handle_event(&mut self, event: &InputEvent) -> bool {
        if event.is_degenerate() {
            log::debug!("dropping event with non-finite coordinates: {event:?}");
            return false;
        }

        if let InputEvent::Key {
            key,
            ctrl,
            shift,
            alt,
            meta,
        } = event
        {
            return match ShortcutMap::resolve(key, *ctrl, *shift, *alt, *meta) {
                Some(action) => self.run_shortcut(action),
                None => false,
            };
        }

        if self.dialog.is_some() && matches!(event, InputEvent::PointerDown { .. }) {
            log::debug!("press ignored while a dialog is open");
            return false;
        }

        let with_badges = !self.config.read_only;
        let pointer = event.position().map(|screen| Pointer {
            screen,
            world: to_world(screen, &self.view),
            hit: hit_test(&self.graph, &self.view, screen, with_badges),
        });

        let before = (self.interaction.mode(), self.interaction.connect());
        let effects = self.interaction.handle(event, pointer, &self.graph);
        let mut changed = before != (self.interaction.mode(), self.interaction.connect());
        for effect in effects {
            changed |= self.apply(effect);
        }
        debug_assert!(self.interaction.is_consistent());
        changed
    }

    fn apply(&mut self, effect: Effect) -> bool {
        match effect {
            Effect::MoveNode { id, position } => match self.graph.move_node(id, position) {
                Ok(()) => {
                    self.touch();
                    true
                }
                Err(e) => {
                    log::debug!("drag absorbed: {e}");
                    self.interaction.forget(id);
                    false
                }
            },
            Effect::AddEdge { from, to } => match self.graph.add_edge(from, to, None) {
                Ok(conn) => {
                    log::debug!("connected {from:?} -> {to:?} as {:?}", conn.id);
                    self.touch();
                    true
                }
                Err(e) => {
                    log::debug!("connection absorbed: {e}");
                    false
                }
            },
            Effect::Pan { from, to } => {
                self.view.pan(from, to);
                true
            }
            Effect::Zoom { anchor, factor } => {
                self.view
                    .zoom_at(anchor, factor, self.config.zoom_limits())
            }
            Effect::EditLabel { id } => self.request_label_edit(id),
            Effect::RequestDelete(target) => self.request_delete(target),
        }
    }

    fn run_shortcut(&mut self, action: ShortcutAction) -> bool {
        log::debug!("shortcut {action:?}");
        match action {
            ShortcutAction::ToggleConnect => {
                let was = self.interaction.connect();
                self.toggle_connect();
                was != self.interaction.connect()
            }
            ShortcutAction::AddHexagon => self.add_hex(NEW_HEX_LABEL).is_some(),
            ShortcutAction::Save => {
                self.save_requested = true;
                false
            }
            ShortcutAction::ZoomIn => self.zoom_by(self.config.zoom_step),
            ShortcutAction::ZoomOut => self.zoom_by(1.0 / self.config.zoom_step),
            ShortcutAction::ResetView => self.reset_view(),
            ShortcutAction::Cancel => {
                if self.cancel() {
                    return true;
                }
                let armed = self.interaction.connect().is_armed();
                self.disarm_connect();
                armed
            }
        }
    }

    // ─── Shell commands ──────────────────────────────────────────────────

    /// World point at the centre of the canvas element.
    pub fn viewport_center(&self) -> Point {
        to_world(self.view.base * self.config.viewport.center(), &self.view)
    }

    /// Add a free-text hexagon at the viewport centre.
    pub fn add_hex(&mut self, label: impl Into<String>) -> Option<HexId> {
        if self.config.read_only {
            return None;
        }
        let spec = HexSpec::free_text(label)
            .at(self.viewport_center())
            .sized(self.config.hex_size);
        let id = self.graph.add_node(spec).id;
        self.touch();
        Some(id)
    }

    /// Place a concept from the palette at the viewport centre.
    pub fn place_concept(&mut self, concept: &ConceptRef) -> Option<HexId> {
        if self.config.read_only {
            return None;
        }
        let spec = HexSpec::concept(concept)
            .at(self.viewport_center())
            .sized(self.config.hex_size);
        let id = self.graph.add_node(spec).id;
        log::debug!("placed concept {} as {id:?}", concept.concept_id);
        self.touch();
        Some(id)
    }

    fn request_label_edit(&mut self, id: HexId) -> bool {
        let armed = self.interaction.connect().is_armed();
        if self.config.read_only || self.dialog.is_some() || armed {
            return false;
        }
        let Some(hex) = self.graph.hexagon(id) else {
            return false;
        };
        self.dialog = Some(PendingDialog::edit_label(hex));
        true
    }

    pub fn request_delete_hex(&mut self, id: HexId) -> bool {
        self.request_delete(DeleteTarget::Hexagon(id))
    }

    pub fn request_delete_connection(&mut self, id: EdgeId) -> bool {
        self.request_delete(DeleteTarget::Connection(id))
    }

    fn request_delete(&mut self, target: DeleteTarget) -> bool {
        if self.config.read_only || self.dialog.is_some() {
            return false;
        }
        let exists = match target {
            DeleteTarget::Hexagon(id) => self.graph.contains(id),
            DeleteTarget::Connection(id) => self.graph.connection(id).is_some(),
        };
        if !exists {
            log::debug!("delete request for missing {target:?}");
            return false;
        }
        self.dialog = Some(PendingDialog::confirm_delete(target));
        true
    }

    // ─── Dialog responses ────────────────────────────────────────────────

    /// Answer the label prompt. Returns whether a label was committed.
    pub fn submit_label(&mut self, text: impl Into<String>) -> bool {
        let Some(PendingDialog::EditLabel { id, .. }) = self.dialog else {
            return false;
        };
        self.dialog = None;
        match self.graph.set_label(id, text.into()) {
            Ok(()) => {
                self.touch();
                true
            }
            Err(e) => {
                log::debug!("stale label prompt: {e}");
                false
            }
        }
    }

    /// Accept the delete confirmation. Returns whether anything was removed.
    pub fn confirm(&mut self) -> bool {
        let Some(PendingDialog::ConfirmDelete { target }) = self.dialog else {
            return false;
        };
        self.dialog = None;
        let removed = match target {
            DeleteTarget::Hexagon(id) => {
                self.interaction.forget(id);
                self.graph.remove_node(id).is_some()
            }
            DeleteTarget::Connection(id) => self.graph.remove_edge(id).is_some(),
        };
        if removed {
            self.touch();
        } else {
            log::debug!("stale delete confirmation for {target:?}");
        }
        removed
    }

    /// Dismiss whatever dialog is open.
    pub fn cancel(&mut self) -> bool {
        self.dialog.take().is_some()
    }

    // ─── Connect mode ────────────────────────────────────────────────────

    pub fn toggle_connect(&mut self) -> bool {
        self.interaction.toggle_connect()
    }

    pub fn arm_connect(&mut self) -> bool {
        self.interaction.arm_connect()
    }

    pub fn disarm_connect(&mut self) {
        self.interaction.disarm_connect();
    }

    pub fn connect_mode(&self) -> ConnectMode {
        self.interaction.connect()
    }

    // ─── View ────────────────────────────────────────────────────────────

    /// Offset back to the origin, zoom back to 1.
    pub fn reset_view(&mut self) -> bool {
        let before = self.view;
        self.view.reset();
        before != self.view
    }

    /// Zoom about the viewport centre.
    pub fn zoom_by(&mut self, factor: f64) -> bool {
        let anchor = self.view.base * self.config.viewport.center();
        self.view
            .zoom_at(anchor, factor, self.config.zoom_limits())
    }

    /// The canvas element changed size.
    pub fn resize(&mut self, width: f64, height: f64) {
        if width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0 {
            self.config.viewport.width = width;
            self.config.viewport.height = height;
        }
    }

    /// The canvas element moved or was scaled on the page.
    pub fn set_base(&mut self, base: Affine) -> bool {
        self.view.set_base(base)
    }

    // ─── Output ──────────────────────────────────────────────────────────

    pub fn scene(&self) -> Scene {
        let overlay = SceneOverlay {
            connect_source: self.interaction.connect().source(),
            dragging: self.interaction.dragging(),
            delete_badges: !self.config.read_only,
        };
        build_scene(&self.graph, &self.view, &overlay)
    }

    pub fn save_payload(&self) -> SavePayload {
        SavePayload::from_graph(&self.meta, &self.graph)
    }

    /// Adopt the store's answer to a save taken at `revision`.
    ///
    /// The graph is replaced (new entities get their store IDs) only when
    /// nothing changed since the payload was taken; otherwise the local
    /// edits win and the session stays dirty. Returns whether the record
    /// was adopted.
    pub fn apply_saved(&mut self, record: PlannerRecord, revision: u64) -> HexResult<bool> {
        if revision != self.revision {
            log::info!(
                "planner {}: save of revision {revision} landed at {}, keeping local edits",
                self.meta.id,
                self.revision
            );
            return Ok(false);
        }
        let loaded = record.into_planner_with(self.config.default_spacing)?;
        self.meta = loaded.meta;
        self.graph = loaded.graph;
        self.issues = loaded.issues;
        self.interaction.reset();
        self.interaction.disarm_connect();
        self.dialog = None;
        self.mark_clean();
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hp_core::HexContent;
    use pretty_assertions::assert_eq;

    fn session() -> EditorSession {
        EditorSession::new(
            PlannerMeta {
                id: "p-test".into(),
                ..PlannerMeta::default()
            },
            EditorConfig::default(),
        )
    }

    #[test]
    fn add_hex_lands_at_viewport_center() {
        let mut s = session();
        s.handle_event(&InputEvent::down(700.0, 500.0));
        s.handle_event(&InputEvent::moved(650.0, 450.0));
        s.handle_event(&InputEvent::up(650.0, 450.0));

        let id = s.add_hex("Idea").unwrap();
        let hex = s.graph().hexagon(id).unwrap();
        // Viewport is 800x600 and the view is panned by (-50, -50).
        assert_eq!(hex.position, Point::new(450.0, 350.0));
        assert_eq!(hex.content, HexContent::FreeText("Idea".into()));
        assert!(s.is_dirty());
    }

    #[test]
    fn click_then_submit_label() {
        let mut s = session();
        let id = s.add_hex("Old").unwrap();
        s.mark_clean();
        let at = hp_core::to_screen(s.graph().hexagon(id).unwrap().position, s.view());

        s.handle_event(&InputEvent::down(at.x, at.y));
        assert!(s.handle_event(&InputEvent::up(at.x, at.y)));
        assert_eq!(
            s.dialog(),
            Some(&PendingDialog::EditLabel {
                id,
                initial: "Old".into()
            })
        );

        // Modal: presses are ignored while the prompt is up.
        assert!(!s.handle_event(&InputEvent::down(at.x, at.y)));

        assert!(s.submit_label("New"));
        assert_eq!(s.graph().hexagon(id).unwrap().display_text(), "New");
        assert!(s.dialog().is_none());
        assert!(s.is_dirty());
    }

    #[test]
    fn delete_needs_confirmation() {
        let mut s = session();
        let a = s.add_hex("a").unwrap();
        assert!(s.request_delete_hex(a));
        assert!(s.graph().contains(a));
        assert!(s.cancel());
        assert!(s.graph().contains(a));

        assert!(s.request_delete_hex(a));
        assert!(s.confirm());
        assert!(!s.graph().contains(a));
        assert!(!s.confirm());
    }

    #[test]
    fn shortcuts_drive_the_session() {
        let mut s = session();
        assert!(s.handle_event(&InputEvent::key("n")));
        assert_eq!(s.graph().hexagon_count(), 1);

        assert!(s.handle_event(&InputEvent::key("c")));
        assert!(s.connect_mode().is_armed());
        assert!(s.handle_event(&InputEvent::key("Escape")));
        assert!(!s.connect_mode().is_armed());

        let save = InputEvent::Key {
            key: "s".into(),
            ctrl: true,
            shift: false,
            alt: false,
            meta: false,
        };
        s.handle_event(&save);
        assert!(s.take_save_request());
        assert!(!s.take_save_request());
    }

    #[test]
    fn configured_spacing_places_unpositioned_hexagons() {
        let config = EditorConfig::from_json(r#"{"default_spacing": 300}"#).unwrap();
        let json = r#"{"id":"p","hexagons":[{"id":"a"},{"id":"b"}]}"#;
        let s = EditorSession::from_json(json, config).unwrap();
        let b = s.graph().hexagon(HexId::intern("b")).unwrap();
        assert_eq!(b.position, Point::new(300.0, 0.0));
    }

    #[test]
    fn inverted_zoom_limits_do_not_break_scroll() {
        let config = EditorConfig {
            min_zoom: 2.0,
            max_zoom: 1.0,
            ..EditorConfig::default()
        };
        let mut s = EditorSession::new(PlannerMeta::default(), config);
        let scroll = InputEvent::Scroll {
            x: 100.0,
            y: 100.0,
            zoom: 1.5,
        };
        assert!(s.handle_event(&scroll));
        assert_eq!(s.view().zoom, 1.5);
    }

    #[test]
    fn click_while_armed_opens_no_prompt() {
        let mut s = session();
        let id = s.add_hex("a").unwrap();
        let at = hp_core::to_screen(s.graph().hexagon(id).unwrap().position, s.view());
        s.handle_event(&InputEvent::down(at.x, at.y));
        assert!(s.handle_event(&InputEvent::key("c")));
        s.handle_event(&InputEvent::up(at.x, at.y));
        assert!(s.dialog().is_none());
        assert!(s.connect_mode().is_armed());
    }

    #[test]
    fn stale_save_keeps_local_edits() {
        let mut s = session();
        s.add_hex("a");
        let rev = s.revision();
        let record = PlannerRecord::from_json(r#"{"id":"p-test","hexagons":[]}"#).unwrap();
        s.add_hex("b");
        assert!(!s.apply_saved(record, rev).unwrap());
        assert_eq!(s.graph().hexagon_count(), 2);
        assert!(s.is_dirty());
    }
}

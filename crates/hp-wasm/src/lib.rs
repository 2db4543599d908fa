//! WASM bridge for the hex planner: exposes the editor session to the web
//! shell.
//!
//! Compiled via `wasm-pack build --target web`. Everything structured
//! crosses the boundary as JSON strings. The shell owns the network: it
//! fetches the planner, passes it to [`HexCanvas::load`], draws
//! [`HexCanvas::scene_json`], and on save sends
//! [`HexCanvas::save_payload_json`] to the store and hands the answer back to
//! [`HexCanvas::apply_saved`].

use hp_core::{Affine, ConceptRef, EdgeId, HexId, PlannerMeta, PlannerRecord};
use hp_editor::{EditorConfig, EditorSession, InputEvent};
use serde::Serialize;
use serde_json::json;
use wasm_bindgen::prelude::*;

/// The WASM-facing canvas controller.
#[wasm_bindgen]
pub struct HexCanvas {
    session: EditorSession,
    width: f64,
    height: f64,
}

#[derive(Serialize)]
struct DialogView<'a> {
    #[serde(flatten)]
    dialog: &'a hp_editor::PendingDialog,
    message: &'static str,
}

fn fail(error: impl std::fmt::Display) -> String {
    json!({ "ok": false, "error": error.to_string() }).to_string()
}

#[wasm_bindgen]
impl HexCanvas {
    /// An empty, unsaved canvas of the given size.
    #[wasm_bindgen(constructor)]
    pub fn new(width: f64, height: f64) -> Self {
        console_error_panic_hook_setup();
        let mut session = EditorSession::new(PlannerMeta::default(), EditorConfig::default());
        session.resize(width, height);
        Self {
            session,
            width,
            height,
        }
    }

    /// Mount a planner record from the store. `config_json` may be empty.
    /// Returns `{"ok":true,"warnings":[...]}` or `{"ok":false,"error":"..."}`.
    pub fn load(&mut self, planner_json: &str, config_json: &str) -> String {
        let config = if config_json.trim().is_empty() {
            EditorConfig::default()
        } else {
            match EditorConfig::from_json(config_json) {
                Ok(config) => config,
                Err(e) => return fail(e),
            }
        };
        match EditorSession::from_json(planner_json, config) {
            Ok(mut session) => {
                session.resize(self.width, self.height);
                let warnings: Vec<String> = session
                    .load_issues()
                    .iter()
                    .map(|issue| format!("{issue:?}"))
                    .collect();
                self.session = session;
                json!({ "ok": true, "warnings": warnings }).to_string()
            }
            Err(e) => fail(e),
        }
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
        self.session.resize(width, height);
    }

    /// Canvas element → client matrix, as the six `DOMMatrix` coefficients
    /// `a b c d e f`. Returns `false` for a singular matrix.
    pub fn set_base(&mut self, a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> bool {
        self.session.set_base(Affine::new([a, b, c, d, e, f]))
    }

    // ─── Input ───────────────────────────────────────────────────────────

    /// Feed a JSON-encoded input event. Returns whether to redraw.
    pub fn handle_event(&mut self, event_json: &str) -> bool {
        match serde_json::from_str::<InputEvent>(event_json) {
            Ok(event) => self.session.handle_event(&event),
            Err(e) => {
                log::debug!("unreadable input event {event_json:?}: {e}");
                false
            }
        }
    }

    pub fn pointer_down(&mut self, x: f64, y: f64) -> bool {
        self.session.handle_event(&InputEvent::down(x, y))
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) -> bool {
        self.session.handle_event(&InputEvent::moved(x, y))
    }

    pub fn pointer_up(&mut self, x: f64, y: f64) -> bool {
        self.session.handle_event(&InputEvent::up(x, y))
    }

    pub fn pointer_cancel(&mut self) -> bool {
        self.session.handle_event(&InputEvent::PointerCancel)
    }

    pub fn pointer_leave(&mut self) -> bool {
        self.session.handle_event(&InputEvent::PointerLeave)
    }

    pub fn scroll(&mut self, x: f64, y: f64, zoom: f64) -> bool {
        self.session.handle_event(&InputEvent::Scroll { x, y, zoom })
    }

    pub fn handle_key(&mut self, key: &str, ctrl: bool, shift: bool, alt: bool, meta: bool) -> bool {
        self.session.handle_event(&InputEvent::Key {
            key: key.to_string(),
            ctrl,
            shift,
            alt,
            meta,
        })
    }

    /// Whether the save shortcut fired since the last call.
    pub fn take_save_request(&mut self) -> bool {
        self.session.take_save_request()
    }

    // ─── Toolbar ─────────────────────────────────────────────────────────

    /// Add a free-text hexagon at the viewport centre. Returns its ID, or
    /// an empty string in read-only mode.
    pub fn add_hex(&mut self, label: &str) -> String {
        self.session
            .add_hex(label)
            .map(|id| id.as_str().to_string())
            .unwrap_or_default()
    }

    /// Place a palette concept (`{"concept_id":..,"title":..}`).
    pub fn place_concept(&mut self, concept_json: &str) -> String {
        let concept: ConceptRef = match serde_json::from_str(concept_json) {
            Ok(concept) => concept,
            Err(e) => {
                log::debug!("unreadable concept {concept_json:?}: {e}");
                return String::new();
            }
        };
        self.session
            .place_concept(&concept)
            .map(|id| id.as_str().to_string())
            .unwrap_or_default()
    }

    pub fn request_delete_hex(&mut self, id: &str) -> bool {
        self.session.request_delete_hex(HexId::intern(id))
    }

    pub fn request_delete_connection(&mut self, id: &str) -> bool {
        self.session.request_delete_connection(EdgeId::intern(id))
    }

    /// Returns whether connect mode is now armed.
    pub fn toggle_connect(&mut self) -> bool {
        self.session.toggle_connect()
    }

    pub fn is_connect_armed(&self) -> bool {
        self.session.connect_mode().is_armed()
    }

    /// The picked connect source, or an empty string.
    pub fn connect_source(&self) -> String {
        self.session
            .connect_mode()
            .source()
            .map(|id| id.as_str().to_string())
            .unwrap_or_default()
    }

    pub fn reset_view(&mut self) -> bool {
        self.session.reset_view()
    }

    pub fn zoom_by(&mut self, factor: f64) -> bool {
        self.session.zoom_by(factor)
    }

    // ─── Dialogs ─────────────────────────────────────────────────────────

    /// The open dialog as JSON, or `null`.
    pub fn dialog_json(&self) -> String {
        match self.session.dialog() {
            Some(dialog) => {
                let view = DialogView {
                    dialog,
                    message: dialog.message(),
                };
                serde_json::to_string(&view).unwrap_or_else(|_| "null".to_string())
            }
            None => "null".to_string(),
        }
    }

    pub fn submit_label(&mut self, text: &str) -> bool {
        self.session.submit_label(text)
    }

    pub fn confirm(&mut self) -> bool {
        self.session.confirm()
    }

    pub fn cancel(&mut self) -> bool {
        self.session.cancel()
    }

    // ─── Output ──────────────────────────────────────────────────────────

    /// Screen-space scene for drawing.
    pub fn scene_json(&self) -> String {
        serde_json::to_string(&self.session.scene()).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn is_dirty(&self) -> bool {
        self.session.is_dirty()
    }

    pub fn is_read_only(&self) -> bool {
        self.session.read_only()
    }

    /// `{"revision":n,"payload":{...}}`. Pass `revision` back to
    /// [`HexCanvas::apply_saved`] with the store's answer.
    pub fn save_payload_json(&self) -> String {
        match self.session.save_payload().to_json() {
            Ok(payload) => format!(
                r#"{{"revision":{},"payload":{payload}}}"#,
                self.session.revision()
            ),
            Err(e) => fail(e),
        }
    }

    /// Adopt the store's answer to a save. `{"ok":true,"adopted":bool}` or
    /// an error.
    pub fn apply_saved(&mut self, record_json: &str, revision: f64) -> String {
        let record = match PlannerRecord::from_json(record_json) {
            Ok(record) => record,
            Err(e) => return fail(e),
        };
        match self.session.apply_saved(record, revision as u64) {
            Ok(adopted) => json!({ "ok": true, "adopted": adopted }).to_string(),
            Err(e) => fail(e),
        }
    }

    /// The save failed; the session stays dirty. Logged for the console.
    pub fn save_failed(&self, message: &str) {
        log::warn!("save of planner {} failed: {message}", self.session.meta().id);
    }
}

/// Route Rust panics to the browser console.
fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("Hex planner WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}

// ─── Standalone helpers (no canvas needed) ───────────────────────────────

/// Check a planner record before mounting. Returns `{"ok":true,...}` with
/// hexagon/connection counts, or `{"ok":false,"error":"..."}`.
#[wasm_bindgen]
pub fn validate_planner(planner_json: &str) -> String {
    match PlannerRecord::from_json(planner_json).and_then(PlannerRecord::into_planner) {
        Ok(loaded) => json!({
            "ok": true,
            "hexagons": loaded.graph.hexagon_count(),
            "connections": loaded.graph.connection_count(),
            "issues": loaded.issues.len(),
        })
        .to_string(),
        Err(e) => fail(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::Value;

    const PLANNER: &str = r#"{
        "id": "p-wasm",
        "title": "Energy",
        "hexagons": [{"id": "h1", "x": 100, "y": 100, "size": 1, "label": "Heat"}]
    }"#;

    fn parse(s: &str) -> Value {
        serde_json::from_str(s).unwrap()
    }

    #[test]
    fn load_and_draw() {
        let mut canvas = HexCanvas::new(800.0, 600.0);
        assert_eq!(parse(&canvas.load(PLANNER, ""))["ok"], Value::Bool(true));

        let scene = parse(&canvas.scene_json());
        assert_eq!(scene["hexagons"][0]["text"], "Heat");
        assert_eq!(scene["hexagons"][0]["outline"].as_array().unwrap().len(), 6);
    }

    #[test]
    fn bad_config_is_reported() {
        let mut canvas = HexCanvas::new(800.0, 600.0);
        let out = parse(&canvas.load(PLANNER, r#"{"min_zoom": 0}"#));
        assert_eq!(out["ok"], Value::Bool(false));
    }

    #[test]
    fn click_opens_label_prompt() {
        let mut canvas = HexCanvas::new(800.0, 600.0);
        canvas.load(PLANNER, "");
        assert!(canvas.handle_event(r#"{"type":"pointer_down","x":100,"y":100}"#));
        assert!(canvas.pointer_up(100.0, 100.0));

        let dialog = parse(&canvas.dialog_json());
        assert_eq!(dialog["dialog"], "edit_label");
        assert_eq!(dialog["initial"], "Heat");
        assert_eq!(dialog["message"], "Edit hex label");

        assert!(canvas.submit_label("Thermal energy"));
        assert_eq!(canvas.dialog_json(), "null");
        assert!(canvas.is_dirty());
    }

    #[test]
    fn save_round_trip() {
        let mut canvas = HexCanvas::new(800.0, 600.0);
        canvas.load(PLANNER, "");
        let id = canvas.add_hex("Light");
        assert!(!id.is_empty());

        let out = parse(&canvas.save_payload_json());
        let revision = out["revision"].as_f64().unwrap();
        assert_eq!(out["payload"]["hexagons"][1]["client_id"], id.as_str());

        let saved = r#"{"id":"p-wasm","hexagons":[
            {"id":"h1","x":100,"y":100,"size":1,"label":"Heat"},
            {"id":"h2","x":400,"y":300,"size":1,"label":"Light"}
        ]}"#;
        assert_eq!(parse(&canvas.apply_saved(saved, revision))["adopted"], true);
        assert!(!canvas.is_dirty());
    }

    #[test]
    fn read_only_config() {
        let mut canvas = HexCanvas::new(800.0, 600.0);
        canvas.load(PLANNER, r#"{"read_only": true}"#);
        assert!(canvas.is_read_only());
        assert_eq!(canvas.add_hex("x"), "");
        assert!(!canvas.toggle_connect());
    }

    #[test]
    fn validate_reports_counts() {
        let out = parse(&validate_planner(PLANNER));
        assert_eq!(out["hexagons"], 1);
        assert_eq!(parse(&validate_planner("not json"))["ok"], false);
    }
}

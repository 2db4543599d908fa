//! Integration tests: pointer gestures through the editor session
//! (hp-editor ↔ hp-render ↔ hp-core).

use hp_core::{HexId, Point, PlannerRecord, Vec2, to_screen, to_world};
use hp_editor::{ConnectMode, EditorConfig, EditorSession, InputEvent, InteractionMode};
use pretty_assertions::assert_eq;

const PLANNER: &str = r#"{
    "id": "planner-7",
    "title": "Forces",
    "hexagons": [
        {"id": "n1", "x": 100, "y": 100, "size": 1, "label": "Push"},
        {"id": "n2", "x": 260, "y": 100, "size": 1, "free_text": "Pull"}
    ],
    "connections": []
}"#;

fn mount(config: EditorConfig) -> EditorSession {
    EditorSession::from_json(PLANNER, config).unwrap()
}

fn n(id: &str) -> HexId {
    HexId::intern(id)
}

fn screen_of(s: &EditorSession, id: &str) -> Point {
    to_screen(s.graph().hexagon(n(id)).unwrap().position, s.view())
}

fn click(s: &mut EditorSession, p: Point) {
    s.handle_event(&InputEvent::down(p.x, p.y));
    s.handle_event(&InputEvent::up(p.x, p.y));
}

// ─── Dragging ────────────────────────────────────────────────────────────

#[test]
fn drag_moves_only_the_grabbed_node() {
    let mut s = mount(EditorConfig::default());
    let n2_before = s.graph().hexagon(n("n2")).unwrap().clone();

    // Grab n1 slightly off-centre.
    s.handle_event(&InputEvent::down(105.0, 98.0));
    s.handle_event(&InputEvent::moved(300.0, 300.0));
    s.handle_event(&InputEvent::up(300.0, 300.0));

    let expected = to_world(Point::new(300.0, 300.0), s.view()) - Vec2::new(5.0, -2.0);
    assert_eq!(s.graph().hexagon(n("n1")).unwrap().position, expected);
    assert_eq!(s.graph().hexagon(n("n2")).unwrap(), &n2_before);
    assert!(s.dialog().is_none());
    assert!(s.is_dirty());
}

#[test]
fn drag_under_pan_and_zoom_tracks_the_pointer() {
    let mut s = mount(EditorConfig::default());
    // Pan by (40, 10), then zoom in about the origin.
    s.handle_event(&InputEvent::down(600.0, 500.0));
    s.handle_event(&InputEvent::moved(640.0, 510.0));
    s.handle_event(&InputEvent::up(640.0, 510.0));
    s.handle_event(&InputEvent::Scroll {
        x: 0.0,
        y: 0.0,
        zoom: 2.0,
    });
    assert_eq!(s.view().zoom, 2.0);

    let start = screen_of(&s, "n1");
    s.handle_event(&InputEvent::down(start.x, start.y));
    s.handle_event(&InputEvent::moved(start.x + 80.0, start.y));
    s.handle_event(&InputEvent::up(start.x + 80.0, start.y));

    let moved = s.graph().hexagon(n("n1")).unwrap().position;
    assert!((moved.x - 140.0).abs() < 1e-9);
    assert!((moved.y - 100.0).abs() < 1e-9);
}

// ─── Connect mode ────────────────────────────────────────────────────────

#[test]
fn connect_two_nodes_then_exit() {
    let mut s = mount(EditorConfig::default());
    assert!(s.arm_connect());

    let at = screen_of(&s, "n1");
    click(&mut s, at);
    let at = screen_of(&s, "n2");
    click(&mut s, at);

    let conns: Vec<_> = s.graph().connections().collect();
    assert_eq!(conns.len(), 1);
    assert_eq!(conns[0].from, n("n1"));
    assert_eq!(conns[0].to, n("n2"));
    assert_eq!(s.connect_mode(), ConnectMode::Disarmed);
    // Picking endpoints never opens the label prompt.
    assert!(s.dialog().is_none());
}

#[test]
fn clicking_the_source_twice_clears_it() {
    let mut s = mount(EditorConfig::default());
    s.arm_connect();

    let p = screen_of(&s, "n1");
    click(&mut s, p);
    assert_eq!(s.connect_mode(), ConnectMode::Armed { source: Some(n("n1")) });
    click(&mut s, p);

    assert_eq!(s.graph().connection_count(), 0);
    assert_eq!(s.connect_mode(), ConnectMode::Armed { source: None });
}

#[test]
fn deleting_the_source_clears_it() {
    let mut s = mount(EditorConfig::default());
    s.arm_connect();
    let at = screen_of(&s, "n1");
    click(&mut s, at);

    assert!(s.request_delete_hex(n("n1")));
    assert!(s.confirm());
    assert_eq!(s.connect_mode(), ConnectMode::Armed { source: None });
}

// ─── Deletion ────────────────────────────────────────────────────────────

#[test]
fn removing_a_node_drops_its_connections() {
    let mut s = mount(EditorConfig::default());
    s.arm_connect();
    let at = screen_of(&s, "n1");
    click(&mut s, at);
    let at = screen_of(&s, "n2");
    click(&mut s, at);
    let e1 = s.graph().connections().next().unwrap().id;

    assert!(s.request_delete_hex(n("n1")));
    assert!(s.confirm());

    let snapshot = s.graph().snapshot();
    assert!(snapshot.connection(e1).is_none());
    assert!(snapshot.hexagon(n("n1")).is_none());
    assert!(snapshot.hexagon(n("n2")).is_some());
}

#[test]
fn connection_handle_asks_before_deleting() {
    let mut s = mount(EditorConfig::default());
    s.arm_connect();
    let at = screen_of(&s, "n1");
    click(&mut s, at);
    let at = screen_of(&s, "n2");
    click(&mut s, at);

    let mid = screen_of(&s, "n1").midpoint(screen_of(&s, "n2"));
    s.handle_event(&InputEvent::down(mid.x, mid.y));
    assert!(s.dialog().is_some());
    assert_eq!(s.graph().connection_count(), 1);
    s.handle_event(&InputEvent::up(mid.x, mid.y));

    assert!(s.confirm());
    assert_eq!(s.graph().connection_count(), 0);
}

// ─── Mode invariant ──────────────────────────────────────────────────────

#[test]
fn at_most_one_mode_holds_over_a_session() {
    let mut s = mount(EditorConfig::default());
    let a = screen_of(&s, "n1");
    let b = screen_of(&s, "n2");
    let script = vec![
        InputEvent::down(a.x, a.y),
        InputEvent::moved(a.x + 30.0, a.y),
        InputEvent::key("c"),
        InputEvent::PointerCancel,
        InputEvent::down(b.x + 30.0, b.y),
        InputEvent::moved(900.0, 900.0),
        InputEvent::up(900.0, 900.0),
        InputEvent::down(700.0, 50.0),
        InputEvent::moved(710.0, 60.0),
        InputEvent::PointerLeave,
        InputEvent::up(0.0, 0.0),
        InputEvent::moved(5.0, 5.0),
        InputEvent::key("Escape"),
        InputEvent::key("c"),
        InputEvent::down(-500.0, -500.0),
        InputEvent::moved(-490.0, -480.0),
        InputEvent::up(-490.0, -480.0),
    ];
    for event in &script {
        s.handle_event(event);
        let it = s.interaction();
        assert!(it.is_consistent(), "violated after {event:?}: {it:?}");
    }
    assert_eq!(s.interaction().mode(), InteractionMode::Idle);
}

#[test]
fn stray_events_are_absorbed() {
    let mut s = mount(EditorConfig::default());
    let before = s.graph().snapshot();
    assert!(!s.handle_event(&InputEvent::up(10.0, 10.0)));
    assert!(!s.handle_event(&InputEvent::moved(10.0, 10.0)));
    assert!(!s.handle_event(&InputEvent::PointerCancel));
    assert!(!s.handle_event(&InputEvent::moved(f64::NAN, 1.0)));
    assert_eq!(s.graph().snapshot(), before);
    assert!(!s.is_dirty());
}

// ─── Read-only ───────────────────────────────────────────────────────────

#[test]
fn read_only_allows_only_pan_and_zoom() {
    let mut s = mount(EditorConfig::read_only());
    let before = s.graph().snapshot();

    let p = screen_of(&s, "n1");
    s.handle_event(&InputEvent::down(p.x, p.y));
    s.handle_event(&InputEvent::moved(p.x + 50.0, p.y));
    s.handle_event(&InputEvent::up(p.x + 50.0, p.y));
    assert_eq!(s.view().offset, Vec2::new(50.0, 0.0));

    assert!(!s.arm_connect());
    assert!(s.add_hex("nope").is_none());
    assert!(!s.request_delete_hex(n("n1")));
    assert!(!s.handle_event(&InputEvent::key("n")));
    assert!(s.handle_event(&InputEvent::key("0")));

    assert_eq!(s.graph().snapshot(), before);
    assert!(s.dialog().is_none());
    assert!(s.scene().hexagons.iter().all(|h| h.delete_badge.is_none()));
}

// ─── Save payload ────────────────────────────────────────────────────────

#[test]
fn new_entities_travel_with_client_ids() {
    let mut s = mount(EditorConfig::default());
    let fresh = s.add_hex("Gravity").unwrap();
    s.arm_connect();
    let at = screen_of(&s, "n1");
    click(&mut s, at);
    let at = to_screen(s.graph().hexagon(fresh).unwrap().position, s.view());
    click(&mut s, at);

    let payload = s.save_payload();
    assert_eq!(payload.title.as_deref(), Some("Forces"));
    assert_eq!(payload.hexagons.len(), 3);
    assert_eq!(payload.hexagons[0].id.as_deref(), Some("n1"));
    assert_eq!(payload.hexagons[2].id, None);
    assert_eq!(payload.hexagons[2].client_id.as_deref(), Some(fresh.as_str()));

    let conn = &payload.connections[0];
    assert_eq!(conn.id, None);
    assert!(conn.client_id.is_some());
    assert_eq!(conn.from_hexagon_id, "n1");
    assert_eq!(conn.to_hexagon_id, fresh.as_str());
}

#[test]
fn adopting_the_saved_record_cleans_the_session() {
    let mut s = mount(EditorConfig::default());
    s.add_hex("Gravity");
    let rev = s.revision();
    let saved = PlannerRecord::from_json(
        r#"{"id":"planner-7","title":"Forces","hexagons":[
            {"id":"n1","x":100,"y":100,"size":1},
            {"id":"n2","x":260,"y":100,"size":1},
            {"id":"n3","x":400,"y":300,"size":1,"free_text":"Gravity"}
        ]}"#,
    )
    .unwrap();

    assert!(s.apply_saved(saved, rev).unwrap());
    assert!(!s.is_dirty());
    assert!(s.graph().hexagon(n("n3")).unwrap().persisted);
}

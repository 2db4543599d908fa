//! Pointer interaction state machine.
//!
//! Translates input events plus a hit-test result into [`Effect`]s that the
//! session applies to the graph and view. The machine never touches the
//! graph itself.
//!
//! ## Transitions
//!
//! | Mode | Event | Target | Next | Effect |
//! |------|-------|--------|------|--------|
//! | idle | down | hexagon | dragging | — |
//! | idle | down | background | panning | — |
//! | idle, armed | down | hexagon | idle, armed(source) | — |
//! | idle, armed(source) | down | other hexagon | idle, disarmed | `AddEdge` |
//! | idle, armed(source) | down | source | idle, armed | — |
//! | dragging | move | — | dragging | `MoveNode` |
//! | dragging | up within click slop | — | idle | `EditLabel` |
//! | panning | move | — | panning | `Pan` |
//! | any | release | — | idle | — |
//!
//! Release is up, cancel, or leave. In read-only mode only panning and
//! zooming produce effects.

use crate::dialog::DeleteTarget;
use crate::input::InputEvent;
use hp_core::{GraphStore, HexId};
use hp_render::HitTarget;
use kurbo::{Point, Vec2};

/// Exclusive pointer mode.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum InteractionMode {
    #[default]
    Idle,
    DraggingNode {
        id: HexId,
        /// World offset from the node centre to the grab point.
        grab: Vec2,
        /// Screen point of the press.
        press: Point,
        /// Left the click slop at some point.
        moved: bool,
    },
    Panning {
        last: Point,
    },
}

/// Connect-mode toggle, independent of the pointer mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectMode {
    #[default]
    Disarmed,
    Armed {
        source: Option<HexId>,
    },
}

impl ConnectMode {
    pub fn is_armed(&self) -> bool {
        matches!(self, ConnectMode::Armed { .. })
    }

    pub fn source(&self) -> Option<HexId> {
        match self {
            ConnectMode::Armed { source } => *source,
            ConnectMode::Disarmed => None,
        }
    }
}

/// Requested change, applied by the session.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    MoveNode { id: HexId, position: Point },
    AddEdge { from: HexId, to: HexId },
    /// Screen-space pan gesture step.
    Pan { from: Point, to: Point },
    Zoom { anchor: Point, factor: f64 },
    /// A plain click on a hexagon.
    EditLabel { id: HexId },
    RequestDelete(DeleteTarget),
}

/// Where the pointer is, in both spaces, and what it is over.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pointer {
    pub screen: Point,
    pub world: Point,
    pub hit: HitTarget,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Interaction {
    mode: InteractionMode,
    connect: ConnectMode,
    read_only: bool,
    click_slop: f64,
}

impl Interaction {
    pub fn new(read_only: bool, click_slop: f64) -> Self {
        Self {
            mode: InteractionMode::Idle,
            connect: ConnectMode::Disarmed,
            read_only,
            click_slop,
        }
    }

    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    pub fn connect(&self) -> ConnectMode {
        self.connect
    }

    pub fn read_only(&self) -> bool {
        self.read_only
    }

    /// Node under an active drag.
    pub fn dragging(&self) -> Option<HexId> {
        match self.mode {
            InteractionMode::DraggingNode { id, .. } => Some(id),
            _ => None,
        }
    }

    /// At most one of dragging, panning, and connecting-with-source.
    pub fn is_consistent(&self) -> bool {
        let active = [
            matches!(self.mode, InteractionMode::DraggingNode { .. }),
            matches!(self.mode, InteractionMode::Panning { .. }),
            self.connect.source().is_some(),
        ];
        active.iter().filter(|b| **b).count() <= 1
    }

    // ─── Connect mode ────────────────────────────────────────────────────

    /// Flip connect mode. Returns whether it is now armed.
    pub fn toggle_connect(&mut self) -> bool {
        if self.connect.is_armed() {
            self.disarm_connect();
        } else {
            self.arm_connect();
        }
        self.connect.is_armed()
    }

    /// Arm connect mode with no source. Refused in read-only mode.
    pub fn arm_connect(&mut self) -> bool {
        if self.read_only {
            log::debug!("connect mode unavailable in read-only mode");
            return false;
        }
        if !self.connect.is_armed() {
            self.connect = ConnectMode::Armed { source: None };
            log::debug!("connect mode armed");
        }
        true
    }

    pub fn disarm_connect(&mut self) {
        if self.connect.is_armed() {
            log::debug!("connect mode disarmed");
        }
        self.connect = ConnectMode::Disarmed;
    }

    /// Drop every reference to a hexagon that no longer exists.
    pub fn forget(&mut self, id: HexId) {
        if self.dragging() == Some(id) {
            self.mode = InteractionMode::Idle;
        }
        if self.connect.source() == Some(id) {
            self.connect = ConnectMode::Armed { source: None };
        }
    }

    /// Abandon any gesture in progress.
    pub fn reset(&mut self) {
        self.mode = InteractionMode::Idle;
    }

    // ─── Events ──────────────────────────────────────────────────────────

    /// Handle a pointer event. `pointer` is `None` for events without a
    /// position (cancel, leave). Keys are not handled here.
    pub fn handle(
        &mut self,
        event: &InputEvent,
        pointer: Option<Pointer>,
        graph: &GraphStore,
    ) -> Vec<Effect> {
        match (event, pointer) {
            (InputEvent::PointerDown { .. }, Some(p)) => self.press(p, graph),
            (InputEvent::PointerMove { .. }, Some(p)) => self.drag(p),
            (InputEvent::Scroll { zoom, .. }, Some(p)) => {
                if zoom.is_finite() && *zoom > 0.0 {
                    vec![Effect::Zoom {
                        anchor: p.screen,
                        factor: *zoom,
                    }]
                } else {
                    vec![]
                }
            }
            (ev, p) if ev.is_release() => self.release(ev, p),
            _ => vec![],
        }
    }

    fn press(&mut self, p: Pointer, graph: &GraphStore) -> Vec<Effect> {
        if self.mode != InteractionMode::Idle {
            log::debug!("press during {:?} ignored", self.mode);
            return vec![];
        }

        if self.read_only {
            self.mode = InteractionMode::Panning { last: p.screen };
            return vec![];
        }

        match p.hit {
            HitTarget::DeleteBadge(id) => {
                vec![Effect::RequestDelete(DeleteTarget::Hexagon(id))]
            }
            HitTarget::Connection(id) => {
                vec![Effect::RequestDelete(DeleteTarget::Connection(id))]
            }
            HitTarget::Hexagon(id) => match self.connect {
                ConnectMode::Armed { source: None } => {
                    log::debug!("connect source {id:?}");
                    self.connect = ConnectMode::Armed { source: Some(id) };
                    vec![]
                }
                ConnectMode::Armed { source: Some(src) } if src == id => {
                    self.connect = ConnectMode::Armed { source: None };
                    vec![]
                }
                ConnectMode::Armed { source: Some(src) } => {
                    self.connect = ConnectMode::Disarmed;
                    log::debug!("connect {src:?} -> {id:?}, disarmed");
                    vec![Effect::AddEdge { from: src, to: id }]
                }
                ConnectMode::Disarmed => {
                    let Some(hex) = graph.hexagon(id) else {
                        log::debug!("press on vanished hexagon {id:?}");
                        return vec![];
                    };
                    self.mode = InteractionMode::DraggingNode {
                        id,
                        grab: p.world - hex.position,
                        press: p.screen,
                        moved: false,
                    };
                    vec![]
                }
            },
            HitTarget::Background => {
                if self.connect.source().is_some() {
                    log::debug!("background press while picking a target absorbed");
                    return vec![];
                }
                self.mode = InteractionMode::Panning { last: p.screen };
                vec![]
            }
        }
    }

    fn drag(&mut self, p: Pointer) -> Vec<Effect> {
        match &mut self.mode {
            InteractionMode::DraggingNode {
                id,
                grab,
                press,
                moved,
            } => {
                if !*moved && (p.screen - *press).hypot() > self.click_slop {
                    *moved = true;
                }
                let position = p.world - *grab;
                log::trace!("drag {id:?} to {position:?}");
                vec![Effect::MoveNode { id: *id, position }]
            }
            InteractionMode::Panning { last } => {
                let from = *last;
                *last = p.screen;
                log::trace!("pan {from:?} -> {:?}", p.screen);
                vec![Effect::Pan { from, to: p.screen }]
            }
            InteractionMode::Idle => vec![],
        }
    }

    fn release(&mut self, event: &InputEvent, pointer: Option<Pointer>) -> Vec<Effect> {
        let mode = std::mem::take(&mut self.mode);
        match mode {
            InteractionMode::DraggingNode {
                id, press, moved, ..
            } => {
                let within_slop = pointer
                    .map(|p| (p.screen - press).hypot() <= self.click_slop)
                    .unwrap_or(true);
                let click = matches!(event, InputEvent::PointerUp { .. }) && !moved && within_slop;
                // Connect mode owns clicks, even when armed mid-drag.
                if click && !self.connect.is_armed() {
                    vec![Effect::EditLabel { id }]
                } else {
                    vec![]
                }
            }
            InteractionMode::Panning { .. } => vec![],
            InteractionMode::Idle => {
                log::trace!("release without press");
                vec![]
            }
        }
    }
}

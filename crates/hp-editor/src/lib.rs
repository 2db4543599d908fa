pub mod config;
pub mod dialog;
pub mod input;
pub mod interaction;
pub mod session;
pub mod shortcuts;

pub use config::{EditorConfig, Viewport};
pub use dialog::{DeleteTarget, PendingDialog};
pub use input::InputEvent;
pub use interaction::{ConnectMode, Effect, Interaction, InteractionMode};
pub use session::EditorSession;
pub use shortcuts::{ShortcutAction, ShortcutMap};

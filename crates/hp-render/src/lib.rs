pub mod hit;
pub mod scene;

pub use hit::{HitTarget, hit_test};
pub use scene::{ConnectorSprite, HexSprite, Scene, SceneOverlay, build_scene};

pub mod error;
pub mod geometry;
pub mod graph;
pub mod id;
pub mod model;
pub mod record;

pub use error::{EndpointProblem, HexError, HexResult};
pub use geometry::{ViewTransform, ZoomLimits, hexagon_outline, to_screen, to_world};
pub use graph::{GraphSnapshot, GraphStore};
pub use id::{EdgeId, HexId};
pub use model::*;
pub use record::{LoadIssue, LoadedPlanner, PlannerRecord, SavePayload};

// Re-export kurbo primitives so downstream crates share one geometry vocabulary
pub use kurbo::{Affine, Point, Vec2};

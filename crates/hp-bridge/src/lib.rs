pub mod bridge;
pub mod store;

pub use bridge::{SaveBridge, SaveOutcome, SaveReport};
pub use store::{MemoryStore, PlannerStore};

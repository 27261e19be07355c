//! In-process mission engine: pricing, task rewards, winner payouts,
//! lifecycle staging, user stats, and peer review behind one facade.

pub mod engine;
pub mod error;
pub mod store;

pub use engine::{CompletionReceipt, EngineConfig, MissionEngine};
pub use error::{EngineError, Result};
pub use store::{MemoryMissionStore, MissionStore};

use engage_payout::PayoutError;
use engage_pricing::PricingError;
use engage_review::ReviewError;
use engage_types::{MissionId, TaskId, UserId};
use thiserror::Error;

/// Engine operation result type
pub type Result<T> = std::result::Result<T, EngineError>;

/// Top-level errors for the mission facade. Component-crate errors are
/// wrapped as variants, not stringified, so callers can still match on
/// the underlying failure.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Mission not found: {0}")]
    MissionNotFound(MissionId),

    #[error("Mission {0} is deleted")]
    MissionDeleted(MissionId),

    #[error("Task '{task}' is not part of mission {mission}")]
    TaskNotInMission { mission: MissionId, task: TaskId },

    #[error("Task '{task}' reached its completion cap of {cap}")]
    TaskCapReached { task: TaskId, cap: u32 },

    #[error("Mission {0} is not a degen mission")]
    NotDegenMission(MissionId),

    #[error("No completed task '{task}' in mission {mission} for {user}")]
    CompletionNotFound {
        mission: MissionId,
        task: TaskId,
        user: UserId,
    },

    #[error("Pricing error: {0}")]
    Pricing(#[from] PricingError),

    #[error("Payout error: {0}")]
    Payout(#[from] PayoutError),

    #[error("Review error: {0}")]
    Review(#[from] ReviewError),

    #[error("Wallet operation failed: {0}")]
    Wallet(String),

    #[error("Store operation failed: {0}")]
    Store(#[from] anyhow::Error),
}

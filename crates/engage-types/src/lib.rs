pub mod aggregates;
pub mod amount;
pub mod error;
pub mod id;
pub mod mission;
pub mod participation;
pub mod winners;

pub use aggregates::MissionAggregates;
pub use amount::{Honors, Usd, HONORS_PER_USD, HONOR_BASE_UNIT, USD_BASE_UNIT};
pub use error::{Result, TypeError};
pub use id::{MissionId, ParticipationId, TaskId, UserId};
pub use mission::{
    Mission, MissionDraft, MissionKind, MissionModel, MissionStatus, ModelRequest, Platform,
    TargetAudience, MAX_TASKS_PER_MISSION,
};
pub use participation::{CompletionKey, CompletionStatus, Participation, TaskCompletion};
pub use winners::DegenWinner;

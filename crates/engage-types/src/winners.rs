use crate::amount::Honors;
use crate::id::{MissionId, TaskId, UserId};
use serde::{Deserialize, Serialize};

/// A paid-out contest winner, keyed by (mission, user, task).
///
/// Written once when a degen mission's winners are chosen and never
/// mutated afterward; reconciliation reads these back to rebuild
/// payout-driven stat contributions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DegenWinner {
    pub mission_id: MissionId,
    pub user_id: UserId,
    pub task_id: TaskId,
    pub payout: Honors,
}

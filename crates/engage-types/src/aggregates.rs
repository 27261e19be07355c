use crate::id::{MissionId, TaskId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Denormalized per-mission completion counters.
///
/// Owned exclusively by the counter store that increments them on
/// verified completions; everything else (the progress engine, UI
/// reads) treats a snapshot as read-only. Counts only move up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionAggregates {
    pub mission_id: MissionId,
    /// Verified completion count per task id.
    pub task_counts: HashMap<TaskId, u64>,
    pub total_completions: u64,
    /// Per-task completion cap mirror; `None` for degen missions.
    pub winners_per_task: Option<u32>,
    pub task_count: u32,
    pub updated_at: DateTime<Utc>,
}

impl MissionAggregates {
    pub fn new(
        mission_id: MissionId,
        winners_per_task: Option<u32>,
        task_count: u32,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            mission_id,
            task_counts: HashMap::new(),
            total_completions: 0,
            winners_per_task,
            task_count,
            updated_at: now,
        }
    }

    /// Count for a task, with missing entries read as zero.
    pub fn count_for(&self, task: &TaskId) -> u64 {
        self.task_counts.get(task).copied().unwrap_or(0)
    }
}

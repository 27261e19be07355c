//! Per-mission completion counters.
//!
//! This store is the only writer of [`MissionAggregates`]; the progress
//! engine and UI reads get cloned snapshots. Counters are
//! increment-only.

use chrono::{DateTime, Utc};
use engage_types::{Mission, MissionAggregates, MissionId, TaskId};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

pub struct MissionCounterStore {
    counters: RwLock<HashMap<MissionId, MissionAggregates>>,
}

impl MissionCounterStore {
    pub fn new() -> Self {
        Self {
            counters: RwLock::new(HashMap::new()),
        }
    }

    /// Seed the aggregate for a newly created mission. Tolerates a
    /// completion event having arrived first: existing counts are kept
    /// and only the mission-shape fields are filled in.
    pub async fn init_mission(&self, mission: &Mission, now: DateTime<Utc>) {
        let mut counters = self.counters.write().await;
        let entry = counters
            .entry(mission.id.clone())
            .or_insert_with(|| MissionAggregates::new(mission.id.clone(), None, 0, now));
        entry.winners_per_task = mission.winners_per_task();
        entry.task_count = mission.tasks.len() as u32;
    }

    /// Record one verified completion. Unknown missions get a bare
    /// aggregate on the spot; creation and completion events carry no
    /// ordering guarantee between them.
    pub async fn record_completion(
        &self,
        mission_id: &MissionId,
        task_id: &TaskId,
        now: DateTime<Utc>,
    ) -> MissionAggregates {
        let mut counters = self.counters.write().await;
        let entry = counters
            .entry(mission_id.clone())
            .or_insert_with(|| MissionAggregates::new(mission_id.clone(), None, 0, now));

        *entry.task_counts.entry(task_id.clone()).or_insert(0) += 1;
        entry.total_completions += 1;
        entry.updated_at = entry.updated_at.max(now);

        debug!(
            mission = %mission_id,
            task = %task_id,
            count = entry.count_for(task_id),
            total = entry.total_completions,
            "Mission counter incremented"
        );
        entry.clone()
    }

    pub async fn snapshot(&self, mission_id: &MissionId) -> Option<MissionAggregates> {
        self.counters.read().await.get(mission_id).cloned()
    }
}

impl Default for MissionCounterStore {
    fn default() -> Self {
        Self::new()
    }
}

//! Derived mission lifecycle stage.
//!
//! `stage` is evaluated on every read from the mission window and live
//! completion counters; the result is never written back to the
//! mission. The persisted `MissionStatus` field (active/paused/...) is
//! a separate, coarser admin control.

use chrono::{DateTime, Utc};
use engage_types::{Mission, MissionAggregates};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LifecycleStage {
    InProgress,
    AlmostEnding,
    Completed,
}

impl LifecycleStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleStage::InProgress => "in-progress",
            LifecycleStage::AlmostEnding => "almost-ending",
            LifecycleStage::Completed => "completed",
        }
    }
}

impl fmt::Display for LifecycleStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Elapsed/total time pair in milliseconds. A mission without an end
/// timestamp has zero total duration and its time progress is treated
/// as zero, never as complete.
#[derive(Debug, Clone, Copy)]
struct TimeProgress {
    elapsed_ms: i64,
    total_ms: i64,
}

impl TimeProgress {
    fn of(now: DateTime<Utc>, mission: &Mission) -> Self {
        let elapsed_ms = (now - mission.started_at).num_milliseconds().max(0);
        let total_ms = mission
            .ends_at
            .map(|end| (end - mission.started_at).num_milliseconds().max(0))
            .unwrap_or(0);
        Self {
            elapsed_ms,
            total_ms,
        }
    }

    fn is_complete(&self) -> bool {
        self.total_ms > 0 && self.elapsed_ms >= self.total_ms
    }

    fn is_almost(&self) -> bool {
        // elapsed / total >= 0.9, kept in integer space.
        self.total_ms > 0 && self.elapsed_ms.saturating_mul(10) >= self.total_ms.saturating_mul(9)
    }
}

/// Current lifecycle stage of a mission.
///
/// Fixed missions complete when every task hits its per-task cap, no
/// matter how much time is left; otherwise both models complete on
/// elapsed time, with a 90% "almost ending" band. Degen stages look at
/// time only.
pub fn stage(
    now: DateTime<Utc>,
    mission: &Mission,
    aggregates: &MissionAggregates,
) -> LifecycleStage {
    let time = TimeProgress::of(now, mission);

    let cap = match mission.winners_per_task() {
        Some(cap) => cap as u64,
        // Degen missions progress on time alone.
        None => return stage_from_time(time),
    };

    if cap > 0 && !mission.tasks.is_empty() {
        let all_capped = mission
            .tasks
            .iter()
            .all(|task| aggregates.count_for(task) >= cap);
        if all_capped {
            return LifecycleStage::Completed;
        }
    }

    if time.is_complete() {
        return LifecycleStage::Completed;
    }

    let any_near_cap = cap > 0
        && mission
            .tasks
            .iter()
            .any(|task| aggregates.count_for(task).saturating_mul(10) >= cap.saturating_mul(9));
    if time.is_almost() || any_near_cap {
        return LifecycleStage::AlmostEnding;
    }
    LifecycleStage::InProgress
}

fn stage_from_time(time: TimeProgress) -> LifecycleStage {
    if time.is_complete() {
        LifecycleStage::Completed
    } else if time.is_almost() {
        LifecycleStage::AlmostEnding
    } else {
        LifecycleStage::InProgress
    }
}

use crate::amount::Honors;
use crate::error::TypeError;
use crate::id::{MissionId, TaskId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompletionStatus {
    Pending,
    Completed,
}

impl CompletionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompletionStatus::Pending => "pending",
            CompletionStatus::Completed => "completed",
        }
    }
}

impl FromStr for CompletionStatus {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(CompletionStatus::Pending),
            "completed" => Ok(CompletionStatus::Completed),
            other => Err(TypeError::UnknownCompletionStatus(other.to_string())),
        }
    }
}

impl fmt::Display for CompletionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One task interaction inside a participation record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskCompletion {
    pub task_id: TaskId,
    pub status: CompletionStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proof_url: Option<String>,
}

/// Composite key identifying one verified completion for aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CompletionKey {
    pub mission_id: MissionId,
    pub task_id: TaskId,
}

impl fmt::Display for CompletionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.mission_id, self.task_id)
    }
}

/// Per (mission, user) participation document. Created on first task
/// interaction, mutated by appending completion records, never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participation {
    pub mission_id: MissionId,
    pub user_id: UserId,
    /// Ordered completion records; duplicates per task id may exist in
    /// raw data and must be deduplicated before counting.
    pub tasks_completed: Vec<TaskCompletion>,
    pub total_honors_earned: Honors,
    pub updated_at: DateTime<Utc>,
}

impl Participation {
    pub fn new(mission_id: MissionId, user_id: UserId, now: DateTime<Utc>) -> Self {
        Self {
            mission_id,
            user_id,
            tasks_completed: Vec::new(),
            total_honors_earned: Honors::ZERO,
            updated_at: now,
        }
    }

    /// Deduplicated set of verified completion keys, the unit the stats
    /// aggregator counts in.
    pub fn completed_keys(&self) -> BTreeSet<CompletionKey> {
        self.tasks_completed
            .iter()
            .filter(|c| c.status == CompletionStatus::Completed)
            .map(|c| CompletionKey {
                mission_id: self.mission_id.clone(),
                task_id: c.task_id.clone(),
            })
            .collect()
    }

    pub fn has_completed(&self, task_id: &TaskId) -> bool {
        self.tasks_completed
            .iter()
            .any(|c| &c.task_id == task_id && c.status == CompletionStatus::Completed)
    }

    /// Record a verified completion for `task_id`. Returns `false` when
    /// the task is already completed (at most one counted completion per
    /// (mission, task, user) triple); a pending record for the task is
    /// upgraded in place.
    pub fn record_completion(
        &mut self,
        task_id: TaskId,
        proof_url: Option<String>,
        now: DateTime<Utc>,
    ) -> bool {
        if self.has_completed(&task_id) {
            return false;
        }

        if let Some(pending) = self
            .tasks_completed
            .iter_mut()
            .find(|c| c.task_id == task_id && c.status == CompletionStatus::Pending)
        {
            pending.status = CompletionStatus::Completed;
            pending.completed_at = Some(now);
            if proof_url.is_some() {
                pending.proof_url = proof_url;
            }
        } else {
            self.tasks_completed.push(TaskCompletion {
                task_id,
                status: CompletionStatus::Completed,
                created_at: now,
                completed_at: Some(now),
                proof_url,
            });
        }
        self.updated_at = now;
        true
    }
}

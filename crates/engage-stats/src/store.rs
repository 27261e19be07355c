use crate::summary::{StatsDelta, UserStatsSummary};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use engage_types::{CompletionKey, UserId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use tokio::sync::RwLock;

/// Journal entry for an incremental update that could not be applied.
/// These are not retried; the reconciliation pass picks the drift up.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsFailure {
    pub user: Option<UserId>,
    /// Short description of the triggering event.
    pub event: String,
    pub error: String,
    pub occurred_at: DateTime<Utc>,
}

/// Persistence for user stat summaries, the credited-completion marker
/// set, and the failure journal.
#[async_trait]
pub trait StatsStore: Send + Sync {
    /// Stored summary; `None` when the user has no summary document yet.
    async fn summary(&self, user: &UserId) -> Result<Option<UserStatsSummary>>;

    /// Completion keys already credited to the user. Event redelivery
    /// is deduplicated against this set.
    async fn counted_keys(&self, user: &UserId) -> Result<BTreeSet<CompletionKey>>;

    /// Additive merge, marking `newly_counted` credited in the same
    /// atomic step. A missing summary starts from all-zero fields; the
    /// stored value is never overwritten with the delta itself.
    async fn merge(
        &self,
        user: &UserId,
        delta: &StatsDelta,
        newly_counted: &[CompletionKey],
    ) -> Result<UserStatsSummary>;

    /// Corrective full write of summary and marker set; reconciliation
    /// is the only caller.
    async fn overwrite(
        &self,
        user: &UserId,
        summary: UserStatsSummary,
        counted: BTreeSet<CompletionKey>,
    ) -> Result<()>;

    async fn record_failure(&self, failure: StatsFailure) -> Result<()>;

    async fn failures(&self) -> Result<Vec<StatsFailure>>;
}

#[derive(Default)]
struct StatsState {
    summaries: HashMap<UserId, UserStatsSummary>,
    counted: HashMap<UserId, BTreeSet<CompletionKey>>,
}

/// In-memory store used by tests and single-process deployments. One
/// lock guards summaries and marker sets together so a merge is atomic.
pub struct MemoryStatsStore {
    state: RwLock<StatsState>,
    failures: RwLock<Vec<StatsFailure>>,
}

impl MemoryStatsStore {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(StatsState::default()),
            failures: RwLock::new(Vec::new()),
        }
    }
}

impl Default for MemoryStatsStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StatsStore for MemoryStatsStore {
    async fn summary(&self, user: &UserId) -> Result<Option<UserStatsSummary>> {
        Ok(self.state.read().await.summaries.get(user).copied())
    }

    async fn counted_keys(&self, user: &UserId) -> Result<BTreeSet<CompletionKey>> {
        Ok(self
            .state
            .read()
            .await
            .counted
            .get(user)
            .cloned()
            .unwrap_or_default())
    }

    async fn merge(
        &self,
        user: &UserId,
        delta: &StatsDelta,
        newly_counted: &[CompletionKey],
    ) -> Result<UserStatsSummary> {
        let mut state = self.state.write().await;
        let entry = state.summaries.entry(user.clone()).or_default();
        *entry = entry.merged(delta);
        let merged = *entry;
        if !newly_counted.is_empty() {
            state
                .counted
                .entry(user.clone())
                .or_default()
                .extend(newly_counted.iter().cloned());
        }
        Ok(merged)
    }

    async fn overwrite(
        &self,
        user: &UserId,
        summary: UserStatsSummary,
        counted: BTreeSet<CompletionKey>,
    ) -> Result<()> {
        let mut state = self.state.write().await;
        state.summaries.insert(user.clone(), summary);
        state.counted.insert(user.clone(), counted);
        Ok(())
    }

    async fn record_failure(&self, failure: StatsFailure) -> Result<()> {
        self.failures.write().await.push(failure);
        Ok(())
    }

    async fn failures(&self) -> Result<Vec<StatsFailure>> {
        Ok(self.failures.read().await.clone())
    }
}

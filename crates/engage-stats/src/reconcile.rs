//! Batch recomputation of user stats from raw documents.
//!
//! The recomputed summary must match what the incremental path would
//! have produced over the same data; where the two differ the stored
//! value is drift and gets overwritten, together with the counted-key
//! marker set future deliveries deduplicate against.

use crate::store::StatsStore;
use crate::summary::UserStatsSummary;
use anyhow::Result;
use async_trait::async_trait;
use engage_catalog::HonorsCatalog;
use engage_types::{CompletionKey, DegenWinner, Honors, Mission, MissionId, Participation, UserId};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info};

/// Read access to the raw documents a user's stats derive from.
#[async_trait]
pub trait StatsSource: Send + Sync {
    async fn missions_created_by(&self, user: &UserId) -> Result<Vec<Mission>>;
    async fn participations_of(&self, user: &UserId) -> Result<Vec<Participation>>;
    async fn mission(&self, id: &MissionId) -> Result<Option<Mission>>;
    async fn winner_records_of(&self, user: &UserId) -> Result<Vec<DegenWinner>>;
    /// Reviewer rewards paid out to the user, one amount per completed
    /// review.
    async fn review_rewards_of(&self, user: &UserId) -> Result<Vec<Honors>>;
}

/// Summary rebuilt from scratch plus the completion keys backing it.
#[derive(Debug, Clone)]
pub struct RecomputedStats {
    pub summary: UserStatsSummary,
    pub counted: BTreeSet<CompletionKey>,
}

#[derive(Debug, Clone)]
pub struct ReconcileReport {
    pub user: UserId,
    pub stored: Option<UserStatsSummary>,
    pub recomputed: UserStatsSummary,
    pub drifted: bool,
}

pub struct Reconciler {
    catalog: HonorsCatalog,
    source: Arc<dyn StatsSource>,
    store: Arc<dyn StatsStore>,
}

impl Reconciler {
    pub fn new(
        catalog: HonorsCatalog,
        source: Arc<dyn StatsSource>,
        store: Arc<dyn StatsStore>,
    ) -> Self {
        Self {
            catalog,
            source,
            store,
        }
    }

    /// Rebuild a user's summary from scratch without writing anything.
    pub async fn recompute(&self, user: &UserId) -> Result<UserStatsSummary> {
        Ok(self.recompute_full(user).await?.summary)
    }

    /// Full rebuild: completions deduplicated by (mission, task); a
    /// mission counts as completed only when every required task id is
    /// covered, and missions with no required tasks are skipped.
    /// Soft-deleted missions drop out entirely. Winner payouts and
    /// reviewer rewards fold in from their immutable records; a later
    /// soft delete does not claw those back.
    pub async fn recompute_full(&self, user: &UserId) -> Result<RecomputedStats> {
        let mut summary = UserStatsSummary::default();
        let mut counted: BTreeSet<CompletionKey> = BTreeSet::new();

        for mission in self.source.missions_created_by(user).await? {
            if !mission.deleted {
                summary.missions_created += 1;
            }
        }

        for participation in self.source.participations_of(user).await? {
            let mission = match self.source.mission(&participation.mission_id).await? {
                Some(m) if !m.deleted => m,
                _ => continue,
            };

            let keys = participation.completed_keys();
            summary.tasks_done += keys.len() as u64;
            for key in &keys {
                summary.total_earned = summary
                    .total_earned
                    .saturating_add(self.catalog.value_of(&key.task_id));
            }
            counted.extend(keys);

            let required = mission.required_tasks();
            if !required.is_empty() && required.iter().all(|t| participation.has_completed(t)) {
                summary.missions_completed += 1;
            }
        }

        for winner in self.source.winner_records_of(user).await? {
            summary.tasks_done += 1;
            summary.total_earned = summary.total_earned.saturating_add(winner.payout);
        }

        for reward in self.source.review_rewards_of(user).await? {
            summary.reviews_done += 1;
            summary.total_earned = summary.total_earned.saturating_add(reward);
        }

        Ok(RecomputedStats { summary, counted })
    }

    /// Recompute and, when the stored summary drifted, overwrite it.
    pub async fn reconcile(&self, user: &UserId) -> Result<ReconcileReport> {
        let rebuilt = self.recompute_full(user).await?;
        let stored = self.store.summary(user).await?;

        let drifted = match stored {
            Some(s) => s != rebuilt.summary,
            None => rebuilt.summary != UserStatsSummary::default(),
        };

        if drifted {
            self.store
                .overwrite(user, rebuilt.summary, rebuilt.counted)
                .await?;
            info!(
                user = %user,
                tasks_done = rebuilt.summary.tasks_done,
                earned = rebuilt.summary.total_earned.to_f64(),
                missions_created = rebuilt.summary.missions_created,
                missions_completed = rebuilt.summary.missions_completed,
                "📊 Reconciled user stats, drift corrected"
            );
        } else {
            debug!(user = %user, "Reconciliation found no drift");
        }

        Ok(ReconcileReport {
            user: user.clone(),
            stored,
            recomputed: rebuilt.summary,
            drifted,
        })
    }
}

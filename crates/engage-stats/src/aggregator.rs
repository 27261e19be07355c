//! Incremental stats updates driven by document events.
//!
//! Only additions count, and every credited completion is marked in the
//! store's counted-key set, so a redelivered event diffs to nothing the
//! second time. Store failures are journaled and abandoned; the
//! reconciliation pass is the corrective path, not retries.

use crate::store::{StatsFailure, StatsStore};
use crate::summary::{StatsDelta, UserStatsSummary};
use chrono::Utc;
use engage_catalog::HonorsCatalog;
use engage_types::{CompletionKey, Mission, Participation, TaskId, UserId};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Stat increments plus the completion keys they credit. The store must
/// mark the keys counted atomically with the merge.
#[derive(Debug, Clone, Default)]
pub struct ParticipationDelta {
    pub delta: StatsDelta,
    pub newly_counted: Vec<CompletionKey>,
}

/// Delta of one participation snapshot against a baseline of
/// already-credited completion keys.
///
/// A task counts when it is completed in `after` and absent from the
/// baseline; removals and already-credited completions contribute
/// nothing, so the same snapshot diffed against the same baseline
/// always yields the same delta, and a zero one once its keys are
/// credited. `missions_completed` bumps exactly when coverage of every
/// required task id is first reached; missions with no required tasks
/// are skipped outright.
pub fn participation_delta(
    catalog: &HonorsCatalog,
    baseline: &BTreeSet<CompletionKey>,
    after: &Participation,
    required_tasks: Option<&[TaskId]>,
) -> ParticipationDelta {
    let after_keys = after.completed_keys();

    let mut out = ParticipationDelta::default();
    for key in after_keys.difference(baseline) {
        out.delta.tasks_done += 1;
        out.delta.total_earned = out
            .delta
            .total_earned
            .saturating_add(catalog.value_of(&key.task_id));
        out.newly_counted.push(key.clone());
    }

    if let Some(required) = required_tasks {
        if !required.is_empty() {
            let key_of = |task: &TaskId| CompletionKey {
                mission_id: after.mission_id.clone(),
                task_id: task.clone(),
            };
            let covers_baseline = required.iter().all(|t| baseline.contains(&key_of(t)));
            let covers_after = required.iter().all(|t| {
                let k = key_of(t);
                after_keys.contains(&k) || baseline.contains(&k)
            });
            if covers_after && !covers_baseline {
                out.delta.missions_completed = 1;
            }
        }
    }

    out
}

/// Applies event-driven deltas to the stats store.
pub struct StatsAggregator {
    catalog: HonorsCatalog,
    store: Arc<dyn StatsStore>,
}

impl StatsAggregator {
    pub fn new(catalog: HonorsCatalog, store: Arc<dyn StatsStore>) -> Self {
        Self { catalog, store }
    }

    pub fn store(&self) -> Arc<dyn StatsStore> {
        self.store.clone()
    }

    /// Handle a participation create/update event. The baseline is the
    /// union of the before-snapshot's completed keys and the store's
    /// counted set, so both unchanged rewrites and redelivered events
    /// diff to zero. Returns the applied delta.
    pub async fn on_participation_write(
        &self,
        before: Option<&Participation>,
        after: &Participation,
        required_tasks: Option<&[TaskId]>,
    ) -> StatsDelta {
        let mut baseline = match self.store.counted_keys(&after.user_id).await {
            Ok(counted) => counted,
            Err(e) => {
                self.journal(Some(&after.user_id), "participation write", &e.to_string())
                    .await;
                return StatsDelta::default();
            }
        };
        if let Some(before) = before {
            baseline.extend(before.completed_keys());
        }

        let outcome = participation_delta(&self.catalog, &baseline, after, required_tasks);
        if outcome.delta.is_zero() {
            debug!(
                user = %after.user_id,
                mission = %after.mission_id,
                "No stats delta for participation write"
            );
            return outcome.delta;
        }

        self.apply_counted(
            &after.user_id,
            outcome.delta,
            &outcome.newly_counted,
            "participation write",
        )
        .await;
        outcome.delta
    }

    /// Handle a mission-creation event. Soft-deleted missions never
    /// reach the creator's counters.
    pub async fn on_mission_created(&self, mission: &Mission) {
        if mission.deleted {
            debug!(mission = %mission.id, "Soft-deleted mission excluded from creator stats");
            return;
        }
        self.apply(&mission.creator, StatsDelta::mission_created(), "mission created")
            .await;
    }

    /// Merge a key-less delta (mission creations, winner payouts,
    /// review rewards) into a user's summary.
    pub async fn apply(
        &self,
        user: &UserId,
        delta: StatsDelta,
        context: &str,
    ) -> Option<UserStatsSummary> {
        self.apply_counted(user, delta, &[], context).await
    }

    /// Merge a delta into a user's summary, marking `newly_counted`
    /// credited. A store failure is journaled and swallowed (returns
    /// `None`); drift is corrected later by reconciliation.
    async fn apply_counted(
        &self,
        user: &UserId,
        delta: StatsDelta,
        newly_counted: &[CompletionKey],
        context: &str,
    ) -> Option<UserStatsSummary> {
        match self.store.merge(user, &delta, newly_counted).await {
            Ok(summary) => {
                info!(
                    user = %user,
                    tasks_done = delta.tasks_done,
                    earned = delta.total_earned.to_f64(),
                    missions_created = delta.missions_created,
                    missions_completed = delta.missions_completed,
                    reviews_done = delta.reviews_done,
                    context,
                    "📊 User stats updated"
                );
                Some(summary)
            }
            Err(e) => {
                warn!(user = %user, context, error = %e, "Stats update failed, journaling");
                self.journal(Some(user), context, &e.to_string()).await;
                None
            }
        }
    }

    async fn journal(&self, user: Option<&UserId>, event: &str, error: &str) {
        let failure = StatsFailure {
            user: user.cloned(),
            event: event.to_string(),
            error: error.to_string(),
            occurred_at: Utc::now(),
        };
        if let Err(journal_err) = self.store.record_failure(failure).await {
            warn!(error = %journal_err, "Could not journal stats failure");
        }
    }
}

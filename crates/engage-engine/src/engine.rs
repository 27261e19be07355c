//! Mission facade: one entry point wiring pricing, wallets, counters,
//! stats, payouts, and peer review together.
//!
//! Operations mirror the platform's external event surface (mission
//! creation, task-completion events, winner selection, review
//! submission). Each applies its guards up front and then routes
//! effects to the owning component; the engine owns the cross-component
//! ordering, the components own their own atomicity.

use crate::error::{EngineError, Result};
use crate::store::MissionStore;
use chrono::{DateTime, Duration, Utc};
use engage_catalog::{DegenPresetTable, HonorsCatalog, TaskCatalog};
use engage_economics::{LedgerReason, LedgerStorage, WalletManager};
use engage_payout::{
    DegenPayoutCalculator, DistributionReceipt, PayoutDistributor, WinnerSelection,
};
use engage_pricing::{PricingCalculator, PricingConfig, QuoteBreakdown};
use engage_review::{ReviewConfig, ReviewEngine, ReviewReceipt, ReviewerIdentity, SubmissionKey};
use engage_stats::{
    MissionCounterStore, ReconcileReport, Reconciler, StatsAggregator, StatsDelta, StatsFailure,
    StatsSource, StatsStore, UserStatsSummary,
};
use engage_status::{stage, LifecycleStage};
use engage_types::{
    Honors, Mission, MissionAggregates, MissionDraft, MissionId, MissionModel, MissionStatus,
    Participation, ParticipationId, TaskId, UserId,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Facade construction parameters.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    pub pricing: PricingConfig,
    pub review: ReviewConfig,
}

/// Outcome of one task-completion event.
#[derive(Debug, Clone)]
pub struct CompletionReceipt {
    pub mission_id: MissionId,
    pub user_id: UserId,
    pub task_id: TaskId,
    /// `false` when the task was already completed and nothing moved.
    pub newly_completed: bool,
    /// Honors credited immediately; always zero for degen missions,
    /// which pay at winner selection.
    pub credited: Honors,
    pub stats_delta: StatsDelta,
}

/// Central engine coordinating every mission operation. Component
/// handles are public so callers can reach wallet balances, counter
/// snapshots, or review queries directly; mutations go through the
/// engine methods.
pub struct MissionEngine {
    pub pricing: Arc<PricingCalculator>,
    pub wallets: Arc<WalletManager>,
    pub stats: Arc<StatsAggregator>,
    pub counters: Arc<MissionCounterStore>,
    pub review: Arc<ReviewEngine>,
    pub reconciler: Arc<Reconciler>,
    catalog: HonorsCatalog,
    missions: Arc<dyn MissionStore>,
    payouts: DegenPayoutCalculator,
    distributor: PayoutDistributor,
}

impl MissionEngine {
    /// Wire the full engine over one document store (which also serves
    /// as the reconciler's raw-document source), a wallet ledger, and a
    /// stats store.
    pub fn new<S>(
        config: EngineConfig,
        store: Arc<S>,
        ledger: Arc<dyn LedgerStorage>,
        stats_store: Arc<dyn StatsStore>,
    ) -> Self
    where
        S: MissionStore + StatsSource + 'static,
    {
        let missions: Arc<dyn MissionStore> = store.clone();
        let source: Arc<dyn StatsSource> = store;

        let catalog = HonorsCatalog::standard();
        let wallets = Arc::new(WalletManager::new(ledger));
        let stats = Arc::new(StatsAggregator::new(catalog.clone(), stats_store.clone()));
        let counters = Arc::new(MissionCounterStore::new());
        let review = Arc::new(ReviewEngine::new(
            config.review,
            wallets.clone(),
            stats.clone(),
        ));
        let reconciler = Arc::new(Reconciler::new(catalog.clone(), source, stats_store));
        let pricing = Arc::new(PricingCalculator::new(
            catalog.clone(),
            TaskCatalog::standard(),
            DegenPresetTable::standard(),
            config.pricing,
        ));
        let payouts = DegenPayoutCalculator::new(catalog.clone());
        let distributor = PayoutDistributor::new(wallets.clone(), stats.clone());

        Self {
            pricing,
            wallets,
            stats,
            counters,
            review,
            reconciler,
            catalog,
            missions,
            payouts,
            distributor,
        }
    }

    /// Price a draft and create the mission with totals frozen from the
    /// quote. Degen missions take their end time from the duration
    /// preset and freeze the per-winner pool share as their flat winner
    /// payout; fixed missions run until the caller-supplied `ends_at`.
    pub async fn create_mission(
        &self,
        draft: MissionDraft,
        ends_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<Mission> {
        let quote = self.pricing.quote(&draft)?;

        let (model, ends_at) = match quote.breakdown {
            QuoteBreakdown::Fixed {
                cap,
                per_user_honors,
                ..
            } => (
                MissionModel::Fixed {
                    cap,
                    per_user_honors,
                },
                ends_at,
            ),
            QuoteBreakdown::Degen {
                duration_hours,
                winners_cap,
                per_winner_honors,
                ..
            } => (
                MissionModel::Degen {
                    duration_hours,
                    winners_cap,
                    winner_payout: Some(per_winner_honors),
                    task_rewards: HashMap::new(),
                },
                Some(now + Duration::hours(i64::from(duration_hours))),
            ),
        };

        let mission = Mission {
            id: derive_mission_id(&draft, now),
            creator: draft.creator,
            platform: draft.platform,
            kind: draft.kind,
            model,
            target: draft.target,
            tasks: draft.tasks,
            total_cost_usd: quote.total_cost_usd,
            total_cost_honors: quote.total_cost_honors,
            status: MissionStatus::Active,
            deleted: false,
            created_at: now,
            started_at: now,
            ends_at,
        };

        self.missions.insert_mission(mission.clone()).await?;
        self.counters.init_mission(&mission, now).await;
        self.stats.on_mission_created(&mission).await;

        info!(
            mission = %mission.id,
            creator = %mission.creator,
            cost_honors = %mission.total_cost_honors,
            cost_usd = %mission.total_cost_usd,
            "📜 Mission created"
        );
        Ok(mission)
    }

    /// Record one verified task completion.
    ///
    /// Redelivery of the same (mission, task, user) completion returns
    /// a no-op receipt: nothing is credited or counted twice. Fixed
    /// missions credit the task's catalog value immediately; degen
    /// missions pay nothing until winner selection.
    pub async fn record_task_completion(
        &self,
        mission_id: &MissionId,
        user_id: &UserId,
        task_id: &TaskId,
        proof_url: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<CompletionReceipt> {
        let mission = self.require_active(mission_id).await?;

        if !mission.tasks.contains(task_id) {
            return Err(EngineError::TaskNotInMission {
                mission: mission_id.clone(),
                task: task_id.clone(),
            });
        }

        if let Some(cap) = mission.winners_per_task() {
            if let Some(aggregates) = self.counters.snapshot(mission_id).await {
                if aggregates.count_for(task_id) >= u64::from(cap) {
                    return Err(EngineError::TaskCapReached {
                        task: task_id.clone(),
                        cap,
                    });
                }
            }
        }

        let before = self.missions.participation(mission_id, user_id).await?;
        let mut after = before
            .clone()
            .unwrap_or_else(|| Participation::new(mission_id.clone(), user_id.clone(), now));

        if !after.record_completion(task_id.clone(), proof_url, now) {
            debug!(
                mission = %mission_id,
                user = %user_id,
                task = %task_id,
                "Task already completed, completion event ignored"
            );
            return Ok(CompletionReceipt {
                mission_id: mission_id.clone(),
                user_id: user_id.clone(),
                task_id: task_id.clone(),
                newly_completed: false,
                credited: Honors::ZERO,
                stats_delta: StatsDelta::default(),
            });
        }

        // Wallet credit goes first; nothing else is written if it fails.
        let credited = match &mission.model {
            MissionModel::Fixed { .. } => {
                let value = self.catalog.value_of(task_id);
                self.wallets
                    .credit(
                        user_id,
                        value,
                        LedgerReason::TaskReward,
                        Some(mission_id),
                        Some(task_id),
                    )
                    .await
                    .map_err(|e| EngineError::Wallet(e.to_string()))?;
                value
            }
            MissionModel::Degen { .. } => Honors::ZERO,
        };

        after.total_honors_earned = after.total_honors_earned.saturating_add(credited);
        self.missions.upsert_participation(after.clone()).await?;
        self.counters
            .record_completion(mission_id, task_id, now)
            .await;

        let stats_delta = self
            .stats
            .on_participation_write(before.as_ref(), &after, Some(mission.required_tasks()))
            .await;

        info!(
            mission = %mission_id,
            user = %user_id,
            task = %task_id,
            credited = credited.to_f64(),
            "✅ Task completion recorded"
        );

        Ok(CompletionReceipt {
            mission_id: mission_id.clone(),
            user_id: user_id.clone(),
            task_id: task_id.clone(),
            newly_completed: true,
            credited,
            stats_delta,
        })
    }

    /// Resolve, validate, and distribute payouts for a degen mission's
    /// selected winners, then append the winner records the batch stats
    /// path recounts from. A set failing validation is journaled and
    /// blocks distribution.
    pub async fn select_winners(
        &self,
        mission_id: &MissionId,
        selections: &[WinnerSelection],
    ) -> Result<DistributionReceipt> {
        let mission = self.require_active(mission_id).await?;
        if !mission.is_degen() {
            return Err(EngineError::NotDegenMission(mission_id.clone()));
        }

        let set = self.payouts.calculate(&mission, selections);
        let receipt = match self.distributor.distribute(&set).await {
            Ok(receipt) => receipt,
            Err(e) => {
                warn!(mission = %mission_id, error = %e, "Winner payout blocked");
                let failure = StatsFailure {
                    user: None,
                    event: format!("winner payout for {mission_id}"),
                    error: e.to_string(),
                    occurred_at: Utc::now(),
                };
                if let Err(journal_err) = self.stats.store().record_failure(failure).await {
                    warn!(error = %journal_err, "Could not journal payout failure");
                }
                return Err(e.into());
            }
        };

        for winner in set.winners {
            self.missions.record_winner(winner).await?;
        }
        Ok(receipt)
    }

    /// Derived lifecycle stage over the live completion counters. A
    /// mission with no counter activity yet is staged against an empty
    /// aggregate.
    pub async fn mission_stage(
        &self,
        mission_id: &MissionId,
        now: DateTime<Utc>,
    ) -> Result<LifecycleStage> {
        let mission = self.require_active(mission_id).await?;
        let aggregates = match self.counters.snapshot(mission_id).await {
            Some(aggregates) => aggregates,
            None => MissionAggregates::new(
                mission_id.clone(),
                mission.winners_per_task(),
                mission.tasks.len() as u32,
                mission.started_at,
            ),
        };
        Ok(stage(now, &mission, &aggregates))
    }

    /// Soft-delete a mission. Derived aggregates exclude it from then
    /// on; already-paid winner and review rewards stand. Stored user
    /// summaries catch up at the next reconciliation.
    pub async fn delete_mission(&self, mission_id: &MissionId) -> Result<()> {
        if !self.missions.soft_delete(mission_id).await? {
            return Err(EngineError::MissionNotFound(mission_id.clone()));
        }
        info!(mission = %mission_id, "Mission soft-deleted");
        Ok(())
    }

    /// Open the peer-review cycle for a completed task's proof. The
    /// completion must exist; the returned submission key is what
    /// reviewers target.
    pub async fn open_review(
        &self,
        mission_id: &MissionId,
        user_id: &UserId,
        task_id: &TaskId,
        now: DateTime<Utc>,
    ) -> Result<SubmissionKey> {
        let mission = self.require_active(mission_id).await?;

        let completed = self
            .missions
            .participation(mission_id, user_id)
            .await?
            .map(|p| p.has_completed(task_id))
            .unwrap_or(false);
        if !completed {
            return Err(EngineError::CompletionNotFound {
                mission: mission_id.clone(),
                task: task_id.clone(),
                user: user_id.clone(),
            });
        }

        let participation_id = ParticipationId::new(format!("{mission_id}:{user_id}"));
        Ok(self
            .review
            .open_submission(&participation_id, task_id, user_id, mission.platform, now)
            .await)
    }

    /// Submit one review through the review engine and append the
    /// reviewer-reward record the batch stats path recounts from.
    pub async fn submit_review(
        &self,
        reviewer: &ReviewerIdentity,
        key: &SubmissionKey,
        rating: u8,
        comment_link: &str,
        now: DateTime<Utc>,
    ) -> Result<ReviewReceipt> {
        let receipt = self
            .review
            .submit_review(reviewer, key, rating, comment_link, now)
            .await?;
        self.missions
            .record_review_reward(&reviewer.id, receipt.honors_credited)
            .await?;
        Ok(receipt)
    }

    /// Rebuild a user's stats from raw documents and correct any drift.
    pub async fn reconcile_user(&self, user: &UserId) -> Result<ReconcileReport> {
        Ok(self.reconciler.reconcile(user).await?)
    }

    /// Fetch a mission, deleted or not.
    pub async fn mission(&self, mission_id: &MissionId) -> Result<Mission> {
        self.missions
            .mission(mission_id)
            .await?
            .ok_or_else(|| EngineError::MissionNotFound(mission_id.clone()))
    }

    pub async fn participation(
        &self,
        mission_id: &MissionId,
        user_id: &UserId,
    ) -> Result<Option<Participation>> {
        Ok(self.missions.participation(mission_id, user_id).await?)
    }

    pub async fn user_stats(&self, user: &UserId) -> Result<Option<UserStatsSummary>> {
        Ok(self.stats.store().summary(user).await?)
    }

    async fn require_active(&self, mission_id: &MissionId) -> Result<Mission> {
        let mission = self.mission(mission_id).await?;
        if mission.deleted {
            return Err(EngineError::MissionDeleted(mission_id.clone()));
        }
        Ok(mission)
    }
}

/// Content-derived mission id: creator, creation instant, and task list
/// hashed together.
fn derive_mission_id(draft: &MissionDraft, now: DateTime<Utc>) -> MissionId {
    let mut hasher = blake3::Hasher::new();
    hasher.update(draft.creator.as_str().as_bytes());
    hasher.update(&now.timestamp_micros().to_le_bytes());
    for task in &draft.tasks {
        hasher.update(b":");
        hasher.update(task.as_str().as_bytes());
    }
    let digest = hex::encode(hasher.finalize().as_bytes());
    MissionId::new(format!("mission-{}", &digest[..16]))
}

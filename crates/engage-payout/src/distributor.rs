//! Applies a validated payout set to wallets and stats.

use crate::calculator::{validate_payouts, DegenPayoutSet};
use crate::error::{PayoutError, Result};
use engage_economics::{LedgerReason, WalletCredit, WalletManager};
use engage_stats::{StatsAggregator, StatsDelta};
use engage_types::{Honors, MissionId, Usd};
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct DistributionReceipt {
    pub mission_id: MissionId,
    pub winners_paid: u32,
    pub total_paid: Honors,
    pub total_usd: Usd,
    /// Stat merges that failed and were journaled; wallet credits for
    /// these winners still landed.
    pub stats_failures: u32,
}

/// Pays winners out. The wallet side (balances, USD shadow, ledger) is
/// one all-or-nothing batch; stat increments follow per winner and are
/// journaled on failure, with reconciliation as the backstop.
pub struct PayoutDistributor {
    wallets: Arc<WalletManager>,
    stats: Arc<StatsAggregator>,
}

impl PayoutDistributor {
    pub fn new(wallets: Arc<WalletManager>, stats: Arc<StatsAggregator>) -> Self {
        Self { wallets, stats }
    }

    /// Validate and apply a payout set. A set failing validation is
    /// rejected before any balance moves.
    pub async fn distribute(&self, set: &DegenPayoutSet) -> Result<DistributionReceipt> {
        validate_payouts(set)?;

        if set.winners.is_empty() {
            debug!(mission = %set.mission_id, "Empty payout set, nothing to distribute");
            return Ok(DistributionReceipt {
                mission_id: set.mission_id.clone(),
                winners_paid: 0,
                total_paid: Honors::ZERO,
                total_usd: Usd::ZERO,
                stats_failures: 0,
            });
        }

        let credits: Vec<WalletCredit> = set
            .winners
            .iter()
            .map(|w| WalletCredit {
                user: w.user_id.clone(),
                amount: w.payout,
                task_id: Some(w.task_id.clone()),
            })
            .collect();

        let receipt = self
            .wallets
            .credit_batch(&credits, LedgerReason::DegenPayout, Some(&set.mission_id))
            .await
            .map_err(|e| PayoutError::Wallet(e.to_string()))?;

        let mut stats_failures = 0u32;
        for winner in &set.winners {
            let applied = self
                .stats
                .apply(
                    &winner.user_id,
                    StatsDelta::winner_payout(winner.payout),
                    "degen payout",
                )
                .await;
            if applied.is_none() {
                stats_failures += 1;
            }
        }

        info!(
            mission = %set.mission_id,
            winners = set.total_winners,
            total = %set.total_payout,
            stats_failures,
            "💸 Degen payouts distributed"
        );

        Ok(DistributionReceipt {
            mission_id: set.mission_id.clone(),
            winners_paid: set.total_winners,
            total_paid: receipt.total_honors,
            total_usd: receipt.total_usd,
            stats_failures,
        })
    }
}

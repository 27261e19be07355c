use crate::storage::{LedgerEntry, LedgerReason, LedgerStorage};
use anyhow::{bail, Result};
use chrono::Utc;
use engage_types::{Honors, MissionId, TaskId, UserId, Usd};
use std::sync::Arc;
use tracing::info;

/// One credit inside an all-or-nothing batch.
#[derive(Debug, Clone)]
pub struct WalletCredit {
    pub user: UserId,
    pub amount: Honors,
    pub task_id: Option<TaskId>,
}

/// Outcome of a committed batch credit.
#[derive(Debug, Clone)]
pub struct BatchReceipt {
    pub credits_applied: usize,
    pub total_honors: Honors,
    pub total_usd: Usd,
}

/// Honors wallet over pluggable ledger storage. Every credit moves the
/// USD shadow balance at the fixed rate and appends an immutable ledger
/// entry; batch credits are atomic across the whole batch.
pub struct WalletManager {
    storage: Arc<dyn LedgerStorage>,
}

impl WalletManager {
    pub fn new(storage: Arc<dyn LedgerStorage>) -> Self {
        Self { storage }
    }

    pub async fn balance(&self, user: &UserId) -> Result<Honors> {
        self.storage.get_honors(user).await
    }

    pub async fn usd_shadow(&self, user: &UserId) -> Result<Usd> {
        self.storage.get_usd_shadow(user).await
    }

    pub async fn history(&self, user: &UserId) -> Result<Vec<LedgerEntry>> {
        self.storage.entries_for(user).await
    }

    pub async fn credit(
        &self,
        user: &UserId,
        amount: Honors,
        reason: LedgerReason,
        mission_id: Option<&MissionId>,
        task_id: Option<&TaskId>,
    ) -> Result<()> {
        if amount.is_zero() {
            return Ok(());
        }

        let entry = self
            .credit_internal(user, amount, reason, mission_id, task_id)
            .await?;
        self.storage.record_entry(entry).await?;

        info!(
            user = %user,
            amount = amount.to_f64(),
            reason = ?reason,
            "💰 Wallet credited"
        );
        Ok(())
    }

    pub async fn debit(&self, user: &UserId, amount: Honors, reason: LedgerReason) -> Result<()> {
        if amount.is_zero() {
            return Ok(());
        }

        let current = self.storage.get_honors(user).await?;
        let new_balance = current.checked_sub(amount).ok_or_else(|| {
            anyhow::anyhow!(
                "Insufficient balance for {}: has {}, needs {}",
                user,
                current,
                amount
            )
        })?;
        self.storage.set_honors(user, new_balance).await?;

        let shadow = self.storage.get_usd_shadow(user).await?;
        self.storage
            .set_usd_shadow(user, shadow.saturating_sub(amount.to_usd()))
            .await?;

        self.storage
            .record_entry(self.ledger_entry(user, amount, reason, None, None))
            .await?;

        info!(
            user = %user,
            amount = amount.to_f64(),
            balance_before = current.to_f64(),
            balance_after = new_balance.to_f64(),
            "💸 Wallet debited"
        );
        Ok(())
    }

    /// Apply a batch of credits as one atomic unit: either every wallet,
    /// shadow balance, and ledger entry lands, or none do.
    pub async fn credit_batch(
        &self,
        credits: &[WalletCredit],
        reason: LedgerReason,
        mission_id: Option<&MissionId>,
    ) -> Result<BatchReceipt> {
        if credits.is_empty() {
            return Ok(BatchReceipt {
                credits_applied: 0,
                total_honors: Honors::ZERO,
                total_usd: Usd::ZERO,
            });
        }

        self.storage.begin_transaction().await?;

        match self.credit_batch_internal(credits, reason, mission_id).await {
            Ok(receipt) => {
                self.storage.commit_transaction().await?;
                info!(
                    credits = receipt.credits_applied,
                    total_honors = receipt.total_honors.to_f64(),
                    total_usd = receipt.total_usd.to_f64(),
                    mission_id = mission_id.map(|m| m.as_str()),
                    "✅ Batch credit committed"
                );
                Ok(receipt)
            }
            Err(e) => {
                info!(
                    credits = credits.len(),
                    error = %e,
                    "❌ Batch credit rolled back"
                );
                self.storage.rollback_transaction().await?;
                Err(e)
            }
        }
    }

    async fn credit_batch_internal(
        &self,
        credits: &[WalletCredit],
        reason: LedgerReason,
        mission_id: Option<&MissionId>,
    ) -> Result<BatchReceipt> {
        let mut total_honors = Honors::ZERO;
        let mut total_usd = Usd::ZERO;

        for credit in credits {
            if credit.amount.is_zero() {
                bail!("Zero-amount credit for {} inside batch", credit.user);
            }
            let entry = self
                .credit_internal(
                    &credit.user,
                    credit.amount,
                    reason,
                    mission_id,
                    credit.task_id.as_ref(),
                )
                .await?;
            self.storage.record_entry(entry).await?;

            total_honors = total_honors
                .checked_add(credit.amount)
                .ok_or_else(|| anyhow::anyhow!("Batch total overflow"))?;
            total_usd = total_usd.saturating_add(credit.amount.to_usd());
        }

        Ok(BatchReceipt {
            credits_applied: credits.len(),
            total_honors,
            total_usd,
        })
    }

    async fn credit_internal(
        &self,
        user: &UserId,
        amount: Honors,
        reason: LedgerReason,
        mission_id: Option<&MissionId>,
        task_id: Option<&TaskId>,
    ) -> Result<LedgerEntry> {
        let current = self.storage.get_honors(user).await?;
        let new_balance = current
            .checked_add(amount)
            .ok_or_else(|| anyhow::anyhow!("Balance overflow for {}", user))?;
        self.storage.set_honors(user, new_balance).await?;

        let shadow = self.storage.get_usd_shadow(user).await?;
        self.storage
            .set_usd_shadow(user, shadow.saturating_add(amount.to_usd()))
            .await?;

        Ok(self.ledger_entry(user, amount, reason, mission_id, task_id))
    }

    fn ledger_entry(
        &self,
        user: &UserId,
        amount: Honors,
        reason: LedgerReason,
        mission_id: Option<&MissionId>,
        task_id: Option<&TaskId>,
    ) -> LedgerEntry {
        let recorded_at = Utc::now();

        let mut hasher = blake3::Hasher::new();
        hasher.update(user.as_str().as_bytes());
        hasher.update(&amount.to_base_units().to_le_bytes());
        if let Some(mission) = mission_id {
            hasher.update(mission.as_str().as_bytes());
        }
        if let Some(task) = task_id {
            hasher.update(task.as_str().as_bytes());
        }
        hasher.update(&recorded_at.timestamp_micros().to_le_bytes());
        let entry_hash = hex::encode(hasher.finalize().as_bytes());

        LedgerEntry {
            user: user.clone(),
            amount,
            usd_delta: amount.to_usd(),
            reason,
            mission_id: mission_id.cloned(),
            task_id: task_id.cloned(),
            entry_hash,
            recorded_at,
        }
    }
}

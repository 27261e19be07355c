use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use engage_types::{Honors, MissionId, TaskId, Usd, UserId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

/// Why honors moved. Recorded on every ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerReason {
    TaskReward,
    DegenPayout,
    ReviewReward,
    Adjustment,
}

/// Immutable record of one balance movement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub user: UserId,
    pub amount: Honors,
    /// USD-equivalent shadow delta applied alongside the honors.
    pub usd_delta: Usd,
    pub reason: LedgerReason,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mission_id: Option<MissionId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<TaskId>,
    pub entry_hash: String,
    pub recorded_at: DateTime<Utc>,
}

type BalanceMap = HashMap<UserId, Honors>;
type ShadowMap = HashMap<UserId, Usd>;
// Snapshot taken at begin_transaction: both maps plus the ledger length,
// so a rollback also drops entries appended inside the transaction.
type TransactionBackup = Option<(BalanceMap, ShadowMap, usize)>;

#[async_trait]
pub trait LedgerStorage: Send + Sync {
    async fn get_honors(&self, user: &UserId) -> Result<Honors>;
    async fn set_honors(&self, user: &UserId, balance: Honors) -> Result<()>;
    async fn get_usd_shadow(&self, user: &UserId) -> Result<Usd>;
    async fn set_usd_shadow(&self, user: &UserId, balance: Usd) -> Result<()>;
    async fn all_users(&self) -> Result<Vec<UserId>>;

    async fn begin_transaction(&self) -> Result<()>;
    async fn commit_transaction(&self) -> Result<()>;
    async fn rollback_transaction(&self) -> Result<()>;

    async fn record_entry(&self, entry: LedgerEntry) -> Result<()>;
    async fn entries_for(&self, user: &UserId) -> Result<Vec<LedgerEntry>>;
}

pub struct MemoryLedger {
    honors: Arc<RwLock<BalanceMap>>,
    usd_shadow: Arc<RwLock<ShadowMap>>,
    backup: Arc<RwLock<TransactionBackup>>,
    history: Arc<RwLock<Vec<LedgerEntry>>>,
}

impl Default for MemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self {
            honors: Arc::new(RwLock::new(HashMap::new())),
            usd_shadow: Arc::new(RwLock::new(HashMap::new())),
            backup: Arc::new(RwLock::new(None)),
            history: Arc::new(RwLock::new(Vec::new())),
        }
    }
}

#[async_trait]
impl LedgerStorage for MemoryLedger {
    async fn get_honors(&self, user: &UserId) -> Result<Honors> {
        let honors = self.honors.read().await;
        Ok(honors.get(user).copied().unwrap_or(Honors::ZERO))
    }

    async fn set_honors(&self, user: &UserId, balance: Honors) -> Result<()> {
        let mut honors = self.honors.write().await;
        if balance.is_zero() {
            honors.remove(user);
        } else {
            honors.insert(user.clone(), balance);
        }
        Ok(())
    }

    async fn get_usd_shadow(&self, user: &UserId) -> Result<Usd> {
        let shadow = self.usd_shadow.read().await;
        Ok(shadow.get(user).copied().unwrap_or(Usd::ZERO))
    }

    async fn set_usd_shadow(&self, user: &UserId, balance: Usd) -> Result<()> {
        let mut shadow = self.usd_shadow.write().await;
        if balance.is_zero() {
            shadow.remove(user);
        } else {
            shadow.insert(user.clone(), balance);
        }
        Ok(())
    }

    async fn all_users(&self) -> Result<Vec<UserId>> {
        let honors = self.honors.read().await;
        let shadow = self.usd_shadow.read().await;

        let mut users: Vec<UserId> = honors.keys().cloned().collect();
        for user in shadow.keys() {
            if !honors.contains_key(user) {
                users.push(user.clone());
            }
        }
        Ok(users)
    }

    async fn begin_transaction(&self) -> Result<()> {
        let honors = self.honors.read().await;
        let shadow = self.usd_shadow.read().await;
        let history = self.history.read().await;

        let mut backup = self.backup.write().await;
        *backup = Some((honors.clone(), shadow.clone(), history.len()));

        info!(
            wallets = honors.len(),
            ledger_len = history.len(),
            "📝 Ledger transaction began (snapshot created)"
        );
        Ok(())
    }

    async fn commit_transaction(&self) -> Result<()> {
        let mut backup = self.backup.write().await;
        if backup.take().is_some() {
            info!("✅ Ledger transaction committed (snapshot discarded)");
        }
        Ok(())
    }

    async fn rollback_transaction(&self) -> Result<()> {
        let mut backup = self.backup.write().await;

        if let Some((honors_backup, shadow_backup, history_len)) = backup.take() {
            let mut honors = self.honors.write().await;
            let mut shadow = self.usd_shadow.write().await;
            let mut history = self.history.write().await;

            *honors = honors_backup;
            *shadow = shadow_backup;
            let dropped = history.len().saturating_sub(history_len);
            history.truncate(history_len);

            info!(
                entries_dropped = dropped,
                "❌ Ledger transaction rolled back (snapshot restored)"
            );
        }
        Ok(())
    }

    async fn record_entry(&self, entry: LedgerEntry) -> Result<()> {
        let mut history = self.history.write().await;
        history.push(entry);
        Ok(())
    }

    async fn entries_for(&self, user: &UserId) -> Result<Vec<LedgerEntry>> {
        let history = self.history.read().await;
        Ok(history
            .iter()
            .filter(|e| &e.user == user)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_ledger_basics() {
        let ledger = MemoryLedger::new();
        let user = UserId::new("u1");

        assert_eq!(ledger.get_honors(&user).await.unwrap(), Honors::ZERO);

        let amount = Honors::from_whole(100);
        ledger.set_honors(&user, amount).await.unwrap();
        assert_eq!(ledger.get_honors(&user).await.unwrap(), amount);

        ledger
            .set_usd_shadow(&user, Usd::from_whole(2))
            .await
            .unwrap();
        assert_eq!(ledger.all_users().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_rollback_restores_balances_and_history() {
        let ledger = MemoryLedger::new();
        let user = UserId::new("u2");
        ledger
            .set_honors(&user, Honors::from_whole(50))
            .await
            .unwrap();

        ledger.begin_transaction().await.unwrap();
        ledger
            .set_honors(&user, Honors::from_whole(500))
            .await
            .unwrap();
        ledger
            .record_entry(LedgerEntry {
                user: user.clone(),
                amount: Honors::from_whole(450),
                usd_delta: Usd::from_whole(1),
                reason: LedgerReason::DegenPayout,
                mission_id: None,
                task_id: None,
                entry_hash: "deadbeef".to_string(),
                recorded_at: Utc::now(),
            })
            .await
            .unwrap();

        ledger.rollback_transaction().await.unwrap();

        assert_eq!(
            ledger.get_honors(&user).await.unwrap(),
            Honors::from_whole(50)
        );
        assert!(ledger.entries_for(&user).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_commit_keeps_changes() {
        let ledger = MemoryLedger::new();
        let user = UserId::new("u3");

        ledger.begin_transaction().await.unwrap();
        ledger
            .set_honors(&user, Honors::from_whole(75))
            .await
            .unwrap();
        ledger.commit_transaction().await.unwrap();

        assert_eq!(
            ledger.get_honors(&user).await.unwrap(),
            Honors::from_whole(75)
        );
        // A rollback after commit must be a no-op.
        ledger.rollback_transaction().await.unwrap();
        assert_eq!(
            ledger.get_honors(&user).await.unwrap(),
            Honors::from_whole(75)
        );
    }
}

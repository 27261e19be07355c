//! Mission document storage.
//!
//! Missions, participations, winner records, and review-reward records
//! are the raw documents every derived number (wallets aside) can be
//! rebuilt from. The store doubles as the reconciler's [`StatsSource`]
//! so the batch path reads exactly what the incremental path wrote.

use anyhow::Result;
use async_trait::async_trait;
use engage_stats::StatsSource;
use engage_types::{DegenWinner, Honors, Mission, MissionId, Participation, UserId};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Persistence for mission documents and their dependents. Participations
/// are keyed by (mission, user); winner and review-reward records are
/// append-only.
#[async_trait]
pub trait MissionStore: Send + Sync {
    async fn insert_mission(&self, mission: Mission) -> Result<()>;

    async fn mission(&self, id: &MissionId) -> Result<Option<Mission>>;

    /// Mark a mission deleted without removing it. Returns `false` for
    /// an unknown id.
    async fn soft_delete(&self, id: &MissionId) -> Result<bool>;

    async fn participation(
        &self,
        mission: &MissionId,
        user: &UserId,
    ) -> Result<Option<Participation>>;

    async fn upsert_participation(&self, participation: Participation) -> Result<()>;

    async fn record_winner(&self, winner: DegenWinner) -> Result<()>;

    async fn record_review_reward(&self, user: &UserId, amount: Honors) -> Result<()>;
}

#[derive(Default)]
struct MissionState {
    missions: HashMap<MissionId, Mission>,
    participations: HashMap<(MissionId, UserId), Participation>,
    winners: Vec<DegenWinner>,
    review_rewards: Vec<(UserId, Honors)>,
}

/// In-memory store used by tests and single-process deployments. One
/// lock guards all document kinds so cross-document reads see a
/// consistent snapshot.
pub struct MemoryMissionStore {
    state: RwLock<MissionState>,
}

impl MemoryMissionStore {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(MissionState::default()),
        }
    }
}

impl Default for MemoryMissionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MissionStore for MemoryMissionStore {
    async fn insert_mission(&self, mission: Mission) -> Result<()> {
        self.state
            .write()
            .await
            .missions
            .insert(mission.id.clone(), mission);
        Ok(())
    }

    async fn mission(&self, id: &MissionId) -> Result<Option<Mission>> {
        Ok(self.state.read().await.missions.get(id).cloned())
    }

    async fn soft_delete(&self, id: &MissionId) -> Result<bool> {
        let mut state = self.state.write().await;
        match state.missions.get_mut(id) {
            Some(mission) => {
                mission.deleted = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn participation(
        &self,
        mission: &MissionId,
        user: &UserId,
    ) -> Result<Option<Participation>> {
        Ok(self
            .state
            .read()
            .await
            .participations
            .get(&(mission.clone(), user.clone()))
            .cloned())
    }

    async fn upsert_participation(&self, participation: Participation) -> Result<()> {
        let key = (
            participation.mission_id.clone(),
            participation.user_id.clone(),
        );
        self.state
            .write()
            .await
            .participations
            .insert(key, participation);
        Ok(())
    }

    async fn record_winner(&self, winner: DegenWinner) -> Result<()> {
        self.state.write().await.winners.push(winner);
        Ok(())
    }

    async fn record_review_reward(&self, user: &UserId, amount: Honors) -> Result<()> {
        self.state
            .write()
            .await
            .review_rewards
            .push((user.clone(), amount));
        Ok(())
    }
}

#[async_trait]
impl StatsSource for MemoryMissionStore {
    async fn missions_created_by(&self, user: &UserId) -> Result<Vec<Mission>> {
        Ok(self
            .state
            .read()
            .await
            .missions
            .values()
            .filter(|m| &m.creator == user)
            .cloned()
            .collect())
    }

    async fn participations_of(&self, user: &UserId) -> Result<Vec<Participation>> {
        Ok(self
            .state
            .read()
            .await
            .participations
            .values()
            .filter(|p| &p.user_id == user)
            .cloned()
            .collect())
    }

    async fn mission(&self, id: &MissionId) -> Result<Option<Mission>> {
        Ok(self.state.read().await.missions.get(id).cloned())
    }

    async fn winner_records_of(&self, user: &UserId) -> Result<Vec<DegenWinner>> {
        Ok(self
            .state
            .read()
            .await
            .winners
            .iter()
            .filter(|w| &w.user_id == user)
            .cloned()
            .collect())
    }

    async fn review_rewards_of(&self, user: &UserId) -> Result<Vec<Honors>> {
        Ok(self
            .state
            .read()
            .await
            .review_rewards
            .iter()
            .filter(|(u, _)| u == user)
            .map(|(_, amount)| *amount)
            .collect())
    }
}

use engage_types::Honors;
use serde::{Deserialize, Serialize};

/// Denormalized per-user stat totals.
///
/// Values only move up under incremental updates; the reconciliation
/// pass is the one writer allowed to correct them downward.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStatsSummary {
    pub missions_created: u64,
    pub missions_completed: u64,
    pub tasks_done: u64,
    pub reviews_done: u64,
    pub total_earned: Honors,
}

impl UserStatsSummary {
    /// Additive merge; the receiver is the stored state (all zeros for a
    /// summary that does not exist yet).
    pub fn merged(&self, delta: &StatsDelta) -> Self {
        Self {
            missions_created: self.missions_created.saturating_add(delta.missions_created),
            missions_completed: self
                .missions_completed
                .saturating_add(delta.missions_completed),
            tasks_done: self.tasks_done.saturating_add(delta.tasks_done),
            reviews_done: self.reviews_done.saturating_add(delta.reviews_done),
            total_earned: self.total_earned.saturating_add(delta.total_earned),
        }
    }
}

/// Increment set produced by one event. Deltas are always additive;
/// nothing in the incremental path ever subtracts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsDelta {
    pub missions_created: u64,
    pub missions_completed: u64,
    pub tasks_done: u64,
    pub reviews_done: u64,
    pub total_earned: Honors,
}

impl StatsDelta {
    pub fn mission_created() -> Self {
        Self {
            missions_created: 1,
            ..Default::default()
        }
    }

    /// One winner payout: a task done plus the paid amount.
    pub fn winner_payout(amount: Honors) -> Self {
        Self {
            tasks_done: 1,
            total_earned: amount,
            ..Default::default()
        }
    }

    /// One completed review plus its reviewer reward.
    pub fn review_completed(reward: Honors) -> Self {
        Self {
            reviews_done: 1,
            total_earned: reward,
            ..Default::default()
        }
    }

    pub fn is_zero(&self) -> bool {
        self.missions_created == 0
            && self.missions_completed == 0
            && self.tasks_done == 0
            && self.reviews_done == 0
            && self.total_earned.is_zero()
    }

    /// Fold another delta into this one.
    pub fn combine(&mut self, other: &StatsDelta) {
        self.missions_created = self.missions_created.saturating_add(other.missions_created);
        self.missions_completed = self
            .missions_completed
            .saturating_add(other.missions_completed);
        self.tasks_done = self.tasks_done.saturating_add(other.tasks_done);
        self.reviews_done = self.reviews_done.saturating_add(other.reviews_done);
        self.total_earned = self.total_earned.saturating_add(other.total_earned);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_is_additive() {
        let summary = UserStatsSummary {
            missions_created: 2,
            missions_completed: 1,
            tasks_done: 5,
            reviews_done: 0,
            total_earned: Honors::from_whole(1000),
        };
        let delta = StatsDelta {
            tasks_done: 2,
            total_earned: Honors::from_whole(320),
            ..Default::default()
        };

        let merged = summary.merged(&delta);
        assert_eq!(merged.tasks_done, 7);
        assert_eq!(merged.total_earned, Honors::from_whole(1320));
        assert_eq!(merged.missions_created, 2);
    }

    #[test]
    fn test_zero_delta() {
        assert!(StatsDelta::default().is_zero());
        assert!(!StatsDelta::mission_created().is_zero());
        assert!(!StatsDelta::winner_payout(Honors::from_whole(1)).is_zero());
        assert!(!StatsDelta::review_completed(Honors::from_whole(50)).is_zero());
    }

    #[test]
    fn test_combine_folds() {
        let mut acc = StatsDelta::default();
        acc.combine(&StatsDelta::mission_created());
        acc.combine(&StatsDelta::winner_payout(Honors::from_whole(6000)));
        assert_eq!(acc.missions_created, 1);
        assert_eq!(acc.tasks_done, 1);
        assert_eq!(acc.total_earned, Honors::from_whole(6000));
    }
}

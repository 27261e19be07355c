//! Per-winner payout resolution for degen missions.
//!
//! Resolution precedence per winner: the mission's per-task reward
//! override, else its flat winner payout, else the task's catalog
//! value. A winner resolving to zero is skipped, never paid.

use crate::error::{PayoutError, Result};
use engage_catalog::HonorsCatalog;
use engage_types::{DegenWinner, Honors, Mission, MissionId, MissionModel, TaskId, UserId};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Validation tolerance on the payout sum: 0.01 honors.
pub const PAYOUT_SUM_TOLERANCE: Honors = Honors::from_base_units(10_000);

/// A (user, task) pair chosen as winner, before payout resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinnerSelection {
    pub user_id: UserId,
    pub task_id: TaskId,
}

/// Resolved payouts for one mission's winner selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DegenPayoutSet {
    pub mission_id: MissionId,
    pub winners: Vec<DegenWinner>,
    pub total_winners: u32,
    pub total_payout: Honors,
    /// Selections dropped because they resolved to zero.
    pub skipped: u32,
}

impl DegenPayoutSet {
    pub fn empty(mission_id: MissionId) -> Self {
        Self {
            mission_id,
            winners: Vec::new(),
            total_winners: 0,
            total_payout: Honors::ZERO,
            skipped: 0,
        }
    }
}

pub struct DegenPayoutCalculator {
    catalog: HonorsCatalog,
}

impl DegenPayoutCalculator {
    pub fn new(catalog: HonorsCatalog) -> Self {
        Self { catalog }
    }

    /// Resolve payouts for the selected winners. A non-degen mission
    /// produces an empty set rather than an error; this call sits behind
    /// event plumbing that must not blow up on a mistaken invocation.
    pub fn calculate(&self, mission: &Mission, selections: &[WinnerSelection]) -> DegenPayoutSet {
        let (flat_payout, task_rewards) = match &mission.model {
            MissionModel::Degen {
                winner_payout,
                task_rewards,
                ..
            } => (*winner_payout, task_rewards),
            MissionModel::Fixed { .. } => {
                warn!(
                    mission = %mission.id,
                    "Winner payout requested for non-degen mission, returning empty set"
                );
                return DegenPayoutSet::empty(mission.id.clone());
            }
        };

        let mut set = DegenPayoutSet::empty(mission.id.clone());
        for selection in selections {
            let payout = task_rewards
                .get(&selection.task_id)
                .copied()
                .or(flat_payout)
                .unwrap_or_else(|| self.catalog.value_of(&selection.task_id));

            if payout.is_zero() {
                warn!(
                    mission = %mission.id,
                    user = %selection.user_id,
                    task = %selection.task_id,
                    "Winner resolved to zero payout, skipping"
                );
                set.skipped += 1;
                continue;
            }

            set.winners.push(DegenWinner {
                mission_id: mission.id.clone(),
                user_id: selection.user_id.clone(),
                task_id: selection.task_id.clone(),
                payout,
            });
            set.total_winners += 1;
            set.total_payout = set.total_payout.saturating_add(payout);
        }

        debug!(
            mission = %mission.id,
            winners = set.total_winners,
            total = %set.total_payout,
            skipped = set.skipped,
            "Resolved degen payouts"
        );
        set
    }
}

/// Consistency checks a payout set must pass before any wallet is
/// touched: record count matches the reported winner count, zero
/// winners and zero total imply each other, and the record sum equals
/// the reported total within [`PAYOUT_SUM_TOLERANCE`].
pub fn validate_payouts(set: &DegenPayoutSet) -> Result<()> {
    if set.winners.len() != set.total_winners as usize {
        return Err(PayoutError::WinnerCountMismatch {
            count: set.total_winners,
            records: set.winners.len(),
        });
    }

    let no_winners = set.total_winners == 0;
    let no_payout = set.total_payout.is_zero();
    if no_winners != no_payout {
        return Err(PayoutError::InconsistentTotals {
            mission: set.mission_id.clone(),
            winners: set.total_winners,
            total: set.total_payout,
        });
    }

    let actual = set
        .winners
        .iter()
        .fold(Honors::ZERO, |acc, w| acc.saturating_add(w.payout));
    if actual.abs_diff(set.total_payout) > PAYOUT_SUM_TOLERANCE {
        return Err(PayoutError::SumMismatch {
            mission: set.mission_id.clone(),
            actual,
            reported: set.total_payout,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use engage_types::{MissionKind, MissionStatus, Platform, TargetAudience, Usd};
    use std::collections::HashMap;

    fn degen_mission(
        flat: Option<Honors>,
        task_rewards: &[(&str, u64)],
        tasks: &[&str],
    ) -> Mission {
        let now = Utc::now();
        Mission {
            id: MissionId::new("m-degen"),
            creator: UserId::new("creator"),
            platform: Platform::Twitter,
            kind: MissionKind::Engage,
            model: MissionModel::Degen {
                duration_hours: 6,
                winners_cap: 3,
                winner_payout: flat,
                task_rewards: task_rewards
                    .iter()
                    .map(|(t, h)| (TaskId::new(*t), Honors::from_whole(*h)))
                    .collect(),
            },
            target: TargetAudience::Normal,
            tasks: tasks.iter().map(|t| TaskId::new(*t)).collect(),
            total_cost_usd: Usd::from_whole(80),
            total_cost_honors: Honors::from_whole(36_000),
            status: MissionStatus::Active,
            deleted: false,
            created_at: now,
            started_at: now,
            ends_at: Some(now + Duration::hours(6)),
        }
    }

    fn selection(user: &str, task: &str) -> WinnerSelection {
        WinnerSelection {
            user_id: UserId::new(user),
            task_id: TaskId::new(task),
        }
    }

    #[test]
    fn test_per_task_override_wins() {
        let mission = degen_mission(
            Some(Honors::from_whole(6_000)),
            &[("like", 9_000)],
            &["like"],
        );
        let calc = DegenPayoutCalculator::new(HonorsCatalog::standard());

        let set = calc.calculate(&mission, &[selection("u1", "like")]);
        assert_eq!(set.winners[0].payout, Honors::from_whole(9_000));
    }

    #[test]
    fn test_flat_payout_fallback() {
        let mission = degen_mission(Some(Honors::from_whole(6_000)), &[], &["like"]);
        let calc = DegenPayoutCalculator::new(HonorsCatalog::standard());

        let set = calc.calculate(&mission, &[selection("u1", "like"), selection("u2", "like")]);
        assert_eq!(set.total_winners, 2);
        assert_eq!(set.total_payout, Honors::from_whole(12_000));
        assert!(set.winners.iter().all(|w| w.payout == Honors::from_whole(6_000)));
    }

    #[test]
    fn test_catalog_fallback() {
        let mission = degen_mission(None, &[], &["retweet"]);
        let calc = DegenPayoutCalculator::new(HonorsCatalog::standard());

        let set = calc.calculate(&mission, &[selection("u1", "retweet")]);
        assert_eq!(set.winners[0].payout, Honors::from_whole(300));
    }

    #[test]
    fn test_zero_resolution_skipped() {
        // No overrides and a task the catalog does not know.
        let mission = degen_mission(None, &[], &["mystery"]);
        let calc = DegenPayoutCalculator::new(HonorsCatalog::standard());

        let set = calc.calculate(&mission, &[selection("u1", "mystery")]);
        assert_eq!(set.total_winners, 0);
        assert_eq!(set.skipped, 1);
        assert!(set.total_payout.is_zero());
        assert!(validate_payouts(&set).is_ok());
    }

    #[test]
    fn test_non_degen_mission_yields_empty_set() {
        let mut mission = degen_mission(None, &[], &["like"]);
        mission.model = MissionModel::Fixed {
            cap: 60,
            per_user_honors: Honors::from_whole(320),
        };
        let calc = DegenPayoutCalculator::new(HonorsCatalog::standard());

        let set = calc.calculate(&mission, &[selection("u1", "like")]);
        assert_eq!(set, DegenPayoutSet::empty(mission.id.clone()));
    }

    #[test]
    fn test_validate_rejects_tampered_total() {
        let mission = degen_mission(Some(Honors::from_whole(6_000)), &[], &["like"]);
        let calc = DegenPayoutCalculator::new(HonorsCatalog::standard());
        let mut set = calc.calculate(&mission, &[selection("u1", "like")]);

        set.total_payout = Honors::from_whole(7_000);
        assert!(matches!(
            validate_payouts(&set),
            Err(PayoutError::SumMismatch { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_zero_winners_nonzero_total() {
        let mut set = DegenPayoutSet::empty(MissionId::new("m"));
        set.total_payout = Honors::from_whole(100);
        assert!(matches!(
            validate_payouts(&set),
            Err(PayoutError::InconsistentTotals { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_winners_with_zero_total() {
        let mut set = DegenPayoutSet::empty(MissionId::new("m"));
        set.winners.push(DegenWinner {
            mission_id: MissionId::new("m"),
            user_id: UserId::new("u1"),
            task_id: TaskId::new("like"),
            payout: Honors::ZERO,
        });
        set.total_winners = 1;
        assert!(matches!(
            validate_payouts(&set),
            Err(PayoutError::InconsistentTotals { .. })
        ));
    }

    #[test]
    fn test_validate_within_tolerance() {
        let mut set = DegenPayoutSet::empty(MissionId::new("m"));
        set.winners.push(DegenWinner {
            mission_id: MissionId::new("m"),
            user_id: UserId::new("u1"),
            task_id: TaskId::new("like"),
            payout: Honors::from_base_units(5_999_995_000),
        });
        set.total_winners = 1;
        // Reported total is 0.005 honors higher than the record sum.
        set.total_payout = Honors::from_whole(6_000);
        assert!(validate_payouts(&set).is_ok());
    }
}

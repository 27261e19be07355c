//! Mission cost calculation.
//!
//! Turns a creation request into a frozen cost breakdown: fixed missions
//! pay per participant up to a cap with a 100% platform fee on top;
//! degen missions pay a preset USD cost scaled by premium and task
//! multipliers, with half of the honor equivalent pooled for winners.
//!
//! Pure over the injected catalogs; no side effects.

use crate::error::{PricingError, Result};
use engage_catalog::{DegenPreset, DegenPresetTable, DegenValidation, HonorsCatalog, TaskCatalog};
use engage_types::{
    Honors, MissionDraft, ModelRequest, TargetAudience, Usd, MAX_TASKS_PER_MISSION,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Pricing constants. The honors/USD rate itself is pinned at the
/// amount-type level so wallet shadow balances and quotes can never
/// disagree on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Minimum participant cap for fixed missions.
    pub min_fixed_cap: u32,
    /// Total cost = reward pool x this. 2 means the fee equals the pool.
    pub platform_fee_multiplier: u64,
    /// USD cost multiplier for premium-audience degen missions.
    pub premium_multiplier: u64,
    /// Percent of a degen mission's honor equivalent allocated to the
    /// winner pool.
    pub user_pool_percent: u64,
    pub max_tasks: usize,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            min_fixed_cap: 60,
            platform_fee_multiplier: 2,
            premium_multiplier: 5,
            user_pool_percent: 50,
            max_tasks: MAX_TASKS_PER_MISSION,
        }
    }
}

/// Model-specific part of a quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum QuoteBreakdown {
    Fixed {
        cap: u32,
        per_user_honors: Honors,
        reward_pool_honors: Honors,
    },
    Degen {
        duration_hours: u32,
        winners_cap: u32,
        preset_label: String,
        base_cost_usd: Usd,
        premium_multiplier: u64,
        task_multiplier: u64,
        user_pool_honors: Honors,
        per_winner_honors: Honors,
    },
}

/// A priced mission request. Totals are what gets frozen onto the
/// mission at creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingQuote {
    pub total_cost_usd: Usd,
    pub total_cost_honors: Honors,
    /// Catalog honor sum over the requested tasks (per participant for
    /// the fixed model).
    pub tasks_honors: Honors,
    pub breakdown: QuoteBreakdown,
}

pub struct PricingCalculator {
    honors: HonorsCatalog,
    tasks: TaskCatalog,
    presets: DegenPresetTable,
    config: PricingConfig,
}

impl PricingCalculator {
    pub fn new(
        honors: HonorsCatalog,
        tasks: TaskCatalog,
        presets: DegenPresetTable,
        config: PricingConfig,
    ) -> Self {
        Self {
            honors,
            tasks,
            presets,
            config,
        }
    }

    /// Calculator over the production catalogs and default constants.
    pub fn standard() -> Self {
        Self::new(
            HonorsCatalog::standard(),
            TaskCatalog::standard(),
            DegenPresetTable::standard(),
            PricingConfig::default(),
        )
    }

    pub fn honors_catalog(&self) -> &HonorsCatalog {
        &self.honors
    }

    /// Degen parameter validation, exposed so callers can reject bad
    /// duration/winners pairs before asking for a full quote.
    pub fn validate_degen(&self, duration_hours: u32, winners_cap: u32) -> DegenValidation {
        self.presets.validate(duration_hours, winners_cap)
    }

    /// Price a mission request. Membership of every task in the
    /// platform/kind table is required; honor values, once membership
    /// holds, come from the honors catalog.
    pub fn quote(&self, draft: &MissionDraft) -> Result<PricingQuote> {
        if draft.tasks.is_empty() {
            return Err(PricingError::NoTasks);
        }
        if draft.tasks.len() > self.config.max_tasks {
            return Err(PricingError::TooManyTasks {
                count: draft.tasks.len(),
                max: self.config.max_tasks,
            });
        }

        if !self.tasks.supports(draft.platform, draft.kind) {
            return Err(PricingError::InvalidPlatformOrType {
                platform: draft.platform.to_string(),
                kind: draft.kind.to_string(),
            });
        }
        for task in &draft.tasks {
            if !self.tasks.is_known_task(draft.platform, draft.kind, task) {
                return Err(PricingError::UnknownTask {
                    task: task.to_string(),
                    platform: draft.platform.to_string(),
                    kind: draft.kind.to_string(),
                });
            }
        }

        let tasks_honors = self.honors.total_for(&draft.tasks);

        let quote = match draft.model {
            ModelRequest::Fixed { cap } => self.quote_fixed(cap, tasks_honors)?,
            ModelRequest::Degen {
                duration_hours,
                winners_cap,
            } => self.quote_degen(draft, duration_hours, winners_cap, tasks_honors)?,
        };

        debug!(
            platform = %draft.platform,
            kind = %draft.kind,
            tasks = draft.tasks.len(),
            total_usd = %quote.total_cost_usd,
            total_honors = %quote.total_cost_honors,
            "Priced mission request"
        );

        Ok(quote)
    }

    fn quote_fixed(&self, cap: u32, tasks_honors: Honors) -> Result<PricingQuote> {
        if cap < self.config.min_fixed_cap {
            return Err(PricingError::CapBelowMinimum {
                cap,
                min: self.config.min_fixed_cap,
            });
        }

        let reward_pool = tasks_honors
            .checked_mul(cap as u64)
            .ok_or(PricingError::CostOverflow)?;
        let total_cost_honors = reward_pool
            .checked_mul(self.config.platform_fee_multiplier)
            .ok_or(PricingError::CostOverflow)?;
        let total_cost_usd = total_cost_honors.to_usd();

        Ok(PricingQuote {
            total_cost_usd,
            total_cost_honors,
            tasks_honors,
            breakdown: QuoteBreakdown::Fixed {
                cap,
                per_user_honors: tasks_honors,
                reward_pool_honors: reward_pool,
            },
        })
    }

    fn quote_degen(
        &self,
        draft: &MissionDraft,
        duration_hours: u32,
        winners_cap: Option<u32>,
        tasks_honors: Honors,
    ) -> Result<PricingQuote> {
        let winners_cap = winners_cap.ok_or(PricingError::MissingWinnersCap)?;
        let preset = self.matched_preset(duration_hours, winners_cap)?;

        let premium_multiplier = if draft.target == TargetAudience::Premium {
            self.config.premium_multiplier
        } else {
            1
        };
        let task_multiplier = draft.tasks.len().max(1) as u64;

        let total_cost_usd = preset
            .cost_usd
            .checked_mul(premium_multiplier)
            .and_then(|usd| usd.checked_mul(task_multiplier))
            .ok_or(PricingError::CostOverflow)?;
        let total_cost_honors = total_cost_usd.to_honors();

        let pool_units = total_cost_honors
            .to_base_units()
            .checked_mul(self.config.user_pool_percent)
            .ok_or(PricingError::CostOverflow)?
            / 100;
        let user_pool_honors = Honors::from_base_units(pool_units);
        let per_winner_honors = user_pool_honors.per_share(winners_cap);

        Ok(PricingQuote {
            total_cost_usd,
            total_cost_honors,
            tasks_honors,
            breakdown: QuoteBreakdown::Degen {
                duration_hours,
                winners_cap,
                preset_label: preset.label.clone(),
                base_cost_usd: preset.cost_usd,
                premium_multiplier,
                task_multiplier,
                user_pool_honors,
                per_winner_honors,
            },
        })
    }

    fn matched_preset(&self, duration_hours: u32, winners_cap: u32) -> Result<DegenPreset> {
        let validation = self.presets.validate(duration_hours, winners_cap);
        if let Some(preset) = validation.preset {
            if validation.is_valid {
                return Ok(preset);
            }
            return Err(PricingError::WinnersCapOutOfRange {
                max: preset.max_winners,
            });
        }
        Err(PricingError::InvalidDuration(
            validation
                .error
                .unwrap_or_else(|| format!("No duration preset for {}h", duration_hours)),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engage_types::{MissionKind, Platform, TaskId, UserId};

    fn draft(
        platform: Platform,
        kind: MissionKind,
        tasks: &[&str],
        target: TargetAudience,
        model: ModelRequest,
    ) -> MissionDraft {
        MissionDraft {
            creator: UserId::new("creator-1"),
            platform,
            kind,
            target,
            tasks: tasks.iter().map(|t| TaskId::new(*t)).collect(),
            model,
        }
    }

    #[test]
    fn test_fixed_pricing_example() {
        // twitter/engage, like + retweet = 320 honors per user, cap 60.
        let calc = PricingCalculator::standard();
        let quote = calc
            .quote(&draft(
                Platform::Twitter,
                MissionKind::Engage,
                &["like", "retweet"],
                TargetAudience::Normal,
                ModelRequest::Fixed { cap: 60 },
            ))
            .unwrap();

        assert_eq!(quote.tasks_honors, Honors::from_whole(320));
        assert_eq!(quote.total_cost_honors, Honors::from_whole(38_400));
        // 38400 / 450 = 85.333333 dollars at 6-decimal fixed point.
        assert_eq!(quote.total_cost_usd.to_base_units(), 85_333_333);
        match quote.breakdown {
            QuoteBreakdown::Fixed {
                cap,
                per_user_honors,
                reward_pool_honors,
            } => {
                assert_eq!(cap, 60);
                assert_eq!(per_user_honors, Honors::from_whole(320));
                assert_eq!(reward_pool_honors, Honors::from_whole(19_200));
            }
            _ => panic!("expected fixed breakdown"),
        }
    }

    #[test]
    fn test_fixed_cap_below_minimum() {
        let calc = PricingCalculator::standard();
        let err = calc
            .quote(&draft(
                Platform::Twitter,
                MissionKind::Engage,
                &["like"],
                TargetAudience::Normal,
                ModelRequest::Fixed { cap: 59 },
            ))
            .unwrap_err();
        assert_eq!(err, PricingError::CapBelowMinimum { cap: 59, min: 60 });
    }

    #[test]
    fn test_degen_pricing_example() {
        // 6h preset: $80, single task, normal target, 3 winners.
        let calc = PricingCalculator::standard();
        let quote = calc
            .quote(&draft(
                Platform::Twitter,
                MissionKind::Engage,
                &["like"],
                TargetAudience::Normal,
                ModelRequest::Degen {
                    duration_hours: 6,
                    winners_cap: Some(3),
                },
            ))
            .unwrap();

        assert_eq!(quote.total_cost_usd, Usd::from_whole(80));
        assert_eq!(quote.total_cost_honors, Honors::from_whole(36_000));
        match quote.breakdown {
            QuoteBreakdown::Degen {
                user_pool_honors,
                per_winner_honors,
                preset_label,
                ..
            } => {
                assert_eq!(user_pool_honors, Honors::from_whole(18_000));
                assert_eq!(per_winner_honors, Honors::from_whole(6_000));
                assert_eq!(preset_label, "6 Hour Sprint");
            }
            _ => panic!("expected degen breakdown"),
        }
    }

    #[test]
    fn test_degen_premium_and_task_multipliers() {
        let calc = PricingCalculator::standard();
        let quote = calc
            .quote(&draft(
                Platform::Twitter,
                MissionKind::Engage,
                &["like", "retweet"],
                TargetAudience::Premium,
                ModelRequest::Degen {
                    duration_hours: 6,
                    winners_cap: Some(2),
                },
            ))
            .unwrap();

        // 80 x 5 (premium) x 2 (tasks) = $800.
        assert_eq!(quote.total_cost_usd, Usd::from_whole(800));
        match quote.breakdown {
            QuoteBreakdown::Degen {
                premium_multiplier,
                task_multiplier,
                user_pool_honors,
                per_winner_honors,
                ..
            } => {
                assert_eq!(premium_multiplier, 5);
                assert_eq!(task_multiplier, 2);
                assert_eq!(user_pool_honors, Honors::from_whole(180_000));
                assert_eq!(per_winner_honors, Honors::from_whole(90_000));
            }
            _ => panic!("expected degen breakdown"),
        }
    }

    #[test]
    fn test_degen_missing_winners_cap() {
        let calc = PricingCalculator::standard();
        let err = calc
            .quote(&draft(
                Platform::Twitter,
                MissionKind::Engage,
                &["like"],
                TargetAudience::Normal,
                ModelRequest::Degen {
                    duration_hours: 6,
                    winners_cap: None,
                },
            ))
            .unwrap_err();
        assert_eq!(err, PricingError::MissingWinnersCap);
    }

    #[test]
    fn test_degen_winners_cap_out_of_range() {
        let calc = PricingCalculator::standard();
        let err = calc
            .quote(&draft(
                Platform::Twitter,
                MissionKind::Engage,
                &["like"],
                TargetAudience::Normal,
                ModelRequest::Degen {
                    duration_hours: 6,
                    winners_cap: Some(4),
                },
            ))
            .unwrap_err();
        assert_eq!(err, PricingError::WinnersCapOutOfRange { max: 3 });
        assert_eq!(err.to_string(), "Winners cap must be between 1 and 3");
    }

    #[test]
    fn test_degen_invalid_duration() {
        let calc = PricingCalculator::standard();
        let err = calc
            .quote(&draft(
                Platform::Twitter,
                MissionKind::Engage,
                &["like"],
                TargetAudience::Normal,
                ModelRequest::Degen {
                    duration_hours: 7,
                    winners_cap: Some(1),
                },
            ))
            .unwrap_err();
        assert!(matches!(err, PricingError::InvalidDuration(_)));
    }

    #[test]
    fn test_unknown_task_rejected() {
        let calc = PricingCalculator::standard();
        let err = calc
            .quote(&draft(
                Platform::Twitter,
                MissionKind::Engage,
                &["like", "thread"],
                TargetAudience::Normal,
                ModelRequest::Fixed { cap: 60 },
            ))
            .unwrap_err();
        assert!(matches!(err, PricingError::UnknownTask { .. }));
    }

    #[test]
    fn test_invalid_platform_kind_pair() {
        let calc = PricingCalculator::standard();
        let err = calc
            .quote(&draft(
                Platform::Telegram,
                MissionKind::Engage,
                &["like"],
                TargetAudience::Normal,
                ModelRequest::Fixed { cap: 60 },
            ))
            .unwrap_err();
        assert!(matches!(err, PricingError::InvalidPlatformOrType { .. }));
    }

    #[test]
    fn test_task_count_bounds() {
        let calc = PricingCalculator::standard();

        let empty = draft(
            Platform::Twitter,
            MissionKind::Engage,
            &[],
            TargetAudience::Normal,
            ModelRequest::Fixed { cap: 60 },
        );
        assert_eq!(calc.quote(&empty).unwrap_err(), PricingError::NoTasks);

        let eleven: Vec<&str> = std::iter::repeat("like").take(11).collect();
        let too_many = draft(
            Platform::Twitter,
            MissionKind::Engage,
            &eleven,
            TargetAudience::Normal,
            ModelRequest::Fixed { cap: 60 },
        );
        assert_eq!(
            calc.quote(&too_many).unwrap_err(),
            PricingError::TooManyTasks { count: 11, max: 10 }
        );
    }
}

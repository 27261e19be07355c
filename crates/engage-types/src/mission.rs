use crate::amount::{Honors, Usd};
use crate::error::TypeError;
use crate::id::{MissionId, TaskId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Hard cap on tasks per mission, shared by validation and pricing.
pub const MAX_TASKS_PER_MISSION: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Twitter,
    Instagram,
    Tiktok,
    Facebook,
    Telegram,
    Custom,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Twitter => "twitter",
            Platform::Instagram => "instagram",
            Platform::Tiktok => "tiktok",
            Platform::Facebook => "facebook",
            Platform::Telegram => "telegram",
            Platform::Custom => "custom",
        }
    }
}

impl FromStr for Platform {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "twitter" => Ok(Platform::Twitter),
            "instagram" => Ok(Platform::Instagram),
            "tiktok" => Ok(Platform::Tiktok),
            "facebook" => Ok(Platform::Facebook),
            "telegram" => Ok(Platform::Telegram),
            "custom" => Ok(Platform::Custom),
            other => Err(TypeError::UnknownPlatform(other.to_string())),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissionKind {
    Engage,
    Content,
    Ambassador,
    Custom,
}

impl MissionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MissionKind::Engage => "engage",
            MissionKind::Content => "content",
            MissionKind::Ambassador => "ambassador",
            MissionKind::Custom => "custom",
        }
    }
}

impl FromStr for MissionKind {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "engage" => Ok(MissionKind::Engage),
            "content" => Ok(MissionKind::Content),
            "ambassador" => Ok(MissionKind::Ambassador),
            "custom" => Ok(MissionKind::Custom),
            other => Err(TypeError::UnknownMissionKind(other.to_string())),
        }
    }
}

impl fmt::Display for MissionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetAudience {
    #[default]
    Normal,
    Premium,
}

impl TargetAudience {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetAudience::Normal => "normal",
            TargetAudience::Premium => "premium",
        }
    }
}

impl FromStr for TargetAudience {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" => Ok(TargetAudience::Normal),
            "premium" => Ok(TargetAudience::Premium),
            other => Err(TypeError::UnknownTarget(other.to_string())),
        }
    }
}

impl fmt::Display for TargetAudience {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Coarse admin-controlled lifecycle field. The derived progress stage
/// (in-progress / almost-ending / completed) is computed on read and is
/// a separate concept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissionStatus {
    #[default]
    Active,
    Paused,
    Completed,
    Cancelled,
}

/// Model-specific mission parameters. The enum makes the data-model
/// invariant structural: a mission carries either a participant cap or
/// a duration/winners pair, never both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "lowercase")]
pub enum MissionModel {
    Fixed {
        /// Participant cap; pricing rejects values below 60.
        cap: u32,
        /// Per-participant reward, frozen at creation from the quote.
        per_user_honors: Honors,
    },
    Degen {
        /// Must match a preset bucket exactly.
        duration_hours: u32,
        /// Bounded by the matched preset's max winners.
        winners_cap: u32,
        /// Mission-wide flat payout override for winner selection.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        winner_payout: Option<Honors>,
        /// Per-task payout overrides; take precedence over the flat
        /// payout and the catalog value.
        #[serde(default, skip_serializing_if = "HashMap::is_empty")]
        task_rewards: HashMap<TaskId, Honors>,
    },
}

impl MissionModel {
    pub fn is_degen(&self) -> bool {
        matches!(self, MissionModel::Degen { .. })
    }

    pub fn is_fixed(&self) -> bool {
        matches!(self, MissionModel::Fixed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mission {
    pub id: MissionId,
    pub creator: UserId,
    pub platform: Platform,
    pub kind: MissionKind,
    pub model: MissionModel,
    pub target: TargetAudience,
    /// Ordered task list; non-empty, at most [`MAX_TASKS_PER_MISSION`].
    pub tasks: Vec<TaskId>,
    /// Frozen at creation from the pricing quote; never recomputed.
    pub total_cost_usd: Usd,
    pub total_cost_honors: Honors,
    pub status: MissionStatus,
    /// Soft delete; excluded from every aggregate count.
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
    pub started_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
}

impl Mission {
    pub fn is_degen(&self) -> bool {
        self.model.is_degen()
    }

    /// Per-task winner cap mirror: for fixed missions every task can be
    /// completed by at most `cap` users; degen missions have no per-task
    /// cap.
    pub fn winners_per_task(&self) -> Option<u32> {
        match &self.model {
            MissionModel::Fixed { cap, .. } => Some(*cap),
            MissionModel::Degen { .. } => None,
        }
    }

    pub fn required_tasks(&self) -> &[TaskId] {
        &self.tasks
    }
}

/// Model parameters as submitted by a creator, before validation and
/// pricing. `winners_cap` stays optional here so the calculator can
/// report the missing field instead of a deserialization failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "lowercase")]
pub enum ModelRequest {
    Fixed { cap: u32 },
    Degen {
        duration_hours: u32,
        winners_cap: Option<u32>,
    },
}

/// A mission-creation request: everything pricing needs, nothing frozen
/// yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissionDraft {
    pub creator: UserId,
    pub platform: Platform,
    pub kind: MissionKind,
    pub target: TargetAudience,
    pub tasks: Vec<TaskId>,
    pub model: ModelRequest,
}

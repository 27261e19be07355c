//! Degen duration presets: the fixed table of allowed contest duration
//! buckets with their base cost and winner-cap bounds.

use engage_types::Usd;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DegenPreset {
    pub duration_hours: u32,
    pub cost_usd: Usd,
    pub max_winners: u32,
    pub label: String,
}

/// Outcome of degen parameter validation, carrying the matched preset
/// when one exists so callers can reuse its cost without a second
/// lookup.
#[derive(Debug, Clone)]
pub struct DegenValidation {
    pub is_valid: bool,
    pub preset: Option<DegenPreset>,
    pub max_winners: Option<u32>,
    pub error: Option<String>,
}

impl DegenValidation {
    fn ok(preset: DegenPreset) -> Self {
        let max_winners = preset.max_winners;
        Self {
            is_valid: true,
            preset: Some(preset),
            max_winners: Some(max_winners),
            error: None,
        }
    }

    fn fail(preset: Option<DegenPreset>, error: String) -> Self {
        let max_winners = preset.as_ref().map(|p| p.max_winners);
        Self {
            is_valid: false,
            preset,
            max_winners,
            error: Some(error),
        }
    }
}

/// Ordered preset table. Lookup is by exact hour match: a 7-hour request
/// does not round to the 6-hour bucket, it fails.
#[derive(Debug, Clone)]
pub struct DegenPresetTable {
    presets: Vec<DegenPreset>,
}

impl DegenPresetTable {
    pub fn new(mut presets: Vec<DegenPreset>) -> Self {
        presets.sort_by_key(|p| p.duration_hours);
        Self { presets }
    }

    /// The production table: 13 buckets from 1 hour to 240 hours.
    pub fn standard() -> Self {
        let rows: [(u32, u64, u32, &str); 13] = [
            (1, 10, 1, "1 Hour Blitz"),
            (3, 40, 2, "3 Hour Rush"),
            (6, 80, 3, "6 Hour Sprint"),
            (12, 150, 5, "Half Day"),
            (24, 300, 10, "Full Day"),
            (36, 450, 12, "36 Hour Push"),
            (48, 600, 15, "2 Day Grind"),
            (72, 900, 20, "3 Day Campaign"),
            (96, 1200, 25, "4 Day Campaign"),
            (120, 1500, 30, "5 Day Campaign"),
            (168, 2100, 40, "1 Week Marathon"),
            (216, 2700, 45, "9 Day Marathon"),
            (240, 3000, 50, "10 Day Max"),
        ];

        Self::new(
            rows.into_iter()
                .map(|(hours, usd, winners, label)| DegenPreset {
                    duration_hours: hours,
                    cost_usd: Usd::from_whole(usd),
                    max_winners: winners,
                    label: label.to_string(),
                })
                .collect(),
        )
    }

    pub fn by_duration(&self, duration_hours: u32) -> Option<&DegenPreset> {
        self.presets
            .iter()
            .find(|p| p.duration_hours == duration_hours)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DegenPreset> {
        self.presets.iter()
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    /// Validate a requested (duration, winners cap) pair. Must pass
    /// before a degen mission is accepted; no side effects.
    pub fn validate(&self, duration_hours: u32, winners_cap: u32) -> DegenValidation {
        let preset = match self.by_duration(duration_hours) {
            Some(p) => p.clone(),
            None => {
                let valid: Vec<String> = self
                    .presets
                    .iter()
                    .map(|p| format!("{}h", p.duration_hours))
                    .collect();
                return DegenValidation::fail(
                    None,
                    format!(
                        "No duration preset for {}h; valid durations: {}",
                        duration_hours,
                        valid.join(", ")
                    ),
                );
            }
        };

        if winners_cap < 1 || winners_cap > preset.max_winners {
            let error = format!(
                "Winners cap must be between 1 and {}",
                preset.max_winners
            );
            return DegenValidation::fail(Some(preset), error);
        }

        DegenValidation::ok(preset)
    }
}

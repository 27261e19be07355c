//! Fixed task honor values, the single source of truth for fixed-model
//! task pricing, degen payout fallback, and stats aggregation.

use engage_types::{Honors, TaskId};
use std::collections::HashMap;
use tracing::warn;

/// Immutable task-id → honor-value table. Built once and injected into
/// the calculators; tests substitute their own tables.
#[derive(Debug, Clone)]
pub struct HonorsCatalog {
    values: HashMap<TaskId, Honors>,
}

impl HonorsCatalog {
    pub fn new(values: HashMap<TaskId, Honors>) -> Self {
        Self { values }
    }

    /// The production table.
    pub fn standard() -> Self {
        let table = [
            ("like", 20),
            ("retweet", 300),
            ("comment", 150),
            ("quote", 250),
            ("follow", 250),
            ("meme", 300),
            ("thread", 500),
            ("article", 1000),
            ("video_review", 2000),
            ("pfp", 250),
            ("name_bio_keywords", 200),
            ("pinned_tweet", 500),
            ("poll", 150),
            ("spaces", 800),
            ("community_raid", 400),
        ];

        Self::new(
            table
                .into_iter()
                .map(|(id, honors)| (TaskId::new(id), Honors::from_whole(honors)))
                .collect(),
        )
    }

    pub fn get(&self, task: &TaskId) -> Option<Honors> {
        self.values.get(task).copied()
    }

    /// Honor value of a task. An unrecognized id prices at zero, but is
    /// logged so catalog drift stays detectable.
    pub fn value_of(&self, task: &TaskId) -> Honors {
        match self.values.get(task) {
            Some(honors) => *honors,
            None => {
                warn!(task = %task, "Task id not in honors catalog, pricing at zero");
                Honors::ZERO
            }
        }
    }

    /// Sum of the honor values for every task in the slice.
    pub fn total_for(&self, tasks: &[TaskId]) -> Honors {
        tasks
            .iter()
            .fold(Honors::ZERO, |acc, t| acc.saturating_add(self.value_of(t)))
    }

    pub fn contains(&self, task: &TaskId) -> bool {
        self.values.contains_key(task)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

//! Per-platform, per-mission-kind task membership tables. Pricing
//! validates a request's tasks against these before quoting.

use engage_types::{MissionKind, Platform, TaskId};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct TaskCatalog {
    tables: HashMap<(Platform, MissionKind), Vec<TaskId>>,
}

impl TaskCatalog {
    pub fn new(tables: HashMap<(Platform, MissionKind), Vec<TaskId>>) -> Self {
        Self { tables }
    }

    pub fn standard() -> Self {
        let mut tables = HashMap::new();

        let mut insert = |platform: Platform, kind: MissionKind, tasks: &[&str]| {
            tables.insert(
                (platform, kind),
                tasks.iter().map(|t| TaskId::new(*t)).collect::<Vec<_>>(),
            );
        };

        insert(
            Platform::Twitter,
            MissionKind::Engage,
            &["like", "retweet", "comment", "quote", "follow"],
        );
        insert(
            Platform::Twitter,
            MissionKind::Content,
            &["meme", "thread", "article", "video_review"],
        );
        insert(
            Platform::Twitter,
            MissionKind::Ambassador,
            &[
                "pfp",
                "name_bio_keywords",
                "pinned_tweet",
                "poll",
                "spaces",
                "community_raid",
            ],
        );
        insert(
            Platform::Instagram,
            MissionKind::Engage,
            &["like", "comment", "follow"],
        );
        insert(
            Platform::Instagram,
            MissionKind::Content,
            &["meme", "video_review"],
        );
        insert(
            Platform::Tiktok,
            MissionKind::Engage,
            &["like", "comment", "follow"],
        );
        insert(
            Platform::Tiktok,
            MissionKind::Content,
            &["meme", "video_review"],
        );

        Self::new(tables)
    }

    /// Known tasks for a platform/kind pair; `None` when the pair has no
    /// table at all (an invalid combination).
    pub fn tasks_for(&self, platform: Platform, kind: MissionKind) -> Option<&[TaskId]> {
        self.tables
            .get(&(platform, kind))
            .map(|tasks| tasks.as_slice())
    }

    pub fn supports(&self, platform: Platform, kind: MissionKind) -> bool {
        self.tables.contains_key(&(platform, kind))
    }

    pub fn is_known_task(&self, platform: Platform, kind: MissionKind, task: &TaskId) -> bool {
        self.tasks_for(platform, kind)
            .map(|tasks| tasks.contains(task))
            .unwrap_or(false)
    }
}

use chrono::{DateTime, Utc};
use engage_types::{ParticipationId, Platform, TaskId, UserId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Content-derived identity of one reviewable submission: the same
/// (participation, task, submitter) triple always maps to the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmissionKey(String);

impl SubmissionKey {
    pub fn derive(participation: &ParticipationId, task: &TaskId, submitter: &UserId) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(participation.as_str().as_bytes());
        // Delimited so adjacent ids cannot alias.
        hasher.update(b":");
        hasher.update(task.as_str().as_bytes());
        hasher.update(b":");
        hasher.update(submitter.as_str().as_bytes());
        Self(hex::encode(hasher.finalize().as_bytes()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubmissionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// At most one review per reviewer per submission, enforced by keying
/// review records on this hash.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReviewKey(String);

impl ReviewKey {
    pub fn derive(submission: &SubmissionKey, reviewer: &UserId) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(submission.as_str().as_bytes());
        hasher.update(b":");
        hasher.update(reviewer.as_str().as_bytes());
        Self(hex::encode(hasher.finalize().as_bytes()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReviewKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which review track a submission runs on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewFlow {
    #[default]
    Standard,
    Extended,
}

impl ReviewFlow {
    /// Independent reviews required to close a submission.
    pub fn quorum(&self) -> u32 {
        match self {
            ReviewFlow::Standard => 3,
            ReviewFlow::Extended => 5,
        }
    }
}

/// One reviewer's verdict on a submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub reviewer: UserId,
    pub rating: u8,
    pub comment_link: String,
    pub submitted_at: DateTime<Utc>,
}

/// Aggregate review state of one submission.
///
/// `closed` only ever moves false→true, and `submission_avg` is written
/// exactly once, by the review that reaches quorum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionReviewState {
    pub key: SubmissionKey,
    pub submitter: UserId,
    pub platform: Platform,
    pub flow: ReviewFlow,
    pub reviewers_count: u32,
    pub rating_sum: u32,
    pub closed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submission_avg: Option<f64>,
    pub opened_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub reviews: HashMap<ReviewKey, ReviewRecord>,
}

impl SubmissionReviewState {
    pub fn open(
        key: SubmissionKey,
        submitter: UserId,
        platform: Platform,
        flow: ReviewFlow,
        opened_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            key,
            submitter,
            platform,
            flow,
            reviewers_count: 0,
            rating_sum: 0,
            closed: false,
            submission_avg: None,
            opened_at,
            expires_at,
            reviews: HashMap::new(),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

/// Running average of a submitter's closed-submission averages. Folds
/// keep count and sum so new closures merge in without rescanning.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SubmitterQuality {
    pub submissions_rated: u32,
    pub rating_sum: f64,
}

impl SubmitterQuality {
    pub fn fold(&mut self, submission_avg: f64) {
        self.submissions_rated += 1;
        self.rating_sum += submission_avg;
    }

    pub fn average(&self) -> Option<f64> {
        if self.submissions_rated == 0 {
            None
        } else {
            Some(self.rating_sum / self.submissions_rated as f64)
        }
    }
}

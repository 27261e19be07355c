//! Transactional peer-review workflow.
//!
//! All checks and effects for one review run inside a single write-lock
//! critical section, so two reviewers racing at quorum−1 cannot both
//! close the submission, and a rejected attempt leaves the aggregate
//! untouched.

use crate::error::{ReviewError, Result};
use crate::links::verify_comment_link;
use crate::types::{
    ReviewFlow, ReviewKey, ReviewRecord, SubmissionKey, SubmissionReviewState, SubmitterQuality,
};
use chrono::{DateTime, Duration, Utc};
use engage_economics::{LedgerReason, WalletManager};
use engage_stats::{StatsAggregator, StatsDelta};
use engage_types::{Honors, ParticipationId, Platform, TaskId, UserId};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Review workflow tuning.
#[derive(Debug, Clone)]
pub struct ReviewConfig {
    pub flow: ReviewFlow,
    /// Honors credited to a reviewer per accepted review.
    pub reviewer_reward: Honors,
    /// How long a submission stays reviewable after opening.
    pub review_window: Duration,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            flow: ReviewFlow::Standard,
            reviewer_reward: Honors::from_whole(50),
            review_window: Duration::hours(24),
        }
    }
}

/// Identity a review is submitted under.
#[derive(Debug, Clone)]
pub struct ReviewerIdentity {
    pub id: UserId,
    /// Registered social handle; the comment link's author must match.
    pub handle: String,
}

/// Outcome of an accepted review.
#[derive(Debug, Clone)]
pub struct ReviewReceipt {
    pub key: SubmissionKey,
    pub reviewers_count: u32,
    pub closed: bool,
    /// Set on the review that closed the submission, `None` otherwise.
    pub submission_avg: Option<f64>,
    pub honors_credited: Honors,
}

#[derive(Default)]
struct ReviewLedger {
    submissions: HashMap<SubmissionKey, SubmissionReviewState>,
    quality: HashMap<UserId, SubmitterQuality>,
}

pub struct ReviewEngine {
    config: ReviewConfig,
    state: RwLock<ReviewLedger>,
    wallets: Arc<WalletManager>,
    stats: Arc<StatsAggregator>,
}

impl ReviewEngine {
    pub fn new(
        config: ReviewConfig,
        wallets: Arc<WalletManager>,
        stats: Arc<StatsAggregator>,
    ) -> Self {
        Self {
            config,
            state: RwLock::new(ReviewLedger::default()),
            wallets,
            stats,
        }
    }

    /// Open (or re-open idempotently) the review cycle for a submitted
    /// proof. Returns the submission's derived key.
    pub async fn open_submission(
        &self,
        participation: &ParticipationId,
        task: &TaskId,
        submitter: &UserId,
        platform: Platform,
        now: DateTime<Utc>,
    ) -> SubmissionKey {
        let key = SubmissionKey::derive(participation, task, submitter);
        let mut state = self.state.write().await;

        if state.submissions.contains_key(&key) {
            debug!(key = %key, "Submission already open for review");
            return key;
        }

        let expires_at = now + self.config.review_window;
        state.submissions.insert(
            key.clone(),
            SubmissionReviewState::open(
                key.clone(),
                submitter.clone(),
                platform,
                self.config.flow,
                now,
                expires_at,
            ),
        );
        info!(
            key = %key,
            submitter = %submitter,
            expires_at = %expires_at,
            "📝 Submission opened for review"
        );
        key
    }

    /// Submit one review. Preconditions (unknown key, expiry,
    /// self-review, duplicate, quorum, link shape/author) are checked
    /// and the effects (review record, aggregate bump, closure,
    /// reviewer credit) applied under one lock, the only fallible
    /// effect ordered before any mutation.
    pub async fn submit_review(
        &self,
        reviewer: &ReviewerIdentity,
        key: &SubmissionKey,
        rating: u8,
        comment_link: &str,
        now: DateTime<Utc>,
    ) -> Result<ReviewReceipt> {
        if !(1..=5).contains(&rating) {
            return Err(ReviewError::InvalidRating(rating));
        }

        let mut state = self.state.write().await;
        let ReviewLedger {
            submissions,
            quality,
        } = &mut *state;

        let submission = submissions
            .get_mut(key)
            .ok_or_else(|| ReviewError::UnknownSubmission(key.to_string()))?;

        if submission.is_expired(now) {
            return Err(ReviewError::ReviewWindowExpired(submission.expires_at));
        }

        // Quorum counts independent reviews only.
        if reviewer.id == submission.submitter {
            return Err(ReviewError::SelfReview(reviewer.id.to_string()));
        }

        let review_key = ReviewKey::derive(key, &reviewer.id);
        if submission.reviews.contains_key(&review_key) {
            return Err(ReviewError::DuplicateReview(reviewer.id.to_string()));
        }

        let quorum = submission.flow.quorum();
        if submission.closed || submission.reviewers_count >= quorum {
            return Err(ReviewError::QuorumReached { quorum });
        }

        verify_comment_link(submission.platform, comment_link, &reviewer.handle)?;

        // Last fallible step; after this everything commits.
        self.wallets
            .credit(
                &reviewer.id,
                self.config.reviewer_reward,
                LedgerReason::ReviewReward,
                None,
                None,
            )
            .await
            .map_err(|e| ReviewError::Wallet(e.to_string()))?;

        submission.reviews.insert(
            review_key,
            ReviewRecord {
                reviewer: reviewer.id.clone(),
                rating,
                comment_link: comment_link.to_string(),
                submitted_at: now,
            },
        );
        submission.reviewers_count += 1;
        submission.rating_sum += u32::from(rating);

        let mut closing_avg = None;
        if submission.reviewers_count >= quorum {
            submission.closed = true;
            let avg = f64::from(submission.rating_sum) / f64::from(submission.reviewers_count);
            submission.submission_avg = Some(avg);
            closing_avg = Some(avg);

            quality
                .entry(submission.submitter.clone())
                .or_default()
                .fold(avg);

            info!(
                key = %key,
                submitter = %submission.submitter,
                reviewers = submission.reviewers_count,
                avg,
                "✅ Review quorum reached, submission closed"
            );
        }

        let receipt = ReviewReceipt {
            key: key.clone(),
            reviewers_count: submission.reviewers_count,
            closed: submission.closed,
            submission_avg: closing_avg,
            honors_credited: self.config.reviewer_reward,
        };

        self.stats
            .apply(
                &reviewer.id,
                StatsDelta::review_completed(self.config.reviewer_reward),
                "review completed",
            )
            .await;

        info!(
            key = %key,
            reviewer = %reviewer.id,
            rating,
            reviewers = receipt.reviewers_count,
            "🗳️ Review recorded"
        );

        Ok(receipt)
    }

    pub async fn submission(&self, key: &SubmissionKey) -> Option<SubmissionReviewState> {
        self.state.read().await.submissions.get(key).cloned()
    }

    /// Running quality score for a submitter, folded from their closed
    /// submissions' averages.
    pub async fn submitter_quality(&self, user: &UserId) -> Option<SubmitterQuality> {
        self.state.read().await.quality.get(user).copied()
    }
}

use chrono::{DateTime, Utc};
use engage_types::Platform;
use thiserror::Error;

/// Review operation result type
pub type Result<T> = std::result::Result<T, ReviewError>;

/// Review errors
#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("Unknown submission: {0}")]
    UnknownSubmission(String),

    #[error("Review window expired at {0}")]
    ReviewWindowExpired(DateTime<Utc>),

    #[error("Submitter {0} cannot review their own submission")]
    SelfReview(String),

    #[error("Duplicate review from reviewer: {0}")]
    DuplicateReview(String),

    #[error("Review quorum already reached ({quorum} reviews)")]
    QuorumReached { quorum: u32 },

    #[error("Rating must be between 1 and 5, got {0}")]
    InvalidRating(u8),

    #[error("Malformed comment link: {0}")]
    InvalidLink(String),

    #[error("Comment link points at {found}, submission is on {expected}")]
    PlatformMismatch { expected: Platform, found: Platform },

    #[error("Comment link author @{found} does not match reviewer handle @{expected}")]
    HandleMismatch { expected: String, found: String },

    #[error("Wallet error: {0}")]
    Wallet(String),
}

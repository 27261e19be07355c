//! Peer review of task-completion proofs: quorum-gated rating cycles,
//! comment-link verification, and reviewer rewards.

pub mod engine;
pub mod error;
pub mod links;
pub mod types;

pub use engine::{ReviewConfig, ReviewEngine, ReviewReceipt, ReviewerIdentity};
pub use error::{ReviewError, Result};
pub use links::verify_comment_link;
pub use types::{
    ReviewFlow, ReviewKey, ReviewRecord, SubmissionKey, SubmissionReviewState, SubmitterQuality,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TypeError {
    #[error("Unknown platform: {0}")]
    UnknownPlatform(String),

    #[error("Unknown mission kind: {0}")]
    UnknownMissionKind(String),

    #[error("Unknown target audience: {0}")]
    UnknownTarget(String),

    #[error("Unknown completion status: {0}")]
    UnknownCompletionStatus(String),
}

pub type Result<T> = std::result::Result<T, TypeError>;

use thiserror::Error;

/// Pricing operation result type
pub type Result<T> = std::result::Result<T, PricingError>;

/// Pricing and mission-parameter validation errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PricingError {
    #[error("No task table for platform '{platform}' and mission type '{kind}'")]
    InvalidPlatformOrType { platform: String, kind: String },

    #[error("Mission must include at least one task")]
    NoTasks,

    #[error("Too many tasks: {count} requested, maximum is {max}")]
    TooManyTasks { count: usize, max: usize },

    #[error("Task '{task}' is not available for platform '{platform}' and mission type '{kind}'")]
    UnknownTask {
        task: String,
        platform: String,
        kind: String,
    },

    #[error("Participant cap must be at least {min}, got {cap}")]
    CapBelowMinimum { cap: u32, min: u32 },

    #[error("{0}")]
    InvalidDuration(String),

    #[error("Winners cap is required for degen missions")]
    MissingWinnersCap,

    #[error("Winners cap must be between 1 and {max}")]
    WinnersCapOutOfRange { max: u32 },

    #[error("Cost overflow while pricing mission")]
    CostOverflow,
}

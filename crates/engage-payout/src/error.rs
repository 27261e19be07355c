use engage_types::{Honors, MissionId};
use thiserror::Error;

/// Payout operation result type
pub type Result<T> = std::result::Result<T, PayoutError>;

/// Payout calculation and distribution errors. Validation variants are
/// hard guards: a set that fails them must never reach wallets.
#[derive(Debug, Error)]
pub enum PayoutError {
    #[error("Winner count {count} does not match {records} winner records")]
    WinnerCountMismatch { count: u32, records: usize },

    #[error("Inconsistent payout set for {mission}: {winners} winners with total {total}")]
    InconsistentTotals {
        mission: MissionId,
        winners: u32,
        total: Honors,
    },

    #[error("Payout sum mismatch for {mission}: records sum to {actual}, reported {reported}")]
    SumMismatch {
        mission: MissionId,
        actual: Honors,
        reported: Honors,
    },

    #[error("Wallet operation failed: {0}")]
    Wallet(String),
}

//! Degen winner payouts: per-winner amount resolution, pre-distribution
//! validation, and atomic distribution to wallets.

pub mod calculator;
pub mod distributor;
pub mod error;

pub use calculator::{
    validate_payouts, DegenPayoutCalculator, DegenPayoutSet, WinnerSelection,
    PAYOUT_SUM_TOLERANCE,
};
pub use distributor::{DistributionReceipt, PayoutDistributor};
pub use error::{PayoutError, Result};

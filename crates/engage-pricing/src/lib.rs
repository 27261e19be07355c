//! Mission pricing: validates a creation request against the task
//! catalogs and degen presets and produces the cost breakdown that gets
//! frozen onto the mission.

pub mod calculator;
pub mod error;

pub use calculator::{PricingCalculator, PricingConfig, PricingQuote, QuoteBreakdown};
pub use error::{PricingError, Result};

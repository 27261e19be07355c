use serde::{Deserialize, Serialize};
use std::fmt;

pub const HONOR_DECIMALS: u32 = 6;
pub const HONOR_BASE_UNIT: u64 = 1_000_000; // 10^6
pub const USD_BASE_UNIT: u64 = 1_000_000; // 10^6

/// Fixed conversion rate between the reward currency and USD.
pub const HONORS_PER_USD: u64 = 450;

/// Reward-currency amount in base units of 10^-6 honors.
///
/// All money math stays in integer space; floats only appear at the
/// display/input boundary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Honors(u64);

impl Honors {
    pub const ZERO: Self = Self(0);

    pub fn from_whole(honors: u64) -> Self {
        Self(honors.saturating_mul(HONOR_BASE_UNIT))
    }

    pub const fn from_base_units(units: u64) -> Self {
        Self(units)
    }

    /// Lossy construction for boundary input; negative values clamp to zero.
    pub fn from_f64(honors: f64) -> Self {
        if honors <= 0.0 {
            return Self::ZERO;
        }
        Self((honors * HONOR_BASE_UNIT as f64).round() as u64)
    }

    pub fn to_f64(&self) -> f64 {
        self.0 as f64 / HONOR_BASE_UNIT as f64
    }

    pub fn to_base_units(&self) -> u64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(&self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(&self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    pub fn checked_mul(&self, factor: u64) -> Option<Self> {
        self.0.checked_mul(factor).map(Self)
    }

    pub fn saturating_add(&self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    pub fn saturating_sub(&self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    /// Even split across `shares` recipients, truncating toward zero.
    /// With 10^-6 base units the truncation loss is at most one base
    /// unit per recipient.
    pub fn per_share(&self, shares: u32) -> Self {
        if shares == 0 {
            return Self::ZERO;
        }
        Self(self.0 / shares as u64)
    }

    pub fn abs_diff(&self, other: Self) -> Self {
        Self(self.0.abs_diff(other.0))
    }

    /// USD equivalent at the fixed rate, truncating.
    pub fn to_usd(&self) -> Usd {
        Usd(self.0 / HONORS_PER_USD)
    }
}

impl fmt::Display for Honors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} HON", self.to_f64())
    }
}

/// USD amount in base units of 10^-6 dollars.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Usd(u64);

impl Usd {
    pub const ZERO: Self = Self(0);

    pub fn from_whole(dollars: u64) -> Self {
        Self(dollars.saturating_mul(USD_BASE_UNIT))
    }

    pub fn from_cents(cents: u64) -> Self {
        Self(cents.saturating_mul(USD_BASE_UNIT / 100))
    }

    pub const fn from_base_units(units: u64) -> Self {
        Self(units)
    }

    pub fn to_f64(&self) -> f64 {
        self.0 as f64 / USD_BASE_UNIT as f64
    }

    pub fn to_base_units(&self) -> u64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(&self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_mul(&self, factor: u64) -> Option<Self> {
        self.0.checked_mul(factor).map(Self)
    }

    pub fn saturating_add(&self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    pub fn saturating_sub(&self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    /// Honor equivalent at the fixed rate. Exact: one micro-dollar is a
    /// whole number of micro-honors.
    pub fn to_honors(&self) -> Honors {
        Honors(self.0.saturating_mul(HONORS_PER_USD))
    }
}

impl fmt::Display for Usd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:.2}", self.to_f64())
    }
}

//! Pricing
//!
//! Product-level discounts and the discounted unit price of a variant.

use std::fmt;

use jiff::Timestamp;
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while building discounts or computing prices.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PricingError {
    /// Percentages must lie within `0..=100`.
    #[error("discount percentage must be between 0 and 100, got {0}")]
    InvalidPercent(u16),

    /// A timed discount must not end before it starts.
    #[error("timed discount ends ({ends_at}) before it starts ({starts_at})")]
    InvalidWindow {
        /// Start of the window
        starts_at: Timestamp,
        /// End of the window
        ends_at: Timestamp,
    },

    /// The computed amount does not fit in minor units.
    #[error("price calculation overflowed")]
    Overflow,
}

/// A whole-number discount percentage in `0..=100`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(into = "u16")]
pub struct DiscountPercent(u8);

impl DiscountPercent {
    /// No discount.
    pub const ZERO: Self = Self(0);

    /// Validate a percentage.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::InvalidPercent`] when `value` exceeds 100.
    pub fn new(value: u16) -> Result<Self, PricingError> {
        match u8::try_from(value) {
            Ok(percent) if percent <= 100 => Ok(Self(percent)),
            _ => Err(PricingError::InvalidPercent(value)),
        }
    }

    /// Percentage points.
    pub fn value(self) -> u8 {
        self.0
    }

    /// Whether this is a zero discount.
    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// The share of `amount` this percentage represents, rounded to the nearest
    /// minor unit (ties to even).
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::Overflow`] when the result cannot be represented.
    pub fn of(self, amount: u64) -> Result<u64, PricingError> {
        scale(amount, u64::from(self.0))
    }
}

impl From<DiscountPercent> for u16 {
    fn from(value: DiscountPercent) -> Self {
        u16::from(value.0)
    }
}

impl TryFrom<u16> for DiscountPercent {
    type Error = PricingError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl<'de> Deserialize<'de> for DiscountPercent {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = u16::deserialize(deserializer)?;

        Self::new(value).map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for DiscountPercent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// A discount that only applies inside an inclusive time window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimedDiscount {
    percent: DiscountPercent,
    starts_at: Timestamp,
    ends_at: Timestamp,
}

impl TimedDiscount {
    /// Create a timed discount.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::InvalidWindow`] when `ends_at` precedes `starts_at`.
    pub fn new(
        percent: DiscountPercent,
        starts_at: Timestamp,
        ends_at: Timestamp,
    ) -> Result<Self, PricingError> {
        if ends_at < starts_at {
            return Err(PricingError::InvalidWindow { starts_at, ends_at });
        }

        Ok(Self {
            percent,
            starts_at,
            ends_at,
        })
    }

    /// Discount applied while active.
    pub fn percent(&self) -> DiscountPercent {
        self.percent
    }

    /// First instant the discount applies.
    pub fn starts_at(&self) -> Timestamp {
        self.starts_at
    }

    /// Last instant the discount applies.
    pub fn ends_at(&self) -> Timestamp {
        self.ends_at
    }

    /// A zero-percent timed discount never counts as active.
    pub fn is_active_at(&self, now: Timestamp) -> bool {
        !self.percent.is_zero() && self.starts_at <= now && now <= self.ends_at
    }
}

/// Which product discount is in force at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "percent", rename_all = "snake_case")]
pub enum AppliedDiscount {
    /// The product's fixed percentage.
    Fixed(DiscountPercent),

    /// The timed percentage, whose window contains the evaluation time.
    Timed(DiscountPercent),
}

impl AppliedDiscount {
    /// Percentage regardless of origin.
    pub fn percent(self) -> DiscountPercent {
        match self {
            Self::Fixed(percent) | Self::Timed(percent) => percent,
        }
    }
}

/// Discount configuration of a product.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProductDiscount {
    fixed: DiscountPercent,
    timed: Option<TimedDiscount>,
}

impl ProductDiscount {
    /// Create a discount configuration.
    pub fn new(fixed: DiscountPercent, timed: Option<TimedDiscount>) -> Self {
        Self { fixed, timed }
    }

    /// Fixed discount only.
    pub fn fixed(fixed: DiscountPercent) -> Self {
        Self::new(fixed, None)
    }

    /// The fixed percentage.
    pub fn fixed_percent(&self) -> DiscountPercent {
        self.fixed
    }

    /// The timed discount, if configured.
    pub fn timed(&self) -> Option<&TimedDiscount> {
        self.timed.as_ref()
    }

    /// Resolve the discount in force at `now`: the timed one inside its window,
    /// otherwise the fixed one.
    pub fn applied_at(&self, now: Timestamp) -> AppliedDiscount {
        match self.timed {
            Some(timed) if timed.is_active_at(now) => AppliedDiscount::Timed(timed.percent),
            _ => AppliedDiscount::Fixed(self.fixed),
        }
    }

    /// Effective percentage at `now`.
    pub fn effective_percent(&self, now: Timestamp) -> DiscountPercent {
        self.applied_at(now).percent()
    }
}

/// Apply a percentage discount to a base price.
///
/// # Errors
///
/// Returns [`PricingError::Overflow`] when the result cannot be represented.
pub fn discounted_price(base: u64, percent: DiscountPercent) -> Result<u64, PricingError> {
    if percent.is_zero() {
        return Ok(base);
    }

    scale(base, 100 - u64::from(percent.value()))
}

/// `amount * numerator / 100`, rounded half to even.
fn scale(amount: u64, numerator: u64) -> Result<u64, PricingError> {
    let scaled = Decimal::from(amount)
        .checked_mul(Decimal::from(numerator))
        .and_then(|value| value.checked_div(Decimal::ONE_HUNDRED))
        .ok_or(PricingError::Overflow)?;

    scaled
        .round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven)
        .to_u64()
        .ok_or(PricingError::Overflow)
}

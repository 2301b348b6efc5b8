//! Coupons
//!
//! Cart-level discount codes with a validity window, a usage cap and a
//! minimum spend.

use std::fmt;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;

use crate::pricing::{DiscountPercent, PricingError};

/// Coupon code as entered by the shopper.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CouponCode(String);

impl CouponCode {
    /// Normalise surrounding whitespace; codes themselves are case-sensitive.
    ///
    /// # Errors
    ///
    /// Returns [`CouponError::EmptyCode`] for blank input.
    pub fn parse(code: &str) -> Result<Self, CouponError> {
        let trimmed = code.trim();

        if trimmed.is_empty() {
            return Err(CouponError::EmptyCode);
        }

        Ok(Self(trimmed.to_string()))
    }

    /// The code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CouponCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Why a coupon cannot be used right now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum CouponRejection {
    /// The coupon has been switched off.
    Inactive,

    /// The validity window has not opened yet.
    NotYetValid {
        /// Window start
        valid_from: Timestamp,
    },

    /// The validity window has closed.
    Expired {
        /// Window end
        valid_to: Timestamp,
    },

    /// The coupon reached its usage cap.
    UsageExhausted {
        /// Maximum number of uses
        limit: u32,
    },

    /// The cart does not reach the minimum spend.
    BelowMinimum {
        /// Required cart amount
        minimum: u64,
        /// Current cart amount
        cart_total: u64,
    },
}

impl fmt::Display for CouponRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inactive => f.write_str("coupon is not active"),
            Self::NotYetValid { valid_from } => write!(f, "coupon is valid from {valid_from}"),
            Self::Expired { valid_to } => write!(f, "coupon expired at {valid_to}"),
            Self::UsageExhausted { limit } => write!(f, "coupon usage limit of {limit} reached"),
            Self::BelowMinimum { minimum, .. } => {
                write!(f, "cart total must be at least {minimum}")
            }
        }
    }
}

/// Rejections collected by [`Coupon::check`].
pub type CouponRejections = SmallVec<[CouponRejection; 4]>;

/// Coupon errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CouponError {
    /// A coupon code must not be blank.
    #[error("coupon code must not be empty")]
    EmptyCode,

    /// Percentage and fixed amount were both given.
    #[error("a coupon takes either a discount percentage or a discount amount, not both")]
    BothModes,

    /// Neither percentage nor fixed amount was given.
    #[error("a coupon needs a discount percentage or a discount amount")]
    NoMode,

    /// The validity window is inverted.
    #[error("coupon validity ends before it starts")]
    InvalidWindow,

    /// Invalid percentage or overflowing calculation.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// The coupon cannot be used; every failing rule is listed.
    #[error("coupon rejected: {}", join(.0))]
    Rejected(CouponRejections),
}

fn join(rejections: &CouponRejections) -> String {
    rejections
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// How a coupon reduces the cart total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum CouponDiscount {
    /// Percentage of the cart total.
    Percent(DiscountPercent),

    /// Fixed amount in minor units.
    Amount(u64),
}

/// Unvalidated coupon input, mirroring an admin form where both discount
/// fields are optional.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewCoupon {
    pub code: String,
    #[serde(default)]
    pub discount_percentage: Option<u16>,
    #[serde(default)]
    pub discount_amount: Option<u64>,
    pub valid_from: Timestamp,
    pub valid_to: Timestamp,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default = "default_usage_limit")]
    pub usage_limit: Option<u32>,
    #[serde(default)]
    pub min_cart_amount: u64,
    #[serde(default)]
    pub max_discount_amount: Option<u64>,
}

fn default_active() -> bool {
    true
}

#[expect(
    clippy::unnecessary_wraps,
    reason = "serde default must match the field type"
)]
fn default_usage_limit() -> Option<u32> {
    Some(1)
}

/// A validated coupon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Coupon {
    code: CouponCode,
    discount: CouponDiscount,
    valid_from: Timestamp,
    valid_to: Timestamp,
    is_active: bool,
    usage_limit: Option<u32>,
    used_count: u32,
    min_cart_amount: u64,
    max_discount_amount: Option<u64>,
}

impl TryFrom<NewCoupon> for Coupon {
    type Error = CouponError;

    fn try_from(new: NewCoupon) -> Result<Self, Self::Error> {
        let code = CouponCode::parse(&new.code)?;

        let discount = match (new.discount_percentage, new.discount_amount) {
            (Some(_), Some(_)) => return Err(CouponError::BothModes),
            (None, None) => return Err(CouponError::NoMode),
            (Some(percent), None) => CouponDiscount::Percent(DiscountPercent::new(percent)?),
            (None, Some(amount)) => CouponDiscount::Amount(amount),
        };

        if new.valid_to < new.valid_from {
            return Err(CouponError::InvalidWindow);
        }

        Ok(Self {
            code,
            discount,
            valid_from: new.valid_from,
            valid_to: new.valid_to,
            is_active: new.is_active,
            usage_limit: new.usage_limit,
            used_count: 0,
            min_cart_amount: new.min_cart_amount,
            max_discount_amount: new.max_discount_amount,
        })
    }
}

impl Coupon {
    /// Coupon code.
    pub fn code(&self) -> &CouponCode {
        &self.code
    }

    /// Discount mode.
    pub fn discount(&self) -> CouponDiscount {
        self.discount
    }

    /// Number of completed orders that used this coupon.
    pub fn used_count(&self) -> u32 {
        self.used_count
    }

    /// Usage cap, `None` when unlimited.
    pub fn usage_limit(&self) -> Option<u32> {
        self.usage_limit
    }

    /// Minimum cart amount.
    pub fn min_cart_amount(&self) -> u64 {
        self.min_cart_amount
    }

    /// Enable or disable the coupon.
    pub fn set_active(&mut self, is_active: bool) {
        self.is_active = is_active;
    }

    /// Evaluate every usage rule at `now` against `cart_total`.
    ///
    /// # Errors
    ///
    /// Returns [`CouponError::Rejected`] listing every failing rule.
    pub fn check(&self, now: Timestamp, cart_total: u64) -> Result<(), CouponError> {
        let mut rejections = CouponRejections::new();

        if !self.is_active {
            rejections.push(CouponRejection::Inactive);
        }

        if now < self.valid_from {
            rejections.push(CouponRejection::NotYetValid {
                valid_from: self.valid_from,
            });
        }

        if now > self.valid_to {
            rejections.push(CouponRejection::Expired {
                valid_to: self.valid_to,
            });
        }

        if let Some(limit) = self.usage_limit
            && self.used_count >= limit
        {
            rejections.push(CouponRejection::UsageExhausted { limit });
        }

        if cart_total < self.min_cart_amount {
            rejections.push(CouponRejection::BelowMinimum {
                minimum: self.min_cart_amount,
                cart_total,
            });
        }

        if rejections.is_empty() {
            Ok(())
        } else {
            Err(CouponError::Rejected(rejections))
        }
    }

    /// Whether [`Coupon::check`] passes.
    pub fn is_valid(&self, now: Timestamp, cart_total: u64) -> bool {
        self.check(now, cart_total).is_ok()
    }

    /// Discount this coupon grants on `cart_total`, ignoring validity.
    ///
    /// Capped by the maximum discount amount and never larger than the total.
    ///
    /// # Errors
    ///
    /// Returns [`CouponError::Pricing`] if the percentage calculation overflows.
    pub fn discount_for(&self, cart_total: u64) -> Result<u64, CouponError> {
        let raw = match self.discount {
            CouponDiscount::Percent(percent) => percent.of(cart_total)?,
            CouponDiscount::Amount(amount) => amount,
        };

        let capped = self
            .max_discount_amount
            .map_or(raw, |max_discount| raw.min(max_discount));

        Ok(capped.min(cart_total))
    }

    /// Validate and compute the discount in one step.
    ///
    /// # Errors
    ///
    /// Returns [`CouponError::Rejected`] or [`CouponError::Pricing`].
    pub fn apply(&self, now: Timestamp, cart_total: u64) -> Result<u64, CouponError> {
        self.check(now, cart_total)?;

        self.discount_for(cart_total)
    }

    /// Count one use of the coupon.
    ///
    /// # Errors
    ///
    /// Returns [`CouponError::Rejected`] when the usage cap is already reached.
    pub fn record_use(&mut self) -> Result<(), CouponError> {
        if let Some(limit) = self.usage_limit
            && self.used_count >= limit
        {
            let mut rejections = CouponRejections::new();
            rejections.push(CouponRejection::UsageExhausted { limit });

            return Err(CouponError::Rejected(rejections));
        }

        self.used_count = self.used_count.saturating_add(1);

        Ok(())
    }
}

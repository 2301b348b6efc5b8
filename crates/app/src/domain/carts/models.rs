//! Cart Models

use serde::Serialize;
use wardrobe::{
    carts::{Cart, CartTotals},
    catalog::VariantUuid,
    coupons::{CouponCode, CouponRejections},
};

/// New CartItem Model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewCartItem {
    pub variant: VariantUuid,
    pub quantity: u32,
}

/// Result of applying a coupon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedCoupon {
    pub code: CouponCode,
    pub discount: u64,
    pub total: u64,
}

/// Cart priced at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartSummary {
    pub cart: Cart,
    pub totals: CartTotals,
    /// Why the applied coupon contributes no discount right now, if it doesn't
    pub coupon_rejections: Option<CouponRejections>,
}

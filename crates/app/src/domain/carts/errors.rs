//! Carts service errors.

use thiserror::Error;
use wardrobe::{
    carts::CartError,
    coupons::{CouponCode, CouponError},
    inventory::InventoryError,
    pricing::PricingError,
};

#[derive(Debug, Error)]
pub enum CartsServiceError {
    #[error("cart not found")]
    NotFound,

    #[error("variant not found")]
    VariantNotFound,

    #[error("product is not available for sale")]
    ProductUnavailable,

    #[error("coupon {0} not found")]
    CouponNotFound(CouponCode),

    #[error("no coupon applied to this cart")]
    NoCoupon,

    #[error(transparent)]
    Cart(#[from] CartError),

    #[error(transparent)]
    Coupon(#[from] CouponError),

    #[error(transparent)]
    Inventory(#[from] InventoryError),

    #[error(transparent)]
    Pricing(#[from] PricingError),
}

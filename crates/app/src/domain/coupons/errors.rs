//! Coupons service errors.

use thiserror::Error;
use wardrobe::coupons::{CouponCode, CouponError};

#[derive(Debug, Error)]
pub enum CouponsServiceError {
    #[error("coupon {0} already exists")]
    AlreadyExists(CouponCode),

    #[error("coupon {0} not found")]
    NotFound(CouponCode),

    #[error(transparent)]
    Coupon(#[from] CouponError),
}

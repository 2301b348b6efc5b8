//! Coupons service.

use async_trait::async_trait;
use mockall::automock;
use tracing::{info, warn};
use wardrobe::coupons::{Coupon, CouponCode, NewCoupon};

use crate::{database::Db, domain::coupons::errors::CouponsServiceError};

#[derive(Debug, Clone)]
pub struct MemoryCouponsService {
    db: Db,
}

impl MemoryCouponsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CouponsService for MemoryCouponsService {
    async fn create_coupon(&self, coupon: NewCoupon) -> Result<Coupon, CouponsServiceError> {
        let coupon = Coupon::try_from(coupon)?;
        let mut tx = self.db.begin().await;

        if tx.coupons.contains_key(coupon.code()) {
            warn!(code = %coupon.code(), "coupon code already exists");
            return Err(CouponsServiceError::AlreadyExists(coupon.code().clone()));
        }

        tx.coupons.insert(coupon.code().clone(), coupon.clone());
        tx.commit();

        info!(code = %coupon.code(), "created coupon");

        Ok(coupon)
    }

    async fn get_coupon(&self, code: CouponCode) -> Result<Coupon, CouponsServiceError> {
        let tables = self.db.read().await;

        tables
            .coupons
            .get(&code)
            .cloned()
            .ok_or(CouponsServiceError::NotFound(code))
    }

    async fn set_active(
        &self,
        code: CouponCode,
        is_active: bool,
    ) -> Result<Coupon, CouponsServiceError> {
        let mut tx = self.db.begin().await;

        let Some(coupon) = tx.coupons.get_mut(&code) else {
            return Err(CouponsServiceError::NotFound(code));
        };

        coupon.set_active(is_active);
        let updated = coupon.clone();

        tx.commit();

        info!(%code, is_active, "updated coupon");

        Ok(updated)
    }
}

#[automock]
#[async_trait]
pub trait CouponsService: Send + Sync {
    /// Validate and store a coupon; codes are unique.
    async fn create_coupon(&self, coupon: NewCoupon) -> Result<Coupon, CouponsServiceError>;

    /// Retrieve a coupon by code.
    async fn get_coupon(&self, code: CouponCode) -> Result<Coupon, CouponsServiceError>;

    /// Enable or disable a coupon.
    async fn set_active(
        &self,
        code: CouponCode,
        is_active: bool,
    ) -> Result<Coupon, CouponsServiceError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;
    use wardrobe::coupons::CouponError;

    use crate::test::TestContext;

    use super::*;

    fn new_coupon(code: &str) -> NewCoupon {
        NewCoupon {
            code: code.to_string(),
            discount_percentage: None,
            discount_amount: Some(1_000),
            valid_from: "2026-01-01T00:00:00Z".parse().expect("valid timestamp"),
            valid_to: "2026-02-01T00:00:00Z".parse().expect("valid timestamp"),
            is_active: true,
            usage_limit: Some(10),
            min_cart_amount: 0,
            max_discount_amount: None,
        }
    }

    #[tokio::test]
    async fn create_and_get_coupon() -> TestResult {
        let ctx = TestContext::new().await;

        let created = ctx.coupons.create_coupon(new_coupon("SPRING")).await?;
        let fetched = ctx.coupons.get_coupon(created.code().clone()).await?;

        assert_eq!(fetched, created);
        assert_eq!(fetched.used_count(), 0);

        Ok(())
    }

    #[tokio::test]
    async fn duplicate_codes_are_rejected() -> TestResult {
        let ctx = TestContext::new().await;

        let result = ctx.coupons.create_coupon(new_coupon("FLAT20")).await;

        assert!(
            matches!(result, Err(CouponsServiceError::AlreadyExists(ref code)) if code.as_str() == "FLAT20"),
            "expected AlreadyExists, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn invalid_coupons_are_rejected() {
        let ctx = TestContext::new().await;
        let mut coupon = new_coupon("BROKEN");
        coupon.discount_percentage = Some(15);

        let result = ctx.coupons.create_coupon(coupon).await;

        assert!(
            matches!(result, Err(CouponsServiceError::Coupon(CouponError::BothModes))),
            "expected BothModes, got {result:?}"
        );
    }

    #[tokio::test]
    async fn set_active_toggles_coupon() -> TestResult {
        let ctx = TestContext::new().await;
        let code = CouponCode::parse("FLAT20")?;

        let disabled = ctx.coupons.set_active(code.clone(), false).await?;

        assert!(!disabled.is_valid(ctx.now, 10_000));

        let missing = ctx.coupons.set_active(CouponCode::parse("NOPE")?, true).await;

        assert!(
            matches!(missing, Err(CouponsServiceError::NotFound(_))),
            "expected NotFound, got {missing:?}"
        );

        Ok(())
    }
}

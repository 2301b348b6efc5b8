//! App Context

use std::{path::Path, sync::Arc};

use jiff::Timestamp;
use rusty_money::iso::Currency;
use thiserror::Error;
use tracing::info;
use wardrobe::{
    fixtures::{FixtureError, Storefront},
    orders::ShippingRates,
};

use crate::{
    database::{Db, Tables},
    domain::{
        addresses::{AddressesService, MemoryAddressesService},
        carts::{CartsService, MemoryCartsService},
        catalog::{CatalogService, MemoryCatalogService},
        coupons::{CouponsService, MemoryCouponsService},
        orders::{MemoryOrdersService, OrdersService},
        reviews::{MemoryReviewsService, ReviewsService},
    },
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to load storefront fixture: {0}")]
    Fixture(#[from] FixtureError),
}

#[derive(Clone)]
pub struct AppContext {
    pub catalog: Arc<dyn CatalogService>,
    pub carts: Arc<dyn CartsService>,
    pub coupons: Arc<dyn CouponsService>,
    pub orders: Arc<dyn OrdersService>,
    pub reviews: Arc<dyn ReviewsService>,
    pub addresses: Arc<dyn AddressesService>,
    pub currency: &'static Currency,
}

impl AppContext {
    /// Build application context over an existing store.
    #[must_use]
    pub fn new(db: Db, currency: &'static Currency, rates: ShippingRates) -> Self {
        Self {
            catalog: Arc::new(MemoryCatalogService::new(db.clone())),
            carts: Arc::new(MemoryCartsService::new(db.clone())),
            coupons: Arc::new(MemoryCouponsService::new(db.clone())),
            reviews: Arc::new(MemoryReviewsService::new(db.clone())),
            addresses: Arc::new(MemoryAddressesService::new(db.clone())),
            orders: Arc::new(MemoryOrdersService::new(db, rates)),
            currency,
        }
    }

    /// Build application context seeded from a loaded storefront.
    #[must_use]
    pub fn from_storefront(storefront: Storefront, rates: ShippingRates) -> Self {
        let currency = storefront.currency;

        Self::new(Db::new(Tables::from(storefront)), currency, rates)
    }

    /// Build application context from a storefront fixture file.
    ///
    /// # Errors
    ///
    /// Returns an error when the fixture cannot be read or is invalid.
    pub fn from_fixture(
        path: &Path,
        rates: ShippingRates,
        now: Timestamp,
    ) -> Result<Self, AppInitError> {
        let storefront = Storefront::load(path, now)?;

        info!(
            path = %path.display(),
            products = storefront.products.len(),
            variants = storefront.variants.len(),
            coupons = storefront.coupons.len(),
            "loaded storefront"
        );

        Ok(Self::from_storefront(storefront, rates))
    }
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("currency", &self.currency.iso_alpha_code)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use testresult::TestResult;

    use super::*;

    #[tokio::test]
    async fn from_fixture_seeds_services() -> TestResult {
        let mut file = tempfile::NamedTempFile::new()?;

        writeln!(
            file,
            r#"
currency: GBP
products:
  - name: Rain Mac
    variants:
      - {{ size: M, color: Navy, price: "95.00 GBP", stock: 3 }}
"#
        )?;

        let now: Timestamp = "2026-03-01T12:00:00Z".parse()?;
        let ctx = AppContext::from_fixture(file.path(), ShippingRates::default(), now)?;

        assert_eq!(ctx.currency.iso_alpha_code, "GBP");

        let products = ctx.catalog.list_products(None, now).await?;
        assert_eq!(products.len(), 1);
        assert_eq!(products.first().map(|product| product.slug.as_str()), Some("rain-mac"));

        Ok(())
    }

    #[test]
    fn missing_fixture_is_reported() {
        let result = AppContext::from_fixture(
            Path::new("does/not/exist.yml"),
            ShippingRates::default(),
            Timestamp::UNIX_EPOCH,
        );

        assert!(matches!(result, Err(AppInitError::Fixture(FixtureError::Io(_)))));
    }
}

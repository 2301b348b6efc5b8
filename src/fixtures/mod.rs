//! Fixtures
//!
//! Loading a storefront (catalog, stock and coupons) from a YAML file.

use std::{fs, path::Path};

use jiff::Timestamp;
use rusty_money::iso::Currency;
use thiserror::Error;

use crate::{
    catalog::{CatalogError, Category, Product, Tag, Variant},
    coupons::{Coupon, CouponError},
    inventory::{InventoryError, InventoryLedger},
    pricing::PricingError,
};

pub mod prices;
pub mod storefront;

pub use prices::parse_price;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// A price uses a different currency than the storefront
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// Product refers to an undefined category
    #[error("Category not found: {0}")]
    CategoryNotFound(String),

    /// Two records share a slug
    #[error("Duplicate slug: {0}")]
    DuplicateSlug(String),

    /// Two variants of one product share size and color
    #[error("Duplicate variant {size}/{color} for product {product}")]
    DuplicateVariant {
        /// Product slug
        product: String,
        /// Variant size
        size: String,
        /// Variant color
        color: String,
    },

    /// Two coupons share a code
    #[error("Duplicate coupon code: {0}")]
    DuplicateCoupon(String),

    /// Invalid catalog record
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Invalid discount data
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// Invalid stock levels
    #[error(transparent)]
    Inventory(#[from] InventoryError),

    /// Invalid coupon data
    #[error(transparent)]
    Coupon(#[from] CouponError),
}

/// A fully validated storefront dataset.
#[derive(Debug, Clone)]
pub struct Storefront {
    /// Currency of every price
    pub currency: &'static Currency,

    /// Categories in file order
    pub categories: Vec<Category>,

    /// Tags in order of first use
    pub tags: Vec<Tag>,

    /// Products in file order
    pub products: Vec<Product>,

    /// Variants of all products
    pub variants: Vec<Variant>,

    /// Stock per variant
    pub ledger: InventoryLedger,

    /// Coupons
    pub coupons: Vec<Coupon>,
}

impl Storefront {
    /// Load a storefront fixture file.
    ///
    /// Products without an explicit `created_at` are stamped with `now`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn load(path: impl AsRef<Path>, now: Timestamp) -> Result<Self, FixtureError> {
        let contents = fs::read_to_string(path)?;

        Self::from_yaml(&contents, now)
    }

    /// Parse and validate a storefront from YAML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML cannot be parsed or validated.
    pub fn from_yaml(contents: &str, now: Timestamp) -> Result<Self, FixtureError> {
        let fixture: storefront::StorefrontFixture = serde_norway::from_str(contents)?;

        fixture.build(now)
    }
}

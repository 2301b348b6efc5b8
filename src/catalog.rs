//! Catalog
//!
//! Categories, tags, products and their size/color variants.

use jiff::Timestamp;
use serde::Serialize;
use thiserror::Error;

use crate::{
    pricing::{AppliedDiscount, PricingError, ProductDiscount, discounted_price},
    uuids::TypedUuid,
};

/// Errors raised while validating catalog records.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    /// The explicit slug, or the one derived from the name, is empty.
    #[error("{0:?} does not produce a usable slug")]
    InvalidSlug(String),
}

/// Category UUID
pub type CategoryUuid = TypedUuid<Category>;

/// Tag UUID
pub type TagUuid = TypedUuid<Tag>;

/// Product UUID
pub type ProductUuid = TypedUuid<Product>;

/// Variant UUID
pub type VariantUuid = TypedUuid<Variant>;

/// Product category
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub uuid: CategoryUuid,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub is_active: bool,
}

/// Free-form product label
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tag {
    pub uuid: TagUuid,
    pub name: String,
    pub slug: String,
}

/// Product
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Product {
    pub uuid: ProductUuid,
    pub name: String,
    pub slug: String,
    pub category: Option<CategoryUuid>,
    pub description: String,
    pub is_active: bool,
    pub tags: Vec<TagUuid>,
    pub discount: ProductDiscount,
    pub created_at: Timestamp,
}

impl Product {
    /// The discount in force at `now`.
    pub fn effective_discount(&self, now: Timestamp) -> AppliedDiscount {
        self.discount.applied_at(now)
    }
}

/// A purchasable size/color combination of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Variant {
    pub uuid: VariantUuid,
    pub product: ProductUuid,
    pub size: String,
    pub color: String,
    /// Base unit price in minor units, before product discounts.
    pub price: u64,
}

impl Variant {
    /// Unit price after the product's discount at `now`.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::Overflow`] if the calculation overflows.
    pub fn unit_price(&self, product: &Product, now: Timestamp) -> Result<u64, PricingError> {
        discounted_price(self.price, product.discount.effective_percent(now))
    }

    /// Human readable label, e.g. `Linen Dress (Sand, M)`.
    pub fn label(&self, product: &Product) -> String {
        format!("{} ({}, {})", product.name, self.color, self.size)
    }

    /// Whether this variant has the given size and color.
    pub fn matches(&self, size: &str, color: &str) -> bool {
        self.size.eq_ignore_ascii_case(size) && self.color.eq_ignore_ascii_case(color)
    }
}

/// Cheapest and dearest discounted unit price across variants.
///
/// # Errors
///
/// Returns [`PricingError::Overflow`] if any price calculation overflows.
pub fn price_range<'a>(
    product: &Product,
    variants: impl IntoIterator<Item = &'a Variant>,
    now: Timestamp,
) -> Result<Option<(u64, u64)>, PricingError> {
    let mut range: Option<(u64, u64)> = None;

    for variant in variants {
        let price = variant.unit_price(product, now)?;

        range = Some(match range {
            Some((min, max)) => (min.min(price), max.max(price)),
            None => (price, price),
        });
    }

    Ok(range)
}

/// Build a URL slug from a display name.
///
/// Letters and digits of any script are kept (lowercased); runs of whitespace,
/// underscores and hyphens become a single `-`; everything else is dropped.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;

    for ch in name.chars() {
        if ch.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(ch.to_lowercase());
        } else if ch.is_whitespace() || ch == '-' || ch == '_' {
            pending_dash = true;
        }
    }

    slug
}

/// The explicit slug when one is given, otherwise one derived from `name`.
///
/// # Errors
///
/// Returns [`CatalogError::InvalidSlug`] when the result would be empty.
pub fn resolve_slug(name: &str, slug: Option<String>) -> Result<String, CatalogError> {
    let resolved = match slug {
        Some(slug) => slug.trim().to_string(),
        None => slugify(name),
    };

    if resolved.is_empty() {
        return Err(CatalogError::InvalidSlug(name.to_string()));
    }

    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use jiff::ToSpan;
    use testresult::TestResult;

    use crate::pricing::{DiscountPercent, TimedDiscount};

    use super::*;

    fn product(discount: ProductDiscount) -> Product {
        Product {
            uuid: ProductUuid::new(),
            name: "Linen Dress".to_string(),
            slug: "linen-dress".to_string(),
            category: None,
            description: String::new(),
            is_active: true,
            tags: Vec::new(),
            discount,
            created_at: Timestamp::UNIX_EPOCH,
        }
    }

    fn variant(product: &Product, size: &str, price: u64) -> Variant {
        Variant {
            uuid: VariantUuid::new(),
            product: product.uuid,
            size: size.to_string(),
            color: "Sand".to_string(),
            price,
        }
    }

    #[test]
    fn slugify_collapses_separators_and_keeps_unicode() {
        assert_eq!(slugify("Summer  Linen -- Dress!"), "summer-linen-dress");
        assert_eq!(slugify("  _Trailing_ "), "trailing");
        assert_eq!(slugify("پیراهن مردانه"), "پیراهن-مردانه");
    }

    #[test]
    fn resolve_slug_rejects_empty_results() {
        assert_eq!(resolve_slug("Linen Dress", None), Ok("linen-dress".to_string()));
        assert_eq!(
            resolve_slug("Linen Dress", Some(" summer-linen ".to_string())),
            Ok("summer-linen".to_string())
        );
        assert_eq!(
            resolve_slug("!!!", None),
            Err(CatalogError::InvalidSlug("!!!".to_string()))
        );
        assert_eq!(
            resolve_slug("Linen Dress", Some("  ".to_string())),
            Err(CatalogError::InvalidSlug("Linen Dress".to_string()))
        );
    }

    #[test]
    fn unit_price_follows_timed_window() -> TestResult {
        let start = Timestamp::from_second(1_700_000_000)?;
        let product = product(ProductDiscount::new(
            DiscountPercent::new(10)?,
            Some(TimedDiscount::new(
                DiscountPercent::new(50)?,
                start,
                start + 24.hours(),
            )?),
        ));
        let variant = variant(&product, "M", 4_000);

        assert_eq!(variant.unit_price(&product, start)?, 2_000);
        assert_eq!(variant.unit_price(&product, start + 48.hours())?, 3_600);

        Ok(())
    }

    #[test]
    fn price_range_spans_variants() -> TestResult {
        let product = product(ProductDiscount::fixed(DiscountPercent::new(20)?));
        let variants = [
            variant(&product, "S", 1_000),
            variant(&product, "M", 1_500),
            variant(&product, "L", 1_250),
        ];

        assert_eq!(
            price_range(&product, &variants, Timestamp::UNIX_EPOCH)?,
            Some((800, 1_200))
        );
        assert_eq!(price_range(&product, &[], Timestamp::UNIX_EPOCH)?, None);

        Ok(())
    }

    #[test]
    fn variant_label_and_matching() {
        let product = product(ProductDiscount::default());
        let variant = variant(&product, "M", 1_000);

        assert_eq!(variant.label(&product), "Linen Dress (Sand, M)");
        assert!(variant.matches("m", "sand"));
        assert!(!variant.matches("L", "Sand"));
    }
}

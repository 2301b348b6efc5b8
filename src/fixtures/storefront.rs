//! Storefront Fixtures

use jiff::Timestamp;
use rustc_hash::{FxHashMap, FxHashSet};
use rusty_money::iso::{self, Currency};
use serde::Deserialize;

use crate::{
    catalog::{
        CatalogError, Category, CategoryUuid, Product, ProductUuid, Tag, TagUuid, Variant,
        VariantUuid, resolve_slug,
    },
    coupons::{Coupon, NewCoupon},
    fixtures::{FixtureError, Storefront, parse_price},
    inventory::{InventoryLedger, Stock},
    pricing::{DiscountPercent, ProductDiscount, TimedDiscount},
};

/// Top level storefront document
#[derive(Debug, Deserialize)]
pub struct StorefrontFixture {
    /// ISO currency code shared by every price
    pub currency: String,

    /// Categories
    #[serde(default)]
    pub categories: Vec<CategoryFixture>,

    /// Products with their variants
    #[serde(default)]
    pub products: Vec<ProductFixture>,

    /// Coupons
    #[serde(default)]
    pub coupons: Vec<NewCoupon>,
}

/// Category Fixture
#[derive(Debug, Deserialize)]
pub struct CategoryFixture {
    /// Display name
    pub name: String,

    /// URL slug, derived from the name when omitted
    #[serde(default)]
    pub slug: Option<String>,

    /// Description
    #[serde(default)]
    pub description: String,

    /// Whether the category is shown
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// Product Fixture
#[derive(Debug, Deserialize)]
pub struct ProductFixture {
    /// Display name
    pub name: String,

    /// URL slug, derived from the name when omitted
    #[serde(default)]
    pub slug: Option<String>,

    /// Category slug
    #[serde(default)]
    pub category: Option<String>,

    /// Description
    #[serde(default)]
    pub description: String,

    /// Whether the product is sold
    #[serde(default = "default_true")]
    pub is_active: bool,

    /// Tag names
    #[serde(default)]
    pub tags: Vec<String>,

    /// Always-on discount percentage
    #[serde(default)]
    pub fixed_discount: DiscountPercent,

    /// Discount limited to a time window
    #[serde(default)]
    pub timed_discount: Option<TimedDiscountFixture>,

    /// Creation time
    #[serde(default)]
    pub created_at: Option<Timestamp>,

    /// Size/color variants
    #[serde(default)]
    pub variants: Vec<VariantFixture>,
}

/// Timed Discount Fixture
#[derive(Debug, Deserialize)]
pub struct TimedDiscountFixture {
    /// Discount percentage
    pub percent: DiscountPercent,

    /// Window start (inclusive)
    pub starts_at: Timestamp,

    /// Window end (inclusive)
    pub ends_at: Timestamp,
}

/// Variant Fixture
#[derive(Debug, Deserialize)]
pub struct VariantFixture {
    /// Size label
    pub size: String,

    /// Color label
    pub color: String,

    /// Base price (e.g. "45.00 USD")
    pub price: String,

    /// Total physical stock
    #[serde(default)]
    pub stock: u32,

    /// Stock sellable online, defaults to the total stock
    #[serde(default)]
    pub online_stock: Option<u32>,
}

fn default_true() -> bool {
    true
}

impl StorefrontFixture {
    /// Validate the document and assign identifiers.
    ///
    /// # Errors
    ///
    /// Returns a [`FixtureError`] describing the first invalid record.
    pub fn build(self, now: Timestamp) -> Result<Storefront, FixtureError> {
        let currency =
            iso::find(&self.currency).ok_or_else(|| FixtureError::UnknownCurrency(self.currency.clone()))?;

        let mut categories = Vec::with_capacity(self.categories.len());
        let mut category_keys = FxHashMap::<String, CategoryUuid>::default();

        for fixture in self.categories {
            let slug = resolve_slug(&fixture.name, fixture.slug)?;
            let uuid = CategoryUuid::new();

            if category_keys.insert(slug.clone(), uuid).is_some() {
                return Err(FixtureError::DuplicateSlug(slug));
            }

            categories.push(Category {
                uuid,
                name: fixture.name,
                slug,
                description: fixture.description,
                is_active: fixture.is_active,
            });
        }

        let mut tags = TagRegistry::default();
        let mut products = Vec::with_capacity(self.products.len());
        let mut variants = Vec::new();
        let mut ledger = InventoryLedger::new();
        let mut product_slugs = FxHashSet::default();

        for fixture in self.products {
            let slug = resolve_slug(&fixture.name, fixture.slug.clone())?;

            if !product_slugs.insert(slug.clone()) {
                return Err(FixtureError::DuplicateSlug(slug));
            }

            let category = fixture
                .category
                .as_ref()
                .map(|key| {
                    category_keys
                        .get(key)
                        .copied()
                        .ok_or_else(|| FixtureError::CategoryNotFound(key.clone()))
                })
                .transpose()?;

            let timed = fixture
                .timed_discount
                .map(|timed| TimedDiscount::new(timed.percent, timed.starts_at, timed.ends_at))
                .transpose()?;

            let mut product_tags = Vec::with_capacity(fixture.tags.len());

            for name in &fixture.tags {
                let tag = tags.intern(name)?;

                if !product_tags.contains(&tag) {
                    product_tags.push(tag);
                }
            }

            let product = Product {
                uuid: ProductUuid::new(),
                name: fixture.name,
                slug: slug.clone(),
                category,
                description: fixture.description,
                is_active: fixture.is_active,
                tags: product_tags,
                discount: ProductDiscount::new(fixture.fixed_discount, timed),
                created_at: fixture.created_at.unwrap_or(now),
            };

            let first_variant = variants.len();

            for variant in fixture.variants {
                let (price, price_currency) = parse_price(&variant.price)?;
                ensure_currency(currency, price_currency)?;

                let duplicate = variants
                    .get(first_variant..)
                    .unwrap_or_default()
                    .iter()
                    .any(|existing: &Variant| existing.matches(&variant.size, &variant.color));

                if duplicate {
                    return Err(FixtureError::DuplicateVariant {
                        product: slug,
                        size: variant.size,
                        color: variant.color,
                    });
                }

                let stock = Stock::new(variant.stock, variant.online_stock.unwrap_or(variant.stock))?;
                let uuid = VariantUuid::new();

                ledger.track(uuid, stock);

                variants.push(Variant {
                    uuid,
                    product: product.uuid,
                    size: variant.size,
                    color: variant.color,
                    price,
                });
            }

            products.push(product);
        }

        let mut coupons: Vec<Coupon> = Vec::with_capacity(self.coupons.len());

        for new_coupon in self.coupons {
            let coupon = Coupon::try_from(new_coupon)?;

            if coupons.iter().any(|existing| existing.code() == coupon.code()) {
                return Err(FixtureError::DuplicateCoupon(coupon.code().to_string()));
            }

            coupons.push(coupon);
        }

        Ok(Storefront {
            currency,
            categories,
            tags: tags.into_tags(),
            products,
            variants,
            ledger,
            coupons,
        })
    }
}

fn ensure_currency(expected: &'static Currency, found: &'static Currency) -> Result<(), FixtureError> {
    if expected == found {
        Ok(())
    } else {
        Err(FixtureError::CurrencyMismatch(
            expected.iso_alpha_code.to_string(),
            found.iso_alpha_code.to_string(),
        ))
    }
}

/// Tags created on first mention, deduplicated by slug.
#[derive(Debug, Default)]
struct TagRegistry {
    tags: Vec<Tag>,
    by_slug: FxHashMap<String, TagUuid>,
}

impl TagRegistry {
    fn intern(&mut self, name: &str) -> Result<TagUuid, CatalogError> {
        let slug = resolve_slug(name, None)?;

        if let Some(uuid) = self.by_slug.get(&slug) {
            return Ok(*uuid);
        }

        let uuid = TagUuid::new();

        self.by_slug.insert(slug.clone(), uuid);
        self.tags.push(Tag {
            uuid,
            name: name.to_string(),
            slug,
        });

        Ok(uuid)
    }

    fn into_tags(self) -> Vec<Tag> {
        self.tags
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::pricing::AppliedDiscount;

    use super::*;

    const STOREFRONT: &str = r#"
currency: USD
categories:
  - name: Dresses
  - name: Winter Coats
    slug: coats
    is_active: false
products:
  - name: Linen Dress
    category: dresses
    tags: [Summer, linen, summer]
    fixed_discount: 10
    timed_discount:
      percent: 30
      starts_at: 2026-06-01T00:00:00Z
      ends_at: 2026-06-30T23:59:59Z
    variants:
      - { size: S, color: Sand, price: "45.00 USD", stock: 5, online_stock: 3 }
      - { size: M, color: Sand, price: "47.50 USD", stock: 2 }
coupons:
  - code: WELCOME10
    discount_percentage: 10
    valid_from: 2026-01-01T00:00:00Z
    valid_to: 2026-12-31T23:59:59Z
    usage_limit: null
"#;

    fn build(yaml: &str) -> Result<Storefront, FixtureError> {
        let fixture: StorefrontFixture = serde_norway::from_str(yaml)?;

        fixture.build(Timestamp::UNIX_EPOCH)
    }

    #[test]
    fn builds_catalog_stock_and_coupons() -> TestResult {
        let storefront = build(STOREFRONT)?;

        assert_eq!(storefront.categories.len(), 2);
        assert_eq!(
            storefront.categories.iter().map(|c| c.slug.as_str()).collect::<Vec<_>>(),
            ["dresses", "coats"]
        );
        assert_eq!(storefront.tags.len(), 2, "tags are deduplicated by slug");

        let product = storefront.products.first().ok_or("missing product")?;
        assert_eq!(product.slug, "linen-dress");
        assert_eq!(product.category, storefront.categories.first().map(|c| c.uuid));
        assert_eq!(product.tags.len(), 2);

        let june = "2026-06-15T12:00:00Z".parse()?;
        assert!(matches!(product.effective_discount(june), AppliedDiscount::Timed(_)));

        let small = storefront.variants.first().ok_or("missing variant")?;
        assert_eq!(small.price, 4_500);
        assert_eq!(storefront.ledger.stock(small.uuid), Some(Stock::new(5, 3)?));

        let medium = storefront.variants.get(1).ok_or("missing variant")?;
        assert_eq!(storefront.ledger.stock(medium.uuid), Some(Stock::new(2, 2)?));

        let coupon = storefront.coupons.first().ok_or("missing coupon")?;
        assert_eq!(coupon.usage_limit(), None);

        Ok(())
    }

    #[test]
    fn rejects_currency_mismatch() {
        let yaml = r#"
currency: USD
products:
  - name: Scarf
    variants:
      - { size: One, color: Red, price: "10.00 EUR", stock: 1 }
"#;

        assert!(matches!(
            build(yaml),
            Err(FixtureError::CurrencyMismatch(expected, found)) if expected == "USD" && found == "EUR"
        ));
    }

    #[test]
    fn rejects_unknown_category_and_duplicates() {
        let unknown = r"
currency: USD
products:
  - name: Scarf
    category: accessories
";

        assert!(matches!(build(unknown), Err(FixtureError::CategoryNotFound(slug)) if slug == "accessories"));

        let duplicate = r#"
currency: USD
products:
  - name: Scarf
    variants:
      - { size: One, color: Red, price: "10.00 USD" }
      - { size: one, color: red, price: "11.00 USD" }
"#;

        assert!(matches!(build(duplicate), Err(FixtureError::DuplicateVariant { .. })));
    }

    #[test]
    fn rejects_online_stock_above_total() {
        let yaml = r#"
currency: USD
products:
  - name: Scarf
    variants:
      - { size: One, color: Red, price: "10.00 USD", stock: 1, online_stock: 2 }
"#;

        assert!(matches!(build(yaml), Err(FixtureError::Inventory(_))));
    }

    #[test]
    fn rejects_invalid_coupon() {
        let yaml = r"
currency: USD
coupons:
  - code: BOTH
    discount_percentage: 10
    discount_amount: 500
    valid_from: 2026-01-01T00:00:00Z
    valid_to: 2026-12-31T23:59:59Z
";

        assert!(matches!(build(yaml), Err(FixtureError::Coupon(_))));
    }

    #[test]
    fn rejects_names_without_a_usable_slug() {
        let product = r#"
currency: USD
products:
  - name: "!!!"
"#;

        assert!(matches!(
            build(product),
            Err(FixtureError::Catalog(CatalogError::InvalidSlug(name))) if name == "!!!"
        ));

        let tag = r#"
currency: USD
products:
  - name: Scarf
    tags: ["***"]
"#;

        assert!(matches!(
            build(tag),
            Err(FixtureError::Catalog(CatalogError::InvalidSlug(_)))
        ));
    }
}

//! Catalog Repository

use std::cmp::Reverse;

use jiff::Timestamp;
use wardrobe::{
    catalog::{Category, CategoryUuid, Product, ProductUuid, Tag, Variant, VariantUuid},
    pricing::PricingError,
};

use crate::database::Tables;

#[derive(Debug, Clone, Default)]
pub(crate) struct CatalogRepository;

impl CatalogRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) fn category_by_slug<'t>(&self, tables: &'t Tables, slug: &str) -> Option<&'t Category> {
        tables.categories.values().find(|category| category.slug == slug)
    }

    pub(crate) fn product_by_slug<'t>(&self, tables: &'t Tables, slug: &str) -> Option<&'t Product> {
        tables.products.values().find(|product| product.slug == slug)
    }

    /// Active products, newest first.
    pub(crate) fn active_products<'t>(
        &self,
        tables: &'t Tables,
        category: Option<CategoryUuid>,
    ) -> Vec<&'t Product> {
        let mut products: Vec<&Product> = tables
            .products
            .values()
            .filter(|product| product.is_active)
            .filter(|product| category.is_none_or(|category| product.category == Some(category)))
            .collect();

        products.sort_by_key(|product| (Reverse(product.created_at), Reverse(product.uuid)));

        products
    }

    /// Variants of a product in creation order.
    pub(crate) fn variants_of<'t>(&self, tables: &'t Tables, product: ProductUuid) -> Vec<&'t Variant> {
        let mut variants: Vec<&Variant> = tables
            .variants
            .values()
            .filter(|variant| variant.product == product)
            .collect();

        variants.sort_by_key(|variant| variant.uuid);

        variants
    }

    pub(crate) fn tags_of<'t>(&self, tables: &'t Tables, product: &Product) -> Vec<&'t Tag> {
        product
            .tags
            .iter()
            .filter_map(|tag| tables.tags.get(tag))
            .collect()
    }

    pub(crate) fn tag_by_slug<'t>(&self, tables: &'t Tables, slug: &str) -> Option<&'t Tag> {
        tables.tags.values().find(|tag| tag.slug == slug)
    }
}

/// Discounted unit price of a variant at `now`, `None` when the variant or its
/// product no longer exists.
pub(crate) fn unit_price(
    tables: &Tables,
    variant: VariantUuid,
    now: Timestamp,
) -> Result<Option<u64>, PricingError> {
    let Some(variant) = tables.variants.get(&variant) else {
        return Ok(None);
    };

    let Some(product) = tables.products.get(&variant.product) else {
        return Ok(None);
    };

    variant.unit_price(product, now).map(Some)
}

//! Catalog Models

use jiff::Timestamp;
use serde::Serialize;
use wardrobe::{
    catalog::{Category, CategoryUuid, Product, ProductUuid, Tag, TagUuid, Variant},
    inventory::Stock,
    pricing::{AppliedDiscount, ProductDiscount},
    reviews::Review,
};

/// Product as shown in listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductSummary {
    pub uuid: ProductUuid,
    pub name: String,
    pub slug: String,
    pub category: Option<String>,
    pub discount: AppliedDiscount,
    /// Cheapest and dearest discounted variant price
    pub price_range: Option<(u64, u64)>,
    /// Whether any variant has online stock
    pub in_stock: bool,
    pub created_at: Timestamp,
}

/// Variant with its price and stock at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariantDetails {
    pub variant: Variant,
    pub unit_price: u64,
    pub stock: Stock,
}

/// Product page data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductDetails {
    pub product: Product,
    pub category: Option<Category>,
    pub tags: Vec<Tag>,
    pub discount: AppliedDiscount,
    pub variants: Vec<VariantDetails>,
    /// Approved reviews, newest first
    pub reviews: Vec<Review>,
}

/// New Category Model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCategory {
    pub name: String,
    pub slug: Option<String>,
    pub description: String,
}

/// New Tag Model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTag {
    pub name: String,
}

/// New Product Model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub name: String,
    pub slug: Option<String>,
    pub category: Option<CategoryUuid>,
    pub description: String,
    pub tags: Vec<TagUuid>,
    pub discount: ProductDiscount,
}

/// New Variant Model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVariant {
    pub product: ProductUuid,
    pub size: String,
    pub color: String,
    pub price: u64,
    pub stock: Stock,
}

//! Catalog service errors.

use thiserror::Error;
use wardrobe::{catalog::CatalogError, inventory::InventoryError, pricing::PricingError};

#[derive(Debug, Error)]
pub enum CatalogServiceError {
    #[error("product not found")]
    NotFound,

    #[error("variant not found")]
    VariantNotFound,

    #[error("category {0} not found")]
    CategoryNotFound(String),

    #[error("tag not found")]
    TagNotFound,

    #[error("slug {0} already exists")]
    AlreadyExists(String),

    #[error("product already has a {size}/{color} variant")]
    DuplicateVariant { size: String, color: String },

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Pricing(#[from] PricingError),

    #[error(transparent)]
    Inventory(#[from] InventoryError),
}

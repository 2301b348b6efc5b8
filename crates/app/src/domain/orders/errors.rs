//! Orders service errors.

use thiserror::Error;
use wardrobe::{
    carts::CartError, inventory::InventoryError, orders::OrderError, pricing::PricingError,
};

#[derive(Debug, Error)]
pub enum OrdersServiceError {
    #[error("order not found")]
    NotFound,

    #[error("cart not found")]
    CartNotFound,

    #[error("tracking code {0} is already in use")]
    TrackingCodeInUse(String),

    #[error("shipping an order requires a tracking code")]
    TrackingCodeRequired,

    #[error(transparent)]
    Order(#[from] OrderError),

    #[error(transparent)]
    Cart(#[from] CartError),

    #[error(transparent)]
    Inventory(#[from] InventoryError),

    #[error(transparent)]
    Pricing(#[from] PricingError),
}

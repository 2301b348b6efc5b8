//! Order Models

use wardrobe::{
    carts::CartUuid,
    orders::{Address, ShippingMethod},
};

/// Checkout request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceOrder {
    pub cart: CartUuid,
    pub shipping_method: ShippingMethod,
    pub shipping_address: Option<Address>,
}

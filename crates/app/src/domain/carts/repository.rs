//! Carts Repository

use jiff::Timestamp;
use wardrobe::{
    carts::{Cart, CartOwner, CartUuid},
    pricing::PricingError,
};

use crate::{database::Tables, domain::catalog::repository::unit_price};

#[derive(Debug, Clone, Default)]
pub(crate) struct CartsRepository;

impl CartsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) fn cart_for_owner<'t>(&self, tables: &'t Tables, owner: &CartOwner) -> Option<&'t Cart> {
        tables.carts.values().find(|cart| cart.owner() == owner)
    }

    pub(crate) fn get_cart(&self, tables: &Tables, cart: CartUuid) -> Option<Cart> {
        tables.carts.get(&cart).cloned()
    }

    pub(crate) fn save_cart(&self, tables: &mut Tables, cart: Cart) {
        tables.carts.insert(cart.uuid(), cart);
    }
}

/// Refresh every line's price snapshot at `now`.
pub(crate) fn reprice(tables: &Tables, cart: &mut Cart, now: Timestamp) -> Result<(), PricingError> {
    cart.reprice(|variant| unit_price(tables, variant, now))
}

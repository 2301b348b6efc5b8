//! Carts
//!
//! A cart holds at most one line per variant. Each line snapshots the unit
//! price it was added at; totals are always derived from the lines.

use std::fmt;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    catalog::VariantUuid,
    coupons::{Coupon, CouponCode, CouponError},
    uuids::TypedUuid,
};

/// Cart UUID
pub type CartUuid = TypedUuid<Cart>;

/// Cart item UUID
pub type CartItemUuid = TypedUuid<CartItem>;

/// Marker for authenticated shoppers; identities come from the auth layer.
#[derive(Debug)]
pub struct Customer;

/// Customer UUID
pub type CustomerUuid = TypedUuid<Customer>;

/// Opaque session key identifying a guest shopper.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionKey(String);

impl SessionKey {
    /// Wrap a session key.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Who a cart belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum CartOwner {
    /// An authenticated customer.
    Customer(CustomerUuid),

    /// A guest identified by session.
    Guest(SessionKey),
}

impl CartOwner {
    /// The customer, when authenticated.
    pub fn customer(&self) -> Option<CustomerUuid> {
        match self {
            Self::Customer(customer) => Some(*customer),
            Self::Guest(_) => None,
        }
    }
}

impl fmt::Display for CartOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Customer(customer) => write!(f, "customer:{customer}"),
            Self::Guest(session) => write!(f, "guest:{}", session.as_str()),
        }
    }
}

/// Cart errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    /// Quantities must be positive when adding.
    #[error("quantity must be at least 1")]
    InvalidQuantity,

    /// No such line in this cart.
    #[error("cart item {0} not found")]
    ItemNotFound(CartItemUuid),

    /// A coupon was passed that is not the one applied to the cart.
    #[error("coupon {given} is not the coupon applied to this cart")]
    CouponMismatch {
        /// Coupon passed in
        given: CouponCode,
    },

    /// Totals overflowed.
    #[error("cart total overflowed")]
    Overflow,

    /// Wrapped coupon validation or calculation failure.
    #[error(transparent)]
    Coupon(#[from] CouponError),
}

/// A cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartItem {
    uuid: CartItemUuid,
    variant: VariantUuid,
    quantity: u32,
    unit_price: u64,
}

impl CartItem {
    /// Line identifier.
    pub fn uuid(&self) -> CartItemUuid {
        self.uuid
    }

    /// Variant on this line.
    pub fn variant(&self) -> VariantUuid {
        self.variant
    }

    /// Units on this line.
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Unit price captured when the line was last priced.
    pub fn unit_price(&self) -> u64 {
        self.unit_price
    }

    /// `quantity * unit_price`.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Overflow`] if the product does not fit.
    pub fn line_total(&self) -> Result<u64, CartError> {
        self.unit_price
            .checked_mul(u64::from(self.quantity))
            .ok_or(CartError::Overflow)
    }
}

/// Derived cart amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CartTotals {
    /// Sum of line totals
    pub subtotal: u64,
    /// Coupon discount
    pub discount: u64,
    /// `subtotal - discount`
    pub total: u64,
    /// Sum of quantities
    pub quantity: u64,
}

/// Shopping cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cart {
    uuid: CartUuid,
    owner: CartOwner,
    items: Vec<CartItem>,
    coupon: Option<CouponCode>,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl Cart {
    /// Create an empty cart.
    pub fn new(uuid: CartUuid, owner: CartOwner, now: Timestamp) -> Self {
        Self {
            uuid,
            owner,
            items: Vec::new(),
            coupon: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Cart identifier.
    pub fn uuid(&self) -> CartUuid {
        self.uuid
    }

    /// Cart owner.
    pub fn owner(&self) -> &CartOwner {
        &self.owner
    }

    /// Lines in insertion order.
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Applied coupon code, if any.
    pub fn coupon(&self) -> Option<&CouponCode> {
        self.coupon.as_ref()
    }

    /// Creation time.
    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// Last modification time.
    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    /// Whether the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Find a line by id.
    pub fn item(&self, item: CartItemUuid) -> Option<&CartItem> {
        self.items.iter().find(|line| line.uuid == item)
    }

    /// Find the line holding `variant`.
    pub fn item_for_variant(&self, variant: VariantUuid) -> Option<&CartItem> {
        self.items.iter().find(|line| line.variant == variant)
    }

    /// Quantity that would be on the `variant` line after adding `quantity`.
    pub fn quantity_after_adding(&self, variant: VariantUuid, quantity: u32) -> u64 {
        let current = self.item_for_variant(variant).map_or(0, CartItem::quantity);

        u64::from(current) + u64::from(quantity)
    }

    /// Add units of a variant, merging into an existing line and refreshing
    /// its price snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidQuantity`] for zero, or
    /// [`CartError::Overflow`] if the merged quantity overflows.
    pub fn add_item(
        &mut self,
        variant: VariantUuid,
        quantity: u32,
        unit_price: u64,
        now: Timestamp,
    ) -> Result<CartItem, CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity);
        }

        let line = match self.items.iter_mut().find(|line| line.variant == variant) {
            Some(line) => {
                line.quantity = line
                    .quantity
                    .checked_add(quantity)
                    .ok_or(CartError::Overflow)?;
                line.unit_price = unit_price;
                line.clone()
            }
            None => {
                let line = CartItem {
                    uuid: CartItemUuid::new(),
                    variant,
                    quantity,
                    unit_price,
                };
                self.items.push(line.clone());
                line
            }
        };

        self.updated_at = now;

        Ok(line)
    }

    /// Set a line's quantity; zero removes the line. Returns the updated line,
    /// or `None` when it was removed.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::ItemNotFound`] for unknown lines.
    pub fn set_quantity(
        &mut self,
        item: CartItemUuid,
        quantity: u32,
        unit_price: u64,
        now: Timestamp,
    ) -> Result<Option<CartItem>, CartError> {
        if quantity == 0 {
            self.remove_item(item, now)?;
            return Ok(None);
        }

        let line = self
            .items
            .iter_mut()
            .find(|line| line.uuid == item)
            .ok_or(CartError::ItemNotFound(item))?;

        line.quantity = quantity;
        line.unit_price = unit_price;
        let updated = line.clone();

        self.updated_at = now;

        Ok(Some(updated))
    }

    /// Remove a line.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::ItemNotFound`] for unknown lines.
    pub fn remove_item(&mut self, item: CartItemUuid, now: Timestamp) -> Result<CartItem, CartError> {
        let position = self.position(item)?;
        let removed = self.items.remove(position);

        self.updated_at = now;

        Ok(removed)
    }

    /// Remove every line. The applied coupon stays.
    pub fn clear(&mut self, now: Timestamp) {
        self.items.clear();
        self.updated_at = now;
    }

    /// Attach a coupon code, replacing any previous one.
    pub fn apply_coupon(&mut self, code: CouponCode, now: Timestamp) {
        self.coupon = Some(code);
        self.updated_at = now;
    }

    /// Detach the coupon, returning it.
    pub fn remove_coupon(&mut self, now: Timestamp) -> Option<CouponCode> {
        self.updated_at = now;
        self.coupon.take()
    }

    /// Refresh every line's price snapshot. Lines whose price cannot be
    /// resolved keep their previous snapshot.
    ///
    /// # Errors
    ///
    /// Propagates the first error returned by `price_of`.
    pub fn reprice<E>(
        &mut self,
        mut price_of: impl FnMut(VariantUuid) -> Result<Option<u64>, E>,
    ) -> Result<(), E> {
        for line in &mut self.items {
            if let Some(price) = price_of(line.variant)? {
                line.unit_price = price;
            }
        }

        Ok(())
    }

    /// Sum of line totals.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Overflow`] if the sum overflows.
    pub fn subtotal(&self) -> Result<u64, CartError> {
        self.items.iter().try_fold(0u64, |acc, line| {
            acc.checked_add(line.line_total()?)
                .ok_or(CartError::Overflow)
        })
    }

    /// Sum of quantities.
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// Compute totals, applying `coupon` when given.
    ///
    /// The coupon must be the one attached to the cart and valid at `now`
    /// for the current subtotal.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::CouponMismatch`], [`CartError::Coupon`] or
    /// [`CartError::Overflow`].
    pub fn totals(&self, coupon: Option<&Coupon>, now: Timestamp) -> Result<CartTotals, CartError> {
        let subtotal = self.subtotal()?;

        let discount = match coupon {
            Some(coupon) => {
                if self.coupon.as_ref() != Some(coupon.code()) {
                    return Err(CartError::CouponMismatch {
                        given: coupon.code().clone(),
                    });
                }

                coupon.apply(now, subtotal)?
            }
            None => 0,
        };

        Ok(CartTotals {
            subtotal,
            discount,
            total: subtotal - discount,
            quantity: self.total_quantity(),
        })
    }

    fn position(&self, item: CartItemUuid) -> Result<usize, CartError> {
        self.items
            .iter()
            .position(|line| line.uuid == item)
            .ok_or(CartError::ItemNotFound(item))
    }
}

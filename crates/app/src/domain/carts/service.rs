//! Carts service.

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use tracing::{debug, info, warn};
use wardrobe::{
    carts::{Cart, CartError, CartItem, CartItemUuid, CartOwner, CartUuid},
    catalog::VariantUuid,
    coupons::{CouponCode, CouponError},
};

use crate::{
    database::{Db, Tables},
    domain::carts::{
        errors::CartsServiceError,
        models::{AppliedCoupon, CartSummary, NewCartItem},
        repository::{CartsRepository, reprice},
    },
};

#[derive(Debug, Clone)]
pub struct MemoryCartsService {
    db: Db,
    repository: CartsRepository,
}

impl MemoryCartsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: CartsRepository::new(),
        }
    }

    fn load(&self, tables: &Tables, cart: CartUuid) -> Result<Cart, CartsServiceError> {
        self.repository
            .get_cart(tables, cart)
            .ok_or(CartsServiceError::NotFound)
    }
}

/// Current unit price of a variant that can be put in a cart.
fn sellable_price(
    tables: &Tables,
    variant: VariantUuid,
    now: Timestamp,
) -> Result<u64, CartsServiceError> {
    let variant = tables
        .variants
        .get(&variant)
        .ok_or(CartsServiceError::VariantNotFound)?;

    let product = tables
        .products
        .get(&variant.product)
        .filter(|product| product.is_active)
        .ok_or(CartsServiceError::ProductUnavailable)?;

    Ok(variant.unit_price(product, now)?)
}

#[async_trait]
impl CartsService for MemoryCartsService {
    async fn get_or_create_cart(
        &self,
        owner: CartOwner,
        now: Timestamp,
    ) -> Result<Cart, CartsServiceError> {
        let mut tx = self.db.begin().await;

        if let Some(cart) = self.repository.cart_for_owner(&tx, &owner) {
            return Ok(cart.clone());
        }

        let cart = Cart::new(CartUuid::new(), owner, now);

        self.repository.save_cart(&mut tx, cart.clone());
        tx.commit();

        info!(uuid = %cart.uuid(), owner = %cart.owner(), "created cart");

        Ok(cart)
    }

    async fn get_cart(&self, cart: CartUuid) -> Result<Cart, CartsServiceError> {
        let tables = self.db.read().await;

        self.load(&tables, cart)
    }

    async fn add_item(
        &self,
        cart: CartUuid,
        item: NewCartItem,
        now: Timestamp,
    ) -> Result<CartItem, CartsServiceError> {
        if item.quantity == 0 {
            return Err(CartError::InvalidQuantity.into());
        }

        let mut tx = self.db.begin().await;
        let mut cart = self.load(&tx, cart)?;

        let unit_price = sellable_price(&tx, item.variant, now)?;
        let requested = cart.quantity_after_adding(item.variant, item.quantity);

        if let Err(error) = tx.ledger.ensure_available(item.variant, requested) {
            warn!(cart = %cart.uuid(), variant = %item.variant, requested, "insufficient stock");
            return Err(error.into());
        }

        let line = cart.add_item(item.variant, item.quantity, unit_price, now)?;

        self.repository.save_cart(&mut tx, cart);
        tx.commit();

        info!(item = %line.uuid(), variant = %line.variant(), quantity = line.quantity(), "added cart item");

        Ok(line)
    }

    async fn update_item(
        &self,
        cart: CartUuid,
        item: CartItemUuid,
        quantity: u32,
        now: Timestamp,
    ) -> Result<Option<CartItem>, CartsServiceError> {
        let mut tx = self.db.begin().await;
        let mut cart = self.load(&tx, cart)?;

        let line = cart.item(item).ok_or(CartError::ItemNotFound(item))?;
        let variant = line.variant();

        let unit_price = if quantity == 0 {
            line.unit_price()
        } else {
            let unit_price = sellable_price(&tx, variant, now)?;
            tx.ledger.ensure_available(variant, u64::from(quantity))?;
            unit_price
        };

        let updated = cart.set_quantity(item, quantity, unit_price, now)?;

        self.repository.save_cart(&mut tx, cart);
        tx.commit();

        match &updated {
            Some(line) => info!(%item, quantity = line.quantity(), "updated cart item"),
            None => info!(%item, "removed cart item"),
        }

        Ok(updated)
    }

    async fn remove_item(
        &self,
        cart: CartUuid,
        item: CartItemUuid,
        now: Timestamp,
    ) -> Result<CartItem, CartsServiceError> {
        let mut tx = self.db.begin().await;
        let mut cart = self.load(&tx, cart)?;

        let removed = cart.remove_item(item, now)?;

        self.repository.save_cart(&mut tx, cart);
        tx.commit();

        info!(%item, "removed cart item");

        Ok(removed)
    }

    async fn clear_cart(&self, cart: CartUuid, now: Timestamp) -> Result<Cart, CartsServiceError> {
        let mut tx = self.db.begin().await;
        let mut cart = self.load(&tx, cart)?;

        cart.clear(now);

        self.repository.save_cart(&mut tx, cart.clone());
        tx.commit();

        info!(uuid = %cart.uuid(), "cleared cart");

        Ok(cart)
    }

    async fn apply_coupon(
        &self,
        cart: CartUuid,
        code: CouponCode,
        now: Timestamp,
    ) -> Result<AppliedCoupon, CartsServiceError> {
        let mut tx = self.db.begin().await;
        let mut cart = self.load(&tx, cart)?;

        reprice(&tx, &mut cart, now)?;

        let coupon = tx
            .coupons
            .get(&code)
            .ok_or_else(|| CartsServiceError::CouponNotFound(code.clone()))?;

        let subtotal = cart.subtotal()?;

        let discount = match coupon.apply(now, subtotal) {
            Ok(discount) => discount,
            Err(error) => {
                warn!(cart = %cart.uuid(), %code, %error, "coupon rejected");
                return Err(error.into());
            }
        };

        cart.apply_coupon(code.clone(), now);

        let applied = AppliedCoupon {
            code,
            discount,
            total: subtotal - discount,
        };

        self.repository.save_cart(&mut tx, cart);
        tx.commit();

        info!(code = %applied.code, discount, "applied coupon");

        Ok(applied)
    }

    async fn remove_coupon(&self, cart: CartUuid, now: Timestamp) -> Result<Cart, CartsServiceError> {
        let mut tx = self.db.begin().await;
        let mut cart = self.load(&tx, cart)?;

        let code = cart.remove_coupon(now).ok_or(CartsServiceError::NoCoupon)?;

        self.repository.save_cart(&mut tx, cart.clone());
        tx.commit();

        info!(uuid = %cart.uuid(), %code, "removed coupon");

        Ok(cart)
    }

    async fn summary(
        &self,
        cart: CartUuid,
        point_in_time: Timestamp,
    ) -> Result<CartSummary, CartsServiceError> {
        let tables = self.db.read().await;
        let mut cart = self.load(&tables, cart)?;

        reprice(&tables, &mut cart, point_in_time)?;

        let coupon = cart
            .coupon()
            .map(|code| {
                tables
                    .coupons
                    .get(code)
                    .ok_or_else(|| CartsServiceError::CouponNotFound(code.clone()))
            })
            .transpose()?;

        let (totals, coupon_rejections) = match cart.totals(coupon, point_in_time) {
            Ok(totals) => (totals, None),
            Err(CartError::Coupon(CouponError::Rejected(rejections))) => {
                (cart.totals(None, point_in_time)?, Some(rejections))
            }
            Err(error) => return Err(error.into()),
        };

        debug!(uuid = %cart.uuid(), total = totals.total, "priced cart");

        Ok(CartSummary {
            cart,
            totals,
            coupon_rejections,
        })
    }
}

#[automock]
#[async_trait]
pub trait CartsService: Send + Sync {
    /// The owner's cart, created empty on first use.
    async fn get_or_create_cart(
        &self,
        owner: CartOwner,
        now: Timestamp,
    ) -> Result<Cart, CartsServiceError>;

    /// Retrieve a single cart.
    async fn get_cart(&self, cart: CartUuid) -> Result<Cart, CartsServiceError>;

    /// Add units of a variant, merging with an existing line.
    async fn add_item(
        &self,
        cart: CartUuid,
        item: NewCartItem,
        now: Timestamp,
    ) -> Result<CartItem, CartsServiceError>;

    /// Change a line's quantity; zero removes it.
    async fn update_item(
        &self,
        cart: CartUuid,
        item: CartItemUuid,
        quantity: u32,
        now: Timestamp,
    ) -> Result<Option<CartItem>, CartsServiceError>;

    /// Remove a line.
    async fn remove_item(
        &self,
        cart: CartUuid,
        item: CartItemUuid,
        now: Timestamp,
    ) -> Result<CartItem, CartsServiceError>;

    /// Remove every line.
    async fn clear_cart(&self, cart: CartUuid, now: Timestamp) -> Result<Cart, CartsServiceError>;

    /// Validate a coupon against the freshly priced cart and attach it.
    async fn apply_coupon(
        &self,
        cart: CartUuid,
        code: CouponCode,
        now: Timestamp,
    ) -> Result<AppliedCoupon, CartsServiceError>;

    /// Detach the applied coupon.
    async fn remove_coupon(&self, cart: CartUuid, now: Timestamp) -> Result<Cart, CartsServiceError>;

    /// Price the cart at a point in time.
    async fn summary(
        &self,
        cart: CartUuid,
        point_in_time: Timestamp,
    ) -> Result<CartSummary, CartsServiceError>;
}

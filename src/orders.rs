//! Orders
//!
//! Turning a priced cart into an immutable order, and the order status
//! lifecycle afterwards.

use std::fmt;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    carts::{Cart, CartError, CustomerUuid},
    catalog::VariantUuid,
    coupons::{Coupon, CouponCode, CouponError},
    inventory::{InventoryError, InventoryLedger, StockLine},
    uuids::TypedUuid,
};

/// Order UUID
pub type OrderUuid = TypedUuid<Order>;

/// Errors raised while placing or progressing an order.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OrderError {
    /// Nothing to order.
    #[error("cart is empty")]
    EmptyCart,

    /// Guests cannot place orders.
    #[error("orders require an authenticated customer")]
    Unauthenticated,

    /// The cart references a coupon that was not supplied.
    #[error("coupon {0} applied to the cart could not be found")]
    MissingCoupon(CouponCode),

    /// Status change not allowed from the current state.
    #[error("cannot move order from {from} to {to}")]
    InvalidTransition {
        /// Current status
        from: OrderStatus,
        /// Requested status
        to: OrderStatus,
    },

    /// A tracking code must not be blank.
    #[error("tracking code must not be empty")]
    EmptyTrackingCode,

    /// Totals overflowed.
    #[error("order total overflowed")]
    Overflow,

    /// Wrapped cart failure.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// Wrapped coupon failure.
    #[error(transparent)]
    Coupon(#[from] CouponError),

    /// Wrapped stock failure.
    #[error(transparent)]
    Inventory(#[from] InventoryError),
}

/// Order lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Awaiting payment.
    Pending,
    /// Payment received.
    Paid,
    /// Being prepared.
    Processing,
    /// Handed to the carrier.
    Shipped,
    /// Received by the customer.
    Delivered,
    /// Cancelled before shipping; stock returned.
    Cancelled,
    /// Money returned.
    Refunded,
}

impl OrderStatus {
    /// Whether moving to `next` is allowed.
    pub fn can_transition_to(self, next: Self) -> bool {
        use OrderStatus::{Cancelled, Delivered, Paid, Pending, Processing, Refunded, Shipped};

        matches!(
            (self, next),
            (Pending, Paid)
                | (Paid, Processing)
                | (Processing, Shipped)
                | (Shipped, Delivered)
                | (Pending | Paid | Processing, Cancelled)
                | (Paid | Processing | Shipped | Delivered, Refunded)
        )
    }

    /// Whether stock should go back on the shelf when entering this status
    /// from `previous`.
    pub fn restocks_from(self, previous: Self) -> bool {
        self == Self::Cancelled && previous != Self::Cancelled
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
            Self::Refunded => "refunded",
        })
    }
}

/// Delivery option chosen at checkout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShippingMethod {
    /// No charge.
    #[default]
    FreeDelivery,
    /// Express post at the configured rate.
    PostOffice,
}

/// Shipping prices per method.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShippingRates {
    /// Post office rate in minor units
    pub post_office: u64,
}

impl ShippingRates {
    /// Cost of `method`.
    pub fn cost(&self, method: ShippingMethod) -> u64 {
        match method {
            ShippingMethod::FreeDelivery => 0,
            ShippingMethod::PostOffice => self.post_office,
        }
    }
}

/// Delivery address snapshot stored with the order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub recipient_name: String,
    pub recipient_phone: String,
    pub province: String,
    pub city: String,
    pub street: String,
    pub postal_code: String,
    #[serde(default)]
    pub description: String,
}

/// A purchased line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderItem {
    /// Variant bought
    pub variant: VariantUuid,
    /// Units bought
    pub quantity: u32,
    /// Unit price charged
    pub unit_price: u64,
}

impl OrderItem {
    /// `quantity * unit_price`.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::Overflow`] if the product does not fit.
    pub fn line_total(&self) -> Result<u64, OrderError> {
        self.unit_price
            .checked_mul(u64::from(self.quantity))
            .ok_or(OrderError::Overflow)
    }
}

/// Checkout options supplied by the shopper.
#[derive(Debug, Clone, Default)]
pub struct Checkout {
    /// Delivery option
    pub shipping_method: ShippingMethod,
    /// Delivery address
    pub shipping_address: Option<Address>,
}

/// A placed order. Line items and amounts never change after placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Order {
    uuid: OrderUuid,
    customer: CustomerUuid,
    placed_at: Timestamp,
    items: Vec<OrderItem>,
    subtotal: u64,
    discount_amount: u64,
    shipping_method: ShippingMethod,
    shipping_cost: u64,
    total: u64,
    status: OrderStatus,
    tracking_code: Option<String>,
    coupon_code: Option<CouponCode>,
    shipping_address: Option<Address>,
}

impl Order {
    /// Order identifier.
    pub fn uuid(&self) -> OrderUuid {
        self.uuid
    }

    /// Customer who placed the order.
    pub fn customer(&self) -> CustomerUuid {
        self.customer
    }

    /// Placement time.
    pub fn placed_at(&self) -> Timestamp {
        self.placed_at
    }

    /// Purchased lines.
    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    /// Sum of line totals.
    pub fn subtotal(&self) -> u64 {
        self.subtotal
    }

    /// Coupon discount.
    pub fn discount_amount(&self) -> u64 {
        self.discount_amount
    }

    /// Delivery option.
    pub fn shipping_method(&self) -> ShippingMethod {
        self.shipping_method
    }

    /// Delivery charge.
    pub fn shipping_cost(&self) -> u64 {
        self.shipping_cost
    }

    /// Amount due: `subtotal - discount + shipping`.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Current status.
    pub fn status(&self) -> OrderStatus {
        self.status
    }

    /// Carrier tracking code, once shipped.
    pub fn tracking_code(&self) -> Option<&str> {
        self.tracking_code.as_deref()
    }

    /// Coupon used, if any.
    pub fn coupon_code(&self) -> Option<&CouponCode> {
        self.coupon_code.as_ref()
    }

    /// Delivery address.
    pub fn shipping_address(&self) -> Option<&Address> {
        self.shipping_address.as_ref()
    }

    /// Stock movements represented by this order.
    pub fn stock_lines(&self) -> Vec<StockLine> {
        self.items
            .iter()
            .map(|item| StockLine {
                variant: item.variant,
                quantity: item.quantity,
            })
            .collect()
    }

    /// Move to `next`, returning the previous status.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::InvalidTransition`] for disallowed moves.
    pub fn transition(&mut self, next: OrderStatus) -> Result<OrderStatus, OrderError> {
        if !self.status.can_transition_to(next) {
            return Err(OrderError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }

        Ok(std::mem::replace(&mut self.status, next))
    }

    /// Mark as shipped with a carrier tracking code.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::EmptyTrackingCode`] or [`OrderError::InvalidTransition`].
    pub fn ship(&mut self, tracking_code: &str) -> Result<(), OrderError> {
        let tracking_code = tracking_code.trim();

        if tracking_code.is_empty() {
            return Err(OrderError::EmptyTrackingCode);
        }

        self.transition(OrderStatus::Shipped)?;
        self.tracking_code = Some(tracking_code.to_string());

        Ok(())
    }
}

/// Convert a priced cart into an order.
///
/// The cart's line snapshots are used as-is, so callers reprice the cart at
/// `now` beforehand. Stock for every line is taken from `ledger` and the
/// coupon's use is recorded; on any error neither is modified.
///
/// # Errors
///
/// - [`OrderError::EmptyCart`] / [`OrderError::Unauthenticated`]
/// - [`OrderError::MissingCoupon`] when the cart carries a code but no coupon was given
/// - coupon, cart and inventory failures
pub fn finalize_order(
    cart: &Cart,
    checkout: Checkout,
    rates: &ShippingRates,
    ledger: &mut InventoryLedger,
    coupon: Option<&mut Coupon>,
    now: Timestamp,
) -> Result<Order, OrderError> {
    if cart.is_empty() {
        return Err(OrderError::EmptyCart);
    }

    let customer = cart.owner().customer().ok_or(OrderError::Unauthenticated)?;

    let coupon = match (cart.coupon(), coupon) {
        (Some(code), None) => return Err(OrderError::MissingCoupon(code.clone())),
        (_, coupon) => coupon,
    };

    let totals = cart.totals(coupon.as_deref(), now)?;

    let items: Vec<OrderItem> = cart
        .items()
        .iter()
        .map(|line| OrderItem {
            variant: line.variant(),
            quantity: line.quantity(),
            unit_price: line.unit_price(),
        })
        .collect();

    let shipping_cost = rates.cost(checkout.shipping_method);
    let total = totals
        .total
        .checked_add(shipping_cost)
        .ok_or(OrderError::Overflow)?;

    let lines: Vec<StockLine> = items
        .iter()
        .map(|item| StockLine {
            variant: item.variant,
            quantity: item.quantity,
        })
        .collect();

    ledger.commit_sale(&lines)?;

    let coupon_code = match coupon {
        Some(coupon) => {
            if let Err(error) = coupon.record_use() {
                ledger.release(&lines)?;
                return Err(error.into());
            }
            Some(coupon.code().clone())
        }
        None => None,
    };

    Ok(Order {
        uuid: OrderUuid::new(),
        customer,
        placed_at: now,
        items,
        subtotal: totals.subtotal,
        discount_amount: totals.discount,
        shipping_method: checkout.shipping_method,
        shipping_cost,
        total,
        status: OrderStatus::Pending,
        tracking_code: None,
        coupon_code,
        shipping_address: checkout.shipping_address,
    })
}

#[cfg(test)]
mod tests {
    use jiff::ToSpan;
    use testresult::TestResult;

    use crate::{
        carts::{CartOwner, CartUuid, SessionKey},
        coupons::NewCoupon,
        inventory::Stock,
    };

    use super::*;

    struct Setup {
        cart: Cart,
        ledger: InventoryLedger,
        variant: VariantUuid,
    }

    fn setup(online: u32) -> TestResult<Setup> {
        let variant = VariantUuid::new();
        let mut ledger = InventoryLedger::new();
        ledger.track(variant, Stock::new(10, online)?);

        let mut cart = Cart::new(
            CartUuid::new(),
            CartOwner::Customer(CustomerUuid::new()),
            Timestamp::UNIX_EPOCH,
        );
        cart.add_item(variant, 2, 1_500, Timestamp::UNIX_EPOCH)?;

        Ok(Setup {
            cart,
            ledger,
            variant,
        })
    }

    fn coupon(usage_limit: u32) -> Result<Coupon, CouponError> {
        Coupon::try_from(NewCoupon {
            code: "WELCOME".to_string(),
            discount_percentage: None,
            discount_amount: Some(500),
            valid_from: Timestamp::UNIX_EPOCH,
            valid_to: Timestamp::UNIX_EPOCH + 24.hours(),
            is_active: true,
            usage_limit: Some(usage_limit),
            min_cart_amount: 1_000,
            max_discount_amount: None,
        })
    }

    #[test]
    fn status_transitions_follow_lifecycle() {
        use OrderStatus::{Cancelled, Delivered, Paid, Pending, Processing, Refunded, Shipped};

        assert!(Pending.can_transition_to(Paid));
        assert!(Processing.can_transition_to(Cancelled));
        assert!(Delivered.can_transition_to(Refunded));
        assert!(!Shipped.can_transition_to(Cancelled));
        assert!(!Pending.can_transition_to(Shipped));
        assert!(!Cancelled.can_transition_to(Paid));
        assert!(!Pending.can_transition_to(Refunded));
    }

    #[test]
    fn finalize_builds_order_and_takes_online_stock() -> TestResult {
        let Setup {
            cart,
            mut ledger,
            variant,
        } = setup(5)?;
        let rates = ShippingRates { post_office: 350 };
        let checkout = Checkout {
            shipping_method: ShippingMethod::PostOffice,
            shipping_address: None,
        };

        let order = finalize_order(&cart, checkout, &rates, &mut ledger, None, Timestamp::UNIX_EPOCH)?;

        assert_eq!(order.subtotal(), 3_000);
        assert_eq!(order.discount_amount(), 0);
        assert_eq!(order.shipping_cost(), 350);
        assert_eq!(order.total(), 3_350);
        assert_eq!(order.status(), OrderStatus::Pending);
        assert_eq!(ledger.stock(variant), Some(Stock::new(10, 3)?));

        Ok(())
    }

    #[test]
    fn finalize_applies_coupon_and_records_use() -> TestResult {
        let Setup {
            mut cart,
            mut ledger,
            ..
        } = setup(5)?;
        let mut coupon = coupon(1)?;
        cart.apply_coupon(coupon.code().clone(), Timestamp::UNIX_EPOCH);

        let order = finalize_order(
            &cart,
            Checkout::default(),
            &ShippingRates::default(),
            &mut ledger,
            Some(&mut coupon),
            Timestamp::UNIX_EPOCH + 1.hour(),
        )?;

        assert_eq!(order.discount_amount(), 500);
        assert_eq!(order.total(), 2_500);
        assert_eq!(order.coupon_code(), Some(coupon.code()));
        assert_eq!(coupon.used_count(), 1);

        Ok(())
    }

    #[test]
    fn finalize_rejects_guests_and_empty_carts() -> TestResult {
        let Setup { mut ledger, .. } = setup(5)?;
        let mut guest = Cart::new(
            CartUuid::new(),
            CartOwner::Guest(SessionKey::new("abc")),
            Timestamp::UNIX_EPOCH,
        );
        let rates = ShippingRates::default();

        assert_eq!(
            finalize_order(&guest, Checkout::default(), &rates, &mut ledger, None, Timestamp::UNIX_EPOCH),
            Err(OrderError::EmptyCart)
        );

        guest.add_item(VariantUuid::new(), 1, 100, Timestamp::UNIX_EPOCH)?;

        assert_eq!(
            finalize_order(&guest, Checkout::default(), &rates, &mut ledger, None, Timestamp::UNIX_EPOCH),
            Err(OrderError::Unauthenticated)
        );

        Ok(())
    }

    #[test]
    fn insufficient_stock_leaves_everything_untouched() -> TestResult {
        let Setup {
            mut cart,
            mut ledger,
            variant,
        } = setup(1)?;
        let mut coupon = coupon(1)?;
        cart.apply_coupon(coupon.code().clone(), Timestamp::UNIX_EPOCH);

        let result = finalize_order(
            &cart,
            Checkout::default(),
            &ShippingRates::default(),
            &mut ledger,
            Some(&mut coupon),
            Timestamp::UNIX_EPOCH,
        );

        assert!(matches!(
            result,
            Err(OrderError::Inventory(InventoryError::Insufficient { .. }))
        ));
        assert_eq!(ledger.stock(variant), Some(Stock::new(10, 1)?));
        assert_eq!(coupon.used_count(), 0);

        Ok(())
    }

    #[test]
    fn missing_coupon_is_reported() -> TestResult {
        let Setup {
            mut cart,
            mut ledger,
            ..
        } = setup(5)?;
        let code = CouponCode::parse("GONE")?;
        cart.apply_coupon(code.clone(), Timestamp::UNIX_EPOCH);

        assert_eq!(
            finalize_order(
                &cart,
                Checkout::default(),
                &ShippingRates::default(),
                &mut ledger,
                None,
                Timestamp::UNIX_EPOCH
            ),
            Err(OrderError::MissingCoupon(code))
        );

        Ok(())
    }

    #[test]
    fn shipping_requires_tracking_code_and_valid_state() -> TestResult {
        let Setup {
            cart, mut ledger, ..
        } = setup(5)?;
        let mut order = finalize_order(
            &cart,
            Checkout::default(),
            &ShippingRates::default(),
            &mut ledger,
            None,
            Timestamp::UNIX_EPOCH,
        )?;

        assert_eq!(
            order.ship("TRK-1"),
            Err(OrderError::InvalidTransition {
                from: OrderStatus::Pending,
                to: OrderStatus::Shipped,
            })
        );

        order.transition(OrderStatus::Paid)?;
        order.transition(OrderStatus::Processing)?;

        assert_eq!(order.ship("  "), Err(OrderError::EmptyTrackingCode));

        order.ship("TRK-1")?;

        assert_eq!(order.tracking_code(), Some("TRK-1"));
        assert_eq!(order.status(), OrderStatus::Shipped);

        Ok(())
    }
}

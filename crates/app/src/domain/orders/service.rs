//! Orders service.

use std::cmp::Reverse;

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use tracing::{debug, info, warn};
use wardrobe::{
    carts::CustomerUuid,
    orders::{Checkout, Order, OrderStatus, OrderUuid, ShippingRates, finalize_order},
};

use crate::{
    database::{Db, Tables},
    domain::{
        carts::repository::reprice,
        orders::{errors::OrdersServiceError, models::PlaceOrder},
    },
};

#[derive(Debug, Clone)]
pub struct MemoryOrdersService {
    db: Db,
    rates: ShippingRates,
}

impl MemoryOrdersService {
    #[must_use]
    pub fn new(db: Db, rates: ShippingRates) -> Self {
        Self { db, rates }
    }
}

#[async_trait]
impl OrdersService for MemoryOrdersService {
    async fn place_order(
        &self,
        customer: CustomerUuid,
        order: PlaceOrder,
        now: Timestamp,
    ) -> Result<Order, OrdersServiceError> {
        let mut tx = self.db.begin().await;

        let mut cart = tx
            .carts
            .get(&order.cart)
            .filter(|cart| cart.owner().customer() == Some(customer))
            .cloned()
            .ok_or(OrdersServiceError::CartNotFound)?;

        reprice(&tx, &mut cart, now)?;

        let tables: &mut Tables = &mut tx;

        let coupon = cart
            .coupon()
            .and_then(|code| tables.coupons.get_mut(code));

        let checkout = Checkout {
            shipping_method: order.shipping_method,
            shipping_address: order.shipping_address,
        };

        let placed = match finalize_order(&cart, checkout, &self.rates, &mut tables.ledger, coupon, now) {
            Ok(placed) => placed,
            Err(error) => {
                warn!(cart = %cart.uuid(), %customer, %error, "order rejected");
                return Err(error.into());
            }
        };

        cart.clear(now);
        cart.remove_coupon(now);

        tables.carts.insert(cart.uuid(), cart);
        tables.orders.insert(placed.uuid(), placed.clone());

        tx.commit();

        info!(
            uuid = %placed.uuid(),
            %customer,
            total = placed.total(),
            items = placed.items().len(),
            "placed order"
        );

        Ok(placed)
    }

    async fn list_orders(&self, customer: CustomerUuid) -> Result<Vec<Order>, OrdersServiceError> {
        let tables = self.db.read().await;

        let mut orders: Vec<Order> = tables
            .orders
            .values()
            .filter(|order| order.customer() == customer)
            .cloned()
            .collect();

        orders.sort_by_key(|order| (Reverse(order.placed_at()), Reverse(order.uuid())));

        debug!(%customer, count = orders.len(), "listed orders");

        Ok(orders)
    }

    async fn get_order(
        &self,
        customer: CustomerUuid,
        order: OrderUuid,
    ) -> Result<Order, OrdersServiceError> {
        let tables = self.db.read().await;

        tables
            .orders
            .get(&order)
            .filter(|order| order.customer() == customer)
            .cloned()
            .ok_or(OrdersServiceError::NotFound)
    }

    async fn transition(
        &self,
        order: OrderUuid,
        next: OrderStatus,
    ) -> Result<Order, OrdersServiceError> {
        if next == OrderStatus::Shipped {
            return Err(OrdersServiceError::TrackingCodeRequired);
        }

        let mut tx = self.db.begin().await;
        let tables: &mut Tables = &mut tx;

        let order = tables
            .orders
            .get_mut(&order)
            .ok_or(OrdersServiceError::NotFound)?;

        let previous = order.transition(next)?;

        if next.restocks_from(previous) {
            tables.ledger.release(&order.stock_lines())?;
        }

        let updated = order.clone();

        tx.commit();

        info!(uuid = %updated.uuid(), from = %previous, to = %next, "order status changed");

        Ok(updated)
    }

    async fn ship(
        &self,
        order: OrderUuid,
        tracking_code: String,
    ) -> Result<Order, OrdersServiceError> {
        let mut tx = self.db.begin().await;
        let tracking_code = tracking_code.trim();

        let in_use = tx
            .orders
            .values()
            .any(|other| other.uuid() != order && other.tracking_code() == Some(tracking_code));

        if in_use {
            warn!(%order, tracking_code, "tracking code already in use");
            return Err(OrdersServiceError::TrackingCodeInUse(tracking_code.to_string()));
        }

        let order = tx
            .orders
            .get_mut(&order)
            .ok_or(OrdersServiceError::NotFound)?;

        order.ship(tracking_code)?;

        let updated = order.clone();

        tx.commit();

        info!(uuid = %updated.uuid(), tracking_code, "order shipped");

        Ok(updated)
    }
}

#[automock]
#[async_trait]
pub trait OrdersService: Send + Sync {
    /// Turn the customer's cart into an order, taking stock and clearing the cart.
    async fn place_order(
        &self,
        customer: CustomerUuid,
        order: PlaceOrder,
        now: Timestamp,
    ) -> Result<Order, OrdersServiceError>;

    /// A customer's orders, newest first.
    async fn list_orders(&self, customer: CustomerUuid) -> Result<Vec<Order>, OrdersServiceError>;

    /// Retrieve one of the customer's orders.
    async fn get_order(
        &self,
        customer: CustomerUuid,
        order: OrderUuid,
    ) -> Result<Order, OrdersServiceError>;

    /// Move an order to another status. Cancelling returns its stock.
    async fn transition(
        &self,
        order: OrderUuid,
        next: OrderStatus,
    ) -> Result<Order, OrdersServiceError>;

    /// Mark an order as shipped with a unique tracking code.
    async fn ship(
        &self,
        order: OrderUuid,
        tracking_code: String,
    ) -> Result<Order, OrdersServiceError>;
}

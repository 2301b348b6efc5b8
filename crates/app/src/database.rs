//! In-memory transactional store

use std::{
    ops::{Deref, DerefMut},
    sync::Arc,
};

use rustc_hash::FxHashMap;
use tokio::sync::{Mutex, MutexGuard, OwnedMutexGuard};
use wardrobe::{
    addresses::AddressBook,
    carts::{Cart, CartUuid},
    catalog::{Category, CategoryUuid, Product, ProductUuid, Tag, TagUuid, Variant, VariantUuid},
    coupons::{Coupon, CouponCode},
    fixtures::Storefront,
    inventory::InventoryLedger,
    orders::{Order, OrderUuid},
    reviews::{Review, ReviewUuid},
};

/// Every record kept by the storefront.
#[derive(Debug, Clone, Default)]
pub struct Tables {
    pub categories: FxHashMap<CategoryUuid, Category>,
    pub tags: FxHashMap<TagUuid, Tag>,
    pub products: FxHashMap<ProductUuid, Product>,
    pub variants: FxHashMap<VariantUuid, Variant>,
    pub ledger: InventoryLedger,
    pub carts: FxHashMap<CartUuid, Cart>,
    pub coupons: FxHashMap<CouponCode, Coupon>,
    pub orders: FxHashMap<OrderUuid, Order>,
    pub reviews: FxHashMap<ReviewUuid, Review>,
    pub addresses: AddressBook,
}

impl From<Storefront> for Tables {
    fn from(storefront: Storefront) -> Self {
        Self {
            categories: storefront
                .categories
                .into_iter()
                .map(|category| (category.uuid, category))
                .collect(),
            tags: storefront.tags.into_iter().map(|tag| (tag.uuid, tag)).collect(),
            products: storefront
                .products
                .into_iter()
                .map(|product| (product.uuid, product))
                .collect(),
            variants: storefront
                .variants
                .into_iter()
                .map(|variant| (variant.uuid, variant))
                .collect(),
            ledger: storefront.ledger,
            carts: FxHashMap::default(),
            coupons: storefront
                .coupons
                .into_iter()
                .map(|coupon| (coupon.code().clone(), coupon))
                .collect(),
            orders: FxHashMap::default(),
            reviews: FxHashMap::default(),
            addresses: AddressBook::new(),
        }
    }
}

/// Shared handle to the store.
#[derive(Debug, Clone, Default)]
pub struct Db {
    tables: Arc<Mutex<Tables>>,
}

impl Db {
    #[must_use]
    pub fn new(tables: Tables) -> Self {
        Self {
            tables: Arc::new(Mutex::new(tables)),
        }
    }

    /// Borrow the committed store for reading.
    ///
    /// Writers wait until the guard is dropped.
    pub async fn read(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().await
    }

    /// Begin a write transaction over a working copy of the store.
    ///
    /// Transactions are serialised; changes become visible on
    /// [`Transaction::commit`] and are discarded when the transaction is
    /// dropped uncommitted.
    pub async fn begin(&self) -> Transaction {
        let guard = Arc::clone(&self.tables).lock_owned().await;
        let working = guard.clone();

        Transaction { guard, working }
    }
}

/// Exclusive working copy of the store.
#[derive(Debug)]
pub struct Transaction {
    guard: OwnedMutexGuard<Tables>,
    working: Tables,
}

impl Transaction {
    /// Publish the working copy.
    pub fn commit(self) {
        let Self { mut guard, working } = self;

        *guard = working;
    }
}

impl Deref for Transaction {
    type Target = Tables;

    fn deref(&self) -> &Self::Target {
        &self.working
    }
}

impl DerefMut for Transaction {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.working
    }
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use wardrobe::carts::{CartOwner, CustomerUuid};

    use super::*;

    fn cart() -> Cart {
        Cart::new(
            CartUuid::new(),
            CartOwner::Customer(CustomerUuid::new()),
            Timestamp::UNIX_EPOCH,
        )
    }

    #[tokio::test]
    async fn committed_changes_are_visible() {
        let db = Db::default();
        let cart = cart();

        let mut tx = db.begin().await;
        tx.carts.insert(cart.uuid(), cart.clone());
        tx.commit();

        let tables = db.read().await;

        assert_eq!(tables.carts.get(&cart.uuid()), Some(&cart));
    }

    #[tokio::test]
    async fn dropped_transactions_are_rolled_back() {
        let db = Db::default();

        {
            let mut tx = db.begin().await;
            tx.carts.insert(CartUuid::new(), cart());
        }

        let tables = db.read().await;

        assert!(tables.carts.is_empty());
    }

    #[tokio::test]
    async fn readers_see_the_store_without_a_working_copy() {
        let db = Db::default();
        let cart = cart();

        let mut tx = db.begin().await;
        tx.carts.insert(cart.uuid(), cart.clone());

        assert!(tx.carts.contains_key(&cart.uuid()));

        tx.commit();

        let first = db.read().await;
        assert_eq!(first.carts.len(), 1);
        drop(first);

        let mut tx = db.begin().await;
        tx.carts.clear();
        drop(tx);

        assert_eq!(db.read().await.carts.get(&cart.uuid()), Some(&cart));
    }
}

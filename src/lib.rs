//! Wardrobe
//!
//! Wardrobe is the rules engine behind an online clothing storefront: catalog, product
//! discounts, online versus physical stock, carts with coupons, order placement, saved
//! addresses and product reviews.

pub mod addresses;
pub mod carts;
pub mod catalog;
pub mod coupons;
pub mod fixtures;
pub mod inventory;
pub mod orders;
pub mod prelude;
pub mod pricing;
pub mod receipt;
pub mod reviews;
pub mod uuids;

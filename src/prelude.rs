//! Wardrobe prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    addresses::{AddressBook, AddressError, SavedAddress, SavedAddressUuid},
    carts::{
        Cart, CartError, CartItem, CartItemUuid, CartOwner, CartTotals, CartUuid, CustomerUuid,
        SessionKey,
    },
    catalog::{
        Category, CatalogError, CategoryUuid, Product, ProductUuid, Tag, TagUuid, Variant,
        VariantUuid, price_range, resolve_slug, slugify,
    },
    coupons::{
        Coupon, CouponCode, CouponDiscount, CouponError, CouponRejection, CouponRejections,
        NewCoupon,
    },
    fixtures::{FixtureError, Storefront, parse_price},
    inventory::{InventoryError, InventoryLedger, Stock, StockLine},
    orders::{
        Address, Checkout, Order, OrderError, OrderItem, OrderStatus, OrderUuid, ShippingMethod,
        ShippingRates, finalize_order,
    },
    pricing::{
        AppliedDiscount, DiscountPercent, PricingError, ProductDiscount, TimedDiscount,
        discounted_price,
    },
    receipt::{Receipt, ReceiptError, ReceiptLine},
    reviews::{NewReview, Rating, Review, ReviewError, ReviewUuid, approved_for},
    uuids::TypedUuid,
};

use jiff::Timestamp;
use testresult::TestResult;
use wardrobe::{fixtures::Storefront, orders::ShippingRates};
use wardrobe_app::context::AppContext;

const STOREFRONT: &str = r#"
currency: USD
categories:
  - name: Dresses
products:
  - name: Linen Dress
    category: dresses
    tags: [Summer]
    fixed_discount: 10
    timed_discount:
      percent: 50
      starts_at: 2026-06-01T00:00:00Z
      ends_at: 2026-06-30T23:59:59Z
    variants:
      - { size: S, color: Sand, price: "45.00 USD", stock: 5, online_stock: 3 }
      - { size: M, color: Sand, price: "45.00 USD", stock: 2 }
  - name: Wool Sweater
    variants:
      - { size: M, color: Grey, price: "80.00 USD", stock: 10 }
  - name: Retired Scarf
    is_active: false
    variants:
      - { size: One, color: Red, price: "10.00 USD", stock: 3 }
coupons:
  - code: WELCOME10
    discount_percentage: 10
    valid_from: 2026-01-01T00:00:00Z
    valid_to: 2026-12-31T23:59:59Z
    min_cart_amount: 5000
"#;

/// A fresh context over a small storefront, evaluated on 2026-03-01.
pub(crate) fn context() -> TestResult<(AppContext, Timestamp)> {
    let now: Timestamp = "2026-03-01T12:00:00Z".parse()?;
    let storefront = Storefront::from_yaml(STOREFRONT, now)?;

    Ok((
        AppContext::from_storefront(storefront, ShippingRates { post_office: 500 }),
        now,
    ))
}

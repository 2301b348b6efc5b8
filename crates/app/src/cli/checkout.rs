use std::{io::Write, str::FromStr};

use clap::{Args, ValueEnum};
use jiff::Timestamp;
use rustc_hash::FxHashMap;
use wardrobe::{
    carts::{CartOwner, CustomerUuid},
    coupons::CouponCode,
    orders::ShippingMethod,
    receipt::Receipt,
};
use wardrobe_app::{
    context::AppContext,
    domain::{carts::models::NewCartItem, orders::models::PlaceOrder},
};

use crate::cli::write_output;

#[derive(Debug, Args)]
pub(crate) struct CheckoutArgs {
    /// Item to buy as PRODUCT:SIZE:COLOR:QTY (repeatable)
    #[arg(long = "item", required = true)]
    items: Vec<ItemSpec>,

    /// Coupon code to apply
    #[arg(long)]
    coupon: Option<String>,

    /// Delivery option
    #[arg(long, value_enum, default_value_t = ShippingOption::FreeDelivery)]
    shipping: ShippingOption,

    /// Print the placed order as JSON instead of a receipt
    #[arg(long)]
    json: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ShippingOption {
    FreeDelivery,
    PostOffice,
}

impl From<ShippingOption> for ShippingMethod {
    fn from(option: ShippingOption) -> Self {
        match option {
            ShippingOption::FreeDelivery => Self::FreeDelivery,
            ShippingOption::PostOffice => Self::PostOffice,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ItemSpec {
    product: String,
    size: String,
    color: String,
    quantity: u32,
}

impl FromStr for ItemSpec {
    type Err = String;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = spec.split(':').map(str::trim).collect();

        let [product, size, color, quantity] = parts.as_slice() else {
            return Err(format!("expected PRODUCT:SIZE:COLOR:QTY, got {spec:?}"));
        };

        let quantity = quantity
            .parse()
            .map_err(|error| format!("invalid quantity {quantity:?}: {error}"))?;

        Ok(Self {
            product: (*product).to_string(),
            size: (*size).to_string(),
            color: (*color).to_string(),
            quantity,
        })
    }
}

pub(crate) async fn run(
    args: CheckoutArgs,
    ctx: &AppContext,
    now: Timestamp,
    out: &mut impl Write,
) -> Result<(), String> {
    let customer = CustomerUuid::new();

    let cart = ctx
        .carts
        .get_or_create_cart(CartOwner::Customer(customer), now)
        .await
        .map_err(|error| format!("failed to create cart: {error}"))?;

    let mut labels = FxHashMap::default();

    for item in args.items {
        let details = ctx
            .catalog
            .get_product(item.product.clone(), now)
            .await
            .map_err(|error| format!("failed to load product {}: {error}", item.product))?;

        let variant = details
            .variants
            .iter()
            .map(|details| &details.variant)
            .find(|variant| variant.matches(&item.size, &item.color))
            .ok_or_else(|| {
                format!(
                    "{} has no {} variant in {}",
                    item.product, item.size, item.color
                )
            })?;

        labels.insert(variant.uuid, variant.label(&details.product));

        ctx.carts
            .add_item(
                cart.uuid(),
                NewCartItem {
                    variant: variant.uuid,
                    quantity: item.quantity,
                },
                now,
            )
            .await
            .map_err(|error| format!("failed to add {} to cart: {error}", item.product))?;
    }

    if let Some(code) = args.coupon {
        let code = CouponCode::parse(&code).map_err(|error| error.to_string())?;

        ctx.carts
            .apply_coupon(cart.uuid(), code.clone(), now)
            .await
            .map_err(|error| format!("failed to apply coupon {code}: {error}"))?;
    }

    let order = ctx
        .orders
        .place_order(
            customer,
            PlaceOrder {
                cart: cart.uuid(),
                shipping_method: args.shipping.into(),
                shipping_address: None,
            },
            now,
        )
        .await
        .map_err(|error| format!("failed to place order: {error}"))?;

    if args.json {
        let json = serde_json::to_string_pretty(&order)
            .map_err(|error| format!("failed to serialise order: {error}"))?;

        return write_output(out, json);
    }

    write_output(out, format!("order {}", order.uuid()))?;

    Receipt::from_order(&order, &labels, ctx.currency)
        .and_then(|receipt| receipt.write_to(&mut *out))
        .map_err(|error| format!("failed to print receipt: {error}"))
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::test_helpers::context;

    use super::*;

    fn args(items: &[&str], coupon: Option<&str>, shipping: ShippingOption, json: bool) -> TestResult<CheckoutArgs> {
        let items = items
            .iter()
            .map(|item| item.parse())
            .collect::<Result<Vec<ItemSpec>, String>>()?;

        Ok(CheckoutArgs {
            items,
            coupon: coupon.map(str::to_string),
            shipping,
            json,
        })
    }

    #[test]
    fn item_specs_parse_all_four_parts() -> TestResult {
        let spec: ItemSpec = "linen-dress: M :Sand:2".parse()?;

        assert_eq!(
            spec,
            ItemSpec {
                product: "linen-dress".to_string(),
                size: "M".to_string(),
                color: "Sand".to_string(),
                quantity: 2,
            }
        );

        assert!("linen-dress:M:Sand".parse::<ItemSpec>().is_err());
        assert!("linen-dress:M:Sand:two".parse::<ItemSpec>().is_err());
        assert!("linen-dress:M:Sand:1:extra".parse::<ItemSpec>().is_err());

        Ok(())
    }

    #[tokio::test]
    async fn checkout_prints_receipt_with_coupon_and_shipping() -> TestResult {
        let (ctx, now) = context()?;
        let mut out = Vec::new();

        run(
            args(
                &["wool-sweater:M:Grey:1"],
                Some("WELCOME10"),
                ShippingOption::PostOffice,
                false,
            )?,
            &ctx,
            now,
            &mut out,
        )
        .await?;

        let output = String::from_utf8(out)?;

        assert!(output.contains("Wool Sweater (Grey, M)"));
        assert!(output.contains("$80.00"));
        assert!(output.contains("Coupon WELCOME10"));
        assert!(output.contains("-$8.00"));
        assert!(output.contains("Shipping (post office)"));
        assert!(output.contains("$77.00"));

        Ok(())
    }

    #[tokio::test]
    async fn checkout_can_emit_json() -> TestResult {
        let (ctx, now) = context()?;
        let mut out = Vec::new();

        run(
            args(&["linen-dress:S:Sand:2"], None, ShippingOption::FreeDelivery, true)?,
            &ctx,
            now,
            &mut out,
        )
        .await?;

        let order: serde_json::Value = serde_json::from_slice(&out)?;

        assert_eq!(order["total"], 8_100);
        assert_eq!(order["status"], "pending");
        assert_eq!(order["shipping_method"], "free_delivery");

        Ok(())
    }

    #[tokio::test]
    async fn checkout_reports_insufficient_stock() -> TestResult {
        let (ctx, now) = context()?;
        let mut out = Vec::new();

        let result = run(
            args(&["linen-dress:S:Sand:4"], None, ShippingOption::FreeDelivery, false)?,
            &ctx,
            now,
            &mut out,
        )
        .await;

        assert!(
            matches!(&result, Err(message) if message.starts_with("failed to add linen-dress")),
            "unexpected result: {result:?}"
        );

        Ok(())
    }
}

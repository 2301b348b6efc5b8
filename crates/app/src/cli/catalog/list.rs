use std::io::Write;

use clap::Args;
use jiff::Timestamp;
use tabled::{
    builder::Builder,
    settings::{Alignment, Style, object::Columns},
};
use wardrobe::pricing::AppliedDiscount;
use wardrobe_app::context::AppContext;

use crate::cli::{money, write_output};

#[derive(Debug, Args)]
pub(crate) struct ListArgs {
    /// Only show products in this category (by slug)
    #[arg(long)]
    category: Option<String>,
}

pub(crate) async fn run(
    args: ListArgs,
    ctx: &AppContext,
    now: Timestamp,
    out: &mut impl Write,
) -> Result<(), String> {
    let products = ctx
        .catalog
        .list_products(args.category, now)
        .await
        .map_err(|error| format!("failed to list products: {error}"))?;

    if products.is_empty() {
        return write_output(out, "no products found");
    }

    let mut builder = Builder::default();

    builder.push_record(["Product", "Slug", "Category", "Price", "Discount", "Availability"]);

    for product in products {
        let price = match product.price_range {
            Some((min, max)) if min == max => money(min, ctx.currency)?,
            Some((min, max)) => format!(
                "{} - {}",
                money(min, ctx.currency)?,
                money(max, ctx.currency)?
            ),
            None => "-".to_string(),
        };

        let availability = if product.in_stock {
            "in stock"
        } else {
            "sold out"
        };

        builder.push_record([
            product.name,
            product.slug,
            product.category.unwrap_or_default(),
            price,
            describe_discount(product.discount),
            availability.to_string(),
        ]);
    }

    let mut table = builder.build();
    table.with(Style::modern_rounded());
    table.modify(Columns::new(3..5), Alignment::right());

    write_output(out, table)
}

pub(crate) fn describe_discount(discount: AppliedDiscount) -> String {
    match discount {
        AppliedDiscount::Fixed(percent) if percent.is_zero() => String::new(),
        AppliedDiscount::Fixed(percent) => format!("{}%", percent.value()),
        AppliedDiscount::Timed(percent) => format!("{}% (sale)", percent.value()),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use testresult::TestResult;
    use wardrobe_app::domain::catalog::{CatalogServiceError, MockCatalogService};

    use crate::test_helpers::context;

    use super::*;

    #[tokio::test]
    async fn lists_active_products_with_prices() -> TestResult {
        let (ctx, now) = context()?;
        let mut out = Vec::new();

        run(ListArgs { category: None }, &ctx, now, &mut out).await?;

        let output = String::from_utf8(out)?;

        assert!(output.contains("Linen Dress"));
        assert!(output.contains("$40.50"));
        assert!(output.contains("10%"));
        assert!(output.contains("Wool Sweater"));
        assert!(!output.contains("Retired Scarf"));

        Ok(())
    }

    #[tokio::test]
    async fn timed_discounts_are_marked_as_sales() -> TestResult {
        let (ctx, _) = context()?;
        let june: Timestamp = "2026-06-15T00:00:00Z".parse()?;
        let mut out = Vec::new();

        run(
            ListArgs {
                category: Some("dresses".to_string()),
            },
            &ctx,
            june,
            &mut out,
        )
        .await?;

        let output = String::from_utf8(out)?;

        assert!(output.contains("$22.50"));
        assert!(output.contains("50% (sale)"));
        assert!(!output.contains("Wool Sweater"));

        Ok(())
    }

    #[tokio::test]
    async fn service_errors_are_reported() -> TestResult {
        let (mut ctx, now) = context()?;
        let mut catalog = MockCatalogService::new();

        catalog
            .expect_list_products()
            .returning(|_, _| Err(CatalogServiceError::CategoryNotFound("hats".to_string())));

        ctx.catalog = Arc::new(catalog);

        let mut out = Vec::new();
        let result = run(
            ListArgs {
                category: Some("hats".to_string()),
            },
            &ctx,
            now,
            &mut out,
        )
        .await;

        assert!(
            matches!(&result, Err(message) if message.starts_with("failed to list products")),
            "unexpected result: {result:?}"
        );

        Ok(())
    }
}

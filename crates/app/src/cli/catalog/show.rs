use std::io::Write;

use clap::Args;
use jiff::Timestamp;
use tabled::{
    builder::Builder,
    settings::{Alignment, Style, object::Columns},
};
use wardrobe_app::context::AppContext;

use crate::cli::{catalog::list::describe_discount, money, write_output};

#[derive(Debug, Args)]
pub(crate) struct ShowArgs {
    /// Product slug
    slug: String,
}

pub(crate) async fn run(
    args: ShowArgs,
    ctx: &AppContext,
    now: Timestamp,
    out: &mut impl Write,
) -> Result<(), String> {
    let details = ctx
        .catalog
        .get_product(args.slug.clone(), now)
        .await
        .map_err(|error| format!("failed to load product {}: {error}", args.slug))?;

    let product = &details.product;

    write_output(out, format!("{} ({})", product.name, product.slug))?;

    if let Some(category) = &details.category {
        write_output(out, format!("category: {}", category.name))?;
    }

    if !details.tags.is_empty() {
        let tags: Vec<&str> = details.tags.iter().map(|tag| tag.name.as_str()).collect();
        write_output(out, format!("tags: {}", tags.join(", ")))?;
    }

    let discount = describe_discount(details.discount);

    if !discount.is_empty() {
        write_output(out, format!("discount: {discount}"))?;
    }

    if !product.description.is_empty() {
        write_output(out, &product.description)?;
    }

    let mut builder = Builder::default();

    builder.push_record(["Size", "Color", "Price", "Online", "Total"]);

    for variant in &details.variants {
        builder.push_record([
            variant.variant.size.clone(),
            variant.variant.color.clone(),
            money(variant.unit_price, ctx.currency)?,
            variant.stock.online().to_string(),
            variant.stock.total().to_string(),
        ]);
    }

    let mut table = builder.build();
    table.with(Style::modern_rounded());
    table.modify(Columns::new(2..5), Alignment::right());

    write_output(out, table)?;

    for review in &details.reviews {
        let mut line = format!("{} {}", review.rating, review.user_name);

        if !review.comment.is_empty() {
            line.push_str(": ");
            line.push_str(&review.comment);
        }

        write_output(out, line)?;
    }

    Ok(())
}

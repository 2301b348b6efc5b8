use std::io::{self, Write};

use clap::{Parser, Subcommand};
use jiff::Timestamp;
use rusty_money::{Money, iso::Currency};
use wardrobe_app::{config::AppConfig, context::AppContext};

mod catalog;
mod checkout;

#[derive(Debug, Parser)]
#[command(name = "wardrobe", about = "Wardrobe storefront CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(flatten)]
    pub(crate) config: AppConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Browse products
    Catalog(catalog::CatalogCommand),

    /// Buy items in one go and print the receipt
    Checkout(checkout::CheckoutArgs),
}

impl Cli {
    /// Parse arguments after loading `.env`, if present.
    pub(crate) fn load() -> Result<Self, clap::Error> {
        _ = dotenvy::dotenv();

        Self::try_parse()
    }

    pub(crate) async fn run(self, ctx: &AppContext, now: Timestamp) -> Result<(), String> {
        let mut out = io::stdout().lock();

        match self.command {
            Commands::Catalog(command) => catalog::run(command, ctx, now, &mut out).await,
            Commands::Checkout(args) => checkout::run(args, ctx, now, &mut out).await,
        }
    }
}

pub(crate) fn money(amount: u64, currency: &'static Currency) -> Result<String, String> {
    let minor = i64::try_from(amount).map_err(|_err| format!("amount {amount} is out of range"))?;

    Ok(Money::from_minor(minor, currency).to_string())
}

pub(crate) fn write_output(out: &mut impl Write, text: impl std::fmt::Display) -> Result<(), String> {
    writeln!(out, "{text}").map_err(|error| format!("failed to write output: {error}"))
}

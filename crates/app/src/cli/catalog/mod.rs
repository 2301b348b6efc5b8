use std::io::Write;

use clap::{Args, Subcommand};
use jiff::Timestamp;
use wardrobe_app::context::AppContext;

mod list;
mod show;

#[derive(Debug, Args)]
pub(crate) struct CatalogCommand {
    #[command(subcommand)]
    command: CatalogSubcommand,
}

#[derive(Debug, Subcommand)]
enum CatalogSubcommand {
    /// List active products, newest first
    List(list::ListArgs),

    /// Show a product with its variants
    Show(show::ShowArgs),
}

pub(crate) async fn run(
    command: CatalogCommand,
    ctx: &AppContext,
    now: Timestamp,
    out: &mut impl Write,
) -> Result<(), String> {
    match command.command {
        CatalogSubcommand::List(args) => list::run(args, ctx, now, out).await,
        CatalogSubcommand::Show(args) => show::run(args, ctx, now, out).await,
    }
}

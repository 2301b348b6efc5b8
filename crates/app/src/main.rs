//! Wardrobe storefront CLI

use std::process;

use tracing::error;
use wardrobe_app::{context::AppContext, observability};

use crate::cli::Cli;

mod cli;
#[cfg(test)]
mod test_helpers;

#[tokio::main]
pub async fn main() {
    let cli = Cli::load().unwrap_or_else(|error| error.exit());

    if let Err(error) = observability::init_subscriber(&cli.config.logging) {
        eprintln!("{error}");
        process::exit(1);
    }

    let storefront = &cli.config.storefront;
    let now = storefront.point_in_time();

    let ctx = match AppContext::from_fixture(&storefront.fixture, storefront.shipping_rates(), now)
    {
        Ok(ctx) => ctx,
        Err(err) => {
            error!(fixture = %storefront.fixture.display(), error = %err, "failed to start");
            eprintln!("{err}");
            process::exit(1);
        }
    };

    if let Err(error) = cli.run(&ctx, now).await {
        eprintln!("{error}");
        process::exit(1);
    }
}

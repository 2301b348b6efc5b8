//! Storefront Config

use std::path::PathBuf;

use clap::Args;
use jiff::Timestamp;
use wardrobe::orders::ShippingRates;

/// Storefront data and pricing settings.
#[derive(Debug, Args)]
pub struct StorefrontConfig {
    /// YAML fixture with catalog, stock and coupons
    #[arg(
        long,
        global = true,
        env = "WARDROBE_FIXTURE",
        default_value = "fixtures/storefront.yml"
    )]
    pub fixture: PathBuf,

    /// Post office shipping rate in minor units
    #[arg(long, global = true, env = "SHIPPING_POST_OFFICE_RATE", default_value_t = 500)]
    pub post_office_rate: u64,

    /// Evaluate prices and coupons at this instant instead of now (RFC 3339)
    #[arg(long = "at", global = true, env = "WARDROBE_POINT_IN_TIME")]
    pub point_in_time: Option<Timestamp>,
}

impl StorefrontConfig {
    /// Shipping rates derived from the configuration.
    pub fn shipping_rates(&self) -> ShippingRates {
        ShippingRates {
            post_office: self.post_office_rate,
        }
    }

    /// The configured point in time, defaulting to now.
    pub fn point_in_time(&self) -> Timestamp {
        self.point_in_time.unwrap_or_else(Timestamp::now)
    }
}

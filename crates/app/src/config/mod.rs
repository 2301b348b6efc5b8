//! Application configuration

use clap::Args;

use crate::config::{observability::LoggingConfig, storefront::StorefrontConfig};

pub mod observability;
pub mod storefront;

pub use observability::LogFormat;

/// Settings shared by every command.
#[derive(Debug, Args)]
pub struct AppConfig {
    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Storefront data and pricing settings.
    #[command(flatten)]
    pub storefront: StorefrontConfig,
}

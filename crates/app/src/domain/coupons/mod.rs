//! Coupons

pub mod errors;
pub mod service;

pub use errors::CouponsServiceError;
pub use service::*;

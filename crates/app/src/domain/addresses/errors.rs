//! Addresses service errors.

use thiserror::Error;
use wardrobe::addresses::AddressError;

#[derive(Debug, Error)]
pub enum AddressesServiceError {
    #[error(transparent)]
    Address(#[from] AddressError),
}

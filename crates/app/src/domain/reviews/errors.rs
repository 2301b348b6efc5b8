//! Reviews service errors.

use thiserror::Error;
use wardrobe::reviews::{ReviewError, ReviewUuid};

#[derive(Debug, Error)]
pub enum ReviewsServiceError {
    #[error("product not found")]
    ProductNotFound,

    #[error("review {0} not found")]
    NotFound(ReviewUuid),

    #[error(transparent)]
    Review(#[from] ReviewError),
}

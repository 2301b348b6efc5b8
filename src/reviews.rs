//! Reviews
//!
//! Customer and guest reviews of a product. Reviews are hidden until a
//! moderator approves them.

use std::{cmp::Reverse, fmt};

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{carts::CustomerUuid, catalog::ProductUuid, uuids::TypedUuid};

/// Review UUID
pub type ReviewUuid = TypedUuid<Review>;

/// Review validation errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReviewError {
    /// Ratings run from one to five stars.
    #[error("rating must be between 1 and 5, got {0}")]
    InvalidRating(u8),

    /// Guests must give a display name.
    #[error("guest reviews require a name")]
    MissingName,
}

/// Star rating between [`Rating::MIN`] and [`Rating::MAX`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
    /// Lowest rating
    pub const MIN: u8 = 1;

    /// Highest rating
    pub const MAX: u8 = 5;

    /// Validate a star rating.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError::InvalidRating`] outside `1..=5`.
    pub fn new(stars: u8) -> Result<Self, ReviewError> {
        if (Self::MIN..=Self::MAX).contains(&stars) {
            Ok(Self(stars))
        } else {
            Err(ReviewError::InvalidRating(stars))
        }
    }

    /// Number of stars.
    pub fn stars(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Rating {
    type Error = ReviewError;

    fn try_from(stars: u8) -> Result<Self, Self::Error> {
        Self::new(stars)
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.0, Self::MAX)
    }
}

/// A review as submitted, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReview {
    /// Product reviewed
    pub product: ProductUuid,
    /// Author, when signed in
    pub customer: Option<CustomerUuid>,
    /// Display name; required for guests
    pub user_name: String,
    /// Stars given
    pub rating: u8,
    /// Free text, may be empty
    pub comment: String,
}

/// A stored review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Review {
    /// Review id
    pub uuid: ReviewUuid,
    /// Product reviewed
    pub product: ProductUuid,
    /// Author, when signed in
    pub customer: Option<CustomerUuid>,
    /// Name shown with the review
    pub user_name: String,
    /// Stars given
    pub rating: Rating,
    /// Free text, may be empty
    pub comment: String,
    is_approved: bool,
    /// Submission time
    pub created_at: Timestamp,
}

impl Review {
    /// Validate a submission into an unapproved review.
    ///
    /// A signed-in author without a display name is shown by customer id.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError::InvalidRating`] or, for guests without a name,
    /// [`ReviewError::MissingName`].
    pub fn submit(review: NewReview, created_at: Timestamp) -> Result<Self, ReviewError> {
        let NewReview {
            product,
            customer,
            user_name,
            rating,
            comment,
        } = review;

        let rating = Rating::new(rating)?;
        let user_name = user_name.trim();

        let user_name = match (customer, user_name.is_empty()) {
            (None, true) => return Err(ReviewError::MissingName),
            (Some(customer), true) => customer.to_string(),
            (_, false) => user_name.to_string(),
        };

        Ok(Self {
            uuid: ReviewUuid::new(),
            product,
            customer,
            user_name,
            rating,
            comment,
            is_approved: false,
            created_at,
        })
    }

    /// Whether the review is visible to shoppers.
    pub fn is_approved(&self) -> bool {
        self.is_approved
    }

    /// Publish the review.
    pub fn approve(&mut self) {
        self.is_approved = true;
    }
}

/// Approved reviews of `product`, newest first.
pub fn approved_for<'a>(
    reviews: impl IntoIterator<Item = &'a Review>,
    product: ProductUuid,
) -> Vec<&'a Review> {
    let mut approved: Vec<&Review> = reviews
        .into_iter()
        .filter(|review| review.product == product && review.is_approved)
        .collect();

    approved.sort_by_key(|review| (Reverse(review.created_at), Reverse(review.uuid)));

    approved
}

#[cfg(test)]
mod tests {
    use jiff::ToSpan;
    use testresult::TestResult;

    use super::*;

    fn new_review(
        product: ProductUuid,
        customer: Option<CustomerUuid>,
        name: &str,
        rating: u8,
    ) -> NewReview {
        NewReview {
            product,
            customer,
            user_name: name.to_string(),
            rating,
            comment: "Fits well".to_string(),
        }
    }

    #[test]
    fn ratings_outside_one_to_five_are_rejected() {
        assert_eq!(Rating::new(0), Err(ReviewError::InvalidRating(0)));
        assert_eq!(Rating::new(6), Err(ReviewError::InvalidRating(6)));
        assert_eq!(Rating::new(1).map(Rating::stars), Ok(1));
        assert_eq!(Rating::new(5).map(Rating::stars), Ok(5));
    }

    #[test]
    fn guests_must_give_a_name() -> TestResult {
        let now = Timestamp::from_second(1_750_000_000)?;
        let product = ProductUuid::new();

        let result = Review::submit(new_review(product, None, "  ", 4), now);

        assert_eq!(result, Err(ReviewError::MissingName));

        let guest = Review::submit(new_review(product, None, " Sara ", 4), now)?;

        assert_eq!(guest.user_name, "Sara");
        assert!(!guest.is_approved());

        Ok(())
    }

    #[test]
    fn customers_without_a_name_are_shown_by_id() -> TestResult {
        let now = Timestamp::from_second(1_750_000_000)?;
        let customer = CustomerUuid::new();

        let review = Review::submit(new_review(ProductUuid::new(), Some(customer), "", 5), now)?;

        assert_eq!(review.user_name, customer.to_string());
        assert_eq!(review.customer, Some(customer));

        Ok(())
    }

    #[test]
    fn approved_for_lists_newest_first() -> TestResult {
        let now = Timestamp::from_second(1_750_000_000)?;
        let product = ProductUuid::new();

        let mut older = Review::submit(new_review(product, None, "Ana", 3), now)?;
        let mut newer = Review::submit(new_review(product, None, "Bea", 5), now + 2.hours())?;
        let pending = Review::submit(new_review(product, None, "Cy", 1), now + 4.hours())?;
        let mut elsewhere = Review::submit(new_review(ProductUuid::new(), None, "Di", 2), now)?;

        older.approve();
        newer.approve();
        elsewhere.approve();

        let reviews = [older, pending, elsewhere, newer];
        let names: Vec<&str> = approved_for(&reviews, product)
            .into_iter()
            .map(|review| review.user_name.as_str())
            .collect();

        assert_eq!(names, ["Bea", "Ana"]);

        Ok(())
    }
}

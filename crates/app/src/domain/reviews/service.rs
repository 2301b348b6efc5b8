//! Reviews service.

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use tracing::{debug, info, warn};
use wardrobe::reviews::{NewReview, Review, ReviewUuid, approved_for};

use crate::{
    database::Db,
    domain::{catalog::repository::CatalogRepository, reviews::errors::ReviewsServiceError},
};

#[derive(Debug, Clone)]
pub struct MemoryReviewsService {
    db: Db,
    catalog: CatalogRepository,
}

impl MemoryReviewsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            catalog: CatalogRepository::new(),
        }
    }
}

#[async_trait]
impl ReviewsService for MemoryReviewsService {
    async fn submit_review(
        &self,
        review: NewReview,
        now: Timestamp,
    ) -> Result<Review, ReviewsServiceError> {
        let mut tx = self.db.begin().await;

        if !tx
            .products
            .get(&review.product)
            .is_some_and(|product| product.is_active)
        {
            warn!(product = %review.product, "review for unknown product");
            return Err(ReviewsServiceError::ProductNotFound);
        }

        let review = Review::submit(review, now)?;

        tx.reviews.insert(review.uuid, review.clone());
        tx.commit();

        info!(
            uuid = %review.uuid,
            product = %review.product,
            rating = %review.rating,
            "submitted review"
        );

        Ok(review)
    }

    async fn approve_review(&self, review: ReviewUuid) -> Result<Review, ReviewsServiceError> {
        let mut tx = self.db.begin().await;

        let Some(stored) = tx.reviews.get_mut(&review) else {
            return Err(ReviewsServiceError::NotFound(review));
        };

        stored.approve();
        let approved = stored.clone();

        tx.commit();

        info!(uuid = %review, "approved review");

        Ok(approved)
    }

    async fn list_reviews(&self, product_slug: String) -> Result<Vec<Review>, ReviewsServiceError> {
        let tables = self.db.read().await;

        let product = self
            .catalog
            .product_by_slug(&tables, &product_slug)
            .filter(|product| product.is_active)
            .ok_or(ReviewsServiceError::ProductNotFound)?;

        let reviews: Vec<Review> = approved_for(tables.reviews.values(), product.uuid)
            .into_iter()
            .cloned()
            .collect();

        debug!(slug = %product_slug, reviews = reviews.len(), "listed reviews");

        Ok(reviews)
    }
}

#[automock]
#[async_trait]
pub trait ReviewsService: Send + Sync {
    /// Store a review of an active product. New reviews await approval.
    async fn submit_review(
        &self,
        review: NewReview,
        now: Timestamp,
    ) -> Result<Review, ReviewsServiceError>;

    /// Publish a review.
    async fn approve_review(&self, review: ReviewUuid) -> Result<Review, ReviewsServiceError>;

    /// Approved reviews of a product, newest first.
    async fn list_reviews(&self, product_slug: String) -> Result<Vec<Review>, ReviewsServiceError>;
}

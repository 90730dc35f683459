//! In-memory ReviewRepository for testing and development.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, LawyerId};
use crate::domain::lawyer::{approved_stats, LawyerReview};
use crate::ports::{ReviewRepository, ReviewStats};

/// In-memory list of reviews.
#[derive(Debug, Default)]
pub struct InMemoryReviewRepository {
    reviews: Arc<RwLock<Vec<LawyerReview>>>,
}

impl InMemoryReviewRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReviewRepository for InMemoryReviewRepository {
    async fn create(&self, review: &LawyerReview) -> Result<(), DomainError> {
        self.reviews.write().await.push(review.clone());
        Ok(())
    }

    async fn approved_stats(
        &self,
        lawyer_id: LawyerId,
    ) -> Result<Option<ReviewStats>, DomainError> {
        let reviews = self.reviews.read().await;
        let for_lawyer: Vec<LawyerReview> = reviews
            .iter()
            .filter(|r| r.lawyer_id() == lawyer_id)
            .cloned()
            .collect();
        Ok(
            approved_stats(&for_lawyer).map(|(average_rating, approved_count)| ReviewStats {
                average_rating,
                approved_count,
            }),
        )
    }

    async fn list_for_lawyer(
        &self,
        lawyer_id: LawyerId,
    ) -> Result<Vec<LawyerReview>, DomainError> {
        let reviews = self.reviews.read().await;
        let mut for_lawyer: Vec<LawyerReview> = reviews
            .iter()
            .filter(|r| r.lawyer_id() == lawyer_id)
            .cloned()
            .collect();
        for_lawyer.sort_by_key(|r| std::cmp::Reverse(r.created_at()));
        Ok(for_lawyer)
    }
}

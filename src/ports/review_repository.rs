//! Review repository port.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, LawyerId};
use crate::domain::lawyer::LawyerReview;

/// Aggregates over the approved reviews of one lawyer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReviewStats {
    /// Average rating over approved reviews.
    pub average_rating: f64,
    /// Number of approved reviews.
    pub approved_count: i32,
}

/// Repository port for [`LawyerReview`] records.
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    /// Persists a new review.
    async fn create(&self, review: &LawyerReview) -> Result<(), DomainError>;

    /// Aggregates over the approved reviews of a lawyer.
    ///
    /// Returns `None` when the lawyer has no approved reviews.
    async fn approved_stats(&self, lawyer_id: LawyerId)
        -> Result<Option<ReviewStats>, DomainError>;

    /// All reviews for a lawyer, newest first.
    async fn list_for_lawyer(&self, lawyer_id: LawyerId)
        -> Result<Vec<LawyerReview>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn review_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn ReviewRepository) {}
    }
}

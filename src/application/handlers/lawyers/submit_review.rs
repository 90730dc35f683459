//! SubmitReview command handler.
//!
//! Persists a review and, for approved reviews, recalculates the lawyer's
//! aggregates right here - an explicit post-commit hook instead of a
//! hidden save signal.

use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::domain::foundation::{DomainError, ErrorCode, LawyerId};
use crate::domain::lawyer::LawyerReview;
use crate::ports::{LawyerRepository, ReviewRepository};

/// Command to submit a review for a lawyer.
#[derive(Debug, Clone)]
pub struct SubmitReviewCommand {
    pub lawyer_id: LawyerId,
    pub client_name: String,
    pub rating: u8,
    pub comment: String,
}

/// Errors that can occur when submitting a review.
#[derive(Debug, Clone, Error)]
pub enum SubmitReviewError {
    /// No lawyer with this id.
    #[error("lawyer {0} not found")]
    LawyerNotFound(LawyerId),

    /// Review fields failed validation.
    #[error("{0}")]
    Validation(String),

    /// Repository error.
    #[error("repository error: {0}")]
    Repository(String),
}

impl From<DomainError> for SubmitReviewError {
    fn from(err: DomainError) -> Self {
        match err.code() {
            ErrorCode::ValidationFailed | ErrorCode::EmptyField | ErrorCode::OutOfRange => {
                SubmitReviewError::Validation(err.to_string())
            }
            _ => SubmitReviewError::Repository(err.to_string()),
        }
    }
}

/// Handler for SubmitReview commands.
pub struct SubmitReviewHandler {
    lawyers: Arc<dyn LawyerRepository>,
    reviews: Arc<dyn ReviewRepository>,
}

impl SubmitReviewHandler {
    /// Creates a new handler.
    pub fn new(lawyers: Arc<dyn LawyerRepository>, reviews: Arc<dyn ReviewRepository>) -> Self {
        Self { lawyers, reviews }
    }

    /// Records a review and refreshes the lawyer's aggregates.
    pub async fn handle(&self, cmd: SubmitReviewCommand) -> Result<(), SubmitReviewError> {
        let mut lawyer = self
            .lawyers
            .find_by_id(cmd.lawyer_id)
            .await?
            .ok_or(SubmitReviewError::LawyerNotFound(cmd.lawyer_id))?;

        let review =
            LawyerReview::new(cmd.lawyer_id, &cmd.client_name, cmd.rating, &cmd.comment)?;
        self.reviews.create(&review).await?;

        if review.is_approved() {
            if let Some(stats) = self.reviews.approved_stats(cmd.lawyer_id).await? {
                lawyer.apply_review_stats(stats.average_rating, stats.approved_count);
                self.lawyers.update(&lawyer).await?;
            }
        }

        info!(lawyer_id = %cmd.lawyer_id, rating = cmd.rating, "review recorded");
        Ok(())
    }
}

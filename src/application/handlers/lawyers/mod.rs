//! Lawyer listing and review handlers.

mod recommend_lawyers;
mod submit_review;

pub use recommend_lawyers::{
    LawyerRecommendations, PersonaRecommendation, RecommendError, RecommendLawyersHandler,
};
pub use submit_review::{SubmitReviewCommand, SubmitReviewError, SubmitReviewHandler};

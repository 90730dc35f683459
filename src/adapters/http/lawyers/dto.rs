//! HTTP DTOs for lawyer endpoints.

use serde::{Deserialize, Serialize};

use crate::application::handlers::lawyers::PersonaRecommendation;
use crate::domain::lawyer::Lawyer;

/// View of one persona in the listing.
#[derive(Debug, Clone, Serialize)]
pub struct PersonaView {
    pub code: &'static str,
    pub name: String,
    pub specialization: &'static str,
    pub personality: String,
    pub response_time: String,
    pub recommended: bool,
    /// Rating from the persisted record, when the persona has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cases_completed: Option<i32>,
}

impl PersonaView {
    /// Builds the view from a recommendation plus the optional record.
    pub fn new(recommendation: &PersonaRecommendation, record: Option<&Lawyer>) -> Self {
        let persona = &recommendation.persona;
        Self {
            code: persona.code.as_code(),
            name: persona.name.clone(),
            specialization: persona.code.display_name(),
            personality: persona.personality.clone(),
            response_time: persona.response_time.clone(),
            recommended: recommendation.recommended,
            rating: record.map(|l| l.rating()),
            cases_completed: record.map(|l| l.cases_completed()),
        }
    }
}

/// Listing response with one persona flagged recommended.
#[derive(Debug, Clone, Serialize)]
pub struct RecommendationResponse {
    pub success: bool,
    pub recommended: &'static str,
    pub lawyers: Vec<PersonaView>,
}

/// Body of a review submission.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitReviewBody {
    #[serde(default)]
    pub client_name: String,
    pub rating: u8,
    #[serde(default)]
    pub comment: String,
}

/// Acknowledgement of a recorded review.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewAck {
    pub success: bool,
    pub message: String,
}

impl ReviewAck {
    /// Builds the acknowledgement.
    pub fn new() -> Self {
        Self {
            success: true,
            message: "Отзыв сохранён".to_string(),
        }
    }
}

impl Default for ReviewAck {
    fn default() -> Self {
        Self::new()
    }
}

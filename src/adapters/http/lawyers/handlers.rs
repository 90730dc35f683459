//! HTTP handlers for lawyer endpoints.

use std::sync::Arc;

use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::application::handlers::lawyers::{
    RecommendError, RecommendLawyersHandler, SubmitReviewCommand, SubmitReviewError,
    SubmitReviewHandler,
};
use crate::domain::foundation::{LawyerId, RequestId};
use crate::domain::lawyer::PersonaDirectory;
use crate::ports::LawyerRepository;

use super::super::request::dto::{ErrorBody, NotFoundBody};
use super::dto::{PersonaView, RecommendationResponse, ReviewAck, SubmitReviewBody};

/// Shared application state for lawyer handlers.
#[derive(Clone)]
pub struct LawyersAppState {
    pub recommend: Arc<RecommendLawyersHandler>,
    pub review: Arc<SubmitReviewHandler>,
    pub lawyers: Arc<dyn LawyerRepository>,
    pub directory: Arc<PersonaDirectory>,
}

/// GET /api/requests/:request_id/lawyers - Recommend and list personas.
pub async fn find_lawyers(
    State(state): State<LawyersAppState>,
    Path(request_id): Path<String>,
) -> Response {
    let Ok(request_id) = request_id.parse::<RequestId>() else {
        return not_found("Запрос не найден");
    };

    let recommendations = match state.recommend.handle(request_id).await {
        Ok(recommendations) => recommendations,
        Err(RecommendError::RequestNotFound(_)) => return not_found("Запрос не найден"),
        Err(err) => return internal_error(err.to_string()),
    };

    let mut lawyers = Vec::with_capacity(recommendations.personas.len());
    for recommendation in &recommendations.personas {
        // Enrich with the persisted record when the persona has been used.
        let record = state
            .lawyers
            .find_by_name(&recommendation.persona.name)
            .await
            .ok()
            .flatten();
        lawyers.push(PersonaView::new(recommendation, record.as_ref()));
    }

    (
        StatusCode::OK,
        Json(RecommendationResponse {
            success: true,
            recommended: recommendations.recommended.as_code(),
            lawyers,
        }),
    )
        .into_response()
}

/// GET /api/lawyers - List all personas without a recommendation flag.
pub async fn all_lawyers(State(state): State<LawyersAppState>) -> Response {
    let mut lawyers = Vec::new();
    for persona in state.directory.all() {
        let record = state
            .lawyers
            .find_by_name(&persona.name)
            .await
            .ok()
            .flatten();
        lawyers.push(PersonaView::new(
            &crate::application::handlers::lawyers::PersonaRecommendation {
                persona: persona.clone(),
                recommended: false,
            },
            record.as_ref(),
        ));
    }

    (
        StatusCode::OK,
        Json(serde_json::json!({ "success": true, "lawyers": lawyers })),
    )
        .into_response()
}

/// POST /api/lawyers/:lawyer_id/reviews - Record a review.
pub async fn submit_review(
    State(state): State<LawyersAppState>,
    Path(lawyer_id): Path<String>,
    Json(body): Json<SubmitReviewBody>,
) -> Response {
    let Ok(lawyer_id) = lawyer_id.parse::<LawyerId>() else {
        return not_found("Юрист не найден");
    };

    match state
        .review
        .handle(SubmitReviewCommand {
            lawyer_id,
            client_name: body.client_name,
            rating: body.rating,
            comment: body.comment,
        })
        .await
    {
        Ok(()) => (StatusCode::OK, Json(ReviewAck::new())).into_response(),
        Err(SubmitReviewError::LawyerNotFound(_)) => not_found("Юрист не найден"),
        Err(SubmitReviewError::Validation(message)) => {
            (StatusCode::BAD_REQUEST, Json(ErrorBody::new(message))).into_response()
        }
        Err(err) => internal_error(err.to_string()),
    }
}

fn not_found(message: &str) -> Response {
    (StatusCode::NOT_FOUND, Json(NotFoundBody::new(message))).into_response()
}

fn internal_error(message: impl Into<String>) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody::new(message)),
    )
        .into_response()
}

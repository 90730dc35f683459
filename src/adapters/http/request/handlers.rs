//! HTTP handlers for request endpoints.

use std::sync::Arc;

use axum::extract::{ConnectInfo, Json, Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use std::net::SocketAddr;

use crate::application::handlers::request::{
    GetRequestStatusHandler, GetStatusError, SubmitRequestCommand, SubmitRequestError,
    SubmitRequestHandler,
};
use crate::domain::foundation::RequestId;
use crate::domain::request::RequestOrigin;

use super::dto::{ErrorBody, NotFoundBody, RequestStatusView, SubmitRequestBody, SubmitRequestResponse};

/// Shared application state for request handlers.
#[derive(Clone)]
pub struct RequestAppState {
    pub submit: Arc<SubmitRequestHandler>,
    pub status: Arc<GetRequestStatusHandler>,
}

/// POST /api/requests - Submit a legal problem.
///
/// Returns immediately with the created request id; analysis runs in the
/// background and is observed via the status endpoint.
pub async fn submit_request(
    State(state): State<RequestAppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(body): Json<SubmitRequestBody>,
) -> Response {
    let origin = RequestOrigin {
        ip_address: Some(addr.ip().to_string()),
        user_agent: headers
            .get(http::header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    };

    let result = state
        .submit
        .handle(SubmitRequestCommand {
            problem_text: body.problem_text,
            origin,
        })
        .await;

    match result {
        Ok(result) => (
            StatusCode::OK,
            Json(SubmitRequestResponse::created(result.request_id)),
        )
            .into_response(),
        Err(SubmitRequestError::TooShort) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorBody::new(
                "Опишите проблему подробнее (минимум 20 символов)",
            )),
        )
            .into_response(),
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorBody::new(format!("Произошла ошибка: {}", err))),
        )
            .into_response(),
    }
}

/// GET /api/requests/:request_id/status - Poll analysis status.
pub async fn request_status(
    State(state): State<RequestAppState>,
    Path(request_id): Path<String>,
) -> Response {
    let Ok(request_id) = request_id.parse::<RequestId>() else {
        return not_found();
    };

    match state.status.handle(request_id).await {
        Ok(snapshot) => (StatusCode::OK, Json(RequestStatusView::from(snapshot))).into_response(),
        Err(GetStatusError::NotFound(_)) => not_found(),
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorBody::new(err.to_string())),
        )
            .into_response(),
    }
}

fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(NotFoundBody::new("Запрос не найден")),
    )
        .into_response()
}

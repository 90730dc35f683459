//! Axum routes for request endpoints.

use axum::routing::{get, post};
use axum::Router;

use super::handlers::{request_status, submit_request, RequestAppState};

/// Creates routes for request endpoints.
///
/// - POST /requests - submit a legal problem
/// - GET /requests/:request_id/status - poll analysis status
pub fn request_routes() -> Router<RequestAppState> {
    Router::new()
        .route("/requests", post(submit_request))
        .route("/requests/:request_id/status", get(request_status))
}

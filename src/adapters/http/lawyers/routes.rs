//! Axum routes for lawyer endpoints.

use axum::routing::{get, post};
use axum::Router;

use super::handlers::{all_lawyers, find_lawyers, submit_review, LawyersAppState};

/// Creates routes for lawyer endpoints.
///
/// - GET /lawyers - list all personas
/// - GET /requests/:request_id/lawyers - recommend and list personas
/// - POST /lawyers/:lawyer_id/reviews - record a review
pub fn lawyer_routes() -> Router<LawyersAppState> {
    Router::new()
        .route("/lawyers", get(all_lawyers))
        .route("/requests/:request_id/lawyers", get(find_lawyers))
        .route("/lawyers/:lawyer_id/reviews", post(submit_review))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lawyer_routes_creates_valid_router() {
        let _routes = lawyer_routes();
    }
}

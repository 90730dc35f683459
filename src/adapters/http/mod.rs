//! HTTP adapters: axum routers per area.

pub mod chat;
pub mod lawyers;
pub mod request;

use axum::Router;

pub use chat::ChatAppState;
pub use lawyers::LawyersAppState;
pub use request::RequestAppState;

/// Combined router with every area nested under /api.
pub fn api_router(
    request_state: RequestAppState,
    chat_state: ChatAppState,
    lawyers_state: LawyersAppState,
) -> Router {
    let api = Router::new()
        .merge(request::request_routes().with_state(request_state))
        .merge(chat::chat_routes().with_state(chat_state))
        .merge(lawyers::lawyer_routes().with_state(lawyers_state));

    Router::new().nest("/api", api)
}

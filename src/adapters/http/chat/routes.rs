//! Axum routes for chat endpoints.

use axum::routing::{get, post};
use axum::Router;

use super::handlers::{
    close_chat, debug_chat_context, get_chat_messages, reset_chat_context, send_message,
    start_chat, ChatAppState,
};

/// Creates routes for chat endpoints.
///
/// - POST /requests/:request_id/chats/:persona_code - create or resume a chat
/// - POST /chats/:chat_id/messages - send a client message
/// - GET /chats/:chat_id/messages - list the transcript
/// - POST /chats/:chat_id/close - close the chat
/// - POST /chats/:chat_id/reset-context - drop the conversation context
/// - GET /chats/:chat_id/debug-context - diagnostic snapshot
pub fn chat_routes() -> Router<ChatAppState> {
    Router::new()
        .route("/requests/:request_id/chats/:persona_code", post(start_chat))
        .route(
            "/chats/:chat_id/messages",
            post(send_message).get(get_chat_messages),
        )
        .route("/chats/:chat_id/close", post(close_chat))
        .route("/chats/:chat_id/reset-context", post(reset_chat_context))
        .route("/chats/:chat_id/debug-context", get(debug_chat_context))
}

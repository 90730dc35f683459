//! HTTP handlers for chat endpoints.
//!
//! Errors never escape as panics: every failure becomes a
//! `{success: false, error}` payload (or a 404 for missing resources).

use std::sync::Arc;

use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::application::handlers::chat::{
    CloseChatError, CloseChatHandler, DebugContextError, DebugContextHandler, ListMessagesError,
    ListMessagesHandler, ResetContextError, ResetContextHandler, SendMessageCommand,
    SendMessageError, SendMessageHandler, StartChatCommand, StartChatError, StartChatHandler,
};
use crate::domain::foundation::{ChatId, RequestId};

use super::super::request::dto::{ErrorBody, NotFoundBody};
use super::dto::{
    AckResponse, DebugInfoResponse, LawyerReplyResponse, MessageView, MessagesResponse,
    SendMessageBody, StartChatResponse,
};

/// Shared application state for chat handlers.
#[derive(Clone)]
pub struct ChatAppState {
    pub start: Arc<StartChatHandler>,
    pub send: Arc<SendMessageHandler>,
    pub close: Arc<CloseChatHandler>,
    pub reset: Arc<ResetContextHandler>,
    pub debug: Arc<DebugContextHandler>,
    pub list: Arc<ListMessagesHandler>,
}

/// POST /api/requests/:request_id/chats/:persona_code - Create or resume a chat.
pub async fn start_chat(
    State(state): State<ChatAppState>,
    Path((request_id, persona_code)): Path<(String, String)>,
) -> Response {
    let Ok(request_id) = request_id.parse::<RequestId>() else {
        return not_found("Запрос не найден");
    };

    match state
        .start
        .handle(StartChatCommand {
            request_id,
            persona_code,
        })
        .await
    {
        Ok(result) => (
            StatusCode::OK,
            Json(StartChatResponse::new(result.chat_id, result.created)),
        )
            .into_response(),
        Err(StartChatError::RequestNotFound(_)) => not_found("Запрос не найден"),
        Err(StartChatError::PersonaNotFound(code)) => bad_request(format!(
            "Неизвестная специализация юриста: {}",
            code
        )),
        Err(err) => internal_error(err.to_string()),
    }
}

/// POST /api/chats/:chat_id/messages - Send a client message.
pub async fn send_message(
    State(state): State<ChatAppState>,
    Path(chat_id): Path<String>,
    Json(body): Json<SendMessageBody>,
) -> Response {
    let Ok(chat_id) = chat_id.parse::<ChatId>() else {
        return not_found("Чат не найден");
    };

    match state
        .send
        .handle(SendMessageCommand {
            chat_id,
            text: body.message,
        })
        .await
    {
        Ok(reply) => (
            StatusCode::OK,
            Json(LawyerReplyResponse::new(reply.message, reply.payload)),
        )
            .into_response(),
        Err(SendMessageError::EmptyMessage) => bad_request("Введите сообщение"),
        Err(SendMessageError::ChatNotFound(_)) => not_found("Чат не найден"),
        Err(SendMessageError::ChatClosed(_)) => bad_request("Чат закрыт"),
        Err(SendMessageError::Gateway(_)) => internal_error(
            "Юрист не ответил. Попробуйте отправить сообщение ещё раз",
        ),
        Err(err) => internal_error(err.to_string()),
    }
}

/// GET /api/chats/:chat_id/messages - List the chat transcript.
pub async fn get_chat_messages(
    State(state): State<ChatAppState>,
    Path(chat_id): Path<String>,
) -> Response {
    let Ok(chat_id) = chat_id.parse::<ChatId>() else {
        return not_found("Чат не найден");
    };

    match state.list.handle(chat_id).await {
        Ok(messages) => (
            StatusCode::OK,
            Json(MessagesResponse {
                success: true,
                messages: messages.iter().map(MessageView::from).collect(),
            }),
        )
            .into_response(),
        Err(ListMessagesError::ChatNotFound(_)) => not_found("Чат не найден"),
        Err(err) => internal_error(err.to_string()),
    }
}

/// POST /api/chats/:chat_id/close - Close a chat.
pub async fn close_chat(
    State(state): State<ChatAppState>,
    Path(chat_id): Path<String>,
) -> Response {
    let Ok(chat_id) = chat_id.parse::<ChatId>() else {
        return not_found("Чат не найден");
    };

    match state.close.handle(chat_id).await {
        Ok(()) => (StatusCode::OK, Json(AckResponse::new("Чат закрыт"))).into_response(),
        Err(CloseChatError::ChatNotFound(_)) => not_found("Чат не найден"),
        Err(err) => internal_error(err.to_string()),
    }
}

/// POST /api/chats/:chat_id/reset-context - Drop the conversation context.
pub async fn reset_chat_context(
    State(state): State<ChatAppState>,
    Path(chat_id): Path<String>,
) -> Response {
    let Ok(chat_id) = chat_id.parse::<ChatId>() else {
        return not_found("Чат не найден");
    };

    match state.reset.handle(chat_id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(AckResponse::new("Контекст диалога сброшен")),
        )
            .into_response(),
        Err(ResetContextError::ChatNotFound(_)) => not_found("Чат не найден"),
        Err(err) => internal_error(err.to_string()),
    }
}

/// GET /api/chats/:chat_id/debug-context - Diagnostic snapshot.
pub async fn debug_chat_context(
    State(state): State<ChatAppState>,
    Path(chat_id): Path<String>,
) -> Response {
    let Ok(chat_id) = chat_id.parse::<ChatId>() else {
        return not_found("Чат не найден");
    };

    match state.debug.handle(chat_id).await {
        Ok(snapshot) => (StatusCode::OK, Json(DebugInfoResponse::from(snapshot))).into_response(),
        Err(DebugContextError::ChatNotFound(_)) => not_found("Чат не найден"),
        Err(err) => internal_error(err.to_string()),
    }
}

fn not_found(message: &str) -> Response {
    (StatusCode::NOT_FOUND, Json(NotFoundBody::new(message))).into_response()
}

fn bad_request(message: impl Into<String>) -> Response {
    (StatusCode::BAD_REQUEST, Json(ErrorBody::new(message))).into_response()
}

fn internal_error(message: impl Into<String>) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody::new(message)),
    )
        .into_response()
}

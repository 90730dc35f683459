//! DebugContext query handler.
//!
//! Read-only report on a chat's conversation binding. No side effects:
//! peeking never creates a session.

use std::sync::Arc;
use thiserror::Error;

use crate::application::context::ConversationContextStore;
use crate::domain::chat::Sender;
use crate::domain::foundation::{truncate_chars, ChatId, DomainError};
use crate::ports::ChatRepository;

/// Messages included in the snapshot.
const RECENT_MESSAGES: usize = 3;

/// Characters of each message preview.
const PREVIEW_CHARS: usize = 50;

/// Errors that can occur when building the snapshot.
#[derive(Debug, Clone, Error)]
pub enum DebugContextError {
    /// No chat with this id.
    #[error("chat {0} not found")]
    ChatNotFound(ChatId),

    /// Repository error.
    #[error("repository error: {0}")]
    Repository(String),
}

impl From<DomainError> for DebugContextError {
    fn from(err: DomainError) -> Self {
        DebugContextError::Repository(err.to_string())
    }
}

/// Shortened view of one recent message.
#[derive(Debug, Clone)]
pub struct MessagePreview {
    pub sender: Sender,
    pub preview: String,
}

/// Diagnostic snapshot of a chat's conversation state.
#[derive(Debug, Clone)]
pub struct DebugSnapshot {
    /// Bound session identifier, if a live mapping exists.
    pub session: Option<String>,
    /// Total number of persisted messages.
    pub message_count: i32,
    /// Last few messages, truncated.
    pub recent: Vec<MessagePreview>,
}

/// Handler for DebugContext queries.
pub struct DebugContextHandler {
    chats: Arc<dyn ChatRepository>,
    context: Arc<ConversationContextStore>,
}

impl DebugContextHandler {
    /// Creates a new handler.
    pub fn new(chats: Arc<dyn ChatRepository>, context: Arc<ConversationContextStore>) -> Self {
        Self { chats, context }
    }

    /// Builds the diagnostic snapshot for a chat.
    pub async fn handle(&self, chat_id: ChatId) -> Result<DebugSnapshot, DebugContextError> {
        let chat = self
            .chats
            .find_by_id(chat_id)
            .await?
            .ok_or(DebugContextError::ChatNotFound(chat_id))?;

        let session = self
            .context
            .peek(chat_id)
            .await
            .map(|s| s.as_str().to_string());

        let recent = self
            .chats
            .recent_messages(chat_id, RECENT_MESSAGES)
            .await?
            .iter()
            .map(|m| MessagePreview {
                sender: m.sender(),
                preview: truncate_chars(m.message(), PREVIEW_CHARS),
            })
            .collect();

        Ok(DebugSnapshot {
            session,
            message_count: chat.message_count(),
            recent,
        })
    }
}

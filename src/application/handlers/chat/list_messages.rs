//! ListMessages query handler.

use std::sync::Arc;
use thiserror::Error;

use crate::domain::chat::ChatMessage;
use crate::domain::foundation::{ChatId, DomainError};
use crate::ports::ChatRepository;

/// Errors that can occur when listing messages.
#[derive(Debug, Clone, Error)]
pub enum ListMessagesError {
    /// No chat with this id.
    #[error("chat {0} not found")]
    ChatNotFound(ChatId),

    /// Repository error.
    #[error("repository error: {0}")]
    Repository(String),
}

impl From<DomainError> for ListMessagesError {
    fn from(err: DomainError) -> Self {
        ListMessagesError::Repository(err.to_string())
    }
}

/// Handler for chat transcript queries.
pub struct ListMessagesHandler {
    chats: Arc<dyn ChatRepository>,
}

impl ListMessagesHandler {
    /// Creates a new handler.
    pub fn new(chats: Arc<dyn ChatRepository>) -> Self {
        Self { chats }
    }

    /// Returns all messages of a chat in chronological order.
    pub async fn handle(&self, chat_id: ChatId) -> Result<Vec<ChatMessage>, ListMessagesError> {
        if self.chats.find_by_id(chat_id).await?.is_none() {
            return Err(ListMessagesError::ChatNotFound(chat_id));
        }
        Ok(self.chats.messages(chat_id).await?)
    }
}

//! ResetContext command handler.
//!
//! Drops the chat's session mapping without touching the chat or its
//! history: the next turn binds a fresh session and the provider starts
//! with no memory of prior turns, even though the transcript keeps them.

use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::application::context::ConversationContextStore;
use crate::domain::chat::ChatMessage;
use crate::domain::foundation::{ChatId, DomainError};
use crate::ports::ChatRepository;

/// System note appended after a reset.
const RESET_NOTE: &str = "Контекст диалога сброшен. Юрист не помнит предыдущие сообщения.";

/// Errors that can occur when resetting chat context.
#[derive(Debug, Clone, Error)]
pub enum ResetContextError {
    /// No chat with this id.
    #[error("chat {0} not found")]
    ChatNotFound(ChatId),

    /// Repository error.
    #[error("repository error: {0}")]
    Repository(String),
}

impl From<DomainError> for ResetContextError {
    fn from(err: DomainError) -> Self {
        ResetContextError::Repository(err.to_string())
    }
}

/// Handler for ResetContext commands.
pub struct ResetContextHandler {
    chats: Arc<dyn ChatRepository>,
    context: Arc<ConversationContextStore>,
}

impl ResetContextHandler {
    /// Creates a new handler.
    pub fn new(chats: Arc<dyn ChatRepository>, context: Arc<ConversationContextStore>) -> Self {
        Self { chats, context }
    }

    /// Resets the conversation context of a chat.
    pub async fn handle(&self, chat_id: ChatId) -> Result<(), ResetContextError> {
        let chat = self
            .chats
            .find_by_id(chat_id)
            .await?
            .ok_or(ResetContextError::ChatNotFound(chat_id))?;

        self.context.invalidate(chat_id).await;
        self.chats
            .append_message(&ChatMessage::system(chat.id(), RESET_NOTE))
            .await?;

        info!(chat_id = %chat_id, "conversation context reset");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockProvider;
    use crate::adapters::memory::InMemoryChatRepository;
    use crate::adapters::session_cache::InMemorySessionCache;
    use crate::application::gateway::AiGateway;
    use crate::domain::chat::{ChatStatus, LawyerChat, Sender};
    use crate::domain::foundation::{LawyerId, RequestId};

    async fn fixture() -> (ResetContextHandler, Arc<InMemoryChatRepository>, Arc<ConversationContextStore>, ChatId)
    {
        let chats = Arc::new(InMemoryChatRepository::new());
        let gateway = Arc::new(AiGateway::new(Arc::new(MockProvider::new())));
        let context = Arc::new(ConversationContextStore::new(
            Arc::new(InMemorySessionCache::new()),
            gateway,
        ));

        let chat = LawyerChat::new(
            RequestId::new(),
            LawyerId::new(),
            "Анна Ковалева",
            "Не выплачивают компенсацию за отпуск",
        );
        chats.create(&chat).await.unwrap();

        (
            ResetContextHandler::new(chats.clone(), context.clone()),
            chats,
            context,
            chat.id(),
        )
    }

    #[tokio::test]
    async fn reset_drops_session_and_notes_it() {
        let (handler, chats, context, chat_id) = fixture().await;
        context.get_or_create(chat_id).await.unwrap();

        handler.handle(chat_id).await.unwrap();

        assert!(context.peek(chat_id).await.is_none());

        let messages = chats.messages(chat_id).await.unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].sender(), Sender::System);
        assert!(messages[0].message().contains("сброшен"));
    }

    #[tokio::test]
    async fn reset_keeps_chat_active_and_history_intact() {
        let (handler, chats, _, chat_id) = fixture().await;
        chats
            .append_message(&ChatMessage::client(chat_id, "моё сообщение"))
            .await
            .unwrap();

        handler.handle(chat_id).await.unwrap();

        let chat = chats.find_by_id(chat_id).await.unwrap().unwrap();
        assert_eq!(chat.status(), ChatStatus::Active);
        // Original message plus the reset note.
        assert_eq!(chats.messages(chat_id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn missing_chat_is_rejected() {
        let (handler, _, _, _) = fixture().await;
        let result = handler.handle(ChatId::new()).await;
        assert!(matches!(result, Err(ResetContextError::ChatNotFound(_))));
    }
}

//! CloseChat command handler.
//!
//! Closing stamps the chat and forfeits conversational memory by dropping
//! its session mapping. The operation is idempotent.

use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::application::context::ConversationContextStore;
use crate::domain::foundation::{ChatId, DomainError};
use crate::ports::ChatRepository;

/// Errors that can occur when closing a chat.
#[derive(Debug, Clone, Error)]
pub enum CloseChatError {
    /// No chat with this id.
    #[error("chat {0} not found")]
    ChatNotFound(ChatId),

    /// Repository error.
    #[error("repository error: {0}")]
    Repository(String),
}

impl From<DomainError> for CloseChatError {
    fn from(err: DomainError) -> Self {
        CloseChatError::Repository(err.to_string())
    }
}

/// Handler for CloseChat commands.
pub struct CloseChatHandler {
    chats: Arc<dyn ChatRepository>,
    context: Arc<ConversationContextStore>,
}

impl CloseChatHandler {
    /// Creates a new handler.
    pub fn new(chats: Arc<dyn ChatRepository>, context: Arc<ConversationContextStore>) -> Self {
        Self { chats, context }
    }

    /// Closes a chat. Calling this on an already closed chat succeeds and
    /// changes nothing.
    pub async fn handle(&self, chat_id: ChatId) -> Result<(), CloseChatError> {
        let mut chat = self
            .chats
            .find_by_id(chat_id)
            .await?
            .ok_or(CloseChatError::ChatNotFound(chat_id))?;

        chat.close();
        self.chats.update(&chat).await?;
        self.context.invalidate(chat_id).await;

        info!(chat_id = %chat_id, "chat closed");
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
    use crate::domain::chat::{ChatStatus, LawyerChat};
    use crate::domain::foundation::{LawyerId, RequestId};

    async fn fixture() -> (CloseChatHandler, Arc<InMemoryChatRepository>, Arc<ConversationContextStore>, ChatId)
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
            "Мария Петрова",
            "Вопрос о разводе и разделе имущества",
        );
        chats.create(&chat).await.unwrap();

        (
            CloseChatHandler::new(chats.clone(), context.clone()),
            chats,
            context,
            chat.id(),
        )
    }

    #[tokio::test]
    async fn close_sets_status_and_drops_session() {
        let (handler, chats, context, chat_id) = fixture().await;
        context.get_or_create(chat_id).await.unwrap();

        handler.handle(chat_id).await.unwrap();

        let chat = chats.find_by_id(chat_id).await.unwrap().unwrap();
        assert_eq!(chat.status(), ChatStatus::Closed);
        assert!(chat.archived_at().is_some());
        assert!(context.peek(chat_id).await.is_none());
    }

    #[tokio::test]
    async fn close_twice_succeeds_unchanged() {
        let (handler, chats, _, chat_id) = fixture().await;

        handler.handle(chat_id).await.unwrap();
        let first = chats.find_by_id(chat_id).await.unwrap().unwrap();

        handler.handle(chat_id).await.unwrap();
        let second = chats.find_by_id(chat_id).await.unwrap().unwrap();

        assert_eq!(second.status(), ChatStatus::Closed);
        assert_eq!(second.archived_at(), first.archived_at());
    }

    #[tokio::test]
    async fn missing_chat_is_rejected() {
        let (handler, _, _, _) = fixture().await;
        let result = handler.handle(ChatId::new()).await;
        assert!(matches!(result, Err(CloseChatError::ChatNotFound(_))));
    }
}

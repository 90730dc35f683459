//! In-memory ChatRepository for testing and development.
//!
//! A single write lock spans chat and message state, so the message append
//! plus counter update is atomic, mirroring the Postgres transaction.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::chat::{ChatMessage, LawyerChat};
use crate::domain::foundation::{ChatId, DomainError, ErrorCode, LawyerId, RequestId};
use crate::ports::ChatRepository;

#[derive(Debug, Default)]
struct Inner {
    chats: HashMap<ChatId, LawyerChat>,
    messages: Vec<ChatMessage>,
}

/// In-memory store of chats and their messages.
#[derive(Debug, Default)]
pub struct InMemoryChatRepository {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryChatRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored chats.
    pub async fn chat_count(&self) -> usize {
        self.inner.read().await.chats.len()
    }
}

fn chat_not_found(id: ChatId) -> DomainError {
    DomainError::new(ErrorCode::ChatNotFound, format!("chat {} not found", id))
}

#[async_trait]
impl ChatRepository for InMemoryChatRepository {
    async fn create(&self, chat: &LawyerChat) -> Result<(), DomainError> {
        self.inner.write().await.chats.insert(chat.id(), chat.clone());
        Ok(())
    }

    async fn update(&self, chat: &LawyerChat) -> Result<(), DomainError> {
        let mut inner = self.inner.write().await;
        if !inner.chats.contains_key(&chat.id()) {
            return Err(chat_not_found(chat.id()));
        }
        inner.chats.insert(chat.id(), chat.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: ChatId) -> Result<Option<LawyerChat>, DomainError> {
        Ok(self.inner.read().await.chats.get(&id).cloned())
    }

    async fn find_by_request_and_lawyer(
        &self,
        request_id: RequestId,
        lawyer_id: LawyerId,
    ) -> Result<Option<LawyerChat>, DomainError> {
        Ok(self
            .inner
            .read()
            .await
            .chats
            .values()
            .find(|c| c.request_id() == request_id && c.lawyer_id() == lawyer_id)
            .cloned())
    }

    async fn append_message(&self, message: &ChatMessage) -> Result<(), DomainError> {
        let mut inner = self.inner.write().await;
        let chat = inner
            .chats
            .get_mut(&message.chat_id())
            .ok_or_else(|| chat_not_found(message.chat_id()))?;
        chat.record_message(message.timestamp());
        inner.messages.push(message.clone());
        Ok(())
    }

    async fn messages(&self, chat_id: ChatId) -> Result<Vec<ChatMessage>, DomainError> {
        let inner = self.inner.read().await;
        let mut messages: Vec<ChatMessage> = inner
            .messages
            .iter()
            .filter(|m| m.chat_id() == chat_id)
            .cloned()
            .collect();
        messages.sort_by_key(|m| m.timestamp());
        Ok(messages)
    }

    async fn recent_messages(
        &self,
        chat_id: ChatId,
        limit: usize,
    ) -> Result<Vec<ChatMessage>, DomainError> {
        let mut messages = self.messages(chat_id).await?;
        if messages.len() > limit {
            messages.drain(..messages.len() - limit);
        }
        Ok(messages)
    }

    async fn delete(&self, id: ChatId) -> Result<(), DomainError> {
        let mut inner = self.inner.write().await;
        if inner.chats.remove(&id).is_none() {
            return Err(chat_not_found(id));
        }
        inner.messages.retain(|m| m.chat_id() != id);
        Ok(())
    }
}

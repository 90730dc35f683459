//! In-memory session cache for testing and single-server deployments.
//!
//! Entries carry an explicit expiry and are evicted lazily on access.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::domain::foundation::{ChatId, ConversationSessionId, Timestamp};
use crate::ports::{CacheError, SessionCache};

#[derive(Debug, Clone)]
struct Entry {
    session: ConversationSessionId,
    expires_at: Timestamp,
}

/// In-memory expiring map of chat → conversation session.
#[derive(Debug, Default)]
pub struct InMemorySessionCache {
    entries: Arc<RwLock<HashMap<ChatId, Entry>>>,
}

impl InMemorySessionCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (non-expired) entries.
    pub async fn live_entries(&self) -> usize {
        let now = Timestamp::now();
        self.entries
            .read()
            .await
            .values()
            .filter(|e| e.expires_at.is_after(&now))
            .count()
    }
}

#[async_trait]
impl SessionCache for InMemorySessionCache {
    async fn get(&self, chat_id: ChatId) -> Result<Option<ConversationSessionId>, CacheError> {
        let now = Timestamp::now();

        {
            let entries = self.entries.read().await;
            match entries.get(&chat_id) {
                Some(entry) if entry.expires_at.is_after(&now) => {
                    return Ok(Some(entry.session.clone()))
                }
                Some(_) => {}
                None => return Ok(None),
            }
        }

        // Entry expired: evict it.
        self.entries.write().await.remove(&chat_id);
        Ok(None)
    }

    async fn put(
        &self,
        chat_id: ChatId,
        session: &ConversationSessionId,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        let entry = Entry {
            session: session.clone(),
            expires_at: Timestamp::now().plus_secs(ttl.as_secs()),
        };
        self.entries.write().await.insert(chat_id, entry);
        Ok(())
    }

    async fn remove(&self, chat_id: ChatId) -> Result<(), CacheError> {
        self.entries.write().await.remove(&chat_id);
        Ok(())
    }
}

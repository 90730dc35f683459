//! Redis-backed session cache for production deployments.
//!
//! Uses SET with EX for writes so value and expiry land atomically; Redis
//! handles eviction on its own.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use std::time::Duration;

use crate::domain::foundation::{ChatId, ConversationSessionId};
use crate::ports::{CacheError, SessionCache};

/// Key prefix for chat → session bindings.
const KEY_PREFIX: &str = "lexy:conversation:";

/// Redis-backed expiring map of chat → conversation session.
#[derive(Clone)]
pub struct RedisSessionCache {
    conn: MultiplexedConnection,
}

impl RedisSessionCache {
    /// Creates a cache over an established Redis connection.
    pub fn new(conn: MultiplexedConnection) -> Self {
        Self { conn }
    }

    fn key(chat_id: ChatId) -> String {
        format!("{}{}", KEY_PREFIX, chat_id)
    }
}

#[async_trait]
impl SessionCache for RedisSessionCache {
    async fn get(&self, chat_id: ChatId) -> Result<Option<ConversationSessionId>, CacheError> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn
            .get(Self::key(chat_id))
            .await
            .map_err(|e: redis::RedisError| CacheError::Unavailable(e.to_string()))?;
        Ok(value.map(ConversationSessionId::new))
    }

    async fn put(
        &self,
        chat_id: ChatId,
        session: &ConversationSessionId,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        // SET with EX lands value and expiry atomically.
        redis::cmd("SET")
            .arg(Self::key(chat_id))
            .arg(session.as_str())
            .arg("EX")
            .arg(ttl.as_secs())
            .query_async::<_, ()>(&mut conn)
            .await
            .map_err(|e: redis::RedisError| CacheError::Unavailable(e.to_string()))?;
        Ok(())
    }

    async fn remove(&self, chat_id: ChatId) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(Self::key(chat_id))
            .await
            .map_err(|e: redis::RedisError| CacheError::Unavailable(e.to_string()))?;
        Ok(())
    }
}

impl std::fmt::Debug for RedisSessionCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisSessionCache").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    // Redis integration tests require a running Redis instance and are
    // exercised through the deployment environment, not unit tests.
    // The in-memory implementation covers the SessionCache contract.

    use super::*;

    #[test]
    fn keys_are_namespaced_by_chat_id() {
        let chat_id = ChatId::new();
        let key = RedisSessionCache::key(chat_id);
        assert!(key.starts_with(KEY_PREFIX));
        assert!(key.ends_with(&chat_id.to_string()));
    }
}

//! PostgreSQL implementation of ChatRepository.
//!
//! Message appends run in a transaction that also bumps the parent chat's
//! `message_count` and `last_message_at`, so counters never undercount
//! under concurrent appends.

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::chat::{ChatMessage, ChatStatus, LawyerChat, Sender};
use crate::domain::foundation::{
    ChatId, DomainError, ErrorCode, LawyerId, MessageId, RequestId, Timestamp,
};
use crate::ports::ChatRepository;

/// PostgreSQL implementation of ChatRepository.
#[derive(Clone)]
pub struct PostgresChatRepository {
    pool: PgPool,
}

impl PostgresChatRepository {
    /// Creates a new PostgresChatRepository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ChatRepository for PostgresChatRepository {
    async fn create(&self, chat: &LawyerChat) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO lawyer_chats (
                id, request_id, lawyer_id, status, title, message_count,
                last_message_at, created_at, updated_at, archived_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(chat.id().as_uuid())
        .bind(chat.request_id().as_uuid())
        .bind(chat.lawyer_id().as_uuid())
        .bind(chat.status().as_str())
        .bind(chat.title())
        .bind(chat.message_count())
        .bind(chat.last_message_at().map(|t| *t.as_datetime()))
        .bind(chat.created_at().as_datetime())
        .bind(chat.updated_at().as_datetime())
        .bind(chat.archived_at().map(|t| *t.as_datetime()))
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to insert chat: {}", e)))?;

        Ok(())
    }

    async fn update(&self, chat: &LawyerChat) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE lawyer_chats SET
                status = $2,
                title = $3,
                updated_at = $4,
                archived_at = $5
            WHERE id = $1
            "#,
        )
        .bind(chat.id().as_uuid())
        .bind(chat.status().as_str())
        .bind(chat.title())
        .bind(chat.updated_at().as_datetime())
        .bind(chat.archived_at().map(|t| *t.as_datetime()))
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to update chat: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(chat_not_found(chat.id()));
        }

        Ok(())
    }

    async fn find_by_id(&self, id: ChatId) -> Result<Option<LawyerChat>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, request_id, lawyer_id, status, title, message_count,
                   last_message_at, created_at, updated_at, archived_at
            FROM lawyer_chats
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to fetch chat: {}", e)))?;

        row.map(row_to_chat).transpose()
    }

    async fn find_by_request_and_lawyer(
        &self,
        request_id: RequestId,
        lawyer_id: LawyerId,
    ) -> Result<Option<LawyerChat>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, request_id, lawyer_id, status, title, message_count,
                   last_message_at, created_at, updated_at, archived_at
            FROM lawyer_chats
            WHERE request_id = $1 AND lawyer_id = $2
            "#,
        )
        .bind(request_id.as_uuid())
        .bind(lawyer_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to fetch chat by pair: {}", e)))?;

        row.map(row_to_chat).transpose()
    }

    async fn append_message(&self, message: &ChatMessage) -> Result<(), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::database(format!("Failed to start transaction: {}", e)))?;

        sqlx::query(
            r#"
            INSERT INTO chat_messages (id, chat_id, sender, message, ai_response_data, timestamp)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(message.id().as_uuid())
        .bind(message.chat_id().as_uuid())
        .bind(message.sender().as_str())
        .bind(message.message())
        .bind(message.ai_response_data())
        .bind(message.timestamp().as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(|e| DomainError::database(format!("Failed to insert message: {}", e)))?;

        let result = sqlx::query(
            r#"
            UPDATE lawyer_chats SET
                message_count = message_count + 1,
                last_message_at = $2,
                updated_at = $2
            WHERE id = $1
            "#,
        )
        .bind(message.chat_id().as_uuid())
        .bind(message.timestamp().as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(|e| DomainError::database(format!("Failed to update chat counters: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(chat_not_found(message.chat_id()));
        }

        tx.commit()
            .await
            .map_err(|e| DomainError::database(format!("Failed to commit transaction: {}", e)))?;

        Ok(())
    }

    async fn messages(&self, chat_id: ChatId) -> Result<Vec<ChatMessage>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT id, chat_id, sender, message, ai_response_data, timestamp
            FROM chat_messages
            WHERE chat_id = $1
            ORDER BY timestamp ASC
            "#,
        )
        .bind(chat_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to fetch messages: {}", e)))?;

        rows.into_iter().map(row_to_message).collect()
    }

    async fn recent_messages(
        &self,
        chat_id: ChatId,
        limit: usize,
    ) -> Result<Vec<ChatMessage>, DomainError> {
        // Newest first in SQL, then flipped back to chronological order.
        let rows = sqlx::query(
            r#"
            SELECT id, chat_id, sender, message, ai_response_data, timestamp
            FROM chat_messages
            WHERE chat_id = $1
            ORDER BY timestamp DESC
            LIMIT $2
            "#,
        )
        .bind(chat_id.as_uuid())
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to fetch recent messages: {}", e)))?;

        let mut messages: Vec<ChatMessage> = rows
            .into_iter()
            .map(row_to_message)
            .collect::<Result<_, _>>()?;
        messages.reverse();
        Ok(messages)
    }

    async fn delete(&self, id: ChatId) -> Result<(), DomainError> {
        let result = sqlx::query("DELETE FROM lawyer_chats WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::database(format!("Failed to delete chat: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(chat_not_found(id));
        }

        Ok(())
    }
}

// === Helper Functions ===

fn chat_not_found(id: ChatId) -> DomainError {
    DomainError::new(ErrorCode::ChatNotFound, format!("chat {} not found", id))
}

fn row_to_chat(row: sqlx::postgres::PgRow) -> Result<LawyerChat, DomainError> {
    let id: uuid::Uuid = row.get("id");
    let request_id: uuid::Uuid = row.get("request_id");
    let lawyer_id: uuid::Uuid = row.get("lawyer_id");
    let status_str: &str = row.get("status");
    let last_message_at: Option<chrono::DateTime<chrono::Utc>> = row.get("last_message_at");
    let created_at: chrono::DateTime<chrono::Utc> = row.get("created_at");
    let updated_at: chrono::DateTime<chrono::Utc> = row.get("updated_at");
    let archived_at: Option<chrono::DateTime<chrono::Utc>> = row.get("archived_at");

    Ok(LawyerChat::reconstitute(
        ChatId::from_uuid(id),
        RequestId::from_uuid(request_id),
        LawyerId::from_uuid(lawyer_id),
        str_to_chat_status(status_str)?,
        row.get("title"),
        row.get("message_count"),
        last_message_at.map(Timestamp::from_datetime),
        Timestamp::from_datetime(created_at),
        Timestamp::from_datetime(updated_at),
        archived_at.map(Timestamp::from_datetime),
    ))
}

fn row_to_message(row: sqlx::postgres::PgRow) -> Result<ChatMessage, DomainError> {
    let id: uuid::Uuid = row.get("id");
    let chat_id: uuid::Uuid = row.get("chat_id");
    let sender_str: &str = row.get("sender");
    let timestamp: chrono::DateTime<chrono::Utc> = row.get("timestamp");

    Ok(ChatMessage::reconstitute(
        MessageId::from_uuid(id),
        ChatId::from_uuid(chat_id),
        str_to_sender(sender_str)?,
        row.get("message"),
        row.get("ai_response_data"),
        Timestamp::from_datetime(timestamp),
    ))
}

fn str_to_chat_status(s: &str) -> Result<ChatStatus, DomainError> {
    ChatStatus::parse(s).ok_or_else(|| {
        DomainError::new(
            ErrorCode::InternalError,
            format!("Invalid chat status: {}", s),
        )
    })
}

fn str_to_sender(s: &str) -> Result<Sender, DomainError> {
    Sender::parse(s).ok_or_else(|| {
        DomainError::new(
            ErrorCode::InternalError,
            format!("Invalid message sender: {}", s),
        )
    })
}

//! PostgreSQL implementation of RequestRepository.

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::foundation::{DomainError, ErrorCode, RequestId, Timestamp};
use crate::domain::request::{
    EmergencyRequest, RequestOrigin, RequestStatus, ResponseFormat, Urgency,
};
use crate::ports::RequestRepository;

/// PostgreSQL implementation of RequestRepository.
#[derive(Clone)]
pub struct PostgresRequestRepository {
    pool: PgPool,
}

impl PostgresRequestRepository {
    /// Creates a new PostgresRequestRepository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RequestRepository for PostgresRequestRepository {
    async fn create(&self, request: &EmergencyRequest) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO emergency_requests (
                id, problem_text, status, category, urgency, confidence,
                summary, ai_response, response_format, error_message,
                ip_address, user_agent, created_at, analyzed_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(request.id().as_uuid())
        .bind(request.problem_text())
        .bind(request.status().as_str())
        .bind(request.category())
        .bind(request.urgency().map(|u| u.as_str()))
        .bind(request.confidence())
        .bind(request.summary())
        .bind(request.ai_response())
        .bind(request.response_format().as_str())
        .bind(request.error_message())
        .bind(request.origin().ip_address.as_deref())
        .bind(request.origin().user_agent.as_deref())
        .bind(request.created_at().as_datetime())
        .bind(request.analyzed_at().map(|t| *t.as_datetime()))
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to insert request: {}", e)))?;

        Ok(())
    }

    async fn update(&self, request: &EmergencyRequest) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE emergency_requests SET
                status = $2,
                category = $3,
                urgency = $4,
                confidence = $5,
                summary = $6,
                ai_response = $7,
                response_format = $8,
                error_message = $9,
                analyzed_at = $10
            WHERE id = $1
            "#,
        )
        .bind(request.id().as_uuid())
        .bind(request.status().as_str())
        .bind(request.category())
        .bind(request.urgency().map(|u| u.as_str()))
        .bind(request.confidence())
        .bind(request.summary())
        .bind(request.ai_response())
        .bind(request.response_format().as_str())
        .bind(request.error_message())
        .bind(request.analyzed_at().map(|t| *t.as_datetime()))
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to update request: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::RequestNotFound,
                format!("request {} not found", request.id()),
            ));
        }

        Ok(())
    }

    async fn find_by_id(&self, id: RequestId) -> Result<Option<EmergencyRequest>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, problem_text, status, category, urgency, confidence,
                   summary, ai_response, response_format, error_message,
                   ip_address, user_agent, created_at, analyzed_at
            FROM emergency_requests
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to fetch request: {}", e)))?;

        let row = match row {
            Some(row) => row,
            None => return Ok(None),
        };

        let id_uuid: uuid::Uuid = row.get("id");
        let status_str: &str = row.get("status");
        let urgency_str: Option<&str> = row.get("urgency");
        let format_str: &str = row.get("response_format");
        let created_at: chrono::DateTime<chrono::Utc> = row.get("created_at");
        let analyzed_at: Option<chrono::DateTime<chrono::Utc>> = row.get("analyzed_at");

        let request = EmergencyRequest::reconstitute(
            RequestId::from_uuid(id_uuid),
            row.get("problem_text"),
            str_to_status(status_str)?,
            row.get("category"),
            urgency_str.and_then(Urgency::parse),
            row.get("confidence"),
            row.get("summary"),
            row.get("ai_response"),
            str_to_format(format_str)?,
            row.get("error_message"),
            RequestOrigin {
                ip_address: row.get("ip_address"),
                user_agent: row.get("user_agent"),
            },
            Timestamp::from_datetime(created_at),
            analyzed_at.map(Timestamp::from_datetime),
        );

        Ok(Some(request))
    }
}

// === Helper Functions ===

fn str_to_status(s: &str) -> Result<RequestStatus, DomainError> {
    RequestStatus::parse(s).ok_or_else(|| {
        DomainError::new(
            ErrorCode::InternalError,
            format!("Invalid request status: {}", s),
        )
    })
}

fn str_to_format(s: &str) -> Result<ResponseFormat, DomainError> {
    ResponseFormat::parse(s).ok_or_else(|| {
        DomainError::new(
            ErrorCode::InternalError,
            format!("Invalid response format: {}", s),
        )
    })
}

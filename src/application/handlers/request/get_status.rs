//! GetRequestStatus query handler.

use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

use crate::domain::foundation::{DomainError, RequestId, Timestamp};
use crate::domain::request::{RequestStatus, ResponseFormat, Urgency};
use crate::ports::RequestRepository;

/// Read-only snapshot of a request's analysis state.
#[derive(Debug, Clone)]
pub struct RequestSnapshot {
    pub request_id: RequestId,
    pub status: RequestStatus,
    pub has_response: bool,
    pub category: Option<String>,
    pub urgency: Option<Urgency>,
    pub confidence: f64,
    pub summary: Option<String>,
    pub response: Option<Value>,
    pub response_format: ResponseFormat,
    pub error_message: Option<String>,
    pub created_at: Timestamp,
    pub analyzed_at: Option<Timestamp>,
}

/// Errors that can occur when reading request status.
#[derive(Debug, Clone, Error)]
pub enum GetStatusError {
    /// No request with this id.
    #[error("request {0} not found")]
    NotFound(RequestId),

    /// Repository error.
    #[error("repository error: {0}")]
    Repository(String),
}

impl From<DomainError> for GetStatusError {
    fn from(err: DomainError) -> Self {
        GetStatusError::Repository(err.to_string())
    }
}

/// Handler for request status queries.
pub struct GetRequestStatusHandler {
    requests: Arc<dyn RequestRepository>,
}

impl GetRequestStatusHandler {
    /// Creates a new handler.
    pub fn new(requests: Arc<dyn RequestRepository>) -> Self {
        Self { requests }
    }

    /// Returns the snapshot for a request.
    pub async fn handle(&self, request_id: RequestId) -> Result<RequestSnapshot, GetStatusError> {
        let request = self
            .requests
            .find_by_id(request_id)
            .await?
            .ok_or(GetStatusError::NotFound(request_id))?;

        Ok(RequestSnapshot {
            request_id: request.id(),
            status: request.status(),
            has_response: request.ai_response().is_some(),
            category: request.category().map(str::to_string),
            urgency: request.urgency(),
            confidence: request.confidence(),
            summary: request.summary().map(str::to_string),
            response: request.ai_response().cloned(),
            response_format: request.response_format(),
            error_message: request.error_message().map(str::to_string),
            created_at: request.created_at(),
            analyzed_at: request.analyzed_at(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryRequestRepository;
    use crate::domain::request::{EmergencyRequest, RequestOrigin};
    use crate::ports::RequestRepository as _;

    #[tokio::test]
    async fn snapshot_reflects_analyzing_request() {
        let repo = Arc::new(InMemoryRequestRepository::new());
        let mut request =
            EmergencyRequest::new("Попал в ДТП, виновник скрылся", RequestOrigin::default())
                .unwrap();
        request.start_analysis().unwrap();
        repo.create(&request).await.unwrap();

        let handler = GetRequestStatusHandler::new(repo);
        let snapshot = handler.handle(request.id()).await.unwrap();

        assert_eq!(snapshot.status, RequestStatus::Analyzing);
        assert!(!snapshot.has_response);
        assert!(snapshot.analyzed_at.is_none());
    }

    #[tokio::test]
    async fn missing_request_is_not_found() {
        let repo = Arc::new(InMemoryRequestRepository::new());
        let handler = GetRequestStatusHandler::new(repo);

        let result = handler.handle(RequestId::new()).await;
        assert!(matches!(result, Err(GetStatusError::NotFound(_))));
    }
}

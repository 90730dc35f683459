//! In-memory RequestRepository for testing and development.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, RequestId};
use crate::domain::request::EmergencyRequest;
use crate::ports::RequestRepository;

/// In-memory map of requests.
#[derive(Debug, Default)]
pub struct InMemoryRequestRepository {
    requests: Arc<RwLock<HashMap<RequestId, EmergencyRequest>>>,
}

impl InMemoryRequestRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored requests.
    pub async fn len(&self) -> usize {
        self.requests.read().await.len()
    }

    /// True when no request is stored.
    pub async fn is_empty(&self) -> bool {
        self.requests.read().await.is_empty()
    }
}

#[async_trait]
impl RequestRepository for InMemoryRequestRepository {
    async fn create(&self, request: &EmergencyRequest) -> Result<(), DomainError> {
        self.requests
            .write()
            .await
            .insert(request.id(), request.clone());
        Ok(())
    }

    async fn update(&self, request: &EmergencyRequest) -> Result<(), DomainError> {
        let mut requests = self.requests.write().await;
        if !requests.contains_key(&request.id()) {
            return Err(DomainError::new(
                ErrorCode::RequestNotFound,
                format!("request {} not found", request.id()),
            ));
        }
        requests.insert(request.id(), request.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: RequestId) -> Result<Option<EmergencyRequest>, DomainError> {
        Ok(self.requests.read().await.get(&id).cloned())
    }
}

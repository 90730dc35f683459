//! Request repository port.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, RequestId};
use crate::domain::request::EmergencyRequest;

/// Repository port for [`EmergencyRequest`] persistence.
#[async_trait]
pub trait RequestRepository: Send + Sync {
    /// Persists a new request.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` on persistence failure
    async fn create(&self, request: &EmergencyRequest) -> Result<(), DomainError>;

    /// Updates an existing request (analysis outcome, status).
    ///
    /// # Errors
    ///
    /// - `RequestNotFound` if the request does not exist
    /// - `DatabaseError` on persistence failure
    async fn update(&self, request: &EmergencyRequest) -> Result<(), DomainError>;

    /// Finds a request by id. Returns `None` if not found.
    async fn find_by_id(&self, id: RequestId) -> Result<Option<EmergencyRequest>, DomainError>;
}

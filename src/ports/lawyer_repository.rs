//! Lawyer repository port.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, LawyerId};
use crate::domain::lawyer::Lawyer;

/// Repository port for [`Lawyer`] records.
///
/// Records are keyed for upsert purposes by display name: the chat flow
/// retrieves-or-creates the record for a persona on first use.
#[async_trait]
pub trait LawyerRepository: Send + Sync {
    /// Persists a new lawyer record.
    async fn create(&self, lawyer: &Lawyer) -> Result<(), DomainError>;

    /// Updates an existing record (review aggregates, availability).
    ///
    /// # Errors
    ///
    /// - `LawyerNotFound` if the record does not exist
    async fn update(&self, lawyer: &Lawyer) -> Result<(), DomainError>;

    /// Finds a lawyer by id. Returns `None` if not found.
    async fn find_by_id(&self, id: LawyerId) -> Result<Option<Lawyer>, DomainError>;

    /// Finds a lawyer by display name. Returns `None` if not found.
    async fn find_by_name(&self, name: &str) -> Result<Option<Lawyer>, DomainError>;

    /// All lawyer records.
    async fn list(&self) -> Result<Vec<Lawyer>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lawyer_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn LawyerRepository) {}
    }
}

//! In-memory LawyerRepository for testing and development.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, LawyerId};
use crate::domain::lawyer::Lawyer;
use crate::ports::LawyerRepository;

/// In-memory map of lawyer records.
#[derive(Debug, Default)]
pub struct InMemoryLawyerRepository {
    lawyers: Arc<RwLock<HashMap<LawyerId, Lawyer>>>,
}

impl InMemoryLawyerRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored lawyers.
    pub async fn len(&self) -> usize {
        self.lawyers.read().await.len()
    }

    /// True when no lawyer is stored.
    pub async fn is_empty(&self) -> bool {
        self.lawyers.read().await.is_empty()
    }
}

#[async_trait]
impl LawyerRepository for InMemoryLawyerRepository {
    async fn create(&self, lawyer: &Lawyer) -> Result<(), DomainError> {
        self.lawyers
            .write()
            .await
            .insert(lawyer.id(), lawyer.clone());
        Ok(())
    }

    async fn update(&self, lawyer: &Lawyer) -> Result<(), DomainError> {
        let mut lawyers = self.lawyers.write().await;
        if !lawyers.contains_key(&lawyer.id()) {
            return Err(DomainError::new(
                ErrorCode::LawyerNotFound,
                format!("lawyer {} not found", lawyer.id()),
            ));
        }
        lawyers.insert(lawyer.id(), lawyer.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: LawyerId) -> Result<Option<Lawyer>, DomainError> {
        Ok(self.lawyers.read().await.get(&id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Lawyer>, DomainError> {
        Ok(self
            .lawyers
            .read()
            .await
            .values()
            .find(|l| l.name() == name)
            .cloned())
    }

    async fn list(&self) -> Result<Vec<Lawyer>, DomainError> {
        let mut lawyers: Vec<Lawyer> = self.lawyers.read().await.values().cloned().collect();
        lawyers.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(lawyers)
    }
}

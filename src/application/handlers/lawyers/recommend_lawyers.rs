//! RecommendLawyers query handler.
//!
//! Classifies a request's problem and returns the persona listing with the
//! matching one flagged. Routing always resolves: when classification
//! degrades or the classified code has no persona, the directory fallback
//! is flagged instead.

use std::sync::Arc;
use thiserror::Error;

use crate::application::classifier::SpecializationClassifier;
use crate::domain::foundation::{DomainError, RequestId};
use crate::domain::lawyer::{Persona, PersonaDirectory, Specialization};
use crate::ports::RequestRepository;

/// Errors that can occur when recommending lawyers.
#[derive(Debug, Clone, Error)]
pub enum RecommendError {
    /// No request with this id.
    #[error("request {0} not found")]
    RequestNotFound(RequestId),

    /// Repository error.
    #[error("repository error: {0}")]
    Repository(String),
}

impl From<DomainError> for RecommendError {
    fn from(err: DomainError) -> Self {
        RecommendError::Repository(err.to_string())
    }
}

/// One persona in the listing.
#[derive(Debug, Clone)]
pub struct PersonaRecommendation {
    pub persona: Persona,
    /// True for the persona matching the classified specialization.
    pub recommended: bool,
}

/// Result of a recommendation query.
#[derive(Debug, Clone)]
pub struct LawyerRecommendations {
    pub recommended: Specialization,
    pub personas: Vec<PersonaRecommendation>,
}

/// Handler for lawyer recommendation queries.
pub struct RecommendLawyersHandler {
    requests: Arc<dyn RequestRepository>,
    classifier: Arc<SpecializationClassifier>,
    directory: Arc<PersonaDirectory>,
}

impl RecommendLawyersHandler {
    /// Creates a new handler.
    pub fn new(
        requests: Arc<dyn RequestRepository>,
        classifier: Arc<SpecializationClassifier>,
        directory: Arc<PersonaDirectory>,
    ) -> Self {
        Self {
            requests,
            classifier,
            directory,
        }
    }

    /// Recommends a persona for a request and lists all of them.
    pub async fn handle(
        &self,
        request_id: RequestId,
    ) -> Result<LawyerRecommendations, RecommendError> {
        let request = self
            .requests
            .find_by_id(request_id)
            .await?
            .ok_or(RecommendError::RequestNotFound(request_id))?;

        let mut recommended = self.classifier.classify(request.problem_text()).await;
        if self.directory.get(recommended).is_none() {
            recommended = self.directory.fallback();
        }

        let personas = self
            .directory
            .all()
            .iter()
            .map(|persona| PersonaRecommendation {
                recommended: persona.code == recommended,
                persona: persona.clone(),
            })
            .collect();

        Ok(LawyerRecommendations {
            recommended,
            personas,
        })
    }
}

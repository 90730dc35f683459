//! SubmitRequest command handler.
//!
//! Validates the problem description, persists the request in `analyzing`
//! state and enqueues the analysis job. The caller gets the request id
//! back immediately; analysis happens on the worker queue.

use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::application::analysis::{AnalysisJob, AnalysisQueue};
use crate::domain::foundation::{DomainError, ErrorCode, RequestId};
use crate::domain::request::{EmergencyRequest, RequestOrigin, MIN_PROBLEM_CHARS};
use crate::ports::RequestRepository;

/// Command to submit a new legal problem.
#[derive(Debug, Clone)]
pub struct SubmitRequestCommand {
    /// Free-text problem description.
    pub problem_text: String,
    /// Technical metadata from the submitting client.
    pub origin: RequestOrigin,
}

/// Errors that can occur when submitting a request.
#[derive(Debug, Clone, Error)]
pub enum SubmitRequestError {
    /// Problem description is shorter than the minimum.
    #[error("problem description must be at least {MIN_PROBLEM_CHARS} characters")]
    TooShort,

    /// Repository error during persistence.
    #[error("repository error: {0}")]
    Repository(String),

    /// The analysis queue refused the job.
    #[error("analysis queue unavailable")]
    QueueUnavailable,
}

/// Result of a successful submission.
#[derive(Debug, Clone)]
pub struct SubmitRequestResult {
    pub request_id: RequestId,
}

/// Handler for SubmitRequest commands.
pub struct SubmitRequestHandler {
    requests: Arc<dyn RequestRepository>,
    queue: AnalysisQueue,
}

impl SubmitRequestHandler {
    /// Creates a new handler with the given dependencies.
    pub fn new(requests: Arc<dyn RequestRepository>, queue: AnalysisQueue) -> Self {
        Self { requests, queue }
    }

    /// Handles a submission.
    ///
    /// Rejections (short text) leave no state behind. On success the
    /// request is already in `analyzing` when the id is returned.
    pub async fn handle(
        &self,
        cmd: SubmitRequestCommand,
    ) -> Result<SubmitRequestResult, SubmitRequestError> {
        let mut request = EmergencyRequest::new(&cmd.problem_text, cmd.origin)
            .map_err(|_| SubmitRequestError::TooShort)?;
        request
            .start_analysis()
            .map_err(|e| SubmitRequestError::Repository(e.to_string()))?;

        self.requests.create(&request).await.map_err(map_repo_err)?;

        let job = AnalysisJob {
            request_id: request.id(),
            problem_text: request.problem_text().to_string(),
        };
        if self.queue.submit(job).is_err() {
            // The job will never run; record that on the request.
            let mut failed = request.clone();
            if failed.fail("analysis queue unavailable".to_string()).is_ok() {
                let _ = self.requests.update(&failed).await;
            }
            return Err(SubmitRequestError::QueueUnavailable);
        }

        info!(request_id = %request.id(), "request submitted for analysis");
        Ok(SubmitRequestResult {
            request_id: request.id(),
        })
    }
}

fn map_repo_err(err: DomainError) -> SubmitRequestError {
    debug_assert_ne!(err.code(), ErrorCode::ValidationFailed);
    SubmitRequestError::Repository(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockProvider;
    use crate::adapters::memory::InMemoryRequestRepository;
    use crate::application::analysis::AnalyzeRequestHandler;
    use crate::application::gateway::AiGateway;
    use crate::domain::foundation::AssistantRef;
    use crate::domain::request::RequestStatus;

    fn setup() -> (SubmitRequestHandler, Arc<InMemoryRequestRepository>) {
        let repo = Arc::new(InMemoryRequestRepository::new());
        let gateway = Arc::new(AiGateway::new(Arc::new(MockProvider::new())));
        let analyze = Arc::new(AnalyzeRequestHandler::new(
            repo.clone(),
            gateway,
            AssistantRef::new("fvt-analyzer"),
        ));
        let queue = AnalysisQueue::start(analyze, AnalysisQueue::DEFAULT_CAPACITY);
        (SubmitRequestHandler::new(repo.clone(), queue), repo)
    }

    #[tokio::test]
    async fn short_text_is_rejected_without_creating_state() {
        let (handler, repo) = setup();

        let result = handler
            .handle(SubmitRequestCommand {
                problem_text: "Уволили :(".to_string(),
                origin: RequestOrigin::default(),
            })
            .await;

        assert!(matches!(result, Err(SubmitRequestError::TooShort)));
        assert!(repo.is_empty().await);
    }

    #[tokio::test]
    async fn accepted_submission_starts_in_analyzing() {
        let (handler, repo) = setup();

        let result = handler
            .handle(SubmitRequestCommand {
                problem_text: "Попал в ДТП, виновник скрылся".to_string(),
                origin: RequestOrigin {
                    ip_address: Some("10.0.0.1".to_string()),
                    user_agent: Some("test-agent".to_string()),
                },
            })
            .await
            .unwrap();

        let stored = repo.find_by_id(result.request_id).await.unwrap().unwrap();
        // The worker may or may not have finished yet; the status is
        // analyzing or already terminal, never pending.
        assert_ne!(stored.status(), RequestStatus::Pending);
        assert_eq!(stored.origin().ip_address.as_deref(), Some("10.0.0.1"));
    }

    #[tokio::test]
    async fn accepted_submission_eventually_completes() {
        let (handler, repo) = setup();

        let result = handler
            .handle(SubmitRequestCommand {
                problem_text: "Попал в ДТП, виновник скрылся".to_string(),
                origin: RequestOrigin::default(),
            })
            .await
            .unwrap();

        let deadline = tokio::time::Instant::now() + std::time::Duration::from_secs(5);
        loop {
            let stored = repo.find_by_id(result.request_id).await.unwrap().unwrap();
            if stored.status().is_terminal() {
                assert_eq!(stored.status(), RequestStatus::Completed);
                assert!(stored.analyzed_at().unwrap() >= stored.created_at());
                break;
            }
            assert!(tokio::time::Instant::now() < deadline, "analysis never finished");
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
    }
}

//! Asynchronous request analysis.
//!
//! Submission enqueues a job on an explicit worker queue and returns
//! immediately; the worker runs each job at most once, with no retry. A
//! resubmission is always a fresh request.

use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{error, info};

use crate::application::gateway::{AiGateway, AnalysisReply};
use crate::domain::foundation::{AssistantRef, DomainError, RequestId};
use crate::ports::RequestRepository;

/// One unit of analysis work.
#[derive(Debug, Clone)]
pub struct AnalysisJob {
    pub request_id: RequestId,
    pub problem_text: String,
}

/// Errors from the analysis job itself.
///
/// Gateway failures are not listed here: they are soft and resolve the
/// request to completed with a placeholder summary.
#[derive(Debug, Clone, Error)]
pub enum AnalyzeError {
    /// The request row disappeared before the job ran.
    #[error("request {0} vanished before analysis")]
    RequestVanished(RequestId),

    /// Persistence failure while recording the outcome.
    #[error("repository error: {0}")]
    Repository(String),

    /// The aggregate rejected the outcome (already terminal).
    #[error("domain error: {0}")]
    Domain(String),
}

impl From<DomainError> for AnalyzeError {
    fn from(err: DomainError) -> Self {
        AnalyzeError::Repository(err.to_string())
    }
}

/// Runs the analysis of one request against the analyzer assistant.
pub struct AnalyzeRequestHandler {
    requests: Arc<dyn RequestRepository>,
    gateway: Arc<AiGateway>,
    analyzer: AssistantRef,
}

impl AnalyzeRequestHandler {
    /// Creates a new handler with the given dependencies.
    pub fn new(
        requests: Arc<dyn RequestRepository>,
        gateway: Arc<AiGateway>,
        analyzer: AssistantRef,
    ) -> Self {
        Self {
            requests,
            gateway,
            analyzer,
        }
    }

    /// Runs the analysis job for a request.
    ///
    /// Structured and plain-text replies complete the request; a gateway
    /// failure completes it with a placeholder summary. Only failures of
    /// the job itself (vanished row, broken store) mark the request failed.
    pub async fn run(&self, request_id: RequestId, problem_text: &str) -> Result<(), AnalyzeError> {
        let mut request = self
            .requests
            .find_by_id(request_id)
            .await?
            .ok_or(AnalyzeError::RequestVanished(request_id))?;
        let before_outcome = request.clone();

        let applied = match self.gateway.analyze(&self.analyzer, problem_text).await {
            Ok(AnalysisReply::Structured(analysis)) => request.complete_with_analysis(
                analysis.category,
                analysis.urgency,
                analysis.confidence,
                analysis.summary,
                analysis.payload,
            ),
            Ok(AnalysisReply::Text { raw, .. }) => request.complete_with_text(raw),
            Err(err) => request.complete_unresponsive(err.to_string()),
        };
        applied.map_err(|e| AnalyzeError::Domain(e.to_string()))?;

        if let Err(err) = self.requests.update(&request).await {
            // Best effort: record the store failure on the request itself.
            let mut failed = before_outcome;
            if failed.fail(err.to_string()).is_ok() {
                let _ = self.requests.update(&failed).await;
            }
            return Err(err.into());
        }

        info!(
            request_id = %request_id,
            status = request.status().as_str(),
            "analysis finished"
        );
        Ok(())
    }
}

/// Errors submitting work to the queue.
#[derive(Debug, Clone, Error)]
pub enum QueueError {
    /// The queue is full or its worker has stopped.
    #[error("analysis queue unavailable")]
    Unavailable,
}

/// Handle to the analysis worker queue.
///
/// Submission never blocks on AI latency; completion is observed by
/// polling the request's status.
#[derive(Clone)]
pub struct AnalysisQueue {
    tx: mpsc::Sender<AnalysisJob>,
}

impl AnalysisQueue {
    /// Default queue capacity.
    pub const DEFAULT_CAPACITY: usize = 64;

    /// Spawns the worker task and returns the submission handle.
    pub fn start(handler: Arc<AnalyzeRequestHandler>, capacity: usize) -> Self {
        let (tx, mut rx) = mpsc::channel::<AnalysisJob>(capacity);

        tokio::spawn(async move {
            while let Some(job) = rx.recv().await {
                let request_id = job.request_id;
                if let Err(err) = handler.run(request_id, &job.problem_text).await {
                    error!(request_id = %request_id, error = %err, "analysis job failed");
                }
            }
        });

        Self { tx }
    }

    /// Enqueues a job without blocking.
    pub fn submit(&self, job: AnalysisJob) -> Result<(), QueueError> {
        self.tx.try_send(job).map_err(|_| QueueError::Unavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockProvider;
    use crate::adapters::memory::InMemoryRequestRepository;
    use crate::domain::request::{
        EmergencyRequest, RequestOrigin, RequestStatus, ResponseFormat, Urgency,
        UNRESPONSIVE_SUMMARY,
    };
    use crate::ports::ProviderError;

    fn analyzer() -> AssistantRef {
        AssistantRef::new("fvt-analyzer")
    }

    async fn stored_request(repo: &InMemoryRequestRepository) -> EmergencyRequest {
        let mut request =
            EmergencyRequest::new("Попал в ДТП, виновник скрылся", RequestOrigin::default())
                .unwrap();
        request.start_analysis().unwrap();
        repo.create(&request).await.unwrap();
        request
    }

    fn handler(repo: Arc<InMemoryRequestRepository>, provider: MockProvider) -> AnalyzeRequestHandler {
        AnalyzeRequestHandler::new(
            repo,
            Arc::new(AiGateway::new(Arc::new(provider))),
            analyzer(),
        )
    }

    #[tokio::test]
    async fn structured_reply_completes_with_fields() {
        let repo = Arc::new(InMemoryRequestRepository::new());
        let request = stored_request(&repo).await;
        let reply = r#"{"analysis": {"category": "dtp", "urgency": "high", "confidence": 0.85, "summary": "ДТП со скрывшимся виновником"}}"#;
        let handler = handler(repo.clone(), MockProvider::new().with_reply(reply));

        handler.run(request.id(), request.problem_text()).await.unwrap();

        let stored = repo.find_by_id(request.id()).await.unwrap().unwrap();
        assert_eq!(stored.status(), RequestStatus::Completed);
        assert_eq!(stored.category(), Some("dtp"));
        assert_eq!(stored.urgency(), Some(Urgency::High));
        assert_eq!(stored.response_format(), ResponseFormat::Json);
        assert!(stored.analyzed_at().unwrap() >= stored.created_at());
    }

    #[tokio::test]
    async fn text_reply_completes_with_truncated_summary() {
        let repo = Arc::new(InMemoryRequestRepository::new());
        let request = stored_request(&repo).await;
        let handler = handler(
            repo.clone(),
            MockProvider::new().with_reply("Это сложный случай, рекомендую обратиться к юристу."),
        );

        handler.run(request.id(), request.problem_text()).await.unwrap();

        let stored = repo.find_by_id(request.id()).await.unwrap().unwrap();
        assert_eq!(stored.status(), RequestStatus::Completed);
        assert_eq!(stored.response_format(), ResponseFormat::Text);
        assert!(stored.summary().unwrap().starts_with("Это сложный случай"));
    }

    #[tokio::test]
    async fn gateway_failure_still_completes_the_request() {
        let repo = Arc::new(InMemoryRequestRepository::new());
        let request = stored_request(&repo).await;
        let handler = handler(
            repo.clone(),
            MockProvider::new().with_error(ProviderError::Timeout { timeout_secs: 60 }),
        );

        handler.run(request.id(), request.problem_text()).await.unwrap();

        let stored = repo.find_by_id(request.id()).await.unwrap().unwrap();
        assert_eq!(stored.status(), RequestStatus::Completed);
        assert_eq!(stored.summary(), Some(UNRESPONSIVE_SUMMARY));
        assert!(stored.ai_response().unwrap()["error"].is_string());
    }

    #[tokio::test]
    async fn vanished_request_is_a_job_error() {
        let repo = Arc::new(InMemoryRequestRepository::new());
        let handler = handler(repo, MockProvider::new());

        let result = handler.run(RequestId::new(), "какой-то текст").await;
        assert!(matches!(result, Err(AnalyzeError::RequestVanished(_))));
    }

    #[tokio::test]
    async fn queue_runs_jobs_to_completion() {
        let repo = Arc::new(InMemoryRequestRepository::new());
        let request = stored_request(&repo).await;
        let handler = Arc::new(handler(repo.clone(), MockProvider::new()));
        let queue = AnalysisQueue::start(handler, AnalysisQueue::DEFAULT_CAPACITY);

        queue
            .submit(AnalysisJob {
                request_id: request.id(),
                problem_text: request.problem_text().to_string(),
            })
            .unwrap();

        // Poll until the worker finishes the job.
        let deadline = tokio::time::Instant::now() + std::time::Duration::from_secs(5);
        loop {
            let stored = repo.find_by_id(request.id()).await.unwrap().unwrap();
            if stored.status().is_terminal() {
                assert_eq!(stored.status(), RequestStatus::Completed);
                break;
            }
            assert!(tokio::time::Instant::now() < deadline, "job never finished");
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
    }
}

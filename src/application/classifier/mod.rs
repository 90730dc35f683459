//! Specialization Classifier.
//!
//! Maps a free-text problem description to one of the closed set of legal
//! domain codes. Classification never fails the caller: an unusable model
//! reply degrades through a keyword heuristic to the configured fallback
//! specialization.

use std::sync::Arc;
use tracing::{debug, warn};

use crate::application::gateway::AiGateway;
use crate::domain::lawyer::Specialization;
use crate::ports::PromptTarget;

/// AI-first classifier with a keyword fallback.
pub struct SpecializationClassifier {
    gateway: Arc<AiGateway>,
    /// Model URI used for the classification prompt.
    model: String,
    /// Specialization used when nothing matches.
    fallback: Specialization,
}

impl SpecializationClassifier {
    /// Creates a classifier using the given model and fallback policy.
    pub fn new(gateway: Arc<AiGateway>, model: String, fallback: Specialization) -> Self {
        Self {
            gateway,
            model,
            fallback,
        }
    }

    /// Classifies a problem description.
    ///
    /// Resolution order: exact code token in the model reply, then Russian
    /// keyword heuristic over the reply, then the fallback specialization.
    /// Gateway errors also yield the fallback.
    pub async fn classify(&self, problem_text: &str) -> Specialization {
        let prompt = classification_prompt(problem_text);
        let target = PromptTarget::Model(self.model.clone());

        let reply = match self.gateway.single_turn(&target, &prompt).await {
            Ok(reply) => reply,
            Err(err) => {
                warn!(error = %err, "classification call failed, using fallback");
                return self.fallback;
            }
        };

        let code = interpret_reply(&reply).unwrap_or(self.fallback);
        debug!(code = %code, "classified problem");
        code
    }

    /// The configured fallback specialization.
    pub fn fallback(&self) -> Specialization {
        self.fallback
    }
}

/// Builds the classification prompt sent to the plain model.
fn classification_prompt(problem_text: &str) -> String {
    format!(
        "Проанализируй юридическую проблему и определи, к какой специализации она относится:\n\
         \n\
         Проблема: {}\n\
         \n\
         Доступные специализации:\n\
         1. 'auto' - ДТП, автострахование, транспортные происшествия\n\
         2. 'labor' - трудовые споры, увольнение, зарплата\n\
         3. 'family' - семейные дела, развод, алименты\n\
         4. 'civil' - все остальные гражданские дела\n\
         \n\
         Верни ТОЛЬКО один код специализации из списка выше ('auto', 'labor', 'family', 'civil').\n\
         Не добавляй никаких пояснений, только код.",
        problem_text
    )
}

/// Scans a model reply for a specialization.
fn interpret_reply(reply: &str) -> Option<Specialization> {
    let lower = reply.to_lowercase();

    for code in Specialization::ALL {
        if lower.contains(code.as_code()) {
            return Some(code);
        }
    }

    // The model answered in prose; look for domain keywords.
    if ["авто", "дтп", "машин"].iter().any(|kw| lower.contains(kw)) {
        return Some(Specialization::Auto);
    }
    if ["труд", "работа", "зарплат"].iter().any(|kw| lower.contains(kw)) {
        return Some(Specialization::Labor);
    }
    if ["семей", "развод", "брак"].iter().any(|kw| lower.contains(kw)) {
        return Some(Specialization::Family);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::ConversationSessionId;
    use crate::ports::{AiProvider, ProviderError};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct FixedProvider {
        reply: Mutex<Result<String, ProviderError>>,
    }

    impl FixedProvider {
        fn new(reply: Result<String, ProviderError>) -> Self {
            Self {
                reply: Mutex::new(reply),
            }
        }
    }

    #[async_trait]
    impl AiProvider for FixedProvider {
        async fn respond(
            &self,
            _target: &PromptTarget,
            _session: Option<&ConversationSessionId>,
            _input: &str,
        ) -> Result<String, ProviderError> {
            self.reply.lock().unwrap().clone()
        }

        async fn create_session(&self) -> Result<ConversationSessionId, ProviderError> {
            Err(ProviderError::Unavailable("not needed".to_string()))
        }
    }

    fn classifier(reply: Result<String, ProviderError>) -> SpecializationClassifier {
        let gateway = Arc::new(AiGateway::new(Arc::new(FixedProvider::new(reply))));
        SpecializationClassifier::new(
            gateway,
            "gpt://folder/yandexgpt".to_string(),
            Specialization::Civil,
        )
    }

    #[tokio::test]
    async fn exact_code_in_reply_wins() {
        let classifier = classifier(Ok("auto".to_string()));
        assert_eq!(classifier.classify("Попал в ДТП").await, Specialization::Auto);
    }

    #[tokio::test]
    async fn code_embedded_in_prose_is_found() {
        let classifier = classifier(Ok("Это дело относится к 'labor'.".to_string()));
        assert_eq!(classifier.classify("уволили").await, Specialization::Labor);
    }

    #[tokio::test]
    async fn keyword_heuristic_covers_prose_replies() {
        let classifier = classifier(Ok("Похоже на развод и раздел имущества".to_string()));
        assert_eq!(
            classifier.classify("жена подала на развод").await,
            Specialization::Family
        );
    }

    #[tokio::test]
    async fn auto_keywords_route_to_auto() {
        let classifier = classifier(Ok("Вопрос связан с ДТП".to_string()));
        assert_eq!(classifier.classify("авария").await, Specialization::Auto);
    }

    #[tokio::test]
    async fn unrecognized_reply_falls_back_to_civil() {
        let classifier = classifier(Ok("Затрудняюсь ответить".to_string()));
        assert_eq!(classifier.classify("странный вопрос").await, Specialization::Civil);
    }

    #[tokio::test]
    async fn gateway_error_falls_back_to_civil() {
        let classifier = classifier(Err(ProviderError::Timeout { timeout_secs: 60 }));
        assert_eq!(classifier.classify("любой текст").await, Specialization::Civil);
    }
}

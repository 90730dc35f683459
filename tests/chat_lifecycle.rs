//! End-to-end flow tests over the application core, wired with the
//! in-memory adapters and the mock AI provider.

use std::sync::Arc;
use std::time::Duration;

use lexy::adapters::ai::MockProvider;
use lexy::adapters::memory::{
    InMemoryChatRepository, InMemoryLawyerRepository, InMemoryRequestRepository,
};
use lexy::adapters::session_cache::InMemorySessionCache;
use lexy::application::analysis::{AnalysisQueue, AnalyzeRequestHandler};
use lexy::application::classifier::SpecializationClassifier;
use lexy::application::context::ConversationContextStore;
use lexy::application::gateway::AiGateway;
use lexy::application::handlers::chat::{
    CloseChatHandler, DebugContextHandler, ResetContextHandler, SendMessageCommand,
    SendMessageError, SendMessageHandler, StartChatCommand, StartChatHandler,
};
use lexy::application::handlers::lawyers::RecommendLawyersHandler;
use lexy::application::handlers::request::{
    GetRequestStatusHandler, SubmitRequestCommand, SubmitRequestError, SubmitRequestHandler,
};
use lexy::domain::chat::Sender;
use lexy::domain::foundation::{AssistantRef, ChatId, RequestId};
use lexy::domain::lawyer::{PersonaDirectory, Specialization};
use lexy::domain::request::{RequestOrigin, RequestStatus};
use lexy::ports::ChatRepository;

/// Full application core over in-memory infrastructure.
struct App {
    provider: MockProvider,
    requests: Arc<InMemoryRequestRepository>,
    chats: Arc<InMemoryChatRepository>,
    lawyers: Arc<InMemoryLawyerRepository>,
    context: Arc<ConversationContextStore>,
    submit: SubmitRequestHandler,
    status: GetRequestStatusHandler,
    recommend: RecommendLawyersHandler,
    start_chat: StartChatHandler,
    send_message: SendMessageHandler,
    close_chat: CloseChatHandler,
    reset_context: ResetContextHandler,
    debug_context: DebugContextHandler,
}

fn app(provider: MockProvider) -> App {
    let requests = Arc::new(InMemoryRequestRepository::new());
    let chats = Arc::new(InMemoryChatRepository::new());
    let lawyers = Arc::new(InMemoryLawyerRepository::new());

    let gateway = Arc::new(AiGateway::new(Arc::new(provider.clone())));
    let context = Arc::new(ConversationContextStore::new(
        Arc::new(InMemorySessionCache::new()),
        gateway.clone(),
    ));
    let directory = Arc::new(PersonaDirectory::builtin());
    let classifier = Arc::new(SpecializationClassifier::new(
        gateway.clone(),
        "gpt://folder/yandexgpt".to_string(),
        directory.fallback(),
    ));

    let analyze = Arc::new(AnalyzeRequestHandler::new(
        requests.clone(),
        gateway.clone(),
        AssistantRef::new("fvt-analyzer"),
    ));
    let queue = AnalysisQueue::start(analyze, AnalysisQueue::DEFAULT_CAPACITY);

    App {
        provider,
        requests: requests.clone(),
        chats: chats.clone(),
        lawyers: lawyers.clone(),
        context: context.clone(),
        submit: SubmitRequestHandler::new(requests.clone(), queue),
        status: GetRequestStatusHandler::new(requests.clone()),
        recommend: RecommendLawyersHandler::new(requests.clone(), classifier, directory.clone()),
        start_chat: StartChatHandler::new(
            requests,
            chats.clone(),
            lawyers.clone(),
            directory,
            context.clone(),
            gateway.clone(),
        ),
        send_message: SendMessageHandler::new(chats.clone(), lawyers, context.clone(), gateway),
        close_chat: CloseChatHandler::new(chats.clone(), context.clone()),
        reset_context: ResetContextHandler::new(chats.clone(), context.clone()),
        debug_context: DebugContextHandler::new(chats, context),
    }
}

async fn submit(app: &App, text: &str) -> RequestId {
    app.submit
        .handle(SubmitRequestCommand {
            problem_text: text.to_string(),
            origin: RequestOrigin::default(),
        })
        .await
        .unwrap()
        .request_id
}

async fn await_terminal(app: &App, request_id: RequestId) -> RequestStatus {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    loop {
        let snapshot = app.status.handle(request_id).await.unwrap();
        if snapshot.status.is_terminal() {
            return snapshot.status;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "analysis never reached a terminal state"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

async fn start_auto_chat(app: &App, request_id: RequestId) -> ChatId {
    app.start_chat
        .handle(StartChatCommand {
            request_id,
            persona_code: "auto".to_string(),
        })
        .await
        .unwrap()
        .chat_id
}

#[tokio::test]
async fn dtp_scenario_runs_to_completed_and_classifies_auto() {
    // Scripted: first call is the analysis, second the classification.
    let provider = MockProvider::new()
        .with_reply(r#"{"analysis": {"category": "dtp", "urgency": "high", "confidence": 0.9, "summary": "ДТП"}}"#)
        .with_reply("auto");
    let app = app(provider);

    let request_id = submit(&app, "Попал в ДТП, виновник скрылся").await;
    assert_eq!(await_terminal(&app, request_id).await, RequestStatus::Completed);

    let snapshot = app.status.handle(request_id).await.unwrap();
    assert!(snapshot.has_response);
    assert_eq!(snapshot.category.as_deref(), Some("dtp"));

    let recommendations = app.recommend.handle(request_id).await.unwrap();
    assert_eq!(recommendations.recommended, Specialization::Auto);
}

#[tokio::test]
async fn short_submission_creates_no_request() {
    let app = app(MockProvider::new());

    let result = app
        .submit
        .handle(SubmitRequestCommand {
            problem_text: "Мне плохо".to_string(),
            origin: RequestOrigin::default(),
        })
        .await;

    assert!(matches!(result, Err(SubmitRequestError::TooShort)));
    assert!(app.requests.is_empty().await);
}

#[tokio::test]
async fn chat_creation_is_idempotent_per_request_and_persona() {
    let app = app(MockProvider::new());
    let request_id = submit(&app, "Попал в ДТП, виновник скрылся").await;
    await_terminal(&app, request_id).await;

    let first = start_auto_chat(&app, request_id).await;
    let second = start_auto_chat(&app, request_id).await;

    assert_eq!(first, second);
    assert_eq!(app.chats.chat_count().await, 1);
    assert_eq!(app.lawyers.len().await, 1);
}

#[tokio::test]
async fn sending_messages_increments_counters_exactly() {
    let app = app(MockProvider::new());
    let request_id = submit(&app, "Попал в ДТП, виновник скрылся").await;
    await_terminal(&app, request_id).await;
    let chat_id = start_auto_chat(&app, request_id).await;

    let opening_count = app
        .chats
        .find_by_id(chat_id)
        .await
        .unwrap()
        .unwrap()
        .message_count();
    assert_eq!(opening_count, 3);

    for i in 0..4 {
        app.send_message
            .handle(SendMessageCommand {
                chat_id,
                text: format!("Дополнение номер {}", i),
            })
            .await
            .unwrap();
    }

    let chat = app.chats.find_by_id(chat_id).await.unwrap().unwrap();
    // Each turn appends a client message and a lawyer reply.
    assert_eq!(chat.message_count(), opening_count + 8);

    let messages = app.chats.messages(chat_id).await.unwrap();
    assert_eq!(chat.last_message_at(), Some(messages.last().unwrap().timestamp()));
    assert!(messages.windows(2).all(|w| w[0].timestamp() <= w[1].timestamp()));
}

#[tokio::test]
async fn empty_message_changes_nothing() {
    let app = app(MockProvider::new());
    let request_id = submit(&app, "Попал в ДТП, виновник скрылся").await;
    await_terminal(&app, request_id).await;
    let chat_id = start_auto_chat(&app, request_id).await;

    let before = app
        .chats
        .find_by_id(chat_id)
        .await
        .unwrap()
        .unwrap()
        .message_count();

    let result = app
        .send_message
        .handle(SendMessageCommand {
            chat_id,
            text: "   ".to_string(),
        })
        .await;

    assert!(matches!(result, Err(SendMessageError::EmptyMessage)));
    let after = app
        .chats
        .find_by_id(chat_id)
        .await
        .unwrap()
        .unwrap()
        .message_count();
    assert_eq!(before, after);
}

#[tokio::test]
async fn reset_context_forces_a_fresh_session_for_the_next_turn() {
    let app = app(MockProvider::new());
    let request_id = submit(&app, "Попал в ДТП, виновник скрылся").await;
    await_terminal(&app, request_id).await;
    let chat_id = start_auto_chat(&app, request_id).await;

    app.send_message
        .handle(SendMessageCommand {
            chat_id,
            text: "Первый вопрос".to_string(),
        })
        .await
        .unwrap();
    let session_before = app.provider.calls().last().unwrap().session.clone().unwrap();

    app.reset_context.handle(chat_id).await.unwrap();
    assert!(app.context.peek(chat_id).await.is_none());

    app.send_message
        .handle(SendMessageCommand {
            chat_id,
            text: "Второй вопрос".to_string(),
        })
        .await
        .unwrap();
    let session_after = app.provider.calls().last().unwrap().session.clone().unwrap();

    // The transcript keeps all turns, but the provider-side context is new.
    assert_ne!(session_before, session_after);
    let messages = app.chats.messages(chat_id).await.unwrap();
    assert!(messages.iter().any(|m| m.sender() == Sender::System
        && m.message().contains("сброшен")));
}

#[tokio::test]
async fn close_is_idempotent_and_ends_the_conversation() {
    let app = app(MockProvider::new());
    let request_id = submit(&app, "Попал в ДТП, виновник скрылся").await;
    await_terminal(&app, request_id).await;
    let chat_id = start_auto_chat(&app, request_id).await;

    app.close_chat.handle(chat_id).await.unwrap();
    app.close_chat.handle(chat_id).await.unwrap();

    assert!(app.context.peek(chat_id).await.is_none());
    let result = app
        .send_message
        .handle(SendMessageCommand {
            chat_id,
            text: "Ещё вопрос".to_string(),
        })
        .await;
    assert!(matches!(result, Err(SendMessageError::ChatClosed(_))));
}

#[tokio::test]
async fn debug_context_reports_without_side_effects() {
    let app = app(MockProvider::new());
    let request_id = submit(&app, "Попал в ДТП, виновник скрылся").await;
    await_terminal(&app, request_id).await;
    let chat_id = start_auto_chat(&app, request_id).await;

    let snapshot = app.debug_context.handle(chat_id).await.unwrap();
    assert_eq!(snapshot.message_count, 3);
    assert_eq!(snapshot.recent.len(), 3);
    // The chat-opening turn bound a session; peeking does not disturb it.
    assert!(snapshot.session.is_some());
    for preview in &snapshot.recent {
        assert!(preview.preview.chars().count() <= 50);
    }
}

#[tokio::test]
async fn gateway_outage_completes_analysis_with_placeholder() {
    let provider = MockProvider::new().failing();
    let app = app(provider);

    let request_id = submit(&app, "Попал в ДТП, виновник скрылся").await;
    assert_eq!(await_terminal(&app, request_id).await, RequestStatus::Completed);

    let snapshot = app.status.handle(request_id).await.unwrap();
    assert_eq!(snapshot.summary.as_deref(), Some("Ассистент не ответил"));
    assert!(snapshot.has_response);
}

#[tokio::test]
async fn structured_hello_reply_renders_verbatim() {
    let provider = MockProvider::new()
        // Analysis reply, then the chat-opening turn, then the message turn.
        .with_reply(r#"{"analysis": {"category": "other"}}"#)
        .with_reply(r#"{"message": "Здравствуйте!"}"#)
        .with_reply(r#"{"message": "Hello"}"#);
    let app = app(provider);

    let request_id = submit(&app, "Попал в ДТП, виновник скрылся").await;
    await_terminal(&app, request_id).await;
    let chat_id = start_auto_chat(&app, request_id).await;

    let reply = app
        .send_message
        .handle(SendMessageCommand {
            chat_id,
            text: "Приветствую".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(reply.message, "Hello");
}

//! LEXy server binary: configuration, wiring and the axum server loop.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use lexy::adapters::ai::{YandexConfig, YandexProvider};
use lexy::adapters::http::{api_router, ChatAppState, LawyersAppState, RequestAppState};
use lexy::adapters::postgres::{
    PostgresChatRepository, PostgresLawyerRepository, PostgresRequestRepository,
    PostgresReviewRepository,
};
use lexy::adapters::session_cache::RedisSessionCache;
use lexy::application::analysis::{AnalysisQueue, AnalyzeRequestHandler};
use lexy::application::classifier::SpecializationClassifier;
use lexy::application::context::ConversationContextStore;
use lexy::application::gateway::AiGateway;
use lexy::application::handlers::chat::{
    CloseChatHandler, DebugContextHandler, ListMessagesHandler, ResetContextHandler,
    SendMessageHandler, StartChatHandler,
};
use lexy::application::handlers::lawyers::{RecommendLawyersHandler, SubmitReviewHandler};
use lexy::application::handlers::request::{GetRequestStatusHandler, SubmitRequestHandler};
use lexy::config::AppConfig;
use lexy::ports::{ChatRepository, LawyerRepository, RequestRepository, ReviewRepository};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level)),
        )
        .init();

    info!(environment = ?config.server.environment, "starting lexy");

    // Persona directory: immutable, loaded once, passed explicitly.
    let directory = Arc::new(config.personas.load()?);

    // Postgres.
    let pool = PgPoolOptions::new()
        .min_connections(config.database.min_connections)
        .max_connections(config.database.max_connections)
        .acquire_timeout(config.database.acquire_timeout())
        .connect(&config.database.url)
        .await?;
    if config.database.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        info!("database migrations applied");
    }

    let requests: Arc<dyn RequestRepository> =
        Arc::new(PostgresRequestRepository::new(pool.clone()));
    let chats: Arc<dyn ChatRepository> = Arc::new(PostgresChatRepository::new(pool.clone()));
    let lawyers: Arc<dyn LawyerRepository> = Arc::new(PostgresLawyerRepository::new(pool.clone()));
    let reviews: Arc<dyn ReviewRepository> = Arc::new(PostgresReviewRepository::new(pool));

    // Redis session cache.
    let redis_client = redis::Client::open(config.redis.url.as_str())?;
    let redis_conn = redis_client.get_multiplexed_tokio_connection().await?;
    let session_cache = Arc::new(RedisSessionCache::new(redis_conn));

    // AI provider and the components over it.
    let provider = YandexProvider::new(
        YandexConfig::new(config.ai.api_key.clone(), config.ai.folder_id.clone())
            .with_base_url(config.ai.base_url.clone())
            .with_timeout(config.ai.timeout()),
    );
    let gateway = Arc::new(AiGateway::new(Arc::new(provider)));
    let context = Arc::new(ConversationContextStore::new(session_cache, gateway.clone()));
    let classifier = Arc::new(SpecializationClassifier::new(
        gateway.clone(),
        config.ai.model_uri(),
        directory.fallback(),
    ));

    // Analysis worker queue.
    let analyze = Arc::new(AnalyzeRequestHandler::new(
        requests.clone(),
        gateway.clone(),
        directory.analyzer().clone(),
    ));
    let queue = AnalysisQueue::start(analyze, AnalysisQueue::DEFAULT_CAPACITY);

    // HTTP state.
    let request_state = RequestAppState {
        submit: Arc::new(SubmitRequestHandler::new(requests.clone(), queue)),
        status: Arc::new(GetRequestStatusHandler::new(requests.clone())),
    };
    let chat_state = ChatAppState {
        start: Arc::new(StartChatHandler::new(
            requests.clone(),
            chats.clone(),
            lawyers.clone(),
            directory.clone(),
            context.clone(),
            gateway.clone(),
        )),
        send: Arc::new(SendMessageHandler::new(
            chats.clone(),
            lawyers.clone(),
            context.clone(),
            gateway.clone(),
        )),
        close: Arc::new(CloseChatHandler::new(chats.clone(), context.clone())),
        reset: Arc::new(ResetContextHandler::new(chats.clone(), context.clone())),
        debug: Arc::new(DebugContextHandler::new(chats.clone(), context.clone())),
        list: Arc::new(ListMessagesHandler::new(chats.clone())),
    };
    let lawyers_state = LawyersAppState {
        recommend: Arc::new(RecommendLawyersHandler::new(
            requests,
            classifier,
            directory.clone(),
        )),
        review: Arc::new(SubmitReviewHandler::new(lawyers.clone(), reviews)),
        lawyers,
        directory,
    };

    let app = api_router(request_state, chat_state, lawyers_state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.server.request_timeout_secs,
            )))
            .layer(cors_layer(&config)),
    );

    let addr = config.server.socket_addr();
    info!(%addr, "listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins = config.server.cors_origins_list();
    if origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = origins
            .iter()
            .filter_map(|o| o.parse::<http::HeaderValue>().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

//! Service entry point: configuration, storage, completion client, and the
//! HTTP transport are wired here.

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tower_http::trace::TraceLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use dialogue_router::adapters::ai::{HttpCompletionClient, HttpCompletionConfig};
use dialogue_router::adapters::escalation::TracingEscalationNotifier;
use dialogue_router::adapters::http::{chat_router, ChatAppState};
use dialogue_router::adapters::postgres::PostgresSessionStore;
use dialogue_router::agents::{
    config_fingerprint, EscalateTool, HandlerDeps, HandlerRegistry, ServiceCatalog, StageDetector,
};
use dialogue_router::application::Router as MessageRouter;
use dialogue_router::config::AppConfig;
use dialogue_router::ports::{EscalationNotifier, Tool};

#[tokio::main]
async fn main() {
    let config = AppConfig::load().expect("failed to load configuration");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.server.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    config.validate().expect("invalid configuration");
    tracing::info!("configuration loaded");

    let pool = PgPoolOptions::new()
        .min_connections(config.database.min_connections)
        .max_connections(config.database.max_connections)
        .acquire_timeout(config.database.acquire_timeout())
        .connect(&config.database.url)
        .await
        .expect("failed to connect to database");

    PostgresSessionStore::ensure_schema(&pool)
        .await
        .expect("failed to prepare session schema");
    let store = Arc::new(PostgresSessionStore::new(pool));

    let model_uri = config.ai.model_uri();
    let client_config = HttpCompletionConfig::new(
        config.ai.api_key.clone(),
        config.ai.project.clone(),
        config.ai.base_url.clone(),
        model_uri.clone(),
    )
    .with_timeout(config.ai.timeout())
    .with_max_output_tokens(config.ai.max_output_tokens)
    .with_temperature(config.ai.temperature);
    let client =
        Arc::new(HttpCompletionClient::new(client_config).expect("failed to build AI client"));

    let catalog = match &config.router.catalog_path {
        Some(path) => {
            Arc::new(ServiceCatalog::from_file(path).expect("failed to load service catalog"))
        }
        None => Arc::new(ServiceCatalog::default()),
    };

    let notifier: Arc<dyn EscalationNotifier> = Arc::new(TracingEscalationNotifier::new());

    let fingerprint = config_fingerprint(&config.ai.base_url, &model_uri, &config.ai.api_key);
    let registry = Arc::new(HandlerRegistry::new(
        fingerprint,
        HandlerDeps {
            client: client.clone(),
            notifier: notifier.clone(),
            catalog,
        },
    ));

    let escalate: Arc<dyn Tool> = Arc::new(EscalateTool::new(notifier));
    let detector = StageDetector::new(client, vec![escalate]);

    let policy = config.router.policy().expect("invalid routing policy");
    let router = Arc::new(MessageRouter::new(store, registry, detector, policy));

    let app = chat_router()
        .with_state(ChatAppState::new(router))
        .layer(TraceLayer::new_for_http());

    let addr = config.server.socket_addr().expect("invalid bind address");
    tracing::info!(%addr, "listening");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind");
    axum::serve(listener, app).await.expect("server error");
}

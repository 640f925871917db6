use crate::adapters::Adapters;
use crate::config::Config;
use crate::events::EventBus;
use crate::pipeline::PipelineOrchestrator;
use crate::status::StatusService;
use anyhow::{Context, Result};
use axum::{
    http::{header, Method, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use crosscast_db::pool::{init_pool, DbPool};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

pub mod routes_api;

/// Shared application context
#[derive(Clone)]
pub struct AppContext {
    pub pool: DbPool,
    pub orchestrator: Arc<PipelineOrchestrator>,
    pub status: Arc<StatusService>,
    pub events: EventBus,
    pub config: Arc<Config>,
}

impl AppContext {
    /// Wire up the full context from a config and an initialized pool.
    pub fn new(config: Config, pool: DbPool) -> Self {
        let adapters = Adapters::from_config(&config);
        Self::with_adapters(config, pool, adapters)
    }

    /// Wire up the context with a custom adapter set (tests use fakes).
    pub fn with_adapters(config: Config, pool: DbPool, adapters: Adapters) -> Self {
        let events = EventBus::new();
        let orchestrator = Arc::new(PipelineOrchestrator::new(
            pool.clone(),
            adapters,
            events.clone(),
            &config,
        ));
        let status = Arc::new(StatusService::new(pool.clone()));

        Self {
            pool,
            orchestrator,
            status,
            events,
            config: Arc::new(config),
        }
    }
}

/// Create the Axum router with all routes
pub fn create_router(ctx: AppContext) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    let media_dir = ctx.config.app.data_dir.join("media");

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", routes_api::api_routes())
        .nest_service("/media", ServeDir::new(media_dir))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

async fn health_check() -> impl IntoResponse {
    StatusCode::OK
}

/// Start the HTTP server
pub async fn start_server(config: Config) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    // Initialize database under the data directory
    std::fs::create_dir_all(&config.app.data_dir)
        .with_context(|| format!("Failed to create data dir {:?}", config.app.data_dir))?;
    let db_path = config.app.data_dir.join("crosscast.db");
    tracing::info!("Initializing database at {}", db_path.to_string_lossy());
    let pool = init_pool(&db_path.to_string_lossy())?;

    let ctx = AppContext::new(config, pool);
    let app = create_router(ctx);

    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => {}
            Err(e) => {
                tracing::error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

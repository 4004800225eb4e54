//! Verity realtime server
//!
//! HTTP analysis endpoint plus a websocket layer for live misinformation
//! monitoring: persistent connections, per-connection monitoring sessions,
//! heartbeat-driven liveness, and broadcast fan-out.

#![warn(missing_docs)]

pub mod config;
pub mod connection;
pub mod handlers;
pub mod monitor;
pub mod protocol;
pub mod registry;
pub mod service;

use config::ServerConfig;
use handlers::{create_router, AppState};
use monitor::SessionManager;
use service::BroadcastService;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{info, warn};
use verity_llm::GeminiClassifier;
use verity_pipeline::ClassificationPipeline;

/// Server error
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Server binding error
    #[error("Failed to bind server: {0}")]
    Bind(#[from] std::io::Error),

    /// Server error
    #[error("Server error: {0}")]
    Server(String),
}

/// Start the HTTP and websocket server
///
/// Builds the classification pipeline from configuration, spawns the
/// heartbeat loop, and serves until the process is stopped.
pub async fn start_server(config: ServerConfig) -> Result<(), ServerError> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    info!("Starting Verity server");
    info!("Bind address: {}", config.bind_addr());
    info!("Gemini model: {}", config.gemini.model);

    let api_key = if config.gemini.api_key.is_empty() {
        std::env::var("GEMINI_API_KEY").unwrap_or_default()
    } else {
        config.gemini.api_key.clone()
    };
    if api_key.is_empty() {
        warn!("No Gemini API key configured; every request will fall back to the heuristic classifier");
    }

    let provider = GeminiClassifier::new(
        &config.gemini.endpoint,
        &config.gemini.model,
        api_key,
        Duration::from_secs(config.gemini.timeout_secs),
    )
    .with_max_retries(config.gemini.max_retries);

    let pipeline = Arc::new(
        ClassificationPipeline::new(Arc::new(provider))
            .with_upstream_timeout(Duration::from_secs(config.gemini.timeout_secs)),
    );

    let sessions = SessionManager::new(
        Arc::clone(&pipeline),
        Duration::from_secs(config.realtime.monitor_cadence_secs),
    );
    let service = Arc::new(BroadcastService::new(
        sessions,
        Duration::from_secs(config.realtime.heartbeat_interval_secs),
        config.realtime.outbound_capacity,
    ));
    service.spawn_heartbeat();

    let state = AppState {
        service,
        pipeline,
    };
    let app = create_router(state);

    let listener = TcpListener::bind(&config.bind_addr()).await?;
    info!("Server listening on {}", config.bind_addr());

    axum::serve(listener, app)
        .await
        .map_err(|e| ServerError::Server(e.to_string()))?;

    Ok(())
}

//! HTTP and websocket handlers for the server.
//!
//! Implements the one-shot analysis endpoint, the health check, and the
//! websocket upgrade that hands persistent connections to the broadcast
//! service.

use crate::connection::Outbound;
use crate::service::BroadcastService;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router as AxumRouter,
};
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;
use verity_domain::{AnalysisDepth, ClassificationRequest, ClassificationResult, RequestError};
use verity_pipeline::ClassificationPipeline;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Broadcast service for persistent connections
    pub service: Arc<BroadcastService>,
    /// Classification pipeline for one-shot analysis
    pub pipeline: Arc<ClassificationPipeline>,
}

/// One-shot analysis request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    /// The content to classify
    pub content: String,
    /// Optional source URL for credibility context
    #[serde(default)]
    pub source_url: Option<String>,
    /// Analysis depth (defaults to quick)
    #[serde(default)]
    pub analysis_depth: AnalysisDepth,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    /// Overall health status
    pub status: String,
    /// Number of live persistent connections
    pub connections: usize,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    /// Invalid analysis request
    BadRequest(RequestError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(e) => (StatusCode::BAD_REQUEST, e.to_string()),
        };

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

impl From<RequestError> for AppError {
    fn from(e: RequestError) -> Self {
        AppError::BadRequest(e)
    }
}

/// POST /analyze - Classify one piece of content
async fn analyze(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<ClassificationResult>, AppError> {
    let request = ClassificationRequest::new(
        request.content,
        request.source_url,
        request.analysis_depth,
    )?;

    let result = state
        .pipeline
        .analyze(request.content(), request.source_url(), request.depth())
        .await;

    Ok(Json(result))
}

/// GET /health - Health check with connection count
async fn health_check(State(state): State<AppState>) -> Json<HealthCheckResponse> {
    let connections = state.service.registry().len().await;
    Json(HealthCheckResponse {
        status: "healthy".to_string(),
        connections,
    })
}

/// GET /ws - Upgrade to a persistent monitoring connection
async fn ws_upgrade(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| handle_socket(state.service, socket))
}

/// Drive one websocket connection for its whole lifetime.
///
/// A writer task drains the connection's outbound channel to the socket;
/// the read loop feeds inbound frames to the service. Either side ending
/// tears the connection down.
async fn handle_socket(service: Arc<BroadcastService>, socket: WebSocket) {
    let (mut sink, mut stream) = socket.split();
    let (tx, mut rx) = mpsc::channel::<Outbound>(service.outbound_capacity());
    let connection = service.connect(tx).await;
    let conn_id = connection.id();

    let writer = tokio::spawn(async move {
        while let Some(outbound) = rx.recv().await {
            let frame = match outbound {
                Outbound::Event(envelope) => match serde_json::to_string(&envelope) {
                    Ok(json) => Message::Text(json),
                    Err(e) => {
                        debug!(conn_id = %conn_id, "failed to serialize envelope: {e}");
                        continue;
                    }
                },
                Outbound::Probe => Message::Ping(Vec::new()),
            };
            if sink.send(frame).await.is_err() {
                break;
            }
        }
    });

    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Text(text)) => {
                service.handle_message(&connection, &text).await;
            }
            Ok(Message::Pong(_)) => {
                service.handle_probe_ack(conn_id).await;
            }
            Ok(Message::Ping(_)) => {
                // axum answers pings at the protocol level; nothing to do
            }
            Ok(Message::Close(_)) | Err(_) => break,
            Ok(Message::Binary(_)) => {
                debug!(conn_id = %conn_id, "ignoring binary frame");
            }
        }
    }

    service.disconnect(conn_id).await;
    writer.abort();
}

/// Create the axum router with all routes
pub fn create_router(state: AppState) -> AxumRouter {
    AxumRouter::new()
        .route("/analyze", post(analyze))
        .route("/health", get(health_check))
        .route("/ws", get(ws_upgrade))
        .with_state(state)
}

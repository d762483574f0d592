//! HTTP server for the metrics endpoint and the latest room export.

use crate::metrics::{MetricsRegistry, MetricsSnapshot};
use crate::room::RoomModel;
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;

/// Errors that can occur during metrics server operations.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind to address: {0}")]
    Bind(#[from] std::io::Error),

    #[error("server error: {0}")]
    Server(String),
}

/// Configuration for the metrics server.
#[derive(Debug, Clone)]
pub struct MetricsServerConfig {
    /// Address to bind the server to.
    pub bind_addr: SocketAddr,
}

impl Default for MetricsServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: ([127, 0, 0, 1], 9090).into(),
        }
    }
}

impl MetricsServerConfig {
    /// Default bind address on another port.
    pub fn with_port(port: u16) -> Self {
        Self {
            bind_addr: ([127, 0, 0, 1], port).into(),
        }
    }
}

/// Shared state behind the server's routes.
pub struct MetricsState {
    registry: MetricsRegistry,
    room: Option<RoomModel>,
}

impl MetricsState {
    /// Updates the metrics from a snapshot.
    pub fn update(&self, snapshot: &MetricsSnapshot) {
        self.registry.update(snapshot);
    }

    /// Publishes the room model served at `/room`.
    pub fn publish_room(&mut self, model: RoomModel) {
        self.room = Some(model);
    }
}

/// HTTP server exposing `/metrics`, `/health` and `/room`.
pub struct MetricsServer {
    config: MetricsServerConfig,
    state: Arc<RwLock<MetricsState>>,
}

impl MetricsServer {
    /// Creates a server exposing `registry`.
    pub fn new(config: MetricsServerConfig, registry: MetricsRegistry) -> Self {
        Self {
            config,
            state: Arc::new(RwLock::new(MetricsState {
                registry,
                room: None,
            })),
        }
    }

    /// Returns the shared state for updating metrics.
    pub fn state(&self) -> Arc<RwLock<MetricsState>> {
        Arc::clone(&self.state)
    }

    /// Builds the router; exposed so handlers can be driven without a socket.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/metrics", get(metrics_handler))
            .route("/health", get(health_handler))
            .route("/room", get(room_handler))
            .layer(CorsLayer::permissive())
            .with_state(Arc::clone(&self.state))
    }

    /// Runs the server until it is shut down.
    pub async fn run(self) -> Result<(), ServerError> {
        let app = self.router();
        let listener = tokio::net::TcpListener::bind(self.config.bind_addr).await?;

        tracing::info!(addr = %self.config.bind_addr, "Metrics server listening");

        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Server(e.to_string()))?;

        Ok(())
    }
}

async fn metrics_handler(State(state): State<Arc<RwLock<MetricsState>>>) -> impl IntoResponse {
    let state = state.read().await;

    match state.registry.encode() {
        Ok(output) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            output,
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            [("content-type", "text/plain; charset=utf-8")],
            format!("Failed to encode metrics: {}", e),
        ),
    }
}

async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

async fn room_handler(State(state): State<Arc<RwLock<MetricsState>>>) -> impl IntoResponse {
    let state = state.read().await;

    match state.room.as_ref().map(RoomModel::to_json) {
        Some(Ok(json)) => (StatusCode::OK, [("content-type", "application/json")], json),
        Some(Err(e)) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            [("content-type", "text/plain; charset=utf-8")],
            format!("Failed to export room: {}", e),
        ),
        None => (
            StatusCode::NOT_FOUND,
            [("content-type", "text/plain; charset=utf-8")],
            "No room model yet".to_string(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::room::RoomAssembler;

    #[test]
    fn test_config_default() {
        let config = MetricsServerConfig::default();
        assert_eq!(config.bind_addr.port(), 9090);
    }

    #[test]
    fn test_config_with_port() {
        let config = MetricsServerConfig::with_port(8080);
        assert_eq!(config.bind_addr.port(), 8080);
    }

    #[tokio::test]
    async fn test_room_handler() {
        let server = MetricsServer::new(MetricsServerConfig::default(), MetricsRegistry::new().unwrap());

        let missing = room_handler(State(server.state())).await.into_response();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);

        let mut assembler = RoomAssembler::default();
        assembler.capture_wall(Vec::new(), None);
        assembler.capture_wall(Vec::new(), None);
        server
            .state()
            .write()
            .await
            .publish_room(assembler.model().unwrap().clone());

        let found = room_handler(State(server.state())).await.into_response();
        assert_eq!(found.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_metrics_handler() {
        let server = MetricsServer::new(MetricsServerConfig::default(), MetricsRegistry::new().unwrap());
        let response = metrics_handler(State(server.state())).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }
}

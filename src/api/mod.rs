//! HTTP API: one upload endpoint in front of [`crate::Pipeline`].
//!
//! | Route | Method | Handler |
//! |-------|--------|---------|
//! | `/` | GET | liveness message |
//! | `/process-pdf` | POST | multipart field `pdf` → [`crate::FinalRecord`] |
//!
//! Every [`crate::SptError`] maps to exactly one status and JSON body (see
//! [`error`]); panics inside a handler become the generic 500 body.

pub mod error;
pub mod handlers;

use crate::process::Pipeline;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// State shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
}

impl AppState {
    pub fn new(pipeline: Pipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }
}

/// Listener and request-size settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Bind address. Default: `0.0.0.0`.
    pub host: String,
    /// Bind port. Default: 8000.
    pub port: u16,
    /// Largest accepted request body in bytes. Default: 16 MiB.
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            max_upload_bytes: 16 * 1024 * 1024,
        }
    }
}

impl ServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Build the API router with all endpoints.
pub fn build_router(state: AppState, config: &ServerConfig) -> Router {
    Router::new()
        .route("/", get(handlers::home))
        .route("/process-pdf", post(handlers::process_pdf))
        // Middleware
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(CatchPanicLayer::custom(error::panic_response))
        .with_state(state)
}

/// Serve until Ctrl-C.
pub async fn start_server(config: &ServerConfig, state: AppState) -> std::io::Result<()> {
    let addr: SocketAddr = config
        .addr()
        .parse()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
    let app = build_router(state, config);
    let listener = TcpListener::bind(addr).await?;
    info!("SPT Processing API listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Shutdown signal received");
            }
        })
        .await
}

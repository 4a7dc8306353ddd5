//! HTTP transport
//!
//! Thin axum layer over the processing modules: multipart parsing, per-request
//! upload staging, and translation of errors into JSON responses.

pub mod error;
pub mod form;
pub mod handlers;

pub use error::{ApiError, ErrorResponse};

use crate::{
    config::ServerConfig,
    error::{ImgToolsError, Result},
    pdf::PdfAssembler,
    processor::BackgroundEditor,
    removal::BackgroundRemover,
};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::path::Path;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Shared state handed to every handler
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub editor: BackgroundEditor,
    pub assembler: PdfAssembler,
}

impl AppState {
    pub fn new(config: ServerConfig, remover: Arc<dyn BackgroundRemover>) -> Self {
        Self {
            config: Arc::new(config),
            editor: BackgroundEditor::new(remover),
            assembler: PdfAssembler::default(),
        }
    }

    pub(crate) fn upload_dir(&self) -> Option<&Path> {
        self.config.upload_dir.as_deref()
    }
}

/// Build the application router
pub fn app(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/api/convert", post(handlers::convert))
        .route("/api/image-bg/remove", post(handlers::remove_background))
        .route("/api/crop", post(handlers::crop))
        .route("/api/health", get(handlers::health))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until Ctrl-C
///
/// # Errors
/// - Invalid configuration
/// - Failure to bind or serve on the configured address
pub async fn serve(config: ServerConfig, remover: Arc<dyn BackgroundRemover>) -> Result<()> {
    config.validate()?;
    let addr = config.bind_addr;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ImgToolsError::internal(format!("Failed to bind {}: {}", addr, e)))?;
    tracing::info!(
        %addr,
        remover = remover.name(),
        max_upload_bytes = config.max_upload_bytes,
        "imgtools server listening"
    );

    axum::serve(listener, app(AppState::new(config, remover)))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ImgToolsError::internal(format!("Server error: {}", e)))?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

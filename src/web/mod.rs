// HTTP surface for the agent
// Serves the embedded page plus the chat/execute/processes API

mod handlers;

use anyhow::{Context, Result};
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::ollama::OllamaClient;

/// Shared state for the web handlers.
pub struct AppState {
    pub client: OllamaClient,
    pub model: String,
}

/// Build the application router. Split out so tests can drive it without
/// binding a socket.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/chat", post(handlers::chat))
        .route("/api/execute", post(handlers::execute))
        .route("/api/processes", get(handlers::processes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind and serve until the process ends.
pub async fn serve(bind_address: &str, state: AppState) -> Result<()> {
    let app = create_router(Arc::new(state));
    let listener = tokio::net::TcpListener::bind(bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;

    info!("Web interface listening on http://{}", bind_address);
    axum::serve(listener, app).await.context("Web server stopped")?;
    Ok(())
}

// Request handlers for the web surface

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::AppState;
use crate::cli::system_prompt;
use crate::ollama::ChatMessage;
use crate::platform::{self, CommandOutput, ProcessInfo};

#[derive(Debug, Deserialize)]
pub struct ChatBody {
    pub message: String,
    #[serde(default)]
    pub history: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
pub struct ChatReply {
    pub response: String,
}

#[derive(Debug, Deserialize)]
pub struct ExecuteBody {
    pub command: String,
}

/// The embedded single-page UI.
pub async fn index() -> Html<&'static str> {
    Html(include_str!("static/index.html"))
}

/// POST /api/chat: prior turns plus a new message in, assistant reply out.
pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ChatBody>,
) -> Result<Json<ChatReply>, (StatusCode, String)> {
    let mut messages = Vec::with_capacity(body.history.len() + 2);
    messages.push(ChatMessage::system(system_prompt()));
    messages.extend(body.history);
    messages.push(ChatMessage::user(body.message));

    match state.client.chat(&state.model, &messages).await {
        Ok(response) => Ok(Json(ChatReply { response })),
        Err(err) => Err((StatusCode::BAD_GATEWAY, err.to_string())),
    }
}

/// POST /api/execute: run one shell command, return all three streams.
pub async fn execute(Json(body): Json<ExecuteBody>) -> Json<CommandOutput> {
    Json(platform::execute_command(&body.command).await)
}

/// GET /api/processes: the current process table.
pub async fn processes() -> Json<Vec<ProcessInfo>> {
    let list = tokio::task::spawn_blocking(platform::list_processes)
        .await
        .unwrap_or_default();
    Json(list)
}

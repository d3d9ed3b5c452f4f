// HTTP client for the local Ollama API

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::error::SetupError;
use crate::config::constants::HTTP_TIMEOUT_SECS;

/// One chat turn in the Ollama wire shape.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    models: Vec<ModelEntry>,
}

#[derive(Debug, Deserialize)]
struct ModelEntry {
    name: String,
}

/// Client for one Ollama server.
///
/// Construction doubles as the capability check for the whole pipeline: a URL
/// that does not parse, or an HTTP stack that cannot be built, fails here
/// before any install work starts.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: Client,
    base_url: String,
}

impl OllamaClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, SetupError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();

        reqwest::Url::parse(&base_url).map_err(|e| SetupError::InvalidUrl {
            url: base_url.clone(),
            reason: e.to_string(),
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()
            .map_err(SetupError::ClientBuild)?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// List the installed models via `/api/tags`.
    ///
    /// This is also the liveness probe: a reachable server with a parseable
    /// body counts as ready.
    pub async fn list_models(&self) -> Result<Vec<String>, SetupError> {
        let url = format!("{}/api/tags", self.base_url);
        let response = self.client.get(&url).send().await.map_err(|e| {
            if e.is_connect() {
                SetupError::ServerUnreachable(self.base_url.clone())
            } else {
                SetupError::Http(e)
            }
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(SetupError::Api(format!("{}: {}", status, text)));
        }

        let tags: TagsResponse = response
            .json()
            .await
            .map_err(|e| SetupError::InvalidResponse(e.to_string()))?;

        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    /// Send a full conversation and return the assistant's reply.
    pub async fn chat(
        &self,
        model: &str,
        messages: &[ChatMessage],
    ) -> Result<String, SetupError> {
        let url = format!("{}/api/chat", self.base_url);
        debug!("POST {} ({} messages)", url, messages.len());

        let request = ChatRequest {
            model,
            messages,
            stream: false,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    SetupError::ServerUnreachable(self.base_url.clone())
                } else {
                    SetupError::Http(e)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(SetupError::Api(format!("{}: {}", status, text)));
        }

        let reply: ChatResponse = response
            .json()
            .await
            .map_err(|e| SetupError::InvalidResponse(e.to_string()))?;

        Ok(reply.message.content)
    }
}

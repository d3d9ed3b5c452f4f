// Configuration structs

use serde::Deserialize;

use super::constants::{DEFAULT_MODEL, DEFAULT_OLLAMA_URL};

/// Runtime options the agent consumes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Config {
    /// Ollama model the agent talks to.
    #[serde(default = "default_model")]
    pub model: String,

    /// Explicit Ollama server URL; `None` means the local default.
    #[serde(default)]
    pub server_url: Option<String>,
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: default_model(),
            server_url: None,
        }
    }
}

impl Config {
    /// Effective server URL after applying the default.
    pub fn ollama_url(&self) -> String {
        self.server_url
            .clone()
            .unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string())
    }
}

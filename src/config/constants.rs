// Project-wide constants
//
// Centralised here so model names, URLs and delays have one source of truth.

use std::time::Duration;

/// Model used when neither config, environment nor flags name one.
pub const DEFAULT_MODEL: &str = "llama3";

/// Where a locally installed Ollama server listens by default.
pub const DEFAULT_OLLAMA_URL: &str = "http://127.0.0.1:11434";

/// Default bind address for the web interface (localhost only).
pub const DEFAULT_HTTP_ADDR: &str = "127.0.0.1:8000";

/// How long a freshly launched Ollama server gets to come up before the
/// one retry probe.
pub const SERVER_SETTLE_DELAY: Duration = Duration::from_secs(5);

/// Overall timeout for Ollama API calls. Generous because chat completions
/// on small machines are slow.
pub const HTTP_TIMEOUT_SECS: u64 = 120;

/// Environment override for the model name.
pub const ENV_MODEL: &str = "ENTITY_LLM_MODEL";

/// Environment override for the Ollama server URL.
pub const ENV_SERVER_URL: &str = "ENTITY_OLLAMA_URL";

/// Config file checked first, relative to the working directory.
pub const LOCAL_CONFIG_FILE: &str = "entity.toml";

/// Per-user config directory under the home directory.
pub const HOME_CONFIG_DIR: &str = ".entity";

/// Config file name inside the per-user directory.
pub const HOME_CONFIG_FILE: &str = "config.toml";

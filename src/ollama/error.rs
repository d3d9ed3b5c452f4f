// Error taxonomy for the Ollama bootstrap pipeline

use thiserror::Error;

/// Everything that can go wrong while bringing the local runtime up.
///
/// Expected absence (no CLI on disk, model not pulled yet) is never an
/// error — those are sentinel values at the call sites. These variants are
/// the genuinely fatal outcomes.
#[derive(Debug, Error)]
pub enum SetupError {
    /// The process could not be started at all.
    #[error("Failed to run {command}: {source}")]
    CommandInvocation {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The process ran and exited non-zero under a checked run.
    #[error("Command '{command}' failed with exit code {status}:\n{output}")]
    CommandExit {
        command: String,
        status: i32,
        output: String,
    },

    /// The server still failed its probe after one restart attempt.
    #[error("Ollama server did not become ready: {detail}. Start it manually with: ollama serve")]
    ReadinessTimeout { detail: String },

    /// Neither locating nor installing produced a usable executable.
    #[error("Ollama CLI not found. {instructions}")]
    CliMissing { instructions: String },

    /// The configured server URL does not parse.
    #[error("Invalid Ollama server URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(reqwest::Error),

    /// The server did not accept a connection.
    #[error("Ollama server not reachable at {0}. Start it with: ollama serve")]
    ServerUnreachable(String),

    /// HTTP failure past the connect phase.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("Ollama API error: {0}")]
    Api(String),

    /// The response body did not match the expected shape.
    #[error("Invalid response from Ollama: {0}")]
    InvalidResponse(String),

    /// Filesystem trouble while placing the runtime on disk.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

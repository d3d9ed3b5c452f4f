// External command execution for the Ollama CLI

use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

use super::error::SetupError;

/// Captured output of a finished process.
#[derive(Debug, Clone)]
pub struct CommandResult {
    pub status: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandResult {
    /// The stream worth showing when the command failed: stderr when it has
    /// anything, stdout otherwise.
    pub fn failure_output(&self) -> &str {
        if self.stderr.is_empty() {
            &self.stdout
        } else {
            &self.stderr
        }
    }
}

/// Seam for running CLI subcommands, so tests can script outcomes and count
/// invocations.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `argv` to completion, capturing both streams as text.
    ///
    /// With `check` a non-zero exit becomes `SetupError::CommandExit`; without
    /// it the result comes back unconditionally. A process that cannot be
    /// spawned is fatal either way.
    async fn run(&self, argv: &[&str], check: bool) -> Result<CommandResult, SetupError>;

    /// Start `argv` detached: stdio nulled, nothing ever waits on the child.
    fn spawn_detached(&self, argv: &[&str]) -> Result<(), SetupError>;
}

/// Production runner backed by the host process table.
pub struct SystemRunner;

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(&self, argv: &[&str], check: bool) -> Result<CommandResult, SetupError> {
        let command = argv.join(" ");
        debug!("Running: {}", command);

        let output = Command::new(argv[0])
            .args(&argv[1..])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| SetupError::CommandInvocation {
                command: command.clone(),
                source: e,
            })?;

        let result = CommandResult {
            status: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        if check && result.status != 0 {
            return Err(SetupError::CommandExit {
                command,
                status: result.status,
                output: result.failure_output().to_string(),
            });
        }

        Ok(result)
    }

    fn spawn_detached(&self, argv: &[&str]) -> Result<(), SetupError> {
        let command = argv.join(" ");
        debug!("Spawning detached: {}", command);

        // The child handle is dropped on purpose: the server is meant to
        // outlive this process and nothing ever waits on it.
        std::process::Command::new(argv[0])
            .args(&argv[1..])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| SetupError::CommandInvocation { command, source: e })?;

        Ok(())
    }
}

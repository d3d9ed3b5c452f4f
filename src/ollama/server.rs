// Keeping the background Ollama server alive

use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info};

use super::client::OllamaClient;
use super::command::CommandRunner;
use super::error::SetupError;
use crate::config::constants::SERVER_SETTLE_DELAY;

/// Readiness progression for one supervisor invocation.
///
/// The machine walks Unknown → Probing, then either straight to Ready or
/// through Starting → ProbingAfterStart. A second failed probe lands in
/// Failed. There is no loop back: at most one launch per invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeState {
    Unknown,
    Probing,
    Starting,
    ProbingAfterStart,
    Ready,
    Failed,
}

/// Liveness source for the supervisor.
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self) -> Result<(), SetupError>;
}

#[async_trait]
impl Prober for OllamaClient {
    async fn probe(&self) -> Result<(), SetupError> {
        self.list_models().await.map(|_| ())
    }
}

/// What the supervisor drives: one probe, one way to launch the server.
#[async_trait]
pub trait ServerBackend: Send + Sync {
    async fn probe(&self) -> Result<(), SetupError>;

    /// Start the server detached; must not block on the child.
    fn launch(&self) -> Result<(), SetupError>;
}

/// Production backend: probe over HTTP, launch through the CLI.
pub struct ProcessBackend<'a> {
    prober: &'a dyn Prober,
    runner: &'a dyn CommandRunner,
    executable: &'a Path,
    model: &'a str,
}

impl<'a> ProcessBackend<'a> {
    pub fn new(
        prober: &'a dyn Prober,
        runner: &'a dyn CommandRunner,
        executable: &'a Path,
        model: &'a str,
    ) -> Self {
        Self {
            prober,
            runner,
            executable,
            model,
        }
    }
}

#[async_trait]
impl ServerBackend for ProcessBackend<'_> {
    async fn probe(&self) -> Result<(), SetupError> {
        self.prober.probe().await
    }

    fn launch(&self) -> Result<(), SetupError> {
        let exe = self.executable.to_string_lossy();
        self.runner
            .spawn_detached(&[exe.as_ref(), "run", self.model])
    }
}

/// Probes the server and restarts it at most once per invocation.
pub struct ServerSupervisor {
    settle_delay: Duration,
}

impl ServerSupervisor {
    pub fn new() -> Self {
        Self {
            settle_delay: SERVER_SETTLE_DELAY,
        }
    }

    /// Wait this long after launching before the retry probe.
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Drive the probe/launch/re-probe machine to Ready or Failed.
    pub async fn ensure(&self, backend: &dyn ServerBackend) -> Result<(), SetupError> {
        let mut state = ProbeState::Unknown;
        let mut last_error: Option<SetupError> = None;

        loop {
            match state {
                ProbeState::Unknown => state = ProbeState::Probing,
                ProbeState::Probing => match backend.probe().await {
                    Ok(()) => state = ProbeState::Ready,
                    Err(err) => {
                        info!("Ollama server not responding ({}), starting it", err);
                        state = ProbeState::Starting;
                    }
                },
                ProbeState::Starting => {
                    backend.launch()?;
                    debug!(
                        "Server launched, settling for {:?} before the retry probe",
                        self.settle_delay
                    );
                    sleep(self.settle_delay).await;
                    state = ProbeState::ProbingAfterStart;
                }
                ProbeState::ProbingAfterStart => match backend.probe().await {
                    Ok(()) => state = ProbeState::Ready,
                    Err(err) => {
                        last_error = Some(err);
                        state = ProbeState::Failed;
                    }
                },
                ProbeState::Ready => {
                    debug!("Ollama server is ready");
                    return Ok(());
                }
                ProbeState::Failed => {
                    let detail = last_error
                        .take()
                        .map(|e| e.to_string())
                        .unwrap_or_else(|| "probe failed".to_string());
                    return Err(SetupError::ReadinessTimeout { detail });
                }
            }
        }
    }
}

impl Default for ServerSupervisor {
    fn default() -> Self {
        Self::new()
    }
}

// Readiness orchestration: one call that makes the runtime usable

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use super::client::OllamaClient;
use super::command::{CommandRunner, SystemRunner};
use super::error::SetupError;
use super::install::{InstallOutcome, Installer, PlatformInstaller};
use super::locate::{Platform, RuntimeLocator, RuntimeTarget};
use super::model::ModelEnsurer;
use super::server::{Prober, ProcessBackend, ServerSupervisor};
use crate::config::Config;

/// Resolved runtime after a successful bootstrap.
#[derive(Debug, Clone)]
pub struct CliHandle {
    pub executable: PathBuf,
    pub model: String,
}

/// Linear bootstrap pipeline: locate (install on miss), verify the CLI,
/// ensure the model, ensure the server.
///
/// Every stage re-checks reality on each call and nothing is cached across
/// instances, so a second `ensure_ready` with everything in place reduces to
/// pure checks. Failures short-circuit; there is no partial recovery across
/// stages.
pub struct ReadinessOrchestrator {
    runner: Arc<dyn CommandRunner>,
    installer: Arc<dyn Installer>,
    prober: Arc<dyn Prober>,
    locator: RuntimeLocator,
    supervisor: ServerSupervisor,
    model: String,
}

impl ReadinessOrchestrator {
    /// Wire the production pipeline for this config.
    ///
    /// Building the HTTP client here is the capability check: a server URL
    /// that does not parse fails before any install work starts.
    pub fn new(config: &Config) -> Result<Self, SetupError> {
        let client = OllamaClient::new(config.ollama_url())?;
        let target = RuntimeTarget::for_platform(Platform::detect());
        let runner: Arc<dyn CommandRunner> = Arc::new(SystemRunner);
        let installer = PlatformInstaller::new(target.clone(), Arc::clone(&runner))?;

        Ok(Self {
            runner,
            installer: Arc::new(installer),
            prober: Arc::new(client),
            locator: RuntimeLocator::new(target),
            supervisor: ServerSupervisor::new(),
            model: config.model.clone(),
        })
    }

    pub fn with_runner(mut self, runner: Arc<dyn CommandRunner>) -> Self {
        self.runner = runner;
        self
    }

    pub fn with_installer(mut self, installer: Arc<dyn Installer>) -> Self {
        self.installer = installer;
        self
    }

    pub fn with_prober(mut self, prober: Arc<dyn Prober>) -> Self {
        self.prober = prober;
        self
    }

    pub fn with_locator(mut self, locator: RuntimeLocator) -> Self {
        self.locator = locator;
        self
    }

    pub fn with_supervisor(mut self, supervisor: ServerSupervisor) -> Self {
        self.supervisor = supervisor;
        self
    }

    /// Locate or install the CLI and verify it answers `--version`.
    pub async fn ensure_cli_installed(&self) -> Result<PathBuf, SetupError> {
        let executable = self.ensure_cli_present().await?;
        self.verify(&executable).await?;
        Ok(executable)
    }

    /// The full pipeline. Returns the resolved CLI handle once the model is
    /// present and the server answers.
    pub async fn ensure_ready(&self) -> Result<CliHandle, SetupError> {
        let executable = self.ensure_cli_installed().await?;

        ModelEnsurer::new(self.runner.as_ref())
            .ensure(&executable, &self.model)
            .await?;

        let backend = ProcessBackend::new(
            self.prober.as_ref(),
            self.runner.as_ref(),
            &executable,
            &self.model,
        );
        self.supervisor.ensure(&backend).await?;

        info!(
            "Ollama ready: {} serving {}",
            executable.display(),
            self.model
        );
        Ok(CliHandle {
            executable,
            model: self.model.clone(),
        })
    }

    async fn ensure_cli_present(&self) -> Result<PathBuf, SetupError> {
        if let Some(path) = self.locator.locate() {
            return Ok(path);
        }

        info!("Ollama CLI not found, attempting unattended install");
        match self.installer.install().await {
            InstallOutcome::Installed(path) => Ok(path),
            InstallOutcome::NotFound => Err(self.cli_missing()),
            InstallOutcome::Failed(reason) => {
                warn!("Ollama install attempt failed: {}", reason);
                Err(self.cli_missing())
            }
        }
    }

    async fn verify(&self, executable: &Path) -> Result<(), SetupError> {
        let exe = executable.to_string_lossy();
        self.runner.run(&[exe.as_ref(), "--version"], true).await?;
        Ok(())
    }

    fn cli_missing(&self) -> SetupError {
        SetupError::CliMissing {
            instructions: self.locator.target().install_instructions(),
        }
    }
}

/// One-call bootstrap with the production wiring.
pub async fn ensure_ready(config: &Config) -> Result<CliHandle, SetupError> {
    ReadinessOrchestrator::new(config)?.ensure_ready().await
}

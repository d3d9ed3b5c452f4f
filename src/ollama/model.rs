// Making sure the configured model artifact is present locally

use std::path::Path;
use tracing::{debug, info};

use super::command::CommandRunner;
use super::error::SetupError;

/// Checks the local model listing and pulls the model when it is absent.
pub struct ModelEnsurer<'a> {
    runner: &'a dyn CommandRunner,
}

impl<'a> ModelEnsurer<'a> {
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        Self { runner }
    }

    /// `ollama list`, then `ollama pull <model>` when the name is missing.
    ///
    /// The listing runs unchecked — a broken `list` just means we pull. The
    /// pull itself is fatal on failure and blocks until the download ends;
    /// no time bound is applied here.
    pub async fn ensure(&self, executable: &Path, model: &str) -> Result<(), SetupError> {
        let exe = executable.to_string_lossy();

        let listing = self.runner.run(&[exe.as_ref(), "list"], false).await?;
        if listing.stdout.contains(model) {
            debug!("Model {} already present", model);
            return Ok(());
        }

        info!("Pulling model {} (this can take a while)", model);
        self.runner.run(&[exe.as_ref(), "pull", model], true).await?;
        Ok(())
    }
}

// Unattended per-platform installation of the Ollama CLI

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

use super::command::CommandRunner;
use super::error::SetupError;
use super::locate::{find_in_search_path, Platform, RuntimeLocator, RuntimeTarget};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// What an installation attempt produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    /// The executable is in place at this path.
    Installed(PathBuf),
    /// No unattended install exists for this platform or its prerequisites.
    NotFound,
    /// An attempt was made and went wrong; the reason is for the logs.
    Failed(String),
}

/// Seam for the install step, so orchestrator tests can count attempts.
#[async_trait]
pub trait Installer: Send + Sync {
    async fn install(&self) -> InstallOutcome;
}

/// Production installer: release tarball on Linux, Homebrew on macOS,
/// nothing anywhere else. All side effects of the pipeline live here.
pub struct PlatformInstaller {
    target: RuntimeTarget,
    runner: Arc<dyn CommandRunner>,
    http: reqwest::Client,
    install_dir: PathBuf,
    search_path: Option<String>,
    archive_url_override: Option<String>,
}

impl PlatformInstaller {
    pub fn new(
        target: RuntimeTarget,
        runner: Arc<dyn CommandRunner>,
    ) -> Result<Self, SetupError> {
        // No overall timeout: the archive is large and download time varies
        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(SetupError::ClientBuild)?;

        let install_dir = target
            .default_install_dirs
            .first()
            .cloned()
            .unwrap_or_else(|| PathBuf::from("/usr/local/bin"));

        Ok(Self {
            target,
            runner,
            http,
            install_dir,
            search_path: None,
            archive_url_override: None,
        })
    }

    /// Place the binary here instead of the platform default.
    pub fn with_install_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.install_dir = dir.into();
        self
    }

    /// Use this PATH value instead of the process environment.
    pub fn with_search_path(mut self, path: impl Into<String>) -> Self {
        self.search_path = Some(path.into());
        self
    }

    /// Download from here instead of the official release archive.
    pub fn with_archive_url(mut self, url: impl Into<String>) -> Self {
        self.archive_url_override = Some(url.into());
        self
    }

    fn effective_search_path(&self) -> String {
        self.search_path
            .clone()
            .unwrap_or_else(|| std::env::var("PATH").unwrap_or_default())
    }

    async fn install_linux(&self) -> InstallOutcome {
        let url = match self.archive_url_override.clone().or_else(|| self.target.archive_url()) {
            Some(url) => url,
            None => return InstallOutcome::NotFound,
        };

        info!("Downloading Ollama from {}", url);
        match self.download_and_extract(&url).await {
            Ok(path) => {
                info!("Installed Ollama at {}", path.display());
                InstallOutcome::Installed(path)
            }
            Err(err) => InstallOutcome::Failed(format!("{:#}", err)),
        }
    }

    async fn download_and_extract(&self, url: &str) -> Result<PathBuf> {
        let mut response = self
            .http
            .get(url)
            .send()
            .await
            .context("Failed to download the Ollama archive")?;
        anyhow::ensure!(
            response.status().is_success(),
            "download failed with HTTP {}",
            response.status()
        );

        let scratch = tempfile::tempdir().context("Failed to create a scratch directory")?;
        let archive_path = scratch.path().join("ollama.tgz");

        // The archive can exceed a gigabyte; stream it to disk chunk by chunk
        let mut archive_file = tokio::fs::File::create(&archive_path)
            .await
            .context("Failed to create the archive file")?;
        while let Some(chunk) = response
            .chunk()
            .await
            .context("Failed to read the archive body")?
        {
            archive_file
                .write_all(&chunk)
                .await
                .context("Failed to write the archive to disk")?;
        }
        archive_file
            .flush()
            .await
            .context("Failed to flush the archive to disk")?;
        drop(archive_file);

        let unpack_dir = scratch.path().join("unpacked");
        let archive = archive_path.clone();
        let dest = unpack_dir.clone();
        tokio::task::spawn_blocking(move || -> Result<()> {
            let file = std::fs::File::open(&archive)?;
            let mut tar = tar::Archive::new(flate2::read::GzDecoder::new(file));
            tar.unpack(&dest).context("Failed to unpack the archive")?;
            Ok(())
        })
        .await
        .context("Archive extraction task failed")??;

        let unpacked = unpack_dir.join(self.target.binary_name);
        anyhow::ensure!(
            unpacked.is_file(),
            "archive did not contain {}",
            self.target.binary_name
        );

        let dest_path = self.install_dir.join(self.target.binary_name);
        place_binary(&unpacked, &dest_path)
            .with_context(|| format!("Failed to place {}", dest_path.display()))?;
        Ok(dest_path)
    }

    async fn install_macos(&self) -> InstallOutcome {
        let path_value = self.effective_search_path();

        if find_in_search_path(&path_value, "brew").is_none() {
            warn!("Homebrew not found; cannot install Ollama unattended");
            return InstallOutcome::NotFound;
        }

        info!("Installing Ollama with Homebrew");
        if let Err(err) = self.runner.run(&["brew", "install", "ollama"], true).await {
            return InstallOutcome::Failed(err.to_string());
        }

        let locator =
            RuntimeLocator::new(self.target.clone()).with_search_path(path_value);
        match locator.locate() {
            Some(path) => InstallOutcome::Installed(path),
            None => InstallOutcome::Failed(
                "brew install finished but ollama is still missing".to_string(),
            ),
        }
    }
}

#[async_trait]
impl Installer for PlatformInstaller {
    async fn install(&self) -> InstallOutcome {
        match self.target.platform {
            Platform::Linux => self.install_linux().await,
            Platform::MacOs => self.install_macos().await,
            _ => {
                warn!("No unattended Ollama install for this platform");
                InstallOutcome::NotFound
            }
        }
    }
}

/// Move the extracted binary into place and make sure it is executable.
fn place_binary(src: &Path, dest: &Path) -> Result<()> {
    if std::fs::rename(src, dest).is_err() {
        // Rename fails across filesystems; fall back to a copy
        std::fs::copy(src, dest)?;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = std::fs::metadata(dest)?.permissions();
        perms.set_mode(perms.mode() | 0o111);
        std::fs::set_permissions(dest, perms)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ollama::command::CommandResult;
    use std::fs;
    use std::sync::Mutex;

    struct ScriptedRunner {
        calls: Mutex<Vec<Vec<String>>>,
        fail: bool,
    }

    impl ScriptedRunner {
        fn ok() -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
                fail: false,
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
                fail: true,
            })
        }

        fn calls(&self) -> Vec<Vec<String>> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CommandRunner for ScriptedRunner {
        async fn run(&self, argv: &[&str], check: bool) -> Result<CommandResult, SetupError> {
            self.calls
                .lock()
                .unwrap()
                .push(argv.iter().map(|s| s.to_string()).collect());
            if self.fail && check {
                return Err(SetupError::CommandExit {
                    command: argv.join(" "),
                    status: 1,
                    output: "brew exploded".to_string(),
                });
            }
            Ok(CommandResult {
                status: 0,
                stdout: String::new(),
                stderr: String::new(),
            })
        }

        fn spawn_detached(&self, _argv: &[&str]) -> Result<(), SetupError> {
            Ok(())
        }
    }

    fn write_executable(path: &Path) {
        fs::write(path, "#!/bin/sh\nexit 0\n").unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
        }
    }

    fn target_for(platform: Platform) -> RuntimeTarget {
        RuntimeTarget {
            platform,
            binary_name: "ollama",
            default_install_dirs: vec![],
        }
    }

    fn gzipped_tar_with_ollama(content: &[u8]) -> Vec<u8> {
        let gz = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::fast());
        let mut builder = tar::Builder::new(gz);
        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o755);
        header.set_cksum();
        builder.append_data(&mut header, "ollama", content).unwrap();
        builder.into_inner().unwrap().finish().unwrap()
    }

    #[tokio::test]
    async fn test_unsupported_platform_is_not_found() {
        let installer =
            PlatformInstaller::new(target_for(Platform::Other), ScriptedRunner::ok()).unwrap();
        assert_eq!(installer.install().await, InstallOutcome::NotFound);
    }

    #[tokio::test]
    async fn test_macos_without_brew_is_not_found_and_runs_nothing() {
        let empty = tempfile::tempdir().unwrap();
        let runner = ScriptedRunner::ok();
        let installer = PlatformInstaller::new(target_for(Platform::MacOs), runner.clone())
            .unwrap()
            .with_search_path(empty.path().to_string_lossy());

        assert_eq!(installer.install().await, InstallOutcome::NotFound);
        assert!(runner.calls().is_empty());
    }

    #[tokio::test]
    async fn test_macos_with_brew_installs_and_relocates() {
        let bin = tempfile::tempdir().unwrap();
        write_executable(&bin.path().join("brew"));
        // Simulates what brew leaves behind
        write_executable(&bin.path().join("ollama"));

        let runner = ScriptedRunner::ok();
        let installer = PlatformInstaller::new(target_for(Platform::MacOs), runner.clone())
            .unwrap()
            .with_search_path(bin.path().to_string_lossy());

        let outcome = installer.install().await;
        assert_eq!(
            outcome,
            InstallOutcome::Installed(bin.path().join("ollama"))
        );
        let calls = runner.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0], ["brew", "install", "ollama"]);
    }

    #[tokio::test]
    async fn test_macos_brew_failure_degrades_to_failed() {
        let bin = tempfile::tempdir().unwrap();
        write_executable(&bin.path().join("brew"));

        let installer =
            PlatformInstaller::new(target_for(Platform::MacOs), ScriptedRunner::failing())
                .unwrap()
                .with_search_path(bin.path().to_string_lossy());

        match installer.install().await {
            InstallOutcome::Failed(reason) => assert!(reason.contains("failed")),
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_linux_install_downloads_and_places_the_binary() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/ollama.tgz")
            .with_status(200)
            .with_body(gzipped_tar_with_ollama(b"#!/bin/sh\nexit 0\n"))
            .create_async()
            .await;

        let dest = tempfile::tempdir().unwrap();
        let installer =
            PlatformInstaller::new(target_for(Platform::Linux), ScriptedRunner::ok())
                .unwrap()
                .with_install_dir(dest.path())
                .with_archive_url(format!("{}/ollama.tgz", server.url()));

        let expected = dest.path().join("ollama");
        assert_eq!(
            installer.install().await,
            InstallOutcome::Installed(expected.clone())
        );
        assert!(expected.is_file());

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&expected).unwrap().permissions().mode();
            assert_ne!(mode & 0o111, 0, "installed binary must be executable");
        }
    }

    #[tokio::test]
    async fn test_linux_install_keeps_a_large_archive_intact() {
        let payload: Vec<u8> = (0u32..512 * 1024).map(|i| (i % 251) as u8).collect();
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/ollama.tgz")
            .with_status(200)
            .with_body(gzipped_tar_with_ollama(&payload))
            .create_async()
            .await;

        let dest = tempfile::tempdir().unwrap();
        let installer =
            PlatformInstaller::new(target_for(Platform::Linux), ScriptedRunner::ok())
                .unwrap()
                .with_install_dir(dest.path())
                .with_archive_url(format!("{}/ollama.tgz", server.url()));

        let expected = dest.path().join("ollama");
        assert_eq!(
            installer.install().await,
            InstallOutcome::Installed(expected.clone())
        );
        assert_eq!(fs::read(&expected).unwrap(), payload);
    }

    #[tokio::test]
    async fn test_linux_download_error_degrades_to_failed() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/ollama.tgz")
            .with_status(404)
            .create_async()
            .await;

        let dest = tempfile::tempdir().unwrap();
        let installer =
            PlatformInstaller::new(target_for(Platform::Linux), ScriptedRunner::ok())
                .unwrap()
                .with_install_dir(dest.path())
                .with_archive_url(format!("{}/ollama.tgz", server.url()));

        match installer.install().await {
            InstallOutcome::Failed(reason) => assert!(reason.contains("404")),
            other => panic!("expected Failed, got {other:?}"),
        }
    }
}

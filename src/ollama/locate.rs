// Locating an existing Ollama executable on the host

use std::path::{Path, PathBuf};
use tracing::debug;

/// Host platform family, as far as installation is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Linux,
    MacOs,
    Windows,
    Other,
}

impl Platform {
    /// The platform this binary was built for.
    pub fn detect() -> Self {
        match std::env::consts::OS {
            "linux" => Platform::Linux,
            "macos" => Platform::MacOs,
            "windows" => Platform::Windows,
            _ => Platform::Other,
        }
    }
}

/// Everything platform-specific about the Ollama distribution: what the
/// binary is called, where installers put it, and where to download it from.
#[derive(Debug, Clone)]
pub struct RuntimeTarget {
    pub platform: Platform,
    pub binary_name: &'static str,
    pub default_install_dirs: Vec<PathBuf>,
}

impl RuntimeTarget {
    pub fn for_platform(platform: Platform) -> Self {
        match platform {
            Platform::Windows => Self {
                platform,
                binary_name: "ollama.exe",
                default_install_dirs: windows_install_dirs(),
            },
            _ => Self {
                platform,
                binary_name: "ollama",
                default_install_dirs: vec![PathBuf::from("/usr/local/bin")],
            },
        }
    }

    /// Release archive for unattended installation, when the platform has one.
    pub fn archive_url(&self) -> Option<String> {
        match self.platform {
            Platform::Linux => {
                let arch = match std::env::consts::ARCH {
                    "aarch64" => "arm64",
                    _ => "amd64",
                };
                Some(format!(
                    "https://ollama.com/download/ollama-linux-{}.tgz",
                    arch
                ))
            }
            _ => None,
        }
    }

    /// What to tell the user when unattended installation came up empty.
    pub fn install_instructions(&self) -> String {
        match self.platform {
            Platform::MacOs => {
                "Install it with Homebrew (brew install ollama) or from https://ollama.com/download"
                    .to_string()
            }
            _ => "Please install it from https://ollama.com/download".to_string(),
        }
    }
}

fn windows_install_dirs() -> Vec<PathBuf> {
    dirs::home_dir()
        .map(|home| {
            vec![home
                .join("AppData")
                .join("Local")
                .join("Programs")
                .join("Ollama")]
        })
        .unwrap_or_default()
}

/// which(1)-style lookup of a binary name over a PATH-shaped string.
pub fn find_in_search_path(raw_path: &str, binary_name: &str) -> Option<PathBuf> {
    for dir in std::env::split_paths(raw_path) {
        if dir.as_os_str().is_empty() {
            continue;
        }
        let candidate = dir.join(binary_name);
        if is_executable_file(&candidate) {
            return Some(candidate);
        }
    }
    None
}

#[cfg(unix)]
fn is_executable_file(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.is_file()
        && path
            .metadata()
            .map(|m| m.permissions().mode() & 0o111 != 0)
            .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable_file(path: &Path) -> bool {
    path.is_file()
}

/// Finds an already-installed executable without side effects.
///
/// The search path can be injected so lookups stay deterministic in tests;
/// by default the process environment's PATH is consulted.
pub struct RuntimeLocator {
    target: RuntimeTarget,
    search_path: Option<String>,
}

impl RuntimeLocator {
    pub fn new(target: RuntimeTarget) -> Self {
        Self {
            target,
            search_path: None,
        }
    }

    /// Use this PATH value instead of the process environment.
    pub fn with_search_path(mut self, path: impl Into<String>) -> Self {
        self.search_path = Some(path.into());
        self
    }

    pub fn target(&self) -> &RuntimeTarget {
        &self.target
    }

    /// Search-path lookup first, then the platform's default install dirs.
    /// Absence is a normal outcome, not an error.
    pub fn locate(&self) -> Option<PathBuf> {
        let raw_path = match &self.search_path {
            Some(p) => p.clone(),
            None => std::env::var("PATH").unwrap_or_default(),
        };

        if let Some(path) = find_in_search_path(&raw_path, self.target.binary_name) {
            debug!("Found {} on the search path: {}", self.target.binary_name, path.display());
            return Some(path);
        }

        for dir in &self.target.default_install_dirs {
            let candidate = dir.join(self.target.binary_name);
            if is_executable_file(&candidate) {
                debug!("Found {} in a default dir: {}", self.target.binary_name, candidate.display());
                return Some(candidate);
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn target_with_dirs(dirs: Vec<PathBuf>) -> RuntimeTarget {
        RuntimeTarget {
            platform: Platform::Linux,
            binary_name: "ollama",
            default_install_dirs: dirs,
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

    #[test]
    fn test_locate_finds_binary_on_search_path() {
        let dir = tempfile::tempdir().unwrap();
        let exe = dir.path().join("ollama");
        write_executable(&exe);

        let locator = RuntimeLocator::new(target_with_dirs(vec![]))
            .with_search_path(dir.path().to_string_lossy());
        assert_eq!(locator.locate(), Some(exe));
    }

    #[test]
    fn test_locate_misses_when_nothing_installed() {
        let dir = tempfile::tempdir().unwrap();
        let locator = RuntimeLocator::new(target_with_dirs(vec![]))
            .with_search_path(dir.path().to_string_lossy());
        assert_eq!(locator.locate(), None);
    }

    #[test]
    fn test_locate_falls_back_to_default_dir() {
        let empty = tempfile::tempdir().unwrap();
        let install = tempfile::tempdir().unwrap();
        let exe = install.path().join("ollama");
        write_executable(&exe);

        let locator = RuntimeLocator::new(target_with_dirs(vec![install.path().to_path_buf()]))
            .with_search_path(empty.path().to_string_lossy());
        assert_eq!(locator.locate(), Some(exe));
    }

    #[test]
    fn test_search_path_wins_over_default_dir() {
        let path_dir = tempfile::tempdir().unwrap();
        let install_dir = tempfile::tempdir().unwrap();
        let on_path = path_dir.path().join("ollama");
        let installed = install_dir.path().join("ollama");
        write_executable(&on_path);
        write_executable(&installed);

        let locator =
            RuntimeLocator::new(target_with_dirs(vec![install_dir.path().to_path_buf()]))
                .with_search_path(path_dir.path().to_string_lossy());
        assert_eq!(locator.locate(), Some(on_path));
    }

    #[cfg(unix)]
    #[test]
    fn test_plain_file_without_exec_bit_is_skipped() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let exe = dir.path().join("ollama");
        fs::write(&exe, "data").unwrap();
        fs::set_permissions(&exe, fs::Permissions::from_mode(0o644)).unwrap();

        let locator = RuntimeLocator::new(target_with_dirs(vec![]))
            .with_search_path(dir.path().to_string_lossy());
        assert_eq!(locator.locate(), None);
    }

    #[test]
    fn test_linux_archive_url_names_the_architecture() {
        let target = RuntimeTarget::for_platform(Platform::Linux);
        let url = target.archive_url().unwrap();
        assert!(url.starts_with("https://ollama.com/download/ollama-linux-"));
        assert!(url.ends_with(".tgz"));
    }

    #[test]
    fn test_only_linux_has_an_archive() {
        assert!(RuntimeTarget::for_platform(Platform::MacOs)
            .archive_url()
            .is_none());
        assert!(RuntimeTarget::for_platform(Platform::Windows)
            .archive_url()
            .is_none());
    }

    #[test]
    fn test_platform_detect_matches_build_target() {
        let platform = Platform::detect();
        match std::env::consts::OS {
            "linux" => assert_eq!(platform, Platform::Linux),
            "macos" => assert_eq!(platform, Platform::MacOs),
            "windows" => assert_eq!(platform, Platform::Windows),
            _ => assert_eq!(platform, Platform::Other),
        }
    }
}

// Configuration loader
// Precedence: environment variables > ./entity.toml > ~/.entity/config.toml > defaults

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use super::constants::{
    ENV_MODEL, ENV_SERVER_URL, HOME_CONFIG_DIR, HOME_CONFIG_FILE, LOCAL_CONFIG_FILE,
};
use super::settings::Config;

/// Load configuration from the first matching config file, then apply
/// environment overrides. Missing files are normal; a file that exists but
/// does not parse is an error.
pub fn load_config() -> Result<Config> {
    let mut config = match first_config_file() {
        Some(path) => load_from(&path)?,
        None => Config::default(),
    };

    if let Ok(model) = std::env::var(ENV_MODEL) {
        if !model.is_empty() {
            config.model = model;
        }
    }
    if let Ok(url) = std::env::var(ENV_SERVER_URL) {
        if !url.is_empty() {
            config.server_url = Some(url);
        }
    }

    Ok(config)
}

/// Parse one TOML config file.
pub fn load_from(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    toml::from_str(&contents).with_context(|| format!("Failed to parse {}", path.display()))
}

fn first_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(LOCAL_CONFIG_FILE);
    if local.is_file() {
        return Some(local);
    }

    let home = dirs::home_dir()?.join(HOME_CONFIG_DIR).join(HOME_CONFIG_FILE);
    home.is_file().then_some(home)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_from_reads_a_full_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("entity.toml");
        fs::write(&path, "model = \"phi3\"\nserver_url = \"http://10.1.1.1:11434\"\n").unwrap();

        let config = load_from(&path).unwrap();
        assert_eq!(config.model, "phi3");
        assert_eq!(config.server_url.as_deref(), Some("http://10.1.1.1:11434"));
    }

    #[test]
    fn test_load_from_rejects_bad_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("entity.toml");
        fs::write(&path, "model = [broken").unwrap();
        assert!(load_from(&path).is_err());
    }

    #[test]
    fn test_load_from_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_from(&dir.path().join("nope.toml")).is_err());
    }
}

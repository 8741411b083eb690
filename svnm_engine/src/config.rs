//! Engine configuration, read from `config.toml` in the data root.
//!
//! Every field has a default, and a missing or broken file never stops the
//! engine: it logs and falls back to the defaults.
//!
//! ```toml
//! [states]
//! path = "states"   # relative to the data root
//! start = "start"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{info, warn};
use serde::Deserialize;

use crate::data_paths::data_path;

pub const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub states: StatesConfig,
}

/// Where the scripts live and where a session begins.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StatesConfig {
    pub path: PathBuf,
    pub start: String,
}

impl Default for StatesConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("states"),
            start: "start".to_string(),
        }
    }
}

impl EngineConfig {
    /// Script root directory, resolved against the data root when relative.
    pub fn states_dir(&self) -> PathBuf {
        data_path(&self.states.path)
    }
}

/// Load `config.toml` from the data root.
pub fn load_config() -> EngineConfig {
    load_config_from(&data_path(CONFIG_FILE))
}

/// Load the configuration at `path`, falling back to defaults.
pub fn load_config_from(path: &Path) -> EngineConfig {
    if !path.exists() {
        info!("no configuration at '{}'; using defaults", path.display());
        return EngineConfig::default();
    }
    match try_load_config(path) {
        Ok(config) => {
            info!("configuration loaded from '{}'", path.display());
            config
        },
        Err(e) => {
            warn!("Could not load configuration from '{}': {e:#}. Using defaults.", path.display());
            EngineConfig::default()
        },
    }
}

/// Reads and parses a configuration file.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
fn try_load_config(path: &Path) -> Result<EngineConfig> {
    let text = fs::read_to_string(path).with_context(|| format!("reading configuration from '{}'", path.display()))?;
    toml::from_str(&text).with_context(|| format!("parsing configuration TOML in '{}'", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(text: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(text.as_bytes()).unwrap();
        file
    }

    #[test]
    fn missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join(CONFIG_FILE));
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.states.path, PathBuf::from("states"));
        assert_eq!(config.states.start, "start");
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let file = write_config("[states]\nstart = \"prologue\"\n");
        let config = load_config_from(file.path());
        assert_eq!(config.states.start, "prologue");
        assert_eq!(config.states.path, PathBuf::from("states"));
    }

    #[test]
    fn full_file_is_read() {
        let file = write_config("[states]\npath = \"scripts/ko\"\nstart = \"1장\"\n");
        let config = load_config_from(file.path());
        assert_eq!(config.states.path, PathBuf::from("scripts/ko"));
        assert_eq!(config.states.start, "1장");
    }

    #[test]
    fn malformed_file_falls_back() {
        let file = write_config("[states\npath = 3");
        assert_eq!(load_config_from(file.path()), EngineConfig::default());
        let file = write_config("[states]\nstart = 3\n");
        assert_eq!(load_config_from(file.path()), EngineConfig::default());
    }
}

//! Configuration loading.
//!
//! Handles `~/.mytodos/config.toml`. Every field is optional and command-line
//! flags take precedence.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;

pub const SETTINGS_FILE: &str = "settings.json";
pub const TICKETS_FILE: &str = "tickets.json";
pub const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// Directory holding `settings.json` and `tickets.json`
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// Language file used for notifications; the bundled en-US file when unset
    #[serde(default)]
    pub language_file: Option<PathBuf>,

    /// Id of the user the CLI acts as
    #[serde(default)]
    pub user_id: Option<u64>,
}

impl Config {
    /// Load config from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// `data_dir`, falling back to `home`.
    pub fn data_dir_or(&self, home: &Path) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| home.to_path_buf())
    }
}

/// `$HOME/.mytodos`, or `./.mytodos` when HOME is unset.
pub fn default_home() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".mytodos")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load(&dir.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.data_dir_or(dir.path()), dir.path());
    }

    #[test]
    fn test_load_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "data_dir = \"/srv/todos\"\nuser_id = 123\n").unwrap();
        let cfg = Config::load(&path).unwrap();
        assert_eq!(cfg.user_id, Some(123));
        assert_eq!(cfg.data_dir_or(Path::new("/x")), PathBuf::from("/srv/todos"));
        assert_eq!(cfg.language_file, None);
    }

    #[test]
    fn test_invalid_toml_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "user_id = [").unwrap();
        assert!(Config::load(&path).is_err());
    }
}

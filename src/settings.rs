//! Key/value settings stores.
//!
//! The widget keeps per-user UI state in a flat string-keyed settings store.
//! `JsonSettingsStore` persists to a JSON file next to the ticket database;
//! `MemorySettingsStore` keeps everything in process.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::db::write_json_atomic;
use crate::error::Result;

/// Read and write string settings by key.
pub trait SettingsStore {
    /// Value stored under `key`, or `default` when nothing is stored.
    fn get_setting(&self, key: &str, default: &str) -> Result<String>;

    /// Store `value` under `key`, replacing any previous value.
    fn save_setting(&mut self, key: &str, value: &str) -> Result<()>;
}

/// In-process settings store.
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    values: HashMap<String, String>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemorySettingsStore {
    fn get_setting(&self, key: &str, default: &str) -> Result<String> {
        Ok(self.values.get(key).cloned().unwrap_or_else(|| default.to_string()))
    }

    fn save_setting(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct SettingsFile {
    #[serde(default)]
    settings: BTreeMap<String, String>,
}

/// Settings store backed by a JSON file. Every save rewrites the file.
#[derive(Debug)]
pub struct JsonSettingsStore {
    path: PathBuf,
    data: SettingsFile,
}

impl JsonSettingsStore {
    /// Load settings from `path`; a missing file starts an empty store.
    pub fn load(path: &Path) -> Result<Self> {
        let data = if path.exists() {
            let buf = fs::read_to_string(path)?;
            serde_json::from_str(&buf)?
        } else {
            SettingsFile::default()
        };
        debug!(path = %path.display(), entries = data.settings.len(), "loaded settings");
        Ok(Self { path: path.to_path_buf(), data })
    }
}

impl SettingsStore for JsonSettingsStore {
    fn get_setting(&self, key: &str, default: &str) -> Result<String> {
        Ok(self
            .data
            .settings
            .get(key)
            .cloned()
            .unwrap_or_else(|| default.to_string()))
    }

    fn save_setting(&mut self, key: &str, value: &str) -> Result<()> {
        self.data.settings.insert(key.to_string(), value.to_string());
        write_json_atomic(&self.path, &self.data)?;
        debug!(key, value, "saved setting");
        Ok(())
    }
}

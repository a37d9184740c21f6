use anyhow::{Context, Result};
use log::{info, warn};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::{load_context, save_context};

/// JSON files of one site's data directory
pub struct DataStore {
    data_dir: PathBuf,
}

impl DataStore {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.data_dir.join(name)
    }

    pub fn exists(&self, name: &str) -> bool {
        self.path(name).exists()
    }

    /// Load a JSON file; `None` when it does not exist
    pub fn load<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>> {
        let file_path = self.path(name);
        self.read_json_opt(&file_path)
            .with_context(|| load_context(name, &file_path))
    }

    /// Load a JSON file, starting from the default value when it is missing or unreadable
    pub fn load_or_default<T: DeserializeOwned + Default>(&self, name: &str) -> T {
        match self.load(name) {
            Ok(Some(data)) => {
                info!("Loaded {}", self.path(name).display());
                data
            }
            Ok(None) => T::default(),
            Err(e) => {
                warn!("{:#}; starting from an empty state", e);
                T::default()
            }
        }
    }

    /// Write pretty-printed JSON via a temp file and rename
    pub fn save<T: Serialize>(&self, name: &str, data: &T) -> Result<()> {
        let file_path = self.path(name);
        self.write_json(&file_path, data)
            .with_context(|| save_context(name, &file_path))?;

        info!("Saved {}", file_path.display());
        Ok(())
    }

    // --- Helper Methods ---

    fn write_json<T: Serialize>(&self, path: &Path, data: &T) -> Result<()> {
        fs::create_dir_all(&self.data_dir).context("Failed to create data directory")?;

        let mut json = serde_json::to_string_pretty(data).context("Failed to serialize data")?;
        json.push('\n');

        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, json).context("Failed to write temp file")?;
        fs::rename(&temp_path, path).context("Failed to replace file")?;
        Ok(())
    }

    fn read_json_opt<T: DeserializeOwned>(&self, path: &Path) -> Result<Option<T>> {
        if !path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(path)?;
        let data = serde_json::from_str(&json).with_context(|| {
            format!(
                "Failed to parse JSON from {:?}. First 200 chars: {}",
                path,
                json.chars().take(200).collect::<String>()
            )
        })?;
        Ok(Some(data))
    }
}

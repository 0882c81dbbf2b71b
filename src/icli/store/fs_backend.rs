use super::backend::StorageBackend;
use crate::error::{IcliError, Result};
use crate::model::{Config, Invoice};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub const CONFIG_FILENAME: &str = "icli.json";
pub const HISTORY_FILENAME: &str = "invoices.json";

/// Stores both documents as pretty-printed JSON under one directory.
#[derive(Debug, Clone)]
pub struct FsBackend {
    root: PathBuf,
}

impl FsBackend {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn ensure_dir(&self) -> Result<()> {
        if !self.root.exists() {
            fs::create_dir_all(&self.root).map_err(IcliError::Io)?;
        }
        Ok(())
    }

    fn read_json<T: DeserializeOwned>(&self, path: &Path) -> Result<Option<T>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path).map_err(IcliError::Io)?;
        let value = serde_json::from_str(&content).map_err(IcliError::Serialization)?;
        Ok(Some(value))
    }

    fn write_json<T: Serialize + ?Sized>(&self, path: &Path, value: &T) -> Result<()> {
        self.ensure_dir()?;
        let content = serde_json::to_string_pretty(value).map_err(IcliError::Serialization)?;

        // Atomic write: a crash leaves either the old or the new document
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("document");
        let tmp_file = self.root.join(format!(".{}-{}.tmp", stem, Uuid::new_v4()));
        fs::write(&tmp_file, content).map_err(IcliError::Io)?;
        if let Err(e) = fs::rename(&tmp_file, path) {
            let _ = fs::remove_file(&tmp_file);
            return Err(IcliError::Io(e));
        }
        Ok(())
    }
}

impl StorageBackend for FsBackend {
    fn load_config(&self) -> Result<Option<Config>> {
        self.read_json(&self.config_path())
    }

    fn save_config(&self, config: &Config) -> Result<()> {
        self.write_json(&self.config_path(), config)
    }

    fn load_history(&self) -> Result<Vec<Invoice>> {
        Ok(self.read_json(&self.history_path())?.unwrap_or_default())
    }

    fn save_history(&self, history: &[Invoice]) -> Result<()> {
        self.write_json(&self.history_path(), history)
    }

    fn config_path(&self) -> PathBuf {
        self.root.join(CONFIG_FILENAME)
    }

    fn history_path(&self) -> PathBuf {
        self.root.join(HISTORY_FILENAME)
    }
}

use super::backend::StorageBackend;
use crate::error::{IcliError, Result};
use crate::fields::{self, FieldName, FieldValue};
use crate::model::Config;
use std::fs;
use std::path::{Path, PathBuf};

/// The singleton config document: app metadata, the invoices directory and
/// the default field values.
///
/// Every write is a whole-document read-modify-write through the backend.
pub struct ConfigStore<B: StorageBackend> {
    backend: B,
}

impl<B: StorageBackend> ConfigStore<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn path(&self) -> PathBuf {
        self.backend.config_path()
    }

    pub fn exists(&self) -> Result<bool> {
        Ok(self.backend.load_config()?.is_some())
    }

    /// Create the config document on first run. Returns `true` when it was created.
    pub fn init(&self) -> Result<bool> {
        if self.exists()? {
            return Ok(false);
        }
        self.backend.save_config(&Config::new())?;
        tracing::info!(path = %self.path().display(), "created config");
        Ok(true)
    }

    pub fn load(&self) -> Result<Config> {
        self.backend
            .load_config()?
            .ok_or_else(|| IcliError::ConfigMissing(self.path()))
    }

    /// Record where rendered invoices go. Creates the directory if needed.
    ///
    /// Setting the same directory again is a no-op; a different one is refused
    /// once a directory has been chosen.
    pub fn set_invoices_directory(&self, path: &Path) -> Result<Config> {
        if path.exists() && !path.is_dir() {
            return Err(IcliError::InvalidDirectory(path.to_path_buf()));
        }

        let mut config = self.load()?;
        match &config.invoices_path {
            Some(existing) if existing == path => return Ok(config),
            Some(existing) => {
                return Err(IcliError::InvoicesDirectoryAlreadySet(existing.clone()))
            }
            None => {}
        }

        ensure_directory(path)?;
        config.invoices_path = Some(path.to_path_buf());
        self.backend.save_config(&config)?;
        tracing::info!(path = %path.display(), "invoices directory set");
        Ok(config)
    }

    /// Validate `raw` against the default field called `name` and store it,
    /// overwriting any previous value. Other defaults are left untouched.
    pub fn set_default_value(&self, name: &str, raw: &str) -> Result<FieldValue> {
        let field: FieldName = name.parse()?;
        if !field.is_default() {
            return Err(IcliError::UnknownField(name.to_string()));
        }
        let value = fields::rule(field).check(raw)?;
        self.store_checked_default(field, value.clone())?;
        Ok(value)
    }

    /// Store a value that already passed its rule's check, e.g. an answer
    /// from a [`Prompter`](crate::resolver::Prompter).
    pub(crate) fn store_checked_default(&self, field: FieldName, value: FieldValue) -> Result<()> {
        if !field.is_default() {
            return Err(IcliError::UnknownField(field.to_string()));
        }
        let mut config = self.load()?;
        config.default_values.insert(field, value);
        self.backend.save_config(&config)?;
        tracing::debug!(field = %field, "default value stored");
        Ok(())
    }
}

fn ensure_directory(path: &Path) -> Result<()> {
    if path.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(path).map_err(IcliError::Io)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o744)).map_err(IcliError::Io)?;
    }
    Ok(())
}

use crate::error::Result;
use crate::model::{Config, Invoice};
use std::path::PathBuf;

/// Abstract interface for raw document I/O.
/// This trait handles the "how" of storage (filesystem vs memory),
/// while [`ConfigStore`](super::ConfigStore) and [`InvoiceStore`](super::InvoiceStore)
/// handle the "what" (validation, id assignment).
pub trait StorageBackend {
    /// Load the config document. `Ok(None)` if it does not exist yet.
    fn load_config(&self) -> Result<Option<Config>>;

    /// Replace the config document.
    /// MUST be atomic (e.g. write to tmp then rename) to avoid partial writes.
    fn save_config(&self, config: &Config) -> Result<()>;

    /// Load the invoice history. An absent document is an empty history.
    fn load_history(&self) -> Result<Vec<Invoice>>;

    /// Replace the invoice history document. Same atomicity contract as `save_config`.
    fn save_history(&self, history: &[Invoice]) -> Result<()>;

    /// Where the config lives. For MemBackend, a virtual path.
    fn config_path(&self) -> PathBuf;

    /// Where the history lives. For MemBackend, a virtual path.
    fn history_path(&self) -> PathBuf;
}

use super::backend::StorageBackend;
use crate::error::{IcliError, Result};
use crate::model::{Config, Invoice};
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

#[derive(Debug, Default)]
struct MemState {
    config: Option<Config>,
    history: Vec<Invoice>,
    fail_writes: bool,
}

/// In-memory backend for tests. Clones share the same documents.
#[derive(Debug, Clone, Default)]
pub struct MemBackend {
    state: Rc<RefCell<MemState>>,
}

impl MemBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: Config) -> Self {
        let backend = Self::new();
        backend.state.borrow_mut().config = Some(config);
        backend
    }

    /// Make every subsequent save fail, to exercise persistence errors.
    pub fn fail_writes(&self, fail: bool) {
        self.state.borrow_mut().fail_writes = fail;
    }

    fn check_writable(&self) -> Result<()> {
        if self.state.borrow().fail_writes {
            return Err(IcliError::Store("write refused".to_string()));
        }
        Ok(())
    }
}

impl StorageBackend for MemBackend {
    fn load_config(&self) -> Result<Option<Config>> {
        Ok(self.state.borrow().config.clone())
    }

    fn save_config(&self, config: &Config) -> Result<()> {
        self.check_writable()?;
        self.state.borrow_mut().config = Some(config.clone());
        Ok(())
    }

    fn load_history(&self) -> Result<Vec<Invoice>> {
        Ok(self.state.borrow().history.clone())
    }

    fn save_history(&self, history: &[Invoice]) -> Result<()> {
        self.check_writable()?;
        self.state.borrow_mut().history = history.to_vec();
        Ok(())
    }

    fn config_path(&self) -> PathBuf {
        PathBuf::from("/mem/icli.json")
    }

    fn history_path(&self) -> PathBuf {
        PathBuf::from("/mem/invoices.json")
    }
}

use crate::commands::CmdResult;
use crate::error::Result;
use crate::store::{ConfigStore, InvoiceStore, StorageBackend};

/// The config document plus where both documents live.
pub fn run<B: StorageBackend>(
    configs: &ConfigStore<B>,
    invoices: &InvoiceStore<B>,
) -> Result<CmdResult> {
    let config = configs.load()?;
    Ok(CmdResult::default()
        .with_config(config)
        .with_paths(vec![configs.path(), invoices.path()]))
}

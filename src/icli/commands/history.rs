use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::store::{InvoiceStore, StorageBackend};

pub fn run<B: StorageBackend>(store: &InvoiceStore<B>) -> Result<CmdResult> {
    let invoices = store.history()?;
    let mut result = CmdResult::default();
    if invoices.is_empty() {
        result.add_message(CmdMessage::info("No invoice history found."));
    }
    Ok(result.with_invoices(invoices))
}

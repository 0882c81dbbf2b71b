use super::backend::StorageBackend;
use crate::error::Result;
use crate::model::{Invoice, InvoiceDraft};
use std::path::PathBuf;

/// Append-only record of every invoice ever created.
///
/// The whole history is rewritten on each append, so callers must not run
/// two appends against the same backend concurrently.
pub struct InvoiceStore<B: StorageBackend> {
    backend: B,
}

impl<B: StorageBackend> InvoiceStore<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn path(&self) -> PathBuf {
        self.backend.history_path()
    }

    /// Record a resolved invoice, assigning it the next id (history length + 1).
    /// Once this returns the invoice is durable, whatever happens to rendering.
    pub fn append(&self, draft: InvoiceDraft) -> Result<Invoice> {
        let mut history = self.backend.load_history()?;
        let id = history.len() as u64 + 1;
        let invoice = draft.into_invoice(id);
        history.push(invoice.clone());
        self.backend.save_history(&history)?;
        tracing::info!(id, "invoice recorded");
        Ok(invoice)
    }

    /// All recorded invoices in creation order. Empty if nothing was recorded yet.
    pub fn history(&self) -> Result<Vec<Invoice>> {
        self.backend.load_history()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IcliError;
    use crate::fields::{FieldName, FieldValue};
    use crate::model::LineItem;
    use crate::store::fs_backend::FsBackend;
    use crate::store::mem_backend::MemBackend;
    use chrono::Utc;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    fn draft(company: &str) -> InvoiceDraft {
        let mut details = BTreeMap::new();
        details.insert(FieldName::FullName, FieldValue::text("John Doe"));
        InvoiceDraft {
            template: PathBuf::from("basic.html"),
            company_name: company.to_string(),
            items: vec![LineItem {
                item_name: "Consulting".to_string(),
                price: 100.0,
            }],
            created_at: Utc::now(),
            details,
        }
    }

    #[test]
    fn test_empty_history() {
        let store = InvoiceStore::new(MemBackend::new());
        assert!(store.history().unwrap().is_empty());
    }

    #[test]
    fn test_ids_follow_history_length() {
        let store = InvoiceStore::new(MemBackend::new());
        for n in 1..=5u64 {
            let invoice = store.append(draft(&format!("Company {}", n))).unwrap();
            assert_eq!(invoice.id, n);
        }

        let history = store.history().unwrap();
        assert_eq!(history.len(), 5);
        let ids: Vec<u64> = history.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
        assert_eq!(history[2].company_name, "Company 3");
    }

    #[test]
    fn test_append_roundtrip_on_disk() {
        let temp = TempDir::new().unwrap();
        let store = InvoiceStore::new(FsBackend::new(temp.path()));
        store.append(draft("First Ltd")).unwrap();

        let x = draft("Second Ltd");
        let recorded = store.append(x.clone()).unwrap();

        let history = store.history().unwrap();
        let last = history.last().unwrap();
        assert_eq!(last, &recorded);
        assert_eq!(last.draft(), x);
        assert_eq!(last.id, 2);
    }

    #[test]
    fn test_earlier_records_are_untouched() {
        let temp = TempDir::new().unwrap();
        let store = InvoiceStore::new(FsBackend::new(temp.path()));
        let first = store.append(draft("First Ltd")).unwrap();
        store.append(draft("Second Ltd")).unwrap();
        assert_eq!(store.history().unwrap()[0], first);
    }

    #[test]
    fn test_failed_write_records_nothing() {
        let backend = MemBackend::new();
        let store = InvoiceStore::new(backend.clone());
        store.append(draft("First Ltd")).unwrap();

        backend.fail_writes(true);
        assert!(matches!(
            store.append(draft("Second Ltd")),
            Err(IcliError::Store(_))
        ));
        assert_eq!(store.history().unwrap().len(), 1);
    }
}

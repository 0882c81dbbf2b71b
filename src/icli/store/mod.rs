//! # Storage Layer
//!
//! icli keeps two JSON documents in its home directory:
//!
//! ```text
//! ~/.config/icli/
//! ├── icli.json        # Config: app metadata, invoices_path, default_values
//! ├── invoices.json    # History: JSON array of every invoice, append-only
//! └── *.html           # Invoice templates
//! ```
//!
//! Raw document I/O sits behind the [`StorageBackend`] trait:
//!
//! - [`fs_backend::FsBackend`]: production storage, atomic tmp-then-rename writes
//! - [`mem_backend::MemBackend`]: in-memory storage for tests
//!
//! The stores on top of it own the rules:
//!
//! - [`ConfigStore`]: validates default values before they are written
//! - [`InvoiceStore`]: assigns ids and only ever appends
//!
//! Both documents are rewritten whole on every change. Nothing here locks;
//! icli runs one command at a time.

pub mod backend;
pub mod config_store;
pub mod fs_backend;
pub mod invoice_store;
pub mod mem_backend;

pub use backend::StorageBackend;
pub use config_store::ConfigStore;
pub use invoice_store::InvoiceStore;

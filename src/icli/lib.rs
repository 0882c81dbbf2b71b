//! # icli Architecture
//!
//! icli turns HTML invoice templates into PDF invoices. The library holds the whole
//! pipeline; the `icli` binary is one client of it.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (cli/, wired by main.rs)                         │
//! │  - Parses arguments, prompts, prints, picks exit codes      │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Thin facade: wires stores, renderer, templates dir       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - setup, defaults, create, history, config                 │
//! │  - Reaches the user only through the Prompter trait         │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌──────────────────────┬──────────────────────┬───────────────┐
//! │ fields / resolver    │ template / render    │ store/        │
//! │ validation rules,    │ slot checks, slot    │ config and    │
//! │ field resolution     │ filling, PDF engine  │ history docs  │
//! └──────────────────────┴──────────────────────┴───────────────┘
//! ```
//!
//! ## The Pipeline
//!
//! `create` runs: template chosen → [`template::validate`] → [`resolver::resolve_for_invoice`]
//! → [`store::InvoiceStore::append`] (id assigned, record durable) →
//! [`render::DocumentRenderer::render`] → `Invoice#<id>.pdf` in the invoices directory.
//!
//! Any failure before the append leaves no trace. A failure after it leaves the
//! record in place without a PDF.
//!
//! ## Key Principle: No I/O Assumptions in Core
//!
//! From `api.rs` inward, code never writes to stdout/stderr, never exits the
//! process and never reads the terminal. Diagnostics go through `tracing`.
//!
//! ## Testing Strategy
//!
//! 1. **Commands** and the modules below them: unit tests with `MemBackend`,
//!    temp directories, a scripted prompter and a fake render engine
//!    (see `test_utils`, also built with the `test_utils` feature).
//! 2. **API**: dispatch tests.
//! 3. **Pipeline**: `tests/pipeline_e2e.rs` drives the API over real files with the
//!    `test_utils` fixtures (`cargo test --features test_utils`).
//! 4. **CLI**: `tests/cli_e2e.rs` runs the binary with `ICLI_HOME` pointed at a temp dir.
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade
//! - [`commands`]: Business logic for each command
//! - [`fields`]: Field catalog and validation rules
//! - [`resolver`]: Builds the field set for one invoice; defines [`resolver::Prompter`]
//! - [`template`]: Template discovery and validation
//! - [`render`]: Slot injection and PDF rendering
//! - [`store`]: Config and history documents
//! - [`model`]: Core data types (`Config`, `Invoice`, `Slot`)
//! - [`init`]: App home resolution and context setup
//! - [`logging`]: `tracing` setup
//! - [`error`]: Error types
//! - `cli`: Argument parsing, prompting and printing for the binary (not part of the lib API)

pub mod api;
pub mod commands;
pub mod error;
pub mod fields;
pub mod init;
pub mod logging;
pub mod model;
pub mod render;
pub mod resolver;
pub mod store;
pub mod template;

#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;

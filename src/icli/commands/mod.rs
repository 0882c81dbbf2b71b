//! # Command Layer
//!
//! The business logic of icli. Each command lives in its own submodule and works
//! on the domain types: config, invoices, templates.
//!
//! Commands:
//! - Read and write through [`ConfigStore`](crate::store::ConfigStore) and
//!   [`InvoiceStore`](crate::store::InvoiceStore)
//! - Return a structured [`CmdResult`] with the invoices, config and paths involved,
//!   plus leveled messages
//! - Never print, parse arguments or pick exit codes
//!
//! Commands that need answers from the user take a [`Prompter`](crate::resolver::Prompter).
//! That trait is the only way they reach the user, so the CLI supplies a terminal
//! prompter and tests supply a scripted one.
//!
//! ## Command Modules
//!
//! - [`setup`]: first-run initialization and the invoices directory
//! - [`defaults`]: view and set default field values
//! - [`create`]: the full invoice pipeline (template, fields, record, render)
//! - [`history`]: list recorded invoices
//! - [`config`]: show the config document

use crate::model::{Config, Invoice};
use serde::Serialize;
use std::path::PathBuf;

pub mod config;
pub mod create;
pub mod defaults;
pub mod history;
pub mod setup;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct CmdResult {
    pub invoices: Vec<Invoice>,
    pub config: Option<Config>,
    pub paths: Vec<PathBuf>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_invoices(mut self, invoices: Vec<Invoice>) -> Self {
        self.invoices = invoices;
        self
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    pub fn with_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.paths = paths;
        self
    }

    pub fn has_errors(&self) -> bool {
        self.messages
            .iter()
            .any(|m| m.level == MessageLevel::Error)
    }
}

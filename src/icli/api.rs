//! # API Facade
//!
//! A thin facade over the command layer and the single entry point for every icli
//! operation, whatever the UI.
//!
//! The facade wires the stores, the renderer and the templates directory together
//! and dispatches to `commands/*`. It holds no business logic and does no I/O of its
//! own beyond what the commands do.
//!
//! ## Generic Over Backend and Engine
//!
//! `IcliApi<B: StorageBackend, E: RenderEngine>`:
//! - Production: `IcliApi<FsBackend, ChromeEngine>`
//! - Testing: `IcliApi<FsBackend | MemBackend, FakeEngine>`

use crate::commands::{self, create::CreateOptions, defaults::DefaultsAction, CmdResult};
use crate::error::Result;
use crate::fields::FieldName;
use crate::model::personal_details;
use crate::render::{DocumentRenderer, RenderEngine};
use crate::resolver::Prompter;
use crate::store::{ConfigStore, InvoiceStore, StorageBackend};
use std::path::{Path, PathBuf};

pub struct IcliApi<B: StorageBackend, E: RenderEngine> {
    configs: ConfigStore<B>,
    invoices: InvoiceStore<B>,
    renderer: DocumentRenderer<E>,
    templates_dir: PathBuf,
}

impl<B: StorageBackend + Clone, E: RenderEngine> IcliApi<B, E> {
    pub fn new(backend: B, engine: E, templates_dir: PathBuf) -> Self {
        Self {
            configs: ConfigStore::new(backend.clone()),
            invoices: InvoiceStore::new(backend),
            renderer: DocumentRenderer::new(engine),
            templates_dir,
        }
    }
}

impl<B: StorageBackend, E: RenderEngine> IcliApi<B, E> {
    pub fn config_store(&self) -> &ConfigStore<B> {
        &self.configs
    }

    pub fn templates_dir(&self) -> &Path {
        &self.templates_dir
    }

    pub fn setup<P: Prompter>(
        &self,
        prompter: &mut P,
        suggested_invoices_dir: &Path,
    ) -> Result<CmdResult> {
        commands::setup::run(&self.configs, prompter, suggested_invoices_dir)
    }

    pub fn defaults<P: Prompter>(
        &self,
        prompter: &mut P,
        action: DefaultsAction,
    ) -> Result<CmdResult> {
        commands::defaults::run(&self.configs, prompter, action)
    }

    /// Personal details that `create` with defaults needs but the config lacks.
    pub fn missing_personal_defaults(&self) -> Result<Vec<FieldName>> {
        let config = self.configs.load()?;
        Ok(personal_details()
            .filter(|field| config.default_value(*field).is_none())
            .collect())
    }

    pub fn create_invoice<P: Prompter>(
        &self,
        prompter: &mut P,
        options: CreateOptions,
    ) -> Result<CmdResult> {
        commands::create::run(
            &self.configs,
            &self.invoices,
            &self.renderer,
            &self.templates_dir,
            prompter,
            options,
        )
    }

    pub fn history(&self) -> Result<CmdResult> {
        commands::history::run(&self.invoices)
    }

    pub fn config(&self) -> Result<CmdResult> {
        commands::config::run(&self.configs, &self.invoices)
    }

    /// Where rendered invoices go, if setup has chosen it.
    pub fn invoices_dir(&self) -> Result<Option<PathBuf>> {
        Ok(self.configs.load()?.invoices_path)
    }
}

//! # Locating the App Home
//!
//! Everything icli owns lives in one directory, the app home:
//!
//! 1. `ICLI_HOME`, when set and non-empty (tests point this at a temp dir)
//! 2. Otherwise `~/.config/icli`, with the home directory found via the
//!    `directories` crate
//!
//! The app home holds `icli.json`, `invoices.json` and the `.html` templates.
//! Rendered PDFs go wherever the config's invoices directory points; setup
//! suggests `~/Documents/Invoices` for it.

use crate::api::IcliApi;
use crate::error::{IcliError, Result};
use crate::render::ChromeEngine;
use crate::store::fs_backend::FsBackend;
use directories::{BaseDirs, UserDirs};
use std::path::PathBuf;

pub const HOME_ENV: &str = "ICLI_HOME";

#[derive(Debug, Clone)]
pub struct IcliPaths {
    pub home: PathBuf,
    pub suggested_invoices_dir: PathBuf,
}

pub struct IcliContext {
    pub api: IcliApi<FsBackend, ChromeEngine>,
    pub paths: IcliPaths,
}

pub fn resolve_paths() -> Result<IcliPaths> {
    let base = BaseDirs::new();
    let home = match std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
        Some(dir) => PathBuf::from(dir),
        None => base
            .as_ref()
            .map(|b| b.home_dir().join(".config").join("icli"))
            .ok_or_else(|| IcliError::Store("Could not determine home directory".to_string()))?,
    };

    let documents = UserDirs::new()
        .and_then(|dirs| dirs.document_dir().map(|d| d.to_path_buf()))
        .or_else(|| base.as_ref().map(|b| b.home_dir().join("Documents")))
        .unwrap_or_else(|| home.clone());

    Ok(IcliPaths {
        home,
        suggested_invoices_dir: documents.join("Invoices"),
    })
}

/// Build the production context: filesystem storage in the app home and
/// headless Chromium for rendering.
pub fn initialize() -> Result<IcliContext> {
    let paths = resolve_paths()?;
    tracing::debug!(home = %paths.home.display(), "using app home");
    let api = IcliApi::new(
        FsBackend::new(paths.home.clone()),
        ChromeEngine::from_env(),
        paths.home.clone(),
    );
    Ok(IcliContext { api, paths })
}

use crate::fields::FieldName;
use crate::model::Slot;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IcliError {
    #[error("Configuration not found at {0} (run `icli setup` first)")]
    ConfigMissing(PathBuf),

    #[error("Not a directory: {0}")]
    InvalidDirectory(PathBuf),

    #[error("Invoices directory is already set to {0}")]
    InvoicesDirectoryAlreadySet(PathBuf),

    #[error("Invoices directory is not set (run `icli setup` first)")]
    InvoicesDirectoryUnset,

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Invalid {field}: {reason}")]
    Validation { field: FieldName, reason: String },

    #[error("No default value set for {0} (run `icli defaults {0}`)")]
    DefaultNotSet(FieldName),

    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Input aborted")]
    Aborted,

    #[error("Could not open {0}")]
    Launch(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store error: {0}")]
    Store(String),
}

/// Structural problems with a template file. Fatal for the invoice at hand.
#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("{0} is not an .html file")]
    WrongExtension(PathBuf),

    #[error("template not found: {0}")]
    NotFound(PathBuf),

    #[error("template is missing slots: {}", .0.join(", "))]
    MissingSlots(Vec<String>),

    #[error("no templates found in {0}")]
    NoTemplates(PathBuf),
}

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("no value for slot `{0}`")]
    SlotValueMissing(Slot),

    #[error("invalid output path: {0:?}")]
    InvalidOutputPath(PathBuf),

    #[error("rendering engine not available: {0}")]
    EngineUnavailable(String),

    #[error("rendering engine failed: {0}")]
    Engine(String),

    #[error("rendering engine I/O: {0}")]
    EngineIo(#[source] std::io::Error),

    #[error("rendering engine exited with status {0}")]
    EngineExit(i32),

    #[error("rendering session used out of order: {0}")]
    Session(&'static str),
}

pub type Result<T> = std::result::Result<T, IcliError>;

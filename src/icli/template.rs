//! # Templates
//!
//! A template is any `.html` file whose elements carry `id` attributes for the
//! slots the renderer fills. Every template must expose at least the
//! [`REQUIRED_SLOTS`]; other known slots (see [`Slot`]) are filled when present.
//!
//! ```html
//! <p>Date: <span id="createdAt"></span></p>
//! <p>Pay to <span id="fullName"></span>, <span id="sortCode"></span> / <span id="bankNum"></span></p>
//! ```
//!
//! Templates are read-only: validation parses them into an in-memory tree and
//! rendering always works on a fresh copy.

use crate::error::{IcliError, Result, TemplateError};
use crate::model::{Slot, REQUIRED_SLOTS};
use kuchikiki::iter::NodeIterator;
use kuchikiki::traits::TendrilSink;
use kuchikiki::NodeRef;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

pub const TEMPLATE_EXTENSION: &str = "html";

/// A template that passed structural validation.
pub struct ValidatedTemplate {
    path: PathBuf,
    raw: String,
    document: NodeRef,
    ids: BTreeSet<String>,
}

impl ValidatedTemplate {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn document(&self) -> &NodeRef {
        &self.document
    }

    pub fn ids(&self) -> &BTreeSet<String> {
        &self.ids
    }

    pub fn has_slot(&self, slot: Slot) -> bool {
        self.ids.contains(slot.as_str())
    }

    /// Known slots exposed by this template, required ones included.
    pub fn slots(&self) -> impl Iterator<Item = Slot> + '_ {
        Slot::ALL.into_iter().filter(|slot| self.has_slot(*slot))
    }

    /// A new, independent tree parsed from the original markup.
    pub fn fresh_copy(&self) -> NodeRef {
        parse(&self.raw)
    }
}

/// Validate a template against the [`REQUIRED_SLOTS`].
pub fn validate(path: &Path) -> Result<ValidatedTemplate> {
    validate_with(path, &REQUIRED_SLOTS)
}

/// Validate a template against an explicit slot list.
///
/// A document without any `id` at all is rejected even when `required` is empty.
pub fn validate_with(path: &Path, required: &[Slot]) -> Result<ValidatedTemplate> {
    if path.extension().and_then(|e| e.to_str()) != Some(TEMPLATE_EXTENSION) {
        return Err(TemplateError::WrongExtension(path.to_path_buf()).into());
    }
    if !path.is_file() {
        return Err(TemplateError::NotFound(path.to_path_buf()).into());
    }

    let raw = fs::read_to_string(path).map_err(IcliError::Io)?;
    let document = parse(&raw);
    let ids = collect_ids(&document);

    let missing: Vec<String> = required
        .iter()
        .filter(|slot| !ids.contains(slot.as_str()))
        .map(|slot| slot.to_string())
        .collect();

    if !missing.is_empty() || ids.is_empty() {
        tracing::warn!(path = %path.display(), missing = ?missing, "template rejected");
        return Err(TemplateError::MissingSlots(missing).into());
    }

    tracing::debug!(path = %path.display(), ids = ids.len(), "template validated");
    Ok(ValidatedTemplate {
        path: path.to_path_buf(),
        raw,
        document,
        ids,
    })
}

pub fn parse(markup: &str) -> NodeRef {
    kuchikiki::parse_html().one(markup)
}

/// Every non-empty `id` attribute value in the document.
pub fn collect_ids(document: &NodeRef) -> BTreeSet<String> {
    document
        .descendants()
        .elements()
        .filter_map(|el| el.attributes.borrow().get("id").map(str::to_string))
        .filter(|id| !id.is_empty())
        .collect()
}

/// The `.html` files directly inside `dir`, sorted by path.
pub fn discover(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut templates = Vec::new();
    for entry in fs::read_dir(dir).map_err(IcliError::Io)? {
        let path = entry.map_err(IcliError::Io)?.path();
        if path.is_file() && path.extension().and_then(|e| e.to_str()) == Some(TEMPLATE_EXTENSION)
        {
            templates.push(path);
        }
    }
    templates.sort();
    Ok(templates)
}

//! # Rendering
//!
//! Turns a validated template plus a recorded invoice into `Invoice#<id>.pdf`.
//!
//! Rendering happens in two steps:
//!
//! 1. [`inject`]: fill a fresh copy of the template tree. Required slots must have
//!    a value; optional slots are filled when the template has them and the invoice
//!    carries a value. Text slots have their content replaced, `<img id="logo">`
//!    gets its `src` set, and the `items` slot gets one entry per line item
//!    appended (table rows, list items, or `div.item` blocks depending on the
//!    element). A print stylesheet fixing the paper size goes last in `<head>`,
//!    so template rules cannot override it.
//! 2. Print the filled markup through a [`RenderEngine`] session. The session is
//!    closed on every path, and the PDF reaches its final name only once it is
//!    complete.
//!
//! The template file itself is never modified.

pub mod chrome;
pub mod engine;

pub use chrome::ChromeEngine;
pub use engine::{PaperSize, PdfOptions, RenderEngine, RenderSession, SessionGuard};

use crate::error::{IcliError, RenderError, Result};
use crate::model::{Invoice, LineItem, Slot, SlotValue, REQUIRED_SLOTS};
use crate::template::{self, ValidatedTemplate};
use kuchikiki::iter::NodeIterator;
use kuchikiki::NodeRef;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub struct DocumentRenderer<E: RenderEngine> {
    engine: E,
    options: PdfOptions,
}

impl<E: RenderEngine> DocumentRenderer<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            options: PdfOptions::default(),
        }
    }

    pub fn with_options(mut self, options: PdfOptions) -> Self {
        self.options = options;
        self
    }

    /// Render `invoice` through `template` into the PDF at `output`.
    ///
    /// Nothing is written at `output` unless the whole render succeeds.
    pub fn render(
        &self,
        template: &ValidatedTemplate,
        invoice: &Invoice,
        output: &Path,
    ) -> Result<PathBuf> {
        let markup = inject(template, invoice, &self.options)?;
        check_output_path(output)?;

        let pdf = self.print(&markup)?;
        write_atomically(output, &pdf)?;
        tracing::info!(id = invoice.id, path = %output.display(), "invoice rendered");
        Ok(output.to_path_buf())
    }

    fn print(&self, markup: &str) -> std::result::Result<Vec<u8>, RenderError> {
        let mut session = SessionGuard::new(self.engine.open()?);
        let printed = drive(&mut *session, markup, &self.options);
        let closed = session.close();
        match (printed, closed) {
            (Ok(pdf), Ok(())) => Ok(pdf),
            (Ok(_), Err(e)) => Err(e),
            (Err(e), closed) => {
                if let Err(close_err) = closed {
                    tracing::warn!(error = %close_err, "render session did not close cleanly");
                }
                Err(e)
            }
        }
    }
}

fn drive<S: RenderSession>(
    session: &mut S,
    markup: &str,
    options: &PdfOptions,
) -> std::result::Result<Vec<u8>, RenderError> {
    session.load(markup)?;
    session.wait_until_loaded()?;
    session.print_pdf(options)
}

/// Fill the template's slots from `invoice`, add the print stylesheet for
/// `options` and serialize the result.
pub fn inject(
    template: &ValidatedTemplate,
    invoice: &Invoice,
    options: &PdfOptions,
) -> Result<String> {
    for slot in REQUIRED_SLOTS {
        if invoice.slot_value(slot).is_none() {
            return Err(RenderError::SlotValueMissing(slot).into());
        }
    }

    let document = template.fresh_copy();
    for slot in template.slots() {
        if let Some(value) = invoice.slot_value(slot) {
            fill(&document, slot, &value);
        }
    }
    add_print_style(&document, options);
    Ok(document.to_string())
}

fn print_css(options: &PdfOptions) -> String {
    let mut css = format!("@page {{ size: {} !important; }}", options.paper.css_name());
    if options.print_background {
        css.push_str(
            " * { -webkit-print-color-adjust: exact !important; print-color-adjust: exact !important; }",
        );
    }
    css
}

/// Append the print stylesheet as the last child of `<head>`. The HTML parser
/// always creates a head, even for fragments.
fn add_print_style(document: &NodeRef, options: &PdfOptions) {
    let head = match document.select_first("head") {
        Ok(head) => head.as_node().clone(),
        Err(()) => return,
    };
    if let Some(style) = fragment("<html><head><style></style></head></html>", "style") {
        style.append(NodeRef::new_text(print_css(options)));
        head.append(style);
    }
}

fn fill(document: &NodeRef, slot: Slot, value: &SlotValue<'_>) {
    let targets: Vec<NodeRef> = document
        .descendants()
        .elements()
        .filter(|el| el.attributes.borrow().get("id") == Some(slot.as_str()))
        .map(|el| el.as_node().clone())
        .collect();

    for target in targets {
        match value {
            SlotValue::Text(text) if slot == Slot::Logo && is_element(&target, "img") => {
                if let Some(el) = target.as_element() {
                    el.attributes.borrow_mut().insert("src", text.clone());
                }
            }
            SlotValue::Text(text) => set_text(&target, text),
            SlotValue::Items(items) => append_items(&target, items),
        }
    }
}

fn is_element(node: &NodeRef, tag: &str) -> bool {
    node.as_element()
        .map(|el| &*el.name.local == tag)
        .unwrap_or(false)
}

fn set_text(node: &NodeRef, text: &str) {
    let children: Vec<NodeRef> = node.children().collect();
    for child in children {
        child.detach();
    }
    node.append(NodeRef::new_text(text));
}

fn append_items(container: &NodeRef, items: &[LineItem]) {
    let tag = container
        .as_element()
        .map(|el| el.name.local.to_string())
        .unwrap_or_default();

    for item in items {
        let price = format_price(item.price);
        let entry = match tag.as_str() {
            "table" | "tbody" => fragment(
                r#"<table><tbody><tr class="item"><td class="item-name"></td><td class="item-price"></td></tr></tbody></table>"#,
                "tr",
            ),
            "ul" | "ol" => fragment(
                r#"<ul><li class="item"><span class="item-name"></span> <span class="item-price"></span></li></ul>"#,
                "li",
            ),
            _ => fragment(
                r#"<div class="item"><span class="item-name"></span> <span class="item-price"></span></div>"#,
                "div.item",
            ),
        };

        match entry {
            Some(entry) => {
                fill_class(&entry, "item-name", &item.item_name);
                fill_class(&entry, "item-price", &price);
                container.append(entry);
            }
            None => container.append(NodeRef::new_text(format!("{} {}", item.item_name, price))),
        }
    }
}

/// Parse `markup` and detach the first element matching `selector`.
fn fragment(markup: &str, selector: &str) -> Option<NodeRef> {
    let document = template::parse(markup);
    let node = document.select_first(selector).ok()?.as_node().clone();
    node.detach();
    Some(node)
}

fn fill_class(node: &NodeRef, class: &str, text: &str) {
    if let Ok(target) = node.select_first(&format!(".{}", class)) {
        set_text(target.as_node(), text);
    }
}

fn format_price(price: f64) -> String {
    format!("{:.2}", price)
}

fn check_output_path(output: &Path) -> Result<()> {
    let raw = output.as_os_str().to_string_lossy();
    let invalid = raw.is_empty()
        || raw.ends_with('/')
        || raw.ends_with(std::path::MAIN_SEPARATOR)
        || output.file_name().is_none()
        || output.is_dir();
    if invalid {
        return Err(RenderError::InvalidOutputPath(output.to_path_buf()).into());
    }
    Ok(())
}

fn write_atomically(output: &Path, bytes: &[u8]) -> Result<()> {
    let parent = match output.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(parent).map_err(IcliError::Io)?;
    tmp.write_all(bytes).map_err(IcliError::Io)?;
    tmp.persist(output).map_err(|e| IcliError::Io(e.error))?;
    Ok(())
}

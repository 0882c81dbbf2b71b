use chrono::{DateTime, Utc};
use colored::Colorize;
use icli::commands::{CmdMessage, MessageLevel};
use icli::error::Result;
use icli::fields::{self, FieldName};
use icli::model::{Config, Invoice};
use std::path::PathBuf;
use timeago::Formatter;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const LINE_WIDTH: usize = 100;
const TIME_WIDTH: usize = 14;
const ITEMS_WIDTH: usize = 10;
const DATE_FORMAT: &str = "%d/%m/%Y";

pub(super) fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        match message.level {
            MessageLevel::Info => println!("{}", message.content.dimmed()),
            MessageLevel::Success => println!("{}", message.content.green()),
            MessageLevel::Error => println!("{}", message.content.red()),
        }
    }
}

pub(super) fn print_history(invoices: &[Invoice]) {
    for invoice in invoices {
        println!("{}", history_line(invoice, Utc::now()));
    }
}

pub(super) fn print_history_json(invoices: &[Invoice]) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(invoices)?);
    Ok(())
}

fn history_line(invoice: &Invoice, now: DateTime<Utc>) -> String {
    let idx = format!("{:>4}. ", invoice.id);
    let date = format!("{}  ", invoice.created_at.format(DATE_FORMAT));
    let items = match invoice.items.len() {
        1 => "1 item".to_string(),
        n => format!("{} items", n),
    };
    let items = format!("{:<width$}", items, width = ITEMS_WIDTH);

    let fixed = idx.width() + date.width() + ITEMS_WIDTH + TIME_WIDTH;
    let available = LINE_WIDTH.saturating_sub(fixed);
    let company = truncate_to_width(&invoice.company_name, available);
    let padding = available.saturating_sub(company.width());

    format!(
        "{}{}{}{}{}{}",
        idx.yellow(),
        date,
        company.bold(),
        " ".repeat(padding),
        items.dimmed(),
        format_time_ago(invoice.created_at, now).dimmed()
    )
}

pub(super) fn print_config(config: &Config, paths: &[PathBuf]) {
    println!("{} {}", config.app_name.bold(), config.version.dimmed());
    println!("{:<12}{}", "created", config.created_at.format(DATE_FORMAT));
    match &config.invoices_path {
        Some(dir) => println!("{:<12}{}", "invoices", dir.display()),
        None => println!("{:<12}{}", "invoices", "(not set)".dimmed()),
    }
    println!();
    print_defaults(config);
    if !paths.is_empty() {
        println!();
        for path in paths {
            println!("{}", path.display().to_string().dimmed());
        }
    }
}

pub(super) fn print_defaults(config: &Config) {
    println!("{}", "Defaults".bold());
    for rule in fields::default_rules() {
        println!("  {}", default_line(config, rule.name, rule.required));
    }
}

fn default_line(config: &Config, field: FieldName, required: bool) -> String {
    let name = format!("{:<10}", field.as_str());
    match config.default_value(field) {
        Some(value) => format!("{} {}", name, value),
        None if required => format!("{} {}", name, "(not set)".red()),
        None => format!("{} {}", name, "(optional)".dimmed()),
    }
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    let mut result = String::new();
    let mut current_width = 0;

    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > max_width.saturating_sub(1) {
            result.push('…');
            return result;
        }
        result.push(c);
        current_width += char_width;
    }

    result
}

fn format_time_ago(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let duration = now.signed_duration_since(timestamp);
    let time_str = Formatter::new().convert(duration.to_std().unwrap_or_default());
    format!("{:>width$}", time_str, width = TIME_WIDTH)
}

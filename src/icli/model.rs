use crate::fields::{FieldName, FieldValue};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

pub const APP_NAME: &str = "Invoice CLI Tool";
const DATE_FORMAT: &str = "%d/%m/%Y";

/// Slots every template must expose.
pub const REQUIRED_SLOTS: [Slot; 4] = [Slot::CreatedAt, Slot::FullName, Slot::SortCode, Slot::BankNum];

/// Template slot names: the `id` attributes the renderer knows how to fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Slot {
    Id,
    CreatedAt,
    CompanyName,
    Items,
    SortCode,
    BankNum,
    FullName,
    Address,
    Postcode,
    Email,
    Logo,
}

impl Slot {
    pub const ALL: [Slot; 11] = [
        Slot::Id,
        Slot::CreatedAt,
        Slot::CompanyName,
        Slot::Items,
        Slot::SortCode,
        Slot::BankNum,
        Slot::FullName,
        Slot::Address,
        Slot::Postcode,
        Slot::Email,
        Slot::Logo,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Slot::Id => "id",
            Slot::CreatedAt => "createdAt",
            Slot::CompanyName => "companyName",
            Slot::Items => "items",
            Slot::SortCode => "sortCode",
            Slot::BankNum => "bankNum",
            Slot::FullName => "fullName",
            Slot::Address => "address",
            Slot::Postcode => "postcode",
            Slot::Email => "email",
            Slot::Logo => "logo",
        }
    }

    /// The default field backing this slot, if any.
    pub fn default_field(&self) -> Option<FieldName> {
        match self {
            Slot::SortCode => Some(FieldName::SortCode),
            Slot::BankNum => Some(FieldName::BankNum),
            Slot::FullName => Some(FieldName::FullName),
            Slot::Address => Some(FieldName::Address),
            Slot::Postcode => Some(FieldName::Postcode),
            Slot::Email => Some(FieldName::Email),
            Slot::Logo => Some(FieldName::Logo),
            Slot::Id | Slot::CreatedAt | Slot::CompanyName | Slot::Items => None,
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Personal details every invoice carries: the required slots backed by a default field.
pub fn personal_details() -> impl Iterator<Item = FieldName> {
    REQUIRED_SLOTS.iter().filter_map(|slot| slot.default_field())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub item_name: String,
    pub price: f64,
}

/// The config document, stored as `icli.json` in the app home.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(rename = "appName")]
    pub app_name: String,
    pub version: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoices_path: Option<PathBuf>,
    #[serde(default)]
    pub default_values: BTreeMap<FieldName, FieldValue>,
}

impl Config {
    pub fn new() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            created_at: Utc::now(),
            invoices_path: None,
            default_values: BTreeMap::new(),
        }
    }

    pub fn default_value(&self, name: FieldName) -> Option<&FieldValue> {
        self.default_values.get(&name)
    }

    /// Required default fields that have no stored value yet, in catalog order.
    pub fn unset_required_defaults(&self) -> Vec<FieldName> {
        crate::fields::default_rules()
            .filter(|rule| rule.required && self.default_value(rule.name).is_none())
            .map(|rule| rule.name)
            .collect()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

/// A fully resolved invoice that has not been recorded yet.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceDraft {
    pub template: PathBuf,
    pub company_name: String,
    pub items: Vec<LineItem>,
    pub created_at: DateTime<Utc>,
    pub details: BTreeMap<FieldName, FieldValue>,
}

impl InvoiceDraft {
    pub fn into_invoice(self, id: u64) -> Invoice {
        Invoice {
            id,
            template: self.template,
            company_name: self.company_name,
            items: self.items,
            created_at: self.created_at,
            details: self.details,
        }
    }
}

/// One entry of the invoice history. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: u64,
    pub template: PathBuf,
    pub company_name: String,
    pub items: Vec<LineItem>,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub details: BTreeMap<FieldName, FieldValue>,
}

/// What a slot gets filled with.
#[derive(Debug, Clone, PartialEq)]
pub enum SlotValue<'a> {
    Text(String),
    Items(&'a [LineItem]),
}

impl Invoice {
    /// The output file name, e.g. `Invoice#3.pdf`.
    pub fn file_name(&self) -> String {
        format!("Invoice#{}.pdf", self.id)
    }

    pub fn draft(&self) -> InvoiceDraft {
        InvoiceDraft {
            template: self.template.clone(),
            company_name: self.company_name.clone(),
            items: self.items.clone(),
            created_at: self.created_at,
            details: self.details.clone(),
        }
    }

    pub fn slot_value(&self, slot: Slot) -> Option<SlotValue<'_>> {
        match slot {
            Slot::Id => Some(SlotValue::Text(self.id.to_string())),
            Slot::CreatedAt => Some(SlotValue::Text(
                self.created_at.format(DATE_FORMAT).to_string(),
            )),
            Slot::CompanyName => Some(SlotValue::Text(self.company_name.clone())),
            Slot::Items => Some(SlotValue::Items(&self.items)),
            other => other
                .default_field()
                .and_then(|field| self.details.get(&field))
                .map(|value| SlotValue::Text(value.to_string())),
        }
    }
}

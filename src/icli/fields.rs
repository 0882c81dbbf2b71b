//! # Field Validation Rules
//!
//! The fixed catalog of every field icli ever asks for. Each [`FieldRule`] pairs a
//! field with its prompt text, its value kind and a predicate that turns raw input
//! into a typed [`FieldValue`] or a human readable rejection reason.
//!
//! Fields come in two groups:
//!
//! - **Default fields** (`sortCode`, `bankNum`, `fullName`, `address`, `postcode`,
//!   `email`, `logo`): personal details that can be stored once in the config and
//!   reused on every invoice.
//! - **Invoice fields** (`companyName`, `itemCount`, `itemName`, `price`): asked
//!   fresh for each invoice and never stored as defaults.
//!
//! Validation is purely syntactic except for `logo`, which also checks that the
//! URL answers. Any failure of that check is a rejection, never an error.

use crate::error::{IcliError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

const LOGO_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

static SORT_CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{2}-\d{2}-\d{2}$").expect("valid sort code pattern"));

static BANK_NUM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{8}$").expect("valid bank number pattern"));

static FULL_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z]+([ '-][a-zA-Z]+)+$").expect("valid name pattern"));

static ADDRESS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9\s,.\-]+$").expect("valid address pattern"));

static POSTCODE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^([A-Z]{1,2}\d{1,2}|[A-Z]{1,2}\d{1,2}[A-Z]?)\s?\d[A-Z]{2}$")
        .expect("valid postcode pattern")
});

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"));

static URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^(ftp|http|https)://[^ "]+$"#).expect("valid url pattern"));

/// Every field name known to icli.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldName {
    SortCode,
    BankNum,
    FullName,
    Address,
    Postcode,
    Email,
    Logo,
    CompanyName,
    ItemCount,
    ItemName,
    Price,
}

impl FieldName {
    pub const ALL: [FieldName; 11] = [
        FieldName::SortCode,
        FieldName::BankNum,
        FieldName::FullName,
        FieldName::Address,
        FieldName::Postcode,
        FieldName::Email,
        FieldName::Logo,
        FieldName::CompanyName,
        FieldName::ItemCount,
        FieldName::ItemName,
        FieldName::Price,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldName::SortCode => "sortCode",
            FieldName::BankNum => "bankNum",
            FieldName::FullName => "fullName",
            FieldName::Address => "address",
            FieldName::Postcode => "postcode",
            FieldName::Email => "email",
            FieldName::Logo => "logo",
            FieldName::CompanyName => "companyName",
            FieldName::ItemCount => "itemCount",
            FieldName::ItemName => "itemName",
            FieldName::Price => "price",
        }
    }

    /// Whether this field can be stored in the config's `default_values`.
    pub fn is_default(&self) -> bool {
        matches!(
            self,
            FieldName::SortCode
                | FieldName::BankNum
                | FieldName::FullName
                | FieldName::Address
                | FieldName::Postcode
                | FieldName::Email
                | FieldName::Logo
        )
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldName {
    type Err = IcliError;

    /// Field names match case-insensitively, so `sortcode` and `sortCode` are the same.
    fn from_str(s: &str) -> Result<Self> {
        FieldName::ALL
            .iter()
            .copied()
            .find(|name| name.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| IcliError::UnknownField(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
}

/// A validated field value as stored in the config and the invoice history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(serde_json::Number),
    Text(String),
}

impl FieldValue {
    pub fn text(s: impl Into<String>) -> Self {
        FieldValue::Text(s.into())
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => n.as_f64(),
            FieldValue::Text(_) => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            FieldValue::Number(n) => n.as_u64(),
            FieldValue::Text(_) => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Text(s) => f.write_str(s),
        }
    }
}

pub type Predicate = fn(&str) -> std::result::Result<FieldValue, String>;

#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub name: FieldName,
    pub required: bool,
    pub kind: FieldKind,
    pub prompt: &'static str,
    pub validate: Predicate,
}

impl FieldRule {
    /// Runs the predicate, tagging a rejection with this rule's field name.
    pub fn check(&self, raw: &str) -> Result<FieldValue> {
        (self.validate)(raw).map_err(|reason| IcliError::Validation {
            field: self.name,
            reason,
        })
    }
}

static CATALOG: [FieldRule; 11] = [
    FieldRule {
        name: FieldName::SortCode,
        required: true,
        kind: FieldKind::Text,
        prompt: "Enter your sort code",
        validate: validate_sort_code,
    },
    FieldRule {
        name: FieldName::BankNum,
        required: true,
        kind: FieldKind::Number,
        prompt: "Enter your bank account number",
        validate: validate_bank_num,
    },
    FieldRule {
        name: FieldName::FullName,
        required: true,
        kind: FieldKind::Text,
        prompt: "Enter your full name",
        validate: validate_full_name,
    },
    FieldRule {
        name: FieldName::Address,
        required: true,
        kind: FieldKind::Text,
        prompt: "Enter your line of address",
        validate: validate_address,
    },
    FieldRule {
        name: FieldName::Postcode,
        required: true,
        kind: FieldKind::Text,
        prompt: "Enter your postcode",
        validate: validate_postcode,
    },
    FieldRule {
        name: FieldName::Email,
        required: true,
        kind: FieldKind::Text,
        prompt: "Enter your email address",
        validate: validate_email,
    },
    FieldRule {
        name: FieldName::Logo,
        required: false,
        kind: FieldKind::Text,
        prompt: "Enter your logo source",
        validate: validate_logo,
    },
    FieldRule {
        name: FieldName::CompanyName,
        required: true,
        kind: FieldKind::Text,
        prompt: "Enter your company name",
        validate: validate_company_name,
    },
    FieldRule {
        name: FieldName::ItemCount,
        required: true,
        kind: FieldKind::Number,
        prompt: "How many items do you want to add?",
        validate: validate_item_count,
    },
    FieldRule {
        name: FieldName::ItemName,
        required: true,
        kind: FieldKind::Text,
        prompt: "Enter the item name",
        validate: validate_item_name,
    },
    FieldRule {
        name: FieldName::Price,
        required: true,
        kind: FieldKind::Number,
        prompt: "Enter the item price",
        validate: validate_price,
    },
];

/// The rule for a field. Every [`FieldName`] has exactly one.
pub fn rule(name: FieldName) -> &'static FieldRule {
    CATALOG
        .iter()
        .find(|r| r.name == name)
        .unwrap_or_else(|| unreachable!("catalog covers every field name"))
}

/// Looks a rule up by its (case-insensitive) name.
pub fn get(name: &str) -> Option<&'static FieldRule> {
    name.parse::<FieldName>().ok().map(rule)
}

/// Validates `raw` against the rule called `name`.
pub fn validate(name: &str, raw: &str) -> Result<FieldValue> {
    let rule = get(name).ok_or_else(|| IcliError::UnknownField(name.to_string()))?;
    rule.check(raw)
}

/// Rules for the fields that can be stored as defaults, in catalog order.
pub fn default_rules() -> impl Iterator<Item = &'static FieldRule> {
    CATALOG.iter().filter(|r| r.name.is_default())
}

fn validate_sort_code(raw: &str) -> std::result::Result<FieldValue, String> {
    let raw = raw.trim();
    if SORT_CODE_RE.is_match(raw) {
        Ok(FieldValue::text(raw))
    } else {
        Err("Sort code must be in the format XX-XX-XX (e.g., 12-34-56)".to_string())
    }
}

fn validate_bank_num(raw: &str) -> std::result::Result<FieldValue, String> {
    let invalid = || "Bank account number must be exactly 8 digits long".to_string();
    // Checked on the number's own rendering, so a leading zero does not count.
    let num: u64 = raw.trim().parse().map_err(|_| invalid())?;
    if BANK_NUM_RE.is_match(&num.to_string()) {
        Ok(FieldValue::Number(num.into()))
    } else {
        Err(invalid())
    }
}

fn validate_full_name(raw: &str) -> std::result::Result<FieldValue, String> {
    let raw = raw.trim();
    if FULL_NAME_RE.is_match(raw) {
        Ok(FieldValue::text(raw))
    } else {
        Err("Full name must contain at least two parts (e.g., John Doe) and only letters, spaces, hyphens, or apostrophes".to_string())
    }
}

fn validate_address(raw: &str) -> std::result::Result<FieldValue, String> {
    let raw = raw.trim();
    if raw.chars().count() >= 5 && ADDRESS_RE.is_match(raw) {
        Ok(FieldValue::text(raw))
    } else {
        Err("Address must be at least 5 characters long and can contain letters, numbers, spaces, commas, and periods.".to_string())
    }
}

fn validate_postcode(raw: &str) -> std::result::Result<FieldValue, String> {
    let raw = raw.trim();
    if POSTCODE_RE.is_match(raw) {
        Ok(FieldValue::text(raw))
    } else {
        Err("Postcode must be in a valid format (e.g., AB1 2CD).".to_string())
    }
}

fn validate_email(raw: &str) -> std::result::Result<FieldValue, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err("Email cannot be empty".to_string());
    }
    if !EMAIL_RE.is_match(raw) {
        return Err("Please insert a valid email address.".to_string());
    }
    Ok(FieldValue::text(raw))
}

fn validate_logo(raw: &str) -> std::result::Result<FieldValue, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err("Logo source cannot be empty".to_string());
    }
    if !URL_RE.is_match(raw) {
        return Err("Please enter a valid URL".to_string());
    }
    probe_url(raw)?;
    Ok(FieldValue::text(raw))
}

/// HEAD request against the logo URL. Transport failures are rejections.
fn probe_url(url: &str) -> std::result::Result<(), String> {
    match ureq::head(url).timeout(LOGO_PROBE_TIMEOUT).call() {
        Ok(response) if response.status() == 200 => Ok(()),
        Ok(_) | Err(ureq::Error::Status(_, _)) => {
            Err("The URL must point to a valid image".to_string())
        }
        Err(e) => {
            tracing::debug!(url, error = %e, "logo probe failed");
            Err("Unable to access URL.".to_string())
        }
    }
}

fn validate_company_name(raw: &str) -> std::result::Result<FieldValue, String> {
    let trimmed = raw.trim();
    if trimmed.chars().count() > 2 {
        Ok(FieldValue::text(trimmed))
    } else {
        Err("Company name must be at least 3 characters long".to_string())
    }
}

fn validate_item_count(raw: &str) -> std::result::Result<FieldValue, String> {
    match raw.trim().parse::<u64>() {
        Ok(n) if n > 0 => Ok(FieldValue::Number(n.into())),
        _ => Err("Must be a whole number greater than 0".to_string()),
    }
}

fn validate_item_name(raw: &str) -> std::result::Result<FieldValue, String> {
    let trimmed = raw.trim();
    if trimmed.chars().count() > 1 {
        Ok(FieldValue::text(trimmed))
    } else {
        Err("Item name must be at least 2 characters long".to_string())
    }
}

fn validate_price(raw: &str) -> std::result::Result<FieldValue, String> {
    let invalid = || "Price must be greater than zero".to_string();
    let price: f64 = raw.trim().parse().map_err(|_| invalid())?;
    if !(price.is_finite() && price > 0.0) {
        return Err(invalid());
    }
    serde_json::Number::from_f64(price)
        .map(FieldValue::Number)
        .ok_or_else(invalid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_names_are_unique() {
        for name in FieldName::ALL {
            assert_eq!(CATALOG.iter().filter(|r| r.name == name).count(), 1);
        }
    }

    #[test]
    fn test_sort_code() {
        assert_eq!(
            validate("sortCode", "12-34-56").unwrap(),
            FieldValue::text("12-34-56")
        );
        assert!(validate("sortCode", "123456").is_err());
        assert!(validate("sortCode", "12-34-5").is_err());
    }

    #[test]
    fn test_bank_num() {
        let value = validate("bankNum", "12345678").unwrap();
        assert_eq!(value.as_u64(), Some(12345678));
        assert_eq!(value.to_string(), "12345678");
        assert!(validate("bankNum", "1234567").is_err());
        assert!(validate("bankNum", "123456789").is_err());
        assert!(validate("bankNum", "1234abcd").is_err());
    }

    #[test]
    fn test_bank_num_leading_zero_is_dropped() {
        assert!(validate("bankNum", "01234567").is_err());
    }

    #[test]
    fn test_full_name() {
        assert!(validate("fullName", "John Doe").is_ok());
        assert!(validate("fullName", "Mary-Jane O'Neil").is_ok());
        assert!(validate("fullName", "John").is_err());
        assert!(validate("fullName", "John 2nd").is_err());
    }

    #[test]
    fn test_address() {
        assert!(validate("address", "1 High Street, Leeds").is_ok());
        assert!(validate("address", "1 Hi").is_err());
        assert!(validate("address", "1 High Street #4").is_err());
    }

    #[test]
    fn test_postcode() {
        assert!(validate("postcode", "AB1 2CD").is_ok());
        assert!(validate("postcode", "sw1a 1aa").is_ok());
        assert!(validate("postcode", "M1 1AE").is_ok());
        assert!(validate("postcode", "12345").is_err());
    }

    #[test]
    fn test_email() {
        assert!(validate("email", "jo@example.com").is_ok());
        assert!(validate("email", "jo@example").is_err());
        assert!(validate("email", "").is_err());
    }

    #[test]
    fn test_logo_rejects_malformed_url_without_network() {
        assert!(validate("logo", "").is_err());
        assert!(validate("logo", "not a url").is_err());
        assert!(validate("logo", "file:///tmp/logo.png").is_err());
    }

    #[test]
    fn test_unreachable_logo_is_rejected_not_raised() {
        match validate("logo", "http://127.0.0.1:1/logo.png") {
            Err(IcliError::Validation { field, reason }) => {
                assert_eq!(field, FieldName::Logo);
                assert_eq!(reason, "Unable to access URL.");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_values_match_rule_kind() {
        for (name, raw) in [
            ("sortCode", "12-34-56"),
            ("bankNum", "12345678"),
            ("companyName", "Acme Ltd"),
            ("itemCount", "2"),
            ("itemName", "Consulting"),
            ("price", "9.99"),
        ] {
            let rule = get(name).unwrap();
            let value = rule.check(raw).unwrap();
            let is_number = matches!(value, FieldValue::Number(_));
            assert_eq!(is_number, rule.kind == FieldKind::Number, "{}", name);
        }
    }

    #[test]
    fn test_invoice_fields() {
        assert!(validate("companyName", "  Acme  ").is_ok());
        assert!(validate("companyName", " Ac ").is_err());
        assert!(validate("itemName", "Qa").is_ok());
        assert!(validate("itemName", " Q ").is_err());
        assert!(validate("itemCount", "3").is_ok());
        assert!(validate("itemCount", "0").is_err());
        assert!(validate("itemCount", "1.5").is_err());
        assert_eq!(validate("price", "100").unwrap().as_f64(), Some(100.0));
        assert!(validate("price", "0").is_err());
        assert!(validate("price", "-3").is_err());
        assert!(validate("price", "NaN").is_err());
    }

    #[test]
    fn test_unknown_field() {
        assert!(matches!(
            validate("nickname", "x"),
            Err(IcliError::UnknownField(name)) if name == "nickname"
        ));
    }

    #[test]
    fn test_names_match_case_insensitively() {
        assert_eq!("SORTCODE".parse::<FieldName>().unwrap(), FieldName::SortCode);
        assert_eq!("bankNum".parse::<FieldName>().unwrap(), FieldName::BankNum);
    }

    #[test]
    fn test_rejection_carries_field_and_reason() {
        match validate("sortCode", "nope") {
            Err(IcliError::Validation { field, reason }) => {
                assert_eq!(field, FieldName::SortCode);
                assert!(reason.contains("XX-XX-XX"));
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_default_rules() {
        let names: Vec<_> = default_rules().map(|r| r.name).collect();
        assert_eq!(names.len(), 7);
        assert!(!names.contains(&FieldName::CompanyName));
        assert!(!rule(FieldName::Logo).required);
    }

    #[test]
    fn test_value_serializes_as_plain_json() {
        let num = validate("bankNum", "12345678").unwrap();
        assert_eq!(serde_json::to_string(&num).unwrap(), "12345678");
        let text = FieldValue::text("12-34-56");
        assert_eq!(serde_json::to_string(&text).unwrap(), "\"12-34-56\"");
        let parsed: FieldValue = serde_json::from_str("12345678").unwrap();
        assert_eq!(parsed, num);
    }
}

//! # Field Resolution
//!
//! Builds the complete, validated field set for one invoice.
//!
//! Personal details (the required slots backed by a default field: `fullName`,
//! `sortCode`, `bankNum`) come either from the config's `default_values` or, when
//! defaults are bypassed, from fresh answers that are used for this invoice only.
//! Invoice fields (company name, line items) are always asked fresh.
//!
//! There is no partial result: the first field that fails aborts the resolution.

use crate::error::{IcliError, Result};
use crate::fields::{self, FieldName, FieldRule, FieldValue};
use crate::model::{personal_details, Config, InvoiceDraft, LineItem};
use chrono::Utc;
use std::collections::BTreeMap;
use std::path::Path;

/// The interactive side of icli, seen from the core.
///
/// Returning [`IcliError::Aborted`] cancels the current operation.
pub trait Prompter {
    /// Ask for a value for `rule`, showing `label` as the question.
    ///
    /// The answer must come out of [`FieldRule::check`]: callers store it as is.
    /// Implementations may re-ask after a rejection; otherwise they return the
    /// rejection itself.
    fn ask(&mut self, rule: &FieldRule, label: &str) -> Result<FieldValue>;

    /// Pick one of `options`, returning its index.
    fn choose(&mut self, message: &str, options: &[String]) -> Result<usize>;

    /// Free-form input with an optional default.
    fn input(&mut self, message: &str, default: Option<&str>) -> Result<String>;
}

/// Ask for one field through its catalog rule.
pub fn elicit<P: Prompter>(prompter: &mut P, field: FieldName, label: &str) -> Result<FieldValue> {
    prompter.ask(fields::rule(field), label)
}

/// Resolve every field of a new invoice built from `template`.
///
/// With `use_defaults`, each personal detail must already be in
/// `config.default_values` ([`IcliError::DefaultNotSet`] otherwise), and any other
/// stored defaults are carried along for optional slots. Without it, the personal
/// details are asked for and never written back to the config.
pub fn resolve_for_invoice<P: Prompter>(
    config: &Config,
    use_defaults: bool,
    template: &Path,
    prompter: &mut P,
) -> Result<InvoiceDraft> {
    let mut details = if use_defaults {
        details_from_defaults(config)?
    } else {
        BTreeMap::new()
    };

    let company_name = elicit(
        prompter,
        FieldName::CompanyName,
        fields::rule(FieldName::CompanyName).prompt,
    )?
    .to_string();

    let count = elicit(
        prompter,
        FieldName::ItemCount,
        fields::rule(FieldName::ItemCount).prompt,
    )?
    .as_u64()
    .ok_or_else(|| invalid(FieldName::ItemCount, "not a whole number"))?;

    let mut items = Vec::new();
    for n in 1..=count {
        let item_name =
            elicit(prompter, FieldName::ItemName, &format!("Enter the name for item {}", n))?
                .to_string();
        let price = elicit(prompter, FieldName::Price, &format!("Enter the price for item {}", n))?
            .as_f64()
            .ok_or_else(|| invalid(FieldName::Price, "not a number"))?;
        items.push(LineItem { item_name, price });
    }

    if !use_defaults {
        for field in personal_details() {
            let value = elicit(prompter, field, fields::rule(field).prompt)?;
            details.insert(field, value);
        }
    }

    tracing::debug!(items = items.len(), use_defaults, "invoice fields resolved");
    Ok(InvoiceDraft {
        template: template.to_path_buf(),
        company_name,
        items,
        created_at: Utc::now(),
        details,
    })
}

fn details_from_defaults(config: &Config) -> Result<BTreeMap<FieldName, FieldValue>> {
    let mut details = BTreeMap::new();
    for field in personal_details() {
        let value = config
            .default_value(field)
            .ok_or(IcliError::DefaultNotSet(field))?;
        details.insert(field, value.clone());
    }
    for rule in fields::default_rules() {
        if let Some(value) = config.default_value(rule.name) {
            details.entry(rule.name).or_insert_with(|| value.clone());
        }
    }
    Ok(details)
}

fn invalid(field: FieldName, reason: &str) -> IcliError {
    IcliError::Validation {
        field,
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{config_with_defaults, ScriptedPrompter};
    use std::path::PathBuf;

    fn template() -> PathBuf {
        PathBuf::from("/templates/basic.html")
    }

    #[test]
    fn test_resolve_with_defaults() {
        let config = config_with_defaults();
        let mut prompter = ScriptedPrompter::new(["Acme Ltd", "1", "Consulting", "100"]);

        let draft = resolve_for_invoice(&config, true, &template(), &mut prompter).unwrap();

        assert_eq!(draft.company_name, "Acme Ltd");
        assert_eq!(
            draft.items,
            vec![LineItem {
                item_name: "Consulting".to_string(),
                price: 100.0
            }]
        );
        assert_eq!(
            draft.details.get(&FieldName::SortCode),
            Some(&FieldValue::text("12-34-56"))
        );
        assert_eq!(
            draft.details.get(&FieldName::FullName),
            Some(&FieldValue::text("John Doe"))
        );
        assert_eq!(draft.template, template());
        assert!(prompter.is_exhausted());
    }

    #[test]
    fn test_optional_defaults_are_carried() {
        let mut config = config_with_defaults();
        config
            .default_values
            .insert(FieldName::Email, FieldValue::text("jo@example.com"));
        let mut prompter = ScriptedPrompter::new(["Acme Ltd", "1", "Consulting", "100"]);

        let draft = resolve_for_invoice(&config, true, &template(), &mut prompter).unwrap();
        assert_eq!(
            draft.details.get(&FieldName::Email),
            Some(&FieldValue::text("jo@example.com"))
        );
        assert!(!draft.details.contains_key(&FieldName::Logo));
    }

    #[test]
    fn test_missing_default_fails_before_prompting() {
        let mut config = config_with_defaults();
        config.default_values.remove(&FieldName::BankNum);
        let mut prompter = ScriptedPrompter::new(["Acme Ltd", "1", "Consulting", "100"]);

        let err = resolve_for_invoice(&config, true, &template(), &mut prompter).unwrap_err();
        assert!(matches!(err, IcliError::DefaultNotSet(FieldName::BankNum)));
        assert!(prompter.asked().is_empty());
    }

    #[test]
    fn test_bypassing_defaults_asks_fresh_values() {
        let config = config_with_defaults();
        let mut prompter = ScriptedPrompter::new([
            "Acme Ltd",
            "2",
            "Design",
            "50",
            "Build",
            "75.5",
            "Jane Roe",
            "65-43-21",
            "87654321",
        ]);

        let draft = resolve_for_invoice(&config, false, &template(), &mut prompter).unwrap();

        assert_eq!(draft.items.len(), 2);
        assert_eq!(draft.items[1].price, 75.5);
        assert_eq!(
            draft.details.get(&FieldName::FullName),
            Some(&FieldValue::text("Jane Roe"))
        );
        assert_eq!(
            draft.details.get(&FieldName::SortCode),
            Some(&FieldValue::text("65-43-21"))
        );
        // Stored defaults are left alone
        assert_eq!(
            config.default_value(FieldName::FullName),
            Some(&FieldValue::text("John Doe"))
        );
        assert_eq!(
            prompter.asked(),
            &[
                FieldName::CompanyName,
                FieldName::ItemCount,
                FieldName::ItemName,
                FieldName::Price,
                FieldName::ItemName,
                FieldName::Price,
                FieldName::FullName,
                FieldName::SortCode,
                FieldName::BankNum,
            ]
        );
    }

    #[test]
    fn test_bypassing_defaults_works_without_any() {
        let config = Config::new();
        let mut prompter = ScriptedPrompter::new([
            "Acme Ltd", "1", "Design", "50", "Jane Roe", "65-43-21", "87654321",
        ]);
        assert!(resolve_for_invoice(&config, false, &template(), &mut prompter).is_ok());
    }

    #[test]
    fn test_any_invalid_field_aborts() {
        let config = config_with_defaults();

        let mut short_company = ScriptedPrompter::new(["Ac", "1", "Consulting", "100"]);
        assert!(matches!(
            resolve_for_invoice(&config, true, &template(), &mut short_company),
            Err(IcliError::Validation {
                field: FieldName::CompanyName,
                ..
            })
        ));

        let mut zero_items = ScriptedPrompter::new(["Acme Ltd", "0"]);
        assert!(matches!(
            resolve_for_invoice(&config, true, &template(), &mut zero_items),
            Err(IcliError::Validation {
                field: FieldName::ItemCount,
                ..
            })
        ));

        let mut free_item = ScriptedPrompter::new(["Acme Ltd", "1", "Consulting", "0"]);
        assert!(matches!(
            resolve_for_invoice(&config, true, &template(), &mut free_item),
            Err(IcliError::Validation {
                field: FieldName::Price,
                ..
            })
        ));

        let mut bad_sort_code = ScriptedPrompter::new([
            "Acme Ltd", "1", "Design", "50", "Jane Roe", "123456", "87654321",
        ]);
        assert!(matches!(
            resolve_for_invoice(&config, false, &template(), &mut bad_sort_code),
            Err(IcliError::Validation {
                field: FieldName::SortCode,
                ..
            })
        ));
    }

    #[test]
    fn test_abort_propagates() {
        let config = config_with_defaults();
        let mut prompter = ScriptedPrompter::new(["Acme Ltd"]);
        assert!(matches!(
            resolve_for_invoice(&config, true, &template(), &mut prompter),
            Err(IcliError::Aborted)
        ));
    }
}

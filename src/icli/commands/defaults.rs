use crate::commands::{CmdMessage, CmdResult};
use crate::error::{IcliError, Result};
use crate::fields::{self, FieldName};
use crate::resolver::Prompter;
use crate::store::{ConfigStore, StorageBackend};

#[derive(Debug, Clone)]
pub enum DefaultsAction {
    Show,
    /// Ask for each named field in turn.
    Prompt(Vec<String>),
    Set(String, String),
}

pub fn run<B: StorageBackend, P: Prompter>(
    store: &ConfigStore<B>,
    prompter: &mut P,
    action: DefaultsAction,
) -> Result<CmdResult> {
    match action {
        DefaultsAction::Show => Ok(CmdResult::default().with_config(store.load()?)),
        DefaultsAction::Prompt(names) => {
            let mut result = CmdResult::default();
            let mut known = Vec::new();
            for name in names {
                match parse_default(&name) {
                    Ok(field) => known.push(field),
                    Err(e) => result.add_message(CmdMessage::error(e.to_string())),
                }
            }
            let prompted = prompt_fields(store, prompter, &known)?;
            result.messages.extend(prompted.messages);
            Ok(result.with_config(store.load()?))
        }
        DefaultsAction::Set(name, value) => {
            let mut result = CmdResult::default();
            match store.set_default_value(&name, &value) {
                Ok(stored) => result.add_message(CmdMessage::success(format!(
                    "{} set to {}",
                    name, stored
                ))),
                Err(e @ (IcliError::UnknownField(_) | IcliError::Validation { .. })) => {
                    result.add_message(CmdMessage::error(e.to_string()))
                }
                Err(e) => return Err(e),
            }
            Ok(result.with_config(store.load()?))
        }
    }
}

/// Ask for and store each of `wanted`. Rejected answers become error messages;
/// an abort stops everything.
pub fn prompt_fields<B: StorageBackend, P: Prompter>(
    store: &ConfigStore<B>,
    prompter: &mut P,
    wanted: &[FieldName],
) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    for &field in wanted {
        let rule = fields::rule(field);
        match prompter.ask(rule, rule.prompt) {
            Ok(value) => {
                store.store_checked_default(field, value)?;
                result.add_message(CmdMessage::success(format!("Saved {}", field)));
            }
            Err(e @ IcliError::Validation { .. }) => {
                result.add_message(CmdMessage::error(e.to_string()))
            }
            Err(e) => return Err(e),
        }
    }
    Ok(result)
}

/// Every required default field, in catalog order.
pub fn required_fields() -> Vec<FieldName> {
    fields::default_rules()
        .filter(|rule| rule.required)
        .map(|rule| rule.name)
        .collect()
}

fn parse_default(name: &str) -> Result<FieldName> {
    let field: FieldName = name.parse()?;
    if field.is_default() {
        Ok(field)
    } else {
        Err(IcliError::UnknownField(name.to_string()))
    }
}

use crate::commands::{defaults, CmdMessage, CmdResult};
use crate::error::Result;
use crate::resolver::Prompter;
use crate::store::{ConfigStore, StorageBackend};
use directories::BaseDirs;
use std::path::{Path, PathBuf};

/// First-run flow: create the config, pick the invoices directory, then ask for
/// whatever required defaults are still unset.
///
/// Safe to run again; every step skips what is already in place.
pub fn run<B: StorageBackend, P: Prompter>(
    store: &ConfigStore<B>,
    prompter: &mut P,
    suggested_invoices_dir: &Path,
) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    if store.init()? {
        result.add_message(CmdMessage::success(format!(
            "Created config at {}",
            store.path().display()
        )));
    }

    let mut config = store.load()?;
    match &config.invoices_path {
        Some(dir) => result.add_message(CmdMessage::info(format!(
            "Invoices are saved to {}",
            dir.display()
        ))),
        None => {
            let suggestion = suggested_invoices_dir.to_string_lossy();
            let answer = prompter.input(
                "Where should we save all your invoices?",
                Some(suggestion.as_ref()),
            )?;
            let dir = expand_home(answer.trim());
            config = store.set_invoices_directory(&dir)?;
            result.add_message(CmdMessage::success(format!(
                "Invoices will be saved to {}",
                dir.display()
            )));
        }
    }

    let missing = config.unset_required_defaults();
    if !missing.is_empty() {
        result.add_message(CmdMessage::info(
            "Let's set up the details printed on every invoice.",
        ));
        let prompted = defaults::prompt_fields(store, prompter, &missing)?;
        result.messages.extend(prompted.messages);
    }

    Ok(result.with_config(store.load()?))
}

/// Expand a leading `~` to the home directory.
pub fn expand_home(raw: &str) -> PathBuf {
    let home = BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf());
    match (raw.strip_prefix('~'), home) {
        (Some(rest), Some(home)) if rest.is_empty() => home,
        (Some(rest), Some(home)) if rest.starts_with('/') => {
            home.join(rest.trim_start_matches('/'))
        }
        _ => PathBuf::from(raw),
    }
}

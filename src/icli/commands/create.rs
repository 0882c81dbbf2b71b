//! The invoice pipeline: pick and validate a template, resolve the fields,
//! record the invoice, then render it.
//!
//! Recording happens before rendering. A render failure is reported as an error
//! but the invoice keeps its id and stays in the history.

use crate::commands::{CmdMessage, CmdResult};
use crate::error::{IcliError, Result, TemplateError};
use crate::render::{DocumentRenderer, RenderEngine};
use crate::resolver::{self, Prompter};
use crate::store::{ConfigStore, InvoiceStore, StorageBackend};
use crate::template;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct CreateOptions {
    /// Template to use. When absent, one is picked from the templates directory.
    pub template: Option<PathBuf>,
    pub use_defaults: bool,
}

impl Default for CreateOptions {
    fn default() -> Self {
        Self {
            template: None,
            use_defaults: true,
        }
    }
}

pub fn run<B: StorageBackend, E: RenderEngine, P: Prompter>(
    configs: &ConfigStore<B>,
    invoices: &InvoiceStore<B>,
    renderer: &DocumentRenderer<E>,
    templates_dir: &Path,
    prompter: &mut P,
    options: CreateOptions,
) -> Result<CmdResult> {
    let config = configs.load()?;
    let output_dir = config
        .invoices_path
        .clone()
        .ok_or(IcliError::InvoicesDirectoryUnset)?;

    let template_path = match options.template {
        Some(path) => path,
        None => choose_template(templates_dir, prompter)?,
    };
    let template = template::validate(&template_path)?;

    let draft =
        resolver::resolve_for_invoice(&config, options.use_defaults, template.path(), prompter)?;
    let invoice = invoices.append(draft)?;

    let output = output_dir.join(invoice.file_name());
    if let Err(e) = renderer.render(&template, &invoice, &output) {
        tracing::error!(id = invoice.id, error = %e, "invoice recorded but not rendered");
        return Err(e);
    }

    let mut result = CmdResult::default()
        .with_invoices(vec![invoice.clone()])
        .with_paths(vec![output.clone()]);
    result.add_message(CmdMessage::success(format!(
        "Invoice #{} saved to {}",
        invoice.id,
        output.display()
    )));
    Ok(result)
}

/// Pick a template from `dir`, asking only when there is more than one.
pub fn choose_template<P: Prompter>(dir: &Path, prompter: &mut P) -> Result<PathBuf> {
    let mut found = template::discover(dir)?;
    match found.len() {
        0 => Err(TemplateError::NoTemplates(dir.to_path_buf()).into()),
        1 => Ok(found.remove(0)),
        _ => {
            let names: Vec<String> = found
                .iter()
                .map(|p| {
                    p.file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_else(|| p.display().to_string())
                })
                .collect();
            let index = prompter.choose("Choose a template", &names)?;
            if index >= found.len() {
                return Err(IcliError::Aborted);
            }
            Ok(found.swap_remove(index))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RenderError;
    use crate::test_utils::{FakeEngine, FakeFailure, ScriptedPrompter, TestEnv, BASIC_TEMPLATE};
    use std::fs;

    const ANSWERS: [&str; 4] = ["Acme Ltd", "1", "Consulting", "100"];

    #[test]
    fn test_creates_record_and_pdf() {
        let env = TestEnv::new();
        let mut prompter = ScriptedPrompter::new(ANSWERS);

        let result = env
            .api
            .create_invoice(&mut prompter, CreateOptions::default())
            .unwrap();

        assert_eq!(result.invoices[0].id, 1);
        let pdf = env.invoices_dir.join("Invoice#1.pdf");
        assert!(pdf.is_file());
        assert_eq!(result.paths, vec![pdf]);
        assert_eq!(env.api.history().unwrap().invoices.len(), 1);
    }

    #[test]
    fn test_ids_increase_across_runs() {
        let env = TestEnv::new();
        for expected in 1..=2u64 {
            let mut prompter = ScriptedPrompter::new(ANSWERS);
            let result = env
                .api
                .create_invoice(&mut prompter, CreateOptions::default())
                .unwrap();
            assert_eq!(result.invoices[0].id, expected);
        }
        assert!(env.invoices_dir.join("Invoice#1.pdf").is_file());
        assert!(env.invoices_dir.join("Invoice#2.pdf").is_file());
    }

    #[test]
    fn test_render_failure_keeps_the_record() {
        let env = TestEnv::with_engine(FakeEngine::failing(FakeFailure::Print));
        let mut prompter = ScriptedPrompter::new(ANSWERS);

        let err = env
            .api
            .create_invoice(&mut prompter, CreateOptions::default())
            .unwrap_err();

        assert!(matches!(err, IcliError::Render(RenderError::Engine(_))));
        let history = env.api.history().unwrap().invoices;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].id, 1);
        assert!(!env.invoices_dir.join("Invoice#1.pdf").exists());
        assert_eq!(env.engine.closed(), 1);
    }

    #[test]
    fn test_invalid_template_records_nothing() {
        let env = TestEnv::new();
        let broken = env.home.join("broken.html");
        fs::write(&broken, r#"<p id="createdAt"></p>"#).unwrap();
        let mut prompter = ScriptedPrompter::new(ANSWERS);

        let err = env
            .api
            .create_invoice(
                &mut prompter,
                CreateOptions {
                    template: Some(broken),
                    use_defaults: true,
                },
            )
            .unwrap_err();

        assert!(matches!(
            err,
            IcliError::Template(TemplateError::MissingSlots(_))
        ));
        assert!(prompter.asked().is_empty());
        assert!(env.api.history().unwrap().invoices.is_empty());
    }

    #[test]
    fn test_failed_resolution_records_nothing() {
        let env = TestEnv::new();
        let mut prompter = ScriptedPrompter::new(["Acme Ltd", "zero"]);
        assert!(env
            .api
            .create_invoice(&mut prompter, CreateOptions::default())
            .is_err());
        assert!(env.api.history().unwrap().invoices.is_empty());
        assert_eq!(env.engine.opened(), 0);
    }

    #[test]
    fn test_requires_invoices_directory() {
        let env = TestEnv::bare();
        env.api.config_store().init().unwrap();
        let mut prompter = ScriptedPrompter::new(ANSWERS);
        assert!(matches!(
            env.api
                .create_invoice(&mut prompter, CreateOptions::default()),
            Err(IcliError::InvoicesDirectoryUnset)
        ));
    }

    #[test]
    fn test_choose_template() {
        let env = TestEnv::new();
        // One template: no question asked
        let mut silent = ScriptedPrompter::new(Vec::<String>::new());
        assert_eq!(choose_template(&env.home, &mut silent).unwrap(), env.template);

        let other = env.home.join("fancy.html");
        fs::write(&other, BASIC_TEMPLATE).unwrap();
        let mut prompter = ScriptedPrompter::new(["2"]);
        assert_eq!(choose_template(&env.home, &mut prompter).unwrap(), other);

        let empty = tempfile::TempDir::new().unwrap();
        assert!(matches!(
            choose_template(empty.path(), &mut silent),
            Err(IcliError::Template(TemplateError::NoTemplates(_)))
        ));
    }
}

use crate::api::IcliApi;
use crate::error::{IcliError, RenderError, Result};
use crate::fields::{FieldName, FieldRule, FieldValue};
use crate::model::{Config, Invoice, LineItem};
use crate::render::{PdfOptions, RenderEngine, RenderSession};
use crate::resolver::Prompter;
use crate::store::fs_backend::FsBackend;
use crate::store::StorageBackend;
use chrono::{TimeZone, Utc};
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, VecDeque};
use std::path::PathBuf;
use std::rc::Rc;
use tempfile::TempDir;

pub const BASIC_TEMPLATE: &str = r#"<html><head><title>Invoice</title></head><body>
<p>Date: <span id="createdAt"></span></p>
<p>Pay to <span id="fullName"></span></p>
<p>Sort code <span id="sortCode"></span>, account <span id="bankNum"></span></p>
</body></html>"#;

pub fn config_with_defaults() -> Config {
    let mut config = Config::new();
    config
        .default_values
        .insert(FieldName::FullName, FieldValue::text("John Doe"));
    config
        .default_values
        .insert(FieldName::SortCode, FieldValue::text("12-34-56"));
    config
        .default_values
        .insert(FieldName::BankNum, FieldValue::Number(12345678u64.into()));
    config
}

pub fn sample_invoice(id: u64) -> Invoice {
    let mut details = BTreeMap::new();
    details.insert(FieldName::FullName, FieldValue::text("John Doe"));
    details.insert(FieldName::SortCode, FieldValue::text("12-34-56"));
    details.insert(FieldName::BankNum, FieldValue::Number(12345678u64.into()));
    details.insert(
        FieldName::Logo,
        FieldValue::text("https://example.com/logo.png"),
    );
    Invoice {
        id,
        template: PathBuf::from("basic.html"),
        company_name: "Acme Ltd".to_string(),
        items: vec![
            LineItem {
                item_name: "Consulting".to_string(),
                price: 100.0,
            },
            LineItem {
                item_name: "Hosting".to_string(),
                price: 25.5,
            },
        ],
        created_at: Utc.with_ymd_and_hms(2024, 3, 9, 12, 0, 0).unwrap(),
        details,
    }
}

/// Answers prompts from a fixed script. Running out of answers aborts.
pub struct ScriptedPrompter {
    answers: VecDeque<String>,
    asked: Vec<FieldName>,
}

impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            asked: Vec::new(),
        }
    }

    pub fn asked(&self) -> &[FieldName] {
        &self.asked
    }

    pub fn is_exhausted(&self) -> bool {
        self.answers.is_empty()
    }

    fn next(&mut self) -> Result<String> {
        self.answers.pop_front().ok_or(IcliError::Aborted)
    }
}

impl Prompter for ScriptedPrompter {
    fn ask(&mut self, rule: &FieldRule, _label: &str) -> Result<FieldValue> {
        self.asked.push(rule.name);
        let answer = self.next()?;
        rule.check(&answer)
    }

    /// Answers are 1-based, as typed at the terminal.
    fn choose(&mut self, _message: &str, options: &[String]) -> Result<usize> {
        let answer = self.next()?;
        match answer.trim().parse::<usize>() {
            Ok(n) if n >= 1 && n <= options.len() => Ok(n - 1),
            _ => Err(IcliError::Aborted),
        }
    }

    fn input(&mut self, _message: &str, default: Option<&str>) -> Result<String> {
        let answer = self.next()?;
        match (answer.trim().is_empty(), default) {
            (true, Some(default)) => Ok(default.to_string()),
            _ => Ok(answer),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FakeFailure {
    Open,
    Load,
    Wait,
    Print,
}

#[derive(Default)]
struct FakeState {
    opened: Cell<u32>,
    closed: Cell<u32>,
    last_markup: RefCell<Option<String>>,
}

/// Prints a tiny fixed PDF and counts session lifecycles.
#[derive(Clone, Default)]
pub struct FakeEngine {
    state: Rc<FakeState>,
    failure: Option<FakeFailure>,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(failure: FakeFailure) -> Self {
        Self {
            failure: Some(failure),
            ..Self::default()
        }
    }

    pub fn opened(&self) -> u32 {
        self.state.opened.get()
    }

    pub fn closed(&self) -> u32 {
        self.state.closed.get()
    }

    pub fn last_markup(&self) -> Option<String> {
        self.state.last_markup.borrow().clone()
    }
}

pub struct FakeSession {
    state: Rc<FakeState>,
    failure: Option<FakeFailure>,
    closed: bool,
}

impl FakeSession {
    fn fail_at(&self, stage: FakeFailure) -> std::result::Result<(), RenderError> {
        if self.failure == Some(stage) {
            return Err(RenderError::Engine(format!("fake failure at {:?}", stage)));
        }
        Ok(())
    }
}

impl RenderEngine for FakeEngine {
    type Session = FakeSession;

    fn open(&self) -> std::result::Result<FakeSession, RenderError> {
        if self.failure == Some(FakeFailure::Open) {
            return Err(RenderError::EngineUnavailable("fake engine".to_string()));
        }
        self.state.opened.set(self.state.opened.get() + 1);
        Ok(FakeSession {
            state: self.state.clone(),
            failure: self.failure,
            closed: false,
        })
    }
}

impl RenderSession for FakeSession {
    fn load(&mut self, markup: &str) -> std::result::Result<(), RenderError> {
        self.fail_at(FakeFailure::Load)?;
        *self.state.last_markup.borrow_mut() = Some(markup.to_string());
        Ok(())
    }

    fn wait_until_loaded(&mut self) -> std::result::Result<(), RenderError> {
        self.fail_at(FakeFailure::Wait)
    }

    fn print_pdf(&mut self, _options: &PdfOptions) -> std::result::Result<Vec<u8>, RenderError> {
        self.fail_at(FakeFailure::Print)?;
        Ok(b"%PDF-1.4\n%fake\n".to_vec())
    }

    fn close(&mut self) -> std::result::Result<(), RenderError> {
        if !self.closed {
            self.closed = true;
            self.state.closed.set(self.state.closed.get() + 1);
        }
        Ok(())
    }
}

/// A temporary icli home with a config, an invoices directory and one template.
pub struct TestEnv {
    // Keeps the directory alive for the duration of the test
    pub _temp_dir: TempDir,
    pub home: PathBuf,
    pub invoices_dir: PathBuf,
    pub template: PathBuf,
    pub engine: FakeEngine,
    pub api: IcliApi<FsBackend, FakeEngine>,
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl TestEnv {
    pub fn new() -> Self {
        Self::with_engine(FakeEngine::new())
    }

    /// Home directory and template only: no config document yet.
    pub fn bare() -> Self {
        Self::build(FakeEngine::new(), false)
    }

    pub fn with_engine(engine: FakeEngine) -> Self {
        Self::build(engine, true)
    }

    fn build(engine: FakeEngine, configured: bool) -> Self {
        let temp_dir = tempfile::tempdir().expect("failed to create temp dir");
        let home = temp_dir.path().join("icli");
        let invoices_dir = temp_dir.path().join("Invoices");
        std::fs::create_dir_all(&home).unwrap();
        let template = home.join("basic.html");
        std::fs::write(&template, BASIC_TEMPLATE).unwrap();

        let backend = FsBackend::new(&home);
        if configured {
            std::fs::create_dir_all(&invoices_dir).unwrap();
            let mut config = config_with_defaults();
            config.invoices_path = Some(invoices_dir.clone());
            backend.save_config(&config).unwrap();
        }

        let api = IcliApi::new(backend, engine.clone(), home.clone());
        Self {
            _temp_dir: temp_dir,
            home,
            invoices_dir,
            template,
            engine,
            api,
        }
    }
}

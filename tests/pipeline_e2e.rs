use icli::api::IcliApi;
use icli::commands::create::CreateOptions;
use icli::error::{IcliError, RenderError};
use icli::store::fs_backend::FsBackend;
use icli::test_utils::{FakeEngine, FakeFailure, ScriptedPrompter, TestEnv, BASIC_TEMPLATE};
use std::fs;

fn set_up(env: &TestEnv) {
    let mut prompter = ScriptedPrompter::new([
        env.invoices_dir.to_str().unwrap(),
        "12-34-56",
        "12345678",
        "John Doe",
        "1 High Street",
        "AB1 2CD",
        "john@example.com",
    ]);
    env.api.setup(&mut prompter, &env.invoices_dir).unwrap();
    assert!(prompter.is_exhausted());
}

fn api_with(env: &TestEnv, engine: FakeEngine) -> IcliApi<FsBackend, FakeEngine> {
    IcliApi::new(FsBackend::new(&env.home), engine, env.home.clone())
}

#[test]
fn test_two_invoices_end_to_end() {
    let env = TestEnv::bare();
    set_up(&env);

    let mut first = ScriptedPrompter::new(["Acme Ltd", "1", "Consulting", "100"]);
    let result = env
        .api
        .create_invoice(&mut first, CreateOptions::default())
        .unwrap();
    assert_eq!(result.invoices[0].id, 1);
    let first_markup = env.engine.last_markup().unwrap();
    assert!(first_markup.contains("John Doe"));
    assert!(first_markup.contains("12-34-56"));

    let mut second = ScriptedPrompter::new(["Globex", "2", "Design", "50", "Build", "75.5"]);
    let result = env
        .api
        .create_invoice(&mut second, CreateOptions::default())
        .unwrap();
    assert_eq!(result.invoices[0].id, 2);

    assert!(env.invoices_dir.join("Invoice#1.pdf").is_file());
    assert!(env.invoices_dir.join("Invoice#2.pdf").is_file());
    assert_eq!(env.engine.opened(), 2);
    assert_eq!(env.engine.closed(), 2);

    let history = env.api.history().unwrap().invoices;
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].company_name, "Acme Ltd");
    assert_eq!(history[1].items.len(), 2);

    // The template on disk is never rewritten
    assert_eq!(fs::read_to_string(&env.template).unwrap(), BASIC_TEMPLATE);
}

#[test]
fn test_render_failure_keeps_id_sequence() {
    let env = TestEnv::bare();
    set_up(&env);

    let mut answers = ScriptedPrompter::new(["Acme Ltd", "1", "Consulting", "100"]);
    let err = api_with(&env, FakeEngine::failing(FakeFailure::Print))
        .create_invoice(&mut answers, CreateOptions::default())
        .unwrap_err();
    assert!(matches!(err, IcliError::Render(RenderError::Engine(_))));
    assert!(!env.invoices_dir.join("Invoice#1.pdf").exists());

    let mut answers = ScriptedPrompter::new(["Acme Ltd", "1", "Consulting", "100"]);
    let result = env
        .api
        .create_invoice(&mut answers, CreateOptions::default())
        .unwrap();
    assert_eq!(result.invoices[0].id, 2);
    assert!(env.invoices_dir.join("Invoice#2.pdf").is_file());
    assert_eq!(env.api.history().unwrap().invoices.len(), 2);
}

#[test]
fn test_create_before_setup() {
    let env = TestEnv::bare();
    let mut answers = ScriptedPrompter::new(["Acme Ltd", "1", "Consulting", "100"]);
    assert!(matches!(
        env.api
            .create_invoice(&mut answers, CreateOptions::default()),
        Err(IcliError::ConfigMissing(_))
    ));
    assert_eq!(env.engine.opened(), 0);
}

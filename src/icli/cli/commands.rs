use super::open::open_path;
use super::print::{
    print_config, print_defaults, print_history, print_history_json, print_messages,
};
use super::prompt::TerminalPrompter;
use super::setup::{Cli, Commands, OpenTarget};
use clap::Parser;
use colored::Colorize;
use icli::commands::create::CreateOptions;
use icli::commands::defaults::{required_fields, DefaultsAction};
use icli::error::{IcliError, Result};
use icli::init::{self, IcliContext};
use icli::logging;
use icli::resolver::Prompter;
use std::path::PathBuf;

const MENU: [&str; 3] = ["View invoice history", "Create a new invoice", "Exit"];

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init_tracing(cli.verbose);

    let ctx = init::initialize()?;
    let mut prompter = TerminalPrompter::new();

    match cli.command {
        Some(Commands::Setup) => handle_setup(&ctx, &mut prompter),
        Some(Commands::Create {
            template,
            no_defaults,
        }) => handle_create(&ctx, &mut prompter, template, !no_defaults),
        Some(Commands::History { json }) => handle_history(&ctx, json),
        Some(Commands::Defaults { field, value, show }) => {
            handle_defaults(&ctx, &mut prompter, field, value, show)
        }
        Some(Commands::Config) => handle_config(&ctx),
        Some(Commands::Open { target }) => handle_open(&ctx, target),
        None => run_menu(&ctx, &mut prompter),
    }
}

fn handle_setup(ctx: &IcliContext, prompter: &mut TerminalPrompter) -> Result<()> {
    let result = ctx
        .api
        .setup(prompter, &ctx.paths.suggested_invoices_dir)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_create(
    ctx: &IcliContext,
    prompter: &mut TerminalPrompter,
    template: Option<PathBuf>,
    use_defaults: bool,
) -> Result<()> {
    if use_defaults {
        let missing = ctx.api.missing_personal_defaults()?;
        if !missing.is_empty() {
            println!(
                "{}",
                "Some of your details are not saved yet; let's add them first.".dimmed()
            );
            let names = missing.iter().map(|f| f.to_string()).collect();
            let result = ctx.api.defaults(prompter, DefaultsAction::Prompt(names))?;
            print_messages(&result.messages);
        }
    }

    let result = ctx.api.create_invoice(
        prompter,
        CreateOptions {
            template,
            use_defaults,
        },
    )?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_history(ctx: &IcliContext, json: bool) -> Result<()> {
    let result = ctx.api.history()?;
    if json {
        return print_history_json(&result.invoices);
    }
    print_history(&result.invoices);
    print_messages(&result.messages);
    Ok(())
}

fn handle_defaults(
    ctx: &IcliContext,
    prompter: &mut TerminalPrompter,
    field: Option<String>,
    value: Option<String>,
    show: bool,
) -> Result<()> {
    let action = match (field, value) {
        _ if show => DefaultsAction::Show,
        (Some(field), Some(value)) => DefaultsAction::Set(field, value),
        (Some(field), None) => DefaultsAction::Prompt(vec![field]),
        (None, _) => DefaultsAction::Prompt(
            required_fields().iter().map(|f| f.to_string()).collect(),
        ),
    };
    let result = ctx.api.defaults(prompter, action)?;
    print_messages(&result.messages);
    if show {
        if let Some(config) = &result.config {
            print_defaults(config);
        }
    }
    Ok(())
}

fn handle_config(ctx: &IcliContext) -> Result<()> {
    let result = ctx.api.config()?;
    if let Some(config) = &result.config {
        print_config(config, &result.paths);
    }
    print_messages(&result.messages);
    Ok(())
}

fn handle_open(ctx: &IcliContext, target: OpenTarget) -> Result<()> {
    let path = match target {
        OpenTarget::Config => ctx.api.config_store().path(),
        OpenTarget::Templates => ctx.api.templates_dir().to_path_buf(),
        OpenTarget::Invoices => ctx
            .api
            .invoices_dir()?
            .ok_or(IcliError::InvoicesDirectoryUnset)?,
    };
    open_path(&path)
}

/// The interactive loop. Errors are shown and the menu comes back; end of input
/// or "Exit" leaves.
fn run_menu(ctx: &IcliContext, prompter: &mut TerminalPrompter) -> Result<()> {
    if !ctx.api.config_store().exists()? {
        println!("{}", "Welcome to icli! Let's get you set up.".bold());
        handle_setup(ctx, prompter)?;
    }

    let options: Vec<String> = MENU.iter().map(|s| s.to_string()).collect();
    loop {
        println!();
        let choice = match prompter.choose("What would you like to do?", &options) {
            Ok(choice) => choice,
            Err(IcliError::Aborted) => return Ok(()),
            Err(e) => return Err(e),
        };
        let outcome = match choice {
            0 => handle_history(ctx, false),
            1 => handle_create(ctx, prompter, None, true),
            _ => return Ok(()),
        };
        if let Err(e) = outcome {
            eprintln!("{} {}", "Error:".red(), e);
        }
    }
}

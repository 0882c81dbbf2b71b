use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// "1.0.0" for releases, "1.0.0@abc1234 2024-01-15" for dev builds.
fn get_version() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("ICLI_GIT_HASH");
    const COMMIT_DATE: &str = env!("ICLI_COMMIT_DATE");
    const IS_RELEASE: &str = env!("ICLI_IS_RELEASE");

    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();

    VERSION_STRING.get_or_init(|| {
        if IS_RELEASE == "true" || GIT_HASH.is_empty() {
            VERSION.to_string()
        } else {
            format!("{}@{} {}", VERSION, GIT_HASH, COMMIT_DATE)
        }
    })
}

#[derive(Parser, Debug)]
#[command(name = "icli", bin_name = "icli", version = get_version())]
#[command(
    about = "Create PDF invoices from HTML templates",
    long_about = "Create PDF invoices from HTML templates.\n\nRun without a command for the interactive menu."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Show debug logs on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the config, choose the invoices directory and enter your details
    Setup,

    /// Create a new invoice
    Create {
        /// Template to use (defaults to picking one from the app home)
        #[arg(short, long)]
        template: Option<PathBuf>,

        /// Ask for your personal details instead of using the saved defaults
        #[arg(long)]
        no_defaults: bool,
    },

    /// List every invoice created so far
    History {
        /// Print the raw history as JSON
        #[arg(long)]
        json: bool,
    },

    /// Set default values (all required ones when no field is given)
    Defaults {
        /// Field to set, e.g. sortCode
        field: Option<String>,

        /// Value to store; asked for when omitted
        value: Option<String>,

        /// Only print the stored defaults
        #[arg(long, conflicts_with_all = ["field", "value"])]
        show: bool,
    },

    /// Show the configuration and where icli keeps its files
    Config,

    /// Open a directory or file in the system file browser
    Open {
        #[arg(value_enum)]
        target: OpenTarget,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OpenTarget {
    /// The config file
    Config,
    /// The invoices directory
    Invoices,
    /// The templates directory (the app home)
    Templates,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_create() {
        let cli = Cli::try_parse_from(["icli", "create", "--template", "a.html", "--no-defaults"])
            .unwrap();
        match cli.command {
            Some(Commands::Create {
                template,
                no_defaults,
            }) => {
                assert_eq!(template, Some(PathBuf::from("a.html")));
                assert!(no_defaults);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_defaults() {
        let cli = Cli::try_parse_from(["icli", "defaults", "sortCode", "12-34-56"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Defaults { field: Some(_), value: Some(_), show: false })
        ));
        assert!(Cli::try_parse_from(["icli", "defaults", "sortCode", "--show"]).is_err());
    }

    #[test]
    fn test_no_command_means_menu() {
        let cli = Cli::try_parse_from(["icli", "-v"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.verbose);
    }
}

//! Diagnostic logging.
//!
//! Log lines go to stderr and are separate from the user-facing messages the CLI
//! prints. `ICLI_LOG` takes the usual filter syntax (`ICLI_LOG=icli::render=debug`);
//! otherwise only warnings show, or everything from icli at debug with `--verbose`.

use std::sync::Once;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub const LOG_ENV: &str = "ICLI_LOG";

static INIT: Once = Once::new();

/// Idempotent; only the first call configures anything.
pub fn init_tracing(verbose: bool) {
    INIT.call_once(|| {
        let fallback = if verbose { "icli=debug" } else { "icli=warn" };
        let filter =
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(fallback));

        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(verbose),
            )
            .with(filter)
            .init();
    });
}

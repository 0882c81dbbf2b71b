//! The `icli` binary's terminal layer: argument parsing, prompting and printing.
//! Everything else goes through [`icli::api::IcliApi`].

mod commands;
mod open;
mod print;
mod prompt;
mod setup;

pub use commands::run;

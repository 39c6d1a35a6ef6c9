//! Trellis CLI library.
//!
//! Argument parsing, settings, command execution and output formatting for
//! the `trellis` binary, which exposes the JSON conversions of
//! `trellis-convert` over files, stdin and a SQLite graph database.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;

pub use cli::{Cli, Command};
pub use config::Config;
pub use error::{CliError, Result};
pub use output::Formatter;

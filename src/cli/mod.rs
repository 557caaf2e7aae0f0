//! CLI module for crudkit
//!
//! Provides command-line interface for:
//! - explain: show the plan, executable query and SQL for a query string
//! - list: run a query string against records from a JSON file

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{explain, list, run, run_command};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{write_error, write_response};

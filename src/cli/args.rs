//! CLI argument definitions using clap
//!
//! Commands:
//! - crudkit explain --config <path> [--dialect sqlite|postgres] <query>
//! - crudkit list --config <path> --data <path> [--paginate] <query>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::sql::Backend;

/// crudkit - allow-listed query strings to safe queries
#[derive(Parser, Debug)]
#[command(name = "crudkit")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show the validated plan, executable query and SQL for a query string
    Explain {
        /// Entity configuration file
        #[arg(long, default_value = "./crudkit.json")]
        config: PathBuf,

        /// SQL dialect to render
        #[arg(long, value_enum, default_value_t = Backend::Sqlite)]
        dialect: Backend,

        /// Query string, e.g. `filter[name]=Tech&sort=-name`
        #[arg(default_value = "")]
        query: String,
    },

    /// Run a query string against records loaded from a JSON file
    List {
        /// Entity configuration file
        #[arg(long, default_value = "./crudkit.json")]
        config: PathBuf,

        /// Records: an array for the entity, or an object of arrays keyed by entity
        #[arg(long)]
        data: PathBuf,

        /// Wrap the result in a page envelope with totals
        #[arg(long)]
        paginate: bool,

        /// Query string
        #[arg(default_value = "")]
        query: String,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_explain() {
        let cli = Cli::try_parse_from([
            "crudkit",
            "explain",
            "--config",
            "tags.json",
            "--dialect",
            "postgres",
            "sort=-label",
        ])
        .unwrap();
        assert_eq!(
            cli.command,
            Command::Explain {
                config: PathBuf::from("tags.json"),
                dialect: Backend::Postgres,
                query: "sort=-label".into(),
            }
        );
    }

    #[test]
    fn test_parse_list_defaults() {
        let cli = Cli::try_parse_from(["crudkit", "list", "--data", "rows.json"]).unwrap();
        match cli.command {
            Command::List {
                config,
                paginate,
                query,
                ..
            } => {
                assert_eq!(config, PathBuf::from("./crudkit.json"));
                assert!(!paginate);
                assert!(query.is_empty());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_list_requires_data() {
        assert!(Cli::try_parse_from(["crudkit", "list"]).is_err());
    }
}

//! CLI command implementations
//!
//! Each command produces a JSON value; `run` wraps it in the output
//! envelope. Nothing here touches a real database.

use std::path::Path;
use std::sync::Arc;

use serde_json::{json, Value};

use crate::builder::QueryBuilder;
use crate::config::EntityConfigFile;
use crate::crud::CrudFacade;
use crate::query::QueryParams;
use crate::sql::{render_count, render_select, Backend};
use crate::store::MemoryStore;
use crate::validator::Validator;

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::{read_json_file, write_error, write_response};

/// Main CLI entry point
///
/// Parses arguments, runs the command and prints the envelope. On failure
/// the error envelope is printed and the error returned for the exit code.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    match run_command(cli.command) {
        Ok(data) => write_response(data),
        Err(e) => {
            write_error(e.code_str(), e.message())?;
            Err(e)
        }
    }
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<Value> {
    match cmd {
        Command::Explain {
            config,
            dialect,
            query,
        } => explain(&config, dialect, &query),
        Command::List {
            config,
            data,
            paginate,
            query,
        } => list(&config, &data, paginate, &query),
    }
}

/// Validated plan, executable query and rendered SQL for `query`
pub fn explain(config_path: &Path, backend: Backend, query: &str) -> CliResult<Value> {
    let file = EntityConfigFile::from_path(config_path)?;
    let config = file.build()?;
    let schema = file.schema();

    let params = QueryParams::from_query_string(query)?;
    let plan = Validator::new(&config).validate(&params)?;
    let (select, window) = QueryBuilder::new(&file.entity, config.limits())
        .with_schema(&schema)
        .apply_plan(&plan)
        .into_parts();

    let dialect = backend.dialect();
    Ok(json!({
        "entity": file.entity.name,
        "plan": plan,
        "query": select,
        "window": window,
        "sql": {
            "dialect": backend.name(),
            "select": render_select(&select, dialect),
            "count": render_count(&select, dialect),
        },
    }))
}

/// Run `query` against records from `data_path`
pub fn list(config_path: &Path, data_path: &Path, paginate: bool, query: &str) -> CliResult<Value> {
    let file = EntityConfigFile::from_path(config_path)?;
    let config = file.build()?;
    let store = MemoryStore::new(file.schema());

    match read_json_file(data_path)? {
        Value::Array(rows) => {
            store.seed(&file.entity.name, rows)?;
        }
        Value::Object(tables) => {
            for (entity, rows) in tables {
                let Value::Array(rows) = rows else {
                    return Err(CliError::data_error(format!(
                        "Records for '{}' must be an array",
                        entity
                    )));
                };
                store.seed(&entity, rows)?;
            }
        }
        _ => {
            return Err(CliError::data_error(
                "Data file must hold an array or an object of arrays",
            ))
        }
    }

    let facade = CrudFacade::new(Arc::new(store), file.entity, Arc::new(config))?;
    let params = QueryParams::from_query_string(query)?;
    let data = if paginate {
        serde_json::to_value(facade.list_paginated(&params)?)?
    } else {
        Value::Array(facade.list(&params)?)
    };
    Ok(data)
}

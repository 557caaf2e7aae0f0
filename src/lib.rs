//! crudkit - allow-listed query strings to safe, bounded queries
//!
//! Pipeline: [`query`] parses the raw query string, [`validator`] checks it
//! against the entity's [`allowed`] lists, [`builder`] turns the validated
//! plan into a [`store::SelectQuery`], and [`crud`] runs it against a
//! [`store::DataStore`]. [`sql`] renders the same query as SQL.

pub mod allowed;
pub mod builder;
pub mod cli;
pub mod config;
pub mod crud;
pub mod http;
pub mod query;
pub mod sql;
pub mod store;
pub mod validator;

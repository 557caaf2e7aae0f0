//! # Allow-List Registry
//!
//! Declarative per-entity permissions: which filters, sorts, field
//! selections and includes a client may request, under which public names,
//! and with which operators. Collected into an immutable
//! [`QueryBuilderConfig`] whose construction rejects duplicate public names.

mod config;
mod errors;
mod filter;
mod registry;
mod rules;

pub use config::{
    InvalidPolicy, PageLimits, QueryBuilderConfig, QueryBuilderConfigBuilder, DEFAULT_LIMIT,
    MAX_LIMIT,
};
pub use errors::{ConfigError, ConfigResult};
pub use filter::{AllowedFilter, CustomPredicate, PatternAnchor};
pub use registry::{Registry, Rule, RuleCategory};
pub use rules::{AllowedField, AllowedInclude, AllowedSort};

//! # Configuration Errors
//!
//! Raised while building a `QueryBuilderConfig` or loading an entity
//! configuration file. Always fatal at setup, never seen per request.

use thiserror::Error;

use super::registry::RuleCategory;
use crate::query::OperatorKind;

/// Result type for configuration
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Two rules in one category expose the same public name
    #[error("Duplicate {category} name '{name}'")]
    DuplicatePublicName { category: RuleCategory, name: String },

    /// A standard filter's default operator is not among its allowed operators
    #[error("Default operator '{operator}' of filter '{filter}' is not in its allowed operators")]
    DefaultOperatorNotAllowed {
        filter: String,
        operator: OperatorKind,
    },

    /// A rule binds no columns or paths
    #[error("{category} rule '{name}' is empty")]
    EmptyRule { category: RuleCategory, name: String },

    /// A rule references a column or relation the entity does not have
    #[error("{category} rule '{name}' references unknown target '{target}'")]
    UnknownTarget {
        category: RuleCategory,
        name: String,
        target: String,
    },

    /// Page limits are zero or inverted
    #[error("Invalid page limits: default {default_limit}, max {max_limit}")]
    InvalidLimits { default_limit: u64, max_limit: u64 },

    /// Configuration file could not be read
    #[error("Cannot read {path}: {message}")]
    Io { path: String, message: String },

    /// Configuration file is not valid JSON for the expected shape
    #[error("Cannot parse {path}: {message}")]
    Parse { path: String, message: String },
}

impl ConfigError {
    /// Returns the error code
    pub fn code(&self) -> &'static str {
        match self {
            ConfigError::DuplicatePublicName { .. } => "CRUD_CONFIG_DUPLICATE_NAME",
            ConfigError::DefaultOperatorNotAllowed { .. } => "CRUD_CONFIG_DEFAULT_OPERATOR",
            ConfigError::EmptyRule { .. } => "CRUD_CONFIG_EMPTY_RULE",
            ConfigError::UnknownTarget { .. } => "CRUD_CONFIG_UNKNOWN_TARGET",
            ConfigError::InvalidLimits { .. } => "CRUD_CONFIG_INVALID_LIMITS",
            ConfigError::Io { .. } => "CRUD_CONFIG_IO",
            ConfigError::Parse { .. } => "CRUD_CONFIG_PARSE",
        }
    }
}

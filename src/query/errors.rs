//! Query error types
//!
//! Error codes:
//! - CRUD_QUERY_UNKNOWN_OPERATOR (syntax)
//! - CRUD_QUERY_MALFORMED_FILTER (syntax)
//! - CRUD_QUERY_INVALID_INTEGER (syntax)
//! - CRUD_QUERY_NON_POSITIVE (syntax)
//! - CRUD_QUERY_EMPTY_SORT (syntax)
//! - CRUD_QUERY_FILTER_NOT_ALLOWED (validation)
//! - CRUD_QUERY_OPERATOR_NOT_ALLOWED (validation)
//! - CRUD_QUERY_VALUE_SHAPE (validation)
//! - CRUD_QUERY_SORT_NOT_ALLOWED (validation)
//! - CRUD_QUERY_FIELD_NOT_ALLOWED (validation)
//! - CRUD_QUERY_INCLUDE_NOT_ALLOWED (validation)
//!
//! Syntax errors are never suppressible. Validation errors are dropped instead
//! of raised when the config's invalid-item policy is `Ignore`.

use std::fmt;

use thiserror::Error;

use super::operator::OperatorKind;

/// Result type for parsing and validation
pub type QueryResult<T> = Result<T, QueryError>;

/// Error stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryErrorKind {
    /// Parser rejected the raw parameters
    Syntax,
    /// Validator rejected an item against the allow-list
    Validation,
}

impl fmt::Display for QueryErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryErrorKind::Syntax => write!(f, "SYNTAX"),
            QueryErrorKind::Validation => write!(f, "VALIDATION"),
        }
    }
}

/// Parsing and validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    // ==================
    // Syntax
    // ==================
    /// Bracketed operator token is not a known operator code
    #[error("Unknown operator '{operator}' in filter '{field}'")]
    UnknownOperator { field: String, operator: String },

    /// Key starts with `filter` but is not `filter[f]` or `filter[f][op]`
    #[error("Malformed filter parameter: {0}")]
    MalformedFilterKey(String),

    /// Pagination value is not a non-negative integer
    #[error("Invalid integer for '{param}': {value}")]
    InvalidInteger { param: String, value: String },

    /// Pagination value must be at least 1
    #[error("'{0}' must be at least 1")]
    NonPositive(String),

    /// A `sort` token with no field name
    #[error("Sort token has no field name")]
    EmptySortField,

    // ==================
    // Validation
    // ==================
    /// Filter name not in the allow-list
    #[error("Filter '{filter}' is not allowed. Allowed filters: {}", .allowed.join(", "))]
    FilterNotAllowed { filter: String, allowed: Vec<String> },

    /// Operator not allowed for the filter
    #[error("Operator '{operator}' is not allowed for filter '{filter}'. Allowed operators: {}", join_ops(.allowed))]
    OperatorNotAllowed {
        filter: String,
        operator: OperatorKind,
        allowed: Vec<OperatorKind>,
    },

    /// Value does not fit the operator (list for a scalar operator, empty `in`)
    #[error("Value for filter '{filter}' does not fit operator '{operator}': {reason}")]
    ValueShapeMismatch {
        filter: String,
        operator: OperatorKind,
        reason: String,
    },

    /// Sort name not in the allow-list
    #[error("Sort '{0}' is not allowed")]
    SortNotAllowed(String),

    /// Field selection not in the allow-list
    #[error("Field '{0}' is not allowed")]
    FieldNotAllowed(String),

    /// Include not in the allow-list
    #[error("Include '{0}' is not allowed")]
    IncludeNotAllowed(String),
}

impl QueryError {
    /// Returns the error code
    pub fn code(&self) -> &'static str {
        match self {
            QueryError::UnknownOperator { .. } => "CRUD_QUERY_UNKNOWN_OPERATOR",
            QueryError::MalformedFilterKey(_) => "CRUD_QUERY_MALFORMED_FILTER",
            QueryError::InvalidInteger { .. } => "CRUD_QUERY_INVALID_INTEGER",
            QueryError::NonPositive(_) => "CRUD_QUERY_NON_POSITIVE",
            QueryError::EmptySortField => "CRUD_QUERY_EMPTY_SORT",
            QueryError::FilterNotAllowed { .. } => "CRUD_QUERY_FILTER_NOT_ALLOWED",
            QueryError::OperatorNotAllowed { .. } => "CRUD_QUERY_OPERATOR_NOT_ALLOWED",
            QueryError::ValueShapeMismatch { .. } => "CRUD_QUERY_VALUE_SHAPE",
            QueryError::SortNotAllowed(_) => "CRUD_QUERY_SORT_NOT_ALLOWED",
            QueryError::FieldNotAllowed(_) => "CRUD_QUERY_FIELD_NOT_ALLOWED",
            QueryError::IncludeNotAllowed(_) => "CRUD_QUERY_INCLUDE_NOT_ALLOWED",
        }
    }

    /// Returns the stage that produced this error
    pub fn kind(&self) -> QueryErrorKind {
        match self {
            QueryError::UnknownOperator { .. }
            | QueryError::MalformedFilterKey(_)
            | QueryError::InvalidInteger { .. }
            | QueryError::NonPositive(_)
            | QueryError::EmptySortField => QueryErrorKind::Syntax,
            _ => QueryErrorKind::Validation,
        }
    }

    /// Returns true for parser-stage errors
    pub fn is_syntax(&self) -> bool {
        self.kind() == QueryErrorKind::Syntax
    }
}

fn join_ops(ops: &[OperatorKind]) -> String {
    ops.iter().map(|op| op.code()).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert!(QueryError::EmptySortField.is_syntax());
        assert!(QueryError::NonPositive("page".into()).is_syntax());
        assert_eq!(
            QueryError::SortNotAllowed("created_at".into()).kind(),
            QueryErrorKind::Validation
        );
    }

    #[test]
    fn test_error_display_names_token() {
        let err = QueryError::OperatorNotAllowed {
            filter: "description".into(),
            operator: OperatorKind::Equal,
            allowed: vec![OperatorKind::ILike, OperatorKind::Like],
        };
        let display = err.to_string();
        assert!(display.contains("'eq'"));
        assert!(display.contains("description"));
        assert!(display.contains("ilike, like"));
        assert_eq!(err.code(), "CRUD_QUERY_OPERATOR_NOT_ALLOWED");
    }

    #[test]
    fn test_filter_not_allowed_lists_alternatives() {
        let err = QueryError::FilterNotAllowed {
            filter: "description".into(),
            allowed: vec!["desc".into(), "name".into()],
        };
        assert_eq!(
            err.to_string(),
            "Filter 'description' is not allowed. Allowed filters: desc, name"
        );
    }
}

//! Validated query plan
//!
//! Same shape as `QueryParams`, but every public name is replaced by its
//! canonical column(s) or relation path(s) and every operator is checked.

use std::fmt;

use serde::Serialize;

use crate::allowed::CustomPredicate;
use crate::query::{FilterValue, OperatorKind, Pagination, SortDirection};
use crate::store::RelationPath;

/// A filter that passed the allow-list
#[derive(Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolvedFilter {
    /// Operator mapped onto a column
    Standard {
        column: String,
        operator: OperatorKind,
        value: FilterValue,
    },
    /// Delegated to a custom callback with the raw value
    Custom {
        name: String,
        value: FilterValue,
        #[serde(skip)]
        predicate: CustomPredicate,
    },
}

impl ResolvedFilter {
    pub fn standard(column: impl Into<String>, operator: OperatorKind, value: FilterValue) -> Self {
        ResolvedFilter::Standard {
            column: column.into(),
            operator,
            value,
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, ResolvedFilter::Custom { .. })
    }
}

impl fmt::Debug for ResolvedFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolvedFilter::Standard {
                column,
                operator,
                value,
            } => f
                .debug_struct("Standard")
                .field("column", column)
                .field("operator", operator)
                .field("value", value)
                .finish(),
            ResolvedFilter::Custom { name, value, .. } => f
                .debug_struct("Custom")
                .field("name", name)
                .field("value", value)
                .finish_non_exhaustive(),
        }
    }
}

/// Ordering keys contributed by one sort rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedSort {
    pub columns: Vec<String>,
    pub direction: SortDirection,
}

/// Output of validation, input to the builder
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidatedPlan {
    /// Conjunction, in request order
    pub filters: Vec<ResolvedFilter>,

    /// Sort rules, primary first
    pub sort: Vec<ResolvedSort>,

    /// Canonical columns to project (empty = all)
    pub fields: Vec<String>,

    /// Relation paths to eager-load
    pub include: Vec<RelationPath>,

    pub pagination: Pagination,
}

impl ValidatedPlan {
    /// Returns true if nothing but pagination was requested
    pub fn is_unshaped(&self) -> bool {
        self.filters.is_empty()
            && self.sort.is_empty()
            && self.fields.is_empty()
            && self.include.is_empty()
    }
}

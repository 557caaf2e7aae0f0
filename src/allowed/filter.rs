//! Allowed filter rules
//!
//! A single rule type covers both standard filters (operator mapping onto a
//! column) and custom filters (a caller-supplied predicate callback). The
//! custom slot, when present, takes over completely: operators are neither
//! checked nor mapped.
//!
//! `begins_with` and `ends_with` rules carry a [`PatternAnchor`]. For `like`
//! and `ilike` requests the validator turns the value into an anchored
//! pattern (`web` becomes `web%` or `%web`); other operators see it as is.

use std::fmt;
use std::sync::Arc;

use super::errors::{ConfigError, ConfigResult};
use super::registry::Rule;
use crate::query::{FilterValue, OperatorKind};
use crate::store::SelectQuery;

/// Callback for custom filters: `(query, raw value) -> query`
pub type CustomPredicate = Arc<dyn Fn(SelectQuery, &FilterValue) -> SelectQuery + Send + Sync>;

/// Where a pattern rule pins the requested value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PatternAnchor {
    /// The value is the whole pattern
    #[default]
    Verbatim,
    /// `value%`
    Start,
    /// `%value`
    End,
}

impl PatternAnchor {
    /// Pattern for `value` under this anchor
    pub fn apply(&self, value: &str) -> String {
        match self {
            PatternAnchor::Verbatim => value.to_string(),
            PatternAnchor::Start => format!("{}%", value),
            PatternAnchor::End => format!("%{}", value),
        }
    }
}

/// An allowed filter
#[derive(Clone)]
pub struct AllowedFilter {
    field: String,
    alias: Option<String>,
    default_operator: OperatorKind,
    operators: Vec<OperatorKind>,
    anchor: PatternAnchor,
    custom: Option<CustomPredicate>,
}

impl AllowedFilter {
    /// Exact match: `eq` by default, also `ne` and `in`
    pub fn exact(field: impl Into<String>) -> Self {
        Self::operator(
            field,
            OperatorKind::Equal,
            [OperatorKind::Equal, OperatorKind::NotEqual, OperatorKind::In],
        )
    }

    /// Pattern match: `ilike` by default, also `like` and `eq`
    pub fn partial(field: impl Into<String>) -> Self {
        Self::operator(
            field,
            OperatorKind::ILike,
            [OperatorKind::ILike, OperatorKind::Like, OperatorKind::Equal],
        )
    }

    /// Prefix match: the value is anchored as `value%`
    pub fn begins_with(field: impl Into<String>) -> Self {
        Self {
            anchor: PatternAnchor::Start,
            ..Self::partial(field)
        }
    }

    /// Suffix match: the value is anchored as `%value`
    pub fn ends_with(field: impl Into<String>) -> Self {
        Self {
            anchor: PatternAnchor::End,
            ..Self::partial(field)
        }
    }

    /// Explicit default and allowed operators
    pub fn operator<I>(field: impl Into<String>, default: OperatorKind, allowed: I) -> Self
    where
        I: IntoIterator<Item = OperatorKind>,
    {
        let mut operators: Vec<OperatorKind> = allowed.into_iter().collect();
        operators.sort();
        operators.dedup();
        Self {
            field: field.into(),
            alias: None,
            default_operator: default,
            operators,
            anchor: PatternAnchor::Verbatim,
            custom: None,
        }
    }

    /// Filter interpreted entirely by `predicate`
    pub fn custom<F>(name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(SelectQuery, &FilterValue) -> SelectQuery + Send + Sync + 'static,
    {
        Self {
            field: name.into(),
            alias: None,
            default_operator: OperatorKind::Equal,
            operators: Vec::new(),
            anchor: PatternAnchor::Verbatim,
            custom: Some(Arc::new(predicate)),
        }
    }

    /// Expose the filter under `alias` instead of its field name
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Replace the allowed operator set
    pub fn operators<I>(mut self, operators: I) -> Self
    where
        I: IntoIterator<Item = OperatorKind>,
    {
        let mut operators: Vec<OperatorKind> = operators.into_iter().collect();
        operators.sort();
        operators.dedup();
        self.operators = operators;
        self
    }

    /// Replace the default operator
    pub fn default_operator(mut self, operator: OperatorKind) -> Self {
        self.default_operator = operator;
        self
    }

    /// Canonical column (or the registered name, for custom filters)
    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn alias_name(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    pub fn default_op(&self) -> OperatorKind {
        self.default_operator
    }

    pub fn allowed_operators(&self) -> &[OperatorKind] {
        &self.operators
    }

    pub fn anchor(&self) -> PatternAnchor {
        self.anchor
    }

    /// Value as handed to `operator`, anchored for pattern operators
    pub fn shape_value(&self, operator: OperatorKind, value: &str) -> String {
        if operator.is_pattern() {
            self.anchor.apply(value)
        } else {
            value.to_string()
        }
    }

    /// Returns true if the operator may be requested
    pub fn allows(&self, operator: OperatorKind) -> bool {
        self.operators.contains(&operator)
    }

    pub fn is_custom(&self) -> bool {
        self.custom.is_some()
    }

    pub fn predicate(&self) -> Option<&CustomPredicate> {
        self.custom.as_ref()
    }
}

impl Rule for AllowedFilter {
    fn public_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.field)
    }

    fn check(&self) -> ConfigResult<()> {
        if self.custom.is_none() && !self.allows(self.default_operator) {
            return Err(ConfigError::DefaultOperatorNotAllowed {
                filter: self.public_name().to_string(),
                operator: self.default_operator,
            });
        }
        Ok(())
    }
}

impl fmt::Debug for AllowedFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AllowedFilter")
            .field("field", &self.field)
            .field("alias", &self.alias)
            .field("default_operator", &self.default_operator)
            .field("operators", &self.operators)
            .field("anchor", &self.anchor)
            .field("custom", &self.custom.is_some())
            .finish()
    }
}

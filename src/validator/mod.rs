//! # Validator
//!
//! Cross-checks a parsed [`QueryParams`] against a [`QueryBuilderConfig`].
//!
//! Filters, sorts, field selections and includes are validated in four
//! independent passes that consult the same [`InvalidPolicy`]: under
//! `Reject` the first invalid item fails the whole request, under `Ignore`
//! it is dropped and logged. Request order is preserved in every category.
//!
//! Filter values are normalized here:
//! - `in` values are comma-split; an empty result is a shape mismatch
//! - a repeated key with no operator is promoted from `eq` to `in` when the
//!   rule allows `in`
//! - any other list value for a scalar operator is a shape mismatch
//! - `like`/`ilike` values on anchored rules become prefix or suffix patterns

mod plan;

pub use plan::{ResolvedFilter, ResolvedSort, ValidatedPlan};

use crate::allowed::{AllowedFilter, InvalidPolicy, QueryBuilderConfig, RuleCategory};
use crate::query::{
    FilterCondition, FilterValue, OperatorKind, QueryError, QueryParams, QueryResult,
};
use crate::store::RelationPath;

/// Validates requests against one entity's configuration
#[derive(Debug, Clone, Copy)]
pub struct Validator<'a> {
    config: &'a QueryBuilderConfig,
}

impl<'a> Validator<'a> {
    pub fn new(config: &'a QueryBuilderConfig) -> Self {
        Self { config }
    }

    /// Validate every category, producing a plan or the first unsuppressed error
    pub fn validate(&self, params: &QueryParams) -> QueryResult<ValidatedPlan> {
        Ok(ValidatedPlan {
            filters: self.validate_filters(&params.filters)?,
            sort: self.validate_sort(params)?,
            fields: self.validate_fields(params)?,
            include: self.validate_include(params)?,
            pagination: params.pagination,
        })
    }

    /// Apply the invalid-item policy to an error
    fn dismiss(&self, category: RuleCategory, err: QueryError) -> QueryResult<()> {
        match self.config.policy() {
            InvalidPolicy::Ignore => {
                tracing::debug!(
                    category = %category,
                    code = err.code(),
                    reason = %err,
                    "dropping invalid item"
                );
                Ok(())
            }
            InvalidPolicy::Reject => Err(err),
        }
    }

    fn validate_filters(&self, filters: &[FilterCondition]) -> QueryResult<Vec<ResolvedFilter>> {
        let registry = self.config.filters();
        let mut resolved = Vec::with_capacity(filters.len());

        for condition in filters {
            let Some(rule) = registry.resolve(&condition.field) else {
                self.dismiss(
                    RuleCategory::Filter,
                    QueryError::FilterNotAllowed {
                        filter: condition.field.clone(),
                        allowed: registry.names(),
                    },
                )?;
                continue;
            };

            if let Some(predicate) = rule.predicate() {
                resolved.push(ResolvedFilter::Custom {
                    name: rule.field().to_string(),
                    value: condition.value.clone(),
                    predicate: predicate.clone(),
                });
                continue;
            }

            match normalize(rule, condition) {
                Ok((operator, value)) => {
                    resolved.push(ResolvedFilter::standard(rule.field(), operator, value))
                }
                Err(err) => self.dismiss(RuleCategory::Filter, err)?,
            }
        }

        Ok(resolved)
    }

    fn validate_sort(&self, params: &QueryParams) -> QueryResult<Vec<ResolvedSort>> {
        let registry = self.config.sorts();
        let mut resolved = Vec::with_capacity(params.sort.len());

        for spec in &params.sort {
            match registry.resolve(&spec.field) {
                Some(rule) => resolved.push(ResolvedSort {
                    columns: rule.columns().to_vec(),
                    direction: rule.forced_direction().unwrap_or(spec.direction),
                }),
                None => self.dismiss(
                    RuleCategory::Sort,
                    QueryError::SortNotAllowed(spec.field.clone()),
                )?,
            }
        }

        Ok(resolved)
    }

    fn validate_fields(&self, params: &QueryParams) -> QueryResult<Vec<String>> {
        let registry = self.config.fields();
        let mut columns: Vec<String> = Vec::new();

        for name in &params.fields {
            match registry.resolve(name) {
                Some(rule) => {
                    for column in rule.columns() {
                        if !columns.contains(column) {
                            columns.push(column.clone());
                        }
                    }
                }
                None => self.dismiss(
                    RuleCategory::Field,
                    QueryError::FieldNotAllowed(name.clone()),
                )?,
            }
        }

        Ok(columns)
    }

    fn validate_include(&self, params: &QueryParams) -> QueryResult<Vec<RelationPath>> {
        let registry = self.config.includes();
        let mut paths: Vec<RelationPath> = Vec::new();

        for name in &params.include {
            match registry.resolve(name) {
                Some(rule) => {
                    for path in rule.paths().iter().map(|p| RelationPath::parse(p)) {
                        if !path.is_empty() && !paths.contains(&path) {
                            paths.push(path);
                        }
                    }
                }
                None => self.dismiss(
                    RuleCategory::Include,
                    QueryError::IncludeNotAllowed(name.clone()),
                )?,
            }
        }

        Ok(paths)
    }
}

/// Validate a request against a configuration
pub fn validate(params: &QueryParams, config: &QueryBuilderConfig) -> QueryResult<ValidatedPlan> {
    Validator::new(config).validate(params)
}

/// Check the operator and shape the value for a standard rule
fn normalize(
    rule: &AllowedFilter,
    condition: &FilterCondition,
) -> QueryResult<(OperatorKind, FilterValue)> {
    if let Some(explicit) = condition.operator {
        if !rule.allows(explicit) {
            return Err(QueryError::OperatorNotAllowed {
                filter: condition.field.clone(),
                operator: explicit,
                allowed: rule.allowed_operators().to_vec(),
            });
        }
    }
    let operator = condition.operator.unwrap_or(rule.default_op());

    if operator.is_list() {
        return split_in(condition, operator);
    }

    match &condition.value {
        FilterValue::Scalar(value) => Ok((
            operator,
            FilterValue::Scalar(rule.shape_value(operator, value)),
        )),
        FilterValue::List(_) if condition.operator.is_none() && operator == OperatorKind::Equal => {
            if rule.allows(OperatorKind::In) {
                split_in(condition, OperatorKind::In)
            } else {
                Err(QueryError::ValueShapeMismatch {
                    filter: condition.field.clone(),
                    operator,
                    reason: "multiple values given but 'in' is not allowed".to_string(),
                })
            }
        }
        FilterValue::List(_) => Err(QueryError::ValueShapeMismatch {
            filter: condition.field.clone(),
            operator,
            reason: "operator takes a single value".to_string(),
        }),
    }
}

fn split_in(
    condition: &FilterCondition,
    operator: OperatorKind,
) -> QueryResult<(OperatorKind, FilterValue)> {
    let values = condition.value.split_list();
    if values.is_empty() {
        return Err(QueryError::ValueShapeMismatch {
            filter: condition.field.clone(),
            operator,
            reason: "list is empty".to_string(),
        });
    }
    Ok((OperatorKind::In, FilterValue::List(values)))
}

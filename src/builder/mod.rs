//! # Query Builder
//!
//! Turns a [`ValidatedPlan`] into an executable [`SelectQuery`] against one
//! entity. Each step is individually invokable and consumes the builder:
//!
//! ```ignore
//! let query = QueryBuilder::new(&entity, config.limits())
//!     .apply_filters(&plan.filters)
//!     .apply_sort(&plan.sort)
//!     .apply_pagination(&plan.pagination)
//!     .finish();
//! ```
//!
//! The builder raises no errors. Its input has already been validated, so a
//! column or relation the entity does not have can only come from a
//! configuration whose targets were never checked. A filter on such a column
//! becomes a predicate that matches nothing. Unknown sort keys, projected
//! columns and includes are skipped with a warning.

mod window;

pub use window::{PageWindow, WindowMode};

use crate::allowed::PageLimits;
use crate::query::{FilterValue, OperatorKind, Pagination};
use crate::store::{EntityDescriptor, OrderKey, Predicate, RelationPath, Schema, SelectQuery};
use crate::validator::{ResolvedFilter, ResolvedSort, ValidatedPlan};

/// Incrementally composes a [`SelectQuery`]
#[derive(Debug, Clone)]
pub struct QueryBuilder<'a> {
    entity: &'a EntityDescriptor,
    schema: Option<&'a Schema>,
    limits: PageLimits,
    query: SelectQuery,
    window: Option<PageWindow>,
}

impl<'a> QueryBuilder<'a> {
    /// Start an unfiltered, unsorted, fully projected, unbounded query
    pub fn new(entity: &'a EntityDescriptor, limits: PageLimits) -> Self {
        Self {
            entity,
            schema: None,
            limits,
            query: SelectQuery::new(entity.name.clone()),
            window: None,
        }
    }

    /// Resolve nested include paths through `schema`
    pub fn with_schema(mut self, schema: &'a Schema) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Run every step for a validated plan
    pub fn apply_plan(self, plan: &ValidatedPlan) -> Self {
        self.apply_filters(&plan.filters)
            .apply_sort(&plan.sort)
            .apply_fields(&plan.fields)
            .apply_include(&plan.include)
            .apply_pagination(&plan.pagination)
    }

    /// AND each filter onto the query, in order
    pub fn apply_filters(mut self, filters: &[ResolvedFilter]) -> Self {
        for filter in filters {
            match filter {
                ResolvedFilter::Standard {
                    column,
                    operator,
                    value,
                } => {
                    if !self.entity.has_column(column) {
                        tracing::error!(
                            entity = %self.entity.name,
                            column = %column,
                            "filter on unknown column matches nothing"
                        );
                        self.query = self.query.filter(Predicate::any(Vec::new()));
                        continue;
                    }
                    let predicate = predicate_for(column, *operator, value);
                    self.query = self.query.filter(predicate);
                }
                ResolvedFilter::Custom {
                    name,
                    value,
                    predicate,
                } => {
                    tracing::trace!(filter = %name, "applying custom filter");
                    self.query = predicate(self.query, value);
                }
            }
        }
        self
    }

    /// Append ordering keys; compound rules expand in place
    pub fn apply_sort(mut self, sort: &[ResolvedSort]) -> Self {
        for rule in sort {
            for column in &rule.columns {
                if !self.entity.has_column(column) {
                    tracing::warn!(entity = %self.entity.name, column = %column, "skipping sort on unknown column");
                    continue;
                }
                self.query = self.query.order_by(OrderKey {
                    field: column.clone(),
                    direction: rule.direction,
                });
            }
        }
        self
    }

    /// Restrict the projection; an empty list keeps every column
    pub fn apply_fields(mut self, fields: &[String]) -> Self {
        if fields.is_empty() {
            return self;
        }

        let mut columns: Vec<String> = self
            .entity
            .required_columns()
            .into_iter()
            .map(str::to_string)
            .collect();
        for field in fields {
            if !self.entity.has_column(field) {
                tracing::warn!(entity = %self.entity.name, column = %field, "skipping unknown projected column");
                continue;
            }
            if !columns.contains(field) {
                columns.push(field.clone());
            }
        }

        self.query = self.query.select(columns);
        self
    }

    /// Attach eager loads; nested paths are kept as chains, outer first
    pub fn apply_include(mut self, include: &[RelationPath]) -> Self {
        for path in include {
            if !self.resolves(path) {
                tracing::warn!(entity = %self.entity.name, relation = %path, "skipping unknown relation");
                continue;
            }
            self.query = self.query.with(path.clone());
        }
        self
    }

    /// Bound the query by exactly one pagination mode
    pub fn apply_pagination(mut self, pagination: &Pagination) -> Self {
        let window = PageWindow::resolve(pagination, self.limits);
        self.query = self.query.limit(window.limit).offset(window.offset);
        self.window = Some(window);
        self
    }

    /// The window chosen by `apply_pagination`, if it ran
    pub fn window(&self) -> Option<PageWindow> {
        self.window
    }

    pub fn finish(self) -> SelectQuery {
        self.query
    }

    pub fn into_parts(self) -> (SelectQuery, Option<PageWindow>) {
        (self.query, self.window)
    }

    fn resolves(&self, path: &RelationPath) -> bool {
        let segments = path.segments();
        match (self.schema, segments) {
            (_, []) => false,
            (Some(schema), _) => schema.resolve_path(self.entity, segments).is_some(),
            (None, [single]) => self.entity.relation(single).is_some(),
            // nested paths need the schema to follow the chain
            (None, [first, ..]) => self.entity.relation(first).is_some(),
        }
    }
}

/// Map one operator onto a store predicate
fn predicate_for(column: &str, operator: OperatorKind, value: &FilterValue) -> Predicate {
    if operator == OperatorKind::In {
        return Predicate::in_list(column, value.split_list());
    }

    let values = value.values();
    if let [single] = values.as_slice() {
        return scalar_predicate(column, operator, single);
    }

    // a list under a scalar operator from an unvalidated caller: any may match
    Predicate::any(
        values
            .into_iter()
            .map(|v| scalar_predicate(column, operator, v))
            .collect(),
    )
}

fn scalar_predicate(column: &str, operator: OperatorKind, value: &str) -> Predicate {
    match operator {
        OperatorKind::Equal => Predicate::eq(column, value),
        OperatorKind::NotEqual => Predicate::ne(column, value),
        OperatorKind::LessThan => Predicate::lt(column, value),
        OperatorKind::LessOrEqual => Predicate::lte(column, value),
        OperatorKind::GreaterThan => Predicate::gt(column, value),
        OperatorKind::GreaterOrEqual => Predicate::gte(column, value),
        OperatorKind::Like => Predicate::like(column, value),
        OperatorKind::ILike => Predicate::ilike(column, value),
        OperatorKind::In => Predicate::in_list(column, [value]),
    }
}

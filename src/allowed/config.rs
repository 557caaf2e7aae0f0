//! Per-entity query configuration
//!
//! Built once per entity and shared read-only across requests.

use serde::{Deserialize, Serialize};

use super::errors::{ConfigError, ConfigResult};
use super::filter::AllowedFilter;
use super::registry::{Registry, Rule, RuleCategory};
use super::rules::{AllowedField, AllowedInclude, AllowedSort};
use crate::store::{EntityDescriptor, Schema};

/// Default number of rows for an unqualified listing
pub const DEFAULT_LIMIT: u64 = 100;

/// Maximum rows per request
pub const MAX_LIMIT: u64 = 1000;

/// What the validator does with items that fail the allow-list.
///
/// One policy governs filters, sorts, fields and includes alike.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvalidPolicy {
    /// Fail the request with a validation error
    #[default]
    Reject,
    /// Drop the item and continue
    Ignore,
}

impl InvalidPolicy {
    pub fn from_flag(ignore_invalid: bool) -> Self {
        if ignore_invalid {
            InvalidPolicy::Ignore
        } else {
            InvalidPolicy::Reject
        }
    }

    pub fn ignores(&self) -> bool {
        matches!(self, InvalidPolicy::Ignore)
    }
}

/// Row bounds for listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLimits {
    /// Applied when no pagination was requested
    #[serde(default = "default_limit")]
    pub default_limit: u64,

    /// Cap on any requested `per_page` or `limit`
    #[serde(default = "max_limit")]
    pub max_limit: u64,
}

fn default_limit() -> u64 {
    DEFAULT_LIMIT
}

fn max_limit() -> u64 {
    MAX_LIMIT
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_LIMIT,
            max_limit: MAX_LIMIT,
        }
    }
}

impl PageLimits {
    pub fn validate(&self) -> ConfigResult<()> {
        if self.default_limit == 0 || self.max_limit == 0 || self.default_limit > self.max_limit {
            return Err(ConfigError::InvalidLimits {
                default_limit: self.default_limit,
                max_limit: self.max_limit,
            });
        }
        Ok(())
    }
}

/// Allow-lists, invalid-item policy and page limits for one entity
#[derive(Debug, Clone)]
pub struct QueryBuilderConfig {
    filters: Registry<AllowedFilter>,
    sorts: Registry<AllowedSort>,
    fields: Registry<AllowedField>,
    includes: Registry<AllowedInclude>,
    policy: InvalidPolicy,
    limits: PageLimits,
}

impl QueryBuilderConfig {
    pub fn builder() -> QueryBuilderConfigBuilder {
        QueryBuilderConfigBuilder::default()
    }

    pub fn filters(&self) -> &Registry<AllowedFilter> {
        &self.filters
    }

    pub fn sorts(&self) -> &Registry<AllowedSort> {
        &self.sorts
    }

    pub fn fields(&self) -> &Registry<AllowedField> {
        &self.fields
    }

    pub fn includes(&self) -> &Registry<AllowedInclude> {
        &self.includes
    }

    pub fn policy(&self) -> InvalidPolicy {
        self.policy
    }

    pub fn limits(&self) -> PageLimits {
        self.limits
    }

    /// Check that every rule names a column or relation of `entity`.
    ///
    /// Nested include paths are followed through `schema`. Custom filters
    /// name no column and are not checked.
    pub fn check_targets(&self, entity: &EntityDescriptor, schema: &Schema) -> ConfigResult<()> {
        for filter in self.filters.iter().filter(|f| !f.is_custom()) {
            require_column(entity, RuleCategory::Filter, filter.public_name(), filter.field())?;
        }
        for sort in self.sorts.iter() {
            for column in sort.columns() {
                require_column(entity, RuleCategory::Sort, sort.public_name(), column)?;
            }
        }
        for field in self.fields.iter() {
            for column in field.columns() {
                require_column(entity, RuleCategory::Field, field.public_name(), column)?;
            }
        }
        for include in self.includes.iter() {
            for path in include.paths() {
                let segments: Vec<String> = path.split('.').map(str::to_string).collect();
                if schema.resolve_path(entity, &segments).is_none() {
                    return Err(unknown_target(RuleCategory::Include, include.public_name(), path));
                }
            }
        }
        Ok(())
    }
}

fn require_column(
    entity: &EntityDescriptor,
    category: RuleCategory,
    name: &str,
    column: &str,
) -> ConfigResult<()> {
    if entity.has_column(column) {
        Ok(())
    } else {
        Err(unknown_target(category, name, column))
    }
}

fn unknown_target(category: RuleCategory, name: &str, target: &str) -> ConfigError {
    ConfigError::UnknownTarget {
        category,
        name: name.to_string(),
        target: target.to_string(),
    }
}

impl Default for QueryBuilderConfig {
    /// Nothing allowed, strict, default limits
    fn default() -> Self {
        Self {
            filters: Registry::empty(RuleCategory::Filter),
            sorts: Registry::empty(RuleCategory::Sort),
            fields: Registry::empty(RuleCategory::Field),
            includes: Registry::empty(RuleCategory::Include),
            policy: InvalidPolicy::default(),
            limits: PageLimits::default(),
        }
    }
}

/// Builder for [`QueryBuilderConfig`]
#[derive(Debug, Default)]
pub struct QueryBuilderConfigBuilder {
    filters: Vec<AllowedFilter>,
    sorts: Vec<AllowedSort>,
    fields: Vec<AllowedField>,
    includes: Vec<AllowedInclude>,
    policy: InvalidPolicy,
    limits: PageLimits,
}

impl QueryBuilderConfigBuilder {
    pub fn filter(mut self, filter: AllowedFilter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn filters(mut self, filters: impl IntoIterator<Item = AllowedFilter>) -> Self {
        self.filters.extend(filters);
        self
    }

    pub fn sort(mut self, sort: AllowedSort) -> Self {
        self.sorts.push(sort);
        self
    }

    pub fn sorts(mut self, sorts: impl IntoIterator<Item = AllowedSort>) -> Self {
        self.sorts.extend(sorts);
        self
    }

    pub fn field(mut self, field: AllowedField) -> Self {
        self.fields.push(field);
        self
    }

    pub fn fields(mut self, fields: impl IntoIterator<Item = AllowedField>) -> Self {
        self.fields.extend(fields);
        self
    }

    pub fn include(mut self, include: AllowedInclude) -> Self {
        self.includes.push(include);
        self
    }

    pub fn includes(mut self, includes: impl IntoIterator<Item = AllowedInclude>) -> Self {
        self.includes.extend(includes);
        self
    }

    /// Drop invalid items instead of failing
    pub fn ignore_invalid(mut self, ignore: bool) -> Self {
        self.policy = InvalidPolicy::from_flag(ignore);
        self
    }

    pub fn policy(mut self, policy: InvalidPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn limits(mut self, limits: PageLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn default_limit(mut self, limit: u64) -> Self {
        self.limits.default_limit = limit;
        self
    }

    pub fn max_limit(mut self, limit: u64) -> Self {
        self.limits.max_limit = limit;
        self
    }

    /// Index every category, failing on the first inconsistent rule
    pub fn build(self) -> ConfigResult<QueryBuilderConfig> {
        self.limits.validate()?;
        Ok(QueryBuilderConfig {
            filters: Registry::new(RuleCategory::Filter, self.filters)?,
            sorts: Registry::new(RuleCategory::Sort, self.sorts)?,
            fields: Registry::new(RuleCategory::Field, self.fields)?,
            includes: Registry::new(RuleCategory::Include, self.includes)?,
            policy: self.policy,
            limits: self.limits,
        })
    }
}

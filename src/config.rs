//! # Entity Configuration Files
//!
//! JSON description of one entity and its allow-lists, loaded at startup.
//!
//! ```json
//! {
//!   "entity": { "name": "categories", "columns": ["name", "description", "slug"] },
//!   "filters": [
//!     { "field": "name" },
//!     { "field": "description", "kind": "partial", "operators": ["like"] },
//!     { "field": "slug", "kind": "begins_with" }
//!   ],
//!   "sorts": [{ "name": "name" }],
//!   "ignore_invalid": false
//! }
//! ```
//!
//! Every column and relation a rule names must exist on the entity. `build`
//! runs [`QueryBuilderConfig::check_targets`], so a typo fails at load time.
//! Custom predicates are code-only.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::allowed::{
    AllowedField, AllowedFilter, AllowedInclude, AllowedSort, ConfigError, ConfigResult,
    PageLimits, QueryBuilderConfig, DEFAULT_LIMIT, MAX_LIMIT,
};
use crate::query::{OperatorKind, SortDirection};
use crate::store::{EntityDescriptor, Schema};

/// Filter flavour in a config file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    #[default]
    Exact,
    Partial,
    BeginsWith,
    EndsWith,
    Operator,
}

/// One allowed filter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterEntry {
    pub field: String,

    #[serde(default)]
    pub alias: Option<String>,

    #[serde(default)]
    pub kind: FilterKind,

    #[serde(default)]
    pub default_operator: Option<OperatorKind>,

    /// Overrides the kind's operator set when present
    #[serde(default)]
    pub operators: Option<Vec<OperatorKind>>,
}

/// One allowed sort; `columns` defaults to `[name]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortEntry {
    pub name: String,

    #[serde(default)]
    pub columns: Vec<String>,

    #[serde(default)]
    pub direction: Option<SortDirection>,
}

/// One allowed field selection; `columns` defaults to `[name]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldEntry {
    pub name: String,

    #[serde(default)]
    pub columns: Vec<String>,
}

/// One allowed include; `paths` defaults to `[name]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncludeEntry {
    pub name: String,

    #[serde(default)]
    pub paths: Vec<String>,
}

/// Parsed entity configuration file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityConfigFile {
    pub entity: EntityDescriptor,

    /// Descriptors of relation targets, needed for nested include paths
    #[serde(default)]
    pub related: Vec<EntityDescriptor>,

    #[serde(default)]
    pub filters: Vec<FilterEntry>,

    #[serde(default)]
    pub sorts: Vec<SortEntry>,

    #[serde(default)]
    pub fields: Vec<FieldEntry>,

    #[serde(default)]
    pub includes: Vec<IncludeEntry>,

    #[serde(default)]
    pub ignore_invalid: bool,

    #[serde(default = "default_limit")]
    pub default_limit: u64,

    #[serde(default = "max_limit")]
    pub max_limit: u64,
}

fn default_limit() -> u64 {
    DEFAULT_LIMIT
}

fn max_limit() -> u64 {
    MAX_LIMIT
}

impl EntityConfigFile {
    /// Read and parse a file without building it
    pub fn from_path(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_json(&path.display().to_string(), &text)
    }

    /// Parse JSON text; `origin` only labels errors
    pub fn from_json(origin: &str, text: &str) -> ConfigResult<Self> {
        serde_json::from_str(text).map_err(|e| ConfigError::Parse {
            path: origin.to_string(),
            message: e.to_string(),
        })
    }

    /// Read, parse, validate and build
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<(EntityDescriptor, QueryBuilderConfig)> {
        let file = Self::from_path(path)?;
        let config = file.build()?;
        tracing::debug!(
            entity = %file.entity.name,
            filters = config.filters().len(),
            sorts = config.sorts().len(),
            "Loaded entity configuration"
        );
        Ok((file.entity, config))
    }

    /// Schema holding the entity and every related descriptor
    pub fn schema(&self) -> Schema {
        let mut schema = Schema::new();
        for related in &self.related {
            schema.register(related.clone());
        }
        schema.register(self.entity.clone());
        schema
    }

    /// Build the query configuration and check every rule target
    pub fn build(&self) -> ConfigResult<QueryBuilderConfig> {
        let config = QueryBuilderConfig::builder()
            .filters(self.filters.iter().map(filter_rule))
            .sorts(self.sorts.iter().map(sort_rule))
            .fields(self.fields.iter().map(field_rule))
            .includes(self.includes.iter().map(include_rule))
            .ignore_invalid(self.ignore_invalid)
            .limits(PageLimits {
                default_limit: self.default_limit,
                max_limit: self.max_limit,
            })
            .build()?;
        config.check_targets(&self.entity, &self.schema())?;
        Ok(config)
    }
}

fn filter_rule(entry: &FilterEntry) -> AllowedFilter {
    let mut filter = match entry.kind {
        FilterKind::Exact => AllowedFilter::exact(entry.field.as_str()),
        FilterKind::Partial => AllowedFilter::partial(entry.field.as_str()),
        FilterKind::BeginsWith => AllowedFilter::begins_with(entry.field.as_str()),
        FilterKind::EndsWith => AllowedFilter::ends_with(entry.field.as_str()),
        FilterKind::Operator => {
            let operators = entry.operators.clone().unwrap_or_else(|| OperatorKind::ALL.to_vec());
            let default = entry
                .default_operator
                .or_else(|| operators.first().copied())
                .unwrap_or(OperatorKind::Equal);
            AllowedFilter::operator(entry.field.as_str(), default, operators)
        }
    };
    if let Some(operators) = &entry.operators {
        filter = filter.operators(operators.iter().copied());
    }
    match entry.default_operator {
        Some(default) => filter = filter.default_operator(default),
        None if !filter.allows(filter.default_op()) => {
            // kind default was narrowed away: fall back to the first listed operator
            if let Some(first) = filter.allowed_operators().first().copied() {
                filter = filter.default_operator(first);
            }
        }
        None => {}
    }
    if let Some(alias) = &entry.alias {
        filter = filter.alias(alias.as_str());
    }
    filter
}

fn sort_rule(entry: &SortEntry) -> AllowedSort {
    let mut sort = if entry.columns.is_empty() {
        AllowedSort::field(entry.name.as_str())
    } else {
        AllowedSort::compound(entry.name.as_str(), entry.columns.iter().map(String::as_str))
    };
    if let Some(direction) = entry.direction {
        sort = sort.direction(direction);
    }
    sort
}

fn field_rule(entry: &FieldEntry) -> AllowedField {
    if entry.columns.is_empty() {
        AllowedField::field(entry.name.as_str())
    } else {
        AllowedField::group(entry.name.as_str(), entry.columns.iter().map(String::as_str))
    }
}

fn include_rule(entry: &IncludeEntry) -> AllowedInclude {
    if entry.paths.is_empty() {
        AllowedInclude::relation(entry.name.as_str())
    } else {
        AllowedInclude::group(entry.name.as_str(), entry.paths.iter().map(String::as_str))
    }
}

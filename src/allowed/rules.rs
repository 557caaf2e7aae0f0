//! Allowed sort, field and include rules

use super::errors::{ConfigError, ConfigResult};
use super::registry::{Rule, RuleCategory};
use crate::query::SortDirection;

/// An allowed sort key; may expand to several columns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowedSort {
    name: String,
    columns: Vec<String>,
    alias: Option<String>,
    direction: Option<SortDirection>,
}

impl AllowedSort {
    /// Sort on a single column
    pub fn field(column: impl Into<String>) -> Self {
        let column = column.into();
        Self {
            name: column.clone(),
            columns: vec![column],
            alias: None,
            direction: None,
        }
    }

    /// Sort on several columns under one name, in listed order
    pub fn compound<I, S>(name: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            columns: columns.into_iter().map(Into::into).collect(),
            alias: None,
            direction: None,
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Force a direction regardless of the `-` sigil
    pub fn direction(mut self, direction: SortDirection) -> Self {
        self.direction = Some(direction);
        self
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn forced_direction(&self) -> Option<SortDirection> {
        self.direction
    }
}

impl Rule for AllowedSort {
    fn public_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    fn check(&self) -> ConfigResult<()> {
        non_empty(RuleCategory::Sort, self.public_name(), &self.columns)
    }
}

/// An allowed field selection; a group projects several columns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowedField {
    name: String,
    columns: Vec<String>,
    alias: Option<String>,
}

impl AllowedField {
    pub fn field(column: impl Into<String>) -> Self {
        let column = column.into();
        Self {
            name: column.clone(),
            columns: vec![column],
            alias: None,
        }
    }

    pub fn group<I, S>(name: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            columns: columns.into_iter().map(Into::into).collect(),
            alias: None,
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}

impl Rule for AllowedField {
    fn public_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    fn check(&self) -> ConfigResult<()> {
        non_empty(RuleCategory::Field, self.public_name(), &self.columns)
    }
}

/// An allowed include; paths are dotted relation chains
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowedInclude {
    name: String,
    paths: Vec<String>,
    alias: Option<String>,
}

impl AllowedInclude {
    pub fn relation(path: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            name: path.clone(),
            paths: vec![path],
            alias: None,
        }
    }

    pub fn group<I, S>(name: impl Into<String>, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            paths: paths.into_iter().map(Into::into).collect(),
            alias: None,
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn paths(&self) -> &[String] {
        &self.paths
    }
}

impl Rule for AllowedInclude {
    fn public_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    fn check(&self) -> ConfigResult<()> {
        non_empty(RuleCategory::Include, self.public_name(), &self.paths)
    }
}

fn non_empty(category: RuleCategory, name: &str, targets: &[String]) -> ConfigResult<()> {
    if targets.is_empty() || targets.iter().any(|t| t.trim().is_empty()) {
        return Err(ConfigError::EmptyRule {
            category,
            name: name.to_string(),
        });
    }
    Ok(())
}

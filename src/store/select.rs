//! Executable query description
//!
//! [`SelectQuery`] is what the builder produces and what stores execute.
//! It is plain data: building it performs no I/O, so it can be handed to a
//! blocking or an async executor, and rebuilt safely on retry.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::predicate::Predicate;
use crate::query::SortDirection;

/// One ordering key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderKey {
    pub field: String,
    pub direction: SortDirection,
}

impl OrderKey {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// A dotted relation path (`articles.tags`), outermost first
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub struct RelationPath(Vec<String>);

impl RelationPath {
    /// Split a dotted path; empty segments are dropped
    pub fn parse(path: &str) -> Self {
        Self(
            path.split('.')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for RelationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

impl From<String> for RelationPath {
    fn from(path: String) -> Self {
        Self::parse(&path)
    }
}

impl From<RelationPath> for String {
    fn from(path: RelationPath) -> Self {
        path.to_string()
    }
}

/// Executable select over one entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectQuery {
    /// Target entity name
    pub entity: String,

    /// Conditions, combined with AND
    pub predicates: Vec<Predicate>,

    /// Ordering keys, primary first
    pub order: Vec<OrderKey>,

    /// Projected columns (`None` = all)
    pub projection: Option<Vec<String>>,

    /// Relations to eager-load
    pub eager: Vec<RelationPath>,

    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl SelectQuery {
    /// Unfiltered, unsorted, unbounded select of every column
    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            predicates: Vec::new(),
            order: Vec::new(),
            projection: None,
            eager: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    /// AND a predicate onto the query
    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    /// Append an ordering key
    pub fn order_by(mut self, key: OrderKey) -> Self {
        self.order.push(key);
        self
    }

    /// Restrict the projection
    pub fn select(mut self, columns: Vec<String>) -> Self {
        self.projection = Some(columns);
        self
    }

    /// Attach an eager load; duplicates are ignored
    pub fn with(mut self, path: RelationPath) -> Self {
        if !path.is_empty() && !self.eager.contains(&path) {
            self.eager.push(path);
        }
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// The same predicates, without ordering, projection, eager loads or bounds
    pub fn count_query(&self) -> Self {
        Self {
            entity: self.entity.clone(),
            predicates: self.predicates.clone(),
            ..Self::new("")
        }
    }

    /// Returns true if a limit is set
    pub fn is_bounded(&self) -> bool {
        self.limit.is_some()
    }
}

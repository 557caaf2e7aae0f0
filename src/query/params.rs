//! # Structured Query Parameters
//!
//! The typed, still-unvalidated request produced by the parser. Names are
//! whatever the client sent; values are untyped strings.

use std::collections::BTreeSet;
use std::fmt;

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde::{Deserialize, Serialize};

use super::operator::OperatorKind;

/// Characters escaped when re-serializing a query string
const QUERY_COMPONENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'+')
    .add(b'=')
    .add(b'[')
    .add(b']');

/// A filter value: one string, or several (repeated key or `in` list)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Scalar(String),
    List(Vec<String>),
}

impl FilterValue {
    /// Returns the scalar value, if this is one
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            FilterValue::Scalar(s) => Some(s),
            FilterValue::List(_) => None,
        }
    }

    /// Returns true if this value is a list
    pub fn is_list(&self) -> bool {
        matches!(self, FilterValue::List(_))
    }

    /// Borrow every contained string
    pub fn values(&self) -> Vec<&str> {
        match self {
            FilterValue::Scalar(s) => vec![s.as_str()],
            FilterValue::List(items) => items.iter().map(String::as_str).collect(),
        }
    }

    /// Split on commas, trimming and dropping empty tokens
    pub fn split_list(&self) -> Vec<String> {
        self.values()
            .into_iter()
            .flat_map(|v| v.split(','))
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .collect()
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Scalar(value.to_string())
    }
}

impl From<Vec<&str>> for FilterValue {
    fn from(values: Vec<&str>) -> Self {
        FilterValue::List(values.into_iter().map(str::to_string).collect())
    }
}

/// One requested filter condition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCondition {
    /// Public filter name as sent by the client
    pub field: String,

    /// Operator from `filter[field][op]`; `None` when the key omitted it
    pub operator: Option<OperatorKind>,

    /// Raw value(s)
    pub value: FilterValue,
}

impl FilterCondition {
    /// Create a condition with an explicit operator
    pub fn new(field: impl Into<String>, operator: OperatorKind, value: impl Into<FilterValue>) -> Self {
        Self {
            field: field.into(),
            operator: Some(operator),
            value: value.into(),
        }
    }

    /// Create a condition whose operator was omitted
    pub fn implicit(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self {
            field: field.into(),
            operator: None,
            value: value.into(),
        }
    }

    /// The operator, defaulting to equality
    pub fn effective_operator(&self) -> OperatorKind {
        self.operator.unwrap_or(OperatorKind::Equal)
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// Sort specification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    /// Public sort name
    pub field: String,
    /// Sort direction
    pub direction: SortDirection,
}

impl SortSpec {
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

    /// Parse a raw token; a leading `-` means descending
    pub fn from_token(token: &str) -> Self {
        match token.strip_prefix('-') {
            Some(field) => Self::desc(field),
            None => Self::asc(token),
        }
    }

    /// Render back to the `sort=` token form
    pub fn to_token(&self) -> String {
        match self.direction {
            SortDirection::Asc => self.field.clone(),
            SortDirection::Desc => format!("-{}", self.field),
        }
    }
}

/// Requested pagination; which pair wins is decided by the builder
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl Pagination {
    /// Page-based pagination
    pub fn page(page: u64, per_page: u64) -> Self {
        Self {
            page: Some(page),
            per_page: Some(per_page),
            ..Default::default()
        }
    }

    /// Limit/offset pagination
    pub fn limit_offset(limit: u64, offset: u64) -> Self {
        Self {
            limit: Some(limit),
            offset: Some(offset),
            ..Default::default()
        }
    }

    /// Returns true if `page` or `per_page` was given
    pub fn is_page_based(&self) -> bool {
        self.page.is_some() || self.per_page.is_some()
    }

    /// Returns true if `limit` or `offset` was given
    pub fn is_offset_based(&self) -> bool {
        self.limit.is_some() || self.offset.is_some()
    }

    /// Returns true if no pagination was requested at all
    pub fn is_empty(&self) -> bool {
        !self.is_page_based() && !self.is_offset_based()
    }
}

/// Parsed query parameters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryParams {
    /// Filter conditions, in conjunction order
    pub filters: Vec<FilterCondition>,

    /// Sort keys, primary first
    pub sort: Vec<SortSpec>,

    /// Relations to eager-load
    pub include: BTreeSet<String>,

    /// Fields to project (empty = all)
    pub fields: BTreeSet<String>,

    /// Requested pagination
    pub pagination: Pagination,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a filter condition
    pub fn with_filter(mut self, filter: FilterCondition) -> Self {
        self.filters.push(filter);
        self
    }

    /// Adds a sort key
    pub fn with_sort(mut self, sort: SortSpec) -> Self {
        self.sort.push(sort);
        self
    }

    /// Adds a relation to include
    pub fn with_include(mut self, include: impl Into<String>) -> Self {
        self.include.insert(include.into());
        self
    }

    /// Adds a field to the projection
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.fields.insert(field.into());
        self
    }

    /// Sets pagination
    pub fn with_pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = pagination;
        self
    }

    /// Re-serialize into URL query-string form.
    ///
    /// Ordering is canonical: filters, sort, fields, include, pagination.
    pub fn to_query_string(&self) -> String {
        let mut pairs: Vec<(String, String)> = Vec::new();

        for filter in &self.filters {
            let key = match filter.operator {
                Some(op) => format!("filter[{}][{}]", encode(&filter.field), op.code()),
                None => format!("filter[{}]", encode(&filter.field)),
            };
            match (&filter.value, filter.effective_operator().is_list()) {
                (FilterValue::List(items), true) => {
                    let joined: Vec<String> = items.iter().map(|v| encode(v)).collect();
                    pairs.push((key, joined.join(",")));
                }
                (FilterValue::List(items), false) => {
                    for item in items {
                        pairs.push((key.clone(), encode(item)));
                    }
                }
                (FilterValue::Scalar(value), _) => pairs.push((key, encode(value))),
            }
        }

        for sort in &self.sort {
            pairs.push(("sort".to_string(), encode(&sort.to_token())));
        }

        if !self.fields.is_empty() {
            pairs.push(("fields".to_string(), join_encoded(&self.fields)));
        }
        if !self.include.is_empty() {
            pairs.push(("include".to_string(), join_encoded(&self.include)));
        }

        let p = &self.pagination;
        for (key, value) in [
            ("page", p.page),
            ("per_page", p.per_page),
            ("limit", p.limit),
            ("offset", p.offset),
        ] {
            if let Some(v) = value {
                pairs.push((key.to_string(), v.to_string()));
            }
        }

        pairs
            .into_iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&")
    }
}

impl fmt::Display for QueryParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_query_string())
    }
}

fn encode(value: &str) -> String {
    utf8_percent_encode(value, QUERY_COMPONENT).to_string()
}

fn join_encoded(items: &BTreeSet<String>) -> String {
    items.iter().map(|i| encode(i)).collect::<Vec<_>>().join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_token() {
        let desc = SortSpec::from_token("-created_at");
        assert_eq!(desc, SortSpec::desc("created_at"));
        assert_eq!(desc.to_token(), "-created_at");

        let asc = SortSpec::from_token("name");
        assert_eq!(asc.direction, SortDirection::Asc);
        assert_eq!(asc.to_token(), "name");
    }

    #[test]
    fn test_split_list() {
        let value = FilterValue::List(vec!["1, 2".into(), "3".into(), "".into()]);
        assert_eq!(value.split_list(), vec!["1", "2", "3"]);

        let scalar = FilterValue::from("a,,b ");
        assert_eq!(scalar.split_list(), vec!["a", "b"]);
    }

    #[test]
    fn test_effective_operator_defaults_to_equal() {
        let filter = FilterCondition::implicit("name", "Alice");
        assert_eq!(filter.effective_operator(), OperatorKind::Equal);
    }

    #[test]
    fn test_to_query_string() {
        let params = QueryParams::new()
            .with_filter(FilterCondition::implicit("name", "Tech & Co"))
            .with_filter(FilterCondition::new("id", OperatorKind::In, vec!["1", "2"]))
            .with_sort(SortSpec::desc("created_at"))
            .with_field("name")
            .with_field("id")
            .with_include("articles")
            .with_pagination(Pagination::page(2, 10));

        assert_eq!(
            params.to_query_string(),
            "filter[name]=Tech%20%26%20Co&filter[id][in]=1,2&sort=-created_at\
             &fields=id,name&include=articles&page=2&per_page=10"
        );
    }

    #[test]
    fn test_pagination_modes() {
        assert!(Pagination::default().is_empty());
        assert!(Pagination::page(1, 10).is_page_based());
        assert!(!Pagination::page(1, 10).is_offset_based());
        assert!(Pagination::limit_offset(5, 0).is_offset_based());
    }
}

//! # Query Parameter Parser
//!
//! Parses raw query parameters into a structured [`QueryParams`].
//!
//! Purely syntactic: names are passed through untouched and checked against
//! the allow-lists later by the validator.
//!
//! Recognized keys:
//! - `filter[<field>]`, `filter[<field>][<op>]`
//! - `sort` (repeatable, comma-joinable, `-` prefix for descending)
//! - `fields`, `include` (repeatable, comma-joinable)
//! - `page`, `per_page`, `limit`, `offset`

use std::collections::{BTreeSet, HashMap};

use percent_encoding::percent_decode_str;

use super::errors::{QueryError, QueryResult};
use super::operator::OperatorKind;
use super::params::{FilterCondition, FilterValue, Pagination, QueryParams, SortSpec};

/// Raw parameters as an ordered multimap of `(key, value)` pairs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawParams {
    pairs: Vec<(String, String)>,
}

impl RawParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a pair
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((key.into(), value.into()));
    }

    /// Decode a URL query string (`a=1&b=2`), with or without a leading `?`
    pub fn from_query_string(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        query
            .split('&')
            .filter(|part| !part.is_empty())
            .map(|part| match part.split_once('=') {
                Some((k, v)) => (decode(k), decode(v)),
                None => (decode(part), String::new()),
            })
            .collect()
    }

    /// Build from a multi-valued map.
    ///
    /// Keys are visited in sorted order so the result is deterministic;
    /// callers that care about filter order should use the ordered forms.
    pub fn from_map(map: &HashMap<String, Vec<String>>) -> Self {
        let mut keys: Vec<&String> = map.keys().collect();
        keys.sort();
        let mut raw = Self::new();
        for key in keys {
            for value in &map[key] {
                raw.push(key.clone(), value.clone());
            }
        }
        raw
    }

    /// Iterate over pairs in order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            pairs: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// Filter values collected per `(field, operator)` before conversion
struct FilterGroup {
    field: String,
    operator: Option<OperatorKind>,
    values: Vec<String>,
}

impl QueryParams {
    /// Parse raw parameters
    pub fn parse(raw: &RawParams) -> QueryResult<Self> {
        let mut groups: Vec<FilterGroup> = Vec::new();
        let mut sort = Vec::new();
        let mut include = BTreeSet::new();
        let mut fields = BTreeSet::new();
        let mut pagination = Pagination::default();

        for (key, value) in raw.iter() {
            match key {
                "sort" => sort.extend(parse_sort(value)?),
                "include" => include.extend(parse_list(value)),
                "fields" => fields.extend(parse_list(value)),
                "page" => pagination.page = Some(parse_positive(key, value)?),
                "per_page" => pagination.per_page = Some(parse_positive(key, value)?),
                "limit" => pagination.limit = Some(parse_positive(key, value)?),
                "offset" => pagination.offset = Some(parse_integer(key, value)?),
                _ => {
                    if let Some((field, operator)) = parse_filter_key(key)? {
                        match groups
                            .iter_mut()
                            .find(|g| g.field == field && g.operator == operator)
                        {
                            Some(group) => group.values.push(value.to_string()),
                            None => groups.push(FilterGroup {
                                field,
                                operator,
                                values: vec![value.to_string()],
                            }),
                        }
                    }
                }
            }
        }

        let filters = groups.into_iter().map(into_condition).collect();

        Ok(QueryParams {
            filters,
            sort,
            include,
            fields,
            pagination,
        })
    }

    /// Parse a URL query string
    pub fn from_query_string(query: &str) -> QueryResult<Self> {
        Self::parse(&RawParams::from_query_string(query))
    }
}

fn into_condition(group: FilterGroup) -> FilterCondition {
    let FilterGroup {
        field,
        operator,
        mut values,
    } = group;

    let value = if operator == Some(OperatorKind::In) {
        FilterValue::List(FilterValue::List(values).split_list())
    } else if values.len() == 1 {
        FilterValue::Scalar(values.remove(0))
    } else {
        FilterValue::List(values)
    };

    FilterCondition {
        field,
        operator,
        value,
    }
}

/// Parse `filter[field]` / `filter[field][op]`.
///
/// Returns `None` for keys that are not filter keys at all.
fn parse_filter_key(key: &str) -> QueryResult<Option<(String, Option<OperatorKind>)>> {
    if key == "filter" {
        return Err(QueryError::MalformedFilterKey(key.to_string()));
    }
    let Some(rest) = key.strip_prefix("filter[") else {
        return Ok(None);
    };

    let malformed = || QueryError::MalformedFilterKey(key.to_string());

    let close = rest.find(']').ok_or_else(malformed)?;
    let field = &rest[..close];
    if field.is_empty() || field.contains('[') {
        return Err(malformed());
    }

    let remainder = &rest[close + 1..];
    if remainder.is_empty() {
        return Ok(Some((field.to_string(), None)));
    }

    let token = remainder
        .strip_prefix('[')
        .and_then(|r| r.strip_suffix(']'))
        .filter(|t| !t.is_empty() && !t.contains('[') && !t.contains(']'))
        .ok_or_else(malformed)?;

    match OperatorKind::from_code(token) {
        Some(op) => Ok(Some((field.to_string(), Some(op)))),
        None => Err(QueryError::UnknownOperator {
            field: field.to_string(),
            operator: token.to_string(),
        }),
    }
}

/// Parse sort tokens (comma-separated, `-` prefix for descending)
fn parse_sort(value: &str) -> QueryResult<Vec<SortSpec>> {
    let mut specs = Vec::new();

    for token in value.split(',') {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        let spec = SortSpec::from_token(token);
        if spec.field.is_empty() {
            return Err(QueryError::EmptySortField);
        }
        specs.push(spec);
    }

    Ok(specs)
}

/// Parse a comma-separated list, dropping empty entries
fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse a non-negative integer
fn parse_integer(param: &str, value: &str) -> QueryResult<u64> {
    value.trim().parse().map_err(|_| QueryError::InvalidInteger {
        param: param.to_string(),
        value: value.to_string(),
    })
}

/// Parse an integer that must be at least 1
fn parse_positive(param: &str, value: &str) -> QueryResult<u64> {
    match parse_integer(param, value)? {
        0 => Err(QueryError::NonPositive(param.to_string())),
        n => Ok(n),
    }
}

fn decode(component: &str) -> String {
    let spaced = component.replace('+', " ");
    percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(query: &str) -> QueryResult<QueryParams> {
        QueryParams::from_query_string(query)
    }

    #[test]
    fn test_parse_filter_key() {
        assert_eq!(
            parse_filter_key("filter[name]").unwrap(),
            Some(("name".to_string(), None))
        );
        assert_eq!(
            parse_filter_key("filter[age][gte]").unwrap(),
            Some(("age".to_string(), Some(OperatorKind::GreaterOrEqual)))
        );
        assert_eq!(parse_filter_key("page").unwrap(), None);
        assert_eq!(parse_filter_key("filters").unwrap(), None);
    }

    #[test]
    fn test_malformed_filter_keys() {
        for key in ["filter", "filter[]", "filter[name", "filter[name]x", "filter[a][eq][b]", "filter[a][]"] {
            let err = parse_filter_key(key).unwrap_err();
            assert!(
                matches!(err, QueryError::MalformedFilterKey(_)),
                "{} should be malformed, got {:?}",
                key,
                err
            );
        }
    }

    #[test]
    fn test_unknown_operator_is_syntax_error() {
        let err = parse("filter[name][contains]=x").unwrap_err();
        assert_eq!(
            err,
            QueryError::UnknownOperator {
                field: "name".into(),
                operator: "contains".into()
            }
        );
        assert!(err.is_syntax());
    }

    #[test]
    fn test_parse_filters_in_order() {
        let params = parse("filter[name]=Tech&filter[age][gt]=18&filter[id][in]=1,2,3").unwrap();

        assert_eq!(params.filters.len(), 3);
        assert_eq!(params.filters[0], FilterCondition::implicit("name", "Tech"));
        assert_eq!(
            params.filters[1],
            FilterCondition::new("age", OperatorKind::GreaterThan, "18")
        );
        assert_eq!(
            params.filters[2],
            FilterCondition::new("id", OperatorKind::In, vec!["1", "2", "3"])
        );
    }

    #[test]
    fn test_repeated_filter_key_merges_into_list() {
        let params = parse("filter[status]=a&sort=name&filter[status]=b").unwrap();
        assert_eq!(params.filters.len(), 1);
        assert_eq!(params.filters[0].value, FilterValue::List(vec!["a".into(), "b".into()]));
    }

    #[test]
    fn test_parse_sort() {
        let params = parse("sort=a&sort=-b").unwrap();
        assert_eq!(params.sort, vec![SortSpec::asc("a"), SortSpec::desc("b")]);

        let params = parse("sort=a,-b,,c").unwrap();
        assert_eq!(params.sort.len(), 3);

        assert_eq!(parse("sort=-").unwrap_err(), QueryError::EmptySortField);
    }

    #[test]
    fn test_include_and_fields_merge() {
        let params = parse("include=a,b&include=c&fields=id&fields=name,email").unwrap();
        assert_eq!(params.include.len(), 3);
        assert!(params.include.contains("c"));
        assert_eq!(
            params.fields.iter().cloned().collect::<Vec<_>>(),
            vec!["email", "id", "name"]
        );
    }

    #[test]
    fn test_parse_pagination() {
        let params = parse("page=2&per_page=10&limit=5&offset=0").unwrap();
        assert_eq!(params.pagination.page, Some(2));
        assert_eq!(params.pagination.per_page, Some(10));
        assert_eq!(params.pagination.limit, Some(5));
        assert_eq!(params.pagination.offset, Some(0));
    }

    #[test]
    fn test_invalid_pagination() {
        assert!(matches!(
            parse("page=abc").unwrap_err(),
            QueryError::InvalidInteger { .. }
        ));
        assert!(matches!(
            parse("limit=-5").unwrap_err(),
            QueryError::InvalidInteger { .. }
        ));
        assert_eq!(
            parse("per_page=0").unwrap_err(),
            QueryError::NonPositive("per_page".into())
        );
        assert!(parse("offset=0").is_ok());
    }

    #[test]
    fn test_percent_decoding() {
        let params = parse("filter%5Bdescription%5D%5Bilike%5D=%25web%25&filter[name]=Tech+Corp").unwrap();
        assert_eq!(
            params.filters[0],
            FilterCondition::new("description", OperatorKind::ILike, "%web%")
        );
        assert_eq!(params.filters[1].value, FilterValue::from("Tech Corp"));
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let params = parse("utm_source=mail&filter[name]=x").unwrap();
        assert_eq!(params.filters.len(), 1);
    }

    #[test]
    fn test_from_map() {
        let mut map = HashMap::new();
        map.insert("sort".to_string(), vec!["-id".to_string()]);
        map.insert("filter[name]".to_string(), vec!["a".to_string()]);

        let params = QueryParams::parse(&RawParams::from_map(&map)).unwrap();
        assert_eq!(params.filters.len(), 1);
        assert_eq!(params.sort, vec![SortSpec::desc("id")]);
    }

    #[test]
    fn test_round_trip() {
        let original = parse(
            "filter[name]=Tech%20%26%20Co&filter[id][in]=1,2&filter[tag]=x&filter[tag]=y\
             &sort=-created_at&sort=name&fields=id,name&include=articles.tags&page=3&per_page=20",
        )
        .unwrap();

        let reparsed = parse(&original.to_query_string()).unwrap();
        assert_eq!(reparsed, original);
    }
}

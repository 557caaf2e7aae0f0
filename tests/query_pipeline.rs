//! Query Pipeline Tests
//!
//! End-to-end behaviour of parse -> validate -> build:
//! - strict and lenient handling of unlisted items
//! - alias replacement of public names
//! - operator mapping, including `in`
//! - pagination precedence and the default bound
//! - sort order stability
//! - syntax errors surviving the lenient policy

use crudkit::allowed::{AllowedFilter, AllowedSort, QueryBuilderConfig, DEFAULT_LIMIT};
use crudkit::builder::QueryBuilder;
use crudkit::query::{OperatorKind, QueryError, QueryParams, SortDirection};
use crudkit::store::{EntityDescriptor, OrderKey, Predicate, SelectQuery};
use crudkit::validator::validate;

// =============================================================================
// Helper Functions
// =============================================================================

fn categories() -> EntityDescriptor {
    EntityDescriptor::new("categories").with_columns(["name", "description", "created_at", "rank"])
}

fn config(ignore_invalid: bool) -> QueryBuilderConfig {
    QueryBuilderConfig::builder()
        .filter(AllowedFilter::exact("name"))
        .filter(AllowedFilter::partial("description"))
        .filter(AllowedFilter::exact("id"))
        .sort(AllowedSort::field("name"))
        .sort(AllowedSort::field("rank"))
        .ignore_invalid(ignore_invalid)
        .build()
        .unwrap()
}

fn build(query: &str, config: &QueryBuilderConfig) -> Result<SelectQuery, QueryError> {
    let params = QueryParams::from_query_string(query)?;
    let plan = validate(&params, config)?;
    let entity = categories();
    Ok(QueryBuilder::new(&entity, config.limits()).apply_plan(&plan).finish())
}

const SCENARIO: &str =
    "filter[name]=Tech&filter[description][ilike]=%25web%25&sort=-created_at&page=1&per_page=2";

// =============================================================================
// End-to-End Scenario
// =============================================================================

#[test]
fn test_scenario_strict_rejects_unlisted_sort() {
    let err = build(SCENARIO, &config(false)).unwrap_err();
    assert_eq!(err, QueryError::SortNotAllowed("created_at".into()));
}

#[test]
fn test_scenario_lenient_drops_sort_and_keeps_filters() {
    let query = build(SCENARIO, &config(true)).unwrap();

    assert_eq!(
        query.predicates,
        vec![
            Predicate::eq("name", "Tech"),
            Predicate::ilike("description", "%web%"),
        ]
    );
    assert!(query.order.is_empty());
    assert_eq!(query.limit, Some(2));
    assert_eq!(query.offset, Some(0));
}

// The scenario asks for `description[ilike]`, so a rule limited to LIKE
// cannot serve it as written. This variant pins what such a rule does.
fn like_only_config(ignore_invalid: bool) -> QueryBuilderConfig {
    QueryBuilderConfig::builder()
        .filter(AllowedFilter::exact("name"))
        .filter(
            AllowedFilter::partial("description")
                .operators([OperatorKind::Like])
                .default_operator(OperatorKind::Like),
        )
        .sort(AllowedSort::field("name"))
        .ignore_invalid(ignore_invalid)
        .build()
        .unwrap()
}

#[test]
fn test_scenario_like_only_rule_strict() {
    // filters are validated before sorts, so the operator fails first
    let err = build(SCENARIO, &like_only_config(false)).unwrap_err();
    assert!(matches!(
        err,
        QueryError::OperatorNotAllowed {
            ref filter,
            operator: OperatorKind::ILike,
            ..
        } if filter == "description"
    ));
}

#[test]
fn test_scenario_like_only_rule_lenient() {
    let query = build(SCENARIO, &like_only_config(true)).unwrap();
    assert_eq!(query.predicates, vec![Predicate::eq("name", "Tech")]);
    assert!(query.order.is_empty());
    assert_eq!((query.limit, query.offset), (Some(2), Some(0)));

    let query = build("filter[description][like]=%25web%25", &like_only_config(false)).unwrap();
    assert_eq!(query.predicates, vec![Predicate::like("description", "%web%")]);
}

// =============================================================================
// Allow-List Behaviour
// =============================================================================

#[test]
fn test_alias_replaces_public_name() {
    let config = QueryBuilderConfig::builder()
        .filter(AllowedFilter::exact("description").alias("desc"))
        .build()
        .unwrap();

    let query = build("filter[desc]=x", &config).unwrap();
    assert_eq!(query.predicates, vec![Predicate::eq("description", "x")]);

    let err = build("filter[description]=x", &config).unwrap_err();
    assert!(matches!(err, QueryError::FilterNotAllowed { ref filter, .. } if filter == "description"));
}

#[test]
fn test_disallowed_operator_each_policy() {
    let err = build("filter[name][gt]=a", &config(false)).unwrap_err();
    assert!(matches!(
        err,
        QueryError::OperatorNotAllowed {
            operator: OperatorKind::GreaterThan,
            ..
        }
    ));

    let query = build("filter[name][gt]=a", &config(true)).unwrap();
    assert!(query.predicates.is_empty());
}

#[test]
fn test_in_operator_builds_membership() {
    let query = build("filter[id][in]=1,2,3", &config(false)).unwrap();
    assert_eq!(query.predicates, vec![Predicate::in_list("id", ["1", "2", "3"])]);

    let exact = build("filter[name][in]=a,b", &config(false)).unwrap();
    assert_eq!(exact.predicates, vec![Predicate::in_list("name", ["a", "b"])]);

    let partial_only = build("filter[description][in]=a,b", &config(false)).unwrap_err();
    assert_eq!(partial_only.code(), "CRUD_QUERY_OPERATOR_NOT_ALLOWED");
}

#[test]
fn test_syntax_errors_ignore_lenient_policy() {
    let lenient = config(true);
    for query in ["filter[name][contains]=x", "page=abc", "sort=-", "per_page=0"] {
        let err = build(query, &lenient).unwrap_err();
        assert!(err.is_syntax(), "{} should fail as syntax, got {:?}", query, err);
    }

    let err = build("filter[name][contains]=x", &lenient).unwrap_err();
    assert_eq!(err.code(), "CRUD_QUERY_UNKNOWN_OPERATOR");
}

#[test]
fn test_begins_with_rule_anchors_pattern() {
    let config = QueryBuilderConfig::builder()
        .filter(AllowedFilter::begins_with("name"))
        .filter(AllowedFilter::ends_with("description").alias("tail"))
        .build()
        .unwrap();

    let query = build("filter[name]=Te&filter[tail][like]=web", &config).unwrap();
    assert_eq!(
        query.predicates,
        vec![Predicate::ilike("name", "Te%"), Predicate::like("description", "%web")]
    );
}

// =============================================================================
// Ordering and Pagination
// =============================================================================

#[test]
fn test_sort_order_matches_input() {
    let query = build("sort=name&sort=-rank", &config(false)).unwrap();
    assert_eq!(query.order, vec![OrderKey::asc("name"), OrderKey::desc("rank")]);
    assert_eq!(query.order[1].direction, SortDirection::Desc);
}

#[test]
fn test_page_parameters_win() {
    let query = build("page=2&per_page=10&limit=5&offset=0", &config(false)).unwrap();
    assert_eq!(query.limit, Some(10));
    assert_eq!(query.offset, Some(10));
}

#[test]
fn test_empty_request_is_bounded() {
    let query = build("", &config(false)).unwrap();
    assert!(query.predicates.is_empty());
    assert!(query.order.is_empty());
    assert!(query.projection.is_none());
    assert!(query.eager.is_empty());
    assert_eq!(query.limit, Some(DEFAULT_LIMIT));
    assert!(query.is_bounded());
}

// =============================================================================
// Round Trip
// =============================================================================

#[test]
fn test_params_round_trip() {
    let original = QueryParams::from_query_string(
        "filter[name]=Tech&filter[id][in]=1,2&sort=-rank&include=articles&fields=name&page=3&per_page=5",
    )
    .unwrap();

    let reparsed = QueryParams::from_query_string(&original.to_query_string()).unwrap();
    assert_eq!(reparsed, original);
}

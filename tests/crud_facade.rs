//! CRUD Facade Tests
//!
//! Listing, pagination metadata, relation loading and mutations through
//! `CrudFacade` and `AsyncCrud` over the in-memory store.

use std::sync::Arc;

use crudkit::allowed::{AllowedField, AllowedFilter, AllowedInclude, AllowedSort, QueryBuilderConfig};
use crudkit::crud::{AsyncCrud, CrudError, CrudFacade};
use crudkit::query::{OperatorKind, QueryParams};
use crudkit::store::{EntityDescriptor, MemoryStore, Relation, Schema};
use serde_json::json;

// =============================================================================
// Helper Functions
// =============================================================================

fn schema() -> Schema {
    Schema::new()
        .with_entity(
            EntityDescriptor::new("categories")
                .with_columns(["name", "rank"])
                .with_relation(Relation::has_many("articles", "articles", "category_id")),
        )
        .with_entity(
            EntityDescriptor::new("articles")
                .with_columns(["title", "category_id"])
                .with_relation(Relation::belongs_to("category", "categories", "category_id")),
        )
}

fn store() -> Arc<MemoryStore> {
    let store = MemoryStore::new(schema());
    store
        .seed(
            "categories",
            vec![
                json!({"id": "1", "name": "Tech", "rank": 3}),
                json!({"id": "2", "name": "Food", "rank": 1}),
                json!({"id": "3", "name": "Travel", "rank": 2}),
            ],
        )
        .unwrap();
    store
        .seed(
            "articles",
            vec![
                json!({"id": "a1", "title": "Rust", "category_id": "1"}),
                json!({"id": "a2", "title": "Go", "category_id": "1"}),
                json!({"id": "a3", "title": "Pasta", "category_id": "2"}),
            ],
        )
        .unwrap();
    Arc::new(store)
}

fn facade() -> CrudFacade<MemoryStore> {
    let config = QueryBuilderConfig::builder()
        .filter(AllowedFilter::exact("name"))
        .filter(AllowedFilter::operator(
            "rank",
            OperatorKind::Equal,
            [OperatorKind::Equal, OperatorKind::GreaterThan],
        ))
        .sort(AllowedSort::field("rank"))
        .field(AllowedField::field("name"))
        .include(AllowedInclude::relation("articles"))
        .build()
        .unwrap();
    CrudFacade::for_entity(store(), "categories", Arc::new(config)).unwrap()
}

fn params(query: &str) -> QueryParams {
    QueryParams::from_query_string(query).unwrap()
}

// =============================================================================
// Listing
// =============================================================================

#[test]
fn test_list_filters_and_sorts() {
    let rows = facade().list(&params("filter[rank][gt]=1&sort=-rank")).unwrap();
    let names: Vec<_> = rows.iter().map(|r| r["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["Tech", "Travel"]);
}

#[test]
fn test_list_projects_and_includes() {
    let rows = facade()
        .list(&params("filter[name]=Tech&fields=name&include=articles"))
        .unwrap();
    assert_eq!(rows.len(), 1);

    let row = &rows[0];
    assert_eq!(row["id"], "1");
    assert!(row.get("rank").is_none());
    assert_eq!(row["articles"].as_array().unwrap().len(), 2);
}

#[test]
fn test_paginated_metadata() {
    let page = facade().list_paginated(&params("sort=rank&page=2&per_page=2")).unwrap();
    assert_eq!(page.total, 3);
    assert_eq!(page.total_pages, 2);
    assert_eq!(page.page, 2);
    assert!(!page.has_next);
    assert!(page.has_prev);
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0]["name"], "Tech");
}

#[test]
fn test_offset_window_metadata_uses_page_view() {
    // offset 1 sits inside page 1 of size 2
    let page = facade().list_paginated(&params("sort=rank&limit=2&offset=1")).unwrap();
    assert_eq!(page.total, 3);
    assert_eq!(page.page, 1);
    assert_eq!(page.total_pages, 2);
    assert!(page.has_next);
    assert!(!page.has_prev);
    let names: Vec<_> = page.items.iter().map(|r| r["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["Travel", "Tech"]);
}

#[test]
fn test_paginated_empty_result() {
    let page = facade().list_paginated(&params("filter[name]=Nothing")).unwrap();
    assert_eq!(page.total, 0);
    assert_eq!(page.total_pages, 0);
    assert!(!page.has_next);
    assert!(!page.has_prev);
    assert!(page.items.is_empty());
}

#[test]
fn test_validation_error_aborts_listing() {
    let err = facade().list(&params("include=secrets")).unwrap_err();
    assert_eq!(err.code(), "CRUD_QUERY_INCLUDE_NOT_ALLOWED");
    assert_eq!(err.status_code().as_u16(), 400);
}

// =============================================================================
// Construction
// =============================================================================

#[test]
fn test_misspelt_rule_target_fails_construction() {
    let config = QueryBuilderConfig::builder()
        .filter(AllowedFilter::exact("nmae").alias("name"))
        .build()
        .unwrap();
    let err = CrudFacade::for_entity(store(), "categories", Arc::new(config))
        .err()
        .unwrap();
    assert_eq!(err.code(), "CRUD_CONFIG_UNKNOWN_TARGET");

    let config = QueryBuilderConfig::builder()
        .include(AllowedInclude::relation("articles.author"))
        .build()
        .unwrap();
    let categories = schema().get("categories").cloned().unwrap();
    let err = CrudFacade::new(store(), categories, Arc::new(config)).err().unwrap();
    assert_eq!(err.code(), "CRUD_CONFIG_UNKNOWN_TARGET");
}

#[test]
fn test_custom_filter_needs_no_column() {
    let config = QueryBuilderConfig::builder()
        .filter(AllowedFilter::custom("top", |query, _| query.filter(crudkit::store::Predicate::gt("rank", "2"))))
        .build()
        .unwrap();
    let facade = CrudFacade::for_entity(store(), "categories", Arc::new(config)).unwrap();
    let rows = facade.list(&params("filter[top]=1")).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["name"], "Tech");
}

// =============================================================================
// Single Records and Mutations
// =============================================================================

#[test]
fn test_get_respects_request_filters() {
    let facade = facade();
    let found = facade.get("2", Some(&params("filter[name]=Food"))).unwrap();
    assert_eq!(found["name"], "Food");

    let hidden = facade.get("2", Some(&params("filter[name]=Tech"))).unwrap_err();
    assert!(matches!(hidden, CrudError::NotFound { .. }));
}

#[test]
fn test_mutations() {
    let facade = facade();
    let created = facade.create(json!({"name": "Music", "rank": 4})).unwrap();
    let id = created["id"].as_str().unwrap().to_string();

    let updated = facade.update(&id, json!({"rank": 5})).unwrap();
    assert_eq!(updated["rank"], 5);
    assert_eq!(updated["name"], "Music");

    facade.delete(&id).unwrap();
    assert_eq!(facade.delete(&id).unwrap_err().status_code().as_u16(), 404);
    assert_eq!(
        facade.create(json!({"id": "1"})).unwrap_err().status_code().as_u16(),
        409
    );
    assert!(matches!(
        facade.create(json!([1, 2])),
        Err(CrudError::InvalidRecord(_))
    ));
}

// =============================================================================
// Async
// =============================================================================

#[tokio::test]
async fn test_async_listing_matches_blocking() {
    let facade = facade();
    let blocking = facade.list(&params("sort=rank")).unwrap();

    let crud = AsyncCrud::new(facade);
    let rows = crud.list(params("sort=rank")).await.unwrap();
    assert_eq!(rows, blocking);

    let page = crud.list_paginated(params("per_page=1")).await.unwrap();
    assert_eq!(page.total_pages, 3);
    assert!(page.has_next);
}

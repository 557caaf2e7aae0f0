//! # HTTP Adapter
//!
//! Axum glue: a [`QueryString`] extractor that parses the request URI's
//! query into [`QueryParams`], and a per-entity resource router over an
//! [`AsyncCrud`]. Rejections render as `CrudError` JSON.

use axum::{
    extract::{FromRequestParts, Path, State},
    http::{request::Parts, StatusCode},
    routing::get,
    Json, Router,
};
use serde_json::Value;

use crate::crud::{AsyncCrud, CrudError, Page};
use crate::query::QueryParams;
use crate::store::DataStore;

/// Parsed query-string parameters of the current request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryString(pub QueryParams);

#[axum::async_trait]
impl<St: Send + Sync> FromRequestParts<St> for QueryString {
    type Rejection = CrudError;

    async fn from_request_parts(parts: &mut Parts, _state: &St) -> Result<Self, Self::Rejection> {
        let raw = parts.uri.query().unwrap_or_default();
        Ok(QueryString(QueryParams::from_query_string(raw)?))
    }
}

/// Routes for one entity:
///
/// - `GET /` paginated listing
/// - `POST /` create
/// - `GET /:id` fetch one (request filters still apply)
/// - `PATCH /:id` merge update
/// - `DELETE /:id` delete
pub fn resource_router<S: DataStore + 'static>(crud: AsyncCrud<S>) -> Router {
    Router::new()
        .route("/", get(list_handler::<S>).post(create_handler::<S>))
        .route(
            "/:id",
            get(get_handler::<S>)
                .patch(update_handler::<S>)
                .delete(delete_handler::<S>),
        )
        .with_state(crud)
}

async fn list_handler<S: DataStore + 'static>(
    State(crud): State<AsyncCrud<S>>,
    QueryString(params): QueryString,
) -> Result<Json<Page<Value>>, CrudError> {
    Ok(Json(crud.list_paginated(params).await?))
}

async fn get_handler<S: DataStore + 'static>(
    State(crud): State<AsyncCrud<S>>,
    Path(id): Path<String>,
    QueryString(params): QueryString,
) -> Result<Json<Value>, CrudError> {
    Ok(Json(crud.get(&id, Some(params)).await?))
}

async fn create_handler<S: DataStore + 'static>(
    State(crud): State<AsyncCrud<S>>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Value>), CrudError> {
    let created = crud.create(body).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_handler<S: DataStore + 'static>(
    State(crud): State<AsyncCrud<S>>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, CrudError> {
    Ok(Json(crud.update(&id, body).await?))
}

async fn delete_handler<S: DataStore + 'static>(
    State(crud): State<AsyncCrud<S>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, CrudError> {
    Ok(Json(crud.delete(&id).await?))
}

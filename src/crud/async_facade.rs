//! Non-blocking CRUD façade
//!
//! Wraps a [`CrudFacade`] and runs each operation on tokio's blocking
//! pool. Validation and building happen on that thread too; both are pure,
//! so a cancelled call can simply be issued again.

use serde_json::Value;

use super::errors::{CrudError, CrudResult};
use super::facade::CrudFacade;
use super::page::Page;
use crate::query::QueryParams;
use crate::store::DataStore;

/// Async handle over a [`CrudFacade`]
pub struct AsyncCrud<S: DataStore + 'static> {
    inner: CrudFacade<S>,
}

impl<S: DataStore + 'static> Clone for AsyncCrud<S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<S: DataStore + 'static> AsyncCrud<S> {
    pub fn new(inner: CrudFacade<S>) -> Self {
        Self { inner }
    }

    /// The wrapped blocking façade
    pub fn blocking(&self) -> &CrudFacade<S> {
        &self.inner
    }

    async fn run<T, F>(&self, op: F) -> CrudResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&CrudFacade<S>) -> CrudResult<T> + Send + 'static,
    {
        let facade = self.inner.clone();
        tokio::task::spawn_blocking(move || op(&facade))
            .await
            .map_err(|e| CrudError::Task(e.to_string()))?
    }

    pub async fn get(&self, id: &str, params: Option<QueryParams>) -> CrudResult<Value> {
        let id = id.to_string();
        self.run(move |facade| facade.get(&id, params.as_ref())).await
    }

    pub async fn list(&self, params: QueryParams) -> CrudResult<Vec<Value>> {
        self.run(move |facade| facade.list(&params)).await
    }

    pub async fn list_paginated(&self, params: QueryParams) -> CrudResult<Page<Value>> {
        self.run(move |facade| facade.list_paginated(&params)).await
    }

    pub async fn create(&self, record: Value) -> CrudResult<Value> {
        self.run(move |facade| facade.create(record)).await
    }

    pub async fn update(&self, id: &str, patch: Value) -> CrudResult<Value> {
        let id = id.to_string();
        self.run(move |facade| facade.update(&id, patch)).await
    }

    pub async fn delete(&self, id: &str) -> CrudResult<Value> {
        let id = id.to_string();
        self.run(move |facade| facade.delete(&id)).await
    }
}

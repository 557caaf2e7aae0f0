//! # CRUD Façade
//!
//! Generic get/list/paginate/create/update/delete over one entity, driven
//! by the query pipeline: parse (caller), validate, build, execute.

use std::sync::Arc;

use serde_json::Value;

use super::errors::{CrudError, CrudResult};
use super::page::Page;
use crate::allowed::QueryBuilderConfig;
use crate::builder::{PageWindow, QueryBuilder};
use crate::query::QueryParams;
use crate::store::{DataStore, EntityDescriptor, Predicate, SelectQuery, StoreError};
use crate::validator::{ValidatedPlan, Validator};

/// CRUD operations for one entity over a data store
pub struct CrudFacade<S: DataStore> {
    store: Arc<S>,
    entity: EntityDescriptor,
    config: Arc<QueryBuilderConfig>,
}

impl<S: DataStore> Clone for CrudFacade<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            entity: self.entity.clone(),
            config: Arc::clone(&self.config),
        }
    }
}

impl<S: DataStore> CrudFacade<S> {
    /// Façade over `entity`; every rule target must exist on it
    pub fn new(store: Arc<S>, entity: EntityDescriptor, config: Arc<QueryBuilderConfig>) -> CrudResult<Self> {
        config.check_targets(&entity, store.schema())?;
        Ok(Self {
            store,
            entity,
            config,
        })
    }

    /// Façade for an entity already registered in the store's schema
    pub fn for_entity(store: Arc<S>, entity: &str, config: Arc<QueryBuilderConfig>) -> CrudResult<Self> {
        let descriptor = store
            .schema()
            .get(entity)
            .cloned()
            .ok_or_else(|| StoreError::UnknownEntity(entity.to_string()))?;
        Self::new(store, descriptor, config)
    }

    pub fn entity(&self) -> &EntityDescriptor {
        &self.entity
    }

    pub fn config(&self) -> &QueryBuilderConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Validate a request against the entity's allow-lists
    pub fn plan(&self, params: &QueryParams) -> CrudResult<ValidatedPlan> {
        Ok(Validator::new(&self.config).validate(params)?)
    }

    /// Validate and build the bounded listing query
    pub fn build(&self, params: &QueryParams) -> CrudResult<SelectQuery> {
        let plan = self.plan(params)?;
        Ok(self.builder().apply_plan(&plan).finish())
    }

    /// One record by primary key; request filters are AND-ed with the id
    pub fn get(&self, id: &str, params: Option<&QueryParams>) -> CrudResult<Value> {
        let mut builder = self.builder();
        if let Some(params) = params {
            let plan = self.plan(params)?;
            builder = builder
                .apply_filters(&plan.filters)
                .apply_fields(&plan.fields)
                .apply_include(&plan.include);
        }
        let query = builder
            .finish()
            .filter(Predicate::eq(self.entity.primary_key.clone(), id))
            .limit(1);

        let mut rows = self.store.fetch(&query)?;
        tracing::debug!(entity = %self.entity.name, id, found = !rows.is_empty(), "get");
        if rows.is_empty() {
            return Err(CrudError::not_found(&self.entity.name, id));
        }
        Ok(rows.swap_remove(0))
    }

    /// Bounded listing; the default limit applies when no pagination was requested
    pub fn list(&self, params: &QueryParams) -> CrudResult<Vec<Value>> {
        let query = self.build(params)?;
        let rows = self.store.fetch(&query)?;
        tracing::debug!(
            entity = %self.entity.name,
            limit = ?query.limit,
            offset = ?query.offset,
            returned = rows.len(),
            "list"
        );
        Ok(rows)
    }

    /// Listing plus totals from a count over the same predicates
    pub fn list_paginated(&self, params: &QueryParams) -> CrudResult<Page<Value>> {
        let plan = self.plan(params)?;
        let (query, window) = self.builder().apply_plan(&plan).into_parts();
        let window = match window {
            Some(window) => window,
            None => PageWindow::resolve(&plan.pagination, self.config.limits()),
        };

        let total = self.store.count(&query.count_query())?;
        let items = self.store.fetch(&query)?;
        tracing::debug!(
            entity = %self.entity.name,
            page = window.page,
            per_page = window.per_page,
            total,
            "list_paginated"
        );
        Ok(Page::new(items, total, window))
    }

    /// Insert a record
    pub fn create(&self, record: Value) -> CrudResult<Value> {
        if !record.is_object() {
            return Err(CrudError::InvalidRecord("expected a JSON object".to_string()));
        }
        let created = self.store.insert(&self.entity.name, record)?;
        tracing::info!(entity = %self.entity.name, "created record");
        Ok(created)
    }

    /// Merge `patch` into an existing record
    pub fn update(&self, id: &str, patch: Value) -> CrudResult<Value> {
        if !patch.is_object() {
            return Err(CrudError::InvalidRecord("expected a JSON object".to_string()));
        }
        let updated = self
            .store
            .update(&self.entity.name, id, patch)?
            .ok_or_else(|| CrudError::not_found(&self.entity.name, id))?;
        tracing::info!(entity = %self.entity.name, id, "updated record");
        Ok(updated)
    }

    /// Remove a record, returning it
    pub fn delete(&self, id: &str) -> CrudResult<Value> {
        let removed = self
            .store
            .delete(&self.entity.name, id)?
            .ok_or_else(|| CrudError::not_found(&self.entity.name, id))?;
        tracing::info!(entity = %self.entity.name, id, "deleted record");
        Ok(removed)
    }

    fn builder(&self) -> QueryBuilder<'_> {
        QueryBuilder::new(&self.entity, self.config.limits()).with_schema(self.store.schema())
    }
}

//! # In-Memory Store
//!
//! A [`DataStore`] over JSON records held in memory. Used by the CLI, by
//! tests, and as the reference semantics for other stores.
//!
//! Fetch order: filter, sort, offset, limit, then project. Relations are
//! resolved from the unprojected row so projections may omit join keys.

mod filters;
mod loader;
mod sorter;

pub use filters::{like_match, PredicateFilter};
pub use sorter::RecordSorter;

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde_json::{Map, Value};
use uuid::Uuid;

use self::filters::scalar_text;
use self::loader::{IncludeTree, RelationLoader};
use super::entity::{EntityDescriptor, Schema};
use super::errors::{StoreError, StoreResult};
use super::select::SelectQuery;
use super::traits::DataStore;

/// In-memory JSON record store
pub struct MemoryStore {
    schema: Schema,
    tables: RwLock<HashMap<String, Vec<Value>>>,
}

impl MemoryStore {
    /// Create an empty store for the given schema
    pub fn new(schema: Schema) -> Self {
        let tables = schema
            .entities()
            .map(|e| (e.name.clone(), Vec::new()))
            .collect();
        Self {
            schema,
            tables: RwLock::new(tables),
        }
    }

    /// Insert many records, assigning identifiers where missing
    pub fn seed<I>(&self, entity: &str, records: I) -> StoreResult<usize>
    where
        I: IntoIterator<Item = Value>,
    {
        let mut inserted = 0;
        for record in records {
            self.insert(entity, record)?;
            inserted += 1;
        }
        tracing::debug!(entity, inserted, "seeded records");
        Ok(inserted)
    }

    /// Number of stored records for an entity
    pub fn len(&self, entity: &str) -> StoreResult<usize> {
        let tables = self.read()?;
        Ok(tables.get(entity).map_or(0, Vec::len))
    }

    fn descriptor(&self, entity: &str) -> StoreResult<&EntityDescriptor> {
        self.schema
            .get(entity)
            .ok_or_else(|| StoreError::UnknownEntity(entity.to_string()))
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, HashMap<String, Vec<Value>>>> {
        self.tables.read().map_err(|_| StoreError::LockPoisoned)
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, HashMap<String, Vec<Value>>>> {
        self.tables.write().map_err(|_| StoreError::LockPoisoned)
    }

    fn project(record: &Value, columns: &[String], descriptor: &EntityDescriptor) -> Value {
        let Value::Object(obj) = record else {
            return record.clone();
        };
        let keep = |key: &str| {
            columns.iter().any(|c| c == key)
                || descriptor.required_columns().contains(&key)
        };
        let projected: Map<String, Value> = obj
            .iter()
            .filter(|(k, _)| keep(k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Value::Object(projected)
    }

    fn position(rows: &[Value], primary_key: &str, id: &str) -> Option<usize> {
        rows.iter().position(|row| {
            row.get(primary_key)
                .and_then(scalar_text)
                .is_some_and(|key| key == id)
        })
    }
}

impl DataStore for MemoryStore {
    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn fetch(&self, query: &SelectQuery) -> StoreResult<Vec<Value>> {
        let descriptor = self.descriptor(&query.entity)?;
        let tables = self.read()?;
        let rows = tables.get(&query.entity).map(Vec::as_slice).unwrap_or(&[]);

        let mut matched: Vec<Value> = rows
            .iter()
            .filter(|row| PredicateFilter::matches(row, &query.predicates))
            .cloned()
            .collect();
        RecordSorter::sort(&mut matched, &query.order);

        let offset = query.offset.unwrap_or(0) as usize;
        let limit = query.limit.map_or(usize::MAX, |l| l as usize);
        let window = matched.into_iter().skip(offset).take(limit);

        let tree = IncludeTree::from_paths(&query.eager);
        let loader = RelationLoader {
            schema: &self.schema,
            tables: &tables,
        };

        let records: Vec<Value> = window
            .map(|row| {
                let mut record = match &query.projection {
                    Some(columns) => Self::project(&row, columns, descriptor),
                    None => row.clone(),
                };
                if !tree.is_empty() {
                    let related = loader.load(descriptor, &row, &tree);
                    if let Value::Object(obj) = &mut record {
                        obj.extend(related);
                    }
                }
                record
            })
            .collect();

        tracing::debug!(
            entity = %query.entity,
            returned = records.len(),
            "fetched records"
        );
        Ok(records)
    }

    fn count(&self, query: &SelectQuery) -> StoreResult<u64> {
        self.descriptor(&query.entity)?;
        let tables = self.read()?;
        let count = tables
            .get(&query.entity)
            .map_or(0, |rows| {
                rows.iter()
                    .filter(|row| PredicateFilter::matches(row, &query.predicates))
                    .count()
            });
        Ok(count as u64)
    }

    fn insert(&self, entity: &str, record: Value) -> StoreResult<Value> {
        let descriptor = self.descriptor(entity)?;
        let Value::Object(mut obj) = record else {
            return Err(StoreError::NotAnObject(entity.to_string()));
        };

        let pk = &descriptor.primary_key;
        let id = match obj.get(pk).and_then(scalar_text) {
            Some(id) => id,
            None => {
                let id = Uuid::new_v4().to_string();
                obj.insert(pk.clone(), Value::String(id.clone()));
                id
            }
        };

        let mut tables = self.write()?;
        let rows = tables.entry(entity.to_string()).or_default();
        if Self::position(rows, pk, &id).is_some() {
            return Err(StoreError::DuplicateKey {
                entity: entity.to_string(),
                id,
            });
        }

        let record = Value::Object(obj);
        rows.push(record.clone());
        tracing::debug!(entity, id = %id, "inserted record");
        Ok(record)
    }

    fn update(&self, entity: &str, id: &str, patch: Value) -> StoreResult<Option<Value>> {
        let descriptor = self.descriptor(entity)?;
        let Value::Object(patch) = patch else {
            return Err(StoreError::NotAnObject(entity.to_string()));
        };

        let mut tables = self.write()?;
        let Some(rows) = tables.get_mut(entity) else {
            return Ok(None);
        };
        let Some(index) = Self::position(rows, &descriptor.primary_key, id) else {
            return Ok(None);
        };

        if let Value::Object(existing) = &mut rows[index] {
            for (key, value) in patch {
                // the identifier is immutable
                if key != descriptor.primary_key {
                    existing.insert(key, value);
                }
            }
        }
        tracing::debug!(entity, id, "updated record");
        Ok(Some(rows[index].clone()))
    }

    fn delete(&self, entity: &str, id: &str) -> StoreResult<Option<Value>> {
        let descriptor = self.descriptor(entity)?;
        let mut tables = self.write()?;
        let Some(rows) = tables.get_mut(entity) else {
            return Ok(None);
        };
        let removed = Self::position(rows, &descriptor.primary_key, id).map(|i| rows.remove(i));
        if removed.is_some() {
            tracing::debug!(entity, id, "deleted record");
        }
        Ok(removed)
    }
}

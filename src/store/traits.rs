//! Data store abstraction

use serde_json::Value;

use super::entity::Schema;
use super::errors::StoreResult;
use super::select::SelectQuery;

/// Executes [`SelectQuery`] values and single-record writes.
///
/// Records are JSON objects keyed by column name. Identifiers are passed
/// as strings; stores compare them against the primary key column in its
/// string form.
pub trait DataStore: Send + Sync {
    /// Entities this store knows about
    fn schema(&self) -> &Schema;

    /// Rows matching the query, ordered, bounded and projected, with
    /// eager-loaded relations attached under their relation names
    fn fetch(&self, query: &SelectQuery) -> StoreResult<Vec<Value>>;

    /// Number of rows matching the query's predicates
    fn count(&self, query: &SelectQuery) -> StoreResult<u64>;

    /// Insert a record, returning it as stored
    fn insert(&self, entity: &str, record: Value) -> StoreResult<Value>;

    /// Merge `patch` into the record with the given id
    fn update(&self, entity: &str, id: &str, patch: Value) -> StoreResult<Option<Value>>;

    /// Remove the record with the given id, returning it
    fn delete(&self, entity: &str, id: &str) -> StoreResult<Option<Value>>;
}

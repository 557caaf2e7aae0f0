//! # Store
//!
//! Entity descriptors, the executable [`SelectQuery`], and the
//! [`DataStore`] trait that runs it. [`MemoryStore`] is the bundled
//! implementation; `crate::sql` renders the same query as SQL text.

mod entity;
mod errors;
pub mod memory;
mod predicate;
mod select;
mod traits;

pub use entity::{EntityDescriptor, Relation, RelationKind, Schema};
pub use errors::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use predicate::{CompareOp, Predicate};
pub use select::{OrderKey, RelationPath, SelectQuery};
pub use traits::DataStore;

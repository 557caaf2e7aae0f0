//! Entity descriptors
//!
//! Describes an entity's queryable surface: its columns, its identifier
//! column and its relations. A [`Schema`] collects descriptors so nested
//! relation paths can be followed from one entity to the next.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// How a relation is joined
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RelationKind {
    /// This entity holds the key: `self.local_key = target.target_key`
    BelongsTo {
        local_key: String,
        #[serde(default = "default_key")]
        target_key: String,
    },
    /// The target holds the key: `target.foreign_key = self.local_key`
    HasMany {
        foreign_key: String,
        #[serde(default = "default_key")]
        local_key: String,
    },
}

fn default_key() -> String {
    "id".to_string()
}

/// A named relation to another entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    /// Relation name as used in `include`
    pub name: String,
    /// Target entity name
    pub target: String,
    #[serde(flatten)]
    pub kind: RelationKind,
}

impl Relation {
    /// `self.local_key` references `target.id`
    pub fn belongs_to(
        name: impl Into<String>,
        target: impl Into<String>,
        local_key: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            kind: RelationKind::BelongsTo {
                local_key: local_key.into(),
                target_key: default_key(),
            },
        }
    }

    /// `target.foreign_key` references `self.id`
    pub fn has_many(
        name: impl Into<String>,
        target: impl Into<String>,
        foreign_key: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            kind: RelationKind::HasMany {
                foreign_key: foreign_key.into(),
                local_key: default_key(),
            },
        }
    }

    /// Returns true if the relation yields at most one record
    pub fn is_single(&self) -> bool {
        matches!(self.kind, RelationKind::BelongsTo { .. })
    }
}

/// Queryable surface of one entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityDescriptor {
    /// Entity (table/collection) name
    pub name: String,

    /// Identifier column, always projected
    #[serde(default = "default_key")]
    pub primary_key: String,

    /// Column names
    pub columns: Vec<String>,

    /// Relations, by name
    #[serde(default)]
    pub relations: Vec<Relation>,
}

impl EntityDescriptor {
    /// Create a descriptor with an `id` primary key and no columns yet
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            primary_key: default_key(),
            columns: vec![default_key()],
            relations: Vec::new(),
        }
    }

    /// Sets the primary key column
    pub fn with_primary_key(mut self, column: impl Into<String>) -> Self {
        let column = column.into();
        if !self.columns.contains(&column) {
            self.columns.push(column.clone());
        }
        self.primary_key = column;
        self
    }

    /// Adds columns
    pub fn with_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for column in columns {
            let column = column.into();
            if !self.columns.contains(&column) {
                self.columns.push(column);
            }
        }
        self
    }

    /// Adds a relation
    pub fn with_relation(mut self, relation: Relation) -> Self {
        self.relations.push(relation);
        self
    }

    /// Returns true if the column exists
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// Look up a relation by name
    pub fn relation(&self, name: &str) -> Option<&Relation> {
        self.relations.iter().find(|r| r.name == name)
    }

    /// Columns every projection must keep
    pub fn required_columns(&self) -> Vec<&str> {
        vec![self.primary_key.as_str()]
    }
}

/// Registry of entity descriptors
#[derive(Debug, Clone, Default)]
pub struct Schema {
    entities: HashMap<String, EntityDescriptor>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor, replacing any previous one with the same name
    pub fn register(&mut self, entity: EntityDescriptor) {
        self.entities.insert(entity.name.clone(), entity);
    }

    /// Builder-style register
    pub fn with_entity(mut self, entity: EntityDescriptor) -> Self {
        self.register(entity);
        self
    }

    pub fn get(&self, name: &str) -> Option<&EntityDescriptor> {
        self.entities.get(name)
    }

    /// Registered descriptors, in no particular order
    pub fn entities(&self) -> impl Iterator<Item = &EntityDescriptor> {
        self.entities.values()
    }

    /// Follow a dotted relation path from `root`, returning every hop.
    ///
    /// Returns `None` if any segment does not name a relation.
    pub fn resolve_path<'a>(
        &'a self,
        root: &'a EntityDescriptor,
        segments: &[String],
    ) -> Option<Vec<&'a Relation>> {
        let mut current = root;
        let mut hops = Vec::with_capacity(segments.len());
        for (i, segment) in segments.iter().enumerate() {
            let relation = current.relation(segment)?;
            hops.push(relation);
            if i + 1 < segments.len() {
                current = self.get(&relation.target)?;
            }
        }
        Some(hops)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> Schema {
        Schema::new()
            .with_entity(
                EntityDescriptor::new("categories")
                    .with_columns(["name", "description"])
                    .with_relation(Relation::has_many("articles", "articles", "category_id")),
            )
            .with_entity(
                EntityDescriptor::new("articles")
                    .with_columns(["title", "category_id"])
                    .with_relation(Relation::belongs_to("category", "categories", "category_id")),
            )
    }

    #[test]
    fn test_descriptor_builder() {
        let entity = EntityDescriptor::new("tags")
            .with_primary_key("uuid")
            .with_columns(["name", "name"]);
        assert_eq!(entity.primary_key, "uuid");
        assert_eq!(entity.columns, vec!["id", "uuid", "name"]);
        assert!(entity.has_column("name"));
        assert_eq!(entity.required_columns(), vec!["uuid"]);
    }

    #[test]
    fn test_resolve_nested_path() {
        let schema = schema();
        let root = schema.get("categories").unwrap();
        let path = vec!["articles".to_string(), "category".to_string()];

        let hops = schema.resolve_path(root, &path).unwrap();
        assert_eq!(hops.len(), 2);
        assert_eq!(hops[0].target, "articles");
        assert!(hops[1].is_single());

        let bad = vec!["articles".to_string(), "tags".to_string()];
        assert!(schema.resolve_path(root, &bad).is_none());
    }

    #[test]
    fn test_relation_deserialize() {
        let relation: Relation = serde_json::from_value(serde_json::json!({
            "name": "category",
            "target": "categories",
            "kind": "belongs_to",
            "local_key": "category_id"
        }))
        .unwrap();
        assert_eq!(relation, Relation::belongs_to("category", "categories", "category_id"));
    }
}

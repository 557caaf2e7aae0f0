//! Eager relation loading
//!
//! Include paths are merged into a tree so a relation shared by several
//! paths (`articles`, `articles.tags`) is loaded once per record.

use std::collections::{BTreeMap, HashMap};

use serde_json::{Map, Value};

use super::filters::scalar_text;
use crate::store::entity::{EntityDescriptor, RelationKind, Schema};
use crate::store::select::RelationPath;

/// Relation names to load at one level, with what to load beneath each
#[derive(Debug, Default)]
pub(super) struct IncludeTree {
    children: BTreeMap<String, IncludeTree>,
}

impl IncludeTree {
    pub(super) fn from_paths(paths: &[RelationPath]) -> Self {
        let mut root = IncludeTree::default();
        for path in paths {
            let mut node = &mut root;
            for segment in path.segments() {
                node = node.children.entry(segment.clone()).or_default();
            }
        }
        root
    }

    pub(super) fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

/// Resolves relations against the store's tables
pub(super) struct RelationLoader<'a> {
    pub(super) schema: &'a Schema,
    pub(super) tables: &'a HashMap<String, Vec<Value>>,
}

impl RelationLoader<'_> {
    /// Related values for `record`, keyed by relation name.
    ///
    /// Belongs-to relations load an object or `null`; has-many relations
    /// load an array.
    pub(super) fn load(
        &self,
        entity: &EntityDescriptor,
        record: &Value,
        tree: &IncludeTree,
    ) -> Map<String, Value> {
        let mut loaded = Map::new();
        for (name, subtree) in &tree.children {
            let Some(relation) = entity.relation(name) else {
                tracing::warn!(entity = %entity.name, relation = %name, "skipping unknown relation");
                continue;
            };
            let Some(target) = self.schema.get(&relation.target) else {
                tracing::warn!(relation = %name, target = %relation.target, "relation target not registered");
                continue;
            };
            let rows = self
                .tables
                .get(&relation.target)
                .map(Vec::as_slice)
                .unwrap_or(&[]);

            let value = match &relation.kind {
                RelationKind::BelongsTo {
                    local_key,
                    target_key,
                } => record
                    .get(local_key)
                    .and_then(|key| rows.iter().find(|row| field_matches(row, target_key, key)))
                    .map(|row| self.expand(target, row, subtree))
                    .unwrap_or(Value::Null),
                RelationKind::HasMany {
                    foreign_key,
                    local_key,
                } => {
                    let related = match record.get(local_key) {
                        Some(key) => rows
                            .iter()
                            .filter(|row| field_matches(row, foreign_key, key))
                            .map(|row| self.expand(target, row, subtree))
                            .collect(),
                        None => Vec::new(),
                    };
                    Value::Array(related)
                }
            };
            loaded.insert(name.clone(), value);
        }
        loaded
    }

    fn expand(&self, entity: &EntityDescriptor, row: &Value, tree: &IncludeTree) -> Value {
        let mut expanded = row.clone();
        if !tree.is_empty() {
            let nested = self.load(entity, row, tree);
            if let Value::Object(obj) = &mut expanded {
                obj.extend(nested);
            }
        }
        expanded
    }
}

/// Key equality that tolerates `1` vs `"1"`
pub(super) fn keys_match(a: &Value, b: &Value) -> bool {
    if a.is_null() || b.is_null() {
        return false;
    }
    if a == b {
        return true;
    }
    match (scalar_text(a), scalar_text(b)) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}

fn field_matches(row: &Value, field: &str, key: &Value) -> bool {
    row.get(field).is_some_and(|v| keys_match(v, key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::entity::Relation;
    use serde_json::json;

    #[test]
    fn test_include_tree_merges_prefixes() {
        let tree = IncludeTree::from_paths(&[
            RelationPath::parse("articles"),
            RelationPath::parse("articles.tags"),
            RelationPath::parse("owner"),
        ]);
        assert_eq!(tree.children.len(), 2);
        assert_eq!(tree.children["articles"].children.len(), 1);
        assert!(tree.children["owner"].is_empty());
    }

    #[test]
    fn test_keys_match() {
        assert!(keys_match(&json!(1), &json!("1")));
        assert!(keys_match(&json!("a"), &json!("a")));
        assert!(!keys_match(&json!(null), &json!(null)));
        assert!(!keys_match(&json!(1), &json!(2)));
    }

    #[test]
    fn test_load_both_directions() {
        let schema = Schema::new()
            .with_entity(
                EntityDescriptor::new("categories")
                    .with_columns(["name"])
                    .with_relation(Relation::has_many("articles", "articles", "category_id")),
            )
            .with_entity(
                EntityDescriptor::new("articles")
                    .with_columns(["title", "category_id"])
                    .with_relation(Relation::belongs_to("category", "categories", "category_id")),
            );
        let mut tables = HashMap::new();
        tables.insert("categories".to_string(), vec![json!({"id": 1, "name": "Tech"})]);
        tables.insert(
            "articles".to_string(),
            vec![
                json!({"id": 10, "title": "A", "category_id": 1}),
                json!({"id": 11, "title": "B", "category_id": 2}),
            ],
        );
        let loader = RelationLoader {
            schema: &schema,
            tables: &tables,
        };

        let categories = schema.get("categories").unwrap();
        let tree = IncludeTree::from_paths(&[RelationPath::parse("articles.category")]);
        let loaded = loader.load(categories, &tables["categories"][0], &tree);
        let articles = loaded["articles"].as_array().unwrap();
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0]["category"]["name"], "Tech");

        let articles_entity = schema.get("articles").unwrap();
        let tree = IncludeTree::from_paths(&[RelationPath::parse("category")]);
        let orphan = loader.load(articles_entity, &tables["articles"][1], &tree);
        assert_eq!(orphan["category"], Value::Null);
    }
}

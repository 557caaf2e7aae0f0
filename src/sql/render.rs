//! SQL rendering of executable queries
//!
//! Identifiers are quoted and every value is bound as a parameter, so
//! rendered text never contains client input. Eager loads are not part of
//! the statement; they are resolved by follow-up queries per relation.

use serde::Serialize;

use super::SqlDialect;
use crate::query::SortDirection;
use crate::store::{Predicate, SelectQuery};

/// SQL text plus its positional parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedSql {
    pub sql: String,
    pub params: Vec<String>,
}

struct Renderer<'a> {
    dialect: &'a dyn SqlDialect,
    params: Vec<String>,
}

impl<'a> Renderer<'a> {
    fn new(dialect: &'a dyn SqlDialect) -> Self {
        Self {
            dialect,
            params: Vec::new(),
        }
    }

    fn bind(&mut self, value: &str) -> String {
        self.params.push(value.to_string());
        self.dialect.placeholder(self.params.len())
    }

    fn ident(&self, name: &str) -> String {
        self.dialect.quote_ident(name)
    }

    fn predicate(&mut self, predicate: &Predicate) -> String {
        match predicate {
            Predicate::Compare { field, op, value } => {
                let col = self.ident(field);
                let ph = self.bind(value);
                format!("{} {} {}", col, op.as_sql(), ph)
            }
            Predicate::Like {
                field,
                pattern,
                case_sensitive,
            } => {
                let col = self.ident(field);
                let ph = self.bind(pattern);
                if *case_sensitive {
                    self.dialect.like(&col, &ph)
                } else {
                    self.dialect.ilike(&col, &ph)
                }
            }
            Predicate::In { field, values } => {
                if values.is_empty() {
                    return "1 = 0".to_string();
                }
                let col = self.ident(field);
                let placeholders: Vec<String> = values.iter().map(|v| self.bind(v)).collect();
                format!("{} IN ({})", col, placeholders.join(", "))
            }
            Predicate::IsNull { field, negated } => {
                let not = if *negated { "NOT " } else { "" };
                format!("{} IS {}NULL", self.ident(field), not)
            }
            Predicate::Any { predicates } => {
                if predicates.is_empty() {
                    return "1 = 0".to_string();
                }
                let parts: Vec<String> = predicates.iter().map(|p| self.predicate(p)).collect();
                format!("({})", parts.join(" OR "))
            }
        }
    }

    fn where_clause(&mut self, predicates: &[Predicate]) -> Option<String> {
        if predicates.is_empty() {
            return None;
        }
        let parts: Vec<String> = predicates.iter().map(|p| self.predicate(p)).collect();
        Some(format!("WHERE {}", parts.join(" AND ")))
    }

    fn finish(self, clauses: Vec<String>) -> RenderedSql {
        RenderedSql {
            sql: clauses.join(" "),
            params: self.params,
        }
    }
}

/// Render the full select: projection, filters, ordering and bounds
pub fn render_select(query: &SelectQuery, dialect: &dyn SqlDialect) -> RenderedSql {
    let mut renderer = Renderer::new(dialect);

    let columns = match &query.projection {
        Some(columns) if !columns.is_empty() => columns
            .iter()
            .map(|c| renderer.ident(c))
            .collect::<Vec<_>>()
            .join(", "),
        _ => "*".to_string(),
    };

    let mut clauses = vec![format!(
        "SELECT {} FROM {}",
        columns,
        renderer.ident(&query.entity)
    )];
    clauses.extend(renderer.where_clause(&query.predicates));

    if !query.order.is_empty() {
        let keys: Vec<String> = query
            .order
            .iter()
            .map(|key| {
                dialect.order_key(
                    &renderer.ident(&key.field),
                    key.direction == SortDirection::Desc,
                )
            })
            .collect();
        clauses.push(format!("ORDER BY {}", keys.join(", ")));
    }

    clauses.extend(dialect.limit_offset(query.limit, query.offset));
    renderer.finish(clauses)
}

/// Render `COUNT(*)` over the same predicates
pub fn render_count(query: &SelectQuery, dialect: &dyn SqlDialect) -> RenderedSql {
    let count = query.count_query();
    let mut renderer = Renderer::new(dialect);
    let mut clauses = vec![format!(
        "SELECT COUNT(*) FROM {}",
        renderer.ident(&count.entity)
    )];
    clauses.extend(renderer.where_clause(&count.predicates));
    renderer.finish(clauses)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::{PostgresDialect, SqliteDialect};
    use crate::store::{OrderKey, RelationPath};

    fn query() -> SelectQuery {
        SelectQuery::new("categories")
            .filter(Predicate::eq("name", "Tech"))
            .filter(Predicate::ilike("description", "%web%"))
            .filter(Predicate::in_list("id", ["1", "2", "3"]))
            .order_by(OrderKey::desc("created_at"))
            .order_by(OrderKey::asc("id"))
            .select(vec!["id".into(), "name".into()])
            .with(RelationPath::parse("articles"))
            .limit(2)
            .offset(0)
    }

    #[test]
    fn test_postgres_select() {
        let rendered = render_select(&query(), &PostgresDialect);
        assert_eq!(
            rendered.sql,
            "SELECT \"id\", \"name\" FROM \"categories\" \
             WHERE \"name\" = $1 AND \"description\" ILIKE $2 AND \"id\" IN ($3, $4, $5) \
             ORDER BY \"created_at\" DESC NULLS LAST, \"id\" ASC NULLS FIRST \
             LIMIT 2 OFFSET 0"
        );
        assert_eq!(rendered.params, vec!["Tech", "%web%", "1", "2", "3"]);
    }

    #[test]
    fn test_sqlite_count_ignores_shaping() {
        let rendered = render_count(&query(), &SqliteDialect);
        assert_eq!(
            rendered.sql,
            "SELECT COUNT(*) FROM \"categories\" \
             WHERE \"name\" = ? AND LOWER(\"description\") LIKE LOWER(?) ESCAPE '\\' AND \"id\" IN (?, ?, ?)"
        );
        assert_eq!(rendered.params.len(), 5);
    }

    #[test]
    fn test_unfiltered_select() {
        let rendered = render_select(&SelectQuery::new("tags"), &SqliteDialect);
        assert_eq!(rendered.sql, "SELECT * FROM \"tags\"");
        assert!(rendered.params.is_empty());
    }

    #[test]
    fn test_disjunction_and_empty_lists() {
        let query = SelectQuery::new("tags")
            .filter(Predicate::any(vec![
                Predicate::like("label", "r%"),
                Predicate::is_null("label"),
            ]))
            .filter(Predicate::in_list("id", Vec::<String>::new()));
        let rendered = render_select(&query, &PostgresDialect);
        assert_eq!(
            rendered.sql,
            "SELECT * FROM \"tags\" WHERE (\"label\" LIKE $1 OR \"label\" IS NULL) AND 1 = 0"
        );
    }

    #[test]
    fn test_injection_stays_in_params() {
        let query = SelectQuery::new("tags").filter(Predicate::eq("label", "x'; DROP TABLE tags; --"));
        let rendered = render_select(&query, &SqliteDialect);
        assert!(!rendered.sql.contains("DROP"));
        assert_eq!(rendered.params[0], "x'; DROP TABLE tags; --");
    }
}

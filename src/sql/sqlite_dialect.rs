//! SQLite SQL dialect implementation

use super::SqlDialect;

/// SQLite SQL dialect
pub struct SqliteDialect;

impl SqlDialect for SqliteDialect {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn placeholder(&self, _index: usize) -> String {
        "?".to_string()
    }

    fn like(&self, col: &str, placeholder: &str) -> String {
        // ASCII case-insensitive unless PRAGMA case_sensitive_like is on
        format!("{} LIKE {} ESCAPE '\\'", col, placeholder)
    }

    fn ilike(&self, col: &str, placeholder: &str) -> String {
        format!("LOWER({}) LIKE LOWER({}) ESCAPE '\\'", col, placeholder)
    }

    fn order_key(&self, col: &str, desc: bool) -> String {
        // SQLite already sorts NULL lowest
        if desc {
            format!("{} DESC", col)
        } else {
            format!("{} ASC", col)
        }
    }

    fn limit_offset(&self, limit: Option<u64>, offset: Option<u64>) -> Option<String> {
        match (limit, offset) {
            (None, Some(offset)) => Some(format!("LIMIT -1 OFFSET {}", offset)),
            (Some(limit), Some(offset)) => Some(format!("LIMIT {} OFFSET {}", limit, offset)),
            (Some(limit), None) => Some(format!("LIMIT {}", limit)),
            (None, None) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder() {
        let dialect = SqliteDialect;
        assert_eq!(dialect.placeholder(1), "?");
        assert_eq!(dialect.placeholder(5), "?");
    }

    #[test]
    fn test_offset_without_limit() {
        assert_eq!(
            SqliteDialect.limit_offset(None, Some(20)).as_deref(),
            Some("LIMIT -1 OFFSET 20")
        );
    }

    #[test]
    fn test_ilike() {
        assert_eq!(
            SqliteDialect.ilike("\"name\"", "?"),
            "LOWER(\"name\") LIKE LOWER(?) ESCAPE '\\'"
        );
    }
}

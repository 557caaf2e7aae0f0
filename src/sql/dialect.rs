//! SQL dialect trait
//!
//! Backend-specific syntax used when rendering a `SelectQuery`.

/// SQL dialect trait for generating database-specific SQL
pub trait SqlDialect: Send + Sync {
    /// Get the dialect name
    fn name(&self) -> &'static str;

    /// Generate a parameter placeholder for the given index (1-based)
    ///
    /// - SQLite: Always returns "?"
    /// - PostgreSQL: Returns "$1", "$2", etc.
    fn placeholder(&self, index: usize) -> String;

    /// Quote an identifier, doubling embedded quotes
    fn quote_ident(&self, ident: &str) -> String {
        format!("\"{}\"", ident.replace('"', "\"\""))
    }

    /// Case-sensitive pattern match with `\` as the escape character
    fn like(&self, col: &str, placeholder: &str) -> String;

    /// Case-insensitive pattern match with `\` as the escape character
    fn ilike(&self, col: &str, placeholder: &str) -> String;

    /// Generate one ordering key so NULLs sort first ascending and last
    /// descending
    fn order_key(&self, col: &str, desc: bool) -> String;

    /// Generate the LIMIT/OFFSET clause, if any
    fn limit_offset(&self, limit: Option<u64>, offset: Option<u64>) -> Option<String> {
        match (limit, offset) {
            (Some(limit), Some(offset)) => Some(format!("LIMIT {} OFFSET {}", limit, offset)),
            (Some(limit), None) => Some(format!("LIMIT {}", limit)),
            (None, Some(offset)) => Some(format!("OFFSET {}", offset)),
            (None, None) => None,
        }
    }
}

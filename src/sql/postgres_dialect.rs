//! PostgreSQL SQL dialect implementation

use super::SqlDialect;

/// PostgreSQL SQL dialect
pub struct PostgresDialect;

impl SqlDialect for PostgresDialect {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn placeholder(&self, index: usize) -> String {
        format!("${}", index)
    }

    fn like(&self, col: &str, placeholder: &str) -> String {
        format!("{} LIKE {}", col, placeholder)
    }

    fn ilike(&self, col: &str, placeholder: &str) -> String {
        format!("{} ILIKE {}", col, placeholder)
    }

    fn order_key(&self, col: &str, desc: bool) -> String {
        if desc {
            format!("{} DESC NULLS LAST", col)
        } else {
            format!("{} ASC NULLS FIRST", col)
        }
    }
}

//! Predicate expressions
//!
//! Store-agnostic boolean conditions over a single entity's columns.
//! Values are kept as the strings the client sent; each store coerces them
//! against its own column types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
}

impl CompareOp {
    /// SQL operator text
    pub fn as_sql(&self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "<>",
            CompareOp::Lt => "<",
            CompareOp::Lte => "<=",
            CompareOp::Gt => ">",
            CompareOp::Gte => ">=",
        }
    }
}

/// A condition on one entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Predicate {
    /// `field <op> value`
    Compare {
        field: String,
        op: CompareOp,
        value: String,
    },
    /// `field LIKE pattern` (`%` and `_` wildcards, `\` escapes)
    Like {
        field: String,
        pattern: String,
        case_sensitive: bool,
    },
    /// `field IN (values...)`
    In { field: String, values: Vec<String> },
    /// `field IS [NOT] NULL`
    IsNull { field: String, negated: bool },
    /// Disjunction of predicates
    Any { predicates: Vec<Predicate> },
}

impl Predicate {
    fn compare(field: impl Into<String>, op: CompareOp, value: impl Into<String>) -> Self {
        Predicate::Compare {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    pub fn eq(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::compare(field, CompareOp::Eq, value)
    }

    pub fn ne(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::compare(field, CompareOp::Ne, value)
    }

    pub fn lt(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::compare(field, CompareOp::Lt, value)
    }

    pub fn lte(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::compare(field, CompareOp::Lte, value)
    }

    pub fn gt(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::compare(field, CompareOp::Gt, value)
    }

    pub fn gte(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::compare(field, CompareOp::Gte, value)
    }

    /// Case-sensitive pattern match
    pub fn like(field: impl Into<String>, pattern: impl Into<String>) -> Self {
        Predicate::Like {
            field: field.into(),
            pattern: pattern.into(),
            case_sensitive: true,
        }
    }

    /// Case-insensitive pattern match
    pub fn ilike(field: impl Into<String>, pattern: impl Into<String>) -> Self {
        Predicate::Like {
            field: field.into(),
            pattern: pattern.into(),
            case_sensitive: false,
        }
    }

    /// Membership test
    pub fn in_list<I, S>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Predicate::In {
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_null(field: impl Into<String>) -> Self {
        Predicate::IsNull {
            field: field.into(),
            negated: false,
        }
    }

    pub fn not_null(field: impl Into<String>) -> Self {
        Predicate::IsNull {
            field: field.into(),
            negated: true,
        }
    }

    /// Matches if any of the predicates matches
    pub fn any(predicates: Vec<Predicate>) -> Self {
        Predicate::Any { predicates }
    }

    /// Every column this predicate reads
    pub fn fields(&self) -> Vec<&str> {
        match self {
            Predicate::Compare { field, .. }
            | Predicate::Like { field, .. }
            | Predicate::In { field, .. }
            | Predicate::IsNull { field, .. } => vec![field.as_str()],
            Predicate::Any { predicates } => predicates.iter().flat_map(|p| p.fields()).collect(),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Compare { field, op, value } => {
                write!(f, "{} {} {:?}", field, op.as_sql(), value)
            }
            Predicate::Like {
                field,
                pattern,
                case_sensitive,
            } => {
                let op = if *case_sensitive { "LIKE" } else { "ILIKE" };
                write!(f, "{} {} {:?}", field, op, pattern)
            }
            Predicate::In { field, values } => write!(f, "{} IN {:?}", field, values),
            Predicate::IsNull { field, negated } => {
                let not = if *negated { " NOT" } else { "" };
                write!(f, "{} IS{} NULL", field, not)
            }
            Predicate::Any { predicates } => {
                let parts: Vec<String> = predicates.iter().map(|p| p.to_string()).collect();
                write!(f, "({})", parts.join(" OR "))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fields() {
        let pred = Predicate::any(vec![
            Predicate::ilike("name", "%web%"),
            Predicate::ilike("description", "%web%"),
        ]);
        assert_eq!(pred.fields(), vec!["name", "description"]);
    }

    #[test]
    fn test_display() {
        assert_eq!(Predicate::gte("age", "18").to_string(), "age >= \"18\"");
        assert_eq!(
            Predicate::in_list("id", ["1", "2"]).to_string(),
            "id IN [\"1\", \"2\"]"
        );
        assert_eq!(Predicate::not_null("deleted_at").to_string(), "deleted_at IS NOT NULL");
    }

    #[test]
    fn test_serialize_tagged() {
        let json = serde_json::to_value(Predicate::eq("name", "Tech")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "compare", "field": "name", "op": "eq", "value": "Tech"})
        );
    }
}

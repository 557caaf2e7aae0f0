//! Predicate evaluation over JSON records
//!
//! Predicate values arrive as strings and are coerced to the type of the
//! stored value: numbers compare numerically, booleans accept
//! `true/false/1/0`, RFC 3339 timestamps compare as instants and any
//! other string compares lexically. Null or missing columns never satisfy
//! a comparison, matching SQL three-valued logic.

use std::cmp::Ordering;

use chrono::DateTime;
use serde_json::Value;

use crate::store::predicate::{CompareOp, Predicate};

/// Evaluates predicates against records
pub struct PredicateFilter;

impl PredicateFilter {
    /// Checks if a record matches all predicates
    pub fn matches(record: &Value, predicates: &[Predicate]) -> bool {
        predicates
            .iter()
            .all(|pred| Self::matches_predicate(record, pred))
    }

    fn matches_predicate(record: &Value, predicate: &Predicate) -> bool {
        match predicate {
            Predicate::IsNull { field, negated } => {
                let is_null = record.get(field).map_or(true, Value::is_null);
                is_null != *negated
            }
            Predicate::Any { predicates } => predicates
                .iter()
                .any(|pred| Self::matches_predicate(record, pred)),
            Predicate::Compare { field, op, value } => match Self::present(record, field) {
                Some(actual) => Self::compare_match(actual, *op, value),
                None => false,
            },
            Predicate::In { field, values } => match Self::present(record, field) {
                Some(actual) => values
                    .iter()
                    .any(|v| coerce_cmp(actual, v) == Some(Ordering::Equal)),
                None => false,
            },
            Predicate::Like {
                field,
                pattern,
                case_sensitive,
            } => match Self::present(record, field).and_then(scalar_text) {
                Some(text) => like_match(&text, pattern, *case_sensitive),
                None => false,
            },
        }
    }

    fn present<'a>(record: &'a Value, field: &str) -> Option<&'a Value> {
        record.get(field).filter(|v| !v.is_null())
    }

    fn compare_match(actual: &Value, op: CompareOp, expected: &str) -> bool {
        let Some(ordering) = coerce_cmp(actual, expected) else {
            return false;
        };
        match op {
            CompareOp::Eq => ordering == Ordering::Equal,
            CompareOp::Ne => ordering != Ordering::Equal,
            CompareOp::Lt => ordering == Ordering::Less,
            CompareOp::Lte => ordering != Ordering::Greater,
            CompareOp::Gt => ordering == Ordering::Greater,
            CompareOp::Gte => ordering != Ordering::Less,
        }
    }
}

/// Orders a stored value against a client-supplied string.
///
/// Returns `None` when the string cannot be read as the stored type.
pub(crate) fn coerce_cmp(actual: &Value, expected: &str) -> Option<Ordering> {
    match actual {
        Value::Number(n) => n.as_f64()?.partial_cmp(&expected.trim().parse::<f64>().ok()?),
        Value::Bool(a) => Some(a.cmp(&parse_bool(expected)?)),
        Value::String(s) => Some(text_cmp(s, expected)),
        _ => None,
    }
}

/// Orders two stored scalars of the same JSON type; `None` across types
pub(crate) fn scalar_cmp(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        (Value::String(x), Value::String(y)) => Some(text_cmp(x, y)),
        _ => None,
    }
}

/// RFC 3339 timestamps compare as instants, other text lexically
fn text_cmp(a: &str, b: &str) -> Ordering {
    match (DateTime::parse_from_rfc3339(a), DateTime::parse_from_rfc3339(b)) {
        (Ok(a), Ok(b)) => a.cmp(&b),
        _ => a.cmp(b),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

/// Text form of a scalar JSON value
pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

enum PatternToken {
    AnyRun,
    AnyOne,
    Literal(char),
}

fn tokenize(pattern: &str) -> Vec<PatternToken> {
    let mut tokens = Vec::new();
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        tokens.push(match c {
            '%' => PatternToken::AnyRun,
            '_' => PatternToken::AnyOne,
            '\\' => PatternToken::Literal(chars.next().unwrap_or('\\')),
            other => PatternToken::Literal(other),
        });
    }
    tokens
}

/// SQL `LIKE` matching: `%` is any run, `_` any single character, `\`
/// escapes the next character.
pub fn like_match(text: &str, pattern: &str, case_sensitive: bool) -> bool {
    let (text, pattern) = if case_sensitive {
        (text.to_string(), pattern.to_string())
    } else {
        (text.to_lowercase(), pattern.to_lowercase())
    };
    let chars: Vec<char> = text.chars().collect();
    let n = chars.len();

    // reachable[i]: the tokens consumed so far can match chars[..i]
    let mut reachable = vec![false; n + 1];
    reachable[0] = true;

    for token in tokenize(&pattern) {
        let mut next = vec![false; n + 1];
        match token {
            PatternToken::AnyRun => {
                let mut seen = false;
                for i in 0..=n {
                    seen |= reachable[i];
                    next[i] = seen;
                }
            }
            PatternToken::AnyOne => {
                for i in 0..n {
                    if reachable[i] {
                        next[i + 1] = true;
                    }
                }
            }
            PatternToken::Literal(c) => {
                for i in 0..n {
                    if reachable[i] && chars[i] == c {
                        next[i + 1] = true;
                    }
                }
            }
        }
        reachable = next;
    }

    reachable[n]
}

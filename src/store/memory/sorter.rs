//! Multi-key record sorting
//!
//! Sort is stable: records equal on every key keep their insertion order.
//! Timestamps order by instant, so mixed UTC offsets sort correctly.

use std::cmp::Ordering;

use serde_json::Value;

use super::filters::scalar_cmp;
use crate::query::SortDirection;
use crate::store::select::OrderKey;

/// Sorts records by ordering keys
pub struct RecordSorter;

impl RecordSorter {
    /// Sorts records by each key in turn; later keys break ties
    pub fn sort(records: &mut [Value], order: &[OrderKey]) {
        if order.is_empty() {
            return;
        }
        records.sort_by(|a, b| {
            for key in order {
                let ordering = Self::compare_values(a.get(&key.field), b.get(&key.field));
                let ordering = match key.direction {
                    SortDirection::Asc => ordering,
                    SortDirection::Desc => ordering.reverse(),
                };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            Ordering::Equal
        });
    }

    /// Missing sorts before null, then bool, number and string. Values of
    /// one type compare like filter operands do.
    fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
        type_rank(a).cmp(&type_rank(b)).then_with(|| match (a, b) {
            (Some(a), Some(b)) => scalar_cmp(a, b).unwrap_or(Ordering::Equal),
            _ => Ordering::Equal,
        })
    }
}

fn type_rank(value: Option<&Value>) -> u8 {
    match value {
        None => 0,
        Some(Value::Null) => 1,
        Some(Value::Bool(_)) => 2,
        Some(Value::Number(_)) => 3,
        Some(Value::String(_)) => 4,
        // arrays and objects are not ordered among themselves
        Some(Value::Array(_) | Value::Object(_)) => 5,
    }
}

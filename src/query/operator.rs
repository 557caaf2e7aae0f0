//! Filter operators
//!
//! The closed set of comparison operators a filter may request through
//! `filter[<field>][<op>]`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Filter operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OperatorKind {
    /// Equals
    #[serde(rename = "eq")]
    Equal,

    /// Not equals
    #[serde(rename = "ne")]
    NotEqual,

    /// Less than
    #[serde(rename = "lt")]
    LessThan,

    /// Less than or equal
    #[serde(rename = "lte")]
    LessOrEqual,

    /// Greater than
    #[serde(rename = "gt")]
    GreaterThan,

    /// Greater than or equal
    #[serde(rename = "gte")]
    GreaterOrEqual,

    /// Case-sensitive pattern match (LIKE)
    #[serde(rename = "like")]
    Like,

    /// Case-insensitive pattern match (ILIKE)
    #[serde(rename = "ilike")]
    ILike,

    /// Value in comma-separated list
    #[serde(rename = "in")]
    In,
}

impl OperatorKind {
    /// Every operator, in declaration order
    pub const ALL: [OperatorKind; 9] = [
        OperatorKind::Equal,
        OperatorKind::NotEqual,
        OperatorKind::LessThan,
        OperatorKind::LessOrEqual,
        OperatorKind::GreaterThan,
        OperatorKind::GreaterOrEqual,
        OperatorKind::Like,
        OperatorKind::ILike,
        OperatorKind::In,
    ];

    /// Get the operator code used in parameter keys
    pub fn code(&self) -> &'static str {
        match self {
            OperatorKind::Equal => "eq",
            OperatorKind::NotEqual => "ne",
            OperatorKind::LessThan => "lt",
            OperatorKind::LessOrEqual => "lte",
            OperatorKind::GreaterThan => "gt",
            OperatorKind::GreaterOrEqual => "gte",
            OperatorKind::Like => "like",
            OperatorKind::ILike => "ilike",
            OperatorKind::In => "in",
        }
    }

    /// Look up an operator by its code
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.code() == code)
    }

    /// Returns true if the operator takes a list value
    pub fn is_list(&self) -> bool {
        matches!(self, OperatorKind::In)
    }

    /// Returns true for `like` and `ilike`
    pub fn is_pattern(&self) -> bool {
        matches!(self, OperatorKind::Like | OperatorKind::ILike)
    }

    /// Returns true for the ordered comparisons (lt, lte, gt, gte)
    pub fn is_range(&self) -> bool {
        matches!(
            self,
            OperatorKind::LessThan
                | OperatorKind::LessOrEqual
                | OperatorKind::GreaterThan
                | OperatorKind::GreaterOrEqual
        )
    }
}

impl fmt::Display for OperatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

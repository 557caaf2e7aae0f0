//! Name-indexed rule collections
//!
//! One [`Registry`] per category. Each rule exposes exactly one public
//! name (its alias if set, its canonical name otherwise); lookups are
//! case-sensitive exact matches on that name.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use super::errors::{ConfigError, ConfigResult};

/// The four allow-list categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleCategory {
    Filter,
    Sort,
    Field,
    Include,
}

impl RuleCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleCategory::Filter => "filter",
            RuleCategory::Sort => "sort",
            RuleCategory::Field => "field",
            RuleCategory::Include => "include",
        }
    }
}

impl fmt::Display for RuleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An allow-list rule
pub trait Rule {
    /// The single name clients use
    fn public_name(&self) -> &str;

    /// Construction-time consistency check
    fn check(&self) -> ConfigResult<()> {
        Ok(())
    }
}

/// Rules of one category, indexed by public name
#[derive(Debug, Clone)]
pub struct Registry<R> {
    category: RuleCategory,
    rules: Vec<R>,
    index: HashMap<String, usize>,
}

impl<R: Rule> Registry<R> {
    /// Index the rules, failing on the first duplicate public name
    pub fn new(category: RuleCategory, rules: Vec<R>) -> ConfigResult<Self> {
        let mut index = HashMap::with_capacity(rules.len());
        for (i, rule) in rules.iter().enumerate() {
            rule.check()?;
            let name = rule.public_name().to_string();
            if index.insert(name.clone(), i).is_some() {
                return Err(ConfigError::DuplicatePublicName { category, name });
            }
        }
        Ok(Self {
            category,
            rules,
            index,
        })
    }

    /// An empty registry
    pub fn empty(category: RuleCategory) -> Self {
        Self {
            category,
            rules: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn category(&self) -> RuleCategory {
        self.category
    }

    /// Look up a rule by public name
    pub fn resolve(&self, name: &str) -> Option<&R> {
        self.index.get(name).map(|&i| &self.rules[i])
    }

    /// Returns true if the public name is registered
    pub fn is_allowed(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Public names in registration order
    pub fn names(&self) -> Vec<String> {
        self.rules
            .iter()
            .map(|r| r.public_name().to_string())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &R> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

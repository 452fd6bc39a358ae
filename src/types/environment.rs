//! Environment variables declared for functions.

use std::collections::BTreeMap;

use serde_json::{Map, Value, json};

use super::expr::Expr;

/// Variables handed to a function at its own runtime. Keys render sorted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Environment {
    variables: BTreeMap<String, Expr>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a variable, returning the updated value.
    ///
    /// A later value for the same key replaces the earlier one.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Expr>) -> Self {
        self.variables.insert(key.into(), value.into());
        self
    }

    /// A copy of this environment with `other`'s variables added on top.
    pub fn extended(&self, other: &Environment) -> Self {
        let mut variables = self.variables.clone();
        variables.extend(other.variables.clone());
        Environment { variables }
    }

    pub fn get(&self, key: &str) -> Option<&Expr> {
        self.variables.get(key)
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    pub(crate) fn render(&self) -> Value {
        let variables: Map<String, Value> = self
            .variables
            .iter()
            .map(|(k, v)| (k.clone(), v.render()))
            .collect();
        json!({ "Variables": variables })
    }

    pub(crate) fn expressions(&self) -> Vec<(String, Expr)> {
        self.variables
            .iter()
            .map(|(k, v)| (format!("Environment.{k}"), v.clone()))
            .collect()
    }
}

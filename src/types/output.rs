//! Stack outputs and their export keys.

use serde_json::{Map, Value, json};

use crate::config::StackName;

use super::expr::Expr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Output {
    name: String,
    value: Expr,
    export: Option<Expr>,
    description: Option<String>,
}

impl Output {
    pub fn new(name: impl Into<String>, value: Expr) -> Self {
        Output {
            name: name.into(),
            value,
            export: None,
            description: None,
        }
    }

    pub fn with_export(mut self, key: Expr) -> Self {
        self.export = Some(key);
        self
    }

    pub fn with_description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &Expr {
        &self.value
    }

    pub fn export_key(&self) -> Option<&Expr> {
        self.export.as_ref()
    }

    pub(crate) fn render(&self) -> Value {
        let mut body = Map::new();
        if let Some(description) = &self.description {
            body.insert("Description".into(), json!(description));
        }
        body.insert("Value".into(), self.value.render());
        if let Some(export) = &self.export {
            body.insert("Export".into(), json!({ "Name": export.render() }));
        }
        Value::Object(body)
    }

    pub(crate) fn expressions(&self) -> Vec<(String, Expr)> {
        let mut out = vec![("Value".to_string(), self.value.clone())];
        if let Some(export) = &self.export {
            out.push(("Export.Name".to_string(), export.clone()));
        }
        out
    }
}

/// Export key for `output_name`, prefixed with the stack's name.
pub fn stack_export_key(stack: &StackName, output_name: &str) -> Expr {
    match stack {
        StackName::Deployed => Expr::sub(format!("${{AWS::StackName}}-{output_name}")),
        StackName::Fixed(name) => Expr::literal(format!("{name}-{output_name}")),
    }
}

//! Access policies attached to functions.
//!
//! A function's policy list mixes managed policy identifiers with inline
//! statements. The list renders in declaration order; each inline statement
//! becomes its own single-statement policy document.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use strum_macros::{AsRefStr, Display, EnumString};

use super::expr::Expr;

pub const POLICY_LANGUAGE_VERSION: &str = "2012-10-17";

/// Managed policy granting network-interface access to functions in a VPC.
pub const VPC_ACCESS_EXECUTION_ROLE: &str =
    "arn:aws:iam::aws:policy/service-role/AWSLambdaVPCAccessExecutionRole";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString, AsRefStr)]
pub enum Effect {
    #[default]
    Allow,
    Deny,
}

/// An inline permission grant: effect, actions and the resources they apply to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyStatement {
    effect: Effect,
    actions: Vec<String>,
    resources: Vec<Expr>,
}

impl PolicyStatement {
    pub fn allow<A>(actions: A, resources: Vec<Expr>) -> Self
    where
        A: IntoIterator,
        A::Item: Into<String>,
    {
        PolicyStatement {
            effect: Effect::Allow,
            actions: actions.into_iter().map(Into::into).collect(),
            resources,
        }
    }

    pub fn deny<A>(actions: A, resources: Vec<Expr>) -> Self
    where
        A: IntoIterator,
        A::Item: Into<String>,
    {
        PolicyStatement {
            effect: Effect::Deny,
            ..PolicyStatement::allow(actions, resources)
        }
    }

    pub fn effect(&self) -> Effect {
        self.effect
    }

    pub fn actions(&self) -> &[String] {
        &self.actions
    }

    pub fn resources(&self) -> &[Expr] {
        &self.resources
    }

    fn render(&self) -> Value {
        let resources: Vec<Value> = self.resources.iter().map(Expr::render).collect();
        json!({
            "Version": POLICY_LANGUAGE_VERSION,
            "Statement": [{
                "Effect": self.effect.as_ref(),
                "Action": self.actions,
                "Resource": resources,
            }]
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyEntry {
    /// A platform-defined policy, referenced by identifier
    Managed(String),
    Statement(PolicyStatement),
}

impl PolicyEntry {
    pub fn managed(id: impl Into<String>) -> Self {
        PolicyEntry::Managed(id.into())
    }

    pub(crate) fn render(&self) -> Value {
        match self {
            PolicyEntry::Managed(id) => Value::String(id.clone()),
            PolicyEntry::Statement(statement) => statement.render(),
        }
    }

    pub(crate) fn expressions(&self) -> Vec<Expr> {
        match self {
            PolicyEntry::Managed(_) => Vec::new(),
            PolicyEntry::Statement(statement) => statement.resources.clone(),
        }
    }
}

impl From<&str> for PolicyEntry {
    fn from(id: &str) -> Self {
        PolicyEntry::managed(id)
    }
}

impl From<PolicyStatement> for PolicyEntry {
    fn from(statement: PolicyStatement) -> Self {
        PolicyEntry::Statement(statement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;

    #[test]
    fn test_managed_renders_bare_identifier() {
        let entry = PolicyEntry::managed(VPC_ACCESS_EXECUTION_ROLE);
        assert_eq!(entry.render(), Value::String(VPC_ACCESS_EXECUTION_ROLE.to_string()));
        assert!(entry.expressions().is_empty());
    }

    #[test]
    fn test_statement_renders_document() {
        let entry: PolicyEntry = PolicyStatement::allow(
            ["kms:Encrypt", "kms:Decrypt"],
            vec![Expr::sub("arn:aws:kms:${AWS::Region}:${AWS::AccountId}:key/${KmsCmkId}")],
        )
        .into();
        let rendered = serde_json::to_string(&entry.render()).unwrap();
        assert_snapshot!(
            rendered,
            @r#"{"Version":"2012-10-17","Statement":[{"Effect":"Allow","Action":["kms:Encrypt","kms:Decrypt"],"Resource":[{"Fn::Sub":"arn:aws:kms:${AWS::Region}:${AWS::AccountId}:key/${KmsCmkId}"}]}]}"#
        );
    }

    #[test]
    fn test_deny_statement() {
        let statement = PolicyStatement::deny(["s3:DeleteObject"], vec![Expr::literal("*")]);
        assert_eq!(statement.effect(), Effect::Deny);
        assert_eq!(statement.actions(), ["s3:DeleteObject".to_string()]);
        assert_eq!(statement.render()["Statement"][0]["Effect"], "Deny");
    }
}

//! Serverless function declarations.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::traits::TemplateResource;

use super::environment::Environment;
use super::expr::Expr;
use super::network::NetworkAccess;
use super::policy::PolicyEntry;
use super::resource::ResourceKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Options,
    Head,
    Any,
}

/// An HTTP route the platform wires to the function (`Type: Api`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApiTrigger {
    pub path: String,
    pub method: HttpMethod,
}

impl ApiTrigger {
    pub fn new(path: impl Into<String>, method: HttpMethod) -> Self {
        ApiTrigger {
            path: path.into(),
            method,
        }
    }

    fn render(&self) -> Value {
        json!({
            "Type": "Api",
            "Properties": { "Path": self.path, "Method": self.method.as_ref() }
        })
    }
}

/// A compute unit: runtime, code location, entry point and what it may touch.
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    runtime: String,
    code_uri: String,
    handler: String,
    network: Option<Arc<NetworkAccess>>,
    environment: Environment,
    policies: Vec<PolicyEntry>,
    triggers: BTreeMap<String, ApiTrigger>,
}

impl Function {
    pub fn new(
        runtime: impl Into<String>,
        code_uri: impl Into<String>,
        handler: impl Into<String>,
    ) -> Self {
        Function {
            runtime: runtime.into(),
            code_uri: code_uri.into(),
            handler: handler.into(),
            network: None,
            environment: Environment::default(),
            policies: Vec::new(),
            triggers: BTreeMap::new(),
        }
    }

    pub fn with_network_access(mut self, network: Arc<NetworkAccess>) -> Self {
        self.network = Some(network);
        self
    }

    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Append a policy. Policies keep the order they were added in.
    pub fn with_policy(mut self, policy: impl Into<PolicyEntry>) -> Self {
        self.policies.push(policy.into());
        self
    }

    pub fn with_api_trigger(mut self, name: impl Into<String>, trigger: ApiTrigger) -> Self {
        self.triggers.insert(name.into(), trigger);
        self
    }

    pub fn runtime(&self) -> &str {
        &self.runtime
    }

    pub fn handler(&self) -> &str {
        &self.handler
    }

    pub fn network_access(&self) -> Option<&Arc<NetworkAccess>> {
        self.network.as_ref()
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn policies(&self) -> &[PolicyEntry] {
        &self.policies
    }
}

impl TemplateResource for Function {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Function
    }

    fn properties(&self) -> Map<String, Value> {
        let mut props = Map::new();
        props.insert("Runtime".into(), json!(self.runtime));
        props.insert("CodeUri".into(), json!(self.code_uri));
        props.insert("Handler".into(), json!(self.handler));
        if !self.triggers.is_empty() {
            let events: Map<String, Value> = self
                .triggers
                .iter()
                .map(|(name, trigger)| (name.clone(), trigger.render()))
                .collect();
            props.insert("Events".into(), Value::Object(events));
        }
        if !self.policies.is_empty() {
            let policies: Vec<Value> = self.policies.iter().map(PolicyEntry::render).collect();
            props.insert("Policies".into(), Value::Array(policies));
        }
        if let Some(network) = &self.network {
            props.insert("VpcConfig".into(), network.render());
        }
        if !self.environment.is_empty() {
            props.insert("Environment".into(), self.environment.render());
        }
        props
    }

    fn expressions(&self) -> Vec<(String, Expr)> {
        let mut out = Vec::new();
        for (i, policy) in self.policies.iter().enumerate() {
            for expr in policy.expressions() {
                out.push((format!("Policies[{i}]"), expr));
            }
        }
        if let Some(network) = &self.network {
            out.extend(network.expressions());
        }
        out.extend(self.environment.expressions());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::policy::{PolicyStatement, VPC_ACCESS_EXECUTION_ROLE};
    use insta::assert_snapshot;
    use std::str::FromStr;

    fn graphql() -> Function {
        Function::new("nodejs8.10", "../.", "src/lambda/GraphQL.handler")
            .with_api_trigger("API", ApiTrigger::new("/graphql", HttpMethod::Post))
    }

    #[test]
    fn test_http_method_strings() {
        assert_eq!(HttpMethod::Post.as_ref(), "post");
        assert_eq!(HttpMethod::from_str("POST").unwrap(), HttpMethod::Post);
    }

    #[test]
    fn test_minimal_function_properties() {
        let rendered = serde_json::to_string(&graphql().render()).unwrap();
        assert_snapshot!(
            rendered,
            @r#"{"Type":"AWS::Serverless::Function","Properties":{"Runtime":"nodejs8.10","CodeUri":"../.","Handler":"src/lambda/GraphQL.handler","Events":{"API":{"Type":"Api","Properties":{"Path":"/graphql","Method":"post"}}}}}"#
        );
    }

    #[test]
    fn test_policies_keep_declaration_order() {
        let function = graphql()
            .with_policy(PolicyStatement::allow(["s3:GetObject"], vec![Expr::sub("${AccountMedia.Arn}/*")]))
            .with_policy(VPC_ACCESS_EXECUTION_ROLE);
        let props = function.properties();
        let policies = &props["Policies"];
        assert_eq!(policies[0]["Statement"][0]["Action"], json!(["s3:GetObject"]));
        assert_eq!(policies[1], json!(VPC_ACCESS_EXECUTION_ROLE));
    }

    #[test]
    fn test_shared_network_access_is_not_copied() {
        let network = Arc::new(NetworkAccess::default());
        let a = graphql().with_network_access(Arc::clone(&network));
        let b = graphql().with_network_access(Arc::clone(&network));
        assert!(Arc::ptr_eq(a.network_access().unwrap(), b.network_access().unwrap()));
        assert_eq!(Arc::strong_count(&network), 3);
    }

    #[test]
    fn test_expressions_are_labelled() {
        let function = graphql()
            .with_policy(VPC_ACCESS_EXECUTION_ROLE)
            .with_policy(PolicyStatement::allow(["s3:GetObject"], vec![Expr::sub("${AccountMedia.Arn}/*")]))
            .with_environment(Environment::new().with("NODE_ENV", Expr::parameter("NodeEnv")));
        let labels: Vec<String> = function.expressions().into_iter().map(|(l, _)| l).collect();
        assert_eq!(labels, vec!["Policies[1]", "Environment.NODE_ENV"]);
    }
}

//! Storage bucket and its cross-origin rules.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::traits::TemplateResource;

use super::resource::ResourceKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum CorsMethod {
    Get,
    Put,
    Post,
    Delete,
    Head,
}

/// One cross-origin rule.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CorsRule {
    pub allowed_headers: Vec<String>,
    pub allowed_methods: Vec<CorsMethod>,
    pub allowed_origins: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exposed_headers: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_age: Option<u32>,
}

impl CorsRule {
    pub fn new<H, O>(headers: H, methods: Vec<CorsMethod>, origins: O) -> Self
    where
        H: IntoIterator,
        H::Item: Into<String>,
        O: IntoIterator,
        O::Item: Into<String>,
    {
        CorsRule {
            allowed_headers: headers.into_iter().map(Into::into).collect(),
            allowed_methods: methods,
            allowed_origins: origins.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn with_exposed_header(mut self, header: impl Into<String>) -> Self {
        self.exposed_headers.push(header.into());
        self
    }

    pub fn with_max_age(mut self, seconds: u32) -> Self {
        self.max_age = Some(seconds);
        self
    }

    fn render(&self) -> Value {
        let mut rule = Map::new();
        rule.insert("AllowedHeaders".into(), json!(self.allowed_headers));
        let methods: Vec<&str> = self.allowed_methods.iter().map(|m| m.as_ref()).collect();
        rule.insert("AllowedMethods".into(), json!(methods));
        rule.insert("AllowedOrigins".into(), json!(self.allowed_origins));
        if !self.exposed_headers.is_empty() {
            rule.insert("ExposedHeaders".into(), json!(self.exposed_headers));
        }
        if let Some(max_age) = self.max_age {
            rule.insert("MaxAge".into(), json!(max_age));
        }
        Value::Object(rule)
    }
}

/// A storage bucket. Its name and address are generated at deploy time.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Bucket {
    cors: Vec<CorsRule>,
}

impl Bucket {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a cross-origin rule; rules render in the order they were added.
    pub fn with_cors_rule(mut self, rule: CorsRule) -> Self {
        self.cors.push(rule);
        self
    }

    pub fn cors_rules(&self) -> &[CorsRule] {
        &self.cors
    }
}

impl TemplateResource for Bucket {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Bucket
    }

    fn properties(&self) -> Map<String, Value> {
        let mut props = Map::new();
        if !self.cors.is_empty() {
            let rules: Vec<Value> = self.cors.iter().map(CorsRule::render).collect();
            props.insert("CorsConfiguration".into(), json!({ "CorsRules": rules }));
        }
        props
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;
    use std::str::FromStr;

    #[test]
    fn test_cors_method_strings() {
        assert_eq!(CorsMethod::Get.as_ref(), "GET");
        assert_eq!(CorsMethod::from_str("put").unwrap(), CorsMethod::Put);
        assert!(CorsMethod::from_str("PATCH").is_err());
    }

    #[test]
    fn test_bucket_without_cors_has_no_properties() {
        assert!(Bucket::new().properties().is_empty());
    }

    #[test]
    fn test_bucket_with_cors_renders_rules() {
        let bucket = Bucket::new().with_cors_rule(CorsRule::new(
            ["*"],
            vec![CorsMethod::Get, CorsMethod::Put, CorsMethod::Post],
            ["*"],
        ));
        let rendered = serde_json::to_string(&bucket.render()).unwrap();
        assert_snapshot!(
            rendered,
            @r#"{"Type":"AWS::S3::Bucket","Properties":{"CorsConfiguration":{"CorsRules":[{"AllowedHeaders":["*"],"AllowedMethods":["GET","PUT","POST"],"AllowedOrigins":["*"]}]}}}"#
        );
    }

    #[test]
    fn test_cors_optional_fields() {
        let rule = CorsRule::new(["Authorization"], vec![CorsMethod::Head], ["https://example.com"])
            .with_exposed_header("ETag")
            .with_max_age(3000);
        let rendered = rule.render();
        assert_eq!(rendered["ExposedHeaders"], serde_json::json!(["ETag"]));
        assert_eq!(rendered["MaxAge"], serde_json::json!(3000));
    }
}

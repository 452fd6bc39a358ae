//! Template parameters: inputs supplied at deploy time.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::error::TemplateError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr)]
#[strum(ascii_case_insensitive)]
pub enum ParameterType {
    String,
    Number,
    #[strum(serialize = "List<Number>")]
    NumberList,
    CommaDelimitedList,
    #[strum(serialize = "AWS::EC2::SecurityGroup::Id")]
    SecurityGroupId,
    #[strum(serialize = "AWS::EC2::Subnet::Id")]
    SubnetId,
    #[strum(serialize = "AWS::SSM::Parameter::Value<String>")]
    SsmString,
}

impl ParameterType {
    /// Parse a type tag, mapping unknown tags to `UnsupportedType`.
    pub fn parse(tag: &str) -> Result<Self, TemplateError> {
        ParameterType::from_str(tag.trim())
            .map_err(|_| TemplateError::UnsupportedType(tag.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    name: String,
    #[serde(rename = "type")]
    ty: ParameterType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    default: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default)]
    no_echo: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    allowed_values: Vec<String>,
}

impl Parameter {
    pub fn new(name: impl Into<String>, ty: ParameterType) -> Self {
        Parameter {
            name: name.into(),
            ty,
            default: None,
            description: None,
            no_echo: false,
            allowed_values: Vec::new(),
        }
    }

    pub fn string(name: impl Into<String>) -> Self {
        Parameter::new(name, ParameterType::String)
    }

    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn with_description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    pub fn with_allowed_value(mut self, value: impl Into<String>) -> Self {
        self.allowed_values.push(value.into());
        self
    }

    /// Mask the value in console and API output.
    pub fn no_echo(mut self) -> Self {
        self.no_echo = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parameter_type(&self) -> ParameterType {
        self.ty
    }

    pub(crate) fn render(&self) -> Value {
        let mut body = Map::new();
        body.insert("Type".into(), json!(self.ty.as_ref()));
        if let Some(default) = &self.default {
            body.insert("Default".into(), json!(default));
        }
        if let Some(description) = &self.description {
            body.insert("Description".into(), json!(description));
        }
        if self.no_echo {
            body.insert("NoEcho".into(), json!(true));
        }
        if !self.allowed_values.is_empty() {
            body.insert("AllowedValues".into(), json!(self.allowed_values));
        }
        Value::Object(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;
    use yare::parameterized;

    #[parameterized(
        lowercase_string = { "string", ParameterType::String },
        canonical_string = { "String", ParameterType::String },
        number = { "Number", ParameterType::Number },
        number_list = { "List<Number>", ParameterType::NumberList },
        comma_list = { "CommaDelimitedList", ParameterType::CommaDelimitedList },
        subnet = { "AWS::EC2::Subnet::Id", ParameterType::SubnetId },
        padded = { " string ", ParameterType::String },
    )]
    fn test_parse_type_tag(tag: &str, expected: ParameterType) {
        assert_eq!(ParameterType::parse(tag).unwrap(), expected);
    }

    #[parameterized(
        empty = { "" },
        unknown = { "Blob" },
        near_miss = { "Strings" },
    )]
    fn test_parse_unknown_tag(tag: &str) {
        assert_eq!(
            ParameterType::parse(tag).unwrap_err(),
            TemplateError::UnsupportedType(tag.to_string())
        );
    }

    #[test]
    fn test_render_minimal() {
        let rendered = serde_json::to_string(&Parameter::string("NodeEnv").render()).unwrap();
        assert_snapshot!(rendered, @r#"{"Type":"String"}"#);
    }

    #[test]
    fn test_render_all_fields() {
        let parameter = Parameter::string("NodeEnv")
            .with_default("production")
            .with_description("Runtime mode")
            .with_allowed_value("production")
            .with_allowed_value("staging")
            .no_echo();
        let rendered = serde_json::to_string(&parameter.render()).unwrap();
        assert_snapshot!(
            rendered,
            @r#"{"Type":"String","Default":"production","Description":"Runtime mode","NoEcho":true,"AllowedValues":["production","staging"]}"#
        );
    }
}

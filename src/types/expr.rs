//! Value expressions and their rendering as intrinsic functions.
//!
//! Every value that ends up in a template is an [`Expr`]. Expressions that
//! point at other declarations (`Ref`, `Fn::GetAtt`, `${..}` variables inside
//! `Fn::Sub`) are collected as [`Reference`]s so the builder can check them
//! before anything is rendered.
//!
//! Rendering always uses the long intrinsic form (`{"Ref": ..}`,
//! `{"Fn::GetAtt": [..]}`), which reads the same in YAML and JSON output.

use std::fmt::{Display, Formatter, Result as FmtResult};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use strum_macros::{AsRefStr, Display as StrumDisplay, EnumString};

use crate::error::TemplateError;

use super::resource::ResourceKind;

static SUB_VARIABLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$\{([^}]*)\}").unwrap());

/// A platform-generated attribute readable through `Fn::GetAtt`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, StrumDisplay, EnumString, AsRefStr,
)]
pub enum Attribute {
    Arn,
    DomainName,
    RegionalDomainName,
    DualStackDomainName,
    #[strum(serialize = "WebsiteURL")]
    WebsiteUrl,
}

/// Values the platform supplies for every stack.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, StrumDisplay, EnumString, AsRefStr,
)]
pub enum PseudoParameter {
    #[strum(serialize = "AWS::AccountId")]
    AccountId,
    #[strum(serialize = "AWS::NotificationARNs")]
    NotificationArns,
    #[strum(serialize = "AWS::NoValue")]
    NoValue,
    #[strum(serialize = "AWS::Partition")]
    Partition,
    #[strum(serialize = "AWS::Region")]
    Region,
    #[strum(serialize = "AWS::StackId")]
    StackId,
    #[strum(serialize = "AWS::StackName")]
    StackName,
    #[strum(serialize = "AWS::URLSuffix")]
    UrlSuffix,
}

/// The logical id and kind a handle pointed at when the expression was built.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceLink {
    logical_id: String,
    kind: ResourceKind,
}

impl ResourceLink {
    pub(crate) fn new(logical_id: impl Into<String>, kind: ResourceKind) -> Self {
        ResourceLink {
            logical_id: logical_id.into(),
            kind,
        }
    }

    pub fn logical_id(&self) -> &str {
        &self.logical_id
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }
}

impl Display for ResourceLink {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{} '{}'", self.kind, self.logical_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expr {
    Literal(String),
    Integer(i64),
    /// `Ref` to a declared parameter.
    ParameterRef(String),
    /// `Ref` to a declared resource.
    ResourceRef(ResourceLink),
    AttributeOf(ResourceLink, Attribute),
    Pseudo(PseudoParameter),
    /// `Fn::ImportValue` of another stack's export; the name is itself an expression.
    ImportedValue(Box<Expr>),
    /// `Fn::Sub` with `${Name}` / `${Name.Attr}` variables.
    Sub(String),
    Join(String, Vec<Expr>),
}

/// Something an expression needs to exist in the template.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Reference {
    Parameter(String),
    Resource(ResourceLink),
    Attribute(ResourceLink, Attribute),
    /// `${AWS::..}` inside a `Fn::Sub` string.
    Pseudo(String),
    /// `${Name}` inside a `Fn::Sub` string: a parameter or a resource.
    Name(String),
    /// `${Name.Attr}` inside a `Fn::Sub` string.
    NamedAttribute { logical_id: String, attribute: String },
}

impl Expr {
    pub fn literal(value: impl Into<String>) -> Self {
        Expr::Literal(value.into())
    }

    pub fn parameter(name: impl Into<String>) -> Self {
        Expr::ParameterRef(name.into())
    }

    pub fn sub(template: impl Into<String>) -> Self {
        Expr::Sub(template.into())
    }

    pub fn import(export_name: Expr) -> Self {
        Expr::ImportedValue(Box::new(export_name))
    }

    pub fn join(delimiter: impl Into<String>, parts: Vec<Expr>) -> Self {
        Expr::Join(delimiter.into(), parts)
    }

    pub fn render(&self) -> Value {
        match self {
            Expr::Literal(s) => Value::String(s.clone()),
            Expr::Integer(n) => json!(n),
            Expr::ParameterRef(name) => json!({ "Ref": name }),
            Expr::ResourceRef(link) => json!({ "Ref": link.logical_id }),
            Expr::AttributeOf(link, attr) => {
                json!({ "Fn::GetAtt": [link.logical_id, attr.as_ref()] })
            }
            Expr::Pseudo(pseudo) => json!({ "Ref": pseudo.as_ref() }),
            Expr::ImportedValue(name) => json!({ "Fn::ImportValue": name.render() }),
            Expr::Sub(template) => json!({ "Fn::Sub": template }),
            Expr::Join(delimiter, parts) => {
                let parts: Vec<Value> = parts.iter().map(Expr::render).collect();
                json!({ "Fn::Join": [delimiter, parts] })
            }
        }
    }

    /// The same value with a variable-free `Fn::Sub` reduced to its literal
    /// text, so equal rendered values compare equal.
    pub fn normalized(&self) -> Expr {
        match self {
            Expr::Sub(template) => match sub_references(template) {
                Ok(refs) if refs.is_empty() => Expr::Literal(template.replace("${!", "${")),
                _ => self.clone(),
            },
            Expr::ImportedValue(name) => Expr::import(name.normalized()),
            Expr::Join(delimiter, parts) => {
                Expr::join(delimiter.clone(), parts.iter().map(Expr::normalized).collect())
            }
            other => other.clone(),
        }
    }

    /// Collect every declaration this expression depends on.
    pub fn references(&self) -> Result<Vec<Reference>, TemplateError> {
        let mut out = Vec::new();
        self.collect_references(&mut out)?;
        Ok(out)
    }

    fn collect_references(&self, out: &mut Vec<Reference>) -> Result<(), TemplateError> {
        match self {
            Expr::Literal(_) | Expr::Integer(_) | Expr::Pseudo(_) => {}
            Expr::ParameterRef(name) => out.push(Reference::Parameter(name.clone())),
            Expr::ResourceRef(link) => out.push(Reference::Resource(link.clone())),
            Expr::AttributeOf(link, attr) => out.push(Reference::Attribute(link.clone(), *attr)),
            Expr::ImportedValue(name) => name.collect_references(out)?,
            Expr::Sub(template) => out.extend(sub_references(template)?),
            Expr::Join(_, parts) => {
                for part in parts {
                    part.collect_references(out)?;
                }
            }
        }
        Ok(())
    }
}

impl From<&str> for Expr {
    fn from(value: &str) -> Self {
        Expr::literal(value)
    }
}

impl From<String> for Expr {
    fn from(value: String) -> Self {
        Expr::Literal(value)
    }
}

impl From<i64> for Expr {
    fn from(value: i64) -> Self {
        Expr::Integer(value)
    }
}

impl From<PseudoParameter> for Expr {
    fn from(value: PseudoParameter) -> Self {
        Expr::Pseudo(value)
    }
}

/// Scan a `Fn::Sub` template for its variables.
///
/// `${!Literal}` is an escape and yields nothing.
fn sub_references(template: &str) -> Result<Vec<Reference>, TemplateError> {
    let mut refs = Vec::new();
    for caps in SUB_VARIABLE.captures_iter(template) {
        let var = &caps[1];
        if var.starts_with('!') {
            continue;
        }
        if var.is_empty() {
            return Err(TemplateError::InvalidFormat(format!(
                "empty variable in substitution '{template}'"
            )));
        }
        if var.starts_with("AWS::") {
            refs.push(Reference::Pseudo(var.to_string()));
        } else if let Some((logical_id, attribute)) = var.split_once('.') {
            refs.push(Reference::NamedAttribute {
                logical_id: logical_id.to_string(),
                attribute: attribute.to_string(),
            });
        } else {
            refs.push(Reference::Name(var.to_string()));
        }
    }

    if SUB_VARIABLE.replace_all(template, "").contains("${") {
        return Err(TemplateError::InvalidFormat(format!(
            "unterminated variable in substitution '{template}'"
        )));
    }

    Ok(refs)
}

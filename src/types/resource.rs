//! The resource kinds a template can hold.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum_macros::{Display, EnumString};

use crate::traits::TemplateResource;

use super::bucket::Bucket;
use super::expr::{Attribute, Expr};
use super::function::Function;
use super::permission::Permission;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum ResourceKind {
    Bucket,
    Function,
    Permission,
}

impl ResourceKind {
    /// The platform type tag written to `Type`.
    pub fn resource_type(&self) -> &'static str {
        match self {
            Self::Bucket => "AWS::S3::Bucket",
            Self::Function => "AWS::Serverless::Function",
            Self::Permission => "AWS::Lambda::Permission",
        }
    }

    /// Whether `Fn::GetAtt` can read `attribute` from this kind.
    pub fn exposes(&self, attribute: Attribute) -> bool {
        match self {
            Self::Bucket => true,
            Self::Function => attribute == Attribute::Arn,
            Self::Permission => false,
        }
    }
}

/// A declared resource. The set of kinds is closed.
#[derive(Debug, Clone, PartialEq)]
pub enum Resource {
    Bucket(Bucket),
    Function(Function),
    Permission(Permission),
}

impl Resource {
    fn inner(&self) -> &dyn TemplateResource {
        match self {
            Resource::Bucket(b) => b,
            Resource::Function(f) => f,
            Resource::Permission(p) => p,
        }
    }
}

impl TemplateResource for Resource {
    fn kind(&self) -> ResourceKind {
        self.inner().kind()
    }

    fn properties(&self) -> Map<String, Value> {
        self.inner().properties()
    }

    fn expressions(&self) -> Vec<(String, Expr)> {
        self.inner().expressions()
    }
}

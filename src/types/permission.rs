//! Resource-to-function invoke grants.

use serde_json::{Map, Value, json};

use crate::traits::TemplateResource;

use super::expr::Expr;
use super::handle::{BucketHandle, FunctionHandle};
use super::resource::ResourceKind;

pub const INVOKE_FUNCTION: &str = "lambda:InvokeFunction";
pub const S3_PRINCIPAL: &str = "s3.amazonaws.com";

/// Lets `principal` perform `action` on a function when the call originates
/// from the given bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permission {
    action: String,
    function: FunctionHandle,
    principal: String,
    source: BucketHandle,
}

impl Permission {
    pub fn new(
        action: impl Into<String>,
        function: &FunctionHandle,
        principal: impl Into<String>,
        source: &BucketHandle,
    ) -> Self {
        Permission {
            action: action.into(),
            function: function.clone(),
            principal: principal.into(),
            source: source.clone(),
        }
    }

    /// The common case: the bucket may invoke the function.
    pub fn bucket_invoke(function: &FunctionHandle, source: &BucketHandle) -> Self {
        Permission::new(INVOKE_FUNCTION, function, S3_PRINCIPAL, source)
    }

    pub fn function(&self) -> &FunctionHandle {
        &self.function
    }

    pub fn source(&self) -> &BucketHandle {
        &self.source
    }
}

impl TemplateResource for Permission {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Permission
    }

    fn properties(&self) -> Map<String, Value> {
        let mut props = Map::new();
        props.insert("Action".into(), json!(self.action));
        props.insert("FunctionName".into(), self.function.reference().render());
        props.insert("Principal".into(), json!(self.principal));
        props.insert("SourceArn".into(), self.source.arn().render());
        props
    }

    fn expressions(&self) -> Vec<(String, Expr)> {
        vec![
            ("FunctionName".to_string(), self.function.reference()),
            ("SourceArn".to_string(), self.source.arn()),
        ]
    }
}

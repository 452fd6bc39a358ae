use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display};
use thiserror::Error;

/// The namespace a declaration lives in, used to report collisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum DeclarationKind {
    Parameter,
    Resource,
    Output,
    Export,
}

#[derive(Debug, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum TemplateError {
    #[error("duplicate {kind} declaration: {name}")]
    DuplicateDeclaration { kind: DeclarationKind, name: String },

    #[error("{context} references undeclared {target}")]
    DanglingReference { context: String, target: String },

    #[error("unsupported parameter type: {0}")]
    UnsupportedType(String),

    #[error("attribute '{attribute}' is not available on {resource}")]
    UnsupportedAttribute { resource: String, attribute: String },

    #[error("bucket '{existing}' is already declared, cannot add '{requested}'")]
    BucketLimit { existing: String, requested: String },

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("failed to render template: {0}")]
    Render(String),

    #[error("failed to write template: {0}")]
    Serialization(String),
}

impl TemplateError {
    pub(crate) fn duplicate(kind: DeclarationKind, name: impl Into<String>) -> Self {
        TemplateError::DuplicateDeclaration {
            kind,
            name: name.into(),
        }
    }

    pub(crate) fn dangling(context: impl Into<String>, target: impl Into<String>) -> Self {
        TemplateError::DanglingReference {
            context: context.into(),
            target: target.into(),
        }
    }
}

impl From<serde_json::Error> for TemplateError {
    fn from(err: serde_json::Error) -> Self {
        TemplateError::Render(err.to_string())
    }
}

impl From<serde_yaml::Error> for TemplateError {
    fn from(err: serde_yaml::Error) -> Self {
        TemplateError::Render(err.to_string())
    }
}

impl From<std::io::Error> for TemplateError {
    fn from(err: std::io::Error) -> Self {
        TemplateError::Serialization(err.to_string())
    }
}

impl From<tempfile::PersistError> for TemplateError {
    fn from(err: tempfile::PersistError) -> Self {
        TemplateError::Serialization(err.error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;

    #[test]
    fn test_duplicate_message() {
        let err = TemplateError::duplicate(DeclarationKind::Resource, "AccountMedia");
        assert_snapshot!(err.to_string(), @"duplicate resource declaration: AccountMedia");
    }

    #[test]
    fn test_dangling_message() {
        let err = TemplateError::dangling("output 'Bucket'", "bucket 'Missing'");
        assert_snapshot!(err.to_string(), @"output 'Bucket' references undeclared bucket 'Missing'");
    }

    #[test]
    fn test_io_error_maps_to_serialization() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: TemplateError = io.into();
        assert!(matches!(err, TemplateError::Serialization(msg) if msg.contains("denied")));
    }

    #[test]
    fn test_error_serializes() {
        let err = TemplateError::UnsupportedType("Blob".to_string());
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json, serde_json::json!({"UnsupportedType": "Blob"}));
    }
}

//! Typed handles to declared resources.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::marker::PhantomData;

use serde::{Deserialize, Serialize};

use super::expr::{Attribute, Expr, ResourceLink};
use super::resource::ResourceKind;

/// Ties a marker type to the resource kind it stands for.
pub trait ResourceMarker {
    const KIND: ResourceKind;
}

/// Marker type for buckets
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BucketMarker {}

/// Marker type for functions
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FunctionMarker {}

/// Marker type for permissions
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PermissionMarker {}

impl ResourceMarker for BucketMarker {
    const KIND: ResourceKind = ResourceKind::Bucket;
}

impl ResourceMarker for FunctionMarker {
    const KIND: ResourceKind = ResourceKind::Function;
}

impl ResourceMarker for PermissionMarker {
    const KIND: ResourceKind = ResourceKind::Permission;
}

/// A handle to a declared resource, with zero runtime cost over its logical id.
///
/// Handles are only produced by the builder on a successful declaration, but
/// a handle from one builder can still be passed to another. Rendering checks
/// every handle against the declarations of the builder doing the rendering.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Handle<T> {
    logical_id: String,
    #[serde(skip)]
    _marker: PhantomData<T>,
}

impl<T: ResourceMarker> Handle<T> {
    pub(crate) fn new(logical_id: impl Into<String>) -> Self {
        Handle {
            logical_id: logical_id.into(),
            _marker: PhantomData,
        }
    }

    pub fn logical_id(&self) -> &str {
        &self.logical_id
    }

    pub fn kind(&self) -> ResourceKind {
        T::KIND
    }

    pub(crate) fn link(&self) -> ResourceLink {
        ResourceLink::new(self.logical_id.clone(), T::KIND)
    }

    /// `Ref` to the resource's generated physical id.
    pub fn reference(&self) -> Expr {
        Expr::ResourceRef(self.link())
    }

    /// `Fn::GetAtt` of a platform-generated attribute.
    pub fn get_att(&self, attribute: Attribute) -> Expr {
        Expr::AttributeOf(self.link(), attribute)
    }

    pub fn arn(&self) -> Expr {
        self.get_att(Attribute::Arn)
    }
}

impl<T: ResourceMarker> Display for Handle<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{} '{}'", T::KIND, self.logical_id)
    }
}

/// A bucket handle.
pub type BucketHandle = Handle<BucketMarker>;

/// A function handle.
pub type FunctionHandle = Handle<FunctionMarker>;

/// A permission handle.
pub type PermissionHandle = Handle<PermissionMarker>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_display() {
        let bucket: BucketHandle = Handle::new("AccountMedia");
        assert_eq!(bucket.to_string(), "bucket 'AccountMedia'");
        let function: FunctionHandle = Handle::new("GraphQL");
        assert_eq!(function.to_string(), "function 'GraphQL'");
    }

    #[test]
    fn test_handle_kind_follows_marker() {
        let bucket: BucketHandle = Handle::new("AccountMedia");
        let permission: PermissionHandle = Handle::new("Invoke");
        assert_eq!(bucket.kind(), ResourceKind::Bucket);
        assert_eq!(permission.kind(), ResourceKind::Permission);
    }

    #[test]
    fn test_handle_reference_and_arn() {
        let bucket: BucketHandle = Handle::new("AccountMedia");
        assert_eq!(
            bucket.reference(),
            Expr::ResourceRef(ResourceLink::new("AccountMedia", ResourceKind::Bucket))
        );
        assert_eq!(
            bucket.arn(),
            Expr::AttributeOf(
                ResourceLink::new("AccountMedia", ResourceKind::Bucket),
                Attribute::Arn
            )
        );
    }

    #[test]
    fn test_handle_serialization_skips_marker() {
        let function: FunctionHandle = Handle::new("GraphQL");
        let serialized = serde_json::to_value(&function).unwrap();
        assert_eq!(serialized, serde_json::json!({"logical_id": "GraphQL"}));
        let deserialized: FunctionHandle = serde_json::from_value(serialized).unwrap();
        assert_eq!(function, deserialized);
    }
}

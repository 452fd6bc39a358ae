//! Data model for template declarations.
//!
//! Rendered forms:
//! - Parameter: `Name: {Type, Default?, Description?, NoEcho?, AllowedValues?}`
//! - Resource: `Name: {Type, Properties?}` for buckets, functions and permissions
//! - Output: `Name: {Description?, Value, Export?: {Name}}`
//!
//! Values are [`Expr`]s; references to other declarations go through
//! typed [`Handle`]s so they can be checked before rendering.

mod bucket;
mod environment;
mod expr;
mod function;
mod handle;
mod network;
mod output;
mod parameter;
mod permission;
mod policy;
mod resource;

pub use bucket::{Bucket, CorsMethod, CorsRule};
pub use environment::Environment;
pub use expr::{Attribute, Expr, PseudoParameter, Reference, ResourceLink};
pub use function::{ApiTrigger, Function, HttpMethod};
pub use handle::{
    BucketHandle, BucketMarker, FunctionHandle, FunctionMarker, Handle, PermissionHandle,
    PermissionMarker, ResourceMarker,
};
pub use network::NetworkAccess;
pub use output::{Output, stack_export_key};
pub use parameter::{Parameter, ParameterType};
pub use permission::{INVOKE_FUNCTION, Permission, S3_PRINCIPAL};
pub use policy::{
    Effect, POLICY_LANGUAGE_VERSION, PolicyEntry, PolicyStatement, VPC_ACCESS_EXECUTION_ROLE,
};
pub use resource::{Resource, ResourceKind};

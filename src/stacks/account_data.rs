//! The account-data service stack.
//!
//! Two variants are kept side by side:
//! - [`v1_minimal`]: the GraphQL and upload-complete functions, the media
//!   bucket, and an invoke grant from the bucket to the upload function.
//! - [`v2_identity_encryption`]: v1 plus bucket CORS, identity-broker and
//!   key parameters, and inline object/key policies.
//!
//! Both import database and network coordinates from a separately deployed
//! core stack whose name is passed in the `CoreStack` parameter.

use std::sync::Arc;

use crate::builder::TemplateBuilder;
use crate::config::GeneratorConfig;
use crate::error::TemplateError;
use crate::types::{
    ApiTrigger, Bucket, BucketHandle, CorsMethod, CorsRule, Environment, Expr, Function,
    HttpMethod, NetworkAccess, Parameter, Permission, PolicyStatement, VPC_ACCESS_EXECUTION_ROLE,
};

pub const NODE_RUNTIME: &str = "nodejs8.10";
pub const CODE_URI: &str = "../.";
pub const HANDLER_DIR: &str = "src/lambda/";

pub const BUCKET: &str = "AccountMedia";
pub const GRAPHQL: &str = "GraphQL";
pub const UPLOAD_COMPLETE: &str = "UploadComplete";
pub const UPLOAD_PERMISSION: &str = "AccountMediaBucketInvokeUploadComplete";

const BASE_PARAMETERS: [&str; 5] = ["CoreStack", "MySQLDbName", "MySQLUser", "MySQLPass", "NodeEnv"];

/// A value exported by the core stack under `<CoreStack>-<suffix>`.
pub fn core_import(suffix: &str) -> Expr {
    Expr::import(Expr::sub(format!("${{CoreStack}}-{suffix}")))
}

fn handler(name: &str) -> String {
    format!("{HANDLER_DIR}{name}.handler")
}

fn core_network() -> Arc<NetworkAccess> {
    Arc::new(NetworkAccess::new(
        vec![core_import("RDS-Access-SG-ID")],
        vec![core_import("SubnetID")],
    ))
}

fn database_environment() -> Environment {
    Environment::new()
        .with("DATABASE_PORT", core_import("MySQL-Port"))
        .with("DATABASE_HOST", core_import("MySQL-Address"))
        .with("DATABASE_NAME", Expr::parameter("MySQLDbName"))
        .with("DATABASE_USER", Expr::parameter("MySQLUser"))
        .with("DATABASE_PASSWORD", Expr::parameter("MySQLPass"))
        .with("DATABASE_POOL_MIN", 1i64)
        .with("DATABASE_POOL_MAX", 2i64)
        .with("NODE_ENV", Expr::parameter("NodeEnv"))
}

fn identity_environment() -> Environment {
    Environment::new()
        .with("KEYCLOAK_SERVER_URL", Expr::parameter("KeycloakServerUrl"))
        .with("KEYCLOAK_REALM", Expr::parameter("KeycloakRealm"))
        .with("KEYCLOAK_CLIENT_ID", Expr::parameter("KeycloakClientId"))
        .with("KEYCLOAK_CLIENT_SECRET", Expr::parameter("KeycloakClientSecret"))
        .with("KMS_CMK_ID", Expr::parameter("KmsCmkId"))
}

fn declare_base_parameters(builder: &mut TemplateBuilder) -> Result<(), TemplateError> {
    for name in BASE_PARAMETERS {
        builder.declare_parameter(name, "String")?;
    }
    Ok(())
}

fn declare_outputs(
    builder: &mut TemplateBuilder,
    bucket: &BucketHandle,
    upload_complete: Expr,
) -> Result<(), TemplateError> {
    builder.declare_stack_export("AccountMediaBucket", bucket.reference())?;
    builder.declare_stack_export("UploadCompleteArn", upload_complete)?;
    Ok(())
}

/// GraphQL API and upload hook, sharing network access and environment.
pub fn v1_minimal(config: GeneratorConfig) -> Result<TemplateBuilder, TemplateError> {
    let mut builder = TemplateBuilder::new(config);
    declare_base_parameters(&mut builder)?;

    let network = core_network();
    let environment = database_environment();

    builder.declare_function(
        GRAPHQL,
        Function::new(NODE_RUNTIME, CODE_URI, handler(GRAPHQL))
            .with_api_trigger("API", ApiTrigger::new("/graphql", HttpMethod::Post))
            .with_policy(VPC_ACCESS_EXECUTION_ROLE)
            .with_network_access(Arc::clone(&network))
            .with_environment(environment.clone()),
    )?;
    let upload_complete = builder.declare_function(
        UPLOAD_COMPLETE,
        Function::new(NODE_RUNTIME, CODE_URI, handler(UPLOAD_COMPLETE))
            .with_policy(VPC_ACCESS_EXECUTION_ROLE)
            .with_network_access(network)
            .with_environment(environment),
    )?;

    let bucket = builder.declare_bucket(BUCKET, Bucket::new())?;
    builder.declare_permission(
        UPLOAD_PERMISSION,
        Permission::bucket_invoke(&upload_complete, &bucket),
    )?;

    declare_outputs(&mut builder, &bucket, upload_complete.arn())?;
    Ok(builder)
}

/// v1 plus browser uploads (CORS), identity-broker settings and key access.
pub fn v2_identity_encryption(config: GeneratorConfig) -> Result<TemplateBuilder, TemplateError> {
    let mut builder = TemplateBuilder::new(config);
    declare_base_parameters(&mut builder)?;
    for name in ["KeycloakServerUrl", "KeycloakRealm", "KeycloakClientId", "KmsCmkId"] {
        builder.declare_parameter(name, "String")?;
    }
    builder.add_parameter(Parameter::string("KeycloakClientSecret").no_echo())?;

    let bucket = builder.declare_bucket(
        BUCKET,
        Bucket::new().with_cors_rule(CorsRule::new(
            ["*"],
            vec![CorsMethod::Get, CorsMethod::Put, CorsMethod::Post],
            ["*"],
        )),
    )?;

    let network = core_network();
    let environment = database_environment().with("S3_BUCKET", bucket.reference());
    let graphql_environment = environment.extended(&identity_environment());

    let objects = Expr::join("", vec![bucket.arn(), "/*".into()]);
    let object_access = PolicyStatement::allow(
        ["s3:GetObject", "s3:PutObject", "s3:PutObjectAcl"],
        vec![objects],
    );
    let public_access_block = PolicyStatement::allow(
        ["s3:GetBucketPublicAccessBlock", "s3:PutBucketPublicAccessBlock"],
        vec![bucket.arn()],
    );
    let key_access = PolicyStatement::allow(
        ["kms:Encrypt", "kms:Decrypt"],
        vec![Expr::sub("arn:aws:kms:${AWS::Region}:${AWS::AccountId}:key/${KmsCmkId}")],
    );

    builder.declare_function(
        GRAPHQL,
        Function::new(NODE_RUNTIME, CODE_URI, handler(GRAPHQL))
            .with_api_trigger("API", ApiTrigger::new("/graphql", HttpMethod::Post))
            .with_policy(VPC_ACCESS_EXECUTION_ROLE)
            .with_policy(object_access.clone())
            .with_policy(public_access_block)
            .with_policy(key_access)
            .with_network_access(Arc::clone(&network))
            .with_environment(graphql_environment),
    )?;
    let upload_complete = builder.declare_function(
        UPLOAD_COMPLETE,
        Function::new(NODE_RUNTIME, CODE_URI, handler(UPLOAD_COMPLETE))
            .with_policy(VPC_ACCESS_EXECUTION_ROLE)
            .with_policy(object_access)
            .with_network_access(network)
            .with_environment(environment),
    )?;

    builder.declare_permission(
        UPLOAD_PERMISSION,
        Permission::bucket_invoke(&upload_complete, &bucket),
    )?;

    declare_outputs(&mut builder, &bucket, upload_complete.arn())?;
    Ok(builder)
}

use super::*;
use crate::types::{ApiTrigger, HttpMethod, PolicyStatement, VPC_ACCESS_EXECUTION_ROLE};


const RUNTIME: &str = "nodejs8.10";
const CODE_URI: &str = "../.";

fn graphql_function() -> Function {
    Function::new(RUNTIME, CODE_URI, "src/lambda/GraphQL.handler")
        .with_api_trigger("API", ApiTrigger::new("/graphql", HttpMethod::Post))
}

/// The smallest useful template: one parameter, the bucket, one function and
/// one export, under a fixed stack name.
fn minimal_builder() -> TemplateBuilder {
    let mut builder = TemplateBuilder::new(GeneratorConfig::default().with_stack_name("MyStack"));
    builder.declare_parameter("NodeEnv", "string").unwrap();
    let bucket = builder.declare_bucket("AccountMedia", Bucket::new()).unwrap();
    builder.declare_function("GraphQL", graphql_function()).unwrap();
    builder
        .declare_stack_export("AccountMediaBucket", bucket.reference())
        .unwrap();
    builder
}

/// Parse rendered YAML back into a tree for structural assertions.
fn parse_yaml(text: &str) -> Value {
    serde_yaml::from_str(text).unwrap()
}

#[test]
fn test_builders_are_independent() {
    let first = minimal_builder();
    let mut second = TemplateBuilder::default();
    second.declare_parameter("NodeEnv", "string").unwrap();
    assert_eq!(first.parameters().len(), 1);
    assert_eq!(second.parameters().len(), 1);
    assert_eq!(second.resources().count(), 0);
}

#[test]
fn test_inline_statement_next_to_managed_policy() {
    let mut builder = TemplateBuilder::default();
    let bucket = builder.declare_bucket("AccountMedia", Bucket::new()).unwrap();
    let function = graphql_function()
        .with_policy(VPC_ACCESS_EXECUTION_ROLE)
        .with_policy(PolicyStatement::allow(["s3:GetObject"], vec![bucket.arn()]))
        .with_policy("arn:aws:iam::aws:policy/AWSXrayWriteOnlyAccess");
    builder.declare_function("GraphQL", function).unwrap();

    let doc = builder.document().unwrap();
    let policies = &doc["Resources"]["GraphQL"]["Properties"]["Policies"];
    assert_eq!(policies[0], json!(VPC_ACCESS_EXECUTION_ROLE));
    assert_eq!(
        policies[1]["Statement"][0],
        json!({
            "Effect": "Allow",
            "Action": ["s3:GetObject"],
            "Resource": [{ "Fn::GetAtt": ["AccountMedia", "Arn"] }]
        })
    );
    assert_eq!(policies[2], json!("arn:aws:iam::aws:policy/AWSXrayWriteOnlyAccess"));
}

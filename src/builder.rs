use std::str::FromStr;

use serde_json::{Map, Value, json};
use tracing::{debug, info, warn};

use crate::config::{GeneratorConfig, OutputFormat};
use crate::error::{DeclarationKind, TemplateError};
use crate::traits::TemplateResource;
use crate::types::{
    Attribute, Bucket, BucketHandle, Expr, Function, FunctionHandle, Handle, Output, Parameter,
    ParameterType, Permission, PermissionHandle, PseudoParameter, Reference, Resource,
    ResourceKind, ResourceMarker, stack_export_key,
};
use crate::writer;
use crate::yaml;

pub const TEMPLATE_FORMAT_VERSION: &str = "2010-09-09";
pub const SERVERLESS_TRANSFORM: &str = "AWS::Serverless-2016-10-31";

/// Owns one template's declarations from the first `declare_*` call until
/// it is rendered. Builders share nothing, so several can coexist.
#[derive(Debug, Clone, Default)]
pub struct TemplateBuilder {
    config: GeneratorConfig,
    parameters: Vec<Parameter>,
    resources: Vec<(String, Resource)>,
    outputs: Vec<Output>,
}

impl TemplateBuilder {
    pub fn new(config: GeneratorConfig) -> Self {
        TemplateBuilder {
            config,
            ..Default::default()
        }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn resources(&self) -> impl Iterator<Item = (&str, &Resource)> {
        self.resources.iter().map(|(name, r)| (name.as_str(), r))
    }

    pub fn outputs(&self) -> &[Output] {
        &self.outputs
    }

    /// Register a required deploy-time input from a type tag such as `string`.
    pub fn declare_parameter(&mut self, name: &str, type_tag: &str) -> Result<(), TemplateError> {
        let ty = ParameterType::parse(type_tag).inspect_err(|_| {
            warn!(event = "Declare", kind = "parameter", name, type_tag, "unsupported type");
        })?;
        self.add_parameter(Parameter::new(name, ty))
    }

    pub fn add_parameter(&mut self, parameter: Parameter) -> Result<(), TemplateError> {
        self.ensure_logical_id_free(parameter.name())?;
        debug!(
            event = "Declare",
            kind = "parameter",
            name = parameter.name(),
            ty = %parameter.parameter_type()
        );
        self.parameters.push(parameter);
        Ok(())
    }

    /// Register the template's bucket. Only one bucket may be declared.
    pub fn declare_bucket(&mut self, name: &str, bucket: Bucket) -> Result<BucketHandle, TemplateError> {
        if let Some((existing, _)) = self
            .resources
            .iter()
            .find(|(_, r)| r.kind() == ResourceKind::Bucket)
        {
            warn!(event = "Declare", kind = "bucket", name, existing = existing.as_str(), "bucket limit");
            return Err(TemplateError::BucketLimit {
                existing: existing.clone(),
                requested: name.to_string(),
            });
        }
        self.declare_resource(name, Resource::Bucket(bucket))
    }

    pub fn declare_function(
        &mut self,
        name: &str,
        function: Function,
    ) -> Result<FunctionHandle, TemplateError> {
        self.declare_resource(name, Resource::Function(function))
    }

    pub fn declare_permission(
        &mut self,
        name: &str,
        permission: Permission,
    ) -> Result<PermissionHandle, TemplateError> {
        self.declare_resource(name, Resource::Permission(permission))
    }

    fn declare_resource<T: ResourceMarker>(
        &mut self,
        name: &str,
        resource: Resource,
    ) -> Result<Handle<T>, TemplateError> {
        self.ensure_logical_id_free(name)?;
        debug!(event = "Declare", kind = %resource.kind(), name);
        self.resources.push((name.to_string(), resource));
        Ok(Handle::new(name))
    }

    /// Register an output exported under `export_key`.
    pub fn declare_export(
        &mut self,
        name: &str,
        value: Expr,
        export_key: Expr,
    ) -> Result<(), TemplateError> {
        self.add_output(Output::new(name, value).with_export(export_key))
    }

    /// Register an output exported as `<stack name>-<name>`.
    pub fn declare_stack_export(&mut self, name: &str, value: Expr) -> Result<(), TemplateError> {
        let key = stack_export_key(&self.config.stack_name, name);
        self.declare_export(name, value, key)
    }

    pub fn add_output(&mut self, output: Output) -> Result<(), TemplateError> {
        if self.outputs.iter().any(|o| o.name() == output.name()) {
            warn!(event = "Declare", kind = "output", name = output.name(), "duplicate");
            return Err(TemplateError::duplicate(DeclarationKind::Output, output.name()));
        }
        if let Some(key) = output.export_key().map(Expr::normalized) {
            if self
                .outputs
                .iter()
                .any(|o| o.export_key().map(Expr::normalized).as_ref() == Some(&key))
            {
                let key = describe(&key);
                warn!(event = "Declare", kind = "export", name = output.name(), key = %key, "duplicate");
                return Err(TemplateError::duplicate(DeclarationKind::Export, key));
            }
        }
        debug!(event = "Declare", kind = "output", name = output.name());
        self.outputs.push(output);
        Ok(())
    }

    /// Parameters and resources share one namespace: both are targets of `Ref`.
    fn ensure_logical_id_free(&self, name: &str) -> Result<(), TemplateError> {
        let kind = if self.parameters.iter().any(|p| p.name() == name) {
            Some(DeclarationKind::Parameter)
        } else if self.resources.iter().any(|(n, _)| n == name) {
            Some(DeclarationKind::Resource)
        } else {
            None
        };
        match kind {
            Some(kind) => {
                warn!(event = "Declare", existing = %kind, name, "duplicate");
                Err(TemplateError::duplicate(kind, name))
            }
            None => Ok(()),
        }
    }

    fn resource_kind(&self, logical_id: &str) -> Option<ResourceKind> {
        self.resources
            .iter()
            .find(|(n, _)| n == logical_id)
            .map(|(_, r)| r.kind())
    }

    /// Check every reference held by every declaration.
    pub fn validate(&self) -> Result<(), TemplateError> {
        for (name, resource) in &self.resources {
            for (location, expr) in resource.expressions() {
                let context = format!("{} '{name}' {location}", resource.kind());
                for reference in expr.references()? {
                    self.check_reference(&context, &reference)?;
                }
            }
        }
        for output in &self.outputs {
            for (location, expr) in output.expressions() {
                let context = format!("output '{}' {location}", output.name());
                for reference in expr.references()? {
                    self.check_reference(&context, &reference)?;
                }
            }
        }
        Ok(())
    }

    fn check_reference(&self, context: &str, reference: &Reference) -> Result<(), TemplateError> {
        match reference {
            Reference::Parameter(name) => {
                if !self.parameters.iter().any(|p| p.name() == name) {
                    return Err(TemplateError::dangling(context, format!("parameter '{name}'")));
                }
            }
            Reference::Resource(link) => {
                if self.resource_kind(link.logical_id()) != Some(link.kind()) {
                    return Err(TemplateError::dangling(context, link.to_string()));
                }
            }
            Reference::Attribute(link, attribute) => {
                if self.resource_kind(link.logical_id()) != Some(link.kind()) {
                    return Err(TemplateError::dangling(context, link.to_string()));
                }
                if !link.kind().exposes(*attribute) {
                    return Err(TemplateError::UnsupportedAttribute {
                        resource: link.to_string(),
                        attribute: attribute.to_string(),
                    });
                }
            }
            Reference::Pseudo(name) => {
                if PseudoParameter::from_str(name).is_err() {
                    return Err(TemplateError::dangling(
                        context,
                        format!("pseudo parameter '{name}'"),
                    ));
                }
            }
            Reference::Name(name) => {
                let declared = self.parameters.iter().any(|p| p.name() == name)
                    || self.resource_kind(name).is_some();
                if !declared {
                    return Err(TemplateError::dangling(context, format!("'{name}'")));
                }
            }
            Reference::NamedAttribute {
                logical_id,
                attribute,
            } => {
                let Some(kind) = self.resource_kind(logical_id) else {
                    return Err(TemplateError::dangling(context, format!("resource '{logical_id}'")));
                };
                let exposed = Attribute::from_str(attribute)
                    .map(|a| kind.exposes(a))
                    .unwrap_or(false);
                if !exposed {
                    return Err(TemplateError::UnsupportedAttribute {
                        resource: format!("{kind} '{logical_id}'"),
                        attribute: attribute.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// The whole template as a document tree, after validation.
    pub fn document(&self) -> Result<Value, TemplateError> {
        self.validate()?;

        let parameters: Map<String, Value> = self
            .parameters
            .iter()
            .map(|p| (p.name().to_string(), p.render()))
            .collect();
        let resources: Map<String, Value> = self
            .resources
            .iter()
            .map(|(name, r)| (name.clone(), r.render()))
            .collect();
        let outputs: Map<String, Value> = self
            .outputs
            .iter()
            .map(|o| (o.name().to_string(), o.render()))
            .collect();

        let mut doc = Map::new();
        doc.insert("AWSTemplateFormatVersion".into(), json!(TEMPLATE_FORMAT_VERSION));
        doc.insert("Transform".into(), json!(SERVERLESS_TRANSFORM));
        if let Some(description) = &self.config.description {
            doc.insert("Description".into(), json!(description));
        }
        doc.insert("Parameters".into(), Value::Object(parameters));
        doc.insert("Resources".into(), Value::Object(resources));
        doc.insert("Outputs".into(), Value::Object(outputs));
        Ok(Value::Object(doc))
    }

    /// Render the template text in the configured format. No I/O.
    pub fn render(&self) -> Result<String, TemplateError> {
        let doc = self.document()?;
        let text = match self.config.format {
            OutputFormat::Yaml => yaml::quote_timestamps(&serde_yaml::to_string(&doc)?),
            OutputFormat::Json => {
                let mut text = serde_json::to_string_pretty(&doc)?;
                text.push('\n');
                text
            }
        };
        info!(
            event = "Render",
            phase = "Rendered",
            format = %self.config.format,
            parameters = self.parameters.len(),
            resources = self.resources.len(),
            outputs = self.outputs.len()
        );
        Ok(text)
    }

    /// Render and write the template to the configured output path,
    /// replacing any previous file. Nothing is written if rendering fails.
    pub fn serialize(&self) -> Result<String, TemplateError> {
        let text = self.render()?;
        writer::write_atomic(&self.config.output_path, &text)?;
        Ok(text)
    }
}

/// A readable form of an expression for error messages.
fn describe(expr: &Expr) -> String {
    match expr {
        Expr::Literal(s) => s.clone(),
        other => other.render().to_string(),
    }
}

#[cfg(test)]
mod tests;

use serde_json::{Map, Value, json};

use crate::types::{Expr, ResourceKind};

/// Anything that can be declared in the `Resources` section of a template.
pub trait TemplateResource {
    /// The resource kind, which also fixes the platform type tag
    fn kind(&self) -> ResourceKind;

    /// The `Properties` block, in the order the keys should be rendered
    fn properties(&self) -> Map<String, Value>;

    /// Every expression held by this resource, labelled by where it sits
    /// (e.g. `Policies[1]`). Used to check references before rendering.
    fn expressions(&self) -> Vec<(String, Expr)> {
        // Default: a resource with literal-only properties
        Vec::new()
    }

    /// Render as `{Type, Properties}`, dropping `Properties` when it is empty
    fn render(&self) -> Value {
        let properties = self.properties();
        if properties.is_empty() {
            json!({ "Type": self.kind().resource_type() })
        } else {
            json!({ "Type": self.kind().resource_type(), "Properties": properties })
        }
    }
}

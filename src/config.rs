//! Generator settings.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

pub const DEFAULT_OUTPUT_PATH: &str = "template.yml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum OutputFormat {
    #[default]
    Yaml,
    Json,
}

/// How export keys name the stack they come from.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StackName {
    /// Resolved by the platform at deploy time (`${AWS::StackName}`).
    #[default]
    Deployed,
    /// A name known when the template is generated.
    Fixed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    pub output_path: PathBuf,
    pub format: OutputFormat,
    pub stack_name: StackName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            format: OutputFormat::default(),
            stack_name: StackName::default(),
            description: None,
        }
    }
}

impl GeneratorConfig {
    pub fn with_output_path(mut self, path: impl AsRef<Path>) -> Self {
        self.output_path = path.as_ref().to_path_buf();
        self
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_stack_name(mut self, name: impl Into<String>) -> Self {
        self.stack_name = StackName::Fixed(name.into());
        self
    }

    pub fn with_description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }
}

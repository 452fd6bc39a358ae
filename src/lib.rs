// src/lib.rs
pub use builder::TemplateBuilder;
pub use config::{GeneratorConfig, OutputFormat, StackName};
pub use error::{DeclarationKind, TemplateError};
pub use traits::TemplateResource;
pub use types::*;
pub use writer::write_atomic;

mod builder;
mod config;
mod error;
pub mod stacks;
mod traits;
mod types;
mod writer;
mod yaml;

//! Concrete stacks built with [`crate::TemplateBuilder`].

pub mod account_data;

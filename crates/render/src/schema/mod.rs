//! Sanitization allow-list: which tags, attributes and URL schemes survive.

pub mod defaults;
mod types;

pub use defaults::{STANDARD_SCHEMA, base_schema, standard_schema};
pub use types::{SanitizationSchema, SchemaExtension};

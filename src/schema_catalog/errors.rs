//! # Schema Catalog Error Types
//!
//! Errors raised while loading a schema definition and compiling it into an
//! immutable [`Schema`](super::schema::Schema).
//!
//! ## Error Categories
//!
//! - **Definition Errors**: duplicate or dangling type/field/interface names
//! - **Type Reference Errors**: malformed GraphQL type references such as `[Post!`
//! - **Configuration Errors**: file I/O and YAML parsing issues during loading
//!
//! When reporting a definition problem, prefer the context helpers so the
//! message says which type was being compiled:
//!
//! ```ignore
//! SchemaError::field_error_with_context("Post", "author", "while completing interface fields")
//! ```

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum SchemaError {
    #[error("Type `{type_name}` is defined more than once")]
    DuplicateType { type_name: String },
    #[error("Field `{field}` is defined more than once on type `{type_name}`")]
    DuplicateField { type_name: String, field: String },
    #[error("Type `{type_name}` implements unknown interface `{interface}`")]
    UnknownInterface { type_name: String, interface: String },
    #[error("Type `{type_name}` implements `{interface}`, which is not an interface")]
    NotAnInterface { type_name: String, interface: String },
    #[error("Field `{type_name}.{field}` refers to unknown type `{field_type}`")]
    UnknownFieldType {
        type_name: String,
        field: String,
        field_type: String,
    },
    #[error("Invalid type reference `{type_ref}`: {reason}")]
    InvalidTypeRef { type_ref: String, reason: String },
    #[error("Invalid definition for `{type_name}`: {message}")]
    InvalidDefinition { type_name: String, message: String },
    #[error("Generated name `{name}` collides with a declared type")]
    GeneratedNameCollision { name: String },
    #[error("Failed to read schema file: {error}")]
    ConfigReadError { error: String },
    #[error("Failed to parse schema definition: {error}")]
    ConfigParseError { error: String },
    #[error("Global schema registry is already initialized")]
    AlreadyInitialized,
}

impl SchemaError {
    /// Create an `InvalidDefinition` error for a field, with context on what
    /// the compiler was doing when it hit the problem.
    pub fn field_error_with_context(
        type_name: impl Into<String>,
        field: impl Into<String>,
        context: impl Into<String>,
    ) -> Self {
        let field = field.into();
        let ctx = context.into();
        SchemaError::InvalidDefinition {
            type_name: type_name.into(),
            message: format!("field `{}`\n  Context: {}", field, ctx),
        }
    }

    /// Create a configuration error naming the file and the loading step.
    pub fn config_error_with_context(
        config_path: impl Into<String>,
        context: impl Into<String>,
    ) -> Self {
        SchemaError::ConfigReadError {
            error: format!(
                "'{}': failed to load\n  Context: {}",
                config_path.into(),
                context.into()
            ),
        }
    }
}

//! Schema definition loading.
//!
//! GraphQL schemas are described in YAML:
//!
//! ```yaml
//! name: blog                     # Optional schema name
//! types:
//!   - name: Character
//!     kind: interface            # object (default) | interface | enum
//!     dgraph_type: performance.character
//!     fields:
//!       - name: id
//!         type: ID!
//!       - name: appearsIn
//!         type: "[Episode!]"
//!         dgraph_pred: appears_in
//!   - name: Human
//!     implements: [Character]
//!     fields:
//!       - name: totalCredits
//!         type: Float
//!   - name: Episode
//!     kind: enum
//!     values: [NEWHOPE, EMPIRE, JEDI]
//! ```
//!
//! `dgraph_type` and `dgraph_pred` are the type-level and field-level rename
//! overrides. Fields inherited from an interface do not need to be repeated on
//! the implementing type.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::errors::SchemaError;
use super::schema::Schema;

/// Top-level schema definition document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaConfig {
    /// Optional schema name, used in log output and registry diagnostics
    #[serde(default)]
    pub name: Option<String>,
    /// Type definitions in declaration order
    #[serde(default)]
    pub types: Vec<TypeDefinitionConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    #[default]
    Object,
    Interface,
    Enum,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeDefinitionConfig {
    pub name: String,
    #[serde(default)]
    pub kind: TypeKind,
    /// Type-level rename: prefix used instead of the type name for predicates
    #[serde(default)]
    pub dgraph_type: Option<String>,
    #[serde(default)]
    pub implements: Vec<String>,
    #[serde(default)]
    pub fields: Vec<FieldDefinitionConfig>,
    /// Enum values (only meaningful for `kind: enum`)
    #[serde(default)]
    pub values: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDefinitionConfig {
    pub name: String,
    /// GraphQL type reference, e.g. `[Post!]!`
    #[serde(rename = "type")]
    pub type_ref: String,
    /// Field-level rename: used verbatim as the predicate name
    #[serde(default)]
    pub dgraph_pred: Option<String>,
}

impl SchemaConfig {
    /// Load a schema definition from a YAML (or JSON) file
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, SchemaError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            SchemaError::config_error_with_context(path.display().to_string(), e.to_string())
        })?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, SchemaError> {
        serde_yaml::from_str(content).map_err(|e| SchemaError::ConfigParseError {
            error: e.to_string(),
        })
    }

    /// Compile this definition into an immutable schema
    pub fn to_schema(&self) -> Result<Schema, SchemaError> {
        Schema::compile(self)
    }
}

impl TypeDefinitionConfig {
    pub fn object(name: impl Into<String>) -> Self {
        TypeDefinitionConfig {
            name: name.into(),
            kind: TypeKind::Object,
            dgraph_type: None,
            implements: Vec::new(),
            fields: Vec::new(),
            values: Vec::new(),
        }
    }

    pub fn interface(name: impl Into<String>) -> Self {
        TypeDefinitionConfig {
            kind: TypeKind::Interface,
            ..Self::object(name)
        }
    }

    pub fn with_field(mut self, name: &str, type_ref: &str) -> Self {
        self.fields.push(FieldDefinitionConfig {
            name: name.to_string(),
            type_ref: type_ref.to_string(),
            dgraph_pred: None,
        });
        self
    }

    pub fn with_renamed_field(mut self, name: &str, type_ref: &str, pred: &str) -> Self {
        self.fields.push(FieldDefinitionConfig {
            name: name.to_string(),
            type_ref: type_ref.to_string(),
            dgraph_pred: Some(pred.to_string()),
        });
        self
    }

    pub fn with_dgraph_type(mut self, dgraph_type: &str) -> Self {
        self.dgraph_type = Some(dgraph_type.to_string());
        self
    }

    pub fn implementing(mut self, interfaces: &[&str]) -> Self {
        self.implements = interfaces.iter().map(|s| s.to_string()).collect();
        self
    }
}

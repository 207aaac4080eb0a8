//! Validated GraphQL operations, as handed over by the parsing/validation
//! layer. Nothing here is mutated while a rewrite runs.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

pub mod value;

pub use value::{UnboundVariable, Value, Variables, VARIABLE_KEY};

/// A parsed request: root query and mutation fields plus bound variables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    #[serde(default)]
    pub queries: Vec<Field>,
    #[serde(default)]
    pub mutations: Vec<Field>,
    #[serde(default)]
    pub variables: Variables,
}

impl Operation {
    /// Parse an operation document; JSON is accepted as well since it is valid YAML
    pub fn from_yaml_str(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }
}

/// One selection node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    /// Result alias; only matters for response shaping, never for rewriting
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default)]
    pub arguments: BTreeMap<String, Value>,
    #[serde(default)]
    pub directives: Vec<Directive>,
    #[serde(default)]
    pub selection_set: Vec<Field>,
}

impl Field {
    pub fn new(name: impl Into<String>) -> Self {
        Field {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn with_argument(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.arguments.insert(name.into(), value.into());
        self
    }

    pub fn with_directive(mut self, directive: Directive) -> Self {
        self.directives.push(directive);
        self
    }

    pub fn select(mut self, child: Field) -> Self {
        self.selection_set.push(child);
        self
    }

    pub fn has_selection(&self) -> bool {
        !self.selection_set.is_empty()
    }
}

/// A directive application on a field, e.g. `@skip(if: $hide)`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Directive {
    pub name: String,
    #[serde(default)]
    pub arguments: BTreeMap<String, Value>,
}

impl Directive {
    pub fn new(name: impl Into<String>) -> Self {
        Directive {
            name: name.into(),
            arguments: BTreeMap::new(),
        }
    }

    pub fn with_argument(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.arguments.insert(name.into(), value.into());
        self
    }

    pub fn skip(condition: impl Into<Value>) -> Self {
        Directive::new("skip").with_argument("if", condition)
    }

    pub fn include(condition: impl Into<Value>) -> Self {
        Directive::new("include").with_argument("if", condition)
    }

    pub fn cascade() -> Self {
        Directive::new("cascade")
    }
}

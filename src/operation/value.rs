use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Variable values bound for one request, keyed by variable name (no `$`)
pub type Variables = HashMap<String, Value>;

/// Key marking a variable reference in serialized operations:
/// `{"$var": "postID"}` refers to `$postID`.
pub const VARIABLE_KEY: &str = "$var";

#[derive(Debug, Clone, PartialEq, Error)]
#[error("Variable `${0}` is not bound")]
pub struct UnboundVariable(pub String);

/// A GraphQL input value as handed over by the validation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "serde_json::Value", into = "serde_json::Value")]
pub enum Value {
    Null,
    Boolean(bool),
    Int(i64),
    Float(f64),
    String(String),
    Variable(String),
    List(Vec<Value>),
    Object(BTreeMap<String, Value>),
}

impl Value {
    /// Substitute every variable reference with its bound value.
    pub fn resolve(&self, variables: &Variables) -> Result<Value, UnboundVariable> {
        match self {
            Value::Variable(name) => variables
                .get(name)
                .cloned()
                .ok_or_else(|| UnboundVariable(name.clone())),
            Value::List(items) => items
                .iter()
                .map(|item| item.resolve(variables))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::List),
            Value::Object(fields) => fields
                .iter()
                .map(|(k, v)| Ok((k.clone(), v.resolve(variables)?)))
                .collect::<Result<BTreeMap<_, _>, _>>()
                .map(Value::Object),
            other => Ok(other.clone()),
        }
    }

    pub fn variable(name: impl Into<String>) -> Self {
        Value::Variable(name.into())
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Object(fields) => Some(fields),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Boolean(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => {
                if map.len() == 1 {
                    if let Some(serde_json::Value::String(name)) = map.get(VARIABLE_KEY) {
                        return Value::Variable(name.clone());
                    }
                }
                Value::Object(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl From<Value> for serde_json::Value {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => serde_json::Value::Null,
            Value::Boolean(b) => serde_json::Value::Bool(b),
            Value::Int(i) => serde_json::Value::from(i),
            Value::Float(f) => serde_json::Number::from_f64(f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s),
            Value::Variable(name) => {
                let mut reference = serde_json::Map::new();
                reference.insert(VARIABLE_KEY.to_string(), serde_json::Value::String(name));
                serde_json::Value::Object(reference)
            }
            Value::List(items) => {
                serde_json::Value::Array(items.into_iter().map(serde_json::Value::from).collect())
            }
            Value::Object(fields) => serde_json::Value::Object(
                fields
                    .into_iter()
                    .map(|(k, v)| (k, serde_json::Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

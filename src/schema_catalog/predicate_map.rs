//! (type, field) -> predicate resolution.
//!
//! Built once per compiled schema. Interface fields are mapped first so that
//! implementing types can copy the interface's mapping verbatim; payload types
//! generated for a base type hold the very same `Arc` as the base type.

use std::collections::HashMap;
use std::sync::Arc;

use super::config::TypeKind;
use super::schema::{FieldDefinition, Schema, TypeDefinition, TypeOrigin, UID_SELECTOR};

pub type FieldPredicates = HashMap<String, String>;

#[derive(Debug, Clone, Default)]
pub struct PredicateMap {
    by_type: HashMap<String, Arc<FieldPredicates>>,
}

impl PredicateMap {
    pub(crate) fn build(schema: &Schema) -> Self {
        let mut by_type: HashMap<String, Arc<FieldPredicates>> = HashMap::new();

        // Interfaces first: implementing types copy from them
        for def in schema.declared_types().filter(|t| t.kind == TypeKind::Interface) {
            let mapping = def
                .fields
                .iter()
                .map(|f| (f.name.clone(), predicate_for(def, f)))
                .collect();
            by_type.insert(def.name.clone(), Arc::new(mapping));
        }

        for def in schema.declared_types().filter(|t| t.kind == TypeKind::Object) {
            let mut mapping = FieldPredicates::with_capacity(def.fields.len());
            for field in &def.fields {
                let inherited = (field.declared_in != def.name)
                    .then(|| by_type.get(&field.declared_in))
                    .flatten()
                    .and_then(|interface| interface.get(&field.name));
                let predicate = match inherited {
                    Some(predicate) => predicate.clone(),
                    None => predicate_for(def, field),
                };
                mapping.insert(field.name.clone(), predicate);
            }
            by_type.insert(def.name.clone(), Arc::new(mapping));
        }

        for def in schema.all_types() {
            if let TypeOrigin::Payload { base, .. } = &def.origin {
                if let Some(shared) = by_type.get(base).cloned() {
                    by_type.insert(def.name.clone(), shared);
                }
            }
        }

        PredicateMap { by_type }
    }

    /// Predicate for `type_name.field_name`, if the pair exists.
    pub fn resolve(&self, type_name: &str, field_name: &str) -> Option<&str> {
        self.by_type
            .get(type_name)
            .and_then(|fields| fields.get(field_name))
            .map(String::as_str)
    }

    pub fn type_mapping(&self, type_name: &str) -> Option<&Arc<FieldPredicates>> {
        self.by_type.get(type_name)
    }

    /// Whether two types resolve through one shared mapping
    pub fn shares_mapping(&self, a: &str, b: &str) -> bool {
        match (self.by_type.get(a), self.by_type.get(b)) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

fn predicate_for(owner: &TypeDefinition, field: &FieldDefinition) -> String {
    if field.is_identifier() {
        return UID_SELECTOR.to_string();
    }
    match &field.dgraph_pred {
        Some(predicate) => predicate.clone(),
        None => format!("{}.{}", owner.dgraph_name(), field.name),
    }
}

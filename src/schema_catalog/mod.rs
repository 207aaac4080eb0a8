pub mod config;
pub mod errors;
pub mod predicate_map;
pub mod registry;
pub mod schema;
pub mod type_ref;

pub use config::{FieldDefinitionConfig, SchemaConfig, TypeDefinitionConfig, TypeKind};
pub use errors::SchemaError;
pub use predicate_map::PredicateMap;
pub use registry::{global_schema_registry, initialize_global_schema, SchemaRegistry};
pub use schema::{
    FieldDefinition, MutationKind, MutationOperation, QueryKind, QueryOperation, Schema,
    TypeDefinition, TypeOrigin,
};
pub use type_ref::TypeRef;

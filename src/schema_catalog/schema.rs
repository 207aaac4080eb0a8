use std::collections::{HashMap, HashSet};

use super::config::{SchemaConfig, TypeDefinitionConfig, TypeKind};
use super::errors::SchemaError;
use super::predicate_map::PredicateMap;
use super::type_ref::TypeRef;

/// Named type of the designated node-identifier field.
pub const ID_TYPE: &str = "ID";
/// The engine's built-in node-identifier selector.
pub const UID_SELECTOR: &str = "uid";
/// Predicate holding a node's type names.
pub const DGRAPH_TYPE_PREDICATE: &str = "dgraph.type";
pub const TYPENAME_FIELD: &str = "__typename";
pub const QUERY_TYPE: &str = "Query";
pub const MUTATION_TYPE: &str = "Mutation";

const BUILTIN_SCALARS: [&str; 7] = ["ID", "String", "Int", "Int64", "Float", "Boolean", "DateTime"];

/// Where a compiled type came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeOrigin {
    /// Written in the schema definition
    Declared,
    /// Generated result type of an add/update/delete mutation over `base`
    Payload { base: String, mutation: MutationKind },
    /// Generated `Query` / `Mutation` root type
    Root,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Add,
    Update,
    Delete,
}

impl MutationKind {
    fn prefix(self) -> &'static str {
        match self {
            MutationKind::Add => "Add",
            MutationKind::Update => "Update",
            MutationKind::Delete => "Delete",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    /// `get<T>(id: ID!)`: a single node by identifier
    Get,
    /// `query<T>(filter, order, first, offset)`: all nodes of a type
    Query,
}

/// A generated root query field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOperation {
    pub kind: QueryKind,
    pub type_name: String,
}

/// A generated root mutation field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationOperation {
    pub kind: MutationKind,
    pub type_name: String,
    pub payload_type: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDefinition {
    pub name: String,
    pub type_ref: TypeRef,
    pub dgraph_pred: Option<String>,
    /// The type that declared this field; differs from the owning type for
    /// fields inherited from an interface
    pub declared_in: String,
}

impl FieldDefinition {
    /// Whether this is the designated identifier field, selected as `uid`.
    /// A list of IDs is an ordinary field.
    pub fn is_identifier(&self) -> bool {
        !self.type_ref.is_list() && self.type_ref.named_type() == ID_TYPE
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeDefinition {
    pub name: String,
    pub kind: TypeKind,
    pub origin: TypeOrigin,
    pub dgraph_type: Option<String>,
    pub implements: Vec<String>,
    pub fields: Vec<FieldDefinition>,
    pub enum_values: Vec<String>,
}

impl TypeDefinition {
    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Name the engine knows this type by: the type-level rename if any
    pub fn dgraph_name(&self) -> &str {
        self.dgraph_type.as_deref().unwrap_or(&self.name)
    }

    pub fn is_interface(&self) -> bool {
        self.kind == TypeKind::Interface
    }
}

/// A compiled GraphQL schema. Immutable once built; share it behind an `Arc`.
#[derive(Debug, Clone)]
pub struct Schema {
    name: Option<String>,
    types: HashMap<String, TypeDefinition>,
    /// Declared type names in declaration order
    declared: Vec<String>,
    queries: HashMap<String, QueryOperation>,
    mutations: HashMap<String, MutationOperation>,
    predicates: PredicateMap,
}

impl Schema {
    pub fn compile(config: &SchemaConfig) -> Result<Schema, SchemaError> {
        let mut types: HashMap<String, TypeDefinition> = HashMap::new();
        let mut declared = Vec::with_capacity(config.types.len());

        for def in &config.types {
            if types.contains_key(&def.name) || BUILTIN_SCALARS.contains(&def.name.as_str()) {
                return Err(SchemaError::DuplicateType {
                    type_name: def.name.clone(),
                });
            }
            types.insert(def.name.clone(), declared_type(def)?);
            declared.push(def.name.clone());
        }

        check_implements(&types, &declared)?;
        complete_interface_fields(&mut types, &declared);
        check_field_types(&types, &declared)?;

        let mut schema = Schema {
            name: config.name.clone(),
            types,
            declared,
            queries: HashMap::new(),
            mutations: HashMap::new(),
            predicates: PredicateMap::default(),
        };
        schema.generate_operations()?;
        schema.predicates = PredicateMap::build(&schema);

        log::debug!(
            "Compiled schema {:?}: {} declared types, {} queries, {} mutations",
            schema.name,
            schema.declared.len(),
            schema.queries.len(),
            schema.mutations.len()
        );
        Ok(schema)
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn get_type(&self, name: &str) -> Option<&TypeDefinition> {
        self.types.get(name)
    }

    pub fn field(&self, type_name: &str, field_name: &str) -> Option<&FieldDefinition> {
        self.types.get(type_name)?.field(field_name)
    }

    /// Declared (non-generated) types, in declaration order
    pub fn declared_types(&self) -> impl Iterator<Item = &TypeDefinition> {
        self.declared.iter().filter_map(|name| self.types.get(name))
    }

    /// All compiled types, generated ones included, in no particular order
    pub fn all_types(&self) -> impl Iterator<Item = &TypeDefinition> {
        self.types.values()
    }

    /// Object and interface types produce nested blocks; scalars and enums don't
    pub fn is_object_like(&self, type_name: &str) -> bool {
        self.types
            .get(type_name)
            .is_some_and(|t| matches!(t.kind, TypeKind::Object | TypeKind::Interface))
    }

    pub fn is_interface(&self, type_name: &str) -> bool {
        self.types.get(type_name).is_some_and(|t| t.is_interface())
    }

    pub fn query(&self, field_name: &str) -> Option<&QueryOperation> {
        self.queries.get(field_name)
    }

    pub fn mutation(&self, field_name: &str) -> Option<&MutationOperation> {
        self.mutations.get(field_name)
    }

    pub fn predicates(&self) -> &PredicateMap {
        &self.predicates
    }

    /// Generate the `Query` and `Mutation` root types and the per-type
    /// mutation payload types.
    fn generate_operations(&mut self) -> Result<(), SchemaError> {
        let mut query_fields = Vec::new();
        let mut mutation_fields = Vec::new();
        let mut generated = Vec::new();

        for name in &self.declared {
            let def = &self.types[name];
            if def.kind == TypeKind::Enum {
                continue;
            }

            let get = format!("get{}", name);
            let query = format!("query{}", name);
            query_fields.push(generated_field(&get, TypeRef::named(name.as_str()), QUERY_TYPE));
            query_fields.push(generated_field(
                &query,
                TypeRef::list_of(TypeRef::named(name.as_str())),
                QUERY_TYPE,
            ));
            self.queries.insert(
                get,
                QueryOperation {
                    kind: QueryKind::Get,
                    type_name: name.clone(),
                },
            );
            self.queries.insert(
                query,
                QueryOperation {
                    kind: QueryKind::Query,
                    type_name: name.clone(),
                },
            );

            let kinds: &[MutationKind] = if def.is_interface() {
                &[MutationKind::Update, MutationKind::Delete]
            } else {
                &[MutationKind::Add, MutationKind::Update, MutationKind::Delete]
            };
            for kind in kinds {
                let payload = payload_type(name, *kind);
                let mutation_name = format!("{}{}", kind.prefix().to_lowercase(), name);
                mutation_fields.push(generated_field(
                    &mutation_name,
                    TypeRef::named(payload.name.as_str()),
                    MUTATION_TYPE,
                ));
                self.mutations.insert(
                    mutation_name,
                    MutationOperation {
                        kind: *kind,
                        type_name: name.clone(),
                        payload_type: payload.name.clone(),
                    },
                );
                generated.push(payload);
            }
        }

        generated.push(root_type(QUERY_TYPE, query_fields));
        generated.push(root_type(MUTATION_TYPE, mutation_fields));

        for def in generated {
            if self.types.contains_key(&def.name) {
                return Err(SchemaError::GeneratedNameCollision { name: def.name });
            }
            self.types.insert(def.name.clone(), def);
        }
        Ok(())
    }
}

fn declared_type(def: &TypeDefinitionConfig) -> Result<TypeDefinition, SchemaError> {
    if def.kind == TypeKind::Interface && !def.implements.is_empty() {
        return Err(SchemaError::InvalidDefinition {
            type_name: def.name.clone(),
            message: "interfaces cannot implement other interfaces".to_string(),
        });
    }

    let mut seen = HashSet::new();
    let mut fields = Vec::with_capacity(def.fields.len());
    for field in &def.fields {
        if def.kind == TypeKind::Enum {
            return Err(SchemaError::field_error_with_context(
                &def.name,
                &field.name,
                "enum types cannot declare fields",
            ));
        }
        if !seen.insert(field.name.as_str()) {
            return Err(SchemaError::DuplicateField {
                type_name: def.name.clone(),
                field: field.name.clone(),
            });
        }
        fields.push(FieldDefinition {
            name: field.name.clone(),
            type_ref: TypeRef::parse(&field.type_ref)?,
            dgraph_pred: field.dgraph_pred.clone(),
            declared_in: def.name.clone(),
        });
    }

    Ok(TypeDefinition {
        name: def.name.clone(),
        kind: def.kind,
        origin: TypeOrigin::Declared,
        dgraph_type: def.dgraph_type.clone(),
        implements: def.implements.clone(),
        fields,
        enum_values: def.values.clone(),
    })
}

fn check_implements(
    types: &HashMap<String, TypeDefinition>,
    declared: &[String],
) -> Result<(), SchemaError> {
    for name in declared {
        for interface in &types[name].implements {
            match types.get(interface) {
                None => {
                    return Err(SchemaError::UnknownInterface {
                        type_name: name.clone(),
                        interface: interface.clone(),
                    })
                }
                Some(def) if !def.is_interface() => {
                    return Err(SchemaError::NotAnInterface {
                        type_name: name.clone(),
                        interface: interface.clone(),
                    })
                }
                Some(_) => {}
            }
        }
    }
    Ok(())
}

/// Give every implementing type the fields of its interfaces. Inherited fields
/// come first and keep the interface as `declared_in`, even when the object
/// repeats them.
fn complete_interface_fields(types: &mut HashMap<String, TypeDefinition>, declared: &[String]) {
    for name in declared {
        if types[name].implements.is_empty() {
            continue;
        }

        let mut inherited: Vec<FieldDefinition> = Vec::new();
        for interface in &types[name].implements {
            for field in &types[interface].fields {
                if inherited.iter().all(|f| f.name != field.name) {
                    inherited.push(field.clone());
                }
            }
        }

        if let Some(def) = types.get_mut(name) {
            let own = std::mem::take(&mut def.fields);
            def.fields = inherited;
            for field in own {
                if def.fields.iter().all(|f| f.name != field.name) {
                    def.fields.push(field);
                }
            }
        }
    }
}

fn check_field_types(
    types: &HashMap<String, TypeDefinition>,
    declared: &[String],
) -> Result<(), SchemaError> {
    for name in declared {
        for field in &types[name].fields {
            let named = field.type_ref.named_type();
            if !BUILTIN_SCALARS.contains(&named) && !types.contains_key(named) {
                return Err(SchemaError::UnknownFieldType {
                    type_name: name.clone(),
                    field: field.name.clone(),
                    field_type: named.to_string(),
                });
            }
        }
    }
    Ok(())
}

fn generated_field(name: &str, type_ref: TypeRef, declared_in: &str) -> FieldDefinition {
    FieldDefinition {
        name: name.to_string(),
        type_ref,
        dgraph_pred: None,
        declared_in: declared_in.to_string(),
    }
}

fn root_type(name: &str, fields: Vec<FieldDefinition>) -> TypeDefinition {
    TypeDefinition {
        name: name.to_string(),
        kind: TypeKind::Object,
        origin: TypeOrigin::Root,
        dgraph_type: None,
        implements: Vec::new(),
        fields,
        enum_values: Vec::new(),
    }
}

/// `Post` -> `post`
fn lower_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn payload_type(base: &str, mutation: MutationKind) -> TypeDefinition {
    let name = format!("{}{}Payload", mutation.prefix(), base);
    let mut fields = vec![
        generated_field(
            &lower_first(base),
            TypeRef::list_of(TypeRef::named(base)),
            &name,
        ),
        generated_field("numUids", TypeRef::named("Int"), &name),
    ];
    if mutation == MutationKind::Delete {
        fields.push(generated_field("msg", TypeRef::named("String"), &name));
    }

    TypeDefinition {
        name,
        kind: TypeKind::Object,
        origin: TypeOrigin::Payload {
            base: base.to_string(),
            mutation,
        },
        dgraph_type: None,
        implements: Vec::new(),
        fields,
        enum_values: Vec::new(),
    }
}

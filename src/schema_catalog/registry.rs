use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use super::errors::SchemaError;
use super::schema::Schema;

/// Process-wide registry, published once at startup
pub static GLOBAL_SCHEMA_REGISTRY: OnceLock<SchemaRegistry> = OnceLock::new();

/// Holds the schema new rewrites should use.
///
/// Readers take a cheap `Arc` clone and drop the lock straight away, so a
/// reload never waits for rewrites to finish and never changes a schema that
/// one of them is still using.
#[derive(Debug)]
pub struct SchemaRegistry {
    current: RwLock<Arc<Schema>>,
}

impl SchemaRegistry {
    pub fn new(schema: Schema) -> Self {
        SchemaRegistry {
            current: RwLock::new(Arc::new(schema)),
        }
    }

    /// Snapshot of the schema currently published
    pub fn current(&self) -> Arc<Schema> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&*guard)
    }

    /// Swap in a freshly compiled schema and return the one it replaces.
    pub fn publish(&self, schema: Schema) -> Arc<Schema> {
        let next = Arc::new(schema);
        log::info!(
            "Publishing schema {:?} ({} declared types)",
            next.name(),
            next.declared_types().count()
        );
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, next)
    }
}

/// Publish the process-wide registry. Fails if it was already initialized.
pub fn initialize_global_schema(schema: Schema) -> Result<(), SchemaError> {
    GLOBAL_SCHEMA_REGISTRY
        .set(SchemaRegistry::new(schema))
        .map_err(|_| SchemaError::AlreadyInitialized)
}

pub fn global_schema_registry() -> Option<&'static SchemaRegistry> {
    GLOBAL_SCHEMA_REGISTRY.get()
}

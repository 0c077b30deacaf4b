//! Fixed-capacity schema registry.
//!
//! Schemas are registered once at boot and live for the lifetime of the
//! runtime. Lookup is a linear scan by name: the table holds at most
//! [`MAX_SCHEMAS`] entries, so hashing buys nothing.

use heapless::Vec;
use log::{debug, warn};

use super::ObjectSchema;

/// Maximum number of registered schemas.
pub const MAX_SCHEMAS: usize = 32;

/// Name-keyed table of [`ObjectSchema`]s.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    schemas: Vec<ObjectSchema, MAX_SCHEMAS>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self { schemas: Vec::new() }
    }

    /// Insert or replace the schema with the same name.
    ///
    /// When the table is full a new name is dropped; the caller is not told.
    pub fn register(&mut self, schema: ObjectSchema) {
        if let Some(existing) = self.schemas.iter_mut().find(|s| s.name() == schema.name()) {
            debug!("registry: replacing schema '{}'", schema.name());
            *existing = schema;
            return;
        }
        let name = schema.name();
        if self.schemas.push(schema).is_err() {
            warn!(
                "registry: capacity {} reached, schema '{}' dropped",
                MAX_SCHEMAS, name
            );
        }
    }

    pub fn exists(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&ObjectSchema> {
        self.schemas.iter().find(|s| s.name() == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ObjectSchema> {
        self.schemas.iter()
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

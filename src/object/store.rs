//! Object store: lazily materialised generic state per schema-backed object,
//! plus the typed-record bindings used to mirror it.

use std::collections::HashMap;

use log::{debug, warn};

use super::codec;
use super::record::RecordBinding;
use super::value::{FieldMap, Value};
use crate::schema::{ObjectSchema, SchemaRegistry};

/// Canonical externally-visible value of one object.
///
/// The key set is fixed at creation to the schema's field names.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectState {
    fields: FieldMap,
}

impl ObjectState {
    /// Every field of `schema` at its type default, in schema order.
    pub fn from_schema(schema: &ObjectSchema) -> Self {
        Self {
            fields: schema
                .fields()
                .iter()
                .map(|f| (f.name(), f.field_type().default_value()))
                .collect(),
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Overwrite an existing field. Returns the interned field name, or
    /// `None` when the state has no such key.
    pub fn set(&mut self, field: &str, value: Value) -> Option<&'static str> {
        let name = self.fields.keys().find(|k| *k == field)?;
        if let Some(slot) = self.fields.get_mut(name) {
            *slot = value;
        }
        Some(name)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains(field)
    }

    pub fn fields(&self) -> &FieldMap {
        &self.fields
    }

    /// Full field set for a `get` response.
    ///
    /// With a schema: schema order, schema defaults for any missing key.
    /// Without one: the state verbatim.
    pub fn snapshot(&self, schema: Option<&ObjectSchema>) -> FieldMap {
        let Some(schema) = schema else {
            return self.fields.clone();
        };
        schema
            .fields()
            .iter()
            .map(|f| {
                let value = self
                    .fields
                    .get(f.name())
                    .cloned()
                    .unwrap_or_else(|| f.field_type().default_value());
                (f.name(), value)
            })
            .collect()
    }
}

/// All materialised object states and typed-record bindings.
#[derive(Debug, Default)]
pub struct ObjectStore {
    states: HashMap<&'static str, ObjectState>,
    bindings: HashMap<&'static str, RecordBinding>,
}

impl ObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Existing state for `name`, or a freshly defaulted one when a schema
    /// is registered. Never creates state for an unknown name.
    pub fn ensure(&mut self, registry: &SchemaRegistry, name: &str) -> Option<&mut ObjectState> {
        if !self.states.contains_key(name) {
            let schema = registry.get(name)?;
            debug!("store: materialising '{}'", schema.name());
            self.states.insert(schema.name(), ObjectState::from_schema(schema));
        }
        self.states.get_mut(name)
    }

    pub fn get(&self, name: &str) -> Option<&ObjectState> {
        self.states.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut ObjectState> {
        self.states.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.states.contains_key(name)
    }

    /// Attach (or replace) the typed record mirrored by `name`.
    pub fn bind(&mut self, name: &'static str, binding: RecordBinding) {
        if self.bindings.insert(name, binding).is_some() {
            debug!("store: rebinding record for '{}'", name);
        }
    }

    pub fn binding(&self, name: &str) -> Option<&RecordBinding> {
        self.bindings.get(name)
    }

    /// Copy every resolvable field from the typed record into state,
    /// materialising the state first. Returns the number of fields read, or
    /// `None` when no schema is registered.
    pub fn sync_from_typed(&mut self, registry: &SchemaRegistry, name: &str) -> Option<usize> {
        let schema = registry.get(name)?;
        let binding = self.bindings.get(name).copied();
        let state = self.ensure(registry, name)?;

        let mut read = 0;
        for field in schema.fields() {
            let Some(ptr) = field.location().and_then(|l| l.resolve(binding.as_ref())) else {
                continue;
            };
            // SAFETY: located descriptors are only constructible through the
            // unsafe `FieldDescriptor` constructors, whose contract makes
            // `ptr` a live, aligned value of the declared native type; a
            // resolved offset has a binding of the declared record type.
            let value = unsafe { codec::read(ptr, field.field_type()) };
            state.set(field.name(), value);
            read += 1;
        }
        Some(read)
    }

    /// Write the fields in `partial` that have a resolvable location into
    /// the typed record. Returns the number of fields written.
    pub fn sync_to_typed(&self, registry: &SchemaRegistry, name: &str, partial: &FieldMap) -> usize {
        let Some(schema) = registry.get(name) else {
            return 0;
        };
        let binding = self.bindings.get(name);

        let mut written = 0;
        for (key, value) in partial.iter() {
            let Some(field) = schema.field(key) else {
                continue;
            };
            let Some(ptr) = field.location().and_then(|l| l.resolve(binding)) else {
                continue;
            };
            // SAFETY: as in `sync_from_typed`.
            if unsafe { codec::write(ptr, field.field_type(), value) } {
                written += 1;
            } else {
                warn!(
                    "store: '{}.{}' expects {}, typed record left unchanged",
                    name,
                    key,
                    field.field_type().as_str()
                );
            }
        }
        written
    }
}

//! The object runtime: one long-lived context owning the schema registry,
//! object store, subscription table and tick emitter.
//!
//! Protocol handling lives in [`crate::protocol::dispatcher`] as a second
//! `impl ObjectRuntime` block; this module holds construction and the entry
//! points application code calls directly.

use log::{debug, info};

use crate::config::RuntimeConfig;
use crate::object::{FieldMap, ObjectStore, RecordBinding, RecordCell, Value};
use crate::ports::MessageSink;
use crate::protocol::Outbound;
use crate::schema::{ObjectSchema, SchemaRegistry};
use crate::subscription::SubscriptionTable;
use crate::tick::TickEmitter;

#[derive(Debug)]
pub struct ObjectRuntime {
    pub(crate) registry: SchemaRegistry,
    pub(crate) store: ObjectStore,
    pub(crate) subscriptions: SubscriptionTable,
    pub(crate) tick: TickEmitter,
}

impl Default for ObjectRuntime {
    fn default() -> Self {
        Self::new(&RuntimeConfig::default())
    }
}

impl ObjectRuntime {
    pub fn new(config: &RuntimeConfig) -> Self {
        Self {
            registry: SchemaRegistry::new(),
            store: ObjectStore::new(),
            subscriptions: SubscriptionTable::new(),
            tick: TickEmitter::new(config.tick_interval_ms, config.max_updates_per_tick),
        }
    }

    // ── Boot-time registration ───────────────────────────────

    /// Register (or replace) a schema.
    pub fn register_schema(&mut self, schema: ObjectSchema) {
        info!(
            "runtime: schema '{}' ({} fields)",
            schema.name(),
            schema.fields().len()
        );
        self.registry.register(schema);
    }

    /// Attach the typed record mirrored by `name`. Needed only for fields
    /// located by offset.
    pub fn bind_record<T: 'static>(&mut self, name: &'static str, cell: &'static RecordCell<T>) {
        self.store.bind(name, RecordBinding::of(cell));
    }

    pub fn set_max_updates_per_tick(&mut self, n: usize) {
        self.tick.set_max_per_tick(n);
    }

    // ── Application entry points ─────────────────────────────

    /// Copy the typed record into state and, when the object is subscribed
    /// and subscribable, emit its full field set as an `update`.
    ///
    /// Returns `false` when no schema is registered for `name`.
    pub fn push_record(&mut self, name: &str, sink: &mut dyn MessageSink) -> bool {
        if self.store.sync_from_typed(&self.registry, name).is_none() {
            debug!("runtime: push for unknown object '{}'", name);
            return false;
        }
        if self.updates_enabled(name) {
            if let Some(state) = self.store.get(name) {
                sink.send(&Outbound::Update {
                    path: name.into(),
                    changes: state.fields().clone(),
                });
            }
        }
        true
    }

    /// Set one numeric field, emit a one-field `update` when gated, then
    /// mirror the field into the typed record.
    ///
    /// Returns `false` when the object cannot be materialised or has no such
    /// field.
    pub fn set_field_number(
        &mut self,
        path: &str,
        field: &str,
        value: f64,
        sink: &mut dyn MessageSink,
    ) -> bool {
        let Some(state) = self.store.ensure(&self.registry, path) else {
            return false;
        };
        let Some(key) = state.set(field, Value::Number(value)) else {
            debug!("runtime: '{}' has no field '{}'", path, field);
            return false;
        };
        let changes: FieldMap = [(key, Value::Number(value))].into_iter().collect();
        if self.updates_enabled(path) {
            sink.send(&Outbound::Update {
                path: path.into(),
                changes: changes.clone(),
            });
        }
        self.store.sync_to_typed(&self.registry, path, &changes);
        true
    }

    /// Run the tick emitter. Returns the number of `update`s emitted.
    pub fn tick(&mut self, now_ms: u64, sink: &mut dyn MessageSink) -> usize {
        self.tick
            .run(now_ms, &self.registry, &self.store, &self.subscriptions, sink)
    }

    // ── Accessors ────────────────────────────────────────────

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    pub fn store(&self) -> &ObjectStore {
        &self.store
    }

    pub fn subscriptions(&self) -> &SubscriptionTable {
        &self.subscriptions
    }

    /// Current value of one field, if the object is materialised.
    pub fn field(&self, path: &str, field: &str) -> Option<&Value> {
        self.store.get(path)?.get(field)
    }

    /// Unsolicited updates go out only for a subscribed object whose schema
    /// (if any) is subscribable.
    pub(crate) fn updates_enabled(&self, path: &str) -> bool {
        self.subscriptions.is_subscribed(path)
            && self
                .registry
                .get(path)
                .is_none_or(ObjectSchema::is_subscribable)
    }
}

//! Protocol dispatcher: one inbound line in, zero or more messages out.
//!
//! | request       | emits                                                 |
//! |---------------|-------------------------------------------------------|
//! | `discover`    | `discover.response`                                   |
//! | `get`         | `state`                                               |
//! | `subscribe`   | `subscribe.response`, then `state` on success         |
//! | `unsubscribe` | `unsubscribe.response`                                |
//! | `set`         | gated `update` (if anything applied), `set.response`  |
//! | `delete`      | gated `update`, then `state` (only if field exists)   |
//!
//! "Gated" means: the object is subscribed and its schema is subscribable.
//! Anything unparsable is dropped without a response.

use log::{debug, info};
use serde_json::Value as Json;

use super::message::{Command, Outbound, Request, SchemaInfo, StateMeta};
use crate::error::ProtocolError;
use crate::object::{FieldMap, Value};
use crate::ports::MessageSink;
use crate::runtime::ObjectRuntime;

impl ObjectRuntime {
    /// Handle one inbound line (without its terminator).
    ///
    /// Returns `false` when the line was dropped as malformed.
    pub fn handle_line(&mut self, line: &str, sink: &mut dyn MessageSink) -> bool {
        let Some(request) = Request::parse(line) else {
            debug!("dispatch: dropped line ({} bytes)", line.len());
            return false;
        };
        self.dispatch(request, sink);
        true
    }

    /// Handle one parsed request.
    pub fn dispatch(&mut self, request: Request, sink: &mut dyn MessageSink) {
        let Request { id, path, command } = request;
        match command {
            Command::Discover => self.handle_discover(id, path, sink),
            Command::Get => self.handle_get(id, path, sink),
            Command::Subscribe => self.handle_subscribe(id, path, sink),
            Command::Unsubscribe => self.handle_unsubscribe(id, path, sink),
            Command::Set(changes) => self.handle_set(id, path, &changes, sink),
            Command::Delete(field) => self.handle_delete(&path, &field, sink),
        }
    }

    fn handle_discover(&mut self, id: Option<Json>, path: String, sink: &mut dyn MessageSink) {
        let schema = self
            .registry
            .get(&path)
            .filter(|s| s.is_discoverable())
            .map(|s| SchemaInfo::describe(s, self.subscriptions.count(&path)));
        debug!("dispatch: discover '{}' found={}", path, schema.is_some());
        sink.send(&Outbound::Discover {
            id,
            found: schema.is_some(),
            schema,
        });
    }

    fn handle_get(&mut self, id: Option<Json>, path: String, sink: &mut dyn MessageSink) {
        let reply = match self.store.get(&path) {
            Some(state) => {
                let schema = self.registry.get(&path);
                Outbound::State {
                    id,
                    value: Some(state.snapshot(schema)),
                    meta: Some(StateMeta::new(self.subscriptions.count(&path), schema)),
                    error: None,
                    path,
                }
            }
            None => Outbound::State {
                id,
                path,
                value: None,
                meta: None,
                error: Some(ProtocolError::NotFound),
            },
        };
        sink.send(&reply);
    }

    fn handle_subscribe(&mut self, id: Option<Json>, path: String, sink: &mut dyn MessageSink) {
        match self
            .subscriptions
            .subscribe(&self.registry, &mut self.store, &path)
        {
            Ok(()) => {
                let count = self.subscriptions.count(&path);
                sink.send(&Outbound::Subscribe {
                    id,
                    path: path.clone(),
                    subscriber_count: Some(count),
                    subscribed: Some(count > 0),
                    error: None,
                });
                let follow_up = Some(Json::String(format!("get-{path}")));
                self.handle_get(follow_up, path, sink);
            }
            Err(error) => {
                info!("dispatch: subscribe '{}' refused: {}", path, error);
                sink.send(&Outbound::Subscribe {
                    id,
                    path,
                    subscriber_count: None,
                    subscribed: None,
                    error: Some(error),
                });
            }
        }
    }

    fn handle_unsubscribe(&mut self, id: Option<Json>, path: String, sink: &mut dyn MessageSink) {
        self.subscriptions.unsubscribe(&path);
        let count = self.subscriptions.count(&path);
        sink.send(&Outbound::Unsubscribe {
            id,
            path,
            subscriber_count: count,
            subscribed: count > 0,
            removed: true,
        });
    }

    fn handle_set(
        &mut self,
        id: Option<Json>,
        path: String,
        changes: &[(String, Json)],
        sink: &mut dyn MessageSink,
    ) {
        if self.registry.get(&path).is_some_and(|s| s.is_read_only()) {
            sink.send(&Outbound::Set {
                id,
                path,
                error: Some(ProtocolError::ReadOnly),
            });
            return;
        }
        let Some(state) = self.store.ensure(&self.registry, &path) else {
            sink.send(&Outbound::Set {
                id,
                path,
                error: Some(ProtocolError::NotFound),
            });
            return;
        };

        let mut applied = FieldMap::new();
        for (key, raw) in changes {
            let Some(value) = Value::from_json(raw) else {
                debug!("dispatch: set '{}.{}' ignored, not a scalar", path, key);
                continue;
            };
            match state.set(key, value.clone()) {
                Some(name) => applied.insert(name, value),
                None => debug!("dispatch: set '{}' has no field '{}'", path, key),
            }
        }
        self.store.sync_to_typed(&self.registry, &path, &applied);

        if !applied.is_empty() && self.updates_enabled(&path) {
            sink.send(&Outbound::Update {
                path: path.clone(),
                changes: applied,
            });
        }
        sink.send(&Outbound::Set {
            id,
            path,
            error: None,
        });
    }

    fn handle_delete(&mut self, path: &str, field: &str, sink: &mut dyn MessageSink) {
        let Some(state) = self.store.get_mut(path) else {
            debug!("dispatch: delete on unmaterialised '{}'", path);
            return;
        };
        let Some(name) = state.set(field, Value::deleted()) else {
            debug!("dispatch: delete '{}' has no field '{}'", path, field);
            return;
        };

        if self.updates_enabled(path) {
            let changes: FieldMap = [(name, Value::deleted())].into_iter().collect();
            sink.send(&Outbound::Update {
                path: path.into(),
                changes,
            });
        }
        let value = self.store.get(path).map(|s| s.fields().clone());
        sink.send(&Outbound::State {
            id: None,
            path: path.into(),
            value,
            meta: None,
            error: None,
        });
    }
}

//! Subscription table.
//!
//! Membership only: an object name is either subscribed or not, however
//! many times a client asks. `subscriber_count` on the wire is therefore
//! always 0 or 1.

use std::collections::BTreeSet;

use log::info;

use crate::error::ProtocolError;
use crate::object::ObjectStore;
use crate::schema::SchemaRegistry;

#[derive(Debug, Default)]
pub struct SubscriptionTable {
    names: BTreeSet<&'static str>,
}

impl SubscriptionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and record a subscription.
    ///
    /// Checks run in order: schema exists, is discoverable, is subscribable.
    /// On success the object's state is materialised if it was not yet.
    pub fn subscribe(
        &mut self,
        registry: &SchemaRegistry,
        store: &mut ObjectStore,
        name: &str,
    ) -> Result<(), ProtocolError> {
        let schema = registry.get(name).ok_or(ProtocolError::NotFound)?;
        if !schema.is_discoverable() {
            return Err(ProtocolError::NotDiscoverable);
        }
        if !schema.is_subscribable() {
            return Err(ProtocolError::NotSubscribable);
        }
        if store.ensure(registry, name).is_none() {
            return Err(ProtocolError::NotFound);
        }
        if self.names.insert(schema.name()) {
            info!("subscriptions: '{}' subscribed", name);
        }
        Ok(())
    }

    /// Remove `name`. Removing a non-member is not an error.
    pub fn unsubscribe(&mut self, name: &str) {
        if self.names.remove(name) {
            info!("subscriptions: '{}' unsubscribed", name);
        }
    }

    pub fn count(&self, name: &str) -> u8 {
        u8::from(self.is_subscribed(name))
    }

    pub fn is_subscribed(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Subscribed names in lexical order.
    pub fn iter(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.names.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

//! Tick emitter: periodic full-state `update`s for subscribed objects.
//!
//! Paced by an interval gate: a pass runs only when strictly more than
//! `interval_ms` have elapsed since the previous emitting pass; the very
//! first call always runs. Each pass emits for at most `max_per_tick`
//! objects, walking the subscription table in its own order. Objects cut
//! off by the bound wait for a later pass.

use log::debug;

use crate::object::ObjectStore;
use crate::ports::MessageSink;
use crate::protocol::Outbound;
use crate::schema::SchemaRegistry;
use crate::subscription::SubscriptionTable;

/// Default minimum spacing between emitting passes.
pub const DEFAULT_INTERVAL_MS: u32 = 500;

/// Default per-pass fan-out bound.
pub const DEFAULT_MAX_PER_TICK: usize = 5;

#[derive(Debug, Clone)]
pub struct TickEmitter {
    interval_ms: u32,
    max_per_tick: usize,
    last_emit_ms: Option<u64>,
}

impl Default for TickEmitter {
    fn default() -> Self {
        Self::new(DEFAULT_INTERVAL_MS, DEFAULT_MAX_PER_TICK)
    }
}

impl TickEmitter {
    pub fn new(interval_ms: u32, max_per_tick: usize) -> Self {
        Self {
            interval_ms,
            max_per_tick,
            last_emit_ms: None,
        }
    }

    pub fn set_max_per_tick(&mut self, n: usize) {
        self.max_per_tick = n;
    }

    pub fn max_per_tick(&self) -> usize {
        self.max_per_tick
    }

    pub fn interval_ms(&self) -> u32 {
        self.interval_ms
    }

    /// Whether a pass at `now_ms` would run.
    pub fn is_due(&self, now_ms: u64) -> bool {
        match self.last_emit_ms {
            None => true,
            Some(last) => now_ms.wrapping_sub(last) > u64::from(self.interval_ms),
        }
    }

    /// Run one pass. Returns the number of `update`s emitted; 0 when the
    /// interval has not yet elapsed.
    pub fn run(
        &mut self,
        now_ms: u64,
        registry: &SchemaRegistry,
        store: &ObjectStore,
        subscriptions: &SubscriptionTable,
        sink: &mut dyn MessageSink,
    ) -> usize {
        if !self.is_due(now_ms) {
            return 0;
        }
        self.last_emit_ms = Some(now_ms);

        let mut sent = 0;
        for name in subscriptions.iter() {
            if sent >= self.max_per_tick {
                break;
            }
            let Some(state) = store.get(name) else {
                continue;
            };
            let schema = registry.get(name);
            if schema.is_some_and(|s| !s.is_subscribable()) {
                continue;
            }
            sink.send(&Outbound::Update {
                path: name.into(),
                changes: state.snapshot(schema),
            });
            sent += 1;
        }
        if sent > 0 {
            debug!("tick: {} update(s) at {} ms", sent, now_ms);
        }
        sent
    }
}

//! Port traits: the boundary between the object runtime and the outside
//! world.
//!
//! ```text
//!            ┌──────────────────────────┐
//!  Request ─▶│      ObjectRuntime       │──▶ MessageSink (responses, updates)
//!            │ registry · store · subs  │
//!            └──────────────────────────┘
//!                         ▲
//!                       Clock (tick emitter pacing)
//! ```
//!
//! The runtime never touches a byte stream directly. Adapters implement
//! these traits for the real serial link; tests implement them with
//! recording mocks.

use crate::protocol::Outbound;

/// Consumer of outbound protocol messages.
///
/// Each call carries exactly one message; an implementation that writes to
/// a byte stream must emit it as one line.
pub trait MessageSink {
    fn send(&mut self, message: &Outbound);
}

/// Collecting sink, handy for tests and for batching.
impl MessageSink for Vec<Outbound> {
    fn send(&mut self, message: &Outbound) {
        self.push(message.clone());
    }
}

/// Monotonic millisecond time source.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

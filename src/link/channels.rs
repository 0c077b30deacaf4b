//! RX hand-off channel between the serial reader thread and the link task.
//!
//! Uses an `embassy-sync` bounded channel so the blocking reader thread and
//! the cooperative link task never share a lock. The channel is owned by
//! the transport (behind an `Arc`) rather than being a `static`, so every
//! transport instance, and every test, gets its own.
//!
//! ```text
//! ┌──────────────┐   RxChunk   ┌──────────────┐
//! │ reader thread│────────────▶│  link task   │
//! │  (blocking)  │             │  (async)     │
//! └──────────────┘             └──────────────┘
//! ```

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use heapless::Vec;

/// Bytes carried per channel slot.
pub const RX_CHUNK_SIZE: usize = 64;

/// Channel depth for inbound chunks.
pub const RX_DEPTH: usize = 16;

/// A run of received bytes, in arrival order.
pub type RxChunk = Vec<u8, RX_CHUNK_SIZE>;

/// Inbound byte channel: reader thread → link task.
pub type RxChannel = Channel<CriticalSectionRawMutex, RxChunk, RX_DEPTH>;

/// Split `data` into channel-sized chunks.
pub fn chunks(data: &[u8]) -> impl Iterator<Item = RxChunk> + '_ {
    data.chunks(RX_CHUNK_SIZE).map(|part| {
        let mut chunk = RxChunk::new();
        // Cannot fail: `part.len() <= RX_CHUNK_SIZE`.
        let _ = chunk.extend_from_slice(part);
        chunk
    })
}

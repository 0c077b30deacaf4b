//! Newline line framer.
//!
//! Wire format:
//! ```text
//! ┌──────────────────────────────┬────┐
//! │ UTF-8 JSON object (N B)      │ \n │   optional \r before \n
//! └──────────────────────────────┴────┘
//! ```
//!
//! The framer accumulates bytes into a fixed buffer and yields complete
//! lines. Two guards keep a noisy link from wedging it:
//!
//! * a line longer than `max_len` is discarded up to its terminator (a
//!   `\r` directly before the `\n` does not count towards the bound);
//! * a partial line is dropped when no byte arrives for `idle_timeout_ms`.

use heapless::Vec;
use log::warn;

/// Hard upper bound for `max_len`; sizes the static buffer.
pub const MAX_LINE_CAPACITY: usize = 4096;

/// Default longest accepted line (bytes, terminator excluded).
pub const DEFAULT_MAX_LINE: usize = 4000;

/// Default idle window after which a partial line is dropped.
pub const DEFAULT_IDLE_TIMEOUT_MS: u32 = 300;

/// Framer state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FramerState {
    /// Collecting bytes of the current line.
    Collecting,
    /// A line was handed out; the buffer is cleared on the next byte.
    Delivered,
    /// Current line overflowed; skipping to the next terminator.
    Discarding,
}

/// Streaming line decoder.
pub struct LineFramer {
    state: FramerState,
    buf: Vec<u8, MAX_LINE_CAPACITY>,
    max_len: usize,
    idle_timeout_ms: u32,
    last_byte_ms: u64,
    /// A `\r` seen but not yet stored; dropped if `\n` follows.
    held_cr: bool,
}

impl Default for LineFramer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LINE, DEFAULT_IDLE_TIMEOUT_MS)
    }
}

impl LineFramer {
    /// `max_len` is clamped to [`MAX_LINE_CAPACITY`].
    pub fn new(max_len: usize, idle_timeout_ms: u32) -> Self {
        Self {
            state: FramerState::Collecting,
            buf: Vec::new(),
            max_len: max_len.min(MAX_LINE_CAPACITY),
            idle_timeout_ms,
            last_byte_ms: 0,
            held_cr: false,
        }
    }

    /// Feed one byte received at `now_ms`.
    ///
    /// Returns `Some(line)` (terminator stripped) when `byte` completes a
    /// non-empty UTF-8 line. The slice is valid until the next call.
    pub fn feed(&mut self, byte: u8, now_ms: u64) -> Option<&str> {
        if self.state == FramerState::Delivered {
            self.reset();
        }
        self.poll_idle(now_ms);
        self.last_byte_ms = now_ms;

        match byte {
            b'\n' => {}
            b'\r' if self.state == FramerState::Collecting => {
                if core::mem::replace(&mut self.held_cr, true) {
                    self.push(b'\r');
                }
                return None;
            }
            _ => {
                if core::mem::take(&mut self.held_cr) {
                    self.push(b'\r');
                }
                self.push(byte);
                return None;
            }
        }

        self.held_cr = false;
        if self.state == FramerState::Discarding {
            self.reset();
            return None;
        }
        self.state = FramerState::Delivered;
        if self.buf.is_empty() {
            return None;
        }
        match core::str::from_utf8(&self.buf) {
            Ok(line) => Some(line),
            Err(_) => {
                warn!("framer: dropped non-UTF-8 line ({} bytes)", self.buf.len());
                None
            }
        }
    }

    fn push(&mut self, byte: u8) {
        match self.state {
            FramerState::Discarding => {}
            _ if self.buf.len() >= self.max_len => {
                warn!("framer: line exceeds {} bytes, discarding", self.max_len);
                self.buf.clear();
                self.state = FramerState::Discarding;
            }
            _ => {
                // Cannot fail: len < max_len <= capacity.
                let _ = self.buf.push(byte);
            }
        }
    }

    /// Drop a partial line that has been idle for longer than the window.
    /// Returns `true` if something was dropped.
    pub fn poll_idle(&mut self, now_ms: u64) -> bool {
        let pending = match self.state {
            FramerState::Collecting => !self.buf.is_empty() || self.held_cr,
            FramerState::Discarding => true,
            FramerState::Delivered => false,
        };
        if pending && now_ms.wrapping_sub(self.last_byte_ms) > u64::from(self.idle_timeout_ms) {
            warn!(
                "framer: dropped partial line ({} bytes) after {} ms idle",
                self.buf.len(),
                self.idle_timeout_ms
            );
            self.reset();
            return true;
        }
        false
    }

    /// Bytes of the line in progress.
    pub fn pending(&self) -> usize {
        match self.state {
            FramerState::Collecting => self.buf.len() + usize::from(self.held_cr),
            _ => 0,
        }
    }

    /// Reset framer state (e.g. after a transport reconnect).
    pub fn reset(&mut self) {
        self.buf.clear();
        self.held_cr = false;
        self.state = FramerState::Collecting;
    }
}

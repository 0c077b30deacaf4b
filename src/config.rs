//! Runtime configuration parameters
//!
//! All tunable parameters for the object runtime and its serial link.
//! Values can be overridden by a JSON overlay (see [`RuntimeConfig::from_json`]).

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Core runtime configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    // --- Tick emitter ---
    /// Minimum spacing between two emitting tick passes (milliseconds)
    pub tick_interval_ms: u32,
    /// Maximum number of subscribed objects pushed per tick pass
    pub max_updates_per_tick: usize,

    // --- Line framer ---
    /// Longest inbound line accepted before the buffer is discarded (bytes)
    pub line_max_len: usize,
    /// Partial line is dropped when no byte arrives for this long (milliseconds)
    pub line_idle_timeout_ms: u32,

    // --- Driver ---
    /// Application publish hook interval (milliseconds)
    pub publish_interval_ms: u32,
    /// Transport RX polling interval (milliseconds)
    pub rx_poll_interval_ms: u32,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            // Tick emitter
            tick_interval_ms: 500,
            max_updates_per_tick: 5,

            // Line framer
            line_max_len: 4000,
            line_idle_timeout_ms: 300,

            // Driver
            publish_interval_ms: 1000, // 1 Hz
            rx_poll_interval_ms: 1,
        }
    }
}

impl RuntimeConfig {
    /// Overlay a JSON document on the defaults. Missing keys keep their
    /// default value.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|_| Error::Config("malformed JSON overlay"))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would stall the link or the emitter.
    pub fn validate(&self) -> Result<()> {
        if self.tick_interval_ms == 0 {
            return Err(Error::Config("tick_interval_ms must be non-zero"));
        }
        if self.max_updates_per_tick == 0 {
            return Err(Error::Config("max_updates_per_tick must be non-zero"));
        }
        if self.line_max_len == 0 || self.line_max_len > crate::link::codec::MAX_LINE_CAPACITY {
            return Err(Error::Config("line_max_len out of range"));
        }
        if self.line_idle_timeout_ms == 0 || self.rx_poll_interval_ms == 0 {
            return Err(Error::Config("link intervals must be non-zero"));
        }
        if self.publish_interval_ms == 0 {
            return Err(Error::Config("publish_interval_ms must be non-zero"));
        }
        Ok(())
    }
}

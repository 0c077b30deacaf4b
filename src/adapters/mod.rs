//! Adapters: concrete implementations of the port traits.
//!
//! | Adapter  | Implements  | Connects to                       |
//! |----------|-------------|-----------------------------------|
//! | `stdio`  | Transport   | console UART / USB-CDC, host pipe |
//! | `time`   | Clock       | ESP32 system timer / `Instant`    |

pub mod stdio;
pub mod time;

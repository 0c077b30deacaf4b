//! DomLink device library.
//!
//! A schema-driven object runtime for a constrained device: named objects
//! described by compile-time schemas are mirrored between application-owned
//! typed records and a generic state, and exposed to a single client over a
//! newline-delimited JSON link (discover / get / set / subscribe /
//! unsubscribe / delete, plus rate-limited push updates).
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     Adapters (outer ring)                    │
//! │   StdioTransport (Transport)      MonotonicClock (Clock)     │
//! │                                                              │
//! │   link: LineFramer · TransportSink · LinkDriver              │
//! │  ─────────────────── Port Trait Boundary ─────────────────   │
//! │  ┌────────────────────────────────────────────────────────┐  │
//! │  │                ObjectRuntime (pure logic)              │  │
//! │  │  SchemaRegistry · ObjectStore · SubscriptionTable      │  │
//! │  │  dispatcher · TickEmitter · field codec                │  │
//! │  └────────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ESP-IDF specific code is guarded by the `espidf` feature.

#![deny(unused_must_use)]

pub mod schema;

pub mod adapters;
pub mod config;
pub mod demo;
pub mod error;
pub mod link;
pub mod object;
pub mod ports;
pub mod protocol;
pub mod runtime;
pub mod subscription;
pub mod tick;

pub use config::RuntimeConfig;
pub use error::{Error, LinkError, ProtocolError, Result};
pub use object::{RecordCell, Value};
pub use ports::{Clock, MessageSink};
pub use protocol::Outbound;
pub use runtime::ObjectRuntime;
pub use schema::{FieldDescriptor, FieldType, ObjectSchema};

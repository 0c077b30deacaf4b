//! Line-JSON protocol: wire shapes and the request dispatcher.

pub mod dispatcher;
pub mod message;

pub use message::{Command, FieldInfo, Outbound, Request, SchemaInfo, StateMeta};

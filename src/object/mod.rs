//! Generic object state and its mirror in application-owned typed records.

pub mod codec;
pub mod record;
pub mod store;
pub mod value;

pub use record::{RecordBinding, RecordCell};
pub use store::{ObjectState, ObjectStore};
pub use value::{DELETED, FieldMap, Value};

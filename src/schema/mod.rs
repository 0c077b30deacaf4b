//! Object schemas: compile-time field layouts bound to a generic state.
//!
//! An [`ObjectSchema`] names an object, lists its fields and carries the
//! three permission hints (`subscribable`, `readOnly`, `discoverable`). Each
//! [`FieldDescriptor`] may carry a [`Location`] telling the field codec where
//! the native value lives inside an application-owned typed record:
//!
//! ```text
//!   FieldDescriptor ──▶ Location::Absolute(ptr)          (address wins)
//!                   └─▶ Location::Offset { offset, T }   (base + offset,
//!                                                          needs a binding
//!                                                          of record type T)
//! ```
//!
//! Descriptors with a location are normally built with [`record_field!`],
//! which derives the [`FieldType`] from the Rust field type at compile time.

pub mod registry;

use core::any::TypeId;
use core::ptr::NonNull;

use log::warn;
use serde::Serialize;

use crate::object::record::{RecordBinding, RecordCell};
use crate::object::value::Value;

pub use registry::{MAX_SCHEMAS, SchemaRegistry};

// ───────────────────────────────────────────────────────────────
// Field types
// ───────────────────────────────────────────────────────────────

/// Declared type of a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Stored natively as a 1-byte `bool`.
    Boolean,
    /// Stored natively as an `f64`.
    Number,
    /// Stored natively as an owned `String`, overwritten in place.
    String,
}

impl FieldType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Number => "number",
            Self::String => "string",
        }
    }

    /// Value a freshly materialised field starts with.
    pub fn default_value(self) -> Value {
        match self {
            Self::Boolean => Value::Bool(false),
            Self::Number => Value::Number(0.0),
            Self::String => Value::Text(String::new()),
        }
    }
}

/// Rust types that can back a schema field.
pub trait NativeField: 'static {
    const TYPE: FieldType;
}

impl NativeField for bool {
    const TYPE: FieldType = FieldType::Boolean;
}

impl NativeField for f64 {
    const TYPE: FieldType = FieldType::Number;
}

impl NativeField for String {
    const TYPE: FieldType = FieldType::String;
}

// ───────────────────────────────────────────────────────────────
// Locations
// ───────────────────────────────────────────────────────────────

/// Where a field's native value lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    /// Fixed address of the field itself.
    Absolute(NonNull<u8>),
    /// Byte offset from the base of a bound record of type `record`.
    Offset { offset: usize, record: TypeId },
}

impl Location {
    /// Resolve to a concrete address.
    ///
    /// `Absolute` always resolves. `Offset` resolves only against a binding
    /// for the same record type.
    pub fn resolve(self, binding: Option<&RecordBinding>) -> Option<NonNull<u8>> {
        match self {
            Self::Absolute(ptr) => Some(ptr),
            Self::Offset { offset, record } => {
                let binding = binding?;
                if binding.record_type() != record {
                    return None;
                }
                NonNull::new(binding.base().as_ptr().wrapping_add(offset))
            }
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Field descriptors
// ───────────────────────────────────────────────────────────────

/// One named, typed field of a schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    name: &'static str,
    field_type: FieldType,
    location: Option<Location>,
}

impl FieldDescriptor {
    /// A state-only field with no backing record memory.
    pub const fn new(name: &'static str, field_type: FieldType) -> Self {
        Self {
            name,
            field_type,
            location: None,
        }
    }

    /// A field backed by native memory.
    ///
    /// # Safety
    ///
    /// For as long as any runtime holds a schema containing this descriptor,
    /// the location must address a live, properly aligned value of the Rust
    /// type `field_type` maps to (see [`NativeField`]) that is only ever
    /// accessed through a [`RecordCell`] or this runtime. For
    /// [`Location::Offset`], that must hold for every record of type
    /// `record` bound under the schema's name.
    pub const unsafe fn with_location(
        name: &'static str,
        field_type: FieldType,
        location: Location,
    ) -> Self {
        Self {
            name,
            field_type,
            location: Some(location),
        }
    }

    #[doc(hidden)]
    /// Used by [`record_field!`].
    ///
    /// # Safety
    ///
    /// `offset` must be the offset of the field `_project` returns.
    pub unsafe fn __from_offset<R: 'static, F: NativeField>(
        name: &'static str,
        offset: usize,
        _project: impl Fn(&R) -> &F,
    ) -> Self {
        let location = Location::Offset {
            offset,
            record: TypeId::of::<R>(),
        };
        // SAFETY: forwarded to the caller; the field type comes from `F`.
        unsafe { Self::with_location(name, F::TYPE, location) }
    }

    #[doc(hidden)]
    /// Used by [`record_field!`].
    ///
    /// # Safety
    ///
    /// `offset` must be the offset of the field `_project` returns.
    pub unsafe fn __from_address<R, F: NativeField>(
        name: &'static str,
        cell: &'static RecordCell<R>,
        offset: usize,
        _project: impl Fn(&R) -> &F,
    ) -> Self {
        let addr = cell.base_ptr().as_ptr().wrapping_add(offset);
        let location = match NonNull::new(addr) {
            Some(ptr) => Location::Absolute(ptr),
            None => return Self::new(name, F::TYPE),
        };
        // SAFETY: the address lies inside a 'static cell and the field type
        // comes from `F`; the offset is the caller's contract.
        unsafe { Self::with_location(name, F::TYPE, location) }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    pub fn location(&self) -> Option<Location> {
        self.location
    }
}

/// Build a [`FieldDescriptor`] for a field of a typed record.
///
/// * `record_field!(Record, field)`: located by offset; resolved against the
///   record bound with [`ObjectRuntime::bind_record`](crate::runtime::ObjectRuntime::bind_record).
/// * `record_field!(at cell => Record, field)`: located by absolute address
///   inside a `&'static RecordCell<Record>`.
///
/// The field type is taken from the Rust type of `field`, which must be
/// `bool`, `f64` or `String`.
#[macro_export]
macro_rules! record_field {
    (at $cell:expr => $record:ty, $field:ident) => {
        // SAFETY: `offset_of!` and the projection name the same field.
        unsafe {
            $crate::schema::FieldDescriptor::__from_address(
                ::core::stringify!($field),
                $cell,
                ::core::mem::offset_of!($record, $field),
                |record: &$record| &record.$field,
            )
        }
    };
    ($record:ty, $field:ident) => {
        // SAFETY: `offset_of!` and the projection name the same field.
        unsafe {
            $crate::schema::FieldDescriptor::__from_offset(
                ::core::stringify!($field),
                ::core::mem::offset_of!($record, $field),
                |record: &$record| &record.$field,
            )
        }
    };
}

// ───────────────────────────────────────────────────────────────
// Object schema
// ───────────────────────────────────────────────────────────────

/// Static descriptor of one object: its fields and permission hints.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectSchema {
    name: &'static str,
    fields: Vec<FieldDescriptor>,
    subscribable: bool,
    read_only: bool,
    discoverable: bool,
}

impl ObjectSchema {
    /// Create a schema with every hint cleared. Later fields reusing a name
    /// already taken are dropped.
    pub fn new(name: &'static str, fields: impl IntoIterator<Item = FieldDescriptor>) -> Self {
        let mut unique: Vec<FieldDescriptor> = Vec::new();
        for field in fields {
            if unique.iter().any(|f| f.name == field.name) {
                warn!("schema '{}': duplicate field '{}' ignored", name, field.name);
                continue;
            }
            unique.push(field);
        }
        Self {
            name,
            fields: unique,
            subscribable: false,
            read_only: false,
            discoverable: false,
        }
    }

    pub fn subscribable(mut self, on: bool) -> Self {
        self.subscribable = on;
        self
    }

    pub fn read_only(mut self, on: bool) -> Self {
        self.read_only = on;
        self
    }

    pub fn discoverable(mut self, on: bool) -> Self {
        self.discoverable = on;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn is_subscribable(&self) -> bool {
        self.subscribable
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn is_discoverable(&self) -> bool {
        self.discoverable
    }
}

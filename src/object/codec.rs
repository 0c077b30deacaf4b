//! Field codec: moves one field between a generic [`Value`] and native
//! record memory.
//!
//! | `FieldType` | native type | on type mismatch |
//! |-------------|-------------|------------------|
//! | `Boolean`   | `bool`      | no-op            |
//! | `Number`    | `f64`       | no-op            |
//! | `String`    | `String`    | no-op            |
//!
//! Strings are overwritten in place (`clear` + `push_str`) so the record
//! keeps its allocation.

use core::ptr::NonNull;

use crate::object::value::Value;
use crate::schema::FieldType;

/// Store `value` at `ptr` as the native type of `field_type`.
///
/// Returns `false` (and leaves memory untouched) when the value's variant
/// does not match the declared type.
///
/// # Safety
///
/// `ptr` must address a live, aligned value of the native type for
/// `field_type`, and no reference to it may be live.
pub unsafe fn write(ptr: NonNull<u8>, field_type: FieldType, value: &Value) -> bool {
    // SAFETY (all arms): the caller guarantees the pointee type and exclusivity.
    match (field_type, value) {
        (FieldType::Boolean, Value::Bool(b)) => {
            unsafe { ptr.cast::<bool>().write(*b) };
            true
        }
        (FieldType::Number, Value::Number(n)) => {
            unsafe { ptr.cast::<f64>().write(*n) };
            true
        }
        (FieldType::String, Value::Text(s)) => {
            let target = unsafe { &mut *ptr.cast::<String>().as_ptr() };
            target.clear();
            target.push_str(s);
            true
        }
        _ => false,
    }
}

/// Read the native value at `ptr` as a generic [`Value`].
///
/// # Safety
///
/// Same contract as [`write`].
pub unsafe fn read(ptr: NonNull<u8>, field_type: FieldType) -> Value {
    // SAFETY (all arms): the caller guarantees the pointee type.
    match field_type {
        FieldType::Boolean => Value::Bool(unsafe { ptr.cast::<bool>().read() }),
        FieldType::Number => Value::Number(unsafe { ptr.cast::<f64>().read() }),
        FieldType::String => Value::Text(unsafe { ptr.cast::<String>().as_ref() }.clone()),
    }
}

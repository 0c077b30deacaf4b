//! Application-owned typed records.
//!
//! A typed record is a plain Rust struct whose `bool`/`f64`/`String` fields
//! mirror an object's generic state. The application keeps it in a
//! `&'static RecordCell<T>`; the runtime only remembers the cell's base
//! address (a [`RecordBinding`]) and reaches individual fields through the
//! field codec.
//!
//! `RecordCell` hands out values, never references, so neither side can hold
//! a borrow across a codec access.

use core::any::TypeId;
use core::cell::UnsafeCell;
use core::fmt;
use core::ptr::NonNull;

/// Interior-mutable home of one typed record.
///
/// Single-threaded like [`core::cell::Cell`]: it is `!Sync`, and every access
/// completes before returning.
pub struct RecordCell<T> {
    value: UnsafeCell<T>,
}

impl<T> RecordCell<T> {
    pub const fn new(value: T) -> Self {
        Self {
            value: UnsafeCell::new(value),
        }
    }

    /// Overwrite the whole record.
    pub fn set(&self, value: T) {
        drop(self.replace(value));
    }

    /// Swap in `value` and return the previous record.
    pub fn replace(&self, value: T) -> T {
        // SAFETY: no reference into the cell outlives a method call and the
        // type is `!Sync`, so this is the only live access.
        unsafe { core::mem::replace(&mut *self.value.get(), value) }
    }

    pub fn into_inner(self) -> T {
        self.value.into_inner()
    }

    pub(crate) fn base_ptr(&self) -> NonNull<u8> {
        // SAFETY: `UnsafeCell::get` never returns null for a live cell.
        unsafe { NonNull::new_unchecked(self.value.get().cast::<u8>()) }
    }
}

impl<T: Copy> RecordCell<T> {
    pub fn get(&self) -> T {
        // SAFETY: see `replace`.
        unsafe { *self.value.get() }
    }
}

impl<T: Default> RecordCell<T> {
    pub fn take(&self) -> T {
        self.replace(T::default())
    }

    /// Mutate the record in place through a temporary owned copy.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        let mut value = self.take();
        f(&mut value);
        self.set(value);
    }
}

impl<T: Clone> RecordCell<T> {
    /// Owned copy of the current record.
    pub fn snapshot(&self) -> T {
        // SAFETY: see `replace`; `clone` cannot reach this cell because
        // nothing hands out references into it.
        unsafe { (*self.value.get()).clone() }
    }
}

impl<T: Default> Default for RecordCell<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> fmt::Debug for RecordCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordCell").finish_non_exhaustive()
    }
}

/// Base address and record type of a bound typed record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordBinding {
    base: NonNull<u8>,
    record: TypeId,
}

impl RecordBinding {
    pub fn of<T: 'static>(cell: &'static RecordCell<T>) -> Self {
        Self {
            base: cell.base_ptr(),
            record: TypeId::of::<T>(),
        }
    }

    pub fn base(&self) -> NonNull<u8> {
        self.base
    }

    pub fn record_type(&self) -> TypeId {
        self.record
    }
}

//! Shared immutable payload wrapper.
//!
//! Every boxed part of a value (the value cell itself, collection trees,
//! headings) lives behind a `Heap<T>`. The constructor is crate-private, so
//! code outside the value core can only obtain payloads through
//! `MemoryPool` factory methods.

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// A reference-counted, immutable payload.
///
/// `#[repr(transparent)]` keeps the layout identical to `Arc<T>`.
#[repr(transparent)]
pub struct Heap<T: ?Sized>(Arc<T>);

impl<T> Heap<T> {
    #[inline]
    pub(crate) fn new(value: T) -> Self {
        Heap(Arc::new(value))
    }

    /// The payload, if this was the last handle to it.
    #[inline]
    pub(crate) fn into_inner(this: Self) -> Option<T> {
        Arc::into_inner(this.0)
    }
}

impl<T: ?Sized> Heap<T> {
    /// Whether both handles point at the same allocation.
    ///
    /// Only ever used as a fast path; two distinct allocations may still
    /// denote the same value.
    #[inline]
    pub(crate) fn ptr_eq(this: &Self, other: &Self) -> bool {
        Arc::ptr_eq(&this.0, &other.0)
    }
}

impl<T: ?Sized> Deref for Heap<T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T: ?Sized> Clone for Heap<T> {
    #[inline]
    fn clone(&self) -> Self {
        Heap(Arc::clone(&self.0))
    }
}

impl<T: ?Sized + fmt::Debug> fmt::Debug for Heap<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        (**self).fmt(f)
    }
}

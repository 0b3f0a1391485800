//! Labeled records, relational pairs and opaque handles.

use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use super::{Repr, Tuple, Value};
use crate::discrete::Discrete;
use crate::value::Heading;

/// A label paired with an attribute tuple. Excuses share this shape.
#[derive(Clone, Debug)]
pub struct Article {
    label: Value,
    attrs: Value,
}

impl Article {
    /// `attrs` must be a Tuple.
    pub(crate) fn new(label: Value, attrs: Value) -> Self {
        debug_assert!(matches!(attrs.repr(), Repr::Tuple(_)));
        Article { label, attrs }
    }

    pub fn label(&self) -> &Value {
        &self.label
    }

    /// The attribute tuple as a value.
    pub fn attrs_value(&self) -> &Value {
        &self.attrs
    }

    pub fn attrs(&self) -> &Tuple {
        match self.attrs.repr() {
            Repr::Tuple(t) => t,
            other => unreachable!("article attributes of kind {}", other.kind()),
        }
    }
}

/// A heading paired with a body whose members are all Tuples of that heading.
#[derive(Clone, Debug)]
pub struct Relational {
    heading: Heading,
    body: Value,
}

impl Relational {
    /// `body` must be an Array, Set or Bag already checked against `heading`.
    pub(crate) fn new(heading: Heading, body: Value) -> Self {
        debug_assert!(body.kind().is_discrete());
        Relational { heading, body }
    }

    pub fn heading(&self) -> &Heading {
        &self.heading
    }

    pub fn body_value(&self) -> &Value {
        &self.body
    }

    pub fn body(&self) -> &Discrete {
        match self.body.as_discrete() {
            Some(d) => d,
            None => unreachable!("relational body of kind {}", self.body.kind()),
        }
    }
}

/// Serials are process-wide, so handles from different pools never share one.
static NEXT_SERIAL: AtomicU64 = AtomicU64::new(1);

/// Instance identity of an opaque handle.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Handle {
    serial: u64,
}

impl Handle {
    /// A handle no other instance in this process holds.
    pub(crate) fn fresh() -> Self {
        Handle {
            serial: NEXT_SERIAL.fetch_add(1, Ordering::Relaxed),
        }
    }

    pub fn serial(self) -> u64 {
        self.serial
    }
}

/// A mutable cell. Equal only to itself, whatever it holds.
#[derive(Debug)]
pub struct Variable {
    handle: Handle,
    current: RwLock<Value>,
}

impl Variable {
    pub(crate) fn new(handle: Handle, initial: Value) -> Self {
        Variable {
            handle,
            current: RwLock::new(initial),
        }
    }

    pub fn handle(&self) -> Handle {
        self.handle
    }

    pub fn current(&self) -> Value {
        self.current.read().clone()
    }

    /// Replace the held value, returning the previous one.
    pub fn assign(&self, value: Value) -> Value {
        std::mem::replace(&mut *self.current.write(), value)
    }
}

/// A reference to something owned outside the value core.
pub struct External {
    handle: Handle,
    payload: Arc<dyn Any + Send + Sync>,
}

impl External {
    pub(crate) fn new(handle: Handle, payload: Arc<dyn Any + Send + Sync>) -> Self {
        External { handle, payload }
    }

    pub fn handle(&self) -> Handle {
        self.handle
    }

    pub fn payload(&self) -> &Arc<dyn Any + Send + Sync> {
        &self.payload
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.payload.downcast_ref::<T>()
    }
}

impl fmt::Debug for External {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("External")
            .field("handle", &self.handle)
            .finish_non_exhaustive()
    }
}

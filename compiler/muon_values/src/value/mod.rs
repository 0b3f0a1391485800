//! Runtime values.
//!
//! # Construction
//!
//! A `Value` is a shared handle to an immutable `Repr`. The constructor is
//! crate-private: code outside the value core obtains values only through
//! `MemoryPool` factory methods, which validate input and intern common
//! values.
//!
//! ```text
//! let pool = MemoryPool::new();
//! let n = pool.integer(42);                  // OK
//! let v = Value::new(Repr::Integer(42.into())); // ERROR: Value::new is pub(crate)
//! ```
//!
//! # Caches
//!
//! Each value carries one memoized field, its identity text. Collection
//! trees carry their own memoized metadata. Filling a cache never changes
//! which value is denoted, so concurrent writers racing on a `OnceLock`
//! store equal results.
//!
//! # Equality and hashing
//!
//! `PartialEq` is the "same value" algorithm and `Hash` hashes the identity
//! text; both are defined here, side by side, so they cannot drift apart.

mod article;
mod fraction;
mod heap;
mod kind;
mod strings;
mod tuple;

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, OnceLock};

use num_bigint::BigInt;

use crate::discrete::Discrete;
use crate::encode::{self, Mode};
use crate::equality;

pub use article::{Article, External, Handle, Relational, Variable};
pub use fraction::{FixedDecimal, Fraction, Ratio};
pub(crate) use heap::Heap;
pub use kind::BaseKind;
pub use strings::{Bits, Blob, Text};
pub(crate) use tuple::NameList;
pub use tuple::{AttrName, Heading, Tuple};

/// Payload of a value, one variant per representation.
///
/// Both booleans share `Boolean`; their base kinds still differ.
#[derive(Debug)]
pub enum Repr {
    Boolean(bool),
    Integer(BigInt),
    Fraction(Fraction),
    Bits(Bits),
    Blob(Blob),
    Text(Text),
    Array(Discrete),
    Set(Discrete),
    Bag(Discrete),
    Heading(Heading),
    Tuple(Tuple),
    TupleArray(Relational),
    Relation(Relational),
    TupleBag(Relational),
    Article(Article),
    Excuse(Article),
    Variable(Variable),
    Process(Handle),
    Stream(Handle),
    External(External),
}

impl Repr {
    pub fn kind(&self) -> BaseKind {
        match self {
            Repr::Boolean(false) => BaseKind::BooleanFalse,
            Repr::Boolean(true) => BaseKind::BooleanTrue,
            Repr::Integer(_) => BaseKind::Integer,
            Repr::Fraction(_) => BaseKind::Fraction,
            Repr::Bits(_) => BaseKind::Bits,
            Repr::Blob(_) => BaseKind::Blob,
            Repr::Text(_) => BaseKind::Text,
            Repr::Array(_) => BaseKind::Array,
            Repr::Set(_) => BaseKind::Set,
            Repr::Bag(_) => BaseKind::Bag,
            Repr::Heading(_) => BaseKind::Heading,
            Repr::Tuple(_) => BaseKind::Tuple,
            Repr::TupleArray(_) => BaseKind::TupleArray,
            Repr::Relation(_) => BaseKind::Relation,
            Repr::TupleBag(_) => BaseKind::TupleBag,
            Repr::Article(_) => BaseKind::Article,
            Repr::Excuse(_) => BaseKind::Excuse,
            Repr::Variable(_) => BaseKind::Variable,
            Repr::Process(_) => BaseKind::Process,
            Repr::Stream(_) => BaseKind::Stream,
            Repr::External(_) => BaseKind::External,
        }
    }
}

struct ValueCell {
    repr: Repr,
    identity: OnceLock<Arc<str>>,
}

/// An immutable MUON value.
#[derive(Clone)]
pub struct Value(Heap<ValueCell>);

impl Value {
    pub(crate) fn new(repr: Repr) -> Self {
        Value(Heap::new(ValueCell {
            repr,
            identity: OnceLock::new(),
        }))
    }

    #[inline]
    pub fn kind(&self) -> BaseKind {
        self.0.repr.kind()
    }

    #[inline]
    pub fn repr(&self) -> &Repr {
        &self.0.repr
    }

    #[inline]
    pub(crate) fn ptr_eq(a: &Value, b: &Value) -> bool {
        Heap::ptr_eq(&a.0, &b.0)
    }

    pub(crate) fn cached_identity(&self) -> Option<&Arc<str>> {
        self.0.identity.get()
    }

    /// Take over `other`'s identity text, if it has one and we do not.
    ///
    /// Callers must already know both values are the same.
    pub(crate) fn adopt_identity(&self, other: &Value) {
        if let Some(text) = other.cached_identity() {
            let _ = self.0.identity.set(Arc::clone(text));
        }
    }

    /// Canonical identity text, computed once and cached.
    ///
    /// Equal values have equal identities. Handles render with their
    /// instance serial, so distinct handles never collide.
    pub fn identity(&self) -> Arc<str> {
        Arc::clone(
            self.0
                .identity
                .get_or_init(|| encode::render(self, Mode::Identity).into()),
        )
    }

    /// Round-trippable literal text. Handles render as an opaque placeholder.
    pub fn export(&self) -> String {
        encode::render(self, Mode::Export)
    }

    /// Debug rendering showing lazy structure. Never fills any cache.
    pub fn preview(&self) -> String {
        encode::render(self, Mode::Preview)
    }

    /// Whether both values denote the same abstract value.
    pub fn same(&self, other: &Value) -> bool {
        equality::same(self, other)
    }

    // Accessors

    /// `Some` for both Boolean kinds.
    pub fn as_bool(&self) -> Option<bool> {
        match self.repr() {
            Repr::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<&BigInt> {
        match self.repr() {
            Repr::Integer(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_fraction(&self) -> Option<&Fraction> {
        match self.repr() {
            Repr::Fraction(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_bits(&self) -> Option<&Bits> {
        match self.repr() {
            Repr::Bits(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_blob(&self) -> Option<&Blob> {
        match self.repr() {
            Repr::Blob(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&Text> {
        match self.repr() {
            Repr::Text(t) => Some(t),
            _ => None,
        }
    }

    /// The collection tree of an Array, Set or Bag.
    pub fn as_discrete(&self) -> Option<&Discrete> {
        match self.repr() {
            Repr::Array(d) | Repr::Set(d) | Repr::Bag(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Discrete> {
        match self.repr() {
            Repr::Array(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_set(&self) -> Option<&Discrete> {
        match self.repr() {
            Repr::Set(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_bag(&self) -> Option<&Discrete> {
        match self.repr() {
            Repr::Bag(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_heading(&self) -> Option<&Heading> {
        match self.repr() {
            Repr::Heading(h) => Some(h),
            _ => None,
        }
    }

    pub fn as_tuple(&self) -> Option<&Tuple> {
        match self.repr() {
            Repr::Tuple(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_article(&self) -> Option<&Article> {
        match self.repr() {
            Repr::Article(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_excuse(&self) -> Option<&Article> {
        match self.repr() {
            Repr::Excuse(e) => Some(e),
            _ => None,
        }
    }

    /// Tuple-Array, Relation or Tuple-Bag.
    pub fn as_relational(&self) -> Option<&Relational> {
        match self.repr() {
            Repr::TupleArray(r) | Repr::Relation(r) | Repr::TupleBag(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_variable(&self) -> Option<&Variable> {
        match self.repr() {
            Repr::Variable(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_external(&self) -> Option<&External> {
        match self.repr() {
            Repr::External(e) => Some(e),
            _ => None,
        }
    }

    /// Instance handle of a Variable, Process, Stream or External.
    pub fn handle(&self) -> Option<Handle> {
        match self.repr() {
            Repr::Variable(v) => Some(v.handle()),
            Repr::Process(h) | Repr::Stream(h) => Some(*h),
            Repr::External(e) => Some(e.handle()),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        equality::same(self, other)
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity().hash(state);
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.export())
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.preview())
    }
}

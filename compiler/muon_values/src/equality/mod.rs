//! The "same value" predicate.
//!
//! One dispatch on base kind decides whether two values denote the same
//! abstract value, whatever lazy or eager representation each side uses.
//! Instance identity is only a fast path: two distinct allocations are
//! compared structurally.
//!
//! When two values are found equal, a cached identity text on one side is
//! handed to the other. This is invisible to callers.

#![allow(
    clippy::mutable_key_type,
    reason = "Value memoizes its identity text; Hash reads only the settled text"
)]

use muon_stack::ensure_sufficient_stack;

use crate::discrete::{Discrete, Shape};
use crate::value::{Article, Fraction, Relational, Repr, Tuple, Value};

/// Whether `a` and `b` denote the same value.
pub(crate) fn same(a: &Value, b: &Value) -> bool {
    if Value::ptr_eq(a, b) {
        return true;
    }
    if a.kind() != b.kind() {
        return false;
    }
    if let (Some(x), Some(y)) = (a.cached_identity(), b.cached_identity()) {
        return x == y;
    }
    let equal = ensure_sufficient_stack(|| same_repr(a.repr(), b.repr()));
    if equal {
        a.adopt_identity(b);
        b.adopt_identity(a);
    }
    equal
}

fn same_repr(a: &Repr, b: &Repr) -> bool {
    match (a, b) {
        (Repr::Boolean(x), Repr::Boolean(y)) => x == y,
        (Repr::Integer(x), Repr::Integer(y)) => x == y,
        (Repr::Fraction(x), Repr::Fraction(y)) => same_fraction(x, y),
        (Repr::Bits(x), Repr::Bits(y)) => x == y,
        (Repr::Blob(x), Repr::Blob(y)) => x == y,
        // Both buffers were validated at construction.
        (Repr::Text(x), Repr::Text(y)) => x.units() == y.units(),
        (Repr::Array(x), Repr::Array(y)) => same_array(x, y),
        (Repr::Set(x), Repr::Set(y)) | (Repr::Bag(x), Repr::Bag(y)) => same_indexed(x, y),
        (Repr::Heading(x), Repr::Heading(y)) => x.same_names(y),
        (Repr::Tuple(x), Repr::Tuple(y)) => same_tuple(x, y),
        (Repr::TupleArray(x), Repr::TupleArray(y))
        | (Repr::Relation(x), Repr::Relation(y))
        | (Repr::TupleBag(x), Repr::TupleBag(y)) => same_relational(x, y),
        (Repr::Article(x), Repr::Article(y)) | (Repr::Excuse(x), Repr::Excuse(y)) => {
            same_article(x, y)
        }
        // Handles are equal only to the very same instance.
        (Repr::Variable(x), Repr::Variable(y)) => x.handle() == y.handle(),
        (Repr::Process(x), Repr::Process(y)) | (Repr::Stream(x), Repr::Stream(y)) => x == y,
        (Repr::External(x), Repr::External(y)) => x.handle() == y.handle(),
        _ => unreachable!(
            "matching base kinds with differing representations: {} vs {}",
            a.kind(),
            b.kind()
        ),
    }
}

fn same_fraction(x: &Fraction, y: &Fraction) -> bool {
    // Decimals are normalized, so equal values have equal decimals.
    if let (Some(dx), Some(dy)) = (x.decimal(), y.decimal()) {
        return dx == dy;
    }
    let (rx, ry) = (x.ratio(), y.ratio());
    if rx.denominator == ry.denominator {
        return rx.numerator == ry.numerator;
    }
    x.ensure_coprime() == y.ensure_coprime()
}

fn same_array(x: &Discrete, y: &Discrete) -> bool {
    if Discrete::ptr_eq(x, y) {
        return true;
    }
    if x.count() != y.count() {
        return false;
    }
    let (tx, ty) = (x.terminal_form(), y.terminal_form());
    match (tx.shape(), ty.shape()) {
        (Shape::None, Shape::None) => true,
        (
            Shape::Singular {
                member: a,
                multiplicity: m,
            },
            Shape::Singular {
                member: b,
                multiplicity: n,
            },
        ) => m == n && same(a, b),
        (Shape::Arrayed(xs), Shape::Arrayed(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys.iter()).all(|(a, b)| same(a, b))
        }
        (
            Shape::Singular {
                member,
                multiplicity,
            },
            Shape::Arrayed(members),
        )
        | (
            Shape::Arrayed(members),
            Shape::Singular {
                member,
                multiplicity,
            },
        ) => {
            u64::try_from(members.len()).is_ok_and(|len| len == *multiplicity)
                && members.iter().all(|m| same(member, m))
        }
        (Shape::None, _) | (_, Shape::None) => false,
        (a, b) => unreachable!("array terminal forms {a:?} and {b:?}"),
    }
}

fn same_indexed(x: &Discrete, y: &Discrete) -> bool {
    if Discrete::ptr_eq(x, y) {
        return true;
    }
    if x.count() != y.count() {
        return false;
    }
    let (ix, iy) = (x.indexed_form(), y.indexed_form());
    match (ix.shape(), iy.shape()) {
        (Shape::None, Shape::None) => true,
        (Shape::Indexed(a), Shape::Indexed(b)) => {
            a.len() == b.len() && a.iter().all(|(member, n)| b.get(member) == Some(n))
        }
        (Shape::None, _) | (_, Shape::None) => false,
        (a, b) => unreachable!("indexed forms {a:?} and {b:?}"),
    }
}

fn same_tuple(x: &Tuple, y: &Tuple) -> bool {
    x.heading().same_names(y.heading())
        && x.values()
            .iter()
            .zip(y.values().iter())
            .all(|(a, b)| same(a, b))
}

fn same_relational(x: &Relational, y: &Relational) -> bool {
    x.heading().same_names(y.heading()) && same(x.body_value(), y.body_value())
}

fn same_article(x: &Article, y: &Article) -> bool {
    same(x.label(), y.label()) && same(x.attrs_value(), y.attrs_value())
}

//! Stack growth guard for structural recursion.
//!
//! Values nest without bound: an Array of Tuples of Bags of Articles is an
//! ordinary value, and equality, canonical encoding, collapse and the
//! relational test all recurse once per nesting level. Every such recursion
//! goes through [`ensure_sufficient_stack`] so that a value built from
//! untrusted input cannot overflow the native stack.
//!
//! On native targets the guard grows the stack with `stacker`; on WASM it
//! is a passthrough.

/// Grow when less than this much stack remains (128KB).
const RED_ZONE: usize = 128 * 1024;

/// Size of each new stack segment (2MB).
const GROWTH_SEGMENT: usize = 2 * 1024 * 1024;

/// Run `f`, first growing the stack if fewer than [`RED_ZONE`] bytes remain.
///
/// ```text
/// fn depth(value: &Value) -> usize {
///     ensure_sufficient_stack(|| match value.as_tuple() {
///         Some(t) => 1 + t.values().iter().map(depth).max().unwrap_or(0),
///         None => 0,
///     })
/// }
/// ```
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, GROWTH_SEGMENT, f)
}

/// WASM manages its own stack.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

#[cfg(test)]
mod tests;

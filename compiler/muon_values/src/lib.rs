//! MUON Values - the value core of the MUON data language.
//!
//! This crate provides:
//! - The value model (`Value`, `Repr`, `BaseKind`) for every runtime kind,
//!   from booleans and exact rationals to relations and opaque handles
//! - `MemoryPool`, the only factory for values, with bounded interning
//! - Symbolic collection trees (`Discrete`) that make catenation and
//!   multiset union O(1) and flatten on demand
//! - The "same value" predicate, which is also `Value`'s `PartialEq`
//! - Canonical literal text, used both as a value's identity and as its
//!   export form
//!
//! # Example
//!
//! ```text
//! let pool = MemoryPool::new();
//! let half = pool.fraction(2, 4)?;
//! assert!(half.same(&pool.fraction_decimal(FixedDecimal::parse("0.5").unwrap())));
//! assert_eq!(half.export(), "0.5");
//! ```

mod config;
mod discrete;
mod encode;
mod equality;
mod errors;
mod pool;
mod value;

use std::sync::Once;

pub use config::PoolConfig;
pub use discrete::{Discrete, Flavor, Shape};
pub use errors::{ValueError, ValueResult};
pub use pool::MemoryPool;
pub use value::{
    Article, AttrName, BaseKind, Bits, Blob, External, FixedDecimal, Fraction, Handle, Heading,
    Ratio, Relational, Repr, Text, Tuple, Value, Variable,
};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Call this once at startup. Safe to call multiple times.
/// Enable with `RUST_LOG=muon_values=debug` or `RUST_LOG=muon_values=trace`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}

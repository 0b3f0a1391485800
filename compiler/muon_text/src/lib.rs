//! MUON Text - code-unit helpers for Text values.
//!
//! Text values hold a sequence of Unicode code points, but hosts hand them
//! over as UTF-16 code units. This crate validates such buffers (every
//! surrogate must be half of a well-formed pair), counts code points, and
//! indexes by code point rather than by code unit.
//!
//! All functions are pure; nothing here allocates except the explicit
//! conversion helpers.

mod code_units;

pub use code_units::{
    code_point_at, code_points, decode, encode, is_high_surrogate, is_identifier,
    is_low_surrogate, measure, CodePoints, Measure,
};

/// An unpaired surrogate was found in a code-unit buffer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unpaired surrogate 0x{unit:04X} at code unit {index}")]
pub struct MalformedText {
    /// Position of the offending code unit.
    pub index: usize,
    /// The offending code unit itself.
    pub unit: u16,
}

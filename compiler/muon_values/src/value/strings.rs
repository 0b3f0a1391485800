//! Bit strings, byte strings and Unicode text.

use muon_text::{CodePoints, Measure};

/// Ordered sequence of boolean members.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Bits(Box<[bool]>);

impl Bits {
    pub(crate) fn new(bits: Vec<bool>) -> Self {
        Bits(bits.into_boxed_slice())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The bit at zero-based `ordinal`, or `None` past the end.
    pub fn bit_at(&self, ordinal: usize) -> Option<bool> {
        self.0.get(ordinal).copied()
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.0
    }
}

/// Ordered sequence of byte members.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Blob(Box<[u8]>);

impl Blob {
    pub(crate) fn new(bytes: Vec<u8>) -> Self {
        Blob(bytes.into_boxed_slice())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The byte at zero-based `ordinal`, or `None` past the end.
    pub fn byte_at(&self, ordinal: usize) -> Option<u8> {
        self.0.get(ordinal).copied()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }
}

/// A sequence of Unicode code points held as UTF-16 code units.
///
/// The buffer is validated at construction, so every surrogate here is half
/// of a well-formed pair. Member count and the non-BMP flag are measured
/// once, up front.
#[derive(Clone, Debug)]
pub struct Text {
    units: Box<[u16]>,
    count: usize,
    has_non_bmp: bool,
}

impl Text {
    /// `measure` must describe `units`.
    pub(crate) fn new(units: Box<[u16]>, measure: Measure) -> Self {
        Text {
            units,
            count: measure.code_points,
            has_non_bmp: measure.has_non_bmp,
        }
    }

    pub fn units(&self) -> &[u16] {
        &self.units
    }

    /// Number of code points (not code units).
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Whether any code point needed a surrogate pair.
    pub fn has_non_bmp(&self) -> bool {
        self.has_non_bmp
    }

    /// Scalar value of the code point at zero-based `ordinal`.
    pub fn code_point_at(&self, ordinal: usize) -> Option<u32> {
        muon_text::code_point_at(&self.units, self.has_non_bmp, ordinal)
    }

    pub fn code_points(&self) -> CodePoints<'_> {
        muon_text::code_points(&self.units)
    }

    /// The text as a Rust string.
    pub fn to_rust_string(&self) -> String {
        match muon_text::decode(&self.units) {
            Ok(s) => s,
            Err(err) => unreachable!("text validated at construction: {err}"),
        }
    }
}

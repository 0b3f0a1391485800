//! Validation, counting and indexing over UTF-16 code units.
//!
//! A buffer is well formed when every high surrogate (`0xD800..=0xDBFF`) is
//! immediately followed by a low surrogate (`0xDC00..=0xDFFF`) and no low
//! surrogate appears on its own. Once [`measure`] has accepted a buffer the
//! other functions assume well-formedness.

use crate::MalformedText;

const HIGH_START: u16 = 0xD800;
const HIGH_END: u16 = 0xDBFF;
const LOW_START: u16 = 0xDC00;
const LOW_END: u16 = 0xDFFF;

/// First code point outside the Basic Multilingual Plane.
const SUPPLEMENTARY_BASE: u32 = 0x1_0000;

#[inline]
pub fn is_high_surrogate(unit: u16) -> bool {
    (HIGH_START..=HIGH_END).contains(&unit)
}

#[inline]
pub fn is_low_surrogate(unit: u16) -> bool {
    (LOW_START..=LOW_END).contains(&unit)
}

/// Result of a successful [`measure`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub struct Measure {
    /// Number of code points (each surrogate pair counts once).
    pub code_points: usize,
    /// Whether any surrogate pair (a non-BMP code point) is present.
    pub has_non_bmp: bool,
}

/// Validate `units` and count its code points.
///
/// Fails on the first unpaired surrogate.
pub fn measure(units: &[u16]) -> Result<Measure, MalformedText> {
    let mut code_points = 0usize;
    let mut has_non_bmp = false;
    let mut i = 0usize;
    while i < units.len() {
        let unit = units[i];
        if is_high_surrogate(unit) {
            match units.get(i + 1) {
                Some(&next) if is_low_surrogate(next) => {
                    has_non_bmp = true;
                    i += 2;
                }
                _ => return Err(MalformedText { index: i, unit }),
            }
        } else if is_low_surrogate(unit) {
            return Err(MalformedText { index: i, unit });
        } else {
            i += 1;
        }
        code_points += 1;
    }
    Ok(Measure {
        code_points,
        has_non_bmp,
    })
}

#[inline]
fn combine(high: u16, low: u16) -> u32 {
    SUPPLEMENTARY_BASE + ((u32::from(high - HIGH_START) << 10) | u32::from(low - LOW_START))
}

/// The code point at zero-based `ordinal`, or `None` past the end.
///
/// `has_non_bmp` is the cached flag from [`measure`]; when it is false the
/// lookup is a direct index.
pub fn code_point_at(units: &[u16], has_non_bmp: bool, ordinal: usize) -> Option<u32> {
    if !has_non_bmp {
        return units.get(ordinal).copied().map(u32::from);
    }
    code_points(units).nth(ordinal)
}

/// Iterate the code points of a well-formed buffer.
pub fn code_points(units: &[u16]) -> CodePoints<'_> {
    CodePoints { units, pos: 0 }
}

/// Iterator returned by [`code_points`].
#[derive(Clone, Debug)]
pub struct CodePoints<'a> {
    units: &'a [u16],
    pos: usize,
}

impl Iterator for CodePoints<'_> {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        let unit = *self.units.get(self.pos)?;
        if is_high_surrogate(unit) {
            if let Some(&low) = self.units.get(self.pos + 1) {
                if is_low_surrogate(low) {
                    self.pos += 2;
                    return Some(combine(unit, low));
                }
            }
        }
        self.pos += 1;
        Some(u32::from(unit))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.units.len() - self.pos;
        (remaining.div_ceil(2), Some(remaining))
    }
}

/// Encode a Rust string as UTF-16 code units.
pub fn encode(s: &str) -> Vec<u16> {
    s.encode_utf16().collect()
}

/// Decode code units into a Rust string, failing on an unpaired surrogate.
pub fn decode(units: &[u16]) -> Result<String, MalformedText> {
    let mut out = String::with_capacity(units.len());
    let mut index = 0usize;
    for decoded in char::decode_utf16(units.iter().copied()) {
        match decoded {
            Ok(c) => {
                out.push(c);
                index += c.len_utf16();
            }
            Err(e) => {
                return Err(MalformedText {
                    index,
                    unit: e.unpaired_surrogate(),
                })
            }
        }
    }
    Ok(out)
}

/// Whether `units` spells a bare identifier: `[A-Za-z_][A-Za-z_0-9]*`.
pub fn is_identifier(units: &[u16]) -> bool {
    let Some((&first, rest)) = units.split_first() else {
        return false;
    };
    let is_start =
        |u: u16| u == u16::from(b'_') || u8::try_from(u).is_ok_and(|b| b.is_ascii_alphabetic());
    let is_continue =
        |u: u16| is_start(u) || u8::try_from(u).is_ok_and(|b| b.is_ascii_digit());
    is_start(first) && rest.iter().all(|&u| is_continue(u))
}

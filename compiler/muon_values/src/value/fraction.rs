//! Exact rationals: fixed-point decimals and numerator/denominator pairs.
//!
//! A `Fraction` keeps whichever form it was built from. Decimal-sourced
//! fractions answer equality and encoding straight from the normalized
//! decimal; ratio-sourced ones reduce to coprime form lazily, and only when
//! a cheaper comparison was inconclusive.
//!
//! All derived forms live in `OnceLock` slots: they are memoized
//! rediscoveries of the same number, never changes to it.

use std::fmt;
use std::sync::OnceLock;

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, Zero};

/// `mantissa / 10^scale`, normalized so `mantissa` has no trailing zero
/// digit unless `scale` is 0.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FixedDecimal {
    mantissa: BigInt,
    scale: u32,
}

impl FixedDecimal {
    /// Build and normalize `mantissa / 10^scale`.
    pub fn new(mantissa: BigInt, scale: u32) -> Self {
        let ten = BigInt::from(10u8);
        let mut mantissa = mantissa;
        let mut scale = scale;
        if mantissa.is_zero() {
            scale = 0;
        }
        while scale > 0 && (&mantissa % &ten).is_zero() {
            mantissa /= &ten;
            scale -= 1;
        }
        FixedDecimal { mantissa, scale }
    }

    /// Parse `-?[0-9]+(\.[0-9]+)?`, with an optional leading `+`.
    pub fn parse(text: &str) -> Option<Self> {
        let (negative, body) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text.strip_prefix('+').unwrap_or(text)),
        };
        let (int_part, frac_part) = match body.split_once('.') {
            Some((_, "")) => return None,
            Some(parts) => parts,
            None => (body, ""),
        };
        let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
        if int_part.is_empty() || !all_digits(int_part) || !all_digits(frac_part) {
            return None;
        }
        let magnitude: BigInt = format!("{int_part}{frac_part}").parse().ok()?;
        let scale = u32::try_from(frac_part.len()).ok()?;
        Some(FixedDecimal::new(
            if negative { -magnitude } else { magnitude },
            scale,
        ))
    }

    pub fn mantissa(&self) -> &BigInt {
        &self.mantissa
    }

    /// Number of digits after the decimal point.
    pub fn scale(&self) -> u32 {
        self.scale
    }

    pub fn is_zero(&self) -> bool {
        self.mantissa.is_zero()
    }

    fn to_ratio(&self) -> Ratio {
        Ratio {
            numerator: self.mantissa.clone(),
            denominator: BigInt::from(10u8).pow(self.scale),
        }
    }
}

/// Renders with at least one fractional digit: `2.0`, `0.25`, `-0.5`.
impl fmt::Display for FixedDecimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.mantissa.is_negative() {
            f.write_str("-")?;
        }
        let digits = self.mantissa.magnitude().to_string();
        let scale = self.scale as usize;
        if scale == 0 {
            return write!(f, "{digits}.0");
        }
        if digits.len() > scale {
            let (whole, part) = digits.split_at(digits.len() - scale);
            write!(f, "{whole}.{part}")
        } else {
            write!(f, "0.{}{digits}", "0".repeat(scale - digits.len()))
        }
    }
}

/// A numerator/denominator pair with a positive denominator.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Ratio {
    pub numerator: BigInt,
    pub denominator: BigInt,
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

/// An exact rational number.
#[derive(Debug)]
pub struct Fraction {
    /// Present when the fraction came from a decimal literal.
    decimal: Option<FixedDecimal>,
    /// As supplied (ratio-sourced) or derived from `decimal`.
    ratio: OnceLock<Ratio>,
    coprime: OnceLock<Ratio>,
    terminating: OnceLock<bool>,
}

impl Fraction {
    pub(crate) fn from_decimal(decimal: FixedDecimal) -> Self {
        Fraction {
            decimal: Some(decimal),
            ratio: OnceLock::new(),
            coprime: OnceLock::new(),
            terminating: OnceLock::from(true),
        }
    }

    /// `denominator` must already be positive.
    pub(crate) fn from_ratio(numerator: BigInt, denominator: BigInt) -> Self {
        debug_assert!(denominator.is_positive());
        Fraction {
            decimal: None,
            ratio: OnceLock::from(Ratio {
                numerator,
                denominator,
            }),
            coprime: OnceLock::new(),
            terminating: OnceLock::new(),
        }
    }

    /// The decimal this fraction was built from, if any.
    pub fn decimal(&self) -> Option<&FixedDecimal> {
        self.decimal.as_ref()
    }

    /// The pair as supplied; not necessarily coprime.
    pub fn ratio(&self) -> &Ratio {
        self.ratio.get_or_init(|| match &self.decimal {
            Some(d) => d.to_ratio(),
            None => unreachable!("ratio-sourced fractions are built with their ratio"),
        })
    }

    /// The pair divided through by its greatest common divisor.
    pub fn ensure_coprime(&self) -> &Ratio {
        self.coprime.get_or_init(|| {
            let ratio = self.ratio();
            let gcd = ratio.numerator.gcd(&ratio.denominator);
            if gcd.is_one() || gcd.is_zero() {
                ratio.clone()
            } else {
                Ratio {
                    numerator: &ratio.numerator / &gcd,
                    denominator: &ratio.denominator / &gcd,
                }
            }
        })
    }

    pub fn numerator(&self) -> &BigInt {
        &self.ensure_coprime().numerator
    }

    pub fn denominator(&self) -> &BigInt {
        &self.ensure_coprime().denominator
    }

    pub fn is_zero(&self) -> bool {
        match &self.decimal {
            Some(d) => d.is_zero(),
            None => self.ratio().numerator.is_zero(),
        }
    }

    /// Whether the reduced denominator has no prime factors but 2 and 5.
    pub fn is_terminating_decimal(&self) -> bool {
        *self.terminating.get_or_init(|| {
            let two = BigInt::from(2u8);
            let five = BigInt::from(5u8);
            let mut rest = self.denominator().clone();
            while (&rest % &two).is_zero() {
                rest /= &two;
            }
            while (&rest % &five).is_zero() {
                rest /= &five;
            }
            rest.is_one()
        })
    }

    /// Smallest `k` such that `10^k` is a multiple of the reduced
    /// denominator; `None` for non-terminating fractions.
    pub fn decimal_denominator_scale(&self) -> Option<u32> {
        if let Some(d) = &self.decimal {
            return Some(d.scale());
        }
        if !self.is_terminating_decimal() {
            return None;
        }
        // Terminating denominators are small in practice; a linear search
        // over exponents is enough.
        let denominator = self.denominator();
        let ten = BigInt::from(10u8);
        let mut power = BigInt::one();
        let mut scale = 0u32;
        while !(&power % denominator).is_zero() {
            power *= &ten;
            scale += 1;
        }
        Some(scale)
    }

    /// This fraction as a fixed-point decimal, when it terminates.
    pub fn to_decimal(&self) -> Option<FixedDecimal> {
        if let Some(d) = &self.decimal {
            return Some(d.clone());
        }
        let scale = self.decimal_denominator_scale()?;
        let reduced = self.ensure_coprime();
        let factor = BigInt::from(10u8).pow(scale) / &reduced.denominator;
        Some(FixedDecimal::new(&reduced.numerator * factor, scale))
    }
}

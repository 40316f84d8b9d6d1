//! The `Decimal128` value type and its BID bit layout.
//!
//! The 128 bits are kept as two words. The top bits of `high` hold the sign
//! and the combination field; the rest of `high` and all of `low` hold the
//! coefficient. Two combination-field layouts exist:
//!
//! - normal: `s | eeeeeeeeeeeeee | c(113 bits)`
//! - alternate (bits 62-61 set): `s | 11 | eeeeeeeeeeeeee | c(111 bits)`, with
//!   an implied `100` prefix on the coefficient.
//!
//! Infinity and NaN live in the alternate space (`11110` and `11111`).

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::NumberFormatError;

/// Bias added to the exponent before it is stored.
pub(crate) const EXPONENT_BIAS: i32 = 6176;
/// Smallest unbiased exponent.
pub const MIN_EXPONENT: i32 = -6176;
/// Largest unbiased exponent.
pub const MAX_EXPONENT: i32 = 6111;
/// Maximum number of significant coefficient digits.
pub const MAX_DIGITS: usize = 34;
/// `10^34 - 1`, the largest canonical coefficient.
pub(crate) const MAX_COEFFICIENT: u128 = 9_999_999_999_999_999_999_999_999_999_999_999;

const SIGN_BIT: u64 = 1 << 63;
const COMBINATION_ALT: u64 = 0x6000_0000_0000_0000;
const INFINITY_BITS: u64 = 0x7800_0000_0000_0000;
const NAN_BITS: u64 = 0x7c00_0000_0000_0000;
const EXPONENT_MASK: u64 = 0x3fff;
const COEFFICIENT_HIGH_MASK: u64 = 0x0001_ffff_ffff_ffff;
const ALT_COEFFICIENT_HIGH_MASK: u64 = 0x0000_7fff_ffff_ffff;

/// IEEE 754-2008 decimal128 in Binary Integer Decimal encoding.
///
/// Equality and hashing compare the exact bit pattern: `1` and `1.0` are
/// different values even though [`Decimal128::compare_to`] orders them as
/// equal.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Decimal128 {
    high: u64,
    low: u64,
}

impl Decimal128 {
    pub const POSITIVE_ZERO: Decimal128 = Decimal128::from_words(0x3040_0000_0000_0000, 0);
    pub const NEGATIVE_ZERO: Decimal128 = Decimal128::from_words(0xb040_0000_0000_0000, 0);
    pub const NAN: Decimal128 = Decimal128::from_words(NAN_BITS, 0);
    pub const NEGATIVE_NAN: Decimal128 = Decimal128::from_words(NAN_BITS | SIGN_BIT, 0);
    pub const POSITIVE_INFINITY: Decimal128 = Decimal128::from_words(INFINITY_BITS, 0);
    pub const NEGATIVE_INFINITY: Decimal128 = Decimal128::from_words(INFINITY_BITS | SIGN_BIT, 0);
    /// `9.999999999999999999999999999999999E+6144`
    pub const MAX: Decimal128 = Decimal128::from_words(0x5fff_ed09_bead_87c0, 0x378d_8e63_ffff_ffff);
    /// `-9.999999999999999999999999999999999E+6144`
    pub const MIN: Decimal128 = Decimal128::from_words(0xdfff_ed09_bead_87c0, 0x378d_8e63_ffff_ffff);

    /// Wraps raw BID words without validation.
    pub const fn from_words(high: u64, low: u64) -> Self {
        Self { high, low }
    }

    pub const fn high(&self) -> u64 {
        self.high
    }

    pub const fn low(&self) -> u64 {
        self.low
    }

    /// Wire order: the low word first, each word little-endian.
    pub fn to_le_bytes(&self) -> [u8; 16] {
        let mut out = [0u8; 16];
        out[..8].copy_from_slice(&self.low.to_le_bytes());
        out[8..].copy_from_slice(&self.high.to_le_bytes());
        out
    }

    pub fn from_le_bytes(bytes: [u8; 16]) -> Self {
        let mut low = [0u8; 8];
        let mut high = [0u8; 8];
        low.copy_from_slice(&bytes[..8]);
        high.copy_from_slice(&bytes[8..]);
        Self::from_words(u64::from_le_bytes(high), u64::from_le_bytes(low))
    }

    /// Parses decimal text. See [`FromStr`].
    pub fn parse(text: &str) -> Result<Self, NumberFormatError> {
        crate::parse::parse(text)
    }

    /// Builds a finite value from its sign, unbiased exponent and coefficient.
    ///
    /// Coefficients up to `2^113 - 1` use the normal layout; those in
    /// `[2^113, 2^113 + 2^111)` use the alternate layout. Anything above
    /// `10^34 - 1` is non-canonical and reads back as zero.
    pub fn from_parts(
        negative: bool,
        exponent: i32,
        coefficient: u128,
    ) -> Result<Self, NumberFormatError> {
        if !(MIN_EXPONENT..=MAX_EXPONENT).contains(&exponent) {
            return Err(NumberFormatError::ExponentOutOfRange(exponent));
        }
        let fits_normal = coefficient >> 113 == 0;
        let fits_alternate = coefficient >> 111 == 0b100;
        if !fits_normal && !fits_alternate {
            return Err(NumberFormatError::CoefficientTooLarge);
        }
        Ok(Self::encode(negative, exponent, coefficient))
    }

    pub(crate) fn encode(negative: bool, exponent: i32, coefficient: u128) -> Self {
        let biased = (exponent + EXPONENT_BIAS) as u64 & EXPONENT_MASK;
        let coefficient_high = (coefficient >> 64) as u64;
        let low = coefficient as u64;
        let mut high = if (coefficient_high >> 49) & 1 == 1 {
            COMBINATION_ALT | (biased << 47) | (coefficient_high & ALT_COEFFICIENT_HIGH_MASK)
        } else {
            (biased << 49) | (coefficient_high & COEFFICIENT_HIGH_MASK)
        };
        if negative {
            high |= SIGN_BIT;
        }
        Self { high, low }
    }

    pub fn is_nan(&self) -> bool {
        self.high & NAN_BITS == NAN_BITS
    }

    pub fn is_infinite(&self) -> bool {
        self.high & NAN_BITS == INFINITY_BITS
    }

    pub fn is_finite(&self) -> bool {
        self.high & INFINITY_BITS != INFINITY_BITS
    }

    pub fn is_negative(&self) -> bool {
        self.high & SIGN_BIT != 0
    }

    /// True for a finite value with a zero (or non-canonical) coefficient.
    pub fn is_zero(&self) -> bool {
        self.is_finite() && self.coefficient() == 0
    }

    fn uses_alternate_layout(&self) -> bool {
        self.high & COMBINATION_ALT == COMBINATION_ALT
    }

    /// Unbiased exponent; `0` for NaN and infinities.
    pub fn exponent(&self) -> i32 {
        if !self.is_finite() {
            return 0;
        }
        let biased = if self.uses_alternate_layout() {
            (self.high >> 47) & EXPONENT_MASK
        } else {
            (self.high >> 49) & EXPONENT_MASK
        };
        biased as i32 - EXPONENT_BIAS
    }

    /// Coefficient of a finite value; non-canonical encodings yield `0`.
    pub fn coefficient(&self) -> u128 {
        if !self.is_finite() || self.uses_alternate_layout() {
            // The implied `100` prefix always exceeds 10^34 - 1.
            return 0;
        }
        let coefficient =
            (((self.high & COEFFICIENT_HIGH_MASK) as u128) << 64) | self.low as u128;
        if coefficient > MAX_COEFFICIENT {
            0
        } else {
            coefficient
        }
    }

    /// Orders by numeric value.
    ///
    /// `-0` equals `+0`, infinities sit at the ends and NaN of either sign
    /// equals NaN and sorts above everything else. This is deliberately a
    /// different relation from `==`, which compares bit patterns.
    pub fn compare_to(&self, other: &Self) -> Ordering {
        match (self.is_nan(), other.is_nan()) {
            (true, true) => return Ordering::Equal,
            (true, false) => return Ordering::Greater,
            (false, true) => return Ordering::Less,
            (false, false) => {}
        }
        let lhs_zero = self.is_zero();
        let rhs_zero = other.is_zero();
        if lhs_zero && rhs_zero {
            return Ordering::Equal;
        }
        let lhs_negative = self.is_negative() && !lhs_zero;
        let rhs_negative = other.is_negative() && !rhs_zero;
        if lhs_negative != rhs_negative {
            return if lhs_negative {
                Ordering::Less
            } else {
                Ordering::Greater
            };
        }
        let magnitude = self.compare_magnitude(other);
        if lhs_negative {
            magnitude.reverse()
        } else {
            magnitude
        }
    }

    fn compare_magnitude(&self, other: &Self) -> Ordering {
        match (self.is_infinite(), other.is_infinite()) {
            (true, true) => return Ordering::Equal,
            (true, false) => return Ordering::Greater,
            (false, true) => return Ordering::Less,
            (false, false) => {}
        }
        let lhs = self.coefficient();
        let rhs = other.coefficient();
        match (lhs == 0, rhs == 0) {
            (true, true) => return Ordering::Equal,
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            (false, false) => {}
        }
        let lhs_digits = digit_count(lhs);
        let rhs_digits = digit_count(rhs);
        let lhs_adjusted = self.exponent() as i64 + lhs_digits as i64;
        let rhs_adjusted = other.exponent() as i64 + rhs_digits as i64;
        lhs_adjusted.cmp(&rhs_adjusted).then_with(|| {
            let lhs_scaled = lhs * 10u128.pow((MAX_DIGITS - lhs_digits) as u32);
            let rhs_scaled = rhs * 10u128.pow((MAX_DIGITS - rhs_digits) as u32);
            lhs_scaled.cmp(&rhs_scaled)
        })
    }
}

pub(crate) fn digit_count(mut value: u128) -> usize {
    let mut digits = 1;
    while value >= 10 {
        value /= 10;
        digits += 1;
    }
    digits
}

impl Default for Decimal128 {
    fn default() -> Self {
        Self::POSITIVE_ZERO
    }
}

impl FromStr for Decimal128 {
    type Err = NumberFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::parse::parse(s)
    }
}

impl From<i64> for Decimal128 {
    fn from(value: i64) -> Self {
        Self::encode(value < 0, 0, value.unsigned_abs() as u128)
    }
}

impl From<i32> for Decimal128 {
    fn from(value: i32) -> Self {
        Self::from(value as i64)
    }
}

impl fmt::Debug for Decimal128 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Decimal128({self})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constants_decompose() {
        assert_eq!(Decimal128::POSITIVE_ZERO.exponent(), 0);
        assert_eq!(Decimal128::POSITIVE_ZERO.coefficient(), 0);
        assert!(Decimal128::NEGATIVE_ZERO.is_negative());
        assert!(Decimal128::NEGATIVE_ZERO.is_zero());
        assert_eq!(Decimal128::MAX.exponent(), MAX_EXPONENT);
        assert_eq!(Decimal128::MAX.coefficient(), MAX_COEFFICIENT);
        assert!(Decimal128::NAN.is_nan());
        assert!(!Decimal128::NAN.is_infinite());
        assert!(Decimal128::NEGATIVE_INFINITY.is_infinite());
        assert!(!Decimal128::POSITIVE_INFINITY.is_finite());
    }

    #[test]
    fn alternate_layout_round_trips_through_from_parts() {
        let coefficient = (0b100u128 << 111) | 42;
        let value = Decimal128::from_parts(false, 3, coefficient).unwrap();
        assert_eq!(value.high() & COMBINATION_ALT, COMBINATION_ALT);
        assert_eq!(value.exponent(), 3);
        // non-canonical coefficient reads as zero
        assert_eq!(value.coefficient(), 0);
        assert!(value.is_finite());
    }

    #[test]
    fn from_parts_rejects_out_of_range() {
        assert_eq!(
            Decimal128::from_parts(false, 6112, 1),
            Err(NumberFormatError::ExponentOutOfRange(6112))
        );
        assert_eq!(
            Decimal128::from_parts(false, 0, 1u128 << 120),
            Err(NumberFormatError::CoefficientTooLarge)
        );
    }

    #[test]
    fn oversized_normal_coefficient_reads_as_zero() {
        // 10^34 fits the 113-bit field but is not canonical.
        let value = Decimal128::from_parts(false, 0, MAX_COEFFICIENT + 1).unwrap();
        assert_eq!(value.coefficient(), 0);
        assert!(value.is_zero());
    }

    #[test]
    fn le_bytes_put_low_word_first() {
        let value = Decimal128::from_words(0x3040_0000_0000_0000, 1);
        let bytes = value.to_le_bytes();
        assert_eq!(bytes[0], 1);
        assert_eq!(bytes[15], 0x30);
        assert_eq!(bytes[14], 0x40);
        assert_eq!(Decimal128::from_le_bytes(bytes), value);
    }

    #[test]
    fn digit_count_boundaries() {
        assert_eq!(digit_count(0), 1);
        assert_eq!(digit_count(9), 1);
        assert_eq!(digit_count(10), 2);
        assert_eq!(digit_count(MAX_COEFFICIENT), 34);
    }
}

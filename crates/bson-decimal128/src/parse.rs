//! Decimal text to `Decimal128`.
//!
//! Grammar: `[+-] (nan | inf | infinity)` (case-insensitive), or
//! `[+-] digits [. digits] [(e|E) [+-] digits]` with at least one coefficient
//! digit on either side of the point. Digits are never rounded: a literal
//! that needs more than 34 significant digits, or whose exponent cannot be
//! clamped into range exactly, is rejected.

use crate::decimal128::{Decimal128, MAX_DIGITS, MAX_EXPONENT, MIN_EXPONENT};
use crate::error::NumberFormatError;

/// Explicit exponents saturate here; far past any clampable range.
const EXPONENT_LIMIT: i64 = 1_000_000_000;

pub(crate) fn parse(text: &str) -> Result<Decimal128, NumberFormatError> {
    let (negative, body) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };

    if body.eq_ignore_ascii_case("nan") {
        return Ok(if negative {
            Decimal128::NEGATIVE_NAN
        } else {
            Decimal128::NAN
        });
    }
    if body.eq_ignore_ascii_case("inf") || body.eq_ignore_ascii_case("infinity") {
        return Ok(if negative {
            Decimal128::NEGATIVE_INFINITY
        } else {
            Decimal128::POSITIVE_INFINITY
        });
    }

    let syntax = || NumberFormatError::Syntax(text.to_owned());
    let inexact = || NumberFormatError::Inexact(text.to_owned());

    let bytes = body.as_bytes();
    let mut digits: Vec<u8> = Vec::with_capacity(bytes.len());
    let mut seen_point = false;
    let mut digits_after_point: i64 = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b @ b'0'..=b'9' => {
                digits.push(b - b'0');
                if seen_point {
                    digits_after_point += 1;
                }
            }
            b'.' if !seen_point => seen_point = true,
            _ => break,
        }
        i += 1;
    }
    if digits.is_empty() {
        return Err(syntax());
    }

    let mut explicit_exponent: i64 = 0;
    if i < bytes.len() {
        if bytes[i] != b'e' && bytes[i] != b'E' {
            return Err(syntax());
        }
        i += 1;
        let exponent_negative = match bytes.get(i) {
            Some(b'-') => {
                i += 1;
                true
            }
            Some(b'+') => {
                i += 1;
                false
            }
            _ => false,
        };
        let exponent_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            explicit_exponent =
                (explicit_exponent * 10 + (bytes[i] - b'0') as i64).min(EXPONENT_LIMIT);
            i += 1;
        }
        if i == exponent_start || i != bytes.len() {
            return Err(syntax());
        }
        if exponent_negative {
            explicit_exponent = -explicit_exponent;
        }
    }

    let mut significant: &[u8] = match digits.iter().position(|&d| d != 0) {
        Some(first) => &digits[first..],
        None => &[],
    };
    let mut exponent = explicit_exponent - digits_after_point;

    // Absorb trailing zeros until the coefficient fits.
    while significant.len() > MAX_DIGITS {
        match significant.split_last() {
            Some((0, rest)) => {
                significant = rest;
                exponent += 1;
            }
            _ => return Err(inexact()),
        }
    }

    let mut coefficient = significant
        .iter()
        .fold(0u128, |acc, &d| acc * 10 + d as u128);
    let mut digit_count = significant.len();

    if coefficient == 0 {
        exponent = exponent.clamp(MIN_EXPONENT as i64, MAX_EXPONENT as i64);
    }
    while exponent > MAX_EXPONENT as i64 && digit_count < MAX_DIGITS {
        coefficient *= 10;
        digit_count += 1;
        exponent -= 1;
    }
    while exponent < MIN_EXPONENT as i64 && coefficient % 10 == 0 {
        coefficient /= 10;
        exponent += 1;
    }
    if !(MIN_EXPONENT as i64..=MAX_EXPONENT as i64).contains(&exponent) {
        return Err(inexact());
    }

    Ok(Decimal128::encode(negative, exponent as i32, coefficient))
}

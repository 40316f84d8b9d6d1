//! Decimal128 error type.

use thiserror::Error;

/// Raised when text or raw parts cannot become a [`crate::Decimal128`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NumberFormatError {
    /// The literal is neither a decimal number nor a special token.
    #[error("'{0}' is not a valid Decimal128 string")]
    Syntax(String),
    /// The literal needs more than 34 significant digits, or its exponent
    /// cannot be clamped into range without dropping a nonzero digit.
    #[error("'{0}' cannot be represented as a Decimal128 without rounding")]
    Inexact(String),
    /// Explicit construction with an exponent outside `[-6176, 6111]`.
    #[error("exponent {0} is outside the Decimal128 range [-6176, 6111]")]
    ExponentOutOfRange(i32),
    /// Explicit construction with a coefficient that fits neither combination-field layout.
    #[error("coefficient does not fit the Decimal128 combination field")]
    CoefficientTooLarge,
}

//! IEEE 754-2008 decimal128 for BSON.
//!
//! [`Decimal128`] stores the 128-bit Binary Integer Decimal encoding as two
//! 64-bit words. Parsing never rounds: text is accepted only when it maps to
//! an exact coefficient/exponent pair, clamping the exponent into
//! `[-6176, 6111]` where trailing zeros allow it.
//!
//! ```
//! use bson_decimal128::Decimal128;
//!
//! let value: Decimal128 = "123E-9".parse().unwrap();
//! assert_eq!(value.to_string(), "1.23E-7");
//! assert_eq!(Decimal128::parse("0").unwrap(), Decimal128::POSITIVE_ZERO);
//! ```

mod decimal128;
mod error;
mod format;
mod parse;

pub use decimal128::{Decimal128, MAX_DIGITS, MAX_EXPONENT, MIN_EXPONENT};
pub use error::NumberFormatError;

//! Error type for Extended JSON decoding.

use bson_decimal128::NumberFormatError;
use thiserror::Error;

/// Errors that can occur during Extended JSON decoding.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EjsonDecodeError {
    /// Generic JSON parse error at the given byte offset.
    #[error("invalid JSON at position {0}")]
    InvalidJson(usize),
    #[error("invalid UTF-8")]
    InvalidUtf8,
    /// Non-whitespace input after the top-level value.
    #[error("unexpected trailing characters at position {0}")]
    TrailingCharacters(usize),
    #[error("nesting deeper than {0} levels")]
    NestingTooDeep(usize),
    /// The top-level value is not a plain document.
    #[error("top-level value must be a document, found {0}")]
    NotADocument(&'static str),
    #[error("invalid ObjectId format")]
    InvalidObjectId,
    #[error("invalid Int32 format")]
    InvalidInt32,
    #[error("invalid Int64 format")]
    InvalidInt64,
    #[error("invalid Double format")]
    InvalidDouble,
    #[error("invalid Decimal128 format: {0}")]
    InvalidDecimal128(#[from] NumberFormatError),
    #[error("invalid Binary format")]
    InvalidBinary,
    #[error("invalid UUID format")]
    InvalidUuid,
    #[error("invalid Code format")]
    InvalidCode,
    #[error("invalid CodeWScope format")]
    InvalidCodeWithScope,
    #[error("invalid Symbol format")]
    InvalidSymbol,
    #[error("invalid Timestamp format")]
    InvalidTimestamp,
    #[error("invalid RegularExpression format")]
    InvalidRegularExpression,
    #[error("invalid DBPointer format")]
    InvalidDbPointer,
    #[error("invalid Date format")]
    InvalidDate,
    #[error("invalid MinKey format")]
    InvalidMinKey,
    #[error("invalid MaxKey format")]
    InvalidMaxKey,
    #[error("invalid Undefined format")]
    InvalidUndefined,
    /// A type wrapper carried keys other than its own.
    #[error("invalid {0} format: extra keys not allowed")]
    ExtraKeys(&'static str),
}

impl EjsonDecodeError {
    /// Stable machine-readable identifier.
    pub fn code(&self) -> &'static str {
        match self {
            EjsonDecodeError::InvalidJson(_) => "invalid_json",
            EjsonDecodeError::InvalidUtf8 => "invalid_utf8",
            EjsonDecodeError::TrailingCharacters(_) => "trailing_characters",
            EjsonDecodeError::NestingTooDeep(_) => "nesting_too_deep",
            EjsonDecodeError::NotADocument(_) => "not_a_document",
            EjsonDecodeError::InvalidDecimal128(_) => "invalid_decimal128",
            EjsonDecodeError::ExtraKeys(_) => "extra_keys",
            _ => "invalid_wrapper",
        }
    }
}

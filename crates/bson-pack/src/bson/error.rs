//! BSON codec error type.

use thiserror::Error;

/// Error type for BSON encoding and decoding.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BsonError {
    #[error("unexpected end of input")]
    UnexpectedEof,
    #[error("unsupported BSON element type: 0x{0:02x}")]
    UnsupportedType(u8),
    #[error("invalid UTF-8")]
    InvalidUtf8,
    #[error("invalid length {0}")]
    InvalidLength(i64),
    #[error("declared length {declared} does not match consumed length {consumed}")]
    LengthMismatch { declared: usize, consumed: usize },
    #[error("missing document terminator")]
    MissingTerminator,
    #[error("invalid boolean byte: 0x{0:02x}")]
    InvalidBoolean(u8),
    #[error("C-string contains a NUL byte: {0:?}")]
    NulInCString(String),
    #[error("document of {0} bytes exceeds the maximum BSON size")]
    DocumentTooLarge(usize),
    #[error("nesting deeper than {0} levels")]
    NestingTooDeep(usize),
}

impl BsonError {
    /// Stable machine-readable identifier.
    pub fn code(&self) -> &'static str {
        match self {
            BsonError::UnexpectedEof => "unexpected_eof",
            BsonError::UnsupportedType(_) => "unsupported_type",
            BsonError::InvalidUtf8 => "invalid_utf8",
            BsonError::InvalidLength(_) => "invalid_length",
            BsonError::LengthMismatch { .. } => "length_mismatch",
            BsonError::MissingTerminator => "missing_terminator",
            BsonError::InvalidBoolean(_) => "invalid_boolean",
            BsonError::NulInCString(_) => "nul_in_cstring",
            BsonError::DocumentTooLarge(_) => "document_too_large",
            BsonError::NestingTooDeep(_) => "nesting_too_deep",
        }
    }
}

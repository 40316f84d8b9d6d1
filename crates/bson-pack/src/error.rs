//! Crate-level error types.

use bson_decimal128::NumberFormatError;
use thiserror::Error;

use crate::bson::{BsonError, ObjectIdError};
use crate::ejson::EjsonDecodeError;

/// A value was narrowed to a kind it does not hold.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("value is {actual}, not {expected}")]
pub struct InvalidOperationError {
    pub expected: &'static str,
    pub actual: &'static str,
}

/// Any error this crate produces.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Bson(#[from] BsonError),
    #[error(transparent)]
    Ejson(#[from] EjsonDecodeError),
    #[error(transparent)]
    NumberFormat(#[from] NumberFormatError),
    #[error(transparent)]
    InvalidOperation(#[from] InvalidOperationError),
    #[error(transparent)]
    ObjectId(#[from] ObjectIdError),
}

impl Error {
    /// Machine-readable code for serialization errors.
    pub fn code(&self) -> Option<&'static str> {
        match self {
            Error::Bson(err) => Some(err.code()),
            Error::Ejson(err) => Some(err.code()),
            _ => None,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

//! BSON binary codec and MongoDB Extended JSON converter.
//!
//! A [`BsonDocument`] tree can be read from and written to both
//! representations:
//!
//! ```
//! use bson_pack::{BsonDocument, BsonValue};
//!
//! let mut doc = BsonDocument::new();
//! doc.insert("i", 1);
//! let bytes = doc.to_bytes().unwrap();
//! assert_eq!(bytes, [0x0c, 0, 0, 0, 0x10, b'i', 0, 1, 0, 0, 0, 0]);
//!
//! let back = BsonDocument::from_bytes(&bytes).unwrap();
//! assert_eq!(back.to_ejson(), r#"{"i":{"$numberInt":"1"}}"#);
//! assert_eq!(BsonDocument::from_ejson(r#"{"i": 1}"#).unwrap(), back);
//! assert_eq!(back.get("i"), Some(&BsonValue::Int32(1)));
//! ```
//!
//! Decimal128 values come from the `bson-decimal128` crate and are
//! re-exported here.

pub mod bson;
pub mod counter;
pub mod ejson;
pub mod error;

pub use bson::{
    BsonArray, BsonBinary, BsonDecoder, BsonDecoderOptions, BsonDocument, BsonEncoder, BsonError,
    BsonObjectId, BsonRegex, BsonTimestamp, BsonValue, ElementType,
};
pub use bson_decimal128::{Decimal128, NumberFormatError};
pub use counter::AtomicCounter;
pub use ejson::{
    EjsonDecodeError, EjsonDecoder, EjsonDecoderOptions, EjsonEncoder, EjsonEncoderOptions,
    EjsonMode,
};
pub use error::{Error, InvalidOperationError, Result};

//! BSON (Binary JSON) value model, encoding and decoding.

mod accessors;
pub mod constants;
pub mod decoder;
pub mod document;
pub mod encoder;
pub mod error;
pub mod oid;
pub mod values;

pub use constants::ElementType;
pub use decoder::{BsonDecoder, BsonDecoderOptions};
pub use document::{BsonArray, BsonDocument};
pub use encoder::BsonEncoder;
pub use error::BsonError;
pub use oid::{BsonObjectId, ObjectIdError};
pub use values::{
    subtype, BsonBinary, BsonDbPointer, BsonJavascriptCode, BsonJavascriptCodeWithScope,
    BsonRegex, BsonSymbol, BsonTimestamp, BsonValue,
};

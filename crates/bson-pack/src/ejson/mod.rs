//! MongoDB Extended JSON v2 encoding and decoding.
//!
//! Extended JSON is a superset of JSON that preserves BSON type information
//! using `$`-prefixed wrapper objects (e.g. `{"$oid":"..."}`,
//! `{"$numberInt":"..."}`).
//!
//! Two output modes are supported:
//! - **Canonical** (default): all numbers and dates use explicit type wrappers.
//! - **Relaxed**: native JSON types are used where lossless.
//!
//! The decoder accepts both, plus the legacy wrapper spellings.

pub mod decoder;
pub mod encoder;
pub mod error;

pub use decoder::{EjsonDecoder, EjsonDecoderOptions};
pub use encoder::{EjsonEncoder, EjsonEncoderOptions, EjsonMode};
pub use error::EjsonDecodeError;

//! BSON value model.
//!
//! [`BsonValue`] is a closed sum over every BSON element type. Containers
//! ([`BsonDocument`], [`BsonArray`]) are owned; binary payloads and
//! code-with-scope values sit behind `Rc` so that cloning a container copies
//! the containers and shares those leaves.

use std::cell::RefCell;
use std::rc::Rc;

use bson_decimal128::Decimal128;

use super::constants::ElementType;
use super::document::{BsonArray, BsonDocument};
use super::oid::BsonObjectId;

/// Binary subtype tags.
pub mod subtype {
    pub const GENERIC: u8 = 0x00;
    pub const FUNCTION: u8 = 0x01;
    /// Deprecated; the wire payload repeats the length as an inner int32.
    pub const BINARY_OLD: u8 = 0x02;
    pub const UUID_OLD: u8 = 0x03;
    pub const UUID: u8 = 0x04;
    pub const MD5: u8 = 0x05;
    pub const ENCRYPTED: u8 = 0x06;
    pub const COLUMN: u8 = 0x07;
    pub const SENSITIVE: u8 = 0x08;
    pub const USER_DEFINED: u8 = 0x80;
}

/// BSON binary data (subtype + raw bytes). Mutable in place.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BsonBinary {
    pub subtype: u8,
    pub data: Vec<u8>,
}

impl BsonBinary {
    pub fn new(subtype: u8, data: Vec<u8>) -> Self {
        Self { subtype, data }
    }

    /// An independent copy; the payload bytes are not shared.
    pub fn deep_copy(&self) -> Self {
        Self {
            subtype: self.subtype,
            data: self.data.clone(),
        }
    }
}

/// BSON regular expression. Options are kept in sorted order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BsonRegex {
    pattern: String,
    options: String,
}

impl BsonRegex {
    pub fn new(pattern: impl Into<String>, options: &str) -> Self {
        let mut chars: Vec<char> = options.chars().collect();
        chars.sort_unstable();
        Self {
            pattern: pattern.into(),
            options: chars.into_iter().collect(),
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn options(&self) -> &str {
        &self.options
    }
}

/// BSON DBPointer (deprecated BSON type).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BsonDbPointer {
    pub namespace: String,
    pub id: BsonObjectId,
}

/// BSON JavaScript code (without scope).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BsonJavascriptCode {
    pub code: String,
}

/// BSON Symbol (deprecated BSON type).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BsonSymbol {
    pub symbol: String,
}

/// BSON JavaScript code with scope (deprecated).
#[derive(Debug, Clone, PartialEq)]
pub struct BsonJavascriptCodeWithScope {
    pub code: String,
    pub scope: BsonDocument,
}

/// BSON Timestamp (MongoDB internal replication timestamp).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BsonTimestamp {
    /// Seconds since the UNIX epoch.
    pub timestamp: u32,
    /// Ordinal within the second.
    pub increment: u32,
}

/// A BSON value that can appear as a document field value.
#[derive(Debug, Clone, PartialEq)]
pub enum BsonValue {
    /// BSON double (0x01)
    Float(f64),
    /// BSON UTF-8 string (0x02)
    Str(String),
    /// Embedded BSON document (0x03)
    Document(BsonDocument),
    /// BSON array (0x04)
    Array(BsonArray),
    /// BSON binary data (0x05), shared on clone
    Binary(Rc<RefCell<BsonBinary>>),
    /// BSON undefined (deprecated) (0x06)
    Undefined,
    /// BSON ObjectId (0x07)
    ObjectId(BsonObjectId),
    /// BSON boolean (0x08)
    Boolean(bool),
    /// BSON UTC datetime, milliseconds since epoch (0x09)
    DateTime(i64),
    /// BSON null (0x0a)
    Null,
    /// BSON regular expression (0x0b)
    Regex(BsonRegex),
    /// BSON DBPointer (deprecated) (0x0c)
    DbPointer(BsonDbPointer),
    /// BSON JavaScript code (0x0d)
    JavaScriptCode(BsonJavascriptCode),
    /// BSON Symbol (deprecated) (0x0e)
    Symbol(BsonSymbol),
    /// BSON JavaScript code with scope (deprecated) (0x0f), shared on clone
    JavaScriptCodeWithScope(Rc<BsonJavascriptCodeWithScope>),
    /// BSON int32 (0x10)
    Int32(i32),
    /// BSON Timestamp (0x11)
    Timestamp(BsonTimestamp),
    /// BSON int64 (0x12)
    Int64(i64),
    /// BSON Decimal128 (0x13)
    Decimal128(Decimal128),
    /// BSON MinKey (0xFF)
    MinKey,
    /// BSON MaxKey (0x7F)
    MaxKey,
}

impl BsonValue {
    pub fn binary(subtype: u8, data: Vec<u8>) -> Self {
        BsonValue::Binary(Rc::new(RefCell::new(BsonBinary::new(subtype, data))))
    }

    pub fn code_with_scope(code: impl Into<String>, scope: BsonDocument) -> Self {
        BsonValue::JavaScriptCodeWithScope(Rc::new(BsonJavascriptCodeWithScope {
            code: code.into(),
            scope,
        }))
    }

    pub fn regex(pattern: impl Into<String>, options: &str) -> Self {
        BsonValue::Regex(BsonRegex::new(pattern, options))
    }

    pub fn element_type(&self) -> ElementType {
        match self {
            BsonValue::Float(_) => ElementType::Double,
            BsonValue::Str(_) => ElementType::String,
            BsonValue::Document(_) => ElementType::Document,
            BsonValue::Array(_) => ElementType::Array,
            BsonValue::Binary(_) => ElementType::Binary,
            BsonValue::Undefined => ElementType::Undefined,
            BsonValue::ObjectId(_) => ElementType::ObjectId,
            BsonValue::Boolean(_) => ElementType::Boolean,
            BsonValue::DateTime(_) => ElementType::DateTime,
            BsonValue::Null => ElementType::Null,
            BsonValue::Regex(_) => ElementType::RegularExpression,
            BsonValue::DbPointer(_) => ElementType::DbPointer,
            BsonValue::JavaScriptCode(_) => ElementType::JavaScriptCode,
            BsonValue::Symbol(_) => ElementType::Symbol,
            BsonValue::JavaScriptCodeWithScope(_) => ElementType::JavaScriptCodeWithScope,
            BsonValue::Int32(_) => ElementType::Int32,
            BsonValue::Timestamp(_) => ElementType::Timestamp,
            BsonValue::Int64(_) => ElementType::Int64,
            BsonValue::Decimal128(_) => ElementType::Decimal128,
            BsonValue::MinKey => ElementType::MinKey,
            BsonValue::MaxKey => ElementType::MaxKey,
        }
    }

    /// Human-readable variant name, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        self.element_type().name()
    }
}

impl From<f64> for BsonValue {
    fn from(value: f64) -> Self {
        BsonValue::Float(value)
    }
}

impl From<i32> for BsonValue {
    fn from(value: i32) -> Self {
        BsonValue::Int32(value)
    }
}

impl From<i64> for BsonValue {
    fn from(value: i64) -> Self {
        BsonValue::Int64(value)
    }
}

impl From<bool> for BsonValue {
    fn from(value: bool) -> Self {
        BsonValue::Boolean(value)
    }
}

impl From<&str> for BsonValue {
    fn from(value: &str) -> Self {
        BsonValue::Str(value.to_owned())
    }
}

impl From<String> for BsonValue {
    fn from(value: String) -> Self {
        BsonValue::Str(value)
    }
}

impl From<BsonDocument> for BsonValue {
    fn from(value: BsonDocument) -> Self {
        BsonValue::Document(value)
    }
}

impl From<BsonArray> for BsonValue {
    fn from(value: BsonArray) -> Self {
        BsonValue::Array(value)
    }
}

impl From<BsonBinary> for BsonValue {
    fn from(value: BsonBinary) -> Self {
        BsonValue::Binary(Rc::new(RefCell::new(value)))
    }
}

impl From<BsonObjectId> for BsonValue {
    fn from(value: BsonObjectId) -> Self {
        BsonValue::ObjectId(value)
    }
}

impl From<BsonRegex> for BsonValue {
    fn from(value: BsonRegex) -> Self {
        BsonValue::Regex(value)
    }
}

impl From<BsonTimestamp> for BsonValue {
    fn from(value: BsonTimestamp) -> Self {
        BsonValue::Timestamp(value)
    }
}

impl From<Decimal128> for BsonValue {
    fn from(value: Decimal128) -> Self {
        BsonValue::Decimal128(value)
    }
}

//! BSON element type tags.

/// Wire tag of every BSON element type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ElementType {
    Double = 0x01,
    String = 0x02,
    Document = 0x03,
    Array = 0x04,
    Binary = 0x05,
    Undefined = 0x06,
    ObjectId = 0x07,
    Boolean = 0x08,
    DateTime = 0x09,
    Null = 0x0a,
    RegularExpression = 0x0b,
    DbPointer = 0x0c,
    JavaScriptCode = 0x0d,
    Symbol = 0x0e,
    JavaScriptCodeWithScope = 0x0f,
    Int32 = 0x10,
    Timestamp = 0x11,
    Int64 = 0x12,
    Decimal128 = 0x13,
    MaxKey = 0x7f,
    MinKey = 0xff,
}

impl ElementType {
    pub fn from_u8(tag: u8) -> Option<Self> {
        Some(match tag {
            0x01 => ElementType::Double,
            0x02 => ElementType::String,
            0x03 => ElementType::Document,
            0x04 => ElementType::Array,
            0x05 => ElementType::Binary,
            0x06 => ElementType::Undefined,
            0x07 => ElementType::ObjectId,
            0x08 => ElementType::Boolean,
            0x09 => ElementType::DateTime,
            0x0a => ElementType::Null,
            0x0b => ElementType::RegularExpression,
            0x0c => ElementType::DbPointer,
            0x0d => ElementType::JavaScriptCode,
            0x0e => ElementType::Symbol,
            0x0f => ElementType::JavaScriptCodeWithScope,
            0x10 => ElementType::Int32,
            0x11 => ElementType::Timestamp,
            0x12 => ElementType::Int64,
            0x13 => ElementType::Decimal128,
            0x7f => ElementType::MaxKey,
            0xff => ElementType::MinKey,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            ElementType::Double => "double",
            ElementType::String => "string",
            ElementType::Document => "document",
            ElementType::Array => "array",
            ElementType::Binary => "binary",
            ElementType::Undefined => "undefined",
            ElementType::ObjectId => "objectId",
            ElementType::Boolean => "boolean",
            ElementType::DateTime => "dateTime",
            ElementType::Null => "null",
            ElementType::RegularExpression => "regularExpression",
            ElementType::DbPointer => "dbPointer",
            ElementType::JavaScriptCode => "javascript",
            ElementType::Symbol => "symbol",
            ElementType::JavaScriptCodeWithScope => "javascriptWithScope",
            ElementType::Int32 => "int32",
            ElementType::Timestamp => "timestamp",
            ElementType::Int64 => "int64",
            ElementType::Decimal128 => "decimal128",
            ElementType::MaxKey => "maxKey",
            ElementType::MinKey => "minKey",
        }
    }
}

impl TryFrom<u8> for ElementType {
    type Error = u8;

    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        ElementType::from_u8(tag).ok_or(tag)
    }
}

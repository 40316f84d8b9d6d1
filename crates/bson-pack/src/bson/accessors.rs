//! `is_<kind>` / `as_<kind>` narrowing on [`BsonValue`].

use std::cell::{RefCell, RefMut};
use std::rc::Rc;

use bson_decimal128::Decimal128;

use super::document::{BsonArray, BsonDocument};
use super::oid::BsonObjectId;
use super::values::{
    BsonBinary, BsonDbPointer, BsonJavascriptCode, BsonJavascriptCodeWithScope, BsonRegex,
    BsonSymbol, BsonTimestamp, BsonValue,
};
use crate::error::InvalidOperationError;

macro_rules! narrow {
    ($is:ident, $as:ident, $variant:ident, $expected:literal, $ty:ty, |$v:ident| $get:expr) => {
        pub fn $is(&self) -> bool {
            matches!(self, BsonValue::$variant(_))
        }

        pub fn $as(&self) -> Result<$ty, InvalidOperationError> {
            match self {
                BsonValue::$variant($v) => Ok($get),
                other => Err(other.invalid($expected)),
            }
        }
    };
}

impl BsonValue {
    fn invalid(&self, expected: &'static str) -> InvalidOperationError {
        InvalidOperationError {
            expected,
            actual: self.kind_name(),
        }
    }

    narrow!(is_double, as_double, Float, "double", f64, |v| *v);
    narrow!(is_string, as_str, Str, "string", &str, |v| v.as_str());
    narrow!(is_document, as_document, Document, "document", &BsonDocument, |v| v);
    narrow!(is_array, as_array, Array, "array", &BsonArray, |v| v);
    narrow!(is_binary, as_binary, Binary, "binary", &Rc<RefCell<BsonBinary>>, |v| v);
    narrow!(is_object_id, as_object_id, ObjectId, "objectId", BsonObjectId, |v| *v);
    narrow!(is_boolean, as_boolean, Boolean, "boolean", bool, |v| *v);
    narrow!(is_date_time, as_date_time, DateTime, "dateTime", i64, |v| *v);
    narrow!(is_regex, as_regex, Regex, "regularExpression", &BsonRegex, |v| v);
    narrow!(is_db_pointer, as_db_pointer, DbPointer, "dbPointer", &BsonDbPointer, |v| v);
    narrow!(is_javascript_code, as_javascript_code, JavaScriptCode, "javascript", &BsonJavascriptCode, |v| v);
    narrow!(is_symbol, as_symbol, Symbol, "symbol", &BsonSymbol, |v| v);
    narrow!(
        is_javascript_code_with_scope,
        as_javascript_code_with_scope,
        JavaScriptCodeWithScope,
        "javascriptWithScope",
        &BsonJavascriptCodeWithScope,
        |v| v.as_ref()
    );
    narrow!(is_int32, as_int32, Int32, "int32", i32, |v| *v);
    narrow!(is_timestamp, as_timestamp, Timestamp, "timestamp", BsonTimestamp, |v| *v);
    narrow!(is_int64, as_int64, Int64, "int64", i64, |v| *v);
    narrow!(is_decimal128, as_decimal128, Decimal128, "decimal128", Decimal128, |v| *v);

    pub fn is_null(&self) -> bool {
        matches!(self, BsonValue::Null)
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, BsonValue::Undefined)
    }

    pub fn is_min_key(&self) -> bool {
        matches!(self, BsonValue::MinKey)
    }

    pub fn is_max_key(&self) -> bool {
        matches!(self, BsonValue::MaxKey)
    }

    /// True for double, int32, int64 and decimal128.
    pub fn is_number(&self) -> bool {
        matches!(
            self,
            BsonValue::Float(_) | BsonValue::Int32(_) | BsonValue::Int64(_) | BsonValue::Decimal128(_)
        )
    }

    pub fn as_document_mut(&mut self) -> Result<&mut BsonDocument, InvalidOperationError> {
        match self {
            BsonValue::Document(doc) => Ok(doc),
            other => Err(other.invalid("document")),
        }
    }

    pub fn as_array_mut(&mut self) -> Result<&mut BsonArray, InvalidOperationError> {
        match self {
            BsonValue::Array(arr) => Ok(arr),
            other => Err(other.invalid("array")),
        }
    }

    /// Mutable view of a binary payload. Clones of the containing tree see
    /// the change too.
    ///
    /// Fails while another borrow of the same shared payload is alive.
    pub fn as_binary_mut(&self) -> Result<RefMut<'_, BsonBinary>, InvalidOperationError> {
        match self {
            BsonValue::Binary(bin) => bin.try_borrow_mut().map_err(|_| InvalidOperationError {
                expected: "unborrowed binary",
                actual: "borrowed binary",
            }),
            other => Err(other.invalid("binary")),
        }
    }
}

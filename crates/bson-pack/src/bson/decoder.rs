//! BSON document decoder.
//!
//! BSON is a little-endian binary format. Every composite carries its own
//! byte length; the decoder checks that each one is consumed exactly and
//! never reads past the end of the enclosing composite.

use std::rc::Rc;

use bson_decimal128::Decimal128;
use log::{debug, trace};

use super::constants::ElementType;
use super::document::{BsonArray, BsonDocument};
use super::error::BsonError;
use super::oid::BsonObjectId;
use super::values::{
    subtype, BsonBinary, BsonDbPointer, BsonJavascriptCode, BsonJavascriptCodeWithScope,
    BsonRegex, BsonSymbol, BsonTimestamp, BsonValue,
};

/// Default nesting limit for documents and arrays.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Decoder configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BsonDecoderOptions {
    /// Deepest allowed document/array nesting; the top level is depth 1.
    pub max_depth: usize,
}

impl Default for BsonDecoderOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// BSON document decoder.
#[derive(Debug, Default, Clone)]
pub struct BsonDecoder {
    options: BsonDecoderOptions,
}

impl BsonDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: BsonDecoderOptions) -> Self {
        Self { options }
    }

    /// Decodes one complete document. The declared length must cover the
    /// whole buffer.
    pub fn decode(&self, data: &[u8]) -> Result<BsonDocument, BsonError> {
        trace!("decoding BSON document: {} bytes", data.len());
        let mut reader = Reader {
            data,
            x: 0,
            limit: data.len(),
            depth: 0,
            max_depth: self.options.max_depth,
        };
        let result = reader.read_top_level();
        if let Err(err) = &result {
            debug!("BSON decode failed at offset {}: {} ({})", reader.x, err, err.code());
        }
        result
    }
}

/// Cursor over one input buffer, scoped to a single `decode` call.
struct Reader<'a> {
    data: &'a [u8],
    x: usize,
    /// End of the innermost composite being read.
    limit: usize,
    depth: usize,
    max_depth: usize,
}

impl<'a> Reader<'a> {
    fn read_top_level(&mut self) -> Result<BsonDocument, BsonError> {
        let declared = self.peek_i32()?;
        if declared >= 0 && declared as usize != self.data.len() {
            if declared as usize > self.data.len() {
                return Err(BsonError::UnexpectedEof);
            }
            return Err(BsonError::LengthMismatch {
                declared: declared as usize,
                consumed: self.data.len(),
            });
        }
        self.read_document()
    }

    #[inline]
    fn check(&self, n: usize) -> Result<(), BsonError> {
        if n > self.limit.saturating_sub(self.x) {
            Err(BsonError::UnexpectedEof)
        } else {
            Ok(())
        }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], BsonError> {
        self.check(n)?;
        let slice = &self.data[self.x..self.x + n];
        self.x += n;
        Ok(slice)
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N], BsonError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    fn u8(&mut self) -> Result<u8, BsonError> {
        Ok(self.take_array::<1>()?[0])
    }

    fn peek_i32(&self) -> Result<i32, BsonError> {
        self.check(4)?;
        let b = &self.data[self.x..self.x + 4];
        Ok(i32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn i32_le(&mut self) -> Result<i32, BsonError> {
        Ok(i32::from_le_bytes(self.take_array()?))
    }

    fn u32_le(&mut self) -> Result<u32, BsonError> {
        Ok(u32::from_le_bytes(self.take_array()?))
    }

    fn i64_le(&mut self) -> Result<i64, BsonError> {
        Ok(i64::from_le_bytes(self.take_array()?))
    }

    fn f64_le(&mut self) -> Result<f64, BsonError> {
        Ok(f64::from_le_bytes(self.take_array()?))
    }

    fn utf8(&mut self, n: usize) -> Result<String, BsonError> {
        let bytes = self.take(n)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| BsonError::InvalidUtf8)
    }

    /// Reads a length prefix and checks it against `min` and the remaining bytes.
    fn read_length(&mut self, min: i32) -> Result<usize, BsonError> {
        let len = self.i32_le()?;
        if len < min {
            return Err(BsonError::InvalidLength(len.into()));
        }
        Ok(len as usize)
    }

    /// Runs `f` over a composite whose 4-byte length prefix starts at the
    /// cursor, requiring `f` to consume it exactly.
    fn framed<T>(&mut self, f: impl FnOnce(&mut Self, usize) -> Result<T, BsonError>) -> Result<T, BsonError> {
        let start = self.x;
        let declared = self.read_length(5)?;
        if declared > self.limit - start {
            return Err(BsonError::UnexpectedEof);
        }
        let end = start + declared;
        let outer_limit = self.limit;
        self.limit = end;
        let value = f(self, end)?;
        self.limit = outer_limit;
        if self.x != end {
            return Err(BsonError::LengthMismatch {
                declared,
                consumed: self.x - start,
            });
        }
        Ok(value)
    }

    fn enter(&mut self) -> Result<(), BsonError> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(BsonError::NestingTooDeep(self.max_depth));
        }
        Ok(())
    }

    /// Walks the elements of a document body, handing each key and value to `visit`.
    fn read_elements(
        &mut self,
        end: usize,
        mut visit: impl FnMut(String, BsonValue),
    ) -> Result<(), BsonError> {
        self.enter()?;
        loop {
            if self.x >= end {
                return Err(BsonError::MissingTerminator);
            }
            let element_type = self.u8()?;
            if element_type == 0 {
                break;
            }
            let key = self.read_cstring()?;
            let value = self.read_element_value(element_type)?;
            visit(key, value);
        }
        self.depth -= 1;
        Ok(())
    }

    fn read_document(&mut self) -> Result<BsonDocument, BsonError> {
        self.framed(|r, end| {
            let mut doc = BsonDocument::new();
            r.read_elements(end, |key, value| {
                doc.insert(key, value);
            })?;
            Ok(doc)
        })
    }

    /// Array keys are not checked; values are taken in wire order.
    fn read_array(&mut self) -> Result<BsonArray, BsonError> {
        self.framed(|r, end| {
            let mut arr = BsonArray::new();
            r.read_elements(end, |_, value| arr.push(value))?;
            Ok(arr)
        })
    }

    fn read_cstring(&mut self) -> Result<String, BsonError> {
        let rest = &self.data[self.x..self.limit];
        let len = rest
            .iter()
            .position(|&b| b == 0)
            .ok_or(BsonError::UnexpectedEof)?;
        let s = self.utf8(len)?;
        self.x += 1;
        Ok(s)
    }

    fn read_string(&mut self) -> Result<String, BsonError> {
        let length = self.read_length(1)?;
        self.check(length)?;
        if self.data[self.x + length - 1] != 0 {
            return Err(BsonError::MissingTerminator);
        }
        let s = self.utf8(length - 1)?;
        self.x += 1;
        Ok(s)
    }

    fn read_element_value(&mut self, tag: u8) -> Result<BsonValue, BsonError> {
        let element_type = ElementType::from_u8(tag).ok_or(BsonError::UnsupportedType(tag))?;
        Ok(match element_type {
            ElementType::Double => BsonValue::Float(self.f64_le()?),
            ElementType::String => BsonValue::Str(self.read_string()?),
            ElementType::Document => BsonValue::Document(self.read_document()?),
            ElementType::Array => BsonValue::Array(self.read_array()?),
            ElementType::Binary => self.read_binary()?,
            ElementType::Undefined => BsonValue::Undefined,
            ElementType::ObjectId => BsonValue::ObjectId(self.read_object_id()?),
            ElementType::Boolean => match self.u8()? {
                0 => BsonValue::Boolean(false),
                1 => BsonValue::Boolean(true),
                b => return Err(BsonError::InvalidBoolean(b)),
            },
            ElementType::DateTime => BsonValue::DateTime(self.i64_le()?),
            ElementType::Null => BsonValue::Null,
            ElementType::RegularExpression => {
                let pattern = self.read_cstring()?;
                let options = self.read_cstring()?;
                BsonValue::Regex(BsonRegex::new(pattern, &options))
            }
            ElementType::DbPointer => {
                let namespace = self.read_string()?;
                let id = self.read_object_id()?;
                BsonValue::DbPointer(BsonDbPointer { namespace, id })
            }
            ElementType::JavaScriptCode => BsonValue::JavaScriptCode(BsonJavascriptCode {
                code: self.read_string()?,
            }),
            ElementType::Symbol => BsonValue::Symbol(BsonSymbol {
                symbol: self.read_string()?,
            }),
            ElementType::JavaScriptCodeWithScope => self.read_code_with_scope()?,
            ElementType::Int32 => BsonValue::Int32(self.i32_le()?),
            ElementType::Timestamp => {
                let increment = self.u32_le()?;
                let timestamp = self.u32_le()?;
                BsonValue::Timestamp(BsonTimestamp {
                    timestamp,
                    increment,
                })
            }
            ElementType::Int64 => BsonValue::Int64(self.i64_le()?),
            ElementType::Decimal128 => {
                BsonValue::Decimal128(Decimal128::from_le_bytes(self.take_array()?))
            }
            ElementType::MinKey => BsonValue::MinKey,
            ElementType::MaxKey => BsonValue::MaxKey,
        })
    }

    fn read_binary(&mut self) -> Result<BsonValue, BsonError> {
        let length = self.read_length(0)?;
        let kind = self.u8()?;
        let data = if kind == subtype::BINARY_OLD {
            let inner = self.read_length(0)?;
            if inner + 4 != length {
                return Err(BsonError::LengthMismatch {
                    declared: length,
                    consumed: inner + 4,
                });
            }
            self.take(inner)?.to_vec()
        } else {
            self.take(length)?.to_vec()
        };
        Ok(BsonValue::from(BsonBinary::new(kind, data)))
    }

    fn read_object_id(&mut self) -> Result<BsonObjectId, BsonError> {
        Ok(BsonObjectId::from_bytes(self.take_array()?))
    }

    fn read_code_with_scope(&mut self) -> Result<BsonValue, BsonError> {
        let start = self.x;
        let declared = self.read_length(14)?;
        if declared > self.limit - start {
            return Err(BsonError::UnexpectedEof);
        }
        let outer_limit = self.limit;
        self.limit = start + declared;
        let code = self.read_string()?;
        let scope = self.read_document()?;
        self.limit = outer_limit;
        if self.x - start != declared {
            return Err(BsonError::LengthMismatch {
                declared,
                consumed: self.x - start,
            });
        }
        Ok(BsonValue::JavaScriptCodeWithScope(Rc::new(
            BsonJavascriptCodeWithScope { code, scope },
        )))
    }
}

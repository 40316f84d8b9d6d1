//! BSON document encoder.
//!
//! BSON is a little-endian binary format. All multi-byte integers are
//! written in little-endian byte order. The encoder measures the whole tree
//! first and writes into a buffer allocated once at the exact size.

use log::trace;

use super::document::{BsonArray, BsonDocument};
use super::error::BsonError;
use super::oid::BsonObjectId;
use super::values::{subtype, BsonValue};

/// Largest document the wire format can frame.
const MAX_DOCUMENT_SIZE: usize = i32::MAX as usize;

/// Encodes a [`BsonDocument`] to bytes.
///
/// The top level must always be a document. BSON has no scalar top-level
/// encoding.
#[derive(Debug, Default, Clone, Copy)]
pub struct BsonEncoder;

impl BsonEncoder {
    pub fn new() -> Self {
        Self
    }

    /// Encodes a BSON document to bytes.
    pub fn encode(&self, doc: &BsonDocument) -> Result<Vec<u8>, BsonError> {
        let size = document_size(doc);
        if size > MAX_DOCUMENT_SIZE {
            return Err(BsonError::DocumentTooLarge(size));
        }
        trace!("encoding BSON document: {} fields, {} bytes", doc.len(), size);
        let mut buf = Vec::with_capacity(size);
        self.write_document(&mut buf, doc)?;
        debug_assert_eq!(buf.len(), size);
        Ok(buf)
    }

    fn write_document(&self, buf: &mut Vec<u8>, doc: &BsonDocument) -> Result<(), BsonError> {
        let start = self.begin_frame(buf);
        for (key, value) in doc {
            self.write_key_value(buf, key, value)?;
        }
        self.end_frame(buf, start);
        Ok(())
    }

    fn write_array(&self, buf: &mut Vec<u8>, arr: &BsonArray) -> Result<(), BsonError> {
        let start = self.begin_frame(buf);
        for (index, value) in arr.iter().enumerate() {
            self.write_key_value(buf, &index.to_string(), value)?;
        }
        self.end_frame(buf, start);
        Ok(())
    }

    /// Reserves the 4-byte length placeholder and returns its offset.
    fn begin_frame(&self, buf: &mut Vec<u8>) -> usize {
        let start = buf.len();
        buf.extend_from_slice(&[0u8; 4]);
        start
    }

    /// Writes the terminator and patches the placeholder at `start`.
    fn end_frame(&self, buf: &mut Vec<u8>, start: usize) {
        buf.push(0);
        let len = (buf.len() - start) as i32;
        buf[start..start + 4].copy_from_slice(&len.to_le_bytes());
    }

    fn write_key_value(&self, buf: &mut Vec<u8>, key: &str, value: &BsonValue) -> Result<(), BsonError> {
        buf.push(value.element_type() as u8);
        self.write_cstring(buf, key)?;
        match value {
            BsonValue::Float(f) => buf.extend_from_slice(&f.to_le_bytes()),
            BsonValue::Str(s) => self.write_string(buf, s),
            BsonValue::Document(doc) => self.write_document(buf, doc)?,
            BsonValue::Array(arr) => self.write_array(buf, arr)?,
            BsonValue::Binary(bin) => {
                let bin = bin.borrow();
                let len = bin.data.len() as i32;
                if bin.subtype == subtype::BINARY_OLD {
                    buf.extend_from_slice(&(len + 4).to_le_bytes());
                    buf.push(bin.subtype);
                    buf.extend_from_slice(&len.to_le_bytes());
                } else {
                    buf.extend_from_slice(&len.to_le_bytes());
                    buf.push(bin.subtype);
                }
                buf.extend_from_slice(&bin.data);
            }
            BsonValue::Undefined | BsonValue::Null | BsonValue::MinKey | BsonValue::MaxKey => {}
            BsonValue::ObjectId(id) => self.write_object_id(buf, id),
            BsonValue::Boolean(b) => buf.push(u8::from(*b)),
            BsonValue::DateTime(ms) => buf.extend_from_slice(&ms.to_le_bytes()),
            BsonValue::Regex(regex) => {
                self.write_cstring(buf, regex.pattern())?;
                self.write_cstring(buf, regex.options())?;
            }
            BsonValue::DbPointer(ptr) => {
                self.write_string(buf, &ptr.namespace);
                self.write_object_id(buf, &ptr.id);
            }
            BsonValue::JavaScriptCode(jsc) => self.write_string(buf, &jsc.code),
            BsonValue::Symbol(sym) => self.write_string(buf, &sym.symbol),
            BsonValue::JavaScriptCodeWithScope(jscws) => {
                let start = self.begin_frame(buf);
                self.write_string(buf, &jscws.code);
                self.write_document(buf, &jscws.scope)?;
                let total_len = (buf.len() - start) as i32;
                buf[start..start + 4].copy_from_slice(&total_len.to_le_bytes());
            }
            BsonValue::Int32(i) => buf.extend_from_slice(&i.to_le_bytes()),
            BsonValue::Timestamp(ts) => {
                buf.extend_from_slice(&ts.increment.to_le_bytes());
                buf.extend_from_slice(&ts.timestamp.to_le_bytes());
            }
            BsonValue::Int64(i) => buf.extend_from_slice(&i.to_le_bytes()),
            BsonValue::Decimal128(dec) => buf.extend_from_slice(&dec.to_le_bytes()),
        }
        Ok(())
    }

    /// Writes a NUL-terminated C-string. Interior NUL bytes are rejected.
    fn write_cstring(&self, buf: &mut Vec<u8>, s: &str) -> Result<(), BsonError> {
        if s.as_bytes().contains(&0) {
            return Err(BsonError::NulInCString(s.to_owned()));
        }
        buf.extend_from_slice(s.as_bytes());
        buf.push(0);
        Ok(())
    }

    /// Writes a BSON string: little-endian i32 (byte_count+1) + UTF-8 bytes + null byte.
    fn write_string(&self, buf: &mut Vec<u8>, s: &str) {
        let bytes = s.as_bytes();
        buf.extend_from_slice(&((bytes.len() as i32) + 1).to_le_bytes());
        buf.extend_from_slice(bytes);
        buf.push(0);
    }

    fn write_object_id(&self, buf: &mut Vec<u8>, id: &BsonObjectId) {
        buf.extend_from_slice(&id.bytes());
    }
}

fn document_size(doc: &BsonDocument) -> usize {
    5 + doc
        .iter()
        .map(|(key, value)| element_size(key.len(), value))
        .sum::<usize>()
}

fn array_size(arr: &BsonArray) -> usize {
    5 + arr
        .iter()
        .enumerate()
        .map(|(index, value)| element_size(decimal_digits(index), value))
        .sum::<usize>()
}

/// Tag byte + key + NUL + payload.
fn element_size(key_len: usize, value: &BsonValue) -> usize {
    2 + key_len + payload_size(value)
}

fn string_size(s: &str) -> usize {
    4 + s.len() + 1
}

fn payload_size(value: &BsonValue) -> usize {
    match value {
        BsonValue::Float(_) | BsonValue::DateTime(_) | BsonValue::Int64(_) | BsonValue::Timestamp(_) => 8,
        BsonValue::Str(s) => string_size(s),
        BsonValue::Document(doc) => document_size(doc),
        BsonValue::Array(arr) => array_size(arr),
        BsonValue::Binary(bin) => {
            let bin = bin.borrow();
            let inner = if bin.subtype == subtype::BINARY_OLD { 4 } else { 0 };
            5 + inner + bin.data.len()
        }
        BsonValue::Undefined | BsonValue::Null | BsonValue::MinKey | BsonValue::MaxKey => 0,
        BsonValue::ObjectId(_) => 12,
        BsonValue::Boolean(_) => 1,
        BsonValue::Regex(regex) => regex.pattern().len() + 1 + regex.options().len() + 1,
        BsonValue::DbPointer(ptr) => string_size(&ptr.namespace) + 12,
        BsonValue::JavaScriptCode(jsc) => string_size(&jsc.code),
        BsonValue::Symbol(sym) => string_size(&sym.symbol),
        BsonValue::JavaScriptCodeWithScope(jscws) => 4 + string_size(&jscws.code) + document_size(&jscws.scope),
        BsonValue::Int32(_) => 4,
        BsonValue::Decimal128(_) => 16,
    }
}

fn decimal_digits(mut n: usize) -> usize {
    let mut digits = 1;
    while n >= 10 {
        n /= 10;
        digits += 1;
    }
    digits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bson::values::BsonTimestamp;

    fn hex(bytes: &[u8]) -> String {
        bytes.iter().map(|b| format!("{b:02X}")).collect()
    }

    #[test]
    fn empty_document() {
        let bytes = BsonEncoder::new().encode(&BsonDocument::new()).unwrap();
        assert_eq!(bytes, vec![5, 0, 0, 0, 0]);
    }

    #[test]
    fn int32_field() {
        let mut doc = BsonDocument::new();
        doc.insert("i", 1);
        let bytes = BsonEncoder::new().encode(&doc).unwrap();
        assert_eq!(hex(&bytes), "0C0000001069000100000000");
    }

    #[test]
    fn array_uses_index_keys() {
        let mut doc = BsonDocument::new();
        doc.insert("a", [10, 20].into_iter().collect::<BsonArray>());
        let bytes = BsonEncoder::new().encode(&doc).unwrap();
        assert_eq!(
            hex(&bytes),
            "1B000000046100130000001030000A000000103100140000000000"
        );
    }

    #[test]
    fn timestamp_writes_increment_first() {
        let mut doc = BsonDocument::new();
        doc.insert("a", BsonTimestamp { timestamp: 0x1234_5678, increment: 0x0000_0001 });
        let bytes = BsonEncoder::new().encode(&doc).unwrap();
        assert_eq!(hex(&bytes), "10000000116100010000007856341200");
    }

    #[test]
    fn old_binary_repeats_length() {
        let mut doc = BsonDocument::new();
        doc.insert("x", BsonValue::binary(subtype::BINARY_OLD, vec![0xff, 0xff]));
        let bytes = BsonEncoder::new().encode(&doc).unwrap();
        assert_eq!(hex(&bytes), "13000000057800060000000202000000FFFF00");
    }

    #[test]
    fn nul_in_key_is_rejected() {
        let mut doc = BsonDocument::new();
        doc.insert("a\0b", 1);
        assert!(matches!(
            BsonEncoder::new().encode(&doc),
            Err(BsonError::NulInCString(_))
        ));
    }

    #[test]
    fn nul_in_regex_is_rejected() {
        let mut doc = BsonDocument::new();
        doc.insert("r", BsonValue::regex("a\0", "i"));
        assert!(matches!(
            BsonEncoder::new().encode(&doc),
            Err(BsonError::NulInCString(_))
        ));
    }

    #[test]
    fn computed_size_matches_output() {
        let mut inner = BsonDocument::new();
        inner.insert("x", 1.5);
        let mut doc = BsonDocument::new();
        doc.insert("s", "hello");
        doc.insert("d", inner.clone());
        doc.insert("c", BsonValue::code_with_scope("f()", inner));
        doc.insert("l", (0..12).collect::<BsonArray>());
        let bytes = BsonEncoder::new().encode(&doc).unwrap();
        assert_eq!(bytes.len(), document_size(&doc));
        assert_eq!(i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize, bytes.len());
    }
}

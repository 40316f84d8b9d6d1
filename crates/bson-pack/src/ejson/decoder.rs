//! Extended JSON decoder.
//!
//! Parses UTF-8 JSON text into a raw JSON tree, then rewrites `$`-prefixed
//! type wrappers into [`BsonValue`]s. Canonical wrappers are accepted along
//! with the relaxed and legacy forms other producers emit.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use bson_decimal128::{Decimal128, NumberFormatError};
use chrono::DateTime;
use log::{debug, trace};

use crate::bson::{
    subtype, BsonArray, BsonBinary, BsonDbPointer, BsonDocument, BsonJavascriptCode,
    BsonObjectId, BsonRegex, BsonSymbol, BsonTimestamp, BsonValue,
};

use super::error::EjsonDecodeError;

/// Default nesting limit for arrays and objects.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Decoder configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EjsonDecoderOptions {
    pub max_depth: usize,
}

impl Default for EjsonDecoderOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// JSON as read, before wrapper objects are interpreted.
#[derive(Debug, Clone, PartialEq)]
enum Json {
    Null,
    Bool(bool),
    /// Integer literal that fits in an i64.
    Integer(i64),
    /// Any other number literal.
    Float(f64),
    Str(String),
    Array(Vec<Json>),
    Object(Vec<(String, Json)>),
}

impl Json {
    fn kind_name(&self) -> &'static str {
        match self {
            Json::Null => "null",
            Json::Bool(_) => "boolean",
            Json::Integer(_) | Json::Float(_) => "number",
            Json::Str(_) => "string",
            Json::Array(_) => "array",
            Json::Object(_) => "object",
        }
    }
}

/// Extended JSON decoder.
#[derive(Debug, Default, Clone)]
pub struct EjsonDecoder {
    options: EjsonDecoderOptions,
}

impl EjsonDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: EjsonDecoderOptions) -> Self {
        Self { options }
    }

    /// Decodes text whose top level is a plain document.
    pub fn decode_document(&self, text: &str) -> Result<BsonDocument, EjsonDecodeError> {
        match self.decode(text.as_bytes())? {
            BsonValue::Document(doc) => Ok(doc),
            other => Err(EjsonDecodeError::NotADocument(other.kind_name())),
        }
    }

    /// Decodes a single value of any type.
    pub fn decode_value(&self, text: &str) -> Result<BsonValue, EjsonDecodeError> {
        self.decode(text.as_bytes())
    }

    /// Decodes from UTF-8 bytes.
    pub fn decode(&self, input: &[u8]) -> Result<BsonValue, EjsonDecodeError> {
        trace!("decoding Extended JSON: {} bytes", input.len());
        let mut reader = Reader {
            data: input,
            x: 0,
            depth: 0,
            max_depth: self.options.max_depth,
        };
        let result = reader.read_document_text().and_then(transform);
        if let Err(err) = &result {
            debug!("Extended JSON decode failed near offset {}: {} ({})", reader.x, err, err.code());
        }
        result
    }
}

// ----------------------------------------------------------------
// JSON reader

struct Reader<'a> {
    data: &'a [u8],
    x: usize,
    depth: usize,
    max_depth: usize,
}

impl<'a> Reader<'a> {
    fn read_document_text(&mut self) -> Result<Json, EjsonDecodeError> {
        let value = self.read_any()?;
        self.skip_ws();
        if self.x != self.data.len() {
            return Err(EjsonDecodeError::TrailingCharacters(self.x));
        }
        Ok(value)
    }

    fn read_any(&mut self) -> Result<Json, EjsonDecodeError> {
        self.skip_ws();
        let x = self.x;
        match self.data.get(x) {
            Some(b'"') => Ok(Json::Str(self.read_string()?)),
            Some(b'[') => self.read_array(),
            Some(b'{') => self.read_object(),
            Some(b'f') => self.read_literal(b"false", Json::Bool(false)),
            Some(b'n') => self.read_literal(b"null", Json::Null),
            Some(b't') => self.read_literal(b"true", Json::Bool(true)),
            Some(c) if c.is_ascii_digit() || *c == b'-' => self.read_num(),
            _ => Err(EjsonDecodeError::InvalidJson(x)),
        }
    }

    fn skip_ws(&mut self) {
        while let Some(b' ' | b'\t' | b'\n' | b'\r') = self.data.get(self.x) {
            self.x += 1;
        }
    }

    fn read_literal(&mut self, literal: &[u8], value: Json) -> Result<Json, EjsonDecodeError> {
        if !self.data[self.x..].starts_with(literal) {
            return Err(EjsonDecodeError::InvalidJson(self.x));
        }
        self.x += literal.len();
        Ok(value)
    }

    fn digits(&mut self) -> usize {
        let start = self.x;
        while self.data.get(self.x).is_some_and(u8::is_ascii_digit) {
            self.x += 1;
        }
        self.x - start
    }

    fn read_num(&mut self) -> Result<Json, EjsonDecodeError> {
        let start = self.x;
        if self.data.get(self.x) == Some(&b'-') {
            self.x += 1;
        }
        if self.digits() == 0 {
            return Err(EjsonDecodeError::InvalidJson(start));
        }
        let mut is_float = false;
        if self.data.get(self.x) == Some(&b'.') {
            is_float = true;
            self.x += 1;
            if self.digits() == 0 {
                return Err(EjsonDecodeError::InvalidJson(start));
            }
        }
        if let Some(b'e' | b'E') = self.data.get(self.x) {
            is_float = true;
            self.x += 1;
            if let Some(b'+' | b'-') = self.data.get(self.x) {
                self.x += 1;
            }
            if self.digits() == 0 {
                return Err(EjsonDecodeError::InvalidJson(start));
            }
        }
        let s = std::str::from_utf8(&self.data[start..self.x])
            .map_err(|_| EjsonDecodeError::InvalidUtf8)?;
        if !is_float {
            if let Ok(i) = s.parse::<i64>() {
                return Ok(Json::Integer(i));
            }
        }
        s.parse::<f64>()
            .map(Json::Float)
            .map_err(|_| EjsonDecodeError::InvalidJson(start))
    }

    fn read_string(&mut self) -> Result<String, EjsonDecodeError> {
        if self.data.get(self.x) != Some(&b'"') {
            return Err(EjsonDecodeError::InvalidJson(self.x));
        }
        self.x += 1;
        let start = self.x;
        let end = self.find_end_quote(start)?;
        let s = decode_json_string(&self.data[start..end], start)?;
        self.x = end + 1;
        Ok(s)
    }

    fn find_end_quote(&self, start: usize) -> Result<usize, EjsonDecodeError> {
        let mut i = start;
        while i < self.data.len() {
            match self.data[i] {
                b'\\' => i += 2,
                b'"' => return Ok(i),
                _ => i += 1,
            }
        }
        Err(EjsonDecodeError::InvalidJson(start))
    }

    fn enter(&mut self) -> Result<(), EjsonDecodeError> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(EjsonDecodeError::NestingTooDeep(self.max_depth));
        }
        Ok(())
    }

    /// Consumes `,` between members or the closing `close`. Returns `true`
    /// at the end of the container.
    fn next_member(&mut self, close: u8, first: bool) -> Result<bool, EjsonDecodeError> {
        self.skip_ws();
        match self.data.get(self.x) {
            Some(&c) if c == close => {
                self.x += 1;
                Ok(true)
            }
            Some(b',') if !first => {
                self.x += 1;
                Ok(false)
            }
            _ if first => Ok(false),
            _ => Err(EjsonDecodeError::InvalidJson(self.x)),
        }
    }

    fn read_array(&mut self) -> Result<Json, EjsonDecodeError> {
        self.enter()?;
        self.x += 1;
        let mut arr = Vec::new();
        let mut first = true;
        while !self.next_member(b']', first)? {
            arr.push(self.read_any()?);
            first = false;
        }
        self.depth -= 1;
        Ok(Json::Array(arr))
    }

    fn read_object(&mut self) -> Result<Json, EjsonDecodeError> {
        self.enter()?;
        self.x += 1;
        let mut pairs = Vec::new();
        let mut first = true;
        while !self.next_member(b'}', first)? {
            self.skip_ws();
            let key = self.read_string()?;
            self.skip_ws();
            if self.data.get(self.x) != Some(&b':') {
                return Err(EjsonDecodeError::InvalidJson(self.x));
            }
            self.x += 1;
            let val = self.read_any()?;
            pairs.push((key, val));
            first = false;
        }
        self.depth -= 1;
        Ok(Json::Object(pairs))
    }
}

/// Decodes a JSON string body (content between quotes), handling escape sequences.
fn decode_json_string(bytes: &[u8], offset: usize) -> Result<String, EjsonDecodeError> {
    if !bytes.contains(&b'\\') {
        if let Some(pos) = bytes.iter().position(|&b| b < 0x20) {
            return Err(EjsonDecodeError::InvalidJson(offset + pos));
        }
        return std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|_| EjsonDecodeError::InvalidUtf8);
    }
    let mut quoted = Vec::with_capacity(bytes.len() + 2);
    quoted.push(b'"');
    quoted.extend_from_slice(bytes);
    quoted.push(b'"');
    serde_json::from_slice(&quoted).map_err(|_| EjsonDecodeError::InvalidJson(offset))
}

// ----------------------------------------------------------------
// Wrapper interpretation

/// Keys of an object being interpreted, with lookup helpers.
struct Members(Vec<(String, Json)>);

impl Members {
    fn has(&self, key: &str) -> bool {
        self.0.iter().any(|(k, _)| k == key)
    }

    /// `true` when the object holds exactly `expected` and nothing else.
    fn has_exact(&self, expected: &[&str]) -> bool {
        self.0.len() == expected.len() && expected.iter().all(|k| self.has(k))
    }

    fn get(&self, key: &str) -> Option<&Json> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    fn take(&mut self, key: &str) -> Option<Json> {
        let pos = self.0.iter().position(|(k, _)| k == key)?;
        Some(self.0.remove(pos).1)
    }

    fn str(&self, key: &str) -> Option<&str> {
        match self.get(key) {
            Some(Json::Str(s)) => Some(s),
            _ => None,
        }
    }
}

fn transform(value: Json) -> Result<BsonValue, EjsonDecodeError> {
    match value {
        Json::Null => Ok(BsonValue::Null),
        Json::Bool(b) => Ok(BsonValue::Boolean(b)),
        Json::Integer(i) => Ok(match i32::try_from(i) {
            Ok(small) => BsonValue::Int32(small),
            Err(_) => BsonValue::Int64(i),
        }),
        Json::Float(f) => Ok(BsonValue::Float(f)),
        Json::Str(s) => Ok(BsonValue::Str(s)),
        Json::Array(items) => items
            .into_iter()
            .map(transform)
            .collect::<Result<BsonArray, _>>()
            .map(BsonValue::Array),
        Json::Object(pairs) => transform_object(Members(pairs)),
    }
}

fn transform_document(pairs: Vec<(String, Json)>) -> Result<BsonDocument, EjsonDecodeError> {
    let mut doc = BsonDocument::with_capacity(pairs.len());
    for (key, val) in pairs {
        doc.insert(key, transform(val)?);
    }
    Ok(doc)
}

/// Fails with `ExtraKeys(kind)` unless the object holds exactly `keys`.
fn exact(members: &Members, keys: &[&str], kind: &'static str) -> Result<(), EjsonDecodeError> {
    if members.has_exact(keys) {
        Ok(())
    } else {
        Err(EjsonDecodeError::ExtraKeys(kind))
    }
}

fn transform_object(mut m: Members) -> Result<BsonValue, EjsonDecodeError> {
    if !m.0.iter().any(|(k, _)| k.starts_with('$')) {
        return transform_document(m.0).map(BsonValue::Document);
    }

    if m.has("$oid") {
        exact(&m, &["$oid"], "ObjectId")?;
        return m
            .str("$oid")
            .and_then(|s| BsonObjectId::parse_str(s).ok())
            .map(BsonValue::ObjectId)
            .ok_or(EjsonDecodeError::InvalidObjectId);
    }

    if m.has("$numberInt") {
        exact(&m, &["$numberInt"], "Int32")?;
        return m
            .str("$numberInt")
            .and_then(|s| s.parse::<i32>().ok())
            .map(BsonValue::Int32)
            .ok_or(EjsonDecodeError::InvalidInt32);
    }

    if m.has("$numberLong") {
        exact(&m, &["$numberLong"], "Int64")?;
        return m
            .str("$numberLong")
            .and_then(|s| s.parse::<i64>().ok())
            .map(BsonValue::Int64)
            .ok_or(EjsonDecodeError::InvalidInt64);
    }

    if m.has("$numberDouble") {
        exact(&m, &["$numberDouble"], "Double")?;
        return m
            .str("$numberDouble")
            .and_then(parse_double_text)
            .map(BsonValue::Float)
            .ok_or(EjsonDecodeError::InvalidDouble);
    }

    if m.has("$numberDecimal") {
        exact(&m, &["$numberDecimal"], "Decimal128")?;
        return match m.get("$numberDecimal") {
            Some(Json::Str(text)) => Ok(BsonValue::Decimal128(text.parse::<Decimal128>()?)),
            Some(other) => Err(NumberFormatError::Syntax(other.kind_name().to_owned()).into()),
            None => Err(EjsonDecodeError::ExtraKeys("Decimal128")),
        };
    }

    if m.has("$binary") {
        return transform_binary(&m);
    }

    if m.has("$uuid") {
        exact(&m, &["$uuid"], "UUID")?;
        return m
            .str("$uuid")
            .and_then(uuid_to_bytes)
            .map(|data| BsonValue::binary(subtype::UUID, data))
            .ok_or(EjsonDecodeError::InvalidUuid);
    }

    if m.has("$code") {
        if m.has("$scope") {
            exact(&m, &["$code", "$scope"], "CodeWScope")?;
            let code = m
                .str("$code")
                .map(str::to_owned)
                .ok_or(EjsonDecodeError::InvalidCodeWithScope)?;
            let scope = match m.take("$scope") {
                Some(Json::Object(pairs)) => transform_document(pairs)?,
                _ => return Err(EjsonDecodeError::InvalidCodeWithScope),
            };
            return Ok(BsonValue::code_with_scope(code, scope));
        }
        exact(&m, &["$code"], "Code")?;
        return m
            .str("$code")
            .map(|code| BsonValue::JavaScriptCode(BsonJavascriptCode { code: code.to_owned() }))
            .ok_or(EjsonDecodeError::InvalidCode);
    }

    if m.has("$symbol") {
        exact(&m, &["$symbol"], "Symbol")?;
        return m
            .str("$symbol")
            .map(|symbol| BsonValue::Symbol(BsonSymbol { symbol: symbol.to_owned() }))
            .ok_or(EjsonDecodeError::InvalidSymbol);
    }

    if m.has("$timestamp") {
        exact(&m, &["$timestamp"], "Timestamp")?;
        if let Some(Json::Object(inner)) = m.get("$timestamp") {
            let inner = Members(inner.clone());
            if inner.has_exact(&["t", "i"]) {
                let as_u32 = |key: &str| match inner.get(key) {
                    Some(Json::Integer(v)) => u32::try_from(*v).ok(),
                    _ => None,
                };
                if let (Some(timestamp), Some(increment)) = (as_u32("t"), as_u32("i")) {
                    return Ok(BsonValue::Timestamp(BsonTimestamp {
                        timestamp,
                        increment,
                    }));
                }
            }
        }
        return Err(EjsonDecodeError::InvalidTimestamp);
    }

    if m.has("$regularExpression") {
        exact(&m, &["$regularExpression"], "RegularExpression")?;
        if let Some(Json::Object(inner)) = m.get("$regularExpression") {
            let inner = Members(inner.clone());
            if inner.has_exact(&["pattern", "options"]) {
                if let (Some(pattern), Some(options)) = (inner.str("pattern"), inner.str("options")) {
                    return Ok(BsonValue::Regex(BsonRegex::new(pattern, options)));
                }
            }
        }
        return Err(EjsonDecodeError::InvalidRegularExpression);
    }

    // Legacy form only when both are strings; `{"$regex": <regex>, "$options": ..}`
    // is a query document.
    if let (Some(pattern), Some(options)) = (m.str("$regex"), m.str("$options")) {
        exact(&m, &["$regex", "$options"], "RegularExpression")?;
        return Ok(BsonValue::Regex(BsonRegex::new(pattern, options)));
    }

    if m.has("$dbPointer") {
        exact(&m, &["$dbPointer"], "DBPointer")?;
        if let Some(Json::Object(inner)) = m.take("$dbPointer") {
            let mut inner = Members(inner);
            if inner.has_exact(&["$ref", "$id"]) {
                let namespace = inner.str("$ref").map(str::to_owned);
                let id = inner.take("$id").map(transform).transpose()?;
                if let (Some(namespace), Some(BsonValue::ObjectId(id))) = (namespace, id) {
                    return Ok(BsonValue::DbPointer(BsonDbPointer { namespace, id }));
                }
            }
        }
        return Err(EjsonDecodeError::InvalidDbPointer);
    }

    if m.has("$date") {
        exact(&m, &["$date"], "Date")?;
        let ms = match m.take("$date") {
            Some(Json::Str(s)) => parse_iso_date(&s),
            Some(Json::Integer(ms)) => Some(ms),
            Some(Json::Object(inner)) => match transform_object(Members(inner)) {
                Ok(BsonValue::Int64(ms)) => Some(ms),
                _ => None,
            },
            _ => None,
        };
        return ms.map(BsonValue::DateTime).ok_or(EjsonDecodeError::InvalidDate);
    }

    if m.has("$minKey") {
        exact(&m, &["$minKey"], "MinKey")?;
        return match m.get("$minKey") {
            Some(Json::Integer(1)) => Ok(BsonValue::MinKey),
            _ => Err(EjsonDecodeError::InvalidMinKey),
        };
    }

    if m.has("$maxKey") {
        exact(&m, &["$maxKey"], "MaxKey")?;
        return match m.get("$maxKey") {
            Some(Json::Integer(1)) => Ok(BsonValue::MaxKey),
            _ => Err(EjsonDecodeError::InvalidMaxKey),
        };
    }

    if m.has("$undefined") {
        exact(&m, &["$undefined"], "Undefined")?;
        return match m.get("$undefined") {
            Some(Json::Bool(true)) => Ok(BsonValue::Undefined),
            _ => Err(EjsonDecodeError::InvalidUndefined),
        };
    }

    // DBRef convention ($ref + $id + optional fields) and unknown `$` keys
    // stay plain documents.
    transform_document(m.0).map(BsonValue::Document)
}

/// Canonical `{"$binary": {"base64", "subType"}}` or legacy
/// `{"$binary": "<base64>", "$type": "<hex>"}`.
fn transform_binary(m: &Members) -> Result<BsonValue, EjsonDecodeError> {
    let (b64, sub) = match m.get("$binary") {
        Some(Json::Object(inner)) => {
            exact(m, &["$binary"], "Binary")?;
            let inner = Members(inner.clone());
            if !inner.has_exact(&["base64", "subType"]) {
                return Err(EjsonDecodeError::InvalidBinary);
            }
            (inner.str("base64").map(str::to_owned), inner.str("subType").map(str::to_owned))
        }
        Some(Json::Str(b64)) => {
            exact(m, &["$binary", "$type"], "Binary")?;
            (Some(b64.clone()), m.str("$type").map(str::to_owned))
        }
        _ => return Err(EjsonDecodeError::InvalidBinary),
    };
    let (Some(b64), Some(sub)) = (b64, sub) else {
        return Err(EjsonDecodeError::InvalidBinary);
    };
    if sub.is_empty() || sub.len() > 2 {
        return Err(EjsonDecodeError::InvalidBinary);
    }
    let subtype = u8::from_str_radix(&sub, 16).map_err(|_| EjsonDecodeError::InvalidBinary)?;
    let data = STANDARD.decode(b64).map_err(|_| EjsonDecodeError::InvalidBinary)?;
    Ok(BsonValue::from(BsonBinary::new(subtype, data)))
}

/// `NaN`, `Infinity`, `-Infinity`, or a plain JSON-style number.
fn parse_double_text(s: &str) -> Option<f64> {
    match s {
        "NaN" => Some(f64::NAN),
        "Infinity" => Some(f64::INFINITY),
        "-Infinity" => Some(f64::NEG_INFINITY),
        other => {
            let numeric = !other.is_empty()
                && other
                    .bytes()
                    .all(|b| b.is_ascii_digit() || matches!(b, b'-' | b'+' | b'.' | b'e' | b'E'));
            if numeric {
                other.parse().ok()
            } else {
                None
            }
        }
    }
}

/// `xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx`
fn uuid_to_bytes(s: &str) -> Option<Vec<u8>> {
    let bytes = s.as_bytes();
    if bytes.len() != 36 {
        return None;
    }
    for (i, &b) in bytes.iter().enumerate() {
        let valid = if matches!(i, 8 | 13 | 18 | 23) {
            b == b'-'
        } else {
            b.is_ascii_hexdigit()
        };
        if !valid {
            return None;
        }
    }
    let hex: String = s.chars().filter(|&c| c != '-').collect();
    (0..16)
        .map(|i| u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16).ok())
        .collect()
}

/// RFC 3339 / ISO-8601 timestamp with offset, to milliseconds since epoch.
fn parse_iso_date(s: &str) -> Option<i64> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.timestamp_millis())
}

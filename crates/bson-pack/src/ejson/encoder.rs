//! Extended JSON encoder.
//!
//! Produces JSON text where BSON types are written as `$`-prefixed wrapper
//! objects (e.g. `{"$oid":"..."}`) in either canonical or relaxed mode.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{DateTime, SecondsFormat, Utc};
use log::trace;

use crate::bson::{
    BsonArray, BsonBinary, BsonDbPointer, BsonDocument, BsonObjectId, BsonRegex, BsonTimestamp,
    BsonValue,
};

/// Output flavour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EjsonMode {
    /// Every number and date is wrapped, so the text round-trips losslessly.
    #[default]
    Canonical,
    /// Native JSON numbers for finite ints and doubles, ISO-8601 strings
    /// for dates in years 1970 through 9999.
    Relaxed,
}

/// Options controlling Extended JSON encoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EjsonEncoderOptions {
    pub mode: EjsonMode,
}

/// Last millisecond of 9999-12-31.
const MAX_RELAXED_DATE_MS: i64 = 253_402_300_799_999;

/// Extended JSON encoder. Writes into an internal buffer that is reset on
/// every `encode_*` call.
#[derive(Debug, Default)]
pub struct EjsonEncoder {
    writer: String,
    pub options: EjsonEncoderOptions,
}

impl EjsonEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn canonical() -> Self {
        Self::with_options(EjsonEncoderOptions {
            mode: EjsonMode::Canonical,
        })
    }

    pub fn relaxed() -> Self {
        Self::with_options(EjsonEncoderOptions {
            mode: EjsonMode::Relaxed,
        })
    }

    pub fn with_options(options: EjsonEncoderOptions) -> Self {
        Self {
            writer: String::new(),
            options,
        }
    }

    fn is_canonical(&self) -> bool {
        self.options.mode == EjsonMode::Canonical
    }

    /// Encodes a document as a JSON object.
    pub fn encode_document(&mut self, doc: &BsonDocument) -> String {
        trace!("encoding {:?} Extended JSON: {} fields", self.options.mode, doc.len());
        self.writer.clear();
        self.write_document(doc);
        std::mem::take(&mut self.writer)
    }

    /// Encodes any single value.
    pub fn encode_value(&mut self, value: &BsonValue) -> String {
        self.writer.clear();
        self.write_any(value);
        std::mem::take(&mut self.writer)
    }

    fn write_any(&mut self, value: &BsonValue) {
        match value {
            BsonValue::Null => self.writer.push_str("null"),
            BsonValue::Boolean(b) => self.writer.push_str(if *b { "true" } else { "false" }),
            BsonValue::Str(s) => self.write_str(s),
            BsonValue::Document(doc) => self.write_document(doc),
            BsonValue::Array(arr) => self.write_arr(arr),
            BsonValue::Int32(v) => {
                if self.is_canonical() {
                    self.write_wrapped_text("$numberInt", &v.to_string());
                } else {
                    self.writer.push_str(&v.to_string());
                }
            }
            BsonValue::Int64(v) => {
                if self.is_canonical() {
                    self.write_wrapped_text("$numberLong", &v.to_string());
                } else {
                    self.writer.push_str(&v.to_string());
                }
            }
            BsonValue::Float(v) => {
                if self.is_canonical() || !v.is_finite() {
                    self.write_wrapped_text("$numberDouble", &format_double(*v));
                } else {
                    self.writer.push_str(&format_double(*v));
                }
            }
            BsonValue::Decimal128(v) => self.write_wrapped_text("$numberDecimal", &v.to_string()),
            BsonValue::DateTime(ms) => self.write_date(*ms),
            BsonValue::ObjectId(id) => self.write_object_id(id),
            BsonValue::Binary(bin) => self.write_binary(&bin.borrow()),
            BsonValue::Regex(regex) => self.write_regex(regex),
            BsonValue::JavaScriptCode(jsc) => {
                self.writer.push_str("{\"$code\":");
                self.write_str(&jsc.code);
                self.writer.push('}');
            }
            BsonValue::JavaScriptCodeWithScope(jscws) => {
                self.writer.push_str("{\"$code\":");
                self.write_str(&jscws.code);
                self.writer.push_str(",\"$scope\":");
                self.write_document(&jscws.scope);
                self.writer.push('}');
            }
            BsonValue::Symbol(sym) => {
                self.writer.push_str("{\"$symbol\":");
                self.write_str(&sym.symbol);
                self.writer.push('}');
            }
            BsonValue::Timestamp(ts) => self.write_timestamp(ts),
            BsonValue::DbPointer(ptr) => self.write_db_pointer(ptr),
            BsonValue::MinKey => self.writer.push_str("{\"$minKey\":1}"),
            BsonValue::MaxKey => self.writer.push_str("{\"$maxKey\":1}"),
            BsonValue::Undefined => self.writer.push_str("{\"$undefined\":true}"),
        }
    }

    /// Writes a JSON-encoded string with proper escaping.
    fn write_str(&mut self, s: &str) {
        let json = serde_json::to_string(s).unwrap_or_else(|_| "\"\"".to_string());
        self.writer.push_str(&json);
    }

    fn write_arr(&mut self, arr: &BsonArray) {
        self.writer.push('[');
        for (i, item) in arr.iter().enumerate() {
            if i > 0 {
                self.writer.push(',');
            }
            self.write_any(item);
        }
        self.writer.push(']');
    }

    fn write_document(&mut self, doc: &BsonDocument) {
        self.writer.push('{');
        for (i, (key, val)) in doc.iter().enumerate() {
            if i > 0 {
                self.writer.push(',');
            }
            self.write_str(key);
            self.writer.push(':');
            self.write_any(val);
        }
        self.writer.push('}');
    }

    /// `{"<key>":"<text>"}` where `text` needs no escaping.
    fn write_wrapped_text(&mut self, key: &str, text: &str) {
        self.writer.push_str("{\"");
        self.writer.push_str(key);
        self.writer.push_str("\":\"");
        self.writer.push_str(text);
        self.writer.push_str("\"}");
    }

    fn write_date(&mut self, ms: i64) {
        self.writer.push_str("{\"$date\":");
        let iso = if self.is_canonical() || !(0..=MAX_RELAXED_DATE_MS).contains(&ms) {
            None
        } else {
            DateTime::<Utc>::from_timestamp_millis(ms)
                .map(|dt| dt.to_rfc3339_opts(SecondsFormat::AutoSi, true))
        };
        match iso {
            Some(iso) => self.write_str(&iso),
            None => self.write_wrapped_text("$numberLong", &ms.to_string()),
        }
        self.writer.push('}');
    }

    fn write_object_id(&mut self, id: &BsonObjectId) {
        self.write_wrapped_text("$oid", &id.to_hex());
    }

    fn write_binary(&mut self, bin: &BsonBinary) {
        self.writer.push_str("{\"$binary\":{\"base64\":\"");
        self.writer.push_str(&STANDARD.encode(&bin.data));
        self.writer.push_str("\",\"subType\":\"");
        self.writer.push_str(&format!("{:02x}", bin.subtype));
        self.writer.push_str("\"}}");
    }

    fn write_regex(&mut self, regex: &BsonRegex) {
        self.writer.push_str("{\"$regularExpression\":{\"pattern\":");
        self.write_str(regex.pattern());
        self.writer.push_str(",\"options\":");
        self.write_str(regex.options());
        self.writer.push_str("}}");
    }

    fn write_timestamp(&mut self, ts: &BsonTimestamp) {
        self.writer.push_str("{\"$timestamp\":{\"t\":");
        self.writer.push_str(&ts.timestamp.to_string());
        self.writer.push_str(",\"i\":");
        self.writer.push_str(&ts.increment.to_string());
        self.writer.push_str("}}");
    }

    fn write_db_pointer(&mut self, ptr: &BsonDbPointer) {
        self.writer.push_str("{\"$dbPointer\":{\"$ref\":");
        self.write_str(&ptr.namespace);
        self.writer.push_str(",\"$id\":");
        self.write_object_id(&ptr.id);
        self.writer.push_str("}}");
    }
}

/// Shortest round-trip text for a double, always carrying a fractional
/// part or an exponent. Magnitudes of 1e16 and above or below 1e-4 use
/// scientific notation with an upper-case, signed exponent.
pub(crate) fn format_double(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    let abs = value.abs();
    if abs != 0.0 && !(1e-4..1e16).contains(&abs) {
        let s = format!("{value:e}");
        if let Some((mantissa, exponent)) = s.split_once('e') {
            let dot = if mantissa.contains('.') { "" } else { ".0" };
            let sign = if exponent.starts_with('-') { "" } else { "+" };
            return format!("{mantissa}{dot}E{sign}{exponent}");
        }
        return s;
    }
    let s = value.to_string();
    if s.contains('.') {
        s
    } else {
        s + ".0"
    }
}

use bson_pack::{BsonDecoder, BsonDecoderOptions, BsonDocument, BsonEncoder, BsonError, BsonValue, Error};

fn unhex(s: &str) -> Vec<u8> {
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).unwrap())
        .collect()
}

fn decode(s: &str) -> Result<BsonDocument, BsonError> {
    BsonDocument::from_bytes(&unhex(s))
}

#[test]
fn decode_error_matrix() {
    let cases: &[(&str, &str, BsonError)] = &[
        ("empty buffer", "", BsonError::UnexpectedEof),
        ("length only", "05000000", BsonError::UnexpectedEof),
        (
            "declared length shorter than buffer",
            "0C000000106900010000000000",
            BsonError::LengthMismatch {
                declared: 12,
                consumed: 13,
            },
        ),
        (
            "declared length longer than buffer",
            "0D0000001069000100000000",
            BsonError::UnexpectedEof,
        ),
        ("negative length", "FFFFFFFF", BsonError::InvalidLength(-1)),
        ("unknown type tag", "0C0000002069000100000000", BsonError::UnsupportedType(0x20)),
        ("tag 0x14", "0C0000001469000100000000", BsonError::UnsupportedType(0x14)),
        ("boolean 2", "090000000861000200", BsonError::InvalidBoolean(2)),
        (
            "missing terminator",
            "0B00000010690001000000",
            BsonError::MissingTerminator,
        ),
        ("invalid utf-8 string", "0E00000002610002000000FF0000", BsonError::InvalidUtf8),
        ("invalid utf-8 key", "0C00000010FF000100000000", BsonError::InvalidUtf8),
        ("zero string length", "0D000000026100000000000000", BsonError::InvalidLength(0)),
    ];
    for (description, input, expected) in cases {
        assert_eq!(decode(input).as_ref().err(), Some(expected), "{description}");
    }
}

#[test]
fn nested_document_length_must_match() {
    // {"a": {}} with the inner length claiming 6 bytes
    assert!(decode("0D000000036100060000000000").is_err());
    // same with the inner length claiming 4 bytes
    assert_eq!(decode("0D000000036100040000000000"), Err(BsonError::InvalidLength(4)));
    assert!(decode("0D000000036100050000000000").is_ok());
}

#[test]
fn cstring_must_end_inside_its_document() {
    // key runs into the parent's bytes without a NUL
    assert_eq!(decode("0800000010616161"), Err(BsonError::UnexpectedEof));
}

#[test]
fn code_with_scope_length_must_match() {
    let valid = "1E0000000F6100160000000200000078000C000000107800010000000000";
    assert!(decode(valid).is_ok());
    // total length 0x17 instead of 0x16
    let wrong = "1E0000000F6100170000000200000078000C000000107800010000000000";
    assert!(decode(wrong).is_err());
}

#[test]
fn old_binary_inner_length_must_match() {
    assert!(decode("13000000057800060000000202000000FFFF00").is_ok());
    assert_eq!(
        decode("13000000057800060000000203000000FFFF00"),
        Err(BsonError::LengthMismatch {
            declared: 6,
            consumed: 7
        })
    );
}

#[test]
fn nesting_limit_is_configurable() {
    let mut inner = BsonDocument::new();
    for _ in 0..10 {
        let mut outer = BsonDocument::new();
        outer.insert("a", inner);
        inner = outer;
    }
    let bytes = inner.to_bytes().unwrap();
    let strict = BsonDecoder::with_options(BsonDecoderOptions { max_depth: 5 });
    assert_eq!(strict.decode(&bytes), Err(BsonError::NestingTooDeep(5)));
    assert_eq!(BsonDecoder::new().decode(&bytes).unwrap(), inner);
}

#[test]
fn encode_error_matrix() {
    let mut doc = BsonDocument::new();
    doc.insert("bad\0key", BsonValue::Null);
    assert!(matches!(
        BsonEncoder::new().encode(&doc),
        Err(BsonError::NulInCString(_))
    ));

    let mut doc = BsonDocument::new();
    doc.insert("r", BsonValue::regex("a", "i\0"));
    assert!(matches!(doc.to_bytes(), Err(BsonError::NulInCString(_))));
}

#[test]
fn error_codes_are_stable() {
    let err: Error = decode("0C0000002069000100000000").unwrap_err().into();
    assert_eq!(err.code(), Some("unsupported_type"));
    assert_eq!(err.to_string(), "unsupported BSON element type: 0x20");
    assert_eq!(BsonError::UnexpectedEof.code(), "unexpected_eof");
    assert_eq!(BsonError::NestingTooDeep(1).code(), "nesting_too_deep");
}

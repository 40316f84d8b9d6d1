use bson_pack::{BsonDocument, BsonValue};

fn unhex(s: &str) -> Vec<u8> {
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).unwrap())
        .collect()
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02X}")).collect()
}

/// (description, canonical binary, canonical Extended JSON)
const VALID: &[(&str, &str, &str)] = &[
    (
        "int32 min",
        "0C0000001069000000008000",
        r#"{"i":{"$numberInt":"-2147483648"}}"#,
    ),
    (
        "int64 max",
        "10000000126100FFFFFFFFFFFFFF7F00",
        r#"{"a":{"$numberLong":"9223372036854775807"}}"#,
    ),
    (
        "double 1.0",
        "10000000016400000000000000F03F00",
        r#"{"d":{"$numberDouble":"1.0"}}"#,
    ),
    (
        "double -0.0",
        "10000000016400000000000000008000",
        r#"{"d":{"$numberDouble":"-0.0"}}"#,
    ),
    (
        "double large",
        "100000000164002A1BF5F41022B14300",
        r#"{"d":{"$numberDouble":"1.2345678921232E+18"}}"#,
    ),
    (
        "string with multi-byte characters",
        "170000000261000B00000068C3A96C6C6F20E282AC0000",
        r#"{"a":"héllo €"}"#,
    ),
    (
        "nested document and array",
        "250000000361001D0000000462001500000010300001000000023100020000007800000000",
        r#"{"a":{"b":[{"$numberInt":"1"},"x"]}}"#,
    ),
    (
        "binary generic",
        "1100000005780004000000000102030400",
        r#"{"x":{"$binary":{"base64":"AQIDBA==","subType":"00"}}}"#,
    ),
    (
        "binary uuid",
        "1D000000057800100000000473FFD26444B34C6990E8E7D1DFC035D400",
        r#"{"x":{"$binary":{"base64":"c//SZESzTGmQ6OfR38A11A==","subType":"04"}}}"#,
    ),
    (
        "binary old",
        "13000000057800060000000202000000FFFF00",
        r#"{"x":{"$binary":{"base64":"//8=","subType":"02"}}}"#,
    ),
    (
        "object id",
        "1400000007610056E1FC72E0C917E9C471416100",
        r#"{"a":{"$oid":"56e1fc72e0c917e9c4714161"}}"#,
    ),
    (
        "booleans, null and sentinels",
        "1D00000008740001086600000A6E00067500FF6D696E007F6D61780000",
        r#"{"t":true,"f":false,"n":null,"u":{"$undefined":true},"min":{"$minKey":1},"max":{"$maxKey":1}}"#,
    ),
    (
        "datetime",
        "10000000096100C5D8D6CC3B01000000",
        r#"{"a":{"$date":{"$numberLong":"1356351330501"}}}"#,
    ),
    (
        "datetime before epoch",
        "10000000096100C33CE7B9BDFFFFFF00",
        r#"{"a":{"$date":{"$numberLong":"-284643869501"}}}"#,
    ),
    (
        "regular expression",
        "0F0000000B610061626300696D0000",
        r#"{"a":{"$regularExpression":{"pattern":"abc","options":"im"}}}"#,
    ),
    (
        "regular expression as value of $regex query operator",
        "180000000B247265676578007061747465726E0069780000",
        r#"{"$regex":{"$regularExpression":{"pattern":"pattern","options":"ix"}}}"#,
    ),
    (
        "regular expression as value of $regex query operator with $options",
        "270000000B247265676578007061747465726E000002246F7074696F6E73000300000069780000",
        r#"{"$regex":{"$regularExpression":{"pattern":"pattern","options":""}},"$options":"ix"}"#,
    ),
    (
        "db pointer",
        "1D0000000C61000500000064622E630056E1FC72E0C917E9C471416100",
        r#"{"a":{"$dbPointer":{"$ref":"db.c","$id":{"$oid":"56e1fc72e0c917e9c4714161"}}}}"#,
    ),
    (
        "javascript code",
        "190000000D61000D00000066756E6374696F6E28297B7D0000",
        r#"{"a":{"$code":"function(){}"}}"#,
    ),
    (
        "symbol",
        "100000000E61000400000073796D0000",
        r#"{"a":{"$symbol":"sym"}}"#,
    ),
    (
        "javascript code with scope",
        "1E0000000F6100160000000200000078000C000000107800010000000000",
        r#"{"a":{"$code":"x","$scope":{"x":{"$numberInt":"1"}}}}"#,
    ),
    (
        "timestamp",
        "100000001161002A00000015CD5B0700",
        r#"{"a":{"$timestamp":{"t":123456789,"i":42}}}"#,
    ),
    (
        "decimal128 one",
        "180000001364000100000000000000000000000000403000",
        r#"{"d":{"$numberDecimal":"1"}}"#,
    ),
    (
        "decimal128 small",
        "180000001364007B000000000000000000000000002A3000",
        r#"{"d":{"$numberDecimal":"1.23E-9"}}"#,
    ),
    (
        "decimal128 negative zero with exponent",
        "18000000136400000000000000000000000000000054B000",
        r#"{"d":{"$numberDecimal":"-0E+10"}}"#,
    ),
];

#[test]
fn binary_round_trip_matrix() {
    for (description, canonical_bson, _) in VALID {
        let doc = BsonDocument::from_bytes(&unhex(canonical_bson))
            .unwrap_or_else(|e| panic!("{description}: {e}"));
        let bytes = doc.to_bytes().unwrap();
        assert_eq!(hex(&bytes), *canonical_bson, "{description}");
    }
}

#[test]
fn binary_to_canonical_json_matrix() {
    for (description, canonical_bson, canonical_json) in VALID {
        let doc = BsonDocument::from_bytes(&unhex(canonical_bson)).unwrap();
        assert_eq!(doc.to_ejson(), *canonical_json, "{description}");
    }
}

#[test]
fn canonical_json_round_trip_matrix() {
    for (description, canonical_bson, canonical_json) in VALID {
        let doc = BsonDocument::from_ejson(canonical_json)
            .unwrap_or_else(|e| panic!("{description}: {e}"));
        assert_eq!(doc.to_ejson(), *canonical_json, "{description}");
        assert_eq!(hex(&doc.to_bytes().unwrap()), *canonical_bson, "{description}");
    }
}

#[test]
fn canonical_json_is_valid_json() {
    for (description, _, canonical_json) in VALID {
        let parsed: serde_json::Value = serde_json::from_str(canonical_json).unwrap();
        let doc = BsonDocument::from_ejson(canonical_json).unwrap();
        let reparsed: serde_json::Value = serde_json::from_str(&doc.to_ejson()).unwrap();
        assert_eq!(parsed, reparsed, "{description}");
    }
}

#[test]
fn nan_double_survives_binary_round_trip() {
    let canonical_bson = "10000000016400000000000000F87F00";
    let doc = BsonDocument::from_bytes(&unhex(canonical_bson)).unwrap();
    match doc.get("d") {
        Some(BsonValue::Float(f)) => assert!(f.is_nan()),
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(hex(&doc.to_bytes().unwrap()), canonical_bson);
    assert_eq!(doc.to_ejson(), r#"{"d":{"$numberDouble":"NaN"}}"#);
}

#[test]
fn relaxed_output_matrix() {
    let cases: &[(&str, &str)] = &[
        ("0C0000001069000000008000", r#"{"i":-2147483648}"#),
        ("10000000126100FFFFFFFFFFFFFF7F00", r#"{"a":9223372036854775807}"#),
        ("10000000016400000000000000F03F00", r#"{"d":1.0}"#),
        ("100000000164002A1BF5F41022B14300", r#"{"d":1.2345678921232E+18}"#),
        ("10000000016400000000000000F87F00", r#"{"d":{"$numberDouble":"NaN"}}"#),
        ("10000000096100C5D8D6CC3B01000000", r#"{"a":{"$date":"2012-12-24T12:15:30.501Z"}}"#),
        ("10000000096100C33CE7B9BDFFFFFF00", r#"{"a":{"$date":{"$numberLong":"-284643869501"}}}"#),
        ("180000001364000100000000000000000000000000403000", r#"{"d":{"$numberDecimal":"1"}}"#),
    ];
    for (canonical_bson, relaxed_json) in cases {
        let doc = BsonDocument::from_bytes(&unhex(canonical_bson)).unwrap();
        assert_eq!(doc.to_relaxed_ejson(), *relaxed_json);
    }
}

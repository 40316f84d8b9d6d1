use std::rc::Rc;

use bson_pack::bson::{subtype, BsonJavascriptCodeWithScope};
use bson_pack::{
    AtomicCounter, BsonArray, BsonDocument, BsonObjectId, BsonTimestamp, BsonValue, Decimal128,
    ElementType,
};

fn sample() -> BsonDocument {
    let mut nested = BsonDocument::new();
    nested.insert("n", 1);

    let mut arr = BsonArray::new();
    arr.push(BsonArray::from_iter([1, 2]));
    arr.push(nested.clone());
    arr.push("scalar");
    arr.push(BsonValue::binary(subtype::GENERIC, vec![1, 2, 3]));
    arr.push(BsonValue::code_with_scope("x", nested.clone()));

    let mut doc = BsonDocument::new();
    doc.insert("arr", arr);
    doc.insert("doc", nested);
    doc
}

#[test]
fn clone_copies_containers_and_shares_payload_leaves() {
    let original = sample();
    let mut copy = original.deep_clone();
    assert_eq!(copy, original);

    let a = original.get("arr").unwrap().as_array().unwrap();
    let b = copy.get("arr").unwrap().as_array().unwrap();
    match (&a[3], &b[3]) {
        (BsonValue::Binary(x), BsonValue::Binary(y)) => assert!(Rc::ptr_eq(x, y)),
        other => panic!("unexpected {other:?}"),
    }
    match (&a[4], &b[4]) {
        (BsonValue::JavaScriptCodeWithScope(x), BsonValue::JavaScriptCodeWithScope(y)) => {
            assert!(Rc::ptr_eq(x, y))
        }
        other => panic!("unexpected {other:?}"),
    }

    // Mutating nested containers of the copy leaves the original untouched.
    let arr = copy.get_mut("arr").unwrap().as_array_mut().unwrap();
    arr[0].as_array_mut().unwrap().push(3);
    arr[1].as_document_mut().unwrap().insert("m", 2);
    arr[2] = BsonValue::from("changed");
    copy.get_mut("doc").unwrap().as_document_mut().unwrap().remove("n");

    let arr = original.get("arr").unwrap().as_array().unwrap();
    assert_eq!(arr[0].as_array().unwrap().len(), 2);
    assert_eq!(arr[1].as_document().unwrap().len(), 1);
    assert_eq!(arr[2].as_str(), Ok("scalar"));
    assert!(original.get("doc").unwrap().as_document().unwrap().contains_key("n"));
    assert_ne!(copy, original);
}

#[test]
fn shared_binary_mutation_is_visible_through_both_trees() {
    let original = sample();
    let copy = original.deep_clone();
    let bin = &copy.get("arr").unwrap().as_array().unwrap()[3];
    bin.as_binary_mut().unwrap().data.clear();
    let seen = &original.get("arr").unwrap().as_array().unwrap()[3];
    assert!(seen.as_binary().unwrap().borrow().data.is_empty());
}

#[test]
fn binary_deep_copy_detaches_the_payload() {
    let value = BsonValue::binary(subtype::USER_DEFINED, vec![9]);
    let detached = value.as_binary().unwrap().borrow().deep_copy();
    value.as_binary_mut().unwrap().data.push(10);
    assert_eq!(detached.data, vec![9]);
    assert_eq!(detached.subtype, subtype::USER_DEFINED);
}

#[test]
fn document_insert_keeps_first_position_on_overwrite() {
    let mut doc: BsonDocument = [("a", 1), ("b", 2)].into_iter().collect();
    assert_eq!(doc.insert("a", 3), Some(BsonValue::Int32(1)));
    let keys: Vec<&str> = doc.keys().map(String::as_str).collect();
    assert_eq!(keys, ["a", "b"]);
    assert_eq!(doc.remove("a"), Some(BsonValue::Int32(3)));
    assert_eq!(doc.len(), 1);
    assert!(!doc.is_empty());
}

#[test]
fn document_equality_is_order_sensitive() {
    let ab: BsonDocument = [("a", 1), ("b", 2)].into_iter().collect();
    let ba: BsonDocument = [("b", 2), ("a", 1)].into_iter().collect();
    assert_ne!(ab, ba);
    assert_ne!(ab.to_bytes().unwrap(), ba.to_bytes().unwrap());
}

#[test]
fn element_type_tags() {
    let cases: &[(u8, ElementType, &str)] = &[
        (0x01, ElementType::Double, "double"),
        (0x02, ElementType::String, "string"),
        (0x05, ElementType::Binary, "binary"),
        (0x0f, ElementType::JavaScriptCodeWithScope, "javascriptWithScope"),
        (0x13, ElementType::Decimal128, "decimal128"),
        (0x7f, ElementType::MaxKey, "maxKey"),
        (0xff, ElementType::MinKey, "minKey"),
    ];
    for (tag, kind, name) in cases {
        assert_eq!(ElementType::try_from(*tag), Ok(*kind));
        assert_eq!(kind.name(), *name);
    }
    for tag in [0x00, 0x14, 0x20, 0x80, 0xfe] {
        assert_eq!(ElementType::try_from(tag), Err(tag));
    }
}

#[test]
fn element_type_of_values() {
    let cases: Vec<(BsonValue, ElementType)> = vec![
        (BsonValue::Float(1.0), ElementType::Double),
        (BsonValue::from("s"), ElementType::String),
        (BsonValue::from(BsonDocument::new()), ElementType::Document),
        (BsonValue::from(BsonArray::new()), ElementType::Array),
        (BsonValue::binary(0, Vec::new()), ElementType::Binary),
        (BsonValue::Undefined, ElementType::Undefined),
        (BsonValue::from(BsonObjectId::from_bytes([0; 12])), ElementType::ObjectId),
        (BsonValue::from(true), ElementType::Boolean),
        (BsonValue::DateTime(0), ElementType::DateTime),
        (BsonValue::Null, ElementType::Null),
        (BsonValue::regex("a", ""), ElementType::RegularExpression),
        (BsonValue::code_with_scope("", BsonDocument::new()), ElementType::JavaScriptCodeWithScope),
        (BsonValue::from(1), ElementType::Int32),
        (
            BsonValue::from(BsonTimestamp {
                timestamp: 1,
                increment: 2,
            }),
            ElementType::Timestamp,
        ),
        (BsonValue::from(1i64), ElementType::Int64),
        (BsonValue::from(Decimal128::POSITIVE_ZERO), ElementType::Decimal128),
        (BsonValue::MinKey, ElementType::MinKey),
        (BsonValue::MaxKey, ElementType::MaxKey),
    ];
    for (value, kind) in cases {
        assert_eq!(value.element_type(), kind, "{value:?}");
        assert_eq!(value.kind_name(), kind.name());
    }
}

#[test]
fn code_with_scope_scope_is_a_document() {
    let value = BsonValue::code_with_scope("f()", [("x", 1)].into_iter().collect());
    let BsonJavascriptCodeWithScope { code, scope } = value.as_javascript_code_with_scope().unwrap();
    assert_eq!(code, "f()");
    assert_eq!(scope.get("x"), Some(&BsonValue::Int32(1)));
}

#[test]
fn regex_options_are_sorted() {
    let value = BsonValue::regex("^a", "xmi");
    assert_eq!(value.as_regex().unwrap().options(), "imx");
    assert_eq!(value.as_regex().unwrap().pattern(), "^a");
}

#[test]
fn object_id_hex_round_trip() {
    let id: BsonObjectId = "56e1fc72e0c917e9c4714161".parse().unwrap();
    assert_eq!(id.to_hex(), "56e1fc72e0c917e9c4714161");
    assert_eq!(id.to_string(), "56e1fc72e0c917e9c4714161");
    assert_eq!(id.timestamp(), 0x56e1_fc72);
    assert_eq!(id.bytes()[11], 0x61);
    assert!(BsonObjectId::parse_str("56E1FC72E0C917E9C4714161").is_ok());
    assert!(BsonObjectId::parse_str("xyz").is_err());
    assert!(BsonObjectId::parse_str("56e1fc72e0c917e9c47141610").is_err());
}

#[test]
fn generated_object_ids_are_unique_and_ordered_by_counter() {
    let a = BsonObjectId::new();
    let b = BsonObjectId::new();
    assert_ne!(a, b);
    assert_eq!(a.bytes()[4..9], b.bytes()[4..9]);
    let counter = |id: &BsonObjectId| {
        let bytes = id.bytes();
        u32::from_be_bytes([0, bytes[9], bytes[10], bytes[11]])
    };
    assert_eq!(counter(&b), (counter(&a) + 1) & 0x00ff_ffff);
}

#[test]
fn atomic_counter_wraps() {
    let counter = AtomicCounter::new(u32::MAX);
    assert_eq!(counter.get_and_increment(), u32::MAX);
    assert_eq!(counter.get(), 0);
    assert_eq!(counter.decrement_and_get(), u32::MAX);
    assert_eq!(counter.increment_and_get(), 0);
    assert!(counter.compare_and_set(0, 5));
    assert!(!counter.compare_and_set(0, 6));
    counter.set(7);
    assert_eq!(counter.get(), 7);
}

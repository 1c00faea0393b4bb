//! Value Codec Tests
//!
//! Tests for tagging and serializing values, and for restoring them.

use indexmap::IndexMap;
use mctag::value::{decode, encode};
use mctag::{TypeTag, Value};

// =============================================================================
// Helper Functions
// =============================================================================

fn round_trip(value: Value) -> Value {
    let encoded = encode(&value).unwrap();
    assert_eq!(encoded.tag, value.type_tag());
    decode(&encoded.payload, encoded.tag.flags()).unwrap()
}

fn payload_of(value: Value) -> String {
    String::from_utf8(encode(&value).unwrap().payload).unwrap()
}

fn object(pairs: &[(&str, Value)]) -> Value {
    Value::Object(
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect::<IndexMap<_, _>>(),
    )
}

// =============================================================================
// Round-Trip Tests
// =============================================================================

#[test]
fn test_round_trip_ints() {
    for i in [123, 0, -123, i64::MAX, i64::MIN] {
        assert_eq!(round_trip(Value::Int(i)), Value::Int(i));
    }
}

#[test]
fn test_round_trip_bools() {
    assert_eq!(round_trip(Value::Bool(true)), Value::Bool(true));
    assert_eq!(round_trip(Value::Bool(false)), Value::Bool(false));
}

#[test]
fn test_round_trip_floats() {
    for f in [123.456, 0.0, -123.456, 1e-7, 6.02e23] {
        assert_eq!(round_trip(Value::Float(f)), Value::Float(f));
    }
}

#[test]
fn test_round_trip_strings() {
    for s in ["Hello ALL", "", "Multi line\nOther line", "Line 1\nEND\nLine 2", "tab\there \"quoted\" ünïcödé"] {
        assert_eq!(round_trip(Value::from(s)), Value::from(s));
    }
}

#[test]
fn test_round_trip_sequences() {
    let empty = Value::Sequence(vec![]);
    assert_eq!(round_trip(empty.clone()), empty);

    let letters: Value = ["a", "b", "c"].into_iter().collect();
    assert_eq!(round_trip(letters.clone()), letters);

    let mixed = Value::Sequence(vec![
        Value::Int(3),
        Value::Float(9.5),
        Value::Null,
        Value::Bool(true),
        Value::Sequence(vec![Value::from("nested")]),
    ]);
    assert_eq!(round_trip(mixed.clone()), mixed);
}

#[test]
fn test_round_trip_objects() {
    let empty = Value::Object(IndexMap::new());
    assert_eq!(round_trip(empty.clone()), empty);

    let obj = object(&[
        ("a", Value::from("OK")),
        ("b", Value::Int(2)),
        ("c", Value::from("Fine")),
    ]);
    assert_eq!(round_trip(obj.clone()), obj);
}

#[test]
fn test_round_trip_null() {
    assert_eq!(round_trip(Value::Null), Value::Null);
}

// =============================================================================
// Payload Form Tests
// =============================================================================

#[test]
fn test_scalar_payloads() {
    assert_eq!(payload_of(Value::Int(123)), "123");
    assert_eq!(payload_of(Value::Int(-123)), "-123");
    assert_eq!(payload_of(Value::Float(123.456)), "123.456");
    assert_eq!(payload_of(Value::Float(0.0)), "0");
    assert_eq!(payload_of(Value::Bool(true)), "1");
    assert_eq!(payload_of(Value::Bool(false)), "");
}

#[test]
fn test_structured_payloads() {
    assert_eq!(payload_of(Value::from("Test data")), "\"Test data\"");
    assert_eq!(payload_of(Value::Null), "null");
    assert_eq!(
        payload_of(["a", "b", "c"].into_iter().collect()),
        r#"["a","b","c"]"#
    );
    assert_eq!(
        payload_of([3, 9, 1, 2, 5, 100500].into_iter().collect()),
        "[3,9,1,2,5,100500]"
    );
    assert_eq!(
        payload_of(object(&[
            ("a", Value::from("OK")),
            ("b", Value::Int(2)),
            ("c", Value::from("Fine")),
        ])),
        r#"{"a":"OK","b":2,"c":"Fine"}"#
    );
    assert_eq!(payload_of(Value::Object(IndexMap::new())), "{}");
}

#[test]
fn test_payloads_never_contain_raw_newlines() {
    let values = [
        Value::from("Line 1\nEND\nLine 2\r\n"),
        Value::Sequence(vec![Value::from("a\nb")]),
        object(&[("k\n", Value::from("\r\nEND\r\n"))]),
    ];
    for value in values {
        let payload = encode(&value).unwrap().payload;
        assert!(!payload.contains(&b'\n'), "raw newline in {:?}", value);
        assert!(!payload.contains(&b'\r'), "raw carriage return in {:?}", value);
    }
}

// =============================================================================
// Decoding Edge Cases
// =============================================================================

#[test]
fn test_bool_decoding_by_length() {
    assert_eq!(decode(b"", TypeTag::Bool.flags()).unwrap(), Value::Bool(false));
    assert_eq!(decode(b"1", TypeTag::Bool.flags()).unwrap(), Value::Bool(true));
    assert_eq!(decode(b"0", TypeTag::Bool.flags()).unwrap(), Value::Bool(true));
}

#[test]
fn test_object_keeps_key_order() {
    let value = decode(br#"{"z":1,"a":2,"m":3}"#, TypeTag::Object.flags()).unwrap();
    let keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["z", "a", "m"]);
}

#[test]
fn test_object_and_sequence_stay_distinct() {
    let seq = decode(b"[]", TypeTag::Sequence.flags()).unwrap();
    let obj = decode(b"{}", TypeTag::Object.flags()).unwrap();
    assert_eq!(seq, Value::Sequence(vec![]));
    assert_eq!(obj, Value::Object(IndexMap::new()));
    assert_ne!(seq, obj);
}

#[test]
fn test_unknown_flags_fall_back_to_text() {
    assert_eq!(decode(b"plain", 0).unwrap(), Value::from("plain"));
    assert_eq!(decode(b"{\"a\":1}", 4096).unwrap(), Value::from("{\"a\":1}"));
}

#[test]
fn test_bad_json_is_a_decode_error() {
    let err = decode(b"\"unterminated", TypeTag::String.flags()).unwrap_err();
    assert!(err.to_string().contains("String"));
}

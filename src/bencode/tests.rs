use std::collections::BTreeMap;

use bytes::Bytes;
use num_bigint::BigInt;

use super::*;

fn dict(entries: Vec<(&str, Value)>) -> Value {
    Value::Dict(
        entries
            .into_iter()
            .map(|(k, v)| (Bytes::copy_from_slice(k.as_bytes()), v))
            .collect(),
    )
}

#[test]
fn test_encode_strings() {
    assert_eq!(encode(&Value::string("")).unwrap(), b"0:");
    assert_eq!(encode(&Value::string("foo")).unwrap(), b"3:foo");
    assert_eq!(
        encode(&Value::string("foofoofoofoofoofoofoofoofoofoo")).unwrap(),
        b"30:foofoofoofoofoofoofoofoofoofoo"
    );
    assert_eq!(encode(&Value::bytes(&[97, 98, 99])).unwrap(), b"3:abc");
}

#[test]
fn test_encode_text_counts_utf8_bytes() {
    assert_eq!(encode(&Value::string("é")).unwrap(), "2:é".as_bytes());
}

#[test]
fn test_encode_integer() {
    assert_eq!(encode(&Value::from(1i64)).unwrap(), b"i1e");
    assert_eq!(encode(&Value::from(0i64)).unwrap(), b"i0e");
    assert_eq!(encode(&Value::from(-1i64)).unwrap(), b"i-1e");

    let big: BigInt = "1267650600228229401496703205377".parse().unwrap();
    assert_eq!(
        encode(&Value::Integer(big)).unwrap(),
        b"i1267650600228229401496703205377e"
    );
}

#[test]
fn test_from_f64_rejects_fractions() {
    assert_eq!(Value::from_f64(200.0).unwrap(), Value::from(200i64));
    assert!(matches!(
        Value::from_f64(0.5),
        Err(BencodeError::NonIntegral(_))
    ));
    assert!(Value::from_f64(f64::NAN).is_err());
    assert!(Value::from_f64(f64::INFINITY).is_err());
}

#[test]
fn test_encode_list() {
    let list = Value::List(vec![Value::string("spam"), Value::string("eggs")]);
    assert_eq!(encode(&list).unwrap(), b"l4:spam4:eggse");

    let mixed = Value::List(vec![Value::from(1i64), Value::string("a")]);
    assert_eq!(encode(&mixed).unwrap(), b"li1e1:ae");

    assert_eq!(encode(&Value::List(vec![])).unwrap(), b"le");
    assert_eq!(encode(&Value::Dict(BTreeMap::new())).unwrap(), b"de");
}

#[test]
fn test_encode_dict() {
    let value = dict(vec![(
        "spam",
        Value::List(vec![
            Value::string("a"),
            Value::string("b"),
            Value::from(1i64),
        ]),
    )]);
    assert_eq!(encode(&value).unwrap(), b"d4:spaml1:a1:bi1eee");
}

#[test]
fn test_encode_dict_nested() {
    let value = dict(vec![(
        "spam",
        Value::List(vec![
            Value::string("a"),
            Value::string("b"),
            Value::from(1i64),
            dict(vec![(
                "key",
                Value::List(vec![
                    Value::from(1i64),
                    Value::from(200i64),
                    dict(vec![(
                        "key",
                        Value::List(vec![Value::from(2i64), Value::from(3i64)]),
                    )]),
                ]),
            )]),
        ]),
    )]);
    assert_eq!(
        encode(&value).unwrap(),
        b"d4:spaml1:a1:bi1ed3:keyli1ei200ed3:keyli2ei3eeeeeee"
    );
}

#[test]
fn test_encode_binary_in_dict() {
    let value = dict(vec![("a", dict(vec![("b", Value::bytes(&[1, 2, 3]))]))]);
    assert_eq!(
        encode(&value).unwrap(),
        [100, 49, 58, 97, 100, 49, 58, 98, 51, 58, 1, 2, 3, 101, 101]
    );
}

#[test]
fn test_decode_integer() {
    assert_eq!(decode(b"i1e").unwrap(), Value::from(1i64));
    assert_eq!(decode(b"i0e").unwrap(), Value::from(0i64));
    assert_eq!(decode(b"i-1e").unwrap(), Value::from(-1i64));
    assert_eq!(
        decode(b"i9223372036854775807e").unwrap().as_integer(),
        Some(i64::MAX)
    );
    assert_eq!(
        decode(b"i-9223372036854775808e").unwrap().as_integer(),
        Some(i64::MIN)
    );
}

#[test]
fn test_decode_big_integer_keeps_precision() {
    let value = decode(b"i1267650600228229401496703205377e").unwrap();
    let expected: BigInt = "1267650600228229401496703205377".parse().unwrap();
    assert_eq!(value.as_bigint(), Some(&expected));
    assert_eq!(value.as_integer(), None);

    // one past i64::MAX has the same digit count as i64::MAX
    let value = decode(b"i9223372036854775808e").unwrap();
    assert_eq!(value.as_integer(), None);
    assert_eq!(
        value.as_bigint().unwrap().to_string(),
        "9223372036854775808"
    );
}

#[test]
fn test_decode_integer_invalid() {
    assert!(decode(b"i-0e").is_err());
    assert!(decode(b"i03e").is_err());
    assert!(decode(b"ie").is_err());
    assert!(decode(b"i-e").is_err());
    assert!(decode(b"i+5e").is_err());
    assert!(decode(b"i1.5e").is_err());
    assert!(matches!(
        decode(b"i42"),
        Err(BencodeError::UnexpectedEof { .. })
    ));
}

#[test]
fn test_decode_strings() {
    assert_eq!(decode_text(b"3:foo").unwrap(), Value::string("foo"));
    assert_eq!(decode_text(b"0:").unwrap(), Value::string(""));
    assert_eq!(decode(b"4:spam").unwrap(), Value::bytes(b"spam"));
    assert_eq!(
        decode_text(b"30:foofoofoofoofoofoofoofoofoofoo").unwrap(),
        Value::string("foofoofoofoofoofoofoofoofoofoo")
    );
}

#[test]
fn test_decode_text_tolerates_invalid_utf8() {
    let data = b"l3:abc2:\xff\x00e";
    let value = decode_text(data).unwrap();
    assert_eq!(
        value,
        Value::List(vec![Value::string("abc"), Value::bytes(&[0xff, 0x00])])
    );
}

#[test]
fn test_decode_string_truncated() {
    assert!(matches!(
        decode(b"5:abc"),
        Err(BencodeError::UnexpectedEof { .. })
    ));
    assert!(matches!(
        decode(b"3abc"),
        Err(BencodeError::UnexpectedEof { .. })
    ));
    assert!(matches!(
        decode(b"99999999999999999999999:a"),
        Err(BencodeError::InvalidStringLength { offset: 0 })
    ));
}

#[test]
fn test_decode_list() {
    assert_eq!(
        decode_text(b"l4:spam4:eggse").unwrap(),
        Value::List(vec![Value::string("spam"), Value::string("eggs")])
    );
    assert_eq!(
        decode_text(b"li1e1:ae").unwrap(),
        Value::List(vec![Value::from(1i64), Value::string("a")])
    );
    assert!(matches!(
        decode(b"li1e"),
        Err(BencodeError::UnexpectedEof { .. })
    ));
}

#[test]
fn test_decode_dict() {
    let value = decode_text(b"d4:spaml1:a1:bi1eee").unwrap();
    let spam = value.get(b"spam").and_then(|v| v.as_list()).unwrap();
    assert_eq!(
        spam,
        &vec![Value::string("a"), Value::string("b"), Value::from(1i64)]
    );
}

#[test]
fn test_decode_dict_duplicate_key_last_wins() {
    let value = decode(b"d1:ai1e1:ai2ee").unwrap();
    assert_eq!(value.as_dict().unwrap().len(), 1);
    assert_eq!(value.get(b"a").and_then(|v| v.as_integer()), Some(2));
}

#[test]
fn test_decode_dict_non_string_key() {
    assert!(matches!(
        decode(b"di1ei2ee"),
        Err(BencodeError::UnexpectedByte { offset: 1, byte: b'i' })
    ));
}

#[test]
fn test_decode_unexpected_byte() {
    let err = decode(b"x").unwrap_err();
    assert!(err.is_decode_error());
    assert_eq!(err.offset(), Some(0));
    assert!(matches!(
        err,
        BencodeError::UnexpectedByte { offset: 0, byte: b'x' }
    ));

    assert!(matches!(
        decode(b"l1:ax"),
        Err(BencodeError::UnexpectedByte { offset: 4, .. })
    ));
}

#[test]
fn test_decode_empty_input() {
    assert!(matches!(
        decode(b""),
        Err(BencodeError::UnexpectedEof { offset: 0 })
    ));
}

#[test]
fn test_trailing_data_error() {
    assert!(matches!(
        decode(b"i42eextra"),
        Err(BencodeError::TrailingData { offset: 4 })
    ));
    assert!(matches!(
        decode(b"0:0:"),
        Err(BencodeError::TrailingData { offset: 2 })
    ));
}

#[test]
fn test_decode_prefix_reports_next_offset() {
    let data = b"xxi7e4:spam";
    let (first, next) = decode_prefix(data, 2, false).unwrap();
    assert_eq!(first, Value::from(7i64));
    assert_eq!(next, 5);

    let (second, next) = decode_prefix(data, next, true).unwrap();
    assert_eq!(second, Value::string("spam"));
    assert_eq!(next, data.len());
}

#[test]
fn test_nesting_too_deep() {
    let mut data = vec![b'l'; 100];
    data.extend(vec![b'e'; 100]);
    assert!(matches!(
        decode(&data),
        Err(BencodeError::NestingTooDeep { .. })
    ));
}

#[test]
fn test_roundtrip_preserves_bytes() {
    let original = b"d8:announce15:http://test.com4:infod4:name4:test12:piece lengthi16384e6:pieces4:\x00\xff\x10\x80ee";
    let decoded = decode(original).unwrap();
    assert_eq!(encode(&decoded).unwrap(), original);

    let decoded_text = decode_text(original).unwrap();
    assert_eq!(encode(&decoded_text).unwrap(), original);
    assert_eq!(
        decoded_text.get(b"info").and_then(|i| i.get(b"pieces")),
        Some(&Value::bytes(&[0x00, 0xff, 0x10, 0x80]))
    );
}

#[test]
fn test_roundtrip_values() {
    let big: BigInt = "-98765432109876543210987654321".parse().unwrap();
    let values = vec![
        Value::from(0i64),
        Value::from(i64::MIN),
        Value::Integer(big),
        Value::bytes(&[0, 1, 2, 255]),
        Value::List(vec![]),
        Value::Dict(BTreeMap::new()),
        dict(vec![
            ("a", Value::List(vec![Value::bytes(b"x"), Value::from(3i64)])),
            ("b", Value::Dict(BTreeMap::new())),
        ]),
    ];

    for value in values {
        let encoded = encode(&value).unwrap();
        assert_eq!(decode(&encoded).unwrap(), value);
    }

    let text = dict(vec![("name", Value::string("ubuntu"))]);
    assert_eq!(decode_text(&encode(&text).unwrap()).unwrap(), text);
}

#[test]
fn test_roundtrip_mixed_strings() {
    let value = Value::List(vec![
        Value::string("a"),
        Value::bytes(b"b"),
        Value::bytes(&[0xff, 0x00]),
        dict(vec![("k", Value::string("v"))]),
    ]);
    let encoded = encode(&value).unwrap();

    assert_eq!(decode(&encoded).unwrap(), value);
    assert_eq!(decode_text(&encoded).unwrap(), value);
    assert_eq!(decode(b"3:foo").unwrap(), Value::string("foo"));
}

#[test]
fn test_string_views_compare_by_bytes() {
    assert_eq!(Value::string("spam"), Value::bytes(b"spam"));
    assert_ne!(Value::string("spam"), Value::bytes(b"eggs"));
    assert_ne!(Value::string("1"), Value::from(1i64));
    assert_ne!(Value::List(vec![]), Value::Dict(BTreeMap::new()));
}

#[test]
fn test_value_accessors() {
    let value = Value::from(42i64);
    assert_eq!(value.as_integer(), Some(42));
    assert!(value.as_bytes().is_none());

    let value = Value::bytes(b"test");
    assert_eq!(value.as_str(), Some("test"));
    assert!(value.as_integer().is_none());

    let value = Value::string("test");
    assert_eq!(value.as_bytes(), Some(b"test".as_slice()));

    let value = Value::List(vec![]);
    assert!(value.as_list().is_some());
    assert!(value.as_dict().is_none());
    assert!(value.get(b"x").is_none());
}

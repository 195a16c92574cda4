//! Property-based tests for the writer's structural guarantees
//!
//! Generated nested shapes must come back out of a standard JSON parser
//! unchanged, whatever the nesting and whatever the text content.

use pff_json::writer::quote;
use pff_json::{Scalar, Writer};
use proptest::prelude::*;
use serde_json::{Map, Value as Json};

fn leaf() -> impl Strategy<Value = Json> {
    prop_oneof![
        Just(Json::Null),
        any::<bool>().prop_map(Json::Bool),
        any::<i64>().prop_map(Json::from),
        any::<String>().prop_map(Json::String),
    ]
}

fn shape() -> impl Strategy<Value = Json> {
    leaf().prop_recursive(6, 64, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Json::Array),
            prop::collection::vec(inner, 0..6).prop_map(|members| {
                let map: Map<String, Json> = members
                    .into_iter()
                    .enumerate()
                    .map(|(i, v)| (format!("k{}", i), v))
                    .collect();
                Json::Object(map)
            }),
        ]
    })
}

fn emit(writer: &mut Writer<Vec<u8>>, value: &Json) {
    match value {
        Json::Null => writer.write_value(Scalar::Null).unwrap(),
        Json::Bool(b) => writer.write_value(*b).unwrap(),
        Json::Number(n) => writer.write_value(n.as_i64().unwrap()).unwrap(),
        Json::String(s) => writer.write_value(s.as_str()).unwrap(),
        Json::Array(items) => {
            writer.open_array().unwrap();
            for item in items {
                emit(writer, item);
            }
            writer.close_array().unwrap();
        }
        Json::Object(members) => {
            writer.open_object().unwrap();
            for (key, member) in members {
                writer.write_key(key).unwrap();
                emit(writer, member);
            }
            writer.close_object().unwrap();
        }
    }
}

proptest! {
    #[test]
    fn prop_nested_shapes_parse_back(value in shape()) {
        let mut writer = Writer::new(Vec::new());
        emit(&mut writer, &value);
        prop_assert_eq!(writer.depth(), 0);
        prop_assert_eq!(writer.scope_depth(), 1);

        let text = String::from_utf8(writer.into_inner()).unwrap();
        let parsed: Json = serde_json::from_str(&text).unwrap();
        prop_assert_eq!(parsed, value);
    }

    #[test]
    fn prop_documents_stream_back(values in prop::collection::vec(shape(), 1..5)) {
        let mut writer = Writer::new(Vec::new());
        for value in &values {
            emit(&mut writer, value);
            writer.reset().unwrap();
        }

        let text = String::from_utf8(writer.into_inner()).unwrap();
        let parsed: Vec<Json> = serde_json::Deserializer::from_str(&text)
            .into_iter::<Json>()
            .collect::<Result<_, _>>()
            .unwrap();
        prop_assert_eq!(parsed, values);
    }

    #[test]
    fn prop_quote_roundtrip(s in any::<String>()) {
        let quoted = quote(&s);
        prop_assert!(!quoted.bytes().any(|b| b < 0x20));
        let back: String = serde_json::from_str(&quoted).unwrap();
        prop_assert_eq!(back, s);
    }

    #[test]
    fn prop_base64_length(bytes in prop::collection::vec(any::<u8>(), 0..64)) {
        let mut writer = Writer::new(Vec::new());
        writer.write_value(bytes.as_slice()).unwrap();
        let text = String::from_utf8(writer.into_inner()).unwrap();

        let encoded = text.trim_matches('"');
        let len = bytes.len();
        prop_assert_eq!(encoded.len(), (len + 2) / 3 * 4);
        let padding = encoded.bytes().rev().take_while(|&b| b == b'=').count();
        prop_assert_eq!(padding, (3 - len % 3) % 3);
    }

    #[test]
    fn prop_one_separator_between_elements(items in prop::collection::vec(any::<i64>(), 0..32)) {
        let mut writer = Writer::new(Vec::new());
        writer.open_array().unwrap();
        for item in &items {
            writer.write_element(*item).unwrap();
        }
        writer.close_array().unwrap();

        let text = String::from_utf8(writer.into_inner()).unwrap();
        prop_assert_eq!(text.matches(",\n").count(), items.len().saturating_sub(1));
        if items.is_empty() {
            prop_assert_eq!(text, "[]");
        }
    }
}

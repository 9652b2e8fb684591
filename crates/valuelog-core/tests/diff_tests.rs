//! End-to-end diffs over captured values.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::BTreeMap;

use proptest::prelude::*;
use serde_json::json;
use valuelog_core::{capture, diff, diff_changes, diff_objects, Capture, Change};

#[test]
fn test_type_change_is_reported_as_such() {
    let out = diff_objects(&1i32, &"a").unwrap();
    assert_eq!(out, "[type change number -> string: 1 -> \"a\"]");
}

#[test]
fn test_bytes_field_equal_to_string_field_has_no_diff() {
    #[derive(Capture)]
    struct AsText {
        v: String,
    }
    #[derive(Capture)]
    struct AsBytes {
        v: Vec<u8>,
    }

    let text = AsText { v: "abc".into() };
    assert_eq!(diff_objects(&text, &AsBytes { v: b"abc".to_vec() }).unwrap(), "");
    assert_eq!(
        diff_objects(&text, &AsBytes { v: b"abd".to_vec() }).unwrap(),
        "[v: \"abc\" -> \"abd\"]"
    );
}

#[test]
fn test_map_diff_visits_keys_in_sorted_order() {
    let a = json!({"b": 1, "a": 2});
    let b = json!({"a": 2, "b": 2});
    assert_eq!(diff_objects(&a, &b).unwrap(), "[b: 1 -> 2]");
}

#[test]
fn test_array_edits() {
    let base = vec![1, 2, 3, 4];
    assert_eq!(diff_objects(&base, &vec![1, 2, 5, 3, 4]).unwrap(), "[insert[2]: 5]");
    assert_eq!(diff_objects(&base, &vec![1, 3, 4]).unwrap(), "[remove[1]: 2]");
    assert_eq!(diff_objects(&base, &vec![1, 2, 5, 4]).unwrap(), "[replace[2]: [3->5]]");
}

#[test]
fn test_nested_struct_change() {
    #[derive(Capture)]
    struct Server {
        host: String,
        ports: Vec<u16>,
        tags: BTreeMap<String, String>,
    }

    let before = Server {
        host: "a.example".into(),
        ports: vec![80, 443],
        tags: BTreeMap::from([("env".into(), "prod".into())]),
    };
    let after = Server {
        host: "a.example".into(),
        ports: vec![80, 8443],
        tags: BTreeMap::from([("env".into(), "prod".into()), ("team".into(), "web".into())]),
    };

    assert_eq!(
        diff_objects(&before, &after).unwrap(),
        "[ports: [80,443] -> [80,8443]]\
         [tags: {\"env\":\"prod\"} -> {\"env\":\"prod\",\"team\":\"web\"}]"
    );
}

#[test]
fn test_option_transitions() {
    assert_eq!(diff_objects(&None::<u8>, &Some(4u8)).unwrap(), "[nil to 4]");
    assert_eq!(diff_objects(&Some("x"), &None::<&str>).unwrap(), "[\"x\" to nil]");
}

#[test]
fn test_structured_changes_match_text() {
    let a = capture(&vec!["x", "y"]).unwrap();
    let b = capture(&vec!["x", "z", "w"]).unwrap();
    let changes = diff_changes(&a, &b);
    assert_eq!(
        changes[0],
        Change::Replace {
            index: 1,
            changes: vec![Change::Scalar {
                before: "\"y\"".into(),
                after: "\"z\"".into(),
            }],
        }
    );
    assert_eq!(diff(&a, &b), "[replace[1]: [\"y\"->\"z\"]][append[2]: \"w\"]");
}

fn json_value() -> impl Strategy<Value = serde_json::Value> {
    let leaf = prop_oneof![
        Just(serde_json::Value::Null),
        any::<bool>().prop_map(serde_json::Value::from),
        any::<i64>().prop_map(serde_json::Value::from),
        (-1.0e6f64..1.0e6).prop_map(serde_json::Value::from),
        "[a-z]{0,8}".prop_map(serde_json::Value::from),
    ];
    leaf.prop_recursive(3, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(serde_json::Value::from),
            prop::collection::btree_map("[a-z]{1,3}", inner, 0..4)
                .prop_map(|m| serde_json::Value::Object(m.into_iter().collect())),
        ]
    })
}

proptest! {
    #[test]
    fn prop_capturing_twice_yields_no_diff(value in json_value()) {
        let first = capture(&value).unwrap();
        let second = capture(&value).unwrap();
        prop_assert_eq!(diff(&first, &second), "");
    }

    #[test]
    fn prop_different_int_vectors_always_diff(a in prop::collection::vec(any::<i32>(), 0..8),
                                              b in prop::collection::vec(any::<i32>(), 0..8)) {
        let out = diff_objects(&a, &b).unwrap();
        prop_assert_eq!(out.is_empty(), a == b);
    }
}

//! `#[derive(Capture)]` shapes and attributes.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::BTreeMap;
use std::marker::PhantomData;

use serde_json::json;
use valuelog_core::{capture, capture_json, Capture, CapturedValue};

mod private {
    use valuelog_core::Capture;

    #[derive(Capture)]
    pub struct Account {
        owner: String,
        balance: i64,
        pin: u16,
    }

    impl Account {
        pub fn new(owner: &str, balance: i64) -> Self {
            Self {
                owner: owner.to_string(),
                balance,
                pin: 1234,
            }
        }
    }
}

#[derive(Capture)]
struct Renamed {
    #[capture(rename = "userName")]
    user_name: String,
    #[capture(skip)]
    #[allow(dead_code)]
    cache: Vec<u8>,
}

#[derive(Capture)]
struct Meters(f64);

#[derive(Capture)]
struct Point(i32, i32);

#[derive(Capture)]
struct Marker;

#[derive(Capture)]
enum Shape {
    Empty,
    Circle(f64),
    Rect(u32, u32),
    Labeled { label: String, sides: u8 },
    #[capture(rename = "poly")]
    Polygon(Vec<Point>),
}

#[derive(Capture)]
struct Wrapper<T> {
    inner: T,
    #[capture(skip)]
    _marker: PhantomData<T>,
}

fn to_json<T: Capture>(value: &T) -> serde_json::Value {
    serde_json::from_str(&capture_json(value).unwrap()).unwrap()
}

#[test]
fn test_private_fields_are_captured() {
    let account = private::Account::new("ada", 10);
    assert_eq!(
        to_json(&account),
        json!({"owner": "ada", "balance": 10, "pin": 1234})
    );
}

#[test]
fn test_rename_and_skip() {
    let value = Renamed {
        user_name: "grace".into(),
        cache: vec![1, 2, 3],
    };
    assert_eq!(to_json(&value), json!({"userName": "grace"}));
}

#[test]
fn test_struct_shapes() {
    assert_eq!(to_json(&Meters(2.5)), json!(2.5));
    assert_eq!(to_json(&Point(1, -2)), json!([1, -2]));
    assert_eq!(to_json(&Marker), json!({}));
}

#[test]
fn test_enum_variants() {
    assert_eq!(to_json(&Shape::Empty), json!("Empty"));
    assert_eq!(to_json(&Shape::Circle(1.5)), json!({"Circle": 1.5}));
    assert_eq!(to_json(&Shape::Rect(2, 3)), json!({"Rect": [2, 3]}));
    assert_eq!(
        to_json(&Shape::Labeled {
            label: "tri".into(),
            sides: 3
        }),
        json!({"Labeled": {"label": "tri", "sides": 3}})
    );
    assert_eq!(
        to_json(&Shape::Polygon(vec![Point(0, 0), Point(1, 1)])),
        json!({"poly": [[0, 0], [1, 1]]})
    );
}

#[test]
fn test_generic_struct() {
    let wrapped = Wrapper {
        inner: BTreeMap::from([("k", 1u8)]),
        _marker: PhantomData,
    };
    assert_eq!(to_json(&wrapped), json!({"inner": {"k": 1}}));
}

#[test]
fn test_newtype_of_text_is_not_aliased() {
    #[derive(Capture)]
    struct Name(&'static str);

    let a = Name("x");
    let pair = (&a, &a);
    assert_eq!(
        capture(&pair).unwrap(),
        CapturedValue::Array(vec![CapturedValue::from("x"), CapturedValue::from("x")])
    );
}

#[test]
fn test_non_finite_float_fields_render_as_text() {
    #[derive(Capture)]
    struct Reading {
        value: f64,
    }
    assert_eq!(
        to_json(&Reading { value: f64::NAN }),
        json!({"value": "NaN"})
    );
    assert_eq!(
        to_json(&Reading {
            value: f64::NEG_INFINITY
        }),
        json!({"value": "-Inf"})
    );
}

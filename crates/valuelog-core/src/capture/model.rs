//! Captured value tree.
//!
//! [`CapturedValue`] is the only shape the capture engine produces and the
//! only shape the diff engine consumes. Objects use `BTreeMap` so that the
//! JSON rendering of a tree is canonical: two captures of the same value
//! always encode to byte-identical text.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

use crate::errors::Result;

/// Byte runs of at least this length that are not printable text are
/// rendered as base64 instead of a number array.
pub const BASE64_THRESHOLD: usize = 1000;

/// A node of the captured tree.
#[derive(Debug, Clone, PartialEq)]
pub enum CapturedValue {
    Null,
    Bool(bool),
    Number(Number),
    /// Strings, plus the textual renderings of complex numbers, channels,
    /// functions, non-finite floats and back references.
    Text(String),
    Bytes(ByteRun),
    Array(Vec<CapturedValue>),
    Object(BTreeMap<String, CapturedValue>),
}

impl CapturedValue {
    /// Name of the variant, as used in type-change diff tokens.
    pub fn kind_name(&self) -> &'static str {
        match self {
            CapturedValue::Null => "null",
            CapturedValue::Bool(_) => "bool",
            CapturedValue::Number(_) => "number",
            CapturedValue::Text(_) => "string",
            CapturedValue::Bytes(_) => "bytes",
            CapturedValue::Array(_) => "array",
            CapturedValue::Object(_) => "object",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CapturedValue::Null)
    }

    pub fn as_object(&self) -> Option<&BTreeMap<String, CapturedValue>> {
        match self {
            CapturedValue::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[CapturedValue]> {
        match self {
            CapturedValue::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CapturedValue::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Look up a field of an object node.
    pub fn get(&self, key: &str) -> Option<&CapturedValue> {
        self.as_object().and_then(|map| map.get(key))
    }

    /// Compact JSON encoding of the tree.
    ///
    /// # Errors
    ///
    /// `Serialization` if the encoder rejects the tree.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Build an object node from `(key, value)` pairs.
    pub fn object<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, CapturedValue)>,
    {
        CapturedValue::Object(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Renders the compact JSON encoding.
impl fmt::Display for CapturedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

impl Serialize for CapturedValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            CapturedValue::Null => serializer.serialize_unit(),
            CapturedValue::Bool(b) => serializer.serialize_bool(*b),
            CapturedValue::Number(n) => n.serialize(serializer),
            CapturedValue::Text(s) => serializer.serialize_str(s),
            CapturedValue::Bytes(run) => run.serialize(serializer),
            CapturedValue::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            CapturedValue::Object(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map {
                    out.serialize_entry(k, v)?;
                }
                out.end()
            }
        }
    }
}

impl From<bool> for CapturedValue {
    fn from(b: bool) -> Self {
        CapturedValue::Bool(b)
    }
}

impl From<&str> for CapturedValue {
    fn from(s: &str) -> Self {
        CapturedValue::Text(s.to_owned())
    }
}

impl From<String> for CapturedValue {
    fn from(s: String) -> Self {
        CapturedValue::Text(s)
    }
}

impl From<i64> for CapturedValue {
    fn from(n: i64) -> Self {
        CapturedValue::Number(Number::I64(n))
    }
}

impl From<u64> for CapturedValue {
    fn from(n: u64) -> Self {
        CapturedValue::Number(Number::U64(n))
    }
}

impl From<f64> for CapturedValue {
    fn from(n: f64) -> Self {
        CapturedValue::Number(Number::F64(n))
    }
}

impl From<Vec<CapturedValue>> for CapturedValue {
    fn from(items: Vec<CapturedValue>) -> Self {
        CapturedValue::Array(items)
    }
}

/// A numeric leaf that keeps the width class of the source value, so that
/// `0.1f32` renders as `0.1` and a `u64` above `i64::MAX` stays exact.
///
/// Float variants are always finite when produced by the capture engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    I64(i64),
    U64(u64),
    I128(i128),
    U128(u128),
    F32(f32),
    F64(f64),
}

impl Number {
    pub fn is_float(&self) -> bool {
        matches!(self, Number::F32(_) | Number::F64(_))
    }

    /// Lossy widening used for float comparisons.
    pub fn as_f64(&self) -> f64 {
        match *self {
            Number::I64(n) => n as f64,
            Number::U64(n) => n as f64,
            Number::I128(n) => n as f64,
            Number::U128(n) => n as f64,
            Number::F32(n) => f64::from(n),
            Number::F64(n) => n,
        }
    }

    /// Exact integer value as `(negative, magnitude)`; `None` for floats.
    pub fn integer_parts(&self) -> Option<(bool, u128)> {
        match *self {
            Number::I64(n) => Some((n < 0, u128::from(n.unsigned_abs()))),
            Number::U64(n) => Some((false, u128::from(n))),
            Number::I128(n) => Some((n < 0, n.unsigned_abs())),
            Number::U128(n) => Some((false, n)),
            Number::F32(_) | Number::F64(_) => None,
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::I64(n) => write!(f, "{}", n),
            Number::U64(n) => write!(f, "{}", n),
            Number::I128(n) => write!(f, "{}", n),
            Number::U128(n) => write!(f, "{}", n),
            Number::F32(_) | Number::F64(_) => {
                let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
                f.write_str(&json)
            }
        }
    }
}

impl Serialize for Number {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match *self {
            Number::I64(n) => serializer.serialize_i64(n),
            Number::U64(n) => serializer.serialize_u64(n),
            Number::I128(n) => serializer.serialize_i128(n),
            Number::U128(n) => serializer.serialize_u128(n),
            Number::F32(n) => serializer.serialize_f32(n),
            Number::F64(n) => serializer.serialize_f64(n),
        }
    }
}

/// How a [`ByteRun`] is rendered, decided once per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteEncoding {
    /// Every byte is printable ASCII, `\n`, `\r` or `\t`: a JSON string.
    Text,
    /// Binary and at least [`BASE64_THRESHOLD`] long: a base64 string.
    Base64,
    /// Short binary: an array of numbers.
    Numbers,
}

impl ByteEncoding {
    pub fn classify(bytes: &[u8]) -> Self {
        let printable = bytes
            .iter()
            .all(|&b| matches!(b, 0x20..=0x7e | b'\n' | b'\r' | b'\t'));
        if printable {
            ByteEncoding::Text
        } else if bytes.len() >= BASE64_THRESHOLD {
            ByteEncoding::Base64
        } else {
            ByteEncoding::Numbers
        }
    }
}

/// A captured byte sequence (`[u8]`, `Vec<u8>`, `[u8; N]`, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByteRun {
    bytes: Vec<u8>,
    encoding: ByteEncoding,
}

impl ByteRun {
    pub fn new(bytes: Vec<u8>) -> Self {
        let encoding = ByteEncoding::classify(&bytes);
        Self { bytes, encoding }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn encoding(&self) -> ByteEncoding {
        self.encoding
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The plain text or number array this run is encoded as.
    pub fn rendered(&self) -> CapturedValue {
        match self.encoding {
            ByteEncoding::Text => {
                CapturedValue::Text(String::from_utf8_lossy(&self.bytes).into_owned())
            }
            ByteEncoding::Base64 => CapturedValue::Text(STANDARD.encode(&self.bytes)),
            ByteEncoding::Numbers => CapturedValue::Array(
                self.bytes
                    .iter()
                    .map(|&b| CapturedValue::Number(Number::U64(u64::from(b))))
                    .collect(),
            ),
        }
    }
}

impl Serialize for ByteRun {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self.encoding {
            // printable ASCII is always valid UTF-8
            ByteEncoding::Text => serializer.serialize_str(&String::from_utf8_lossy(&self.bytes)),
            ByteEncoding::Base64 => serializer.serialize_str(&STANDARD.encode(&self.bytes)),
            ByteEncoding::Numbers => {
                let mut seq = serializer.serialize_seq(Some(self.bytes.len()))?;
                for b in &self.bytes {
                    seq.serialize_element(b)?;
                }
                seq.end()
            }
        }
    }
}

/// A complex number. Rust has no built-in complex type; this one exists so
/// that complex values can be captured as `"(re+imi)"` text.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Complex<F> {
    pub re: F,
    pub im: F,
}

impl<F> Complex<F> {
    pub fn new(re: F, im: F) -> Self {
        Self { re, im }
    }
}

pub type Complex32 = Complex<f32>;
pub type Complex64 = Complex<f64>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_printable_bytes_render_as_escaped_string() {
        let run = ByteRun::new(b"line one\n\t\"quoted\"".to_vec());
        assert_eq!(run.encoding(), ByteEncoding::Text);
        let json = CapturedValue::Bytes(run).to_json().unwrap();
        assert_eq!(json, r#""line one\n\t\"quoted\"""#);
    }

    #[test]
    fn test_long_binary_renders_as_base64() {
        let run = ByteRun::new(vec![0u8; 2048]);
        assert_eq!(run.encoding(), ByteEncoding::Base64);
        let json = CapturedValue::Bytes(run).to_json().unwrap();
        assert_eq!(json, format!("\"{}\"", STANDARD.encode(vec![0u8; 2048])));
    }

    #[test]
    fn test_short_binary_renders_as_numbers() {
        let run = ByteRun::new(vec![0, 1, 255]);
        assert_eq!(run.encoding(), ByteEncoding::Numbers);
        assert_eq!(CapturedValue::Bytes(run).to_json().unwrap(), "[0,1,255]");
    }

    #[test]
    fn test_rendered_matches_json_encoding() {
        for bytes in [b"text\n".to_vec(), vec![0, 7], vec![0u8; 1500]] {
            let run = ByteRun::new(bytes);
            assert_eq!(
                run.rendered().to_json().unwrap(),
                CapturedValue::Bytes(run).to_json().unwrap()
            );
        }
    }

    #[test]
    fn test_binary_threshold_is_inclusive() {
        assert_eq!(
            ByteEncoding::classify(&vec![1u8; BASE64_THRESHOLD - 1]),
            ByteEncoding::Numbers
        );
        assert_eq!(
            ByteEncoding::classify(&vec![1u8; BASE64_THRESHOLD]),
            ByteEncoding::Base64
        );
    }

    #[test]
    fn test_object_keys_render_sorted() {
        let value = CapturedValue::object([
            ("zeta", CapturedValue::from(1i64)),
            ("alpha", CapturedValue::from(true)),
        ]);
        assert_eq!(value.to_string(), r#"{"alpha":true,"zeta":1}"#);
    }

    #[test]
    fn test_number_rendering_keeps_width() {
        assert_eq!(Number::F32(0.1).to_string(), "0.1");
        assert_eq!(Number::U64(u64::MAX).to_string(), "18446744073709551615");
        assert_eq!(Number::I128(-5).to_string(), "-5");
        assert_eq!(Number::I64(-3).integer_parts(), Some((true, 3)));
        assert_eq!(Number::F64(1.5).integer_parts(), None);
    }
}

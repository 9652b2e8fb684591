//! [`Capture`] for workspace and third-party types, plus dynamically typed
//! values (`dyn Any`).

use std::any::Any;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone};
use serde_json::Value;
use uuid::Uuid;
use valuelog_core_types::{Sensitive, REDACTED};

use super::model::{CapturedValue, Number};
use super::walker::{CaptureResult, Walker};
use super::Capture;
use crate::errors::CaptureError;

impl<T> Capture for Sensitive<T> {
    fn capture(&self, w: &mut Walker) -> CaptureResult {
        w.text(REDACTED)
    }

    fn tracks_identity(&self) -> bool {
        false
    }
}

impl Capture for Uuid {
    fn capture(&self, w: &mut Walker) -> CaptureResult {
        if w.is_surveying() {
            return w.null();
        }
        w.text(&self.hyphenated().to_string())
    }

    fn tracks_identity(&self) -> bool {
        false
    }
}

impl<Tz: TimeZone> Capture for DateTime<Tz>
where
    Tz::Offset: std::fmt::Display,
{
    fn capture(&self, w: &mut Walker) -> CaptureResult {
        if w.is_surveying() {
            return w.null();
        }
        w.text(&self.to_rfc3339())
    }

    fn tracks_identity(&self) -> bool {
        false
    }
}

impl Capture for NaiveDate {
    fn capture(&self, w: &mut Walker) -> CaptureResult {
        if w.is_surveying() {
            return w.null();
        }
        w.text(&self.to_string())
    }

    fn tracks_identity(&self) -> bool {
        false
    }
}

impl Capture for NaiveDateTime {
    fn capture(&self, w: &mut Walker) -> CaptureResult {
        if w.is_surveying() {
            return w.null();
        }
        w.text(&self.to_string())
    }

    fn tracks_identity(&self) -> bool {
        false
    }
}

/// JSON documents map onto the tree one to one; numbers keep their
/// integer/float class.
impl Capture for Value {
    fn capture(&self, w: &mut Walker) -> CaptureResult {
        match self {
            Value::Null => w.null(),
            Value::Bool(b) => w.bool(*b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    w.number(Number::I64(i))
                } else if let Some(u) = n.as_u64() {
                    w.number(Number::U64(u))
                } else {
                    w.float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            Value::String(s) => w.text(s),
            Value::Array(items) => w.seq().elements(items).finish(),
            Value::Object(map) => {
                let mut record = w.record();
                for (key, value) in map {
                    record.field(key, value);
                }
                record.finish()
            }
        }
    }
}

/// Re-emits an already captured tree, so snapshots can be nested in new
/// values.
impl Capture for CapturedValue {
    fn capture(&self, w: &mut Walker) -> CaptureResult {
        if w.is_surveying() {
            return w.null();
        }
        Ok(self.clone())
    }
}

/// Downcast a type-erased value to one of the kinds the engine knows.
fn capture_any(value: &dyn Any, w: &mut Walker) -> CaptureResult {
    macro_rules! try_kinds {
        ($($t:ty),+ $(,)?) => {$(
            if let Some(v) = value.downcast_ref::<$t>() {
                return v.capture(w);
            }
        )+};
    }

    try_kinds!(
        bool, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, char,
        String, &'static str, Vec<u8>, (), Value, CapturedValue, Uuid,
    );
    Err(CaptureError::unsupported(format!("{:?}", value.type_id())))
}

impl Capture for dyn Any {
    fn capture(&self, w: &mut Walker) -> CaptureResult {
        capture_any(self, w)
    }
}

impl Capture for dyn Any + Send {
    fn capture(&self, w: &mut Walker) -> CaptureResult {
        capture_any(self, w)
    }
}

impl Capture for dyn Any + Send + Sync {
    fn capture(&self, w: &mut Walker) -> CaptureResult {
        capture_any(self, w)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::capture;
    use serde_json::json;

    #[test]
    fn test_json_document_maps_structurally() {
        let doc = json!({"b": [1, 2.5, "x"], "a": null, "c": {"d": true}});
        let tree = capture(&doc).unwrap();
        assert_eq!(tree.to_string(), r#"{"a":null,"b":[1,2.5,"x"],"c":{"d":true}}"#);
    }

    #[test]
    fn test_sensitive_is_redacted() {
        let secret = Sensitive::new("hunter2".to_string());
        assert_eq!(capture(&secret).unwrap(), CapturedValue::from(REDACTED));
    }

    #[test]
    fn test_uuid_and_dates_render_as_text() {
        let id = Uuid::nil();
        assert_eq!(
            capture(&id).unwrap(),
            CapturedValue::from("00000000-0000-0000-0000-000000000000")
        );
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(capture(&date).unwrap(), CapturedValue::from("2024-02-29"));
    }

    #[test]
    fn test_any_downcasts_known_kinds() {
        let boxed: Box<dyn Any> = Box::new(42u16);
        assert_eq!(capture(&boxed).unwrap(), CapturedValue::from(42u64));
    }

    #[test]
    fn test_any_with_unknown_kind_fails() {
        struct Opaque;
        let boxed: Box<dyn Any> = Box::new(Opaque);
        let err = capture(&boxed).unwrap_err();
        assert!(matches!(err, CaptureError::UnsupportedKind { .. }));
    }
}

//! valuelog core: loggable, comparable snapshots of in-process values.
//!
//! This crate provides:
//! - the capture engine, turning any [`Capture`] value (cyclic graphs
//!   included) into a [`CapturedValue`] tree of JSON-compatible primitives;
//! - the structural diff engine, describing what changed between two trees;
//! - [`log_object`] / [`log_diff`], the leveled-sink boundary used by
//!   logging frameworks;
//! - the canonical error and logging facilities.
//!
//! ```
//! use valuelog_core::{capture_json, diff_objects, Capture};
//!
//! #[derive(Capture)]
//! struct Account {
//!     owner: String,
//!     balance: i64,
//! }
//!
//! let before = Account { owner: "ada".into(), balance: 10 };
//! let after = Account { owner: "ada".into(), balance: 25 };
//!
//! assert_eq!(capture_json(&before).unwrap(), r#"{"balance":10,"owner":"ada"}"#);
//! assert_eq!(diff_objects(&before, &after).unwrap(), "[balance: 10 -> 25]");
//! ```

// lets generated impls name `::valuelog_core` from inside this crate too
extern crate self as valuelog_core;

pub mod capture;
pub mod diff;
pub mod errors;
pub mod log_object;
pub mod logging_facility;

#[doc(hidden)]
pub use tracing;
pub use valuelog_core_types::schema;

// Re-export commonly used types
pub use capture::{
    capture, capture_json, ByteRun, Capture, CaptureResult, CapturedValue, ChannelDirection,
    Complex32, Complex64, FnName, Number, Walker,
};
pub use diff::{diff, diff_changes, diff_objects, Change};
pub use errors::{CaptureError, ExError, ExErrorKind, Result};
pub use log_object::{log_diff, log_object, Level, LevelSink, TracingSink};
pub use valuelog_core_types::{Sensitive, REDACTED};

/// Derive [`Capture`](trait@Capture) for structs and enums.
///
/// Named structs become objects keyed by field name, tuple structs become
/// arrays and newtypes are transparent. Unit enum variants render as their
/// name; data variants as `{"Variant": payload}`.
///
/// Field attributes: `#[capture(skip)]` and `#[capture(rename = "name")]`.
pub use valuelog_derive::Capture;

//! Structured logging facility.
//!
//! - a single initialization point, [`init`], selecting a [`Profile`];
//! - operation macros (`log_op_start!`, `log_op_end!`, `log_op_error!`)
//!   emitting the canonical fields of [`schema`](crate::schema);
//! - an in-memory capture layer for asserting on events in tests.
//!
//! The capture and diff engines log at `debug` level only; hosts opt in by
//! installing a subscriber, either their own or through [`init`].
//!
//! ```rust
//! use valuelog_core::logging_facility::{init, Profile};
//!
//! init(Profile::Production);
//! ```

pub mod init;
pub mod macros;
pub mod test_capture;

pub use init::{init, Profile};
pub use test_capture::{init_test_capture, CapturedEvent, TestCapture};

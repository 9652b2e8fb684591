//! Core types shared across valuelog facilities
//!
//! This crate provides foundational types used by the capture engine,
//! the logging facility and the CLI:
//!
//! - **Sensitive data**: Sensitive<T> marker for automatic redaction
//! - **Schema constants**: Canonical field keys and event names

pub mod schema;
pub mod sensitive;

pub use sensitive::{Sensitive, REDACTED};

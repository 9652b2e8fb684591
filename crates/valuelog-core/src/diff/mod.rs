//! Structural diff engine.
//!
//! Compares two captured trees and describes the difference as a sequence of
//! bracket-delimited tokens, e.g. `[b: 1 -> 2]` or `[insert[2]: 5]`. An
//! empty string means no observable difference.
//!
//! ## Entry points
//!
//! ```
//! use valuelog_core::diff_objects;
//!
//! let before = vec![1, 2, 3, 4];
//! let after = vec![1, 2, 5, 3, 4];
//! assert_eq!(diff_objects(&before, &after).unwrap(), "[insert[2]: 5]");
//! ```
//!
//! [`diff`] works on trees that were already captured; [`diff_changes`]
//! returns the structured [`Change`] records instead of text.
//!
//! ## Guarantees
//!
//! - **Determinism**: object keys are visited in sorted order.
//! - **Idempotence**: diffing two captures of the same value yields `""`.
//! - **Single pass**: arrays are aligned greedily with one element of
//!   lookahead, which favours readable output over a minimal edit script.

pub mod engine;
pub mod model;

pub use engine::{diff, diff_changes};
pub use model::{render_changes, Change};

use crate::capture::{capture, Capture};
use crate::errors::Result;
use valuelog_core_types::schema::{EVENT_END, OP_DIFF_OBJECTS};

/// Capture both values and diff the trees.
///
/// # Errors
///
/// Whatever [`capture`] reports for either side.
pub fn diff_objects<A, B>(a: &A, b: &B) -> Result<String>
where
    A: Capture + ?Sized,
    B: Capture + ?Sized,
{
    let start = std::time::Instant::now();
    let before = capture(a)?;
    let after = capture(b)?;
    let out = diff(&before, &after);
    tracing::debug!(
        component = module_path!(),
        op = OP_DIFF_OBJECTS,
        event = EVENT_END,
        duration_ms = start.elapsed().as_millis() as u64,
        diff_len = out.len(),
    );
    Ok(out)
}

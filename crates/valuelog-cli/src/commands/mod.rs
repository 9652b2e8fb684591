//! CLI command implementations

pub mod capture;
pub mod diff;

use std::path::Path;

use serde_json::Value;
use valuelog_core::{ExError, ExErrorKind};

/// Read and parse one JSON document.
pub fn read_document(path: &Path) -> Result<Value, ExError> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        ExError::new(ExErrorKind::Io)
            .with_op("read_document")
            .with_message(format!("cannot read {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&text).map_err(|e| {
        ExError::new(ExErrorKind::InvalidInput)
            .with_op("read_document")
            .with_message(format!("{} is not valid JSON: {}", path.display(), e))
    })
}

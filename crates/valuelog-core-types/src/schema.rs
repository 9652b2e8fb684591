//! Canonical schema constants for structured logging and events
//!
//! These constants ensure consistency across all logging and error reporting.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";

// Capture / diff measurements
pub const FIELD_ALIASED: &str = "aliased";
pub const FIELD_ADDR_COUNT: &str = "addr_count";
pub const FIELD_DIFF_LEN: &str = "diff_len";
pub const FIELD_TYPE_NAME: &str = "type_name";

// Error fields
pub const FIELD_ERR_KIND: &str = "err.kind";
pub const FIELD_ERR_CODE: &str = "err.code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";

// Canonical operation names
pub const OP_CAPTURE: &str = "capture";
pub const OP_DIFF_OBJECTS: &str = "diff_objects";
pub const OP_LOG_OBJECT: &str = "log_object";

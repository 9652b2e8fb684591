//! Leveled logging of captured values.
//!
//! A [`LevelSink`] accepts one pre-formatted line per level. [`log_object`]
//! captures a value, encodes it as JSON and writes `"<message> <json>"`;
//! [`log_diff`] writes `"<message> <diff>"` when two values differ.
//!
//! ```
//! use std::sync::Mutex;
//! use valuelog_core::{log_object, Level};
//!
//! let lines = Mutex::new(Vec::new());
//! let sink = |level: Level, line: &str| lines.lock().unwrap().push((level, line.to_owned()));
//!
//! log_object(&sink, Level::Info, "config", &vec![1, 2]).unwrap();
//! assert_eq!(lines.lock().unwrap()[0], (Level::Info, "config [1,2]".to_owned()));
//! ```

use std::fmt;
use std::time::Instant;

use crate::capture::{capture_json, Capture};
use crate::diff::diff_objects;
use crate::errors::ExError;
use crate::log_op_error;
use valuelog_core_types::schema::OP_LOG_OBJECT;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Level::Trace => "TRACE",
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
        };
        f.write_str(name)
    }
}

impl From<Level> for tracing::Level {
    fn from(level: Level) -> Self {
        match level {
            Level::Trace => tracing::Level::TRACE,
            Level::Debug => tracing::Level::DEBUG,
            Level::Info => tracing::Level::INFO,
            Level::Warn => tracing::Level::WARN,
            Level::Error => tracing::Level::ERROR,
        }
    }
}

/// Destination of formatted log lines.
pub trait LevelSink {
    fn write(&self, level: Level, line: &str);
}

impl<F> LevelSink for F
where
    F: Fn(Level, &str),
{
    fn write(&self, level: Level, line: &str) {
        self(level, line)
    }
}

/// Forwards lines to `tracing` events at the matching level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LevelSink for TracingSink {
    fn write(&self, level: Level, line: &str) {
        match level {
            Level::Trace => tracing::trace!("{}", line),
            Level::Debug => tracing::debug!("{}", line),
            Level::Info => tracing::info!("{}", line),
            Level::Warn => tracing::warn!("{}", line),
            Level::Error => tracing::error!("{}", line),
        }
    }
}

/// Capture `value` and write `"<message> <json>"` to `sink`.
///
/// # Errors
///
/// Capture or encoding failures; nothing is written in that case.
pub fn log_object<S, T>(sink: &S, level: Level, message: &str, value: &T) -> Result<(), ExError>
where
    S: LevelSink + ?Sized,
    T: Capture + ?Sized,
{
    let start = Instant::now();
    match capture_json(value) {
        Ok(json) => {
            sink.write(level, &format!("{} {}", message, json));
            Ok(())
        }
        Err(err) => {
            log_op_error!(
                OP_LOG_OBJECT,
                err.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            Err(err.into())
        }
    }
}

/// Diff `before` against `after` and write `"<message> <diff>"` to `sink`
/// if they differ. Returns whether a line was written.
///
/// # Errors
///
/// Capture failures on either side.
pub fn log_diff<S, A, B>(
    sink: &S,
    level: Level,
    message: &str,
    before: &A,
    after: &B,
) -> Result<bool, ExError>
where
    S: LevelSink + ?Sized,
    A: Capture + ?Sized,
    B: Capture + ?Sized,
{
    let start = Instant::now();
    let out = match diff_objects(before, after) {
        Ok(out) => out,
        Err(err) => {
            log_op_error!(
                OP_LOG_OBJECT,
                err.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            return Err(err.into());
        }
    };
    if out.is_empty() {
        return Ok(false);
    }
    sink.write(level, &format!("{} {}", message, out));
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ExErrorKind;
    use std::any::Any;
    use std::cell::RefCell;

    #[derive(Default)]
    struct RecordingSink {
        lines: RefCell<Vec<(Level, String)>>,
    }

    impl LevelSink for RecordingSink {
        fn write(&self, level: Level, line: &str) {
            self.lines.borrow_mut().push((level, line.to_owned()));
        }
    }

    #[test]
    fn test_log_object_writes_message_and_json() {
        let sink = RecordingSink::default();
        log_object(&sink, Level::Warn, "state", &("a", 1u8)).unwrap();
        assert_eq!(
            sink.lines.borrow().as_slice(),
            &[(Level::Warn, r#"state ["a",1]"#.to_owned())]
        );
    }

    #[test]
    fn test_log_object_failure_writes_nothing() {
        struct Opaque;
        let sink = RecordingSink::default();
        let value: Box<dyn Any> = Box::new(Opaque);
        let err = log_object(&sink, Level::Info, "opaque", &value).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::UnsupportedKind);
        assert!(sink.lines.borrow().is_empty());
    }

    #[test]
    fn test_log_diff_only_writes_when_different() {
        let sink = RecordingSink::default();
        assert!(!log_diff(&sink, Level::Info, "same", &vec![1, 2], &vec![1, 2]).unwrap());
        assert!(log_diff(&sink, Level::Info, "changed", &vec![1, 2], &vec![1, 3]).unwrap());
        assert_eq!(
            sink.lines.borrow().as_slice(),
            &[(Level::Info, "changed [replace[1]: [2->3]]".to_owned())]
        );
    }

    #[test]
    fn test_levels_order_and_map_to_tracing() {
        assert!(Level::Trace < Level::Error);
        assert_eq!(tracing::Level::from(Level::Warn), tracing::Level::WARN);
        assert_eq!(Level::Info.to_string(), "INFO");
    }

    #[test]
    fn test_tracing_sink_accepts_every_level() {
        for level in [Level::Trace, Level::Debug, Level::Info, Level::Warn, Level::Error] {
            TracingSink.write(level, "line");
        }
    }
}

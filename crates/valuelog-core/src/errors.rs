use thiserror::Error;

/// Result type alias using CaptureError
pub type Result<T> = std::result::Result<T, CaptureError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that can be used for programmatic
/// error handling, testing, and log-line classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    /// A value reached the capture engine through a type it cannot render
    UnsupportedKind,
    /// A captured tree (or an input document) could not be JSON encoded/decoded
    Serialization,
    /// Caller-supplied input is malformed
    InvalidInput,
    Io,
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::UnsupportedKind => "ERR_UNSUPPORTED_KIND",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Classification fields for programmatic handling plus free-form context
/// for whoever reads the log line.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    type_name: Option<String>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            type_name: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add the name of the type being captured
    pub fn with_type_name(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn type_name(&self) -> Option<&str> {
        self.type_name.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(type_name) = &self.type_name {
            write!(f, " (type: {})", type_name)?;
        }
        if let Some(source) = &self.source {
            write!(f, " <- {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Failures raised while capturing a value or encoding the captured tree
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CaptureError {
    /// The dispatch table has no rendering for this runtime kind
    #[error("Unsupported kind: {type_name}")]
    UnsupportedKind { type_name: String },

    /// Serialization error (JSON encoding of a captured tree)
    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl CaptureError {
    pub fn unsupported(type_name: impl Into<String>) -> Self {
        CaptureError::UnsupportedKind {
            type_name: type_name.into(),
        }
    }
}

impl From<serde_json::Error> for CaptureError {
    fn from(err: serde_json::Error) -> Self {
        CaptureError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<CaptureError> for ExError {
    fn from(err: CaptureError) -> Self {
        match err {
            CaptureError::UnsupportedKind { type_name } => {
                ExError::new(ExErrorKind::UnsupportedKind)
                    .with_op("capture")
                    .with_type_name(type_name)
                    .with_message("No capture rendering for this kind")
            }
            CaptureError::Serialization { message } => ExError::new(ExErrorKind::Serialization)
                .with_op("encode")
                .with_message(message),
        }
    }
}

impl From<std::io::Error> for ExError {
    fn from(err: std::io::Error) -> Self {
        ExError::new(ExErrorKind::Io).with_message(err.to_string())
    }
}

impl From<serde_json::Error> for ExError {
    fn from(err: serde_json::Error) -> Self {
        ExError::new(ExErrorKind::Serialization).with_message(err.to_string())
    }
}

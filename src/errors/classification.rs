use std::sync::LazyLock;

use regex::Regex;

use super::types::ReportError;

/// Shown instead of the raw server text when a failure reads as an authorization problem.
pub const PERMISSION_DENIED_MESSAGE: &str =
    "You do not have permission to generate reports for this selection. Contact your administrator.";

/// Shown when the stream dropped before a terminal event; the server-side outcome is unknown.
pub const CONNECTION_LOST_MESSAGE: &str =
    "Connection lost before the server reported completion. The outcome of the remaining reports is unknown; check the report list before resubmitting.";

static PERMISSION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(permission|forbidden|unauthori[sz]ed|not allowed|access denied|\b403\b)")
        .expect("permission pattern is valid")
});

/// Which part of the taxonomy an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// Rejected before any network call.
    Validation,
    /// The run was aborted by the server or by an access check.
    Stream,
    /// The connection dropped; the outcome is unknown.
    Transport,
    /// Local misconfiguration or internal fault.
    Local,
}

#[derive(Debug, Clone)]
pub struct ErrorClassification {
    pub error_type: &'static str,
    pub class: FailureClass,
    pub retryable: bool,
}

impl ReportError {
    /// Classify this error to determine its type and whether it can be retried.
    ///
    /// Only transient faults are retryable, and callers only retry idempotent
    /// reads. Generation requests are never retried automatically.
    pub fn classify(&self) -> ErrorClassification {
        use FailureClass::*;
        let (error_type, class, retryable) = match self {
            ReportError::RateLimit(_) => ("RateLimitError", Transport, true),
            ReportError::Timeout(_) => ("TimeoutError", Transport, true),
            ReportError::Network(_) => ("NetworkError", Transport, true),
            ReportError::ConnectionLost(_) => ("ConnectionLostError", Transport, false),

            ReportError::Validation(_) => ("ValidationError", Validation, false),
            ReportError::Incompatible(_) => ("IncompatibleTemplateError", Validation, false),
            ReportError::Busy(_) => ("BusyError", Validation, false),

            ReportError::Authentication(_) => ("AuthenticationError", Stream, false),
            ReportError::Permission(_) => ("PermissionError", Stream, false),
            ReportError::NotFound(_) => ("NotFoundError", Stream, false),
            ReportError::Backend(_) => ("BackendError", Stream, false),
            ReportError::Stream(_) => ("StreamError", Stream, false),

            ReportError::Config(_) => ("ConfigError", Local, false),
            ReportError::Io(_) => ("IoError", Local, false),
            ReportError::Json(_) => ("JsonError", Local, false),
            ReportError::Yaml(_) => ("YamlError", Local, false),
            ReportError::Internal(_) => ("InternalError", Local, false),
        };
        ErrorClassification { error_type, class, retryable }
    }

    /// The message surfaced to the user for a failed run.
    pub fn user_message(&self) -> String {
        match self {
            ReportError::Permission(_) | ReportError::Authentication(_) => {
                PERMISSION_DENIED_MESSAGE.to_string()
            }
            ReportError::ConnectionLost(_) => CONNECTION_LOST_MESSAGE.to_string(),
            ReportError::Validation(m)
            | ReportError::Incompatible(m)
            | ReportError::Backend(m)
            | ReportError::Stream(m) => reword_failure(m),
            other => reword_failure(&other.to_string()),
        }
    }
}

pub fn is_permission_message(message: &str) -> bool {
    PERMISSION_PATTERN.is_match(message)
}

/// Server failure text is surfaced verbatim unless it reads as an authorization failure.
pub fn reword_failure(message: &str) -> String {
    if is_permission_message(message) {
        PERMISSION_DENIED_MESSAGE.to_string()
    } else {
        message.to_string()
    }
}

//! Error handling for the API monitor
//!
//! Two layers of errors exist here:
//! - `MonitorError` for anything that stops the monitor from starting
//!   (bad configuration, HTTP client construction, logging setup)
//! - `WriteError` for a single failed write to the time-series sink, which
//!   the driver logs and moves past

use thiserror::Error;

/// Result type for monitor operations
pub type Result<T> = std::result::Result<T, MonitorError>;

/// Main error type for the API monitor
#[derive(Error, Debug)]
pub enum MonitorError {
    /// Missing or invalid configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// HTTP client could not be built
    #[error("HTTP client error: {0}")]
    Http(String),

    /// Sink write failure surfaced to the caller
    #[error("Sink error: {0}")]
    Sink(#[from] WriteError),

    /// File system errors (config files)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Tracing subscriber setup failed
    #[error("Logging error: {0}")]
    Logging(String),
}

impl MonitorError {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        MonitorError::Configuration(message.into())
    }

    /// Create an HTTP client error
    pub fn http(message: impl Into<String>) -> Self {
        MonitorError::Http(message.into())
    }

    /// Create a logging error
    pub fn logging(message: impl Into<String>) -> Self {
        MonitorError::Logging(message.into())
    }
}

/// Failure to persist one observation to the sink
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WriteError {
    /// Sink could not be reached (DNS, refused connection, reset)
    #[error("sink unreachable: {0}")]
    Unreachable(String),

    /// Sink did not answer within the write timeout
    #[error("sink write timed out: {0}")]
    Timeout(String),

    /// Token rejected by the sink
    #[error("sink rejected credentials (HTTP {0})")]
    Unauthorized(u16),

    /// Sink answered with a non-success status
    #[error("sink rejected write (HTTP {status}): {body}")]
    Rejected { status: u16, body: String },

    /// The point could not be encoded
    #[error("malformed point: {0}")]
    MalformedPoint(String),
}

impl WriteError {
    /// Map a non-success sink response to a write error
    pub fn from_status(status: u16, body: &str) -> Self {
        match status {
            401 | 403 => WriteError::Unauthorized(status),
            _ => WriteError::Rejected {
                status,
                body: truncate(body, 200),
            },
        }
    }
}

/// Convert reqwest errors raised while talking to the sink
impl From<reqwest::Error> for WriteError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            WriteError::Timeout(err.to_string())
        } else if let Some(status) = err.status() {
            WriteError::from_status(status.as_u16(), &err.to_string())
        } else if err.is_builder() {
            WriteError::MalformedPoint(err.to_string())
        } else {
            WriteError::Unreachable(err.to_string())
        }
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_chars).collect();
        format!("{}...", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_error_from_status() {
        assert_eq!(WriteError::from_status(401, ""), WriteError::Unauthorized(401));
        assert_eq!(WriteError::from_status(403, "forbidden"), WriteError::Unauthorized(403));

        match WriteError::from_status(400, "partial write: field type conflict") {
            WriteError::Rejected { status, body } => {
                assert_eq!(status, 400);
                assert!(body.contains("field type conflict"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_rejected_body_is_truncated() {
        let body = "x".repeat(500);
        match WriteError::from_status(500, &body) {
            WriteError::Rejected { body, .. } => assert_eq!(body.len(), 203),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_sink_error_converts_into_monitor_error() {
        let err: MonitorError = WriteError::Unauthorized(401).into();
        assert_eq!(err.to_string(), "Sink error: sink rejected credentials (HTTP 401)");
    }
}

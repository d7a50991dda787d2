//! Outcome classification
//!
//! Maps the result of one probe attempt to a stable `(category, detail)`
//! pair. The category and detail end up as tags on the stored observation,
//! so their string forms must not change between releases.

use std::fmt;

/// Detail recorded for successful probes
pub const DETAIL_NONE: &str = "None";

/// Raw result of a probe attempt, before classification
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProbeOutcome {
    /// The request completed and the target reported no error
    pub succeeded: bool,

    /// Response status, present only if a response was received
    pub http_status: Option<u16>,

    /// Transport or logic failure description
    pub error_message: Option<String>,
}

impl ProbeOutcome {
    /// A probe that completed successfully
    pub fn success() -> Self {
        Self {
            succeeded: true,
            ..Self::default()
        }
    }

    /// A probe that received an error response
    pub fn status(code: u16) -> Self {
        Self {
            http_status: Some(code),
            ..Self::default()
        }
    }

    /// A probe that failed before any response arrived
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            error_message: Some(message.into()),
            ..Self::default()
        }
    }

    /// A probe that received a response and also raised an error
    pub fn status_with_error(code: u16, message: impl Into<String>) -> Self {
        Self {
            succeeded: false,
            http_status: Some(code),
            error_message: Some(message.into()),
        }
    }
}

/// Outcome category, stored as the `category` tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Success,
    /// 4xx responses
    ApplicationLogicError,
    /// 5xx responses
    InfrastructureServerError,
    /// Timeouts and refused connections
    NetworkError,
    UnknownError,
}

impl Category {
    /// Stable tag value
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Success => "Success",
            Category::ApplicationLogicError => "ApplicationLogicError",
            Category::InfrastructureServerError => "InfrastructureServerError",
            Category::NetworkError => "NetworkError",
            Category::UnknownError => "UnknownError",
        }
    }

    /// Operator-facing label for console output
    pub fn label(&self) -> &'static str {
        match self {
            Category::Success => "Success",
            Category::ApplicationLogicError => "Application Logic Error",
            Category::InfrastructureServerError => "Infrastructure Server Error",
            Category::NetworkError => "Network Error",
            Category::UnknownError => "Unknown Error",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Category::Success)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category plus human-readable sub-reason
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub category: Category,
    pub detail: String,
}

impl Classification {
    fn new(category: Category, detail: impl Into<String>) -> Self {
        Self {
            category,
            detail: detail.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.category.is_success()
    }
}

/// Classify a probe outcome.
///
/// Total: every input yields a classification. Evaluation order is fixed:
/// success, 4xx, 5xx, then message inspection (only when no response status
/// is present), then the catch-all.
pub fn classify(outcome: &ProbeOutcome) -> Classification {
    if outcome.succeeded {
        return Classification::new(Category::Success, DETAIL_NONE);
    }

    if let Some(status) = outcome.http_status {
        return match status {
            400..=499 => Classification::new(Category::ApplicationLogicError, format!("HTTP {}", status)),
            500..=599 => Classification::new(Category::InfrastructureServerError, format!("HTTP {}", status)),
            _ => general_failure(),
        };
    }

    let message = match outcome.error_message.as_deref() {
        Some(message) => message.to_lowercase(),
        None => return general_failure(),
    };

    if message.contains("timeout") {
        Classification::new(Category::NetworkError, "Request Timeout")
    } else if message.contains("connection") {
        Classification::new(Category::NetworkError, "Connection Refused")
    } else {
        general_failure()
    }
}

fn general_failure() -> Classification {
    Classification::new(Category::UnknownError, "General Failure")
}

//! Error types for Unleash API operations.
//!
//! Every failure an adapter can hit maps onto one [`Error`] variant, and
//! every variant converts into a [`declarative::Diagnostic`] so lifecycle
//! operations can propagate it with `?`.

use declarative::{Diagnostic, Diagnostics};
use std::fmt;

/// Result type alias for API operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Categories of API errors.
///
/// Categories drive the advice shown to the user. Nothing is retried
/// automatically; a retryable category only means re-running the whole
/// operation may succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Provider settings missing or invalid.
    Configuration,
    /// The HTTP call itself failed (DNS, connection, TLS).
    Transport,
    /// Server answered with a 5xx status.
    Server,
    /// Server answered with an unexpected non-5xx status.
    Status,
    /// Looked-up object does not exist.
    NotFound,
    /// Declared input rejected locally.
    Validation,
    /// Operation not allowed for this entity kind.
    Unsupported,
    /// Response body could not be decoded.
    Format,
}

impl ErrorCategory {
    /// Whether this error category is typically transient and worth retrying.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport | Self::Server)
    }

    /// Get a user-friendly description of this error category.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Configuration => "Provider configuration error",
            Self::Transport => "Network connectivity issue",
            Self::Server => "Unleash server error",
            Self::Status => "Unexpected API response",
            Self::NotFound => "Object not found",
            Self::Validation => "Invalid input",
            Self::Unsupported => "Unsupported operation",
            Self::Format => "Invalid response format",
        }
    }

    /// Get actionable advice for resolving this error category.
    #[must_use]
    pub fn advice(&self) -> &'static str {
        match self {
            Self::Configuration => {
                "Set base_url and authorization in the provider block, via flags, or with UNLEASH_URL and AUTH_TOKEN"
            }
            Self::Transport => "Check the base URL and your network connection, then try again",
            Self::Server => "The server may be temporarily unavailable, try again later",
            Self::Status => "Check the response body for details and verify the token's permissions",
            Self::NotFound => "Verify the name or identifier is correct",
            Self::Validation => "Fix the declared value and try again",
            Self::Unsupported => "Change a replace-on-change attribute to recreate the object instead",
            Self::Format => "The server version may not be supported",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Errors that can occur during API operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A required provider setting is missing.
    #[error("Unable to find {setting}")]
    Configuration {
        /// Setting name, e.g. `base_url`.
        setting: String,
        /// Where the setting was looked for.
        message: String,
    },

    /// The HTTP call failed before a response arrived.
    #[error("Unable to call api {method} {url}: {message}")]
    Transport {
        /// HTTP method.
        method: String,
        /// Full request URL.
        url: String,
        /// Underlying cause.
        message: String,
    },

    /// The server answered with a status outside the accepted set.
    #[error("Unexpected HTTP error code received {status_text} (expected {codes})", codes = join_codes(.expected))]
    UnexpectedStatus {
        /// HTTP method.
        method: String,
        /// Full request URL.
        url: String,
        /// Accepted status codes.
        expected: Vec<u16>,
        /// Actual status code.
        status: u16,
        /// Status line, e.g. `409 Conflict`.
        status_text: String,
        /// Response body.
        body: String,
    },

    /// A looked-up object does not exist.
    #[error("{kind} not found: {detail}")]
    NotFound {
        /// Kind of object, e.g. `Permission`.
        kind: String,
        /// What was searched for.
        detail: String,
    },

    /// Declared input rejected before any call.
    #[error("{summary}: {detail}")]
    Validation {
        /// Attribute path, if the problem is tied to one.
        attribute: Option<String>,
        /// Short summary.
        summary: String,
        /// Explanation.
        detail: String,
    },

    /// Operation structurally disallowed for this kind.
    #[error("{summary}: {detail}")]
    Unsupported {
        /// Short summary.
        summary: String,
        /// Explanation.
        detail: String,
    },

    /// Response body could not be decoded.
    #[error("invalid API response: {0}")]
    InvalidResponse(String),
}

fn join_codes(codes: &[u16]) -> String {
    codes
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl Error {
    /// Create a validation error tied to an attribute.
    pub fn validation(
        attribute: impl Into<String>,
        summary: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self::Validation {
            attribute: Some(attribute.into()),
            summary: summary.into(),
            detail: detail.into(),
        }
    }

    /// Create a not-found error.
    pub fn not_found(kind: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::NotFound {
            kind: kind.into(),
            detail: detail.into(),
        }
    }

    /// Create an unsupported-operation error.
    pub fn unsupported(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Unsupported {
            summary: summary.into(),
            detail: detail.into(),
        }
    }

    /// Get the error category.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Configuration { .. } => ErrorCategory::Configuration,
            Error::Transport { .. } => ErrorCategory::Transport,
            Error::UnexpectedStatus { status, .. } if *status >= 500 => ErrorCategory::Server,
            Error::UnexpectedStatus { .. } => ErrorCategory::Status,
            Error::NotFound { .. } => ErrorCategory::NotFound,
            Error::Validation { .. } => ErrorCategory::Validation,
            Error::Unsupported { .. } => ErrorCategory::Unsupported,
            Error::InvalidResponse(_) => ErrorCategory::Format,
        }
    }

    /// Whether this error is typically transient and worth retrying.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.category().is_retryable()
    }

    /// HTTP status code, if the server answered.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::UnexpectedStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidResponse(err.to_string())
    }
}

impl From<Error> for Diagnostic {
    fn from(err: Error) -> Self {
        match err {
            Error::Configuration { setting, message } => {
                Diagnostic::error(format!("Unable to find {setting}"), message)
            }
            Error::Transport {
                method,
                url,
                message,
            } => Diagnostic::error(format!("Unable to call api {method} {url}"), message),
            Error::UnexpectedStatus {
                method,
                url,
                expected,
                status,
                status_text,
                body,
            } => Diagnostic::error(
                format!("Unexpected HTTP error code received {status_text}"),
                format!(
                    "Calling API {method} {url}\nExpected {}, got {status}\n{body}",
                    join_codes(&expected)
                ),
            ),
            Error::NotFound { kind, detail } => {
                Diagnostic::error(format!("{kind} not found"), detail)
            }
            Error::Validation {
                attribute,
                summary,
                detail,
            } => {
                let diagnostic = Diagnostic::error(summary, detail);
                match attribute {
                    Some(attribute) => diagnostic.at(attribute),
                    None => diagnostic,
                }
            }
            Error::Unsupported { summary, detail } => Diagnostic::error(summary, detail),
            Error::InvalidResponse(message) => {
                Diagnostic::error("Unable to decode API response", message)
            }
        }
    }
}

impl From<Error> for Diagnostics {
    fn from(err: Error) -> Self {
        Diagnostic::from(err).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conflict() -> Error {
        Error::UnexpectedStatus {
            method: "POST".to_string(),
            url: "http://localhost:4242/api/admin/projects".to_string(),
            expected: vec![200],
            status: 409,
            status_text: "409 Conflict".to_string(),
            body: r#"{"message":"already exists"}"#.to_string(),
        }
    }

    #[test]
    fn test_error_category_retryable() {
        assert!(ErrorCategory::Transport.is_retryable());
        assert!(ErrorCategory::Server.is_retryable());
        assert!(!ErrorCategory::Status.is_retryable());
        assert!(!ErrorCategory::Configuration.is_retryable());
        assert!(!ErrorCategory::NotFound.is_retryable());
        assert!(!ErrorCategory::Validation.is_retryable());
        assert!(!ErrorCategory::Unsupported.is_retryable());
        assert!(!ErrorCategory::Format.is_retryable());
    }

    #[test]
    fn test_error_category_description_and_advice() {
        for category in [
            ErrorCategory::Configuration,
            ErrorCategory::Transport,
            ErrorCategory::Server,
            ErrorCategory::Status,
            ErrorCategory::NotFound,
            ErrorCategory::Validation,
            ErrorCategory::Unsupported,
            ErrorCategory::Format,
        ] {
            assert!(!category.description().is_empty());
            assert!(!category.advice().is_empty());
        }
    }

    #[test]
    fn test_error_category_display() {
        let display = format!("{}", ErrorCategory::Transport);
        assert!(display.contains("Network"));
    }

    #[test]
    fn test_unexpected_status_message_has_both_codes() {
        let err = conflict();
        let display = err.to_string();
        assert!(display.contains("Unexpected HTTP error code received 409 Conflict"));
        assert!(display.contains("200"));
        assert_eq!(err.status(), Some(409));
        assert_eq!(err.category(), ErrorCategory::Status);
    }

    #[test]
    fn test_server_error_category() {
        let err = Error::UnexpectedStatus {
            method: "GET".to_string(),
            url: "u".to_string(),
            expected: vec![200],
            status: 503,
            status_text: "503 Service Unavailable".to_string(),
            body: String::new(),
        };
        assert_eq!(err.category(), ErrorCategory::Server);
        assert!(err.is_retryable());
    }

    #[test]
    fn test_unexpected_status_diagnostic() {
        let diag = Diagnostic::from(conflict());
        assert_eq!(diag.summary, "Unexpected HTTP error code received 409 Conflict");
        assert!(diag.detail.contains("Calling API POST http://localhost:4242/api/admin/projects"));
        assert!(diag.detail.contains("Expected 200, got 409"));
        assert!(diag.detail.contains("already exists"));
    }

    #[test]
    fn test_validation_diagnostic_keeps_attribute() {
        let err = Error::validation("expires_at", "Unable to parse expiration date", "bad");
        assert_eq!(err.category(), ErrorCategory::Validation);
        let diag = Diagnostic::from(err);
        assert_eq!(diag.attribute.as_deref(), Some("expires_at"));
    }

    #[test]
    fn test_not_found_diagnostic() {
        let diag = Diagnostic::from(Error::not_found("Permission", "Permission CREATE_FEATURE not found"));
        assert_eq!(diag.summary, "Permission not found");
        assert_eq!(diag.detail, "Permission CREATE_FEATURE not found");
    }

    #[test]
    fn test_transport_diagnostic() {
        let err = Error::Transport {
            method: "GET".to_string(),
            url: "http://nowhere/api".to_string(),
            message: "connection refused".to_string(),
        };
        assert!(err.is_retryable());
        let diags = Diagnostics::from(err);
        let diag = diags.iter().next().unwrap();
        assert_eq!(diag.summary, "Unable to call api GET http://nowhere/api");
        assert_eq!(diag.detail, "connection refused");
    }

    #[test]
    fn test_error_from_serde_json() {
        let err: Error = serde_json::from_str::<serde_json::Value>("{").unwrap_err().into();
        assert_eq!(err.category(), ErrorCategory::Format);
    }
}

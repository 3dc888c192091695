//! Error types for the OData request helper.
//!
//! # Design
//! Configuration mistakes (bad URI, scheme, method or header) are caught
//! before any I/O. Once a request is on the wire it ends in exactly one of:
//! a transport failure, an HTTP error status carrying an [`ErrorResult`], or
//! a success body that is not valid JSON.

use std::fmt;

use serde_json::Value;
use thiserror::Error;

/// Message used when an error response has no usable `error` payload.
pub const UNEXPECTED_ERROR: &str = "Unexpected Error";

/// Failure reported by an `HttpClient` backend before a response arrived.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    Connection(String),

    #[error("request timed out")]
    Timeout,

    #[error(transparent)]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

/// The `error` member of a failed response, or a generic placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorPayload {
    /// The `error` field of the JSON error body, as sent by the service.
    Service(Value),
    /// The body was not JSON or had no `error` field.
    Unexpected,
}

/// An HTTP response whose status is outside the success set.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorResult {
    pub status: u16,
    pub payload: ErrorPayload,
}

impl ErrorResult {
    /// Extract the `error` member of `body`, falling back to
    /// [`ErrorPayload::Unexpected`] on anything unparseable.
    pub fn from_body(status: u16, body: &str) -> Self {
        let service = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|mut v| v.get_mut("error").map(Value::take))
            .filter(|e| !e.is_null());
        match service {
            Some(error) => Self {
                status,
                payload: ErrorPayload::Service(error),
            },
            None => Self::unexpected(status),
        }
    }

    pub fn unexpected(status: u16) -> Self {
        Self {
            status,
            payload: ErrorPayload::Unexpected,
        }
    }

    pub fn message(&self) -> &str {
        match &self.payload {
            ErrorPayload::Service(Value::String(s)) => s,
            ErrorPayload::Service(v) => v
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or(UNEXPECTED_ERROR),
            ErrorPayload::Unexpected => UNEXPECTED_ERROR,
        }
    }

    /// The OData error `code`, when the service sent one.
    pub fn code(&self) -> Option<&str> {
        match &self.payload {
            ErrorPayload::Service(v) => v.get("code").and_then(Value::as_str),
            ErrorPayload::Unexpected => None,
        }
    }

    pub fn is_unexpected(&self) -> bool {
        matches!(self.payload, ErrorPayload::Unexpected)
    }
}

impl fmt::Display for ErrorResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}: {}", self.status, self.message())
    }
}

impl std::error::Error for ErrorResult {}

/// Every way a single request can fail.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("invalid URI: {0}")]
    InvalidUri(#[from] url::ParseError),

    #[error("unsupported URI scheme `{0}`, expected http or https")]
    UnsupportedScheme(String),

    #[error("invalid HTTP method: {0}")]
    InvalidMethod(String),

    #[error("invalid header: {0}")]
    InvalidHeader(String),

    #[error("failed to serialize request body: {0}")]
    Serialization(#[source] serde_json::Error),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Http(#[from] ErrorResult),

    #[error("malformed JSON in HTTP {status} response: {source}")]
    Parse {
        status: u16,
        #[source]
        source: serde_json::Error,
    },
}

impl RequestError {
    /// The HTTP status, when a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            RequestError::Http(e) => Some(e.status),
            RequestError::Parse { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn as_error_result(&self) -> Option<&ErrorResult> {
        match self {
            RequestError::Http(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_error_keeps_message_and_code() {
        let err = ErrorResult::from_body(404, r#"{"error":{"code":"0x80040217","message":"Not Found"}}"#);
        assert_eq!(err.status, 404);
        assert_eq!(err.message(), "Not Found");
        assert_eq!(err.code(), Some("0x80040217"));
        assert!(!err.is_unexpected());
    }

    #[test]
    fn non_json_body_is_unexpected() {
        let err = ErrorResult::from_body(500, "not json");
        assert_eq!(err.status, 500);
        assert_eq!(err.message(), UNEXPECTED_ERROR);
        assert!(err.is_unexpected());
    }

    #[test]
    fn missing_or_null_error_member_is_unexpected() {
        for body in ["", "{}", r#"{"error":null}"#, "[1,2]", "null", r#"{"message":"x"}"#] {
            let err = ErrorResult::from_body(400, body);
            assert!(err.is_unexpected(), "body {body:?}");
        }
    }

    #[test]
    fn string_error_member_is_its_own_message() {
        let err = ErrorResult::from_body(403, r#"{"error":"Forbidden"}"#);
        assert_eq!(err.message(), "Forbidden");
        assert_eq!(err.code(), None);
    }

    #[test]
    fn display_includes_status() {
        let err = RequestError::from(ErrorResult::unexpected(502));
        assert_eq!(err.to_string(), "HTTP 502: Unexpected Error");
        assert_eq!(err.status(), Some(502));
    }

    #[test]
    fn configuration_errors_have_no_status() {
        let err = RequestError::UnsupportedScheme("ftp".to_string());
        assert_eq!(err.status(), None);
        assert!(err.as_error_result().is_none());
    }
}

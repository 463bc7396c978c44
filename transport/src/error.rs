//! Structured transport errors with classification metadata.
//!
//! Every failure surfaced by the transport is a [`StructuredError`]: an
//! immutable value carrying the category, severity, and retryability that
//! the retry policy and error interceptors act on. Interceptors never
//! mutate an error in place; the `with_*` transforms consume the value and
//! return a new one.

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// Failure domain of a transport error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Credential missing, rejected, or expired
    Authentication,
    /// Request or response failed shape validation
    Validation,
    /// The carrier accepted the call but reported a domain failure
    BusinessLogic,
    /// Connectivity, timeout, or HTTP-level failure
    Network,
    /// The transport itself was misconfigured
    Configuration,
    /// Anything that fits no other category
    Unknown,
}

impl ErrorCategory {
    /// Default retryability for errors of this category.
    ///
    /// Only Network failures are transient by default; interceptors may
    /// override the flag on individual errors.
    #[must_use]
    pub const fn default_retryable(self) -> bool {
        matches!(self, Self::Network)
    }

    /// String form used in logs and context maps.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Authentication => "authentication",
            Self::Validation => "validation",
            Self::BusinessLogic => "business_logic",
            Self::Network => "network",
            Self::Configuration => "configuration",
            Self::Unknown => "unknown",
        }
    }
}

/// Impact level of a transport error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Cosmetic or informational
    Low,
    /// Degraded but recoverable
    Medium,
    /// Call failed, likely to affect the caller
    High,
    /// Subsystem-level failure
    Critical,
}

impl ErrorSeverity {
    /// String form used in logs and context maps.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

/// Classified, immutable transport error.
#[derive(Debug, Clone, Error)]
#[error("{code}: {message}")]
pub struct StructuredError {
    /// Stable machine-readable code, e.g. `HTTP_ERROR`
    pub code: String,
    /// Human-readable description
    pub message: String,
    /// Failure domain
    pub category: ErrorCategory,
    /// Impact level
    pub severity: ErrorSeverity,
    /// Whether the retry policy may attempt the call again
    pub retryable: bool,
    /// Opaque key/value context, typically the originating model/method
    pub context: HashMap<String, Value>,
    /// When the error was classified
    pub timestamp: DateTime<Utc>,
}

impl StructuredError {
    /// Create an error with the category's default retryability.
    #[must_use]
    pub fn new(
        code: impl Into<String>,
        message: impl Into<String>,
        category: ErrorCategory,
        severity: ErrorSeverity,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            category,
            severity,
            retryable: category.default_retryable(),
            context: HashMap::new(),
            timestamp: Utc::now(),
        }
    }

    /// Timeout or cancellation of an in-flight call.
    #[must_use]
    pub fn request_timeout(message: impl Into<String>) -> Self {
        Self::new(
            "REQUEST_TIMEOUT",
            message,
            ErrorCategory::Network,
            ErrorSeverity::Medium,
        )
    }

    /// Low-level connectivity failure (DNS, refused, reset).
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(
            "NETWORK_ERROR",
            message,
            ErrorCategory::Network,
            ErrorSeverity::High,
        )
    }

    /// Non-2xx HTTP status from the carrier.
    ///
    /// Severity is High from 500 upward, Medium below; retryable for 5xx
    /// and 429. The numeric status is recorded in the context map.
    #[must_use]
    pub fn http_status(status: u16, message: impl Into<String>) -> Self {
        let severity = if status >= 500 {
            ErrorSeverity::High
        } else {
            ErrorSeverity::Medium
        };
        let error = Self::new("HTTP_ERROR", message, ErrorCategory::Network, severity)
            .with_retryable(status >= 500 || status == 429);
        error.with_context("status", status)
    }

    /// Fast failure because the circuit breaker is open.
    ///
    /// Never retried: retrying would defeat the breaker's purpose.
    #[must_use]
    pub fn circuit_open(route: impl Into<String>) -> Self {
        let route = route.into();
        Self::new(
            "CIRCUIT_OPEN",
            format!("circuit open for {route}"),
            ErrorCategory::Network,
            ErrorSeverity::Critical,
        )
        .with_retryable(false)
        .with_context("route", route)
    }

    /// Transport misconfiguration detected at construction.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(
            "CONFIGURATION_ERROR",
            message,
            ErrorCategory::Configuration,
            ErrorSeverity::High,
        )
    }

    /// Missing or rejected carrier credential.
    #[must_use]
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(
            "AUTHENTICATION_ERROR",
            message,
            ErrorCategory::Authentication,
            ErrorSeverity::High,
        )
    }

    /// Response failed shape validation.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(
            "INVALID_RESPONSE",
            message,
            ErrorCategory::Validation,
            ErrorSeverity::Medium,
        )
    }

    /// Carrier-reported domain failure.
    #[must_use]
    pub fn business(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(
            code,
            message,
            ErrorCategory::BusinessLogic,
            ErrorSeverity::Medium,
        )
    }

    /// Unclassifiable failure.
    #[must_use]
    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(
            "UNKNOWN_ERROR",
            message,
            ErrorCategory::Unknown,
            ErrorSeverity::Medium,
        )
    }

    /// Return a copy with the retryable flag overridden.
    #[must_use]
    pub fn with_retryable(mut self, retryable: bool) -> Self {
        self.retryable = retryable;
        self
    }

    /// Return a copy with a replaced message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Return a copy with an added context entry.
    #[must_use]
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Whether the retry policy may attempt the call again.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        self.retryable
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_defaults() {
        assert!(ErrorCategory::Network.default_retryable());
        assert!(!ErrorCategory::Authentication.default_retryable());
        assert!(!ErrorCategory::Validation.default_retryable());
        assert!(!ErrorCategory::BusinessLogic.default_retryable());
        assert!(!ErrorCategory::Configuration.default_retryable());
        assert!(!ErrorCategory::Unknown.default_retryable());
    }

    #[test]
    fn test_http_status_classification() {
        let err = StructuredError::http_status(503, "service unavailable");
        assert_eq!(err.severity, ErrorSeverity::High);
        assert!(err.retryable);

        let err = StructuredError::http_status(400, "bad request");
        assert_eq!(err.severity, ErrorSeverity::Medium);
        assert!(!err.retryable);

        let err = StructuredError::http_status(429, "rate limited");
        assert_eq!(err.severity, ErrorSeverity::Medium);
        assert!(err.retryable);
    }

    #[test]
    fn test_circuit_open_is_not_retryable() {
        let err = StructuredError::circuit_open("shipments/create");
        assert_eq!(err.code, "CIRCUIT_OPEN");
        assert!(!err.retryable);
        assert_eq!(err.severity, ErrorSeverity::Critical);
    }

    #[test]
    fn test_transforms_produce_new_values() {
        let original = StructuredError::http_status(400, "bad request");
        let overridden = original.clone().with_retryable(true).with_context("hint", "retry later");

        assert!(!original.retryable);
        assert!(overridden.retryable);
        assert!(original.context.get("hint").is_none());
        assert_eq!(
            overridden.context.get("hint"),
            Some(&Value::String("retry later".to_string()))
        );
    }

    #[test]
    fn test_error_display() {
        let err = StructuredError::request_timeout("request timed out");
        assert_eq!(err.to_string(), "REQUEST_TIMEOUT: request timed out");
    }
}

//! Built-in interceptors.
//!
//! Reference stages installed by SDK packages as needed: request-ID and
//! credential injection, structured logging, carrier envelope validation,
//! retryability overrides, and error message translation. The caching
//! interceptor lives in [`crate::cache`].

use crate::envelope::{CarrierResponse, Envelope};
use crate::error::StructuredError;
use crate::interceptor::{
    ErrorInterceptor, RequestFlow, RequestInterceptor, ResponseInterceptor,
};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Injects a unique request ID header when the caller did not set one.
#[derive(Debug, Clone)]
pub struct RequestIdInterceptor {
    header: String,
}

impl RequestIdInterceptor {
    /// Header name used by default.
    pub const DEFAULT_HEADER: &'static str = "x-request-id";

    /// Create an interceptor using the default header name.
    #[must_use]
    pub fn new() -> Self {
        Self {
            header: Self::DEFAULT_HEADER.to_string(),
        }
    }

    /// Create an interceptor using a custom header name.
    #[must_use]
    pub fn with_header(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
        }
    }
}

impl Default for RequestIdInterceptor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RequestInterceptor for RequestIdInterceptor {
    async fn on_request(&self, mut envelope: Envelope) -> Result<RequestFlow, StructuredError> {
        if !envelope.headers.contains_key(&self.header) {
            envelope
                .headers
                .insert(self.header.clone(), Uuid::new_v4().to_string());
        }
        Ok(RequestFlow::Continue(envelope))
    }
}

/// Injects the carrier credential header on every call.
#[derive(Debug, Clone)]
pub struct ApiKeyInterceptor {
    header: String,
    api_key: String,
}

impl ApiKeyInterceptor {
    /// Create an interceptor writing `api_key` into `header`.
    #[must_use]
    pub fn new(header: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl RequestInterceptor for ApiKeyInterceptor {
    async fn on_request(&self, mut envelope: Envelope) -> Result<RequestFlow, StructuredError> {
        if self.api_key.is_empty() {
            return Err(StructuredError::authentication(
                "carrier credential is empty",
            )
            .with_context("model", envelope.target.model.clone())
            .with_context("method", envelope.target.method.clone()));
        }
        envelope
            .headers
            .insert(self.header.clone(), self.api_key.clone());
        Ok(RequestFlow::Continue(envelope))
    }
}

/// Emits one structured log line per request, response, and error.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingInterceptor;

#[async_trait]
impl RequestInterceptor for LoggingInterceptor {
    async fn on_request(&self, envelope: Envelope) -> Result<RequestFlow, StructuredError> {
        debug!(
            model = %envelope.target.model,
            method = %envelope.target.method,
            parameters = envelope.parameters.len(),
            "Outbound carrier call"
        );
        Ok(RequestFlow::Continue(envelope))
    }
}

#[async_trait]
impl ResponseInterceptor for LoggingInterceptor {
    async fn on_response(
        &self,
        envelope: &Envelope,
        response: CarrierResponse,
    ) -> Result<CarrierResponse, StructuredError> {
        info!(
            model = %envelope.target.model,
            method = %envelope.target.method,
            status = response.status,
            "Carrier call succeeded"
        );
        Ok(response)
    }
}

#[async_trait]
impl ErrorInterceptor for LoggingInterceptor {
    async fn on_error(&self, envelope: &Envelope, error: StructuredError) -> StructuredError {
        warn!(
            model = %envelope.target.model,
            method = %envelope.target.method,
            code = %error.code,
            category = error.category.as_str(),
            severity = error.severity.as_str(),
            retryable = error.retryable,
            "Carrier call failed"
        );
        error
    }
}

/// Rejects payloads that do not follow the carrier envelope shape.
///
/// Carriers answer `{success, data, errors}`; a payload missing the
/// `success` flag never reaches the caller, and a carrier-reported
/// `success: false` surfaces as a business error built from the carrier's
/// error list.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseValidationInterceptor;

impl ResponseValidationInterceptor {
    fn carrier_error(errors: Option<&Value>) -> (String, String) {
        let first = errors
            .and_then(Value::as_array)
            .and_then(|list| list.first())
            .and_then(Value::as_object);

        let code = first
            .and_then(|e| e.get("code"))
            .and_then(Value::as_str)
            .unwrap_or("CARRIER_ERROR")
            .to_string();
        let message = first
            .and_then(|e| e.get("message"))
            .and_then(Value::as_str)
            .unwrap_or("carrier reported failure")
            .to_string();
        (code, message)
    }
}

#[async_trait]
impl ResponseInterceptor for ResponseValidationInterceptor {
    async fn on_response(
        &self,
        envelope: &Envelope,
        response: CarrierResponse,
    ) -> Result<CarrierResponse, StructuredError> {
        let route = envelope.target.route();

        let Some(object) = response.payload.as_object() else {
            return Err(
                StructuredError::validation("carrier payload is not an object")
                    .with_context("route", route),
            );
        };
        let Some(success) = object.get("success").and_then(Value::as_bool) else {
            return Err(
                StructuredError::validation("carrier payload is missing the success flag")
                    .with_context("route", route),
            );
        };

        if !success {
            let (code, message) = Self::carrier_error(object.get("errors"));
            return Err(StructuredError::business(code, message).with_context("route", route));
        }

        Ok(response)
    }
}

/// Overrides the classifier's retryable flag for configured error codes.
#[derive(Debug, Clone, Default)]
pub struct RetryOverrideInterceptor {
    retryable_codes: HashSet<String>,
    fatal_codes: HashSet<String>,
}

impl RetryOverrideInterceptor {
    /// Create an interceptor with no overrides.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark errors with this code retryable.
    #[must_use]
    pub fn mark_retryable(mut self, code: impl Into<String>) -> Self {
        self.retryable_codes.insert(code.into());
        self
    }

    /// Mark errors with this code non-retryable.
    #[must_use]
    pub fn mark_fatal(mut self, code: impl Into<String>) -> Self {
        self.fatal_codes.insert(code.into());
        self
    }
}

#[async_trait]
impl ErrorInterceptor for RetryOverrideInterceptor {
    async fn on_error(&self, _envelope: &Envelope, error: StructuredError) -> StructuredError {
        if self.retryable_codes.contains(&error.code) {
            error.with_retryable(true)
        } else if self.fatal_codes.contains(&error.code) {
            error.with_retryable(false)
        } else {
            error
        }
    }
}

/// Rewrites error messages for known codes.
///
/// SDK packages register localized or user-facing text per error code; the
/// classification metadata is left untouched.
#[derive(Debug, Clone, Default)]
pub struct ErrorTranslationInterceptor {
    translations: HashMap<String, String>,
}

impl ErrorTranslationInterceptor {
    /// Create an interceptor with an empty translation table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a message for an error code.
    #[must_use]
    pub fn with_translation(
        mut self,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        self.translations.insert(code.into(), message.into());
        self
    }
}

#[async_trait]
impl ErrorInterceptor for ErrorTranslationInterceptor {
    async fn on_error(&self, _envelope: &Envelope, error: StructuredError) -> StructuredError {
        match self.translations.get(&error.code) {
            Some(message) => error.with_message(message.clone()),
            None => error,
        }
    }
}

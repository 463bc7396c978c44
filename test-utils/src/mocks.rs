//! Mock interceptors for pipeline and transport tests.

use async_trait::async_trait;
use carrier_transport::{
    CarrierResponse, Envelope, ErrorInterceptor, RequestFlow, RequestInterceptor,
    ResponseInterceptor, StructuredError,
};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Records every request, response, and error it sees.
///
/// Register the same instance on all three chains to observe the order and
/// number of pipeline invocations.
#[derive(Debug, Default)]
pub struct RecordingInterceptor {
    requests: Arc<RwLock<Vec<String>>>,
    responses: Arc<RwLock<Vec<u16>>>,
    errors: Arc<RwLock<Vec<String>>>,
}

impl RecordingInterceptor {
    /// Create a recording interceptor.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Routes seen by the request chain, in order.
    pub async fn requests(&self) -> Vec<String> {
        self.requests.read().await.clone()
    }

    /// Status codes seen by the response chain, in order.
    pub async fn responses(&self) -> Vec<u16> {
        self.responses.read().await.clone()
    }

    /// Error codes seen by the error chain, in order.
    pub async fn errors(&self) -> Vec<String> {
        self.errors.read().await.clone()
    }

    /// Number of requests observed.
    pub async fn request_count(&self) -> usize {
        self.requests.read().await.len()
    }

    /// Number of errors observed.
    pub async fn error_count(&self) -> usize {
        self.errors.read().await.len()
    }
}

#[async_trait]
impl RequestInterceptor for RecordingInterceptor {
    async fn on_request(&self, envelope: Envelope) -> Result<RequestFlow, StructuredError> {
        self.requests.write().await.push(envelope.target.route());
        Ok(RequestFlow::Continue(envelope))
    }
}

#[async_trait]
impl ResponseInterceptor for RecordingInterceptor {
    async fn on_response(
        &self,
        _envelope: &Envelope,
        response: CarrierResponse,
    ) -> Result<CarrierResponse, StructuredError> {
        self.responses.write().await.push(response.status);
        Ok(response)
    }
}

#[async_trait]
impl ErrorInterceptor for RecordingInterceptor {
    async fn on_error(&self, _envelope: &Envelope, error: StructuredError) -> StructuredError {
        self.errors.write().await.push(error.code.clone());
        error
    }
}

/// Resolves every request with a canned response, skipping network I/O.
#[derive(Debug, Clone)]
pub struct ResolvingInterceptor {
    response: CarrierResponse,
}

impl ResolvingInterceptor {
    /// Create an interceptor that answers with `response`.
    #[must_use]
    pub const fn new(response: CarrierResponse) -> Self {
        Self { response }
    }
}

#[async_trait]
impl RequestInterceptor for ResolvingInterceptor {
    async fn on_request(&self, _envelope: Envelope) -> Result<RequestFlow, StructuredError> {
        Ok(RequestFlow::Resolved(self.response.clone()))
    }
}

/// Fails every request with a canned error before network I/O.
#[derive(Debug, Clone)]
pub struct RejectingInterceptor {
    error: StructuredError,
}

impl RejectingInterceptor {
    /// Create an interceptor that fails with `error`.
    #[must_use]
    pub const fn new(error: StructuredError) -> Self {
        Self { error }
    }
}

#[async_trait]
impl RequestInterceptor for RejectingInterceptor {
    async fn on_request(&self, _envelope: Envelope) -> Result<RequestFlow, StructuredError> {
        Err(self.error.clone())
    }
}

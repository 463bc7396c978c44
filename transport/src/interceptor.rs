//! Interceptor traits and the ordered pipeline run around each call.
//!
//! Three independent chains: request interceptors before the network call,
//! response interceptors after a success, error interceptors after
//! classification. A request interceptor short-circuits by returning
//! [`RequestFlow::Resolved`] — a tagged result, not control-flow by
//! exception — and the transport pattern-matches on it.

use crate::envelope::{CarrierResponse, Envelope};
use crate::error::StructuredError;
use async_trait::async_trait;
use std::sync::Arc;

/// Outcome of one request interceptor stage.
#[derive(Debug)]
pub enum RequestFlow {
    /// Pass the (possibly modified) envelope to the next stage
    Continue(Envelope),
    /// Stop the pipeline and return this response without network I/O
    Resolved(CarrierResponse),
}

/// Transform applied to the envelope before the network call.
#[async_trait]
pub trait RequestInterceptor: Send + Sync {
    /// Inspect or rewrite the envelope, or resolve the call outright.
    ///
    /// # Errors
    ///
    /// Returns a [`StructuredError`] to abort the call before any network
    /// I/O happens.
    async fn on_request(&self, envelope: Envelope) -> Result<RequestFlow, StructuredError>;
}

/// Transform applied to a successful response before it reaches the caller.
#[async_trait]
pub trait ResponseInterceptor: Send + Sync {
    /// Inspect or rewrite the response.
    ///
    /// # Errors
    ///
    /// Returns a [`StructuredError`] to reject the response (e.g. shape
    /// validation failures).
    async fn on_response(
        &self,
        envelope: &Envelope,
        response: CarrierResponse,
    ) -> Result<CarrierResponse, StructuredError>;
}

/// Pure transform applied to a classified error before the retry decision.
#[async_trait]
pub trait ErrorInterceptor: Send + Sync {
    /// Return a (possibly modified) copy of the error.
    async fn on_error(&self, envelope: &Envelope, error: StructuredError) -> StructuredError;
}

/// Ordered interceptor chains run by the transport.
#[derive(Default)]
pub struct InterceptorPipeline {
    request: Vec<Arc<dyn RequestInterceptor>>,
    response: Vec<Arc<dyn ResponseInterceptor>>,
    error: Vec<Arc<dyn ErrorInterceptor>>,
}

impl std::fmt::Debug for InterceptorPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InterceptorPipeline")
            .field("request", &self.request.len())
            .field("response", &self.response.len())
            .field("error", &self.error.len())
            .finish()
    }
}

impl InterceptorPipeline {
    /// Create an empty pipeline.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a request interceptor.
    #[must_use]
    pub fn with_request(mut self, interceptor: Arc<dyn RequestInterceptor>) -> Self {
        self.request.push(interceptor);
        self
    }

    /// Append a response interceptor.
    #[must_use]
    pub fn with_response(mut self, interceptor: Arc<dyn ResponseInterceptor>) -> Self {
        self.response.push(interceptor);
        self
    }

    /// Append an error interceptor.
    #[must_use]
    pub fn with_error(mut self, interceptor: Arc<dyn ErrorInterceptor>) -> Self {
        self.error.push(interceptor);
        self
    }

    /// Run the request chain in registration order.
    ///
    /// Stops at the first stage that resolves the call; later stages do
    /// not see the envelope.
    ///
    /// # Errors
    ///
    /// Propagates the first stage failure unchanged.
    pub async fn run_request(&self, mut envelope: Envelope) -> Result<RequestFlow, StructuredError> {
        for stage in &self.request {
            match stage.on_request(envelope).await? {
                RequestFlow::Continue(next) => envelope = next,
                RequestFlow::Resolved(response) => return Ok(RequestFlow::Resolved(response)),
            }
        }
        Ok(RequestFlow::Continue(envelope))
    }

    /// Run the response chain in registration order.
    ///
    /// # Errors
    ///
    /// Propagates the first stage failure unchanged.
    pub async fn run_response(
        &self,
        envelope: &Envelope,
        mut response: CarrierResponse,
    ) -> Result<CarrierResponse, StructuredError> {
        for stage in &self.response {
            response = stage.on_response(envelope, response).await?;
        }
        Ok(response)
    }

    /// Run the error chain in registration order, folding each stage's
    /// output into the next.
    pub async fn run_error(&self, envelope: &Envelope, mut error: StructuredError) -> StructuredError {
        for stage in &self.error {
            error = stage.on_error(envelope, error).await;
        }
        error
    }
}

//! The transport orchestrator.
//!
//! Composes the rate limiter, interceptor pipeline, circuit breaker,
//! classifier, and retry policy around the network call. The breaker wraps
//! the entire retry loop, so it records one outcome per external call
//! rather than per attempt, and an open circuit is surfaced immediately as
//! a non-retryable error.

use crate::circuit_breaker::{CircuitBreaker, CircuitBreakerError, CircuitState};
use crate::classifier::{ErrorClassifier, RawFailure};
use crate::config::TransportConfig;
use crate::envelope::{CarrierResponse, Envelope};
use crate::error::StructuredError;
use crate::http::build_http_client;
use crate::interceptor::{InterceptorPipeline, RequestFlow};
use crate::interceptors::LoggingInterceptor;
use crate::metrics::TransportMetrics;
use crate::rate_limit::RateLimiter;
use crate::retry::{RetryConfig, RetryPolicy};
use reqwest::Client;
use std::sync::Arc;
use tracing::{debug, instrument, warn};
use url::Url;

/// Resilient HTTP transport for carrier calls.
///
/// One instance per carrier endpoint; every call from the SDK layer goes
/// through [`Transport::request`]. Safe to share across tasks behind an
/// `Arc`.
#[derive(Debug)]
pub struct Transport {
    config: TransportConfig,
    base_url: String,
    http: Client,
    rate_limiter: RateLimiter,
    circuit_breaker: CircuitBreaker,
    classifier: ErrorClassifier,
    retry_policy: RetryPolicy,
    pipeline: InterceptorPipeline,
    metrics: TransportMetrics,
}

impl Transport {
    /// Create a transport with the default pipeline.
    ///
    /// Installs the logging interceptor on all three chains when
    /// `enable_logging` is set.
    ///
    /// # Errors
    ///
    /// Returns a `Configuration`-category error when the base endpoint is
    /// not a valid HTTP(S) URL or the HTTP client cannot be built.
    pub fn new(config: TransportConfig) -> Result<Self, StructuredError> {
        let mut pipeline = InterceptorPipeline::new();
        if config.enable_logging {
            let logging = Arc::new(LoggingInterceptor);
            pipeline = pipeline
                .with_request(logging.clone())
                .with_response(logging.clone())
                .with_error(logging);
        }
        Self::with_pipeline(config, pipeline)
    }

    /// Create a transport with a caller-assembled pipeline.
    ///
    /// # Errors
    ///
    /// Returns a `Configuration`-category error when the base endpoint is
    /// not a valid HTTP(S) URL or the HTTP client cannot be built.
    pub fn with_pipeline(
        config: TransportConfig,
        pipeline: InterceptorPipeline,
    ) -> Result<Self, StructuredError> {
        let parsed = Url::parse(&config.base_url).map_err(|e| {
            StructuredError::configuration(format!(
                "invalid base endpoint {}: {e}",
                config.base_url
            ))
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(StructuredError::configuration(format!(
                "base endpoint must be http(s), got {}",
                parsed.scheme()
            )));
        }

        let http = build_http_client(&config)
            .map_err(|e| StructuredError::configuration(format!("failed to build HTTP client: {e}")))?;

        let retry_policy = RetryPolicy::new(
            RetryConfig::default()
                .with_max_retries(config.max_retries)
                .with_initial_delay(config.initial_retry_delay)
                .with_max_delay(config.max_retry_delay)
                .with_multiplier(config.backoff_multiplier),
        );

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
            rate_limiter: RateLimiter::new(config.requests_per_second),
            circuit_breaker: CircuitBreaker::new(config.circuit_breaker.clone()),
            classifier: ErrorClassifier,
            retry_policy,
            pipeline,
            metrics: TransportMetrics::new("carrier_transport"),
            config,
        })
    }

    /// Perform a carrier call.
    ///
    /// Acquires a rate-limit slot, runs the request interceptors (honoring
    /// short-circuits), then executes the attempt loop inside the circuit
    /// breaker: network call with timeout and cancellation, classification,
    /// error interceptors, retry decision, backoff sleep.
    ///
    /// # Errors
    ///
    /// Returns the (possibly interceptor-modified) [`StructuredError`] once
    /// the call cannot succeed: a non-retryable failure, an exhausted retry
    /// budget, or an open circuit.
    #[instrument(
        skip(self, envelope),
        fields(model = %envelope.target.model, method = %envelope.target.method)
    )]
    pub async fn request(&self, envelope: Envelope) -> Result<CarrierResponse, StructuredError> {
        self.metrics.requests.inc();
        self.rate_limiter.acquire().await;

        let envelope = match self.pipeline.run_request(envelope).await? {
            RequestFlow::Resolved(response) => {
                debug!("Request resolved by interceptor without network I/O");
                return Ok(response);
            }
            RequestFlow::Continue(envelope) => envelope,
        };

        match self
            .circuit_breaker
            .execute(|| self.run_attempts(&envelope))
            .await
        {
            Ok(response) => Ok(response),
            Err(CircuitBreakerError::Open) => {
                self.metrics.circuit_rejections.inc();
                warn!("Circuit open, rejecting carrier call");
                Err(StructuredError::circuit_open(envelope.target.route()))
            }
            Err(CircuitBreakerError::Inner(error)) => {
                self.metrics.failures.inc();
                Err(error)
            }
        }
    }

    /// Current circuit breaker state.
    pub async fn circuit_state(&self) -> CircuitState {
        self.circuit_breaker.state().await
    }

    /// Call-path metrics.
    #[must_use]
    pub const fn metrics(&self) -> &TransportMetrics {
        &self.metrics
    }

    async fn run_attempts(&self, envelope: &Envelope) -> Result<CarrierResponse, StructuredError> {
        let mut attempt = 1u32;
        loop {
            match self.execute_attempt(envelope).await {
                Ok(response) => return self.pipeline.run_response(envelope, response).await,
                Err(failure) => {
                    let error = self.classifier.classify(failure, envelope);
                    let error = self.pipeline.run_error(envelope, error).await;

                    // A cancelled call never starts another attempt, even
                    // if an interceptor marked the error retryable.
                    if envelope.is_cancelled() {
                        return Err(error);
                    }
                    if !self.retry_policy.should_retry(&error, attempt) {
                        return Err(error);
                    }

                    let delay = self.retry_policy.delay_for(attempt);
                    debug!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        code = %error.code,
                        "Retrying carrier call"
                    );
                    self.metrics.retries.inc();
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    async fn execute_attempt(&self, envelope: &Envelope) -> Result<CarrierResponse, RawFailure> {
        if envelope.is_cancelled() {
            return Err(RawFailure::Cancelled);
        }

        let url = format!("{}/{}", self.base_url, envelope.target.route());
        let mut request = self
            .http
            .post(&url)
            .json(&envelope.parameters);
        for (name, value) in &self.config.default_headers {
            request = request.header(name, value);
        }
        for (name, value) in &envelope.headers {
            request = request.header(name, value);
        }

        let send = async move {
            let response = request.send().await.map_err(|e| {
                if e.is_timeout() {
                    RawFailure::Timeout
                } else {
                    RawFailure::Transport(e)
                }
            })?;

            let status = response.status().as_u16();
            let body = response.text().await.map_err(RawFailure::Transport)?;

            if !(200..300).contains(&status) {
                return Err(RawFailure::Status { status, body });
            }

            let payload = serde_json::from_str(&body).map_err(RawFailure::Malformed)?;
            Ok(CarrierResponse::new(status, payload))
        };

        let outcome = match &envelope.cancellation {
            Some(token) => tokio::select! {
                () = token.cancelled() => return Err(RawFailure::Cancelled),
                outcome = tokio::time::timeout(self.config.timeout, send) => outcome,
            },
            None => tokio::time::timeout(self.config.timeout, send).await,
        };

        match outcome {
            Ok(result) => result,
            Err(_) => Err(RawFailure::Timeout),
        }
    }
}

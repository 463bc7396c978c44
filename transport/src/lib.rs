//! Resilient HTTP transport for shipping-platform carrier SDKs.
//!
//! Every carrier SDK in the platform talks to its API through the single
//! `request(envelope)` contract provided here. This crate owns the hard
//! parts of that call path:
//! - Structured errors with category, severity, and retryability
//! - Sliding-window rate limiting of outbound calls
//! - Circuit breaker around the carrier endpoint
//! - Retry with capped exponential backoff
//! - Request/response/error interceptor pipeline with built-in stages
//! - TTL response cache for idempotent lookup calls

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod envelope;
pub mod config;
pub mod http;
pub mod classifier;
pub mod rate_limit;
pub mod circuit_breaker;
pub mod retry;
pub mod interceptor;
pub mod interceptors;
pub mod cache;
pub mod transport;
pub mod tracing_config;
pub mod metrics;

pub use error::{ErrorCategory, ErrorSeverity, StructuredError};
pub use envelope::{CallTarget, CarrierResponse, Envelope};
pub use config::TransportConfig;
pub use http::build_http_client;
pub use classifier::{ErrorClassifier, RawFailure};
pub use rate_limit::RateLimiter;
pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitBreakerError, CircuitState};
pub use retry::{RetryConfig, RetryPolicy};
pub use interceptor::{
    ErrorInterceptor, InterceptorPipeline, RequestFlow, RequestInterceptor, ResponseInterceptor,
};
pub use interceptors::{
    ApiKeyInterceptor, ErrorTranslationInterceptor, LoggingInterceptor, RequestIdInterceptor,
    ResponseValidationInterceptor, RetryOverrideInterceptor,
};
pub use cache::{CacheConfig, CachingInterceptor, ResponseCache};
pub use transport::Transport;
pub use tracing_config::{TracingConfig, init_tracing};
pub use metrics::{CacheMetrics, Counter, Gauge, TransportMetrics};

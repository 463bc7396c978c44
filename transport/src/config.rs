//! Transport configuration.
//!
//! All knobs are fixed at [`Transport`](crate::transport::Transport)
//! construction; nothing here is mutated afterwards.

use crate::circuit_breaker::CircuitBreakerConfig;
use std::collections::HashMap;
use std::time::Duration;

/// Immutable transport configuration.
///
/// Built once, read by every call. Environment and file-based configuration
/// belong to the surrounding SDK packages; this type only carries the values
/// they resolved.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Base endpoint of the carrier API
    pub base_url: String,
    /// Per-call request timeout (default: 30s)
    pub timeout: Duration,
    /// Connection timeout (default: 10s)
    pub connect_timeout: Duration,
    /// Pool idle timeout (default: 90s)
    pub pool_idle_timeout: Duration,
    /// Maximum idle connections per host (default: 10)
    pub pool_max_idle_per_host: usize,
    /// User agent string
    pub user_agent: String,
    /// Maximum number of retry attempts per call
    pub max_retries: u32,
    /// Delay before the first retry
    pub initial_retry_delay: Duration,
    /// Ceiling on the backoff delay
    pub max_retry_delay: Duration,
    /// Multiplier applied to the delay between consecutive retries
    pub backoff_multiplier: f64,
    /// Outbound calls permitted per rolling second
    pub requests_per_second: u32,
    /// Headers attached to every outbound call
    pub default_headers: HashMap<String, String>,
    /// Whether the built-in logging interceptor is installed
    pub enable_logging: bool,
    /// Circuit breaker configuration
    pub circuit_breaker: CircuitBreakerConfig,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            base_url: "https://localhost:8443".to_string(),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            pool_idle_timeout: Duration::from_secs(90),
            pool_max_idle_per_host: 10,
            user_agent: "shipping-platform-rust/1.0".to_string(),
            max_retries: 3,
            initial_retry_delay: Duration::from_millis(100),
            max_retry_delay: Duration::from_secs(10),
            backoff_multiplier: 2.0,
            requests_per_second: 10,
            default_headers: HashMap::new(),
            enable_logging: true,
            circuit_breaker: CircuitBreakerConfig::default(),
        }
    }
}

impl TransportConfig {
    /// Create a configuration for the given carrier endpoint.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set the per-call timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the connection timeout.
    #[must_use]
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the maximum number of retry attempts.
    #[must_use]
    pub const fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the delay before the first retry.
    #[must_use]
    pub const fn with_initial_retry_delay(mut self, delay: Duration) -> Self {
        self.initial_retry_delay = delay;
        self
    }

    /// Set the ceiling on the backoff delay.
    #[must_use]
    pub const fn with_max_retry_delay(mut self, delay: Duration) -> Self {
        self.max_retry_delay = delay;
        self
    }

    /// Set the backoff multiplier.
    #[must_use]
    pub const fn with_backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    /// Set the rolling-second rate limit.
    #[must_use]
    pub const fn with_requests_per_second(mut self, limit: u32) -> Self {
        self.requests_per_second = limit;
        self
    }

    /// Attach a header to every outbound call.
    #[must_use]
    pub fn with_default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.insert(name.into(), value.into());
        self
    }

    /// Disable the built-in logging interceptor.
    #[must_use]
    pub const fn without_logging(mut self) -> Self {
        self.enable_logging = false;
        self
    }

    /// Set the circuit breaker configuration.
    #[must_use]
    pub fn with_circuit_breaker(mut self, circuit_breaker: CircuitBreakerConfig) -> Self {
        self.circuit_breaker = circuit_breaker;
        self
    }
}

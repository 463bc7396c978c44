//! Retry policy with capped exponential backoff.
//!
//! Decides whether a classified error warrants another attempt and how
//! long to wait before it. The transport owns the actual sleep.

use crate::error::{ErrorCategory, StructuredError};
use std::time::Duration;

/// Retry policy configuration.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts
    pub max_retries: u32,
    /// Delay before the first retry
    pub initial_delay: Duration,
    /// Ceiling on the backoff delay
    pub max_delay: Duration,
    /// Multiplier applied between consecutive retries
    pub multiplier: f64,
    /// Whether to add up to 25% jitter to each delay
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(10),
            multiplier: 2.0,
            jitter: false,
        }
    }
}

impl RetryConfig {
    /// Set the maximum number of retries.
    #[must_use]
    pub const fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the delay before the first retry.
    #[must_use]
    pub const fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Set the ceiling on the backoff delay.
    #[must_use]
    pub const fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Set the backoff multiplier.
    #[must_use]
    pub const fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    /// Enable jitter on retry delays.
    #[must_use]
    pub const fn with_jitter(mut self) -> Self {
        self.jitter = true;
        self
    }
}

/// Retry decision logic over classified errors.
///
/// Attempt numbering starts at 1 for the first retry.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    config: RetryConfig,
}

impl RetryPolicy {
    /// Create a retry policy with the given configuration.
    #[must_use]
    pub const fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// Create a retry policy with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(RetryConfig::default())
    }

    /// Whether another attempt is permitted for this error.
    ///
    /// True iff the attempt budget is not exhausted and the error is either
    /// marked retryable or Network-class.
    #[must_use]
    pub fn should_retry(&self, error: &StructuredError, attempt: u32) -> bool {
        attempt < self.config.max_retries
            && (error.retryable || error.category == ErrorCategory::Network)
    }

    /// Backoff delay before retrying after the given attempt.
    ///
    /// `initial_delay * multiplier^(attempt-1)`, capped at the configured
    /// maximum. Jitter, when enabled, adds up to 25% on top.
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1);
        let base = self.config.initial_delay.as_millis() as f64
            * self.config.multiplier.powi(exponent as i32);

        let delay_ms = base.min(self.config.max_delay.as_millis() as f64);

        let final_delay = if self.config.jitter {
            delay_ms * (1.0 + rand::random::<f64>() * 0.25)
        } else {
            delay_ms
        };

        Duration::from_millis(final_delay as u64)
    }

    /// Maximum number of retries.
    #[must_use]
    pub const fn max_retries(&self) -> u32 {
        self.config.max_retries
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorSeverity;

    #[test]
    fn test_default_config() {
        let config = RetryConfig::default();
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.initial_delay, Duration::from_millis(100));
        assert!(!config.jitter);
    }

    #[test]
    fn test_delay_doubles_per_attempt() {
        let policy = RetryPolicy::with_defaults();

        assert_eq!(policy.delay_for(1), Duration::from_millis(100));
        assert_eq!(policy.delay_for(2), Duration::from_millis(200));
        assert_eq!(policy.delay_for(3), Duration::from_millis(400));
    }

    #[test]
    fn test_delay_is_capped() {
        let config = RetryConfig::default()
            .with_max_delay(Duration::from_millis(250))
            .with_max_retries(10);
        let policy = RetryPolicy::new(config);

        assert_eq!(policy.delay_for(3), Duration::from_millis(250));
        assert_eq!(policy.delay_for(8), Duration::from_millis(250));
    }

    #[test]
    fn test_should_retry_respects_budget() {
        let policy = RetryPolicy::with_defaults();
        let error = StructuredError::http_status(500, "server error");

        assert!(policy.should_retry(&error, 1));
        assert!(policy.should_retry(&error, 2));
        assert!(!policy.should_retry(&error, 3));
    }

    #[test]
    fn test_should_retry_network_category_even_when_flag_cleared() {
        let policy = RetryPolicy::with_defaults();
        let error = StructuredError::http_status(400, "bad request");

        assert!(!error.retryable);
        assert!(policy.should_retry(&error, 1));
    }

    #[test]
    fn test_should_not_retry_non_network_non_retryable() {
        let policy = RetryPolicy::with_defaults();
        let error = StructuredError::new(
            "INVALID_RESPONSE",
            "bad shape",
            ErrorCategory::Validation,
            ErrorSeverity::Medium,
        );

        assert!(!policy.should_retry(&error, 1));
    }

    #[test]
    fn test_should_retry_interceptor_override() {
        let policy = RetryPolicy::with_defaults();
        let error = StructuredError::new(
            "EXPIRED_QUOTE",
            "quote expired",
            ErrorCategory::BusinessLogic,
            ErrorSeverity::Medium,
        )
        .with_retryable(true);

        assert!(policy.should_retry(&error, 1));
    }

    #[test]
    fn test_jitter_stays_within_bounds() {
        let config = RetryConfig::default().with_jitter();
        let policy = RetryPolicy::new(config);

        for _ in 0..50 {
            let delay = policy.delay_for(1);
            assert!(delay >= Duration::from_millis(100));
            assert!(delay <= Duration::from_millis(125));
        }
    }
}

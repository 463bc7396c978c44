//! Circuit breaker guarding the carrier endpoint.
//!
//! Tracks consecutive failures across calls and fails fast once the
//! endpoint is deemed unhealthy, probing again after a recovery timeout.
//! Only behavior-level methods are exposed; the counters stay private.

use std::future::Future;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::Mutex;

/// Circuit breaker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Operations run normally
    Closed,
    /// Operations are rejected without running
    Open,
    /// Probing recovery; a failure re-opens immediately
    HalfOpen,
}

/// Failure returned by [`CircuitBreaker::execute`].
///
/// Keeps the breaker decoupled from any particular error taxonomy: the
/// wrapped operation's own error type is carried through unchanged.
#[derive(Debug, Error)]
pub enum CircuitBreakerError<E> {
    /// The circuit is open; the operation was not invoked
    #[error("circuit breaker is open")]
    Open,
    /// The operation ran and failed
    #[error("{0}")]
    Inner(E),
}

/// Circuit breaker configuration.
#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures before the circuit opens
    pub failure_threshold: u32,
    /// Consecutive half-open successes before the circuit closes
    pub success_threshold: u32,
    /// How long the circuit stays open before probing recovery
    pub recovery_timeout: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            success_threshold: 2,
            recovery_timeout: Duration::from_secs(30),
        }
    }
}

impl CircuitBreakerConfig {
    /// Set the failure threshold.
    #[must_use]
    pub const fn with_failure_threshold(mut self, threshold: u32) -> Self {
        self.failure_threshold = threshold;
        self
    }

    /// Set the success threshold.
    #[must_use]
    pub const fn with_success_threshold(mut self, threshold: u32) -> Self {
        self.success_threshold = threshold;
        self
    }

    /// Set the recovery timeout.
    #[must_use]
    pub const fn with_recovery_timeout(mut self, timeout: Duration) -> Self {
        self.recovery_timeout = timeout;
        self
    }
}

#[derive(Debug)]
struct BreakerInner {
    state: CircuitState,
    failures: u32,
    successes: u32,
    last_failure: Option<Instant>,
}

/// Circuit breaker wrapping an arbitrary async operation.
///
/// State transitions follow Closed → Open on a run of consecutive
/// failures, Open → `HalfOpen` once the recovery timeout elapses, and
/// `HalfOpen` → Closed only after a run of consecutive successes. A single
/// failure while half-open re-opens the circuit.
#[derive(Debug)]
pub struct CircuitBreaker {
    config: CircuitBreakerConfig,
    inner: Mutex<BreakerInner>,
}

impl CircuitBreaker {
    /// Create a circuit breaker with the given configuration.
    #[must_use]
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            config,
            inner: Mutex::new(BreakerInner {
                state: CircuitState::Closed,
                failures: 0,
                successes: 0,
                last_failure: None,
            }),
        }
    }

    /// Create a circuit breaker with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(CircuitBreakerConfig::default())
    }

    /// Run `operation` through the breaker.
    ///
    /// # Errors
    ///
    /// Returns [`CircuitBreakerError::Open`] without invoking the operation
    /// when the circuit is open, or [`CircuitBreakerError::Inner`] carrying
    /// the operation's own error when it ran and failed.
    pub async fn execute<F, Fut, T, E>(&self, operation: F) -> Result<T, CircuitBreakerError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if !self.try_acquire().await {
            return Err(CircuitBreakerError::Open);
        }

        match operation().await {
            Ok(value) => {
                self.record_success().await;
                Ok(value)
            }
            Err(error) => {
                self.record_failure().await;
                Err(CircuitBreakerError::Inner(error))
            }
        }
    }

    /// Current circuit state.
    pub async fn state(&self) -> CircuitState {
        self.inner.lock().await.state
    }

    /// Reset the breaker to the closed state.
    pub async fn reset(&self) {
        let mut inner = self.inner.lock().await;
        inner.state = CircuitState::Closed;
        inner.failures = 0;
        inner.successes = 0;
        inner.last_failure = None;
    }

    async fn try_acquire(&self) -> bool {
        let mut inner = self.inner.lock().await;
        match inner.state {
            CircuitState::Closed | CircuitState::HalfOpen => true,
            CircuitState::Open => {
                let recovered = inner
                    .last_failure
                    .is_some_and(|t| t.elapsed() >= self.config.recovery_timeout);
                if recovered {
                    inner.state = CircuitState::HalfOpen;
                    inner.successes = 0;
                    true
                } else {
                    false
                }
            }
        }
    }

    async fn record_success(&self) {
        let mut inner = self.inner.lock().await;
        match inner.state {
            CircuitState::Closed => inner.failures = 0,
            CircuitState::HalfOpen => {
                inner.successes += 1;
                if inner.successes >= self.config.success_threshold {
                    inner.state = CircuitState::Closed;
                    inner.failures = 0;
                    inner.successes = 0;
                }
            }
            CircuitState::Open => {}
        }
    }

    async fn record_failure(&self) {
        let mut inner = self.inner.lock().await;
        inner.last_failure = Some(Instant::now());
        match inner.state {
            CircuitState::Closed => {
                inner.failures += 1;
                if inner.failures >= self.config.failure_threshold {
                    inner.state = CircuitState::Open;
                }
            }
            CircuitState::HalfOpen => {
                inner.state = CircuitState::Open;
                inner.failures = 0;
                inner.successes = 0;
            }
            CircuitState::Open => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn fail(cb: &CircuitBreaker) {
        let _ = cb
            .execute(|| async { Err::<(), String>("boom".to_string()) })
            .await;
    }

    async fn succeed(cb: &CircuitBreaker) {
        let _ = cb.execute(|| async { Ok::<(), String>(()) }).await;
    }

    #[tokio::test]
    async fn test_initial_state_closed() {
        let cb = CircuitBreaker::with_defaults();
        assert_eq!(cb.state().await, CircuitState::Closed);
    }

    #[tokio::test]
    async fn test_opens_after_consecutive_failures() {
        let config = CircuitBreakerConfig::default().with_failure_threshold(3);
        let cb = CircuitBreaker::new(config);

        for _ in 0..3 {
            fail(&cb).await;
        }

        assert_eq!(cb.state().await, CircuitState::Open);
    }

    #[tokio::test]
    async fn test_open_rejects_without_invoking_operation() {
        let config = CircuitBreakerConfig::default().with_failure_threshold(1);
        let cb = CircuitBreaker::new(config);
        fail(&cb).await;

        let mut invoked = false;
        let result = cb
            .execute(|| {
                invoked = true;
                async { Ok::<(), String>(()) }
            })
            .await;

        assert!(matches!(result, Err(CircuitBreakerError::Open)));
        assert!(!invoked);
    }

    #[tokio::test]
    async fn test_success_resets_failure_run() {
        let config = CircuitBreakerConfig::default().with_failure_threshold(3);
        let cb = CircuitBreaker::new(config);

        fail(&cb).await;
        fail(&cb).await;
        succeed(&cb).await;
        fail(&cb).await;
        fail(&cb).await;

        assert_eq!(cb.state().await, CircuitState::Closed);
    }

    #[tokio::test]
    async fn test_half_open_after_recovery_timeout() {
        let config = CircuitBreakerConfig::default()
            .with_failure_threshold(2)
            .with_success_threshold(1)
            .with_recovery_timeout(Duration::from_millis(1));
        let cb = CircuitBreaker::new(config);

        fail(&cb).await;
        fail(&cb).await;
        assert_eq!(cb.state().await, CircuitState::Open);

        tokio::time::sleep(Duration::from_millis(5)).await;

        succeed(&cb).await;
        assert_eq!(cb.state().await, CircuitState::Closed);
    }

    #[tokio::test]
    async fn test_closes_after_success_threshold_in_half_open() {
        let config = CircuitBreakerConfig::default()
            .with_failure_threshold(2)
            .with_success_threshold(2)
            .with_recovery_timeout(Duration::from_millis(1));
        let cb = CircuitBreaker::new(config);

        fail(&cb).await;
        fail(&cb).await;
        tokio::time::sleep(Duration::from_millis(5)).await;

        succeed(&cb).await;
        assert_eq!(cb.state().await, CircuitState::HalfOpen);
        succeed(&cb).await;
        assert_eq!(cb.state().await, CircuitState::Closed);
    }

    #[tokio::test]
    async fn test_half_open_failure_reopens() {
        let config = CircuitBreakerConfig::default()
            .with_failure_threshold(2)
            .with_success_threshold(2)
            .with_recovery_timeout(Duration::from_millis(1));
        let cb = CircuitBreaker::new(config);

        fail(&cb).await;
        fail(&cb).await;
        tokio::time::sleep(Duration::from_millis(5)).await;

        succeed(&cb).await;
        assert_eq!(cb.state().await, CircuitState::HalfOpen);
        fail(&cb).await;
        assert_eq!(cb.state().await, CircuitState::Open);
    }

    #[tokio::test]
    async fn test_reset() {
        let config = CircuitBreakerConfig::default().with_failure_threshold(1);
        let cb = CircuitBreaker::new(config);
        fail(&cb).await;
        assert_eq!(cb.state().await, CircuitState::Open);

        cb.reset().await;
        assert_eq!(cb.state().await, CircuitState::Closed);

        let result = cb.execute(|| async { Ok::<i32, String>(7) }).await;
        assert!(matches!(result, Ok(7)));
    }
}

//! Atomic metrics with Prometheus text formatting.
//!
//! The transport and response cache update these as side effects; binaries
//! embedding the transport scrape them via `to_prometheus`.

use std::sync::atomic::{AtomicU64, Ordering};

fn render(name: &str, help: &str, kind: &str, value: u64) -> String {
    format!("# HELP {name} {help}\n# TYPE {name} {kind}\n{name} {value}\n")
}

/// Monotonically increasing counter.
#[derive(Debug)]
pub struct Counter {
    name: String,
    help: String,
    value: AtomicU64,
}

impl Counter {
    /// Create a counter.
    #[must_use]
    pub fn new(name: impl Into<String>, help: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            help: help.into(),
            value: AtomicU64::new(0),
        }
    }

    /// Increment by one.
    pub fn inc(&self) {
        self.value.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment by `amount`.
    pub fn inc_by(&self, amount: u64) {
        self.value.fetch_add(amount, Ordering::Relaxed);
    }

    /// Current value.
    #[must_use]
    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }

    /// Metric name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Prometheus text form.
    #[must_use]
    pub fn to_prometheus(&self) -> String {
        render(&self.name, &self.help, "counter", self.get())
    }
}

/// Settable gauge.
#[derive(Debug)]
pub struct Gauge {
    name: String,
    help: String,
    value: AtomicU64,
}

impl Gauge {
    /// Create a gauge.
    #[must_use]
    pub fn new(name: impl Into<String>, help: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            help: help.into(),
            value: AtomicU64::new(0),
        }
    }

    /// Set the value.
    pub fn set(&self, value: u64) {
        self.value.store(value, Ordering::Relaxed);
    }

    /// Increment by one.
    pub fn inc(&self) {
        self.value.fetch_add(1, Ordering::Relaxed);
    }

    /// Decrement by one.
    pub fn dec(&self) {
        self.value.fetch_sub(1, Ordering::Relaxed);
    }

    /// Current value.
    #[must_use]
    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }

    /// Metric name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Prometheus text form.
    #[must_use]
    pub fn to_prometheus(&self) -> String {
        render(&self.name, &self.help, "gauge", self.get())
    }
}

/// Call-path metrics owned by the transport.
#[derive(Debug)]
pub struct TransportMetrics {
    /// External calls accepted (including short-circuited ones)
    pub requests: Counter,
    /// Retry attempts performed
    pub retries: Counter,
    /// External calls that surfaced an error
    pub failures: Counter,
    /// Calls rejected by the open circuit breaker
    pub circuit_rejections: Counter,
}

impl TransportMetrics {
    /// Create transport metrics under the given prefix.
    #[must_use]
    pub fn new(prefix: &str) -> Self {
        Self {
            requests: Counter::new(
                format!("{prefix}_requests_total"),
                "Total carrier calls accepted",
            ),
            retries: Counter::new(
                format!("{prefix}_retries_total"),
                "Total retry attempts performed",
            ),
            failures: Counter::new(
                format!("{prefix}_failures_total"),
                "Total carrier calls that surfaced an error",
            ),
            circuit_rejections: Counter::new(
                format!("{prefix}_circuit_rejections_total"),
                "Total calls rejected by the open circuit breaker",
            ),
        }
    }

    /// Prometheus text form of all transport metrics.
    #[must_use]
    pub fn to_prometheus(&self) -> String {
        format!(
            "{}{}{}{}",
            self.requests.to_prometheus(),
            self.retries.to_prometheus(),
            self.failures.to_prometheus(),
            self.circuit_rejections.to_prometheus()
        )
    }
}

/// Hit/miss/size metrics owned by the response cache.
#[derive(Debug)]
pub struct CacheMetrics {
    /// Cache hits
    pub hits: Counter,
    /// Cache misses
    pub misses: Counter,
    /// Current entry count
    pub size: Gauge,
}

impl CacheMetrics {
    /// Create cache metrics under the given prefix.
    #[must_use]
    pub fn new(prefix: &str) -> Self {
        Self {
            hits: Counter::new(
                format!("{prefix}_cache_hits_total"),
                "Total response cache hits",
            ),
            misses: Counter::new(
                format!("{prefix}_cache_misses_total"),
                "Total response cache misses",
            ),
            size: Gauge::new(
                format!("{prefix}_cache_size"),
                "Current number of cached responses",
            ),
        }
    }

    /// Record a hit.
    pub fn record_hit(&self) {
        self.hits.inc();
    }

    /// Record a miss.
    pub fn record_miss(&self) {
        self.misses.inc();
    }

    /// Update the size gauge.
    pub fn update_size(&self, size: u64) {
        self.size.set(size);
    }

    /// Prometheus text form of all cache metrics.
    #[must_use]
    pub fn to_prometheus(&self) -> String {
        format!(
            "{}{}{}",
            self.hits.to_prometheus(),
            self.misses.to_prometheus(),
            self.size.to_prometheus()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter() {
        let counter = Counter::new("calls_total", "Total calls");
        assert_eq!(counter.get(), 0);

        counter.inc();
        counter.inc_by(4);
        assert_eq!(counter.get(), 5);
    }

    #[test]
    fn test_gauge() {
        let gauge = Gauge::new("in_flight", "In-flight calls");
        gauge.set(3);
        gauge.inc();
        gauge.dec();
        assert_eq!(gauge.get(), 3);
    }

    #[test]
    fn test_prometheus_format() {
        let counter = Counter::new("carrier_requests_total", "Total carrier calls");
        counter.inc_by(7);

        let output = counter.to_prometheus();
        assert!(output.contains("# HELP carrier_requests_total Total carrier calls"));
        assert!(output.contains("# TYPE carrier_requests_total counter"));
        assert!(output.contains("carrier_requests_total 7"));
    }

    #[test]
    fn test_transport_metrics_aggregate() {
        let metrics = TransportMetrics::new("carrier_transport");
        metrics.requests.inc();
        metrics.retries.inc_by(2);
        metrics.circuit_rejections.inc();

        let output = metrics.to_prometheus();
        assert!(output.contains("carrier_transport_requests_total 1"));
        assert!(output.contains("carrier_transport_retries_total 2"));
        assert!(output.contains("carrier_transport_failures_total 0"));
        assert!(output.contains("carrier_transport_circuit_rejections_total 1"));
    }

    #[test]
    fn test_cache_metrics_aggregate() {
        let metrics = CacheMetrics::new("carrier_transport");
        metrics.record_hit();
        metrics.record_miss();
        metrics.update_size(12);

        assert_eq!(metrics.hits.get(), 1);
        assert_eq!(metrics.misses.get(), 1);
        assert_eq!(metrics.size.get(), 12);
    }
}

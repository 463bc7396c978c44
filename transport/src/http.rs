//! HTTP client construction.
//!
//! All outbound carrier traffic goes through a single pooled reqwest client
//! built from the transport configuration.

use crate::config::TransportConfig;
use reqwest::{Client, ClientBuilder};

/// Build the pooled HTTP client used for all carrier calls.
///
/// Applies the per-call timeout, connect timeout, pool settings, and user
/// agent from the configuration, with rustls TLS.
///
/// # Errors
///
/// Returns an error if the client cannot be built (e.g., TLS initialization
/// fails).
///
/// # Examples
///
/// ```
/// use carrier_transport::{TransportConfig, build_http_client};
///
/// let config = TransportConfig::default();
/// let client = build_http_client(&config)?;
/// # Ok::<(), reqwest::Error>(())
/// ```
pub fn build_http_client(config: &TransportConfig) -> Result<Client, reqwest::Error> {
    ClientBuilder::new()
        .timeout(config.timeout)
        .connect_timeout(config.connect_timeout)
        .pool_idle_timeout(config.pool_idle_timeout)
        .pool_max_idle_per_host(config.pool_max_idle_per_host)
        .user_agent(&config.user_agent)
        .use_rustls_tls()
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_build_client() {
        let config = TransportConfig::default();
        let result = build_http_client(&config);
        assert!(result.is_ok());
    }

    #[test]
    fn test_build_client_with_custom_timeouts() {
        let config = TransportConfig::default()
            .with_timeout(Duration::from_secs(5))
            .with_connect_timeout(Duration::from_secs(2))
            .with_user_agent("carrier-sdk-test");
        let result = build_http_client(&config);
        assert!(result.is_ok());
    }
}

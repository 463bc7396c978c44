//! Call envelopes and responses exchanged with the transport.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use tokio_util::sync::CancellationToken;

/// Identifier of a carrier API operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallTarget {
    /// Resource model, e.g. `shipments`
    pub model: String,
    /// Operation on the model, e.g. `create`
    pub method: String,
}

impl CallTarget {
    /// Create a call target.
    #[must_use]
    pub fn new(model: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            method: method.into(),
        }
    }

    /// Route form of the target, `model/method`.
    #[must_use]
    pub fn route(&self) -> String {
        format!("{}/{}", self.model, self.method)
    }
}

impl fmt::Display for CallTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.model, self.method)
    }
}

/// Carrier-agnostic description of an outbound call.
///
/// Built by the per-carrier request-shaping layer; the transport never
/// interprets the parameter bag beyond serializing it.
#[derive(Debug, Clone)]
pub struct Envelope {
    /// Operation being called
    pub target: CallTarget,
    /// JSON parameter bag sent as the request body
    pub parameters: serde_json::Map<String, Value>,
    /// Per-call headers, merged over the transport defaults
    pub headers: HashMap<String, String>,
    /// Optional caller-supplied cancellation signal
    pub cancellation: Option<CancellationToken>,
}

impl Envelope {
    /// Create an envelope for the given target.
    #[must_use]
    pub fn new(target: CallTarget) -> Self {
        Self {
            target,
            parameters: serde_json::Map::new(),
            headers: HashMap::new(),
            cancellation: None,
        }
    }

    /// Add a parameter to the bag.
    #[must_use]
    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    /// Replace the whole parameter bag.
    #[must_use]
    pub fn with_parameters(mut self, parameters: serde_json::Map<String, Value>) -> Self {
        self.parameters = parameters;
        self
    }

    /// Add a per-call header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Attach a cancellation token.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Whether the caller's cancellation signal has fired.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }
}

/// Response returned to the calling SDK layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarrierResponse {
    /// HTTP status code of the carrier reply
    pub status: u16,
    /// Decoded JSON payload
    pub payload: Value,
}

impl CarrierResponse {
    /// Create a response.
    #[must_use]
    pub const fn new(status: u16, payload: Value) -> Self {
        Self { status, payload }
    }

    /// Whether the status is in the 2xx range.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_target_route() {
        let target = CallTarget::new("shipments", "create");
        assert_eq!(target.route(), "shipments/create");
        assert_eq!(target.to_string(), "shipments/create");
    }

    #[test]
    fn test_envelope_builder() {
        let envelope = Envelope::new(CallTarget::new("rates", "quote"))
            .with_parameter("origin", "DE")
            .with_parameter("weight_grams", 1200)
            .with_header("x-tenant", "acme");

        assert_eq!(envelope.target.model, "rates");
        assert_eq!(envelope.parameters.get("origin"), Some(&json!("DE")));
        assert_eq!(envelope.parameters.get("weight_grams"), Some(&json!(1200)));
        assert_eq!(envelope.headers.get("x-tenant"), Some(&"acme".to_string()));
        assert!(envelope.cancellation.is_none());
    }

    #[test]
    fn test_cancellation_state() {
        let token = CancellationToken::new();
        let envelope =
            Envelope::new(CallTarget::new("tracking", "status")).with_cancellation(token.clone());

        assert!(!envelope.is_cancelled());
        token.cancel();
        assert!(envelope.is_cancelled());
    }

    #[test]
    fn test_response_success_range() {
        assert!(CarrierResponse::new(200, json!({})).is_success());
        assert!(CarrierResponse::new(299, json!({})).is_success());
        assert!(!CarrierResponse::new(301, json!({})).is_success());
        assert!(!CarrierResponse::new(500, json!({})).is_success());
    }
}

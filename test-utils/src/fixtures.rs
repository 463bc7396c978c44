//! Fixtures with sample carrier-style envelopes and responses.

use carrier_transport::{CallTarget, CarrierResponse, Envelope};
use serde_json::{Value, json};

/// Envelope for a tracking status lookup.
#[must_use]
pub fn tracking_envelope() -> Envelope {
    Envelope::new(CallTarget::new("tracking", "status"))
        .with_parameter("tracking_number", "1Z999AA10123456784")
}

/// Envelope for a shipment creation call.
#[must_use]
pub fn shipment_envelope() -> Envelope {
    Envelope::new(CallTarget::new("shipments", "create"))
        .with_parameter("origin_country", "DE")
        .with_parameter("destination_country", "US")
        .with_parameter("weight_grams", 1500)
}

/// Envelope for a rate quote lookup.
#[must_use]
pub fn rate_lookup_envelope() -> Envelope {
    Envelope::new(CallTarget::new("rates", "lookup"))
        .with_parameter("zone", "EU")
        .with_parameter("service_level", "express")
}

/// Carrier payload reporting success with the given data.
#[must_use]
pub fn success_payload(data: Value) -> Value {
    json!({
        "success": true,
        "data": data,
        "errors": []
    })
}

/// Carrier payload reporting a domain failure.
#[must_use]
pub fn failure_payload(code: &str, message: &str) -> Value {
    json!({
        "success": false,
        "data": null,
        "errors": [{"code": code, "message": message}]
    })
}

/// Successful carrier response wrapping [`success_payload`].
#[must_use]
pub fn success_response(data: Value) -> CarrierResponse {
    CarrierResponse::new(200, success_payload(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_payload_shape() {
        let payload = success_payload(json!({"status": "delivered"}));
        assert_eq!(payload["success"], json!(true));
        assert_eq!(payload["data"]["status"], json!("delivered"));
        assert!(payload["errors"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_failure_payload_shape() {
        let payload = failure_payload("TRACK.NOT_FOUND", "unknown tracking number");
        assert_eq!(payload["success"], json!(false));
        assert_eq!(payload["errors"][0]["code"], json!("TRACK.NOT_FOUND"));
    }

    #[test]
    fn test_fixture_envelopes_have_parameters() {
        assert!(!tracking_envelope().parameters.is_empty());
        assert!(!shipment_envelope().parameters.is_empty());
        assert!(!rate_lookup_envelope().parameters.is_empty());
    }
}

//! Proptest generators for transport domain types.

use carrier_transport::{CallTarget, Envelope, ErrorCategory, ErrorSeverity, StructuredError};
use proptest::prelude::*;
use serde_json::{Map, Value};
use std::time::Duration;

/// Generate carrier resource model names.
pub fn model_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("shipments".to_string()),
        Just("rates".to_string()),
        Just("tracking".to_string()),
        Just("labels".to_string()),
        Just("pickups".to_string()),
        Just("addresses".to_string()),
    ]
}

/// Generate operation names on a model.
pub fn method_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("create".to_string()),
        Just("get".to_string()),
        Just("list".to_string()),
        Just("quote".to_string()),
        Just("status".to_string()),
        Just("cancel".to_string()),
        Just("lookup".to_string()),
    ]
}

/// Generate call targets.
pub fn call_target_strategy() -> impl Strategy<Value = CallTarget> {
    (model_strategy(), method_strategy()).prop_map(|(model, method)| CallTarget::new(model, method))
}

/// Generate scalar JSON parameter values.
pub fn parameter_value_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        "[a-zA-Z0-9 ]{1,20}".prop_map(Value::from),
        (0i64..100_000).prop_map(Value::from),
        any::<bool>().prop_map(Value::from),
    ]
}

/// Generate parameter bags of up to eight entries.
pub fn parameter_bag_strategy() -> impl Strategy<Value = Map<String, Value>> {
    proptest::collection::btree_map("[a-z][a-z_]{1,15}", parameter_value_strategy(), 0..8)
        .prop_map(|entries| entries.into_iter().collect())
}

/// Generate complete envelopes.
pub fn envelope_strategy() -> impl Strategy<Value = Envelope> {
    (call_target_strategy(), parameter_bag_strategy())
        .prop_map(|(target, parameters)| Envelope::new(target).with_parameters(parameters))
}

/// Generate realistic HTTP status codes.
pub fn http_status_strategy() -> impl Strategy<Value = u16> {
    prop_oneof![
        Just(200u16),
        Just(201u16),
        Just(204u16),
        Just(400u16),
        Just(401u16),
        Just(403u16),
        Just(404u16),
        Just(429u16),
        Just(500u16),
        Just(502u16),
        Just(503u16),
    ]
}

/// Generate error categories.
pub fn error_category_strategy() -> impl Strategy<Value = ErrorCategory> {
    prop_oneof![
        Just(ErrorCategory::Authentication),
        Just(ErrorCategory::Validation),
        Just(ErrorCategory::BusinessLogic),
        Just(ErrorCategory::Network),
        Just(ErrorCategory::Configuration),
        Just(ErrorCategory::Unknown),
    ]
}

/// Generate error severities.
pub fn error_severity_strategy() -> impl Strategy<Value = ErrorSeverity> {
    prop_oneof![
        Just(ErrorSeverity::Low),
        Just(ErrorSeverity::Medium),
        Just(ErrorSeverity::High),
        Just(ErrorSeverity::Critical),
    ]
}

/// Generate structured errors with the category's default retryability.
pub fn structured_error_strategy() -> impl Strategy<Value = StructuredError> {
    (
        "[A-Z][A-Z_]{2,20}",
        "[a-zA-Z0-9 ]{1,50}",
        error_category_strategy(),
        error_severity_strategy(),
    )
        .prop_map(|(code, message, category, severity)| {
            StructuredError::new(code, message, category, severity)
        })
}

/// Generate short TTL values for expiry tests (1ms to 100ms).
pub fn short_ttl_strategy() -> impl Strategy<Value = Duration> {
    (1u64..100).prop_map(Duration::from_millis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::strategy::ValueTree;
    use proptest::test_runner::TestRunner;

    #[test]
    fn test_envelope_strategy_produces_valid_routes() {
        let mut runner = TestRunner::default();
        for _ in 0..10 {
            let envelope = envelope_strategy().new_tree(&mut runner).unwrap().current();
            let route = envelope.target.route();
            assert!(route.contains('/'));
            assert!(!route.starts_with('/'));
        }
    }

    #[test]
    fn test_structured_error_strategy_respects_category_defaults() {
        let mut runner = TestRunner::default();
        for _ in 0..10 {
            let error = structured_error_strategy()
                .new_tree(&mut runner)
                .unwrap()
                .current();
            assert_eq!(error.retryable, error.category.default_retryable());
        }
    }
}

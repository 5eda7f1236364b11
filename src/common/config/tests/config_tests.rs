//! Tests for normalizer configuration.

use common_config::{NormalizerConfig, DEFAULT_MAX_ITERATIONS};
use common_error::QuarryError;

#[test]
fn test_default_config() {
    let config = NormalizerConfig::default();
    assert_eq!(config.max_iterations, DEFAULT_MAX_ITERATIONS);
    assert!(!config.enable_trace);
    assert!(config.verify_hygiene);
    assert!(config.validate().is_ok());
}

#[test]
fn test_builder_setters() {
    let config = NormalizerConfig::default()
        .with_max_iterations(5)
        .with_trace(true)
        .with_verify_hygiene(false);
    assert_eq!(config.max_iterations, 5);
    assert!(config.enable_trace);
    assert!(!config.verify_hygiene);
}

#[test]
fn test_from_json_partial() {
    let config = NormalizerConfig::from_json(r#"{"enable_trace": true}"#).unwrap();
    assert!(config.enable_trace);
    assert_eq!(config.max_iterations, DEFAULT_MAX_ITERATIONS);
}

#[test]
fn test_from_json_rejects_zero_iterations() {
    let err = NormalizerConfig::from_json(r#"{"max_iterations": 0}"#).unwrap_err();
    assert!(matches!(err, QuarryError::InvalidParameter(_)));
}

#[test]
fn test_from_json_malformed() {
    let err = NormalizerConfig::from_json("max_iterations = 3").unwrap_err();
    assert!(matches!(err, QuarryError::SerdeJsonError(_)));
}

#[test]
fn test_json_roundtrip() {
    let config = NormalizerConfig::default().with_max_iterations(7);
    let json = serde_json::to_string(&config).unwrap();
    let back = NormalizerConfig::from_json(&json).unwrap();
    assert_eq!(config, back);
}

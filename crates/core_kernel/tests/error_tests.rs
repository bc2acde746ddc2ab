//! Tests for core_kernel error types

use core_kernel::{CoreError, IdentifierError, RecordError, TemporalError};

#[test]
fn test_core_error_validation() {
    let error = CoreError::validation("Invalid input");

    match error {
        CoreError::Validation(msg) => assert_eq!(msg, "Invalid input"),
        _ => panic!("Expected Validation error"),
    }
}

#[test]
fn test_core_error_configuration() {
    let error = CoreError::configuration("no commission schedule");
    assert!(error.to_string().contains("no commission schedule"));
}

#[test]
fn test_core_error_from_temporal_error() {
    let core_error: CoreError = TemporalError::InvalidMonth("2024-13".to_string()).into();
    assert!(matches!(core_error, CoreError::Temporal(_)));
    assert!(core_error.to_string().contains("2024-13"));
}

#[test]
fn test_core_error_from_identifier_error() {
    let core_error: CoreError = IdentifierError::Empty("agent").into();
    assert!(core_error.to_string().contains("agent"));
}

#[test]
fn test_record_error_serializes_as_pair() {
    let error = RecordError::new("agent-1:2024-03", "write failed");
    let json = serde_json::to_value(&error).unwrap();

    assert_eq!(json["identifier"], "agent-1:2024-03");
    assert_eq!(json["message"], "write failed");
    assert_eq!(error.to_string(), "agent-1:2024-03: write failed");
}

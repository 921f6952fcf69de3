//! Tests for error types

use colony_kernel::core::{ProductionRejection, SchedulerError};

#[test]
fn test_scheduler_error_display() {
    let err = SchedulerError::UnknownStation("spawn9".into());
    assert_eq!(err.to_string(), "unknown station: spawn9");
    let err = SchedulerError::InvalidConfig("cycle_length must be greater than 0".into());
    assert!(err.to_string().starts_with("invalid configuration"));
}

#[test]
fn test_serialization_error_converts() {
    let parse: Result<u32, _> = serde_json::from_str("\"x\"");
    let err: SchedulerError = parse.unwrap_err().into();
    assert!(matches!(err, SchedulerError::Serialization(_)));
}

#[test]
fn test_rejection_display_and_classification() {
    let short = ProductionRejection::InsufficientBudget {
        needed: 650,
        available: 300,
    };
    assert_eq!(short.to_string(), "insufficient budget: needed 650, available 300");
    assert!(short.is_budget_shortfall());
    assert!(!ProductionRejection::OwnerPaused.is_budget_shortfall());
    assert!(!ProductionRejection::Rejected("name exists".into()).is_budget_shortfall());
}

#[test]
fn test_scheduler_error_into_anyhow() {
    let err: anyhow::Error = SchedulerError::Backend("disk full".into()).into();
    assert!(err.to_string().contains("disk full"));
}

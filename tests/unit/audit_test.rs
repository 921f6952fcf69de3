//! Tests for audit sinks

use colony_kernel::core::{build_audit_event, AuditSink, InMemoryAuditSink, TracingAuditSink};

#[test]
fn test_in_memory_audit_sink() {
    let mut sink = InMemoryAuditSink::new(10);
    sink.record(build_audit_event("miner", "escalate", 7, Some("MEDIUM_HIGH".to_string())));

    let events = sink.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event_id, "miner-escalate-7");
    assert_eq!(events[0].subject, "miner");
    assert_eq!(events[0].payload.as_deref(), Some("MEDIUM_HIGH"));
}

#[test]
fn test_audit_sink_overflow() {
    let mut sink = InMemoryAuditSink::new(2);
    sink.record(build_audit_event("a", "complete", 1, None));
    sink.record(build_audit_event("b", "complete", 2, None));
    sink.record(build_audit_event("c", "complete", 3, None));

    let events = sink.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].subject, "b"); // Oldest dropped
    assert_eq!(events[1].subject, "c");
}

#[test]
fn test_zero_capacity_sink_records_nothing() {
    let mut sink = InMemoryAuditSink::new(0);
    sink.record(build_audit_event("a", "fault", 1, None));
    assert!(sink.events().is_empty());
}

#[test]
fn test_tracing_sink_accepts_events() {
    let mut sink = TracingAuditSink;
    sink.record(build_audit_event("spawn1", "rebuild", 42, Some("3".into())));
}

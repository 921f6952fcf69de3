//! Audit trail of scheduling decisions.
//!
//! The kernel records task completions, escalations and coerced faults; the runtime
//! records timeline rebuilds. Sinks are bounded so a long-running colony never grows
//! its trail without limit.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Audit event structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Event identifier.
    pub event_id: String,
    /// Subject of the event (task id or station id).
    pub subject: String,
    /// Action taken (complete, escalate, fault, rebuild).
    pub action: String,
    /// External tick the event happened on.
    pub tick: u64,
    /// Additional context.
    pub payload: Option<String>,
}

/// Audit sink abstraction.
pub trait AuditSink {
    /// Record an audit event.
    fn record(&mut self, event: AuditEvent);
}

/// In-memory audit sink for testing and dev.
#[derive(Debug, Clone)]
pub struct InMemoryAuditSink {
    events: VecDeque<AuditEvent>,
    max_events: usize,
}

impl InMemoryAuditSink {
    /// Create a new in-memory sink with a bounded buffer.
    #[must_use]
    pub fn new(max_events: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(max_events.min(1024)),
            max_events,
        }
    }

    /// Retrieve a snapshot of stored events.
    #[must_use]
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.iter().cloned().collect()
    }

    /// Events recorded for one subject, oldest first.
    #[must_use]
    pub fn events_for(&self, subject: &str) -> Vec<AuditEvent> {
        self.events
            .iter()
            .filter(|e| e.subject == subject)
            .cloned()
            .collect()
    }
}

impl AuditSink for InMemoryAuditSink {
    fn record(&mut self, event: AuditEvent) {
        if self.max_events == 0 {
            return;
        }
        if self.events.len() >= self.max_events {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }
}

/// Sink that forwards events into `tracing` at debug level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&mut self, event: AuditEvent) {
        tracing::debug!(
            subject = %event.subject,
            action = %event.action,
            tick = event.tick,
            payload = ?event.payload,
            "audit"
        );
    }
}

/// Helper to build an audit event from context.
pub fn build_audit_event(
    subject: impl Into<String>,
    action: impl Into<String>,
    tick: u64,
    payload: Option<String>,
) -> AuditEvent {
    let subject = subject.into();
    let action = action.into();
    AuditEvent {
        event_id: format!("{subject}-{action}-{tick}"),
        subject,
        action,
        tick,
        payload,
    }
}

/// Shared handle so callers can keep reading a sink the kernel writes to.
impl<S: AuditSink> AuditSink for std::rc::Rc<std::cell::RefCell<S>> {
    fn record(&mut self, event: AuditEvent) {
        self.borrow_mut().record(event);
    }
}

//! The per-tick execution loop.
//!
//! Each cycle orders the active task set by priority and runs every task once,
//! feeding the returned status back into the [`Scheduler`]. Task bodies never
//! propagate a fault past this boundary: returned errors and panics are both
//! coerced to [`TaskStatus::Failed`].
//!
//! Cost is measured per task but not capped; an over-budget task is not preempted.

use std::panic::{self, AssertUnwindSafe};

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use super::audit::{build_audit_event, AuditSink};
use super::{Scheduler, TaskStatus};
use crate::config::KernelConfig;
use crate::util::clock::{CpuClock, WallClock};
use crate::util::serde::TaskId;

/// What happened during one kernel cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CycleReport {
    /// Kernel cycle number, starting at 0.
    pub cycle: u64,
    /// Tasks invoked, in execution order.
    pub ran: Vec<TaskId>,
    /// Tasks that returned `Success` and were removed.
    pub completed: Vec<TaskId>,
    /// Tasks escalated after `Failed`/`Incomplete` (including coerced faults).
    pub escalated: Vec<TaskId>,
    /// Tasks whose body errored or panicked.
    pub faulted: Vec<TaskId>,
    /// Total measured cost of the cycle.
    pub cpu_used: f64,
}

/// Drives one pass over the scheduler per external tick.
pub struct Kernel {
    config: KernelConfig,
    clock: Box<dyn CpuClock>,
    audit: Option<Box<dyn AuditSink>>,
    cycle: u64,
}

impl Kernel {
    /// Create a kernel measuring with a [`WallClock`].
    #[must_use]
    pub fn new(config: KernelConfig) -> Self {
        Self::with_clock(config, Box::new(WallClock::new()))
    }

    /// Create a kernel with a custom cost meter.
    #[must_use]
    pub fn with_clock(config: KernelConfig, clock: Box<dyn CpuClock>) -> Self {
        Self {
            config,
            clock,
            audit: None,
            cycle: 0,
        }
    }

    /// Attach an audit sink.
    #[must_use]
    pub fn with_audit(mut self, audit: Box<dyn AuditSink>) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Number of cycles run so far.
    #[must_use]
    pub const fn cycles(&self) -> u64 {
        self.cycle
    }

    /// Kernel configuration.
    #[must_use]
    pub const fn config(&self) -> &KernelConfig {
        &self.config
    }

    /// Run every active task once, highest priority first.
    pub fn run_cycle<C>(&mut self, scheduler: &mut Scheduler<C>, ctx: &mut C) -> CycleReport {
        let mut report = CycleReport {
            cycle: self.cycle,
            ..CycleReport::default()
        };

        for id in scheduler.run_order() {
            let Some(task) = scheduler.active_task_mut(&id) else {
                continue;
            };

            let before = self.clock.used();
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| task.runner_mut().execute(ctx)));
            let cost = (self.clock.used() - before).max(0.0);
            task.record_cost(cost, self.config.cpu_history_len);
            report.cpu_used += cost;
            report.ran.push(id.clone());

            let status = match outcome {
                Ok(Ok(status)) => status,
                Ok(Err(err)) => {
                    warn!(task = %id, error = %err, "task body failed; coercing to FAILED");
                    self.audit(&id, "fault", Some(err.to_string()));
                    report.faulted.push(id.clone());
                    TaskStatus::Failed
                }
                Err(panic) => {
                    let message = panic_message(panic.as_ref());
                    error!(task = %id, panic = %message, "task body panicked; coercing to FAILED");
                    self.audit(&id, "fault", Some(message));
                    report.faulted.push(id.clone());
                    TaskStatus::Failed
                }
            };

            match status {
                TaskStatus::Success => {
                    info!(task = %id, "task completed");
                    scheduler.unregister(&id);
                    self.audit(&id, "complete", None);
                    report.completed.push(id);
                }
                TaskStatus::Failed | TaskStatus::Incomplete => {
                    let priority = scheduler.escalate(&id);
                    debug!(task = %id, ?status, ?priority, "task escalated");
                    self.audit(&id, "escalate", priority.map(|p| p.to_string()));
                    report.escalated.push(id);
                }
                TaskStatus::Running => {}
            }
        }

        debug!(
            cycle = self.cycle,
            ran = report.ran.len(),
            cpu = report.cpu_used,
            "kernel cycle finished"
        );
        self.cycle += 1;
        report
    }

    fn audit(&mut self, subject: &str, action: &str, payload: Option<String>) {
        if let Some(sink) = self.audit.as_mut() {
            sink.record(build_audit_event(subject, action, self.cycle, payload));
        }
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_owned()
    }
}

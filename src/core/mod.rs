//! Cooperative scheduling: tasks, the scheduler registry, and the per-tick kernel.

pub mod audit;
pub mod behavior;
pub mod bootstrap;
pub mod error;
pub mod executor;
pub mod kernel;
pub mod scheduler;
pub mod task;

pub use audit::{build_audit_event, AuditEvent, AuditSink, InMemoryAuditSink, TracingAuditSink};
pub use behavior::{behavior_key, Behavior, BehaviorHost, PersistentTask};
pub use bootstrap::{reconcile, ReconcileReport, TaskSpec};
pub use error::{AppResult, ProductionRejection, SchedulerError};
pub use executor::TaskExecutor;
pub use kernel::{CycleReport, Kernel};
pub use scheduler::Scheduler;
pub use task::{Task, TaskStatus};

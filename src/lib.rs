//! # Colony Kernel
//!
//! Cooperative priority scheduling and cyclic production timelines for persistent,
//! tick-driven colony simulations.
//!
//! The host calls into the crate once per external tick. Nothing held in memory is
//! assumed to survive between ticks; everything that must persist goes through a
//! [`DurableStore`](infra::DurableStore).
//!
//! ## Scheduling
//!
//! A [`Scheduler`](core::Scheduler) holds one task per controlled unit or location.
//! The [`Kernel`](core::Kernel) runs every active task once per cycle, highest
//! priority first. Tasks report a [`TaskStatus`](core::TaskStatus):
//!
//! - **Success**: the task is removed.
//! - **Failed / Incomplete**: the task's priority is escalated one step.
//! - **Running**: nothing changes.
//!
//! A task body that returns an error or panics is coerced to `Failed`; it never
//! aborts the rest of the cycle.
//!
//! ```rust
//! use colony_kernel::config::KernelConfig;
//! use colony_kernel::core::{Kernel, Scheduler, TaskStatus};
//! use colony_kernel::util::Priority;
//!
//! let mut scheduler: Scheduler<Vec<&'static str>> = Scheduler::new();
//! scheduler.register_fn("miner", Priority::Low, |log: &mut Vec<&'static str>| {
//!     log.push("mine");
//!     Ok(TaskStatus::Running)
//! });
//! scheduler.register_fn("defender", Priority::Critical, |log: &mut Vec<&'static str>| {
//!     log.push("defend");
//!     Ok(TaskStatus::Success)
//! });
//!
//! let mut kernel = Kernel::new(KernelConfig::default());
//! let mut log = Vec::new();
//! kernel.run_cycle(&mut scheduler, &mut log);
//! assert_eq!(log, vec!["defend", "mine"]);
//! assert!(!scheduler.contains("defender"));
//! ```
//!
//! ## Production
//!
//! Behaviors put [`ProductionOrder`](production::ProductionOrder)s into the
//! [`ProductionQueue`](production::ProductionQueue). The production planner task books
//! them into a per-station [`ProductionTimeline`](production::ProductionTimeline), a
//! cyclic interval allocator that times each replacement to finish exactly when its
//! predecessor dies. [`ColonyRuntime`](runtime::ColonyRuntime) ties it all together:
//! refresh stations, run a kernel cycle, advance every timeline once, persist.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Cooperative scheduling: tasks, scheduler, kernel, behaviors and bootstrap.
pub mod core;
/// Configuration models for the kernel, timelines and production queue.
pub mod config;
/// Builders to construct runtime components from configuration.
pub mod builders;
/// Infrastructure adapters for durable storage.
pub mod infra;
/// Production orders, queue and per-station timelines.
pub mod production;
/// Tick driver and API surface.
pub mod runtime;
/// Shared utilities.
pub mod util;
/// Read-only views of the world the core consumes.
pub mod world;

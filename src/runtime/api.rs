//! Serializable views of runtime state for dashboards and logs.

use serde::{Deserialize, Serialize};

use super::driver::ColonyRuntime;
use crate::core::{CycleReport, Scheduler};
use crate::production::TimelineRegistry;
use crate::util::serde::{Priority, StationId, TaskId};
use crate::world::WorldView;

/// One task as seen from outside.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskSnapshot {
    /// Task identifier.
    pub id: TaskId,
    /// Priority at registration.
    pub initial_priority: Priority,
    /// Priority after escalations.
    pub current_priority: Priority,
    /// Mean of the recorded cost samples.
    pub average_cpu: Option<f64>,
    /// Whether the task is paused.
    pub paused: bool,
}

/// One station timeline as seen from outside.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineSnapshot {
    /// Station identifier.
    pub station: StationId,
    /// Owning location.
    pub owner: Option<String>,
    /// Position in the cycle.
    pub tick: u32,
    /// Disruption counter.
    pub paused_ticks: u32,
    /// Booked ticks.
    pub used_space: u32,
    /// Ticks still free.
    pub spare_capacity: u32,
    /// `(order id, scheduled tick)` in tick order.
    pub bookings: Vec<(String, u32)>,
    /// Due orders waiting for the station.
    pub delayed: usize,
    /// Whether the utilization cap is reached.
    pub full: bool,
}

/// A production started this tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dispatch {
    /// Station that started it.
    pub station: StationId,
    /// Order id.
    pub order_id: String,
    /// Name of the unit being produced.
    pub unit: String,
    /// Whether it ran after its booked tick.
    pub late: bool,
}

/// A due order that could not start this tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockedOrder {
    /// Station holding the order.
    pub station: StationId,
    /// Order id.
    pub order_id: String,
    /// Why it could not start.
    pub reason: String,
}

/// Outcome of one external tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    /// External tick number, starting at 0.
    pub tick: u64,
    /// Kernel cycle results.
    pub cycle: CycleReport,
    /// Productions started.
    pub dispatched: Vec<Dispatch>,
    /// Due orders held back.
    pub blocked: Vec<BlockedOrder>,
    /// Stations whose timeline was rebuilt after too much disruption.
    pub rebuilt: Vec<StationId>,
    /// Orders sent back to the production queue.
    pub requeued: usize,
}

/// Health response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    /// Healthy flag: every timeline satisfies its invariants.
    pub ok: bool,
    /// Registered tasks.
    pub tasks: usize,
    /// Station timelines.
    pub timelines: usize,
    /// Orders waiting in the production queue.
    pub queued_orders: usize,
    /// Stations whose timeline failed its consistency check.
    pub inconsistent: Vec<StationId>,
}

/// Snapshot every registered task, highest priority first.
pub fn task_snapshots<C>(scheduler: &Scheduler<C>) -> Vec<TaskSnapshot> {
    let mut tasks: Vec<TaskSnapshot> = scheduler
        .tasks()
        .map(|task| TaskSnapshot {
            id: task.id().to_owned(),
            initial_priority: task.initial_priority(),
            current_priority: task.current_priority(),
            average_cpu: task.average_cpu(),
            paused: scheduler.is_paused(task.id()),
        })
        .collect();
    tasks.sort_by(|a, b| b.current_priority.cmp(&a.current_priority).then_with(|| a.id.cmp(&b.id)));
    tasks
}

/// Snapshot every timeline in station order.
pub fn timeline_snapshots(registry: &TimelineRegistry) -> Vec<TimelineSnapshot> {
    registry
        .iter()
        .map(|(station, timeline)| TimelineSnapshot {
            station: station.clone(),
            owner: registry.owner_of(station).map(str::to_owned),
            tick: timeline.tick(),
            paused_ticks: timeline.paused_ticks(),
            used_space: timeline.used_space(),
            spare_capacity: timeline.spare_capacity(),
            bookings: timeline
                .schedule()
                .iter()
                .filter_map(|o| o.schedule_tick().map(|t| (o.id().to_owned(), t)))
                .collect(),
            delayed: timeline.delayed().len(),
            full: timeline.is_full(),
        })
        .collect()
}

/// Return a health payload.
pub fn health<W: WorldView>(runtime: &ColonyRuntime<W>) -> Health {
    let colony = runtime.colony();
    let inconsistent: Vec<StationId> = colony
        .timelines()
        .iter()
        .filter(|(_, timeline)| !timeline.is_consistent())
        .map(|(station, _)| station.clone())
        .collect();
    Health {
        ok: inconsistent.is_empty(),
        tasks: runtime.scheduler().len(),
        timelines: colony.timelines().len(),
        queued_orders: colony.queue().len(),
        inconsistent,
    }
}

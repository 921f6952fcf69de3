//! Tick driver and API surface.

pub mod api;
pub mod driver;

pub use api::{
    health, task_snapshots, timeline_snapshots, BlockedOrder, Dispatch, Health, TaskSnapshot,
    TickReport, TimelineSnapshot,
};
pub use driver::{Colony, ColonyRuntime, LINEAGE_KEY, QUEUE_KEY};

//! Unit production: orders, the holding queue, and per-station cyclic timelines.
//!
//! Behaviors create [`ProductionOrder`]s and put them in the [`ProductionQueue`].
//! The [`ProductionPlanner`] task books them into each station's
//! [`ProductionTimeline`] so a replacement finishes exactly when its predecessor
//! dies, and the runtime advances every timeline once per tick.

pub mod free_space;
pub mod order;
pub mod planner;
pub mod queue;
pub mod registry;
pub mod station;
pub mod supersession;
pub mod timeline;

pub use free_space::{FreeList, FreeSpace};
pub use order::{body_cost, order_id_of, role_of, BodyPart, ProductionOrder, ScheduleEntry};
pub use planner::{ProductionHost, ProductionParts, ProductionPlanner, WorldBookingContext, PLANNER_TASK_ID};
pub use queue::{DrainReport, OrderState, OwnerQueue, ProductionQueue};
pub use registry::{timeline_key, TimelineRegistry};
pub use station::{blocking_reason, OrderSink, Station, StationPool, TimelineSink};
pub use supersession::SupersessionIndex;
pub use timeline::{
    BookingContext, BookingOptions, BookingOutcome, NoSupersession, ProductionTimeline, TickOutcome,
    TimelineRecord,
};

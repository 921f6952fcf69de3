//! The production planner task.
//!
//! Runs once per kernel cycle and moves whatever the behaviors queued into the
//! owners' timelines. Orders that find no slot stay in the queue for the next run.

use tracing::debug;

use super::order::ProductionOrder;
use super::queue::ProductionQueue;
use super::registry::TimelineRegistry;
use super::station::TimelineSink;
use super::supersession::SupersessionIndex;
use super::timeline::{BookingContext, BookingOptions};
use crate::core::{AppResult, TaskExecutor, TaskStatus};
use crate::world::{RoleProvider, UnitSnapshot, WorldView};

/// Task id the planner is registered under.
pub const PLANNER_TASK_ID: &str = "production-planner";

/// Borrowed production state of a host context.
pub struct ProductionParts<'a> {
    /// Pending orders per owner.
    pub queue: &'a mut ProductionQueue,
    /// Per-station timelines.
    pub timelines: &'a mut TimelineRegistry,
    /// Order → produced units.
    pub lineage: &'a SupersessionIndex,
    /// Current world snapshot.
    pub world: &'a dyn WorldView,
    /// Role knowledge.
    pub roles: &'a dyn RoleProvider,
}

/// Context able to lend its production state to the planner.
pub trait ProductionHost {
    /// Split the context into the pieces a planning pass needs.
    fn production(&mut self) -> ProductionParts<'_>;
}

/// [`BookingContext`] backed by the supersession index and the live world.
pub struct WorldBookingContext<'a> {
    lineage: &'a SupersessionIndex,
    world: &'a dyn WorldView,
    roles: &'a dyn RoleProvider,
}

impl<'a> WorldBookingContext<'a> {
    /// Build a booking context.
    pub fn new(
        lineage: &'a SupersessionIndex,
        world: &'a dyn WorldView,
        roles: &'a dyn RoleProvider,
    ) -> Self {
        Self {
            lineage,
            world,
            roles,
        }
    }
}

impl BookingContext for WorldBookingContext<'_> {
    fn superseded(&self, order: &ProductionOrder) -> Option<UnitSnapshot> {
        self.lineage.superseded(order.id(), self.world)
    }

    fn lead_time(&self, station: &str, order: &ProductionOrder, superseded: &UnitSnapshot) -> f64 {
        self.world
            .station(station)
            .map_or(0.0, |snapshot| self.roles.lead_time(order.role(), &snapshot, superseded))
    }
}

/// Drains every owner's queue into that owner's timelines. Never completes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProductionPlanner {
    options: BookingOptions,
}

impl ProductionPlanner {
    /// Planner with the given booking options.
    #[must_use]
    pub const fn new(options: BookingOptions) -> Self {
        Self { options }
    }
}

impl<C: ProductionHost> TaskExecutor<C> for ProductionPlanner {
    fn execute(&mut self, ctx: &mut C) -> AppResult<TaskStatus> {
        let parts = ctx.production();
        let booking = WorldBookingContext::new(parts.lineage, parts.world, parts.roles);
        for owner in parts.queue.owners() {
            let timelines = parts.timelines.timelines_for_owner_mut(&owner);
            if timelines.is_empty() {
                continue;
            }
            let mut sink = TimelineSink::new(timelines, &booking, self.options);
            let report = parts.queue.drain(&owner, &mut sink);
            if !report.dispatched.is_empty() || !report.failed.is_empty() {
                debug!(
                    owner = %owner,
                    booked = report.dispatched.len(),
                    waiting = report.failed.len() + report.processing.len(),
                    "planning pass"
                );
            }
        }
        Ok(TaskStatus::Running)
    }
}

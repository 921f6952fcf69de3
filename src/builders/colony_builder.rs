//! Builder turning a validated configuration into runtime components.

use tracing::info;

use crate::config::ColonyConfig;
use crate::core::{Kernel, Scheduler, SchedulerError};
use crate::infra::store::DurableStore;
use crate::production::{ProductionQueue, TimelineRegistry};
use crate::runtime::{Colony, ColonyRuntime};
use crate::util::serde::Priority;
use crate::world::{RoleProvider, WorldView};

/// Builds kernels, schedulers, timelines and queues from one [`ColonyConfig`].
#[derive(Debug, Clone)]
pub struct ColonyBuilder {
    config: ColonyConfig,
    planner_priority: Priority,
}

impl ColonyBuilder {
    /// Validate `config` and wrap it.
    pub fn new(config: ColonyConfig) -> Result<Self, SchedulerError> {
        config.validate().map_err(SchedulerError::InvalidConfig)?;
        Ok(Self {
            config,
            planner_priority: Priority::High,
        })
    }

    /// Builder over defaults plus `COLONY_*` environment overrides.
    pub fn from_env() -> Result<Self, SchedulerError> {
        let config = ColonyConfig::from_env().map_err(SchedulerError::InvalidConfig)?;
        Self::new(config)
    }

    /// Priority the production planner task is registered with.
    #[must_use]
    pub const fn with_planner_priority(mut self, priority: Priority) -> Self {
        self.planner_priority = priority;
        self
    }

    /// The validated configuration.
    #[must_use]
    pub const fn config(&self) -> &ColonyConfig {
        &self.config
    }

    /// Kernel with the wall clock.
    #[must_use]
    pub fn build_kernel(&self) -> Kernel {
        Kernel::new(self.config.kernel.clone())
    }

    /// Empty scheduler.
    #[must_use]
    pub fn build_scheduler<C>(&self) -> Scheduler<C> {
        Scheduler::new()
    }

    /// Empty production queue.
    #[must_use]
    pub const fn build_queue(&self) -> ProductionQueue {
        ProductionQueue::new(self.config.production_queue.capacity)
    }

    /// Empty timeline registry.
    #[must_use]
    pub fn build_timelines(&self) -> TimelineRegistry {
        TimelineRegistry::new(self.config.timeline.clone())
    }

    /// Colony context restored from `store`.
    pub fn build_colony<W: WorldView>(
        &self,
        store: Box<dyn DurableStore>,
        world: W,
        roles: Box<dyn RoleProvider>,
    ) -> Result<Colony<W>, SchedulerError> {
        Colony::restore(&self.config, store, world, roles)
    }

    /// Full runtime restored from `store`, with the production planner registered.
    pub fn build_runtime<W: WorldView>(
        &self,
        store: Box<dyn DurableStore>,
        world: W,
        roles: Box<dyn RoleProvider>,
    ) -> Result<ColonyRuntime<W>, SchedulerError> {
        let colony = self.build_colony(store, world, roles)?;
        info!(
            cycle_length = self.config.timeline.cycle_length,
            capacity = self.config.production_queue.capacity,
            "colony runtime built"
        );
        Ok(ColonyRuntime::new(
            self.build_kernel(),
            self.build_scheduler(),
            colony,
            self.planner_priority,
        ))
    }
}

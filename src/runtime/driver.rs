//! Tick driver tying the kernel, the colony context and the stations together.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::{debug, info, warn};

use super::api::{BlockedOrder, Dispatch, TickReport};
use crate::config::ColonyConfig;
use crate::core::{
    build_audit_event, reconcile, AuditSink, BehaviorHost, Kernel, ReconcileReport, Scheduler,
    SchedulerError, TaskExecutor, TaskSpec,
};
use crate::infra::store::{load_typed, save_typed, DurableStore};
use crate::production::{
    ProductionHost, ProductionOrder, ProductionParts, ProductionPlanner, ProductionQueue, Station,
    SupersessionIndex, TickOutcome, TimelineRegistry, PLANNER_TASK_ID,
};
use crate::util::serde::{OwnerId, Priority, StationId};
use crate::world::{RoleProvider, WorldView};

/// Store key of the persisted production queue.
pub const QUEUE_KEY: &str = "production:queue";

/// Store key of the persisted supersession index.
pub const LINEAGE_KEY: &str = "production:lineage";

/// Everything a task body can reach: the explicit registry passed to every task.
pub struct Colony<W> {
    store: Box<dyn DurableStore>,
    world: W,
    roles: Box<dyn RoleProvider>,
    queue: ProductionQueue,
    timelines: TimelineRegistry,
    lineage: SupersessionIndex,
    ticks_per_part: u32,
}

impl<W: WorldView> Colony<W> {
    /// Load production state from `store`, falling back to empty state.
    ///
    /// Without a persisted lineage the index is seeded from the units alive in `world`.
    pub fn restore(
        config: &ColonyConfig,
        store: Box<dyn DurableStore>,
        world: W,
        roles: Box<dyn RoleProvider>,
    ) -> Result<Self, SchedulerError> {
        let mut queue: ProductionQueue = load_typed(store.as_ref(), QUEUE_KEY)?
            .unwrap_or_else(|| ProductionQueue::new(config.production_queue.capacity));
        queue.set_capacity(config.production_queue.capacity);
        let lineage = load_typed(store.as_ref(), LINEAGE_KEY)?.unwrap_or_else(|| {
            let seeded = SupersessionIndex::from_units(world.live_units());
            debug!(units = seeded.len(), "lineage seeded from live units");
            seeded
        });
        let timelines = TimelineRegistry::load(config.timeline.clone(), store.as_ref())?;
        info!(
            timelines = timelines.len(),
            queued = queue.len(),
            "colony state restored"
        );
        Ok(Self {
            store,
            world,
            roles,
            queue,
            timelines,
            lineage,
            ticks_per_part: config.timeline.ticks_per_part,
        })
    }

    /// Current world snapshot.
    pub const fn world(&self) -> &W {
        &self.world
    }

    /// Durable store.
    pub fn store(&self) -> &dyn DurableStore {
        self.store.as_ref()
    }

    /// Mutable durable store.
    pub fn store_mut(&mut self) -> &mut dyn DurableStore {
        self.store.as_mut()
    }

    /// Production queue.
    pub const fn queue(&self) -> &ProductionQueue {
        &self.queue
    }

    /// Mutable production queue.
    pub fn queue_mut(&mut self) -> &mut ProductionQueue {
        &mut self.queue
    }

    /// Station timelines.
    pub const fn timelines(&self) -> &TimelineRegistry {
        &self.timelines
    }

    /// Mutable station timelines.
    pub fn timelines_mut(&mut self) -> &mut TimelineRegistry {
        &mut self.timelines
    }

    /// Order → unit index.
    pub const fn lineage(&self) -> &SupersessionIndex {
        &self.lineage
    }

    /// Build an order for `role` with the body the role provider picks for `budget`.
    pub fn new_order(&self, role: &str, ordinal: u32, budget: u32, memory: Value) -> ProductionOrder {
        ProductionOrder::from_role(
            self.roles.as_ref(),
            role,
            ordinal,
            budget,
            memory,
            self.ticks_per_part,
        )
    }

    /// Queue an order for `owner`.
    pub fn enqueue(&mut self, owner: &str, order: ProductionOrder) {
        self.queue.queue(owner, order);
    }

    /// Write timelines, queue and index to the store and flush it.
    pub fn persist(&mut self) -> Result<(), SchedulerError> {
        self.timelines.save(self.store.as_mut())?;
        save_typed(self.store.as_mut(), QUEUE_KEY, &self.queue)?;
        save_typed(self.store.as_mut(), LINEAGE_KEY, &self.lineage)?;
        self.store.flush()
    }
}

impl<W: WorldView> BehaviorHost for Colony<W> {
    type World = W;

    fn behavior_parts(&mut self) -> (&W, &mut dyn DurableStore) {
        (&self.world, self.store.as_mut())
    }
}

impl<W: WorldView> ProductionHost for Colony<W> {
    fn production(&mut self) -> ProductionParts<'_> {
        ProductionParts {
            queue: &mut self.queue,
            timelines: &mut self.timelines,
            lineage: &self.lineage,
            world: &self.world,
            roles: self.roles.as_ref(),
        }
    }
}

/// Kernel, scheduler and colony context driven one external tick at a time.
pub struct ColonyRuntime<W> {
    kernel: Kernel,
    scheduler: Scheduler<Colony<W>>,
    colony: Colony<W>,
    planner_priority: Priority,
    audit: Option<Box<dyn AuditSink>>,
    ticks: u64,
}

impl<W: WorldView> ColonyRuntime<W> {
    /// Assemble a runtime and register the production planner.
    pub fn new(
        kernel: Kernel,
        scheduler: Scheduler<Colony<W>>,
        colony: Colony<W>,
        planner_priority: Priority,
    ) -> Self {
        let mut runtime = Self {
            kernel,
            scheduler,
            colony,
            planner_priority,
            audit: None,
            ticks: 0,
        };
        runtime.install_planner();
        runtime
    }

    /// Record timeline rebuilds into `audit`.
    #[must_use]
    pub fn with_audit(mut self, audit: Box<dyn AuditSink>) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Ticks driven so far.
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }

    /// The kernel.
    pub const fn kernel(&self) -> &Kernel {
        &self.kernel
    }

    /// The scheduler.
    pub const fn scheduler(&self) -> &Scheduler<Colony<W>> {
        &self.scheduler
    }

    /// Mutable scheduler, for registering and pausing tasks between ticks.
    pub fn scheduler_mut(&mut self) -> &mut Scheduler<Colony<W>> {
        &mut self.scheduler
    }

    /// The colony context.
    pub const fn colony(&self) -> &Colony<W> {
        &self.colony
    }

    /// Mutable colony context.
    pub fn colony_mut(&mut self) -> &mut Colony<W> {
        &mut self.colony
    }

    /// Install this tick's world snapshot and forget units that died.
    pub fn observe(&mut self, world: W) {
        let live = world.live_units();
        self.colony.world = world;
        let forgotten = self.colony.lineage.retain_live(&live);
        if forgotten > 0 {
            debug!(forgotten, "dead units dropped from lineage");
        }
    }

    /// Reconcile tasks in `scope` with `live` entities and make sure the planner runs.
    pub fn bootstrap<E, F>(
        &mut self,
        scope: &str,
        live: &[TaskSpec],
        make: F,
    ) -> Result<ReconcileReport, SchedulerError>
    where
        E: TaskExecutor<Colony<W>> + 'static,
        F: FnMut(&TaskSpec) -> E,
    {
        let report = reconcile(
            &mut self.scheduler,
            self.colony.store.as_mut(),
            scope,
            live,
            make,
        )?;
        self.install_planner();
        Ok(report)
    }

    fn install_planner(&mut self) {
        self.scheduler.register(
            PLANNER_TASK_ID,
            self.planner_priority,
            ProductionPlanner::default(),
        );
    }

    /// Drive one external tick.
    ///
    /// Order of work: refresh each owner's station set (requeueing orders from
    /// rebuilt timelines), run one kernel cycle, advance every station's timeline
    /// exactly once, then persist.
    pub fn tick<S: Station>(&mut self, stations: &mut [S]) -> Result<TickReport, SchedulerError> {
        let mut report = TickReport {
            tick: self.ticks,
            ..TickReport::default()
        };

        let mut by_owner: BTreeMap<OwnerId, Vec<StationId>> = BTreeMap::new();
        for station in stations.iter() {
            by_owner
                .entry(station.owner().to_owned())
                .or_default()
                .push(station.id().to_owned());
        }
        for owner in self.colony.timelines.owners() {
            by_owner.entry(owner).or_default();
        }
        for (owner, ids) in &by_owner {
            let drained = self.colony.timelines.observe(owner, ids);
            report.requeued += drained.len();
            for order in drained {
                self.colony.queue.queue(owner, order);
            }
        }

        report.cycle = self.kernel.run_cycle(&mut self.scheduler, &mut self.colony);

        for station in stations.iter_mut() {
            let owner = station.owner().to_owned();
            let station_id = station.id().to_owned();
            let paused = self.colony.world.owner_paused(&owner);
            let timeline = self.colony.timelines.get_or_create(&owner, &station_id);
            match timeline.advance(station, paused) {
                TickOutcome::Idle => {}
                TickOutcome::Dispatched {
                    order_id,
                    unit,
                    late,
                } => {
                    if late {
                        info!(station = %station_id, order = %order_id, "late production started");
                    }
                    self.colony.lineage.record(&order_id, &unit);
                    report.dispatched.push(Dispatch {
                        station: station_id,
                        order_id,
                        unit,
                        late,
                    });
                }
                TickOutcome::Blocked { order_id, reason } => {
                    report.blocked.push(BlockedOrder {
                        station: station_id,
                        order_id,
                        reason: reason.to_string(),
                    });
                }
                TickOutcome::Rebuilt { orders } => {
                    warn!(station = %station_id, orders = orders.len(), "timeline rebuilt; requeueing");
                    if let Some(audit) = self.audit.as_mut() {
                        audit.record(build_audit_event(
                            station_id.as_str(),
                            "rebuild",
                            self.ticks,
                            Some(orders.len().to_string()),
                        ));
                    }
                    report.requeued += orders.len();
                    for order in orders {
                        self.colony.queue.queue(&owner, order);
                    }
                    report.rebuilt.push(station_id);
                }
            }
        }

        self.colony.persist()?;
        self.ticks += 1;
        Ok(report)
    }
}

//! Per-station cyclic production calendar.
//!
//! A timeline books production orders onto ticks of a fixed-length cycle so the
//! replacement for a unit is ready exactly when its predecessor runs out of life.
//! Bookings recur: an order fires every cycle on its booked tick until removed.
//! A booking occupies `duration + 1` ticks, keeping one tick of slack between
//! consecutive productions.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::free_space::{FreeList, FreeSpace};
use super::order::{ProductionOrder, ScheduleEntry};
use super::station::{blocking_reason, Station};
use crate::config::TimelineConfig;
use crate::core::{ProductionRejection, SchedulerError};
use crate::util::clock::ceil_ticks;
use crate::util::serde::StationId;
use crate::world::UnitSnapshot;

/// Supplies what a booking needs to know about the unit an order replaces.
pub trait BookingContext {
    /// The live unit this order supersedes, if any.
    fn superseded(&self, order: &ProductionOrder) -> Option<UnitSnapshot>;
    /// Extra ticks the replacement needs after production before it is usable.
    fn lead_time(&self, station: &str, order: &ProductionOrder, superseded: &UnitSnapshot) -> f64;
}

/// Context for orders that replace nothing (fresh roles, tests).
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSupersession;

impl BookingContext for NoSupersession {
    fn superseded(&self, _order: &ProductionOrder) -> Option<UnitSnapshot> {
        None
    }

    fn lead_time(&self, _station: &str, _order: &ProductionOrder, _superseded: &UnitSnapshot) -> f64 {
        0.0
    }
}

/// Knobs for a booking pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingOptions {
    /// Book even when the utilization cap is reached.
    pub ignore_limiter: bool,
    /// Fall back to the earliest free slot when no lead-time-correct slot exists.
    pub allow_fallback: bool,
}

impl Default for BookingOptions {
    fn default() -> Self {
        Self {
            ignore_limiter: false,
            allow_fallback: true,
        }
    }
}

/// Result of an `add` pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookingOutcome {
    /// `(order id, booked tick)` for each order that was booked.
    pub booked: Vec<(String, u32)>,
    /// Orders that could not be booked this pass and must be requeued.
    pub deferred: Vec<ProductionOrder>,
}

/// What happened on one tick of a timeline.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// Nothing was due.
    Idle,
    /// A due order started production.
    Dispatched {
        /// Order id.
        order_id: String,
        /// Name of the produced unit.
        unit: String,
        /// Whether it ran after its booked tick.
        late: bool,
    },
    /// A due order could not start; it stays pending.
    Blocked {
        /// Order id.
        order_id: String,
        /// Why it could not start.
        reason: ProductionRejection,
    },
    /// Accumulated disruption exceeded spare capacity; the timeline was cleared.
    Rebuilt {
        /// Orders that were booked and now need rebooking.
        orders: Vec<ProductionOrder>,
    },
}

/// Persisted timeline state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineRecord {
    /// Position in the cycle.
    pub tick: u32,
    /// Disruption counter.
    pub paused_ticks: u32,
    /// Free intervals as `[start, length]` pairs.
    pub free_spaces: Vec<FreeSpace>,
    /// Occupied ticks.
    pub used_space: u32,
    /// Booked orders.
    pub schedule: Vec<ScheduleEntry>,
    /// Ids of due orders still waiting to run.
    #[serde(default, skip_serializing_if = "VecDeque::is_empty")]
    pub delayed: VecDeque<String>,
}

/// Cyclic calendar for one station.
#[derive(Debug, Clone)]
pub struct ProductionTimeline {
    station_id: StationId,
    cycle_length: u32,
    limiter: f64,
    tick: u32,
    paused_ticks: u32,
    free: FreeList,
    used_space: u32,
    schedule: Vec<ProductionOrder>,
    delayed: VecDeque<String>,
}

impl ProductionTimeline {
    /// Empty timeline for `station_id`.
    #[must_use]
    pub fn new(station_id: impl Into<StationId>, config: &TimelineConfig) -> Self {
        Self {
            station_id: station_id.into(),
            cycle_length: config.cycle_length,
            limiter: config.limiter,
            tick: 0,
            paused_ticks: 0,
            free: FreeList::full(config.cycle_length),
            used_space: 0,
            schedule: Vec::new(),
            delayed: VecDeque::new(),
        }
    }

    /// Owning station.
    #[must_use]
    pub fn station_id(&self) -> &str {
        &self.station_id
    }

    /// Cycle length in ticks.
    #[must_use]
    pub const fn cycle_length(&self) -> u32 {
        self.cycle_length
    }

    /// Current position in the cycle.
    #[must_use]
    pub const fn tick(&self) -> u32 {
        self.tick
    }

    /// Ticks a due order has been held back.
    #[must_use]
    pub const fn paused_ticks(&self) -> u32 {
        self.paused_ticks
    }

    /// Free intervals.
    #[must_use]
    pub fn free_spaces(&self) -> &[FreeSpace] {
        self.free.as_slice()
    }

    /// Occupied ticks.
    #[must_use]
    pub const fn used_space(&self) -> u32 {
        self.used_space
    }

    /// Ticks not yet booked.
    #[must_use]
    pub const fn spare_capacity(&self) -> u32 {
        self.cycle_length - self.used_space
    }

    /// Booked orders sorted by tick.
    #[must_use]
    pub fn schedule(&self) -> &[ProductionOrder] {
        &self.schedule
    }

    /// Ids of due orders waiting for the station.
    #[must_use]
    pub const fn delayed(&self) -> &VecDeque<String> {
        &self.delayed
    }

    /// Whether an order with this id is booked.
    #[must_use]
    pub fn is_booked(&self, order_id: &str) -> bool {
        self.schedule.iter().any(|o| o.id() == order_id)
    }

    /// Whether the utilization cap is reached.
    #[must_use]
    pub fn is_full(&self) -> bool {
        f64::from(self.used_space) >= self.limiter * f64::from(self.cycle_length)
    }

    /// Book every order, returning what was booked and what must be requeued.
    pub fn add(
        &mut self,
        orders: impl IntoIterator<Item = ProductionOrder>,
        ctx: &dyn BookingContext,
        options: BookingOptions,
    ) -> BookingOutcome {
        let mut outcome = BookingOutcome::default();
        for order in orders {
            let id = order.id().to_owned();
            match self.book(order, ctx, options) {
                Ok(tick) => outcome.booked.push((id, tick)),
                Err(order) => outcome.deferred.push(order),
            }
        }
        outcome
    }

    /// Book one order. On failure the order is handed back for requeueing.
    pub fn book(
        &mut self,
        mut order: ProductionOrder,
        ctx: &dyn BookingContext,
        options: BookingOptions,
    ) -> Result<u32, ProductionOrder> {
        if self.is_booked(order.id()) {
            debug!(station = %self.station_id, order = order.id(), "already booked; deferring");
            return Err(order);
        }
        if !options.ignore_limiter && self.is_full() {
            debug!(station = %self.station_id, order = order.id(), "timeline full; deferring");
            return Err(order);
        }

        let need = order.footprint();
        let superseded = ctx.superseded(&order);
        let planned = match &superseded {
            Some(unit) => self.plan_replacement(&order, unit, ctx),
            None => None,
        };
        let slot = planned.or_else(|| {
            if options.allow_fallback {
                self.earliest_slot(need)
            } else {
                None
            }
        });

        let Some((index, target)) = slot else {
            debug!(station = %self.station_id, order = order.id(), "no slot; deferring");
            return Err(order);
        };
        if !self.free.carve(index, target, need) {
            return Err(order);
        }

        debug!(station = %self.station_id, order = order.id(), tick = target, "order booked");
        order.set_schedule_tick(Some(target));
        let at = self
            .schedule
            .partition_point(|o| o.schedule_tick().unwrap_or(0) <= target);
        self.schedule.insert(at, order);
        self.used_space += need;
        Ok(target)
    }

    /// Rules for an order that replaces `unit`.
    fn plan_replacement(
        &self,
        order: &ProductionOrder,
        unit: &UnitSnapshot,
        ctx: &dyn BookingContext,
    ) -> Option<(usize, u32)> {
        let need = order.footprint();
        let Some(remaining) = unit.remaining_life else {
            // Predecessor still in production: push the booking as late as possible.
            return self.latest_slot(need);
        };

        let lead = order
            .duration()
            .saturating_add(ceil_ticks(ctx.lead_time(&self.station_id, order, unit)));
        if remaining <= lead {
            return None;
        }
        let target = self.wrap(u64::from(self.tick) + u64::from(remaining - lead));
        self.exact_slot(target, need)
            .or_else(|| self.slot_before(target, need))
    }

    /// First interval that holds the booking starting exactly at `target`.
    fn exact_slot(&self, target: u32, need: u32) -> Option<(usize, u32)> {
        self.free
            .position(|s| s.contains_range(target, need))
            .map(|i| (i, target))
    }

    /// Last interval whose latest start is strictly before `target`.
    fn slot_before(&self, target: u32, need: u32) -> Option<(usize, u32)> {
        self.free
            .rposition(|s| s.start <= target && s.length >= need && s.end() - need < target)
            .and_then(|i| self.free.get(i).map(|s| (i, s.end() - need)))
    }

    /// Latest start in the last interval long enough.
    fn latest_slot(&self, need: u32) -> Option<(usize, u32)> {
        self.free
            .rposition(|s| s.length >= need)
            .and_then(|i| self.free.get(i).map(|s| (i, s.end() - need)))
    }

    /// Start of the first interval long enough.
    fn earliest_slot(&self, need: u32) -> Option<(usize, u32)> {
        self.free
            .position(|s| s.length >= need)
            .and_then(|i| self.free.get(i).map(|s| (i, s.start)))
    }

    #[allow(clippy::cast_possible_truncation)]
    fn wrap(&self, tick: u64) -> u32 {
        if self.cycle_length == 0 {
            return 0;
        }
        (tick % u64::from(self.cycle_length)) as u32
    }

    /// Unbook orders by id, returning them. Their space is given back.
    pub fn remove<I, S>(&mut self, ids: I) -> Vec<ProductionOrder>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut removed = Vec::new();
        for id in ids {
            let id = id.as_ref();
            let Some(pos) = self.schedule.iter().position(|o| o.id() == id) else {
                continue;
            };
            let mut order = self.schedule.remove(pos);
            if let Some(tick) = order.schedule_tick() {
                self.free.release(tick, order.footprint());
                self.used_space -= order.footprint();
            }
            self.delayed.retain(|d| d != id);
            order.set_schedule_tick(None);
            removed.push(order);
        }
        if self.delayed.is_empty() {
            self.paused_ticks = 0;
        }
        removed
    }

    /// Clear every booking, returning the orders for rebooking.
    pub fn reset(&mut self) -> Vec<ProductionOrder> {
        let mut orders = std::mem::take(&mut self.schedule);
        for order in &mut orders {
            order.set_schedule_tick(None);
        }
        self.free = FreeList::full(self.cycle_length);
        self.used_space = 0;
        self.paused_ticks = 0;
        self.delayed.clear();
        orders
    }

    /// Advance one tick, starting whatever is due if the station allows it.
    ///
    /// A due order that cannot start is kept pending and counted in `paused_ticks`.
    /// When the blockage clears, a disruption longer than the spare capacity rebuilds
    /// the whole timeline; a shorter one just lets the pending order run late.
    pub fn advance(&mut self, station: &mut dyn Station, owner_paused: bool) -> TickOutcome {
        let tick = self.tick;
        if let Some(due) = self.schedule.iter().find(|o| o.schedule_tick() == Some(tick)) {
            if !self.delayed.iter().any(|d| d == due.id()) {
                self.delayed.push_back(due.id().to_owned());
            }
        }
        let outcome = self.run_pending(station, owner_paused, tick);
        self.tick = self.wrap(u64::from(tick) + 1);
        outcome
    }

    fn run_pending(&mut self, station: &mut dyn Station, owner_paused: bool, tick: u32) -> TickOutcome {
        let order = loop {
            let Some(id) = self.delayed.front() else {
                return TickOutcome::Idle;
            };
            match self.schedule.iter().find(|o| o.id() == id) {
                Some(order) => break order.clone(),
                None => {
                    self.delayed.pop_front();
                }
            }
        };

        if let Some(reason) = blocking_reason(&*station, &order, owner_paused) {
            self.paused_ticks += 1;
            debug!(station = %self.station_id, order = order.id(), %reason, paused = self.paused_ticks, "production blocked");
            return TickOutcome::Blocked {
                order_id: order.id().to_owned(),
                reason,
            };
        }

        if self.paused_ticks > self.spare_capacity() {
            warn!(
                station = %self.station_id,
                paused = self.paused_ticks,
                spare = self.spare_capacity(),
                "disruption exceeded spare capacity; rebuilding timeline"
            );
            return TickOutcome::Rebuilt {
                orders: self.reset(),
            };
        }

        match station.produce(&order) {
            Ok(unit) => {
                self.delayed.pop_front();
                let late = order.schedule_tick() != Some(tick);
                if self.delayed.is_empty() {
                    self.paused_ticks = 0;
                }
                debug!(station = %self.station_id, order = order.id(), unit = %unit, late, "production started");
                TickOutcome::Dispatched {
                    order_id: order.id().to_owned(),
                    unit,
                    late,
                }
            }
            Err(reason) => {
                self.paused_ticks += 1;
                TickOutcome::Blocked {
                    order_id: order.id().to_owned(),
                    reason,
                }
            }
        }
    }

    /// Persisted form.
    #[must_use]
    pub fn to_record(&self) -> TimelineRecord {
        TimelineRecord {
            tick: self.tick,
            paused_ticks: self.paused_ticks,
            free_spaces: self.free.as_slice().to_vec(),
            used_space: self.used_space,
            schedule: self
                .schedule
                .iter()
                .filter_map(ScheduleEntry::from_order)
                .collect(),
            delayed: self.delayed.clone(),
        }
    }

    /// Restore from a persisted record, rejecting records that break the invariants.
    ///
    /// The free intervals and the booked footprints must tile the cycle exactly:
    /// no two of them overlap and `usedSpace` is the sum of the footprints.
    pub fn from_record(
        station_id: impl Into<StationId>,
        config: &TimelineConfig,
        record: TimelineRecord,
    ) -> Result<Self, SchedulerError> {
        let station_id = station_id.into();
        let mut schedule: Vec<ProductionOrder> = record
            .schedule
            .into_iter()
            .map(ProductionOrder::from_entry)
            .collect();
        schedule.sort_by_key(|o| o.schedule_tick().unwrap_or(0));
        let free = FreeList::from_spaces(record.free_spaces);

        if record.tick >= config.cycle_length.max(1)
            || !tiles_cycle(&free, &schedule, record.used_space, config.cycle_length)
        {
            return Err(SchedulerError::Backend(format!(
                "timeline record for {station_id} does not match a {} tick cycle",
                config.cycle_length
            )));
        }
        Ok(Self {
            station_id,
            cycle_length: config.cycle_length,
            limiter: config.limiter,
            tick: record.tick,
            paused_ticks: record.paused_ticks,
            free,
            used_space: record.used_space,
            schedule,
            delayed: record.delayed,
        })
    }

    /// Check the space and overlap invariants. Used by tests and on load.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        let conserved = self.free.total() + self.used_space == self.cycle_length;
        let no_overlap = self.schedule.windows(2).all(|w| {
            match (w[0].schedule_tick(), w[1].schedule_tick()) {
                (Some(a), Some(b)) => a + w[0].duration() < b,
                _ => false,
            }
        });
        conserved && self.free.is_well_formed() && no_overlap
    }
}

/// Whether `free` and the footprints booked in `schedule` cover `[0, cycle_length)`
/// exactly once, with `used_space` equal to the booked total.
fn tiles_cycle(
    free: &FreeList,
    schedule: &[ProductionOrder],
    used_space: u32,
    cycle_length: u32,
) -> bool {
    let mut ranges: Vec<(u64, u64)> = free
        .as_slice()
        .iter()
        .map(|s| (u64::from(s.start), u64::from(s.length)))
        .collect();
    let mut booked = 0_u64;
    for order in schedule {
        let Some(at) = order.schedule_tick() else {
            return false;
        };
        let footprint = u64::from(order.duration()) + 1;
        booked += footprint;
        ranges.push((u64::from(at), footprint));
    }
    if booked != u64::from(used_space) {
        return false;
    }
    ranges.sort_unstable();
    let mut cursor = 0_u64;
    for (start, length) in ranges {
        if start != cursor {
            return false;
        }
        cursor = start + length;
    }
    cursor == u64::from(cycle_length)
}

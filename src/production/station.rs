//! Stations and the sinks a production queue drains into.

use tracing::debug;

use super::order::ProductionOrder;
use super::timeline::{BookingContext, BookingOptions, ProductionTimeline};
use crate::core::ProductionRejection;

/// A resource able to produce one unit at a time.
pub trait Station {
    /// Station identifier.
    fn id(&self) -> &str;
    /// Owner the station belongs to.
    fn owner(&self) -> &str;
    /// Whether a unit is currently being produced.
    fn is_producing(&self) -> bool;
    /// Resource budget available right now.
    fn available_budget(&self) -> u32;
    /// Start producing `order`, returning the produced unit's name.
    fn produce(&mut self, order: &ProductionOrder) -> Result<String, ProductionRejection>;
}

/// Why `station` cannot start `order` this tick, if anything.
pub fn blocking_reason(
    station: &dyn Station,
    order: &ProductionOrder,
    owner_paused: bool,
) -> Option<ProductionRejection> {
    if owner_paused {
        return Some(ProductionRejection::OwnerPaused);
    }
    if station.is_producing() {
        return Some(ProductionRejection::StationBusy);
    }
    let available = station.available_budget();
    if available < order.cost() {
        return Some(ProductionRejection::InsufficientBudget {
            needed: order.cost(),
            available,
        });
    }
    None
}

/// Destination for orders drained out of a [`ProductionQueue`](super::ProductionQueue).
pub trait OrderSink {
    /// Try to take `order`. On success the queue forgets it.
    fn accept(&mut self, order: &ProductionOrder) -> Result<(), ProductionRejection>;
}

/// Immediate production on whichever station can take the order.
pub struct StationPool<'a, S> {
    stations: &'a mut [S],
}

impl<'a, S: Station> StationPool<'a, S> {
    /// Wrap a set of stations.
    pub fn new(stations: &'a mut [S]) -> Self {
        Self { stations }
    }
}

impl<S: Station> OrderSink for StationPool<'_, S> {
    fn accept(&mut self, order: &ProductionOrder) -> Result<(), ProductionRejection> {
        let mut last = ProductionRejection::Rejected("no station".into());
        for station in self.stations.iter_mut() {
            if let Some(reason) = blocking_reason(&*station, order, false) {
                // A budget shortfall anywhere wins so the order is parked as processing.
                if !last.is_budget_shortfall() {
                    last = reason;
                }
                continue;
            }
            match station.produce(order) {
                Ok(unit) => {
                    debug!(order = order.id(), station = station.id(), unit = %unit, "order produced");
                    return Ok(());
                }
                Err(reason) => {
                    if !last.is_budget_shortfall() {
                        last = reason;
                    }
                }
            }
        }
        Err(last)
    }
}

/// Books orders into an owner's timelines instead of producing immediately.
pub struct TimelineSink<'a> {
    timelines: Vec<&'a mut ProductionTimeline>,
    ctx: &'a dyn BookingContext,
    options: BookingOptions,
}

impl<'a> TimelineSink<'a> {
    /// Sink over the given timelines.
    pub fn new(
        timelines: Vec<&'a mut ProductionTimeline>,
        ctx: &'a dyn BookingContext,
        options: BookingOptions,
    ) -> Self {
        Self {
            timelines,
            ctx,
            options,
        }
    }
}

impl OrderSink for TimelineSink<'_> {
    fn accept(&mut self, order: &ProductionOrder) -> Result<(), ProductionRejection> {
        for timeline in &mut self.timelines {
            if timeline.is_full() && !self.options.ignore_limiter {
                continue;
            }
            if timeline.book(order.clone(), self.ctx, self.options).is_ok() {
                return Ok(());
            }
        }
        Err(ProductionRejection::NoSlot)
    }
}

//! Holding area for production orders that have no station capacity yet.
//!
//! Each owner has three lists: `queued` (new work), `processing` (blocked on budget)
//! and `failed` (rejected for another reason). An order lives in exactly one of them.
//! Queueing is never blocked by the budget; the budget only tells planners whether
//! it is worth creating more orders.

use std::collections::{BTreeMap, VecDeque};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::order::ProductionOrder;
use super::station::OrderSink;
use crate::util::serde::OwnerId;

/// Which holding list an order is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderState {
    /// Waiting for its first dispatch attempt.
    Queued,
    /// Last attempt hit a budget shortfall.
    Processing,
    /// Last attempt was rejected for another reason.
    Failed,
}

/// Per-owner holding lists.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OwnerQueue {
    queued: VecDeque<ProductionOrder>,
    processing: Vec<ProductionOrder>,
    failed: Vec<ProductionOrder>,
}

impl OwnerQueue {
    /// Orders waiting for a first attempt.
    #[must_use]
    pub const fn queued(&self) -> &VecDeque<ProductionOrder> {
        &self.queued
    }

    /// Orders parked on a budget shortfall.
    #[must_use]
    pub fn processing(&self) -> &[ProductionOrder] {
        &self.processing
    }

    /// Orders parked on another rejection.
    #[must_use]
    pub fn failed(&self) -> &[ProductionOrder] {
        &self.failed
    }

    /// Summed cost of every held order.
    #[must_use]
    pub fn committed_cost(&self) -> u64 {
        self.iter().map(|o| u64::from(o.cost())).sum()
    }

    /// Number of held orders.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queued.len() + self.processing.len() + self.failed.len()
    }

    /// Whether nothing is held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn iter(&self) -> impl Iterator<Item = &ProductionOrder> {
        self.queued
            .iter()
            .chain(self.processing.iter())
            .chain(self.failed.iter())
    }

    fn state_of(&self, id: &str) -> Option<OrderState> {
        if self.queued.iter().any(|o| o.id() == id) {
            Some(OrderState::Queued)
        } else if self.processing.iter().any(|o| o.id() == id) {
            Some(OrderState::Processing)
        } else if self.failed.iter().any(|o| o.id() == id) {
            Some(OrderState::Failed)
        } else {
            None
        }
    }

    fn remove(&mut self, id: &str) -> Option<ProductionOrder> {
        if let Some(pos) = self.queued.iter().position(|o| o.id() == id) {
            return self.queued.remove(pos);
        }
        if let Some(pos) = self.processing.iter().position(|o| o.id() == id) {
            return Some(self.processing.remove(pos));
        }
        if let Some(pos) = self.failed.iter().position(|o| o.id() == id) {
            return Some(self.failed.remove(pos));
        }
        None
    }
}

/// Result of draining one owner's queue.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrainReport {
    /// Orders the sink accepted.
    pub dispatched: Vec<String>,
    /// Orders parked on a budget shortfall.
    pub processing: Vec<String>,
    /// Orders parked on another rejection.
    pub failed: Vec<String>,
}

/// Production queue for every owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductionQueue {
    capacity: u32,
    owners: BTreeMap<OwnerId, OwnerQueue>,
}

impl ProductionQueue {
    /// Queue with a per-owner production budget of `capacity`.
    #[must_use]
    pub const fn new(capacity: u32) -> Self {
        Self {
            capacity,
            owners: BTreeMap::new(),
        }
    }

    /// Change the per-owner budget, e.g. after restoring a queue under new settings.
    pub fn set_capacity(&mut self, capacity: u32) {
        self.capacity = capacity;
    }

    /// Per-owner production budget.
    #[must_use]
    pub const fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Append an order to `owner`'s queue, first removing it from any list it was in.
    pub fn queue(&mut self, owner: &str, order: ProductionOrder) {
        let lists = self.owners.entry(owner.to_owned()).or_default();
        lists.remove(order.id());
        debug!(owner, order = order.id(), cost = order.cost(), "order queued");
        lists.queued.push_back(order);
    }

    /// Remaining budget: capacity minus the cost of every held order. May be negative.
    #[must_use]
    pub fn budget(&self, owner: &str) -> i64 {
        let committed = self.owners.get(owner).map_or(0, OwnerQueue::committed_cost);
        i64::from(self.capacity) - i64::try_from(committed).unwrap_or(i64::MAX)
    }

    /// Whether planners should create more orders for `owner`.
    #[must_use]
    pub fn can_take_orders(&self, owner: &str) -> bool {
        self.budget(owner) > 0
    }

    /// Which list holds `order_id`, if any.
    #[must_use]
    pub fn state(&self, owner: &str, order_id: &str) -> Option<OrderState> {
        self.owners.get(owner).and_then(|q| q.state_of(order_id))
    }

    /// Drop an order from whichever list holds it.
    pub fn remove(&mut self, owner: &str, order_id: &str) -> Option<ProductionOrder> {
        self.owners.get_mut(owner).and_then(|q| q.remove(order_id))
    }

    /// Holding lists for one owner.
    #[must_use]
    pub fn owner(&self, owner: &str) -> Option<&OwnerQueue> {
        self.owners.get(owner)
    }

    /// Owners with at least one held order.
    #[must_use]
    pub fn owners(&self) -> Vec<OwnerId> {
        self.owners
            .iter()
            .filter(|(_, q)| !q.is_empty())
            .map(|(k, _)| k.clone())
            .collect()
    }

    /// Total held orders across owners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.owners.values().map(OwnerQueue::len).sum()
    }

    /// Whether nothing is held for any owner.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Attempt every held order for `owner` against `sink`.
    ///
    /// Processing and failed orders are retried first, ahead of newly queued ones.
    /// An order stays in the queue until the sink has answered for it, so a sink
    /// that panics partway through loses nothing.
    pub fn drain(&mut self, owner: &str, sink: &mut dyn OrderSink) -> DrainReport {
        let mut report = DrainReport::default();
        let Some(lists) = self.owners.get_mut(owner) else {
            return report;
        };

        let parked: Vec<ProductionOrder> = lists
            .processing
            .drain(..)
            .chain(lists.failed.drain(..))
            .collect();
        for order in parked.into_iter().rev() {
            lists.queued.push_front(order);
        }

        for _ in 0..lists.queued.len() {
            let Some(next) = lists.queued.front() else {
                break;
            };
            let outcome = sink.accept(next);
            let Some(order) = lists.queued.pop_front() else {
                break;
            };
            match outcome {
                Ok(()) => report.dispatched.push(order.id().to_owned()),
                Err(reason) if reason.is_budget_shortfall() => {
                    report.processing.push(order.id().to_owned());
                    lists.processing.push(order);
                }
                Err(reason) => {
                    debug!(owner, order = order.id(), %reason, "order rejected");
                    report.failed.push(order.id().to_owned());
                    lists.failed.push(order);
                }
            }
        }
        report
    }
}

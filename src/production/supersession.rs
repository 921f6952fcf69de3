//! Index from order id to the units it produced.
//!
//! Maintained incrementally when production starts and when units die, so booking
//! never scans every extant unit to find the one an order replaces.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::order::order_id_of;
use crate::world::{UnitSnapshot, WorldView};

/// Order id → produced unit ids, most recent last.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupersessionIndex {
    by_order: HashMap<String, Vec<String>>,
    by_unit: HashMap<String, String>,
}

impl SupersessionIndex {
    /// Create an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the index from unit names (`<order id>:<serial>`), e.g. after a cold restart.
    #[must_use]
    pub fn from_units<I, S>(units: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut index = Self::new();
        let mut named: Vec<(String, String)> = units
            .into_iter()
            .filter_map(|u| {
                let unit = u.as_ref();
                order_id_of(unit).map(|order| (order.to_owned(), unit.to_owned()))
            })
            .collect();
        // Serial order approximates production order.
        named.sort_by(|a, b| serial_of(&a.1).cmp(&serial_of(&b.1)).then(a.1.cmp(&b.1)));
        for (order, unit) in named {
            index.record(&order, &unit);
        }
        index
    }

    /// A unit was produced for `order_id`.
    pub fn record(&mut self, order_id: &str, unit_id: &str) {
        if let Some(previous) = self.by_unit.insert(unit_id.to_owned(), order_id.to_owned()) {
            if let Some(units) = self.by_order.get_mut(&previous) {
                units.retain(|u| u != unit_id);
            }
        }
        self.by_order
            .entry(order_id.to_owned())
            .or_default()
            .push(unit_id.to_owned());
    }

    /// A unit died.
    pub fn forget_unit(&mut self, unit_id: &str) {
        let Some(order) = self.by_unit.remove(unit_id) else {
            return;
        };
        if let Some(units) = self.by_order.get_mut(&order) {
            units.retain(|u| u != unit_id);
            if units.is_empty() {
                self.by_order.remove(&order);
            }
        }
    }

    /// Drop every unit not in `live`. Returns how many were forgotten.
    pub fn retain_live(&mut self, live: &[String]) -> usize {
        let dead: Vec<String> = self
            .by_unit
            .keys()
            .filter(|u| !live.contains(u))
            .cloned()
            .collect();
        for unit in &dead {
            self.forget_unit(unit);
        }
        dead.len()
    }

    /// Units produced for `order_id`, oldest first.
    #[must_use]
    pub fn units_for(&self, order_id: &str) -> &[String] {
        self.by_order.get(order_id).map(Vec::as_slice).unwrap_or_default()
    }

    /// Order a unit was produced for.
    #[must_use]
    pub fn order_for(&self, unit_id: &str) -> Option<&str> {
        self.by_unit.get(unit_id).map(String::as_str)
    }

    /// Number of tracked units.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_unit.len()
    }

    /// Whether no units are tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_unit.is_empty()
    }

    /// The live unit an order supersedes: a unit still mid-production wins over the
    /// most recent alive one. Units the world no longer knows are skipped.
    pub fn superseded(&self, order_id: &str, world: &dyn WorldView) -> Option<UnitSnapshot> {
        let mut alive = None;
        for unit_id in self.units_for(order_id).iter().rev() {
            let Some(unit) = world.unit(unit_id) else {
                continue;
            };
            if unit.is_producing() {
                return Some(unit);
            }
            if alive.is_none() {
                alive = Some(unit);
            }
        }
        alive
    }
}

fn serial_of(unit: &str) -> u64 {
    unit.rsplit_once(':')
        .and_then(|(_, serial)| serial.parse().ok())
        .unwrap_or(0)
}

//! Read-only views of collaborators the scheduling core consumes.
//!
//! The world snapshot is read fresh every cycle; the core never caches it across
//! cycles. Role providers own everything unit-specific (bodies, costs, how far a
//! replacement has to travel before it is useful).

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::production::order::BodyPart;

/// A map position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl Position {
    /// Create a position.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Chebyshev distance (diagonal moves cost the same as straight ones).
    #[must_use]
    pub fn range_to(self, other: Self) -> u32 {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }
}

/// State of one produced unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitSnapshot {
    /// Unit identifier.
    pub id: String,
    /// Ticks left to live. `None` while the unit is still being produced.
    pub remaining_life: Option<u32>,
    /// Current position, if placed.
    pub position: Option<Position>,
    /// Where the unit does its work, if known.
    pub work_position: Option<Position>,
}

impl UnitSnapshot {
    /// Whether the unit is still mid-production.
    #[must_use]
    pub const fn is_producing(&self) -> bool {
        self.remaining_life.is_none()
    }
}

/// State of one production station.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationSnapshot {
    /// Station identifier.
    pub id: String,
    /// Owner the station belongs to.
    pub owner: String,
    /// Station position.
    pub position: Position,
}

/// Fresh per-cycle view of the world.
pub trait WorldView {
    /// Look up a unit.
    fn unit(&self, id: &str) -> Option<UnitSnapshot>;
    /// Look up a station.
    fn station(&self, id: &str) -> Option<StationSnapshot>;
    /// Ids of every unit currently alive or in production.
    fn live_units(&self) -> Vec<String>;
    /// Owner-level production pause flag.
    fn owner_paused(&self, _owner: &str) -> bool {
        false
    }
}

/// Per-role knowledge supplied by behavior code.
pub trait RoleProvider {
    /// Base resource cost for the role.
    fn base_cost(&self, role: &str) -> u32;
    /// Body for the role given a resource budget.
    fn body(&self, role: &str, budget: u32) -> Vec<BodyPart>;
    /// Extra ticks a replacement needs after production before it is usable in place.
    fn lead_time(&self, role: &str, station: &StationSnapshot, superseded: &UnitSnapshot) -> f64;
}

/// Travel estimate: distance scaled by how slowly the body moves.
///
/// Every non-move part slows the unit; each move part offsets one of them. A body
/// with no move parts is treated as moving one tile per non-move part.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn travel_lead_time(distance: f64, body: &[BodyPart]) -> f64 {
    let moves = body.iter().filter(|p| **p == BodyPart::Move).count();
    let others = body.len() - moves;
    let factor = if moves == 0 {
        others.max(1) as f64
    } else {
        (others as f64 / moves as f64).max(1.0)
    };
    distance.max(0.0) * factor
}

/// Plain in-memory world, mainly for simulations and tests.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorldSnapshot {
    /// Units by id.
    pub units: HashMap<String, UnitSnapshot>,
    /// Stations by id.
    pub stations: HashMap<String, StationSnapshot>,
    /// Owners whose production is paused.
    pub paused_owners: HashSet<String>,
}

impl WorldSnapshot {
    /// Create an empty snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a unit.
    #[must_use]
    pub fn with_unit(mut self, unit: UnitSnapshot) -> Self {
        self.units.insert(unit.id.clone(), unit);
        self
    }

    /// Add or replace a station.
    #[must_use]
    pub fn with_station(mut self, station: StationSnapshot) -> Self {
        self.stations.insert(station.id.clone(), station);
        self
    }
}

impl WorldView for WorldSnapshot {
    fn unit(&self, id: &str) -> Option<UnitSnapshot> {
        self.units.get(id).cloned()
    }

    fn station(&self, id: &str) -> Option<StationSnapshot> {
        self.stations.get(id).cloned()
    }

    fn live_units(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.units.keys().cloned().collect();
        ids.sort();
        ids
    }

    fn owner_paused(&self, owner: &str) -> bool {
        self.paused_owners.contains(owner)
    }
}

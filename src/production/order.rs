//! Production orders and the body-part catalogue.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::world::RoleProvider;

/// One body part of a produced unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyPart {
    /// Movement.
    Move,
    /// Harvesting, building, upgrading.
    Work,
    /// Carrying resources.
    Carry,
    /// Melee attack.
    Attack,
    /// Ranged attack.
    RangedAttack,
    /// Healing.
    Heal,
    /// Claiming locations.
    Claim,
    /// Extra hit points.
    Tough,
}

impl BodyPart {
    /// Resource cost of the part.
    #[must_use]
    pub const fn cost(self) -> u32 {
        match self {
            Self::Move | Self::Carry => 50,
            Self::Work => 100,
            Self::Attack => 80,
            Self::RangedAttack => 150,
            Self::Heal => 250,
            Self::Claim => 600,
            Self::Tough => 10,
        }
    }
}

/// Total cost of a body.
#[must_use]
pub fn body_cost(body: &[BodyPart]) -> u32 {
    body.iter().map(|p| p.cost()).sum()
}

/// A fully resolved request to produce one unit.
///
/// Immutable once created, apart from the booked tick a timeline assigns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductionOrder {
    id: String,
    role: String,
    body: Vec<BodyPart>,
    cost: u32,
    duration: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    schedule_tick: Option<u32>,
    #[serde(default)]
    memory: Value,
}

impl ProductionOrder {
    /// Build an order for `role` with the given ordinal; id is `<role>-<ordinal>`.
    #[must_use]
    pub fn new(
        role: impl Into<String>,
        ordinal: u32,
        body: Vec<BodyPart>,
        memory: Value,
        ticks_per_part: u32,
    ) -> Self {
        let role = role.into();
        let id = format!("{role}-{ordinal}");
        Self::with_id(id, role, body, memory, ticks_per_part)
    }

    /// Build an order with an explicit id.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn with_id(
        id: impl Into<String>,
        role: impl Into<String>,
        body: Vec<BodyPart>,
        memory: Value,
        ticks_per_part: u32,
    ) -> Self {
        let cost = body_cost(&body);
        let duration = (body.len() as u32).saturating_mul(ticks_per_part);
        Self {
            id: id.into(),
            role: role.into(),
            body,
            cost,
            duration,
            schedule_tick: None,
            memory,
        }
    }

    /// Resolve the body through a role provider for the given budget.
    #[must_use]
    pub fn from_role(
        roles: &dyn RoleProvider,
        role: &str,
        ordinal: u32,
        budget: u32,
        memory: Value,
        ticks_per_part: u32,
    ) -> Self {
        let body = roles.body(role, budget);
        Self::new(role, ordinal, body, memory, ticks_per_part)
    }

    /// Order id (`<role>-<ordinal>`).
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Role name.
    #[must_use]
    pub fn role(&self) -> &str {
        &self.role
    }

    /// Resolved body.
    #[must_use]
    pub fn body(&self) -> &[BodyPart] {
        &self.body
    }

    /// Resource cost.
    #[must_use]
    pub const fn cost(&self) -> u32 {
        self.cost
    }

    /// Production ticks.
    #[must_use]
    pub const fn duration(&self) -> u32 {
        self.duration
    }

    /// Ticks a booking of this order occupies on a timeline.
    #[must_use]
    pub const fn footprint(&self) -> u32 {
        self.duration.saturating_add(1)
    }

    /// Booked cycle tick, once scheduled.
    #[must_use]
    pub const fn schedule_tick(&self) -> Option<u32> {
        self.schedule_tick
    }

    /// Memory payload attached to the produced unit.
    #[must_use]
    pub const fn memory(&self) -> &Value {
        &self.memory
    }

    /// Name for the unit produced by this order at `serial` (`<order id>:<serial>`).
    #[must_use]
    pub fn unit_name(&self, serial: u64) -> String {
        format!("{}:{serial}", self.id)
    }

    pub(crate) fn set_schedule_tick(&mut self, tick: Option<u32>) {
        self.schedule_tick = tick;
    }

    /// Rebuild an order from its persisted schedule entry.
    pub(crate) fn from_entry(entry: ScheduleEntry) -> Self {
        let role = role_of(&entry.id).to_owned();
        let cost = body_cost(&entry.body);
        Self {
            id: entry.id,
            role,
            body: entry.body,
            cost,
            duration: entry.duration,
            schedule_tick: Some(entry.schedule_tick),
            memory: entry.memory,
        }
    }
}

/// Order id a produced unit name refers to (the part before the last `:`).
#[must_use]
pub fn order_id_of(unit_name: &str) -> Option<&str> {
    unit_name.rsplit_once(':').map(|(order, _)| order)
}

/// Role part of an order id (the part before the last `-`).
#[must_use]
pub fn role_of(order_id: &str) -> &str {
    order_id.rsplit_once('-').map_or(order_id, |(role, _)| role)
}

/// Persisted form of a booked order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEntry {
    /// Order id.
    pub id: String,
    /// Booked cycle tick.
    pub schedule_tick: u32,
    /// Production ticks.
    pub duration: u32,
    /// Resolved body.
    pub body: Vec<BodyPart>,
    /// Memory payload.
    #[serde(default)]
    pub memory: Value,
}

impl ScheduleEntry {
    /// Persisted form of a booked order. Unbooked orders have no entry.
    #[must_use]
    pub fn from_order(order: &ProductionOrder) -> Option<Self> {
        Some(Self {
            id: order.id.clone(),
            schedule_tick: order.schedule_tick?,
            duration: order.duration,
            body: order.body.clone(),
            memory: order.memory.clone(),
        })
    }
}

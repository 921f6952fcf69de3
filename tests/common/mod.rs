//! Shared fixtures: a simulated station and a flat role provider.

#![allow(dead_code)]

use colony_kernel::core::ProductionRejection;
use colony_kernel::production::{BodyPart, ProductionOrder, Station};
use colony_kernel::world::{travel_lead_time, RoleProvider, StationSnapshot, UnitSnapshot};

/// Station that produces for `duration` ticks and spends its budget.
#[derive(Debug, Clone)]
pub struct SimStation {
    pub id: String,
    pub owner: String,
    pub budget: u32,
    pub busy_for: u32,
    pub serial: u64,
    pub produced: Vec<String>,
    pub refuse: Option<ProductionRejection>,
}

impl SimStation {
    pub fn new(id: &str, owner: &str, budget: u32) -> Self {
        Self {
            id: id.to_owned(),
            owner: owner.to_owned(),
            budget,
            busy_for: 0,
            serial: 0,
            produced: Vec::new(),
            refuse: None,
        }
    }

    /// One tick of production and budget regeneration.
    pub fn pass_time(&mut self, regen: u32) {
        self.busy_for = self.busy_for.saturating_sub(1);
        self.budget += regen;
        self.serial += 1;
    }
}

impl Station for SimStation {
    fn id(&self) -> &str {
        &self.id
    }

    fn owner(&self) -> &str {
        &self.owner
    }

    fn is_producing(&self) -> bool {
        self.busy_for > 0
    }

    fn available_budget(&self) -> u32 {
        self.budget
    }

    fn produce(&mut self, order: &ProductionOrder) -> Result<String, ProductionRejection> {
        if let Some(reason) = self.refuse.clone() {
            return Err(reason);
        }
        self.budget -= order.cost();
        self.busy_for = order.duration();
        let unit = order.unit_name(self.serial);
        self.produced.push(unit.clone());
        Ok(unit)
    }
}

/// Every role gets `[WORK, CARRY, MOVE]` and travels to its work position.
pub struct FlatRoles;

impl RoleProvider for FlatRoles {
    fn base_cost(&self, _role: &str) -> u32 {
        200
    }

    fn body(&self, _role: &str, _budget: u32) -> Vec<BodyPart> {
        vec![BodyPart::Work, BodyPart::Carry, BodyPart::Move]
    }

    fn lead_time(&self, role: &str, station: &StationSnapshot, unit: &UnitSnapshot) -> f64 {
        let distance = unit
            .work_position
            .map_or(0, |work| station.position.range_to(work));
        travel_lead_time(f64::from(distance), &self.body(role, 0))
    }
}

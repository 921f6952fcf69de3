//! Reconciling persistent behaviors with the live world across restarts.

mod common;

use colony_kernel::builders::ColonyBuilder;
use colony_kernel::config::ColonyConfig;
use colony_kernel::core::{behavior_key, Behavior, PersistentTask, TaskSpec, TaskStatus};
use colony_kernel::infra::{DurableStore, FileStore};
use colony_kernel::runtime::ColonyRuntime;
use colony_kernel::util::Priority;
use colony_kernel::world::{UnitSnapshot, WorldSnapshot, WorldView};
use common::{FlatRoles, SimStation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Serialize, Deserialize)]
struct HaulState {
    trips: u32,
}

/// Makes three trips, then reports success. Fails while its unit is missing.
struct Haul {
    unit: String,
}

impl Behavior<WorldSnapshot> for Haul {
    type State = HaulState;

    fn step(&self, state: HaulState, world: &WorldSnapshot) -> (HaulState, TaskStatus) {
        if world.unit(&self.unit).is_none() {
            return (state, TaskStatus::Failed);
        }
        let next = HaulState {
            trips: state.trips + 1,
        };
        let status = if next.trips >= 3 {
            TaskStatus::Success
        } else {
            TaskStatus::Running
        };
        (next, status)
    }
}

fn unit(id: &str) -> UnitSnapshot {
    UnitSnapshot {
        id: id.into(),
        remaining_life: Some(1000),
        position: None,
        work_position: None,
    }
}

fn live_specs(world: &WorldSnapshot) -> Vec<TaskSpec> {
    world
        .live_units()
        .into_iter()
        .map(|id| TaskSpec::new(id, Priority::Medium))
        .collect()
}

fn bootstrap(rt: &mut ColonyRuntime<WorldSnapshot>, world: &WorldSnapshot) {
    rt.bootstrap("hauler-", &live_specs(world), |spec| {
        PersistentTask::new(&spec.id, Haul {
            unit: spec.id.clone(),
        })
    })
    .unwrap();
}

fn open(dir: &std::path::Path, world: WorldSnapshot) -> ColonyRuntime<WorldSnapshot> {
    let store = FileStore::open(dir, "colony").unwrap();
    ColonyBuilder::new(ColonyConfig::default())
        .unwrap()
        .build_runtime(Box::new(store), world, Box::new(FlatRoles))
        .unwrap()
}

#[test]
fn test_behavior_resumes_after_cold_restart() {
    let dir = tempfile::tempdir().unwrap();
    let world = WorldSnapshot::new().with_unit(unit("hauler-0:1"));
    let mut stations: Vec<SimStation> = Vec::new();

    {
        let mut rt = open(dir.path(), world.clone());
        bootstrap(&mut rt, &world);
        rt.tick(&mut stations).unwrap();
        rt.tick(&mut stations).unwrap();
    }

    let mut rt = open(dir.path(), world.clone());
    assert!(!rt.scheduler().contains("hauler-0:1"));
    bootstrap(&mut rt, &world);
    let report = rt.tick(&mut stations).unwrap();
    assert_eq!(report.cycle.completed, vec!["hauler-0:1".to_string()]);
    assert!(rt
        .colony()
        .store()
        .get(&behavior_key("hauler-0:1"))
        .unwrap()
        .is_none());
}

#[test]
fn test_dead_units_are_cleaned_up_and_rerun_is_safe() {
    let dir = tempfile::tempdir().unwrap();
    let world = WorldSnapshot::new()
        .with_unit(unit("hauler-0:1"))
        .with_unit(unit("hauler-1:4"));
    let mut stations: Vec<SimStation> = Vec::new();
    let mut rt = open(dir.path(), world.clone());
    bootstrap(&mut rt, &world);
    rt.tick(&mut stations).unwrap();

    let survivors = WorldSnapshot::new().with_unit(unit("hauler-1:4"));
    rt.observe(survivors.clone());
    bootstrap(&mut rt, &survivors);
    bootstrap(&mut rt, &survivors);

    assert!(!rt.scheduler().contains("hauler-0:1"));
    assert!(rt.scheduler().contains("hauler-1:4"));
    assert!(rt.scheduler().contains("production-planner"));
    assert_eq!(rt.scheduler().len(), 2);
    let store = rt.colony().store();
    assert!(store.get(&behavior_key("hauler-0:1")).unwrap().is_none());
    assert!(store.get(&behavior_key("hauler-1:4")).unwrap().is_some());
}

#[test]
fn test_missing_unit_escalates_instead_of_faulting() {
    let dir = tempfile::tempdir().unwrap();
    let world = WorldSnapshot::new().with_unit(unit("hauler-0:1"));
    let mut stations: Vec<SimStation> = Vec::new();
    let mut rt = open(dir.path(), world.clone());
    bootstrap(&mut rt, &world);

    rt.observe(WorldSnapshot::new());
    let report = rt.tick(&mut stations).unwrap();
    assert!(report.cycle.faulted.is_empty());
    assert_eq!(report.cycle.escalated, vec!["hauler-0:1".to_string()]);
    assert_eq!(rt.scheduler().priority("hauler-0:1"), Some(Priority::MediumHigh));
}

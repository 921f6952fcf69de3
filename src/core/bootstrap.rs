//! Reconciling the scheduler with the live world after a restart or each tick.
//!
//! Tasks hold no authoritative state, so after a cold start the task set is simply
//! derived again from the entities that exist. Running this repeatedly is safe.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::behavior::{behavior_key, BEHAVIOR_KEY_PREFIX};
use super::{Scheduler, SchedulerError, TaskExecutor};
use crate::infra::store::DurableStore;
use crate::util::serde::{Priority, TaskId};

/// A task that should exist for a live entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSpec {
    /// Task id, normally the entity id.
    pub id: TaskId,
    /// Initial priority.
    pub priority: Priority,
}

impl TaskSpec {
    /// Build a spec.
    pub fn new(id: impl Into<TaskId>, priority: Priority) -> Self {
        Self {
            id: id.into(),
            priority,
        }
    }
}

/// What a reconcile pass changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileReport {
    /// Tasks newly registered.
    pub registered: Vec<TaskId>,
    /// Live entities whose task already existed.
    pub already_present: Vec<TaskId>,
    /// Tasks removed because their entity is gone.
    pub removed: Vec<TaskId>,
    /// Persisted behavior states deleted for dead entities.
    pub purged_state: Vec<TaskId>,
}

/// Bring the tasks under `scope` (an id prefix, empty for all) in line with `live`.
///
/// Tasks and persisted behavior state in scope whose id is not live are removed;
/// every live spec gets a task built by `make` unless one is already registered.
pub fn reconcile<C, E, F>(
    scheduler: &mut Scheduler<C>,
    store: &mut dyn DurableStore,
    scope: &str,
    live: &[TaskSpec],
    mut make: F,
) -> Result<ReconcileReport, SchedulerError>
where
    E: TaskExecutor<C> + 'static,
    F: FnMut(&TaskSpec) -> E,
{
    let mut report = ReconcileReport::default();
    let is_live = |id: &str| live.iter().any(|spec| spec.id == id);

    let mut stale: Vec<TaskId> = scheduler
        .ids()
        .into_iter()
        .filter(|id| id.starts_with(scope) && !is_live(id))
        .collect();
    stale.sort();
    for id in stale {
        scheduler.unregister(&id);
        report.removed.push(id);
    }

    let state_prefix = behavior_key(scope);
    for key in store.keys_with_prefix(&state_prefix) {
        let id = key.strip_prefix(BEHAVIOR_KEY_PREFIX).unwrap_or(&key);
        if !is_live(id) {
            store.delete(&key)?;
            report.purged_state.push(id.to_owned());
        }
    }

    for spec in live {
        if scheduler.contains(&spec.id) {
            report.already_present.push(spec.id.clone());
            continue;
        }
        scheduler.register(spec.id.clone(), spec.priority, make(spec));
        report.registered.push(spec.id.clone());
    }

    if report.registered.is_empty() && report.removed.is_empty() {
        debug!(live = live.len(), "reconcile: nothing to do");
    } else {
        info!(
            registered = report.registered.len(),
            removed = report.removed.len(),
            purged = report.purged_state.len(),
            "reconciled tasks with live entities"
        );
    }
    Ok(report)
}

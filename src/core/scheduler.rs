//! Registry of active and paused tasks.
//!
//! The scheduler is the only mutation surface other subsystems use to introduce
//! work. Registration is idempotent per id across the active and paused sets, which
//! is also how mutual exclusion over a controlled unit is achieved: a second
//! behavior for the same unit simply never gets registered.

use std::collections::HashMap;

use tracing::debug;

use super::{AppResult, Task, TaskExecutor, TaskStatus};
use crate::util::serde::{Priority, TaskId};

/// Holds every live task keyed by id.
pub struct Scheduler<C> {
    active: HashMap<TaskId, Task<C>>,
    paused: HashMap<TaskId, Task<C>>,
    next_seq: u64,
}

impl<C> Scheduler<C> {
    /// Create an empty scheduler.
    #[must_use]
    pub fn new() -> Self {
        Self {
            active: HashMap::new(),
            paused: HashMap::new(),
            next_seq: 0,
        }
    }

    /// Register a task body under `id`.
    ///
    /// Returns `true` if a new task was inserted. If `id` is already present in
    /// either set this is a no-op and returns `false`.
    pub fn register<E>(&mut self, id: impl Into<TaskId>, priority: Priority, runner: E) -> bool
    where
        E: TaskExecutor<C> + 'static,
    {
        let id = id.into();
        if self.contains(&id) {
            return false;
        }
        debug!(task = %id, %priority, "task registered");
        let task = Task::new(id.clone(), priority, self.next_seq, Box::new(runner));
        self.next_seq += 1;
        self.active.insert(id, task);
        true
    }

    /// Register a closure body. Same semantics as [`Scheduler::register`].
    pub fn register_fn<F>(&mut self, id: impl Into<TaskId>, priority: Priority, body: F) -> bool
    where
        F: FnMut(&mut C) -> AppResult<TaskStatus> + 'static,
    {
        self.register(id, priority, body)
    }

    /// Remove a task from both sets. Absent ids are ignored.
    pub fn unregister(&mut self, id: &str) {
        let removed = self.active.remove(id).is_some() | self.paused.remove(id).is_some();
        if removed {
            debug!(task = %id, "task unregistered");
        }
    }

    /// Move an active task to the paused set, keeping all its fields.
    pub fn pause(&mut self, id: &str) {
        if let Some(task) = self.active.remove(id) {
            debug!(task = %id, "task paused");
            self.paused.insert(task.id().to_owned(), task);
        }
    }

    /// Move a paused task back to the active set.
    pub fn resume(&mut self, id: &str) {
        if let Some(task) = self.paused.remove(id) {
            debug!(task = %id, "task resumed");
            self.active.insert(task.id().to_owned(), task);
        }
    }

    /// Advance a task's priority one step. No-op at `Critical` or if absent.
    pub fn escalate(&mut self, id: &str) -> Option<Priority> {
        let task = self.task_mut(id)?;
        let before = task.current_priority();
        let after = task.escalate();
        if before != after {
            debug!(task = %id, from = %before, to = %after, "task escalated");
        }
        Some(after)
    }

    /// Restore a task's priority to the value it was registered with.
    pub fn reset_priority(&mut self, id: &str) {
        if let Some(task) = self.task_mut(id) {
            task.reset_priority();
        }
    }

    /// Whether `id` is registered (active or paused).
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.active.contains_key(id) || self.paused.contains_key(id)
    }

    /// Whether `id` is in the paused set.
    #[must_use]
    pub fn is_paused(&self, id: &str) -> bool {
        self.paused.contains_key(id)
    }

    /// Look up a task in either set.
    #[must_use]
    pub fn task(&self, id: &str) -> Option<&Task<C>> {
        self.active.get(id).or_else(|| self.paused.get(id))
    }

    /// Current priority of a task, if registered.
    #[must_use]
    pub fn priority(&self, id: &str) -> Option<Priority> {
        self.task(id).map(Task::current_priority)
    }

    /// Number of active tasks.
    #[must_use]
    pub fn active_len(&self) -> usize {
        self.active.len()
    }

    /// Number of paused tasks.
    #[must_use]
    pub fn paused_len(&self) -> usize {
        self.paused.len()
    }

    /// Total number of registered tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.active.len() + self.paused.len()
    }

    /// Whether no tasks are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Ids of every registered task, active and paused.
    #[must_use]
    pub fn ids(&self) -> Vec<TaskId> {
        self.active.keys().chain(self.paused.keys()).cloned().collect()
    }

    /// Iterate over every registered task.
    pub fn tasks(&self) -> impl Iterator<Item = &Task<C>> {
        self.active.values().chain(self.paused.values())
    }

    /// Active task ids in execution order: highest priority first, then registration order.
    #[must_use]
    pub fn run_order(&self) -> Vec<TaskId> {
        let mut entries: Vec<(Priority, u64, &TaskId)> = self
            .active
            .iter()
            .map(|(id, task)| (task.current_priority(), task.seq(), id))
            .collect();
        entries.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
        entries.into_iter().map(|(_, _, id)| id.clone()).collect()
    }

    pub(crate) fn active_task_mut(&mut self, id: &str) -> Option<&mut Task<C>> {
        self.active.get_mut(id)
    }

    fn task_mut(&mut self, id: &str) -> Option<&mut Task<C>> {
        match self.active.get_mut(id) {
            Some(task) => Some(task),
            None => self.paused.get_mut(id),
        }
    }
}

impl<C> Default for Scheduler<C> {
    fn default() -> Self {
        Self::new()
    }
}

//! Task record and status taxonomy.

use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::TaskExecutor;
use crate::util::serde::{Priority, TaskId};

/// Outcome of one invocation of a task body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    /// Work is finished; the task is removed.
    Success,
    /// Recoverable failure; the task is escalated and retried.
    Failed,
    /// Step could not complete; handled exactly like `Failed`.
    Incomplete,
    /// Normal continuation; priority is left alone.
    Running,
}

impl TaskStatus {
    /// Whether the kernel escalates a task that returned this status.
    #[must_use]
    pub const fn escalates(self) -> bool {
        matches!(self, Self::Failed | Self::Incomplete)
    }
}

/// A named unit of deferred work plus its scheduling bookkeeping.
pub struct Task<C> {
    id: TaskId,
    initial_priority: Priority,
    current_priority: Priority,
    cpu_history: VecDeque<f64>,
    seq: u64,
    runner: Box<dyn TaskExecutor<C>>,
}

impl<C> Task<C> {
    pub(crate) fn new(
        id: TaskId,
        priority: Priority,
        seq: u64,
        runner: Box<dyn TaskExecutor<C>>,
    ) -> Self {
        Self {
            id,
            initial_priority: priority,
            current_priority: priority,
            cpu_history: VecDeque::new(),
            seq,
            runner,
        }
    }

    /// Task identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Priority supplied at registration.
    #[must_use]
    pub const fn initial_priority(&self) -> Priority {
        self.initial_priority
    }

    /// Priority used for the next kernel ordering.
    #[must_use]
    pub const fn current_priority(&self) -> Priority {
        self.current_priority
    }

    /// Measured costs, oldest first.
    #[must_use]
    pub const fn cpu_history(&self) -> &VecDeque<f64> {
        &self.cpu_history
    }

    /// Mean of the recorded costs, or `None` before the first run.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn average_cpu(&self) -> Option<f64> {
        if self.cpu_history.is_empty() {
            return None;
        }
        Some(self.cpu_history.iter().sum::<f64>() / self.cpu_history.len() as f64)
    }

    /// Registration order, used to break priority ties.
    pub(crate) const fn seq(&self) -> u64 {
        self.seq
    }

    pub(crate) fn escalate(&mut self) -> Priority {
        self.current_priority = self.current_priority.escalated();
        self.current_priority
    }

    pub(crate) fn reset_priority(&mut self) {
        self.current_priority = self.initial_priority;
    }

    /// Append a measurement, dropping the oldest beyond `limit` entries.
    pub(crate) fn record_cost(&mut self, cost: f64, limit: usize) {
        if limit == 0 {
            return;
        }
        while self.cpu_history.len() >= limit {
            self.cpu_history.pop_front();
        }
        self.cpu_history.push_back(cost);
    }

    pub(crate) fn runner_mut(&mut self) -> &mut dyn TaskExecutor<C> {
        self.runner.as_mut()
    }
}

impl<C> fmt::Debug for Task<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("id", &self.id)
            .field("initial_priority", &self.initial_priority)
            .field("current_priority", &self.current_priority)
            .field("cpu_history", &self.cpu_history)
            .finish_non_exhaustive()
    }
}

//! Task body abstraction.

use super::{AppResult, TaskStatus};

/// The callable behind a task.
///
/// A body reads and writes only what it can reach through the context `C`
/// (durable store, world snapshot, production queue). Nothing captured in the
/// executor is assumed to survive a cold restart; see
/// [`PersistentTask`](crate::core::behavior::PersistentTask) for bodies that keep
/// their progress in the store.
///
/// Returning `Err` (or panicking) is coerced to [`TaskStatus::Failed`] by the
/// kernel, so one broken body never aborts the rest of the cycle.
///
/// # Example
///
/// ```rust
/// use colony_kernel::core::{Scheduler, TaskStatus};
/// use colony_kernel::util::Priority;
///
/// let mut scheduler: Scheduler<u32> = Scheduler::new();
/// scheduler.register_fn("counter", Priority::Low, |count: &mut u32| {
///     *count += 1;
///     Ok(if *count >= 3 { TaskStatus::Success } else { TaskStatus::Running })
/// });
/// assert!(scheduler.contains("counter"));
/// ```
pub trait TaskExecutor<C> {
    /// Run one logical step of the task.
    fn execute(&mut self, ctx: &mut C) -> AppResult<TaskStatus>;
}

/// Blanket implementation: any closure with the right shape is a task body.
impl<C, F> TaskExecutor<C> for F
where
    F: FnMut(&mut C) -> AppResult<TaskStatus>,
{
    fn execute(&mut self, ctx: &mut C) -> AppResult<TaskStatus> {
        self(ctx)
    }
}

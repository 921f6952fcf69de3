//! Behaviors whose progress lives in the durable store.
//!
//! A [`Behavior`] is a pure step function over an explicit state value. The
//! [`PersistentTask`] wrapper loads that state before every run and writes it back
//! after, so a cold restart resumes exactly where the last tick left off.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use super::{AppResult, TaskExecutor, TaskStatus};
use crate::infra::store::{load_typed, save_typed, DurableStore};

/// Store key prefix for persisted behavior state.
pub const BEHAVIOR_KEY_PREFIX: &str = "behavior:";

/// Store key for the behavior of entity `id`.
#[must_use]
pub fn behavior_key(id: &str) -> String {
    format!("{BEHAVIOR_KEY_PREFIX}{id}")
}

/// One step of a unit or location behavior.
pub trait Behavior<W: ?Sized> {
    /// Progress carried between ticks. `Default` is the state of a fresh entity.
    type State: Serialize + DeserializeOwned + Default;

    /// Advance by one tick against the current world.
    fn step(&self, state: Self::State, world: &W) -> (Self::State, TaskStatus);
}

/// Context exposing what a persistent behavior needs.
pub trait BehaviorHost {
    /// World type behaviors read.
    type World: ?Sized;

    /// Borrow the world and the store at the same time.
    fn behavior_parts(&mut self) -> (&Self::World, &mut dyn DurableStore);
}

/// Task body that persists its behavior state under [`behavior_key`].
#[derive(Debug, Clone)]
pub struct PersistentTask<B> {
    key: String,
    behavior: B,
}

impl<B> PersistentTask<B> {
    /// Wrap `behavior` for entity `id`.
    pub fn new(id: &str, behavior: B) -> Self {
        Self {
            key: behavior_key(id),
            behavior,
        }
    }

    /// Store key used for this task's state.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl<C, B> TaskExecutor<C> for PersistentTask<B>
where
    C: BehaviorHost,
    B: Behavior<C::World>,
{
    fn execute(&mut self, ctx: &mut C) -> AppResult<TaskStatus> {
        let (world, store) = ctx.behavior_parts();
        let state: B::State = load_typed(&*store, &self.key)?.unwrap_or_default();
        let (next, status) = self.behavior.step(state, world);
        if status == TaskStatus::Success {
            debug!(key = %self.key, "behavior finished; dropping state");
            store.delete(&self.key)?;
        } else {
            save_typed(store, &self.key, &next)?;
        }
        Ok(status)
    }
}

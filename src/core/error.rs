//! Error types for scheduler and production operations.

use thiserror::Error;

/// Errors produced by scheduler components and their backends.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// Durable store failure with context.
    #[error("backend error: {0}")]
    Backend(String),
    /// Persisted state could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// A timeline was requested for a station that was never observed.
    #[error("unknown station: {0}")]
    UnknownStation(String),
}

/// Why a production order could not be dispatched or booked right now.
///
/// None of these are faults: the order stays queued and is retried. The
/// distinction only decides which holding list the order moves to.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProductionRejection {
    /// Not enough resource budget at the station this tick.
    #[error("insufficient budget: needed {needed}, available {available}")]
    InsufficientBudget {
        /// Cost of the order.
        needed: u32,
        /// Budget available at the station.
        available: u32,
    },
    /// The station is already producing a unit.
    #[error("station busy")]
    StationBusy,
    /// Production for the owner is paused.
    #[error("owner paused")]
    OwnerPaused,
    /// No timeline had room for the order.
    #[error("no free slot")]
    NoSlot,
    /// Any other rejection reported by the station.
    #[error("rejected: {0}")]
    Rejected(String),
}

impl ProductionRejection {
    /// Budget shortfalls park the order in `processing`; everything else in `failed`.
    #[must_use]
    pub const fn is_budget_shortfall(&self) -> bool {
        matches!(self, Self::InsufficientBudget { .. })
    }
}

/// Application-facing result using anyhow for task bodies and higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;

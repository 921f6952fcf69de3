//! Shared identifier and priority types used across the scheduler and production layers.

use serde::{Deserialize, Serialize};

/// Unique task identifier; one task per controlled unit or location monitor.
pub type TaskId = String;

/// Identifier of the owner (location/colony) that stations and queues belong to.
pub type OwnerId = String;

/// Identifier of a production station.
pub type StationId = String;

/// Fixed total order of scheduling priorities.
///
/// Variants are declared lowest first, so the derived `Ord` matches the order
/// `Indifferent < Low < ... < Critical`. The kernel runs higher priorities first.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    /// Runs only when nothing else wants the cycle.
    Indifferent,
    /// Background work.
    Low,
    /// Slightly above background.
    MediumLow,
    /// Default for most unit behaviors.
    #[default]
    Medium,
    /// Slightly urgent.
    MediumHigh,
    /// Urgent work.
    High,
    /// Terminal escalation level; runs first.
    Critical,
}

impl Priority {
    /// All priorities, lowest first.
    pub const ALL: [Self; 7] = [
        Self::Indifferent,
        Self::Low,
        Self::MediumLow,
        Self::Medium,
        Self::MediumHigh,
        Self::High,
        Self::Critical,
    ];

    /// The next step up the order. `Critical` is a fixed point.
    #[must_use]
    pub const fn escalated(self) -> Self {
        match self {
            Self::Indifferent => Self::Low,
            Self::Low => Self::MediumLow,
            Self::MediumLow => Self::Medium,
            Self::Medium => Self::MediumHigh,
            Self::MediumHigh => Self::High,
            Self::High | Self::Critical => Self::Critical,
        }
    }

    /// Whether no further escalation is possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Critical)
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Indifferent => "INDIFFERENT",
            Self::Low => "LOW",
            Self::MediumLow => "MEDIUM_LOW",
            Self::Medium => "MEDIUM",
            Self::MediumHigh => "MEDIUM_HIGH",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escalation_walks_every_step() {
        let mut p = Priority::Indifferent;
        for expected in Priority::ALL.iter().skip(1) {
            p = p.escalated();
            assert_eq!(p, *expected);
        }
        assert_eq!(p.escalated(), Priority::Critical);
    }

    #[test]
    fn serde_uses_screaming_names() {
        let json = serde_json::to_string(&Priority::MediumHigh).unwrap();
        assert_eq!(json, "\"MEDIUM_HIGH\"");
        let back: Priority = serde_json::from_str("\"LOW\"").unwrap();
        assert_eq!(back, Priority::Low);
    }
}

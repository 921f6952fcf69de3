//! Builders to construct runtime components from configuration.

pub mod colony_builder;

pub use colony_builder::ColonyBuilder;

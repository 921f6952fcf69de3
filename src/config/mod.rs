//! Configuration models for the kernel, timelines and production queue.

pub mod colony;

pub use colony::{ColonyConfig, KernelConfig, QueueConfig, TimelineConfig, ENV_PREFIX};

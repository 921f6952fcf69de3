//! Tests for the colony builder

use colony_kernel::builders::ColonyBuilder;
use colony_kernel::config::{ColonyConfig, QueueConfig};
use colony_kernel::core::{Scheduler, SchedulerError};

#[test]
fn test_builder_rejects_invalid_config() {
    let config = ColonyConfig {
        production_queue: QueueConfig { capacity: 0 },
        ..ColonyConfig::default()
    };
    let err = ColonyBuilder::new(config).unwrap_err();
    assert!(matches!(err, SchedulerError::InvalidConfig(msg) if msg.contains("capacity")));
}

#[test]
fn test_builder_components_follow_config() {
    let mut config = ColonyConfig::default();
    config.kernel.cpu_history_len = 4;
    config.timeline.cycle_length = 900;
    config.production_queue.capacity = 1200;
    let builder = ColonyBuilder::new(config).unwrap();

    assert_eq!(builder.build_kernel().config().cpu_history_len, 4);
    assert_eq!(builder.build_queue().capacity(), 1200);
    let mut timelines = builder.build_timelines();
    assert_eq!(timelines.get_or_create("W1N1", "spawn1").cycle_length(), 900);
    let scheduler: Scheduler<()> = builder.build_scheduler();
    assert!(scheduler.is_empty());
}

//! Tests for configuration validation

use colony_kernel::config::{ColonyConfig, KernelConfig, QueueConfig, TimelineConfig};

#[test]
fn test_defaults_are_valid() {
    let cfg = ColonyConfig::default();
    assert!(cfg.validate().is_ok());
    assert_eq!(cfg.kernel.cpu_history_len, 10);
    assert_eq!(cfg.timeline.cycle_length, 1500);
    assert_eq!(cfg.timeline.ticks_per_part, 3);
    assert_eq!(cfg.production_queue.capacity, 3000);
}

#[test]
fn test_kernel_config_invalid_history() {
    assert!(KernelConfig { cpu_history_len: 0 }.validate().is_err());
}

#[test]
fn test_timeline_config_invalid_values() {
    let base = TimelineConfig::default();
    assert!(TimelineConfig { cycle_length: 0, ..base.clone() }.validate().is_err());
    assert!(TimelineConfig { limiter: 0.0, ..base.clone() }.validate().is_err());
    assert!(TimelineConfig { limiter: 1.5, ..base.clone() }.validate().is_err());
    assert!(TimelineConfig { ticks_per_part: 0, ..base.clone() }.validate().is_err());
    assert!(TimelineConfig { limiter: 1.0, ..base }.validate().is_ok());
}

#[test]
fn test_queue_config_invalid_capacity() {
    assert!(QueueConfig { capacity: 0 }.validate().is_err());
}

#[test]
fn test_from_json_str_reports_section() {
    let err = ColonyConfig::from_json_str(r#"{"timeline": {"limiter": 2.0}}"#).unwrap_err();
    assert!(err.starts_with("timeline invalid"));
    let err = ColonyConfig::from_json_str("{not json").unwrap_err();
    assert!(err.starts_with("parse error"));
}

#[test]
fn test_env_overrides_apply_on_top_of_json() {
    let mut cfg = ColonyConfig::from_json_str(r#"{"production_queue": {"capacity": 500}}"#).unwrap();
    cfg.apply_env_overrides(|name| (name == "COLONY_TICKS_PER_PART").then(|| "2".to_string()))
        .unwrap();
    assert_eq!(cfg.timeline.ticks_per_part, 2);
    assert_eq!(cfg.production_queue.capacity, 500);
}

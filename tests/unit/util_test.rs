//! Tests for utilities

use colony_kernel::util::{ceil_ticks, init_tracing, CpuClock, Priority, WallClock};

#[test]
fn test_priority_total_order() {
    let mut shuffled = vec![
        Priority::High,
        Priority::Indifferent,
        Priority::Critical,
        Priority::Medium,
        Priority::Low,
        Priority::MediumHigh,
        Priority::MediumLow,
    ];
    shuffled.sort();
    assert_eq!(shuffled, Priority::ALL.to_vec());
    assert_eq!(Priority::default(), Priority::Medium);
}

#[test]
fn test_critical_is_a_fixed_point() {
    assert_eq!(Priority::Critical.escalated(), Priority::Critical);
    assert!(Priority::Critical.is_terminal());
    assert!(!Priority::High.is_terminal());
}

#[test]
fn test_priority_serde_names() {
    let json = serde_json::to_string(&Priority::MediumLow).unwrap();
    assert_eq!(json, "\"MEDIUM_LOW\"");
}

#[test]
fn test_ceil_ticks_biases_upward() {
    assert_eq!(ceil_ticks(0.0), 0);
    assert_eq!(ceil_ticks(39.01), 40);
    assert_eq!(ceil_ticks(-3.0), 0);
}

#[test]
fn test_wall_clock_never_goes_backwards() {
    let clock = WallClock::new();
    let a = clock.used();
    let b = clock.used();
    assert!(b >= a);
}

#[test]
fn test_init_tracing_is_idempotent() {
    init_tracing();
    init_tracing();
}

//! Booking and per-tick execution scenarios for the production timeline.

mod common;

use colony_kernel::config::TimelineConfig;
use colony_kernel::core::ProductionRejection;
use colony_kernel::production::{
    BodyPart, BookingContext, BookingOptions, FreeSpace, NoSupersession, ProductionOrder,
    ProductionTimeline, TickOutcome,
};
use colony_kernel::world::UnitSnapshot;
use common::SimStation;
use serde_json::Value;

fn config() -> TimelineConfig {
    TimelineConfig::default()
}

/// `parts` MOVE parts: cost 50 each, 3 ticks each.
fn order(id: &str, parts: usize) -> ProductionOrder {
    ProductionOrder::with_id(id, "hauler", vec![BodyPart::Move; parts], Value::Null, 3)
}

struct Predecessor {
    remaining: Option<u32>,
    lead: f64,
}

impl BookingContext for Predecessor {
    fn superseded(&self, order: &ProductionOrder) -> Option<UnitSnapshot> {
        Some(UnitSnapshot {
            id: order.unit_name(0),
            remaining_life: self.remaining,
            position: None,
            work_position: None,
        })
    }

    fn lead_time(&self, _station: &str, _order: &ProductionOrder, _unit: &UnitSnapshot) -> f64 {
        self.lead
    }
}

#[test]
fn test_fresh_order_falls_back_to_first_free_tick() {
    let mut timeline = ProductionTimeline::new("spawn1", &config());
    let outcome = timeline.add(vec![order("h-0", 10)], &NoSupersession, BookingOptions::default());
    assert_eq!(outcome.booked, vec![("h-0".to_string(), 0)]);
    assert!(outcome.deferred.is_empty());
    assert_eq!(timeline.free_spaces(), &[FreeSpace::new(31, 1469)]);
    assert_eq!(timeline.used_space(), 31);
}

#[test]
fn test_replacement_books_exactly_on_deadline() {
    let mut timeline = ProductionTimeline::new("spawn1", &config());
    // Total lead of 40: 30 ticks of production plus 10 of travel.
    let ctx = Predecessor {
        remaining: Some(500),
        lead: 10.0,
    };
    let outcome = timeline.add(vec![order("h-0", 10)], &ctx, BookingOptions::default());
    assert_eq!(outcome.booked, vec![("h-0".to_string(), 460)]);
    assert_eq!(
        timeline.free_spaces(),
        &[FreeSpace::new(0, 460), FreeSpace::new(491, 1009)]
    );
}

#[test]
fn test_deadline_wraps_around_the_cycle() {
    let mut timeline = ProductionTimeline::new("spawn1", &TimelineConfig {
        cycle_length: 100,
        limiter: 1.0,
        ticks_per_part: 3,
    });
    let mut station = SimStation::new("spawn1", "W1N1", 0);
    for _ in 0..90 {
        timeline.advance(&mut station, false);
    }
    assert_eq!(timeline.tick(), 90);
    let ctx = Predecessor {
        remaining: Some(40),
        lead: 0.0,
    };
    // 90 + (40 - 6) = 124 -> tick 24 of the next cycle.
    assert_eq!(timeline.book(order("h-0", 2), &ctx, BookingOptions::default()), Ok(24));
}

#[test]
fn test_booked_order_runs_on_its_tick_and_recurs() {
    let mut timeline = ProductionTimeline::new("spawn1", &TimelineConfig {
        cycle_length: 50,
        limiter: 0.8,
        ticks_per_part: 3,
    });
    let ctx = Predecessor {
        remaining: Some(20),
        lead: 0.0,
    };
    assert_eq!(timeline.book(order("h-0", 2), &ctx, BookingOptions::default()), Ok(14));

    let mut station = SimStation::new("spawn1", "W1N1", 1000);
    let mut dispatched = Vec::new();
    for tick in 0..100 {
        if let TickOutcome::Dispatched { unit, late, .. } = timeline.advance(&mut station, false) {
            assert!(!late);
            dispatched.push((tick, unit));
        }
        station.pass_time(0);
    }
    let ticks: Vec<u32> = dispatched.iter().map(|(t, _)| *t).collect();
    assert_eq!(ticks, vec![14, 64]);
    assert_eq!(dispatched[0].1, "h-0:14");
}

#[test]
fn test_short_disruption_runs_late_and_resets_counter() {
    let mut timeline = ProductionTimeline::new("spawn1", &config());
    timeline
        .book(order("h-0", 10), &NoSupersession, BookingOptions::default())
        .unwrap();
    let mut station = SimStation::new("spawn1", "W1N1", 100);

    // Tick 0: needs 500, only 100 available.
    match timeline.advance(&mut station, false) {
        TickOutcome::Blocked { reason, .. } => assert_eq!(
            reason,
            ProductionRejection::InsufficientBudget {
                needed: 500,
                available: 100
            }
        ),
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(timeline.paused_ticks(), 1);

    station.budget = 1000;
    match timeline.advance(&mut station, false) {
        TickOutcome::Dispatched { order_id, late, .. } => {
            assert_eq!(order_id, "h-0");
            assert!(late);
        }
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(timeline.paused_ticks(), 0);
    assert_eq!(timeline.schedule().len(), 1);
}

#[test]
fn test_owner_pause_counts_as_disruption() {
    let mut timeline = ProductionTimeline::new("spawn1", &config());
    timeline
        .book(order("h-0", 1), &NoSupersession, BookingOptions::default())
        .unwrap();
    let mut station = SimStation::new("spawn1", "W1N1", 1000);
    let outcome = timeline.advance(&mut station, true);
    assert_eq!(
        outcome,
        TickOutcome::Blocked {
            order_id: "h-0".into(),
            reason: ProductionRejection::OwnerPaused
        }
    );
    assert!(station.produced.is_empty());
}

#[test]
fn test_long_disruption_forces_rebuild() {
    let mut timeline = ProductionTimeline::new("spawn1", &TimelineConfig {
        cycle_length: 40,
        limiter: 1.0,
        ticks_per_part: 3,
    });
    // Footprints 31 + 4 leave 5 spare ticks.
    timeline.add(
        vec![order("a-0", 10), order("b-0", 1)],
        &NoSupersession,
        BookingOptions::default(),
    );
    assert_eq!(timeline.spare_capacity(), 5);

    let mut station = SimStation::new("spawn1", "W1N1", 0);
    for _ in 0..6 {
        assert!(matches!(
            timeline.advance(&mut station, false),
            TickOutcome::Blocked { .. }
        ));
    }
    assert_eq!(timeline.paused_ticks(), 6);

    station.budget = 10_000;
    match timeline.advance(&mut station, false) {
        TickOutcome::Rebuilt { orders } => {
            let ids: Vec<&str> = orders.iter().map(ProductionOrder::id).collect();
            assert_eq!(ids, vec!["a-0", "b-0"]);
        }
        other => panic!("unexpected {other:?}"),
    }
    assert!(timeline.schedule().is_empty());
    assert_eq!(timeline.free_spaces(), &[FreeSpace::new(0, 40)]);
    assert_eq!(timeline.paused_ticks(), 0);
    assert!(station.produced.is_empty());
}

#[test]
fn test_tick_advances_even_when_idle() {
    let mut timeline = ProductionTimeline::new("spawn1", &TimelineConfig {
        cycle_length: 3,
        limiter: 0.8,
        ticks_per_part: 3,
    });
    let mut station = SimStation::new("spawn1", "W1N1", 0);
    let ticks: Vec<u32> = (0..4)
        .map(|_| {
            assert_eq!(timeline.advance(&mut station, false), TickOutcome::Idle);
            timeline.tick()
        })
        .collect();
    assert_eq!(ticks, vec![1, 2, 0, 1]);
}

#[test]
fn test_earlier_slot_when_deadline_taken() {
    let mut timeline = ProductionTimeline::new("spawn1", &config());
    let ctx = Predecessor {
        remaining: Some(500),
        lead: 10.0,
    };
    timeline.book(order("a-0", 10), &ctx, BookingOptions::default()).unwrap();
    // Ends before 460 in [0, 460): latest start 429.
    assert_eq!(timeline.book(order("b-0", 10), &ctx, BookingOptions::default()), Ok(429));
    assert!(timeline.is_consistent());
}

#[test]
fn test_reset_drains_everything() {
    let mut timeline = ProductionTimeline::new("spawn1", &config());
    timeline.add(
        vec![order("a-0", 2), order("b-0", 2)],
        &NoSupersession,
        BookingOptions::default(),
    );
    let drained = timeline.reset();
    assert_eq!(drained.len(), 2);
    assert!(drained.iter().all(|o| o.schedule_tick().is_none()));
    assert_eq!(timeline.used_space(), 0);
    assert!(!timeline.is_full());
}

//! Production queue budgets and draining against real stations.

mod common;

use colony_kernel::core::ProductionRejection;
use colony_kernel::production::{BodyPart, OrderState, ProductionOrder, ProductionQueue, StationPool};
use common::SimStation;
use serde_json::Value;

fn order(role: &str, ordinal: u32, body: Vec<BodyPart>) -> ProductionOrder {
    ProductionOrder::new(role, ordinal, body, Value::Null, 3)
}

#[test]
fn test_over_budget_queue_still_accepts_orders() {
    let mut queue = ProductionQueue::new(300);
    // 200 + 150 = 350 > 300.
    queue.queue("W1N1", order("harvester", 0, vec![BodyPart::Work, BodyPart::Work]));
    queue.queue("W1N1", order("hauler", 0, vec![BodyPart::Carry, BodyPart::Carry, BodyPart::Move]));
    assert_eq!(queue.budget("W1N1"), -50);
    assert!(!queue.can_take_orders("W1N1"));

    queue.queue("W1N1", order("scout", 0, vec![BodyPart::Move]));
    assert_eq!(queue.len(), 3);
    assert_eq!(queue.state("W1N1", "scout-0"), Some(OrderState::Queued));
    assert!(queue.can_take_orders("W2N2"));
}

#[test]
fn test_drain_parks_then_retries_first() {
    let mut queue = ProductionQueue::new(3000);
    queue.queue("W1N1", order("harvester", 0, vec![BodyPart::Work, BodyPart::Move]));
    let mut stations = vec![SimStation::new("spawn1", "W1N1", 100)];

    let report = queue.drain("W1N1", &mut StationPool::new(&mut stations));
    assert_eq!(report.processing, vec!["harvester-0".to_string()]);
    assert_eq!(queue.state("W1N1", "harvester-0"), Some(OrderState::Processing));

    queue.queue("W1N1", order("upgrader", 0, vec![BodyPart::Work, BodyPart::Move]));
    stations[0].budget = 1000;
    let report = queue.drain("W1N1", &mut StationPool::new(&mut stations));
    // The parked order goes first; the station is then busy for the new one.
    assert_eq!(report.dispatched, vec!["harvester-0".to_string()]);
    assert_eq!(report.failed, vec!["upgrader-0".to_string()]);
    assert_eq!(stations[0].produced, vec!["harvester-0:0".to_string()]);
    assert_eq!(queue.state("W1N1", "upgrader-0"), Some(OrderState::Failed));
}

#[test]
fn test_rejections_other_than_budget_fail() {
    let mut queue = ProductionQueue::new(3000);
    queue.queue("W1N1", order("claimer", 0, vec![BodyPart::Claim, BodyPart::Move]));
    let mut station = SimStation::new("spawn1", "W1N1", 5000);
    station.refuse = Some(ProductionRejection::Rejected("name taken".into()));
    let mut stations = vec![station];

    let report = queue.drain("W1N1", &mut StationPool::new(&mut stations));
    assert_eq!(report.failed, vec!["claimer-0".to_string()]);

    // Requeueing moves it back out of failed; an order lives in one list only.
    let again = queue.remove("W1N1", "claimer-0").unwrap();
    queue.queue("W1N1", again);
    assert_eq!(queue.state("W1N1", "claimer-0"), Some(OrderState::Queued));
    assert_eq!(queue.len(), 1);
}

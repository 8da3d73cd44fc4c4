//! End-to-end scenarios through the public engine operations.

use glam::DVec2;
use serde_json::json;

use crate::clock::Timestamp;
use crate::command::{Command, ControlCommand};
use crate::config::Tuning;
use crate::output::{GameEvent, OutboundMessage, Recipient, UNKNOWN_ATTACKER};
use crate::physics::angular_difference;
use crate::snapshot::SelfView;

use super::helpers::{hits, is_alive, run, spawn_at, step, test_engine, test_engine_with};

// =============================================================================
// Combat
// =============================================================================

#[test]
fn duel_from_launch_to_respawn() {
    let (mut engine, clock) = test_engine(1);
    let hunter = spawn_at(&mut engine, "hunter", DVec2::new(500.0, 1000.0), 80.0, 90.0);
    let prey = spawn_at(&mut engine, "prey", DVec2::new(800.0, 1000.0), 80.0, 0.0);

    engine.fire_torpedo(&hunter).unwrap();
    // 300 units at 30 u/s, 5 Hz ticks
    let events = run(&mut engine, &clock, 60, 0.2);
    let sunk = hits(&events);
    assert_eq!(sunk.len(), 1);
    assert_eq!(sunk[0].victim_id, prey);
    assert!(!is_alive(&engine, &prey));
    assert_eq!(engine.torpedo_count(), 0);

    let ready: Vec<_> = events
        .iter()
        .filter(|e| matches!(e, GameEvent::RespawnReady { .. }))
        .collect();
    assert!(ready.is_empty(), "respawn timer still running");

    let events = run(&mut engine, &clock, 50, 0.2);
    assert_eq!(
        events,
        vec![GameEvent::RespawnReady {
            player_id: prey.clone()
        }]
    );
    assert!(engine.request_respawn(&prey));
    assert!(is_alive(&engine, &prey));
}

#[test]
fn torpedo_passes_under_a_shallow_boat() {
    let (mut engine, clock) = test_engine(2);
    let hunter = spawn_at(&mut engine, "hunter", DVec2::new(500.0, 1000.0), 200.0, 90.0);
    let target = spawn_at(&mut engine, "target", DVec2::new(560.0, 1000.0), 50.0, 0.0);
    engine.fire_torpedo(&hunter);
    let events = run(&mut engine, &clock, 25, 0.2);
    assert!(hits(&events).is_empty());
    assert!(is_alive(&engine, &target));
}

#[test]
fn torpedo_hits_across_the_world_edge() {
    let (mut engine, clock) = test_engine(3);
    let hunter = spawn_at(&mut engine, "hunter", DVec2::new(1990.0, 1000.0), 50.0, 90.0);
    let target = spawn_at(&mut engine, "target", DVec2::new(20.0, 1000.0), 50.0, 0.0);
    engine.fire_torpedo(&hunter);
    let events = step(&mut engine, &clock, 1.0);
    assert_eq!(hits(&events)[0].victim_id, target);
}

#[test]
fn leaver_torpedo_still_counts() {
    let (mut engine, clock) = test_engine(4);
    let hunter = spawn_at(&mut engine, "hunter", DVec2::new(500.0, 1000.0), 50.0, 90.0);
    spawn_at(&mut engine, "prey", DVec2::new(560.0, 1000.0), 50.0, 0.0);
    engine.fire_torpedo(&hunter);
    engine.handle(&hunter, Command::Leave);

    let events = step(&mut engine, &clock, 2.0);
    let out = events[0].deliveries();
    let OutboundMessage::SubHit { attacker_username, .. } = &out[0].message else {
        panic!("expected sub_hit first");
    };
    assert_eq!(attacker_username, UNKNOWN_ATTACKER);
    assert_eq!(out[1].to, Recipient::Player(hunter));
}

#[test]
fn one_torpedo_one_kill() {
    let (mut engine, clock) = test_engine(5);
    let hunter = spawn_at(&mut engine, "hunter", DVec2::new(500.0, 1000.0), 50.0, 90.0);
    spawn_at(&mut engine, "first", DVec2::new(560.0, 1000.0), 50.0, 0.0);
    let second = spawn_at(&mut engine, "second", DVec2::new(620.0, 1000.0), 50.0, 0.0);
    engine.fire_torpedo(&hunter);
    let events = run(&mut engine, &clock, 25, 0.2);
    assert_eq!(hits(&events).len(), 1);
    assert!(is_alive(&engine, &second));
}

// =============================================================================
// Steering
// =============================================================================

#[test]
fn wire_controls_steer_the_boat() {
    let (mut engine, clock) = test_engine(6);
    let captain = spawn_at(&mut engine, "captain", DVec2::new(1000.0, 1000.0), 50.0, 0.0);
    let command = Command::from_wire(
        "update_controls",
        &json!({ "heading": "90", "speed": 4, "depth": 120 }),
    )
    .unwrap();
    assert!(engine.handle(&captain, command).is_empty());

    run(&mut engine, &clock, 50, 0.2);
    let sub = engine.player(&captain).unwrap();
    assert!((sub.heading() - 90.0).abs() < 1e-9);
    assert!((sub.speed() - 20.0).abs() < 1e-9);
    assert!((sub.depth() - 120.0).abs() < 1e-9);
}

#[test]
fn garbage_controls_change_nothing() {
    let (mut engine, clock) = test_engine(7);
    let captain = spawn_at(&mut engine, "captain", DVec2::new(1000.0, 1000.0), 50.0, 45.0);
    let command = Command::from_wire("update_controls", &json!({ "heading": "north", "speed": [] })).unwrap();
    engine.handle(&captain, command);
    engine.set_controls(&captain, &ControlCommand::default().with_depth(f64::NAN));
    run(&mut engine, &clock, 10, 0.2);
    let sub = engine.player(&captain).unwrap();
    assert_eq!(sub.position(), DVec2::new(1000.0, 1000.0));
    assert_eq!(sub.heading(), 45.0);
    assert_eq!(sub.depth(), 50.0);
}

// =============================================================================
// Sonar
// =============================================================================

#[test]
fn passive_range_edge_is_sharp() {
    let (mut engine, _) = test_engine(8);
    let range = Tuning::default().passive_sonar_range;
    let ear = spawn_at(&mut engine, "ear", DVec2::new(100.0, 1000.0), 50.0, 0.0);
    let near = spawn_at(&mut engine, "near", DVec2::new(100.0 + range - 1.0, 1000.0), 50.0, 0.0);
    spawn_at(&mut engine, "far", DVec2::new(100.0 + range + 1.0, 1000.0), 50.0, 0.0);

    for _ in 0..20 {
        let view = engine.get_snapshot(&ear).unwrap();
        assert_eq!(view.passive_contacts.len(), 1);
        assert_eq!(view.passive_contacts[0].id, near);
        assert!(view.sonar_contacts.is_empty());
    }
}

#[test]
fn passive_readings_stay_inside_the_noise_envelope() {
    let (mut engine, _) = test_engine(9);
    let t = Tuning::default();
    let ear = spawn_at(&mut engine, "ear", DVec2::new(1000.0, 1000.0), 50.0, 0.0);
    // Due north: true bearing 0, so the envelope straddles the wrap
    spawn_at(&mut engine, "target", DVec2::new(1000.0, 700.0), 50.0, 0.0);

    for _ in 0..200 {
        let contact = engine.get_snapshot(&ear).unwrap().passive_contacts.remove(0);
        assert!(contact.distance >= 300.0 * (1.0 - t.passive_noise_distance) - 1e-9);
        assert!(contact.distance <= 300.0 * (1.0 + t.passive_noise_distance) + 1e-9);
        assert!(angular_difference(contact.bearing, 0.0).abs() <= t.passive_noise_bearing + 1e-9);
        assert!((0.0..360.0).contains(&contact.bearing));
        assert_eq!(contact.depth, 50.0);
    }
}

#[test]
fn ping_is_one_way_until_answered() {
    let (mut engine, clock) = test_engine(10);
    let a = spawn_at(&mut engine, "a", DVec2::new(1000.0, 1000.0), 50.0, 0.0);
    let b = spawn_at(&mut engine, "b", DVec2::new(1100.0, 1000.0), 50.0, 0.0);

    let out = engine.handle(&a, Command::ActivePing);
    let OutboundMessage::SonarResult { contacts } = &out[0].message else {
        panic!("expected sonar_result");
    };
    assert_eq!(contacts[0].distance, 100.0);
    assert_eq!(contacts[0].bearing, 90.0);
    assert_eq!(out[1].to, Recipient::Player(b.clone()));

    // Outside the window b has only passive knowledge of a
    clock.set(Timestamp::from_secs(6.0));
    let view = engine.get_snapshot(&b).unwrap();
    assert!(view.sonar_contacts.is_empty());
    assert_eq!(view.passive_contacts.len(), 1);
}

#[test]
fn tight_sonar_tuning_is_honored() {
    let tuning = Tuning {
        sonar_range: 50.0,
        ..Tuning::default()
    };
    let (mut engine, _) = test_engine_with(tuning, 11);
    let a = spawn_at(&mut engine, "a", DVec2::new(1000.0, 1000.0), 50.0, 0.0);
    spawn_at(&mut engine, "b", DVec2::new(1100.0, 1000.0), 50.0, 0.0);
    assert!(engine.perform_active_ping(&a).contacts.is_empty());
}

// =============================================================================
// Snapshots
// =============================================================================

#[test]
fn dead_snapshot_leaks_no_position() {
    let (mut engine, clock) = test_engine(12);
    let hunter = spawn_at(&mut engine, "hunter", DVec2::new(500.0, 1000.0), 50.0, 90.0);
    let prey = spawn_at(&mut engine, "prey", DVec2::new(530.0, 1000.0), 50.0, 0.0);
    engine.fire_torpedo(&hunter);
    step(&mut engine, &clock, 1.0);

    let view = engine.get_snapshot(&prey).unwrap();
    assert!(matches!(view.you, SelfView::Dead { respawn_ready: false, .. }));
    let json = serde_json::to_value(&view).unwrap();
    for key in ["x", "y", "heading", "speed", "depth"] {
        assert!(json["you"].get(key).is_none(), "dead view leaked {key}");
    }
}

#[test]
fn state_update_serializes_with_type_tag() {
    let (mut engine, _) = test_engine(13);
    let a = spawn_at(&mut engine, "a", DVec2::new(1000.0, 1000.0), 50.0, 0.0);
    let view = engine.get_snapshot(&a).unwrap();
    let json = serde_json::to_value(OutboundMessage::StateUpdate(view)).unwrap();
    assert_eq!(json["type"], "state_update");
    assert_eq!(json["you"]["state"], "alive");
    assert_eq!(json["world"]["size"], 2000.0);
}

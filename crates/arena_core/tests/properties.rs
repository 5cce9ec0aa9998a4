//! Property-style checks over the physical rules and event ordering.

use arena_core::events::{Event, EventPayload, EventQueue, Outbox, RETENTION_TURNS};
use arena_core::math::{normalize_angle, normalize_bearing};
use arena_core::rules;
use proptest::prelude::*;

proptest! {
    #[test]
    fn prop_normalized_angles_stay_in_range(angle in -100.0f64..100.0) {
        let absolute = normalize_angle(angle);
        prop_assert!((0.0..std::f64::consts::TAU).contains(&absolute));

        let relative = normalize_bearing(angle);
        prop_assert!((-std::f64::consts::PI..std::f64::consts::PI).contains(&relative));
    }

    #[test]
    fn prop_bullet_velocity_monotonic_in_power(
        low in 0.1f64..2.9,
        delta in 0.01f64..0.1,
    ) {
        let high = (low + delta).min(3.0);
        prop_assert!(rules::bullet_velocity(high) < rules::bullet_velocity(low));
    }

    #[test]
    fn prop_bullet_damage_monotonic_in_power(
        low in 0.1f64..2.9,
        delta in 0.01f64..0.1,
    ) {
        let high = (low + delta).min(3.0);
        prop_assert!(rules::bullet_damage(high) > rules::bullet_damage(low));
    }

    #[test]
    fn prop_turn_rate_decreases_with_speed(
        slow in 0.0f64..7.9,
        delta in 0.01f64..0.1,
    ) {
        let fast = (slow + delta).min(8.0);
        prop_assert!(
            rules::turn_rate(fast, rules::MAX_TURN_RATE)
                < rules::turn_rate(slow, rules::MAX_TURN_RATE)
        );
    }

    #[test]
    fn prop_velocity_change_is_bounded(
        velocity in -8.0f64..8.0,
        distance in -200.0f64..200.0,
    ) {
        let next = rules::next_velocity(velocity, distance, rules::MAX_VELOCITY);
        prop_assert!(next.abs() <= rules::MAX_VELOCITY + 1e-9);
        // One turn changes speed by at most the braking rate.
        prop_assert!((next - velocity).abs() <= rules::DECELERATION + 1e-9);
    }

    #[test]
    fn prop_event_queue_sorted_after_refresh(
        turns in proptest::collection::vec(0u64..6, 1..40),
    ) {
        let now = 5;
        let outbox = Outbox::new();
        for (i, &turn) in turns.iter().enumerate() {
            // Alternate critical and non-critical kinds.
            let payload = if i % 3 == 0 {
                EventPayload::Victory
            } else if i % 3 == 1 {
                EventPayload::HitWall { bearing: 0.0 }
            } else {
                EventPayload::ScannedRobot {
                    name: "x".into(),
                    heading: 0.0,
                    energy: 0.0,
                    velocity: 0.0,
                    bearing: 0.0,
                    distance: 0.0,
                }
            };
            outbox.append(Event { turn, payload });
        }

        let mut queue = EventQueue::new();
        queue.refresh(&outbox, now);

        let mut drained = Vec::new();
        while let Some(event) = queue.pop() {
            drained.push(event);
        }
        // Sorted by the total order, nothing stale delivered.
        for pair in drained.windows(2) {
            prop_assert!(pair[0].sort_key() <= pair[1].sort_key());
        }
        for event in &drained {
            prop_assert!(now - event.turn <= RETENTION_TURNS);
        }
    }
}

//! Physical rules of the arena.
//!
//! Pure, stateless functions mapping velocity, turn and firepower inputs
//! to physical deltas. Every function asserts its preconditions: calling
//! one with an out-of-range argument is a programming error in the
//! engine, not a runtime condition to recover from.

use std::f64::consts::PI;

/// Velocity gained per turn while accelerating.
pub const ACCELERATION: f64 = 1.0;

/// Velocity shed per turn while braking.
pub const DECELERATION: f64 = 2.0;

/// Hard cap on a robot's speed, in units per turn.
pub const MAX_VELOCITY: f64 = 8.0;

/// Smallest accepted bullet power.
pub const MIN_BULLET_POWER: f64 = 0.1;

/// Largest accepted bullet power.
pub const MAX_BULLET_POWER: f64 = 3.0;

/// Body turn rate of a stationary robot, in radians per turn.
pub const MAX_TURN_RATE: f64 = 10.0 * PI / 180.0;

/// Gun turn rate, in radians per turn.
pub const GUN_TURN_RATE: f64 = 20.0 * PI / 180.0;

/// Gun heat shed per turn.
pub const GUN_COOLING_RATE: f64 = 0.1;

/// Radar turn rate, in radians per turn.
pub const RADAR_TURN_RATE: f64 = 45.0 * PI / 180.0;

/// Length of the radar scan arc, in units.
pub const RADAR_RANGE: f64 = 1200.0;

/// Energy both robots lose when they ram each other.
pub const ROBOT_HIT_DAMAGE: f64 = 0.6;

/// Strongest braking achievable within one turn at the given speed.
///
/// Midway through a turn a braking robot may cross zero velocity; the
/// remainder of the turn then accelerates in the opposite direction.
#[must_use]
pub fn max_deceleration(velocity: f64) -> f64 {
    let deceleration_time = velocity / DECELERATION;
    let acceleration_time = 1.0 - deceleration_time;
    deceleration_time.min(1.0) * DECELERATION + acceleration_time.max(0.0) * ACCELERATION
}

/// Highest speed from which the robot can still brake to a stop within
/// `distance` units.
#[must_use]
pub fn max_velocity_for(distance: f64) -> f64 {
    let deceleration_time = ((((4.0 * 2.0 / DECELERATION) * distance + 1.0).sqrt() - 1.0) / 2.0)
        .ceil()
        .max(1.0);
    if deceleration_time.is_infinite() {
        return MAX_VELOCITY;
    }
    let deceleration_distance = (deceleration_time / 2.0) * (deceleration_time - 1.0) * DECELERATION;
    (deceleration_time - 1.0) * DECELERATION + (distance - deceleration_distance) / deceleration_time
}

/// Velocity for the next turn given the current velocity, the distance
/// still to cover and the caller's velocity cap.
///
/// Follows a trapezoidal profile: accelerate by at most [`ACCELERATION`],
/// brake by at most [`DECELERATION`], and never overshoot the speed from
/// which the remaining distance can still be braked away.
#[must_use]
pub fn next_velocity(velocity: f64, distance: f64, max_velocity: f64) -> f64 {
    assert!(
        max_velocity.abs() <= MAX_VELOCITY,
        "velocity cap {max_velocity} above limit"
    );

    if distance < 0.0 {
        // Symmetric problem: flip the frame, solve forward, flip back.
        return -next_velocity(-velocity, -distance, max_velocity);
    }

    let goal_velocity = if distance.is_infinite() {
        max_velocity
    } else {
        max_velocity.min(max_velocity_for(distance))
    };

    if velocity >= 0.0 {
        (velocity - DECELERATION).max(goal_velocity.min(velocity + ACCELERATION))
    } else {
        (velocity - ACCELERATION).max(goal_velocity.min(velocity + max_deceleration(-velocity)))
    }
}

/// Distance covered while braking from `velocity` to a full stop.
#[must_use]
pub fn distance_until_stop(velocity: f64, max_velocity: f64) -> f64 {
    assert!(
        max_velocity.abs() <= MAX_VELOCITY,
        "velocity cap {max_velocity} above limit"
    );

    let mut distance = 0.0;
    let mut velocity = velocity.abs();
    while velocity > 0.0 {
        velocity = next_velocity(velocity, 0.0, max_velocity);
        distance += velocity;
    }
    distance
}

/// Achievable body turn this turn: faster robots turn slower.
#[must_use]
pub fn turn_rate(velocity: f64, max_turn_rate: f64) -> f64 {
    assert!(
        (-MAX_VELOCITY..=MAX_VELOCITY).contains(&velocity),
        "velocity {velocity} out of range"
    );
    assert!(
        max_turn_rate <= MAX_TURN_RATE,
        "turn rate cap {max_turn_rate} above limit"
    );
    max_turn_rate - (0.75 * velocity.abs()).to_radians()
}

/// Energy lost when driving into a wall at the given speed.
#[must_use]
pub fn wall_hit_damage(velocity: f64) -> f64 {
    assert!(
        (-MAX_VELOCITY..=MAX_VELOCITY).contains(&velocity),
        "velocity {velocity} out of range"
    );
    (velocity.abs() * 0.5 - 1.0).max(0.0)
}

/// Gun heat generated by firing at the given power.
#[must_use]
pub fn gun_heat(power: f64) -> f64 {
    assert_power(power);
    1.0 + power / 5.0
}

/// Energy a bullet of the given power takes from its victim.
#[must_use]
pub fn bullet_damage(power: f64) -> f64 {
    assert_power(power);
    4.0 * power + 2.0 * (power - 1.0).max(0.0)
}

/// Energy returned to the owner when its bullet connects.
#[must_use]
pub fn bullet_hit_bonus(power: f64) -> f64 {
    assert_power(power);
    3.0 * power
}

/// Bullet speed in units per turn. Higher power travels slower.
#[must_use]
pub fn bullet_velocity(power: f64) -> f64 {
    assert_power(power);
    20.0 - 3.0 * power
}

fn assert_power(power: f64) {
    assert!(
        (MIN_BULLET_POWER..=MAX_BULLET_POWER).contains(&power),
        "bullet power {power} out of range"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fire_scenario_values() {
        // Power 3: heat 1 + 3/5, speed 20 - 3*3, damage 4*3 + 2*2.
        assert!((gun_heat(3.0) - 1.6).abs() < 1e-12);
        assert!((bullet_velocity(3.0) - 11.0).abs() < 1e-12);
        assert!((bullet_damage(3.0) - 16.0).abs() < 1e-12);
        assert!((bullet_hit_bonus(3.0) - 9.0).abs() < 1e-12);
    }

    #[test]
    fn test_bullet_velocity_decreases_with_power() {
        let mut last = f64::INFINITY;
        let mut power = MIN_BULLET_POWER;
        while power <= MAX_BULLET_POWER {
            let v = bullet_velocity(power);
            assert!(v < last);
            last = v;
            power += 0.1;
        }
    }

    #[test]
    fn test_turn_rate_decreases_with_speed() {
        let mut last = f64::INFINITY;
        for v in 0..=8 {
            let rate = turn_rate(f64::from(v), MAX_TURN_RATE);
            assert!(rate < last, "turn rate must strictly decrease with speed");
            last = rate;
        }
        // Floor: full speed still leaves 4 degrees of turn.
        let floor = turn_rate(MAX_VELOCITY, MAX_TURN_RATE);
        assert!((floor - 4.0_f64.to_radians()).abs() < 1e-12);
    }

    #[test]
    fn test_wall_hit_damage() {
        assert_eq!(wall_hit_damage(0.0), 0.0);
        assert_eq!(wall_hit_damage(2.0), 0.0);
        assert!((wall_hit_damage(8.0) - 3.0).abs() < 1e-12);
        assert!((wall_hit_damage(-8.0) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_next_velocity_accelerates_toward_cap() {
        let mut v = 0.0;
        for expected in [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 8.0] {
            v = next_velocity(v, f64::INFINITY, MAX_VELOCITY);
            assert!((v - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn test_next_velocity_brakes_near_goal() {
        // One unit left to travel: the profile must not overshoot much.
        let v = next_velocity(8.0, 1.0, MAX_VELOCITY);
        assert!(v < 8.0, "must brake when the goal is close");
    }

    #[test]
    fn test_next_velocity_negative_distance_mirrors() {
        let forward = next_velocity(2.0, 10.0, MAX_VELOCITY);
        let backward = next_velocity(-2.0, -10.0, MAX_VELOCITY);
        assert!((forward + backward).abs() < 1e-12);
    }

    #[test]
    fn test_distance_until_stop() {
        assert_eq!(distance_until_stop(0.0, MAX_VELOCITY), 0.0);
        // From full speed: 6 + 4 + 2 + 0 = 12 units.
        assert!((distance_until_stop(8.0, MAX_VELOCITY) - 12.0).abs() < 1e-12);
        // Sign of the velocity is irrelevant.
        assert_eq!(
            distance_until_stop(-5.0, MAX_VELOCITY),
            distance_until_stop(5.0, MAX_VELOCITY)
        );
    }
}

//! The pending-intent batch an agent submits for upcoming turns.

use serde::{Deserialize, Serialize};

use crate::rules;

/// One agent's pending intents.
///
/// A command is overwritten wholesale every time the agent commits a new
/// batch, and consumed field by field as the scheduler applies partial
/// progress per turn: `move_distance` shrinks by the distance actually
/// covered, the turn fields shrink by the angle actually turned, `fire`
/// resets after the attempt and `scan` clears after the scan pass (and is
/// re-armed automatically by any movement).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    /// Distance still to drive; negative drives in reverse.
    pub move_distance: f64,
    /// Body turn still to apply, in radians; negative turns left.
    pub turn: f64,
    /// Gun turn still to apply, in radians.
    pub turn_gun: f64,
    /// Radar turn still to apply, in radians.
    pub turn_radar: f64,
    /// Requested firepower for the next shot; 0 holds fire.
    pub fire: f64,
    /// Whether to scan on the next pass.
    pub scan: bool,
    /// Per-turn velocity cap, at most [`rules::MAX_VELOCITY`].
    pub max_velocity: f64,
    /// Per-turn body-turn cap, at most [`rules::MAX_TURN_RATE`].
    pub max_turn_rate: f64,
    /// Whether body turns drag the gun along.
    pub lock_gun_to_body: bool,
    /// Whether gun turns drag the radar along.
    pub lock_radar_to_gun: bool,
    /// Whether body turns drag the radar along.
    pub lock_radar_to_body: bool,
}

impl Default for Command {
    fn default() -> Self {
        Self {
            move_distance: 0.0,
            turn: 0.0,
            turn_gun: 0.0,
            turn_radar: 0.0,
            fire: 0.0,
            scan: false,
            max_velocity: rules::MAX_VELOCITY,
            max_turn_rate: rules::MAX_TURN_RATE,
            lock_gun_to_body: true,
            lock_radar_to_gun: true,
            lock_radar_to_body: true,
        }
    }
}

impl Command {
    /// A command with no pending intents.
    #[must_use]
    pub fn idle() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_defaults() {
        let command = Command::idle();
        assert_eq!(command.move_distance, 0.0);
        assert_eq!(command.fire, 0.0);
        assert!(!command.scan);
        assert_eq!(command.max_velocity, rules::MAX_VELOCITY);
        assert_eq!(command.max_turn_rate, rules::MAX_TURN_RATE);
        assert!(command.lock_gun_to_body);
        assert!(command.lock_radar_to_gun);
        assert!(command.lock_radar_to_body);
    }
}

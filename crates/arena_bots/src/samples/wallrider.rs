//! Hugs the battlefield perimeter, firing inward as it goes.

use std::f64::consts::FRAC_PI_2;

use arena_core::math::normalize_bearing;
use arena_core::robot::RobotCore;

use crate::controls::{Controls, WaitUntil};
use crate::robot::Robot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Point the body along +y.
    Align,
    /// Drive to the wall ahead.
    Approach,
    /// Turn the corner.
    Corner,
    /// Run the current wall.
    Cruise,
}

/// Perimeter patrol. Aligns to an axis, drives wall to wall, and keeps
/// the gun perpendicular to its track so scans cover the interior.
#[derive(Debug)]
pub struct WallRider {
    phase: Phase,
}

impl Default for WallRider {
    fn default() -> Self {
        Self { phase: Phase::Align }
    }
}

impl Robot for WallRider {
    fn tick(&mut self, ctl: &mut Controls) {
        match self.phase {
            Phase::Align => {
                ctl.turn(-normalize_bearing(ctl.heading()));
                ctl.wait_until(WaitUntil::TurnDone);
                self.phase = Phase::Approach;
            }
            Phase::Approach => {
                let ahead = ctl.battlefield().height - RobotCore::HALF_HEIGHT - ctl.y();
                ctl.move_ahead(ahead);
                ctl.wait_until(WaitUntil::MoveDone);
                self.phase = Phase::Corner;
            }
            Phase::Corner => {
                // Gun swings inward while the body turns the corner.
                ctl.lock_gun_to_body(false);
                ctl.turn(FRAC_PI_2);
                ctl.turn_gun(-FRAC_PI_2);
                ctl.wait_until(WaitUntil::TurnDone);
                self.phase = Phase::Cruise;
            }
            Phase::Cruise => {
                let field = ctl.battlefield();
                let run = field.width.max(field.height);
                ctl.move_ahead(run);
                ctl.wait_until(WaitUntil::MoveDone);
                self.phase = Phase::Corner;
            }
        }
    }

    fn on_scanned_robot(
        &mut self,
        ctl: &mut Controls,
        _name: &str,
        _heading: f64,
        _energy: f64,
        _velocity: f64,
        _bearing: f64,
        _distance: f64,
    ) {
        ctl.fire(2.0);
    }

    fn on_hit_robot(
        &mut self,
        ctl: &mut Controls,
        _name: &str,
        _energy: f64,
        bearing: f64,
        _guilty: bool,
    ) {
        // Something is parked on our track: blast it and push through.
        if bearing.abs() < FRAC_PI_2 {
            ctl.fire(3.0);
        }
    }
}

//! Chases whatever it scans and rams it, firing point-blank.

use crate::controls::Controls;
use crate::robot::Robot;

/// Aggressive chaser. Spins in place until the radar finds a target,
/// then charges its bearing; contact is answered with a point-blank
/// shot.
#[derive(Debug, Default)]
pub struct Rammer;

impl Robot for Rammer {
    fn tick(&mut self, ctl: &mut Controls) {
        // Keep sweeping while there is no charge in progress.
        if ctl.status().action.move_distance == 0.0 {
            ctl.turn(10.0_f64.to_radians());
        }
    }

    fn on_scanned_robot(
        &mut self,
        ctl: &mut Controls,
        _name: &str,
        _heading: f64,
        _energy: f64,
        _velocity: f64,
        bearing: f64,
        distance: f64,
    ) {
        ctl.turn(bearing);
        // Overshoot a little so the bumper actually connects.
        ctl.move_ahead(distance + 5.0);
    }

    fn on_hit_robot(
        &mut self,
        ctl: &mut Controls,
        _name: &str,
        energy: f64,
        _bearing: f64,
        _guilty: bool,
    ) {
        // Finish a weakened target, otherwise keep shots cheap.
        if energy < 16.0 {
            ctl.fire(3.0);
        } else {
            ctl.fire(1.0);
        }
    }
}

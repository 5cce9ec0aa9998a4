//! Drives in a tight circle and fires at whatever the radar sweeps
//! over.

use crate::controls::Controls;
use crate::robot::Robot;

/// Circle-strafing strategy. With gun and radar locked to the body, the
/// constant turn sweeps the radar; anything scanned is roughly dead
/// ahead.
#[derive(Debug, Default)]
pub struct Spinner;

impl Robot for Spinner {
    fn tick(&mut self, ctl: &mut Controls) {
        ctl.turn(10.0_f64.to_radians());
        ctl.move_ahead(20.0);
    }

    fn on_scanned_robot(
        &mut self,
        ctl: &mut Controls,
        _name: &str,
        _heading: f64,
        _energy: f64,
        _velocity: f64,
        _bearing: f64,
        distance: f64,
    ) {
        // Close targets deserve the heavy shot.
        if distance < 100.0 {
            ctl.fire(3.0);
        } else {
            ctl.fire(1.0);
        }
    }
}

//! Sits still and sweeps the gun until something crosses the radar.

use crate::controls::Controls;
use crate::robot::Robot;

/// Stationary gunner. The radar stays locked to the gun, so the slow
/// gun sweep doubles as the search pattern; firepower scales down as
/// energy runs low.
#[derive(Debug, Default)]
pub struct Turret;

impl Robot for Turret {
    fn tick(&mut self, ctl: &mut Controls) {
        ctl.turn_gun(5.0_f64.to_radians());
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
        let power = if ctl.energy() > 20.0 { 3.0 } else { 1.0 };
        ctl.fire(power);
    }
}

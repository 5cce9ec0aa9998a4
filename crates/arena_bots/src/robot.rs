//! The strategy interface: one required per-turn method plus event
//! hooks with no-op defaults.

use arena_core::events::BulletSnapshot;
use arena_core::robot::RobotStatus;

use crate::controls::Controls;

/// A robot strategy.
///
/// The runner calls [`tick`](Self::tick) once per turn (unless the
/// strategy is waiting on a condition), commits the queued intents,
/// blocks until the turn resolves, then dispatches the turn's events to
/// the hooks. Strategies implement only the hooks they need; everything
/// defaults to doing nothing.
pub trait Robot: Send {
    /// One turn of strategy logic: inspect the world, queue intents.
    fn tick(&mut self, ctl: &mut Controls);

    /// Fresh status snapshot at the start of a turn.
    fn on_status(&mut self, ctl: &mut Controls, status: &RobotStatus) {
        let _ = (ctl, status);
    }

    /// The radar swept over another robot.
    fn on_scanned_robot(
        &mut self,
        ctl: &mut Controls,
        name: &str,
        heading: f64,
        energy: f64,
        velocity: f64,
        bearing: f64,
        distance: f64,
    ) {
        let _ = (ctl, name, heading, energy, velocity, bearing, distance);
    }

    /// An enemy bullet hit us.
    fn on_hit_by_bullet(&mut self, ctl: &mut Controls, bearing: f64, bullet: &BulletSnapshot) {
        let _ = (ctl, bearing, bullet);
    }

    /// We collided with another robot.
    fn on_hit_robot(
        &mut self,
        ctl: &mut Controls,
        name: &str,
        energy: f64,
        bearing: f64,
        guilty: bool,
    ) {
        let _ = (ctl, name, energy, bearing, guilty);
    }

    /// We drove into a wall.
    fn on_hit_wall(&mut self, ctl: &mut Controls, bearing: f64) {
        let _ = (ctl, bearing);
    }

    /// One of our bullets hit a robot.
    fn on_bullet_hit(
        &mut self,
        ctl: &mut Controls,
        victim: &str,
        victim_energy: f64,
        bullet: &BulletSnapshot,
    ) {
        let _ = (ctl, victim, victim_energy, bullet);
    }

    /// One of our bullets collided with another bullet.
    fn on_bullet_hit_bullet(
        &mut self,
        ctl: &mut Controls,
        bullet: &BulletSnapshot,
        other: &BulletSnapshot,
    ) {
        let _ = (ctl, bullet, other);
    }

    /// One of our bullets left the battlefield.
    fn on_bullet_missed(&mut self, ctl: &mut Controls, bullet: &BulletSnapshot) {
        let _ = (ctl, bullet);
    }

    /// Another robot was destroyed.
    fn on_robot_death(&mut self, ctl: &mut Controls, name: &str) {
        let _ = (ctl, name);
    }

    /// We were destroyed.
    fn on_death(&mut self, ctl: &mut Controls) {
        let _ = ctl;
    }

    /// A registered custom predicate became true.
    fn on_custom(&mut self, ctl: &mut Controls, name: &str) {
        let _ = (ctl, name);
    }

    /// We were left out of a turn's physics pass.
    fn on_skipped_turn(&mut self, ctl: &mut Controls, skipped: u64) {
        let _ = (ctl, skipped);
    }

    /// We are the last robot standing.
    fn on_victory(&mut self, ctl: &mut Controls) {
        let _ = ctl;
    }
}

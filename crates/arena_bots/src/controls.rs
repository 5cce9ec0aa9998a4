//! The per-agent facade: read-only world accessors, intent queueing and
//! the control loop that drives a strategy.

use arena_core::command::Command;
use arena_core::config::Battlefield;
use arena_core::error::ExecutionError;
use arena_core::events::{EventPayload, EventQueue};
use arena_core::link::AgentLink;
use arena_core::robot::{CustomPredicate, RobotStatus};
use arena_core::rules;
use arena_core::stats::Statistics;

use crate::robot::Robot;

/// A condition the control loop waits on between turns.
///
/// While a wait is pending the runner keeps committing the outstanding
/// command once per turn without calling the strategy's `tick` - a
/// busy-wait synchronized to turn boundaries. Events still dispatch
/// normally while waiting.
pub enum WaitUntil {
    /// The pending move distance is fully worked off.
    MoveDone,
    /// The pending body turn is fully worked off.
    TurnDone,
    /// The pending gun turn is fully worked off.
    GunTurnDone,
    /// The pending radar turn is fully worked off.
    RadarTurnDone,
    /// An arbitrary condition over the fresh status snapshot.
    Predicate(Box<dyn Fn(&RobotStatus) -> bool + Send>),
}

impl WaitUntil {
    fn satisfied(&self, status: &RobotStatus) -> bool {
        match self {
            Self::MoveDone => status.action.move_distance == 0.0,
            Self::TurnDone => status.action.turn == 0.0,
            Self::GunTurnDone => status.action.turn_gun == 0.0,
            Self::RadarTurnDone => status.action.turn_radar == 0.0,
            Self::Predicate(predicate) => predicate(status),
        }
    }
}

/// Coerce invalid numeric intents to a neutral value.
fn sanitize(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// The facade a strategy issues intents against.
///
/// Wraps the core's agent link with a local command buffer: intent
/// setters only touch the buffer, and the buffer is committed wholesale
/// by [`execute`](Self::execute). After each commit the buffer resyncs
/// to the remaining command progress, so partially worked-off intents
/// carry over.
pub struct Controls {
    link: AgentLink,
    command: Command,
    queue: EventQueue,
    wait: Option<WaitUntil>,
}

impl Controls {
    /// Wrap an agent link.
    #[must_use]
    pub fn new(link: AgentLink) -> Self {
        Self {
            link,
            command: Command::idle(),
            queue: EventQueue::new(),
            wait: None,
        }
    }

    // ------------------------------------------------------------------
    // Read-only world access
    // ------------------------------------------------------------------

    /// Our display name.
    #[must_use]
    pub fn name(&self) -> String {
        self.link.name()
    }

    /// Current x position.
    #[must_use]
    pub fn x(&self) -> f64 {
        self.link.x()
    }

    /// Current y position.
    #[must_use]
    pub fn y(&self) -> f64 {
        self.link.y()
    }

    /// Current body heading.
    #[must_use]
    pub fn heading(&self) -> f64 {
        self.link.heading()
    }

    /// Current gun heading.
    #[must_use]
    pub fn gun_heading(&self) -> f64 {
        self.link.gun_heading()
    }

    /// Current radar heading.
    #[must_use]
    pub fn radar_heading(&self) -> f64 {
        self.link.radar_heading()
    }

    /// Remaining energy.
    #[must_use]
    pub fn energy(&self) -> f64 {
        self.link.energy()
    }

    /// Current gun heat; firing needs exactly 0.
    #[must_use]
    pub fn gun_heat(&self) -> f64 {
        self.link.gun_heat()
    }

    /// Current velocity.
    #[must_use]
    pub fn velocity(&self) -> f64 {
        self.link.velocity()
    }

    /// Whether we are out of energy but alive.
    #[must_use]
    pub fn disabled(&self) -> bool {
        self.link.disabled()
    }

    /// Whether we are destroyed.
    #[must_use]
    pub fn dead(&self) -> bool {
        self.link.dead()
    }

    /// Battlefield dimensions.
    #[must_use]
    pub fn battlefield(&self) -> Battlefield {
        self.link.battlefield()
    }

    /// Battle statistics snapshot.
    #[must_use]
    pub fn statistics(&self) -> Statistics {
        self.link.statistics()
    }

    /// Full status snapshot.
    #[must_use]
    pub fn status(&self) -> RobotStatus {
        self.link.status()
    }

    // ------------------------------------------------------------------
    // Intents
    // ------------------------------------------------------------------

    /// Drive forward by `distance` units over the coming turns.
    pub fn move_ahead(&mut self, distance: f64) {
        if !self.disabled() {
            self.command.move_distance = sanitize(distance);
        }
    }

    /// Drive backward by `distance` units over the coming turns.
    pub fn move_back(&mut self, distance: f64) {
        self.move_ahead(-distance);
    }

    /// Turn the body by `radians` (clockwise positive).
    pub fn turn(&mut self, radians: f64) {
        if !self.disabled() {
            self.command.turn = sanitize(radians);
        }
    }

    /// Turn the gun by `radians`.
    pub fn turn_gun(&mut self, radians: f64) {
        self.command.turn_gun = sanitize(radians);
    }

    /// Turn the radar by `radians`.
    pub fn turn_radar(&mut self, radians: f64) {
        self.command.turn_radar = sanitize(radians);
    }

    /// Request a shot at the given power on the next turn.
    pub fn fire(&mut self, power: f64) {
        self.command.fire = sanitize(power);
    }

    /// Arm a radar scan for the next turn.
    pub fn scan(&mut self) {
        self.command.scan = true;
    }

    /// Cap our speed for the coming turns.
    pub fn set_max_velocity(&mut self, velocity: f64) {
        self.command.max_velocity = sanitize(velocity).abs().min(rules::MAX_VELOCITY);
    }

    /// Cap our body turn rate for the coming turns.
    pub fn set_max_turn_rate(&mut self, turn_rate: f64) {
        self.command.max_turn_rate = sanitize(turn_rate).abs().min(rules::MAX_TURN_RATE);
    }

    /// Couple or decouple the gun from body turns.
    pub fn lock_gun_to_body(&mut self, locked: bool) {
        self.command.lock_gun_to_body = locked;
    }

    /// Couple or decouple the radar from gun turns.
    pub fn lock_radar_to_gun(&mut self, locked: bool) {
        self.command.lock_radar_to_gun = locked;
    }

    /// Couple or decouple the radar from body turns.
    pub fn lock_radar_to_body(&mut self, locked: bool) {
        self.command.lock_radar_to_body = locked;
    }

    /// Skip `tick` until the condition holds, committing the current
    /// command once per turn in the meantime.
    pub fn wait_until(&mut self, condition: WaitUntil) {
        self.wait = Some(condition);
    }

    /// Shorthand for waiting on an arbitrary status predicate.
    pub fn wait_for(&mut self, predicate: impl Fn(&RobotStatus) -> bool + Send + 'static) {
        self.wait = Some(WaitUntil::Predicate(Box::new(predicate)));
    }

    /// Register a named predicate over our status snapshot; a Custom
    /// event fires each turn it holds.
    pub fn add_custom_event(&mut self, name: impl Into<String>, predicate: CustomPredicate) {
        self.link.add_custom_event(name, predicate);
    }

    /// Remove a previously registered predicate.
    pub fn remove_custom_event(&mut self, name: &str) {
        self.link.remove_custom_event(name);
    }

    // ------------------------------------------------------------------
    // Turn plumbing
    // ------------------------------------------------------------------

    /// Commit the buffered command and block until the turn resolves.
    ///
    /// # Errors
    ///
    /// Propagates the core's execution failures; both mean the control
    /// loop should stop cleanly.
    pub fn execute(&mut self) -> Result<RobotStatus, ExecutionError> {
        let status = self.link.execute(self.command.clone())?;
        self.command = status.action.clone();
        Ok(status)
    }

    fn clear_wait_if_satisfied(&mut self, status: &RobotStatus) {
        if let Some(wait) = &self.wait {
            if wait.satisfied(status) {
                self.wait = None;
            }
        }
    }

    fn waiting(&self) -> bool {
        self.wait.is_some()
    }

    /// Drain the work queue and dispatch every event to the strategy's
    /// hooks, in delivery order.
    pub fn dispatch_events(&mut self, bot: &mut dyn Robot) {
        self.link.refresh_events(&mut self.queue);
        while let Some(event) = self.queue.pop() {
            match event.payload {
                EventPayload::BulletHit {
                    victim,
                    victim_energy,
                    bullet,
                } => bot.on_bullet_hit(self, &victim, victim_energy, &bullet),
                EventPayload::BulletHitBullet { bullet, other } => {
                    bot.on_bullet_hit_bullet(self, &bullet, &other);
                }
                EventPayload::BulletMissed { bullet } => bot.on_bullet_missed(self, &bullet),
                EventPayload::Death => bot.on_death(self),
                EventPayload::Custom { name } => bot.on_custom(self, &name),
                EventPayload::HitByBullet { bearing, bullet } => {
                    bot.on_hit_by_bullet(self, bearing, &bullet);
                }
                EventPayload::HitRobot {
                    name,
                    energy,
                    bearing,
                    guilty,
                } => bot.on_hit_robot(self, &name, energy, bearing, guilty),
                EventPayload::HitWall { bearing } => bot.on_hit_wall(self, bearing),
                EventPayload::RobotDeath { name } => bot.on_robot_death(self, &name),
                EventPayload::ScannedRobot {
                    name,
                    heading,
                    energy,
                    velocity,
                    bearing,
                    distance,
                } => bot.on_scanned_robot(self, &name, heading, energy, velocity, bearing, distance),
                EventPayload::SkippedTurn { skipped } => bot.on_skipped_turn(self, skipped),
                EventPayload::Status { status } => bot.on_status(self, &status),
                EventPayload::Victory => bot.on_victory(self),
            }
        }
    }
}

/// Drive a strategy on its control thread until the battle shuts it
/// down.
///
/// This is the body handed to the core as the agent's control thread:
/// dispatch the seeded first-turn events, then loop - run one `tick` of
/// strategy logic (unless waiting), commit, block until the turn
/// resolves, dispatch the new events. An execution failure means the
/// robot died or the battle is over; either way the loop exits cleanly.
pub fn run_robot<R: Robot>(mut bot: R, link: AgentLink) {
    let name = link.name();
    let mut ctl = Controls::new(link);

    // The initial Status event is queued before control logic starts.
    ctl.dispatch_events(&mut bot);

    loop {
        if !ctl.waiting() {
            bot.tick(&mut ctl);
        }
        match ctl.execute() {
            Ok(status) => {
                ctl.clear_wait_if_satisfied(&status);
                ctl.dispatch_events(&mut bot);
            }
            Err(err) => {
                tracing::debug!(robot = %name, %err, "control loop stopping");
                break;
            }
        }
    }

    // One last drain: death and victory often land on the final turn.
    ctl.dispatch_events(&mut bot);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_coerces_non_finite() {
        assert_eq!(sanitize(f64::NAN), 0.0);
        assert_eq!(sanitize(f64::INFINITY), 0.0);
        assert_eq!(sanitize(f64::NEG_INFINITY), 0.0);
        assert_eq!(sanitize(42.5), 42.5);
    }

    #[test]
    fn test_wait_conditions_read_command_progress() {
        let mut status = RobotStatus::default();
        status.action.move_distance = 10.0;
        assert!(!WaitUntil::MoveDone.satisfied(&status));
        status.action.move_distance = 0.0;
        assert!(WaitUntil::MoveDone.satisfied(&status));

        status.action.turn_gun = 0.5;
        assert!(!WaitUntil::GunTurnDone.satisfied(&status));
        status.action.turn_gun = 0.0;
        assert!(WaitUntil::GunTurnDone.satisfied(&status));

        let low_energy = WaitUntil::Predicate(Box::new(|s| s.energy < 10.0));
        status.energy = 50.0;
        assert!(!low_energy.satisfied(&status));
        status.energy = 5.0;
        assert!(low_energy.satisfied(&status));
    }
}

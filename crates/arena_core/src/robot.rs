//! The robot entity: an agent's physical state machine, its pending
//! command and its event outbox.
//!
//! A robot is owned exclusively by the battle loop for mutation; agents
//! and renderers only ever see it through read-only accessors taken
//! under the world snapshot lock. Robots are created once at battle
//! setup and never removed - a destroyed robot is marked dead and
//! skipped, which keeps ids stable for the whole battle.

use std::collections::BTreeMap;
use std::f64::consts::{FRAC_PI_2, PI, TAU};
use std::fmt;
use std::sync::Arc;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::bullet::BulletCore;
use crate::command::Command;
use crate::config::Battlefield;
use crate::error::BattleError;
use crate::events::{Event, EventPayload, Outbox};
use crate::geom::{Rect, ScanArc};
use crate::math::{normalize_angle, normalize_bearing, pair_mut, sign};
use crate::rules;

/// Index of a robot in the battle's collections.
///
/// Stable for the whole battle: dead robots are skipped, never removed.
pub type RobotId = usize;

/// Tolerance absorbing floating-point drift at axis-aligned wall
/// approaches. A tunable constant, not an exact physical threshold.
pub const WALL_EPSILON: f64 = 1e-10;

/// How many placement resamples to attempt before giving up.
const PLACEMENT_ATTEMPTS: u32 = 1_000;

/// Physical state tag of a robot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RobotState {
    /// Alive and unobstructed.
    Active,
    /// Collided with a wall this turn.
    HitWall,
    /// Collided with another robot this turn.
    HitRobot,
    /// Destroyed.
    Dead,
}

/// The fixed field set agents observe through the Status event and the
/// general accessors.
///
/// The `action` field carries the outstanding command progress: its
/// move/turn fields stay nonzero while that intent is still being worked
/// off.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RobotStatus {
    /// Turn the snapshot was taken on.
    pub turn: u64,
    /// Display name.
    pub name: String,
    /// X position.
    pub x: f64,
    /// Y position.
    pub y: f64,
    /// Body heading.
    pub heading: f64,
    /// Gun heading.
    pub gun_heading: f64,
    /// Radar heading.
    pub radar_heading: f64,
    /// Remaining energy.
    pub energy: f64,
    /// Gun heat; the gun can fire only at exactly 0.
    pub gun_heat: f64,
    /// Current velocity.
    pub velocity: f64,
    /// Whether the robot is out of energy but alive.
    pub disabled: bool,
    /// Whether the robot is destroyed.
    pub dead: bool,
    /// Outstanding command progress.
    pub action: Command,
}

/// A named condition evaluated against the robot's own status snapshot
/// once per turn; when it holds, a Custom event is filed.
pub type CustomPredicate = Box<dyn Fn(&RobotStatus) -> bool + Send + Sync>;

/// One combatant's physical state.
pub struct RobotCore {
    pub(crate) name: String,
    pub(crate) x: f64,
    pub(crate) y: f64,
    pub(crate) heading: f64,
    pub(crate) gun_heading: f64,
    pub(crate) radar_heading: f64,
    pub(crate) energy: f64,
    pub(crate) gun_heat: f64,
    pub(crate) velocity: f64,
    pub(crate) state: RobotState,
    pub(crate) command: Command,
    pub(crate) in_collision: bool,
    pub(crate) over_driving: bool,
    pub(crate) outbox: Arc<Outbox>,
    pub(crate) custom_events: BTreeMap<String, CustomPredicate>,
    pub(crate) rect: Rect,
    pub(crate) scan_arc: ScanArc,
}

impl RobotCore {
    /// Robot bounding-box width.
    pub const WIDTH: f64 = 36.0;
    /// Robot bounding-box height.
    pub const HEIGHT: f64 = 36.0;
    /// Half of [`Self::WIDTH`].
    pub const HALF_WIDTH: f64 = 18.0;
    /// Half of [`Self::HEIGHT`].
    pub const HALF_HEIGHT: f64 = 18.0;

    /// Place a new robot at a randomized position whose bounding box
    /// intersects none of the robots already placed.
    pub(crate) fn spawn<R: Rng>(
        name: String,
        battlefield: &Battlefield,
        placed: &[RobotCore],
        outbox: Arc<Outbox>,
        rng: &mut R,
    ) -> Result<Self, BattleError> {
        let heading = rng.random_range(0.0..TAU);
        let mut robot = Self {
            name,
            x: 0.0,
            y: 0.0,
            heading,
            gun_heading: heading,
            radar_heading: heading,
            energy: 100.0,
            gun_heat: 3.0,
            velocity: 0.0,
            state: RobotState::Active,
            command: Command::idle(),
            in_collision: false,
            over_driving: false,
            outbox,
            custom_events: BTreeMap::new(),
            rect: Rect::from_center(0.0, 0.0, Self::HALF_WIDTH, Self::HALF_HEIGHT),
            scan_arc: ScanArc::new(0.0, 0.0, heading, heading, rules::RADAR_RANGE),
        };

        for _ in 0..PLACEMENT_ATTEMPTS {
            robot.x = rng.random_range(Self::HALF_WIDTH..=battlefield.width - Self::HALF_WIDTH);
            robot.y = rng.random_range(Self::HALF_HEIGHT..=battlefield.height - Self::HALF_HEIGHT);
            robot.update_rect();
            if placed.iter().all(|other| !robot.rect.intersects(&other.rect)) {
                robot.update_scan_arc(robot.radar_heading);
                return Ok(robot);
            }
        }
        Err(BattleError::PlacementFailed(robot.name, PLACEMENT_ATTEMPTS))
    }

    /// Display name, unique within the battle.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// X position.
    #[must_use]
    pub fn x(&self) -> f64 {
        self.x
    }

    /// Y position.
    #[must_use]
    pub fn y(&self) -> f64 {
        self.y
    }

    /// Body heading in `[0, 2pi)`.
    #[must_use]
    pub fn heading(&self) -> f64 {
        self.heading
    }

    /// Gun heading in `[0, 2pi)`.
    #[must_use]
    pub fn gun_heading(&self) -> f64 {
        self.gun_heading
    }

    /// Radar heading in `[0, 2pi)`.
    #[must_use]
    pub fn radar_heading(&self) -> f64 {
        self.radar_heading
    }

    /// Remaining energy.
    #[must_use]
    pub fn energy(&self) -> f64 {
        self.energy
    }

    /// Current gun heat.
    #[must_use]
    pub fn gun_heat(&self) -> f64 {
        self.gun_heat
    }

    /// Current velocity.
    #[must_use]
    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    /// Physical state tag.
    #[must_use]
    pub fn state(&self) -> RobotState {
        self.state
    }

    /// Cached bounding box. Exposed for rendering.
    #[must_use]
    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// Cached scan arc. Exposed for rendering.
    #[must_use]
    pub fn scan_arc(&self) -> ScanArc {
        self.scan_arc
    }

    /// Out of energy but alive: may turn, cannot move or fire.
    #[must_use]
    pub fn disabled(&self) -> bool {
        self.energy == 0.0 && !self.dead()
    }

    /// Whether the robot has been destroyed.
    #[must_use]
    pub fn dead(&self) -> bool {
        self.state == RobotState::Dead
    }

    /// Snapshot of the full status payload at `turn`.
    #[must_use]
    pub fn status(&self, turn: u64) -> RobotStatus {
        RobotStatus {
            turn,
            name: self.name.clone(),
            x: self.x,
            y: self.y,
            heading: self.heading,
            gun_heading: self.gun_heading,
            radar_heading: self.radar_heading,
            energy: self.energy,
            gun_heat: self.gun_heat,
            velocity: self.velocity,
            disabled: self.disabled(),
            dead: self.dead(),
            action: self.command.clone(),
        }
    }

    pub(crate) fn add_event(&self, payload: EventPayload, turn: u64) {
        self.outbox.append(Event { turn, payload });
    }

    pub(crate) fn add_custom_predicate(&mut self, name: String, predicate: CustomPredicate) {
        self.custom_events.insert(name, predicate);
    }

    pub(crate) fn remove_custom_predicate(&mut self, name: &str) {
        self.custom_events.remove(name);
    }

    /// Attempt to fire the pending shot.
    ///
    /// The shot is accepted only with the gun fully cooled and the power,
    /// clamped to what the rules and remaining energy allow, at or above
    /// the minimum. The fire intent always resets after the attempt -
    /// fire-and-forget, never retried.
    pub(crate) fn fire(&mut self, owner: RobotId, turn: u64) -> Option<BulletCore> {
        debug_assert!(!self.dead());

        let power = rules::MAX_BULLET_POWER.min(self.energy).min(self.command.fire);
        let bullet = if power >= rules::MIN_BULLET_POWER && self.gun_heat == 0.0 {
            let _ = self.apply_energy(-power);
            self.gun_heat = rules::gun_heat(power);
            tracing::debug!(robot = %self.name, power, "bullet fired");
            Some(BulletCore::new(owner, self.x, self.y, self.gun_heading, power))
        } else {
            None
        };
        self.command.fire = 0.0;
        bullet
    }

    /// Apply an energy delta, flooring at 0.
    ///
    /// Hitting 0 immediately clears the pending move and body-turn
    /// intents. Returns whether energy sits at 0 afterwards, so callers
    /// with kill semantics can turn the hit into a death.
    pub(crate) fn apply_energy(&mut self, delta: f64) -> bool {
        self.energy = (self.energy + delta).max(0.0);
        if self.energy == 0.0 {
            self.command.move_distance = 0.0;
            self.command.turn = 0.0;
            true
        } else {
            false
        }
    }

    fn update_gun_heat(&mut self) {
        self.gun_heat = (self.gun_heat - rules::GUN_COOLING_RATE).max(0.0);
    }

    fn update_heading(&mut self) {
        let max_turn = rules::turn_rate(self.velocity, self.command.max_turn_rate);
        let angle = self.command.turn.max(-max_turn).min(max_turn);
        self.heading = normalize_angle(self.heading + angle);
        if self.command.lock_gun_to_body {
            self.gun_heading = normalize_angle(self.gun_heading + angle);
        }
        if self.command.lock_radar_to_body {
            self.radar_heading = normalize_angle(self.radar_heading + angle);
        }
        self.command.turn -= angle;
    }

    fn update_gun_heading(&mut self) {
        let angle = self
            .command
            .turn_gun
            .max(-rules::GUN_TURN_RATE)
            .min(rules::GUN_TURN_RATE);
        self.gun_heading = normalize_angle(self.gun_heading + angle);
        if self.command.lock_radar_to_gun {
            self.radar_heading = normalize_angle(self.radar_heading + angle);
        }
        self.command.turn_gun -= angle;
    }

    fn update_radar_heading(&mut self) {
        let angle = self
            .command
            .turn_radar
            .max(-rules::RADAR_TURN_RATE)
            .min(rules::RADAR_TURN_RATE);
        self.radar_heading = normalize_angle(self.radar_heading + angle);
        self.command.turn_radar -= angle;
    }

    fn update_velocity(&mut self) {
        self.velocity =
            rules::next_velocity(self.velocity, self.command.move_distance, self.command.max_velocity);
    }

    fn update_coordinates(&mut self) {
        if self.velocity == 0.0 && self.over_driving {
            self.command.move_distance = 0.0;
            self.over_driving = false;
        }

        if sign(self.command.move_distance * self.velocity) != -1 {
            self.over_driving = rules::distance_until_stop(self.velocity, self.command.max_velocity)
                > self.command.move_distance.abs();
        }

        if self.velocity != 0.0 {
            self.x += self.velocity * self.heading.sin();
            self.y += self.velocity * self.heading.cos();
            self.update_rect();
        }
        self.command.move_distance -= self.velocity;
    }

    fn update_rect(&mut self) {
        self.rect = Rect::from_center(self.x, self.y, Self::HALF_WIDTH, Self::HALF_HEIGHT);
    }

    fn update_scan_arc(&mut self, start_heading: f64) {
        self.scan_arc = ScanArc::new(
            self.x,
            self.y,
            start_heading,
            self.radar_heading,
            rules::RADAR_RANGE,
        );
    }

    fn check_wall_collision(&mut self, battlefield: &Battlefield, turn: u64) {
        let min_x = Self::HALF_WIDTH;
        let min_y = Self::HALF_HEIGHT;
        let max_x = battlefield.width - Self::HALF_WIDTH;
        let max_y = battlefield.height - Self::HALF_HEIGHT;

        let mut hit_wall = false;
        let mut adjust_x = 0.0;
        let mut adjust_y = 0.0;
        let mut bearing = 0.0;

        if self.x + WALL_EPSILON < min_x {
            hit_wall = true;
            adjust_x = min_x - self.x;
            bearing = normalize_bearing(270.0_f64.to_radians() - self.heading);
        } else if self.x - WALL_EPSILON > max_x {
            hit_wall = true;
            adjust_x = max_x - self.x;
            bearing = normalize_bearing(90.0_f64.to_radians() - self.heading);
        } else if self.y + WALL_EPSILON < min_y {
            hit_wall = true;
            adjust_y = min_y - self.y;
            bearing = normalize_bearing(PI - self.heading);
        } else if self.y - WALL_EPSILON > max_y {
            hit_wall = true;
            adjust_y = max_y - self.y;
            bearing = normalize_bearing(-self.heading);
        }

        if hit_wall {
            self.add_event(EventPayload::HitWall { bearing }, turn);

            // Adjust both axes jointly when the approach is not
            // perpendicular, so the robot lands exactly on the boundary
            // line it crossed instead of being clamped per axis.
            if self.heading.rem_euclid(FRAC_PI_2) != 0.0 {
                let tan = self.heading.tan();
                if adjust_x == 0.0 {
                    adjust_x = adjust_y * tan;
                } else if adjust_y == 0.0 {
                    adjust_y = adjust_x / tan;
                } else if (adjust_x / tan).abs() > adjust_y {
                    // Two walls at once: take the larger correction.
                    adjust_y = adjust_x / tan;
                } else if (adjust_y * tan).abs() > adjust_x {
                    adjust_x = adjust_y * tan;
                }
            }

            self.x = (self.x + adjust_x).clamp(min_x, max_x);
            self.y = (self.y + adjust_y).clamp(min_y, max_y);

            let _ = self.apply_energy(-rules::wall_hit_damage(self.velocity));
            self.velocity = 0.0;
            self.command.move_distance = 0.0;
            self.state = RobotState::HitWall;
            self.update_rect();
        }
    }
}

impl fmt::Debug for RobotCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RobotCore")
            .field("name", &self.name)
            .field("x", &self.x)
            .field("y", &self.y)
            .field("heading", &self.heading)
            .field("energy", &self.energy)
            .field("velocity", &self.velocity)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

/// Apply one physics turn to the robot at `idx`, in fixed order: gun-heat
/// decay, body turn, gun turn, radar turn, velocity, position, wall
/// collision, robot collision, scan-arc recompute. Any heading or
/// position change auto-arms the scan flag for the next pass.
pub(crate) fn update_robot(
    robots: &mut [RobotCore],
    idx: RobotId,
    order: &[RobotId],
    battlefield: &Battlefield,
    turn: u64,
) {
    let last_heading;
    let last_gun_heading;
    let last_radar_heading;
    let last_x;
    let last_y;
    let moving;
    {
        let robot = &mut robots[idx];
        debug_assert!(!robot.dead());
        robot.state = RobotState::Active;

        last_heading = robot.heading;
        last_gun_heading = robot.gun_heading;
        last_radar_heading = robot.radar_heading;
        last_x = robot.x;
        last_y = robot.y;

        robot.update_gun_heat();

        // A disabled robot still turns its headings, but a robot wedged
        // in a collision holds its body heading for the turn.
        if !robot.disabled() && !robot.in_collision {
            robot.update_heading();
        }
        robot.update_gun_heading();
        robot.update_radar_heading();

        moving = !robot.disabled();
        if moving {
            robot.update_velocity();
            robot.update_coordinates();
            robot.check_wall_collision(battlefield, turn);
        }
    }

    if moving {
        check_robot_collision(robots, idx, order, turn);
    }

    let robot = &mut robots[idx];
    robot.update_scan_arc(last_radar_heading);

    // Movement implies you look: arm the scan flag for the next pass.
    if last_heading != robot.heading
        || last_gun_heading != robot.gun_heading
        || last_radar_heading != robot.radar_heading
        || last_x != robot.x
        || last_y != robot.y
    {
        robot.command.scan = true;
    }
}

/// Resolve collisions between the moving robot at `idx` and every other
/// living robot, in the given iteration order.
fn check_robot_collision(robots: &mut [RobotCore], idx: RobotId, order: &[RobotId], turn: u64) {
    robots[idx].in_collision = false;

    for &other in order {
        if other == idx || robots[other].dead() {
            continue;
        }
        if !robots[idx].rect.intersects(&robots[other].rect) {
            continue;
        }

        let dx = robots[other].x - robots[idx].x;
        let dy = robots[other].y - robots[idx].y;
        let angle = dx.atan2(dy);
        let bearing = normalize_bearing(angle - robots[idx].heading);

        let velocity = robots[idx].velocity;
        let colliding = (velocity > 0.0 && bearing > -FRAC_PI_2 && bearing < FRAC_PI_2)
            || (velocity < 0.0 && (bearing < -FRAC_PI_2 || bearing > FRAC_PI_2));
        if !colliding {
            continue;
        }

        let mover_killed;
        let struck_killed;
        {
            let (mover, struck) = pair_mut(robots, idx, other);
            mover.in_collision = true;

            // Step back out of the overlap before stopping.
            mover.x -= mover.velocity * mover.heading.sin();
            mover.y -= mover.velocity * mover.heading.cos();

            mover_killed = mover.apply_energy(-rules::ROBOT_HIT_DAMAGE);
            struck_killed = struck.apply_energy(-rules::ROBOT_HIT_DAMAGE);

            mover.velocity = 0.0;
            mover.command.move_distance = 0.0;

            mover.add_event(
                EventPayload::HitRobot {
                    name: struck.name.clone(),
                    energy: struck.energy,
                    bearing,
                    guilty: true,
                },
                turn,
            );
            let struck_bearing = normalize_bearing(PI + angle - struck.heading);
            struck.add_event(
                EventPayload::HitRobot {
                    name: mover.name.clone(),
                    energy: mover.energy,
                    bearing: struck_bearing,
                    guilty: false,
                },
                turn,
            );
        }
        if mover_killed {
            kill_robot(robots, idx, turn);
        }
        if struck_killed {
            kill_robot(robots, other, turn);
        }
    }

    if robots[idx].in_collision {
        robots[idx].state = RobotState::HitRobot;
        robots[idx].update_rect();
    }
}

/// Perform the scan pass for the robot at `idx`: every living robot whose
/// bounding box intersects the scan arc yields a ScannedRobot event.
/// The scan flag is consumed by the pass.
pub(crate) fn scan_robot(robots: &mut [RobotCore], idx: RobotId, order: &[RobotId], turn: u64) {
    debug_assert!(!robots[idx].dead());

    if robots[idx].command.scan {
        let all: &[RobotCore] = robots;
        let me = &all[idx];
        for &other in order {
            if other == idx || all[other].dead() {
                continue;
            }
            let target = &all[other];
            if me.scan_arc.intersects_rect(&target.rect) {
                let dx = target.x - me.x;
                let dy = target.y - me.y;
                let bearing = normalize_bearing(dx.atan2(dy) - me.heading);
                let distance = (dx * dx + dy * dy).sqrt();
                me.add_event(
                    EventPayload::ScannedRobot {
                        name: target.name.clone(),
                        heading: target.heading,
                        energy: target.energy,
                        velocity: target.velocity,
                        bearing,
                        distance,
                    },
                    turn,
                );
            }
        }
    }
    robots[idx].command.scan = false;
}

/// Mark the robot at `idx` dead, file its Death event and broadcast
/// RobotDeath to every other living robot.
pub(crate) fn kill_robot(robots: &mut [RobotCore], idx: RobotId, turn: u64) {
    assert!(!robots[idx].dead(), "kill on an already dead robot");

    robots[idx].state = RobotState::Dead;
    robots[idx].add_event(EventPayload::Death, turn);

    let name = robots[idx].name.clone();
    for (i, other) in robots.iter().enumerate() {
        if i == idx || other.dead() {
            continue;
        }
        other.add_event(EventPayload::RobotDeath { name: name.clone() }, turn);
    }
    tracing::info!(robot = %name, turn, "robot destroyed");
}

#[cfg(test)]
pub(crate) fn test_robot(name: &str, x: f64, y: f64, heading: f64) -> RobotCore {
    RobotCore {
        name: name.to_string(),
        x,
        y,
        heading,
        gun_heading: heading,
        radar_heading: heading,
        energy: 100.0,
        gun_heat: 0.0,
        velocity: 0.0,
        state: RobotState::Active,
        command: Command::idle(),
        in_collision: false,
        over_driving: false,
        outbox: Arc::new(Outbox::new()),
        custom_events: BTreeMap::new(),
        rect: Rect::from_center(x, y, RobotCore::HALF_WIDTH, RobotCore::HALF_HEIGHT),
        scan_arc: ScanArc::new(x, y, heading, heading, rules::RADAR_RANGE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field() -> Battlefield {
        Battlefield {
            width: 800.0,
            height: 600.0,
        }
    }

    #[test]
    fn test_fire_deducts_energy_and_heats_gun() {
        let mut robot = test_robot("shooter", 100.0, 100.0, 0.0);
        robot.command.fire = 3.0;

        let bullet = robot.fire(0, 1).expect("shot accepted");
        assert!((robot.energy - 97.0).abs() < 1e-12);
        assert!((robot.gun_heat - 1.6).abs() < 1e-12);
        assert_eq!(robot.command.fire, 0.0);
        assert!((bullet.velocity() - 11.0).abs() < 1e-12);
        assert_eq!(bullet.heading(), robot.gun_heading);
    }

    #[test]
    fn test_fire_rejected_while_gun_hot() {
        let mut robot = test_robot("shooter", 100.0, 100.0, 0.0);
        robot.gun_heat = 1.0;
        robot.command.fire = 3.0;

        assert!(robot.fire(0, 1).is_none());
        assert_eq!(robot.energy, 100.0);
        // Fire-and-forget: the intent resets even on rejection.
        assert_eq!(robot.command.fire, 0.0);
    }

    #[test]
    fn test_fire_below_minimum_power_rejected() {
        let mut robot = test_robot("shooter", 100.0, 100.0, 0.0);
        robot.command.fire = 0.05;
        assert!(robot.fire(0, 1).is_none());
        assert_eq!(robot.energy, 100.0);
    }

    #[test]
    fn test_fire_power_clamped_to_energy() {
        let mut robot = test_robot("shooter", 100.0, 100.0, 0.0);
        robot.energy = 2.0;
        robot.command.fire = 3.0;

        let bullet = robot.fire(0, 1).expect("shot accepted");
        assert!((bullet.power() - 2.0).abs() < 1e-12);
        assert_eq!(robot.energy, 0.0);
        assert!(robot.disabled());
    }

    #[test]
    fn test_energy_floor_clears_pending_motion() {
        let mut robot = test_robot("victim", 100.0, 100.0, 0.0);
        robot.command.move_distance = 50.0;
        robot.command.turn = 1.0;

        assert!(robot.apply_energy(-200.0));
        assert_eq!(robot.energy, 0.0);
        assert_eq!(robot.command.move_distance, 0.0);
        assert_eq!(robot.command.turn, 0.0);
    }

    #[test]
    fn test_turn_is_rate_limited_and_consumed() {
        let mut robots = vec![test_robot("turner", 400.0, 300.0, 0.0)];
        robots[0].command.turn = PI;

        update_robot(&mut robots, 0, &[0], &field(), 1);

        let turned = robots[0].heading;
        assert!((turned - rules::MAX_TURN_RATE).abs() < 1e-12);
        assert!((robots[0].command.turn - (PI - rules::MAX_TURN_RATE)).abs() < 1e-12);
        // Locks drag gun and radar along by default.
        assert_eq!(robots[0].gun_heading, turned);
        assert_eq!(robots[0].radar_heading, turned);
    }

    #[test]
    fn test_movement_arms_scan_flag() {
        let mut robots = vec![test_robot("mover", 400.0, 300.0, 0.0)];
        robots[0].command.turn_radar = 0.3;
        assert!(!robots[0].command.scan);

        update_robot(&mut robots, 0, &[0], &field(), 1);
        assert!(robots[0].command.scan);
    }

    #[test]
    fn test_disabled_robot_turns_but_does_not_move() {
        let mut robots = vec![test_robot("drained", 400.0, 300.0, 0.0)];
        robots[0].energy = 0.0;
        robots[0].command.turn_gun = 0.2;
        robots[0].command.move_distance = 100.0;

        update_robot(&mut robots, 0, &[0], &field(), 1);

        assert!((robots[0].gun_heading - 0.2).abs() < 1e-12);
        assert_eq!(robots[0].x, 400.0);
        assert_eq!(robots[0].y, 300.0);
        assert_eq!(robots[0].velocity, 0.0);
    }

    #[test]
    fn test_wall_collision_clamps_and_damages() {
        let mut robots = vec![test_robot("crasher", 400.0, 300.0, 0.0)];
        // Driving straight up at full speed, one step from the top wall.
        robots[0].y = 578.0;
        robots[0].velocity = 8.0;
        robots[0].command.move_distance = 100.0;

        update_robot(&mut robots, 0, &[0], &field(), 3);

        let robot = &robots[0];
        assert_eq!(robot.y, 600.0 - RobotCore::HALF_HEIGHT);
        assert_eq!(robot.velocity, 0.0);
        assert_eq!(robot.command.move_distance, 0.0);
        assert_eq!(robot.state, RobotState::HitWall);
        // Wall damage at full speed: 8/2 - 1 = 3.
        assert!((robot.energy - 97.0).abs() < 1e-12);

        let events = robot.outbox.drain();
        assert!(events
            .iter()
            .any(|e| matches!(e.payload, EventPayload::HitWall { bearing } if bearing.abs() < 1e-9)));
    }

    #[test]
    fn test_diagonal_wall_collision_lands_on_boundary() {
        let mut robots = vec![test_robot("angler", 400.0, 300.0, FRAC_PI_2 / 2.0)];
        // Heading 45 degrees, about to cross the right wall.
        robots[0].x = 779.0;
        robots[0].velocity = 8.0;
        robots[0].command.move_distance = 100.0;

        update_robot(&mut robots, 0, &[0], &field(), 3);

        let robot = &robots[0];
        assert_eq!(robot.x, 800.0 - RobotCore::HALF_WIDTH);
        assert!(robot.y >= RobotCore::HALF_HEIGHT && robot.y <= 600.0 - RobotCore::HALF_HEIGHT);
        assert_eq!(robot.state, RobotState::HitWall);
    }

    #[test]
    fn test_ram_damages_both_and_flags_guilt() {
        let mut robots = vec![
            test_robot("rammer", 400.0, 300.0, 0.0),
            test_robot("rammed", 400.0, 330.0, 0.0),
        ];
        robots[0].velocity = 2.0;
        robots[0].command.move_distance = 50.0;

        check_robot_collision(&mut robots, 0, &[0, 1], 4);

        assert!((robots[0].energy - 99.4).abs() < 1e-12);
        assert!((robots[1].energy - 99.4).abs() < 1e-12);
        assert_eq!(robots[0].velocity, 0.0);
        assert_eq!(robots[0].command.move_distance, 0.0);
        assert_eq!(robots[0].state, RobotState::HitRobot);
        // The struck robot keeps its velocity.
        assert_eq!(robots[1].state, RobotState::Active);

        let mover_events = robots[0].outbox.drain();
        assert!(mover_events
            .iter()
            .any(|e| matches!(&e.payload, EventPayload::HitRobot { guilty: true, .. })));
        let struck_events = robots[1].outbox.drain();
        assert!(struck_events
            .iter()
            .any(|e| matches!(&e.payload, EventPayload::HitRobot { guilty: false, .. })));
    }

    #[test]
    fn test_overlap_without_approach_is_not_a_collision() {
        let mut robots = vec![
            test_robot("backing", 400.0, 300.0, 0.0),
            test_robot("bystander", 400.0, 330.0, 0.0),
        ];
        // Moving away from the overlap: bearing ahead, velocity negative.
        robots[0].velocity = -2.0;

        check_robot_collision(&mut robots, 0, &[0, 1], 4);
        assert_eq!(robots[0].energy, 100.0);
        assert_eq!(robots[1].energy, 100.0);
        assert!(!robots[0].in_collision);
    }

    #[test]
    fn test_kill_broadcasts_to_survivors() {
        let mut robots = vec![
            test_robot("doomed", 100.0, 100.0, 0.0),
            test_robot("alpha", 300.0, 300.0, 0.0),
            test_robot("beta", 500.0, 500.0, 0.0),
        ];

        kill_robot(&mut robots, 0, 7);

        assert!(robots[0].dead());
        let own = robots[0].outbox.drain();
        assert!(own.iter().any(|e| matches!(e.payload, EventPayload::Death)));
        for survivor in &robots[1..] {
            let events = survivor.outbox.drain();
            assert!(events
                .iter()
                .any(|e| matches!(&e.payload, EventPayload::RobotDeath { name } if name == "doomed")));
        }
    }

    #[test]
    fn test_scan_sees_robot_in_arc() {
        let mut robots = vec![
            test_robot("scanner", 400.0, 100.0, 0.0),
            test_robot("target", 400.0, 400.0, 0.0),
        ];
        robots[0].command.scan = true;

        scan_robot(&mut robots, 0, &[0, 1], 5);

        let events = robots[0].outbox.drain();
        let scanned = events
            .iter()
            .find_map(|e| match &e.payload {
                EventPayload::ScannedRobot {
                    name,
                    bearing,
                    distance,
                    ..
                } => Some((name.clone(), *bearing, *distance)),
                _ => None,
            })
            .expect("target scanned");
        assert_eq!(scanned.0, "target");
        assert!(scanned.1.abs() < 1e-9);
        assert!((scanned.2 - 300.0).abs() < 1e-9);
        assert!(!robots[0].command.scan, "scan flag consumed");
    }

    #[test]
    fn test_scan_ignores_robot_behind() {
        let mut robots = vec![
            test_robot("scanner", 400.0, 300.0, 0.0),
            test_robot("lurker", 400.0, 100.0, 0.0),
        ];
        robots[0].command.scan = true;

        scan_robot(&mut robots, 0, &[0, 1], 5);
        assert!(robots[0].outbox.drain().is_empty());
    }

    #[test]
    fn test_status_roundtrip_after_noop_turn() {
        let mut robots = vec![test_robot("idle", 400.0, 300.0, 1.0)];
        let before = robots[0].status(1);

        update_robot(&mut robots, 0, &[0], &field(), 1);

        let after = robots[0].status(1);
        assert_eq!(before, after, "a zero-intent turn is idempotent");
    }
}

//! The bullet entity: a projectile state machine advanced once per turn.
//!
//! A bullet owns its collision checks, performed in a fixed order each
//! turn: wall bounds, robot intersection, then bullet-vs-bullet. A
//! bullet that exploded stays in the live set for exactly one more turn
//! (as Inactive) so observers can see the terminal state before cleanup.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::config::Battlefield;
use crate::events::{BulletSnapshot, EventPayload};
use crate::geom::Segment;
use crate::math::{normalize_bearing, pair_mut};
use crate::robot::{kill_robot, RobotCore, RobotId};
use crate::rules;

/// Lifecycle state of a bullet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BulletState {
    /// Created this turn, not yet advanced.
    Fired,
    /// In flight.
    Moving,
    /// Exploded on a robot.
    HitVictim,
    /// Collided with another bullet mid-air.
    HitBullet,
    /// Left the battlefield.
    HitWall,
    /// Terminal state observed; dropped at the next cleanup.
    Inactive,
}

/// One projectile in flight.
#[derive(Debug, Clone, PartialEq)]
pub struct BulletCore {
    pub(crate) owner: RobotId,
    pub(crate) x: f64,
    pub(crate) y: f64,
    pub(crate) heading: f64,
    pub(crate) power: f64,
    pub(crate) state: BulletState,
    pub(crate) victim: Option<RobotId>,
    pub(crate) line: Segment,
}

impl BulletCore {
    /// Render radius of a bullet; the drawn size scales with power.
    pub const RADIUS: f64 = 3.0;

    pub(crate) fn new(owner: RobotId, x: f64, y: f64, heading: f64, power: f64) -> Self {
        debug_assert!((rules::MIN_BULLET_POWER..=rules::MAX_BULLET_POWER).contains(&power));
        Self {
            owner,
            x,
            y,
            heading,
            power,
            state: BulletState::Fired,
            victim: None,
            line: Segment::point(x, y),
        }
    }

    /// Id of the robot that fired this bullet.
    #[must_use]
    pub fn owner(&self) -> RobotId {
        self.owner
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

    /// Flight heading in radians.
    #[must_use]
    pub fn heading(&self) -> f64 {
        self.heading
    }

    /// Firepower of the shot.
    #[must_use]
    pub fn power(&self) -> f64 {
        self.power
    }

    /// Lifecycle state.
    #[must_use]
    pub fn state(&self) -> BulletState {
        self.state
    }

    /// Robot this bullet hit, if any.
    #[must_use]
    pub fn victim(&self) -> Option<RobotId> {
        self.victim
    }

    /// The line traversed in the most recent turn.
    #[must_use]
    pub fn line(&self) -> Segment {
        self.line
    }

    /// Energy taken from a robot this bullet hits.
    #[must_use]
    pub fn damage(&self) -> f64 {
        rules::bullet_damage(self.power)
    }

    /// Energy returned to the owner on a hit.
    #[must_use]
    pub fn hit_bonus(&self) -> f64 {
        rules::bullet_hit_bonus(self.power)
    }

    /// Flight speed in units per turn.
    #[must_use]
    pub fn velocity(&self) -> f64 {
        rules::bullet_velocity(self.power)
    }

    /// Still flying and colliding.
    #[must_use]
    pub fn active(&self) -> bool {
        matches!(self.state, BulletState::Fired | BulletState::Moving)
    }

    /// Reached a terminal state this turn.
    #[must_use]
    pub fn exploded(&self) -> bool {
        matches!(
            self.state,
            BulletState::HitVictim | BulletState::HitBullet | BulletState::HitWall
        )
    }

    /// Ready to be dropped from the live set.
    #[must_use]
    pub fn inactive(&self) -> bool {
        self.state == BulletState::Inactive
    }

    pub(crate) fn snapshot(&self, robots: &[RobotCore]) -> BulletSnapshot {
        BulletSnapshot {
            x: self.x,
            y: self.y,
            heading: self.heading,
            power: self.power,
            owner: robots[self.owner].name().to_string(),
            victim: self.victim.map(|id| robots[id].name().to_string()),
        }
    }

    fn advance(&mut self) {
        let last_x = self.x;
        let last_y = self.y;
        self.x += self.velocity() * self.heading.sin();
        self.y += self.velocity() * self.heading.cos();
        self.line = Segment::new(last_x, last_y, self.x, self.y);
        self.state = BulletState::Moving;
    }
}

/// Advance the bullet at `bidx` by one turn and resolve its collisions.
pub(crate) fn update_bullet(
    bullets: &mut [BulletCore],
    bidx: usize,
    bullet_order: &[usize],
    robots: &mut [RobotCore],
    robot_order: &[RobotId],
    battlefield: &Battlefield,
    turn: u64,
) {
    if bullets[bidx].active() {
        bullets[bidx].advance();
        check_wall_collision(bullets, bidx, robots, battlefield, turn);
        if bullets[bidx].active() {
            check_robot_collision(bullets, bidx, robots, robot_order, turn);
        }
        if bullets[bidx].active() {
            check_bullet_collision(bullets, bidx, bullet_order, robots, turn);
        }
    } else if bullets[bidx].exploded() {
        bullets[bidx].state = BulletState::Inactive;
    }
}

/// An out-of-bounds bullet explodes on the wall and reports a miss to
/// its owner.
fn check_wall_collision(
    bullets: &mut [BulletCore],
    bidx: usize,
    robots: &[RobotCore],
    battlefield: &Battlefield,
    turn: u64,
) {
    let min = BulletCore::RADIUS;
    let max_x = battlefield.width - BulletCore::RADIUS;
    let max_y = battlefield.height - BulletCore::RADIUS;

    let bullet = &mut bullets[bidx];
    let out_of_bounds = !(min..=max_x).contains(&bullet.x) || !(min..=max_y).contains(&bullet.y);
    if out_of_bounds {
        bullet.state = BulletState::HitWall;
        let snapshot = bullet.snapshot(robots);
        robots[bullet.owner].add_event(EventPayload::BulletMissed { bullet: snapshot }, turn);
    }
}

/// First living robot (other than the owner) crossed by this turn's
/// traversal segment takes the hit.
fn check_robot_collision(
    bullets: &mut [BulletCore],
    bidx: usize,
    robots: &mut [RobotCore],
    robot_order: &[RobotId],
    turn: u64,
) {
    for &ridx in robot_order {
        if ridx == bullets[bidx].owner || robots[ridx].dead() {
            continue;
        }
        if !bullets[bidx].line.intersects_rect(&robots[ridx].rect()) {
            continue;
        }

        let damage = bullets[bidx].damage();
        let bonus = bullets[bidx].hit_bonus();
        let owner = bullets[bidx].owner;

        let victim_killed = robots[ridx].apply_energy(-damage);
        if victim_killed {
            kill_robot(robots, ridx, turn);
        }
        let _ = robots[owner].apply_energy(bonus);

        bullets[bidx].victim = Some(ridx);
        bullets[bidx].state = BulletState::HitVictim;

        let snapshot = bullets[bidx].snapshot(robots);
        robots[owner].add_event(
            EventPayload::BulletHit {
                victim: robots[ridx].name().to_string(),
                victim_energy: robots[ridx].energy(),
                bullet: snapshot.clone(),
            },
            turn,
        );
        let bearing = normalize_bearing(bullets[bidx].heading + PI - robots[ridx].heading());
        robots[ridx].add_event(EventPayload::HitByBullet { bearing, bullet: snapshot }, turn);
        break;
    }
}

/// Two crossing bullets from different owners annihilate at the exact
/// intersection point.
fn check_bullet_collision(
    bullets: &mut [BulletCore],
    bidx: usize,
    bullet_order: &[usize],
    robots: &[RobotCore],
    turn: u64,
) {
    for &other in bullet_order {
        if other == bidx {
            continue;
        }
        if bullets[other].owner == bullets[bidx].owner || !bullets[other].active() {
            continue;
        }
        let Some((x, y)) = bullets[bidx].line.intersection(&bullets[other].line) else {
            continue;
        };

        let (mine, theirs) = pair_mut(bullets, bidx, other);
        mine.x = x;
        mine.y = y;
        mine.state = BulletState::HitBullet;
        theirs.x = x;
        theirs.y = y;
        theirs.state = BulletState::HitBullet;

        let mine_snapshot = mine.snapshot(robots);
        let theirs_snapshot = theirs.snapshot(robots);
        robots[mine.owner].add_event(
            EventPayload::BulletHitBullet {
                bullet: mine_snapshot.clone(),
                other: theirs_snapshot.clone(),
            },
            turn,
        );
        robots[theirs.owner].add_event(
            EventPayload::BulletHitBullet {
                bullet: theirs_snapshot,
                other: mine_snapshot,
            },
            turn,
        );
        break;
    }
}

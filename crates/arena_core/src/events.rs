//! The event model: timestamped records with a total order, per-agent
//! outboxes and the ordered work queue an agent consumes.
//!
//! Events are sorted by `(turn, criticality, priority)`: older turns
//! first, critical kinds before everything else within a turn, then by
//! ascending numeric priority. Events that sit undelivered for more than
//! [`RETENTION_TURNS`] turns are dropped unconsumed - an agent that falls
//! behind silently loses stale events rather than processing arbitrarily
//! old state.

use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::robot::RobotStatus;

/// How many turns an undelivered event stays valid.
pub const RETENTION_TURNS: u64 = 2;

/// Observable state of a bullet at the moment an event was filed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulletSnapshot {
    /// Bullet x position.
    pub x: f64,
    /// Bullet y position.
    pub y: f64,
    /// Flight heading in radians.
    pub heading: f64,
    /// Firepower of the shot.
    pub power: f64,
    /// Display name of the robot that fired it.
    pub owner: String,
    /// Display name of the robot it hit, if any.
    pub victim: Option<String>,
}

/// A timestamped event delivered to one agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Turn index the event was filed on.
    pub turn: u64,
    /// What happened.
    pub payload: EventPayload,
}

/// The closed set of things that can happen to an agent.
///
/// Dispatch is an exhaustive match; an unknown kind cannot be
/// constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EventPayload {
    /// One of our bullets hit `victim`, leaving it at `victim_energy`.
    BulletHit {
        /// Name of the robot that was hit.
        victim: String,
        /// Victim's energy after the damage.
        victim_energy: f64,
        /// The bullet that connected.
        bullet: BulletSnapshot,
    },
    /// One of our bullets collided with another bullet mid-air.
    BulletHitBullet {
        /// Our bullet.
        bullet: BulletSnapshot,
        /// The bullet it collided with.
        other: BulletSnapshot,
    },
    /// One of our bullets left the battlefield.
    BulletMissed {
        /// The bullet that missed.
        bullet: BulletSnapshot,
    },
    /// We were destroyed.
    Death,
    /// A registered custom predicate became true.
    Custom {
        /// Name the predicate was registered under.
        name: String,
    },
    /// An enemy bullet hit us.
    HitByBullet {
        /// Bearing of the incoming bullet relative to our body heading.
        bearing: f64,
        /// The bullet that hit us.
        bullet: BulletSnapshot,
    },
    /// We collided with another robot.
    HitRobot {
        /// Name of the other robot.
        name: String,
        /// Other robot's energy after the collision.
        energy: f64,
        /// Bearing to the other robot relative to our body heading.
        bearing: f64,
        /// Whether we caused the collision by driving into them.
        guilty: bool,
    },
    /// We drove into a wall.
    HitWall {
        /// Bearing to the wall relative to our body heading.
        bearing: f64,
    },
    /// Another robot was destroyed.
    RobotDeath {
        /// Name of the destroyed robot.
        name: String,
    },
    /// Our radar swept over another robot.
    ScannedRobot {
        /// Name of the scanned robot.
        name: String,
        /// Its body heading.
        heading: f64,
        /// Its energy.
        energy: f64,
        /// Its velocity.
        velocity: f64,
        /// Bearing to it relative to our body heading.
        bearing: f64,
        /// Distance to it.
        distance: f64,
    },
    /// We did not participate in a turn's physics pass.
    SkippedTurn {
        /// The turn that was skipped.
        skipped: u64,
    },
    /// Fresh world-state snapshot at the start of a turn.
    Status {
        /// The snapshot.
        status: RobotStatus,
    },
    /// We are the last robot standing.
    Victory,
}

impl EventPayload {
    /// Critical events sort before all non-critical events of the same
    /// turn.
    #[must_use]
    pub fn critical(&self) -> bool {
        matches!(
            self,
            Self::Death | Self::Custom { .. } | Self::SkippedTurn { .. } | Self::Victory
        )
    }

    /// Delivery priority within a turn; lower runs earlier.
    #[must_use]
    pub fn priority(&self) -> i32 {
        match self {
            Self::Death => -1,
            Self::ScannedRobot { .. } => 10,
            Self::HitByBullet { .. } => 20,
            Self::HitWall { .. } => 30,
            Self::HitRobot { .. } => 40,
            Self::BulletHit { .. } => 50,
            Self::BulletHitBullet { .. } => 55,
            Self::BulletMissed { .. } => 60,
            Self::RobotDeath { .. } => 70,
            Self::Custom { .. } => 80,
            Self::Status { .. } => 99,
            Self::SkippedTurn { .. } | Self::Victory => 100,
        }
    }
}

impl Event {
    /// Total-order key: `(turn, non-critical, priority)` ascending.
    #[must_use]
    pub fn sort_key(&self) -> (u64, bool, i32) {
        (self.turn, !self.payload.critical(), self.payload.priority())
    }
}

/// Per-agent append-only event store.
///
/// Appends happen from the scheduler's physics pass; the drain happens
/// from the agent's control thread. The outbox carries its own lock so
/// that access stays local to one agent and never involves the world
/// snapshot lock.
#[derive(Debug, Default)]
pub struct Outbox {
    events: Mutex<Vec<Event>>,
}

impl Outbox {
    /// Create an empty outbox.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one event.
    pub fn append(&self, event: Event) {
        self.events.lock().expect("outbox lock poisoned").push(event);
    }

    /// Take every pending event, leaving the outbox empty.
    #[must_use]
    pub fn drain(&self) -> Vec<Event> {
        std::mem::take(&mut *self.events.lock().expect("outbox lock poisoned"))
    }
}

/// The ordered work queue an agent consumes events from.
///
/// `refresh` transfers the outbox atomically, prunes stale events and
/// re-sorts; consumption is strictly FIFO against the sorted queue.
#[derive(Debug, Default)]
pub struct EventQueue {
    queue: Vec<Event>,
}

impl EventQueue {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether there is nothing left to consume.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Drain the outbox into the queue, drop events older than the
    /// retention window relative to `now`, and restore the total order.
    pub fn refresh(&mut self, outbox: &Outbox, now: u64) {
        self.queue.extend(outbox.drain());
        self.queue
            .retain(|event| now.saturating_sub(event.turn) <= RETENTION_TURNS);
        self.queue.sort_by_key(Event::sort_key);
    }

    /// Take the next event in delivery order.
    pub fn pop(&mut self) -> Option<Event> {
        if self.queue.is_empty() {
            None
        } else {
            Some(self.queue.remove(0))
        }
    }
}

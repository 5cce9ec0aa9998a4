//! The per-agent handle into the battle: read-only world access, the
//! execute rendezvous and event-queue plumbing.
//!
//! An [`AgentLink`] is handed to each control thread at battle start.
//! Everything an agent facade exposes goes through here; there is no
//! other path from agent code into the world.

use std::sync::{Arc, RwLock, RwLockReadGuard};

use crate::battle::World;
use crate::command::Command;
use crate::config::Battlefield;
use crate::error::ExecutionError;
use crate::events::{EventQueue, Outbox};
use crate::gate::TurnGate;
use crate::robot::{CustomPredicate, RobotCore, RobotId, RobotStatus};
use crate::stats::{BattleState, Statistics};

/// One agent's handle into the battle core.
///
/// Cloneable and cheap: all state lives behind shared references.
#[derive(Clone)]
pub struct AgentLink {
    world: Arc<RwLock<World>>,
    id: RobotId,
    gate: Arc<TurnGate>,
    outbox: Arc<Outbox>,
}

impl AgentLink {
    pub(crate) fn new(
        world: Arc<RwLock<World>>,
        id: RobotId,
        gate: Arc<TurnGate>,
        outbox: Arc<Outbox>,
    ) -> Self {
        Self {
            world,
            id,
            gate,
            outbox,
        }
    }

    fn world(&self) -> RwLockReadGuard<'_, World> {
        self.world.read().expect("world lock poisoned")
    }

    fn robot<'a>(&self, world: &'a World) -> &'a RobotCore {
        world.robot(self.id)
    }

    /// This robot's id.
    #[must_use]
    pub fn id(&self) -> RobotId {
        self.id
    }

    /// This robot's display name.
    #[must_use]
    pub fn name(&self) -> String {
        self.robot(&self.world()).name().to_string()
    }

    /// Current x position.
    #[must_use]
    pub fn x(&self) -> f64 {
        self.robot(&self.world()).x()
    }

    /// Current y position.
    #[must_use]
    pub fn y(&self) -> f64 {
        self.robot(&self.world()).y()
    }

    /// Current body heading.
    #[must_use]
    pub fn heading(&self) -> f64 {
        self.robot(&self.world()).heading()
    }

    /// Current gun heading.
    #[must_use]
    pub fn gun_heading(&self) -> f64 {
        self.robot(&self.world()).gun_heading()
    }

    /// Current radar heading.
    #[must_use]
    pub fn radar_heading(&self) -> f64 {
        self.robot(&self.world()).radar_heading()
    }

    /// Remaining energy.
    #[must_use]
    pub fn energy(&self) -> f64 {
        self.robot(&self.world()).energy()
    }

    /// Current gun heat.
    #[must_use]
    pub fn gun_heat(&self) -> f64 {
        self.robot(&self.world()).gun_heat()
    }

    /// Current velocity.
    #[must_use]
    pub fn velocity(&self) -> f64 {
        self.robot(&self.world()).velocity()
    }

    /// Whether the robot is out of energy but alive.
    #[must_use]
    pub fn disabled(&self) -> bool {
        self.robot(&self.world()).disabled()
    }

    /// Whether the robot is destroyed.
    #[must_use]
    pub fn dead(&self) -> bool {
        self.robot(&self.world()).dead()
    }

    /// Battlefield dimensions.
    #[must_use]
    pub fn battlefield(&self) -> Battlefield {
        *self.world().battlefield()
    }

    /// Snapshot of the battle statistics.
    #[must_use]
    pub fn statistics(&self) -> Statistics {
        *self.world().stats()
    }

    /// Current turn index.
    #[must_use]
    pub fn turn(&self) -> u64 {
        self.world().stats().turn()
    }

    /// Full status snapshot.
    #[must_use]
    pub fn status(&self) -> RobotStatus {
        let world = self.world();
        self.robot(&world).status(world.stats().turn())
    }

    /// Commit an intent batch and block until the turn is committed.
    ///
    /// Returns the fresh status snapshot, whose `action` field carries
    /// the remaining command progress.
    ///
    /// # Errors
    ///
    /// Fails with [`ExecutionError::AgentDead`] once this robot has been
    /// destroyed, and with [`ExecutionError::BattleNotRunning`] once the
    /// battle has ended or was stopped. Both mean: stop cleanly.
    pub fn execute(&self, command: Command) -> Result<RobotStatus, ExecutionError> {
        {
            let world = self.world();
            if self.robot(&world).dead() {
                return Err(ExecutionError::AgentDead);
            }
            if world.stats().state() != BattleState::Running {
                return Err(ExecutionError::BattleNotRunning);
            }
        }

        self.gate
            .submit(command)
            .map_err(|_| ExecutionError::BattleNotRunning)?;

        Ok(self.status())
    }

    /// Transfer pending events into the agent's work queue, pruning and
    /// re-sorting by the delivery order.
    pub fn refresh_events(&self, queue: &mut EventQueue) {
        queue.refresh(&self.outbox, self.turn());
    }

    /// Register a named predicate over this robot's status snapshot,
    /// evaluated once per turn; a Custom event fires while it holds.
    pub fn add_custom_event(&self, name: impl Into<String>, predicate: CustomPredicate) {
        let mut world = self.world.write().expect("world lock poisoned");
        world.robot_mut(self.id).add_custom_predicate(name.into(), predicate);
    }

    /// Remove a previously registered predicate.
    pub fn remove_custom_event(&self, name: &str) {
        let mut world = self.world.write().expect("world lock poisoned");
        world.robot_mut(self.id).remove_custom_predicate(name);
    }
}

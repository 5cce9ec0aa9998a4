//! The battle loop: setup, the per-turn scheduler and the world it
//! owns.
//!
//! The scheduler runs one logical turn per wall-clock interval. Each
//! turn it collects the agents parked on their turn gate, applies one
//! physics pass to exactly that set under the world's snapshot lock,
//! evaluates the win condition, files events, then releases the gates
//! so the participating control threads resume.
//!
//! Every per-turn pass over the robot and bullet collections draws a
//! fresh random permutation, so no agent gains a systematic advantage
//! from its position in the collections.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};
use std::thread;
use std::time::Duration;

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};

use crate::bullet::{self, BulletCore};
use crate::config::{BattleConfig, Battlefield};
use crate::error::{BattleError, Result};
use crate::events::{EventPayload, Outbox};
use crate::gate::TurnGate;
use crate::link::AgentLink;
use crate::robot::{self, RobotCore, RobotId};
use crate::stats::{BattleState, Statistics};

/// The complete battle state behind the snapshot lock.
///
/// The scheduler takes the write side for its physics pass; every other
/// observer - agent accessors, renderers - reads a quiescent world
/// through the read side.
#[derive(Debug)]
pub struct World {
    battlefield: Battlefield,
    stats: Statistics,
    robots: Vec<RobotCore>,
    bullets: Vec<BulletCore>,
}

impl World {
    /// Battlefield dimensions.
    #[must_use]
    pub fn battlefield(&self) -> &Battlefield {
        &self.battlefield
    }

    /// Battle statistics.
    #[must_use]
    pub fn stats(&self) -> &Statistics {
        &self.stats
    }

    /// All robots, dead ones included. Ids index into this slice for
    /// the whole battle.
    #[must_use]
    pub fn robots(&self) -> &[RobotCore] {
        &self.robots
    }

    /// Live bullets.
    #[must_use]
    pub fn bullets(&self) -> &[BulletCore] {
        &self.bullets
    }

    /// The robot with the given id.
    #[must_use]
    pub fn robot(&self, id: RobotId) -> &RobotCore {
        &self.robots[id]
    }

    pub(crate) fn robot_mut(&mut self, id: RobotId) -> &mut RobotCore {
        &mut self.robots[id]
    }

    /// Apply one physics turn to the participating robots, advance the
    /// bullets, evaluate the win condition and file the turn's events.
    pub(crate) fn apply_tick<R: Rng>(&mut self, participants: &[RobotId], rng: &mut R) {
        let turn = self.stats.turn();

        // Robot pass: fire, then the fixed-order physical update.
        let robot_order = shuffled_order(self.robots.len(), rng);
        for &idx in participants {
            // Robots can die mid-pass and then execute nothing further.
            if self.robots[idx].dead() {
                continue;
            }
            if let Some(bullet) = self.robots[idx].fire(idx, turn) {
                self.bullets.push(bullet);
            }
            robot::update_robot(&mut self.robots, idx, &robot_order, &self.battlefield, turn);
        }

        // Bullet pass, covering bullets fired this very turn.
        let bullet_order = shuffled_order(self.bullets.len(), rng);
        let robot_order = shuffled_order(self.robots.len(), rng);
        for &bidx in &bullet_order {
            bullet::update_bullet(
                &mut self.bullets,
                bidx,
                &bullet_order,
                &mut self.robots,
                &robot_order,
                &self.battlefield,
                turn,
            );
        }
        // Exploded bullets were observable for one turn; drop the rest.
        self.bullets.retain(|bullet| !bullet.inactive());

        let alive = self.robots.iter().filter(|robot| !robot.dead()).count();
        self.stats.set_alive_robots(alive);

        if alive <= 1 {
            self.stats.set_state(BattleState::Ended);
            if let Some(winner) = self.sole_survivor() {
                winner.add_event(EventPayload::Victory, turn);
                tracing::info!(winner = %winner.name(), turn, "battle ended");
            } else {
                tracing::info!(turn, "battle ended with no survivor");
            }
        } else {
            self.stats.advance_turn();
            let turn = self.stats.turn();

            // Everything below publishes the opening state of the next
            // turn: scans, custom predicates, skipped turns, statuses.
            let scan_order = shuffled_order(self.robots.len(), rng);
            for &idx in participants {
                if self.robots[idx].dead() {
                    continue;
                }
                robot::scan_robot(&mut self.robots, idx, &scan_order, turn);
            }

            for &idx in participants {
                let robot = &self.robots[idx];
                if robot.dead() {
                    continue;
                }
                let status = robot.status(turn);
                for (name, predicate) in &robot.custom_events {
                    if predicate(&status) {
                        robot.add_event(EventPayload::Custom { name: name.clone() }, turn);
                    }
                }
            }

            for (idx, robot) in self.robots.iter().enumerate() {
                if robot.dead() || participants.contains(&idx) {
                    continue;
                }
                robot.add_event(EventPayload::SkippedTurn { skipped: turn - 1 }, turn);
            }

            for robot in &self.robots {
                if robot.dead() {
                    continue;
                }
                robot.add_event(
                    EventPayload::Status {
                        status: robot.status(turn),
                    },
                    turn,
                );
            }
        }
    }

    fn sole_survivor(&self) -> Option<&RobotCore> {
        if self.stats.alive_robots() != 1 {
            return None;
        }
        self.robots.iter().find(|robot| !robot.dead())
    }
}

/// A fresh random permutation of `0..len`.
fn shuffled_order<R: Rng>(len: usize, rng: &mut R) -> Vec<usize> {
    let mut order: Vec<usize> = (0..len).collect();
    order.shuffle(rng);
    order
}

/// One roster entry: the agent's type name (used for display-name
/// disambiguation) and the body of its control thread.
pub struct AgentSpec {
    type_name: String,
    run: Box<dyn FnOnce(AgentLink) + Send + 'static>,
}

impl AgentSpec {
    /// Describe an agent by type name and control-thread body.
    pub fn new(type_name: impl Into<String>, run: impl FnOnce(AgentLink) + Send + 'static) -> Self {
        Self {
            type_name: type_name.into(),
            run: Box::new(run),
        }
    }

    /// The agent's type name.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }
}

impl fmt::Debug for AgentSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentSpec")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

/// How a finished battle looked when the loop exited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleOutcome {
    /// Name of the sole survivor, if the battle ended with one.
    pub winner: Option<String>,
    /// Turns the battle ran for.
    pub turns: u64,
    /// State the loop exited in: Ended on a win condition, Stopped on an
    /// external stop.
    pub state: BattleState,
}

/// Shareable handle for observing and stopping a running battle.
#[derive(Debug, Clone)]
pub struct BattleHandle {
    world: Arc<RwLock<World>>,
}

impl BattleHandle {
    /// Snapshot of the battle statistics.
    #[must_use]
    pub fn statistics(&self) -> Statistics {
        *self.world.read().expect("world lock poisoned").stats()
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> BattleState {
        self.statistics().state()
    }

    /// Request a stop. Best-effort: control threads are not preempted,
    /// they fail out of their next execute.
    pub fn stop(&self) {
        let mut world = self.world.write().expect("world lock poisoned");
        if world.stats().state() == BattleState::Running {
            world.stats.set_state(BattleState::Stopped);
            tracing::info!("battle stop requested");
        }
    }
}

struct PendingAgent {
    name: String,
    run: Box<dyn FnOnce(AgentLink) + Send + 'static>,
    link: AgentLink,
}

/// A fully set-up battle, ready to run.
pub struct Battle {
    world: Arc<RwLock<World>>,
    gates: Vec<Arc<TurnGate>>,
    agents: Vec<PendingAgent>,
    tick_period: Duration,
    rng: Pcg64,
}

impl Battle {
    /// Set up a battle: validate the configuration, place every robot at
    /// a randomized non-overlapping position, assign disambiguated
    /// display names and wire one turn gate per agent.
    ///
    /// # Errors
    ///
    /// Fails if the configuration is invalid, the roster holds fewer
    /// than two agents, or a robot cannot be placed.
    pub fn new(config: BattleConfig, roster: Vec<AgentSpec>) -> Result<Self> {
        config.validate()?;
        if roster.len() < 2 {
            return Err(BattleError::RosterTooSmall(roster.len()));
        }

        let mut rng = match config.seed {
            Some(seed) => Pcg64::seed_from_u64(seed),
            None => Pcg64::seed_from_u64(rand::rng().random()),
        };

        let battlefield = Battlefield::new(&config);

        let mut roster = roster;
        roster.shuffle(&mut rng);

        let mut name_counts: HashMap<String, usize> = HashMap::new();
        let mut robots: Vec<RobotCore> = Vec::with_capacity(roster.len());
        let mut gates = Vec::with_capacity(roster.len());
        let mut outboxes = Vec::with_capacity(roster.len());
        let mut bodies = Vec::with_capacity(roster.len());

        for spec in roster {
            let count = name_counts.entry(spec.type_name.clone()).or_insert(0);
            let name = if *count == 0 {
                spec.type_name.clone()
            } else {
                format!("{}({})", spec.type_name, *count)
            };
            *count += 1;

            let outbox = Arc::new(Outbox::new());
            let robot =
                RobotCore::spawn(name.clone(), &battlefield, &robots, Arc::clone(&outbox), &mut rng)?;
            robots.push(robot);
            gates.push(Arc::new(TurnGate::new()));
            outboxes.push(outbox);
            bodies.push((name, spec.run));
        }

        let stats = Statistics::new(robots.len());
        let world = Arc::new(RwLock::new(World {
            battlefield,
            stats,
            robots,
            bullets: Vec::new(),
        }));

        let agents = bodies
            .into_iter()
            .enumerate()
            .map(|(id, (name, run))| PendingAgent {
                name,
                run,
                link: AgentLink::new(
                    Arc::clone(&world),
                    id,
                    Arc::clone(&gates[id]),
                    Arc::clone(&outboxes[id]),
                ),
            })
            .collect();

        tracing::info!(
            robots = gates.len(),
            width = config.width,
            height = config.height,
            "battle set up"
        );

        Ok(Self {
            world,
            gates,
            agents,
            tick_period: Duration::from_millis(config.tick_period_ms),
            rng,
        })
    }

    /// Shared access to the world, for renderers. Reads must go through
    /// the lock so they only ever observe committed turns.
    #[must_use]
    pub fn world(&self) -> Arc<RwLock<World>> {
        Arc::clone(&self.world)
    }

    /// A handle for observing and stopping the battle from outside.
    #[must_use]
    pub fn handle(&self) -> BattleHandle {
        BattleHandle {
            world: Arc::clone(&self.world),
        }
    }

    /// Run the battle to completion.
    ///
    /// Seeds every robot's initial Status event, starts one control
    /// thread per agent, then loops at the configured wall-clock period
    /// until the battle leaves the Running state. Control threads are
    /// detached; shutdown is best-effort and a thread that never yields
    /// is left to fail out of its next execute.
    ///
    /// # Errors
    ///
    /// Fails if a control thread cannot be spawned.
    pub fn run(mut self) -> Result<BattleOutcome> {
        {
            let world = self.world.read().expect("world lock poisoned");
            let turn = world.stats().turn();
            for robot in world.robots() {
                robot.add_event(
                    EventPayload::Status {
                        status: robot.status(turn),
                    },
                    turn,
                );
            }
        }

        for agent in std::mem::take(&mut self.agents) {
            let PendingAgent { name, run, link } = agent;
            thread::Builder::new()
                .name(format!("{name}-control"))
                .spawn(move || run(link))?;
        }
        tracing::info!("battle started");

        loop {
            thread::sleep(self.tick_period);

            if self.state() != BattleState::Running {
                break;
            }

            let participants = {
                let mut world = self.world.write().expect("world lock poisoned");

                let mut participants: Vec<RobotId> = self
                    .gates
                    .iter()
                    .enumerate()
                    .filter(|&(idx, gate)| gate.is_armed() && !world.robots()[idx].dead())
                    .map(|(idx, _)| idx)
                    .collect();
                participants.shuffle(&mut self.rng);

                for &idx in &participants {
                    if let Some(command) = self.gates[idx].take_intent() {
                        world.robot_mut(idx).command = command;
                    }
                }

                world.apply_tick(&participants, &mut self.rng);
                tracing::debug!(
                    turn = world.stats().turn(),
                    participants = participants.len(),
                    "turn committed"
                );
                participants
            };

            // Release everyone who participated - the dead included, so
            // they can observe their own death.
            for &idx in &participants {
                self.gates[idx].release();
            }
        }

        let outcome = {
            let mut world = self.world.write().expect("world lock poisoned");
            let outcome = BattleOutcome {
                winner: world.sole_survivor().map(|robot| robot.name().to_string()),
                turns: world.stats().turn(),
                state: world.stats().state(),
            };
            world.stats.set_state(BattleState::Stopped);
            outcome
        };

        for gate in &self.gates {
            gate.close();
        }
        tracing::info!(state = ?outcome.state, turns = outcome.turns, "battle stopped");
        Ok(outcome)
    }

    fn state(&self) -> BattleState {
        self.world.read().expect("world lock poisoned").stats().state()
    }
}

impl fmt::Debug for Battle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Battle")
            .field("agents", &self.gates.len())
            .field("tick_period", &self.tick_period)
            .finish_non_exhaustive()
    }
}

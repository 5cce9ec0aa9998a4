//! Per-battle statistics and lifecycle state.

use serde::{Deserialize, Serialize};

/// Lifecycle state of a battle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BattleState {
    /// The battle loop is advancing turns.
    Running,
    /// The win condition was reached; at most one robot survives.
    Ended,
    /// The battle was shut down, normally or externally.
    Stopped,
}

/// Battle-wide counters, owned by the scheduler.
///
/// Everything outside the scheduler reads these through a snapshot; only
/// the battle loop mutates them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
    turn: u64,
    state: BattleState,
    robots: usize,
    alive_robots: usize,
}

impl Statistics {
    /// Create statistics for a battle with `robots` combatants.
    #[must_use]
    pub fn new(robots: usize) -> Self {
        Self {
            turn: 0,
            state: BattleState::Running,
            robots,
            alive_robots: robots,
        }
    }

    /// Current turn index. Starts at 0 and advances once per physics pass.
    #[must_use]
    pub const fn turn(&self) -> u64 {
        self.turn
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> BattleState {
        self.state
    }

    /// Total number of robots in the battle.
    #[must_use]
    pub const fn robots(&self) -> usize {
        self.robots
    }

    /// Number of robots still alive.
    #[must_use]
    pub const fn alive_robots(&self) -> usize {
        self.alive_robots
    }

    pub(crate) fn advance_turn(&mut self) {
        self.turn += 1;
    }

    pub(crate) fn set_state(&mut self, state: BattleState) {
        self.state = state;
    }

    pub(crate) fn set_alive_robots(&mut self, alive: usize) {
        self.alive_robots = alive;
    }
}

//! Error types for the arena simulation.

use thiserror::Error;

/// Result type alias using [`BattleError`].
pub type Result<T> = std::result::Result<T, BattleError>;

/// Failures surfaced to an agent's control loop.
///
/// These are the only errors agent code ever observes. Both mean the same
/// thing to a control loop: stop issuing intents and return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ExecutionError {
    /// The agent's robot has been destroyed.
    #[error("agent is dead")]
    AgentDead,

    /// The battle has ended or was stopped.
    #[error("battle is not running")]
    BattleNotRunning,
}

/// Top-level error type for battle setup and lifecycle failures.
#[derive(Debug, Error)]
pub enum BattleError {
    /// A battle needs at least two combatants.
    #[error("roster too small: {0} agents, need at least 2")]
    RosterTooSmall(usize),

    /// Battlefield dimensions cannot hold a robot.
    #[error("invalid battlefield: {width}x{height}")]
    InvalidBattlefield {
        /// Configured width.
        width: u32,
        /// Configured height.
        height: u32,
    },

    /// Rejection sampling failed to find a free starting position.
    #[error("could not place robot '{0}' after {1} attempts")]
    PlacementFailed(String, u32),

    /// A control thread could not be spawned.
    #[error("failed to spawn control thread: {0}")]
    ControlThread(#[from] std::io::Error),
}

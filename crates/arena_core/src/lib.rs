//! # Arena Core
//!
//! Simulation core for a turn-based, multi-agent robot combat arena.
//!
//! Independent agents, each driven by its own control thread, share a
//! bounded 2D battlefield, fire projectiles, collide with walls and each
//! other, and are scored on survival. This crate contains the engine:
//!
//! - [`rules`] - pure physical rules (acceleration, turn damping, gun
//!   heat, bullet ballistics)
//! - [`events`] - the timestamped, priority-ordered event model with
//!   bounded retention
//! - [`robot`] / [`bullet`] - the entity state machines and their
//!   collision handling
//! - [`battle`] - the scheduler: one physics pass per wall-clock turn
//!   under a world snapshot lock
//! - [`gate`] - the per-agent rendezvous that parks a control thread
//!   between "intent committed" and "turn committed"
//!
//! Rendering, sample strategies and process bootstrapping live in the
//! outer crates; they consume this core only through [`link::AgentLink`]
//! and the read side of the world lock.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod battle;
pub mod bullet;
pub mod command;
pub mod config;
pub mod error;
pub mod events;
pub mod gate;
pub mod geom;
pub mod link;
pub mod math;
pub mod robot;
pub mod rules;
pub mod stats;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::battle::{AgentSpec, Battle, BattleHandle, BattleOutcome, World};
    pub use crate::bullet::{BulletCore, BulletState};
    pub use crate::command::Command;
    pub use crate::config::{BattleConfig, Battlefield};
    pub use crate::error::{BattleError, ExecutionError, Result};
    pub use crate::events::{Event, EventPayload, EventQueue};
    pub use crate::link::AgentLink;
    pub use crate::robot::{RobotCore, RobotId, RobotState, RobotStatus};
    pub use crate::stats::{BattleState, Statistics};
}

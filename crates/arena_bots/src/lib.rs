//! # Arena Bots
//!
//! The agent-side surface of the robot combat arena: the [`Robot`]
//! strategy trait, the [`Controls`] facade a strategy issues intents
//! against, the control-loop runner, and a handful of bundled sample
//! strategies.
//!
//! A strategy implements [`Robot::tick`] plus whichever event hooks it
//! cares about; [`controls::run_robot`] turns it into the control-thread
//! body the core expects for its roster.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod controls;
pub mod robot;
pub mod samples;

pub use controls::{run_robot, Controls, WaitUntil};
pub use robot::Robot;

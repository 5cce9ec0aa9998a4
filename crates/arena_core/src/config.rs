//! Battle configuration data.
//!
//! These are pure data structures designed to be deserialized from RON
//! files. This module contains no IO - file loading is handled by the
//! outer binary.

use serde::{Deserialize, Serialize};

use crate::error::{BattleError, Result};
use crate::robot::RobotCore;

/// External configuration for a battle.
///
/// Battlefield dimensions and the agent roster are the only inputs the
/// core requires at setup; everything else is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleConfig {
    /// Battlefield width in units.
    pub width: u32,
    /// Battlefield height in units.
    pub height: u32,
    /// Wall-clock duration of one turn, in milliseconds.
    pub tick_period_ms: u64,
    /// Seed for the battle RNG. `None` draws a fresh seed per battle.
    pub seed: Option<u64>,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            tick_period_ms: 100,
            seed: None,
        }
    }
}

impl BattleConfig {
    /// Check that a robot can physically fit on the configured field.
    ///
    /// # Errors
    ///
    /// Returns [`BattleError::InvalidBattlefield`] if either dimension is
    /// smaller than a robot's bounding box.
    pub fn validate(&self) -> Result<()> {
        if f64::from(self.width) < RobotCore::WIDTH || f64::from(self.height) < RobotCore::HEIGHT {
            return Err(BattleError::InvalidBattlefield {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }
}

/// The immutable battlefield rectangle.
///
/// All robot and bullet positions stay within `[radius, dimension - radius]`
/// after wall-collision resolution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Battlefield {
    /// Field width in units.
    pub width: f64,
    /// Field height in units.
    pub height: f64,
}

impl Battlefield {
    /// Build the battlefield described by a configuration.
    #[must_use]
    pub fn new(config: &BattleConfig) -> Self {
        Self {
            width: f64::from(config.width),
            height: f64::from(config.height),
        }
    }
}

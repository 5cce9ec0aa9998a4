//! Bundled sample strategies.
//!
//! Small, readable opponents for smoke-testing the arena and for new
//! strategies to spar against.

mod rammer;
mod spinner;
mod turret;
mod wallrider;

pub use rammer::Rammer;
pub use spinner::Spinner;
pub use turret::Turret;
pub use wallrider::WallRider;

use arena_core::battle::AgentSpec;

use crate::controls::run_robot;

/// Names accepted by [`spec_for`].
pub const SAMPLE_NAMES: &[&str] = &["spinner", "turret", "wallrider", "rammer"];

/// Build the roster entry for a bundled strategy by name.
#[must_use]
pub fn spec_for(name: &str) -> Option<AgentSpec> {
    match name {
        "spinner" => Some(AgentSpec::new("Spinner", |link| {
            run_robot(Spinner::default(), link);
        })),
        "turret" => Some(AgentSpec::new("Turret", |link| {
            run_robot(Turret::default(), link);
        })),
        "wallrider" => Some(AgentSpec::new("WallRider", |link| {
            run_robot(WallRider::default(), link);
        })),
        "rammer" => Some(AgentSpec::new("Rammer", |link| {
            run_robot(Rammer::default(), link);
        })),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_sample_name_resolves() {
        for name in SAMPLE_NAMES {
            assert!(spec_for(name).is_some(), "unknown sample {name}");
        }
        assert!(spec_for("no_such_bot").is_none());
    }
}

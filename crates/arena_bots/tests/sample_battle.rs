//! Smoke battles exercising the runner, hooks and sample strategies
//! against the real scheduler.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use arena_bots::samples::spec_for;
use arena_bots::{run_robot, Controls, Robot};
use arena_core::prelude::*;
use arena_core::robot::RobotStatus;

fn fast_config(seed: u64) -> BattleConfig {
    BattleConfig {
        width: 600,
        height: 400,
        tick_period_ms: 1,
        seed: Some(seed),
    }
}

#[test]
fn test_samples_battle_without_panicking() {
    let roster = vec![
        spec_for("spinner").unwrap(),
        spec_for("rammer").unwrap(),
        spec_for("turret").unwrap(),
        spec_for("wallrider").unwrap(),
    ];
    let battle = Battle::new(fast_config(5), roster).expect("setup");
    let handle = battle.handle();
    let runner = thread::spawn(move || battle.run().expect("run"));

    // Give the melee some time, then stop whatever is left standing.
    thread::sleep(Duration::from_millis(500));
    handle.stop();
    let outcome = runner.join().expect("battle thread");

    assert!(matches!(
        outcome.state,
        BattleState::Ended | BattleState::Stopped
    ));
    assert!(outcome.turns > 0);
}

/// A strategy that counts the hooks the runner feeds it.
struct Recorder {
    statuses: Arc<AtomicU32>,
    ticks: Arc<AtomicU32>,
}

impl Robot for Recorder {
    fn tick(&mut self, _ctl: &mut Controls) {
        self.ticks.fetch_add(1, Ordering::SeqCst);
    }

    fn on_status(&mut self, _ctl: &mut Controls, _status: &RobotStatus) {
        self.statuses.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn test_runner_dispatches_status_every_turn() {
    let statuses = Arc::new(AtomicU32::new(0));
    let ticks = Arc::new(AtomicU32::new(0));

    let recorder = Recorder {
        statuses: Arc::clone(&statuses),
        ticks: Arc::clone(&ticks),
    };
    let roster = vec![
        AgentSpec::new("Recorder", move |link| run_robot(recorder, link)),
        spec_for("turret").unwrap(),
    ];

    let battle = Battle::new(fast_config(21), roster).expect("setup");
    let handle = battle.handle();
    let runner = thread::spawn(move || battle.run().expect("run"));

    thread::sleep(Duration::from_millis(300));
    handle.stop();
    runner.join().expect("battle thread");

    // Wait for the control threads to drain.
    thread::sleep(Duration::from_millis(50));

    assert!(
        statuses.load(Ordering::SeqCst) > 0,
        "the seeded first-turn status must reach the hook"
    );
    assert!(ticks.load(Ordering::SeqCst) > 0, "tick ran at least once");
}

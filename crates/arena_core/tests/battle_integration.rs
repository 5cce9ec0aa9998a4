//! End-to-end battles over the real scheduler, turn gates and control
//! threads.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use arena_core::math::normalize_bearing;
use arena_core::prelude::*;

fn fast_config(seed: u64) -> BattleConfig {
    BattleConfig {
        width: 800,
        height: 600,
        tick_period_ms: 1,
        seed: Some(seed),
    }
}

/// An agent that commits empty intents until the battle shuts it down,
/// recording the error that stopped it.
fn idle_agent(stopped: Arc<Mutex<Option<ExecutionError>>>) -> impl FnOnce(AgentLink) {
    move |link: AgentLink| {
        let mut queue = EventQueue::new();
        loop {
            match link.execute(Command::idle()) {
                Ok(_) => {
                    link.refresh_events(&mut queue);
                    while queue.pop().is_some() {}
                }
                Err(err) => {
                    *stopped.lock().unwrap() = Some(err);
                    break;
                }
            }
        }
    }
}

#[test]
fn test_stop_unblocks_all_agents() {
    let errors: Vec<Arc<Mutex<Option<ExecutionError>>>> =
        (0..3).map(|_| Arc::new(Mutex::new(None))).collect();

    let roster = errors
        .iter()
        .map(|slot| AgentSpec::new("idler", idle_agent(Arc::clone(slot))))
        .collect();

    let battle = Battle::new(fast_config(11), roster).expect("setup");
    let handle = battle.handle();
    let runner = thread::spawn(move || battle.run().expect("run"));

    // Let a few turns pass, then pull the plug.
    thread::sleep(Duration::from_millis(100));
    handle.stop();

    let outcome = runner.join().expect("battle thread");
    assert_eq!(outcome.state, BattleState::Stopped);
    assert_eq!(outcome.winner, None);
    assert!(outcome.turns > 0, "idle agents must still drive turns");

    // Every control loop observed the shutdown and exited.
    for slot in &errors {
        let mut waited = 0;
        while slot.lock().unwrap().is_none() && waited < 1_000 {
            thread::sleep(Duration::from_millis(5));
            waited += 5;
        }
        assert_eq!(
            *slot.lock().unwrap(),
            Some(ExecutionError::BattleNotRunning)
        );
    }
}

#[test]
fn test_execute_after_battle_end_fails_immediately() {
    let roster = vec![
        AgentSpec::new("idler", |link: AgentLink| {
            while link.execute(Command::idle()).is_ok() {}
        }),
        AgentSpec::new("idler", |link: AgentLink| {
            while link.execute(Command::idle()).is_ok() {}
        }),
    ];
    let battle = Battle::new(fast_config(12), roster).expect("setup");
    let handle = battle.handle();
    let runner = thread::spawn(move || battle.run().expect("run"));

    thread::sleep(Duration::from_millis(50));
    handle.stop();
    runner.join().expect("battle thread");

    assert_eq!(handle.state(), BattleState::Stopped);
}

#[test]
fn test_duel_runs_to_victory() {
    // A stationary gunner with perfect information against a sitting
    // duck. The gunner reads the committed world snapshot each turn,
    // walks its gun onto the target and fires whenever the gun is cool.
    let victim_events: Arc<Mutex<Vec<EventPayload>>> = Arc::new(Mutex::new(Vec::new()));
    let hunter_events: Arc<Mutex<Vec<EventPayload>>> = Arc::new(Mutex::new(Vec::new()));
    let hunter_saw_hit = Arc::new(AtomicBool::new(false));

    let config = fast_config(1234);
    let mut roster = Vec::new();

    let hunter_log = Arc::clone(&hunter_events);
    let saw_hit = Arc::clone(&hunter_saw_hit);
    let world_slot: Arc<Mutex<Option<Arc<std::sync::RwLock<World>>>>> =
        Arc::new(Mutex::new(None));
    let hunter_world = Arc::clone(&world_slot);
    roster.push(AgentSpec::new("hunter", move |link: AgentLink| {
        let world = hunter_world.lock().unwrap().clone().expect("world wired");
        let mut queue = EventQueue::new();
        loop {
            let (aim, aligned) = {
                let world = world.read().unwrap();
                let me = world.robot(link.id());
                let Some(enemy) = world
                    .robots()
                    .iter()
                    .find(|robot| robot.name() != me.name() && !robot.dead())
                else {
                    break;
                };
                let wanted = (enemy.x() - me.x()).atan2(enemy.y() - me.y());
                let remaining = normalize_bearing(wanted - me.gun_heading());
                (remaining, remaining.abs() < 1e-6)
            };

            let mut command = Command::idle();
            command.lock_gun_to_body = false;
            command.lock_radar_to_gun = false;
            command.turn_gun = aim;
            if aligned && link.gun_heat() == 0.0 {
                command.fire = 3.0;
            }

            if link.execute(command).is_err() {
                break;
            }
            link.refresh_events(&mut queue);
            while let Some(event) = queue.pop() {
                if matches!(event.payload, EventPayload::BulletHit { .. }) {
                    saw_hit.store(true, Ordering::SeqCst);
                }
                hunter_log.lock().unwrap().push(event.payload);
            }
        }
        // Final drain: the victory may have landed on the ending turn.
        let mut queue = EventQueue::new();
        link.refresh_events(&mut queue);
        while let Some(event) = queue.pop() {
            hunter_log.lock().unwrap().push(event.payload);
        }
    }));

    let victim_log = Arc::clone(&victim_events);
    roster.push(AgentSpec::new("duck", move |link: AgentLink| {
        let mut queue = EventQueue::new();
        loop {
            if link.execute(Command::idle()).is_err() {
                break;
            }
            link.refresh_events(&mut queue);
            while let Some(event) = queue.pop() {
                victim_log.lock().unwrap().push(event.payload);
            }
        }
        let mut queue = EventQueue::new();
        link.refresh_events(&mut queue);
        while let Some(event) = queue.pop() {
            victim_log.lock().unwrap().push(event.payload);
        }
    }));

    let battle = Battle::new(config, roster).expect("setup");
    *world_slot.lock().unwrap() = Some(battle.world());

    let outcome = battle.run().expect("run");

    assert_eq!(outcome.state, BattleState::Ended);
    assert_eq!(outcome.winner.as_deref(), Some("hunter"));
    assert!(hunter_saw_hit.load(Ordering::SeqCst), "hunter landed hits");

    let victim_seen = victim_events.lock().unwrap();
    assert!(
        victim_seen
            .iter()
            .any(|payload| matches!(payload, EventPayload::HitByBullet { .. })),
        "victim observed incoming fire"
    );
    assert!(
        victim_seen
            .iter()
            .any(|payload| matches!(payload, EventPayload::Death)),
        "victim observed its own death"
    );

    let hunter_seen = hunter_events.lock().unwrap();
    assert!(
        hunter_seen
            .iter()
            .any(|payload| matches!(payload, EventPayload::Victory)),
        "winner observed its victory"
    );
}

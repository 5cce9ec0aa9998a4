//! The turn gate: the per-agent rendezvous between "intent committed"
//! and "turn committed".
//!
//! An agent's control thread commits a command and blocks; the battle
//! loop collects committed intents, applies the physics turn, then
//! replies through the gate, waking the agent. This is the sole
//! suspension point for agent logic.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{sync_channel, Receiver, SyncSender};
use std::sync::Mutex;

use thiserror::Error;

use crate::command::Command;

/// Commit attempted against a gate that was shut down with the battle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("turn gate is closed")]
pub struct GateClosed;

/// Observable state of a gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    /// The agent may run exactly one batch of intents before blocking
    /// again.
    Released,
    /// An intent is committed; the scheduler will include this agent in
    /// the next physics pass.
    Armed,
    /// The agent's control thread is parked, waiting for the turn
    /// commit.
    Blocked,
}

struct GateInner {
    intent: Option<Command>,
    closed: bool,
}

/// One agent's synchronization point with the battle loop.
pub struct TurnGate {
    inner: Mutex<GateInner>,
    parked: AtomicBool,
    reply_tx: SyncSender<()>,
    reply_rx: Mutex<Receiver<()>>,
}

impl TurnGate {
    /// Create a gate in the Released state.
    #[must_use]
    pub fn new() -> Self {
        let (reply_tx, reply_rx) = sync_channel(1);
        Self {
            inner: Mutex::new(GateInner {
                intent: None,
                closed: false,
            }),
            parked: AtomicBool::new(false),
            reply_tx,
            reply_rx: Mutex::new(reply_rx),
        }
    }

    /// Current gate state, for inspection.
    #[must_use]
    pub fn state(&self) -> GateState {
        if self.parked.load(Ordering::SeqCst) {
            GateState::Blocked
        } else if self.inner.lock().expect("gate lock poisoned").intent.is_some() {
            GateState::Armed
        } else {
            GateState::Released
        }
    }

    /// Agent side: commit an intent and block until the battle loop
    /// processes the turn and releases the gate.
    ///
    /// # Errors
    ///
    /// Fails with [`GateClosed`] once the battle has shut the gate down.
    pub fn submit(&self, command: Command) -> Result<(), GateClosed> {
        {
            let mut inner = self.inner.lock().expect("gate lock poisoned");
            if inner.closed {
                return Err(GateClosed);
            }
            inner.intent = Some(command);
        }

        self.parked.store(true, Ordering::SeqCst);
        let reply = self
            .reply_rx
            .lock()
            .expect("gate lock poisoned")
            .recv();
        self.parked.store(false, Ordering::SeqCst);
        reply.map_err(|_| GateClosed)
    }

    /// Scheduler side: whether an intent is committed and waiting.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        let inner = self.inner.lock().expect("gate lock poisoned");
        inner.intent.is_some() && !inner.closed
    }

    /// Scheduler side: take the committed intent for this turn.
    pub(crate) fn take_intent(&self) -> Option<Command> {
        self.inner.lock().expect("gate lock poisoned").intent.take()
    }

    /// Scheduler side: wake the parked agent after the turn commit.
    pub(crate) fn release(&self) {
        // Buffered channel: a release never races the park into a lost
        // wakeup.
        let _ = self.reply_tx.try_send(());
    }

    /// Scheduler side: shut the gate down at battle teardown. A parked
    /// agent wakes once more; every later commit fails immediately.
    pub(crate) fn close(&self) {
        self.inner.lock().expect("gate lock poisoned").closed = true;
        let _ = self.reply_tx.try_send(());
    }
}

impl Default for TurnGate {
    fn default() -> Self {
        Self::new()
    }
}

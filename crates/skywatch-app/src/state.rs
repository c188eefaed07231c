//! Shared state between the operations facade and the simulation loop
//! thread.

use std::sync::mpsc;
use std::sync::{Arc, Mutex};

use skywatch_core::commands::OperatorCommand;
use skywatch_core::events::LogEvent;
use skywatch_core::records::EliminationEvent;
use skywatch_core::state::WorldSnapshot;

/// Commands sent from the facade to the simulation loop thread.
#[derive(Debug)]
pub enum ControlCommand {
    /// An operator command to forward to the engine.
    Operator(OperatorCommand),
    /// Shut down the loop thread gracefully.
    Shutdown,
}

/// Fire-and-forget sink for the engine's structured log events.
pub type LogCallback = Box<dyn Fn(&LogEvent) + Send + Sync>;

/// State shared between the facade and the loop thread.
///
/// - `mpsc::Sender` sits behind a `Mutex` (it is Send but not Sync).
/// - The latest snapshot is replaced whole after every tick, so readers
///   never observe a half-updated world.
/// - Elimination events accumulate until a reader drains them.
pub struct SharedState {
    /// Channel to the loop thread. `None` until the loop is spawned.
    pub command_tx: Mutex<Option<mpsc::Sender<ControlCommand>>>,
    /// Latest snapshot, replaced after each tick.
    pub latest_snapshot: Arc<Mutex<Option<WorldSnapshot>>>,
    /// Drain-on-read elimination queue.
    pub pending_eliminations: Arc<Mutex<Vec<EliminationEvent>>>,
}

impl Default for SharedState {
    fn default() -> Self {
        Self {
            command_tx: Mutex::new(None),
            latest_snapshot: Arc::new(Mutex::new(None)),
            pending_eliminations: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl SharedState {
    pub fn new() -> Self {
        Self::default()
    }
}

//! Simulation loop thread — runs the engine at the fixed tick rate and
//! publishes snapshots.
//!
//! The engine is created inside the thread; commands arrive via `mpsc` and
//! are queued for the next tick boundary, so external operations are always
//! serialized against the tick. Snapshots are stored whole for synchronous
//! polling; log events go to the registered callback fire-and-forget.

use std::sync::mpsc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use skywatch_core::constants::TICK_RATE;
use skywatch_sim::engine::{SimConfig, SimulationEngine};

use crate::state::{ControlCommand, LogCallback, SharedState};

/// Nominal duration of one tick at 1x speed.
const TICK_DURATION: Duration = Duration::from_nanos(1_000_000_000 / TICK_RATE as u64);

/// Spawns the simulation loop in a new thread.
///
/// Returns the command sender for the facade to use.
pub fn spawn_sim_loop(
    config: SimConfig,
    state: Arc<SharedState>,
    log_callback: Option<LogCallback>,
) -> mpsc::Sender<ControlCommand> {
    let (cmd_tx, cmd_rx) = mpsc::channel::<ControlCommand>();

    std::thread::Builder::new()
        .name("skywatch-sim-loop".into())
        .spawn(move || {
            run_sim_loop(config, cmd_rx, &state, log_callback);
        })
        .expect("Failed to spawn simulation loop thread");

    cmd_tx
}

/// The simulation loop. Runs until Shutdown or channel disconnect.
fn run_sim_loop(
    config: SimConfig,
    cmd_rx: mpsc::Receiver<ControlCommand>,
    state: &SharedState,
    log_callback: Option<LogCallback>,
) {
    let mut engine = SimulationEngine::new(config);
    let mut next_tick_time = Instant::now();
    tracing::info!(tick_rate = TICK_RATE, "simulation loop started");

    loop {
        // 1. Drain all pending commands into the engine queue.
        loop {
            match cmd_rx.try_recv() {
                Ok(ControlCommand::Operator(cmd)) => engine.queue_command(cmd),
                Ok(ControlCommand::Shutdown) => {
                    tracing::info!("simulation loop shutting down");
                    return;
                }
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => return,
            }
        }

        // 2. Advance one tick.
        let snapshot = engine.tick();

        // 3. Forward log events to the callback, fire-and-forget.
        if let Some(callback) = &log_callback {
            for event in &snapshot.log {
                callback(event);
            }
        }

        // 4. Accumulate eliminations for drain-on-read consumers.
        if !snapshot.eliminations.is_empty() {
            if let Ok(mut pending) = state.pending_eliminations.lock() {
                pending.extend(snapshot.eliminations.iter().cloned());
            }
        }

        // 5. Publish the snapshot whole.
        if let Ok(mut lock) = state.latest_snapshot.lock() {
            *lock = Some(snapshot);
        }

        // 6. Sleep until the next tick, scaled by the speed multiplier.
        let time_scale = engine.time_scale();
        let effective_tick_duration = if time_scale > 0.001 {
            TICK_DURATION.div_f64(time_scale)
        } else {
            TICK_DURATION
        };

        next_tick_time += effective_tick_duration;
        let now = Instant::now();
        if next_tick_time > now {
            std::thread::sleep(next_tick_time - now);
        } else if now - next_tick_time > effective_tick_duration * 2 {
            // Too far behind; reset to avoid a catch-up spiral.
            tracing::warn!(
                behind_ms = (now - next_tick_time).as_millis() as u64,
                "simulation loop falling behind, resetting schedule"
            );
            next_tick_time = now;
        }
    }
}

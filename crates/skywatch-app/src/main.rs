//! Headless SKYWATCH monitor: runs the simulation loop and mirrors the
//! engine's audit log and a periodic fleet summary to the console.

use std::time::Duration;

use tracing_subscriber::EnvFilter;

use skywatch_app::state::LogCallback;
use skywatch_app::Operations;
use skywatch_core::enums::{DroneStatus, LogStatus};
use skywatch_sim::engine::SimConfig;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let log_bridge: LogCallback = Box::new(|event| match event.status {
        LogStatus::Success => {
            tracing::info!(target: "skywatch::audit", tick = event.tick, entity = %event.target, "{}: {}", event.command, event.details);
        }
        LogStatus::Failed => {
            tracing::warn!(target: "skywatch::audit", tick = event.tick, entity = %event.target, "{}: {}", event.command, event.details);
        }
    });

    let ops = Operations::launch(SimConfig::default(), Some(log_bridge));

    loop {
        std::thread::sleep(Duration::from_secs(10));
        let Some(snapshot) = ops.snapshot() else {
            continue;
        };

        let airborne = snapshot
            .drones
            .iter()
            .filter(|d| d.status != DroneStatus::Grounded)
            .count();
        tracing::info!(
            tick = snapshot.time.tick,
            drones = snapshot.drones.len(),
            airborne,
            threats = snapshot.threats.len(),
            contacts = snapshot.ufos.len(),
            pending_requests = snapshot.action_requests.len(),
            designations = snapshot.designations.len(),
            "fleet status"
        );

        for event in ops.drain_elimination_events() {
            tracing::info!(
                target: "skywatch::audit",
                tick = event.tick,
                "target {} eliminated at ({:.5}, {:.5})",
                event.target_id,
                event.location.lat,
                event.location.lon
            );
        }
    }
}

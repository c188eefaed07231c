//! The `Operations` facade — the only surface presentation layers use.
//!
//! Reads return deep snapshot clones; commands and approvals are queued
//! operator commands applied at the next tick boundary. Unknown entity ids
//! are resolved inside the engine as logged no-ops; the errors here cover
//! only the transport itself (loop not running, channel gone).

use std::sync::Arc;

use thiserror::Error;

use skywatch_core::commands::{
    CommandScope, DroneAction, OperatorCommand, TurretOrder,
};
use skywatch_core::enums::ActionKind;
use skywatch_core::records::{EliminationEvent, Geofence};
use skywatch_core::state::{
    DroneView, ThreatView, TurretView, UfoView, WorldSnapshot,
};
use skywatch_sim::engine::SimConfig;

use crate::sim_loop;
use crate::state::{ControlCommand, LogCallback, SharedState};

/// Transport-level operation failures.
#[derive(Debug, Error)]
pub enum OpsError {
    #[error("simulation loop is not running")]
    NotRunning,
    #[error("simulation loop channel closed")]
    ChannelClosed,
    #[error("shared state lock poisoned")]
    Poisoned,
}

/// Handle to a running simulation.
pub struct Operations {
    state: Arc<SharedState>,
}

impl Operations {
    /// Start the simulation loop and return the facade for it.
    pub fn launch(config: SimConfig, log_callback: Option<LogCallback>) -> Self {
        let state = Arc::new(SharedState::new());
        let tx = sim_loop::spawn_sim_loop(config, state.clone(), log_callback);
        if let Ok(mut lock) = state.command_tx.lock() {
            *lock = Some(tx);
        }
        Self { state }
    }

    /// Facade over existing shared state; the loop may not be running yet.
    pub fn over(state: Arc<SharedState>) -> Self {
        Self { state }
    }

    /// Ask the loop thread to stop after its current tick.
    pub fn shutdown(&self) -> Result<(), OpsError> {
        self.send_control(ControlCommand::Shutdown)
    }

    // --- Reads ---

    /// The latest full snapshot, if a tick has completed yet.
    pub fn snapshot(&self) -> Option<WorldSnapshot> {
        self.state
            .latest_snapshot
            .lock()
            .ok()
            .and_then(|lock| lock.clone())
    }

    pub fn fetch_drones(&self) -> Vec<DroneView> {
        self.snapshot().map(|s| s.drones).unwrap_or_default()
    }

    pub fn fetch_threats(&self) -> Vec<ThreatView> {
        self.snapshot().map(|s| s.threats).unwrap_or_default()
    }

    pub fn fetch_ufos(&self) -> Vec<UfoView> {
        self.snapshot().map(|s| s.ufos).unwrap_or_default()
    }

    pub fn fetch_counter_uas(&self) -> Vec<TurretView> {
        self.snapshot().map(|s| s.turrets).unwrap_or_default()
    }

    pub fn fetch_action_requests(&self) -> Vec<skywatch_core::records::ActionRequest> {
        self.snapshot().map(|s| s.action_requests).unwrap_or_default()
    }

    pub fn fetch_designations(&self) -> Vec<skywatch_core::records::TargetDesignation> {
        self.snapshot().map(|s| s.designations).unwrap_or_default()
    }

    pub fn fetch_suggestions(&self) -> Vec<skywatch_core::records::FlightSuggestion> {
        self.snapshot().map(|s| s.suggestions).unwrap_or_default()
    }

    pub fn fetch_anomalies(&self) -> Vec<skywatch_core::records::Anomaly> {
        self.snapshot().map(|s| s.anomalies).unwrap_or_default()
    }

    /// Elimination events since the last drain. Consuming read.
    pub fn drain_elimination_events(&self) -> Vec<EliminationEvent> {
        self.state
            .pending_eliminations
            .lock()
            .map(|mut pending| std::mem::take(&mut *pending))
            .unwrap_or_default()
    }

    // --- Commands ---

    /// Submit a flight order for a fleet scope.
    pub fn command(&self, scope: CommandScope, action: DroneAction) -> Result<(), OpsError> {
        self.send(OperatorCommand::Drone { scope, action })
    }

    // --- Approvals ---

    pub fn respond_action(&self, request_id: &str, approved: bool) -> Result<(), OpsError> {
        self.send(OperatorCommand::RespondAction {
            request_id: request_id.to_string(),
            approved,
        })
    }

    pub fn override_action(&self, request_id: &str, action: ActionKind) -> Result<(), OpsError> {
        self.send(OperatorCommand::OverrideAction {
            request_id: request_id.to_string(),
            action,
        })
    }

    pub fn respond_designation(
        &self,
        request_id: &str,
        approved: bool,
        drone_id: Option<String>,
    ) -> Result<(), OpsError> {
        self.send(OperatorCommand::RespondDesignation {
            request_id: request_id.to_string(),
            approved,
            drone_id,
        })
    }

    pub fn respond_suggestion(&self, suggestion_id: &str, approved: bool) -> Result<(), OpsError> {
        self.send(OperatorCommand::RespondSuggestion {
            suggestion_id: suggestion_id.to_string(),
            approved,
        })
    }

    pub fn acknowledge_threat(&self, threat_id: &str) -> Result<(), OpsError> {
        self.send(OperatorCommand::AcknowledgeThreat {
            threat_id: threat_id.to_string(),
        })
    }

    pub fn turret_command(&self, system_id: &str, order: TurretOrder) -> Result<(), OpsError> {
        self.send(OperatorCommand::Turret {
            system_id: system_id.to_string(),
            order,
        })
    }

    pub fn start_repair(&self, anomaly_id: &str) -> Result<(), OpsError> {
        self.send(OperatorCommand::StartRepair {
            anomaly_id: anomaly_id.to_string(),
        })
    }

    // --- Configuration ---

    /// Push the geofence set used by the dispatchers.
    pub fn set_geofences(&self, geofences: Vec<Geofence>) -> Result<(), OpsError> {
        self.send(OperatorCommand::SetGeofences { geofences })
    }

    /// Set the global speed multiplier.
    pub fn set_time_scale(&self, scale: f64) -> Result<(), OpsError> {
        self.send(OperatorCommand::SetTimeScale { scale })
    }

    fn send(&self, command: OperatorCommand) -> Result<(), OpsError> {
        self.send_control(ControlCommand::Operator(command))
    }

    fn send_control(&self, command: ControlCommand) -> Result<(), OpsError> {
        let lock = self.state.command_tx.lock().map_err(|_| OpsError::Poisoned)?;
        match lock.as_ref() {
            Some(tx) => tx.send(command).map_err(|_| OpsError::ChannelClosed),
            None => Err(OpsError::NotRunning),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_facade_without_running_loop() {
        let ops = Operations::over(Arc::new(SharedState::new()));
        assert!(matches!(
            ops.respond_action("req-1", true),
            Err(OpsError::NotRunning)
        ));
        assert!(ops.snapshot().is_none());
        assert!(ops.fetch_drones().is_empty());
        assert!(ops.drain_elimination_events().is_empty());
    }

    #[test]
    fn test_drain_is_consuming() {
        use skywatch_core::records::EliminationEvent;
        use skywatch_core::types::GeoPos;

        let state = Arc::new(SharedState::new());
        state
            .pending_eliminations
            .lock()
            .unwrap()
            .push(EliminationEvent {
                target_id: "ufo-1".into(),
                location: GeoPos::new(6.2, 1.4, 100.0),
                tick: 10,
            });

        let ops = Operations::over(state);
        assert_eq!(ops.drain_elimination_events().len(), 1);
        assert!(
            ops.drain_elimination_events().is_empty(),
            "second drain must be empty"
        );
    }
}

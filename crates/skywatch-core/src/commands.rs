//! Operator commands sent from the presentation layer to the engine.
//!
//! Commands are validated and queued for processing at the next tick
//! boundary; a command addressing an unknown entity is a logged no-op,
//! never a fault inside the tick loop.

use serde::{Deserialize, Serialize};

use crate::enums::ActionKind;
use crate::records::Geofence;
use crate::types::GeoPos;

/// Which drones a fleet command addresses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandScope {
    /// Every drone in the fleet.
    Fleet,
    /// A named set of drones.
    Group { ids: Vec<String> },
    /// A single drone.
    Single { id: String },
}

/// Per-drone flight orders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DroneAction {
    Launch,
    Land,
    ReturnToBase,
    PlanMission { target: GeoPos },
    AcquireTarget { target: GeoPos },
    StartMission,
    CancelMission,
    SetMissionParameters {
        speed_mps: Option<f64>,
        altitude_m: Option<f64>,
    },
}

/// Orders for a counter-UAS installation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurretOrder {
    CeaseFire,
}

/// All possible operator actions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum OperatorCommand {
    // --- Fleet control ---
    /// A flight order addressed by scope.
    Drone {
        scope: CommandScope,
        action: DroneAction,
    },

    // --- Approval workflow ---
    /// Approve or deny a pending action request.
    RespondAction { request_id: String, approved: bool },
    /// Substitute a different action for a pending request.
    OverrideAction {
        request_id: String,
        action: ActionKind,
    },
    /// Approve or deny a target designation, optionally naming the drone.
    RespondDesignation {
        request_id: String,
        approved: bool,
        drone_id: Option<String>,
    },
    /// Approve or deny a flight-path suggestion.
    RespondSuggestion {
        suggestion_id: String,
        approved: bool,
    },
    /// Acknowledge a threat (no dispatch implied).
    AcknowledgeThreat { threat_id: String },

    // --- Ground defense ---
    /// Order a counter-UAS installation.
    Turret {
        system_id: String,
        order: TurretOrder,
    },

    // --- Maintenance ---
    /// Begin the auto-repair workflow for a pending anomaly.
    StartRepair { anomaly_id: String },

    // --- Configuration ---
    /// Replace the geofence set used by the dispatchers.
    SetGeofences { geofences: Vec<Geofence> },
    /// Set the global speed multiplier (wall-clock pacing only).
    SetTimeScale { scale: f64 },
}

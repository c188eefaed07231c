//! World snapshot — the complete visible state published after each tick.

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::events::LogEvent;
use crate::records::{
    ActionRequest, Anomaly, EliminationEvent, FlightSuggestion, TargetDesignation,
};
use crate::types::{GeoPos, SimTime};

/// Deep, self-contained state published after each tick. Presentation
/// layers poll this; nothing in it aliases engine memory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub time: SimTime,
    pub drones: Vec<DroneView>,
    pub threats: Vec<ThreatView>,
    pub ufos: Vec<UfoView>,
    pub turrets: Vec<TurretView>,
    pub action_requests: Vec<ActionRequest>,
    pub designations: Vec<TargetDesignation>,
    pub suggestions: Vec<FlightSuggestion>,
    pub anomalies: Vec<Anomaly>,
    /// Eliminations since the previous tick.
    pub eliminations: Vec<EliminationEvent>,
    /// Log entries since the previous tick.
    pub log: Vec<LogEvent>,
}

/// A drone as visible to the operator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DroneView {
    pub id: String,
    pub drone_type: DroneType,
    pub status: DroneStatus,
    pub location: GeoPos,
    pub battery_pct: f64,
    pub signal_pct: f64,
    pub cruising_speed_mps: f64,
    pub cruising_alt_m: f64,
    pub mission_target: Option<GeoPos>,
    pub mission_target_id: Option<String>,
    pub intercept_target_id: Option<String>,
    pub intercept_threat_id: Option<String>,
    pub elimination_approved: bool,
    pub target_locked: bool,
    pub eta_secs: Option<f64>,
    pub home_base: usize,
}

/// A threat as visible to the operator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreatView {
    pub id: String,
    pub location: GeoPos,
    pub kind: ThreatKind,
    pub severity: Severity,
    pub response_status: ResponseStatus,
    pub summary: String,
}

/// An unidentified object as visible to the operator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UfoView {
    pub id: String,
    pub location: GeoPos,
    pub kind: UfoKind,
    pub speed_mps: f64,
    pub heading_deg: f64,
}

/// A counter-UAS installation as visible to the operator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurretView {
    pub id: String,
    pub location: GeoPos,
    pub status: TurretStatus,
    pub mode: TurretMode,
    pub ammo: u32,
    pub max_ammo: u32,
    pub detection_radius_m: f64,
    pub engagement_radius_m: f64,
    pub current_target_id: Option<String>,
}

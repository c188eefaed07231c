//! Registry records kept outside the ECS world.
//!
//! These are bookkeeping entries — requests awaiting an operator, proposals,
//! fault reports, and the elimination ledgers. They reference entities by id
//! and are existence-checked against the world every tick.

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::types::{GeoPos, GeoVertex};

/// A consequential action proposed by a drone or turret, gated behind
/// operator approval. At most one outstanding request per subject id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionRequest {
    pub id: String,
    /// Drone or turret id the request originates from.
    pub subject_id: String,
    pub action: ActionKind,
    pub reason: String,
    pub priority: Priority,
    pub created_tick: u64,
    /// Threat the action resolves against, when applicable.
    pub threat_id: Option<String>,
}

/// A proposed (not yet assigned) engagement pairing awaiting the operator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetDesignation {
    pub id: String,
    pub source: DesignationSource,
    pub source_id: String,
    pub target_location: GeoPos,
    pub suggested_drone_id: String,
    pub reason: String,
    pub created_tick: u64,
}

/// A reroute suggestion for a mission target inside a known hazard zone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightSuggestion {
    pub id: String,
    pub drone_id: String,
    pub hazard: HazardKind,
    pub reason: String,
    /// The safer replacement mission target.
    pub suggested_target: GeoPos,
    pub created_tick: u64,
}

/// A detected airframe fault with its auto-repair state machine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Anomaly {
    pub id: String,
    pub drone_id: String,
    pub kind: AnomalyKind,
    pub severity: Severity,
    pub location: GeoPos,
    pub repair_status: RepairStatus,
    /// Attempts started so far (first attempt plus up to two retries).
    pub repair_attempts: u8,
    /// Tick at which the in-flight attempt resolves or the next one may
    /// start. Advanced by the scheduler tick, never by detached timers.
    pub busy_until_tick: Option<u64>,
    pub created_tick: u64,
}

/// Terminal removal of a Threat/UFO. Accumulated by the engine and drained
/// on read by the presentation facade.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EliminationEvent {
    pub target_id: String,
    pub location: GeoPos,
    pub tick: u64,
}

/// Ledger entry recording which asset removed which target. Short-lived;
/// exists only to disambiguate "target lost" from "neutralized by another
/// asset" in the log stream.
#[derive(Debug, Clone)]
pub struct EliminationRecord {
    pub target_id: String,
    pub source_id: String,
    pub tick: u64,
}

/// An operator-defined zone. `interceptor_defense` marks airspace the
/// autonomous dispatchers actively defend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Geofence {
    pub id: String,
    pub name: String,
    pub points: Vec<GeoVertex>,
    pub alert_on_entry: bool,
    pub alert_on_exit: bool,
    pub interceptor_defense: bool,
}

/// A known hazard region used by the flight-path suggester.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HazardZone {
    pub center: GeoPos,
    pub radius_m: f64,
    pub kind: HazardKind,
}

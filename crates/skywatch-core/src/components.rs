//! ECS components for hecs entities.
//!
//! Components are plain data structs with no behavior beyond small
//! accessors. Engine logic lives in systems, not components. Every physical
//! entity also carries a `GeoPos` component for its location.

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::types::GeoPos;

/// A fleet drone. Created at initialization; removed from the world only
/// when consumed by a kamikaze elimination.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Drone {
    pub id: String,
    pub drone_type: DroneType,
    pub status: DroneStatus,
    /// Remaining charge, 0-100. Drains while airborne.
    pub battery_pct: f64,
    /// Link quality, 0-100. Random walk; below the critical threshold the
    /// drone falls into autonomous continuation.
    pub signal_pct: f64,
    pub cruising_speed_mps: f64,
    pub cruising_alt_m: f64,
    /// Where the current mission is headed, if any.
    pub mission_target: Option<GeoPos>,
    /// Live Threat/UFO the mission target tracks, if any.
    pub mission_target_id: Option<String>,
    /// UFO being intercepted. Mutually exclusive with `intercept_threat_id`.
    pub intercept_target_id: Option<String>,
    /// Threat being intercepted. Mutually exclusive with `intercept_target_id`.
    pub intercept_threat_id: Option<String>,
    pub elimination_approved: bool,
    /// One `fly_into_threat` request per pursuit.
    pub elimination_requested: bool,
    pub target_locked: bool,
    /// Estimated seconds to the current movement target; `None` when idle.
    pub eta_secs: Option<f64>,
    /// Index into the configured base list.
    pub home_base: usize,
    /// Tick at which the drone settled over its target.
    pub hovering_since_tick: Option<u64>,
    /// Tick at which an evasion maneuver ends.
    pub evade_until_tick: Option<u64>,
}

impl Drone {
    /// Drop every target reference and pursuit flag.
    pub fn clear_targets(&mut self) {
        self.mission_target = None;
        self.mission_target_id = None;
        self.intercept_target_id = None;
        self.intercept_threat_id = None;
        self.elimination_approved = false;
        self.elimination_requested = false;
        self.target_locked = false;
        self.hovering_since_tick = None;
    }

    /// The intercept reference currently in effect, if any.
    pub fn intercept_ref(&self) -> Option<&str> {
        self.intercept_target_id
            .as_deref()
            .or(self.intercept_threat_id.as_deref())
    }
}

/// A reported threat signature.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Threat {
    pub id: String,
    pub kind: ThreatKind,
    pub severity: Severity,
    pub response_status: ResponseStatus,
    pub summary: String,
    pub spawned_tick: u64,
}

/// An unidentified flying object under track.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ufo {
    pub id: String,
    pub kind: UfoKind,
    pub speed_mps: f64,
    /// Degrees from North, clockwise.
    pub heading_deg: f64,
}

/// A fixed counter-UAS ground installation. Never despawned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turret {
    pub id: String,
    pub status: TurretStatus,
    pub mode: TurretMode,
    pub ammo: u32,
    pub max_ammo: u32,
    pub detection_radius_m: f64,
    pub engagement_radius_m: f64,
    pub current_target_id: Option<String>,
    /// Tick at which a reload cycle completes.
    pub reload_done_tick: Option<u64>,
}

impl Turret {
    /// Whether this installation currently contests its engagement ring.
    /// Disabled or reloading turrets cede their targets to the dispatchers.
    pub fn is_contesting(&self) -> bool {
        !matches!(
            self.status,
            TurretStatus::Disabled | TurretStatus::Reloading
        )
    }

    /// Back to scanning with no target.
    pub fn reset_to_scanning(&mut self) {
        self.status = TurretStatus::Scanning;
        self.current_target_id = None;
    }
}

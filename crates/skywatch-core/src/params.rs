//! Tunable simulation parameters.
//!
//! These values are empirically chosen rather than physically derived, so
//! they are carried as configuration instead of constants. Defaults match
//! the tuning the engine was calibrated with.

use serde::{Deserialize, Serialize};

use crate::records::HazardZone;

/// Tuning knobs for the engine. All probabilities are per-second rates,
/// scaled by the tick duration when rolled.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimParams {
    /// Base hit probability of a turret burst at zero range; scaled down
    /// linearly with distance over the engagement radius.
    pub turret_hit_base: f64,
    /// Slant range at which an observing interceptor requests elimination
    /// authority (m).
    pub observation_range_m: f64,
    /// Minimum UFO speed the interceptor dispatcher reacts to (m/s).
    pub intercept_speed_floor_mps: f64,
    /// Maximum UFO altitude the interceptor dispatcher reacts to (m).
    pub intercept_altitude_ceiling_m: f64,
    /// Active-drone proximity that triggers a recon dispatch (m).
    pub recon_trigger_radius_m: f64,
    /// Recon holds this far above the investigated threat (m).
    pub recon_altitude_margin_m: f64,
    /// New-threat spawn rate (per second).
    pub threat_rate: f64,
    /// Share of spawned threats that are jamming signals.
    pub jamming_share: f64,
    /// FPV incursion spawn rate (per second).
    pub fpv_rate: f64,
    /// Airframe anomaly rate per airborne drone (per second).
    pub anomaly_rate: f64,
    /// Mission-advisory request rate per drone on mission (per second).
    pub advisory_rate: f64,
    /// Flight-hazard suggestion rate (per second).
    pub suggestion_rate: f64,
    /// Known hazard regions for the flight-path suggester.
    pub hazard_zones: Vec<HazardZone>,
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            turret_hit_base: 0.9,
            observation_range_m: 200.0,
            intercept_speed_floor_mps: 28.0,
            intercept_altitude_ceiling_m: 500.0,
            recon_trigger_radius_m: 15.0,
            recon_altitude_margin_m: 30.0,
            threat_rate: 0.003,
            jamming_share: 0.3,
            fpv_rate: 0.02,
            anomaly_rate: 0.005,
            advisory_rate: 0.01,
            suggestion_rate: 0.008,
            hazard_zones: Vec::new(),
        }
    }
}

impl SimParams {
    /// A silent parameter set: no stochastic spawning at all. Useful for
    /// scripted scenarios and tests that inject entities explicitly.
    pub fn quiet() -> Self {
        Self {
            threat_rate: 0.0,
            fpv_rate: 0.0,
            anomaly_rate: 0.0,
            advisory_rate: 0.0,
            suggestion_rate: 0.0,
            ..Self::default()
        }
    }
}

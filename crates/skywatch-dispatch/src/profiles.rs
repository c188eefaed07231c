//! Airframe performance profiles.
//!
//! Consolidates per-type parameters used when commissioning drones and when
//! planners reason about an asset's capabilities.

use skywatch_core::enums::DroneType;

/// Performance profile for an airframe type.
pub struct DroneProfile {
    /// Fleet id prefix (ids look like `INTER-12`).
    pub id_prefix: &'static str,
    /// Default cruising speed (m/s).
    pub cruise_speed_mps: f64,
    /// Default cruising altitude (m).
    pub cruise_alt_m: f64,
}

/// Get the performance profile for a given airframe type.
pub fn get_profile(drone_type: DroneType) -> DroneProfile {
    match drone_type {
        DroneType::Assault => DroneProfile {
            id_prefix: "ASLT",
            cruise_speed_mps: 60.0,
            cruise_alt_m: 100.0,
        },
        DroneType::Recon => DroneProfile {
            id_prefix: "SRVL",
            cruise_speed_mps: 28.0,
            cruise_alt_m: 100.0,
        },
        DroneType::Interceptor => DroneProfile {
            id_prefix: "INTER",
            cruise_speed_mps: 220.0,
            cruise_alt_m: 100.0,
        },
    }
}

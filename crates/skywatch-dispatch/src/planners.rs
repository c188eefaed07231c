//! Planner decision logic.
//!
//! Pure functions over per-tick pictures of the world. The simulation
//! systems gather the pictures, call these planners, and apply the
//! assignments — the planners themselves never mutate anything, which keeps
//! every dispatch rule testable in isolation.

use skywatch_core::enums::{DroneType, ResponseStatus, Severity, ThreatKind, UfoKind};
use skywatch_core::params::SimParams;
use skywatch_core::records::Geofence;
use skywatch_core::types::{point_in_polygon, GeoPos};

/// An idle drone available for tasking.
#[derive(Debug, Clone)]
pub struct IdleDrone {
    pub id: String,
    pub drone_type: DroneType,
    pub location: GeoPos,
}

/// A tracked unidentified object as the planners see it.
#[derive(Debug, Clone)]
pub struct UfoPicture {
    pub id: String,
    pub kind: UfoKind,
    pub location: GeoPos,
    pub speed_mps: f64,
    /// Some drone already holds an intercept reference to this object.
    pub claimed: bool,
}

/// A reported threat as the planners see it.
#[derive(Debug, Clone)]
pub struct ThreatPicture {
    pub id: String,
    pub kind: ThreatKind,
    pub severity: Severity,
    pub response_status: ResponseStatus,
    pub location: GeoPos,
    /// Some drone already holds an intercept reference to this threat.
    pub claimed: bool,
}

/// A ground-defense installation as the planners see it.
#[derive(Debug, Clone)]
pub struct TurretPicture {
    pub location: GeoPos,
    pub engagement_radius_m: f64,
    /// False while disabled or reloading — the dispatchers take over then.
    pub contesting: bool,
}

/// Is the location inside at least one actively defended geofence?
pub fn inside_defended_zone(location: &GeoPos, fences: &[Geofence]) -> bool {
    fences
        .iter()
        .filter(|f| f.interceptor_defense)
        .any(|f| point_in_polygon(location, &f.points))
}

/// Is the location inside the engagement ring of a contesting turret?
/// Close-in targets belong to the ground defense, not the dispatchers.
pub fn inside_turret_ring(location: &GeoPos, turrets: &[TurretPicture]) -> bool {
    turrets
        .iter()
        .filter(|t| t.contesting)
        .any(|t| location.distance_3d_m(&t.location) <= t.engagement_radius_m)
}

/// Interceptor-planner eligibility: hostile-typed, fast, low, inside a
/// defended zone, unclaimed, and outside every turret's engagement ring.
pub fn ufo_intercept_eligible(
    ufo: &UfoPicture,
    fences: &[Geofence],
    turrets: &[TurretPicture],
    params: &SimParams,
) -> bool {
    !ufo.claimed
        && ufo.kind.is_hostile()
        && ufo.speed_mps > params.intercept_speed_floor_mps
        && ufo.location.alt_m < params.intercept_altitude_ceiling_m
        && inside_defended_zone(&ufo.location, fences)
        && !inside_turret_ring(&ufo.location, turrets)
}

/// Threat-interceptor eligibility: severe drone/aircraft signatures still
/// pending a response, inside a defended zone, unclaimed.
pub fn threat_intercept_eligible(threat: &ThreatPicture, fences: &[Geofence]) -> bool {
    !threat.claimed
        && matches!(
            threat.kind,
            ThreatKind::UnidentifiedDrone | ThreatKind::HostileAircraft
        )
        && threat.severity >= Severity::High
        && threat.response_status == ResponseStatus::Pending
        && inside_defended_zone(&threat.location, fences)
}

/// Designation eligibility: severe drone/aircraft signatures still pending.
/// Geofences do not constrain proposals — the operator decides.
pub fn designation_eligible(threat: &ThreatPicture) -> bool {
    matches!(
        threat.kind,
        ThreatKind::UnidentifiedDrone | ThreatKind::HostileAircraft
    ) && threat.severity >= Severity::High
        && threat.response_status == ResponseStatus::Pending
}

/// Recon trigger: dispatch only once another active drone has come within
/// the trigger radius of the threat ("someone noticed it").
pub fn recon_triggered(
    threat_location: &GeoPos,
    active_drone_locations: &[GeoPos],
    trigger_radius_m: f64,
) -> bool {
    active_drone_locations
        .iter()
        .any(|loc| loc.distance_3d_m(threat_location) < trigger_radius_m)
}

/// The nearest idle drone of the wanted type, by 3D distance.
pub fn nearest_of_type<'a>(
    candidates: &'a [IdleDrone],
    wanted: DroneType,
    target: &GeoPos,
) -> Option<&'a IdleDrone> {
    candidates
        .iter()
        .filter(|d| d.drone_type == wanted)
        .min_by(|a, b| {
            let da = a.location.distance_3d_m(target);
            let db = b.location.distance_3d_m(target);
            da.total_cmp(&db)
        })
}

/// Designation candidate: the nearest Interceptor when one is available,
/// falling back to the nearest Assault drone.
pub fn pick_designation_candidate<'a>(
    candidates: &'a [IdleDrone],
    target: &GeoPos,
) -> Option<&'a IdleDrone> {
    nearest_of_type(candidates, DroneType::Interceptor, target)
        .or_else(|| nearest_of_type(candidates, DroneType::Assault, target))
}

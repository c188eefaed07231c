//! Snapshot system: builds a complete `WorldSnapshot` from the world and
//! registries.
//!
//! Read-only over the world. Views are sorted by id so identical runs
//! produce byte-identical snapshots.

use hecs::World;

use skywatch_core::components::{Drone, Threat, Turret, Ufo};
use skywatch_core::events::LogEvent;
use skywatch_core::records::EliminationEvent;
use skywatch_core::state::*;
use skywatch_core::types::{GeoPos, SimTime};

use crate::registries::Registries;

/// Build a deep snapshot of the current state. `eliminations` and `log`
/// are the buffers drained from the registries for this tick.
pub fn build(
    world: &World,
    time: &SimTime,
    reg: &Registries,
    eliminations: Vec<EliminationEvent>,
    log: Vec<LogEvent>,
) -> WorldSnapshot {
    WorldSnapshot {
        time: *time,
        drones: build_drones(world),
        threats: build_threats(world),
        ufos: build_ufos(world),
        turrets: build_turrets(world),
        action_requests: reg.action_requests.clone(),
        designations: reg.designations.clone(),
        suggestions: reg.suggestions.clone(),
        anomalies: reg.anomalies.clone(),
        eliminations,
        log,
    }
}

fn build_drones(world: &World) -> Vec<DroneView> {
    let mut views: Vec<DroneView> = world
        .query::<(&Drone, &GeoPos)>()
        .iter()
        .map(|(_, (d, pos))| DroneView {
            id: d.id.clone(),
            drone_type: d.drone_type,
            status: d.status,
            location: *pos,
            battery_pct: d.battery_pct,
            signal_pct: d.signal_pct,
            cruising_speed_mps: d.cruising_speed_mps,
            cruising_alt_m: d.cruising_alt_m,
            mission_target: d.mission_target,
            mission_target_id: d.mission_target_id.clone(),
            intercept_target_id: d.intercept_target_id.clone(),
            intercept_threat_id: d.intercept_threat_id.clone(),
            elimination_approved: d.elimination_approved,
            target_locked: d.target_locked,
            eta_secs: d.eta_secs,
            home_base: d.home_base,
        })
        .collect();
    views.sort_by(|a, b| a.id.cmp(&b.id));
    views
}

fn build_threats(world: &World) -> Vec<ThreatView> {
    let mut views: Vec<ThreatView> = world
        .query::<(&Threat, &GeoPos)>()
        .iter()
        .map(|(_, (t, pos))| ThreatView {
            id: t.id.clone(),
            location: *pos,
            kind: t.kind,
            severity: t.severity,
            response_status: t.response_status,
            summary: t.summary.clone(),
        })
        .collect();
    views.sort_by(|a, b| a.id.cmp(&b.id));
    views
}

fn build_ufos(world: &World) -> Vec<UfoView> {
    let mut views: Vec<UfoView> = world
        .query::<(&Ufo, &GeoPos)>()
        .iter()
        .map(|(_, (u, pos))| UfoView {
            id: u.id.clone(),
            location: *pos,
            kind: u.kind,
            speed_mps: u.speed_mps,
            heading_deg: u.heading_deg,
        })
        .collect();
    views.sort_by(|a, b| a.id.cmp(&b.id));
    views
}

fn build_turrets(world: &World) -> Vec<TurretView> {
    let mut views: Vec<TurretView> = world
        .query::<(&Turret, &GeoPos)>()
        .iter()
        .map(|(_, (t, pos))| TurretView {
            id: t.id.clone(),
            location: *pos,
            status: t.status,
            mode: t.mode,
            ammo: t.ammo,
            max_ammo: t.max_ammo,
            detection_radius_m: t.detection_radius_m,
            engagement_radius_m: t.engagement_radius_m,
            current_target_id: t.current_target_id.clone(),
        })
        .collect();
    views.sort_by(|a, b| a.id.cmp(&b.id));
    views
}

//! Dispatcher systems — thin glue between the world and the pure planners.
//!
//! Each planner runs every tick: gather a plain-data picture of the world,
//! let the planner decide, apply the assignments. Planners are idempotent;
//! an asset or target claimed this tick is excluded from later planners in
//! the same tick because the mutation is applied immediately.

use std::collections::HashSet;

use hecs::World;

use skywatch_core::components::{Drone, Threat, Turret, Ufo};
use skywatch_core::enums::*;
use skywatch_core::events::AlertKind;
use skywatch_core::params::SimParams;
use skywatch_core::types::GeoPos;

use skywatch_dispatch::planners::{
    self, IdleDrone, ThreatPicture, TurretPicture, UfoPicture,
};

use crate::registries::Registries;

/// Idle drones available for tasking.
fn idle_drones(world: &World) -> Vec<IdleDrone> {
    let mut out: Vec<IdleDrone> = world
        .query::<(&Drone, &GeoPos)>()
        .iter()
        .filter(|(_, (d, _))| d.status.is_idle())
        .map(|(_, (d, pos))| IdleDrone {
            id: d.id.clone(),
            drone_type: d.drone_type,
            location: *pos,
        })
        .collect();
    out.sort_by(|a, b| a.id.cmp(&b.id));
    out
}

/// Ids of targets some drone already holds an intercept reference to.
fn claimed_targets(world: &World) -> HashSet<String> {
    let mut claimed = HashSet::new();
    for (_, drone) in world.query::<&Drone>().iter() {
        if let Some(id) = &drone.intercept_target_id {
            claimed.insert(id.clone());
        }
        if let Some(id) = &drone.intercept_threat_id {
            claimed.insert(id.clone());
        }
    }
    claimed
}

fn turret_pictures(world: &World) -> Vec<TurretPicture> {
    world
        .query::<(&Turret, &GeoPos)>()
        .iter()
        .map(|(_, (t, pos))| TurretPicture {
            location: *pos,
            engagement_radius_m: t.engagement_radius_m,
            contesting: t.is_contesting(),
        })
        .collect()
}

fn threat_pictures(world: &World, claimed: &HashSet<String>) -> Vec<ThreatPicture> {
    let mut out: Vec<ThreatPicture> = world
        .query::<(&Threat, &GeoPos)>()
        .iter()
        .map(|(_, (t, pos))| ThreatPicture {
            id: t.id.clone(),
            kind: t.kind,
            severity: t.severity,
            response_status: t.response_status,
            location: *pos,
            claimed: claimed.contains(&t.id),
        })
        .collect();
    out.sort_by(|a, b| a.id.cmp(&b.id));
    out
}

/// Apply a mutation to the drone with the given id, if it exists.
fn with_drone(world: &mut World, id: &str, f: impl FnOnce(&mut Drone)) {
    for (_, drone) in world.query_mut::<&mut Drone>() {
        if drone.id == id {
            f(drone);
            return;
        }
    }
}

/// Apply a mutation to the threat with the given id, if it exists.
fn with_threat(world: &mut World, id: &str, f: impl FnOnce(&mut Threat)) {
    for (_, threat) in world.query_mut::<&mut Threat>() {
        if threat.id == id {
            f(threat);
            return;
        }
    }
}

/// Interceptor planner: hostile, fast, low contacts inside defended
/// airspace get the nearest idle Interceptor, unless a turret owns them.
pub fn run_interceptor(world: &mut World, reg: &mut Registries, params: &SimParams, tick: u64) {
    if !reg.geofences.iter().any(|f| f.interceptor_defense) {
        return;
    }

    let claimed = claimed_targets(world);
    let turrets = turret_pictures(world);
    let mut ufos: Vec<UfoPicture> = world
        .query::<(&Ufo, &GeoPos)>()
        .iter()
        .map(|(_, (u, pos))| UfoPicture {
            id: u.id.clone(),
            kind: u.kind,
            location: *pos,
            speed_mps: u.speed_mps,
            claimed: claimed.contains(&u.id),
        })
        .collect();
    ufos.sort_by(|a, b| a.id.cmp(&b.id));

    let mut candidates = idle_drones(world);

    for ufo in ufos {
        if !planners::ufo_intercept_eligible(&ufo, &reg.geofences, &turrets, params) {
            continue;
        }
        let Some(chosen) =
            planners::nearest_of_type(&candidates, DroneType::Interceptor, &ufo.location)
        else {
            continue;
        };
        let chosen_id = chosen.id.clone();
        candidates.retain(|c| c.id != chosen_id);

        with_drone(world, &chosen_id, |drone| {
            drone.intercept_target_id = Some(ufo.id.clone());
            drone.intercept_threat_id = None;
            drone.elimination_approved = false;
            drone.elimination_requested = false;
            drone.status = DroneStatus::Intercepting;
        });
        reg.log(
            tick,
            "dispatch",
            "Interceptor Launched",
            LogStatus::Success,
            format!("{chosen_id} dispatched to neutralize hostile contact {}.", ufo.id),
        );
    }
}

/// Target-designation planner: propose, never assign. Runs before the
/// autonomous threat-interceptor so operator decisions are not pre-empted.
pub fn run_designation(world: &mut World, reg: &mut Registries, tick: u64) {
    let claimed = claimed_targets(world);
    let threats = threat_pictures(world, &claimed);
    let mut candidates: Vec<IdleDrone> = idle_drones(world)
        .into_iter()
        .filter(|d| {
            matches!(d.drone_type, DroneType::Assault | DroneType::Interceptor)
        })
        .collect();

    for threat in threats {
        if !planners::designation_eligible(&threat) {
            continue;
        }
        let Some(chosen) = planners::pick_designation_candidate(&candidates, &threat.location)
        else {
            continue;
        };
        let chosen_id = chosen.id.clone();
        // One proposal per asset per tick; prevents over-subscription.
        candidates.retain(|c| c.id != chosen_id);

        reg.push_designation(
            tick,
            DesignationSource::Threat,
            &threat.id,
            threat.location,
            &chosen_id,
            format!(
                "Engagement of {:?}-severity {:?} recommended.",
                threat.severity, threat.kind
            ),
        );
        with_threat(world, &threat.id, |t| {
            t.response_status = ResponseStatus::AiTargeting;
        });
        reg.log_alert(
            tick,
            "dispatch",
            "Target Designation",
            LogStatus::Success,
            format!(
                "Proposed tasking {chosen_id} against threat {}. Awaiting operator confirmation.",
                threat.id
            ),
            AlertKind::NewTargetDesignation,
        );
    }
}

/// Threat-interceptor planner: severe threats inside defended airspace get
/// the nearest idle Interceptor straight into observation pursuit.
pub fn run_threat_interceptor(world: &mut World, reg: &mut Registries, tick: u64) {
    if !reg.geofences.iter().any(|f| f.interceptor_defense) {
        return;
    }

    let claimed = claimed_targets(world);
    let threats = threat_pictures(world, &claimed);
    let mut candidates = idle_drones(world);

    for threat in threats {
        if !planners::threat_intercept_eligible(&threat, &reg.geofences) {
            continue;
        }
        let Some(chosen) =
            planners::nearest_of_type(&candidates, DroneType::Interceptor, &threat.location)
        else {
            continue;
        };
        let chosen_id = chosen.id.clone();
        candidates.retain(|c| c.id != chosen_id);

        with_drone(world, &chosen_id, |drone| {
            drone.intercept_threat_id = Some(threat.id.clone());
            drone.intercept_target_id = None;
            drone.elimination_approved = false;
            drone.elimination_requested = false;
            drone.status = if drone.status == DroneStatus::Grounded {
                DroneStatus::Launching
            } else {
                DroneStatus::Intercepting
            };
        });
        with_threat(world, &threat.id, |t| {
            t.response_status = ResponseStatus::Acknowledged;
        });
        reg.log(
            tick,
            "dispatch",
            "Interceptor Launched",
            LogStatus::Success,
            format!("{chosen_id} dispatched to observe threat {}.", threat.id),
        );
    }
}

/// Recon planner: investigate a pending unidentified drone once another
/// active drone has stumbled within the trigger radius of it.
pub fn run_recon(world: &mut World, reg: &mut Registries, params: &SimParams, tick: u64) {
    let claimed = claimed_targets(world);
    let threats: Vec<ThreatPicture> = threat_pictures(world, &claimed)
        .into_iter()
        .filter(|t| {
            t.kind == ThreatKind::UnidentifiedDrone
                && t.response_status == ResponseStatus::Pending
        })
        .collect();
    if threats.is_empty() {
        return;
    }

    let active_positions: Vec<GeoPos> = world
        .query::<(&Drone, &GeoPos)>()
        .iter()
        .filter(|(_, (d, _))| d.status != DroneStatus::Grounded)
        .map(|(_, (_, pos))| *pos)
        .collect();
    let mut candidates = idle_drones(world);

    for threat in threats {
        if !planners::recon_triggered(
            &threat.location,
            &active_positions,
            params.recon_trigger_radius_m,
        ) {
            continue;
        }
        let Some(chosen) =
            planners::nearest_of_type(&candidates, DroneType::Recon, &threat.location)
        else {
            continue;
        };
        let chosen_id = chosen.id.clone();
        candidates.retain(|c| c.id != chosen_id);

        let overwatch_alt = threat.location.alt_m + params.recon_altitude_margin_m;
        with_drone(world, &chosen_id, |drone| {
            drone.mission_target = Some(threat.location.at_altitude(overwatch_alt));
            drone.cruising_alt_m = overwatch_alt;
            drone.status = if drone.status == DroneStatus::Grounded {
                DroneStatus::Launching
            } else {
                DroneStatus::Mission
            };
        });
        with_threat(world, &threat.id, |t| {
            t.response_status = ResponseStatus::Acknowledged;
        });
        reg.log(
            tick,
            "dispatch",
            "Recon Dispatched",
            LogStatus::Success,
            format!(
                "{chosen_id} dispatched to investigate threat {} after a proximity alert.",
                threat.id
            ),
        );
    }
}

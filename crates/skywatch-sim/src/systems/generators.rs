//! Stochastic generators: new threats, airframe anomalies, in-flight
//! advisories, and flight-hazard reroute suggestions.
//!
//! All rolls come from the engine RNG so a seed reproduces the full
//! scenario. Rates are per-second and scaled by the tick duration.

use hecs::World;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use skywatch_core::components::Drone;
use skywatch_core::constants::DT;
use skywatch_core::enums::*;
use skywatch_core::params::SimParams;
use skywatch_core::types::GeoPos;

use crate::registries::Registries;
use crate::world_setup;

/// Run all generators for one tick.
pub fn run(
    world: &mut World,
    reg: &mut Registries,
    rng: &mut ChaCha8Rng,
    params: &SimParams,
    bases: &[GeoPos],
    tick: u64,
) {
    spawn_threats(world, reg, rng, params, bases, tick);
    per_drone_rolls(world, reg, rng, params, tick);
}

/// Roll for a new threat signature near one of the bases.
fn spawn_threats(
    world: &mut World,
    reg: &mut Registries,
    rng: &mut ChaCha8Rng,
    params: &SimParams,
    bases: &[GeoPos],
    tick: u64,
) {
    if bases.is_empty() || !rng.gen_bool((params.threat_rate * DT).clamp(0.0, 1.0)) {
        return;
    }

    let jamming = rng.gen_bool(params.jamming_share.clamp(0.0, 1.0));
    let base = bases[rng.gen_range(0..bases.len())];
    let location = GeoPos::new(
        base.lat + rng.gen_range(-0.05..0.05),
        base.lon + rng.gen_range(-0.05..0.05),
        100.0 + rng.gen_range(0.0..200.0),
    );

    let id = reg.next_threat_id();
    let (kind, severity, summary) = if jamming {
        (
            ThreatKind::JammingSignal,
            Severity::Critical,
            "High-power RF jamming detected; autonomous control engaged on affected drones.",
        )
    } else {
        (
            ThreatKind::UnidentifiedDrone,
            Severity::High,
            "Unidentified drone detected near restricted airspace.",
        )
    };
    world_setup::spawn_threat(world, &id, kind, severity, summary, location, tick);
    reg.log(
        tick,
        &id,
        "New Threat",
        LogStatus::Success,
        summary.to_string(),
    );

    // Jamming crushes the link of roughly half the airborne fleet.
    if jamming {
        for (_entity, drone) in world.query_mut::<&mut Drone>() {
            if drone.status != DroneStatus::Grounded && rng.gen_bool(0.5) {
                drone.status = DroneStatus::AiOverride;
                drone.signal_pct = rng.gen_range(0.0..20.0);
            }
        }
    }
}

/// Per-drone rolls: anomalies, course advisories, hazard suggestions.
fn per_drone_rolls(
    world: &mut World,
    reg: &mut Registries,
    rng: &mut ChaCha8Rng,
    params: &SimParams,
    tick: u64,
) {
    for (_entity, (drone, pos)) in world.query::<(&Drone, &GeoPos)>().iter() {
        // Airframe faults only happen in the air.
        if drone.status != DroneStatus::Grounded
            && rng.gen_bool((params.anomaly_rate * DT).clamp(0.0, 1.0))
            && !reg.has_open_anomaly(&drone.id)
        {
            let kind = match rng.gen_range(0..3) {
                0 => AnomalyKind::RotorMalfunction,
                1 => AnomalyKind::CompassDrift,
                _ => AnomalyKind::CameraFault,
            };
            reg.push_anomaly(tick, &drone.id, kind, Severity::High, *pos);
            reg.log(
                tick,
                &drone.id,
                "Anomaly Detected",
                LogStatus::Failed,
                format!("{kind:?} reported by onboard diagnostics."),
            );
        }

        if drone.status == DroneStatus::Mission
            && rng.gen_bool((params.advisory_rate * DT).clamp(0.0, 1.0))
            && !reg.has_request_for(&drone.id)
        {
            reg.push_request(
                tick,
                &drone.id,
                ActionKind::AlterCourse,
                "Obstacle detected on projected route. Proposing an alternative course.".to_string(),
                None,
            );
        }

        if let Some(target) = &drone.mission_target {
            for zone in &params.hazard_zones {
                if target.distance_m(&zone.center) < zone.radius_m
                    && rng.gen_bool((params.suggestion_rate * DT).clamp(0.0, 1.0))
                    && !reg.has_suggestion_for(&drone.id)
                {
                    let rerouted = GeoPos::new(target.lat + 0.02, target.lon + 0.02, target.alt_m);
                    reg.push_suggestion(
                        tick,
                        &drone.id,
                        zone.kind,
                        format!(
                            "Mission target lies inside a known {:?} region; suggesting a reroute.",
                            zone.kind
                        ),
                        rerouted,
                    );
                }
            }
        }
    }
}

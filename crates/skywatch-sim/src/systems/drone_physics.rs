//! Drone physics and state machine — the per-tick heart of the fleet.
//!
//! Updates battery/signal, advances the per-drone state machine, moves
//! target-seeking drones along the instantaneous bearing to their target,
//! and resolves kamikaze strikes. Targets are looked up through id maps
//! frozen at the top of the tick; strikes are applied through a buffer after
//! the drone loop so one drone's kill cannot leave another mid-update on a
//! dangling reference.

use std::collections::{HashMap, HashSet};

use hecs::{Entity, World};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use skywatch_core::components::{Drone, Threat, Ufo};
use skywatch_core::constants::*;
use skywatch_core::enums::*;
use skywatch_core::events::AlertKind;
use skywatch_core::params::SimParams;
use skywatch_core::types::GeoPos;

use crate::registries::Registries;

/// Frozen per-tick picture of every strikeable target.
struct TargetIndex {
    ufos: HashMap<String, (Entity, GeoPos)>,
    threats: HashMap<String, (Entity, GeoPos)>,
    /// Targets consumed earlier in this same tick.
    eliminated: HashSet<String>,
}

impl TargetIndex {
    fn build(world: &World) -> Self {
        let ufos = world
            .query::<(&Ufo, &GeoPos)>()
            .iter()
            .map(|(e, (u, pos))| (u.id.clone(), (e, *pos)))
            .collect();
        let threats = world
            .query::<(&Threat, &GeoPos)>()
            .iter()
            .map(|(e, (t, pos))| (t.id.clone(), (e, *pos)))
            .collect();
        Self {
            ufos,
            threats,
            eliminated: HashSet::new(),
        }
    }

    fn position_of(&self, id: &str) -> Option<GeoPos> {
        if self.eliminated.contains(id) {
            return None;
        }
        self.ufos
            .get(id)
            .or_else(|| self.threats.get(id))
            .map(|(_, pos)| *pos)
    }

    /// Consume a target: returns its entity for despawn, at most once.
    fn consume(&mut self, id: &str) -> Option<(Entity, GeoPos)> {
        if self.eliminated.contains(id) {
            return None;
        }
        let hit = self.ufos.get(id).or_else(|| self.threats.get(id)).copied();
        if hit.is_some() {
            self.eliminated.insert(id.to_string());
        }
        hit
    }
}

/// Run drone physics and state transitions for one tick.
pub fn run(
    world: &mut World,
    reg: &mut Registries,
    rng: &mut ChaCha8Rng,
    params: &SimParams,
    bases: &[GeoPos],
    tick: u64,
) {
    let mut index = TargetIndex::build(world);
    let drone_entities: Vec<Entity> = world.query::<&Drone>().iter().map(|(e, _)| e).collect();
    let mut despawns: Vec<Entity> = Vec::new();

    for entity in drone_entities {
        let Ok((drone, pos)) = world.query_one_mut::<(&mut Drone, &mut GeoPos)>(entity) else {
            continue;
        };

        drone.eta_secs = None;

        if drone.status != DroneStatus::Grounded {
            drone.battery_pct = (drone.battery_pct - BATTERY_DRAIN_PER_SEC * DT).max(0.0);
        }
        drone.signal_pct =
            (drone.signal_pct + rng.gen_range(-0.5..0.5) * SIGNAL_WALK_SPAN * DT).clamp(0.0, 100.0);

        // Critical link loss: hand control to the autopilot no matter what
        // the drone was doing.
        if drone.signal_pct < SIGNAL_CRITICAL_PCT
            && !matches!(drone.status, DroneStatus::AiOverride | DroneStatus::Grounded)
        {
            drone.status = DroneStatus::AiOverride;
            let continuation = if drone.mission_target.is_some() {
                "continuing mission autonomously"
            } else {
                "returning to base autonomously"
            };
            reg.log_alert(
                tick,
                &drone.id,
                "Autonomous Control Engaged",
                LogStatus::Success,
                format!(
                    "Signal critical at {:.1}%; {continuation}.",
                    drone.signal_pct
                ),
                AlertKind::AiOverrideEngaged,
            );
        }

        let home = bases
            .get(drone.home_base)
            .copied()
            .unwrap_or_else(|| bases.first().copied().unwrap_or_default());

        match drone.status {
            DroneStatus::Grounded | DroneStatus::HoveringAtBase => {}

            DroneStatus::Launching => {
                pos.alt_m += ALTITUDE_RATE_MPS * DT;
                if pos.alt_m >= drone.cruising_alt_m {
                    pos.alt_m = drone.cruising_alt_m;
                    drone.status = if drone.intercept_ref().is_some() {
                        DroneStatus::Intercepting
                    } else if drone.mission_target.is_some() {
                        DroneStatus::Mission
                    } else {
                        DroneStatus::HoveringAtBase
                    };
                }
            }

            DroneStatus::Landing => {
                pos.alt_m -= ALTITUDE_RATE_MPS * DT;
                if pos.alt_m <= 0.0 {
                    *pos = home.at_altitude(0.0);
                    drone.status = DroneStatus::Grounded;
                }
            }

            DroneStatus::Evading => {
                if drone.evade_until_tick.is_none_or(|until| tick >= until) {
                    drone.evade_until_tick = None;
                    drone.status = DroneStatus::ReturningToBase;
                } else {
                    // Unpredictable jinking, half cruise speed.
                    let bearing = rng.gen_range(0.0..360.0);
                    *pos = pos.destination(bearing, drone.cruising_speed_mps * DT * 0.5);
                }
            }

            DroneStatus::HoveringOnTarget => {
                let strike_capable = matches!(
                    drone.drone_type,
                    DroneType::Assault | DroneType::Interceptor
                );
                if strike_capable {
                    if let Some(since) = drone.hovering_since_tick {
                        if tick.saturating_sub(since) >= (HOVER_TIMEOUT_SECS / DT) as u64 {
                            if let Some(request) = reg.take_request_for(&drone.id) {
                                reg.log(
                                    tick,
                                    &drone.id,
                                    "Request Timeout",
                                    LogStatus::Failed,
                                    format!(
                                        "No operator response to {:?} request; disengaging.",
                                        request.action
                                    ),
                                );
                            }
                            drone.status = DroneStatus::ReturningToBase;
                            drone.mission_target = None;
                            drone.hovering_since_tick = None;
                        }
                    }
                }
            }

            DroneStatus::Intercepting => {
                run_intercept(drone, pos, entity, &mut index, reg, params, &mut despawns, tick);
            }

            DroneStatus::Mission | DroneStatus::AiOverride | DroneStatus::ReturningToBase => {
                run_transit(drone, pos, entity, &mut index, reg, rng, &home, &mut despawns, tick);
            }
        }
    }

    for entity in despawns {
        let _ = world.despawn(entity);
    }
}

/// Intercept pursuit: observation shadowing before approval, full-speed
/// strike after it.
#[allow(clippy::too_many_arguments)]
fn run_intercept(
    drone: &mut Drone,
    pos: &mut GeoPos,
    entity: Entity,
    index: &mut TargetIndex,
    reg: &mut Registries,
    params: &SimParams,
    despawns: &mut Vec<Entity>,
    tick: u64,
) {
    let target_id = match drone.intercept_ref() {
        Some(id) => id.to_string(),
        None => {
            drone.status = DroneStatus::ReturningToBase;
            drone.clear_targets();
            return;
        }
    };

    let Some(target_pos) = index.position_of(&target_id) else {
        // Reference no longer resolves: either another asset got there first
        // or the target slipped away.
        let eliminator = reg
            .recent_eliminator(&target_id, tick)
            .map(|s| s.to_string());
        match eliminator {
            Some(source) => {
                reg.log(
                    tick,
                    &drone.id,
                    "Disengaging",
                    LogStatus::Success,
                    format!("Target {target_id} neutralized by {source}; aborting intercept."),
                );
            }
            None => {
                reg.log(
                    tick,
                    &drone.id,
                    "Target Lost",
                    LogStatus::Failed,
                    format!("Lost contact with {target_id}; may have evaded or left the area."),
                );
            }
        }
        drone.status = DroneStatus::ReturningToBase;
        drone.clear_targets();
        return;
    };

    let climb = ALTITUDE_RATE_MPS * INTERCEPT_CLIMB_FACTOR * DT;
    let distance = pos.distance_3d_m(&target_pos);

    if drone.elimination_approved {
        let step = drone.cruising_speed_mps * STRIKE_SPEED_FACTOR * DT;
        if distance < NEUTRALIZATION_RADIUS_M || distance <= step {
            if let Some((target_entity, loc)) = index.consume(&target_id) {
                reg.record_elimination(tick, &target_id, &drone.id, loc);
                reg.log_alert(
                    tick,
                    &drone.id,
                    "Target Eliminated",
                    LogStatus::Success,
                    format!("{} neutralized hostile {target_id}.", drone.id),
                    AlertKind::InterceptionSuccess,
                );
                despawns.push(target_entity);
            }
            // The airframe is expended with the strike.
            despawns.push(entity);
            return;
        }
        step_toward(pos, &target_pos, step);
        ramp_altitude(pos, target_pos.alt_m, climb);
    } else {
        // Shadow the target and ask for elimination authority once inside
        // the observation window.
        let step = drone.cruising_speed_mps * OBSERVATION_SPEED_FACTOR * DT;
        step_toward(pos, &target_pos, step.min(distance.max(0.0)));
        ramp_altitude(pos, target_pos.alt_m, climb);

        if distance < params.observation_range_m
            && !drone.elimination_requested
            && !reg.has_request_for(&drone.id)
        {
            reg.push_request(
                tick,
                &drone.id,
                ActionKind::FlyIntoThreat,
                format!(
                    "Hostile {target_id} within engagement range. Requesting permission to eliminate."
                ),
                drone.intercept_threat_id.clone(),
            );
            drone.elimination_requested = true;
        }
    }
}

/// Transit movement for mission, autonomous-continuation, and
/// return-to-base states, including the approved-strike sub-mode.
#[allow(clippy::too_many_arguments)]
fn run_transit(
    drone: &mut Drone,
    pos: &mut GeoPos,
    entity: Entity,
    index: &mut TargetIndex,
    reg: &mut Registries,
    rng: &mut ChaCha8Rng,
    home: &GeoPos,
    despawns: &mut Vec<Entity>,
    tick: u64,
) {
    let mut returning_home = drone.status == DroneStatus::ReturningToBase;
    let target_location = if returning_home {
        *home
    } else if drone.status == DroneStatus::AiOverride {
        // Track the live target when one is referenced; fall back to the
        // static mission target, then home.
        let live = drone
            .mission_target_id
            .as_deref()
            .and_then(|id| index.position_of(id));
        match live {
            Some(loc) => {
                drone.mission_target = Some(loc);
                loc
            }
            None => match drone.mission_target {
                Some(loc) => loc,
                None => {
                    returning_home = true;
                    *home
                }
            },
        }
    } else {
        match drone.mission_target {
            Some(loc) => loc,
            None => return,
        }
    };

    // Approved strike: run at the target's live position and consume it.
    if drone.status == DroneStatus::AiOverride && drone.elimination_approved {
        let step = drone.cruising_speed_mps * STRIKE_SPEED_FACTOR * DT;
        let distance = pos.distance_3d_m(&target_location);
        if distance < NEUTRALIZATION_RADIUS_M || distance <= step {
            if let Some(target_id) = drone.mission_target_id.clone() {
                if let Some((target_entity, loc)) = index.consume(&target_id) {
                    reg.record_elimination(tick, &target_id, &drone.id, loc);
                    despawns.push(target_entity);
                }
            }
            reg.log_alert(
                tick,
                &drone.id,
                "Target Eliminated",
                LogStatus::Success,
                format!("{} expended against its mission target.", drone.id),
                AlertKind::InterceptionSuccess,
            );
            despawns.push(entity);
            return;
        }
        step_toward(pos, &target_location, step);
        ramp_altitude(pos, target_location.alt_m, ALTITUDE_RATE_MPS * DT);
        return;
    }

    let target_alt = if returning_home {
        home.alt_m + drone.cruising_alt_m
    } else {
        target_location.alt_m
    };

    let horizontal = pos.distance_m(&target_location);
    let vertical = (pos.alt_m - target_alt).abs();
    let speed = drone.cruising_speed_mps;

    if speed > 0.0 {
        let eta = (horizontal / speed).max(vertical / ALTITUDE_RATE_MPS);
        if eta.is_finite() {
            drone.eta_secs = Some(eta);
        }
    }

    let step = speed * DT;
    if horizontal < ARRIVAL_EPSILON_M || (step > 0.0 && horizontal <= step) {
        // Snap exactly onto the target; prevents oscillation around it.
        pos.lat = target_location.lat;
        pos.lon = target_location.lon;

        if returning_home {
            drone.status = DroneStatus::Landing;
        } else {
            drone.target_locked = true;
            drone.status = DroneStatus::HoveringOnTarget;
            drone.hovering_since_tick = Some(tick);
            if !reg.has_request_for(&drone.id) {
                push_hover_request(drone, reg, rng, tick);
            }
        }
    } else {
        drone.target_locked = false;
        step_toward(pos, &target_location, step);
        ramp_altitude(pos, target_alt, ALTITUDE_RATE_MPS * DT);
    }
}

/// On-station request appropriate to the airframe role.
fn push_hover_request(drone: &Drone, reg: &mut Registries, rng: &mut ChaCha8Rng, tick: u64) {
    let (action, reason) = match drone.drone_type {
        DroneType::Assault => {
            let roll: f64 = rng.gen();
            if roll < 0.33 {
                (
                    ActionKind::DropPayload,
                    "Optimal payload release coordinates achieved.",
                )
            } else if roll < 0.66 {
                (
                    ActionKind::FlyIntoTarget,
                    "Target confirmed as high-value static structure.",
                )
            } else {
                (
                    ActionKind::FlyIntoEnemyVehicle,
                    "Target identified as mobile enemy vehicle.",
                )
            }
        }
        DroneType::Interceptor => (
            ActionKind::FlyIntoThreat,
            "On target coordinates. Requesting permission to eliminate potential threat.",
        ),
        DroneType::Recon => {
            let roll: f64 = rng.gen();
            if roll < 0.33 {
                (
                    ActionKind::HoverOverTarget,
                    "Initiating reconnaissance orbit for detailed surveillance.",
                )
            } else if roll < 0.66 {
                (
                    ActionKind::ScanArea,
                    "Beginning grid scan for full area coverage.",
                )
            } else {
                (
                    ActionKind::DeploySensor,
                    "Deploying persistent sensor at target location.",
                )
            }
        }
    };
    reg.push_request(tick, &drone.id, action, reason.to_string(), None);
}

/// Move horizontally toward the target along the instantaneous bearing.
fn step_toward(pos: &mut GeoPos, target: &GeoPos, step_m: f64) {
    if step_m <= 0.0 {
        return;
    }
    let bearing = pos.bearing_to_deg(target);
    let next = pos.destination(bearing, step_m);
    pos.lat = next.lat;
    pos.lon = next.lon;
}

/// Ramp altitude linearly toward the target, clamping on arrival.
fn ramp_altitude(pos: &mut GeoPos, target_alt_m: f64, rate_m: f64) {
    if (pos.alt_m - target_alt_m).abs() > rate_m {
        pos.alt_m += rate_m * (target_alt_m - pos.alt_m).signum();
    } else {
        pos.alt_m = target_alt_m;
    }
}

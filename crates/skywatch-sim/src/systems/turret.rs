//! Counter-UAS turret engine.
//!
//! Per-turret state machine: scan for hostile contacts, hold for engagement
//! authority (human-in-loop) or engage directly (autonomous), spend ammo in
//! bursts with a distance-scaled hit roll, and cycle through a reload when
//! the magazine runs dry.

use std::collections::HashSet;

use hecs::{Entity, World};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use skywatch_core::components::{Turret, Ufo};
use skywatch_core::constants::{DT, TURRET_BURST_COST, TURRET_RELOAD_SECS};
use skywatch_core::enums::*;
use skywatch_core::events::AlertKind;
use skywatch_core::params::SimParams;
use skywatch_core::types::GeoPos;

use crate::registries::Registries;

/// A contact as the turrets see it this tick.
struct Contact {
    entity: Entity,
    id: String,
    hostile: bool,
    position: GeoPos,
}

/// Run every turret one tick.
pub fn run(
    world: &mut World,
    reg: &mut Registries,
    rng: &mut ChaCha8Rng,
    params: &SimParams,
    tick: u64,
) {
    let contacts: Vec<Contact> = world
        .query::<(&Ufo, &GeoPos)>()
        .iter()
        .map(|(entity, (ufo, pos))| Contact {
            entity,
            id: ufo.id.clone(),
            hostile: ufo.kind.is_hostile(),
            position: *pos,
        })
        .collect();

    // Targets destroyed earlier in this tick by another turret.
    let mut destroyed: HashSet<String> = HashSet::new();
    let mut kills: Vec<(Entity, String, GeoPos, String)> = Vec::new();

    for (_entity, (turret, turret_pos)) in world.query_mut::<(&mut Turret, &GeoPos)>() {
        if matches!(turret.status, TurretStatus::Disabled | TurretStatus::Standby) {
            continue;
        }

        if turret.status == TurretStatus::Reloading {
            if turret.reload_done_tick.is_some_and(|done| tick >= done) {
                turret.ammo = turret.max_ammo;
                turret.reload_done_tick = None;
                turret.status = TurretStatus::Scanning;
                reg.log(
                    tick,
                    &turret.id,
                    "Reload Complete",
                    LogStatus::Success,
                    "System re-armed; resuming scan.".to_string(),
                );
            }
            continue;
        }

        // Top-of-tick target validity: gone or out of detection range
        // resets the mount.
        if let Some(target_id) = turret.current_target_id.clone() {
            let still_valid = contacts
                .iter()
                .find(|c| c.id == target_id && !destroyed.contains(&c.id))
                .map(|c| turret_pos.distance_3d_m(&c.position) <= turret.detection_radius_m)
                .unwrap_or(false);
            if !still_valid {
                if turret.status == TurretStatus::Engaging {
                    reg.log(
                        tick,
                        &turret.id,
                        "Target Lost",
                        LogStatus::Failed,
                        format!("{target_id} left the engagement envelope or was destroyed."),
                    );
                }
                turret.reset_to_scanning();
            }
        }

        match turret.status {
            TurretStatus::Scanning => {
                if turret.mode == TurretMode::Manual {
                    continue;
                }
                let closest = contacts
                    .iter()
                    .filter(|c| c.hostile && !destroyed.contains(&c.id))
                    .map(|c| (c, turret_pos.distance_3d_m(&c.position)))
                    .filter(|(_, d)| *d <= turret.detection_radius_m)
                    .min_by(|(_, a), (_, b)| a.total_cmp(b));

                let Some((contact, distance)) = closest else {
                    continue;
                };
                if distance > turret.engagement_radius_m {
                    continue;
                }

                match turret.mode {
                    TurretMode::HumanInLoop => {
                        // One outstanding request per mount.
                        if reg.has_request_for(&turret.id) {
                            continue;
                        }
                        turret.current_target_id = Some(contact.id.clone());
                        turret.status = TurretStatus::Targeting;
                        reg.push_request(
                            tick,
                            &turret.id,
                            ActionKind::EngageGroundDefense,
                            format!(
                                "Hostile {} inside engagement range. Requesting permission to engage.",
                                contact.id
                            ),
                            None,
                        );
                    }
                    TurretMode::Autonomous => {
                        turret.current_target_id = Some(contact.id.clone());
                        turret.status = TurretStatus::Engaging;
                        reg.log(
                            tick,
                            &turret.id,
                            "Engaging",
                            LogStatus::Success,
                            format!("Autonomous engagement of {}.", contact.id),
                        );
                    }
                    TurretMode::Manual => unreachable!(),
                }
            }

            // Holding for operator approval; validity handled above.
            TurretStatus::Targeting => {}

            TurretStatus::Engaging => {
                let Some(target_id) = turret.current_target_id.clone() else {
                    turret.reset_to_scanning();
                    continue;
                };
                let Some(contact) = contacts
                    .iter()
                    .find(|c| c.id == target_id && !destroyed.contains(&c.id))
                else {
                    turret.reset_to_scanning();
                    continue;
                };

                turret.ammo = turret.ammo.saturating_sub(TURRET_BURST_COST);

                let distance = turret_pos.distance_3d_m(&contact.position);
                let hit_prob = (params.turret_hit_base
                    * (1.0 - distance / turret.engagement_radius_m))
                    .clamp(0.0, 1.0);

                if rng.gen_bool(hit_prob) {
                    destroyed.insert(contact.id.clone());
                    kills.push((
                        contact.entity,
                        contact.id.clone(),
                        contact.position,
                        turret.id.clone(),
                    ));
                    turret.reset_to_scanning();
                    reg.log_alert(
                        tick,
                        &turret.id,
                        "Target Destroyed",
                        LogStatus::Success,
                        format!("{} neutralized {}.", turret.id, contact.id),
                        AlertKind::CounterUasKill,
                    );
                }

                if turret.ammo == 0 {
                    turret.current_target_id = None;
                    turret.status = TurretStatus::Reloading;
                    turret.reload_done_tick = Some(tick + (TURRET_RELOAD_SECS / DT) as u64);
                    reg.log(
                        tick,
                        &turret.id,
                        "Reloading",
                        LogStatus::Success,
                        "Ammunition depleted; starting reload cycle.".to_string(),
                    );
                }
            }

            _ => {}
        }
    }

    for (entity, target_id, location, source_id) in kills {
        let _ = world.despawn(entity);
        reg.record_elimination(tick, &target_id, &source_id, location);
    }
}

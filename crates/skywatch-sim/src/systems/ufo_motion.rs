//! Unidentified-object motion and the FPV incursion spawner.
//!
//! Objects fly straight along their heading. At the operating-area boundary
//! benign traffic reverses course; hostile subtypes that leave are dropped
//! from the picture.

use hecs::{Entity, World};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use skywatch_core::components::Ufo;
use skywatch_core::constants::{DT, MAX_FPV_ALIVE, UFO_BOUNDARY_DEG};
use skywatch_core::enums::{LogStatus, UfoKind};
use skywatch_core::params::SimParams;
use skywatch_core::types::GeoPos;

use crate::registries::Registries;
use crate::world_setup;

/// Advance every object one tick and roll the FPV spawner.
pub fn run(
    world: &mut World,
    reg: &mut Registries,
    rng: &mut ChaCha8Rng,
    params: &SimParams,
    center: &GeoPos,
    tick: u64,
) {
    let mut fpv_alive = 0usize;
    let mut exited: Vec<(Entity, String)> = Vec::new();

    for (entity, (ufo, pos)) in world.query_mut::<(&mut Ufo, &mut GeoPos)>() {
        if ufo.kind == UfoKind::FpvDrone {
            fpv_alive += 1;
        }

        *pos = pos.destination(ufo.heading_deg, ufo.speed_mps * DT);

        let out_of_bounds = (pos.lat - center.lat).abs() > UFO_BOUNDARY_DEG
            || (pos.lon - center.lon).abs() > UFO_BOUNDARY_DEG;
        if out_of_bounds {
            if ufo.kind.is_hostile() {
                exited.push((entity, ufo.id.clone()));
            } else {
                ufo.heading_deg = (ufo.heading_deg + 180.0).rem_euclid(360.0);
            }
        }
    }

    for (entity, id) in exited {
        let _ = world.despawn(entity);
        reg.log(
            tick,
            &id,
            "Track Dropped",
            LogStatus::Failed,
            format!("Hostile contact {id} left the operational area."),
        );
    }

    // Low-and-fast incursions appear from time to time, capped so the
    // picture never saturates.
    if fpv_alive < MAX_FPV_ALIVE && rng.gen_bool((params.fpv_rate * DT).clamp(0.0, 1.0)) {
        let id = world_setup::spawn_fpv(world, reg, rng, center);
        reg.log(
            tick,
            &id,
            "New Contact",
            LogStatus::Success,
            format!("Fast low-altitude contact {id} detected inside the operating area."),
        );
    }
}

//! Entity spawn factories for setting up the simulation world.
//!
//! Commissions the drone fleet, ground installations, and the initial
//! air picture with appropriate component bundles.

use hecs::World;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use skywatch_core::components::*;
use skywatch_core::constants::INITIAL_UFO_COUNT;
use skywatch_core::enums::*;
use skywatch_core::types::GeoPos;
use skywatch_dispatch::profiles::get_profile;

use crate::engine::FleetComposition;
use crate::registries::Registries;

/// Commission the full fleet: `fleet` airframes of each type at every base.
/// Ids are unique across bases (`ASLT-1`, `SRVL-1`, `INTER-1`, ...).
pub fn spawn_fleet(world: &mut World, rng: &mut ChaCha8Rng, bases: &[GeoPos], fleet: &FleetComposition) {
    let mut counters: [u32; 3] = [0; 3];

    for (base_idx, base) in bases.iter().enumerate() {
        let allocation = [
            (DroneType::Assault, fleet.assault, 0usize),
            (DroneType::Recon, fleet.recon, 1),
            (DroneType::Interceptor, fleet.interceptor, 2),
        ];
        for (drone_type, count, slot) in allocation {
            for _ in 0..count {
                counters[slot] += 1;
                let prefix = get_profile(drone_type).id_prefix;
                let id = format!("{}-{}", prefix, counters[slot]);
                spawn_drone(world, rng, &id, drone_type, base_idx, *base);
            }
        }
    }
}

/// Commission a single drone, grounded at its home base.
pub fn spawn_drone(
    world: &mut World,
    rng: &mut ChaCha8Rng,
    id: &str,
    drone_type: DroneType,
    home_base: usize,
    base: GeoPos,
) -> hecs::Entity {
    let profile = get_profile(drone_type);
    world.spawn((
        Drone {
            id: id.to_string(),
            drone_type,
            status: DroneStatus::Grounded,
            battery_pct: 95.0 + rng.gen_range(0.0..5.0),
            signal_pct: 90.0 + rng.gen_range(0.0..10.0),
            cruising_speed_mps: profile.cruise_speed_mps,
            cruising_alt_m: profile.cruise_alt_m,
            mission_target: None,
            mission_target_id: None,
            intercept_target_id: None,
            intercept_threat_id: None,
            elimination_approved: false,
            elimination_requested: false,
            target_locked: false,
            eta_secs: None,
            home_base,
            hovering_since_tick: None,
            evade_until_tick: None,
        },
        base,
    ))
}

/// Install one counter-UAS turret per base, slightly elevated.
pub fn spawn_turrets(world: &mut World, bases: &[GeoPos]) {
    for (idx, base) in bases.iter().enumerate() {
        spawn_turret(
            world,
            &format!("b{}-turret-01", idx + 1),
            base.at_altitude(base.alt_m + 10.0),
            TurretMode::HumanInLoop,
        );
    }
}

/// Install a single turret.
pub fn spawn_turret(world: &mut World, id: &str, location: GeoPos, mode: TurretMode) -> hecs::Entity {
    world.spawn((
        Turret {
            id: id.to_string(),
            status: TurretStatus::Scanning,
            mode,
            ammo: 150,
            max_ammo: 150,
            detection_radius_m: 2500.0,
            engagement_radius_m: 1200.0,
            current_target_id: None,
            reload_done_tick: None,
        },
        location,
    ))
}

/// Seed the initial air picture: high-altitude transiting traffic around
/// the operating area.
pub fn spawn_initial_ufos(world: &mut World, reg: &mut Registries, rng: &mut ChaCha8Rng, center: &GeoPos) {
    let kinds = [
        UfoKind::CommercialJet,
        UfoKind::PrivatePlane,
        UfoKind::Helicopter,
        UfoKind::UnknownUav,
    ];
    for i in 0..INITIAL_UFO_COUNT {
        let id = reg.next_ufo_id();
        let location = GeoPos::new(
            center.lat + rng.gen_range(-0.25..0.25),
            center.lon + rng.gen_range(-0.25..0.25),
            5_000.0 + rng.gen_range(0.0..5_000.0),
        );
        spawn_ufo(
            world,
            &id,
            kinds[i % kinds.len()],
            location,
            111.0 + rng.gen_range(0.0..111.0),
            rng.gen_range(0.0..360.0),
        );
    }
}

/// Spawn a low-and-fast FPV incursion near the operating area.
pub fn spawn_fpv(world: &mut World, reg: &mut Registries, rng: &mut ChaCha8Rng, center: &GeoPos) -> String {
    let id = format!("{}-fpv", reg.next_ufo_id());
    let location = GeoPos::new(
        center.lat + rng.gen_range(-0.1..0.1),
        center.lon + rng.gen_range(-0.1..0.1),
        50.0 + rng.gen_range(0.0..250.0),
    );
    spawn_ufo(
        world,
        &id,
        UfoKind::FpvDrone,
        location,
        28.0 + rng.gen_range(0.0..14.0),
        rng.gen_range(0.0..360.0),
    );
    id
}

/// Spawn a single unidentified object.
pub fn spawn_ufo(
    world: &mut World,
    id: &str,
    kind: UfoKind,
    location: GeoPos,
    speed_mps: f64,
    heading_deg: f64,
) -> hecs::Entity {
    world.spawn((
        Ufo {
            id: id.to_string(),
            kind,
            speed_mps,
            heading_deg,
        },
        location,
    ))
}

/// Spawn a reported threat signature.
pub fn spawn_threat(
    world: &mut World,
    id: &str,
    kind: ThreatKind,
    severity: Severity,
    summary: &str,
    location: GeoPos,
    tick: u64,
) -> hecs::Entity {
    world.spawn((
        Threat {
            id: id.to_string(),
            kind,
            severity,
            response_status: ResponseStatus::Pending,
            summary: summary.to_string(),
            spawned_tick: tick,
        },
        location,
    ))
}

//! Tests for the simulation engine: physics, dispatchers, turret engine,
//! approval workflow, generators, and determinism.

use skywatch_core::commands::{CommandScope, DroneAction, OperatorCommand, TurretOrder};
use skywatch_core::components::{Drone, Turret};
use skywatch_core::enums::*;
use skywatch_core::params::SimParams;
use skywatch_core::records::{Geofence, HazardZone};
use skywatch_core::state::{DroneView, WorldSnapshot};
use skywatch_core::types::{GeoPos, GeoVertex};

use crate::engine::{FleetComposition, SimConfig, SimulationEngine};
use crate::world_setup;

const BASE: GeoPos = GeoPos {
    lat: 6.2,
    lon: 1.4,
    alt_m: 0.0,
};

/// A single-base engine with no stochastic spawning and no seeded traffic.
fn quiet_config(fleet: FleetComposition) -> SimConfig {
    SimConfig {
        seed: 7,
        bases: vec![BASE],
        fleet_per_base: fleet,
        seed_traffic: false,
        params: SimParams::quiet(),
        ..Default::default()
    }
}

fn interceptors(n: u32) -> FleetComposition {
    FleetComposition {
        assault: 0,
        recon: 0,
        interceptor: n,
    }
}

fn assaults(n: u32) -> FleetComposition {
    FleetComposition {
        assault: n,
        recon: 0,
        interceptor: 0,
    }
}

/// A defended geofence box generously covering the operating area.
fn defended_fence() -> Geofence {
    Geofence {
        id: "gf-perimeter".into(),
        name: "perimeter defense".into(),
        points: vec![
            GeoVertex { lat: 5.0, lon: 0.0 },
            GeoVertex { lat: 5.0, lon: 3.0 },
            GeoVertex { lat: 7.5, lon: 3.0 },
            GeoVertex { lat: 7.5, lon: 0.0 },
        ],
        alert_on_entry: true,
        alert_on_exit: false,
        interceptor_defense: true,
    }
}

fn set_drone(engine: &mut SimulationEngine, id: &str, f: impl FnOnce(&mut Drone)) {
    for (_e, drone) in engine.world_mut().query_mut::<&mut Drone>() {
        if drone.id == id {
            f(drone);
            return;
        }
    }
    panic!("no drone {id}");
}

fn set_turret(engine: &mut SimulationEngine, id: &str, f: impl FnOnce(&mut Turret)) {
    for (_e, turret) in engine.world_mut().query_mut::<&mut Turret>() {
        if turret.id == id {
            f(turret);
            return;
        }
    }
    panic!("no turret {id}");
}

fn drone_view<'a>(snap: &'a WorldSnapshot, id: &str) -> &'a DroneView {
    snap.drones
        .iter()
        .find(|d| d.id == id)
        .unwrap_or_else(|| panic!("drone {id} missing from snapshot"))
}

// ---- Determinism ----

#[test]
fn test_determinism_same_seed() {
    let mut engine_a = SimulationEngine::new(SimConfig {
        seed: 12345,
        ..Default::default()
    });
    let mut engine_b = SimulationEngine::new(SimConfig {
        seed: 12345,
        ..Default::default()
    });

    engine_a.queue_command(OperatorCommand::Drone {
        scope: CommandScope::Fleet,
        action: DroneAction::Launch,
    });
    engine_b.queue_command(OperatorCommand::Drone {
        scope: CommandScope::Fleet,
        action: DroneAction::Launch,
    });

    for _ in 0..300 {
        let snap_a = engine_a.tick();
        let snap_b = engine_b.tick();
        let json_a = serde_json::to_string(&snap_a).unwrap();
        let json_b = serde_json::to_string(&snap_b).unwrap();
        assert_eq!(json_a, json_b, "Snapshots diverged with same seed");
    }
}

#[test]
fn test_determinism_different_seeds() {
    let mut engine_a = SimulationEngine::new(SimConfig {
        seed: 111,
        ..Default::default()
    });
    let mut engine_b = SimulationEngine::new(SimConfig {
        seed: 222,
        ..Default::default()
    });

    let mut diverged = false;
    for _ in 0..100 {
        let json_a = serde_json::to_string(&engine_a.tick()).unwrap();
        let json_b = serde_json::to_string(&engine_b.tick()).unwrap();
        if json_a != json_b {
            diverged = true;
            break;
        }
    }
    assert!(diverged, "Different seeds should produce divergent output");
}

// ---- Long-run invariants ----

#[test]
fn test_bounds_and_reference_invariants_over_long_run() {
    let mut engine = SimulationEngine::new(SimConfig::default());
    engine.queue_command(OperatorCommand::SetGeofences {
        geofences: vec![defended_fence()],
    });
    engine.queue_command(OperatorCommand::Drone {
        scope: CommandScope::Fleet,
        action: DroneAction::Launch,
    });

    for _ in 0..400 {
        let snap = engine.tick();

        for drone in &snap.drones {
            assert!(
                (0.0..=100.0).contains(&drone.battery_pct),
                "battery out of range: {}",
                drone.battery_pct
            );
            assert!(
                (0.0..=100.0).contains(&drone.signal_pct),
                "signal out of range: {}",
                drone.signal_pct
            );
            // At most one intercept reference per drone.
            assert!(
                !(drone.intercept_target_id.is_some() && drone.intercept_threat_id.is_some()),
                "{} holds both intercept references",
                drone.id
            );
        }

        for turret in &snap.turrets {
            assert!(
                turret.ammo <= turret.max_ammo,
                "{} ammo overflow: {}/{}",
                turret.id,
                turret.ammo,
                turret.max_ammo
            );
        }

        // No target is referenced by two distinct drones.
        let mut refs: Vec<&str> = snap
            .drones
            .iter()
            .filter_map(|d| {
                d.intercept_target_id
                    .as_deref()
                    .or(d.intercept_threat_id.as_deref())
            })
            .collect();
        refs.sort();
        let before = refs.len();
        refs.dedup();
        assert_eq!(before, refs.len(), "a target is double-assigned");
    }
}

// ---- Drone physics ----

#[test]
fn test_snap_to_target_without_overshoot() {
    let mut engine = SimulationEngine::new(quiet_config(assaults(1)));
    let target = BASE.destination(90.0, 50.0); // closer than one 60 m/s step

    set_drone(&mut engine, "ASLT-1", |d| {
        d.status = DroneStatus::Mission;
        d.mission_target = Some(target);
    });

    let snap = engine.tick();
    let drone = drone_view(&snap, "ASLT-1");
    assert_eq!(drone.status, DroneStatus::HoveringOnTarget);
    assert!(drone.target_locked);
    assert!(
        (drone.location.lat - target.lat).abs() < 1e-12
            && (drone.location.lon - target.lon).abs() < 1e-12,
        "arrival must snap exactly onto the target"
    );

    // Arrival raises exactly one on-station request, deduplicated.
    assert_eq!(snap.action_requests.len(), 1);
    assert_eq!(snap.action_requests[0].subject_id, "ASLT-1");
    let snap = engine.tick();
    assert_eq!(snap.action_requests.len(), 1);
}

#[test]
fn test_launch_climb_and_return_cycle() {
    let mut engine = SimulationEngine::new(quiet_config(assaults(1)));
    engine.queue_command(OperatorCommand::Drone {
        scope: CommandScope::Single { id: "ASLT-1".into() },
        action: DroneAction::Launch,
    });

    // Climb at 2 m/s to 100 m cruise.
    let mut snap = engine.tick();
    assert_eq!(drone_view(&snap, "ASLT-1").status, DroneStatus::Launching);
    for _ in 0..55 {
        snap = engine.tick();
    }
    let drone = drone_view(&snap, "ASLT-1");
    assert_eq!(drone.status, DroneStatus::HoveringAtBase);
    assert!((drone.location.alt_m - 100.0).abs() < 1e-9);

    engine.queue_command(OperatorCommand::Drone {
        scope: CommandScope::Single { id: "ASLT-1".into() },
        action: DroneAction::ReturnToBase,
    });
    for _ in 0..60 {
        snap = engine.tick();
    }
    let drone = drone_view(&snap, "ASLT-1");
    assert_eq!(drone.status, DroneStatus::Grounded);
    assert!(drone.location.alt_m.abs() < 1e-9);
}

#[test]
fn test_battery_drains_only_airborne() {
    let mut engine = SimulationEngine::new(quiet_config(assaults(2)));
    set_drone(&mut engine, "ASLT-1", |d| d.status = DroneStatus::HoveringAtBase);
    let initial: Vec<f64> = {
        let snap = engine.tick();
        vec![
            drone_view(&snap, "ASLT-1").battery_pct,
            drone_view(&snap, "ASLT-2").battery_pct,
        ]
    };

    let mut snap = engine.tick();
    for _ in 0..20 {
        snap = engine.tick();
    }
    assert!(
        drone_view(&snap, "ASLT-1").battery_pct < initial[0],
        "airborne drone must drain"
    );
    assert!(
        (drone_view(&snap, "ASLT-2").battery_pct - initial[1]).abs() < 1e-9,
        "grounded drone must not drain"
    );
}

#[test]
fn test_signal_loss_forces_autonomous_control() {
    let mut engine = SimulationEngine::new(quiet_config(assaults(1)));
    set_drone(&mut engine, "ASLT-1", |d| {
        d.status = DroneStatus::Mission;
        d.mission_target = Some(BASE.destination(0.0, 20_000.0).at_altitude(150.0));
        d.signal_pct = 5.0;
    });

    let snap = engine.tick();
    assert_eq!(drone_view(&snap, "ASLT-1").status, DroneStatus::AiOverride);
    assert!(
        snap.log
            .iter()
            .any(|l| l.command == "Autonomous Control Engaged"),
        "override must be logged"
    );
}

#[test]
fn test_eta_reported_while_in_transit() {
    let mut engine = SimulationEngine::new(quiet_config(assaults(1)));
    set_drone(&mut engine, "ASLT-1", |d| {
        d.status = DroneStatus::Mission;
        d.mission_target = Some(BASE.destination(0.0, 6_000.0).at_altitude(100.0));
    });

    let snap = engine.tick();
    let eta = drone_view(&snap, "ASLT-1").eta_secs.expect("eta in transit");
    // ~6 km at 60 m/s, minus the first step.
    assert!(eta > 50.0 && eta < 120.0, "unreasonable eta: {eta}");

    // Grounded drones report no ETA.
    let mut engine = SimulationEngine::new(quiet_config(assaults(1)));
    let snap = engine.tick();
    assert!(drone_view(&snap, "ASLT-1").eta_secs.is_none());
}

// ---- Intercept pursuit and elimination ----

#[test]
fn test_interceptor_dispatch_observe_request_eliminate() {
    let mut engine = SimulationEngine::new(quiet_config(interceptors(1)));
    engine.queue_command(OperatorCommand::SetGeofences {
        geofences: vec![defended_fence()],
    });
    // Hostile FPV inside the defended zone, outside the turret's ring.
    let ufo_pos = BASE.destination(90.0, 3_000.0).at_altitude(100.0);
    world_setup::spawn_ufo(engine.world_mut(), "ufo-hostile", UfoKind::FpvDrone, ufo_pos, 40.0, 0.0);

    // One tick of the dispatcher claims the idle interceptor.
    let snap = engine.tick();
    let drone = drone_view(&snap, "INTER-1");
    assert_eq!(drone.status, DroneStatus::Intercepting);
    assert_eq!(drone.intercept_target_id.as_deref(), Some("ufo-hostile"));
    assert!(drone.intercept_threat_id.is_none());

    // Pursuit closes in; exactly one elimination-authority request appears.
    let mut request_id = None;
    for _ in 0..12 {
        let snap = engine.tick();
        let matching: Vec<_> = snap
            .action_requests
            .iter()
            .filter(|r| r.subject_id == "INTER-1" && r.action == ActionKind::FlyIntoThreat)
            .collect();
        assert!(matching.len() <= 1, "duplicate elimination requests");
        if let Some(req) = matching.first() {
            assert_eq!(req.priority, Priority::Critical);
            request_id = Some(req.id.clone());
        }
    }
    let request_id = request_id.expect("observation range should trigger a request");

    // Approval turns the pursuit into a strike that consumes both parties.
    engine.queue_command(OperatorCommand::RespondAction {
        request_id,
        approved: true,
    });
    let mut eliminations = Vec::new();
    for _ in 0..10 {
        let snap = engine.tick();
        eliminations.extend(snap.eliminations.clone());
    }
    assert_eq!(
        eliminations
            .iter()
            .filter(|e| e.target_id == "ufo-hostile")
            .count(),
        1,
        "exactly one elimination event"
    );

    let snap = engine.tick();
    assert!(snap.ufos.is_empty(), "target must be removed");
    assert!(snap.drones.is_empty(), "striking drone is consumed");
    assert!(
        snap.action_requests.is_empty(),
        "no dangling requests after the strike"
    );
}

#[test]
fn test_interceptor_not_dispatched_inside_turret_ring() {
    let mut engine = SimulationEngine::new(quiet_config(interceptors(1)));
    engine.queue_command(OperatorCommand::SetGeofences {
        geofences: vec![defended_fence()],
    });
    // Inside the base turret's 1200 m engagement ring: turret business.
    let ufo_pos = BASE.destination(90.0, 800.0).at_altitude(100.0);
    world_setup::spawn_ufo(engine.world_mut(), "ufo-close", UfoKind::FpvDrone, ufo_pos, 40.0, 0.0);

    let snap = engine.tick();
    let drone = drone_view(&snap, "INTER-1");
    assert_eq!(drone.status, DroneStatus::Grounded);
    assert!(drone.intercept_target_id.is_none());
}

#[test]
fn test_no_double_assignment_of_one_target() {
    let mut engine = SimulationEngine::new(quiet_config(interceptors(2)));
    engine.queue_command(OperatorCommand::SetGeofences {
        geofences: vec![defended_fence()],
    });
    let ufo_pos = BASE.destination(90.0, 3_000.0).at_altitude(100.0);
    world_setup::spawn_ufo(engine.world_mut(), "ufo-1", UfoKind::FpvDrone, ufo_pos, 40.0, 0.0);

    let snap = engine.tick();
    let claimed = snap
        .drones
        .iter()
        .filter(|d| d.intercept_target_id.as_deref() == Some("ufo-1"))
        .count();
    assert_eq!(claimed, 1, "exactly one interceptor per target");
}

#[test]
fn test_lost_target_reverts_to_base() {
    let mut engine = SimulationEngine::new(quiet_config(interceptors(1)));
    set_drone(&mut engine, "INTER-1", |d| {
        d.status = DroneStatus::Intercepting;
        d.intercept_target_id = Some("ghost".into());
    });

    let snap = engine.tick();
    let drone = drone_view(&snap, "INTER-1");
    assert_eq!(drone.status, DroneStatus::ReturningToBase);
    assert!(drone.intercept_target_id.is_none());
    assert!(
        snap.log
            .iter()
            .any(|l| l.command == "Target Lost" && l.status == LogStatus::Failed),
        "plain loss is logged as lost contact"
    );
}

#[test]
fn test_lost_target_attributed_to_other_asset() {
    let mut engine = SimulationEngine::new(quiet_config(interceptors(1)));
    engine
        .registries_mut()
        .record_elimination(0, "ufo-taken", "b1-turret-01", BASE);
    set_drone(&mut engine, "INTER-1", |d| {
        d.status = DroneStatus::Intercepting;
        d.intercept_target_id = Some("ufo-taken".into());
    });

    let snap = engine.tick();
    assert_eq!(
        drone_view(&snap, "INTER-1").status,
        DroneStatus::ReturningToBase
    );
    assert!(
        snap.log
            .iter()
            .any(|l| l.command == "Disengaging" && l.details.contains("b1-turret-01")),
        "ledger hit is attributed to the other asset"
    );
}

// ---- Turret engine ----

fn close_contact(engine: &mut SimulationEngine, id: &str, range_m: f64) {
    let pos = BASE.destination(90.0, range_m).at_altitude(100.0);
    world_setup::spawn_ufo(engine.world_mut(), id, UfoKind::FpvDrone, pos, 0.0, 0.0);
}

#[test]
fn test_turret_requests_before_engaging() {
    let mut config = quiet_config(interceptors(0));
    config.params.turret_hit_base = 0.0; // guaranteed misses
    let mut engine = SimulationEngine::new(config);
    close_contact(&mut engine, "ufo-close", 800.0);

    let snap = engine.tick();
    let turret = &snap.turrets[0];
    assert_eq!(turret.status, TurretStatus::Targeting);
    assert_eq!(turret.current_target_id.as_deref(), Some("ufo-close"));
    let request = snap
        .action_requests
        .iter()
        .find(|r| r.subject_id == turret.id)
        .expect("engagement authority request");
    assert_eq!(request.action, ActionKind::EngageGroundDefense);
    assert_eq!(request.priority, Priority::Critical);

    // Approval flips targeting to engaging, never back to targeting.
    engine.queue_command(OperatorCommand::RespondAction {
        request_id: request.id.clone(),
        approved: true,
    });
    let snap = engine.tick();
    let turret = &snap.turrets[0];
    assert_eq!(turret.status, TurretStatus::Engaging);
    assert_eq!(turret.ammo, turret.max_ammo - 5, "one burst spent");
}

#[test]
fn test_turret_denial_reverts_to_scanning() {
    let mut config = quiet_config(interceptors(0));
    config.params.turret_hit_base = 0.0;
    let mut engine = SimulationEngine::new(config);
    close_contact(&mut engine, "ufo-close", 800.0);

    let snap = engine.tick();
    let request_id = snap.action_requests[0].id.clone();
    engine.queue_command(OperatorCommand::RespondAction {
        request_id: request_id.clone(),
        approved: false,
    });
    let snap = engine.tick();
    // The mount re-scans; with the contact still inside the ring it raises
    // a fresh request, but never fires unapproved.
    let turret = &snap.turrets[0];
    assert_ne!(turret.status, TurretStatus::Engaging);
    assert!(snap.action_requests.iter().all(|r| r.id != request_id));
    assert_eq!(turret.ammo, turret.max_ammo, "no rounds spent unapproved");
}

#[test]
fn test_turret_ammo_exhaustion_and_reload() {
    let mut config = quiet_config(interceptors(0));
    config.params.turret_hit_base = 0.0;
    let mut engine = SimulationEngine::new(config);
    close_contact(&mut engine, "ufo-close", 800.0);
    set_turret(&mut engine, "b1-turret-01", |t| {
        t.ammo = 5;
        t.status = TurretStatus::Engaging;
        t.current_target_id = Some("ufo-close".into());
    });

    let snap = engine.tick();
    let turret = &snap.turrets[0];
    assert_eq!(turret.ammo, 0);
    assert_eq!(turret.status, TurretStatus::Reloading);

    // 15 seconds later the magazine is restored and scanning resumes.
    let mut snap = engine.tick();
    for _ in 0..15 {
        snap = engine.tick();
    }
    let turret = &snap.turrets[0];
    assert_eq!(turret.ammo, turret.max_ammo);
    assert_ne!(turret.status, TurretStatus::Reloading);
}

#[test]
fn test_autonomous_turret_kill_records_elimination() {
    let mut config = quiet_config(interceptors(0));
    config.params.turret_hit_base = 1.0;
    let mut engine = SimulationEngine::new(config);
    close_contact(&mut engine, "ufo-doomed", 100.0);
    set_turret(&mut engine, "b1-turret-01", |t| t.mode = TurretMode::Autonomous);

    let mut eliminations = Vec::new();
    for _ in 0..10 {
        let snap = engine.tick();
        eliminations.extend(snap.eliminations.clone());
        if !eliminations.is_empty() {
            break;
        }
    }
    assert_eq!(
        eliminations
            .iter()
            .filter(|e| e.target_id == "ufo-doomed")
            .count(),
        1
    );
    let snap = engine.tick();
    assert!(snap.ufos.iter().all(|u| u.id != "ufo-doomed"));
    assert!(
        snap.action_requests.is_empty(),
        "autonomous mode never asks for approval"
    );
}

#[test]
fn test_cease_fire_order() {
    let mut config = quiet_config(interceptors(0));
    config.params.turret_hit_base = 0.0;
    let mut engine = SimulationEngine::new(config);
    close_contact(&mut engine, "ufo-close", 800.0);
    set_turret(&mut engine, "b1-turret-01", |t| {
        t.status = TurretStatus::Engaging;
        t.current_target_id = Some("ufo-close".into());
    });

    engine.queue_command(OperatorCommand::Turret {
        system_id: "b1-turret-01".into(),
        order: TurretOrder::CeaseFire,
    });
    let snap = engine.tick();
    assert_ne!(snap.turrets[0].status, TurretStatus::Engaging);
    assert!(snap.log.iter().any(|l| l.command == "Cease Fire"));
}

// ---- Dispatch planners through the engine ----

#[test]
fn test_designation_proposed_and_approved() {
    let mut engine = SimulationEngine::new(quiet_config(FleetComposition {
        assault: 1,
        recon: 0,
        interceptor: 1,
    }));
    let threat_pos = BASE.destination(45.0, 10_000.0).at_altitude(150.0);
    world_setup::spawn_threat(
        engine.world_mut(),
        "thr-1",
        ThreatKind::UnidentifiedDrone,
        Severity::Critical,
        "Unidentified drone detected near restricted airspace.",
        threat_pos,
        0,
    );

    let snap = engine.tick();
    assert_eq!(snap.designations.len(), 1);
    let designation = &snap.designations[0];
    // The interceptor is preferred over the assault airframe.
    assert_eq!(designation.suggested_drone_id, "INTER-1");
    assert_eq!(designation.source_id, "thr-1");
    assert_eq!(
        snap.threats[0].response_status,
        ResponseStatus::AiTargeting,
        "proposal suppresses duplicates"
    );

    // No duplicate proposals while the first is outstanding.
    let snap = engine.tick();
    assert_eq!(snap.designations.len(), 1);
    let designation_id = snap.designations[0].id.clone();

    engine.queue_command(OperatorCommand::RespondDesignation {
        request_id: designation_id,
        approved: true,
        drone_id: Some("INTER-1".into()),
    });
    let snap = engine.tick();
    assert!(snap.designations.is_empty());
    let drone = drone_view(&snap, "INTER-1");
    assert_eq!(drone.mission_target_id.as_deref(), Some("thr-1"));
    assert!(matches!(
        drone.status,
        DroneStatus::Launching | DroneStatus::Mission
    ));
    assert_eq!(snap.threats[0].response_status, ResponseStatus::Acknowledged);
}

#[test]
fn test_designation_denial_reverts_threat() {
    let mut engine = SimulationEngine::new(quiet_config(assaults(1)));
    world_setup::spawn_threat(
        engine.world_mut(),
        "thr-1",
        ThreatKind::HostileAircraft,
        Severity::High,
        "Hostile aircraft inbound.",
        BASE.destination(0.0, 8_000.0).at_altitude(300.0),
        0,
    );

    let snap = engine.tick();
    let designation_id = snap.designations[0].id.clone();
    engine.queue_command(OperatorCommand::RespondDesignation {
        request_id: designation_id,
        approved: false,
        drone_id: None,
    });
    let snap = engine.tick();
    // Denial reverts the threat to pending, so it is immediately
    // re-proposed on the same tick's planner pass.
    assert_eq!(snap.designations.len(), 1);
    assert_eq!(snap.threats[0].response_status, ResponseStatus::AiTargeting);
    let drone = drone_view(&snap, "ASLT-1");
    assert!(drone.mission_target_id.is_none());
}

#[test]
fn test_designation_runs_before_autonomous_interceptor() {
    // Two severe threats, one idle interceptor: the designation planner
    // proposes for the first threat (operator in the loop), and only the
    // leftover threat is taken autonomously.
    let mut engine = SimulationEngine::new(quiet_config(interceptors(1)));
    engine.queue_command(OperatorCommand::SetGeofences {
        geofences: vec![defended_fence()],
    });
    world_setup::spawn_threat(
        engine.world_mut(),
        "thr-1",
        ThreatKind::UnidentifiedDrone,
        Severity::High,
        "Unidentified drone detected near restricted airspace.",
        BASE.destination(20.0, 9_000.0).at_altitude(150.0),
        0,
    );
    world_setup::spawn_threat(
        engine.world_mut(),
        "thr-2",
        ThreatKind::UnidentifiedDrone,
        Severity::High,
        "Unidentified drone detected near restricted airspace.",
        BASE.destination(200.0, 9_000.0).at_altitude(150.0),
        0,
    );

    let snap = engine.tick();
    assert_eq!(snap.designations.len(), 1);
    assert_eq!(snap.designations[0].source_id, "thr-1");

    let drone = drone_view(&snap, "INTER-1");
    assert_eq!(drone.intercept_threat_id.as_deref(), Some("thr-2"));
    assert_eq!(drone.status, DroneStatus::Launching);

    let thr_1 = snap.threats.iter().find(|t| t.id == "thr-1").unwrap();
    let thr_2 = snap.threats.iter().find(|t| t.id == "thr-2").unwrap();
    assert_eq!(thr_1.response_status, ResponseStatus::AiTargeting);
    assert_eq!(thr_2.response_status, ResponseStatus::Acknowledged);
}

#[test]
fn test_recon_dispatch_on_proximity() {
    let mut engine = SimulationEngine::new(quiet_config(FleetComposition {
        assault: 1,
        recon: 1,
        interceptor: 0,
    }));
    let threat_pos = BASE.destination(0.0, 10_000.0).at_altitude(150.0);
    world_setup::spawn_threat(
        engine.world_mut(),
        "thr-1",
        ThreatKind::UnidentifiedDrone,
        Severity::Medium,
        "Unidentified drone detected near restricted airspace.",
        threat_pos,
        0,
    );
    // An active drone happens to be right next to the signature.
    let near = threat_pos.destination(90.0, 5.0);
    set_drone(&mut engine, "ASLT-1", |d| d.status = DroneStatus::Mission);
    for (_e, (drone, pos)) in engine
        .world_mut()
        .query_mut::<(&Drone, &mut GeoPos)>()
    {
        if drone.id == "ASLT-1" {
            *pos = near;
        }
    }

    let snap = engine.tick();
    let recon = drone_view(&snap, "SRVL-1");
    assert_eq!(recon.status, DroneStatus::Launching);
    let target = recon.mission_target.expect("recon tasked");
    assert!((target.alt_m - (threat_pos.alt_m + 30.0)).abs() < 1e-9);
    assert!((recon.cruising_alt_m - (threat_pos.alt_m + 30.0)).abs() < 1e-9);
    assert_eq!(snap.threats[0].response_status, ResponseStatus::Acknowledged);
}

#[test]
fn test_recon_waits_without_proximity_trigger() {
    let mut engine = SimulationEngine::new(quiet_config(FleetComposition {
        assault: 0,
        recon: 1,
        interceptor: 0,
    }));
    world_setup::spawn_threat(
        engine.world_mut(),
        "thr-1",
        ThreatKind::UnidentifiedDrone,
        Severity::Medium,
        "Unidentified drone detected near restricted airspace.",
        BASE.destination(0.0, 10_000.0).at_altitude(150.0),
        0,
    );

    let snap = engine.tick();
    assert_eq!(drone_view(&snap, "SRVL-1").status, DroneStatus::Grounded);
    assert_eq!(snap.threats[0].response_status, ResponseStatus::Pending);
}

// ---- Approval workflow ----

#[test]
fn test_hover_timeout_is_implicit_denial() {
    let mut engine = SimulationEngine::new(quiet_config(assaults(1)));
    set_drone(&mut engine, "ASLT-1", |d| {
        d.status = DroneStatus::HoveringOnTarget;
        d.hovering_since_tick = Some(0);
        d.mission_target = Some(BASE.destination(0.0, 5_000.0).at_altitude(120.0));
    });
    engine.registries_mut().push_request(
        0,
        "ASLT-1",
        ActionKind::DropPayload,
        "Optimal payload release coordinates achieved.".to_string(),
        None,
    );

    let mut snap = engine.tick();
    for _ in 0..31 {
        snap = engine.tick();
    }
    assert!(snap.action_requests.is_empty(), "timed-out request purged");
    let drone = drone_view(&snap, "ASLT-1");
    assert_ne!(drone.status, DroneStatus::HoveringOnTarget);
    assert!(drone.mission_target.is_none());
}

#[test]
fn test_override_to_evasion_and_back() {
    let mut engine = SimulationEngine::new(quiet_config(assaults(1)));
    set_drone(&mut engine, "ASLT-1", |d| d.status = DroneStatus::HoveringOnTarget);
    engine.registries_mut().push_request(
        0,
        "ASLT-1",
        ActionKind::DropPayload,
        "Optimal payload release coordinates achieved.".to_string(),
        None,
    );
    let request_id = engine.registries().action_requests[0].id.clone();

    engine.queue_command(OperatorCommand::OverrideAction {
        request_id,
        action: ActionKind::AlterCourse,
    });
    let snap = engine.tick();
    assert_eq!(drone_view(&snap, "ASLT-1").status, DroneStatus::Evading);
    assert!(snap.action_requests.is_empty());

    let mut snap = engine.tick();
    for _ in 0..6 {
        snap = engine.tick();
    }
    let status = drone_view(&snap, "ASLT-1").status;
    assert!(
        matches!(
            status,
            DroneStatus::ReturningToBase | DroneStatus::Landing | DroneStatus::Grounded
        ),
        "evasion must end after its fixed duration, got {status:?}"
    );
}

#[test]
fn test_override_requires_mission_target() {
    let mut engine = SimulationEngine::new(quiet_config(assaults(1)));
    set_drone(&mut engine, "ASLT-1", |d| d.status = DroneStatus::HoveringOnTarget);
    engine.registries_mut().push_request(
        0,
        "ASLT-1",
        ActionKind::DropPayload,
        "Optimal payload release coordinates achieved.".to_string(),
        None,
    );
    let request_id = engine.registries().action_requests[0].id.clone();

    engine.queue_command(OperatorCommand::OverrideAction {
        request_id,
        action: ActionKind::HoverOverTarget,
    });
    let snap = engine.tick();
    // No mission target: fall back to a safe state, loudly.
    let status = drone_view(&snap, "ASLT-1").status;
    assert!(
        matches!(
            status,
            DroneStatus::ReturningToBase | DroneStatus::Landing | DroneStatus::Grounded
        ),
        "expected a safe fallback state, got {status:?}"
    );
    assert!(snap
        .log
        .iter()
        .any(|l| l.command == "Override Failed" && l.status == LogStatus::Failed));
}

#[test]
fn test_override_rejects_engine_internal_actions() {
    let mut engine = SimulationEngine::new(quiet_config(assaults(1)));
    engine.registries_mut().push_request(
        0,
        "ASLT-1",
        ActionKind::DropPayload,
        "Optimal payload release coordinates achieved.".to_string(),
        None,
    );
    let request_id = engine.registries().action_requests[0].id.clone();

    engine.queue_command(OperatorCommand::OverrideAction {
        request_id,
        action: ActionKind::CounterCommand,
    });
    let snap = engine.tick();
    // The request survives; the override is declined.
    assert_eq!(snap.action_requests.len(), 1);
    assert!(snap
        .log
        .iter()
        .any(|l| l.command == "Override" && l.status == LogStatus::Failed));
}

#[test]
fn test_abort_mission_approval() {
    let mut engine = SimulationEngine::new(quiet_config(assaults(1)));
    set_drone(&mut engine, "ASLT-1", |d| {
        d.status = DroneStatus::HoveringOnTarget;
        d.hovering_since_tick = Some(0);
        d.mission_target = Some(BASE.destination(0.0, 5_000.0).at_altitude(120.0));
    });
    engine.registries_mut().push_request(
        0,
        "ASLT-1",
        ActionKind::AbortMission,
        "Fuel margin below mission reserve.".to_string(),
        None,
    );
    let request_id = engine.registries().action_requests[0].id.clone();

    engine.queue_command(OperatorCommand::RespondAction {
        request_id,
        approved: true,
    });
    let snap = engine.tick();
    let drone = drone_view(&snap, "ASLT-1");
    assert!(matches!(
        drone.status,
        DroneStatus::ReturningToBase | DroneStatus::Landing
    ));
    assert!(drone.mission_target.is_none());
}

// ---- Threat lifecycle and generators ----

#[test]
fn test_acknowledge_threat() {
    let mut engine = SimulationEngine::new(quiet_config(interceptors(0)));
    world_setup::spawn_threat(
        engine.world_mut(),
        "thr-1",
        ThreatKind::BirdSwarm,
        Severity::Medium,
        "Large bird swarm crossing the corridor.",
        BASE.destination(0.0, 4_000.0).at_altitude(80.0),
        0,
    );
    engine.queue_command(OperatorCommand::AcknowledgeThreat {
        threat_id: "thr-1".into(),
    });
    let snap = engine.tick();
    assert_eq!(snap.threats[0].response_status, ResponseStatus::Acknowledged);
}

#[test]
fn test_jamming_threat_crushes_fleet_links() {
    let mut config = quiet_config(assaults(10));
    config.params.threat_rate = 1.0;
    config.params.jamming_share = 1.0;
    let mut engine = SimulationEngine::new(config);
    for i in 1..=10 {
        set_drone(&mut engine, &format!("ASLT-{i}"), |d| {
            d.status = DroneStatus::HoveringAtBase;
        });
    }

    let mut jammed = false;
    for _ in 0..20 {
        let snap = engine.tick();
        assert!(snap
            .threats
            .iter()
            .all(|t| t.kind != ThreatKind::JammingSignal || t.severity == Severity::Critical));
        if snap.threats.iter().any(|t| t.kind == ThreatKind::JammingSignal)
            && snap.drones.iter().any(|d| d.status == DroneStatus::AiOverride)
        {
            jammed = true;
            break;
        }
    }
    assert!(jammed, "jamming should force autonomous control somewhere");
}

#[test]
fn test_advisory_request_deduplicated() {
    let mut config = quiet_config(assaults(1));
    config.params.advisory_rate = 1.0;
    let mut engine = SimulationEngine::new(config);
    set_drone(&mut engine, "ASLT-1", |d| {
        d.status = DroneStatus::Mission;
        d.mission_target = Some(BASE.destination(0.0, 50_000.0).at_altitude(120.0));
    });

    let snap = engine.tick();
    let advisories: Vec<_> = snap
        .action_requests
        .iter()
        .filter(|r| r.action == ActionKind::AlterCourse)
        .collect();
    assert_eq!(advisories.len(), 1);
    assert_eq!(advisories[0].priority, Priority::Medium);

    let snap = engine.tick();
    assert_eq!(snap.action_requests.len(), 1, "one request per subject");
}

#[test]
fn test_hazard_suggestion_flow() {
    let target = BASE.destination(0.0, 20_000.0).at_altitude(120.0);
    let mut config = quiet_config(assaults(1));
    config.params.suggestion_rate = 1.0;
    config.params.hazard_zones = vec![HazardZone {
        center: target,
        radius_m: 3_000.0,
        kind: HazardKind::HighTurbulence,
    }];
    let mut engine = SimulationEngine::new(config);
    set_drone(&mut engine, "ASLT-1", |d| {
        d.status = DroneStatus::Mission;
        d.mission_target = Some(target);
    });

    let snap = engine.tick();
    assert_eq!(snap.suggestions.len(), 1);
    let suggestion = &snap.suggestions[0];
    assert_eq!(suggestion.drone_id, "ASLT-1");
    assert_eq!(suggestion.hazard, HazardKind::HighTurbulence);
    let suggested = suggestion.suggested_target;
    let suggestion_id = suggestion.id.clone();

    // Still exactly one while outstanding.
    let snap = engine.tick();
    assert_eq!(snap.suggestions.len(), 1);

    engine.queue_command(OperatorCommand::RespondSuggestion {
        suggestion_id,
        approved: true,
    });
    let snap = engine.tick();
    assert!(snap.suggestions.is_empty());
    let drone = drone_view(&snap, "ASLT-1");
    let new_target = drone.mission_target.unwrap();
    assert!((new_target.lat - suggested.lat).abs() < 1e-9);
    assert!((new_target.lon - suggested.lon).abs() < 1e-9);
}

#[test]
fn test_fpv_incursions_capped() {
    let mut config = quiet_config(interceptors(0));
    config.params.fpv_rate = 1.0;
    let mut engine = SimulationEngine::new(config);
    set_turret(&mut engine, "b1-turret-01", |t| t.status = TurretStatus::Disabled);

    let mut snap = engine.tick();
    for _ in 0..30 {
        snap = engine.tick();
    }
    let fpv_count = snap
        .ufos
        .iter()
        .filter(|u| u.kind == UfoKind::FpvDrone)
        .count();
    assert!(fpv_count <= 2, "incursion cap exceeded: {fpv_count}");
    assert!(fpv_count > 0, "spawner never fired");
}

#[test]
fn test_hostile_boundary_exit_despawns() {
    let mut engine = SimulationEngine::new(quiet_config(interceptors(0)));
    // Single-base config: the operating center is the base itself.
    let edge = GeoPos::new(BASE.lat + 1.9999, BASE.lon, 100.0);
    world_setup::spawn_ufo(engine.world_mut(), "ufo-out", UfoKind::FpvDrone, edge, 200.0, 0.0);
    world_setup::spawn_ufo(engine.world_mut(), "ufo-back", UfoKind::CommercialJet, edge, 200.0, 0.0);

    let mut snap = engine.tick();
    for _ in 0..3 {
        snap = engine.tick();
    }
    assert!(
        snap.ufos.iter().all(|u| u.id != "ufo-out"),
        "hostile contact leaving the area is dropped"
    );
    let jet = snap.ufos.iter().find(|u| u.id == "ufo-back").unwrap();
    assert!((jet.heading_deg - 180.0).abs() < 1e-9, "benign traffic reverses");
}

// ---- Repair workflow ----

#[test]
fn test_repair_state_machine_terminates() {
    let mut engine = SimulationEngine::new(quiet_config(assaults(1)));
    engine.registries_mut().push_anomaly(
        0,
        "ASLT-1",
        AnomalyKind::RotorMalfunction,
        Severity::High,
        BASE,
    );
    engine.queue_command(OperatorCommand::StartRepair {
        anomaly_id: "anom-1".into(),
    });

    let mut saw_repairing = false;
    let mut last = engine.tick();
    for _ in 0..60 {
        last = engine.tick();
        match last.anomalies[0].repair_status {
            RepairStatus::Repairing => saw_repairing = true,
            RepairStatus::Repaired | RepairStatus::Failed => break,
            _ => {}
        }
    }
    let anomaly = &last.anomalies[0];
    assert!(saw_repairing, "repair must pass through the repairing state");
    assert!(
        matches!(
            anomaly.repair_status,
            RepairStatus::Repaired | RepairStatus::Failed
        ),
        "repair must terminate, got {:?}",
        anomaly.repair_status
    );
    assert!(
        (1..=3).contains(&anomaly.repair_attempts),
        "attempt counter out of budget: {}",
        anomaly.repair_attempts
    );
    assert!(last.log.iter().any(|l| l.command == "Auto-Repair"));
}

#[test]
fn test_repair_unknown_anomaly_declined() {
    let mut engine = SimulationEngine::new(quiet_config(assaults(1)));
    engine.queue_command(OperatorCommand::StartRepair {
        anomaly_id: "anom-missing".into(),
    });
    let snap = engine.tick();
    assert!(snap
        .log
        .iter()
        .any(|l| l.command == "Auto-Repair" && l.status == LogStatus::Failed));
}

// ---- Command plumbing ----

#[test]
fn test_unknown_targets_are_logged_no_ops() {
    let mut engine = SimulationEngine::new(quiet_config(assaults(1)));
    engine.queue_command(OperatorCommand::Drone {
        scope: CommandScope::Single { id: "NOPE-1".into() },
        action: DroneAction::Launch,
    });
    engine.queue_command(OperatorCommand::RespondAction {
        request_id: "req-404".into(),
        approved: true,
    });
    engine.queue_command(OperatorCommand::Turret {
        system_id: "t-404".into(),
        order: TurretOrder::CeaseFire,
    });

    let snap = engine.tick();
    let failures = snap
        .log
        .iter()
        .filter(|l| l.status == LogStatus::Failed)
        .count();
    assert_eq!(failures, 3, "each unknown target declines loudly");

    // And the engine keeps ticking.
    let snap = engine.tick();
    assert_eq!(snap.time.tick, 2);
}

#[test]
fn test_mission_parameter_updates() {
    let mut engine = SimulationEngine::new(quiet_config(assaults(1)));
    engine.queue_command(OperatorCommand::Drone {
        scope: CommandScope::Single { id: "ASLT-1".into() },
        action: DroneAction::SetMissionParameters {
            speed_mps: Some(80.0),
            altitude_m: Some(250.0),
        },
    });
    let snap = engine.tick();
    let drone = drone_view(&snap, "ASLT-1");
    assert!((drone.cruising_speed_mps - 80.0).abs() < 1e-9);
    assert!((drone.cruising_alt_m - 250.0).abs() < 1e-9);
}

#[test]
fn test_group_scope_addresses_only_named_drones() {
    let mut engine = SimulationEngine::new(quiet_config(assaults(3)));
    engine.queue_command(OperatorCommand::Drone {
        scope: CommandScope::Group {
            ids: vec!["ASLT-1".into(), "ASLT-3".into()],
        },
        action: DroneAction::Launch,
    });
    let snap = engine.tick();
    assert_eq!(drone_view(&snap, "ASLT-1").status, DroneStatus::Launching);
    assert_eq!(drone_view(&snap, "ASLT-2").status, DroneStatus::Grounded);
    assert_eq!(drone_view(&snap, "ASLT-3").status, DroneStatus::Launching);
}

#[test]
fn test_plan_and_start_mission_flow() {
    let mut engine = SimulationEngine::new(quiet_config(assaults(1)));
    let target = BASE.destination(0.0, 4_000.0).at_altitude(150.0);
    engine.queue_command(OperatorCommand::Drone {
        scope: CommandScope::Single { id: "ASLT-1".into() },
        action: DroneAction::Launch,
    });

    let mut snap = engine.tick();
    for _ in 0..55 {
        snap = engine.tick();
    }
    assert_eq!(drone_view(&snap, "ASLT-1").status, DroneStatus::HoveringAtBase);

    engine.queue_command(OperatorCommand::Drone {
        scope: CommandScope::Single { id: "ASLT-1".into() },
        action: DroneAction::PlanMission { target },
    });
    engine.queue_command(OperatorCommand::Drone {
        scope: CommandScope::Single { id: "ASLT-1".into() },
        action: DroneAction::StartMission,
    });
    let snap = engine.tick();
    assert_eq!(drone_view(&snap, "ASLT-1").status, DroneStatus::Mission);

    engine.queue_command(OperatorCommand::Drone {
        scope: CommandScope::Single { id: "ASLT-1".into() },
        action: DroneAction::CancelMission,
    });
    let snap = engine.tick();
    let drone = drone_view(&snap, "ASLT-1");
    assert_eq!(drone.status, DroneStatus::HoveringAtBase);
    assert!(drone.mission_target.is_none());
}

#[test]
fn test_stale_requests_cleaned_up() {
    let mut engine = SimulationEngine::new(quiet_config(interceptors(0)));
    engine.registries_mut().push_request(
        0,
        "GHOST-1",
        ActionKind::DropPayload,
        "Optimal payload release coordinates achieved.".to_string(),
        None,
    );
    let snap = engine.tick();
    assert!(
        snap.action_requests.is_empty(),
        "request without a live subject is dropped"
    );
}

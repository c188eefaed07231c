//! Simulation engine — the core of SKYWATCH.
//!
//! `SimulationEngine` owns the hecs ECS world and the registries, processes
//! operator commands at tick boundaries, runs all systems in a fixed order,
//! and produces `WorldSnapshot`s. Completely headless, enabling
//! deterministic testing under a fixed seed.

use std::collections::VecDeque;

use hecs::World;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use skywatch_core::commands::{CommandScope, DroneAction, OperatorCommand, TurretOrder};
use skywatch_core::components::{Drone, Threat, Turret, Ufo};
use skywatch_core::constants::{DT, EVASION_SECS, TARGET_RESOLVE_RADIUS_M};
use skywatch_core::enums::*;
use skywatch_core::params::SimParams;
use skywatch_core::records::ActionRequest;
use skywatch_core::state::WorldSnapshot;
use skywatch_core::types::{GeoPos, SimTime};

use crate::registries::Registries;
use crate::systems;
use crate::world_setup;

/// Airframes commissioned per base at startup.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FleetComposition {
    pub assault: u32,
    pub recon: u32,
    pub interceptor: u32,
}

impl Default for FleetComposition {
    fn default() -> Self {
        Self {
            assault: 19,
            recon: 7,
            interceptor: 24,
        }
    }
}

/// Configuration for starting a new simulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// RNG seed for determinism. Same seed = same simulation.
    pub seed: u64,
    /// Initial wall-clock speed multiplier (1.0 = real time).
    pub time_scale: f64,
    /// Operating bases; one counter-UAS turret is installed at each.
    pub bases: Vec<GeoPos>,
    pub fleet_per_base: FleetComposition,
    /// Seed the initial high-altitude traffic picture. Scripted scenarios
    /// turn this off and inject contacts explicitly.
    pub seed_traffic: bool,
    pub params: SimParams,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            time_scale: 1.0,
            bases: vec![
                GeoPos::new(6.232241, 1.477163, 0.0),
                GeoPos::new(6.137378, 1.198244, 0.0),
            ],
            fleet_per_base: FleetComposition::default(),
            seed_traffic: true,
            params: SimParams::default(),
        }
    }
}

/// The simulation engine. Owns the ECS world and all registries.
pub struct SimulationEngine {
    world: World,
    time: SimTime,
    time_scale: f64,
    params: SimParams,
    bases: Vec<GeoPos>,
    center: GeoPos,
    rng: ChaCha8Rng,
    command_queue: VecDeque<OperatorCommand>,
    reg: Registries,
}

impl SimulationEngine {
    /// Create a new engine and commission the world from the config.
    pub fn new(config: SimConfig) -> Self {
        let mut world = World::new();
        let mut reg = Registries::new();
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);

        let bases = if config.bases.is_empty() {
            SimConfig::default().bases
        } else {
            config.bases
        };
        let center = GeoPos::new(
            bases.iter().map(|b| b.lat).sum::<f64>() / bases.len() as f64,
            bases.iter().map(|b| b.lon).sum::<f64>() / bases.len() as f64,
            0.0,
        );

        world_setup::spawn_fleet(&mut world, &mut rng, &bases, &config.fleet_per_base);
        world_setup::spawn_turrets(&mut world, &bases);
        if config.seed_traffic {
            world_setup::spawn_initial_ufos(&mut world, &mut reg, &mut rng, &center);
        }

        Self {
            world,
            time: SimTime::default(),
            time_scale: config.time_scale,
            params: config.params,
            bases,
            center,
            rng,
            command_queue: VecDeque::new(),
            reg,
        }
    }

    /// Queue an operator command for processing at the next tick boundary.
    pub fn queue_command(&mut self, command: OperatorCommand) {
        self.command_queue.push_back(command);
    }

    /// Queue multiple commands.
    pub fn queue_commands(&mut self, commands: impl IntoIterator<Item = OperatorCommand>) {
        self.command_queue.extend(commands);
    }

    /// Advance the simulation by one tick and return the resulting snapshot.
    pub fn tick(&mut self) -> WorldSnapshot {
        self.process_commands();
        self.run_systems();
        self.time.advance();

        let eliminations = std::mem::take(&mut self.reg.eliminations);
        let log = std::mem::take(&mut self.reg.log);
        systems::snapshot::build(&self.world, &self.time, &self.reg, eliminations, log)
    }

    /// Get the current simulation time.
    pub fn time(&self) -> SimTime {
        self.time
    }

    /// Get the current wall-clock speed multiplier.
    pub fn time_scale(&self) -> f64 {
        self.time_scale
    }

    /// Get a read-only reference to the ECS world.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Get the active tuning parameters.
    pub fn params(&self) -> &SimParams {
        &self.params
    }

    /// Mutable world access for scripted scenarios (tests).
    #[cfg(test)]
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Registry access for scripted scenarios (tests).
    #[cfg(test)]
    pub fn registries(&self) -> &Registries {
        &self.reg
    }

    #[cfg(test)]
    pub fn registries_mut(&mut self) -> &mut Registries {
        &mut self.reg
    }

    /// Process all queued commands.
    fn process_commands(&mut self) {
        while let Some(command) = self.command_queue.pop_front() {
            self.handle_command(command);
        }
    }

    /// Handle a single operator command. Unknown targets are logged no-ops;
    /// nothing here may fault the tick loop.
    fn handle_command(&mut self, command: OperatorCommand) {
        match command {
            OperatorCommand::Drone { scope, action } => match scope {
                CommandScope::Fleet => {
                    for id in self.drone_ids() {
                        self.apply_drone_action(&id, &action, false);
                    }
                }
                CommandScope::Group { ids } => {
                    for id in ids {
                        self.apply_drone_action(&id, &action, true);
                    }
                }
                CommandScope::Single { id } => {
                    self.apply_drone_action(&id, &action, true);
                }
            },
            OperatorCommand::RespondAction {
                request_id,
                approved,
            } => self.respond_action(&request_id, approved),
            OperatorCommand::OverrideAction { request_id, action } => {
                self.override_action(&request_id, action)
            }
            OperatorCommand::RespondDesignation {
                request_id,
                approved,
                drone_id,
            } => self.respond_designation(&request_id, approved, drone_id),
            OperatorCommand::RespondSuggestion {
                suggestion_id,
                approved,
            } => self.respond_suggestion(&suggestion_id, approved),
            OperatorCommand::AcknowledgeThreat { threat_id } => {
                let mut found = false;
                for (_e, threat) in self.world.query_mut::<&mut Threat>() {
                    if threat.id == threat_id {
                        threat.response_status = ResponseStatus::Acknowledged;
                        found = true;
                    }
                }
                if !found {
                    let tick = self.time.tick;
                    self.reg.log(
                        tick,
                        &threat_id,
                        "Acknowledge Threat",
                        LogStatus::Failed,
                        "Unknown threat id.".to_string(),
                    );
                }
            }
            OperatorCommand::Turret { system_id, order } => self.turret_order(&system_id, order),
            OperatorCommand::StartRepair { anomaly_id } => self.start_repair(&anomaly_id),
            OperatorCommand::SetGeofences { geofences } => {
                self.reg.geofences = geofences;
            }
            OperatorCommand::SetTimeScale { scale } => {
                self.time_scale = scale.clamp(0.0, 8.0);
            }
        }
    }

    /// Run all systems in order.
    fn run_systems(&mut self) {
        let tick = self.time.tick;
        // 1. Drone physics and state transitions
        systems::drone_physics::run(
            &mut self.world,
            &mut self.reg,
            &mut self.rng,
            &self.params,
            &self.bases,
            tick,
        );
        // 2. UFO motion and FPV incursions
        systems::ufo_motion::run(
            &mut self.world,
            &mut self.reg,
            &mut self.rng,
            &self.params,
            &self.center,
            tick,
        );
        // 3. Counter-UAS turret engine
        systems::turret::run(
            &mut self.world,
            &mut self.reg,
            &mut self.rng,
            &self.params,
            tick,
        );
        // 4. Stochastic generators
        systems::generators::run(
            &mut self.world,
            &mut self.reg,
            &mut self.rng,
            &self.params,
            &self.bases,
            tick,
        );
        // 5-8. Dispatchers. Designation (operator-in-the-loop) runs before
        // the autonomous threat-interceptor so human decisions come first.
        systems::dispatch::run_interceptor(&mut self.world, &mut self.reg, &self.params, tick);
        systems::dispatch::run_designation(&mut self.world, &mut self.reg, tick);
        systems::dispatch::run_threat_interceptor(&mut self.world, &mut self.reg, tick);
        systems::dispatch::run_recon(&mut self.world, &mut self.reg, &self.params, tick);
        // 9. Repair progression
        systems::repair::run(&mut self.reg, &mut self.rng, tick);
        // 10. Stale-record cleanup
        systems::cleanup::run(&mut self.world, &mut self.reg, tick);
    }

    fn drone_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .world
            .query::<&Drone>()
            .iter()
            .map(|(_, d)| d.id.clone())
            .collect();
        ids.sort();
        ids
    }

    /// Apply one flight order to one drone. Unknown ids are logged when the
    /// scope named them explicitly.
    fn apply_drone_action(&mut self, id: &str, action: &DroneAction, log_missing: bool) {
        let tick = self.time.tick;
        let mut found = false;
        for (_e, drone) in self.world.query_mut::<&mut Drone>() {
            if drone.id != id {
                continue;
            }
            found = true;
            match action {
                DroneAction::Launch => {
                    if drone.status == DroneStatus::Grounded {
                        drone.status = DroneStatus::Launching;
                    }
                }
                DroneAction::Land => {
                    if drone.status != DroneStatus::Grounded {
                        drone.status = DroneStatus::Landing;
                    }
                }
                DroneAction::ReturnToBase => {
                    if drone.status != DroneStatus::Grounded {
                        drone.status = DroneStatus::ReturningToBase;
                        drone.mission_target = None;
                        drone.mission_target_id = None;
                        drone.hovering_since_tick = None;
                    }
                }
                DroneAction::PlanMission { target } | DroneAction::AcquireTarget { target } => {
                    drone.mission_target = Some(*target);
                }
                DroneAction::StartMission => {
                    if drone.mission_target.is_some()
                        && drone.status == DroneStatus::HoveringAtBase
                    {
                        drone.status = DroneStatus::Mission;
                    }
                }
                DroneAction::CancelMission => {
                    if drone.mission_target.is_some() {
                        drone.mission_target = None;
                        drone.mission_target_id = None;
                        drone.hovering_since_tick = None;
                        if drone.status != DroneStatus::Grounded {
                            drone.status = DroneStatus::HoveringAtBase;
                        }
                    }
                }
                DroneAction::SetMissionParameters {
                    speed_mps,
                    altitude_m,
                } => {
                    if let Some(speed) = speed_mps {
                        drone.cruising_speed_mps = *speed;
                    }
                    if let Some(alt) = altitude_m {
                        drone.cruising_alt_m = *alt;
                    }
                }
            }
            break;
        }
        if !found && log_missing {
            self.reg.log(
                tick,
                id,
                "Drone Command",
                LogStatus::Failed,
                "Unknown drone id.".to_string(),
            );
        }
    }

    /// Resolve an approve/deny response to a pending action request.
    fn respond_action(&mut self, request_id: &str, approved: bool) {
        let tick = self.time.tick;
        let Some(request) = self.reg.take_request(request_id) else {
            self.reg.log(
                tick,
                request_id,
                "Action Response",
                LogStatus::Failed,
                "Unknown request id.".to_string(),
            );
            return;
        };

        if approved {
            if request.action == ActionKind::EngageGroundDefense {
                self.approve_turret_engagement(&request.subject_id);
            } else {
                self.approve_drone_action(&request);
            }
        } else if request.action == ActionKind::EngageGroundDefense {
            // Denial reverts the mount to a safe state.
            for (_e, turret) in self.world.query_mut::<&mut Turret>() {
                if turret.id == request.subject_id {
                    turret.reset_to_scanning();
                }
            }
        }
    }

    fn approve_turret_engagement(&mut self, turret_id: &str) {
        let tick = self.time.tick;
        for (_e, turret) in self.world.query_mut::<&mut Turret>() {
            if turret.id != turret_id {
                continue;
            }
            if turret.status == TurretStatus::Targeting {
                turret.status = TurretStatus::Engaging;
                let target = turret.current_target_id.clone().unwrap_or_default();
                self.reg.log(
                    tick,
                    turret_id,
                    "Engagement Authorized",
                    LogStatus::Success,
                    format!("Operator authorized engagement of {target}."),
                );
            }
            break;
        }
    }

    /// Approved drone action, per the fixed action-to-effect table.
    fn approve_drone_action(&mut self, request: &ActionRequest) {
        let threat_loc = request
            .threat_id
            .as_deref()
            .and_then(|tid| find_threat_pos(&self.world, tid));
        let strike_targets = if matches!(
            request.action,
            ActionKind::FlyIntoTarget | ActionKind::FlyIntoEnemyVehicle
        ) {
            live_target_positions(&self.world)
        } else {
            Vec::new()
        };

        for (_e, drone) in self.world.query_mut::<&mut Drone>() {
            if drone.id != request.subject_id {
                continue;
            }
            // Any approved action stops the hover-timeout clock.
            drone.hovering_since_tick = None;

            match request.action {
                ActionKind::AbortMission => {
                    drone.status = DroneStatus::ReturningToBase;
                    drone.mission_target = None;
                    drone.mission_target_id = None;
                }
                ActionKind::FlyIntoThreat => {
                    if drone.drone_type == DroneType::Interceptor
                        && drone.intercept_ref().is_some()
                    {
                        drone.elimination_approved = true;
                    } else if drone.drone_type == DroneType::Interceptor
                        && drone.mission_target.is_some()
                    {
                        drone.status = DroneStatus::AiOverride;
                        drone.elimination_approved = true;
                    } else if let (Some(tid), Some(loc)) =
                        (request.threat_id.clone(), threat_loc)
                    {
                        drone.mission_target = Some(loc);
                        drone.mission_target_id = Some(tid);
                        drone.status = DroneStatus::AiOverride;
                        drone.elimination_approved = true;
                    }
                }
                ActionKind::FlyIntoTarget | ActionKind::FlyIntoEnemyVehicle => {
                    drone.elimination_approved = true;
                    drone.status = DroneStatus::AiOverride;
                    if drone.mission_target_id.is_none() {
                        if let Some(at) = drone.mission_target {
                            drone.mission_target_id = resolve_target_near(&strike_targets, &at);
                        }
                    }
                }
                // Informational actions need no engine-side state change.
                _ => {}
            }
            break;
        }
    }

    /// Substitute a different action for a pending request.
    fn override_action(&mut self, request_id: &str, action: ActionKind) {
        let tick = self.time.tick;
        if !action.operator_selectable() {
            self.reg.log(
                tick,
                request_id,
                "Override",
                LogStatus::Failed,
                format!("{action:?} is not operator-selectable."),
            );
            return;
        }
        let Some(request) = self.reg.take_request(request_id) else {
            self.reg.log(
                tick,
                request_id,
                "Override",
                LogStatus::Failed,
                "Unknown request id.".to_string(),
            );
            return;
        };

        // An override on a turret request is treated as a denial.
        let mut was_turret = false;
        for (_e, turret) in self.world.query_mut::<&mut Turret>() {
            if turret.id == request.subject_id {
                turret.reset_to_scanning();
                was_turret = true;
            }
        }
        if was_turret {
            self.reg.log(
                tick,
                &request.subject_id,
                "Override",
                LogStatus::Success,
                "Mount reset to scanning.".to_string(),
            );
            return;
        }

        let strike_targets = if matches!(
            action,
            ActionKind::FlyIntoThreat
                | ActionKind::FlyIntoTarget
                | ActionKind::FlyIntoEnemyVehicle
        ) {
            live_target_positions(&self.world)
        } else {
            Vec::new()
        };
        let evade_until = tick + (EVASION_SECS / DT) as u64;

        for (_e, drone) in self.world.query_mut::<&mut Drone>() {
            if drone.id != request.subject_id {
                continue;
            }
            drone.hovering_since_tick = None;

            match action {
                ActionKind::AbortMission | ActionKind::ReturnToBase => {
                    if drone.status != DroneStatus::Grounded {
                        drone.status = DroneStatus::ReturningToBase;
                        drone.mission_target = None;
                        drone.mission_target_id = None;
                    }
                }
                ActionKind::EngageCountermeasures | ActionKind::AlterCourse => {
                    drone.status = DroneStatus::Evading;
                    drone.evade_until_tick = Some(evade_until);
                }
                ActionKind::FlyIntoThreat
                | ActionKind::FlyIntoTarget
                | ActionKind::FlyIntoEnemyVehicle => {
                    if let Some(at) = drone.mission_target {
                        drone.elimination_approved = true;
                        drone.status = DroneStatus::AiOverride;
                        if drone.mission_target_id.is_none() {
                            drone.mission_target_id = resolve_target_near(&strike_targets, &at);
                        }
                    } else {
                        drone.status = DroneStatus::ReturningToBase;
                        self.reg.log(
                            tick,
                            &drone.id,
                            "Override Failed",
                            LogStatus::Failed,
                            format!("Cannot execute {action:?} without a mission target."),
                        );
                    }
                }
                ActionKind::HoverOverTarget
                | ActionKind::DropPayload
                | ActionKind::DeploySensor
                | ActionKind::ScanArea
                | ActionKind::CalibrateOnImage => {
                    if drone.mission_target.is_some() {
                        drone.status = DroneStatus::HoveringOnTarget;
                        drone.hovering_since_tick = Some(tick);
                        self.reg.log(
                            tick,
                            &drone.id,
                            "Override Executed",
                            LogStatus::Success,
                            format!("Performing {action:?} at the mission target."),
                        );
                    } else {
                        drone.status = DroneStatus::ReturningToBase;
                        self.reg.log(
                            tick,
                            &drone.id,
                            "Override Failed",
                            LogStatus::Failed,
                            format!("Cannot execute {action:?} without a mission target."),
                        );
                    }
                }
                // Filtered by the operator-selectable check above.
                ActionKind::CounterCommand | ActionKind::EngageGroundDefense => unreachable!(),
            }
            break;
        }
    }

    /// Resolve a target-designation response.
    fn respond_designation(&mut self, request_id: &str, approved: bool, drone_id: Option<String>) {
        let tick = self.time.tick;
        let Some(designation) = self.reg.take_designation(request_id) else {
            self.reg.log(
                tick,
                request_id,
                "Designation Response",
                LogStatus::Failed,
                "Unknown designation id.".to_string(),
            );
            return;
        };

        let mut assigned = false;
        if approved {
            if let Some(did) = drone_id {
                for (_e, drone) in self.world.query_mut::<&mut Drone>() {
                    if drone.id != did {
                        continue;
                    }
                    drone.mission_target = Some(designation.target_location);
                    drone.mission_target_id = Some(designation.source_id.clone());
                    drone.status = if drone.status == DroneStatus::Grounded {
                        DroneStatus::Launching
                    } else {
                        DroneStatus::Mission
                    };
                    assigned = true;
                    break;
                }
            }
        }

        // Approved: source is being handled. Denied (or no such drone): the
        // source goes back to pending so it can be re-proposed.
        let new_status = if assigned {
            ResponseStatus::Acknowledged
        } else {
            ResponseStatus::Pending
        };
        for (_e, threat) in self.world.query_mut::<&mut Threat>() {
            if threat.id == designation.source_id {
                threat.response_status = new_status;
            }
        }
    }

    fn respond_suggestion(&mut self, suggestion_id: &str, approved: bool) {
        let tick = self.time.tick;
        let Some(suggestion) = self.reg.take_suggestion(suggestion_id) else {
            self.reg.log(
                tick,
                suggestion_id,
                "Suggestion Response",
                LogStatus::Failed,
                "Unknown suggestion id.".to_string(),
            );
            return;
        };
        if !approved {
            return;
        }
        for (_e, drone) in self.world.query_mut::<&mut Drone>() {
            if drone.id == suggestion.drone_id && drone.mission_target.is_some() {
                drone.mission_target = Some(suggestion.suggested_target);
                break;
            }
        }
    }

    fn turret_order(&mut self, system_id: &str, order: TurretOrder) {
        let tick = self.time.tick;
        let mut found = false;
        for (_e, turret) in self.world.query_mut::<&mut Turret>() {
            if turret.id != system_id {
                continue;
            }
            found = true;
            match order {
                TurretOrder::CeaseFire => {
                    if matches!(
                        turret.status,
                        TurretStatus::Targeting | TurretStatus::Engaging
                    ) {
                        turret.reset_to_scanning();
                        self.reg.log(
                            tick,
                            system_id,
                            "Cease Fire",
                            LogStatus::Success,
                            "Operator ordered cease fire; resuming scan.".to_string(),
                        );
                    }
                }
            }
            break;
        }
        if !found {
            self.reg.log(
                tick,
                system_id,
                "Turret Command",
                LogStatus::Failed,
                "Unknown system id.".to_string(),
            );
        }
    }

    fn start_repair(&mut self, anomaly_id: &str) {
        let tick = self.time.tick;
        let idx = self
            .reg
            .anomalies
            .iter()
            .position(|a| a.id == anomaly_id && a.repair_status == RepairStatus::Pending);
        match idx {
            Some(idx) => {
                let duration = systems::repair::first_attempt_ticks(&mut self.rng);
                let anomaly = &mut self.reg.anomalies[idx];
                anomaly.repair_attempts = 1;
                anomaly.repair_status = RepairStatus::Repairing;
                anomaly.busy_until_tick = Some(tick + duration);
                let drone_id = anomaly.drone_id.clone();
                self.reg.log(
                    tick,
                    &drone_id,
                    "Auto-Repair",
                    LogStatus::Success,
                    "Repair initiated.".to_string(),
                );
            }
            None => {
                self.reg.log(
                    tick,
                    anomaly_id,
                    "Auto-Repair",
                    LogStatus::Failed,
                    "Anomaly not found or not pending repair.".to_string(),
                );
            }
        }
    }
}

/// Location of a threat by id, if it exists.
fn find_threat_pos(world: &World, threat_id: &str) -> Option<GeoPos> {
    world
        .query::<(&Threat, &GeoPos)>()
        .iter()
        .find(|(_, (t, _))| t.id == threat_id)
        .map(|(_, (_, pos))| *pos)
}

/// All live strikeable targets (threats and UFOs) with positions.
fn live_target_positions(world: &World) -> Vec<(String, GeoPos)> {
    let mut out: Vec<(String, GeoPos)> = world
        .query::<(&Threat, &GeoPos)>()
        .iter()
        .map(|(_, (t, pos))| (t.id.clone(), *pos))
        .collect();
    out.extend(
        world
            .query::<(&Ufo, &GeoPos)>()
            .iter()
            .map(|(_, (u, pos))| (u.id.clone(), *pos)),
    );
    out
}

/// The closest live target within the resolve radius of a point.
fn resolve_target_near(targets: &[(String, GeoPos)], at: &GeoPos) -> Option<String> {
    targets
        .iter()
        .map(|(id, pos)| (id, pos.distance_3d_m(at)))
        .filter(|(_, d)| *d < TARGET_RESOLVE_RADIUS_M)
        .min_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(id, _)| id.clone())
}

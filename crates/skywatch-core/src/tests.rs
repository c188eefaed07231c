#[cfg(test)]
mod tests {
    use crate::commands::{CommandScope, DroneAction, OperatorCommand, TurretOrder};
    use crate::enums::*;
    use crate::params::SimParams;
    use crate::state::WorldSnapshot;
    use crate::types::{point_in_polygon, GeoPos, GeoVertex, SimTime};

    // ---- Geometry ----

    #[test]
    fn test_distance_zero_and_symmetry() {
        let a = GeoPos::new(6.2, 1.4, 0.0);
        let b = GeoPos::new(6.25, 1.46, 0.0);
        assert!(a.distance_m(&a) < 1e-9);
        assert!((a.distance_m(&b) - b.distance_m(&a)).abs() < 1e-6);
    }

    #[test]
    fn test_distance_one_degree_latitude() {
        // One degree of latitude is ~111 km everywhere.
        let a = GeoPos::new(6.0, 1.0, 0.0);
        let b = GeoPos::new(7.0, 1.0, 0.0);
        let d = a.distance_m(&b);
        assert!(
            (d - 111_139.0).abs() < 200.0,
            "1 deg latitude should be ~111.1km, got {d}"
        );
    }

    #[test]
    fn test_distance_3d_includes_altitude() {
        let a = GeoPos::new(6.0, 1.0, 0.0);
        let b = a.at_altitude(300.0);
        assert!((a.distance_3d_m(&b) - 300.0).abs() < 1e-9);
        assert!(a.distance_m(&b) < 1e-9);
    }

    #[test]
    fn test_bearing_cardinal_directions() {
        let origin = GeoPos::new(6.0, 1.0, 0.0);
        let north = GeoPos::new(6.1, 1.0, 0.0);
        let east = GeoPos::new(6.0, 1.1, 0.0);
        let south = GeoPos::new(5.9, 1.0, 0.0);
        let west = GeoPos::new(6.0, 0.9, 0.0);

        assert!(origin.bearing_to_deg(&north).abs() < 0.1);
        assert!((origin.bearing_to_deg(&east) - 90.0).abs() < 0.1);
        assert!((origin.bearing_to_deg(&south) - 180.0).abs() < 0.1);
        assert!((origin.bearing_to_deg(&west) - 270.0).abs() < 0.1);
    }

    #[test]
    fn test_destination_round_trip() {
        let start = GeoPos::new(6.2, 1.4, 120.0);
        let dest = start.destination(47.0, 5_000.0);
        let d = start.distance_m(&dest);
        assert!(
            (d - 5_000.0).abs() < 10.0,
            "Destination 5km out should measure ~5km back, got {d}"
        );
        // Altitude carries over.
        assert!((dest.alt_m - 120.0).abs() < 1e-12);
        // And walking toward the start returns home.
        let back = dest.destination(dest.bearing_to_deg(&start), d);
        assert!(back.distance_m(&start) < 5.0);
    }

    #[test]
    fn test_point_in_polygon_square() {
        let square = vec![
            GeoVertex { lat: 0.0, lon: 0.0 },
            GeoVertex { lat: 0.0, lon: 1.0 },
            GeoVertex { lat: 1.0, lon: 1.0 },
            GeoVertex { lat: 1.0, lon: 0.0 },
        ];
        assert!(point_in_polygon(&GeoPos::new(0.5, 0.5, 0.0), &square));
        assert!(!point_in_polygon(&GeoPos::new(1.5, 0.5, 0.0), &square));
        assert!(!point_in_polygon(&GeoPos::new(-0.1, 0.5, 0.0), &square));
    }

    #[test]
    fn test_point_in_polygon_degenerate() {
        let line = vec![
            GeoVertex { lat: 0.0, lon: 0.0 },
            GeoVertex { lat: 1.0, lon: 1.0 },
        ];
        assert!(!point_in_polygon(&GeoPos::new(0.5, 0.5, 0.0), &line));
        assert!(!point_in_polygon(&GeoPos::new(0.5, 0.5, 0.0), &[]));
    }

    // ---- Enums ----

    #[test]
    fn test_drone_status_wire_names() {
        let json = serde_json::to_string(&DroneStatus::ReturningToBase).unwrap();
        assert_eq!(json, "\"returning_to_base\"");
        let json = serde_json::to_string(&DroneStatus::AiOverride).unwrap();
        assert_eq!(json, "\"ai_override\"");
        let back: DroneStatus = serde_json::from_str("\"hovering_on_target\"").unwrap();
        assert_eq!(back, DroneStatus::HoveringOnTarget);
    }

    #[test]
    fn test_ufo_hostility() {
        assert!(UfoKind::FpvDrone.is_hostile());
        assert!(UfoKind::UnknownUav.is_hostile());
        assert!(!UfoKind::CommercialJet.is_hostile());
        assert!(!UfoKind::PrivatePlane.is_hostile());
        assert!(!UfoKind::Helicopter.is_hostile());
    }

    #[test]
    fn test_action_priority_table() {
        assert_eq!(ActionKind::FlyIntoThreat.priority(), Priority::Critical);
        assert_eq!(
            ActionKind::EngageGroundDefense.priority(),
            Priority::Critical
        );
        assert_eq!(ActionKind::DropPayload.priority(), Priority::High);
        assert_eq!(ActionKind::AlterCourse.priority(), Priority::Medium);
        assert_eq!(ActionKind::CalibrateOnImage.priority(), Priority::Low);
        // Priority ordering: Critical outranks all.
        assert!(Priority::Critical > Priority::High);
        assert!(Priority::High > Priority::Medium);
        assert!(Priority::Medium > Priority::Low);
    }

    #[test]
    fn test_operator_selectable_excludes_internal_actions() {
        assert!(!ActionKind::CounterCommand.operator_selectable());
        assert!(!ActionKind::EngageGroundDefense.operator_selectable());
        assert!(ActionKind::AbortMission.operator_selectable());
        assert!(ActionKind::FlyIntoThreat.operator_selectable());
    }

    #[test]
    fn test_idle_statuses() {
        assert!(DroneStatus::Grounded.is_idle());
        assert!(DroneStatus::HoveringAtBase.is_idle());
        assert!(!DroneStatus::Mission.is_idle());
        assert!(!DroneStatus::Intercepting.is_idle());
    }

    // ---- Commands ----

    #[test]
    fn test_operator_command_serde() {
        let commands = vec![
            OperatorCommand::Drone {
                scope: CommandScope::Single {
                    id: "INTER-1".into(),
                },
                action: DroneAction::Launch,
            },
            OperatorCommand::Drone {
                scope: CommandScope::Fleet,
                action: DroneAction::PlanMission {
                    target: GeoPos::new(6.2, 1.4, 150.0),
                },
            },
            OperatorCommand::RespondAction {
                request_id: "req-3".into(),
                approved: true,
            },
            OperatorCommand::OverrideAction {
                request_id: "req-4".into(),
                action: ActionKind::ReturnToBase,
            },
            OperatorCommand::Turret {
                system_id: "turret-0-01".into(),
                order: TurretOrder::CeaseFire,
            },
            OperatorCommand::SetTimeScale { scale: 2.0 },
        ];
        for cmd in &commands {
            let json = serde_json::to_string(cmd).unwrap();
            let back: OperatorCommand = serde_json::from_str(&json).unwrap();
            // Compare JSON representations since OperatorCommand doesn't derive PartialEq
            assert_eq!(json, serde_json::to_string(&back).unwrap());
        }
    }

    // ---- Snapshot & params ----

    #[test]
    fn test_snapshot_serde() {
        let snapshot = WorldSnapshot::default();
        let json = serde_json::to_string(&snapshot).unwrap();
        let back: WorldSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(snapshot.time.tick, back.time.tick);
        assert!(
            json.len() < 1024,
            "Empty snapshot should be <1KB, was {} bytes",
            json.len()
        );
    }

    #[test]
    fn test_params_defaults_and_quiet() {
        let p = SimParams::default();
        assert!((p.turret_hit_base - 0.9).abs() < 1e-12);
        assert!((p.observation_range_m - 200.0).abs() < 1e-12);

        let q = SimParams::quiet();
        assert_eq!(q.threat_rate, 0.0);
        assert_eq!(q.fpv_rate, 0.0);
        assert_eq!(q.anomaly_rate, 0.0);
        // Quiet mode keeps the engagement tuning.
        assert!((q.turret_hit_base - 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_sim_time_advance() {
        let mut time = SimTime::default();
        for _ in 0..30 {
            time.advance();
        }
        assert_eq!(time.tick, 30);
        assert!((time.elapsed_secs - 30.0 * crate::constants::DT).abs() < 1e-10);
    }
}

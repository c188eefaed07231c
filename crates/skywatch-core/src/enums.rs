//! Enumeration types used throughout the simulation.

use serde::{Deserialize, Serialize};

/// Drone flight/activity status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DroneStatus {
    #[default]
    Grounded,
    Launching,
    Mission,
    ReturningToBase,
    Landing,
    HoveringOnTarget,
    HoveringAtBase,
    Evading,
    /// Autonomous continuation after signal loss or an approved strike.
    AiOverride,
    Intercepting,
}

impl DroneStatus {
    /// Idle states from which a dispatcher may claim the drone.
    pub fn is_idle(&self) -> bool {
        matches!(self, DroneStatus::Grounded | DroneStatus::HoveringAtBase)
    }
}

/// Airframe role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DroneType {
    Assault,
    Recon,
    Interceptor,
}

/// Threat intelligence category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreatKind {
    UnidentifiedDrone,
    HostileAircraft,
    BirdSwarm,
    JammingSignal,
}

/// Threat severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Medium,
    High,
    Critical,
}

/// Operator/AI handling state of a threat.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStatus {
    #[default]
    Pending,
    Acknowledged,
    /// A target designation has been proposed; suppresses duplicates.
    AiTargeting,
}

/// Unidentified-object category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UfoKind {
    CommercialJet,
    PrivatePlane,
    Helicopter,
    UnknownUav,
    FpvDrone,
}

impl UfoKind {
    /// Subtypes eligible for autonomous interception.
    pub fn is_hostile(&self) -> bool {
        matches!(self, UfoKind::FpvDrone | UfoKind::UnknownUav)
    }
}

/// Counter-UAS turret status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurretStatus {
    Standby,
    #[default]
    Scanning,
    /// Target acquired, awaiting engagement authority.
    Targeting,
    Engaging,
    Reloading,
    Disabled,
}

/// Counter-UAS engagement authority mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurretMode {
    /// Every engagement requires operator approval.
    #[default]
    HumanInLoop,
    /// Engages hostiles without asking.
    Autonomous,
    /// Never self-targets; operator steers it entirely.
    Manual,
}

/// Every action a drone or turret can request or be ordered to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    DropPayload,
    EngageCountermeasures,
    AbortMission,
    FlyIntoTarget,
    FlyIntoEnemyVehicle,
    CalibrateOnImage,
    AlterCourse,
    HoverOverTarget,
    DeploySensor,
    ScanArea,
    ReturnToBase,
    FlyIntoThreat,
    EngageGroundDefense,
    CounterCommand,
}

impl ActionKind {
    /// Fixed action-to-priority table.
    pub fn priority(&self) -> Priority {
        match self {
            ActionKind::FlyIntoThreat
            | ActionKind::FlyIntoTarget
            | ActionKind::FlyIntoEnemyVehicle
            | ActionKind::AbortMission
            | ActionKind::EngageGroundDefense => Priority::Critical,
            ActionKind::DropPayload
            | ActionKind::EngageCountermeasures
            | ActionKind::DeploySensor => Priority::High,
            ActionKind::ReturnToBase
            | ActionKind::AlterCourse
            | ActionKind::HoverOverTarget
            | ActionKind::ScanArea
            | ActionKind::CounterCommand => Priority::Medium,
            ActionKind::CalibrateOnImage => Priority::Low,
        }
    }

    /// Whether the operator may substitute this action in an override.
    /// Engine-internal actions are excluded from manual selection.
    pub fn operator_selectable(&self) -> bool {
        !matches!(
            self,
            ActionKind::CounterCommand | ActionKind::EngageGroundDefense
        )
    }
}

/// Request priority, highest first in ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

/// Known flight-hazard categories for reroute suggestions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HazardKind {
    SignalLossZone,
    HighTurbulence,
}

/// Detected airframe fault categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    RotorMalfunction,
    CompassDrift,
    CameraFault,
}

/// Anomaly auto-repair lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepairStatus {
    #[default]
    Pending,
    Repairing,
    Repaired,
    Failed,
}

/// Outcome recorded on a log event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogStatus {
    Success,
    Failed,
}

/// Origin of a target designation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DesignationSource {
    Threat,
    Anomaly,
}

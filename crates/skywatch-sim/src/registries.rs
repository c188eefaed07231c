//! Non-ECS registries owned by the engine.
//!
//! Requests, proposals, fault reports, the elimination ledgers, the geofence
//! set, and the per-tick log buffer live here, outside the world. Records
//! reference entities by id and are existence-checked by the cleanup system
//! every tick.

use skywatch_core::constants::{DT, RECENT_ELIMINATION_SECS};
use skywatch_core::enums::*;
use skywatch_core::events::{AlertKind, LogEvent};
use skywatch_core::records::*;
use skywatch_core::types::GeoPos;

/// Registry state mutated by the systems and the command handler.
#[derive(Debug, Default)]
pub struct Registries {
    pub action_requests: Vec<ActionRequest>,
    pub designations: Vec<TargetDesignation>,
    pub suggestions: Vec<FlightSuggestion>,
    pub anomalies: Vec<Anomaly>,
    pub geofences: Vec<Geofence>,
    /// Eliminations since the last snapshot; drained each tick.
    pub eliminations: Vec<EliminationEvent>,
    /// Short-lived who-killed-what ledger; pruned each tick.
    pub ledger: Vec<EliminationRecord>,
    /// Log entries since the last snapshot; drained each tick.
    pub log: Vec<LogEvent>,

    next_request: u64,
    next_designation: u64,
    next_suggestion: u64,
    next_anomaly: u64,
    next_threat: u64,
    next_ufo: u64,
}

impl Registries {
    pub fn new() -> Self {
        Self::default()
    }

    // --- Id allocation ---

    pub fn next_threat_id(&mut self) -> String {
        self.next_threat += 1;
        format!("thr-{}", self.next_threat)
    }

    pub fn next_ufo_id(&mut self) -> String {
        self.next_ufo += 1;
        format!("ufo-{}", self.next_ufo)
    }

    // --- Action requests ---

    /// Whether the subject already has an outstanding request. At most one
    /// request per subject id may exist at any time.
    pub fn has_request_for(&self, subject_id: &str) -> bool {
        self.action_requests
            .iter()
            .any(|r| r.subject_id == subject_id)
    }

    /// Raise a request for the subject. The priority comes from the fixed
    /// action table.
    pub fn push_request(
        &mut self,
        tick: u64,
        subject_id: &str,
        action: ActionKind,
        reason: String,
        threat_id: Option<String>,
    ) {
        self.next_request += 1;
        self.action_requests.push(ActionRequest {
            id: format!("req-{}", self.next_request),
            subject_id: subject_id.to_string(),
            action,
            reason,
            priority: action.priority(),
            created_tick: tick,
            threat_id,
        });
    }

    /// Remove and return a request by id.
    pub fn take_request(&mut self, request_id: &str) -> Option<ActionRequest> {
        let idx = self.action_requests.iter().position(|r| r.id == request_id)?;
        Some(self.action_requests.remove(idx))
    }

    /// Remove and return the subject's outstanding request, if any.
    pub fn take_request_for(&mut self, subject_id: &str) -> Option<ActionRequest> {
        let idx = self
            .action_requests
            .iter()
            .position(|r| r.subject_id == subject_id)?;
        Some(self.action_requests.remove(idx))
    }

    // --- Designations & suggestions ---

    pub fn push_designation(
        &mut self,
        tick: u64,
        source: DesignationSource,
        source_id: &str,
        target_location: GeoPos,
        suggested_drone_id: &str,
        reason: String,
    ) {
        self.next_designation += 1;
        self.designations.push(TargetDesignation {
            id: format!("des-{}", self.next_designation),
            source,
            source_id: source_id.to_string(),
            target_location,
            suggested_drone_id: suggested_drone_id.to_string(),
            reason,
            created_tick: tick,
        });
    }

    pub fn take_designation(&mut self, id: &str) -> Option<TargetDesignation> {
        let idx = self.designations.iter().position(|d| d.id == id)?;
        Some(self.designations.remove(idx))
    }

    pub fn has_suggestion_for(&self, drone_id: &str) -> bool {
        self.suggestions.iter().any(|s| s.drone_id == drone_id)
    }

    pub fn push_suggestion(
        &mut self,
        tick: u64,
        drone_id: &str,
        hazard: HazardKind,
        reason: String,
        suggested_target: GeoPos,
    ) {
        self.next_suggestion += 1;
        self.suggestions.push(FlightSuggestion {
            id: format!("sug-{}", self.next_suggestion),
            drone_id: drone_id.to_string(),
            hazard,
            reason,
            suggested_target,
            created_tick: tick,
        });
    }

    pub fn take_suggestion(&mut self, id: &str) -> Option<FlightSuggestion> {
        let idx = self.suggestions.iter().position(|s| s.id == id)?;
        Some(self.suggestions.remove(idx))
    }

    // --- Anomalies ---

    /// Whether the drone has an anomaly that is not yet repaired or written
    /// off. One open fault per airframe at a time.
    pub fn has_open_anomaly(&self, drone_id: &str) -> bool {
        self.anomalies.iter().any(|a| {
            a.drone_id == drone_id
                && !matches!(a.repair_status, RepairStatus::Repaired | RepairStatus::Failed)
        })
    }

    pub fn push_anomaly(
        &mut self,
        tick: u64,
        drone_id: &str,
        kind: AnomalyKind,
        severity: Severity,
        location: GeoPos,
    ) {
        self.next_anomaly += 1;
        self.anomalies.push(Anomaly {
            id: format!("anom-{}", self.next_anomaly),
            drone_id: drone_id.to_string(),
            kind,
            severity,
            location,
            repair_status: RepairStatus::Pending,
            repair_attempts: 0,
            busy_until_tick: None,
            created_tick: tick,
        });
    }

    // --- Eliminations ---

    /// Record a terminal removal: one event for the presentation queue plus
    /// a ledger entry for log disambiguation.
    pub fn record_elimination(
        &mut self,
        tick: u64,
        target_id: &str,
        source_id: &str,
        location: GeoPos,
    ) {
        self.eliminations.push(EliminationEvent {
            target_id: target_id.to_string(),
            location,
            tick,
        });
        self.ledger.push(EliminationRecord {
            target_id: target_id.to_string(),
            source_id: source_id.to_string(),
            tick,
        });
    }

    /// Who recently removed this target, if anyone. Distinguishes
    /// "neutralized by another asset" from "target lost/evaded".
    pub fn recent_eliminator(&self, target_id: &str, tick: u64) -> Option<&str> {
        let window = (RECENT_ELIMINATION_SECS / DT) as u64;
        self.ledger
            .iter()
            .rev()
            .find(|r| r.target_id == target_id && tick.saturating_sub(r.tick) <= window)
            .map(|r| r.source_id.as_str())
    }

    // --- Log ---

    pub fn log(&mut self, tick: u64, target: &str, command: &str, status: LogStatus, details: String) {
        self.log.push(LogEvent {
            tick,
            target: target.to_string(),
            command: command.to_string(),
            status,
            details,
            alert: None,
        });
    }

    pub fn log_alert(
        &mut self,
        tick: u64,
        target: &str,
        command: &str,
        status: LogStatus,
        details: String,
        alert: AlertKind,
    ) {
        self.log.push(LogEvent {
            tick,
            target: target.to_string(),
            command: command.to_string(),
            status,
            details,
            alert: Some(alert),
        });
    }
}

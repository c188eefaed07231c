//! Events emitted by the simulation for the audit trail and alerting.

use serde::{Deserialize, Serialize};

use crate::enums::LogStatus;

/// Alert categories a presentation layer may surface prominently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    NewTargetDesignation,
    InterceptionSuccess,
    CounterUasKill,
    AiOverrideEngaged,
}

/// One structured entry in the engine's command/audit log. Delivered to the
/// registered callback fire-and-forget; the engine assumes nothing about
/// what consumers do with it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEvent {
    pub tick: u64,
    /// The entity or subsystem the entry concerns.
    pub target: String,
    /// Short imperative label of what happened.
    pub command: String,
    pub status: LogStatus,
    pub details: String,
    pub alert: Option<AlertKind>,
}

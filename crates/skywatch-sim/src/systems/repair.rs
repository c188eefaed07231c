//! Anomaly auto-repair progression.
//!
//! Each anomaly carries its own state machine: attempt counter plus a
//! next-eligible tick, advanced here by the scheduler. An attempt resolves
//! when its deadline passes; failures rescan and retry until the attempt
//! budget is spent.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use skywatch_core::constants::*;
use skywatch_core::enums::{LogStatus, RepairStatus};

use crate::registries::Registries;

/// Advance every in-flight repair one tick.
pub fn run(reg: &mut Registries, rng: &mut ChaCha8Rng, tick: u64) {
    let mut anomalies = std::mem::take(&mut reg.anomalies);

    for anomaly in anomalies.iter_mut() {
        if anomaly.repair_status != RepairStatus::Repairing {
            continue;
        }
        let Some(due) = anomaly.busy_until_tick else {
            continue;
        };
        if tick < due {
            continue;
        }

        if rng.gen_bool(REPAIR_SUCCESS_PROB) {
            anomaly.repair_status = RepairStatus::Repaired;
            anomaly.busy_until_tick = None;
            reg.log(
                tick,
                &anomaly.drone_id,
                "Auto-Repair",
                LogStatus::Success,
                format!(
                    "Repair attempt {} of {:?} succeeded.",
                    anomaly.repair_attempts, anomaly.kind
                ),
            );
        } else if anomaly.repair_attempts < REPAIR_MAX_ATTEMPTS {
            anomaly.repair_attempts += 1;
            anomaly.busy_until_tick = Some(tick + next_attempt_ticks(rng));
            reg.log(
                tick,
                &anomaly.drone_id,
                "Auto-Repair",
                LogStatus::Failed,
                format!(
                    "Repair attempt {} failed; retrying.",
                    anomaly.repair_attempts - 1
                ),
            );
        } else {
            anomaly.repair_status = RepairStatus::Failed;
            anomaly.busy_until_tick = None;
            reg.log(
                tick,
                &anomaly.drone_id,
                "Auto-Repair",
                LogStatus::Failed,
                format!("All repair attempts for {:?} failed.", anomaly.kind),
            );
        }
    }

    reg.anomalies = anomalies;
}

/// Rescan delay plus a fresh attempt duration, in ticks.
fn next_attempt_ticks(rng: &mut ChaCha8Rng) -> u64 {
    let secs = REPAIR_RESCAN_SECS + rng.gen_range(REPAIR_MIN_SECS..REPAIR_MAX_SECS);
    (secs / DT).max(1.0) as u64
}

/// Duration of the first repair attempt, in ticks. Used by the command
/// handler when the operator initiates a repair.
pub fn first_attempt_ticks(rng: &mut ChaCha8Rng) -> u64 {
    let secs = rng.gen_range(REPAIR_MIN_SECS..REPAIR_MAX_SECS);
    (secs / DT).max(1.0) as u64
}

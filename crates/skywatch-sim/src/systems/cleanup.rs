//! Stale-record cleanup.
//!
//! Prunes the elimination ledger and drops registry records whose subject
//! entities no longer exist, so no planner or responder ever acts on a
//! dangling reference.

use std::collections::HashSet;

use hecs::World;

use skywatch_core::components::{Drone, Threat, Turret, Ufo};
use skywatch_core::constants::{DT, ELIMINATION_LEDGER_SECS};
use skywatch_core::enums::ResponseStatus;

use crate::registries::Registries;

/// Run cleanup for one tick.
pub fn run(world: &mut World, reg: &mut Registries, tick: u64) {
    let retention = (ELIMINATION_LEDGER_SECS / DT) as u64;
    reg.ledger
        .retain(|r| tick.saturating_sub(r.tick) < retention);

    let drone_ids: HashSet<String> = world
        .query::<&Drone>()
        .iter()
        .map(|(_, d)| d.id.clone())
        .collect();
    let turret_ids: HashSet<String> = world
        .query::<&Turret>()
        .iter()
        .map(|(_, t)| t.id.clone())
        .collect();
    let threat_ids: HashSet<String> = world
        .query::<&Threat>()
        .iter()
        .map(|(_, t)| t.id.clone())
        .collect();
    let ufo_ids: HashSet<String> = world
        .query::<&Ufo>()
        .iter()
        .map(|(_, u)| u.id.clone())
        .collect();

    reg.action_requests
        .retain(|r| drone_ids.contains(&r.subject_id) || turret_ids.contains(&r.subject_id));
    reg.suggestions.retain(|s| drone_ids.contains(&s.drone_id));
    reg.anomalies.retain(|a| drone_ids.contains(&a.drone_id));

    // A designation whose threat or proposed asset vanished is void; the
    // surviving threat goes back to pending so it can be re-proposed.
    let mut orphaned_sources: Vec<String> = Vec::new();
    reg.designations.retain(|d| {
        let alive = (threat_ids.contains(&d.source_id) || ufo_ids.contains(&d.source_id))
            && drone_ids.contains(&d.suggested_drone_id);
        if !alive {
            orphaned_sources.push(d.source_id.clone());
        }
        alive
    });
    for source_id in orphaned_sources {
        for (_, threat) in world.query_mut::<&mut Threat>() {
            if threat.id == source_id && threat.response_status == ResponseStatus::AiTargeting {
                threat.response_status = ResponseStatus::Pending;
            }
        }
    }
}

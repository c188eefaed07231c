//! Simulation constants.
//!
//! Fixed physical and protocol constants live here; empirically tuned
//! parameters that operators may want to adjust live in [`crate::params`].

/// Simulation tick rate (Hz). The engine is a control-loop simulation, not
/// a flight-dynamics integrator; one tick per second matches the cadence of
/// every timeout in the protocol.
pub const TICK_RATE: u32 = 1;

/// Seconds per tick.
pub const DT: f64 = 1.0 / TICK_RATE as f64;

// --- Drone physics ---

/// Battery drain while airborne, percent per second.
pub const BATTERY_DRAIN_PER_SEC: f64 = 0.01;

/// Half-span of the per-second signal random walk, percent.
pub const SIGNAL_WALK_SPAN: f64 = 5.0;

/// Below this signal level an airborne drone falls into autonomous
/// continuation.
pub const SIGNAL_CRITICAL_PCT: f64 = 15.0;

/// Vertical ramp rate toward the target altitude (m/s).
pub const ALTITUDE_RATE_MPS: f64 = 2.0;

/// Interceptors climb this much faster while on an intercept.
pub const INTERCEPT_CLIMB_FACTOR: f64 = 5.0;

/// Speed multiplier during pre-approval observation pursuit.
pub const OBSERVATION_SPEED_FACTOR: f64 = 3.0;

/// Speed multiplier once elimination is approved.
pub const STRIKE_SPEED_FACTOR: f64 = 5.0;

/// Horizontal arrival epsilon: closer than this snaps to the target (m).
pub const ARRIVAL_EPSILON_M: f64 = 10.0;

/// Within this slant range a strike consumes its target (m).
pub const NEUTRALIZATION_RADIUS_M: f64 = 20.0;

// --- Protocol timing ---

/// Unanswered-request timeout while hovering on target (s).
pub const HOVER_TIMEOUT_SECS: f64 = 30.0;

/// Duration of an evasion maneuver (s).
pub const EVASION_SECS: f64 = 5.0;

/// Elimination-ledger retention (s); pruned every tick.
pub const ELIMINATION_LEDGER_SECS: f64 = 10.0;

/// Window in which a vanished target counts as "neutralized by another
/// asset" rather than lost (s).
pub const RECENT_ELIMINATION_SECS: f64 = 5.0;

// --- Counter-UAS ---

/// Rounds expended per engaging tick.
pub const TURRET_BURST_COST: u32 = 5;

/// Reload cycle duration (s).
pub const TURRET_RELOAD_SECS: f64 = 15.0;

// --- Repair workflow ---

/// Total repair attempts: the first plus two retries.
pub const REPAIR_MAX_ATTEMPTS: u8 = 3;

/// Success probability per attempt.
pub const REPAIR_SUCCESS_PROB: f64 = 0.6;

/// Bounds of one attempt's duration (s).
pub const REPAIR_MIN_SECS: f64 = 4.0;
pub const REPAIR_MAX_SECS: f64 = 8.0;

/// Rescan delay between attempts (s).
pub const REPAIR_RESCAN_SECS: f64 = 2.0;

// --- Resolution aids ---

/// Radius for resolving a strike's mission target to a live entity (m).
pub const TARGET_RESOLVE_RADIUS_M: f64 = 20.0;

// --- UFO population ---

/// Benign traffic seeded at startup.
pub const INITIAL_UFO_COUNT: usize = 5;

/// Simultaneous FPV incursions allowed.
pub const MAX_FPV_ALIVE: usize = 2;

/// Half-width of the UFO operating box around the simulation center (deg).
pub const UFO_BOUNDARY_DEG: f64 = 2.0;

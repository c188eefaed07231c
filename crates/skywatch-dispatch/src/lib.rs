//! Dispatch planning for SKYWATCH.
//!
//! Implements the decision logic of the autonomous dispatchers: eligibility
//! filters, nearest-asset selection, and deconfliction against ground
//! defenses. No ECS dependency — operates on plain data pictures gathered
//! by the simulation systems each tick.

pub mod planners;
pub mod profiles;

pub use skywatch_core as core;

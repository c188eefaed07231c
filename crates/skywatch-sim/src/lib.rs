//! Simulation engine for SKYWATCH.
//!
//! Owns the hecs ECS world, processes operator commands at tick boundaries,
//! runs all systems at a fixed tick rate, and produces `WorldSnapshot`s for
//! the presentation layers. Completely headless and deterministic under a
//! fixed seed.

pub mod engine;
pub mod registries;
pub mod systems;
pub mod world_setup;

pub use engine::SimulationEngine;
pub use skywatch_core as core;

#[cfg(test)]
mod tests;

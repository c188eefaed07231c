//! Core types and definitions for the SKYWATCH airspace simulation.
//!
//! This crate defines the vocabulary shared across all other crates:
//! components, commands, registry records, state snapshots, events, and
//! constants. It has no dependency on the ECS or any runtime framework.

pub mod commands;
pub mod components;
pub mod constants;
pub mod enums;
pub mod events;
pub mod params;
pub mod records;
pub mod state;
pub mod types;

#[cfg(test)]
mod tests;

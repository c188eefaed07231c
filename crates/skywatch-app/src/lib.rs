//! SKYWATCH service shell.
//!
//! Wires the simulation engine to the outside world: a fixed-period loop
//! thread, a command channel, a shared latest-snapshot cell, and the
//! `Operations` facade presentation layers talk to.

pub mod ops;
pub mod sim_loop;
pub mod state;

pub use ops::Operations;
pub use skywatch_core as core;

//! Evolution engine: configuration, run control and progress reporting.
//!
//! # Submodules
//!
//! - [`config`]: Run parameters and validation
//! - [`control`]: Run state machine and cross-thread control handle
//! - [`controller`]: The generational loop
//! - [`progress`]: Per-generation statistics and termination reasons

pub mod config;
pub mod control;
pub mod controller;
pub mod progress;

pub use config::EngineConfig;
pub use control::{ControlHandle, RunState};
pub use controller::EvolutionController;
pub use progress::{GenerationStats, TerminationReason};

#[cfg(test)]
mod scenarios;

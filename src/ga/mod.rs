//! GA-based timetable optimization.
//!
//! # Encoding
//!
//! A chromosome is a fixed-length vector with one gene per lesson; each
//! gene holds teacher, room and slot indices. Gene positions never move,
//! so every lesson is placed exactly once in every chromosome.
//!
//! # Submodules
//!
//! - [`operators`]: Runtime-selectable crossover and per-gene mutation
//! - [`population`]: Initialization, parallel evaluation, tournament
//!   selection, elitism and generational replacement

mod chromosome;
pub mod operators;
pub mod population;
mod problem;

pub use chromosome::{Gene, TimetableChromosome};
pub use operators::{CrossoverType, GeneticOperators};
pub use population::Population;
pub use problem::{
    InfeasibleReason, InfeasibleRequirement, RequirementCandidates, TimetableProblem,
};

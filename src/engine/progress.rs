//! Per-generation progress and termination reasons.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::evaluation::{HardCounts, SoftCounts};

/// Snapshot of one generation, emitted once per generation.
///
/// `best_fitness`, the conflict totals and the category breakdowns describe
/// the best chromosome found so far, which never regresses.
/// `generation_best_fitness` is the leader of the current population only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationStats {
    /// Generation number (0 = initial population).
    pub generation: usize,
    /// Configured generation budget.
    pub total_generations: usize,
    /// Best fitness found so far.
    pub best_fitness: f64,
    /// Best fitness within the current population.
    pub generation_best_fitness: f64,
    /// Mean fitness of the current population.
    pub average_fitness: f64,
    /// Hard violations of the best-so-far chromosome.
    pub hard_conflicts: u32,
    /// Soft violations of the best-so-far chromosome.
    pub soft_violations: u32,
    /// Hard conflicts of the best-so-far chromosome, per category.
    pub hard: HardCounts,
    /// Soft violations of the best-so-far chromosome, per category.
    pub soft: SoftCounts,
    /// Time since the run started.
    pub elapsed: Duration,
}

impl GenerationStats {
    /// Fraction of the generation budget used, in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        if self.total_generations == 0 {
            return 1.0;
        }
        ((self.generation + 1) as f64 / self.total_generations as f64).min(1.0)
    }
}

/// Why a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TerminationReason {
    /// Generation budget exhausted.
    MaxGenerations,
    /// No improvement within the plateau window.
    Plateau,
    /// Wall-clock budget exceeded.
    TimeBudget,
    /// Best fitness reached the target.
    TargetReached,
    /// Stopped by the caller.
    Stopped,
}

impl TerminationReason {
    /// Whether the run ended on its own rather than by caller stop.
    pub fn is_exhaustion(self) -> bool {
        !matches!(self, Self::Stopped)
    }
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::MaxGenerations => "generation budget exhausted",
            Self::Plateau => "no improvement within plateau window",
            Self::TimeBudget => "time budget exceeded",
            Self::TargetReached => "target fitness reached",
            Self::Stopped => "stopped by caller",
        };
        f.write_str(s)
    }
}

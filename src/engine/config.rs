//! Engine configuration.
//!
//! [`EngineConfig`] holds every parameter of a run: GA operator rates,
//! termination conditions, scoring constants and parallelism.
//!
//! # Defaults
//!
//! ```
//! use u_timetable::engine::EngineConfig;
//!
//! let config = EngineConfig::default();
//! assert_eq!(config.population_size, 100);
//! assert_eq!(config.generations, 100);
//! assert!(config.validate().is_ok());
//! ```
//!
//! # Builder Pattern
//!
//! Builders store values as given; out-of-range values are reported by
//! [`EngineConfig::validate`] (called by the controller before a run).
//!
//! ```
//! use u_timetable::engine::EngineConfig;
//!
//! let config = EngineConfig::default()
//!     .with_population_size(5)
//!     .with_seed(42);
//! assert!(config.validate().is_err());
//! ```

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::EngineError;
use crate::evaluation::{SoftConstraint, SoftWeights};
use crate::ga::{CrossoverType, GeneticOperators};

/// Configuration for a timetable generation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Number of chromosomes per generation (10–1000).
    pub population_size: usize,

    /// Generation budget (10–1000).
    pub generations: usize,

    /// Per-gene mutation probability (0.0–1.0).
    pub mutation_rate: f64,

    /// Probability of recombining a parent pair (0.0–1.0).
    ///
    /// When crossover is not applied, the parents are cloned.
    pub crossover_rate: f64,

    /// Members copied unchanged into the next generation (0–100,
    /// at most `population_size`).
    pub elitism_count: usize,

    /// Tournament size for parent selection (2–50).
    pub tournament_size: usize,

    /// Crossover strategy.
    pub crossover_type: CrossoverType,

    /// Soft constraint weight overrides.
    pub soft_weights: SoftWeights,

    /// Penalty per hard violation (> 0).
    pub hard_penalty: f64,

    /// Fitness boundary between infeasible and feasible timetables,
    /// in the open interval (0, 1).
    pub feasible_threshold: f64,

    /// Stop once the best fitness reaches this value.
    pub target_fitness: Option<f64>,

    /// Random seed for reproducibility.
    ///
    /// `None` draws a seed from the thread RNG; the seed used is reported.
    pub random_seed: Option<u64>,

    /// Stop after this many generations without improvement.
    pub plateau_window: Option<usize>,

    /// Wall-clock budget for the run.
    pub time_budget: Option<Duration>,

    /// Whether to evaluate chromosomes in parallel using rayon.
    pub parallel: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            generations: 100,
            mutation_rate: 0.1,
            crossover_rate: 0.8,
            elitism_count: 5,
            tournament_size: 5,
            crossover_type: CrossoverType::Uniform,
            soft_weights: SoftWeights::default(),
            hard_penalty: 10.0,
            feasible_threshold: 0.5,
            target_fitness: None,
            random_seed: None,
            plateau_window: None,
            time_budget: None,
            parallel: true,
        }
    }
}

impl EngineConfig {
    /// Sets the population size.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the generation budget.
    pub fn with_generations(mut self, n: usize) -> Self {
        self.generations = n;
        self
    }

    /// Sets the per-gene mutation rate.
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate;
        self
    }

    /// Sets the crossover rate.
    pub fn with_crossover_rate(mut self, rate: f64) -> Self {
        self.crossover_rate = rate;
        self
    }

    /// Sets the number of elites.
    pub fn with_elitism_count(mut self, n: usize) -> Self {
        self.elitism_count = n;
        self
    }

    /// Sets the tournament size.
    pub fn with_tournament_size(mut self, n: usize) -> Self {
        self.tournament_size = n;
        self
    }

    /// Sets the crossover strategy.
    pub fn with_crossover_type(mut self, crossover_type: CrossoverType) -> Self {
        self.crossover_type = crossover_type;
        self
    }

    /// Replaces all soft weight overrides.
    pub fn with_soft_weights(mut self, weights: SoftWeights) -> Self {
        self.soft_weights = weights;
        self
    }

    /// Overrides the weight of one soft constraint.
    pub fn with_soft_weight(mut self, kind: SoftConstraint, weight: f64) -> Self {
        self.soft_weights = self.soft_weights.with(kind, weight);
        self
    }

    /// Sets the hard violation penalty.
    pub fn with_hard_penalty(mut self, penalty: f64) -> Self {
        self.hard_penalty = penalty;
        self
    }

    /// Sets the feasibility threshold.
    pub fn with_feasible_threshold(mut self, threshold: f64) -> Self {
        self.feasible_threshold = threshold;
        self
    }

    /// Sets the target fitness.
    pub fn with_target_fitness(mut self, fitness: f64) -> Self {
        self.target_fitness = Some(fitness);
        self
    }

    /// Sets the random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    /// Sets the plateau window.
    pub fn with_plateau_window(mut self, generations: usize) -> Self {
        self.plateau_window = Some(generations);
        self
    }

    /// Sets the wall-clock budget.
    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget = Some(budget);
        self
    }

    /// Enables or disables parallel evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Genetic operators for these rates.
    pub fn operators(&self) -> GeneticOperators {
        GeneticOperators {
            crossover_type: self.crossover_type,
            crossover_rate: self.crossover_rate,
            mutation_rate: self.mutation_rate,
        }
    }

    /// Validates the configuration.
    ///
    /// # Errors
    /// [`EngineError::Configuration`] naming the first invalid field.
    pub fn validate(&self) -> Result<(), EngineError> {
        if !(10..=1000).contains(&self.population_size) {
            return Err(EngineError::config(
                "population_size",
                format!("{} is outside 10..=1000", self.population_size),
            ));
        }
        if !(10..=1000).contains(&self.generations) {
            return Err(EngineError::config(
                "generations",
                format!("{} is outside 10..=1000", self.generations),
            ));
        }
        check_unit("mutation_rate", self.mutation_rate)?;
        check_unit("crossover_rate", self.crossover_rate)?;
        if self.elitism_count > 100 {
            return Err(EngineError::config(
                "elitism_count",
                format!("{} is outside 0..=100", self.elitism_count),
            ));
        }
        if self.elitism_count > self.population_size {
            return Err(EngineError::config(
                "elitism_count",
                format!(
                    "{} exceeds population_size {}",
                    self.elitism_count, self.population_size
                ),
            ));
        }
        if !(2..=50).contains(&self.tournament_size) {
            return Err(EngineError::config(
                "tournament_size",
                format!("{} is outside 2..=50", self.tournament_size),
            ));
        }
        for (kind, weight) in self.soft_weights.overrides() {
            if !weight.is_finite() || weight < 0.0 {
                return Err(EngineError::config(
                    "soft_weights",
                    format!("weight {weight} for {} must be finite and >= 0", kind.label()),
                ));
            }
        }
        if !self.hard_penalty.is_finite() || self.hard_penalty <= 0.0 {
            return Err(EngineError::config(
                "hard_penalty",
                format!("{} must be finite and > 0", self.hard_penalty),
            ));
        }
        if !(self.feasible_threshold > 0.0 && self.feasible_threshold < 1.0) {
            return Err(EngineError::config(
                "feasible_threshold",
                format!("{} is outside (0, 1)", self.feasible_threshold),
            ));
        }
        if let Some(target) = self.target_fitness {
            check_unit("target_fitness", target)?;
        }
        if self.plateau_window == Some(0) {
            return Err(EngineError::config("plateau_window", "must be at least 1"));
        }
        if self.time_budget == Some(Duration::ZERO) {
            return Err(EngineError::config("time_budget", "must be positive"));
        }
        Ok(())
    }
}

fn check_unit(field: &'static str, value: f64) -> Result<(), EngineError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(EngineError::config(
            field,
            format!("{value} is outside 0.0..=1.0"),
        ))
    }
}

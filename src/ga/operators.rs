//! Configurable genetic operators for timetabling.
//!
//! Provides runtime-selectable crossover and per-gene mutation via
//! [`GeneticOperators`].
//!
//! # Usage
//!
//! ```
//! use u_timetable::ga::operators::{CrossoverType, GeneticOperators};
//!
//! let ops = GeneticOperators::default();
//! assert_eq!(ops.crossover_type, CrossoverType::Uniform);
//! assert_eq!(ops.crossover_rate, 0.8);
//! ```

use log::trace;
use rand::prelude::IndexedRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::chromosome::TimetableChromosome;
use super::problem::TimetableProblem;

/// Crossover strategy for timetable chromosomes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrossoverType {
    /// Each gene drawn from either parent with equal probability.
    #[default]
    Uniform,
    /// Genes before a random cut from one parent, the rest from the other.
    SinglePoint,
}

/// Runtime-selectable genetic operators.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneticOperators {
    /// Crossover strategy.
    pub crossover_type: CrossoverType,
    /// Probability that a parent pair is recombined.
    pub crossover_rate: f64,
    /// Per-gene mutation probability.
    pub mutation_rate: f64,
}

impl Default for GeneticOperators {
    fn default() -> Self {
        Self {
            crossover_type: CrossoverType::Uniform,
            crossover_rate: 0.8,
            mutation_rate: 0.1,
        }
    }
}

impl GeneticOperators {
    /// Recombines two parents using the configured strategy.
    pub fn crossover<R: Rng>(
        &self,
        p1: &TimetableChromosome,
        p2: &TimetableChromosome,
        rng: &mut R,
    ) -> (TimetableChromosome, TimetableChromosome) {
        match self.crossover_type {
            CrossoverType::Uniform => uniform_crossover(p1, p2, rng),
            CrossoverType::SinglePoint => single_point_crossover(p1, p2, rng),
        }
    }

    /// Produces two offspring.
    ///
    /// With probability `crossover_rate` the parents are recombined;
    /// otherwise they are cloned (keeping their evaluation). Each child is
    /// then mutated gene by gene.
    pub fn breed<R: Rng>(
        &self,
        problem: &TimetableProblem,
        p1: &TimetableChromosome,
        p2: &TimetableChromosome,
        rng: &mut R,
    ) -> (TimetableChromosome, TimetableChromosome) {
        let (mut c1, mut c2) = if rng.random_bool(self.crossover_rate) {
            self.crossover(p1, p2, rng)
        } else {
            (p1.clone(), p2.clone())
        };
        self.mutate(problem, &mut c1, rng);
        self.mutate(problem, &mut c2, rng);
        (c1, c2)
    }

    /// Applies per-gene mutation; invalidates the chromosome if any gene changed.
    pub fn mutate<R: Rng>(&self, problem: &TimetableProblem, chromosome: &mut TimetableChromosome, rng: &mut R) {
        if mutate_genes(problem, chromosome, self.mutation_rate, rng) > 0 {
            chromosome.invalidate();
        }
    }
}

/// Uniform crossover: each position swaps between the children with p = 0.5.
pub fn uniform_crossover<R: Rng>(
    p1: &TimetableChromosome,
    p2: &TimetableChromosome,
    rng: &mut R,
) -> (TimetableChromosome, TimetableChromosome) {
    let mut g1 = p1.genes.clone();
    let mut g2 = p2.genes.clone();
    for (a, b) in g1.iter_mut().zip(g2.iter_mut()) {
        if rng.random_bool(0.5) {
            std::mem::swap(a, b);
        }
    }
    (TimetableChromosome::new(g1), TimetableChromosome::new(g2))
}

/// Single-point crossover at a cut in `1..len`.
pub fn single_point_crossover<R: Rng>(
    p1: &TimetableChromosome,
    p2: &TimetableChromosome,
    rng: &mut R,
) -> (TimetableChromosome, TimetableChromosome) {
    let len = p1.genes.len().min(p2.genes.len());
    if len < 2 {
        return (
            TimetableChromosome::new(p1.genes.clone()),
            TimetableChromosome::new(p2.genes.clone()),
        );
    }
    let cut = rng.random_range(1..len);
    let mut g1 = p1.genes.clone();
    let mut g2 = p2.genes.clone();
    g1[cut..len].copy_from_slice(&p2.genes[cut..len]);
    g2[cut..len].copy_from_slice(&p1.genes[cut..len]);
    (TimetableChromosome::new(g1), TimetableChromosome::new(g2))
}

/// Per-gene mutation: with probability `rate` a gene gets a new teacher,
/// room or slot drawn from its requirement's candidates.
///
/// Returns the number of mutated genes.
pub fn mutate_genes<R: Rng>(
    problem: &TimetableProblem,
    chromosome: &mut TimetableChromosome,
    rate: f64,
    rng: &mut R,
) -> usize {
    if rate <= 0.0 {
        return 0;
    }
    let lessons = problem.domain().lessons();
    let mut mutated = 0;
    for (i, gene) in chromosome.genes.iter_mut().enumerate() {
        if !rng.random_bool(rate) {
            continue;
        }
        let req = lessons[i].requirement;
        let cand = problem.candidates(req);
        match rng.random_range(0..3) {
            0 => {
                if let Some(&t) = cand.teachers.choose(rng) {
                    gene.teacher = t;
                }
            }
            1 => {
                if let Some(&r) = cand.rooms.choose(rng) {
                    gene.room = r;
                }
            }
            _ => gene.slot = problem.pick_slot(req, gene.teacher, gene.room, rng),
        }
        mutated += 1;
    }
    trace!("mutated {mutated} of {} genes", chromosome.genes.len());
    mutated
}

//! Fixed-length assignment chromosome for timetabling.
//!
//! # Encoding
//!
//! One [`Gene`] per lesson, in the lesson order of
//! [`DomainModel::lessons`](crate::models::DomainModel::lessons). The gene
//! position identifies the lesson (and therefore its class and subject);
//! the gene value is the (teacher, room, slot) assignment. Every lesson
//! is placed exactly once by construction, so crossover and mutation
//! never need repair.

use serde::{Deserialize, Serialize};

use crate::evaluation::FitnessReport;
use crate::models::DomainModel;

/// Assignment of one lesson, as indices into the domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Gene {
    pub teacher: usize,
    pub room: usize,
    pub slot: usize,
}

impl Gene {
    pub fn new(teacher: usize, room: usize, slot: usize) -> Self {
        Self { teacher, room, slot }
    }
}

/// A candidate timetable.
///
/// Higher fitness = better timetable (maximization convention).
/// `report` is `None` until the chromosome has been evaluated; any
/// change to `genes` must reset it.
#[derive(Debug, Clone, PartialEq)]
pub struct TimetableChromosome {
    pub genes: Vec<Gene>,
    pub report: Option<FitnessReport>,
}

impl TimetableChromosome {
    /// Wraps unevaluated genes.
    pub fn new(genes: Vec<Gene>) -> Self {
        Self {
            genes,
            report: None,
        }
    }

    /// Fitness, or 0 when not yet evaluated.
    #[inline]
    pub fn fitness(&self) -> f64 {
        self.report.map_or(0.0, |r| r.fitness)
    }

    pub fn is_evaluated(&self) -> bool {
        self.report.is_some()
    }

    /// Marks the chromosome as needing evaluation.
    pub fn invalidate(&mut self) {
        self.report = None;
    }

    pub fn len(&self) -> usize {
        self.genes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    /// Whether the genes fit the domain: one per lesson, all indices in range.
    pub fn is_valid(&self, domain: &DomainModel) -> bool {
        let (t, r, s) = (
            domain.teachers().len(),
            domain.rooms().len(),
            domain.slots().len(),
        );
        self.genes.len() == domain.lesson_count()
            && self
                .genes
                .iter()
                .all(|g| g.teacher < t && g.room < r && g.slot < s)
    }
}

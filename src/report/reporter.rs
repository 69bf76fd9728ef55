//! Result projection.
//!
//! Turns the best chromosome of a run into the caller-facing
//! [`EngineOutcome`]: the decoded [`Timetable`] plus a [`ScheduleReport`]
//! with per-category counts, detailed violations, run history and KPIs.
//! The chromosome is only read.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::kpi::TimetableKpi;
use crate::engine::{GenerationStats, TerminationReason};
use crate::error::EngineError;
use crate::evaluation::{
    ConstraintEvaluator, ConstraintKind, FitnessReport, HardConstraint, Severity,
    SoftConstraint, Violation,
};
use crate::ga::{InfeasibleRequirement, TimetableChromosome, TimetableProblem};
use crate::models::Timetable;

/// Violation count of one constraint category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub kind: ConstraintKind,
    pub count: u32,
    /// Penalty per occurrence (the hard penalty for hard categories).
    pub weight: f64,
    pub severity: Severity,
}

/// Quality report of a finished run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleReport {
    /// Evaluation of the returned timetable.
    pub fitness: FitnessReport,
    /// Non-zero categories, hard first, in declaration order.
    pub categories: Vec<CategoryCount>,
    /// One entry per generation.
    pub history: Vec<GenerationStats>,
    pub generations_run: usize,
    pub termination: TerminationReason,
    /// `true` if the run ended on its own, `false` if stopped by the caller.
    pub exhausted: bool,
    /// Seed of the run's random generator.
    pub seed: u64,
    pub violations: Vec<Violation>,
    pub infeasible: Vec<InfeasibleRequirement>,
    pub kpi: TimetableKpi,
    pub elapsed: Duration,
}

impl ScheduleReport {
    /// Whether the timetable has no hard violations.
    pub fn is_feasible(&self) -> bool {
        self.fitness.is_feasible()
    }

    /// Violations of one category.
    pub fn violations_of(&self, kind: ConstraintKind) -> impl Iterator<Item = &Violation> {
        self.violations.iter().filter(move |v| v.kind == kind)
    }

    /// One-line human-readable summary.
    pub fn summary(&self) -> String {
        format!(
            "fitness {:.4} after {} generations ({}), {} hard / {} soft violations",
            self.fitness.fitness,
            self.generations_run,
            self.termination,
            self.fitness.hard_violations(),
            self.fitness.soft_violations()
        )
    }
}

/// What a run produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineOutcome {
    pub timetable: Timetable,
    pub report: ScheduleReport,
}

/// Run metadata collected by the evolution loop.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub history: Vec<GenerationStats>,
    pub termination: TerminationReason,
    pub seed: u64,
    pub elapsed: Duration,
}

/// Builds [`EngineOutcome`]s from chromosomes.
pub struct ResultReporter<'a> {
    problem: &'a TimetableProblem,
    evaluator: &'a ConstraintEvaluator,
}

impl<'a> ResultReporter<'a> {
    pub fn new(problem: &'a TimetableProblem, evaluator: &'a ConstraintEvaluator) -> Self {
        Self { problem, evaluator }
    }

    /// Per-category counts of a fitness report.
    pub fn categories(&self, fitness: &FitnessReport) -> Vec<CategoryCount> {
        let hard = fitness.hard.iter().map(|(k, n)| {
            let kind = ConstraintKind::Hard(k);
            CategoryCount {
                kind,
                count: n,
                weight: self.evaluator.hard_penalty(),
                severity: kind.severity(),
            }
        });
        let soft = fitness.soft.iter().map(|(k, n)| {
            let kind = ConstraintKind::Soft(k);
            CategoryCount {
                kind,
                count: n,
                weight: self.evaluator.weight(k),
                severity: kind.severity(),
            }
        });
        hard.chain(soft).collect()
    }

    /// Projects `best` into a timetable and report.
    ///
    /// # Errors
    /// [`EngineError::Encoding`] if `best` does not fit the domain.
    pub fn report(
        &self,
        best: &TimetableChromosome,
        run: RunSummary,
    ) -> Result<EngineOutcome, EngineError> {
        let timetable = self.problem.decode(best)?;
        let (fitness, violations) = self.evaluator.explain(&best.genes);
        let kpi = TimetableKpi::calculate(&timetable, self.problem.domain());

        let report = ScheduleReport {
            categories: self.categories(&fitness),
            fitness,
            generations_run: run.history.len(),
            history: run.history,
            termination: run.termination,
            exhausted: run.termination.is_exhaustion(),
            seed: run.seed,
            violations,
            infeasible: self.problem.infeasible().to_vec(),
            kpi,
            elapsed: run.elapsed,
        };
        Ok(EngineOutcome { timetable, report })
    }
}

/// Every category with its count, including zeros.
pub fn full_breakdown(fitness: &FitnessReport) -> Vec<(ConstraintKind, u32)> {
    HardConstraint::ALL
        .iter()
        .map(|k| (ConstraintKind::Hard(*k), fitness.hard.get(*k)))
        .chain(
            SoftConstraint::ALL
                .iter()
                .map(|k| (ConstraintKind::Soft(*k), fitness.soft.get(*k))),
        )
        .collect()
}

//! Constraint evaluation.
//!
//! - [`constraints`]: hard/soft categories, counts, weights and
//!   human-readable violations.
//! - [`evaluator`]: the O(lessons) fitness function.

pub mod constraints;
pub mod evaluator;

pub use constraints::{
    ConstraintKind, HardConstraint, HardCounts, Severity, SoftConstraint, SoftCounts,
    SoftWeights, Violation, ViolationSink,
};
pub use evaluator::{ConstraintEvaluator, EvalScratch, FitnessReport};

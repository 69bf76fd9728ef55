//! Engine error taxonomy.
//!
//! Only conditions that prevent a run from starting (or misuse of the
//! control surface) are errors. Infeasible requirements and caller
//! cancellation are normal outcomes and surface through the report.

use thiserror::Error;

use crate::engine::RunState;
use crate::validation::ValidationError;

/// Errors returned by the timetable engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// An engine parameter is out of range.
    #[error("invalid configuration: {field}: {message}")]
    Configuration {
        /// Offending configuration field.
        field: &'static str,
        /// Human-readable description.
        message: String,
    },

    /// The domain snapshot failed validation.
    #[error("invalid domain snapshot ({} problem(s)): {}", .0.len(), summarize(.0))]
    InvalidDomain(Vec<ValidationError>),

    /// A control action is not allowed in the current run state.
    #[error("cannot {action} while {state:?}")]
    InvalidTransition {
        /// Requested action (`start`, `pause`, ...).
        action: &'static str,
        /// State the controller was in.
        state: RunState,
    },

    /// A timetable could not be mapped onto the chromosome encoding.
    #[error("encoding failed: {0}")]
    Encoding(String),

    /// The background evolution thread panicked.
    #[error("evolution worker panicked")]
    WorkerPanicked,
}

impl EngineError {
    pub(crate) fn config(field: &'static str, message: impl Into<String>) -> Self {
        Self::Configuration {
            field,
            message: message.into(),
        }
    }
}

fn summarize(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .take(3)
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

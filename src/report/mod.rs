//! Result reporting.
//!
//! - [`reporter`]: projects the best chromosome into a timetable and
//!   quality report.
//! - [`kpi`]: teaching load and room utilization indicators.

pub mod kpi;
pub mod reporter;

pub use kpi::{RoomUtilization, TeachingLoad, TimetableKpi};
pub use reporter::{
    full_breakdown, CategoryCount, EngineOutcome, ResultReporter, RunSummary, ScheduleReport,
};

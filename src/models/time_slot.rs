//! Time slot model.
//!
//! A time slot is one teaching period on one day of the week. The
//! ordinal `position` within the day drives every consecutiveness check:
//! two slots are adjacent iff they share a day and their positions differ
//! by exactly one (a gap in positions models a break).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Day of the week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Day {
    /// All days in week order.
    pub const ALL: [Day; 7] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
        Day::Saturday,
        Day::Sunday,
    ];

    /// Number of days in a week.
    pub const COUNT: usize = 7;

    /// Zero-based index (Monday = 0).
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// English day name.
    pub fn name(self) -> &'static str {
        match self {
            Day::Monday => "Monday",
            Day::Tuesday => "Tuesday",
            Day::Wednesday => "Wednesday",
            Day::Thursday => "Thursday",
            Day::Friday => "Friday",
            Day::Saturday => "Saturday",
            Day::Sunday => "Sunday",
        }
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A teaching period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSlot {
    /// Unique slot identifier.
    pub id: String,
    /// Day of the week.
    pub day: Day,
    /// Start time label (e.g. "07:00"). Informational only.
    pub start_time: String,
    /// End time label (e.g. "07:45"). Informational only.
    pub end_time: String,
    /// Ordinal position within the day (1 = first period).
    pub position: u32,
}

impl TimeSlot {
    /// Creates a slot at the given day and position.
    pub fn new(id: impl Into<String>, day: Day, position: u32) -> Self {
        Self {
            id: id.into(),
            day,
            start_time: String::new(),
            end_time: String::new(),
            position,
        }
    }

    /// Sets the start/end time labels.
    pub fn with_times(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.start_time = start.into();
        self.end_time = end.into();
        self
    }

    /// Whether `other` directly follows this slot on the same day.
    pub fn is_followed_by(&self, other: &TimeSlot) -> bool {
        self.day == other.day && self.position.checked_add(1) == Some(other.position)
    }
}

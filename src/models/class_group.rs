//! Class group model.

use serde::{Deserialize, Serialize};

use super::{Day, Preferences, TimeSlot};

/// A group of students that attends lessons together.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassGroup {
    /// Unique class identifier.
    pub id: String,
    /// Human-readable name (e.g. "X TKJ 1").
    pub name: String,
    /// Grade level.
    pub grade: u32,
    /// Department / study program.
    pub department: String,
    /// Number of students (checked against room capacity).
    pub student_count: u32,
    /// Hard limit on lessons per day.
    pub max_daily_hours: Option<u32>,
    /// Lessons before this position are a soft violation.
    pub preferred_start_position: Option<u32>,
    /// Penalize adjacent lessons of the same single-period subject.
    pub avoid_consecutive_same_subject: bool,
    /// Day/slot preferences.
    pub preferences: Preferences,
    /// Treat `preferences.avoided_days` as a hard constraint.
    pub avoided_days_mandatory: bool,
}

impl ClassGroup {
    /// Creates a class group.
    pub fn new(id: impl Into<String>, grade: u32, department: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            grade,
            department: department.into(),
            student_count: 0,
            max_daily_hours: None,
            preferred_start_position: None,
            avoid_consecutive_same_subject: false,
            preferences: Preferences::default(),
            avoided_days_mandatory: false,
        }
    }

    /// Sets the class name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the student count.
    pub fn with_students(mut self, count: u32) -> Self {
        self.student_count = count;
        self
    }

    /// Sets the daily lesson limit.
    pub fn with_max_daily_hours(mut self, hours: u32) -> Self {
        self.max_daily_hours = Some(hours);
        self
    }

    /// Sets the preferred first period.
    pub fn with_preferred_start(mut self, position: u32) -> Self {
        self.preferred_start_position = Some(position);
        self
    }

    /// Enables the same-subject back-to-back penalty.
    pub fn avoiding_consecutive_subjects(mut self) -> Self {
        self.avoid_consecutive_same_subject = true;
        self
    }

    /// Adds a preferred day.
    pub fn prefers_day(mut self, day: Day) -> Self {
        self.preferences.preferred_days.push(day);
        self
    }

    /// Adds an avoided day.
    pub fn avoids_day(mut self, day: Day) -> Self {
        self.preferences.avoided_days.push(day);
        self
    }

    /// Makes avoided days a hard constraint.
    pub fn with_mandatory_avoidance(mut self) -> Self {
        self.avoided_days_mandatory = true;
        self
    }

    /// Whether lessons are forbidden on a day.
    pub fn forbids_day(&self, day: Day) -> bool {
        self.avoided_days_mandatory && self.preferences.avoided_days.contains(&day)
    }

    /// Soft mismatches for placing a lesson of this class in `slot`.
    pub fn slot_mismatches(&self, slot: &TimeSlot) -> u8 {
        let mut count = self.preferences.mismatches(slot, self.avoided_days_mandatory);
        if let Some(start) = self.preferred_start_position {
            if slot.position < start {
                count += 1;
            }
        }
        count
    }
}

//! Teacher model.
//!
//! Teachers are the human resources of a timetable. Each teacher has a
//! set of subjects they are qualified for, a weekly availability and
//! workload limits.
//!
//! # Availability
//! Follows calendar precedence: a slot is available iff it is listed in
//! `available_slots` (or that list is empty) AND it is not listed in
//! `unavailable_slots`.

use serde::{Deserialize, Serialize};

use super::{Day, Preferences};

/// A teacher that can be assigned to lessons.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Teacher {
    /// Unique teacher identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Home department.
    pub department: String,
    /// Subject IDs this teacher is qualified to teach.
    pub subjects: Vec<String>,
    /// Slots in which the teacher works. Empty = every slot.
    pub available_slots: Vec<String>,
    /// Slots in which the teacher is unavailable (overrides `available_slots`).
    pub unavailable_slots: Vec<String>,
    /// Soft limit on lessons per day.
    pub max_hours_per_day: Option<u32>,
    /// Soft limit on back-to-back lessons.
    pub max_consecutive_hours: Option<u32>,
    /// Soft limit on lessons per week.
    pub max_hours_per_week: Option<u32>,
    /// Day/slot preferences.
    pub preferences: Preferences,
}

impl Teacher {
    /// Creates a teacher with no qualifications and full availability.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            department: String::new(),
            subjects: Vec::new(),
            available_slots: Vec::new(),
            unavailable_slots: Vec::new(),
            max_hours_per_day: None,
            max_consecutive_hours: None,
            max_hours_per_week: None,
            preferences: Preferences::default(),
        }
    }

    /// Sets the teacher name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the department.
    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = department.into();
        self
    }

    /// Adds a subject qualification.
    pub fn with_subject(mut self, subject_id: impl Into<String>) -> Self {
        self.subjects.push(subject_id.into());
        self
    }

    /// Restricts availability to the listed slots (cumulative).
    pub fn available_in(mut self, slot_id: impl Into<String>) -> Self {
        self.available_slots.push(slot_id.into());
        self
    }

    /// Blocks a slot.
    pub fn unavailable_in(mut self, slot_id: impl Into<String>) -> Self {
        self.unavailable_slots.push(slot_id.into());
        self
    }

    /// Sets the daily lesson limit.
    pub fn with_max_hours_per_day(mut self, hours: u32) -> Self {
        self.max_hours_per_day = Some(hours);
        self
    }

    /// Sets the consecutive lesson limit.
    pub fn with_max_consecutive_hours(mut self, hours: u32) -> Self {
        self.max_consecutive_hours = Some(hours);
        self
    }

    /// Sets the weekly lesson limit.
    pub fn with_max_hours_per_week(mut self, hours: u32) -> Self {
        self.max_hours_per_week = Some(hours);
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

    /// Adds a preferred slot.
    pub fn prefers_slot(mut self, slot_id: impl Into<String>) -> Self {
        self.preferences.preferred_slots.push(slot_id.into());
        self
    }

    /// Adds an avoided slot.
    pub fn avoids_slot(mut self, slot_id: impl Into<String>) -> Self {
        self.preferences.avoided_slots.push(slot_id.into());
        self
    }

    /// Whether this teacher may teach the subject.
    pub fn can_teach(&self, subject_id: &str) -> bool {
        self.subjects.iter().any(|s| s == subject_id)
    }

    /// Whether the teacher works in the given slot.
    pub fn is_available_in(&self, slot_id: &str) -> bool {
        if self.unavailable_slots.iter().any(|s| s == slot_id) {
            return false;
        }
        self.available_slots.is_empty() || self.available_slots.iter().any(|s| s == slot_id)
    }

    /// All slot IDs referenced by availability and preferences.
    pub fn referenced_slots(&self) -> impl Iterator<Item = &str> {
        self.available_slots
            .iter()
            .chain(self.unavailable_slots.iter())
            .map(String::as_str)
            .chain(self.preferences.referenced_slots())
    }
}

//! Timetable (solution) model.
//!
//! A timetable is the decoded form of a chromosome: one entry per lesson,
//! in lesson order, assigning a teacher, a room and a time slot.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::Day;

/// A complete weekly timetable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Timetable {
    /// Placed lessons, in lesson order.
    pub entries: Vec<TimetableEntry>,
}

/// One placed lesson.
///
/// Day and position are denormalized from the slot for query convenience.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimetableEntry {
    /// Lesson index (gene position).
    pub lesson: usize,
    /// Class group ID.
    pub class_id: String,
    /// Subject ID.
    pub subject_id: String,
    /// Assigned teacher ID.
    pub teacher_id: String,
    /// Assigned room ID.
    pub room_id: String,
    /// Assigned time slot ID.
    pub slot_id: String,
    /// Day of the slot.
    pub day: Day,
    /// Position of the slot within the day.
    pub position: u32,
}

impl Timetable {
    /// Creates an empty timetable.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry.
    pub fn add_entry(&mut self, entry: TimetableEntry) {
        self.entries.push(entry);
    }

    /// Number of placed lessons.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no lesson is placed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry for a lesson index.
    pub fn entry_for_lesson(&self, lesson: usize) -> Option<&TimetableEntry> {
        self.entries.iter().find(|e| e.lesson == lesson)
    }

    /// All lessons of a class.
    pub fn entries_for_class(&self, class_id: &str) -> Vec<&TimetableEntry> {
        self.entries.iter().filter(|e| e.class_id == class_id).collect()
    }

    /// All lessons taught by a teacher.
    pub fn entries_for_teacher(&self, teacher_id: &str) -> Vec<&TimetableEntry> {
        self.entries
            .iter()
            .filter(|e| e.teacher_id == teacher_id)
            .collect()
    }

    /// All lessons held in a room.
    pub fn entries_for_room(&self, room_id: &str) -> Vec<&TimetableEntry> {
        self.entries.iter().filter(|e| e.room_id == room_id).collect()
    }

    /// All lessons at a given day and position.
    pub fn entries_at(&self, day: Day, position: u32) -> Vec<&TimetableEntry> {
        self.entries
            .iter()
            .filter(|e| e.day == day && e.position == position)
            .collect()
    }

    /// The lesson a class has at a given day and position, if any.
    ///
    /// With a class double booking the first lesson in order is returned.
    pub fn cell(&self, class_id: &str, day: Day, position: u32) -> Option<&TimetableEntry> {
        self.entries
            .iter()
            .find(|e| e.class_id == class_id && e.day == day && e.position == position)
    }

    /// Weekly grid of a class, ordered by (day, position).
    pub fn class_grid(&self, class_id: &str) -> BTreeMap<(Day, u32), Vec<&TimetableEntry>> {
        let mut grid: BTreeMap<(Day, u32), Vec<&TimetableEntry>> = BTreeMap::new();
        for e in self.entries.iter().filter(|e| e.class_id == class_id) {
            grid.entry((e.day, e.position)).or_default().push(e);
        }
        grid
    }

    /// Lessons per teacher, ordered by teacher ID.
    pub fn lessons_per_teacher(&self) -> BTreeMap<&str, usize> {
        let mut counts = BTreeMap::new();
        for e in &self.entries {
            *counts.entry(e.teacher_id.as_str()).or_insert(0) += 1;
        }
        counts
    }
}

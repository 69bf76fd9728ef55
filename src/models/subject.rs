//! Subject model.

use serde::{Deserialize, Serialize};

use super::{ClassGroup, Day, Preferences, Room, RoomType};

/// A subject taught to class groups.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
    /// Unique subject identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Short code (e.g. "MTK").
    pub code: String,
    /// Lessons required per week.
    pub weekly_hours: u32,
    /// Whether lessons must take place in a practical room.
    pub requires_practical_room: bool,
    /// Grades the subject is offered to. Empty = all.
    pub grades: Vec<u32>,
    /// Departments the subject is offered to. Empty = all.
    pub departments: Vec<String>,
    /// Day/slot preferences.
    pub preferences: Preferences,
    /// Desired number of consecutive periods per sitting (≥ 1).
    pub block_length: u32,
}

impl Subject {
    /// Creates a theory subject.
    pub fn new(id: impl Into<String>, weekly_hours: u32) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            code: String::new(),
            weekly_hours,
            requires_practical_room: false,
            grades: Vec::new(),
            departments: Vec::new(),
            preferences: Preferences::default(),
            block_length: 1,
        }
    }

    /// Sets the subject name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the subject code.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    /// Requires a practical room.
    pub fn practical(mut self) -> Self {
        self.requires_practical_room = true;
        self
    }

    /// Offers the subject to a grade (cumulative).
    pub fn for_grade(mut self, grade: u32) -> Self {
        self.grades.push(grade);
        self
    }

    /// Offers the subject to a department (cumulative).
    pub fn for_department(mut self, department: impl Into<String>) -> Self {
        self.departments.push(department.into());
        self
    }

    /// Sets the desired block length.
    pub fn with_block_length(mut self, periods: u32) -> Self {
        self.block_length = periods;
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

    /// Whether the subject is part of the class's curriculum.
    pub fn is_offered_to(&self, class: &ClassGroup) -> bool {
        (self.grades.is_empty() || self.grades.contains(&class.grade))
            && (self.departments.is_empty() || self.departments.contains(&class.department))
    }

    /// Required room type.
    pub fn room_type(&self) -> RoomType {
        if self.requires_practical_room {
            RoomType::Practical
        } else {
            RoomType::Theory
        }
    }

    /// Whether `room` can host this subject for `class`.
    ///
    /// Day-level opening hours are checked separately per slot.
    pub fn accepts_room(&self, room: &Room, class: &ClassGroup) -> bool {
        room.active
            && room.room_type == self.room_type()
            && room.capacity >= class.student_count
            && room.serves_department(&class.department)
    }
}

//! Room model.

use serde::{Deserialize, Serialize};

use super::Day;

/// Room classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoomType {
    /// Ordinary classroom.
    Theory,
    /// Laboratory or workshop.
    Practical,
}

/// A room lessons can be held in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    /// Unique room identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Theory or practical room.
    pub room_type: RoomType,
    /// Seats available.
    pub capacity: u32,
    /// Departments allowed to use the room. Empty = all.
    pub departments: Vec<String>,
    /// Days on which the room is open. Empty = every day.
    pub available_days: Vec<Day>,
    /// Inactive rooms are never eligible.
    pub active: bool,
}

impl Room {
    /// Creates an active room with unlimited capacity.
    pub fn new(id: impl Into<String>, room_type: RoomType) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            room_type,
            capacity: u32::MAX,
            departments: Vec::new(),
            available_days: Vec::new(),
            active: true,
        }
    }

    /// Creates a theory room.
    pub fn theory(id: impl Into<String>) -> Self {
        Self::new(id, RoomType::Theory)
    }

    /// Creates a practical room.
    pub fn practical(id: impl Into<String>) -> Self {
        Self::new(id, RoomType::Practical)
    }

    /// Sets the room name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the capacity.
    pub fn with_capacity(mut self, capacity: u32) -> Self {
        self.capacity = capacity;
        self
    }

    /// Restricts the room to a department (cumulative).
    pub fn for_department(mut self, department: impl Into<String>) -> Self {
        self.departments.push(department.into());
        self
    }

    /// Restricts opening days (cumulative).
    pub fn open_on(mut self, day: Day) -> Self {
        self.available_days.push(day);
        self
    }

    /// Marks the room active or inactive.
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// Whether the room is open on a day.
    pub fn is_open_on(&self, day: Day) -> bool {
        self.active && (self.available_days.is_empty() || self.available_days.contains(&day))
    }

    /// Whether the room accepts classes of a department.
    pub fn serves_department(&self, department: &str) -> bool {
        self.departments.is_empty() || self.departments.iter().any(|d| d == department)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_builder() {
        let r = Room::practical("LAB1")
            .with_name("Computer Lab")
            .with_capacity(32)
            .for_department("RPL")
            .open_on(Day::Monday);

        assert_eq!(r.room_type, RoomType::Practical);
        assert_eq!(r.capacity, 32);
        assert!(r.serves_department("RPL"));
        assert!(!r.serves_department("TKJ"));
        assert!(r.is_open_on(Day::Monday));
        assert!(!r.is_open_on(Day::Tuesday));
    }

    #[test]
    fn test_room_defaults() {
        let r = Room::theory("R1");
        assert!(r.active);
        assert!(r.serves_department("anything"));
        assert!(Day::ALL.iter().all(|d| r.is_open_on(*d)));
    }

    #[test]
    fn test_inactive_room_closed() {
        let r = Room::theory("R1").with_active(false);
        assert!(!r.is_open_on(Day::Monday));
    }
}

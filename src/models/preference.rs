//! Day and slot preferences shared by teachers, classes and subjects.

use serde::{Deserialize, Serialize};

use super::{Day, TimeSlot};

/// Preferred/avoided days and slots.
///
/// Empty preferred lists mean "no preference". Each rule that a slot
/// breaks counts as one soft mismatch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    /// Days on which lessons are preferred.
    pub preferred_days: Vec<Day>,
    /// Days on which lessons should be avoided.
    pub avoided_days: Vec<Day>,
    /// Slot IDs in which lessons are preferred.
    pub preferred_slots: Vec<String>,
    /// Slot IDs in which lessons should be avoided.
    pub avoided_slots: Vec<String>,
}

impl Preferences {
    /// Whether no preference is set.
    pub fn is_empty(&self) -> bool {
        self.preferred_days.is_empty()
            && self.avoided_days.is_empty()
            && self.preferred_slots.is_empty()
            && self.avoided_slots.is_empty()
    }

    /// Number of preference rules broken by placing a lesson in `slot`.
    ///
    /// When `skip_avoided_days` is set, avoided days are not counted
    /// (the caller enforces them as a hard rule instead).
    pub fn mismatches(&self, slot: &TimeSlot, skip_avoided_days: bool) -> u8 {
        let mut count = 0;
        if !self.preferred_days.is_empty() && !self.preferred_days.contains(&slot.day) {
            count += 1;
        }
        if !skip_avoided_days && self.avoided_days.contains(&slot.day) {
            count += 1;
        }
        if !self.preferred_slots.is_empty() && !self.preferred_slots.contains(&slot.id) {
            count += 1;
        }
        if self.avoided_slots.contains(&slot.id) {
            count += 1;
        }
        count
    }

    /// All slot IDs referenced by these preferences.
    pub fn referenced_slots(&self) -> impl Iterator<Item = &str> {
        self.preferred_slots
            .iter()
            .chain(self.avoided_slots.iter())
            .map(String::as_str)
    }
}

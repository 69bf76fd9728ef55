//! Curriculum requirements.
//!
//! A requirement is the unit of work handed to the engine: a class must
//! receive `hours` lessons of a subject per week. Each hour becomes one
//! gene of the chromosome.

use serde::{Deserialize, Serialize};

use super::{ClassGroup, Subject};

/// A (class, subject, hours) curriculum entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    /// Class group ID.
    pub class_id: String,
    /// Subject ID.
    pub subject_id: String,
    /// Lessons per week.
    pub hours: u32,
}

impl Requirement {
    /// Creates a requirement.
    pub fn new(class_id: impl Into<String>, subject_id: impl Into<String>, hours: u32) -> Self {
        Self {
            class_id: class_id.into(),
            subject_id: subject_id.into(),
            hours,
        }
    }

    /// Derives the curriculum from subject eligibility.
    ///
    /// Every subject offered to a class (grade and department match) is
    /// required for its weekly hours. Subjects with zero weekly hours are
    /// skipped. Output order is class-major, then subject order.
    pub fn derive_curriculum(classes: &[ClassGroup], subjects: &[Subject]) -> Vec<Requirement> {
        let mut requirements = Vec::new();
        for class in classes {
            for subject in subjects {
                if subject.weekly_hours > 0 && subject.is_offered_to(class) {
                    requirements.push(Requirement::new(
                        &class.id,
                        &subject.id,
                        subject.weekly_hours,
                    ));
                }
            }
        }
        requirements
    }
}

//! Input validation for timetabling problems.
//!
//! Checks structural integrity of a domain snapshot before the engine
//! builds its indices. Detects:
//! - Duplicate IDs (per entity kind)
//! - Two time slots sharing a (day, position)
//! - References to unknown subjects, slots, classes
//! - Invalid values (zero block length)
//! - Requirements with nothing to place them on
//!
//! All problems are collected; validation never stops at the first one.

use std::collections::HashSet;

use crate::models::DomainSnapshot;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two entities of the same kind share an ID.
    DuplicateId,
    /// Two time slots occupy the same day and position.
    DuplicatePosition,
    /// An entity references an ID that doesn't exist.
    InvalidReference,
    /// A field holds a value outside its domain.
    InvalidValue,
    /// Requirements exist but there are no teachers, rooms or slots.
    MissingResources,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

fn collect_ids<'a>(
    kind: &str,
    ids: impl Iterator<Item = &'a str>,
    errors: &mut Vec<ValidationError>,
) -> HashSet<&'a str> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate {kind} ID: {id}"),
            ));
        }
    }
    seen
}

/// Validates a domain snapshot.
///
/// Checks:
/// 1. No duplicate teacher, room, class, subject or slot IDs
/// 2. No two slots at the same (day, position)
/// 3. Teacher qualifications reference existing subjects
/// 4. Availability and preference lists reference existing slots
/// 5. Requirements reference existing classes and subjects
/// 6. Subject block length ≥ 1
/// 7. If any lesson must be placed, at least one teacher, room and slot exist
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_snapshot(snapshot: &DomainSnapshot) -> ValidationResult {
    let mut errors = Vec::new();

    collect_ids(
        "teacher",
        snapshot.teachers.iter().map(|t| t.id.as_str()),
        &mut errors,
    );
    collect_ids(
        "room",
        snapshot.rooms.iter().map(|r| r.id.as_str()),
        &mut errors,
    );
    let class_ids = collect_ids(
        "class",
        snapshot.classes.iter().map(|c| c.id.as_str()),
        &mut errors,
    );
    let subject_ids = collect_ids(
        "subject",
        snapshot.subjects.iter().map(|s| s.id.as_str()),
        &mut errors,
    );
    let slot_ids = collect_ids(
        "time slot",
        snapshot.time_slots.iter().map(|s| s.id.as_str()),
        &mut errors,
    );

    let mut positions = HashSet::new();
    for slot in &snapshot.time_slots {
        if !positions.insert((slot.day, slot.position)) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicatePosition,
                format!(
                    "Time slot '{}' duplicates {} position {}",
                    slot.id, slot.day, slot.position
                ),
            ));
        }
    }

    let check_slot = |owner: &str, slot: &str, errors: &mut Vec<ValidationError>| {
        if !slot_ids.contains(slot) {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidReference,
                format!("{owner} references unknown time slot '{slot}'"),
            ));
        }
    };

    for teacher in &snapshot.teachers {
        for subject in &teacher.subjects {
            if !subject_ids.contains(subject.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidReference,
                    format!(
                        "Teacher '{}' references unknown subject '{}'",
                        teacher.id, subject
                    ),
                ));
            }
        }
        for slot in teacher.referenced_slots() {
            check_slot(&format!("Teacher '{}'", teacher.id), slot, &mut errors);
        }
    }

    for class in &snapshot.classes {
        for slot in class.preferences.referenced_slots() {
            check_slot(&format!("Class '{}'", class.id), slot, &mut errors);
        }
    }

    for subject in &snapshot.subjects {
        if subject.block_length == 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidValue,
                format!("Subject '{}' has a block length of 0", subject.id),
            ));
        }
        for slot in subject.preferences.referenced_slots() {
            check_slot(&format!("Subject '{}'", subject.id), slot, &mut errors);
        }
    }

    for req in &snapshot.requirements {
        if !class_ids.contains(req.class_id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidReference,
                format!("Requirement references unknown class '{}'", req.class_id),
            ));
        }
        if !subject_ids.contains(req.subject_id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidReference,
                format!("Requirement references unknown subject '{}'", req.subject_id),
            ));
        }
    }

    let has_lessons = if snapshot.requirements.is_empty() {
        snapshot.classes.iter().any(|c| {
            snapshot
                .subjects
                .iter()
                .any(|s| s.weekly_hours > 0 && s.is_offered_to(c))
        })
    } else {
        snapshot.requirements.iter().any(|r| r.hours > 0)
    };
    if has_lessons {
        for (kind, empty) in [
            ("teachers", snapshot.teachers.is_empty()),
            ("rooms", snapshot.rooms.is_empty()),
            ("time slots", snapshot.time_slots.is_empty()),
        ] {
            if empty {
                errors.push(ValidationError::new(
                    ValidationErrorKind::MissingResources,
                    format!("Lessons must be scheduled but there are no {kind}"),
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

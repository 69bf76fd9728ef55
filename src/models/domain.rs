//! Domain snapshot and derived lookup indices.
//!
//! [`DomainSnapshot`] is the plain input handed over by the host
//! application. [`DomainModel`] validates it once and precomputes dense
//! index tables (teacher × slot availability, requirement × room
//! eligibility, per-slot preference penalties, slot adjacency) so that
//! fitness evaluation never scans entity lists.
//!
//! The model is immutable for the lifetime of a run; all search state
//! lives in chromosomes.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{ClassGroup, Day, Requirement, Room, RoomType, Subject, Teacher, TimeSlot};
use crate::error::EngineError;
use crate::validation::validate_snapshot;

/// Raw input for the engine.
///
/// When `requirements` is empty the curriculum is derived from subject
/// eligibility (see [`Requirement::derive_curriculum`]).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DomainSnapshot {
    pub teachers: Vec<Teacher>,
    pub rooms: Vec<Room>,
    pub classes: Vec<ClassGroup>,
    pub subjects: Vec<Subject>,
    pub time_slots: Vec<TimeSlot>,
    pub requirements: Vec<Requirement>,
}

impl DomainSnapshot {
    /// Creates an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a teacher.
    pub fn with_teacher(mut self, teacher: Teacher) -> Self {
        self.teachers.push(teacher);
        self
    }

    /// Adds a room.
    pub fn with_room(mut self, room: Room) -> Self {
        self.rooms.push(room);
        self
    }

    /// Adds a class group.
    pub fn with_class(mut self, class: ClassGroup) -> Self {
        self.classes.push(class);
        self
    }

    /// Adds a subject.
    pub fn with_subject(mut self, subject: Subject) -> Self {
        self.subjects.push(subject);
        self
    }

    /// Adds a time slot.
    pub fn with_slot(mut self, slot: TimeSlot) -> Self {
        self.time_slots.push(slot);
        self
    }

    /// Adds a curriculum requirement.
    pub fn with_requirement(mut self, requirement: Requirement) -> Self {
        self.requirements.push(requirement);
        self
    }
}

/// A requirement resolved to entity indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedRequirement {
    /// Class index.
    pub class: usize,
    /// Subject index.
    pub subject: usize,
    /// Lessons per week.
    pub hours: u32,
}

/// One required hour of a requirement; the unit a gene encodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lesson {
    /// Requirement index.
    pub requirement: usize,
    /// Class index.
    pub class: usize,
    /// Subject index.
    pub subject: usize,
}

/// Validated, indexed domain snapshot.
#[derive(Debug, Clone)]
pub struct DomainModel {
    teachers: Vec<Teacher>,
    rooms: Vec<Room>,
    classes: Vec<ClassGroup>,
    subjects: Vec<Subject>,
    slots: Vec<TimeSlot>,
    requirements: Vec<ResolvedRequirement>,
    lessons: Vec<Lesson>,

    teacher_index: HashMap<String, usize>,
    room_index: HashMap<String, usize>,
    class_index: HashMap<String, usize>,
    subject_index: HashMap<String, usize>,
    slot_index: HashMap<String, usize>,

    slot_day: Vec<usize>,
    prev_slot: Vec<Option<usize>>,
    next_slot: Vec<Option<usize>>,
    /// teacher × slot
    teacher_available: Vec<bool>,
    /// teacher × subject
    teacher_qualified: Vec<bool>,
    /// room × day
    room_open: Vec<bool>,
    /// class × day
    class_forbidden_day: Vec<bool>,
    /// requirement × room
    room_eligible: Vec<bool>,
    /// teacher × slot
    teacher_slot_penalty: Vec<u8>,
    /// class × slot
    class_slot_penalty: Vec<u8>,
    /// subject × slot
    subject_slot_penalty: Vec<u8>,
    /// Active rooms, indexed by [theory, practical].
    rooms_by_type: [Vec<usize>; 2],
}

fn index_by_id<T>(items: &[T], id: impl Fn(&T) -> &str) -> HashMap<String, usize> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| (id(item).to_string(), i))
        .collect()
}

fn type_slot(room_type: RoomType) -> usize {
    match room_type {
        RoomType::Theory => 0,
        RoomType::Practical => 1,
    }
}

impl DomainModel {
    /// Validates a snapshot and builds all lookup indices.
    ///
    /// # Errors
    /// [`EngineError::InvalidDomain`] with every validation problem found.
    pub fn build(snapshot: DomainSnapshot) -> Result<Self, EngineError> {
        validate_snapshot(&snapshot).map_err(EngineError::InvalidDomain)?;

        let DomainSnapshot {
            teachers,
            rooms,
            classes,
            subjects,
            time_slots: slots,
            requirements,
        } = snapshot;

        let teacher_index = index_by_id(&teachers, |t| &t.id);
        let room_index = index_by_id(&rooms, |r| &r.id);
        let class_index = index_by_id(&classes, |c| &c.id);
        let subject_index = index_by_id(&subjects, |s| &s.id);
        let slot_index = index_by_id(&slots, |s| &s.id);

        let requirements = if requirements.is_empty() {
            Requirement::derive_curriculum(&classes, &subjects)
        } else {
            requirements
        };
        // Validation guarantees both lookups succeed.
        let requirements: Vec<ResolvedRequirement> = requirements
            .iter()
            .filter(|r| r.hours > 0)
            .filter_map(|r| {
                Some(ResolvedRequirement {
                    class: *class_index.get(&r.class_id)?,
                    subject: *subject_index.get(&r.subject_id)?,
                    hours: r.hours,
                })
            })
            .collect();

        let lessons: Vec<Lesson> = requirements
            .iter()
            .enumerate()
            .flat_map(|(i, r)| {
                (0..r.hours).map(move |_| Lesson {
                    requirement: i,
                    class: r.class,
                    subject: r.subject,
                })
            })
            .collect();

        let n_slots = slots.len();
        let slot_day: Vec<usize> = slots.iter().map(|s| s.day.index()).collect();
        let by_position: HashMap<(Day, u32), usize> = slots
            .iter()
            .enumerate()
            .map(|(i, s)| ((s.day, s.position), i))
            .collect();
        let prev_slot = slots
            .iter()
            .map(|s| {
                s.position
                    .checked_sub(1)
                    .and_then(|p| by_position.get(&(s.day, p)).copied())
            })
            .collect();
        let next_slot = slots
            .iter()
            .map(|s| {
                s.position
                    .checked_add(1)
                    .and_then(|p| by_position.get(&(s.day, p)).copied())
            })
            .collect();

        let mut teacher_available = Vec::with_capacity(teachers.len() * n_slots);
        let mut teacher_slot_penalty = Vec::with_capacity(teachers.len() * n_slots);
        for teacher in &teachers {
            for slot in &slots {
                teacher_available.push(teacher.is_available_in(&slot.id));
                teacher_slot_penalty.push(teacher.preferences.mismatches(slot, false));
            }
        }

        let mut teacher_qualified = Vec::with_capacity(teachers.len() * subjects.len());
        for teacher in &teachers {
            for subject in &subjects {
                teacher_qualified.push(teacher.can_teach(&subject.id));
            }
        }

        let mut room_open = Vec::with_capacity(rooms.len() * Day::COUNT);
        for room in &rooms {
            room_open.extend(Day::ALL.iter().map(|d| room.is_open_on(*d)));
        }

        let mut class_forbidden_day = Vec::with_capacity(classes.len() * Day::COUNT);
        let mut class_slot_penalty = Vec::with_capacity(classes.len() * n_slots);
        for class in &classes {
            class_forbidden_day.extend(Day::ALL.iter().map(|d| class.forbids_day(*d)));
            class_slot_penalty.extend(slots.iter().map(|s| class.slot_mismatches(s)));
        }

        let mut subject_slot_penalty = Vec::with_capacity(subjects.len() * n_slots);
        for subject in &subjects {
            subject_slot_penalty.extend(slots.iter().map(|s| subject.preferences.mismatches(s, false)));
        }

        let mut room_eligible = Vec::with_capacity(requirements.len() * rooms.len());
        for req in &requirements {
            let class = &classes[req.class];
            let subject = &subjects[req.subject];
            room_eligible.extend(rooms.iter().map(|r| subject.accepts_room(r, class)));
        }

        let mut rooms_by_type: [Vec<usize>; 2] = [Vec::new(), Vec::new()];
        for (i, room) in rooms.iter().enumerate() {
            if room.active {
                rooms_by_type[type_slot(room.room_type)].push(i);
            }
        }

        Ok(Self {
            teachers,
            rooms,
            classes,
            subjects,
            slots,
            requirements,
            lessons,
            teacher_index,
            room_index,
            class_index,
            subject_index,
            slot_index,
            slot_day,
            prev_slot,
            next_slot,
            teacher_available,
            teacher_qualified,
            room_open,
            class_forbidden_day,
            room_eligible,
            teacher_slot_penalty,
            class_slot_penalty,
            subject_slot_penalty,
            rooms_by_type,
        })
    }

    // ---- entity access ----

    pub fn teachers(&self) -> &[Teacher] {
        &self.teachers
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn classes(&self) -> &[ClassGroup] {
        &self.classes
    }

    pub fn subjects(&self) -> &[Subject] {
        &self.subjects
    }

    pub fn slots(&self) -> &[TimeSlot] {
        &self.slots
    }

    /// Resolved curriculum (zero-hour entries dropped).
    pub fn requirements(&self) -> &[ResolvedRequirement] {
        &self.requirements
    }

    /// Lessons in gene order: requirement order, then hour.
    pub fn lessons(&self) -> &[Lesson] {
        &self.lessons
    }

    /// Total number of lessons (genes) to place.
    pub fn lesson_count(&self) -> usize {
        self.lessons.len()
    }

    pub fn teacher_idx(&self, id: &str) -> Option<usize> {
        self.teacher_index.get(id).copied()
    }

    pub fn room_idx(&self, id: &str) -> Option<usize> {
        self.room_index.get(id).copied()
    }

    pub fn class_idx(&self, id: &str) -> Option<usize> {
        self.class_index.get(id).copied()
    }

    pub fn subject_idx(&self, id: &str) -> Option<usize> {
        self.subject_index.get(id).copied()
    }

    pub fn slot_idx(&self, id: &str) -> Option<usize> {
        self.slot_index.get(id).copied()
    }

    // ---- derived indices ----

    /// Day index of a slot.
    #[inline]
    pub fn slot_day(&self, slot: usize) -> usize {
        self.slot_day[slot]
    }

    /// Slot directly before `slot` on the same day.
    #[inline]
    pub fn prev_slot(&self, slot: usize) -> Option<usize> {
        self.prev_slot[slot]
    }

    /// Slot directly after `slot` on the same day.
    #[inline]
    pub fn next_slot(&self, slot: usize) -> Option<usize> {
        self.next_slot[slot]
    }

    #[inline]
    pub fn is_teacher_available(&self, teacher: usize, slot: usize) -> bool {
        self.teacher_available[teacher * self.slots.len() + slot]
    }

    #[inline]
    pub fn is_teacher_qualified(&self, teacher: usize, subject: usize) -> bool {
        self.teacher_qualified[teacher * self.subjects.len() + subject]
    }

    #[inline]
    pub fn is_room_open(&self, room: usize, day: usize) -> bool {
        self.room_open[room * Day::COUNT + day]
    }

    #[inline]
    pub fn is_day_forbidden(&self, class: usize, day: usize) -> bool {
        self.class_forbidden_day[class * Day::COUNT + day]
    }

    /// Whether `room` satisfies type/capacity/department for a requirement.
    #[inline]
    pub fn is_room_eligible(&self, requirement: usize, room: usize) -> bool {
        self.room_eligible[requirement * self.rooms.len() + room]
    }

    #[inline]
    pub fn teacher_slot_penalty(&self, teacher: usize, slot: usize) -> u8 {
        self.teacher_slot_penalty[teacher * self.slots.len() + slot]
    }

    #[inline]
    pub fn class_slot_penalty(&self, class: usize, slot: usize) -> u8 {
        self.class_slot_penalty[class * self.slots.len() + slot]
    }

    #[inline]
    pub fn subject_slot_penalty(&self, subject: usize, slot: usize) -> u8 {
        self.subject_slot_penalty[subject * self.slots.len() + slot]
    }

    /// Active rooms of a type.
    pub fn rooms_of_type(&self, room_type: RoomType) -> &[usize] {
        &self.rooms_by_type[type_slot(room_type)]
    }
}

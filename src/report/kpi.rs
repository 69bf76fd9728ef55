//! Timetable quality metrics (KPIs).
//!
//! Computes workload and utilization indicators from a decoded
//! timetable and its domain.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Teaching load | Lessons per teacher per week, against the weekly limit |
//! | Teaching days | Distinct days a teacher teaches |
//! | Room utilization | Lessons held / slots the room is open |
//! | Avg utilization | Mean utilization over active rooms |

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::models::{Day, DomainModel, Timetable};

/// Weekly workload of one teacher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeachingLoad {
    pub teacher_id: String,
    /// Lessons per week.
    pub lessons: u32,
    /// Configured weekly limit, if any.
    pub max_per_week: Option<u32>,
    /// Distinct teaching days.
    pub days: u32,
}

impl TeachingLoad {
    /// Whether the weekly limit is exceeded.
    pub fn is_overloaded(&self) -> bool {
        self.max_per_week.is_some_and(|max| self.lessons > max)
    }
}

/// Usage of one room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomUtilization {
    pub room_id: String,
    /// Lessons held.
    pub lessons: u32,
    /// Slots in which the room is open.
    pub open_slots: u32,
    /// `lessons / open_slots` (0 when never open).
    pub utilization: f64,
}

/// Timetable performance indicators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimetableKpi {
    /// One entry per teacher, in domain order.
    pub teaching_load: Vec<TeachingLoad>,
    /// One entry per active room, in domain order.
    pub room_utilization: Vec<RoomUtilization>,
    /// Mean room utilization (0.0..1.0 unless rooms are double booked).
    pub avg_room_utilization: f64,
    /// Teachers above their weekly limit.
    pub overloaded_teachers: usize,
}

impl TimetableKpi {
    /// Computes KPIs from a timetable and its domain.
    pub fn calculate(timetable: &Timetable, domain: &DomainModel) -> Self {
        let mut teacher_lessons: BTreeMap<&str, u32> = BTreeMap::new();
        let mut teacher_days: BTreeMap<&str, BTreeSet<Day>> = BTreeMap::new();
        let mut room_lessons: BTreeMap<&str, u32> = BTreeMap::new();
        for e in &timetable.entries {
            *teacher_lessons.entry(e.teacher_id.as_str()).or_insert(0) += 1;
            teacher_days.entry(e.teacher_id.as_str()).or_default().insert(e.day);
            *room_lessons.entry(e.room_id.as_str()).or_insert(0) += 1;
        }

        let teaching_load: Vec<TeachingLoad> = domain
            .teachers()
            .iter()
            .map(|t| TeachingLoad {
                teacher_id: t.id.clone(),
                lessons: teacher_lessons.get(t.id.as_str()).copied().unwrap_or(0),
                max_per_week: t.max_hours_per_week,
                days: teacher_days
                    .get(t.id.as_str())
                    .map_or(0, |d| d.len() as u32),
            })
            .collect();

        let room_utilization: Vec<RoomUtilization> = domain
            .rooms()
            .iter()
            .filter(|r| r.active)
            .map(|r| {
                let open_slots = domain.slots().iter().filter(|s| r.is_open_on(s.day)).count() as u32;
                let lessons = room_lessons.get(r.id.as_str()).copied().unwrap_or(0);
                let utilization = if open_slots == 0 {
                    0.0
                } else {
                    f64::from(lessons) / f64::from(open_slots)
                };
                RoomUtilization {
                    room_id: r.id.clone(),
                    lessons,
                    open_slots,
                    utilization,
                }
            })
            .collect();

        let avg_room_utilization = if room_utilization.is_empty() {
            0.0
        } else {
            room_utilization.iter().map(|r| r.utilization).sum::<f64>()
                / room_utilization.len() as f64
        };
        let overloaded_teachers = teaching_load.iter().filter(|t| t.is_overloaded()).count();

        Self {
            teaching_load,
            room_utilization,
            avg_room_utilization,
            overloaded_teachers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ClassGroup, DomainSnapshot, Room, Subject, Teacher, TimeSlot, TimetableEntry};

    fn domain() -> DomainModel {
        DomainModel::build(
            DomainSnapshot::new()
                .with_teacher(Teacher::new("T1").with_subject("MATH").with_max_hours_per_week(1))
                .with_teacher(Teacher::new("T2").with_subject("MATH"))
                .with_room(Room::theory("R1"))
                .with_room(Room::theory("R2").open_on(Day::Tuesday))
                .with_room(Room::theory("OLD").with_active(false))
                .with_class(ClassGroup::new("C1", 10, "TKJ"))
                .with_subject(Subject::new("MATH", 2))
                .with_slot(TimeSlot::new("MON1", Day::Monday, 1))
                .with_slot(TimeSlot::new("MON2", Day::Monday, 2))
                .with_slot(TimeSlot::new("TUE1", Day::Tuesday, 1))
                .with_slot(TimeSlot::new("TUE2", Day::Tuesday, 2)),
        )
        .unwrap()
    }

    fn entry(lesson: usize, teacher: &str, room: &str, slot: &str, day: Day) -> TimetableEntry {
        TimetableEntry {
            lesson,
            class_id: "C1".into(),
            subject_id: "MATH".into(),
            teacher_id: teacher.into(),
            room_id: room.into(),
            slot_id: slot.into(),
            day,
            position: 1,
        }
    }

    #[test]
    fn test_kpi_basic() {
        let mut t = Timetable::new();
        t.add_entry(entry(0, "T1", "R1", "MON1", Day::Monday));
        t.add_entry(entry(1, "T1", "R2", "TUE1", Day::Tuesday));

        let kpi = TimetableKpi::calculate(&t, &domain());
        assert_eq!(kpi.teaching_load.len(), 2);
        let t1 = &kpi.teaching_load[0];
        assert_eq!(t1.lessons, 2);
        assert_eq!(t1.days, 2);
        assert!(t1.is_overloaded());
        assert_eq!(kpi.teaching_load[1].lessons, 0);
        assert_eq!(kpi.overloaded_teachers, 1);

        // Inactive room excluded.
        assert_eq!(kpi.room_utilization.len(), 2);
        // R1: 1 of 4 open slots; R2: 1 of 2 (Tuesday only).
        assert!((kpi.room_utilization[0].utilization - 0.25).abs() < 1e-10);
        assert_eq!(kpi.room_utilization[1].open_slots, 2);
        assert!((kpi.room_utilization[1].utilization - 0.5).abs() < 1e-10);
        assert!((kpi.avg_room_utilization - 0.375).abs() < 1e-10);
    }

    #[test]
    fn test_kpi_empty() {
        let kpi = TimetableKpi::calculate(&Timetable::new(), &domain());
        assert_eq!(kpi.overloaded_teachers, 0);
        assert!((kpi.avg_room_utilization - 0.0).abs() < 1e-10);
    }
}

//! Fitness evaluation.
//!
//! Scores a gene vector in two linear passes over the lessons using the
//! dense tables of [`DomainModel`] and a reusable [`EvalScratch`]:
//!
//! 1. occupancy counts per (teacher|room|class, slot), per-day and
//!    per-week loads, and every per-lesson hard/soft rule;
//! 2. adjacency rules (block splits, back-to-back subjects, consecutive
//!    teacher hours), visited once per occupied cell via its first
//!    occupant.
//!
//! Room imbalance is computed per room type from the usage counters.
//! The scratch is cleared by walking the same genes again, so a call
//! costs O(lessons + rooms) regardless of timetable dimensions.
//!
//! # Fitness
//! With `G` lessons, threshold `T`, hard penalty `H`, weights `w` and
//! per-lesson caps `c`:
//!
//! | Case | Fitness |
//! |------|---------|
//! | no lessons | 1 |
//! | feasible | `T + (1 − T)(1 − soft / (G·Σ w·c))` |
//! | infeasible | `T (1 − (H·hard + soft) / (G(8H + Σ w·c)))` |
//!
//! so every feasible timetable outranks every infeasible one.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::constraints::{
    ConstraintKind, HardConstraint, HardCounts, SoftConstraint, SoftCounts, SoftWeights,
    Violation, ViolationSink,
};
use crate::engine::EngineConfig;
use crate::ga::Gene;
use crate::models::{Day, DomainModel, RoomType};

const NONE: usize = usize::MAX;

/// Evaluation result for one chromosome.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitnessReport {
    /// Normalized score in `[0, 1]`; higher is better.
    pub fitness: f64,
    /// Raw penalty: `H · hard + Σ w · soft`.
    pub penalty: f64,
    pub hard: HardCounts,
    pub soft: SoftCounts,
}

impl FitnessReport {
    pub fn hard_violations(&self) -> u32 {
        self.hard.total()
    }

    pub fn soft_violations(&self) -> u32 {
        self.soft.total()
    }

    /// Whether no hard constraint is broken.
    pub fn is_feasible(&self) -> bool {
        self.hard.total() == 0
    }
}

/// Reusable per-worker buffers for [`ConstraintEvaluator::evaluate`].
#[derive(Debug, Clone)]
pub struct EvalScratch {
    teacher_slot: Vec<u32>,
    teacher_first: Vec<usize>,
    room_slot: Vec<u32>,
    class_slot: Vec<u32>,
    class_first: Vec<usize>,
    teacher_day: Vec<u32>,
    class_day: Vec<u32>,
    teacher_week: Vec<u32>,
    room_usage: Vec<u32>,
}

impl EvalScratch {
    /// Allocates buffers sized for a domain.
    pub fn new(domain: &DomainModel) -> Self {
        let s = domain.slots().len();
        let t = domain.teachers().len();
        let r = domain.rooms().len();
        let c = domain.classes().len();
        Self {
            teacher_slot: vec![0; t * s],
            teacher_first: vec![NONE; t * s],
            room_slot: vec![0; r * s],
            class_slot: vec![0; c * s],
            class_first: vec![NONE; c * s],
            teacher_day: vec![0; t * Day::COUNT],
            class_day: vec![0; c * Day::COUNT],
            teacher_week: vec![0; t],
            room_usage: vec![0; r],
        }
    }

    fn clear(&mut self, domain: &DomainModel, genes: &[Gene]) {
        let s = domain.slots().len();
        let lessons = domain.lessons();
        for (gene, lesson) in genes.iter().zip(lessons) {
            let d = domain.slot_day(gene.slot);
            let tc = gene.teacher * s + gene.slot;
            let cc = lesson.class * s + gene.slot;
            self.teacher_slot[tc] = 0;
            self.teacher_first[tc] = NONE;
            self.room_slot[gene.room * s + gene.slot] = 0;
            self.class_slot[cc] = 0;
            self.class_first[cc] = NONE;
            self.teacher_day[gene.teacher * Day::COUNT + d] = 0;
            self.class_day[lesson.class * Day::COUNT + d] = 0;
            self.teacher_week[gene.teacher] = 0;
        }
        self.room_usage.fill(0);
    }
}

/// Scores chromosomes against the hard and soft constraints of a domain.
#[derive(Debug, Clone)]
pub struct ConstraintEvaluator {
    domain: Arc<DomainModel>,
    weights: [f64; SoftConstraint::COUNT],
    hard_penalty: f64,
    feasible_threshold: f64,
    soft_norm: f64,
    total_norm: f64,
}

impl ConstraintEvaluator {
    /// Creates an evaluator with default weights, penalty and threshold.
    pub fn new(domain: Arc<DomainModel>) -> Self {
        let defaults = EngineConfig::default();
        Self::with_params(
            domain,
            &defaults.soft_weights,
            defaults.hard_penalty,
            defaults.feasible_threshold,
        )
    }

    /// Creates an evaluator using the scoring parameters of a run config.
    pub fn from_config(domain: Arc<DomainModel>, config: &EngineConfig) -> Self {
        Self::with_params(
            domain,
            &config.soft_weights,
            config.hard_penalty,
            config.feasible_threshold,
        )
    }

    fn with_params(
        domain: Arc<DomainModel>,
        weights: &SoftWeights,
        hard_penalty: f64,
        feasible_threshold: f64,
    ) -> Self {
        let weights = weights.resolve();
        let lessons = domain.lesson_count() as f64;
        let per_lesson_soft: f64 = SoftConstraint::ALL
            .iter()
            .map(|k| weights[k.index()] * f64::from(k.per_lesson_cap()))
            .sum();
        let soft_norm = lessons * per_lesson_soft;
        let total_norm =
            lessons * (hard_penalty * HardConstraint::COUNT as f64 + per_lesson_soft);
        Self {
            domain,
            weights,
            hard_penalty,
            feasible_threshold,
            soft_norm,
            total_norm,
        }
    }

    pub fn domain(&self) -> &Arc<DomainModel> {
        &self.domain
    }

    pub fn feasible_threshold(&self) -> f64 {
        self.feasible_threshold
    }

    pub fn hard_penalty(&self) -> f64 {
        self.hard_penalty
    }

    /// Effective weight of a soft constraint.
    pub fn weight(&self, kind: SoftConstraint) -> f64 {
        self.weights[kind.index()]
    }

    /// Allocates a scratch buffer for this evaluator's domain.
    pub fn scratch(&self) -> EvalScratch {
        EvalScratch::new(&self.domain)
    }

    /// Scores a gene vector.
    ///
    /// `genes` must be structurally valid for the domain (one gene per
    /// lesson, indices in range).
    pub fn evaluate(&self, genes: &[Gene], scratch: &mut EvalScratch) -> FitnessReport {
        self.evaluate_with(genes, scratch, &mut ())
    }

    /// Scores a gene vector and lists every violation found.
    pub fn explain(&self, genes: &[Gene]) -> (FitnessReport, Vec<Violation>) {
        let mut scratch = self.scratch();
        let mut violations = Vec::new();
        let report = self.evaluate_with(genes, &mut scratch, &mut violations);
        (report, violations)
    }

    /// Maps violation counts to the normalized fitness score.
    pub fn score(&self, hard: &HardCounts, soft: &SoftCounts) -> (f64, f64) {
        let soft_penalty: f64 = SoftConstraint::ALL
            .iter()
            .map(|k| self.weights[k.index()] * f64::from(soft.get(*k)))
            .sum();
        let hard_total = hard.total();
        let penalty = self.hard_penalty * f64::from(hard_total) + soft_penalty;

        if self.domain.lesson_count() == 0 {
            return (1.0, penalty);
        }
        let t = self.feasible_threshold;
        let fitness = if hard_total == 0 {
            let ratio = if self.soft_norm > 0.0 {
                (soft_penalty / self.soft_norm).min(1.0)
            } else {
                0.0
            };
            t + (1.0 - t) * (1.0 - ratio)
        } else {
            let ratio = (penalty / self.total_norm).min(1.0);
            t * (1.0 - ratio)
        };
        (fitness.clamp(0.0, 1.0), penalty)
    }

    /// Scores a gene vector, reporting violations to `sink`.
    pub fn evaluate_with<S: ViolationSink>(
        &self,
        genes: &[Gene],
        scratch: &mut EvalScratch,
        sink: &mut S,
    ) -> FitnessReport {
        let domain = &*self.domain;
        let lessons = domain.lessons();
        debug_assert_eq!(genes.len(), lessons.len());
        let n_slots = domain.slots().len();

        let mut hard = HardCounts::default();
        let mut soft = SoftCounts::default();

        // Pass 1: occupancy and per-lesson rules.
        for (i, (gene, lesson)) in genes.iter().zip(lessons).enumerate() {
            let (t, r, s) = (gene.teacher, gene.room, gene.slot);
            let c = lesson.class;
            let d = domain.slot_day(s);

            let tc = t * n_slots + s;
            if scratch.teacher_slot[tc] > 0 {
                hard.add(HardConstraint::TeacherDoubleBooking, 1);
                sink.record(
                    ConstraintKind::Hard(HardConstraint::TeacherDoubleBooking),
                    Some(i),
                    || {
                        format!(
                            "teacher {} already teaches in slot {}",
                            domain.teachers()[t].id,
                            domain.slots()[s].id
                        )
                    },
                );
            } else {
                scratch.teacher_first[tc] = i;
            }
            scratch.teacher_slot[tc] += 1;

            let rc = r * n_slots + s;
            if scratch.room_slot[rc] > 0 {
                hard.add(HardConstraint::RoomDoubleBooking, 1);
                sink.record(
                    ConstraintKind::Hard(HardConstraint::RoomDoubleBooking),
                    Some(i),
                    || {
                        format!(
                            "room {} already used in slot {}",
                            domain.rooms()[r].id,
                            domain.slots()[s].id
                        )
                    },
                );
            }
            scratch.room_slot[rc] += 1;

            let cc = c * n_slots + s;
            if scratch.class_slot[cc] > 0 {
                hard.add(HardConstraint::ClassDoubleBooking, 1);
                sink.record(
                    ConstraintKind::Hard(HardConstraint::ClassDoubleBooking),
                    Some(i),
                    || {
                        format!(
                            "class {} already has a lesson in slot {}",
                            domain.classes()[c].id,
                            domain.slots()[s].id
                        )
                    },
                );
            } else {
                scratch.class_first[cc] = i;
            }
            scratch.class_slot[cc] += 1;

            if !domain.is_teacher_available(t, s) {
                hard.add(HardConstraint::TeacherUnavailable, 1);
                sink.record(
                    ConstraintKind::Hard(HardConstraint::TeacherUnavailable),
                    Some(i),
                    || {
                        format!(
                            "teacher {} is not available in slot {}",
                            domain.teachers()[t].id,
                            domain.slots()[s].id
                        )
                    },
                );
            }

            if !domain.is_teacher_qualified(t, lesson.subject) {
                hard.add(HardConstraint::TeacherUnqualified, 1);
                sink.record(
                    ConstraintKind::Hard(HardConstraint::TeacherUnqualified),
                    Some(i),
                    || {
                        format!(
                            "teacher {} is not qualified for {}",
                            domain.teachers()[t].id,
                            domain.subjects()[lesson.subject].id
                        )
                    },
                );
            }

            if !domain.is_room_eligible(lesson.requirement, r) || !domain.is_room_open(r, d) {
                hard.add(HardConstraint::RoomIneligible, 1);
                sink.record(
                    ConstraintKind::Hard(HardConstraint::RoomIneligible),
                    Some(i),
                    || {
                        format!(
                            "room {} cannot host {} for class {} in slot {}",
                            domain.rooms()[r].id,
                            domain.subjects()[lesson.subject].id,
                            domain.classes()[c].id,
                            domain.slots()[s].id
                        )
                    },
                );
            }

            if domain.is_day_forbidden(c, d) {
                hard.add(HardConstraint::ClassAvoidedDay, 1);
                sink.record(
                    ConstraintKind::Hard(HardConstraint::ClassAvoidedDay),
                    Some(i),
                    || {
                        format!(
                            "class {} has no lessons on {}",
                            domain.classes()[c].id,
                            domain.slots()[s].day
                        )
                    },
                );
            }

            let cd = c * Day::COUNT + d;
            scratch.class_day[cd] += 1;
            if let Some(max) = domain.classes()[c].max_daily_hours {
                if scratch.class_day[cd] > max {
                    hard.add(HardConstraint::ClassDailyLimit, 1);
                    sink.record(
                        ConstraintKind::Hard(HardConstraint::ClassDailyLimit),
                        Some(i),
                        || {
                            format!(
                                "class {} exceeds {} lessons on {}",
                                domain.classes()[c].id,
                                max,
                                domain.slots()[s].day
                            )
                        },
                    );
                }
            }

            let teacher = &domain.teachers()[t];
            let td = t * Day::COUNT + d;
            scratch.teacher_day[td] += 1;
            if let Some(max) = teacher.max_hours_per_day {
                if scratch.teacher_day[td] > max {
                    soft.add(SoftConstraint::TeacherDailyLimit, 1);
                    sink.record(
                        ConstraintKind::Soft(SoftConstraint::TeacherDailyLimit),
                        Some(i),
                        || {
                            format!(
                                "teacher {} exceeds {} lessons on {}",
                                teacher.id,
                                max,
                                domain.slots()[s].day
                            )
                        },
                    );
                }
            }

            scratch.teacher_week[t] += 1;
            if let Some(max) = teacher.max_hours_per_week {
                if scratch.teacher_week[t] > max {
                    soft.add(SoftConstraint::TeacherWeeklyLoad, 1);
                    sink.record(
                        ConstraintKind::Soft(SoftConstraint::TeacherWeeklyLoad),
                        Some(i),
                        || format!("teacher {} exceeds {} lessons per week", teacher.id, max),
                    );
                }
            }

            scratch.room_usage[r] += 1;

            let tp = domain.teacher_slot_penalty(t, s);
            if tp > 0 {
                soft.add(SoftConstraint::TeacherPreference, u32::from(tp));
                sink.record(
                    ConstraintKind::Soft(SoftConstraint::TeacherPreference),
                    Some(i),
                    || format!("slot {} misses preferences of teacher {}", domain.slots()[s].id, teacher.id),
                );
            }
            let cp = domain.class_slot_penalty(c, s);
            if cp > 0 {
                soft.add(SoftConstraint::ClassPreference, u32::from(cp));
                sink.record(
                    ConstraintKind::Soft(SoftConstraint::ClassPreference),
                    Some(i),
                    || {
                        format!(
                            "slot {} misses preferences of class {}",
                            domain.slots()[s].id,
                            domain.classes()[c].id
                        )
                    },
                );
            }
            let sp = domain.subject_slot_penalty(lesson.subject, s);
            if sp > 0 {
                soft.add(SoftConstraint::SubjectPreference, u32::from(sp));
                sink.record(
                    ConstraintKind::Soft(SoftConstraint::SubjectPreference),
                    Some(i),
                    || {
                        format!(
                            "slot {} misses preferences of subject {}",
                            domain.slots()[s].id,
                            domain.subjects()[lesson.subject].id
                        )
                    },
                );
            }
        }

        // Pass 2: runs of adjacent slots, visited from their first cell.
        for (i, (gene, lesson)) in genes.iter().zip(lessons).enumerate() {
            let (t, s) = (gene.teacher, gene.slot);

            let teacher = &domain.teachers()[t];
            if let Some(max) = teacher.max_consecutive_hours {
                let base = t * n_slots;
                let starts_run = domain
                    .prev_slot(s)
                    .map_or(true, |p| scratch.teacher_slot[base + p] == 0);
                if scratch.teacher_first[base + s] == i && starts_run {
                    let mut len = 1;
                    let mut cur = s;
                    while let Some(n) = domain.next_slot(cur) {
                        if scratch.teacher_slot[base + n] == 0 {
                            break;
                        }
                        len += 1;
                        cur = n;
                    }
                    if len > max {
                        soft.add(SoftConstraint::TeacherConsecutiveLimit, len - max);
                        sink.record(
                            ConstraintKind::Soft(SoftConstraint::TeacherConsecutiveLimit),
                            Some(i),
                            || {
                                format!(
                                    "teacher {} teaches {} consecutive lessons from slot {} (max {})",
                                    teacher.id,
                                    len,
                                    domain.slots()[s].id,
                                    max
                                )
                            },
                        );
                    }
                }
            }

            let c = lesson.class;
            let base = c * n_slots;
            if scratch.class_first[base + s] != i {
                continue;
            }
            let subject_at = |slot: usize| -> Option<usize> {
                match scratch.class_first[base + slot] {
                    NONE => None,
                    first => Some(lessons[first].subject),
                }
            };
            let subj = lesson.subject;
            let starts_run = domain
                .prev_slot(s)
                .map_or(true, |p| subject_at(p) != Some(subj));
            if !starts_run {
                continue;
            }
            let mut len: u32 = 1;
            let mut cur = s;
            while let Some(n) = domain.next_slot(cur) {
                if subject_at(n) != Some(subj) {
                    break;
                }
                len += 1;
                cur = n;
            }

            let subject = &domain.subjects()[subj];
            let class = &domain.classes()[c];
            if subject.block_length > 1 && len % subject.block_length != 0 {
                soft.add(SoftConstraint::BlockSplit, 1);
                sink.record(
                    ConstraintKind::Soft(SoftConstraint::BlockSplit),
                    Some(i),
                    || {
                        format!(
                            "class {} has a run of {} {} lessons from slot {} (block of {})",
                            class.id,
                            len,
                            subject.id,
                            domain.slots()[s].id,
                            subject.block_length
                        )
                    },
                );
            }
            if class.avoid_consecutive_same_subject && subject.block_length <= 1 && len > 1 {
                soft.add(SoftConstraint::SameSubjectBackToBack, len - 1);
                sink.record(
                    ConstraintKind::Soft(SoftConstraint::SameSubjectBackToBack),
                    Some(i),
                    || {
                        format!(
                            "class {} has {} back-to-back {} lessons from slot {}",
                            class.id,
                            len,
                            subject.id,
                            domain.slots()[s].id
                        )
                    },
                );
            }
        }

        for room_type in [RoomType::Theory, RoomType::Practical] {
            let rooms = domain.rooms_of_type(room_type);
            if rooms.is_empty() {
                continue;
            }
            let used: u32 = rooms.iter().map(|r| scratch.room_usage[*r]).sum();
            let fair = used.div_ceil(rooms.len() as u32);
            for &r in rooms {
                let usage = scratch.room_usage[r];
                if usage > fair {
                    soft.add(SoftConstraint::RoomImbalance, usage - fair);
                    sink.record(
                        ConstraintKind::Soft(SoftConstraint::RoomImbalance),
                        None,
                        || {
                            format!(
                                "room {} hosts {} lessons (fair share {})",
                                domain.rooms()[r].id,
                                usage,
                                fair
                            )
                        },
                    );
                }
            }
        }

        scratch.clear(domain, genes);

        let (fitness, penalty) = self.score(&hard, &soft);
        FitnessReport {
            fitness,
            penalty,
            hard,
            soft,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ClassGroup, DomainSnapshot, Requirement, Room, Subject, Teacher, TimeSlot};

    fn monday(n: u32) -> DomainSnapshot {
        let mut snap = DomainSnapshot::new();
        for p in 1..=n {
            snap = snap.with_slot(TimeSlot::new(format!("MON{p}"), Day::Monday, p));
        }
        snap
    }

    fn evaluator(snap: DomainSnapshot) -> ConstraintEvaluator {
        ConstraintEvaluator::new(Arc::new(DomainModel::build(snap).unwrap()))
    }

    fn eval(ev: &ConstraintEvaluator, genes: &[(usize, usize, usize)]) -> FitnessReport {
        let genes: Vec<Gene> = genes.iter().map(|&(t, r, s)| Gene::new(t, r, s)).collect();
        let mut scratch = ev.scratch();
        ev.evaluate(&genes, &mut scratch)
    }

    fn one_class(hours: u32, slots: u32) -> DomainSnapshot {
        monday(slots)
            .with_teacher(Teacher::new("T1").with_subject("MATH"))
            .with_room(Room::theory("R1"))
            .with_class(ClassGroup::new("C1", 10, "TKJ"))
            .with_subject(Subject::new("MATH", hours))
    }

    #[test]
    fn test_feasible_timetable() {
        let ev = evaluator(one_class(2, 2));
        let report = eval(&ev, &[(0, 0, 0), (0, 0, 1)]);
        assert!(report.is_feasible());
        assert_eq!(report.soft_violations(), 0);
        assert!((report.fitness - 1.0).abs() < 1e-12);
        assert_eq!(report.penalty, 0.0);
    }

    #[test]
    fn test_teacher_double_booking() {
        let snap = monday(1)
            .with_teacher(Teacher::new("T1").with_subject("MATH"))
            .with_room(Room::theory("R1"))
            .with_room(Room::theory("R2"))
            .with_class(ClassGroup::new("C1", 10, "TKJ"))
            .with_class(ClassGroup::new("C2", 10, "TKJ"))
            .with_subject(Subject::new("MATH", 1));
        let ev = evaluator(snap);
        let report = eval(&ev, &[(0, 0, 0), (0, 1, 0)]);
        assert_eq!(report.hard_violations(), 1);
        assert_eq!(report.hard.get(HardConstraint::TeacherDoubleBooking), 1);
        assert!(report.fitness < ev.feasible_threshold());
        assert!(report.fitness >= 0.0);
    }

    #[test]
    fn test_room_and_class_double_booking() {
        let snap = one_class(3, 1).with_teacher(Teacher::new("T2").with_subject("MATH"));
        let ev = evaluator(snap);
        // Three lessons of one class in one slot and room, two teachers.
        let report = eval(&ev, &[(0, 0, 0), (1, 0, 0), (1, 0, 0)]);
        assert_eq!(report.hard.get(HardConstraint::RoomDoubleBooking), 2);
        assert_eq!(report.hard.get(HardConstraint::ClassDoubleBooking), 2);
        assert_eq!(report.hard.get(HardConstraint::TeacherDoubleBooking), 1);
    }

    #[test]
    fn test_availability_and_qualification() {
        let snap = monday(2)
            .with_teacher(Teacher::new("T1").with_subject("MATH").unavailable_in("MON1"))
            .with_teacher(Teacher::new("T2"))
            .with_room(Room::theory("R1"))
            .with_class(ClassGroup::new("C1", 10, "TKJ"))
            .with_subject(Subject::new("MATH", 2));
        let ev = evaluator(snap);
        let report = eval(&ev, &[(0, 0, 0), (1, 0, 1)]);
        assert_eq!(report.hard.get(HardConstraint::TeacherUnavailable), 1);
        assert_eq!(report.hard.get(HardConstraint::TeacherUnqualified), 1);
    }

    #[test]
    fn test_room_ineligible() {
        let snap = one_class(2, 2)
            .with_room(Room::practical("LAB"))
            .with_room(Room::theory("FRI").open_on(Day::Friday));
        let ev = evaluator(snap);
        let report = eval(&ev, &[(0, 1, 0), (0, 2, 1)]);
        assert_eq!(report.hard.get(HardConstraint::RoomIneligible), 2);
    }

    #[test]
    fn test_class_day_rules() {
        let snap = monday(3)
            .with_teacher(Teacher::new("T1").with_subject("MATH"))
            .with_room(Room::theory("R1"))
            .with_class(
                ClassGroup::new("C1", 10, "TKJ")
                    .with_max_daily_hours(2)
                    .avoids_day(Day::Monday)
                    .with_mandatory_avoidance(),
            )
            .with_subject(Subject::new("MATH", 3));
        let ev = evaluator(snap);
        let report = eval(&ev, &[(0, 0, 0), (0, 0, 1), (0, 0, 2)]);
        assert_eq!(report.hard.get(HardConstraint::ClassAvoidedDay), 3);
        assert_eq!(report.hard.get(HardConstraint::ClassDailyLimit), 1);
        assert_eq!(report.soft.get(SoftConstraint::ClassPreference), 0);
    }

    #[test]
    fn test_block_split() {
        let snap = monday(4)
            .with_teacher(Teacher::new("T1").with_subject("MATH"))
            .with_room(Room::theory("R1"))
            .with_class(ClassGroup::new("C1", 10, "TKJ"))
            .with_subject(Subject::new("MATH", 3).with_block_length(2));
        let ev = evaluator(snap);
        // Runs [1,2] and [4]: only the second breaks the block.
        let report = eval(&ev, &[(0, 0, 0), (0, 0, 1), (0, 0, 3)]);
        assert_eq!(report.soft.get(SoftConstraint::BlockSplit), 1);
        assert!(report.is_feasible());
        assert!(report.fitness < 1.0 && report.fitness >= ev.feasible_threshold());
    }

    #[test]
    fn test_back_to_back() {
        let snap = monday(3)
            .with_teacher(Teacher::new("T1").with_subject("MATH"))
            .with_room(Room::theory("R1"))
            .with_class(ClassGroup::new("C1", 10, "TKJ").avoiding_consecutive_subjects())
            .with_subject(Subject::new("MATH", 3));
        let ev = evaluator(snap);
        let report = eval(&ev, &[(0, 0, 2), (0, 0, 0), (0, 0, 1)]);
        assert_eq!(report.soft.get(SoftConstraint::SameSubjectBackToBack), 2);
    }

    #[test]
    fn test_teacher_limits() {
        let snap = monday(3)
            .with_slot(TimeSlot::new("TUE1", Day::Tuesday, 1))
            .with_teacher(
                Teacher::new("T1")
                    .with_subject("MATH")
                    .with_max_hours_per_day(2)
                    .with_max_consecutive_hours(2)
                    .with_max_hours_per_week(3),
            )
            .with_room(Room::theory("R1"))
            .with_class(ClassGroup::new("C1", 10, "TKJ"))
            .with_subject(Subject::new("MATH", 4));
        let ev = evaluator(snap);
        let report = eval(&ev, &[(0, 0, 0), (0, 0, 1), (0, 0, 2), (0, 0, 3)]);
        assert_eq!(report.soft.get(SoftConstraint::TeacherDailyLimit), 1);
        assert_eq!(report.soft.get(SoftConstraint::TeacherConsecutiveLimit), 1);
        assert_eq!(report.soft.get(SoftConstraint::TeacherWeeklyLoad), 1);
    }

    #[test]
    fn test_preferences() {
        let snap = monday(2)
            .with_teacher(
                Teacher::new("T1")
                    .with_subject("MATH")
                    .prefers_day(Day::Tuesday)
                    .avoids_slot("MON1"),
            )
            .with_room(Room::theory("R1"))
            .with_class(ClassGroup::new("C1", 10, "TKJ").with_preferred_start(2))
            .with_subject(Subject::new("MATH", 1).avoids_day(Day::Monday));
        let ev = evaluator(snap);
        let report = eval(&ev, &[(0, 0, 0)]);
        assert_eq!(report.soft.get(SoftConstraint::TeacherPreference), 2);
        assert_eq!(report.soft.get(SoftConstraint::ClassPreference), 1);
        assert_eq!(report.soft.get(SoftConstraint::SubjectPreference), 1);
    }

    #[test]
    fn test_room_imbalance() {
        let snap = one_class(3, 3).with_room(Room::theory("R2"));
        let ev = evaluator(snap);
        let report = eval(&ev, &[(0, 0, 0), (0, 0, 1), (0, 0, 2)]);
        assert_eq!(report.soft.get(SoftConstraint::RoomImbalance), 1);
        let balanced = eval(&ev, &[(0, 0, 0), (0, 1, 1), (0, 0, 2)]);
        assert_eq!(balanced.soft.get(SoftConstraint::RoomImbalance), 0);
    }

    #[test]
    fn test_feasible_outranks_infeasible() {
        let snap = monday(2)
            .with_teacher(
                Teacher::new("T1")
                    .with_subject("MATH")
                    .prefers_slot("MON2")
                    .avoids_slot("MON1"),
            )
            .with_room(Room::theory("R1"))
            .with_class(ClassGroup::new("C1", 10, "TKJ"))
            .with_subject(Subject::new("MATH", 2));
        let ev = evaluator(snap);
        let feasible = eval(&ev, &[(0, 0, 0), (0, 0, 1)]);
        let infeasible = eval(&ev, &[(0, 0, 1), (0, 0, 1)]);
        assert!(feasible.soft_violations() > 0);
        assert!(!infeasible.is_feasible());
        assert!(feasible.fitness > infeasible.fitness);
    }

    #[test]
    fn test_empty_problem() {
        let ev = evaluator(DomainSnapshot::new());
        let report = eval(&ev, &[]);
        assert_eq!(report.fitness, 1.0);
    }

    #[test]
    fn test_scratch_reuse() {
        let ev = evaluator(one_class(2, 2).with_teacher(Teacher::new("T2").with_subject("MATH")));
        let genes_a = vec![Gene::new(0, 0, 0), Gene::new(0, 0, 0)];
        let genes_b = vec![Gene::new(1, 0, 1), Gene::new(0, 0, 0)];
        let mut scratch = ev.scratch();
        let a1 = ev.evaluate(&genes_a, &mut scratch);
        let b = ev.evaluate(&genes_b, &mut scratch);
        let a2 = ev.evaluate(&genes_a, &mut scratch);
        assert_eq!(a1, a2);
        assert!(b.is_feasible());
        assert!(!a1.is_feasible());
    }

    #[test]
    fn test_explain_lists_hard_violations() {
        let snap = monday(1)
            .with_teacher(Teacher::new("T1").with_subject("MATH"))
            .with_room(Room::theory("R1"))
            .with_class(ClassGroup::new("C1", 10, "TKJ"))
            .with_class(ClassGroup::new("C2", 10, "TKJ"))
            .with_subject(Subject::new("MATH", 1))
            .with_requirement(Requirement::new("C1", "MATH", 1))
            .with_requirement(Requirement::new("C2", "MATH", 1));
        let ev = evaluator(snap);
        let genes = vec![Gene::new(0, 0, 0), Gene::new(0, 0, 0)];
        let (report, violations) = ev.explain(&genes);
        let hard: Vec<_> = violations.iter().filter(|v| v.kind.is_hard()).collect();
        assert_eq!(hard.len() as u32, report.hard_violations());
        assert!(hard.iter().all(|v| v.lesson == Some(1)));
        assert!(hard[0].message.contains("T1"));
    }

    #[test]
    fn test_weights_change_penalty() {
        let snap = one_class(1, 1).with_teacher(Teacher::new("T2"));
        let domain = Arc::new(DomainModel::build(snap).unwrap());
        let config = EngineConfig::default()
            .with_soft_weight(SoftConstraint::ClassPreference, 10.0)
            .with_hard_penalty(100.0);
        let ev = ConstraintEvaluator::from_config(domain, &config);
        // T2 is unqualified: one hard violation.
        let report = eval(&ev, &[(1, 0, 0)]);
        assert_eq!(report.penalty, 100.0);
    }
}

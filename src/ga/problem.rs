//! Timetabling GA problem definition.
//!
//! Bridges the domain model to the GA: precomputes the candidate
//! teachers, rooms and slots of every requirement, builds initial
//! chromosomes and maps chromosomes to and from [`Timetable`]s.

use std::sync::Arc;

use log::warn;
use rand::prelude::IndexedRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::chromosome::{Gene, TimetableChromosome};
use crate::error::EngineError;
use crate::models::{Day, DomainModel, Timetable, TimetableEntry};

/// Rejection-sampling attempts when picking a slot.
const SLOT_TRIES: usize = 8;

/// Valid assignment values for one requirement.
///
/// When a requirement has no valid teacher, room or slot, the list falls
/// back to every entity of that kind so that the lesson can still be
/// placed; the resulting hard violations persist through the run.
#[derive(Debug, Clone, Default)]
pub struct RequirementCandidates {
    /// Qualified teachers.
    pub teachers: Vec<usize>,
    /// Eligible rooms.
    pub rooms: Vec<usize>,
    /// Slots on days the class may attend.
    pub slots: Vec<usize>,
}

/// Why a requirement cannot be satisfied without hard violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InfeasibleReason {
    /// No teacher is qualified for the subject.
    NoQualifiedTeacher,
    /// No active room matches type, capacity and department.
    NoEligibleRoom,
    /// Every slot falls on a mandatory avoided day of the class.
    NoAllowedSlot,
    /// More weekly hours than allowed slots.
    NotEnoughSlots,
}

/// A requirement flagged while building candidate lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfeasibleRequirement {
    pub class_id: String,
    pub subject_id: String,
    pub reason: InfeasibleReason,
}

/// GA problem definition for timetable optimization.
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use u_timetable::ga::TimetableProblem;
/// use u_timetable::models::{DomainModel, DomainSnapshot};
///
/// let domain = Arc::new(DomainModel::build(DomainSnapshot::new()).unwrap());
/// let problem = TimetableProblem::new(domain);
/// let mut rng = rand::rng();
/// let chromosome = problem.create_individual(&mut rng, true);
/// let timetable = problem.decode(&chromosome).unwrap();
/// assert!(timetable.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct TimetableProblem {
    domain: Arc<DomainModel>,
    candidates: Vec<RequirementCandidates>,
    infeasible: Vec<InfeasibleRequirement>,
}

impl TimetableProblem {
    /// Builds candidate lists for every requirement.
    ///
    /// Requirements that cannot be satisfied are logged and listed in
    /// [`infeasible`](Self::infeasible).
    pub fn new(domain: Arc<DomainModel>) -> Self {
        let mut candidates = Vec::with_capacity(domain.requirements().len());
        let mut infeasible = Vec::new();

        for (ri, req) in domain.requirements().iter().enumerate() {
            let class = &domain.classes()[req.class];
            let subject = &domain.subjects()[req.subject];
            let mut flag = |reason: InfeasibleReason| {
                warn!(
                    "requirement {}/{} is infeasible: {:?}",
                    class.id, subject.id, reason
                );
                infeasible.push(InfeasibleRequirement {
                    class_id: class.id.clone(),
                    subject_id: subject.id.clone(),
                    reason,
                });
            };

            let mut teachers: Vec<usize> = (0..domain.teachers().len())
                .filter(|&t| domain.is_teacher_qualified(t, req.subject))
                .collect();
            if teachers.is_empty() {
                flag(InfeasibleReason::NoQualifiedTeacher);
                teachers = (0..domain.teachers().len()).collect();
            }

            let mut rooms: Vec<usize> = (0..domain.rooms().len())
                .filter(|&r| domain.is_room_eligible(ri, r))
                .collect();
            if rooms.is_empty() {
                flag(InfeasibleReason::NoEligibleRoom);
                rooms = (0..domain.rooms().len()).collect();
            }

            let mut slots: Vec<usize> = (0..domain.slots().len())
                .filter(|&s| !domain.is_day_forbidden(req.class, domain.slot_day(s)))
                .collect();
            if slots.is_empty() {
                flag(InfeasibleReason::NoAllowedSlot);
                slots = (0..domain.slots().len()).collect();
            } else if (slots.len() as u32) < req.hours {
                flag(InfeasibleReason::NotEnoughSlots);
            }

            candidates.push(RequirementCandidates {
                teachers,
                rooms,
                slots,
            });
        }

        Self {
            domain,
            candidates,
            infeasible,
        }
    }

    pub fn domain(&self) -> &Arc<DomainModel> {
        &self.domain
    }

    /// Number of genes per chromosome.
    pub fn lesson_count(&self) -> usize {
        self.domain.lesson_count()
    }

    /// Candidate lists of a requirement.
    pub fn candidates(&self, requirement: usize) -> &RequirementCandidates {
        &self.candidates[requirement]
    }

    /// Candidate lists for the requirement behind a gene position.
    pub fn lesson_candidates(&self, lesson: usize) -> &RequirementCandidates {
        &self.candidates[self.domain.lessons()[lesson].requirement]
    }

    /// Requirements flagged as unsatisfiable.
    pub fn infeasible(&self) -> &[InfeasibleRequirement] {
        &self.infeasible
    }

    /// Picks a slot for `teacher` in `room`, favoring slots where the
    /// teacher is available and the room is open.
    pub fn pick_slot<R: Rng>(
        &self,
        requirement: usize,
        teacher: usize,
        room: usize,
        rng: &mut R,
    ) -> usize {
        let slots = &self.candidates[requirement].slots;
        let mut last = slots[0];
        for _ in 0..SLOT_TRIES {
            let s = slots[rng.random_range(0..slots.len())];
            if self.domain.is_teacher_available(teacher, s)
                && self.domain.is_room_open(room, self.domain.slot_day(s))
            {
                return s;
            }
            last = s;
        }
        last
    }

    /// Creates an initial chromosome.
    ///
    /// `greedy` selects the conflict-avoiding construction; otherwise the
    /// chromosome is constrained-random.
    pub fn create_individual<R: Rng>(&self, rng: &mut R, greedy: bool) -> TimetableChromosome {
        if greedy {
            self.create_greedy(rng)
        } else {
            self.create_random(rng)
        }
    }

    /// Random teacher per requirement; random room and slot per lesson.
    fn create_random<R: Rng>(&self, rng: &mut R) -> TimetableChromosome {
        let mut genes = Vec::with_capacity(self.lesson_count());
        for (ri, (req, cand)) in self
            .domain
            .requirements()
            .iter()
            .zip(&self.candidates)
            .enumerate()
        {
            let teacher = *cand.teachers.choose(rng).unwrap_or(&0);
            for _ in 0..req.hours {
                let room = *cand.rooms.choose(rng).unwrap_or(&0);
                let slot = self.pick_slot(ri, teacher, room, rng);
                genes.push(Gene::new(teacher, room, slot));
            }
        }
        TimetableChromosome::new(genes)
    }

    /// Least-loaded teacher per requirement; each lesson goes to the first
    /// slot (from a random offset) where teacher, class and some room are
    /// free and the class's daily limit holds.
    fn create_greedy<R: Rng>(&self, rng: &mut R) -> TimetableChromosome {
        let d = &*self.domain;
        let n_slots = d.slots().len();
        let mut teacher_busy = vec![false; d.teachers().len() * n_slots];
        let mut room_busy = vec![false; d.rooms().len() * n_slots];
        let mut class_busy = vec![false; d.classes().len() * n_slots];
        let mut class_day = vec![0u32; d.classes().len() * Day::COUNT];
        let mut teacher_load = vec![0u32; d.teachers().len()];

        let mut genes = Vec::with_capacity(self.lesson_count());
        for (ri, (req, cand)) in d.requirements().iter().zip(&self.candidates).enumerate() {
            let teacher = cand
                .teachers
                .iter()
                .copied()
                .min_by_key(|&t| teacher_load[t])
                .unwrap_or(0);
            teacher_load[teacher] += req.hours;
            let max_daily = d.classes()[req.class].max_daily_hours.unwrap_or(u32::MAX);

            for _ in 0..req.hours {
                let slot_offset = rng.random_range(0..cand.slots.len());
                let room_offset = rng.random_range(0..cand.rooms.len());
                let mut placed = None;

                for k in 0..cand.slots.len() {
                    let s = cand.slots[(slot_offset + k) % cand.slots.len()];
                    let day = d.slot_day(s);
                    if teacher_busy[teacher * n_slots + s]
                        || !d.is_teacher_available(teacher, s)
                        || class_busy[req.class * n_slots + s]
                        || class_day[req.class * Day::COUNT + day] >= max_daily
                    {
                        continue;
                    }
                    let room = (0..cand.rooms.len())
                        .map(|j| cand.rooms[(room_offset + j) % cand.rooms.len()])
                        .find(|&r| !room_busy[r * n_slots + s] && d.is_room_open(r, day));
                    if let Some(room) = room {
                        placed = Some((room, s));
                        break;
                    }
                }

                let (room, slot) = placed.unwrap_or_else(|| {
                    let room = cand.rooms[room_offset];
                    (room, self.pick_slot(ri, teacher, room, rng))
                });
                teacher_busy[teacher * n_slots + slot] = true;
                room_busy[room * n_slots + slot] = true;
                class_busy[req.class * n_slots + slot] = true;
                class_day[req.class * Day::COUNT + d.slot_day(slot)] += 1;
                genes.push(Gene::new(teacher, room, slot));
            }
        }
        TimetableChromosome::new(genes)
    }

    /// Projects a chromosome into a timetable.
    ///
    /// # Errors
    /// [`EngineError::Encoding`] if the chromosome does not fit the domain.
    pub fn decode(&self, chromosome: &TimetableChromosome) -> Result<Timetable, EngineError> {
        let d = &*self.domain;
        if !chromosome.is_valid(d) {
            return Err(EngineError::Encoding(format!(
                "chromosome with {} genes does not fit a domain of {} lessons",
                chromosome.len(),
                d.lesson_count()
            )));
        }
        let mut timetable = Timetable::new();
        for (i, (gene, lesson)) in chromosome.genes.iter().zip(d.lessons()).enumerate() {
            let slot = &d.slots()[gene.slot];
            timetable.add_entry(TimetableEntry {
                lesson: i,
                class_id: d.classes()[lesson.class].id.clone(),
                subject_id: d.subjects()[lesson.subject].id.clone(),
                teacher_id: d.teachers()[gene.teacher].id.clone(),
                room_id: d.rooms()[gene.room].id.clone(),
                slot_id: slot.id.clone(),
                day: slot.day,
                position: slot.position,
            });
        }
        Ok(timetable)
    }

    /// Maps a timetable back onto the encoding.
    ///
    /// Entries may come in any order but must cover every lesson exactly
    /// once, with class and subject matching the lesson and ids known to
    /// the domain.
    ///
    /// # Errors
    /// [`EngineError::Encoding`] describing the first mismatch.
    pub fn encode(&self, timetable: &Timetable) -> Result<TimetableChromosome, EngineError> {
        let d = &*self.domain;
        let lessons = d.lessons();
        if timetable.len() != lessons.len() {
            return Err(EngineError::Encoding(format!(
                "timetable has {} entries, expected {}",
                timetable.len(),
                lessons.len()
            )));
        }

        let mut genes: Vec<Option<Gene>> = vec![None; lessons.len()];
        for entry in &timetable.entries {
            let lesson = lessons.get(entry.lesson).ok_or_else(|| {
                EngineError::Encoding(format!("unknown lesson index {}", entry.lesson))
            })?;
            if d.classes()[lesson.class].id != entry.class_id
                || d.subjects()[lesson.subject].id != entry.subject_id
            {
                return Err(EngineError::Encoding(format!(
                    "lesson {} is {}/{}, not {}/{}",
                    entry.lesson,
                    d.classes()[lesson.class].id,
                    d.subjects()[lesson.subject].id,
                    entry.class_id,
                    entry.subject_id
                )));
            }
            let unknown = |kind: &str, id: &str| {
                EngineError::Encoding(format!("unknown {kind} '{id}' in lesson {}", entry.lesson))
            };
            let teacher = d
                .teacher_idx(&entry.teacher_id)
                .ok_or_else(|| unknown("teacher", &entry.teacher_id))?;
            let room = d
                .room_idx(&entry.room_id)
                .ok_or_else(|| unknown("room", &entry.room_id))?;
            let slot = d
                .slot_idx(&entry.slot_id)
                .ok_or_else(|| unknown("slot", &entry.slot_id))?;

            let cell = &mut genes[entry.lesson];
            if cell.is_some() {
                return Err(EngineError::Encoding(format!(
                    "lesson {} appears twice",
                    entry.lesson
                )));
            }
            *cell = Some(Gene::new(teacher, room, slot));
        }

        // Length matched and no duplicates, so every lesson is covered.
        Ok(TimetableChromosome::new(genes.into_iter().flatten().collect()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::ConstraintEvaluator;
    use crate::models::{ClassGroup, DomainSnapshot, Requirement, Room, Subject, Teacher, TimeSlot};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn make_domain() -> Arc<DomainModel> {
        domain_with_days(&[Day::Monday, Day::Tuesday])
    }

    fn domain_with_days(days: &[Day]) -> Arc<DomainModel> {
        let mut snap = DomainSnapshot::new()
            .with_teacher(Teacher::new("T1").with_subject("MATH").with_subject("BIO"))
            .with_teacher(Teacher::new("T2").with_subject("MATH"))
            .with_teacher(Teacher::new("T3").with_subject("NET"))
            .with_room(Room::theory("R1"))
            .with_room(Room::theory("R2"))
            .with_room(Room::practical("LAB"))
            .with_class(ClassGroup::new("C1", 10, "TKJ"))
            .with_class(ClassGroup::new("C2", 10, "TKJ"))
            .with_subject(Subject::new("MATH", 3))
            .with_subject(Subject::new("BIO", 2))
            .with_subject(Subject::new("NET", 2).practical());
        for &day in days {
            for p in 1..=4 {
                snap = snap.with_slot(TimeSlot::new(format!("{}{p}", day.name()), day, p));
            }
        }
        Arc::new(DomainModel::build(snap).unwrap())
    }

    #[test]
    fn test_candidates() {
        let problem = TimetableProblem::new(make_domain());
        // C1/MATH
        let c = problem.candidates(0);
        assert_eq!(c.teachers, vec![0, 1]);
        assert_eq!(c.rooms, vec![0, 1]);
        assert_eq!(c.slots.len(), 8);
        // C1/NET
        assert_eq!(problem.candidates(2).rooms, vec![2]);
        assert!(problem.infeasible().is_empty());
    }

    #[test]
    fn test_infeasible_requirement_fallback() {
        let snap = DomainSnapshot::new()
            .with_teacher(Teacher::new("T1"))
            .with_room(Room::theory("R1"))
            .with_class(ClassGroup::new("C1", 10, "TKJ"))
            .with_subject(Subject::new("ART", 2).practical())
            .with_slot(TimeSlot::new("MON1", Day::Monday, 1));
        let problem = TimetableProblem::new(Arc::new(DomainModel::build(snap).unwrap()));
        let reasons: Vec<_> = problem.infeasible().iter().map(|r| r.reason).collect();
        assert_eq!(
            reasons,
            vec![
                InfeasibleReason::NoQualifiedTeacher,
                InfeasibleReason::NoEligibleRoom,
                InfeasibleReason::NotEnoughSlots
            ]
        );
        let mut rng = SmallRng::seed_from_u64(1);
        let ch = problem.create_individual(&mut rng, false);
        assert_eq!(ch.len(), 2);
        assert!(ch.is_valid(problem.domain()));
    }

    #[test]
    fn test_create_individual_valid() {
        let problem = TimetableProblem::new(make_domain());
        let mut rng = SmallRng::seed_from_u64(42);
        for greedy in [false, true] {
            let ch = problem.create_individual(&mut rng, greedy);
            assert_eq!(ch.len(), 14);
            assert!(ch.is_valid(problem.domain()));
            assert!(!ch.is_evaluated());
            // Teachers always come from the candidate list.
            for (i, g) in ch.genes.iter().enumerate() {
                assert!(problem.lesson_candidates(i).teachers.contains(&g.teacher));
                assert!(problem.lesson_candidates(i).rooms.contains(&g.room));
            }
        }
    }

    #[test]
    fn test_greedy_is_conflict_free_when_roomy() {
        let domain = domain_with_days(&[Day::Monday, Day::Tuesday, Day::Wednesday, Day::Thursday]);
        let problem = TimetableProblem::new(domain.clone());
        let evaluator = ConstraintEvaluator::new(domain);
        let mut scratch = evaluator.scratch();
        let mut rng = SmallRng::seed_from_u64(7);
        let ch = problem.create_individual(&mut rng, true);
        let report = evaluator.evaluate(&ch.genes, &mut scratch);
        assert_eq!(report.hard_violations(), 0);
    }

    #[test]
    fn test_decode_encode_round_trip() {
        let problem = TimetableProblem::new(make_domain());
        let mut rng = SmallRng::seed_from_u64(3);
        let ch = problem.create_individual(&mut rng, false);
        let timetable = problem.decode(&ch).unwrap();
        assert_eq!(timetable.len(), ch.len());
        assert_eq!(timetable.entries[0].class_id, "C1");
        assert_eq!(timetable.entries[0].subject_id, "MATH");

        let back = problem.encode(&timetable).unwrap();
        assert_eq!(back.genes, ch.genes);
        assert_eq!(problem.decode(&back).unwrap(), timetable);
    }

    #[test]
    fn test_encode_accepts_any_entry_order() {
        let problem = TimetableProblem::new(make_domain());
        let mut rng = SmallRng::seed_from_u64(5);
        let ch = problem.create_individual(&mut rng, true);
        let mut timetable = problem.decode(&ch).unwrap();
        timetable.entries.reverse();
        assert_eq!(problem.encode(&timetable).unwrap().genes, ch.genes);
    }

    #[test]
    fn test_encode_rejects_bad_input() {
        let problem = TimetableProblem::new(make_domain());
        let mut rng = SmallRng::seed_from_u64(5);
        let ch = problem.create_individual(&mut rng, false);
        let good = problem.decode(&ch).unwrap();

        let mut short = good.clone();
        short.entries.pop();
        assert!(matches!(problem.encode(&short), Err(EngineError::Encoding(_))));

        let mut unknown = good.clone();
        unknown.entries[0].room_id = "NOPE".into();
        assert!(matches!(problem.encode(&unknown), Err(EngineError::Encoding(_))));

        let mut dup = good.clone();
        dup.entries[1].lesson = 0;
        assert!(problem.encode(&dup).is_err());

        let mut wrong_subject = good;
        wrong_subject.entries[0].subject_id = "NET".into();
        assert!(problem.encode(&wrong_subject).is_err());
    }

    #[test]
    fn test_decode_rejects_invalid() {
        let problem = TimetableProblem::new(make_domain());
        let ch = TimetableChromosome::new(vec![Gene::new(0, 0, 0)]);
        assert!(matches!(problem.decode(&ch), Err(EngineError::Encoding(_))));
    }

    #[test]
    fn test_explicit_requirements() {
        let snap = DomainSnapshot::new()
            .with_teacher(Teacher::new("T1").with_subject("MATH"))
            .with_room(Room::theory("R1"))
            .with_class(ClassGroup::new("C1", 10, "TKJ"))
            .with_subject(Subject::new("MATH", 5))
            .with_slot(TimeSlot::new("MON1", Day::Monday, 1))
            .with_slot(TimeSlot::new("MON2", Day::Monday, 2))
            .with_requirement(Requirement::new("C1", "MATH", 2));
        let problem = TimetableProblem::new(Arc::new(DomainModel::build(snap).unwrap()));
        assert_eq!(problem.lesson_count(), 2);
        assert!(problem.infeasible().is_empty());
    }
}

//! Constraint taxonomy, violation counts and weights.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Hard constraint categories.
///
/// Any occurrence makes a timetable infeasible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HardConstraint {
    /// A teacher holds two lessons in the same slot.
    TeacherDoubleBooking,
    /// A room hosts two lessons in the same slot.
    RoomDoubleBooking,
    /// A class attends two lessons in the same slot.
    ClassDoubleBooking,
    /// Lesson outside the teacher's availability.
    TeacherUnavailable,
    /// Teacher not qualified for the subject.
    TeacherUnqualified,
    /// Room type, capacity, department or opening day mismatch.
    RoomIneligible,
    /// Lesson on a mandatory avoided day of the class.
    ClassAvoidedDay,
    /// Lesson beyond the class's daily limit.
    ClassDailyLimit,
}

impl HardConstraint {
    pub const COUNT: usize = 8;

    pub const ALL: [HardConstraint; Self::COUNT] = [
        Self::TeacherDoubleBooking,
        Self::RoomDoubleBooking,
        Self::ClassDoubleBooking,
        Self::TeacherUnavailable,
        Self::TeacherUnqualified,
        Self::RoomIneligible,
        Self::ClassAvoidedDay,
        Self::ClassDailyLimit,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::TeacherDoubleBooking => "teacher double booking",
            Self::RoomDoubleBooking => "room double booking",
            Self::ClassDoubleBooking => "class double booking",
            Self::TeacherUnavailable => "teacher unavailable",
            Self::TeacherUnqualified => "teacher unqualified",
            Self::RoomIneligible => "room ineligible",
            Self::ClassAvoidedDay => "class avoided day",
            Self::ClassDailyLimit => "class daily limit",
        }
    }
}

/// Soft constraint categories.
///
/// Each has a default weight and an upper bound on violations per lesson,
/// which together fix the normalization of the fitness score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SoftConstraint {
    TeacherPreference,
    ClassPreference,
    SubjectPreference,
    /// A same-subject run is not a multiple of the subject's block length.
    BlockSplit,
    /// Adjacent lessons of the same single-period subject.
    SameSubjectBackToBack,
    TeacherDailyLimit,
    TeacherConsecutiveLimit,
    TeacherWeeklyLoad,
    /// Lessons above the fair share of rooms of the same type.
    RoomImbalance,
}

impl SoftConstraint {
    pub const COUNT: usize = 9;

    pub const ALL: [SoftConstraint; Self::COUNT] = [
        Self::TeacherPreference,
        Self::ClassPreference,
        Self::SubjectPreference,
        Self::BlockSplit,
        Self::SameSubjectBackToBack,
        Self::TeacherDailyLimit,
        Self::TeacherConsecutiveLimit,
        Self::TeacherWeeklyLoad,
        Self::RoomImbalance,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::TeacherPreference => "teacher preference",
            Self::ClassPreference => "class preference",
            Self::SubjectPreference => "subject preference",
            Self::BlockSplit => "block split",
            Self::SameSubjectBackToBack => "same subject back to back",
            Self::TeacherDailyLimit => "teacher daily limit",
            Self::TeacherConsecutiveLimit => "teacher consecutive limit",
            Self::TeacherWeeklyLoad => "teacher weekly load",
            Self::RoomImbalance => "room imbalance",
        }
    }

    pub fn default_weight(self) -> f64 {
        match self {
            Self::TeacherPreference => 1.0,
            Self::ClassPreference => 1.0,
            Self::SubjectPreference => 0.5,
            Self::BlockSplit => 2.0,
            Self::SameSubjectBackToBack => 1.5,
            Self::TeacherDailyLimit => 3.0,
            Self::TeacherConsecutiveLimit => 2.0,
            Self::TeacherWeeklyLoad => 3.0,
            Self::RoomImbalance => 0.2,
        }
    }

    /// Maximum violations a single lesson can contribute.
    pub fn per_lesson_cap(self) -> u32 {
        match self {
            // preferred day, avoided day, preferred slot, avoided slot
            Self::TeacherPreference | Self::SubjectPreference => 4,
            // ... plus preferred start position
            Self::ClassPreference => 5,
            _ => 1,
        }
    }
}

/// Severity of a reported violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// Either a hard or a soft constraint category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ConstraintKind {
    Hard(HardConstraint),
    Soft(SoftConstraint),
}

impl ConstraintKind {
    pub fn is_hard(self) -> bool {
        matches!(self, Self::Hard(_))
    }

    pub fn severity(self) -> Severity {
        match self {
            Self::Hard(_) => Severity::High,
            Self::Soft(
                SoftConstraint::TeacherDailyLimit
                | SoftConstraint::TeacherConsecutiveLimit
                | SoftConstraint::TeacherWeeklyLoad
                | SoftConstraint::BlockSplit,
            ) => Severity::Medium,
            Self::Soft(_) => Severity::Low,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Hard(h) => h.label(),
            Self::Soft(s) => s.label(),
        }
    }
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Hard violation counts per category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HardCounts(pub [u32; HardConstraint::COUNT]);

impl HardCounts {
    #[inline]
    pub fn get(&self, kind: HardConstraint) -> u32 {
        self.0[kind.index()]
    }

    #[inline]
    pub fn add(&mut self, kind: HardConstraint, n: u32) {
        self.0[kind.index()] += n;
    }

    pub fn total(&self) -> u32 {
        self.0.iter().sum()
    }

    /// Non-zero categories in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (HardConstraint, u32)> + '_ {
        HardConstraint::ALL
            .iter()
            .map(|k| (*k, self.get(*k)))
            .filter(|(_, n)| *n > 0)
    }
}

/// Soft violation counts per category (unweighted).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoftCounts(pub [u32; SoftConstraint::COUNT]);

impl SoftCounts {
    #[inline]
    pub fn get(&self, kind: SoftConstraint) -> u32 {
        self.0[kind.index()]
    }

    #[inline]
    pub fn add(&mut self, kind: SoftConstraint, n: u32) {
        self.0[kind.index()] += n;
    }

    pub fn total(&self) -> u32 {
        self.0.iter().sum()
    }

    /// Non-zero categories in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (SoftConstraint, u32)> + '_ {
        SoftConstraint::ALL
            .iter()
            .map(|k| (*k, self.get(*k)))
            .filter(|(_, n)| *n > 0)
    }
}

/// Soft constraint weight overrides.
///
/// Categories without an override use [`SoftConstraint::default_weight`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SoftWeights(BTreeMap<SoftConstraint, f64>);

impl SoftWeights {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the weight of one category.
    pub fn with(mut self, kind: SoftConstraint, weight: f64) -> Self {
        self.0.insert(kind, weight);
        self
    }

    /// Effective weight of a category.
    pub fn weight(&self, kind: SoftConstraint) -> f64 {
        self.0
            .get(&kind)
            .copied()
            .unwrap_or_else(|| kind.default_weight())
    }

    /// Effective weights indexed by [`SoftConstraint::index`].
    pub fn resolve(&self) -> [f64; SoftConstraint::COUNT] {
        SoftConstraint::ALL.map(|k| self.weight(k))
    }

    /// Overridden categories and their weights.
    pub fn overrides(&self) -> impl Iterator<Item = (SoftConstraint, f64)> + '_ {
        self.0.iter().map(|(k, w)| (*k, *w))
    }
}

/// A single human-readable constraint violation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    pub kind: ConstraintKind,
    /// Offending lesson, when the violation belongs to one.
    pub lesson: Option<usize>,
    pub message: String,
    pub severity: Severity,
}

/// Receiver for violations found during evaluation.
///
/// The unit sink discards everything, so scoring pays nothing for
/// message formatting.
pub trait ViolationSink {
    fn record<F: FnOnce() -> String>(&mut self, kind: ConstraintKind, lesson: Option<usize>, message: F);
}

impl ViolationSink for () {
    #[inline(always)]
    fn record<F: FnOnce() -> String>(&mut self, _: ConstraintKind, _: Option<usize>, _: F) {}
}

impl ViolationSink for Vec<Violation> {
    fn record<F: FnOnce() -> String>(&mut self, kind: ConstraintKind, lesson: Option<usize>, message: F) {
        self.push(Violation {
            kind,
            lesson,
            message: message(),
            severity: kind.severity(),
        });
    }
}

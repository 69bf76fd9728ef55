//! End-to-end runs over small timetabling instances.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;

use super::{EngineConfig, EvolutionController, RunState, TerminationReason};
use crate::error::EngineError;
use crate::evaluation::{ConstraintEvaluator, ConstraintKind, HardConstraint};
use crate::ga::{InfeasibleReason, InfeasibleRequirement, Population, TimetableProblem};
use crate::models::{
    ClassGroup, Day, DomainModel, DomainSnapshot, Requirement, Room, Subject, Teacher, TimeSlot,
};

fn week(days: &[Day], periods: u32) -> DomainSnapshot {
    let mut snap = DomainSnapshot::new();
    for &day in days {
        for p in 1..=periods {
            snap = snap.with_slot(TimeSlot::new(format!("{}{p}", &day.name()[..3]), day, p));
        }
    }
    snap
}

/// Two classes, three subjects, enough rooms and slots for a clean timetable.
fn school() -> DomainModel {
    let snap = week(&[Day::Monday, Day::Tuesday], 5)
        .with_teacher(Teacher::new("T1").with_subject("MATH").with_max_hours_per_day(4))
        .with_teacher(Teacher::new("T2").with_subject("BIO").with_subject("MATH"))
        .with_teacher(Teacher::new("T3").with_subject("NET"))
        .with_room(Room::theory("R1").with_capacity(36))
        .with_room(Room::theory("R2").with_capacity(36))
        .with_room(Room::practical("LAB").with_capacity(36))
        .with_class(ClassGroup::new("X-1", 10, "TKJ").with_students(32))
        .with_class(ClassGroup::new("X-2", 10, "TKJ").with_students(30).prefers_day(Day::Monday))
        .with_subject(Subject::new("MATH", 3))
        .with_subject(Subject::new("BIO", 1))
        .with_subject(Subject::new("NET", 2).practical().with_block_length(2));
    DomainModel::build(snap).unwrap()
}

fn config() -> EngineConfig {
    EngineConfig::default()
        .with_population_size(40)
        .with_generations(60)
        .with_seed(2024)
}

#[test]
fn test_feasible_instance_reaches_zero_hard() {
    let mut c = EvolutionController::new(school());
    let outcome = c.run(config(), |_| {}).unwrap();
    assert_eq!(outcome.report.fitness.hard_violations(), 0);
    assert!(outcome.report.fitness.fitness >= 0.5);
    assert_eq!(outcome.timetable.len(), 12);
    assert!(outcome.report.infeasible.is_empty());
}

#[test]
fn test_outcome_round_trips() {
    let mut c = EvolutionController::new(school());
    let outcome = c.run(config(), |_| {}).unwrap();
    let problem = c.problem();
    let chromosome = problem.encode(&outcome.timetable).unwrap();
    assert_eq!(problem.decode(&chromosome).unwrap(), outcome.timetable);
}

#[test]
fn test_fixed_seed_is_reproducible() {
    let run = |parallel: bool| {
        let mut c = EvolutionController::new(school());
        c.run(config().with_parallel(parallel), |_| {}).unwrap()
    };
    let a = run(true);
    let b = run(true);
    let c = run(false);
    assert_eq!(a.timetable, b.timetable);
    assert_eq!(a.timetable, c.timetable);
    assert_eq!(a.report.seed, 2024);
    let fa: Vec<f64> = a.report.history.iter().map(|s| s.best_fitness).collect();
    let fc: Vec<f64> = c.report.history.iter().map(|s| s.best_fitness).collect();
    assert_eq!(fa, fc);
}

#[test]
fn test_random_seed_is_reported() {
    let mut c = EvolutionController::new(school());
    let mut cfg = config();
    cfg.random_seed = None;
    let outcome = c.run(cfg.clone().with_generations(10), |_| {}).unwrap();
    let seed = outcome.report.seed;

    c.reset().unwrap();
    let replay = c.run(cfg.with_generations(10).with_seed(seed), |_| {}).unwrap();
    assert_eq!(replay.timetable, outcome.timetable);
}

#[test]
fn test_best_fitness_never_decreases() {
    let mut c = EvolutionController::new(school());
    let outcome = c
        .run(config().with_elitism_count(1).with_mutation_rate(0.3), |_| {})
        .unwrap();
    for pair in outcome.report.history.windows(2) {
        assert!(pair[1].best_fitness >= pair[0].best_fitness);
    }
}

#[test]
fn test_population_size_and_elite_invariants() {
    let domain = Arc::new(school());
    let problem = TimetableProblem::new(domain.clone());
    let evaluator = ConstraintEvaluator::new(domain);
    let ops = config().operators();
    let mut rng = StdRng::seed_from_u64(5);

    let mut pop = Population::initialize(&problem, 25, &mut rng);
    pop.evaluate(&evaluator, true);
    let mut leader = pop.best().unwrap().fitness();
    for _ in 0..30 {
        pop = pop.next_generation(&problem, &ops, 2, 5, &mut rng);
        pop.evaluate(&evaluator, true);
        assert_eq!(pop.len(), 25);
        let now = pop.best().unwrap().fitness();
        assert!(now >= leader);
        leader = now;
    }
}

#[test]
fn test_two_monday_lessons() {
    let snap = week(&[Day::Monday], 2)
        .with_teacher(Teacher::new("T1").with_subject("MATH").available_in("Mon1").available_in("Mon2"))
        .with_room(Room::theory("R1"))
        .with_class(ClassGroup::new("C1", 10, "TKJ"))
        .with_subject(Subject::new("MATH", 2));
    let mut c = EvolutionController::new(DomainModel::build(snap).unwrap());
    let outcome = c
        .run(
            EngineConfig::default()
                .with_population_size(10)
                .with_generations(10)
                .with_seed(1),
            |_| {},
        )
        .unwrap();
    assert_eq!(outcome.timetable.len(), 2);
    assert_eq!(outcome.report.fitness.hard_violations(), 0);
    let mut positions: Vec<u32> = outcome.timetable.entries.iter().map(|e| e.position).collect();
    positions.sort_unstable();
    assert_eq!(positions, vec![1, 2]);
}

#[test]
fn test_sole_teacher_single_slot_conflict() {
    let snap = week(&[Day::Monday], 1)
        .with_teacher(Teacher::new("T1").with_subject("MATH"))
        .with_room(Room::theory("R1"))
        .with_room(Room::theory("R2"))
        .with_class(ClassGroup::new("C1", 10, "TKJ"))
        .with_class(ClassGroup::new("C2", 10, "TKJ"))
        .with_subject(Subject::new("MATH", 5))
        .with_requirement(Requirement::new("C1", "MATH", 1))
        .with_requirement(Requirement::new("C2", "MATH", 1));
    let mut c = EvolutionController::new(DomainModel::build(snap).unwrap());
    let outcome = c
        .run(
            EngineConfig::default()
                .with_population_size(20)
                .with_generations(20)
                .with_seed(3),
            |_| {},
        )
        .unwrap();
    let fitness = &outcome.report.fitness;
    assert_eq!(fitness.hard_violations(), 1);
    assert_eq!(fitness.hard.get(HardConstraint::TeacherDoubleBooking), 1);
    assert!(fitness.fitness < 0.5);
    let last = outcome.report.history.last().unwrap();
    assert_eq!(last.hard.get(HardConstraint::TeacherDoubleBooking), 1);
    assert_eq!(last.hard.get(HardConstraint::RoomDoubleBooking), 0);
}

#[test]
fn test_unteachable_subject_persists_as_hard_conflict() {
    let snap = week(&[Day::Monday, Day::Tuesday], 4)
        .with_teacher(Teacher::new("T1").with_subject("MATH"))
        .with_room(Room::theory("R1"))
        .with_room(Room::theory("R2"))
        .with_class(ClassGroup::new("C1", 10, "TKJ"))
        .with_subject(Subject::new("MATH", 3))
        .with_subject(Subject::new("ART", 1));
    let mut c = EvolutionController::new(DomainModel::build(snap).unwrap());
    let outcome = c
        .run(
            EngineConfig::default()
                .with_population_size(20)
                .with_generations(10)
                .with_seed(9),
            |_| {},
        )
        .unwrap();
    let report = &outcome.report;

    assert_eq!(
        report.infeasible,
        vec![InfeasibleRequirement {
            class_id: "C1".into(),
            subject_id: "ART".into(),
            reason: InfeasibleReason::NoQualifiedTeacher,
        }]
    );
    assert_eq!(report.history.len(), 10);
    for stats in &report.history {
        assert!(stats.hard_conflicts >= 1);
        assert!(stats.hard.get(HardConstraint::TeacherUnqualified) >= 1);
        assert!(stats.best_fitness < 0.5);
    }
    assert!(report.fitness.hard.get(HardConstraint::TeacherUnqualified) >= 1);
    assert!(report
        .violations
        .iter()
        .any(|v| v.kind == ConstraintKind::Hard(HardConstraint::TeacherUnqualified)));
    assert_eq!(outcome.timetable.len(), 4);
}

#[test]
fn test_no_variation_keeps_population_static() {
    let mut c = EvolutionController::new(school());
    let outcome = c
        .run(
            config()
                .with_population_size(10)
                .with_generations(10)
                .with_mutation_rate(0.0)
                .with_crossover_rate(0.0)
                .with_elitism_count(10),
            |_| {},
        )
        .unwrap();
    let first = &outcome.report.history[0];
    for stats in &outcome.report.history {
        assert_eq!(stats.best_fitness, first.best_fitness);
        assert_eq!(stats.average_fitness, first.average_fitness);
    }
}

#[test]
fn test_out_of_range_config_rejected() {
    let mut c = EvolutionController::new(school());
    let err = c.start(config().with_tournament_size(1)).unwrap_err();
    assert!(matches!(
        err,
        EngineError::Configuration {
            field: "tournament_size",
            ..
        }
    ));
    assert_eq!(c.state(), RunState::Idle);
}

#[test]
fn test_pause_resume_stop_reset() {
    let mut c = EvolutionController::new(school());
    let handle = c.handle();
    let outcome = c
        .run(config().with_generations(1000), |stats| match stats.generation {
            1 => {
                handle.pause().unwrap();
                assert_eq!(handle.state(), RunState::Paused);
                let h = handle.clone();
                thread::spawn(move || {
                    thread::sleep(Duration::from_millis(20));
                    h.resume().unwrap();
                });
            }
            3 => handle.stop().unwrap(),
            _ => {}
        })
        .unwrap();
    assert_eq!(outcome.report.termination, TerminationReason::Stopped);
    assert_eq!(outcome.report.generations_run, 4);
    assert_eq!(c.state(), RunState::Stopped);
    assert!(c.resume().is_err());
    c.reset().unwrap();
    assert_eq!(c.state(), RunState::Idle);
}

#[test]
fn test_background_pause_and_stop() {
    let mut c = EvolutionController::new(school());
    let rx = c
        .start(config().with_population_size(500).with_generations(1000))
        .unwrap();
    assert!(c.start(config()).is_err());
    let first = rx.recv().unwrap();

    c.pause().unwrap();
    assert_eq!(c.state(), RunState::Paused);
    assert!(c.pause().is_err());
    c.resume().unwrap();
    assert_eq!(c.state(), RunState::Running);

    // Stopping a paused run wakes the worker.
    c.pause().unwrap();
    c.stop().unwrap();
    let outcome = c.wait().unwrap();
    assert_eq!(outcome.report.termination, TerminationReason::Stopped);
    assert!(!outcome.report.exhausted);
    assert!(outcome.report.generations_run < 1000);

    let mut received = vec![first];
    received.extend(rx.iter());
    assert_eq!(received, outcome.report.history);
    assert_eq!(outcome.timetable.len(), 12);
    assert_eq!(c.state(), RunState::Stopped);
    assert!(c.reset().is_ok());
}

//! Evolution controller.
//!
//! Owns the generational loop and its control surface. A run either
//! blocks the caller ([`EvolutionController::run`], progress through a
//! callback) or executes on a worker thread
//! ([`EvolutionController::start`], progress through an mpsc channel,
//! result through [`EvolutionController::wait`]).
//!
//! Each generation: record stats → emit progress → check termination →
//! honor pause/stop → breed → evaluate.

use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::config::EngineConfig;
use super::control::{ControlHandle, ControlSignals, RunState};
use super::progress::{GenerationStats, TerminationReason};
use crate::error::EngineError;
use crate::evaluation::ConstraintEvaluator;
use crate::ga::{Population, TimetableChromosome, TimetableProblem};
use crate::models::DomainModel;
use crate::report::{EngineOutcome, ResultReporter, RunSummary};

type Worker = JoinHandle<Result<EngineOutcome, EngineError>>;

/// Drives timetable generation runs over one domain.
///
/// # Example
/// ```no_run
/// use u_timetable::engine::{EngineConfig, EvolutionController};
/// use u_timetable::models::{DomainModel, DomainSnapshot};
///
/// let domain = DomainModel::build(DomainSnapshot::new()).unwrap();
/// let mut controller = EvolutionController::new(domain);
/// let progress = controller.start(EngineConfig::default()).unwrap();
/// for stats in progress {
///     println!("generation {}: {:.4}", stats.generation, stats.best_fitness);
/// }
/// let outcome = controller.wait().unwrap();
/// println!("{}", outcome.report.summary());
/// ```
pub struct EvolutionController {
    problem: Arc<TimetableProblem>,
    signals: Arc<ControlSignals>,
    worker: Option<Worker>,
}

impl EvolutionController {
    /// Creates an idle controller.
    pub fn new(domain: DomainModel) -> Self {
        Self::from_problem(TimetableProblem::new(Arc::new(domain)))
    }

    /// Creates an idle controller for a prepared problem.
    pub fn from_problem(problem: TimetableProblem) -> Self {
        Self {
            problem: Arc::new(problem),
            signals: Arc::new(ControlSignals::new()),
            worker: None,
        }
    }

    pub fn problem(&self) -> &TimetableProblem {
        &self.problem
    }

    pub fn state(&self) -> RunState {
        self.signals.state()
    }

    /// Handle for pausing or stopping from another thread.
    pub fn handle(&self) -> ControlHandle {
        ControlHandle {
            signals: self.signals.clone(),
        }
    }

    /// Starts a background run.
    ///
    /// Returns the progress channel; it closes when the run ends.
    ///
    /// # Errors
    /// Configuration errors, or [`EngineError::InvalidTransition`] unless idle.
    pub fn start(&mut self, config: EngineConfig) -> Result<Receiver<GenerationStats>, EngineError> {
        config.validate()?;
        self.signals.begin()?;

        let (tx, rx) = mpsc::channel();
        let problem = self.problem.clone();
        let signals = self.signals.clone();
        self.worker = Some(thread::spawn(move || {
            let result = evolve(&problem, &config, &signals, |stats| {
                // The receiver may have been dropped; the run continues.
                let _ = tx.send(stats.clone());
            });
            finish(&signals, &result);
            result
        }));
        Ok(rx)
    }

    /// Runs to completion on the calling thread.
    ///
    /// `on_progress` is invoked once per generation. Use [`handle`](Self::handle)
    /// to pause or stop from another thread.
    ///
    /// # Errors
    /// Configuration errors, or [`EngineError::InvalidTransition`] unless idle.
    pub fn run<F>(&mut self, config: EngineConfig, on_progress: F) -> Result<EngineOutcome, EngineError>
    where
        F: FnMut(&GenerationStats),
    {
        config.validate()?;
        self.signals.begin()?;
        let result = evolve(&self.problem, &config, &self.signals, on_progress);
        finish(&self.signals, &result);
        result
    }

    /// Requests a pause at the next generation boundary.
    pub fn pause(&self) -> Result<(), EngineError> {
        self.signals.pause()
    }

    /// Resumes a paused run.
    pub fn resume(&self) -> Result<(), EngineError> {
        self.signals.resume()
    }

    /// Requests a stop at the next generation boundary.
    ///
    /// The run still yields the best timetable found.
    pub fn stop(&self) -> Result<(), EngineError> {
        self.signals.stop()
    }

    /// Waits for the background run and returns its outcome.
    ///
    /// # Errors
    /// [`EngineError::InvalidTransition`] if no background run was started,
    /// [`EngineError::WorkerPanicked`] if the worker thread panicked.
    pub fn wait(&mut self) -> Result<EngineOutcome, EngineError> {
        let worker = self.worker.take().ok_or(EngineError::InvalidTransition {
            action: "wait",
            state: self.state(),
        })?;
        match worker.join() {
            Ok(result) => result,
            Err(_) => {
                self.signals.set(RunState::Idle);
                Err(EngineError::WorkerPanicked)
            }
        }
    }

    /// Returns a finished controller to `Idle`, discarding any
    /// unclaimed outcome.
    ///
    /// # Errors
    /// [`EngineError::InvalidTransition`] while a run is active.
    pub fn reset(&mut self) -> Result<(), EngineError> {
        self.signals.reset()?;
        if let Some(worker) = self.worker.take() {
            // Already finished: its final state was set before returning.
            let _ = worker.join();
        }
        Ok(())
    }
}

fn finish(signals: &ControlSignals, result: &Result<EngineOutcome, EngineError>) {
    let state = match result {
        Ok(outcome) if outcome.report.termination == TerminationReason::Stopped => {
            RunState::Stopped
        }
        Ok(outcome) => RunState::Completed(outcome.report.termination),
        Err(_) => RunState::Idle,
    };
    signals.set(state);
}

/// The generational loop.
fn evolve<F>(
    problem: &TimetableProblem,
    config: &EngineConfig,
    signals: &ControlSignals,
    mut on_progress: F,
) -> Result<EngineOutcome, EngineError>
where
    F: FnMut(&GenerationStats),
{
    let seed = config.random_seed.unwrap_or_else(|| rand::rng().random());
    let mut rng = StdRng::seed_from_u64(seed);
    let evaluator = ConstraintEvaluator::from_config(problem.domain().clone(), config);
    let operators = config.operators();
    let start = Instant::now();

    info!(
        "Starting timetable evolution: {} lessons, population {}, {} generations, seed {}",
        problem.lesson_count(),
        config.population_size,
        config.generations,
        seed
    );

    let mut population = Population::initialize(problem, config.population_size, &mut rng);
    population.evaluate(&evaluator, config.parallel);
    let mut best = leader(&population);
    let mut last_improvement = 0;
    let mut generation = 0;
    let mut history = Vec::with_capacity(config.generations);

    let termination = loop {
        let (hard, soft) = best
            .report
            .map_or_else(Default::default, |r| (r.hard, r.soft));
        let stats = GenerationStats {
            generation,
            total_generations: config.generations,
            best_fitness: best.fitness(),
            generation_best_fitness: population.best().map_or(0.0, |c| c.fitness()),
            average_fitness: population.average_fitness(),
            hard_conflicts: hard.total(),
            soft_violations: soft.total(),
            hard,
            soft,
            elapsed: start.elapsed(),
        };
        debug!(
            "generation {}: best {:.6} (current {:.6}), avg {:.6}, hard {}, soft {}",
            generation,
            stats.best_fitness,
            stats.generation_best_fitness,
            stats.average_fitness,
            stats.hard_conflicts,
            stats.soft_violations
        );
        on_progress(&stats);
        history.push(stats);

        if config.target_fitness.is_some_and(|t| best.fitness() >= t) {
            break TerminationReason::TargetReached;
        }
        if config
            .plateau_window
            .is_some_and(|w| generation - last_improvement >= w)
        {
            break TerminationReason::Plateau;
        }
        if config.time_budget.is_some_and(|b| start.elapsed() >= b) {
            break TerminationReason::TimeBudget;
        }
        if generation + 1 >= config.generations {
            break TerminationReason::MaxGenerations;
        }
        if signals.checkpoint() {
            break TerminationReason::Stopped;
        }

        population = population.next_generation(
            problem,
            &operators,
            config.elitism_count,
            config.tournament_size,
            &mut rng,
        );
        population.evaluate(&evaluator, config.parallel);
        generation += 1;

        if let Some(candidate) = population.best() {
            if candidate.fitness() > best.fitness() {
                best = candidate.clone();
                last_improvement = generation;
            }
        }
    };

    let elapsed = start.elapsed();
    info!(
        "Evolution finished after {} generations ({}): best fitness {:.6} in {:?}",
        generation + 1,
        termination,
        best.fitness(),
        elapsed
    );

    ResultReporter::new(problem, &evaluator).report(
        &best,
        RunSummary {
            history,
            termination,
            seed,
            elapsed,
        },
    )
}

fn leader(population: &Population) -> TimetableChromosome {
    population
        .best()
        .cloned()
        .unwrap_or_else(|| TimetableChromosome::new(Vec::new()))
}

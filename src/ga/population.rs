//! Population management: initialization, evaluation, selection and
//! generational replacement.

use log::trace;
use rand::Rng;
use rayon::prelude::*;

use super::chromosome::TimetableChromosome;
use super::operators::GeneticOperators;
use super::problem::TimetableProblem;
use crate::evaluation::ConstraintEvaluator;

/// A fixed-size set of candidate timetables.
#[derive(Debug, Clone, Default)]
pub struct Population {
    members: Vec<TimetableChromosome>,
}

impl Population {
    /// Wraps existing chromosomes.
    pub fn from_members(members: Vec<TimetableChromosome>) -> Self {
        Self { members }
    }

    /// Creates `size` chromosomes: even positions constrained-random,
    /// odd positions greedy conflict-avoiding.
    pub fn initialize<R: Rng>(problem: &TimetableProblem, size: usize, rng: &mut R) -> Self {
        let members = (0..size)
            .map(|i| problem.create_individual(rng, i % 2 == 1))
            .collect();
        Self { members }
    }

    pub fn members(&self) -> &[TimetableChromosome] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Evaluates every chromosome without a report.
    ///
    /// With `parallel`, work is spread over the rayon pool with one
    /// scratch buffer per worker. Returns the number of evaluations.
    pub fn evaluate(&mut self, evaluator: &ConstraintEvaluator, parallel: bool) -> usize {
        let pending = self.members.iter().filter(|c| c.report.is_none()).count();
        if pending == 0 {
            return 0;
        }
        if parallel {
            self.members
                .par_iter_mut()
                .filter(|c| c.report.is_none())
                .for_each_init(
                    || evaluator.scratch(),
                    |scratch, c| c.report = Some(evaluator.evaluate(&c.genes, scratch)),
                );
        } else {
            let mut scratch = evaluator.scratch();
            for c in self.members.iter_mut().filter(|c| c.report.is_none()) {
                c.report = Some(evaluator.evaluate(&c.genes, &mut scratch));
            }
        }
        pending
    }

    /// Member indices sorted by fitness, best first; ties keep index order.
    pub fn ranked_indices(&self) -> Vec<usize> {
        let mut idx: Vec<usize> = (0..self.members.len()).collect();
        idx.sort_by(|&a, &b| {
            self.members[b]
                .fitness()
                .total_cmp(&self.members[a].fitness())
        });
        idx
    }

    /// Fittest member (lowest index among ties).
    pub fn best(&self) -> Option<&TimetableChromosome> {
        self.ranked_indices().first().map(|&i| &self.members[i])
    }

    pub fn average_fitness(&self) -> f64 {
        if self.members.is_empty() {
            return 0.0;
        }
        self.members.iter().map(|c| c.fitness()).sum::<f64>() / self.members.len() as f64
    }

    /// Tournament selection with replacement.
    ///
    /// Draws `size` members uniformly and returns the fittest.
    pub fn tournament_select<R: Rng>(&self, size: usize, rng: &mut R) -> &TimetableChromosome {
        let n = self.members.len();
        let mut best = rng.random_range(0..n);
        for _ in 1..size {
            let i = rng.random_range(0..n);
            if self.members[i].fitness() > self.members[best].fitness() {
                best = i;
            }
        }
        &self.members[best]
    }

    /// Breeds the next generation of the same size.
    ///
    /// The top `elitism` members are copied unchanged (keeping their
    /// evaluation); the rest are offspring of tournament-selected parents.
    pub fn next_generation<R: Rng>(
        &self,
        problem: &TimetableProblem,
        operators: &GeneticOperators,
        elitism: usize,
        tournament_size: usize,
        rng: &mut R,
    ) -> Population {
        let size = self.members.len();
        let mut next = Vec::with_capacity(size);
        for i in self.ranked_indices().into_iter().take(elitism.min(size)) {
            next.push(self.members[i].clone());
        }

        while next.len() < size {
            let p1 = self.tournament_select(tournament_size, rng);
            let p2 = self.tournament_select(tournament_size, rng);
            let (c1, c2) = operators.breed(problem, p1, p2, rng);
            next.push(c1);
            if next.len() < size {
                next.push(c2);
            }
        }
        trace!(
            "bred generation: {} elites, {} offspring",
            elitism.min(size),
            size - elitism.min(size)
        );
        Population { members: next }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::FitnessReport;
    use crate::ga::Gene;
    use crate::models::{ClassGroup, Day, DomainModel, DomainSnapshot, Room, Subject, Teacher, TimeSlot};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;
    use std::sync::Arc;

    fn sample() -> (TimetableProblem, ConstraintEvaluator) {
        let mut snap = DomainSnapshot::new()
            .with_teacher(Teacher::new("T1").with_subject("MATH").with_subject("BIO"))
            .with_teacher(Teacher::new("T2").with_subject("MATH"))
            .with_room(Room::theory("R1"))
            .with_room(Room::theory("R2"))
            .with_class(ClassGroup::new("C1", 10, "TKJ"))
            .with_class(ClassGroup::new("C2", 10, "TKJ"))
            .with_subject(Subject::new("MATH", 3))
            .with_subject(Subject::new("BIO", 2));
        for p in 1..=6 {
            snap = snap.with_slot(TimeSlot::new(format!("MON{p}"), Day::Monday, p));
        }
        let domain = Arc::new(DomainModel::build(snap).unwrap());
        (
            TimetableProblem::new(domain.clone()),
            ConstraintEvaluator::new(domain),
        )
    }

    fn with_fitness(values: &[f64]) -> Population {
        Population::from_members(
            values
                .iter()
                .map(|&f| {
                    let mut c = TimetableChromosome::new(vec![Gene::new(0, 0, 0)]);
                    c.report = Some(FitnessReport {
                        fitness: f,
                        penalty: 0.0,
                        hard: Default::default(),
                        soft: Default::default(),
                    });
                    c
                })
                .collect(),
        )
    }

    #[test]
    fn test_initialize_size() {
        let (problem, _) = sample();
        let mut rng = SmallRng::seed_from_u64(42);
        let pop = Population::initialize(&problem, 11, &mut rng);
        assert_eq!(pop.len(), 11);
        assert!(pop.members().iter().all(|c| c.is_valid(problem.domain())));
    }

    #[test]
    fn test_evaluate_parallel_matches_sequential() {
        let (problem, evaluator) = sample();
        let mut rng = SmallRng::seed_from_u64(42);
        let mut a = Population::initialize(&problem, 20, &mut rng);
        let mut b = a.clone();
        assert_eq!(a.evaluate(&evaluator, true), 20);
        assert_eq!(b.evaluate(&evaluator, false), 20);
        assert_eq!(a.members(), b.members());
        // Already evaluated: nothing to do.
        assert_eq!(a.evaluate(&evaluator, true), 0);
    }

    #[test]
    fn test_ranking_and_best() {
        let pop = with_fitness(&[0.2, 0.9, 0.5, 0.9]);
        assert_eq!(pop.ranked_indices(), vec![1, 3, 2, 0]);
        assert_eq!(pop.best().unwrap().fitness(), 0.9);
        assert!((pop.average_fitness() - 0.625).abs() < 1e-12);
    }

    #[test]
    fn test_tournament_prefers_fitter() {
        let pop = with_fitness(&[0.1, 0.2, 0.3, 0.4, 0.95]);
        let mut rng = SmallRng::seed_from_u64(42);
        let wins = (0..200)
            .filter(|_| pop.tournament_select(5, &mut rng).fitness() == 0.95)
            .count();
        // P(best drawn at least once in 5) = 1 - 0.8^5 ≈ 0.67
        assert!(wins > 100);
    }

    #[test]
    fn test_next_generation_keeps_size_and_elites() {
        let (problem, evaluator) = sample();
        let ops = GeneticOperators::default();
        let mut rng = SmallRng::seed_from_u64(42);
        let mut pop = Population::initialize(&problem, 15, &mut rng);
        pop.evaluate(&evaluator, false);
        let best = pop.best().unwrap().clone();

        let next = pop.next_generation(&problem, &ops, 3, 3, &mut rng);
        assert_eq!(next.len(), 15);
        assert_eq!(next.members()[0], best);
        assert!(next.members()[..3].iter().all(|c| c.is_evaluated()));
    }

    #[test]
    fn test_static_population_without_variation() {
        let (problem, evaluator) = sample();
        let ops = GeneticOperators {
            crossover_rate: 0.0,
            mutation_rate: 0.0,
            ..GeneticOperators::default()
        };
        let mut rng = SmallRng::seed_from_u64(42);
        let mut pop = Population::initialize(&problem, 10, &mut rng);
        pop.evaluate(&evaluator, false);
        let next = pop.next_generation(&problem, &ops, 10, 3, &mut rng);
        let mut before: Vec<f64> = pop.members().iter().map(|c| c.fitness()).collect();
        let mut after: Vec<f64> = next.members().iter().map(|c| c.fitness()).collect();
        before.sort_by(f64::total_cmp);
        after.sort_by(f64::total_cmp);
        assert_eq!(before, after);
    }
}

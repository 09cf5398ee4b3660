//! Seeding: build a legal, diverse starting population
//!
//! A random population is refined in nine rounds. Every round keeps the
//! best unique individuals and refills the rest: the first six rounds with
//! fresh random candidates, the last three with mutated copies of existing
//! ones. The percentage schedules below are part of the algorithm's
//! observable behaviour and must not be reordered.

use crate::candidate::{AdjacencyMatrix, Candidate, Population, UniquenessCriterion};
use crate::error::{GaError, Result};
use crate::likelihood::{score_population, FailurePolicy, LikelihoodEvaluator};
use crate::operators::MutationRules;
use crate::repair::repair_population;
use log::debug;
use rand::Rng;

/// Keep percentages of the rounds refilled with random candidates
pub const RANDOM_FILL_ROUNDS: [usize; 6] = [15, 30, 45, 60, 75, 90];
/// Keep percentages of the rounds refilled with mutated copies
pub const MUTANT_FILL_ROUNDS: [usize; 3] = [60, 70, 80];

/// Parameters shared by every seeding round
#[derive(Debug, Clone, Copy)]
pub struct SeedingPlan<'a> {
    pub population_size: usize,
    pub node_count: usize,
    pub ones_percentage: u32,
    pub evaluator: &'a LikelihoodEvaluator<'a>,
    pub policy: FailurePolicy,
    pub criterion: UniquenessCriterion,
}

impl<'a> SeedingPlan<'a> {
    /// Run the full schedule, returning a scored population sorted
    /// best-first
    pub fn seed<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Population> {
        if self.population_size == 0 {
            return Err(GaError::EmptyPopulation("cannot seed a population of size zero"));
        }

        let mut population = self.random_candidates(self.population_size, rng);
        self.refresh(&mut population, rng)?;
        debug!(
            "Seeding start: {} candidates, {} unique",
            population.len(),
            population.unique_count(self.criterion)
        );

        for percentage in RANDOM_FILL_ROUNDS {
            let mut next = self.keep_elites(&population, percentage);
            let missing = self.population_size - next.len();
            let fresh = self.random_candidates(missing, rng);
            next.extend(fresh);
            self.refresh(&mut next, rng)?;
            population = next;
            debug!(
                "Seeding keep={}% random fill: {} unique",
                percentage,
                population.unique_count(self.criterion)
            );
        }

        let rules = MutationRules::seeding();
        for percentage in MUTANT_FILL_ROUNDS {
            let mut next = self.keep_elites(&population, percentage);
            let missing = self.population_size - next.len();
            for _ in 0..missing {
                let mut mutant = population[rng.gen_range(0..population.len())].offspring();
                rules.mutate(&mut mutant, rng);
                next.push(mutant);
            }
            self.refresh(&mut next, rng)?;
            population = next;
            debug!(
                "Seeding keep={}% mutant fill: {} unique",
                percentage,
                population.unique_count(self.criterion)
            );
        }

        Ok(population)
    }

    fn random_candidates<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> Population {
        (0..count)
            .map(|_| Candidate::new(AdjacencyMatrix::random(rng, self.node_count, self.ones_percentage)))
            .collect::<Vec<_>>()
            .into()
    }

    /// Top `floor(S·P/100)` unique individuals, cycling through the unique
    /// set when it is smaller than that
    fn keep_elites(&self, population: &Population, percentage: usize) -> Population {
        let keep = population.len() * percentage / 100;
        let uniques = population.uniques(self.criterion);
        if uniques.is_empty() {
            return Population::default();
        }
        uniques.iter().cycle().take(keep).cloned().collect::<Vec<_>>().into()
    }

    fn refresh<R: Rng + ?Sized>(&self, population: &mut Population, rng: &mut R) -> Result<()> {
        repair_population(population, rng)?;
        score_population(population, self.evaluator, self.policy)
    }
}

/// Seed a population with the default schedule
pub fn seed_population<R: Rng + ?Sized>(
    population_size: usize,
    node_count: usize,
    ones_percentage: u32,
    evaluator: &LikelihoodEvaluator<'_>,
    policy: FailurePolicy,
    criterion: UniquenessCriterion,
    rng: &mut R,
) -> Result<Population> {
    SeedingPlan {
        population_size,
        node_count,
        ones_percentage,
        evaluator,
        policy,
        criterion,
    }
    .seed(rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ReplicateSet;
    use crate::likelihood::Paradigm;
    use crate::repair::check_legal;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn data() -> ReplicateSet {
        let mut rng = ChaCha8Rng::seed_from_u64(31);
        ReplicateSet::synthetic(&mut rng, 2, 10, 5, 2, 0.8).unwrap()
    }

    #[test]
    fn test_seeded_population_is_legal_sorted_and_normalized() {
        let data = data();
        let ev = LikelihoodEvaluator::new(&data, Paradigm::Cotemporal).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let pop = seed_population(
            30,
            5,
            20,
            &ev,
            FailurePolicy::Penalize,
            UniquenessCriterion::RelativeLikelihood,
            &mut rng,
        )
        .unwrap();

        assert_eq!(pop.len(), 30);
        for c in pop.iter() {
            check_legal(&c.genes).unwrap();
            assert!(c.log_likelihood.is_some());
        }
        let sum: f64 = pop.iter().map(|c| c.relative_likelihood.unwrap()).sum();
        assert!((sum - 1.0).abs() < 1e-6);
        for pair in pop.candidates.windows(2) {
            assert!(pair[0].relative_likelihood >= pair[1].relative_likelihood);
        }
    }

    #[test]
    fn test_seeding_is_reproducible() {
        let data = data();
        let ev = LikelihoodEvaluator::new(&data, Paradigm::NextStepOne).unwrap();
        let run = |seed| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            seed_population(
                12,
                5,
                20,
                &ev,
                FailurePolicy::Penalize,
                UniquenessCriterion::Structure,
                &mut rng,
            )
            .unwrap()
        };
        assert_eq!(run(5), run(5));
    }

    #[test]
    fn test_keep_elites_pads_by_cycling() {
        let data = data();
        let ev = LikelihoodEvaluator::new(&data, Paradigm::Cotemporal).unwrap();
        let plan = SeedingPlan {
            population_size: 10,
            node_count: 5,
            ones_percentage: 5,
            evaluator: &ev,
            policy: FailurePolicy::Abort,
            criterion: UniquenessCriterion::RelativeLikelihood,
        };
        let mut a = Candidate::new(AdjacencyMatrix::from_edges(5, &[(0, 1)]));
        a.relative_likelihood = Some(0.6);
        let mut b = Candidate::new(AdjacencyMatrix::empty(5));
        b.relative_likelihood = Some(0.4 / 9.0);
        let mut candidates = vec![a.clone()];
        candidates.extend(std::iter::repeat(b.clone()).take(9));
        let pop = Population::new(candidates);

        let kept = plan.keep_elites(&pop, 45);
        assert_eq!(kept.len(), 4);
        assert_eq!(kept[0], a);
        assert_eq!(kept[1], b);
        assert_eq!(kept[2], a);
        assert_eq!(kept[3], b);
    }

    #[test]
    fn test_zero_size_is_rejected() {
        let data = data();
        let ev = LikelihoodEvaluator::new(&data, Paradigm::Cotemporal).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let result = seed_population(
            0,
            5,
            5,
            &ev,
            FailurePolicy::Abort,
            UniquenessCriterion::RelativeLikelihood,
            &mut rng,
        );
        assert!(matches!(result, Err(GaError::EmptyPopulation(_))));
    }
}

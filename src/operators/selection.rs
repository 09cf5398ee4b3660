//! Rank-based fitness, roulette selection and elitism

use super::crossover::crossover;
use crate::candidate::{Population, UniquenessCriterion};
use rand::Rng;

/// Assign `fitness(rank) = 2(S+1-rank) / (S(S+1))` with rank 1 the first
/// candidate. The population must already be sorted best-first.
pub fn assign_rank_fitness(population: &mut Population) {
    let s = population.len() as f64;
    for (i, c) in population.iter_mut().enumerate() {
        let rank = (i + 1) as f64;
        c.fitness = Some(2.0 * (s + 1.0 - rank) / (s * (s + 1.0)));
    }
}

/// Running sum of fitness values; unassigned fitness counts as zero
pub fn cumulative_fitness(population: &Population) -> Vec<f64> {
    population
        .iter()
        .scan(0.0, |sum, c| {
            *sum += c.fitness.unwrap_or(0.0);
            Some(*sum)
        })
        .collect()
}

/// First index whose cumulative value reaches `draw`. Falls back to the
/// last index when rounding leaves the total short of `draw`; `None` only
/// for an empty list.
pub fn roulette_index(cumulative: &[f64], draw: f64) -> Option<usize> {
    cumulative
        .iter()
        .position(|&c| draw <= c)
        .or_else(|| cumulative.len().checked_sub(1))
}

/// Number of elite survivors for a population size and elitism
/// percentage, rounded up to an even count
pub fn survivor_count(population_size: usize, elitism_percentage: u32) -> usize {
    let survivors = population_size * elitism_percentage as usize / 100;
    survivors + survivors % 2
}

/// Build the next generation: the top `survivors` unique individuals
/// carry over, then roulette-selected pairs are mated until the new
/// generation is as large as the current one.
///
/// Fitness must already be assigned.
pub fn select_next_generation<R: Rng + ?Sized>(
    population: &Population,
    survivors: usize,
    selection_probability: f64,
    criterion: UniquenessCriterion,
    rng: &mut R,
) -> Population {
    let target = population.len();
    let cumulative = cumulative_fitness(population);

    let mut next: Population = population
        .uniques(criterion)
        .into_iter()
        .take(survivors.min(target))
        .collect::<Vec<_>>()
        .into();

    while next.len() < target {
        let (Some(i), Some(j)) = (
            roulette_index(&cumulative, rng.gen()),
            roulette_index(&cumulative, rng.gen()),
        ) else {
            break;
        };
        let (a, b) = crossover(&population[i], &population[j], selection_probability, rng);
        next.push(a);
        if next.len() < target {
            next.push(b);
        }
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidate::{AdjacencyMatrix, Candidate};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn ranked(size: usize) -> Population {
        let mut pop = Population::new(
            (0..size)
                .map(|i| {
                    let mut c = Candidate::new(AdjacencyMatrix::from_edges(4, &[(i % 4, (i + 1) % 4)]));
                    c.relative_likelihood = Some(1.0 / (i + 2) as f64);
                    c
                })
                .collect(),
        );
        pop.sort_by_relative_likelihood();
        assign_rank_fitness(&mut pop);
        pop
    }

    #[test]
    fn test_rank_fitness_sums_to_one_and_decreases() {
        for size in [1, 2, 7, 250] {
            let pop = ranked(size);
            let sum: f64 = pop.iter().map(|c| c.fitness.unwrap()).sum();
            assert!((sum - 1.0).abs() < 1e-9);
            for pair in pop.candidates.windows(2) {
                assert!(pair[0].fitness.unwrap() > pair[1].fitness.unwrap());
            }
        }
        let pop = ranked(4);
        assert!((pop[0].fitness.unwrap() - 0.4).abs() < 1e-12);
        assert!((pop[3].fitness.unwrap() - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_roulette_lookup() {
        let cumulative = [0.4, 0.7, 0.9, 1.0];
        assert_eq!(roulette_index(&cumulative, 0.0), Some(0));
        assert_eq!(roulette_index(&cumulative, 0.4), Some(0));
        assert_eq!(roulette_index(&cumulative, 0.41), Some(1));
        assert_eq!(roulette_index(&cumulative, 0.95), Some(3));
        assert_eq!(roulette_index(&[0.4, 0.99999], 0.999999), Some(1));
        assert_eq!(roulette_index(&[], 0.5), None);
    }

    #[test]
    fn test_survivor_count_is_even() {
        assert_eq!(survivor_count(250, 10), 26);
        assert_eq!(survivor_count(100, 10), 10);
        assert_eq!(survivor_count(30, 10), 4);
        assert_eq!(survivor_count(10, 0), 0);
    }

    #[test]
    fn test_next_generation_keeps_size_and_elites() {
        let pop = ranked(11);
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let next = select_next_generation(&pop, 2, 0.5, UniquenessCriterion::RelativeLikelihood, &mut rng);
        assert_eq!(next.len(), 11);
        assert_eq!(next[0], pop[0]);
        assert_eq!(next[1], pop[1]);
        assert!(next.iter().skip(2).all(|c| c.fitness.is_none()));
    }

    #[test]
    fn test_elites_limited_by_unique_count() {
        let mut pop = ranked(6);
        for c in pop.iter_mut() {
            c.relative_likelihood = Some(0.5);
        }
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let next = select_next_generation(&pop, 4, 0.0, UniquenessCriterion::RelativeLikelihood, &mut rng);
        assert_eq!(next.len(), 6);
        assert_eq!(next.iter().filter(|c| c.fitness.is_some()).count(), 1);
    }

    #[test]
    fn test_empty_population_selects_nothing() {
        let mut rng = ChaCha8Rng::seed_from_u64(10);
        let next = select_next_generation(
            &Population::default(),
            2,
            0.5,
            UniquenessCriterion::RelativeLikelihood,
            &mut rng,
        );
        assert!(next.is_empty());
    }
}

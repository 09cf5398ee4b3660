//! Bit-flip mutation
//!
//! Each individual gets `attempts` tries; every try fires with probability
//! `probability` and toggles one random off-diagonal cell.

use crate::candidate::{AdjacencyMatrix, Candidate, Population};
use crate::error::{GaError, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Mutation strength
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MutationRules {
    /// Chance that a single attempt flips a bit
    pub probability: f64,
    /// Attempts per individual
    pub attempts: usize,
}

impl Default for MutationRules {
    fn default() -> Self {
        Self {
            probability: 0.3,
            attempts: 1,
        }
    }
}

impl MutationRules {
    pub fn new(probability: f64, attempts: usize) -> Result<Self> {
        if !(0.0..=1.0).contains(&probability) {
            return Err(GaError::Config(format!(
                "mutation probability {probability} outside [0, 1]"
            )));
        }
        Ok(Self {
            probability,
            attempts,
        })
    }

    /// The rate used to diversify the seeding rounds
    pub fn seeding() -> Self {
        Self {
            probability: 0.5,
            attempts: 3,
        }
    }

    /// Mutate one gene matrix in place, returning the number of flips
    pub fn mutate_genes<R: Rng + ?Sized>(&self, genes: &mut AdjacencyMatrix, rng: &mut R) -> usize {
        let n = genes.size();
        if n < 2 {
            return 0;
        }
        let mut flips = 0;
        for _ in 0..self.attempts {
            if rng.gen::<f64>() < self.probability {
                let i = rng.gen_range(0..n);
                let mut j = rng.gen_range(0..n);
                while j == i {
                    j = rng.gen_range(0..n);
                }
                genes.toggle(i, j);
                flips += 1;
            }
        }
        flips
    }

    /// Mutate a candidate, dropping its scores if anything changed
    pub fn mutate<R: Rng + ?Sized>(&self, candidate: &mut Candidate, rng: &mut R) -> usize {
        let flips = self.mutate_genes(&mut candidate.genes, rng);
        if flips > 0 {
            candidate.invalidate();
        }
        flips
    }

    /// Mutate every individual of a population in turn
    pub fn mutate_population<R: Rng + ?Sized>(&self, population: &mut Population, rng: &mut R) -> usize {
        population.iter_mut().map(|c| self.mutate(c, rng)).sum()
    }
}

//! Population: ordered collection of candidates
//!
//! Order only carries meaning right after `sort_by_relative_likelihood`;
//! otherwise it is insertion order.

use super::Candidate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;

/// How two candidates are judged to be "the same individual"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UniquenessCriterion {
    /// Exact equality of relative likelihood
    #[default]
    RelativeLikelihood,
    /// Identical gene matrices
    Structure,
}

/// Summary statistics of a scored population
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PopulationStats {
    pub size: usize,
    pub fitness_mean: f64,
    pub fitness_variance: f64,
    pub relative_likelihood_mean: f64,
    pub relative_likelihood_variance: f64,
    pub best_log_likelihood: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Population {
    pub candidates: Vec<Candidate>,
}

impl Population {
    pub fn new(candidates: Vec<Candidate>) -> Self {
        Self { candidates }
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Candidate> {
        self.candidates.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Candidate> {
        self.candidates.iter_mut()
    }

    pub fn push(&mut self, candidate: Candidate) {
        self.candidates.push(candidate);
    }

    pub fn extend(&mut self, other: impl IntoIterator<Item = Candidate>) {
        self.candidates.extend(other);
    }

    pub fn best(&self) -> Option<&Candidate> {
        self.candidates.first()
    }

    /// Stable sort, highest relative likelihood first; unscored candidates last
    pub fn sort_by_relative_likelihood(&mut self) {
        self.candidates
            .sort_by(|a, b| descending(a.relative_likelihood, b.relative_likelihood));
    }

    /// First occurrence of every distinct individual, preserving order
    pub fn uniques(&self, criterion: UniquenessCriterion) -> Vec<Candidate> {
        match criterion {
            UniquenessCriterion::RelativeLikelihood => {
                let mut unique: Vec<Candidate> = Vec::new();
                for c in &self.candidates {
                    if !unique.iter().any(|u| u.relative_likelihood == c.relative_likelihood) {
                        unique.push(c.clone());
                    }
                }
                unique
            }
            UniquenessCriterion::Structure => {
                let mut seen = HashSet::new();
                self.candidates
                    .iter()
                    .filter(|c| seen.insert(c.genes.fingerprint()))
                    .cloned()
                    .collect()
            }
        }
    }

    pub fn unique_count(&self, criterion: UniquenessCriterion) -> usize {
        self.uniques(criterion).len()
    }

    /// Mean and population variance of fitness and relative likelihood.
    /// Unscored values count as zero.
    pub fn stats(&self) -> PopulationStats {
        let fitness: Vec<f64> = self.iter().map(|c| c.fitness.unwrap_or(0.0)).collect();
        let relative: Vec<f64> = self
            .iter()
            .map(|c| c.relative_likelihood.unwrap_or(0.0))
            .collect();
        let (fitness_mean, fitness_variance) = mean_variance(&fitness);
        let (relative_likelihood_mean, relative_likelihood_variance) = mean_variance(&relative);
        let best_log_likelihood = self
            .iter()
            .filter_map(|c| c.log_likelihood)
            .fold(f64::NEG_INFINITY, f64::max);
        PopulationStats {
            size: self.len(),
            fitness_mean,
            fitness_variance,
            relative_likelihood_mean,
            relative_likelihood_variance,
            best_log_likelihood,
        }
    }
}

impl From<Vec<Candidate>> for Population {
    fn from(candidates: Vec<Candidate>) -> Self {
        Self::new(candidates)
    }
}

impl IntoIterator for Population {
    type Item = Candidate;
    type IntoIter = std::vec::IntoIter<Candidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.candidates.into_iter()
    }
}

impl std::ops::Index<usize> for Population {
    type Output = Candidate;

    fn index(&self, index: usize) -> &Candidate {
        &self.candidates[index]
    }
}

fn descending(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn mean_variance(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, var)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidate::AdjacencyMatrix;

    fn scored(edges: &[(usize, usize)], rel: f64) -> Candidate {
        let mut c = Candidate::new(AdjacencyMatrix::from_edges(3, edges));
        c.relative_likelihood = Some(rel);
        c
    }

    #[test]
    fn test_sort_descending_and_stable() {
        let mut pop = Population::new(vec![
            scored(&[], 0.1),
            scored(&[(0, 1)], 0.5),
            Candidate::new(AdjacencyMatrix::empty(3)),
            scored(&[(1, 2)], 0.1),
            scored(&[(0, 2)], 0.3),
        ]);
        pop.sort_by_relative_likelihood();
        let rel: Vec<Option<f64>> = pop.iter().map(|c| c.relative_likelihood).collect();
        assert_eq!(rel, vec![Some(0.5), Some(0.3), Some(0.1), Some(0.1), None]);
        // equal keys keep insertion order
        assert_eq!(pop[2].genes.count_ones(), 0);
        assert_eq!(pop[3].genes.edges(), vec![(1, 2)]);
    }

    #[test]
    fn test_uniques_by_relative_likelihood() {
        let pop = Population::new(vec![
            scored(&[(0, 1)], 0.4),
            scored(&[(1, 2)], 0.4),
            scored(&[(0, 1)], 0.2),
        ]);
        let u = pop.uniques(UniquenessCriterion::RelativeLikelihood);
        assert_eq!(u.len(), 2);
        assert_eq!(u[0].genes.edges(), vec![(0, 1)]);
    }

    #[test]
    fn test_uniques_by_structure() {
        let pop = Population::new(vec![
            scored(&[(0, 1)], 0.4),
            scored(&[(1, 2)], 0.4),
            scored(&[(0, 1)], 0.2),
        ]);
        let u = pop.uniques(UniquenessCriterion::Structure);
        assert_eq!(u.len(), 2);
        assert_eq!(u[1].genes.edges(), vec![(1, 2)]);
    }

    #[test]
    fn test_stats() {
        let mut a = scored(&[], 0.75);
        a.fitness = Some(2.0 / 3.0);
        a.log_likelihood = Some(-1.0);
        let mut b = scored(&[], 0.25);
        b.fitness = Some(1.0 / 3.0);
        b.log_likelihood = Some(-2.0);
        let s = Population::new(vec![a, b]).stats();
        assert_eq!(s.size, 2);
        assert!((s.fitness_mean - 0.5).abs() < 1e-12);
        assert!((s.relative_likelihood_variance - 0.0625).abs() < 1e-12);
        assert_eq!(s.best_log_likelihood, -1.0);
    }

    #[test]
    fn test_empty_stats() {
        let s = Population::default().stats();
        assert_eq!(s.size, 0);
        assert_eq!(s.fitness_mean, 0.0);
    }
}

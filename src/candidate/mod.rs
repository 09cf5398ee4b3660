//! Candidate: one DAG hypothesis plus its cached scores
//!
//! A candidate owns its gene matrix outright. Crossover and cloning always
//! produce fresh matrices, so two candidates never alias the same genes.

mod adjacency;
mod population;

pub use adjacency::AdjacencyMatrix;
pub use population::{Population, PopulationStats, UniquenessCriterion};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub genes: AdjacencyMatrix,
    /// Natural log of the marginal likelihood; `None` until scored
    pub log_likelihood: Option<f64>,
    /// Share of the population's total likelihood, in (0, 1)
    pub relative_likelihood: Option<f64>,
    /// Rank-based selection weight, in (0, 1]
    pub fitness: Option<f64>,
}

impl Candidate {
    pub fn new(genes: AdjacencyMatrix) -> Self {
        Self {
            genes,
            log_likelihood: None,
            relative_likelihood: None,
            fitness: None,
        }
    }

    /// Fresh, unscored candidate with a copy of these genes
    pub fn offspring(&self) -> Self {
        Self::new(self.genes.clone())
    }

    /// Drop every cached score after the genes changed
    pub fn invalidate(&mut self) {
        self.log_likelihood = None;
        self.relative_likelihood = None;
        self.fitness = None;
    }

    pub fn node_count(&self) -> usize {
        self.genes.size()
    }

    pub fn edge_count(&self) -> usize {
        self.genes.count_ones()
    }

    pub fn summary(&self) -> String {
        let fmt = |v: Option<f64>| v.map_or_else(|| "-".to_string(), |x| format!("{x:.6e}"));
        format!(
            "Candidate | nodes={} | edges={} | logL={} | relL={} | fitness={}",
            self.node_count(),
            self.edge_count(),
            fmt(self.log_likelihood),
            fmt(self.relative_likelihood),
            fmt(self.fitness),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offspring_does_not_alias() {
        let mut parent = Candidate::new(AdjacencyMatrix::from_edges(3, &[(0, 1)]));
        parent.log_likelihood = Some(-3.0);
        let mut child = parent.offspring();
        child.genes.toggle(1, 2);
        assert!(!parent.genes.get(1, 2));
        assert!(child.log_likelihood.is_none());
    }

    #[test]
    fn test_invalidate() {
        let mut c = Candidate::new(AdjacencyMatrix::empty(2));
        c.log_likelihood = Some(-1.0);
        c.relative_likelihood = Some(0.5);
        c.fitness = Some(0.5);
        c.invalidate();
        assert_eq!(c, Candidate::new(AdjacencyMatrix::empty(2)));
        assert!(c.summary().contains("edges=0"));
    }
}

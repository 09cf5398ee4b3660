//! Run configuration
//!
//! Defaults reproduce the reference experiment: 250 candidates over 12
//! entities, 500 generations per run, 12 composite runs.

use crate::candidate::UniquenessCriterion;
use crate::error::{GaError, Result};
use crate::likelihood::{FailurePolicy, Paradigm};
use crate::operators::{survivor_count, MutationRules};
use log::info;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Which candidate of a finished run goes into the amalgamated model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Representative {
    /// Last of the sorted unique final population
    #[default]
    Weakest,
    /// First of the sorted unique final population
    Best,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GaConfig {
    pub population_size: usize,
    /// Entities per candidate; must match the replicate data
    pub gene_count: usize,
    /// Upper bound on initial ones, as a percentage of N²
    pub ones_percentage: u32,
    pub paradigm: Paradigm,
    pub elitism_percentage: u32,
    pub selection_probability: f64,
    pub mutation_probability: f64,
    pub mutation_attempts: usize,
    pub generations: usize,
    pub composite_runs: usize,
    /// Minimum model weight drawn as an edge
    pub edge_threshold: f64,
    /// Master seed; `None` draws one from entropy
    pub seed: Option<u64>,
    /// Worker threads for scoring and repair; `None` lets rayon decide
    pub threads: Option<usize>,
    /// Log every N generations
    pub log_interval: usize,
    pub uniqueness: UniquenessCriterion,
    pub on_numerical_error: FailurePolicy,
    pub representative: Representative,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            population_size: 250,
            gene_count: 12,
            ones_percentage: 5,
            paradigm: Paradigm::Cotemporal,
            elitism_percentage: 10,
            selection_probability: 0.05,
            mutation_probability: 0.3,
            mutation_attempts: 1,
            generations: 500,
            composite_runs: 12,
            edge_threshold: 0.7,
            seed: None,
            threads: None,
            log_interval: 50,
            uniqueness: UniquenessCriterion::RelativeLikelihood,
            on_numerical_error: FailurePolicy::Abort,
            representative: Representative::Weakest,
        }
    }
}

impl GaConfig {
    /// Small, fast settings for demos and smoke runs
    pub fn quick() -> Self {
        Self {
            population_size: 40,
            gene_count: 6,
            ones_percentage: 15,
            generations: 20,
            composite_runs: 3,
            log_interval: 5,
            ..Self::default()
        }
    }

    /// Reject settings no run could use
    pub fn validate(&self) -> Result<()> {
        if self.population_size == 0 {
            return Err(GaError::Config("population_size must be positive".into()));
        }
        if self.gene_count == 0 {
            return Err(GaError::Config("gene_count must be positive".into()));
        }
        if self.composite_runs == 0 {
            return Err(GaError::Config("composite_runs must be positive".into()));
        }
        if self.log_interval == 0 {
            return Err(GaError::Config("log_interval must be positive".into()));
        }
        for (name, pct) in [
            ("ones_percentage", self.ones_percentage),
            ("elitism_percentage", self.elitism_percentage),
        ] {
            if pct > 100 {
                return Err(GaError::Config(format!("{name} {pct} exceeds 100")));
            }
        }
        for (name, p) in [
            ("selection_probability", self.selection_probability),
            ("mutation_probability", self.mutation_probability),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(GaError::Config(format!("{name} {p} outside [0, 1]")));
            }
        }
        if !self.edge_threshold.is_finite() {
            return Err(GaError::Config("edge_threshold must be finite".into()));
        }
        if self.threads == Some(0) {
            return Err(GaError::Config("threads must be positive when set".into()));
        }
        Ok(())
    }

    pub fn mutation_rules(&self) -> Result<MutationRules> {
        MutationRules::new(self.mutation_probability, self.mutation_attempts)
    }

    /// Elite count carried into every generation, rounded up to even
    pub fn survivor_count(&self) -> usize {
        survivor_count(self.population_size, self.elitism_percentage)
    }

    /// Load and validate a JSON configuration; absent fields take defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

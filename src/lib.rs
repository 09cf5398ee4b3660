//! PNGA — Patton–Norris Genetic Algorithm
//!
//! Structure learning for biological interaction networks: a genetic
//! algorithm searches DAGs over a fixed set of entities, scoring each one
//! by a closed-form marginal likelihood of replicate time-series data, and
//! folds the evolved graphs into composite and amalgamated consensus models.

pub mod candidate;
pub mod config;
pub mod data;
pub mod engine;
pub mod error;
pub mod likelihood;
pub mod model;
pub mod operators;
pub mod repair;
pub mod seeding;

pub use candidate::{AdjacencyMatrix, Candidate, Population, UniquenessCriterion};
pub use config::{GaConfig, Representative};
pub use data::ReplicateSet;
pub use engine::{CompositeRun, Engine, GaReport, GenerationRecord};
pub use error::{GaError, Result};
pub use likelihood::{evaluate, FailurePolicy, LikelihoodEvaluator, Paradigm};
pub use model::{amalgamated_model, composite_model, Model};
pub use repair::repair_genes;
pub use seeding::seed_population;

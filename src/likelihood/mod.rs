//! Likelihood: Patton–Norris marginal likelihood and population scoring
//!
//! Scoring a population is three steps that always run together:
//! evaluate every candidate (in parallel), normalize into relative
//! likelihoods, then sort best-first.

mod evaluator;
mod normalize;
mod paradigm;

pub use evaluator::{evaluate, LikelihoodEvaluator};
pub use normalize::relative_likelihoods;
pub use paradigm::Paradigm;

use crate::candidate::Population;
use crate::error::{GaError, Result};
use log::warn;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// What to do with a candidate whose evaluation fails numerically
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FailurePolicy {
    /// Stop and hand the error to the caller
    #[default]
    Abort,
    /// Give the candidate zero likelihood and keep going
    Penalize,
}

/// Compute and cache the log-likelihood of every candidate
pub fn evaluate_population(
    population: &mut Population,
    evaluator: &LikelihoodEvaluator<'_>,
    policy: FailurePolicy,
) -> Result<()> {
    let results: Vec<Result<f64>> = population
        .candidates
        .par_iter()
        .map(|c| evaluator.log_likelihood(&c.genes))
        .collect();

    for (i, (candidate, result)) in population.iter_mut().zip(results).enumerate() {
        candidate.relative_likelihood = None;
        candidate.fitness = None;
        match result {
            Ok(log_l) => candidate.log_likelihood = Some(log_l),
            Err(e) if e.is_numerical() && policy == FailurePolicy::Penalize => {
                warn!("Candidate {} scored as impossible: {}", i, e.with_candidate(i));
                candidate.log_likelihood = Some(f64::NEG_INFINITY);
            }
            Err(e) => return Err(e.with_candidate(i)),
        }
    }
    Ok(())
}

/// Replace every candidate's relative likelihood from its log-likelihood
pub fn normalize_population(population: &mut Population) -> Result<()> {
    let logs = population
        .iter()
        .enumerate()
        .map(|(i, c)| {
            c.log_likelihood.ok_or_else(|| GaError::Numerical {
                candidate: Some(i),
                node: None,
                reason: "candidate has not been evaluated".into(),
            })
        })
        .collect::<Result<Vec<f64>>>()?;
    let relative = relative_likelihoods(&logs)?;
    for (c, rel) in population.iter_mut().zip(relative) {
        c.relative_likelihood = Some(rel);
    }
    Ok(())
}

/// Evaluate, normalize and sort best-first
pub fn score_population(
    population: &mut Population,
    evaluator: &LikelihoodEvaluator<'_>,
    policy: FailurePolicy,
) -> Result<()> {
    evaluate_population(population, evaluator, policy)?;
    normalize_population(population)?;
    population.sort_by_relative_likelihood();
    Ok(())
}

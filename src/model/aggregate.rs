//! Composite and amalgamated consensus models

use super::{Model, MODEL_DECIMALS};
use crate::candidate::Candidate;
use crate::error::{GaError, Result};
use crate::likelihood::Paradigm;
use nalgebra::DMatrix;

/// Fitness-weighted sum of one run's final unique candidates, rounded to
/// three decimals. Cotemporal composites are then symmetrized.
pub fn composite_model(candidates: &[Candidate], paradigm: Paradigm) -> Result<Model> {
    let n = common_size(candidates)?;
    let mut sum: DMatrix<f64> = DMatrix::zeros(n, n);
    for (i, c) in candidates.iter().enumerate() {
        let fitness = c.fitness.ok_or_else(|| unscored(i, "fitness"))?;
        sum += c.genes.to_real() * fitness;
    }
    let model = Model::new(sum)?.rounded(MODEL_DECIMALS);
    Ok(if paradigm.is_undirected() {
        model.symmetrized()
    } else {
        model
    })
}

/// Relative-likelihood-weighted average of candidates collected across
/// runs, rounded to three decimals. For cotemporal data each contribution
/// is symmetrized before dividing by the total weight.
///
/// Relative likelihoods must already be normalized across exactly these
/// candidates.
pub fn amalgamated_model(candidates: &[Candidate], paradigm: Paradigm) -> Result<Model> {
    let n = common_size(candidates)?;
    let mut sum: DMatrix<f64> = DMatrix::zeros(n, n);
    let mut total = 0.0;
    for (i, c) in candidates.iter().enumerate() {
        let weight = c.relative_likelihood.ok_or_else(|| unscored(i, "relative likelihood"))?;
        let genes = c.genes.to_real();
        if paradigm.is_undirected() {
            sum += (&genes + genes.transpose()) * weight;
        } else {
            sum += genes * weight;
        }
        total += weight;
    }
    if total.is_nan() || total <= 0.0 {
        return Err(GaError::Numerical {
            candidate: None,
            node: None,
            reason: format!("total relative likelihood {total} cannot weight an average"),
        });
    }
    Ok(Model::new(sum / total)?.rounded(MODEL_DECIMALS))
}

fn common_size(candidates: &[Candidate]) -> Result<usize> {
    let first = candidates
        .first()
        .ok_or(GaError::EmptyPopulation("cannot aggregate zero candidates"))?;
    let n = first.node_count();
    if let Some(c) = candidates.iter().find(|c| c.node_count() != n) {
        return Err(GaError::Data(format!(
            "cannot aggregate {}-node and {}-node candidates",
            n,
            c.node_count()
        )));
    }
    Ok(n)
}

fn unscored(index: usize, what: &str) -> GaError {
    GaError::Numerical {
        candidate: Some(index),
        node: None,
        reason: format!("candidate has no {what}"),
    }
}

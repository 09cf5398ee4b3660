//! Relative likelihoods from log-likelihoods
//!
//! `relative[i] = exp(logL[i]) / Σ_j exp(logL[j])` evaluated as
//! `w_i / Σ_j w_j` with `w_i = exp(logL[i] - M)` and `M = max_j logL[j]`.
//! No unshifted exponential is ever formed and the offset `M` never re-enters
//! the result, so precision does not depend on the magnitude of the logs.

use crate::error::{GaError, Result};

/// Normalize log-likelihoods into weights that sum to one
pub fn relative_likelihoods(log_likelihoods: &[f64]) -> Result<Vec<f64>> {
    if log_likelihoods.is_empty() {
        return Err(GaError::EmptyPopulation("cannot normalize an empty population"));
    }
    if let Some(i) = log_likelihoods
        .iter()
        .position(|v| v.is_nan() || *v == f64::INFINITY)
    {
        return Err(GaError::Numerical {
            candidate: Some(i),
            node: None,
            reason: format!("log-likelihood {} cannot be normalized", log_likelihoods[i]),
        });
    }
    let max = log_likelihoods.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max == f64::NEG_INFINITY {
        return Err(GaError::Numerical {
            candidate: None,
            node: None,
            reason: "every candidate has zero likelihood".into(),
        });
    }
    let weights: Vec<f64> = log_likelihoods.iter().map(|v| (v - max).exp()).collect();
    // the maximum contributes exactly 1, so the sum is at least 1
    let sum: f64 = weights.iter().sum();
    Ok(weights.into_iter().map(|w| w / sum).collect())
}

//! Error taxonomy shared by every stage of the search

use thiserror::Error;

/// Convenience alias used throughout the crate
pub type Result<T> = std::result::Result<T, GaError>;

#[derive(Debug, Error)]
pub enum GaError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Replicate data error: {0}")]
    Data(String),

    /// Likelihood evaluation or normalization failed. `candidate` is the
    /// population index and `node` the offending graph node, when known.
    #[error("Numerical error (candidate {candidate:?}, node {node:?}): {reason}")]
    Numerical {
        candidate: Option<usize>,
        node: Option<usize>,
        reason: String,
    },

    #[error("Structural invariant violated: {0}")]
    Structural(String),

    #[error("Empty population: {0}")]
    EmptyPopulation(&'static str),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl GaError {
    /// Attach the population index to a numerical error raised while
    /// scoring a single graph.
    pub fn with_candidate(self, index: usize) -> Self {
        match self {
            GaError::Numerical { node, reason, .. } => GaError::Numerical {
                candidate: Some(index),
                node,
                reason,
            },
            other => other,
        }
    }

    pub fn is_numerical(&self) -> bool {
        matches!(self, GaError::Numerical { .. })
    }
}

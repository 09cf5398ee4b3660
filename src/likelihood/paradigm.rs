//! Temporal alignment between a node's data and its parents' data

use crate::error::{GaError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

/// How child rows line up with predictor (parent) rows.
///
/// Serialized as the integer selector 1, 2 or 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Paradigm {
    /// Child and parents share the same time index
    Cotemporal,
    /// Parents at time t predict the child at t + 1
    NextStepOne,
    /// Parents at time t predict the child at t + 2
    NextStepOneTwo,
}

impl Paradigm {
    pub fn from_selector(selector: u8) -> Result<Self> {
        match selector {
            1 => Ok(Paradigm::Cotemporal),
            2 => Ok(Paradigm::NextStepOne),
            3 => Ok(Paradigm::NextStepOneTwo),
            other => Err(GaError::Config(format!(
                "invalid paradigm selector {other} (expected 1 = cotemporal, 2 = next step one, 3 = next step one-two)"
            ))),
        }
    }

    pub fn selector(self) -> u8 {
        match self {
            Paradigm::Cotemporal => 1,
            Paradigm::NextStepOne => 2,
            Paradigm::NextStepOneTwo => 3,
        }
    }

    /// Time-count `t'` used in the likelihood exponents
    pub fn effective_time(self, time_points: usize) -> usize {
        match self {
            Paradigm::Cotemporal => time_points,
            Paradigm::NextStepOne => time_points - 1,
            Paradigm::NextStepOneTwo => time_points - 2,
        }
    }

    /// Fewest time points for which both slices are non-empty
    pub fn min_time_points(self) -> usize {
        match self {
            Paradigm::Cotemporal => 1,
            Paradigm::NextStepOne => 3,
            Paradigm::NextStepOneTwo => 4,
        }
    }

    /// Rows of the child column
    pub fn child_rows(self, time_points: usize) -> Range<usize> {
        match self {
            Paradigm::Cotemporal => 0..time_points,
            Paradigm::NextStepOne => 1..time_points - 1,
            Paradigm::NextStepOneTwo => 2..time_points - 1,
        }
    }

    /// Rows of the parent (predictor) block
    pub fn parent_rows(self, time_points: usize) -> Range<usize> {
        match self {
            Paradigm::Cotemporal => 0..time_points,
            Paradigm::NextStepOne => 0..time_points - 2,
            Paradigm::NextStepOneTwo => 0..time_points - 3,
        }
    }

    /// Cotemporal relationships carry no direction
    pub fn is_undirected(self) -> bool {
        self == Paradigm::Cotemporal
    }

    pub fn name(self) -> &'static str {
        match self {
            Paradigm::Cotemporal => "cotemporal",
            Paradigm::NextStepOne => "next-step-one",
            Paradigm::NextStepOneTwo => "next-step-one-two",
        }
    }
}

impl TryFrom<u8> for Paradigm {
    type Error = GaError;

    fn try_from(selector: u8) -> Result<Self> {
        Self::from_selector(selector)
    }
}

impl From<Paradigm> for u8 {
    fn from(p: Paradigm) -> u8 {
        p.selector()
    }
}

impl fmt::Display for Paradigm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_round_trip() {
        for s in 1..=3u8 {
            assert_eq!(Paradigm::from_selector(s).unwrap().selector(), s);
        }
        assert!(matches!(Paradigm::from_selector(0), Err(GaError::Config(_))));
        assert!(matches!(Paradigm::from_selector(4), Err(GaError::Config(_))));
    }

    #[test]
    fn test_slices_have_equal_length() {
        for p in [Paradigm::Cotemporal, Paradigm::NextStepOne, Paradigm::NextStepOneTwo] {
            for t in p.min_time_points()..12 {
                assert_eq!(p.child_rows(t).len(), p.parent_rows(t).len());
                assert!(!p.child_rows(t).is_empty());
            }
        }
    }

    #[test]
    fn test_offsets() {
        assert_eq!(Paradigm::NextStepOne.child_rows(10), 1..9);
        assert_eq!(Paradigm::NextStepOne.parent_rows(10), 0..8);
        assert_eq!(Paradigm::NextStepOneTwo.child_rows(10), 2..9);
        assert_eq!(Paradigm::NextStepOneTwo.parent_rows(10), 0..7);
        assert_eq!(Paradigm::NextStepOneTwo.effective_time(10), 8);
    }

    #[test]
    fn test_serde_selector() {
        let p: Paradigm = serde_json::from_str("2").unwrap();
        assert_eq!(p, Paradigm::NextStepOne);
        assert_eq!(serde_json::to_string(&Paradigm::NextStepOneTwo).unwrap(), "3");
        assert!(serde_json::from_str::<Paradigm>("7").is_err());
    }
}

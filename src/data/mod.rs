//! Replicate time-series data
//!
//! A replicate set is an ordered list of equally shaped `T × N` matrices
//! (rows are time points, columns are biological entities). Sets are never
//! mutated: transforms return a fresh set.

use crate::error::{GaError, Result};
use log::info;
use nalgebra::DMatrix;
use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Immutable collection of replicate measurements
#[derive(Debug, Clone, PartialEq)]
pub struct ReplicateSet {
    name: String,
    entity_names: Vec<String>,
    replicates: Vec<DMatrix<f64>>,
}

/// On-disk JSON layout for a replicate set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplicateFile {
    pub name: String,
    pub entity_names: Vec<String>,
    /// `replicates[r][t][n]`
    pub replicates: Vec<Vec<Vec<f64>>>,
    #[serde(default)]
    pub log_transform: bool,
    #[serde(default)]
    pub zscore_transform: bool,
}

impl ReplicateSet {
    /// Build a set, checking that every replicate has the same shape and one
    /// column per entity name.
    pub fn new(
        name: impl Into<String>,
        entity_names: Vec<String>,
        replicates: Vec<DMatrix<f64>>,
    ) -> Result<Self> {
        let first = replicates
            .first()
            .ok_or_else(|| GaError::Data("at least one replicate is required".into()))?;
        let (t, n) = first.shape();
        if t == 0 || n == 0 {
            return Err(GaError::Data(format!("replicate shape {t}x{n} is empty")));
        }
        if entity_names.len() != n {
            return Err(GaError::Data(format!(
                "{} entity names for {} data columns",
                entity_names.len(),
                n
            )));
        }
        for (i, rep) in replicates.iter().enumerate() {
            if rep.shape() != (t, n) {
                return Err(GaError::Data(format!(
                    "replicate {} has shape {}x{}, expected {}x{}",
                    i,
                    rep.nrows(),
                    rep.ncols(),
                    t,
                    n
                )));
            }
            if rep.iter().any(|v| !v.is_finite()) {
                return Err(GaError::Data(format!("replicate {i} contains non-finite values")));
            }
        }
        Ok(Self {
            name: name.into(),
            entity_names,
            replicates,
        })
    }

    /// Build from nested rows (`replicates[r][t][n]`)
    pub fn from_rows(
        name: impl Into<String>,
        entity_names: Vec<String>,
        rows: &[Vec<Vec<f64>>],
    ) -> Result<Self> {
        let mut replicates = Vec::with_capacity(rows.len());
        for (i, rep) in rows.iter().enumerate() {
            let t = rep.len();
            let n = rep.first().map(|r| r.len()).unwrap_or(0);
            if rep.iter().any(|row| row.len() != n) {
                return Err(GaError::Data(format!("replicate {i} has ragged rows")));
            }
            let flat: Vec<f64> = rep.iter().flatten().copied().collect();
            replicates.push(DMatrix::from_row_slice(t, n, &flat));
        }
        Self::new(name, entity_names, replicates)
    }

    /// Load a JSON replicate file and apply the transforms it requests
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let file: ReplicateFile = serde_json::from_str(&json)?;
        let set = Self::from_rows(file.name, file.entity_names, &file.replicates)?
            .transformed(file.log_transform, file.zscore_transform)?;
        info!(
            "Loaded replicate set '{}' from {}: {} replicates of {}x{}",
            set.name,
            path.as_ref().display(),
            set.replicate_count(),
            set.time_points(),
            set.entity_count()
        );
        Ok(set)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn entity_names(&self) -> &[String] {
        &self.entity_names
    }

    pub fn replicates(&self) -> &[DMatrix<f64>] {
        &self.replicates
    }

    pub fn replicate_count(&self) -> usize {
        self.replicates.len()
    }

    pub fn time_points(&self) -> usize {
        self.replicates[0].nrows()
    }

    pub fn entity_count(&self) -> usize {
        self.replicates[0].ncols()
    }

    /// Natural log of every measurement. All values must be positive.
    pub fn log_transform(&self) -> Result<Self> {
        if let Some(v) = self.replicates.iter().flat_map(|r| r.iter()).find(|v| **v <= 0.0) {
            return Err(GaError::Data(format!(
                "log transform needs positive values, found {v}"
            )));
        }
        Ok(self.with_replicates(self.replicates.iter().map(|r| r.map(f64::ln)).collect()))
    }

    /// Column-wise z-score of every replicate (population standard deviation)
    pub fn zscore_transform(&self) -> Result<Self> {
        let mut out = Vec::with_capacity(self.replicates.len());
        for (i, rep) in self.replicates.iter().enumerate() {
            let t = rep.nrows() as f64;
            let mut scored = rep.clone();
            for (j, mut col) in scored.column_iter_mut().enumerate() {
                let mean = col.sum() / t;
                let var = col.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / t;
                if var <= 0.0 {
                    return Err(GaError::Data(format!(
                        "column '{}' of replicate {} has zero variance",
                        self.entity_names[j], i
                    )));
                }
                let sd = var.sqrt();
                col.apply(|x| *x = (*x - mean) / sd);
            }
            out.push(scored);
        }
        Ok(self.with_replicates(out))
    }

    /// Apply the optional transforms, log first
    pub fn transformed(&self, log: bool, zscore: bool) -> Result<Self> {
        let mut set = self.clone();
        if log {
            set = set.log_transform()?;
        }
        if zscore {
            set = set.zscore_transform()?;
        }
        Ok(set)
    }

    /// Synthetic data with `groups` blocks of strongly correlated entities,
    /// in the spirit of the simulated sets the method was validated on.
    pub fn synthetic<R: Rng + ?Sized>(
        rng: &mut R,
        replicates: usize,
        time_points: usize,
        entities: usize,
        groups: usize,
        correlation: f64,
    ) -> Result<Self> {
        let groups = groups.clamp(1, entities.max(1));
        let noise = (1.0 - correlation * correlation).max(0.0).sqrt();
        let reps = (0..replicates)
            .map(|_| {
                let mut m = DMatrix::zeros(time_points, entities);
                for t in 0..time_points {
                    let latent: Vec<f64> =
                        (0..groups).map(|_| rng.sample(StandardNormal)).collect();
                    for n in 0..entities {
                        let g = n * groups / entities.max(1);
                        let eps: f64 = rng.sample(StandardNormal);
                        m[(t, n)] = correlation * latent[g] + noise * eps;
                    }
                }
                m
            })
            .collect();
        let names = (1..=entities).map(|i| format!("BE{i}")).collect();
        Self::new("synthetic", names, reps)
    }

    fn with_replicates(&self, replicates: Vec<DMatrix<f64>>) -> Self {
        Self {
            name: self.name.clone(),
            entity_names: self.entity_names.clone(),
            replicates,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("E{i}")).collect()
    }

    #[test]
    fn test_shape_validation() {
        let a = DMatrix::from_element(4, 3, 1.0);
        let b = DMatrix::from_element(5, 3, 1.0);
        assert!(ReplicateSet::new("x", names(3), vec![a.clone(), b]).is_err());
        assert!(ReplicateSet::new("x", names(2), vec![a.clone()]).is_err());
        assert!(ReplicateSet::new("x", names(3), vec![]).is_err());
        let set = ReplicateSet::new("x", names(3), vec![a.clone(), a]).unwrap();
        assert_eq!(set.replicate_count(), 2);
        assert_eq!(set.time_points(), 4);
        assert_eq!(set.entity_count(), 3);
    }

    #[test]
    fn test_from_rows_is_row_major() {
        let rows = vec![vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]]];
        let set = ReplicateSet::from_rows("x", names(2), &rows).unwrap();
        assert_eq!(set.replicates()[0][(1, 0)], 3.0);
        assert_eq!(set.replicates()[0][(2, 1)], 6.0);
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let rows = vec![vec![vec![1.0, 2.0], vec![3.0]]];
        assert!(ReplicateSet::from_rows("x", names(2), &rows).is_err());
    }

    #[test]
    fn test_zscore_returns_new_set() {
        let rows = vec![vec![vec![1.0, 10.0], vec![2.0, 20.0], vec![3.0, 60.0]]];
        let set = ReplicateSet::from_rows("x", names(2), &rows).unwrap();
        let z = set.zscore_transform().unwrap();
        // original untouched
        assert_eq!(set.replicates()[0][(0, 0)], 1.0);
        for col in z.replicates()[0].column_iter() {
            let mean = col.sum() / 3.0;
            let var = col.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / 3.0;
            assert!(mean.abs() < 1e-12);
            assert!((var - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_zscore_zero_variance_is_error() {
        let rows = vec![vec![vec![1.0, 1.0], vec![1.0, 2.0]]];
        let set = ReplicateSet::from_rows("x", names(2), &rows).unwrap();
        assert!(matches!(set.zscore_transform(), Err(GaError::Data(_))));
    }

    #[test]
    fn test_log_transform() {
        let rows = vec![vec![vec![1.0, std::f64::consts::E]]];
        let set = ReplicateSet::from_rows("x", names(2), &rows).unwrap();
        let logged = set.log_transform().unwrap();
        assert!((logged.replicates()[0][(0, 1)] - 1.0).abs() < 1e-12);
        let bad = ReplicateSet::from_rows("x", names(2), &[vec![vec![0.0, 1.0]]]).unwrap();
        assert!(bad.log_transform().is_err());
    }

    #[test]
    fn test_synthetic_shape() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let set = ReplicateSet::synthetic(&mut rng, 3, 10, 12, 3, 0.9).unwrap();
        assert_eq!(set.replicate_count(), 3);
        assert_eq!(set.time_points(), 10);
        assert_eq!(set.entity_count(), 12);
        assert_eq!(set.entity_names()[11], "BE12");
    }

    #[test]
    fn test_synthetic_columns_are_standard_normal() {
        let mut rng = ChaCha8Rng::seed_from_u64(19);
        let set = ReplicateSet::synthetic(&mut rng, 1, 4000, 4, 2, 0.9).unwrap();
        let m = &set.replicates()[0];
        for col in m.column_iter() {
            let mean = col.sum() / 4000.0;
            let var = col.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / 4000.0;
            assert!(mean.abs() < 0.1, "mean {mean}");
            assert!((var - 1.0).abs() < 0.1, "variance {var}");
        }
        // entities 0 and 1 share a latent factor, 1 and 2 do not
        let dot = |a: usize, b: usize| m.column(a).dot(&m.column(b)) / 4000.0;
        assert!((dot(0, 1) - 0.81).abs() < 0.1);
        assert!(dot(1, 2).abs() < 0.1);
    }
}

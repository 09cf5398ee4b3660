//! Integer adjacency matrix encoding one directed graph hypothesis
//!
//! `genes[(i, j)] == 1` means entity `i` → entity `j`.

use crate::error::{GaError, Result};
use nalgebra::DMatrix;
use petgraph::graph::{DiGraph, NodeIndex};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Square 0/1 matrix, privately owned by a single candidate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjacencyMatrix {
    genes: DMatrix<u8>,
}

impl AdjacencyMatrix {
    /// Graph with `n` nodes and no edges
    pub fn empty(n: usize) -> Self {
        Self {
            genes: DMatrix::zeros(n, n),
        }
    }

    /// Build from 0/1 rows; any non-zero cell counts as an edge
    pub fn from_rows(rows: &[Vec<u8>]) -> Result<Self> {
        let n = rows.len();
        if rows.iter().any(|r| r.len() != n) {
            return Err(GaError::Data(format!("adjacency rows must all have length {n}")));
        }
        let mut m = Self::empty(n);
        for (i, row) in rows.iter().enumerate() {
            for (j, &v) in row.iter().enumerate() {
                m.set(i, j, v != 0);
            }
        }
        Ok(m)
    }

    /// Build from an explicit edge list
    pub fn from_edges(n: usize, edges: &[(usize, usize)]) -> Self {
        let mut m = Self::empty(n);
        for &(i, j) in edges {
            m.set(i, j, true);
        }
        m
    }

    /// Random genes: draw a ones budget uniformly in `0..=N²·pct/100`, then
    /// set that many uniformly chosen cells (repeats allowed).
    pub fn random<R: Rng + ?Sized>(rng: &mut R, n: usize, ones_percentage: u32) -> Self {
        let mut m = Self::empty(n);
        if n == 0 {
            return m;
        }
        let budget = (n * n * ones_percentage as usize) / 100;
        let ones = rng.gen_range(0..=budget);
        for _ in 0..ones {
            let i = rng.gen_range(0..n);
            let j = rng.gen_range(0..n);
            m.set(i, j, true);
        }
        m
    }

    pub fn size(&self) -> usize {
        self.genes.nrows()
    }

    pub fn get(&self, i: usize, j: usize) -> bool {
        self.genes[(i, j)] != 0
    }

    pub fn set(&mut self, i: usize, j: usize, edge: bool) {
        self.genes[(i, j)] = u8::from(edge);
    }

    /// Flip a single bit
    pub fn toggle(&mut self, i: usize, j: usize) {
        self.genes[(i, j)] = 1 - self.genes[(i, j)];
    }

    pub fn count_ones(&self) -> usize {
        self.genes.iter().map(|&v| v as usize).sum()
    }

    pub fn in_degree(&self, node: usize) -> usize {
        self.genes.column(node).iter().map(|&v| v as usize).sum()
    }

    /// Direct predecessors of `node`, in index order
    pub fn parents(&self, node: usize) -> Vec<usize> {
        (0..self.size()).filter(|&p| self.get(p, node)).collect()
    }

    /// Direct successors of `node`, in index order
    pub fn children(&self, node: usize) -> Vec<usize> {
        (0..self.size()).filter(|&c| self.get(node, c)).collect()
    }

    pub fn edges(&self) -> Vec<(usize, usize)> {
        let n = self.size();
        (0..n)
            .flat_map(|i| (0..n).map(move |j| (i, j)))
            .filter(|&(i, j)| self.get(i, j))
            .collect()
    }

    pub fn transpose(&self) -> Self {
        Self {
            genes: self.genes.transpose(),
        }
    }

    /// Exchange column `col` with the same column of `other`
    pub fn swap_column(&mut self, other: &mut Self, col: usize) {
        for i in 0..self.size() {
            std::mem::swap(&mut self.genes[(i, col)], &mut other.genes[(i, col)]);
        }
    }

    pub fn has_self_loops(&self) -> bool {
        (0..self.size()).any(|i| self.get(i, i))
    }

    pub fn max_in_degree(&self) -> usize {
        (0..self.size()).map(|j| self.in_degree(j)).max().unwrap_or(0)
    }

    /// Directed graph view with node weights equal to matrix indices
    pub fn to_digraph(&self) -> DiGraph<usize, ()> {
        let mut g = DiGraph::with_capacity(self.size(), self.count_ones());
        let nodes: Vec<NodeIndex> = (0..self.size()).map(|i| g.add_node(i)).collect();
        for (i, j) in self.edges() {
            g.add_edge(nodes[i], nodes[j], ());
        }
        g
    }

    pub fn is_acyclic(&self) -> bool {
        !petgraph::algo::is_cyclic_directed(&self.to_digraph())
    }

    /// Real-valued copy for model aggregation
    pub fn to_real(&self) -> DMatrix<f64> {
        self.genes.map(f64::from)
    }

    /// SHA-256 of the gene matrix, used for structural identity
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update((self.size() as u64).to_le_bytes());
        for i in 0..self.size() {
            for j in 0..self.size() {
                hasher.update([self.genes[(i, j)]]);
            }
        }
        hex::encode(hasher.finalize())
    }

    /// Row-major textual dump, one row per line
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for row in self.genes.row_iter() {
            let cells: Vec<String> = row.iter().map(|v| v.to_string()).collect();
            out.push_str(&cells.join(" "));
            out.push('\n');
        }
        out
    }
}

impl fmt::Display for AdjacencyMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

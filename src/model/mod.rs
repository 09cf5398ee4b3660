//! Model: real-valued consensus over many candidate graphs
//!
//! Models are derived once per aggregation call and never modified after.
//! They are kept apart from `AdjacencyMatrix`: a model cell is a weight,
//! not an edge flag.

mod aggregate;

pub use aggregate::{amalgamated_model, composite_model};

use crate::error::{GaError, Result};
use crate::likelihood::Paradigm;
use nalgebra::DMatrix;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Decimal places kept by every aggregated model
pub const MODEL_DECIMALS: i32 = 3;

/// Square N×N weight matrix
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    weights: DMatrix<f64>,
}

impl Model {
    pub fn new(weights: DMatrix<f64>) -> Result<Self> {
        if weights.nrows() != weights.ncols() {
            return Err(GaError::Data(format!(
                "model must be square, got {}x{}",
                weights.nrows(),
                weights.ncols()
            )));
        }
        if weights.iter().any(|w| !w.is_finite()) {
            return Err(GaError::Numerical {
                candidate: None,
                node: None,
                reason: "model contains a non-finite weight".into(),
            });
        }
        Ok(Self { weights })
    }

    pub fn size(&self) -> usize {
        self.weights.nrows()
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.weights[(i, j)]
    }

    /// Every cell rounded half away from zero to `decimals` places
    pub fn rounded(&self, decimals: i32) -> Self {
        let scale = 10f64.powi(decimals);
        Self {
            weights: self.weights.map(|w| (w * scale).round() / scale),
        }
    }

    /// `M + Mᵀ`, the undirected reading of a cotemporal model
    pub fn symmetrized(&self) -> Self {
        Self {
            weights: &self.weights + self.weights.transpose(),
        }
    }

    /// Row-major dump, one row per line, three decimals per cell
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for row in self.weights.row_iter() {
            let cells: Vec<String> = row.iter().map(|w| format!("{w:.3}")).collect();
            out.push_str(&cells.join(" "));
            out.push('\n');
        }
        out
    }

    /// Graph of every cell at or above `threshold`, nodes labelled with
    /// `names` and edges weighted by the cell value
    pub fn to_graph(&self, names: &[String], threshold: f64) -> Result<DiGraph<String, f64>> {
        self.check_names(names)?;
        let mut graph = DiGraph::new();
        let nodes: Vec<NodeIndex> = names.iter().map(|n| graph.add_node(n.clone())).collect();
        for i in 0..self.size() {
            for j in 0..self.size() {
                let w = self.get(i, j);
                if w >= threshold {
                    graph.add_edge(nodes[i], nodes[j], w);
                }
            }
        }
        Ok(graph)
    }

    /// Graphviz DOT text for the thresholded graph. Cotemporal models are
    /// drawn undirected with each pair once; full-weight edges are green,
    /// the rest red.
    pub fn to_dot(&self, names: &[String], threshold: f64, paradigm: Paradigm) -> Result<String> {
        let graph = self.to_graph(names, threshold)?;
        let undirected = paradigm.is_undirected();
        let (kind, arrow) = if undirected { ("graph", "--") } else { ("digraph", "->") };

        let mut out = format!("{kind} {{\n");
        for idx in graph.node_indices() {
            out.push_str(&format!("    \"{}\";\n", escape(&graph[idx])));
        }
        for edge in graph.raw_edges() {
            let (from, to) = (edge.source(), edge.target());
            if undirected && from.index() >= to.index() {
                continue;
            }
            let colour = if edge.weight == 1.0 { "green" } else { "red" };
            out.push_str(&format!(
                "    \"{}\" {arrow} \"{}\" [label=\"{}\", color={colour}];\n",
                escape(&graph[from]),
                escape(&graph[to]),
                edge.weight
            ));
        }
        out.push_str("}\n");
        Ok(out)
    }

    fn check_names(&self, names: &[String]) -> Result<()> {
        if names.len() != self.size() {
            return Err(GaError::Data(format!(
                "{} entity names for a {}-node model",
                names.len(),
                self.size()
            )));
        }
        Ok(())
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

fn escape(name: &str) -> String {
    name.replace('\\', "\\\\").replace('"', "\\\"")
}

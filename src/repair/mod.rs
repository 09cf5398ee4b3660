//! Repair: turn an arbitrary adjacency matrix into a legal DAG
//!
//! Three phases, always in this order:
//! 1. clear the diagonal (self-loops)
//! 2. cap every node at `MAX_PARENTS` incoming edges, dropping random parents
//! 3. while any simple cycle remains, delete the edge that appears in the
//!    most cycles
//!
//! Candidates are repaired independently of each other.

mod cycles;

pub use cycles::{cycle_edges, edge_participation, most_repeated_edge, simple_cycles};

use crate::candidate::{AdjacencyMatrix, Candidate, Population};
use crate::error::{GaError, Result};
use log::debug;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

/// Upper bound on the in-degree of any node in a legal candidate
pub const MAX_PARENTS: usize = 3;

/// Zero every self-loop
pub fn remove_self_loops(genes: &mut AdjacencyMatrix) {
    for i in 0..genes.size() {
        genes.set(i, i, false);
    }
}

/// Drop uniformly chosen parents until no node has more than `max_parents`
pub fn cap_in_degree<R: Rng + ?Sized>(genes: &mut AdjacencyMatrix, max_parents: usize, rng: &mut R) {
    for node in 0..genes.size() {
        let mut parents = genes.parents(node);
        while parents.len() > max_parents {
            let victim = parents.remove(rng.gen_range(0..parents.len()));
            genes.set(victim, node, false);
        }
    }
}

/// Break every directed cycle, returning the edges removed in order
pub fn break_cycles(genes: &mut AdjacencyMatrix) -> Vec<(usize, usize)> {
    let mut removed = Vec::new();
    while let Some(((from, to), count)) = most_repeated_edge(genes) {
        debug!("Removing edge {}->{} (in {} cycles)", from, to, count);
        genes.set(from, to, false);
        removed.push((from, to));
    }
    removed
}

/// Fail loudly if `genes` is not a legal candidate
pub fn check_legal(genes: &AdjacencyMatrix) -> Result<()> {
    if genes.has_self_loops() {
        return Err(GaError::Structural("self-loop survived repair".into()));
    }
    let max_in = genes.max_in_degree();
    if max_in > MAX_PARENTS {
        return Err(GaError::Structural(format!(
            "node with {max_in} parents survived repair (limit {MAX_PARENTS})"
        )));
    }
    if !genes.is_acyclic() {
        return Err(GaError::Structural("directed cycle survived repair".into()));
    }
    Ok(())
}

/// Run all three phases on one gene matrix
pub fn repair_genes<R: Rng + ?Sized>(genes: &mut AdjacencyMatrix, rng: &mut R) -> Result<()> {
    remove_self_loops(genes);
    cap_in_degree(genes, MAX_PARENTS, rng);
    break_cycles(genes);
    check_legal(genes)
}

/// Repair one candidate; its cached scores no longer apply
pub fn repair_candidate<R: Rng + ?Sized>(candidate: &mut Candidate, rng: &mut R) -> Result<()> {
    repair_genes(&mut candidate.genes, rng)?;
    candidate.invalidate();
    Ok(())
}

/// Repair a whole population in parallel. Each candidate gets its own
/// generator seeded from `rng`, so results do not depend on scheduling.
pub fn repair_population<R: Rng + ?Sized>(population: &mut Population, rng: &mut R) -> Result<()> {
    let seeds: Vec<u64> = (0..population.len()).map(|_| rng.gen()).collect();
    population
        .candidates
        .par_iter_mut()
        .zip(seeds)
        .try_for_each(|(candidate, seed)| {
            repair_candidate(candidate, &mut ChaCha8Rng::seed_from_u64(seed))
        })
}

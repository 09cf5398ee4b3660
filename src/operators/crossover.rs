//! Single-column crossover

use crate::candidate::Candidate;
use rand::Rng;

/// Mate two parents. With probability `selection_probability` one random
/// column is exchanged between the children; otherwise the children are
/// plain copies. Parents are never modified or aliased.
pub fn crossover<R: Rng + ?Sized>(
    parent_a: &Candidate,
    parent_b: &Candidate,
    selection_probability: f64,
    rng: &mut R,
) -> (Candidate, Candidate) {
    let mut child_a = parent_a.offspring();
    let mut child_b = parent_b.offspring();
    let n = child_a.genes.size();
    if n > 0 && rng.gen::<f64>() < selection_probability {
        let column = rng.gen_range(0..n);
        child_a.genes.swap_column(&mut child_b.genes, column);
    }
    (child_a, child_b)
}

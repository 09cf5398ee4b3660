//! Simple-cycle enumeration and edge participation counts
//!
//! Enumeration is exponential in the worst case; candidate graphs are small
//! (about a dozen nodes, at most three parents each) so this stays cheap.

use crate::candidate::AdjacencyMatrix;
use petgraph::algo::tarjan_scc;

/// Every elementary directed cycle, each listed once starting from its
/// smallest node. Order: by start node, then depth-first in index order.
pub fn simple_cycles(genes: &AdjacencyMatrix) -> Vec<Vec<usize>> {
    let n = genes.size();
    let component = component_ids(genes);
    let mut cycles = Vec::new();
    let mut path = Vec::with_capacity(n);
    let mut on_path = vec![false; n];

    for start in 0..n {
        path.push(start);
        on_path[start] = true;
        extend(genes, &component, start, start, &mut path, &mut on_path, &mut cycles);
        on_path[start] = false;
        path.pop();
    }
    cycles
}

fn extend(
    genes: &AdjacencyMatrix,
    component: &[usize],
    start: usize,
    node: usize,
    path: &mut Vec<usize>,
    on_path: &mut [bool],
    cycles: &mut Vec<Vec<usize>>,
) {
    for next in genes.children(node) {
        if component[next] != component[start] || next < start {
            continue;
        }
        if next == start {
            cycles.push(path.clone());
        } else if !on_path[next] {
            path.push(next);
            on_path[next] = true;
            extend(genes, component, start, next, path, on_path, cycles);
            on_path[next] = false;
            path.pop();
        }
    }
}

/// Strongly connected component id of every node; edges between
/// components can never close a cycle.
fn component_ids(genes: &AdjacencyMatrix) -> Vec<usize> {
    let graph = genes.to_digraph();
    let mut ids = vec![0; genes.size()];
    for (id, scc) in tarjan_scc(&graph).into_iter().enumerate() {
        for idx in scc {
            ids[graph[idx]] = id;
        }
    }
    ids
}

/// Directed edges of a cycle, closing back to its first node
pub fn cycle_edges(cycle: &[usize]) -> Vec<(usize, usize)> {
    (0..cycle.len())
        .map(|i| (cycle[i], cycle[(i + 1) % cycle.len()]))
        .collect()
}

/// How many simple cycles each edge takes part in, in first-seen order
pub fn edge_participation(cycles: &[Vec<usize>]) -> Vec<((usize, usize), usize)> {
    let mut counts: Vec<((usize, usize), usize)> = Vec::new();
    for cycle in cycles {
        for edge in cycle_edges(cycle) {
            match counts.iter_mut().find(|(e, _)| *e == edge) {
                Some((_, count)) => *count += 1,
                None => counts.push((edge, 1)),
            }
        }
    }
    counts
}

/// Edge in the most cycles; ties go to the first one found.
/// `None` once the graph is acyclic.
pub fn most_repeated_edge(genes: &AdjacencyMatrix) -> Option<((usize, usize), usize)> {
    let counts = edge_participation(&simple_cycles(genes));
    let mut best: Option<((usize, usize), usize)> = None;
    for (edge, count) in counts {
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((edge, count));
        }
    }
    best
}

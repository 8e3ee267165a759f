use log::trace;
use rand::Rng;

use crate::network::graph::{EdgeSet, Graph, NodeId};

/// Community of node `i`: `floor(i / (n / communities))`, with real division.
pub(crate) fn community_of(i: usize, n: usize, communities: usize) -> usize {
    let block = n as f64 / communities as f64;
    (i as f64 / block).floor() as usize
}

/// Planted-partition graph: nodes are split into contiguous blocks, pairs inside a block connect
/// with probability `p_in`, pairs across blocks with `p_out`.
pub(crate) fn community<R: Rng>(
    rng: &mut R,
    n: usize,
    communities: usize,
    p_in: f64,
    p_out: f64,
) -> Graph {
    trace!("generating community graph (n={n}, communities={communities}, p_in={p_in}, p_out={p_out})");
    let assignment: Vec<usize> = (0..n).map(|i| community_of(i, n, communities)).collect();
    let mut edges = EdgeSet::new(n);
    for i in 0..n {
        for j in (i + 1)..n {
            let p = if assignment[i] == assignment[j] {
                p_in
            } else {
                p_out
            };
            if rng.random_bool(p) {
                edges.insert(NodeId(i), NodeId(j));
            }
        }
    }
    edges.into_graph(Some(assignment))
}

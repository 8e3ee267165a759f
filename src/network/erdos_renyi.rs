use log::trace;
use rand::Rng;

use crate::network::graph::{EdgeSet, Graph, NodeId};

/// G(n, p): every unordered pair `(i, j)`, `i < j`, is connected independently with
/// probability `p`. Pairs are visited in lexicographic order, one draw per pair.
pub(crate) fn erdos_renyi<R: Rng>(rng: &mut R, n: usize, p: f64) -> Graph {
    trace!("generating Erdos-Renyi graph (n={n}, p={p})");
    let mut edges = EdgeSet::new(n);
    for i in 0..n {
        for j in (i + 1)..n {
            if rng.random_bool(p) {
                edges.insert(NodeId(i), NodeId(j));
            }
        }
    }
    edges.into_graph(None)
}

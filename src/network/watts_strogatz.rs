use log::{debug, trace};
use rand::Rng;

use crate::network::graph::{EdgeSet, Graph, NodeId};

/// Maximum number of candidate targets drawn when rewiring a single lattice edge.
pub const REWIRE_ATTEMPT_CAP: usize = 100;

/// Result of trying to rewire one lattice edge.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Rewire {
    Rewired(NodeId),
    /// Every candidate was the source or already adjacent to it; the edge stays as it was.
    Exhausted,
}

fn rewire_target<R: Rng>(rng: &mut R, edges: &EdgeSet, n: usize, source: NodeId) -> Rewire {
    for _ in 0..REWIRE_ATTEMPT_CAP {
        let candidate = NodeId(rng.random_range(0..n));
        if candidate != source && !edges.contains(source, candidate) {
            return Rewire::Rewired(candidate);
        }
    }
    Rewire::Exhausted
}

/// Small-world graph: a ring lattice where each node links to its `k / 2` successors, after which
/// every lattice edge, in order, has its target moved with probability `beta`.
pub(crate) fn watts_strogatz<R: Rng>(rng: &mut R, n: usize, k: usize, beta: f64) -> Graph {
    trace!("generating Watts-Strogatz graph (n={n}, k={k}, beta={beta})");
    let mut edges = EdgeSet::new(n);
    for i in 0..n {
        for j in 1..=(k / 2) {
            edges.insert(NodeId(i), NodeId((i + j) % n));
        }
    }

    let mut exhausted = 0usize;
    for index in 0..edges.len() {
        if !rng.random_bool(beta) {
            continue;
        }
        let (source, target) = edges.get(index);
        match rewire_target(rng, &edges, n, source) {
            Rewire::Rewired(new_target) => edges.retarget(index, new_target),
            Rewire::Exhausted => {
                debug!("keeping edge {source}-{target}: no rewire target after {REWIRE_ATTEMPT_CAP} attempts");
                exhausted += 1;
            }
        }
    }
    if exhausted > 0 {
        debug!("{exhausted} Watts-Strogatz rewires exhausted their attempts");
    }

    edges.into_graph(None)
}

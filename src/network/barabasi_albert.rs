use log::trace;
use rand::distr::weighted::WeightedIndex;
use rand::distr::Distribution;
use rand::Rng;

use crate::network::graph::{EdgeSet, Graph, NodeId};

/// Picks `m` distinct targets among nodes `0..degrees.len()` with probability proportional to
/// degree. Duplicate picks are redrawn. If every candidate has degree zero the pick is uniform.
fn preferential_targets<R: Rng>(rng: &mut R, degrees: &[usize], m: usize) -> Vec<usize> {
    let weighted = WeightedIndex::new(degrees).ok();
    let mut targets = Vec::with_capacity(m);
    while targets.len() < m {
        let target = match &weighted {
            Some(distribution) => distribution.sample(rng),
            None => rng.random_range(0..degrees.len()),
        };
        if !targets.contains(&target) {
            targets.push(target);
        }
    }
    targets
}

/// Scale-free graph grown by preferential attachment from a complete seed graph on `m` nodes.
///
/// Degrees are maintained incrementally and are frozen while a new node chooses its `m` targets,
/// so a node's own picks do not bias each other.
pub(crate) fn barabasi_albert<R: Rng>(rng: &mut R, n: usize, m: usize) -> Graph {
    trace!("generating Barabasi-Albert graph (n={n}, m={m})");
    let mut edges = EdgeSet::new(n);
    let mut degrees = vec![0usize; n];

    for i in 0..m {
        for j in (i + 1)..m {
            edges.insert(NodeId(i), NodeId(j));
        }
        degrees[i] = m - 1;
    }

    for i in m..n {
        for target in preferential_targets(rng, &degrees[..i], m) {
            edges.insert(NodeId(i), NodeId(target));
            degrees[target] += 1;
        }
        degrees[i] = m;
    }

    edges.into_graph(None)
}

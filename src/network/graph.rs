/*!

The `Graph` is the arena every other component indexes into: nodes are the integers `0..n`, edges
are stored once in generation order, and each node owns an adjacency list of `(neighbor, edge
index)` pairs built from that same order. Walking a node's adjacency list therefore visits its
neighbors in exactly the order a linear scan of the edge set would.

Generators never build a `Graph` directly. They collect unordered pairs in an [`EdgeSet`], which
rejects self-loops and duplicates, and convert it once the structure is final.

*/

use std::fmt::{self, Display};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::EpiError;
use crate::HashSet;

/// The id of a node, equal to its index in the graph and in the population.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub usize);

impl NodeId {
    #[must_use]
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An undirected contact between two individuals.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Edge {
    pub source: NodeId,
    pub target: NodeId,
    /// Contact weight in `[0, 1)`. Informational only.
    pub weight: f32,
    /// True only while a transmission attempt over this edge is in flight.
    pub(crate) active: bool,
}

impl Edge {
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Returns the endpoint opposite to `node`.
    #[must_use]
    pub fn other(&self, node: NodeId) -> NodeId {
        if self.source == node {
            self.target
        } else {
            self.source
        }
    }
}

/// One entry of an adjacency list.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Adjacent {
    pub neighbor: NodeId,
    /// Index of the connecting edge in [`Graph::edges`].
    pub edge: usize,
}

#[derive(Clone, Debug)]
pub struct Graph {
    node_count: usize,
    edges: Vec<Edge>,
    adjacency: Vec<Vec<Adjacent>>,
    communities: Option<Vec<usize>>,
}

impl Graph {
    /// Builds a graph over nodes `0..node_count` from explicit `(source, target)` pairs, in the
    /// given order. Every edge gets weight `1.0`.
    ///
    /// # Errors
    /// Returns `EpiError::InvalidParameter` for an unknown node, a self-loop or a duplicate
    /// edge.
    pub fn from_edges<I>(node_count: usize, pairs: I) -> Result<Graph, EpiError>
    where
        I: IntoIterator<Item = (usize, usize)>,
    {
        let mut set = EdgeSet::new(node_count);
        for (source, target) in pairs {
            if source >= node_count || target >= node_count {
                return Err(EpiError::invalid(format!(
                    "edge {source}-{target} refers to a node outside 0..{node_count}"
                )));
            }
            if source == target {
                return Err(EpiError::invalid(format!("self-loop on node {source}")));
            }
            if !set.insert(NodeId(source), NodeId(target)) {
                return Err(EpiError::invalid(format!(
                    "duplicate edge {source}-{target}"
                )));
            }
        }
        Ok(set.into_graph(None))
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Iterates over the node ids `0..n`.
    pub fn nodes(&self) -> impl ExactSizeIterator<Item = NodeId> {
        (0..self.node_count).map(NodeId)
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    #[must_use]
    pub fn edge(&self, index: usize) -> Option<&Edge> {
        self.edges.get(index)
    }

    /// The adjacency list of `node`, in edge order. Empty for unknown nodes.
    #[must_use]
    pub fn neighbors(&self, node: NodeId) -> &[Adjacent] {
        self.adjacency
            .get(node.index())
            .map_or(&[][..], Vec::as_slice)
    }

    #[must_use]
    pub fn degree(&self, node: NodeId) -> usize {
        self.neighbors(node).len()
    }

    #[must_use]
    pub fn has_edge(&self, a: NodeId, b: NodeId) -> bool {
        // Scan the shorter list.
        let (from, to) = if self.degree(a) <= self.degree(b) {
            (a, b)
        } else {
            (b, a)
        };
        self.neighbors(from).iter().any(|adj| adj.neighbor == to)
    }

    /// The community index of `node`, defined only for community networks.
    #[must_use]
    pub fn community(&self, node: NodeId) -> Option<usize> {
        self.communities.as_ref()?.get(node.index()).copied()
    }

    /// Draws an independent uniform weight for every edge, in edge order.
    pub(crate) fn assign_weights<R: Rng>(&mut self, rng: &mut R) {
        for edge in &mut self.edges {
            edge.weight = rng.random_range(0.0..1.0);
        }
    }

    pub(crate) fn set_edge_active(&mut self, index: usize, active: bool) {
        if let Some(edge) = self.edges.get_mut(index) {
            edge.active = active;
        }
    }

    pub(crate) fn clear_active_edges(&mut self) {
        for edge in &mut self.edges {
            edge.active = false;
        }
    }
}

/// Unordered pair key: smaller id first.
fn pair_key(a: NodeId, b: NodeId) -> (usize, usize) {
    if a <= b {
        (a.0, b.0)
    } else {
        (b.0, a.0)
    }
}

/// Accumulates the edges of a graph under construction, keeping them unique and loop-free.
#[derive(Debug)]
pub(crate) struct EdgeSet {
    node_count: usize,
    edges: Vec<(NodeId, NodeId)>,
    pairs: HashSet<(usize, usize)>,
}

impl EdgeSet {
    pub(crate) fn new(node_count: usize) -> Self {
        EdgeSet {
            node_count,
            edges: Vec::new(),
            pairs: HashSet::default(),
        }
    }

    /// Adds `(source, target)` unless it is a self-loop or already present. Returns whether the
    /// edge was added.
    pub(crate) fn insert(&mut self, source: NodeId, target: NodeId) -> bool {
        debug_assert!(source.index() < self.node_count && target.index() < self.node_count);
        if source == target || !self.pairs.insert(pair_key(source, target)) {
            return false;
        }
        self.edges.push((source, target));
        true
    }

    pub(crate) fn contains(&self, a: NodeId, b: NodeId) -> bool {
        self.pairs.contains(&pair_key(a, b))
    }

    pub(crate) fn len(&self) -> usize {
        self.edges.len()
    }

    pub(crate) fn get(&self, index: usize) -> (NodeId, NodeId) {
        self.edges[index]
    }

    /// Moves the target of edge `index` to `new_target`, keeping its position in edge order.
    /// The caller guarantees the new pair is neither a self-loop nor a duplicate.
    pub(crate) fn retarget(&mut self, index: usize, new_target: NodeId) {
        let (source, old_target) = self.edges[index];
        debug_assert!(source != new_target && !self.contains(source, new_target));
        self.pairs.remove(&pair_key(source, old_target));
        self.pairs.insert(pair_key(source, new_target));
        self.edges[index] = (source, new_target);
    }

    pub(crate) fn into_graph(self, communities: Option<Vec<usize>>) -> Graph {
        let mut adjacency = vec![Vec::new(); self.node_count];
        let mut edges = Vec::with_capacity(self.edges.len());
        for (index, (source, target)) in self.edges.into_iter().enumerate() {
            adjacency[source.index()].push(Adjacent {
                neighbor: target,
                edge: index,
            });
            adjacency[target.index()].push(Adjacent {
                neighbor: source,
                edge: index,
            });
            edges.push(Edge {
                source,
                target,
                weight: 1.0,
                active: false,
            });
        }

        Graph {
            node_count: self.node_count,
            edges,
            adjacency,
            communities,
        }
    }
}

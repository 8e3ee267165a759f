//! Contact network generation.
//!
//! A network is built once per run by [`generate`] from a [`NetworkModel`], a node count and the
//! run's random generator. All four models produce simple undirected graphs (no self-loops, no
//! duplicate edges) over the node ids `0..n`:
//!
//! - [`NetworkModel::ErdosRenyi`]: each pair connected independently with probability `p`.
//! - [`NetworkModel::WattsStrogatz`]: a ring lattice with `k / 2` neighbors per side whose edges
//!   are rewired with probability `beta`.
//! - [`NetworkModel::BarabasiAlbert`]: growth by preferential attachment, `m` edges per new node.
//! - [`NetworkModel::Community`]: contiguous blocks with dense (`p_in`) and sparse (`p_out`)
//!   connectivity.
//!
//! ```rust
//! use epigraph::network::{generate, NetworkModel};
//! use epigraph::random::rng_from_seed;
//!
//! let mut rng = rng_from_seed(42);
//! let graph = generate(&NetworkModel::ErdosRenyi { p: 1.0 }, 4, &mut rng).unwrap();
//! assert_eq!(graph.edge_count(), 6);
//! ```
//!
//! Once the structure is final every edge receives a uniform contact weight in `[0, 1)`.
mod barabasi_albert;
mod community;
mod erdos_renyi;
mod graph;
mod watts_strogatz;

use std::fmt::{self, Display};

use log::info;
use rand::Rng;
use serde::{Deserialize, Serialize};

pub use graph::{Adjacent, Edge, Graph, NodeId};
pub use watts_strogatz::REWIRE_ATTEMPT_CAP;

use crate::error::EpiError;

/// Structural model and parameters of a contact network.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum NetworkModel {
    ErdosRenyi {
        p: f64,
    },
    WattsStrogatz {
        k: usize,
        beta: f64,
    },
    BarabasiAlbert {
        m: usize,
    },
    Community {
        communities: usize,
        p_in: f64,
        p_out: f64,
    },
}

impl NetworkModel {
    pub const DEFAULT_ERDOS_RENYI: NetworkModel = NetworkModel::ErdosRenyi { p: 0.05 };
    pub const DEFAULT_WATTS_STROGATZ: NetworkModel = NetworkModel::WattsStrogatz { k: 4, beta: 0.2 };
    pub const DEFAULT_BARABASI_ALBERT: NetworkModel = NetworkModel::BarabasiAlbert { m: 3 };
    pub const DEFAULT_COMMUNITY: NetworkModel = NetworkModel::Community {
        communities: 5,
        p_in: 0.1,
        p_out: 0.01,
    };

    /// Checks the model parameters against a graph of `n` nodes.
    ///
    /// # Errors
    /// Returns `EpiError::InvalidParameter` if `n < 1` or a model constraint is violated.
    pub fn validate(&self, n: usize) -> Result<(), EpiError> {
        if n < 1 {
            return Err(EpiError::invalid("a network needs at least one node"));
        }
        match *self {
            NetworkModel::ErdosRenyi { p } => check_probability("p", p),
            NetworkModel::WattsStrogatz { k, beta } => {
                if k >= n {
                    return Err(EpiError::invalid(format!(
                        "Watts-Strogatz requires k < n (k={k}, n={n})"
                    )));
                }
                check_probability("beta", beta)
            }
            NetworkModel::BarabasiAlbert { m } => {
                if m < 1 || m >= n {
                    return Err(EpiError::invalid(format!(
                        "Barabasi-Albert requires 1 <= m < n (m={m}, n={n})"
                    )));
                }
                Ok(())
            }
            NetworkModel::Community {
                communities,
                p_in,
                p_out,
            } => {
                if communities < 1 {
                    return Err(EpiError::invalid("a community network needs at least one community"));
                }
                check_probability("p_in", p_in)?;
                check_probability("p_out", p_out)
            }
        }
    }
}

impl Display for NetworkModel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            NetworkModel::ErdosRenyi { p } => write!(f, "Erdos-Renyi(p={p})"),
            NetworkModel::WattsStrogatz { k, beta } => write!(f, "Watts-Strogatz(k={k}, beta={beta})"),
            NetworkModel::BarabasiAlbert { m } => write!(f, "Barabasi-Albert(m={m})"),
            NetworkModel::Community {
                communities,
                p_in,
                p_out,
            } => write!(
                f,
                "Community(communities={communities}, p_in={p_in}, p_out={p_out})"
            ),
        }
    }
}

/// Fails unless `value` is a finite probability.
pub(crate) fn check_probability(name: &str, value: f64) -> Result<(), EpiError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(EpiError::invalid(format!(
            "{name} must be a probability in [0, 1], got {value}"
        )))
    }
}

/// Builds a contact network of `n` nodes.
///
/// Parameters are validated before any draw is made, so a failed call leaves `rng` untouched and
/// returns no partial graph.
///
/// # Errors
/// Returns `EpiError::InvalidParameter` if `n < 1` or a model constraint is violated.
pub fn generate<R: Rng>(model: &NetworkModel, n: usize, rng: &mut R) -> Result<Graph, EpiError> {
    model.validate(n)?;

    let mut graph = match *model {
        NetworkModel::ErdosRenyi { p } => erdos_renyi::erdos_renyi(rng, n, p),
        NetworkModel::WattsStrogatz { k, beta } => watts_strogatz::watts_strogatz(rng, n, k, beta),
        NetworkModel::BarabasiAlbert { m } => barabasi_albert::barabasi_albert(rng, n, m),
        NetworkModel::Community {
            communities,
            p_in,
            p_out,
        } => community::community(rng, n, communities, p_in, p_out),
    };
    graph.assign_weights(rng);

    info!(
        "generated {model} network with {} nodes and {} edges",
        graph.node_count(),
        graph.edge_count()
    );
    Ok(graph)
}

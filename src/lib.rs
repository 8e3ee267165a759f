//! Epidemic spread over generated contact networks
//!
//! EpiGraph simulates an infectious disease moving through a population whose contacts form an
//! undirected graph. A run has two parts:
//! * A contact network built once by one of four structural models: Erdős–Rényi, Watts–Strogatz,
//!   Barabási–Albert or a community (planted partition) model. See [`network`].
//! * An epidemic that advances one step at a time. Each individual is in one of five states
//!   (Susceptible, Infected, Critical, Recovered, Dead) and changes state through probabilistic
//!   rules driven by its age, immunity and health. See [`disease`] and [`simulation`].
//!
//! A [`Simulation`] is deterministic for a given seed and set of [`Parameters`]: every draw comes
//! from one generator threaded through network generation, population initialization and
//! stepping. After every step the driver exposes an owned [`Snapshot`] for renderers.
//!
//! ```rust
//! use epigraph::{Parameters, Simulation};
//!
//! let parameters = Parameters {
//!     nodes: 50,
//!     infected: 2,
//!     ..Parameters::default()
//! };
//! let mut simulation = Simulation::new(&parameters, 42).unwrap();
//! while !simulation.step().terminated {}
//! let counts = simulation.state_counts();
//! assert_eq!(counts.infected + counts.critical, 0);
//! ```
pub mod disease;
pub mod error;
pub mod log;
pub mod network;
pub mod parameters;
pub mod population;
pub mod prelude;
pub mod random;
pub mod report;
pub mod runner;
pub mod simulation;
pub mod snapshot;

pub use crate::disease::{DiseaseModel, DiseaseState};
pub use crate::error::EpiError;
pub use crate::network::{generate, Graph, NetworkModel, NodeId};
pub use crate::parameters::{load_parameters_from_json, GraphType, Parameters};
pub use crate::population::{initialize_population, Individual};
pub use crate::simulation::{
    ContactEvent, RunOutcome, ShutdownHandle, Simulation, StepOutcome,
};
pub use crate::snapshot::{Snapshot, StateCounts};

// Deterministic hashing for the collections used during generation.
pub use rustc_hash::{FxHashMap as HashMap, FxHashSet as HashSet};

// Re-exported so that users construct generators for `Simulation::from_parts` against the same
// `rand` version.
pub use rand;

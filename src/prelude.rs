//! Everything needed to configure, run and observe a simulation.
//!
//! ```rust
//! use epigraph::prelude::*;
//! ```
pub use crate::disease::{DiseaseModel, DiseaseState};
pub use crate::error::EpiError;
pub use crate::log::{debug, error, info, trace, warn};
pub use crate::network::{generate, Graph, NetworkModel, NodeId};
pub use crate::parameters::{load_parameters_from_json, GraphType, Parameters};
pub use crate::population::{initialize_population, Individual};
pub use crate::random::{rng_from_seed, SimulationRng};
pub use crate::simulation::{
    ContactEvent, RunOutcome, ShutdownHandle, Simulation, StepOutcome,
};
pub use crate::snapshot::{Snapshot, StateCounts};

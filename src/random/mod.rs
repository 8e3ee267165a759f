//! Random number generation for a simulation run.
//!
//! Every run draws from exactly one sequential generator. The generator is created once from a
//! `u64` seed and then threaded, as `&mut impl Rng`, through topology generation, population
//! initialization and every simulation step, in that order. Two runs created from the same seed
//! and the same parameters therefore make identical draws.
mod sampling_algorithms;

pub use sampling_algorithms::{sample_single_from_known_length, sample_single_l_reservoir};

use log::trace;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// The generator type owned by a [`Simulation`](crate::simulation::Simulation).
pub type SimulationRng = StdRng;

/// Creates the generator for a run from its base seed.
#[must_use]
pub fn rng_from_seed(seed: u64) -> SimulationRng {
    trace!("creating simulation rng (seed={seed})");
    StdRng::seed_from_u64(seed)
}

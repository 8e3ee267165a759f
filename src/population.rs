//! Individuals and their epidemiological attributes.
//!
//! The population is an arena parallel to the graph: individual `i` is node `i`. Attributes are
//! drawn once at initialization; afterwards only the simulation driver mutates disease state,
//! through the crate-private methods below.

use log::trace;
use rand::Rng;

use crate::disease::DiseaseState;
use crate::error::EpiError;
use crate::network::{Graph, NodeId};

/// Ages are drawn uniformly from `[MIN_AGE, MAX_AGE)`.
pub const MIN_AGE: u8 = 10;
pub const MAX_AGE: u8 = 90;

#[derive(Clone, Debug, PartialEq)]
pub struct Individual {
    id: NodeId,
    age: u8,
    immunity: f64,
    health_score: f64,
    state: DiseaseState,
    // Defined exactly while `state` is `Infected`.
    infected_duration: Option<u32>,
    busy: bool,
    pending_state: Option<DiseaseState>,
}

impl Individual {
    /// Creates an individual with no staged transition. An individual created `Infected` starts
    /// with an infected duration of zero.
    #[must_use]
    pub fn new(id: NodeId, age: u8, immunity: f64, health_score: f64, state: DiseaseState) -> Self {
        Individual {
            id,
            age,
            immunity,
            health_score,
            state,
            infected_duration: (state == DiseaseState::Infected).then_some(0),
            busy: false,
            pending_state: None,
        }
    }

    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    #[must_use]
    pub fn age(&self) -> u8 {
        self.age
    }

    #[must_use]
    pub fn immunity(&self) -> f64 {
        self.immunity
    }

    #[must_use]
    pub fn health_score(&self) -> f64 {
        self.health_score
    }

    #[must_use]
    pub fn state(&self) -> DiseaseState {
        self.state
    }

    /// Days spent infected, `None` unless the individual is currently `Infected`.
    #[must_use]
    pub fn infected_duration(&self) -> Option<u32> {
        self.infected_duration
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    #[must_use]
    pub fn pending_state(&self) -> Option<DiseaseState> {
        self.pending_state
    }

    /// `min(1, age / 100)`, the age risk factor shared by infection and recovery.
    #[must_use]
    pub fn age_risk(&self) -> f64 {
        (f64::from(self.age) / 100.0).min(1.0)
    }

    pub(crate) fn set_busy(&mut self, busy: bool) {
        self.busy = busy;
    }

    pub(crate) fn stage(&mut self, next: DiseaseState) {
        self.pending_state = Some(next);
    }

    /// Advances the infected duration by one day and returns the new value.
    pub(crate) fn tick_infection(&mut self) -> u32 {
        let days = self.infected_duration.map_or(1, |days| days + 1);
        self.infected_duration = Some(days);
        days
    }

    /// Applies the staged transition, if any, and clears `busy`. Returns whether a transition
    /// was applied.
    pub(crate) fn commit(&mut self) -> bool {
        let Some(next) = self.pending_state.take() else {
            return false;
        };
        self.state = next;
        self.infected_duration = (next == DiseaseState::Infected).then_some(0);
        self.busy = false;
        true
    }
}

/// Creates one individual per graph node. Nodes `0..infected_count` start `Infected`, the rest
/// `Susceptible`. Attributes are drawn per node, in id order: age, immunity, health score.
///
/// # Errors
/// Returns `EpiError::InvalidParameter` if `infected_count` exceeds the node count.
pub fn initialize_population<R: Rng>(
    graph: &Graph,
    infected_count: usize,
    rng: &mut R,
) -> Result<Vec<Individual>, EpiError> {
    let n = graph.node_count();
    if infected_count > n {
        return Err(EpiError::invalid(format!(
            "cannot infect {infected_count} individuals in a population of {n}"
        )));
    }
    trace!("initializing population of {n} with {infected_count} infected");

    let population = graph
        .nodes()
        .map(|id| {
            let age = rng.random_range(MIN_AGE..MAX_AGE);
            let immunity = rng.random_range(0.0..1.0);
            let health_score = rng.random_range(0.0..1.0);
            let state = if id.index() < infected_count {
                DiseaseState::Infected
            } else {
                DiseaseState::Susceptible
            };
            Individual::new(id, age, immunity, health_score, state)
        })
        .collect();
    Ok(population)
}

/*!

The simulation driver owns the graph, the population and the run's random generator, and is the
only code that mutates disease state.

A step runs in a fixed order:

1. Edge activity from the previous step is cleared and every staged transition is committed.
2. Infected individuals advance one day of infection and Critical individuals are resolved.
   Anything staged here is committed immediately.
3. If no one is Infected or Critical the run terminates. If only Critical individuals remain the
   step ends without a contact.
4. One Infected individual is picked uniformly and contacts one uniformly picked Susceptible
   neighbor over the connecting edge, which stays active until the next step begins.

[`Simulation::step`] does exactly one step and reports what happened in a [`StepOutcome`], so an
external loop can render and pace between steps. [`Simulation::run`] is that loop for callers
that only need to observe.

*/

use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{debug, info, trace};
use rand::Rng;

use crate::disease::{DiseaseModel, DiseaseState};
use crate::error::EpiError;
use crate::network::{generate, Graph, NodeId};
use crate::parameters::Parameters;
use crate::population::{initialize_population, Individual};
use crate::random::{
    rng_from_seed, sample_single_from_known_length, sample_single_l_reservoir, SimulationRng,
};
use crate::snapshot::{Snapshot, StateCounts};

/// The contact phase of a step.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ContactEvent {
    /// The picked infector had no Susceptible, non-busy neighbor.
    NoSusceptibleNeighbor { infector: NodeId },
    Attempted {
        infector: NodeId,
        target: NodeId,
        /// Index of the connecting edge in [`Graph::edges`].
        edge: usize,
        infected: bool,
    },
}

/// What a call to [`Simulation::step`] did.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct StepOutcome {
    pub step: u64,
    pub terminated: bool,
    /// A batch of progression transitions was staged and committed.
    pub progression_settled: bool,
    /// `None` when the step ended before contact selection.
    pub contact: Option<ContactEvent>,
}

/// How [`Simulation::run`] ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    /// No one is Infected or Critical.
    Terminated,
    /// Shutdown was requested through [`Simulation::shutdown`] or a [`ShutdownHandle`].
    Shutdown,
    /// The observer returned `ControlFlow::Break`.
    Stopped,
}

/// Requests a running simulation to stop at the next step boundary. Cloneable and `Send`, so it
/// can be handed to another thread.
#[derive(Clone, Debug, Default)]
pub struct ShutdownHandle(Arc<AtomicBool>);

impl ShutdownHandle {
    pub fn shutdown(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_shutdown(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

pub struct Simulation<R: Rng = SimulationRng> {
    graph: Graph,
    population: Vec<Individual>,
    disease: DiseaseModel,
    rng: R,
    step: u64,
    terminated: bool,
    shutdown: ShutdownHandle,
}

impl Simulation<SimulationRng> {
    /// Builds the network and the population from `parameters`, drawing from a generator seeded
    /// with `seed`.
    ///
    /// # Errors
    /// Returns `EpiError::InvalidParameter` if the parameters fail validation.
    pub fn new(parameters: &Parameters, seed: u64) -> Result<Self, EpiError> {
        parameters.validate()?;
        let mut rng = rng_from_seed(seed);
        let graph = generate(&parameters.network_model(), parameters.nodes, &mut rng)?;
        let population = initialize_population(&graph, parameters.infected, &mut rng)?;
        Simulation::from_parts(graph, population, parameters, rng)
    }
}

impl<R: Rng> Simulation<R> {
    /// Assembles a simulation from an existing graph and population. Only the disease rates of
    /// `parameters` are used.
    ///
    /// # Errors
    /// Returns `EpiError::InvalidParameter` if the population does not match the graph node for
    /// node or the disease rates are out of domain.
    pub fn from_parts(
        graph: Graph,
        population: Vec<Individual>,
        parameters: &Parameters,
        rng: R,
    ) -> Result<Self, EpiError> {
        let disease = parameters.disease_model();
        disease.validate()?;
        if population.len() != graph.node_count() {
            return Err(EpiError::invalid(format!(
                "population of {} does not match a graph of {} nodes",
                population.len(),
                graph.node_count()
            )));
        }
        if let Some((index, individual)) = population
            .iter()
            .enumerate()
            .find(|(index, individual)| individual.id().index() != *index)
        {
            return Err(EpiError::invalid(format!(
                "individual at index {index} has id {}",
                individual.id()
            )));
        }

        Ok(Simulation {
            graph,
            population,
            disease,
            rng,
            step: 0,
            terminated: false,
            shutdown: ShutdownHandle::default(),
        })
    }

    #[must_use]
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    #[must_use]
    pub fn population(&self) -> &[Individual] {
        &self.population
    }

    #[must_use]
    pub fn individual(&self, id: NodeId) -> Option<&Individual> {
        self.population.get(id.index())
    }

    #[must_use]
    pub fn disease_model(&self) -> &DiseaseModel {
        &self.disease
    }

    /// Number of steps executed so far.
    #[must_use]
    pub fn current_step(&self) -> u64 {
        self.step
    }

    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    #[must_use]
    pub fn state_counts(&self) -> StateCounts {
        StateCounts::from_population(&self.population)
    }

    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(self.step, self.terminated, &self.graph, &self.population)
    }

    #[must_use]
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// Stops [`run`](Self::run) before its next step.
    pub fn shutdown(&self) {
        self.shutdown.shutdown();
    }

    /// Advances the epidemic by one step. Once terminated, further calls change nothing and keep
    /// reporting `terminated`.
    pub fn step(&mut self) -> StepOutcome {
        if self.terminated {
            return StepOutcome {
                step: self.step,
                terminated: true,
                progression_settled: false,
                contact: None,
            };
        }
        self.step += 1;
        trace!("step {}", self.step);

        self.graph.clear_active_edges();
        self.commit();
        let progression_settled = self.progress();
        if progression_settled {
            self.commit();
        }

        let counts = self.state_counts();
        if !counts.has_active() {
            self.terminated = true;
            info!(
                "epidemic over after {} steps: {} recovered, {} dead, {} never infected",
                self.step, counts.recovered, counts.dead, counts.susceptible
            );
        }
        let contact = if counts.infected > 0 {
            self.contact()
        } else {
            None
        };

        StepOutcome {
            step: self.step,
            terminated: self.terminated,
            progression_settled,
            contact,
        }
    }

    /// Steps until the epidemic is over, shutdown is requested or `observer` breaks. The shutdown
    /// flag is checked before every step. `observer` sees the simulation after each step.
    pub fn run<F>(&mut self, mut observer: F) -> RunOutcome
    where
        F: FnMut(&Self, &StepOutcome) -> ControlFlow<()>,
    {
        info!("running simulation from step {}", self.step);
        loop {
            if self.terminated {
                return RunOutcome::Terminated;
            }
            if self.shutdown.is_shutdown() {
                info!("shutdown requested at step {}", self.step);
                return RunOutcome::Shutdown;
            }
            let outcome = self.step();
            if observer(self, &outcome).is_break() {
                return RunOutcome::Stopped;
            }
        }
    }

    /// Applies every staged transition. Returns whether anything changed.
    fn commit(&mut self) -> bool {
        let committed = self
            .population
            .iter_mut()
            .map(Individual::commit)
            .filter(|changed| *changed)
            .count();
        if committed > 0 {
            debug!("committed {committed} transitions");
        }
        committed > 0
    }

    /// Runs infection progression and critical resolution over everyone, in id order. Returns
    /// whether anything was staged.
    fn progress(&mut self) -> bool {
        let mut staged = false;
        for individual in &mut self.population {
            staged |= match individual.state() {
                DiseaseState::Infected => self.disease.progress(individual, &mut self.rng),
                DiseaseState::Critical => self.disease.resolve_critical(individual, &mut self.rng),
                _ => false,
            };
        }
        staged
    }

    fn contact(&mut self) -> Option<ContactEvent> {
        let candidates: Vec<NodeId> = self
            .population
            .iter()
            .filter(|individual| {
                individual.state() == DiseaseState::Infected && !individual.is_busy()
            })
            .map(Individual::id)
            .collect();
        let infector = sample_single_from_known_length(&mut self.rng, candidates.into_iter())?;
        self.population[infector.index()].set_busy(true);

        let population = &self.population;
        let picked = sample_single_l_reservoir(
            &mut self.rng,
            self.graph.neighbors(infector).iter().filter(|adjacent| {
                let neighbor = &population[adjacent.neighbor.index()];
                neighbor.state() == DiseaseState::Susceptible && !neighbor.is_busy()
            }),
        )
        .copied();

        let Some(adjacent) = picked else {
            trace!("{infector} has no susceptible neighbor");
            self.population[infector.index()].set_busy(false);
            return Some(ContactEvent::NoSusceptibleNeighbor { infector });
        };

        let target = adjacent.neighbor;
        self.population[target.index()].set_busy(true);
        self.graph.set_edge_active(adjacent.edge, true);

        let infector_view = self.population[infector.index()].clone();
        let infected = self.disease.attempt_infection(
            &infector_view,
            &mut self.population[target.index()],
            &mut self.rng,
        );

        self.population[infector.index()].set_busy(false);
        self.population[target.index()].set_busy(false);

        Some(ContactEvent::Attempted {
            infector,
            target,
            edge: adjacent.edge,
            infected,
        })
    }
}

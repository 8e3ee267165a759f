//! Read-only views of a simulation, handed to renderers after each step.
//!
//! A [`Snapshot`] is an owned copy: holding one never borrows the simulation, and it serializes
//! to JSON with camelCase keys.

use serde::Serialize;

use crate::disease::DiseaseState;
use crate::network::{Graph, NodeId};
use crate::population::Individual;

/// Number of individuals in each disease state.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct StateCounts {
    pub susceptible: usize,
    pub infected: usize,
    pub critical: usize,
    pub recovered: usize,
    pub dead: usize,
}

impl StateCounts {
    #[must_use]
    pub fn from_population(population: &[Individual]) -> Self {
        let mut counts = StateCounts::default();
        for individual in population {
            *counts.get_mut(individual.state()) += 1;
        }
        counts
    }

    #[must_use]
    pub fn get(&self, state: DiseaseState) -> usize {
        match state {
            DiseaseState::Susceptible => self.susceptible,
            DiseaseState::Infected => self.infected,
            DiseaseState::Critical => self.critical,
            DiseaseState::Recovered => self.recovered,
            DiseaseState::Dead => self.dead,
        }
    }

    fn get_mut(&mut self, state: DiseaseState) -> &mut usize {
        match state {
            DiseaseState::Susceptible => &mut self.susceptible,
            DiseaseState::Infected => &mut self.infected,
            DiseaseState::Critical => &mut self.critical,
            DiseaseState::Recovered => &mut self.recovered,
            DiseaseState::Dead => &mut self.dead,
        }
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.susceptible + self.infected + self.critical + self.recovered + self.dead
    }

    /// Whether anyone is still Infected or Critical.
    #[must_use]
    pub fn has_active(&self) -> bool {
        self.infected + self.critical > 0
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeView {
    pub id: NodeId,
    pub state: DiseaseState,
    pub age: u8,
    pub immunity: f64,
    pub health_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub community: Option<usize>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeView {
    pub source: NodeId,
    pub target: NodeId,
    pub weight: f32,
    pub active_this_step: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub step: u64,
    pub terminated: bool,
    pub counts: StateCounts,
    pub nodes: Vec<NodeView>,
    pub edges: Vec<EdgeView>,
}

impl Snapshot {
    pub(crate) fn capture(
        step: u64,
        terminated: bool,
        graph: &Graph,
        population: &[Individual],
    ) -> Self {
        let nodes = population
            .iter()
            .map(|individual| NodeView {
                id: individual.id(),
                state: individual.state(),
                age: individual.age(),
                immunity: individual.immunity(),
                health_score: individual.health_score(),
                community: graph.community(individual.id()),
            })
            .collect();
        let edges = graph
            .edges()
            .iter()
            .map(|edge| EdgeView {
                source: edge.source,
                target: edge.target,
                weight: edge.weight,
                active_this_step: edge.is_active(),
            })
            .collect();

        Snapshot {
            step,
            terminated,
            counts: StateCounts::from_population(population),
            nodes,
            edges,
        }
    }
}

use std::ops::ControlFlow;

use epigraph::prelude::*;
use strum::IntoEnumIterator;

fn parameters(graph_type: GraphType, nodes: usize, infected: usize) -> Parameters {
    Parameters {
        graph_type,
        nodes,
        infected,
        ..Parameters::default()
    }
}

#[test]
fn same_seed_same_snapshots() {
    for graph_type in GraphType::iter() {
        let parameters = parameters(graph_type, 80, 4);
        let mut a = Simulation::new(&parameters, 1234).unwrap();
        let mut b = Simulation::new(&parameters, 1234).unwrap();
        assert_eq!(a.snapshot(), b.snapshot());
        loop {
            let outcome_a = a.step();
            let outcome_b = b.step();
            assert_eq!(outcome_a, outcome_b);
            assert_eq!(a.snapshot(), b.snapshot(), "{graph_type} diverged");
            if outcome_a.terminated {
                break;
            }
        }
    }
}

#[test]
fn different_seeds_differ() {
    let parameters = parameters(GraphType::Erdos, 80, 4);
    let a = Simulation::new(&parameters, 1).unwrap();
    let b = Simulation::new(&parameters, 2).unwrap();
    assert_ne!(a.snapshot(), b.snapshot());
}

#[test]
fn step_boundary_invariants_hold_for_every_model() {
    for graph_type in GraphType::iter() {
        let mut simulation = Simulation::new(&parameters(graph_type, 100, 5), 7).unwrap();
        let mut previous: Vec<DiseaseState> =
            simulation.population().iter().map(Individual::state).collect();

        simulation.run(|simulation, outcome| {
            let active_edges = simulation
                .graph()
                .edges()
                .iter()
                .filter(|edge| edge.is_active())
                .count();
            assert!(active_edges <= 1);

            for (individual, before) in simulation.population().iter().zip(&previous) {
                assert!(!individual.is_busy());
                assert_eq!(
                    individual.infected_duration().is_some(),
                    individual.state() == DiseaseState::Infected
                );
                // Terminal states are never left.
                if before.is_terminal() {
                    assert_eq!(individual.state(), *before);
                }
                // Only a staged infection survives a step boundary.
                if let Some(pending) = individual.pending_state() {
                    assert_eq!(pending, DiseaseState::Infected);
                    assert_eq!(individual.state(), DiseaseState::Susceptible);
                }
            }
            previous = simulation.population().iter().map(Individual::state).collect();

            let counts = simulation.state_counts();
            assert_eq!(counts.total(), 100);
            assert_eq!(outcome.terminated, counts.infected + counts.critical == 0);
            ControlFlow::Continue(())
        });
        assert!(simulation.is_terminated());
    }
}

#[test]
fn zero_infected_terminates_immediately() {
    let mut simulation = Simulation::new(&parameters(GraphType::Barabasi, 30, 0), 5).unwrap();
    let outcome = simulation.step();
    assert!(outcome.terminated);
    assert_eq!(simulation.state_counts().susceptible, 30);
}

#[test]
fn custom_graph_and_population() {
    // A star: node 0 in the center.
    let graph = Graph::from_edges(5, (1..5).map(|leaf| (0, leaf))).unwrap();
    let population = (0..5)
        .map(|i| {
            let state = if i == 0 {
                DiseaseState::Infected
            } else {
                DiseaseState::Susceptible
            };
            Individual::new(NodeId(i), 40, 0.0, 0.9, state)
        })
        .collect();
    let parameters = Parameters {
        transmission_rate: 1.0,
        recovery_days: 1000,
        ..Parameters::default()
    };
    let mut simulation =
        Simulation::from_parts(graph, population, &parameters, rng_from_seed(3)).unwrap();

    // Transmission is certain, so every contact the center makes infects a leaf. Leaves only
    // neighbor the center and never have a susceptible contact.
    let mut steps = 0;
    while simulation.state_counts().susceptible > 0 && steps < 500 {
        let outcome = simulation.step();
        steps += 1;
        match outcome.contact {
            Some(ContactEvent::Attempted {
                infector, infected, ..
            }) => {
                assert_eq!(infector, NodeId(0));
                assert!(infected);
            }
            Some(ContactEvent::NoSusceptibleNeighbor { infector }) => {
                assert!(infector == NodeId(0) || simulation.graph().degree(infector) == 1);
            }
            None => unreachable!("someone is always infected"),
        }
    }
    simulation.step();
    let counts = simulation.state_counts();
    assert_eq!(counts.infected, 5);
    assert_eq!(counts.susceptible, 0);
}

#[test]
fn snapshot_serializes_for_renderers() {
    let mut simulation = Simulation::new(&parameters(GraphType::Community, 20, 2), 8).unwrap();
    simulation.step();
    let json = serde_json::to_value(simulation.snapshot()).unwrap();
    assert_eq!(json["step"], 1);
    assert_eq!(json["nodes"].as_array().unwrap().len(), 20);
    assert!(json["nodes"][19]["community"].is_number());
    let edges = json["edges"].as_array().unwrap();
    assert_eq!(edges.len(), simulation.graph().edge_count());
}

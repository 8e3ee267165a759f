//! The five-state disease model and its transition rules.
//!
//! ```text
//! Susceptible -> Infected -> Critical -> Dead
//!                    |           |
//!                    +-----------+--> Recovered
//! ```
//!
//! Rules never change an individual's state directly. They stage the next state, which the
//! simulation driver commits for everyone at once.

use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::error::EpiError;
use crate::network::check_probability;
use crate::population::Individual;

#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, EnumIter, Display,
)]
pub enum DiseaseState {
    Susceptible,
    Infected,
    Critical,
    Recovered,
    Dead,
}

impl DiseaseState {
    /// Recovered and Dead individuals never change state again.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, DiseaseState::Recovered | DiseaseState::Dead)
    }

    /// Infected and Critical individuals keep a run going.
    #[must_use]
    pub fn is_active(self) -> bool {
        matches!(self, DiseaseState::Infected | DiseaseState::Critical)
    }
}

/// `transmission_rate * (1 + age_risk) * (1 - 0.8 * immunity)`.
///
/// The result is not clamped: a chance of 1 or more makes infection certain.
#[must_use]
pub fn infection_chance(transmission_rate: f64, target: &Individual) -> f64 {
    transmission_rate * (1.0 + target.age_risk()) * (1.0 - target.immunity() * 0.8)
}

/// `recovery_rate * (health_score + immunity) / (1 + age_risk)`.
#[must_use]
pub fn recovery_chance(recovery_rate: f64, individual: &Individual) -> f64 {
    recovery_rate * (individual.health_score() + individual.immunity())
        / (1.0 + individual.age_risk())
}

/// `0.5 * health_score * (1 - min(0.8, age / 100))`.
#[must_use]
pub fn survival_chance(individual: &Individual) -> f64 {
    let age_penalty = (f64::from(individual.age()) / 100.0).min(0.8);
    0.5 * individual.health_score() * (1.0 - age_penalty)
}

/// Rates that govern the transition rules of a run.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DiseaseModel {
    pub transmission_rate: f64,
    pub recovery_rate: f64,
    /// Days an individual stays Infected before its outcome is drawn.
    pub recovery_days: u32,
}

impl DiseaseModel {
    /// # Errors
    /// Returns `EpiError::InvalidParameter` if a rate is not a probability or `recovery_days`
    /// is zero.
    pub fn validate(&self) -> Result<(), EpiError> {
        check_probability("transmissionRate", self.transmission_rate)?;
        check_probability("recoveryRate", self.recovery_rate)?;
        if self.recovery_days < 1 {
            return Err(EpiError::invalid("recoveryDays must be at least 1"));
        }
        Ok(())
    }

    /// Attempts transmission from `infector` to `target`. Stages `Infected` on the target and
    /// returns `true` if the draw succeeds. Makes no draw unless the infector is Infected and the
    /// target Susceptible.
    pub fn attempt_infection<R: Rng>(
        &self,
        infector: &Individual,
        target: &mut Individual,
        rng: &mut R,
    ) -> bool {
        if infector.state() != DiseaseState::Infected
            || target.state() != DiseaseState::Susceptible
        {
            return false;
        }
        let chance = infection_chance(self.transmission_rate, target);
        let infected = rng.random::<f64>() < chance;
        debug!(
            "contact {} -> {}: chance {chance:.3}, infected: {infected}",
            infector.id(),
            target.id()
        );
        if infected {
            target.stage(DiseaseState::Infected);
        }
        infected
    }

    /// Advances one day of infection for an Infected, non-busy individual. Once the infection has
    /// lasted `recovery_days` the individual becomes busy and Recovered or Critical is staged.
    /// Returns whether a transition was staged.
    pub fn progress<R: Rng>(&self, individual: &mut Individual, rng: &mut R) -> bool {
        if individual.state() != DiseaseState::Infected || individual.is_busy() {
            return false;
        }
        let days = individual.tick_infection();
        if days < self.recovery_days {
            return false;
        }

        individual.set_busy(true);
        let chance = recovery_chance(self.recovery_rate, individual);
        let next = if rng.random::<f64>() < chance {
            DiseaseState::Recovered
        } else {
            DiseaseState::Critical
        };
        debug!(
            "{} infected for {days} days: chance of recovery {chance:.3}, next {next}",
            individual.id()
        );
        individual.stage(next);
        true
    }

    /// Resolves a Critical, non-busy individual to Recovered or Dead. Returns whether a
    /// transition was staged.
    pub fn resolve_critical<R: Rng>(&self, individual: &mut Individual, rng: &mut R) -> bool {
        if individual.state() != DiseaseState::Critical || individual.is_busy() {
            return false;
        }
        individual.set_busy(true);
        let chance = survival_chance(individual);
        let next = if rng.random::<f64>() < chance {
            DiseaseState::Recovered
        } else {
            DiseaseState::Dead
        };
        debug!(
            "{} critical: chance of survival {chance:.3}, next {next}",
            individual.id()
        );
        individual.stage(next);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::NodeId;
    use crate::random::rng_from_seed;
    use assert_approx_eq::assert_approx_eq;
    use strum::IntoEnumIterator;

    const MODEL: DiseaseModel = DiseaseModel {
        transmission_rate: 0.2,
        recovery_rate: 0.5,
        recovery_days: 3,
    };

    fn person(age: u8, immunity: f64, health_score: f64, state: DiseaseState) -> Individual {
        Individual::new(NodeId(0), age, immunity, health_score, state)
    }

    #[test]
    fn state_names() {
        let names: Vec<String> = DiseaseState::iter().map(|s| s.to_string()).collect();
        assert_eq!(
            names,
            vec!["Susceptible", "Infected", "Critical", "Recovered", "Dead"]
        );
        assert!(DiseaseState::Dead.is_terminal());
        assert!(!DiseaseState::Critical.is_terminal());
        assert!(DiseaseState::Critical.is_active());
        assert!(!DiseaseState::Susceptible.is_active());
    }

    #[test]
    fn chance_formulas() {
        let p = person(50, 0.5, 0.4, DiseaseState::Susceptible);
        assert_approx_eq!(infection_chance(0.2, &p), 0.2 * 1.5 * 0.6);
        assert_approx_eq!(recovery_chance(0.5, &p), 0.5 * 0.9 / 1.5);
        assert_approx_eq!(survival_chance(&p), 0.5 * 0.4 * 0.5);

        // The age penalty on survival saturates at 0.8.
        let old = person(89, 0.0, 1.0, DiseaseState::Critical);
        assert_approx_eq!(survival_chance(&old), 0.5 * 0.2);
    }

    #[test]
    fn infection_chance_is_not_clamped() {
        let p = person(80, 0.0, 0.5, DiseaseState::Susceptible);
        assert!(infection_chance(1.0, &p) > 1.0);

        let model = DiseaseModel {
            transmission_rate: 1.0,
            ..MODEL
        };
        let infector = person(30, 0.0, 0.5, DiseaseState::Infected);
        let mut rng = rng_from_seed(4);
        for _ in 0..100 {
            let mut target = p.clone();
            assert!(model.attempt_infection(&infector, &mut target, &mut rng));
            assert_eq!(target.pending_state(), Some(DiseaseState::Infected));
        }
    }

    #[test]
    fn zero_transmission_never_infects() {
        let model = DiseaseModel {
            transmission_rate: 0.0,
            ..MODEL
        };
        let infector = person(30, 0.0, 0.5, DiseaseState::Infected);
        let mut rng = rng_from_seed(4);
        for _ in 0..100 {
            let mut target = person(30, 0.0, 0.5, DiseaseState::Susceptible);
            assert!(!model.attempt_infection(&infector, &mut target, &mut rng));
            assert_eq!(target.pending_state(), None);
        }
    }

    #[test]
    fn infection_requires_infector_and_susceptible() {
        use rand::RngCore;

        let model = DiseaseModel {
            transmission_rate: 10.0,
            ..MODEL
        };
        let mut rng = rng_from_seed(4);
        let recovered = person(30, 0.0, 0.5, DiseaseState::Recovered);
        let mut target = person(30, 0.0, 0.5, DiseaseState::Susceptible);
        assert!(!model.attempt_infection(&recovered, &mut target, &mut rng));

        let infector = person(30, 0.0, 0.5, DiseaseState::Infected);
        let mut immune = person(30, 0.0, 0.5, DiseaseState::Recovered);
        assert!(!model.attempt_infection(&infector, &mut immune, &mut rng));
        assert_eq!(immune.pending_state(), None);

        // No draw was consumed.
        assert_eq!(rng.next_u64(), rng_from_seed(4).next_u64());
    }

    #[test]
    fn progression_waits_for_recovery_days() {
        let mut rng = rng_from_seed(6);
        let mut p = person(40, 0.5, 0.5, DiseaseState::Infected);
        assert!(!MODEL.progress(&mut p, &mut rng));
        assert!(!MODEL.progress(&mut p, &mut rng));
        assert_eq!(p.infected_duration(), Some(2));
        assert!(!p.is_busy());

        assert!(MODEL.progress(&mut p, &mut rng));
        assert_eq!(p.infected_duration(), Some(3));
        assert!(p.is_busy());
        assert!(matches!(
            p.pending_state(),
            Some(DiseaseState::Recovered | DiseaseState::Critical)
        ));

        // Busy individuals are skipped.
        assert!(!MODEL.progress(&mut p, &mut rng));
        assert_eq!(p.infected_duration(), Some(3));
    }

    #[test]
    fn progression_outcomes_follow_chance() {
        let mut rng = rng_from_seed(6);
        let certain = DiseaseModel {
            recovery_rate: 1.0,
            recovery_days: 1,
            ..MODEL
        };
        // recovery chance = (1 + 1) / (1 + 0.1) > 1
        let mut p = person(10, 1.0, 1.0, DiseaseState::Infected);
        assert!(certain.progress(&mut p, &mut rng));
        assert_eq!(p.pending_state(), Some(DiseaseState::Recovered));

        let hopeless = DiseaseModel {
            recovery_rate: 0.0,
            recovery_days: 1,
            ..MODEL
        };
        let mut p = person(10, 1.0, 1.0, DiseaseState::Infected);
        assert!(hopeless.progress(&mut p, &mut rng));
        assert_eq!(p.pending_state(), Some(DiseaseState::Critical));
    }

    #[test]
    fn critical_resolution() {
        let mut rng = rng_from_seed(8);
        let mut doomed = person(50, 0.9, 0.0, DiseaseState::Critical);
        assert!(MODEL.resolve_critical(&mut doomed, &mut rng));
        assert!(doomed.is_busy());
        assert_eq!(doomed.pending_state(), Some(DiseaseState::Dead));
        assert!(doomed.commit());
        assert_eq!(doomed.state(), DiseaseState::Dead);
        assert!(!doomed.is_busy());

        let mut p = person(50, 0.9, 0.0, DiseaseState::Infected);
        assert!(!MODEL.resolve_critical(&mut p, &mut rng));
    }

    #[test]
    fn survival_rate_matches_chance() {
        let mut rng = rng_from_seed(9);
        let template = person(20, 0.0, 1.0, DiseaseState::Critical);
        let expected = survival_chance(&template);
        let trials = 4000;
        let mut recovered = 0;
        for _ in 0..trials {
            let mut p = template.clone();
            MODEL.resolve_critical(&mut p, &mut rng);
            if p.pending_state() == Some(DiseaseState::Recovered) {
                recovered += 1;
            }
        }
        let observed = f64::from(recovered) / f64::from(trials);
        assert!((observed - expected).abs() < 0.05, "{observed} vs {expected}");
    }
}

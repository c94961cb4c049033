//! Predation kernel: how much of each candidate prey a predator eats in one
//! sub-step. Pure allocation; callers apply the result to prey state.

use crate::aggregation::{Aggregation, Group};
use crate::species::SpeciesTable;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PredationOutcome {
    /// Biomass (tons) taken from each pool member, aligned with the pool.
    pub prey_upon: Vec<f64>,
    pub biomass_to_predate: f64,
    /// `min(eaten / biomass_to_predate, 1)`, zero when nothing could be eaten.
    pub success_rate: f64,
}

impl PredationOutcome {
    fn nothing(n: usize, biomass_to_predate: f64) -> Self {
        Self {
            prey_upon: vec![0.0; n],
            biomass_to_predate,
            success_rate: 0.0,
        }
    }

    pub fn total(&self) -> f64 {
        self.prey_upon.iter().sum()
    }
}

/// Maximum biomass a predator of `biomass` tons can ingest in one sub-step.
pub fn biomass_to_predate(
    predation_rate_max: f64,
    biomass: f64,
    steps_per_year: usize,
    subdt: usize,
) -> f64 {
    let divisor = (steps_per_year * subdt) as f64;
    if divisor <= 0.0 || biomass <= 0.0 || predation_rate_max <= 0.0 {
        return 0.0;
    }
    predation_rate_max * biomass / divisor
}

/// Annual maximum ingestion rate of a predator group.
pub fn predation_rate_max(table: &SpeciesTable, group: Group) -> f64 {
    match group {
        Group::Focal(species) => table.species[species].predation_rate_max,
        Group::Background(idx) => table.background[idx].predation_rate_max,
        Group::Plankton(_) => 0.0,
    }
}

pub fn compute_predation(
    predator: &dyn Aggregation,
    rate_max: f64,
    pool: &[&dyn Aggregation],
    accessibility: &[f64],
    steps_per_year: usize,
    subdt: usize,
) -> PredationOutcome {
    let n = pool.len();
    if predator.is_egg() {
        return PredationOutcome::nothing(n, 0.0);
    }
    let to_predate = biomass_to_predate(
        rate_max,
        predator.instantaneous_biomass(),
        steps_per_year,
        subdt,
    );
    if to_predate <= 0.0 {
        return PredationOutcome::nothing(n, 0.0);
    }

    let accessible: Vec<f64> = pool
        .iter()
        .zip(accessibility.iter().chain(std::iter::repeat(&0.0)))
        .map(|(prey, &coeff)| {
            let value = coeff * prey.instantaneous_biomass();
            if value.is_finite() && value > 0.0 {
                value
            } else {
                0.0
            }
        })
        .collect();
    let total_accessible: f64 = accessible.iter().sum();
    if total_accessible <= 0.0 {
        return PredationOutcome::nothing(n, to_predate);
    }

    let predated = to_predate.min(total_accessible);
    let prey_upon = if total_accessible <= to_predate {
        accessible
    } else {
        accessible
            .iter()
            .map(|a| predated * a / total_accessible)
            .collect()
    };
    PredationOutcome {
        prey_upon,
        biomass_to_predate: to_predate,
        success_rate: (predated / to_predate).min(1.0),
    }
}

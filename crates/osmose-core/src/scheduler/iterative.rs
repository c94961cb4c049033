//! Iterative resolution: every source of mortality becomes an instantaneous
//! rate, deaths are shared as `N * (r_k / R) * (1 - exp(-R))`, and predation
//! rates are rescaled until predators get no more than their appetite.

use super::{
    additional_deaths, add_pred_success, fishing_deaths, foraging_deaths, predation_outcome,
    starvation_deaths, transfer_prey, StepContext,
};
use crate::constants::MAX_INSTANTANEOUS_RATE;
use crate::grid::CellState;
use crate::mortality::MortalityCause;

const NON_PREDATION: [MortalityCause; 4] = [
    MortalityCause::Starvation,
    MortalityCause::Additional,
    MortalityCause::Fishing,
    MortalityCause::Foraging,
];

/// Instantaneous rate that kills `dead` out of `abundance`.
fn rate_from_deaths(abundance: f64, dead: f64) -> f64 {
    if abundance <= 0.0 || dead <= 0.0 {
        0.0
    } else if dead >= abundance {
        MAX_INSTANTANEOUS_RATE
    } else {
        (abundance / (abundance - dead)).ln().min(MAX_INSTANTANEOUS_RATE)
    }
}

/// Deaths per source given per-source rates. Zero total rate kills nothing.
fn share_deaths(abundance: f64, rates: &[f64], dead: &mut [f64]) {
    let total: f64 = rates.iter().sum();
    let killed = if total > 0.0 {
        abundance * (1.0 - (-total).exp())
    } else {
        0.0
    };
    for (d, r) in dead.iter_mut().zip(rates) {
        *d = if total > 0.0 { killed * r / total } else { 0.0 };
    }
}

pub(super) fn resolve(ctx: &StepContext<'_>, cell: &mut CellState, accessibility: &[Vec<f64>]) {
    let n_predators = cell.n_predators();
    let n_pool = cell.pool_len();
    let n_sources = n_predators + NON_PREDATION.len();

    let outcomes: Vec<_> = (0..n_predators)
        .map(|p| predation_outcome(ctx, cell, accessibility, p))
        .collect();

    // Abundance available to each pool member and its initial deaths per source.
    let mut abundance = vec![0.0; n_pool];
    let mut dead = vec![vec![0.0; n_sources]; n_pool];
    {
        let pool = super::pool(cell);
        for (j, prey) in pool.iter().enumerate() {
            abundance[j] = prey.biom2abd(prey.instantaneous_biomass());
            for (p, outcome) in outcomes.iter().enumerate() {
                dead[j][p] = prey.biom2abd(outcome.prey_upon[j]);
            }
        }
        for (j, school) in cell.schools.iter().enumerate() {
            dead[j][n_predators] = starvation_deaths(ctx, school);
            dead[j][n_predators + 1] = additional_deaths(ctx, school);
            dead[j][n_predators + 2] = fishing_deaths(ctx, school);
            dead[j][n_predators + 3] = foraging_deaths(ctx, school);
        }
    }

    let mut rates: Vec<Vec<f64>> = dead
        .iter()
        .zip(&abundance)
        .map(|(row, &n)| row.iter().map(|&d| rate_from_deaths(n, d)).collect())
        .collect();
    let mut totals: Vec<f64> = rates.iter().map(|r| r.iter().sum()).collect();

    let mut iteration = 0;
    let mut error = f64::MAX;
    while iteration < ctx.iterative.max_iterations && error > ctx.iterative.tolerance {
        for j in 0..n_pool {
            share_deaths(abundance[j], &rates[j], &mut dead[j]);
        }

        let mut correction = vec![1.0; n_predators];
        {
            let pool = super::pool(cell);
            for p in 0..n_predators {
                let preyed: f64 = (0..n_pool).map(|j| pool[j].abd2biom(dead[j][p])).sum();
                let to_predate = outcomes[p].biomass_to_predate;
                if preyed > 0.0 {
                    correction[p] = (to_predate / preyed).min(1.0);
                }
            }
        }
        for row in rates.iter_mut() {
            for (p, factor) in correction.iter().enumerate() {
                row[p] *= factor;
            }
        }

        error = 0.0;
        for (j, row) in rates.iter().enumerate() {
            let total: f64 = row.iter().sum();
            error = error.max((total - totals[j]).abs());
            totals[j] = total;
        }
        iteration += 1;
    }

    // Non-predation causes only concern focal schools.
    for (j, school) in cell.schools.iter_mut().enumerate() {
        for (k, &cause) in NON_PREDATION.iter().enumerate() {
            school.increment_dead(cause, dead[j][n_predators + k]);
        }
    }
    // Success counts only the biomass prey could still give up.
    for p in 0..n_predators {
        let mut eaten = 0.0;
        for j in 0..n_pool {
            if j != p && dead[j][p] > 0.0 {
                eaten += transfer_prey(ctx, cell, p, j, dead[j][p]);
            }
        }
        let to_predate = outcomes[p].biomass_to_predate;
        let success = if to_predate > 0.0 {
            (eaten / to_predate).min(1.0)
        } else {
            0.0
        };
        add_pred_success(ctx, cell, p, success);
    }
}

//! Stochastic competition: causes act one after another on what earlier
//! causes left, in an order drawn independently for every school.

use super::{
    additional_deaths, add_pred_success, fishing_deaths, foraging_deaths, predation_outcome,
    starvation_deaths, transfer_prey, StepContext,
};
use crate::grid::CellState;
use crate::mortality::MortalityCause;
use rand::seq::SliceRandom;
use rand::Rng;

fn shuffled<R: Rng>(n: usize, rng: &mut R) -> Vec<usize> {
    let mut seq: Vec<usize> = (0..n).collect();
    seq.shuffle(rng);
    seq
}

pub(super) fn resolve<R: Rng>(
    ctx: &StepContext<'_>,
    cell: &mut CellState,
    accessibility: &[Vec<f64>],
    rng: &mut R,
) {
    let ns = cell.schools.len();
    let n_predators = cell.n_predators();

    // One independent visiting order per cause.
    let seq_pred = shuffled(n_predators, rng);
    let seq_starv = shuffled(ns, rng);
    let seq_add = shuffled(ns, rng);
    let seq_fish = shuffled(ns, rng);
    let seq_forage = shuffled(ns, rng);

    let mut causes = MortalityCause::COMPETING;
    for i in 0..n_predators {
        causes.shuffle(rng);
        for &cause in &causes {
            match cause {
                MortalityCause::Predation => predate(ctx, cell, accessibility, seq_pred[i]),
                // Background schools only take part through predation.
                _ if i >= ns => {}
                MortalityCause::Starvation => {
                    let school = &mut cell.schools[seq_starv[i]];
                    let n = starvation_deaths(ctx, school);
                    school.increment_dead(cause, n);
                }
                MortalityCause::Additional => {
                    let school = &mut cell.schools[seq_add[i]];
                    let n = additional_deaths(ctx, school);
                    school.increment_dead(cause, n);
                }
                MortalityCause::Fishing => {
                    let school = &mut cell.schools[seq_fish[i]];
                    let n = fishing_deaths(ctx, school);
                    school.increment_dead(cause, n);
                }
                MortalityCause::Foraging => {
                    let school = &mut cell.schools[seq_forage[i]];
                    let n = foraging_deaths(ctx, school);
                    school.increment_dead(cause, n);
                }
                MortalityCause::Out => {}
            }
        }
    }
}

fn predate(ctx: &StepContext<'_>, cell: &mut CellState, accessibility: &[Vec<f64>], predator: usize) {
    let outcome = predation_outcome(ctx, cell, accessibility, predator);
    if outcome.biomass_to_predate <= 0.0 {
        return;
    }
    let losses: Vec<(usize, f64)> = {
        let pool = super::pool(cell);
        outcome
            .prey_upon
            .iter()
            .enumerate()
            .filter(|&(prey, &biomass)| prey != predator && biomass > 0.0)
            .map(|(prey, &biomass)| (prey, pool[prey].biom2abd(biomass)))
            .collect()
    };
    for (prey, abundance) in losses {
        transfer_prey(ctx, cell, predator, prey, abundance);
    }
    add_pred_success(ctx, cell, predator, outcome.success_rate);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accessibility::FoodWeb;
    use crate::config::{MortalityAlgorithm, SimConfig};
    use crate::mortality::fishing::FishingPlan;
    use crate::rng::create_rng;
    use crate::school::School;
    use crate::species::SpeciesTable;

    #[test]
    fn shuffled_is_a_permutation() {
        let mut rng = create_rng(3);
        let mut seq = shuffled(40, &mut rng);
        seq.sort_unstable();
        assert_eq!(seq, (0..40).collect::<Vec<_>>());
    }

    #[test]
    fn cause_order_changes_outcome_between_seeds() {
        let config = SimConfig::default();
        let table = SpeciesTable::from_config(&config);
        let web = FoodWeb::from_config(&config, &table);
        let plan = FishingPlan::default();
        let ctx = StepContext {
            table: &table,
            food_web: &web,
            fishing: &plan,
            algorithm: MortalityAlgorithm::Stochastic,
            iterative: &config.iterative,
            seed: 0,
            step: 0,
            substep: 0,
            record_diet: false,
        };
        let build = || {
            let mut cell = CellState::new(0);
            for id in 0..6 {
                let mut school = School::new(id, &table.species[0], 30, 14.0, 5_000.0, Some(0));
                school.reset_step(table.n_diet_groups());
                school.starvation_rate = 2.0;
                cell.schools.push(school);
            }
            cell
        };
        let outcomes: Vec<Vec<f64>> = (0..8)
            .map(|seed| {
                let mut cell = build();
                let mut rng = create_rng(seed);
                let access = super::super::accessibility_vectors(&ctx, &cell);
                resolve(&ctx, &mut cell, &access, &mut rng);
                cell.schools
                    .iter()
                    .map(|s| s.substep_deaths().get(MortalityCause::Starvation))
                    .collect()
            })
            .collect();
        // Starvation and additional mortality compete, so the share taken by
        // starvation depends on which one is drawn first.
        assert!(outcomes.iter().any(|o| o != &outcomes[0]));
        for deaths in &outcomes {
            assert!(deaths.iter().all(|&d| d > 0.0));
        }
    }
}

use super::super::{Simulation, SimulationError, StepState};
use crate::dispatch;
use crate::grid::CellState;
use crate::mortality::fishing::{self, FishingPlan, FishingPressure};
use crate::mortality::{out, MortalityCause};
use crate::scheduler::{self, StepContext};
use rayon::prelude::*;
use tracing::{debug, warn};

impl Simulation {
    /// Run every sub-step: cells in parallel, then a barrier, then the
    /// sub-step deaths are applied to abundance.
    pub(in crate::world) fn mortality_phase(
        &self,
        state: &mut StepState,
        step: usize,
    ) -> Result<(), SimulationError> {
        let subdt = self.config.subdt;
        for substep in 0..subdt {
            let plan = self.fishing_plan(step, state);
            let ctx = StepContext {
                table: &self.table,
                food_web: &self.food_web,
                fishing: &plan,
                algorithm: self.config.algorithm,
                iterative: &self.config.iterative,
                seed: self.config.seed,
                step,
                substep,
                record_diet: self.config.record_diet,
            };

            let counts: Vec<usize> = state.cells.iter().map(|c| c.schools.len()).collect();
            let assignment = dispatch::partition(&counts, self.n_batches);
            if substep == 0 {
                debug!(
                    step,
                    cells = counts.len(),
                    loads = ?dispatch::batch_loads(&counts, &assignment, self.n_batches),
                    "dispatching cell batches"
                );
            }
            let mut buckets: Vec<Vec<&mut CellState>> =
                (0..self.n_batches).map(|_| Vec::new()).collect();
            for (cell, &batch) in state.cells.iter_mut().zip(&assignment) {
                buckets[batch].push(cell);
            }
            // `install` returns once every batch is done: the sub-step barrier.
            self.pool.install(|| {
                buckets.into_par_iter().try_for_each(|bucket| {
                    bucket
                        .into_iter()
                        .try_for_each(|cell| scheduler::resolve_cell(&ctx, cell))
                })
            })?;

            for school in state.outside.iter_mut().filter(|s| s.alive) {
                let rate = self.table.species[school.species].out_rate;
                let n = out::deaths(school.instantaneous_abundance(), rate, subdt);
                school.increment_dead(MortalityCause::Out, n);
            }
            for school in state.schools_mut() {
                if let Some(excess) = school.apply_substep_deaths() {
                    warn!(
                        school = school.id,
                        species = school.species,
                        step,
                        substep,
                        excess,
                        "deaths exceeded abundance; clamped to zero"
                    );
                }
            }
        }
        Ok(())
    }

    /// Fishing pressure of each species for the coming sub-step. Catch quotas
    /// are shared according to the fishable biomass assessed now.
    fn fishing_plan(&self, step: usize, state: &StepState) -> FishingPlan {
        let subdt = self.config.subdt as f64;
        let mut fishable = vec![0.0; self.table.n_species()];
        for school in state.cells.iter().flat_map(|c| c.schools.iter()) {
            let params = &self.table.species[school.species];
            if school.alive
                && fishing::is_fishable(
                    school.age_dt,
                    params.recruitment_age_dt,
                    school.catchable,
                    school.cell.is_some(),
                )
            {
                fishable[school.species] += school.biomass();
            }
        }
        let pressures = self
            .table
            .species
            .iter()
            .map(|params| match params.fishing_rate(step) {
                Some(rate) => FishingPressure::Rate(rate),
                None => FishingPressure::Catches {
                    substep_catches: params.catches(step).unwrap_or(0.0) / subdt,
                    fishable_biomass: fishable[params.index],
                },
            })
            .collect();
        FishingPlan::new(pressures)
    }
}

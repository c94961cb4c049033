//! Per-cell resolution of competing mortality causes for one sub-step.

mod iterative;
mod stochastic;

use crate::accessibility::FoodWeb;
use crate::aggregation::Aggregation;
use crate::config::{IterativeConfig, MortalityAlgorithm};
use crate::grid::CellState;
use crate::mortality::fishing::{self, FishingPlan};
use crate::mortality::{additional, foraging, starvation, MortalityCause};
use crate::predation::{self, PredationOutcome};
use crate::rng::derive_cell_rng;
use crate::school::School;
use crate::species::SpeciesTable;
use crate::world::SimulationError;

/// Read-only inputs shared by every cell of one sub-step.
#[derive(Clone, Copy, Debug)]
pub struct StepContext<'a> {
    pub table: &'a SpeciesTable,
    pub food_web: &'a FoodWeb,
    pub fishing: &'a FishingPlan,
    pub algorithm: MortalityAlgorithm,
    pub iterative: &'a IterativeConfig,
    pub seed: u64,
    pub step: usize,
    pub substep: usize,
    pub record_diet: bool,
}

impl StepContext<'_> {
    fn subdt(&self) -> usize {
        self.table.subdt
    }

    fn steps_per_year(&self) -> usize {
        self.table.steps_per_year
    }
}

/// Resolve one sub-step of mortality in one cell. Deaths are recorded in the
/// schools' sub-step accumulators; abundance is left for the driver to update.
pub fn resolve_cell(ctx: &StepContext<'_>, cell: &mut CellState) -> Result<(), SimulationError> {
    for school in cell.schools.iter_mut().filter(|s| s.is_egg()) {
        school.release_eggs();
    }
    let accessibility = accessibility_vectors(ctx, cell);
    match ctx.algorithm {
        MortalityAlgorithm::Stochastic => {
            let mut rng = derive_cell_rng(ctx.seed, ctx.step, ctx.substep, cell.cell);
            stochastic::resolve(ctx, cell, &accessibility, &mut rng);
        }
        MortalityAlgorithm::Iterative => iterative::resolve(ctx, cell, &accessibility),
    }
    check_finite(cell)
}

fn check_finite(cell: &CellState) -> Result<(), SimulationError> {
    for school in &cell.schools {
        let finite = school.substep_deaths().is_finite()
            && school.abundance.is_finite()
            && school.weight.is_finite()
            && school.biomass().is_finite();
        if !finite {
            return Err(SimulationError::NonFiniteState {
                school: school.id,
                cell: cell.cell,
            });
        }
    }
    Ok(())
}

/// Every pool member as a prey view: schools, background schools, swarms.
fn pool(cell: &CellState) -> Vec<&dyn Aggregation> {
    let mut pool: Vec<&dyn Aggregation> = Vec::with_capacity(cell.pool_len());
    pool.extend(cell.schools.iter().map(|s| s as &dyn Aggregation));
    pool.extend(cell.background.iter().map(|b| b as &dyn Aggregation));
    pool.extend(cell.swarms.iter().map(|s| s as &dyn Aggregation));
    pool
}

fn member_mut(cell: &mut CellState, idx: usize) -> &mut dyn Aggregation {
    let ns = cell.schools.len();
    let nb = cell.background.len();
    if idx < ns {
        &mut cell.schools[idx]
    } else if idx < ns + nb {
        &mut cell.background[idx - ns]
    } else {
        &mut cell.swarms[idx - ns - nb]
    }
}

/// Accessibility of the pool to each predator, computed once per sub-step.
fn accessibility_vectors(ctx: &StepContext<'_>, cell: &CellState) -> Vec<Vec<f64>> {
    let pool = pool(cell);
    (0..cell.n_predators())
        .map(|p| {
            let mut out = Vec::new();
            ctx.food_web
                .accessibility_vector(ctx.table, pool[p], p, &pool, &mut out);
            out
        })
        .collect()
}

fn predation_outcome(
    ctx: &StepContext<'_>,
    cell: &CellState,
    accessibility: &[Vec<f64>],
    predator: usize,
) -> PredationOutcome {
    let pool = pool(cell);
    let rate_max = predation::predation_rate_max(ctx.table, pool[predator].group());
    predation::compute_predation(
        pool[predator],
        rate_max,
        &pool,
        &accessibility[predator],
        ctx.steps_per_year(),
        ctx.subdt(),
    )
}

/// Remove `biomass` (tons) from pool member `prey` on behalf of `predator`
/// and book it on the predator. Returns the biomass actually removed.
fn transfer_prey(
    ctx: &StepContext<'_>,
    cell: &mut CellState,
    predator: usize,
    prey: usize,
    abundance: f64,
) -> f64 {
    let (eaten, prey_tl, column) = {
        let victim = member_mut(cell, prey);
        let applied = victim.increment_dead(MortalityCause::Predation, abundance);
        let column = ctx
            .record_diet
            .then(|| ctx.table.diet_column(victim.group(), victim.diet_stage()));
        (victim.abd2biom(applied), victim.trophic_level(), column)
    };
    // Background predators are forced, so their intake is not tracked.
    if eaten > 0.0 {
        if let Some(school) = cell.schools.get_mut(predator) {
            school.record_prey(prey_tl, eaten, column);
        }
    }
    eaten
}

fn add_pred_success(ctx: &StepContext<'_>, cell: &mut CellState, predator: usize, success: f64) {
    if let Some(school) = cell.schools.get_mut(predator) {
        school.add_pred_success(success, ctx.subdt());
    }
}

fn starvation_deaths(ctx: &StepContext<'_>, school: &School) -> f64 {
    if school.is_egg() {
        return 0.0;
    }
    starvation::deaths(
        school.instantaneous_abundance(),
        school.starvation_rate,
        ctx.subdt(),
    )
}

fn additional_deaths(ctx: &StepContext<'_>, school: &School) -> f64 {
    // Eggs already paid the larval rate at the start of the step.
    if school.is_egg() {
        return 0.0;
    }
    let params = &ctx.table.species[school.species];
    additional::deaths(
        school.instantaneous_abundance(),
        params.additional_rate,
        ctx.subdt(),
    )
}

fn fishing_deaths(ctx: &StepContext<'_>, school: &School) -> f64 {
    let params = &ctx.table.species[school.species];
    if !fishing::is_fishable(
        school.age_dt,
        params.recruitment_age_dt,
        school.catchable,
        school.cell.is_some(),
    ) {
        return 0.0;
    }
    fishing::deaths(
        ctx.fishing.pressure(school.species),
        school.instantaneous_abundance(),
        school.biomass(),
        school.weight,
        ctx.subdt(),
    )
}

fn foraging_deaths(ctx: &StepContext<'_>, school: &School) -> f64 {
    let params = &ctx.table.species[school.species];
    foraging::deaths(
        school.instantaneous_abundance(),
        params.foraging_rate,
        ctx.subdt(),
        school.is_egg(),
    )
}

use crate::accessibility::FoodWeb;
use crate::config::{ConfigError, SimConfig};
use crate::forcing::Forcing;
use crate::grid::{CellState, Grid};
use crate::growth::{GrowthProcess, VonBertalanffyGrowth};
use crate::metrics::{RunSummary, SchoolSnapshot, StepSummary};
use crate::population::Population;
use crate::reproduction::{ReproductionProcess, SsbReproduction};
use crate::rng::create_rng;
use crate::school::School;
use crate::species::SpeciesTable;
use rand_chacha::ChaCha12Rng;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("failed to build the worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error("unknown species index {species}")]
    UnknownSpecies { species: usize },
    #[error("cell {cell} is not an ocean cell of the grid")]
    InvalidCell { cell: usize },
    #[error("invalid {field} {value} for a new school")]
    InvalidSchool { field: &'static str, value: f64 },
    #[error("non-finite state for school {school} in cell {cell}")]
    NonFiniteState { school: u64, cell: usize },
    #[error("simulation halted by a failure during step {step}")]
    Halted { step: usize },
    #[error("simulation already completed its {n_steps} steps")]
    Finished { n_steps: usize },
}

/// Schools split by location for the duration of one time step.
struct StepState {
    cells: Vec<CellState>,
    /// Schools without a cell: out of the domain, or already dead.
    outside: Vec<School>,
}

impl StepState {
    fn schools_mut(&mut self) -> impl Iterator<Item = &mut School> {
        self.cells
            .iter_mut()
            .flat_map(|c| c.schools.iter_mut())
            .chain(self.outside.iter_mut())
    }

    fn into_schools(self) -> Vec<School> {
        let mut schools: Vec<School> = self.cells.into_iter().flat_map(|c| c.schools).collect();
        schools.extend(self.outside);
        schools
    }
}

pub struct Simulation {
    // Keep config private to preserve constructor invariants.
    config: SimConfig,
    table: SpeciesTable,
    food_web: FoodWeb,
    grid: Grid,
    forcing: Box<dyn Forcing>,
    growth: Box<dyn GrowthProcess>,
    reproduction: Box<dyn ReproductionProcess>,
    population: Population,
    pool: rayon::ThreadPool,
    n_batches: usize,
    /// Drives single-threaded phases only; cell workers derive their own streams.
    rng: ChaCha12Rng,
    step: usize,
    /// Step whose mortality failed. Its deaths are partially applied, so no
    /// further step may run.
    halted: Option<usize>,
    mpa: Vec<bool>,
    snapshots: Vec<SchoolSnapshot>,
}

impl Simulation {
    pub fn new(config: SimConfig, forcing: Box<dyn Forcing>) -> Result<Self, SimulationError> {
        config.validate()?;
        let table = SpeciesTable::from_config(&config);
        let food_web = FoodWeb::from_config(&config, &table);
        let grid = Grid::from_config(&config.grid);
        let available = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        let n_batches = config.n_cpu.min(available).max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(n_batches)
            .build()?;
        info!(
            n_batches,
            n_species = table.n_species(),
            ocean_cells = grid.ocean_cells().len(),
            algorithm = ?config.algorithm,
            "simulation initialised"
        );
        Ok(Self {
            rng: create_rng(config.seed),
            mpa: vec![false; grid.n_cells()],
            config,
            table,
            food_web,
            grid,
            forcing,
            growth: Box::new(VonBertalanffyGrowth),
            reproduction: Box::new(SsbReproduction),
            population: Population::new(),
            pool,
            n_batches,
            step: 0,
            halted: None,
            snapshots: Vec::new(),
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn species_table(&self) -> &SpeciesTable {
        &self.table
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    /// Index of the next step to run.
    pub fn current_step(&self) -> usize {
        self.step
    }

    /// Worker count actually used for cell batches.
    pub fn n_batches(&self) -> usize {
        self.n_batches
    }

    pub fn is_finished(&self) -> bool {
        self.step >= self.config.n_steps()
    }

    /// Step at which the run stopped on an error, if it did.
    pub fn halted_at(&self) -> Option<usize> {
        self.halted
    }

    /// Per-school state at the end of the last completed step, including
    /// schools that died during it.
    pub fn snapshots(&self) -> &[SchoolSnapshot] {
        &self.snapshots
    }

    pub fn set_growth_process(&mut self, growth: Box<dyn GrowthProcess>) {
        self.growth = growth;
    }

    pub fn set_reproduction_process(&mut self, reproduction: Box<dyn ReproductionProcess>) {
        self.reproduction = reproduction;
    }

    /// Add a school of `species` to the population. `cell == None` places it
    /// outside the simulated domain.
    pub fn seed_school(
        &mut self,
        species: usize,
        age_dt: usize,
        length: f64,
        abundance: f64,
        cell: Option<usize>,
    ) -> Result<u64, SimulationError> {
        let params = self
            .table
            .species
            .get(species)
            .ok_or(SimulationError::UnknownSpecies { species })?;
        if let Some(cell) = cell {
            if self.grid.is_land(cell) {
                return Err(SimulationError::InvalidCell { cell });
            }
        }
        if !(length.is_finite() && length > 0.0) {
            return Err(SimulationError::InvalidSchool {
                field: "length",
                value: length,
            });
        }
        if !(abundance.is_finite() && abundance >= 0.0) {
            return Err(SimulationError::InvalidSchool {
                field: "abundance",
                value: abundance,
            });
        }
        let school = School::new(0, params, age_dt, length, abundance, cell);
        Ok(self.population.add(school))
    }

    /// Run one time step: mortality over every sub-step, then growth,
    /// ageing and reproduction.
    pub fn step(&mut self) -> Result<StepSummary, SimulationError> {
        if let Some(step) = self.halted {
            return Err(SimulationError::Halted { step });
        }
        if self.is_finished() {
            return Err(SimulationError::Finished {
                n_steps: self.config.n_steps(),
            });
        }
        let step = self.step;
        self.update_protected_areas_phase(step);
        self.start_step_phase();
        let mut state = self.distribute_phase(step);
        self.egg_phase(&mut state);
        if let Err(err) = self.mortality_phase(&mut state, step) {
            // Schools are kept as they were at the failure for inspection.
            self.population.restore(state.into_schools());
            self.halted = Some(step);
            warn!(step, error = %err, "mortality failed, simulation halted");
            return Err(err);
        }

        let mut schools = state.into_schools();
        self.growth_phase(&mut schools);
        let mut summary =
            StepSummary::from_schools(step, &self.table, &schools, self.config.record_diet);
        self.snapshots = schools.iter().map(SchoolSnapshot::from).collect();
        let eggs = self.reproduction_phase(step, &schools);

        self.population.restore(schools);
        summary.removed_schools = self.population.remove_dead();
        summary.new_schools = eggs.len();
        for egg in eggs {
            self.population.add(egg);
        }
        self.step += 1;
        debug!(
            step,
            alive = summary.alive_schools,
            removed = summary.removed_schools,
            spawned = summary.new_schools,
            biomass = summary.total_biomass(),
            "step complete"
        );
        Ok(summary)
    }

    /// Run every remaining step.
    pub fn run(&mut self) -> Result<RunSummary, SimulationError> {
        let n_steps = self.config.n_steps();
        info!(seed = self.config.seed, n_steps, start = self.step, "run started");
        let mut steps = Vec::with_capacity(n_steps.saturating_sub(self.step));
        while !self.is_finished() {
            steps.push(self.step()?);
        }
        let names = self.table.species.iter().map(|s| s.name.clone()).collect();
        let summary = RunSummary::from_steps(self.config.seed, names, steps);
        info!(
            steps = summary.n_steps,
            alive = summary.final_alive_schools,
            "run finished"
        );
        Ok(summary)
    }
}

mod phases;

#[cfg(test)]
mod tests;

use super::super::Simulation;
use crate::school::School;

impl Simulation {
    /// New egg schools for the next step. They join the population after the
    /// dead have been removed.
    pub(in crate::world) fn reproduction_phase(&mut self, step: usize, schools: &[School]) -> Vec<School> {
        self.reproduction.reproduce(
            step,
            &self.table,
            schools,
            self.grid.ocean_cells(),
            &mut self.rng,
        )
    }
}

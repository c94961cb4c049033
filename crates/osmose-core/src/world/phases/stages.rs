use super::super::Simulation;

impl Simulation {
    /// Flag cells covered by a protected area active during this step's year.
    pub(in crate::world) fn update_protected_areas_phase(&mut self, step: usize) {
        let year = step / self.config.steps_per_year;
        self.mpa.iter_mut().for_each(|flag| *flag = false);
        for mpa in &self.config.mpas {
            if year < mpa.start_year || year > mpa.end_year {
                continue;
            }
            for &cell in &mpa.cells {
                if let Some(flag) = self.mpa.get_mut(cell) {
                    *flag = true;
                }
            }
        }
    }

    /// Recompute stage indices and clear per-step accumulators.
    pub(in crate::world) fn start_step_phase(&mut self) {
        let n_diet = self.table.n_diet_groups();
        let table = &self.table;
        let mpa = &self.mpa;
        for school in self.population.iter_mut() {
            school.update_stages(&table.species[school.species]);
            school.reset_step(n_diet);
            school.catchable = school
                .cell
                .map_or(true, |cell| !mpa.get(cell).copied().unwrap_or(false));
        }
    }
}

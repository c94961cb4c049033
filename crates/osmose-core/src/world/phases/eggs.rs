use super::super::{Simulation, StepState};
use crate::mortality::{additional, MortalityCause};

impl Simulation {
    /// Eggs pay the larval mortality once, then the survivors are held back and
    /// released to predators a fraction per sub-step.
    pub(in crate::world) fn egg_phase(&self, state: &mut StepState) {
        let subdt = self.config.subdt;
        for cell in &mut state.cells {
            for egg in cell.schools.iter_mut().filter(|s| s.alive && s.is_egg()) {
                let rate = self.table.species[egg.species].larval_rate;
                let n = additional::larval_deaths(egg.abundance, rate);
                egg.increment_dead(MortalityCause::Additional, n);
                egg.apply_substep_deaths();
                if egg.alive {
                    egg.retain_eggs(subdt);
                }
            }
        }
        for egg in state.outside.iter_mut().filter(|s| s.alive && s.is_egg()) {
            let rate = self.table.species[egg.species].larval_rate;
            let n = additional::larval_deaths(egg.abundance, rate);
            egg.increment_dead(MortalityCause::Additional, n);
            egg.apply_substep_deaths();
        }
    }
}

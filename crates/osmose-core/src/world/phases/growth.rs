use super::super::Simulation;
use crate::mortality::starvation;
use crate::school::School;

impl Simulation {
    /// Update trophic level, grow, set next step's starvation rate, then age
    /// and retire schools past their lifespan.
    pub(in crate::world) fn growth_phase(&self, schools: &mut [School]) {
        for school in schools.iter_mut().filter(|s| s.alive) {
            let params = &self.table.species[school.species];
            school.update_trophic_level();
            self.growth.grow(school, params);
            school.starvation_rate = starvation::rate(
                school.pred_success_rate,
                params.critical_pred_success,
                params.starvation_rate_max,
            );
            school.age_dt += 1;
            if school.age_dt > params.lifespan_dt {
                school.kill();
            }
        }
    }
}

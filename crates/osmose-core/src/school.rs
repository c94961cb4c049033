use crate::constants::{EXTINCTION_ABUNDANCE, GRAMS_PER_TON, TL_EGG};
use crate::mortality::{DeathCounts, MortalityCause};
use crate::species::SpeciesParams;

/// Super-individual: fish of one species and cohort sharing one state.
#[derive(Clone, Debug, PartialEq)]
pub struct School {
    pub id: u64,
    pub species: usize,
    /// Age in time steps; zero means the school is still an egg batch.
    pub age_dt: usize,
    /// cm
    pub length: f64,
    /// Individual weight (g).
    pub weight: f64,
    pub abundance: f64,
    pub trophic_level: f64,
    /// `None` when the school has left the simulated domain.
    pub cell: Option<usize>,
    pub alive: bool,
    /// Cleared while the school sits in an active protected area.
    pub catchable: bool,
    pub feeding_stage: usize,
    pub accessibility_stage: usize,
    pub diet_stage: usize,
    /// Fraction of the time step appetite satisfied so far.
    pub pred_success_rate: f64,
    /// Starvation rate per time step, derived from the previous step's success.
    pub starvation_rate: f64,
    pub(crate) substep_deaths: DeathCounts,
    pub(crate) step_deaths: DeathCounts,
    /// Same as `step_deaths`, in tons at the weight of the time of death.
    pub(crate) step_dead_biomass: DeathCounts,
    pub(crate) egg_retained: f64,
    pub(crate) egg_release: f64,
    pub(crate) preyed_biomass: f64,
    pub(crate) tl_sum: f64,
    pub(crate) diet: Vec<f64>,
}

impl School {
    pub fn new(
        id: u64,
        params: &SpeciesParams,
        age_dt: usize,
        length: f64,
        abundance: f64,
        cell: Option<usize>,
    ) -> Self {
        Self {
            id,
            species: params.index,
            age_dt,
            length,
            weight: params.weight_at(length),
            abundance,
            trophic_level: TL_EGG,
            cell,
            alive: abundance >= EXTINCTION_ABUNDANCE,
            catchable: true,
            feeding_stage: params.feeding_stage(length),
            accessibility_stage: params.accessibility_stage(age_dt),
            diet_stage: params.diet_stage(length),
            pred_success_rate: 0.0,
            starvation_rate: 0.0,
            substep_deaths: DeathCounts::default(),
            step_deaths: DeathCounts::default(),
            step_dead_biomass: DeathCounts::default(),
            egg_retained: 0.0,
            egg_release: 0.0,
            preyed_biomass: 0.0,
            tl_sum: 0.0,
            diet: Vec::new(),
        }
    }

    /// Freshly spawned batch of eggs.
    pub fn egg(id: u64, params: &SpeciesParams, abundance: f64, cell: usize) -> Self {
        let mut school = Self::new(id, params, 0, params.egg_size, abundance, Some(cell));
        school.weight = params.egg_weight;
        school
    }

    pub fn is_egg(&self) -> bool {
        self.age_dt == 0
    }

    /// Tons.
    pub fn biomass(&self) -> f64 {
        self.abundance * self.weight / GRAMS_PER_TON
    }

    /// Abundance left for any cause in the current sub-step: deaths already
    /// recorded and eggs still retained are not available.
    pub fn instantaneous_abundance(&self) -> f64 {
        (self.abundance - self.substep_deaths.total() - self.egg_retained).max(0.0)
    }

    pub fn instantaneous_biomass(&self) -> f64 {
        self.abd2biom(self.instantaneous_abundance())
    }

    pub fn biom2abd(&self, biomass: f64) -> f64 {
        if self.weight > 0.0 {
            biomass * GRAMS_PER_TON / self.weight
        } else {
            0.0
        }
    }

    pub fn abd2biom(&self, abundance: f64) -> f64 {
        abundance * self.weight / GRAMS_PER_TON
    }

    /// Record `n` deaths for `cause`, capped by the instantaneous abundance.
    /// Returns the number actually recorded.
    pub fn increment_dead(&mut self, cause: MortalityCause, n: f64) -> f64 {
        if n.is_nan() || n <= 0.0 {
            return 0.0;
        }
        let applied = n.min(self.instantaneous_abundance());
        self.substep_deaths.add(cause, applied);
        applied
    }

    pub fn substep_deaths(&self) -> &DeathCounts {
        &self.substep_deaths
    }

    /// Deaths accumulated over the current (or last completed) time step.
    pub fn step_deaths(&self) -> &DeathCounts {
        &self.step_deaths
    }

    pub fn step_dead_biomass(&self) -> &DeathCounts {
        &self.step_dead_biomass
    }

    pub fn diet(&self) -> &[f64] {
        &self.diet
    }

    pub fn preyed_biomass(&self) -> f64 {
        self.preyed_biomass
    }

    pub fn update_stages(&mut self, params: &SpeciesParams) {
        self.feeding_stage = params.feeding_stage(self.length);
        self.accessibility_stage = params.accessibility_stage(self.age_dt);
        self.diet_stage = params.diet_stage(self.length);
    }

    pub fn reset_step(&mut self, n_diet_groups: usize) {
        self.substep_deaths.reset();
        self.step_deaths.reset();
        self.step_dead_biomass.reset();
        self.pred_success_rate = 0.0;
        self.egg_retained = 0.0;
        self.egg_release = 0.0;
        self.preyed_biomass = 0.0;
        self.tl_sum = 0.0;
        self.diet.clear();
        self.diet.resize(n_diet_groups, 0.0);
    }

    /// Hold the whole egg batch back; `1/subdt` of it is released per sub-step.
    pub fn retain_eggs(&mut self, subdt: usize) {
        self.egg_retained = self.abundance;
        self.egg_release = self.abundance / subdt.max(1) as f64;
    }

    pub fn release_eggs(&mut self) {
        self.egg_retained = (self.egg_retained - self.egg_release).max(0.0);
    }

    pub fn add_pred_success(&mut self, success: f64, subdt: usize) {
        self.pred_success_rate += success / subdt.max(1) as f64;
    }

    /// Bookkeeping for prey actually eaten: trophic level and optional diet.
    pub fn record_prey(&mut self, prey_tl: f64, biomass: f64, diet_column: Option<usize>) {
        self.preyed_biomass += biomass;
        self.tl_sum += prey_tl * biomass;
        if let Some(slot) = diet_column.and_then(|col| self.diet.get_mut(col)) {
            *slot += biomass;
        }
    }

    /// Move sub-step deaths into the step total and update abundance.
    /// Returns the amount by which deaths exceeded abundance, if they did.
    pub fn apply_substep_deaths(&mut self) -> Option<f64> {
        let dead = self.substep_deaths.total();
        self.step_deaths.merge(&self.substep_deaths);
        self.step_dead_biomass
            .merge(&self.substep_deaths.scaled(self.weight / GRAMS_PER_TON));
        self.substep_deaths.reset();
        let remaining = self.abundance - dead;
        let overshoot = (remaining < 0.0).then_some(-remaining);
        if remaining < EXTINCTION_ABUNDANCE {
            self.kill();
        } else {
            self.abundance = remaining;
        }
        overshoot
    }

    /// New trophic level from what was eaten during the step.
    pub fn update_trophic_level(&mut self) {
        if self.preyed_biomass > 0.0 {
            self.trophic_level = self.tl_sum / self.preyed_biomass + 1.0;
        }
    }

    pub fn kill(&mut self) {
        self.abundance = 0.0;
        self.egg_retained = 0.0;
        self.alive = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::species::SpeciesTable;

    fn params() -> SpeciesParams {
        SpeciesTable::from_config(&SimConfig::default()).species[0].clone()
    }

    #[test]
    fn biomass_is_in_tons() {
        let mut school = School::new(1, &params(), 10, 10.0, 1000.0, Some(3));
        school.weight = 500.0;
        assert!((school.biomass() - 0.5).abs() < 1e-12);
        assert!((school.biom2abd(0.5) - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn increment_dead_is_capped_by_instantaneous_abundance() {
        let mut school = School::new(1, &params(), 10, 10.0, 100.0, Some(3));
        assert_eq!(school.increment_dead(MortalityCause::Fishing, 60.0), 60.0);
        assert_eq!(school.increment_dead(MortalityCause::Predation, 60.0), 40.0);
        assert_eq!(school.increment_dead(MortalityCause::Additional, 5.0), 0.0);
        assert_eq!(school.increment_dead(MortalityCause::Additional, f64::NAN), 0.0);
        assert_eq!(school.instantaneous_abundance(), 0.0);
        assert_eq!(school.substep_deaths().total(), 100.0);
    }

    #[test]
    fn retained_eggs_are_released_per_substep() {
        let p = params();
        let mut egg = School::egg(7, &p, 1000.0, 2);
        assert!(egg.is_egg());
        assert_eq!(egg.length, p.egg_size);
        assert_eq!(egg.weight, p.egg_weight);
        egg.retain_eggs(4);
        assert_eq!(egg.instantaneous_abundance(), 0.0);
        egg.release_eggs();
        assert!((egg.instantaneous_abundance() - 250.0).abs() < 1e-9);
        for _ in 0..3 {
            egg.release_eggs();
        }
        assert!((egg.instantaneous_abundance() - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn abundance_below_one_kills_school() {
        let mut school = School::new(1, &params(), 10, 10.0, 10.0, Some(0));
        school.increment_dead(MortalityCause::Starvation, 9.5);
        assert_eq!(school.apply_substep_deaths(), None);
        assert_eq!(school.abundance, 0.0);
        assert!(!school.alive);
        assert_eq!(school.step_deaths().get(MortalityCause::Starvation), 9.5);
    }

    #[test]
    fn overshooting_deaths_are_reported_and_clamped() {
        let mut school = School::new(1, &params(), 10, 10.0, 10.0, Some(0));
        school.substep_deaths.add(MortalityCause::Fishing, 12.0);
        assert_eq!(school.apply_substep_deaths(), Some(2.0));
        assert_eq!(school.abundance, 0.0);
        assert!(school.biomass() >= 0.0);
    }

    #[test]
    fn trophic_level_is_biomass_weighted_prey_level_plus_one() {
        let mut school = School::new(1, &params(), 10, 10.0, 10.0, Some(0));
        school.reset_step(3);
        school.record_prey(2.0, 1.0, Some(0));
        school.record_prey(3.0, 3.0, None);
        school.update_trophic_level();
        assert!((school.trophic_level - 3.75).abs() < 1e-12);
        assert_eq!(school.diet(), &[1.0, 0.0, 0.0]);

        let before = school.trophic_level;
        school.reset_step(3);
        school.update_trophic_level();
        assert_eq!(school.trophic_level, before);
    }
}

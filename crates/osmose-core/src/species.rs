use crate::config::{
    BackgroundSpeciesConfig, FishingConfig, PlanktonConfig, SimConfig, SpeciesConfig,
};

/// Read-only parameters of one focal species, with rates expressed per time
/// step and ages in time steps.
#[derive(Clone, Debug)]
pub struct SpeciesParams {
    pub index: usize,
    pub name: String,
    pub lifespan_dt: usize,
    pub recruitment_age_dt: usize,
    pub linf: f64,
    pub k: f64,
    pub t0: f64,
    pub condition_factor: f64,
    pub allometric_power: f64,
    pub egg_size: f64,
    pub egg_weight: f64,
    pub maturity_size: f64,
    pub sex_ratio: f64,
    pub relative_fecundity: f64,
    pub schools_per_spawn: usize,
    pub growth_max_delta_factor: f64,
    /// Annual maximum ingestion rate; the predation kernel does its own scaling.
    pub predation_rate_max: f64,
    pub critical_pred_success: f64,
    pub starvation_rate_max: f64,
    pub additional_rate: f64,
    pub larval_rate: f64,
    pub out_rate: f64,
    pub foraging_rate: f64,
    pub feeding_stage_thresholds: Vec<f64>,
    pub size_ratio_min: Vec<f64>,
    pub size_ratio_max: Vec<f64>,
    accessibility_stage_thresholds_dt: Vec<f64>,
    diet_stage_thresholds: Vec<f64>,
    spawning_seasonality: Vec<f64>,
    fishing: FishingConfig,
    steps_per_year: usize,
    /// First accessibility matrix row/column of this species.
    pub(crate) accessibility_offset: usize,
}

impl SpeciesParams {
    fn from_config(
        index: usize,
        cfg: &SpeciesConfig,
        steps_per_year: usize,
        accessibility_offset: usize,
    ) -> Self {
        let spy = steps_per_year as f64;
        let to_dt = |years: f64| (years * spy).round() as usize;
        Self {
            index,
            name: cfg.name.clone(),
            lifespan_dt: to_dt(cfg.lifespan),
            recruitment_age_dt: to_dt(cfg.recruitment_age),
            linf: cfg.linf,
            k: cfg.k,
            t0: cfg.t0,
            condition_factor: cfg.condition_factor,
            allometric_power: cfg.allometric_power,
            egg_size: cfg.egg_size,
            egg_weight: cfg.egg_weight,
            maturity_size: cfg.maturity_size,
            sex_ratio: cfg.sex_ratio,
            relative_fecundity: cfg.relative_fecundity,
            schools_per_spawn: cfg.schools_per_spawn,
            growth_max_delta_factor: cfg.growth_max_delta_factor,
            predation_rate_max: cfg.predation_rate_max,
            critical_pred_success: cfg.critical_pred_success,
            starvation_rate_max: cfg.starvation_rate_max / spy,
            additional_rate: cfg.additional_mortality_rate / spy,
            larval_rate: cfg.larval_mortality_rate,
            out_rate: cfg.out_mortality_rate / spy,
            foraging_rate: cfg.foraging_mortality_rate / spy,
            feeding_stage_thresholds: cfg.feeding_stage_thresholds.clone(),
            size_ratio_min: cfg.size_ratio_min.clone(),
            size_ratio_max: cfg.size_ratio_max.clone(),
            accessibility_stage_thresholds_dt: cfg
                .accessibility_stage_thresholds
                .iter()
                .map(|years| years * spy)
                .collect(),
            diet_stage_thresholds: cfg.diet_stage_thresholds.clone(),
            spawning_seasonality: cfg.spawning_seasonality.clone(),
            fishing: cfg.fishing.clone(),
            steps_per_year,
            accessibility_offset,
        }
    }

    pub fn n_accessibility_stages(&self) -> usize {
        self.accessibility_stage_thresholds_dt.len() + 1
    }

    pub fn n_diet_stages(&self) -> usize {
        self.diet_stage_thresholds.len() + 1
    }

    pub fn feeding_stage(&self, length: f64) -> usize {
        stage_of(&self.feeding_stage_thresholds, length)
    }

    pub fn accessibility_stage(&self, age_dt: usize) -> usize {
        stage_of(&self.accessibility_stage_thresholds_dt, age_dt as f64)
    }

    pub fn diet_stage(&self, length: f64) -> usize {
        stage_of(&self.diet_stage_thresholds, length)
    }

    /// Individual weight (g) of a fish of the given length (cm).
    pub fn weight_at(&self, length: f64) -> f64 {
        self.condition_factor * length.powf(self.allometric_power)
    }

    /// Von Bertalanffy mean length at an age given in time steps.
    pub fn vb_length(&self, age_dt: usize) -> f64 {
        let age = age_dt as f64 / self.steps_per_year as f64;
        let length = self.linf * (1.0 - (-self.k * (age - self.t0)).exp());
        length.max(self.egg_size)
    }

    /// Instantaneous fishing mortality for one time step, or `None` when the
    /// species is managed by catches.
    pub fn fishing_rate(&self, step: usize) -> Option<f64> {
        match &self.fishing {
            FishingConfig::Rate {
                annual_rate,
                seasonality,
            } => Some(if seasonality.is_empty() {
                annual_rate / self.steps_per_year as f64
            } else {
                annual_rate * seasonality[step % self.steps_per_year]
            }),
            FishingConfig::Catches { .. } => None,
        }
    }

    /// Prescribed catches (tons) for one time step, or `None` in rate mode.
    pub fn catches(&self, step: usize) -> Option<f64> {
        match &self.fishing {
            FishingConfig::Catches { per_step } => Some(per_step[step % per_step.len()]),
            FishingConfig::Rate { .. } => None,
        }
    }

    /// Fraction of the annual egg production released at this step.
    pub fn spawning_fraction(&self, step: usize) -> f64 {
        if self.spawning_seasonality.is_empty() {
            1.0 / self.steps_per_year as f64
        } else {
            self.spawning_seasonality[step % self.steps_per_year]
        }
    }
}

/// Count of thresholds reached: a value equal to a threshold belongs to the
/// upper stage.
fn stage_of(thresholds: &[f64], value: f64) -> usize {
    thresholds.iter().take_while(|&&t| value >= t).count()
}

/// Static tables shared by every worker during a run, referenced by index.
#[derive(Clone, Debug)]
pub struct SpeciesTable {
    pub species: Vec<SpeciesParams>,
    pub background: Vec<BackgroundSpeciesConfig>,
    pub plankton: Vec<PlanktonConfig>,
    pub steps_per_year: usize,
    pub subdt: usize,
    background_offset: usize,
}

impl SpeciesTable {
    /// Build the tables from a configuration that already passed validation.
    pub fn from_config(config: &SimConfig) -> Self {
        let mut offset = 0;
        let species = config
            .species
            .iter()
            .enumerate()
            .map(|(idx, cfg)| {
                let params = SpeciesParams::from_config(idx, cfg, config.steps_per_year, offset);
                offset += params.n_accessibility_stages();
                params
            })
            .collect();
        Self {
            species,
            background: config.background.clone(),
            plankton: config.plankton.clone(),
            steps_per_year: config.steps_per_year,
            subdt: config.subdt,
            background_offset: offset,
        }
    }

    pub fn n_species(&self) -> usize {
        self.species.len()
    }

    pub fn n_background(&self) -> usize {
        self.background.len()
    }

    pub fn n_plankton(&self) -> usize {
        self.plankton.len()
    }

    /// Diet columns: one per (focal species, diet stage), then one per
    /// background species, then one per plankton group.
    pub fn n_diet_groups(&self) -> usize {
        self.species.iter().map(|s| s.n_diet_stages()).sum::<usize>()
            + self.background.len()
            + self.plankton.len()
    }

    pub fn diet_column(&self, group: crate::aggregation::Group, diet_stage: usize) -> usize {
        use crate::aggregation::Group;
        let focal: usize = self.species.iter().map(|s| s.n_diet_stages()).sum();
        match group {
            Group::Focal(species) => {
                self.species[..species]
                    .iter()
                    .map(|s| s.n_diet_stages())
                    .sum::<usize>()
                    + diet_stage
            }
            Group::Background(idx) => focal + idx,
            Group::Plankton(idx) => focal + self.background.len() + idx,
        }
    }

    pub(crate) fn background_offset(&self) -> usize {
        self.background_offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::Group;

    fn table() -> SpeciesTable {
        SpeciesTable::from_config(&SimConfig::default())
    }

    #[test]
    fn stage_thresholds_are_inclusive_lower_bounds() {
        assert_eq!(stage_of(&[], 5.0), 0);
        assert_eq!(stage_of(&[10.0, 20.0], 9.99), 0);
        assert_eq!(stage_of(&[10.0, 20.0], 10.0), 1);
        assert_eq!(stage_of(&[10.0, 20.0], 25.0), 2);
    }

    #[test]
    fn rates_are_converted_to_time_step_units() {
        let table = table();
        let anchovy = &table.species[0];
        assert!((anchovy.additional_rate - 0.3 / 24.0).abs() < 1e-12);
        assert!((anchovy.fishing_rate(3).unwrap() - 0.4 / 24.0).abs() < 1e-12);
        assert_eq!(anchovy.catches(3), None);
        assert_eq!(anchovy.lifespan_dt, 96);
        assert_eq!(anchovy.recruitment_age_dt, 12);
        let hake = &table.species[2];
        assert_eq!(hake.fishing_rate(0), None);
        assert_eq!(hake.catches(17), Some(2.0));
    }

    #[test]
    fn accessibility_offsets_follow_stage_counts() {
        let table = table();
        assert_eq!(table.species[0].accessibility_offset, 0);
        assert_eq!(table.species[1].accessibility_offset, 2);
        assert_eq!(table.species[2].accessibility_offset, 4);
        assert_eq!(table.background_offset(), 6);
    }

    #[test]
    fn accessibility_stage_uses_age_in_years() {
        let table = table();
        let hake = &table.species[2];
        assert_eq!(hake.accessibility_stage(23), 0);
        assert_eq!(hake.accessibility_stage(24), 1);
    }

    #[test]
    fn vb_length_never_drops_below_egg_size() {
        let table = table();
        let anchovy = &table.species[0];
        assert!(anchovy.vb_length(0) >= anchovy.egg_size);
        assert!(anchovy.vb_length(48) > anchovy.vb_length(24));
        assert!(anchovy.vb_length(10_000) <= anchovy.linf);
    }

    #[test]
    fn diet_columns_are_contiguous() {
        let table = table();
        assert_eq!(table.n_diet_groups(), 6);
        assert_eq!(table.diet_column(Group::Focal(2), 0), 2);
        assert_eq!(table.diet_column(Group::Background(0), 0), 3);
        assert_eq!(table.diet_column(Group::Plankton(1), 0), 5);
    }
}

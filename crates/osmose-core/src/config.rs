use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How competing mortality causes are resolved inside a cell.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MortalityAlgorithm {
    /// Causes and schools are shuffled every sub-step and act on the abundance
    /// left over by the causes evaluated before them.
    #[default]
    Stochastic,
    /// Causes are converted to instantaneous rates and rescaled until the
    /// predators' appetites are consistent with what they actually obtain.
    Iterative,
}

/// Fishing pressure applied to a focal species.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FishingConfig {
    /// Instantaneous fishing mortality. `annual_rate` is spread over the year
    /// following `seasonality` (one weight per step of the year, summing to 1),
    /// or uniformly when `seasonality` is empty.
    Rate {
        annual_rate: f64,
        #[serde(default)]
        seasonality: Vec<f64>,
    },
    /// Prescribed catches in tons per time step. The series is cycled, so one
    /// value per step of the year gives a seasonal pattern repeated each year.
    Catches { per_step: Vec<f64> },
}

impl Default for FishingConfig {
    fn default() -> Self {
        FishingConfig::Rate {
            annual_rate: 0.0,
            seasonality: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SpeciesConfig {
    pub name: String,
    /// Maximum age in years; older schools are removed.
    pub lifespan: f64,
    /// Von Bertalanffy asymptotic length (cm).
    pub linf: f64,
    /// Von Bertalanffy growth coefficient (1/year).
    pub k: f64,
    /// Von Bertalanffy theoretical age at length zero (years).
    pub t0: f64,
    /// Length-to-weight condition factor: `weight = c * length^b` (g, cm).
    pub condition_factor: f64,
    /// Length-to-weight allometric power `b`.
    pub allometric_power: f64,
    /// Egg length (cm).
    pub egg_size: f64,
    /// Egg weight (g).
    pub egg_weight: f64,
    /// Schools at or above this length (cm) spawn.
    pub maturity_size: f64,
    /// Fraction of the spawning stock that is female.
    pub sex_ratio: f64,
    /// Eggs produced per gram of mature female per year.
    pub relative_fecundity: f64,
    /// Fraction of the annual egg production released at each step of the
    /// year. Empty means uniform spawning.
    pub spawning_seasonality: Vec<f64>,
    /// Number of egg schools created per spawning event.
    pub schools_per_spawn: usize,
    /// Length increment at maximal predation success, as a multiple of the
    /// von Bertalanffy increment.
    pub growth_max_delta_factor: f64,
    /// Maximum ingestion, in biomass eaten per unit of predator biomass per year.
    pub predation_rate_max: f64,
    /// Predation success below which starvation starts.
    pub critical_pred_success: f64,
    /// Annual starvation mortality rate at zero predation success.
    pub starvation_rate_max: f64,
    /// Length thresholds (cm) between feeding stages.
    pub feeding_stage_thresholds: Vec<f64>,
    /// Minimum predator/prey length ratio per feeding stage.
    pub size_ratio_min: Vec<f64>,
    /// Maximum predator/prey length ratio per feeding stage.
    pub size_ratio_max: Vec<f64>,
    /// Age thresholds (years) between accessibility stages.
    pub accessibility_stage_thresholds: Vec<f64>,
    /// Length thresholds (cm) between diet output stages.
    pub diet_stage_thresholds: Vec<f64>,
    /// Annual additional (background) mortality rate.
    pub additional_mortality_rate: f64,
    /// Egg mortality rate applied once per step, before eggs are exposed.
    pub larval_mortality_rate: f64,
    /// Annual mortality rate of schools located outside the simulated domain.
    pub out_mortality_rate: f64,
    /// Annual foraging mortality rate (zero disables the cause).
    pub foraging_mortality_rate: f64,
    /// Age (years) from which schools can be caught.
    pub recruitment_age: f64,
    pub fishing: FishingConfig,
}

impl Default for SpeciesConfig {
    fn default() -> Self {
        Self {
            name: "species".to_string(),
            lifespan: 4.0,
            linf: 20.0,
            k: 0.4,
            t0: -0.5,
            condition_factor: 0.0076,
            allometric_power: 3.05,
            egg_size: 0.1,
            egg_weight: 0.0005,
            maturity_size: 12.0,
            sex_ratio: 0.5,
            relative_fecundity: 500.0,
            spawning_seasonality: Vec::new(),
            schools_per_spawn: 2,
            growth_max_delta_factor: 2.0,
            predation_rate_max: 3.5,
            critical_pred_success: 0.57,
            starvation_rate_max: 0.3,
            feeding_stage_thresholds: Vec::new(),
            size_ratio_min: vec![3.5],
            size_ratio_max: vec![100.0],
            accessibility_stage_thresholds: vec![0.5],
            diet_stage_thresholds: Vec::new(),
            additional_mortality_rate: 0.3,
            larval_mortality_rate: 1.0,
            out_mortality_rate: 0.0,
            foraging_mortality_rate: 0.0,
            recruitment_age: 0.5,
            fishing: FishingConfig::default(),
        }
    }
}

/// Low-trophic-level group fed by the external forcing.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlanktonConfig {
    pub name: String,
    /// Smallest organism length in the group (cm).
    pub size_min: f64,
    /// Largest organism length in the group (cm).
    pub size_max: f64,
    pub trophic_level: f64,
    /// Fraction of the forcing biomass that fish can reach.
    pub accessibility_coefficient: f64,
}

impl Default for PlanktonConfig {
    fn default() -> Self {
        Self {
            name: "plankton".to_string(),
            size_min: 0.02,
            size_max: 0.2,
            trophic_level: 2.0,
            accessibility_coefficient: 0.5,
        }
    }
}

/// Species whose biomass is prescribed by forcing but which eat and are eaten.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BackgroundSpeciesConfig {
    pub name: String,
    /// Representative length (cm).
    pub length: f64,
    /// Representative individual weight (g).
    pub weight: f64,
    pub trophic_level: f64,
    pub predation_rate_max: f64,
    pub size_ratio_min: f64,
    pub size_ratio_max: f64,
}

impl Default for BackgroundSpeciesConfig {
    fn default() -> Self {
        Self {
            name: "background".to_string(),
            length: 6.0,
            weight: 2.0,
            trophic_level: 3.2,
            predation_rate_max: 2.0,
            size_ratio_min: 3.5,
            size_ratio_max: 50.0,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GridConfig {
    pub nx: usize,
    pub ny: usize,
    /// Row-major indices (`j * nx + i`) of land cells.
    pub land: Vec<usize>,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            nx: 8,
            ny: 8,
            land: vec![0, 1, 8],
        }
    }
}

/// No-take zone active from `start_year` to `end_year`, inclusive.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MpaConfig {
    pub cells: Vec<usize>,
    pub start_year: usize,
    pub end_year: usize,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct IterativeConfig {
    pub max_iterations: usize,
    pub tolerance: f64,
}

impl Default for IterativeConfig {
    fn default() -> Self {
        Self {
            max_iterations: 50,
            tolerance: 1e-5,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimConfig {
    /// Deterministic seed for reproducible simulation runs.
    pub seed: u64,
    pub n_years: usize,
    pub steps_per_year: usize,
    /// Number of mortality sub-steps per time step.
    pub subdt: usize,
    /// Requested worker count; capped by the available parallelism.
    pub n_cpu: usize,
    pub algorithm: MortalityAlgorithm,
    pub iterative: IterativeConfig,
    /// Keep per-predator diet records in the step summaries.
    pub record_diet: bool,
    pub grid: GridConfig,
    pub species: Vec<SpeciesConfig>,
    pub background: Vec<BackgroundSpeciesConfig>,
    pub plankton: Vec<PlanktonConfig>,
    /// Accessibility of prey (rows) to predators (columns). Rows list the
    /// accessibility stages of every focal species, then one row per
    /// background species, then one row per plankton group. Columns list the
    /// accessibility stages of every focal species, then one column per
    /// background species.
    pub accessibility: Vec<Vec<f64>>,
    pub mpas: Vec<MpaConfig>,
}

impl Default for SimConfig {
    fn default() -> Self {
        let anchovy = SpeciesConfig {
            name: "anchovy".to_string(),
            linf: 19.5,
            k: 0.44,
            t0: -0.7,
            fishing: FishingConfig::Rate {
                annual_rate: 0.4,
                seasonality: Vec::new(),
            },
            ..SpeciesConfig::default()
        };
        let sardine = SpeciesConfig {
            name: "sardine".to_string(),
            lifespan: 6.0,
            linf: 25.0,
            k: 0.35,
            t0: -0.6,
            condition_factor: 0.0082,
            allometric_power: 3.06,
            maturity_size: 15.0,
            relative_fecundity: 400.0,
            fishing: FishingConfig::Rate {
                annual_rate: 0.3,
                seasonality: Vec::new(),
            },
            ..SpeciesConfig::default()
        };
        let hake = SpeciesConfig {
            name: "hake".to_string(),
            lifespan: 10.0,
            linf: 110.0,
            k: 0.1,
            t0: -0.3,
            condition_factor: 0.0069,
            allometric_power: 3.07,
            maturity_size: 35.0,
            relative_fecundity: 300.0,
            starvation_rate_max: 0.5,
            feeding_stage_thresholds: vec![12.0],
            size_ratio_min: vec![3.5, 2.5],
            size_ratio_max: vec![100.0, 30.0],
            accessibility_stage_thresholds: vec![1.0],
            additional_mortality_rate: 0.2,
            recruitment_age: 1.0,
            fishing: FishingConfig::Catches {
                per_step: vec![2.0],
            },
            ..SpeciesConfig::default()
        };
        let small_zoo = PlanktonConfig {
            name: "small_zooplankton".to_string(),
            size_min: 0.02,
            size_max: 0.2,
            trophic_level: 2.0,
            accessibility_coefficient: 0.4,
        };
        let large_zoo = PlanktonConfig {
            name: "large_zooplankton".to_string(),
            size_min: 0.2,
            size_max: 2.0,
            trophic_level: 2.5,
            accessibility_coefficient: 0.2,
        };
        let mesopelagic = BackgroundSpeciesConfig {
            name: "mesopelagic".to_string(),
            ..BackgroundSpeciesConfig::default()
        };
        // Predators: anchovy(2) sardine(2) hake(2) mesopelagic(1).
        let accessibility = vec![
            vec![0.0, 0.3, 0.0, 0.3, 0.8, 0.8, 0.3], // anchovy juveniles
            vec![0.0, 0.0, 0.0, 0.0, 0.8, 0.8, 0.1], // anchovy adults
            vec![0.0, 0.3, 0.0, 0.3, 0.8, 0.8, 0.3], // sardine juveniles
            vec![0.0, 0.0, 0.0, 0.0, 0.8, 0.8, 0.1], // sardine adults
            vec![0.0, 0.3, 0.0, 0.3, 0.5, 0.8, 0.3], // hake juveniles
            vec![0.0, 0.0, 0.0, 0.0, 0.0, 0.3, 0.0], // hake adults
            vec![0.0, 0.0, 0.0, 0.0, 0.5, 0.8, 0.0], // mesopelagic
            vec![0.8, 0.8, 0.8, 0.8, 0.3, 0.0, 0.8], // small zooplankton
            vec![0.8, 0.8, 0.8, 0.8, 0.8, 0.1, 0.8], // large zooplankton
        ];
        Self {
            seed: 42,
            n_years: 5,
            steps_per_year: 24,
            subdt: 10,
            n_cpu: 4,
            algorithm: MortalityAlgorithm::Stochastic,
            iterative: IterativeConfig::default(),
            record_diet: false,
            grid: GridConfig::default(),
            species: vec![anchovy, sardine, hake],
            background: vec![mesopelagic],
            plankton: vec![small_zoo, large_zoo],
            accessibility,
            mpas: Vec::new(),
        }
    }
}

/// Invalid configuration. Every variant names the offending key.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("at least one focal species is required")]
    NoSpecies,
    #[error("grid has no ocean cell")]
    NoOceanCell,
    #[error("{key} must be positive")]
    NotPositive { key: String },
    #[error("{key} must be finite and non-negative")]
    Negative { key: String },
    #[error("{key} must be finite and within [0,1]")]
    OutOfUnitRange { key: String },
    #[error("{key} must contain {expected} values, found {actual}")]
    WrongLength {
        key: String,
        expected: usize,
        actual: usize,
    },
    #[error("{key} must be strictly increasing")]
    NotIncreasing { key: String },
    #[error("{key} must not be empty")]
    Empty { key: String },
    #[error("{key} references cell {cell} outside the {ncell}-cell grid")]
    CellOutOfGrid {
        key: String,
        cell: usize,
        ncell: usize,
    },
    #[error("{key}: minimum exceeds maximum")]
    InvertedBounds { key: String },
}

fn check_positive(value: f64, key: impl FnOnce() -> String) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { key: key() })
    }
}

fn check_non_negative(value: f64, key: impl FnOnce() -> String) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { key: key() })
    }
}

fn check_unit(value: f64, key: impl FnOnce() -> String) -> Result<(), ConfigError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfUnitRange { key: key() })
    }
}

fn check_increasing(values: &[f64], key: impl Fn() -> String) -> Result<(), ConfigError> {
    for (idx, value) in values.iter().enumerate() {
        check_non_negative(*value, || format!("{}[{idx}]", key()))?;
    }
    if values.windows(2).any(|w| w[1] <= w[0]) {
        return Err(ConfigError::NotIncreasing { key: key() });
    }
    Ok(())
}

fn check_series(
    values: &[f64],
    expected_len: Option<usize>,
    key: impl Fn() -> String,
) -> Result<(), ConfigError> {
    if let Some(expected) = expected_len {
        if values.len() != expected {
            return Err(ConfigError::WrongLength {
                key: key(),
                expected,
                actual: values.len(),
            });
        }
    }
    for (idx, value) in values.iter().enumerate() {
        check_non_negative(*value, || format!("{}[{idx}]", key()))?;
    }
    Ok(())
}

impl SimConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_time()?;
        self.validate_grid()?;
        self.validate_species()?;
        self.validate_background()?;
        self.validate_plankton()?;
        self.validate_accessibility()?;
        self.validate_mpas()?;
        Ok(())
    }

    /// Total number of time steps in the run.
    pub fn n_steps(&self) -> usize {
        self.n_years.saturating_mul(self.steps_per_year)
    }

    /// Number of accessibility stages of a focal species.
    pub fn n_accessibility_stages(&self, species: usize) -> usize {
        self.species[species].accessibility_stage_thresholds.len() + 1
    }

    /// Number of accessibility matrix rows implied by the species lists.
    pub fn n_prey_groups(&self) -> usize {
        self.n_predator_groups() + self.plankton.len()
    }

    /// Number of accessibility matrix columns implied by the species lists.
    pub fn n_predator_groups(&self) -> usize {
        (0..self.species.len())
            .map(|s| self.n_accessibility_stages(s))
            .sum::<usize>()
            + self.background.len()
    }

    fn validate_time(&self) -> Result<(), ConfigError> {
        if self.n_years == 0 {
            return Err(ConfigError::NotPositive {
                key: "n_years".to_string(),
            });
        }
        if self.steps_per_year == 0 {
            return Err(ConfigError::NotPositive {
                key: "steps_per_year".to_string(),
            });
        }
        if self.subdt == 0 {
            return Err(ConfigError::NotPositive {
                key: "subdt".to_string(),
            });
        }
        if self.n_cpu == 0 {
            return Err(ConfigError::NotPositive {
                key: "n_cpu".to_string(),
            });
        }
        if self.iterative.max_iterations == 0 {
            return Err(ConfigError::NotPositive {
                key: "iterative.max_iterations".to_string(),
            });
        }
        check_positive(self.iterative.tolerance, || {
            "iterative.tolerance".to_string()
        })?;
        Ok(())
    }

    fn validate_grid(&self) -> Result<(), ConfigError> {
        if self.grid.nx == 0 {
            return Err(ConfigError::NotPositive {
                key: "grid.nx".to_string(),
            });
        }
        if self.grid.ny == 0 {
            return Err(ConfigError::NotPositive {
                key: "grid.ny".to_string(),
            });
        }
        let ncell = self.grid.nx * self.grid.ny;
        for (idx, &cell) in self.grid.land.iter().enumerate() {
            if cell >= ncell {
                return Err(ConfigError::CellOutOfGrid {
                    key: format!("grid.land[{idx}]"),
                    cell,
                    ncell,
                });
            }
        }
        let mut land = self.grid.land.clone();
        land.sort_unstable();
        land.dedup();
        if land.len() >= ncell {
            return Err(ConfigError::NoOceanCell);
        }
        Ok(())
    }

    fn validate_species(&self) -> Result<(), ConfigError> {
        if self.species.is_empty() {
            return Err(ConfigError::NoSpecies);
        }
        for (i, sp) in self.species.iter().enumerate() {
            let key = |field: &str| format!("species[{i}].{field}");
            check_positive(sp.lifespan, || key("lifespan"))?;
            check_positive(sp.linf, || key("linf"))?;
            check_positive(sp.k, || key("k"))?;
            if !sp.t0.is_finite() {
                return Err(ConfigError::NotPositive { key: key("t0") });
            }
            check_positive(sp.condition_factor, || key("condition_factor"))?;
            check_positive(sp.allometric_power, || key("allometric_power"))?;
            check_positive(sp.egg_size, || key("egg_size"))?;
            check_positive(sp.egg_weight, || key("egg_weight"))?;
            check_non_negative(sp.maturity_size, || key("maturity_size"))?;
            check_unit(sp.sex_ratio, || key("sex_ratio"))?;
            check_non_negative(sp.relative_fecundity, || key("relative_fecundity"))?;
            if !sp.spawning_seasonality.is_empty() {
                check_series(
                    &sp.spawning_seasonality,
                    Some(self.steps_per_year),
                    || key("spawning_seasonality"),
                )?;
            }
            if sp.schools_per_spawn == 0 {
                return Err(ConfigError::NotPositive {
                    key: key("schools_per_spawn"),
                });
            }
            check_non_negative(sp.growth_max_delta_factor, || {
                key("growth_max_delta_factor")
            })?;
            check_non_negative(sp.predation_rate_max, || key("predation_rate_max"))?;
            // The linear starvation ramp divides by the critical success.
            if !(sp.critical_pred_success.is_finite()
                && sp.critical_pred_success > 0.0
                && sp.critical_pred_success < 1.0)
            {
                return Err(ConfigError::OutOfUnitRange {
                    key: key("critical_pred_success"),
                });
            }
            check_non_negative(sp.starvation_rate_max, || key("starvation_rate_max"))?;
            check_increasing(&sp.feeding_stage_thresholds, || {
                key("feeding_stage_thresholds")
            })?;
            let n_feeding = sp.feeding_stage_thresholds.len() + 1;
            check_series(&sp.size_ratio_min, Some(n_feeding), || key("size_ratio_min"))?;
            check_series(&sp.size_ratio_max, Some(n_feeding), || key("size_ratio_max"))?;
            for stage in 0..n_feeding {
                check_positive(sp.size_ratio_min[stage], || {
                    format!("species[{i}].size_ratio_min[{stage}]")
                })?;
                if sp.size_ratio_min[stage] > sp.size_ratio_max[stage] {
                    return Err(ConfigError::InvertedBounds {
                        key: format!("species[{i}].size_ratio[{stage}]"),
                    });
                }
            }
            check_increasing(&sp.accessibility_stage_thresholds, || {
                key("accessibility_stage_thresholds")
            })?;
            check_increasing(&sp.diet_stage_thresholds, || key("diet_stage_thresholds"))?;
            check_non_negative(sp.additional_mortality_rate, || {
                key("additional_mortality_rate")
            })?;
            check_non_negative(sp.larval_mortality_rate, || key("larval_mortality_rate"))?;
            check_non_negative(sp.out_mortality_rate, || key("out_mortality_rate"))?;
            check_non_negative(sp.foraging_mortality_rate, || {
                key("foraging_mortality_rate")
            })?;
            check_non_negative(sp.recruitment_age, || key("recruitment_age"))?;
            match &sp.fishing {
                FishingConfig::Rate {
                    annual_rate,
                    seasonality,
                } => {
                    check_non_negative(*annual_rate, || key("fishing.annual_rate"))?;
                    if !seasonality.is_empty() {
                        check_series(seasonality, Some(self.steps_per_year), || {
                            key("fishing.seasonality")
                        })?;
                    }
                }
                FishingConfig::Catches { per_step } => {
                    if per_step.is_empty() {
                        return Err(ConfigError::Empty {
                            key: key("fishing.per_step"),
                        });
                    }
                    check_series(per_step, None, || key("fishing.per_step"))?;
                }
            }
        }
        Ok(())
    }

    fn validate_background(&self) -> Result<(), ConfigError> {
        for (i, bkg) in self.background.iter().enumerate() {
            let key = |field: &str| format!("background[{i}].{field}");
            check_positive(bkg.length, || key("length"))?;
            check_positive(bkg.weight, || key("weight"))?;
            check_non_negative(bkg.trophic_level, || key("trophic_level"))?;
            check_non_negative(bkg.predation_rate_max, || key("predation_rate_max"))?;
            check_positive(bkg.size_ratio_min, || key("size_ratio_min"))?;
            check_positive(bkg.size_ratio_max, || key("size_ratio_max"))?;
            if bkg.size_ratio_min > bkg.size_ratio_max {
                return Err(ConfigError::InvertedBounds {
                    key: key("size_ratio"),
                });
            }
        }
        Ok(())
    }

    fn validate_plankton(&self) -> Result<(), ConfigError> {
        for (i, pl) in self.plankton.iter().enumerate() {
            let key = |field: &str| format!("plankton[{i}].{field}");
            check_non_negative(pl.size_min, || key("size_min"))?;
            check_positive(pl.size_max, || key("size_max"))?;
            if pl.size_min > pl.size_max {
                return Err(ConfigError::InvertedBounds { key: key("size") });
            }
            check_non_negative(pl.trophic_level, || key("trophic_level"))?;
            check_unit(pl.accessibility_coefficient, || {
                key("accessibility_coefficient")
            })?;
        }
        Ok(())
    }

    fn validate_accessibility(&self) -> Result<(), ConfigError> {
        let n_rows = self.n_prey_groups();
        let n_cols = self.n_predator_groups();
        if self.accessibility.len() != n_rows {
            return Err(ConfigError::WrongLength {
                key: "accessibility".to_string(),
                expected: n_rows,
                actual: self.accessibility.len(),
            });
        }
        for (r, row) in self.accessibility.iter().enumerate() {
            if row.len() != n_cols {
                return Err(ConfigError::WrongLength {
                    key: format!("accessibility[{r}]"),
                    expected: n_cols,
                    actual: row.len(),
                });
            }
            for (c, value) in row.iter().enumerate() {
                check_unit(*value, || format!("accessibility[{r}][{c}]"))?;
            }
        }
        Ok(())
    }

    fn validate_mpas(&self) -> Result<(), ConfigError> {
        let ncell = self.grid.nx * self.grid.ny;
        for (m, mpa) in self.mpas.iter().enumerate() {
            if mpa.start_year > mpa.end_year {
                return Err(ConfigError::InvertedBounds {
                    key: format!("mpas[{m}].years"),
                });
            }
            for (idx, &cell) in mpa.cells.iter().enumerate() {
                if cell >= ncell {
                    return Err(ConfigError::CellOutOfGrid {
                        key: format!("mpas[{m}].cells[{idx}]"),
                        cell,
                        ncell,
                    });
                }
            }
        }
        Ok(())
    }
}

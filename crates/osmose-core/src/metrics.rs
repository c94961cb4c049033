use crate::mortality::{DeathCounts, MortalityCause};
use crate::school::School;
use crate::species::SpeciesTable;
use serde::{Deserialize, Serialize};

/// Read-only copy of a school's state once a step is finalised.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SchoolSnapshot {
    pub id: u64,
    pub species: usize,
    pub age_dt: usize,
    pub cell: Option<usize>,
    pub length: f64,
    pub weight: f64,
    pub abundance: f64,
    pub biomass: f64,
    pub trophic_level: f64,
    pub pred_success_rate: f64,
    pub alive: bool,
    pub deaths: DeathCounts,
}

impl From<&School> for SchoolSnapshot {
    fn from(school: &School) -> Self {
        Self {
            id: school.id,
            species: school.species,
            age_dt: school.age_dt,
            cell: school.cell,
            length: school.length,
            weight: school.weight,
            abundance: school.abundance,
            biomass: school.biomass(),
            trophic_level: school.trophic_level,
            pred_success_rate: school.pred_success_rate,
            alive: school.alive,
            deaths: *school.step_deaths(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct SpeciesIndicators {
    pub name: String,
    pub n_schools: usize,
    pub abundance: f64,
    /// Tons.
    pub biomass: f64,
    /// Tons caught during the step.
    pub yield_biomass: f64,
    pub yield_abundance: f64,
    pub deaths: DeathCounts,
    /// Biomass-weighted.
    pub mean_trophic_level: f64,
    /// Abundance-weighted (cm).
    pub mean_length: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct StepSummary {
    pub step: usize,
    pub year: usize,
    pub step_in_year: usize,
    pub alive_schools: usize,
    pub removed_schools: usize,
    pub new_schools: usize,
    pub species: Vec<SpeciesIndicators>,
    /// Biomass eaten per predator species (rows) and prey diet column;
    /// empty unless diet recording is enabled.
    pub diet: Vec<Vec<f64>>,
}

impl StepSummary {
    pub fn from_schools(
        step: usize,
        table: &SpeciesTable,
        schools: &[School],
        record_diet: bool,
    ) -> Self {
        let mut species: Vec<SpeciesIndicators> = table
            .species
            .iter()
            .map(|p| SpeciesIndicators {
                name: p.name.clone(),
                ..SpeciesIndicators::default()
            })
            .collect();
        let mut tl_weight = vec![0.0; species.len()];
        let mut diet = if record_diet {
            vec![vec![0.0; table.n_diet_groups()]; species.len()]
        } else {
            Vec::new()
        };

        for school in schools {
            let Some(ind) = species.get_mut(school.species) else {
                continue;
            };
            let deaths = school.step_deaths();
            ind.deaths.merge(deaths);
            let caught = deaths.get(MortalityCause::Fishing);
            ind.yield_abundance += caught;
            ind.yield_biomass += school.step_dead_biomass().get(MortalityCause::Fishing);
            if let Some(row) = diet.get_mut(school.species) {
                for (acc, eaten) in row.iter_mut().zip(school.diet()) {
                    *acc += eaten;
                }
            }
            if !school.alive {
                continue;
            }
            let biomass = school.biomass();
            ind.n_schools += 1;
            ind.abundance += school.abundance;
            ind.biomass += biomass;
            ind.mean_length += school.length * school.abundance;
            ind.mean_trophic_level += school.trophic_level * biomass;
            tl_weight[school.species] += biomass;
        }
        for (ind, weight) in species.iter_mut().zip(tl_weight) {
            ind.mean_length = if ind.abundance > 0.0 {
                ind.mean_length / ind.abundance
            } else {
                0.0
            };
            ind.mean_trophic_level = if weight > 0.0 {
                ind.mean_trophic_level / weight
            } else {
                0.0
            };
        }

        Self {
            step,
            year: step / table.steps_per_year,
            step_in_year: step % table.steps_per_year,
            alive_schools: species.iter().map(|s| s.n_schools).sum(),
            removed_schools: 0,
            new_schools: 0,
            species,
            diet,
        }
    }

    pub fn total_biomass(&self) -> f64 {
        self.species.iter().map(|s| s.biomass).sum()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct RunSummary {
    pub seed: u64,
    pub n_steps: usize,
    pub species: Vec<String>,
    pub final_biomass: Vec<f64>,
    pub mean_biomass: Vec<f64>,
    pub total_yield: Vec<f64>,
    pub final_alive_schools: usize,
    pub steps: Vec<StepSummary>,
}

impl RunSummary {
    pub fn from_steps(seed: u64, species: Vec<String>, steps: Vec<StepSummary>) -> Self {
        let n_species = species.len();
        let mut mean_biomass = vec![0.0; n_species];
        let mut total_yield = vec![0.0; n_species];
        for summary in &steps {
            for (idx, ind) in summary.species.iter().enumerate().take(n_species) {
                mean_biomass[idx] += ind.biomass;
                total_yield[idx] += ind.yield_biomass;
            }
        }
        if !steps.is_empty() {
            for value in &mut mean_biomass {
                *value /= steps.len() as f64;
            }
        }
        let last = steps.last();
        Self {
            seed,
            n_steps: steps.len(),
            final_biomass: last
                .map(|s| s.species.iter().map(|i| i.biomass).collect())
                .unwrap_or_else(|| vec![0.0; n_species]),
            final_alive_schools: last.map(|s| s.alive_schools).unwrap_or(0),
            species,
            mean_biomass,
            total_yield,
            steps,
        }
    }
}

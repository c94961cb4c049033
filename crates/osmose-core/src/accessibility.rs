use crate::aggregation::{Aggregation, Group};
use crate::config::SimConfig;
use crate::species::SpeciesTable;

/// Static accessibility table plus the size rules that decide which prey a
/// predator can reach.
#[derive(Clone, Debug)]
pub struct FoodWeb {
    /// Rows are prey group-stages, columns predator group-stages.
    matrix: Vec<Vec<f64>>,
    species_offsets: Vec<usize>,
    background_offset: usize,
    plankton_offset: usize,
}

impl FoodWeb {
    /// Build from a validated configuration.
    pub fn from_config(config: &SimConfig, table: &SpeciesTable) -> Self {
        let background_offset = table.background_offset();
        Self {
            matrix: config.accessibility.clone(),
            species_offsets: table
                .species
                .iter()
                .map(|s| s.accessibility_offset)
                .collect(),
            background_offset,
            plankton_offset: background_offset + table.n_background(),
        }
    }

    fn index(&self, group: Group, stage: usize) -> usize {
        match group {
            Group::Focal(species) => self.species_offsets[species] + stage,
            Group::Background(idx) => self.background_offset + idx,
            Group::Plankton(idx) => self.plankton_offset + idx,
        }
    }

    /// Table coefficient of a prey group-stage for a predator group-stage.
    /// Plankton never predate, so a plankton predator gets zero.
    pub fn coefficient(
        &self,
        predator: Group,
        predator_stage: usize,
        prey: Group,
        prey_stage: usize,
    ) -> f64 {
        if matches!(predator, Group::Plankton(_)) {
            return 0.0;
        }
        let row = self.index(prey, prey_stage);
        let col = self.index(predator, predator_stage);
        self.matrix
            .get(row)
            .and_then(|r| r.get(col))
            .copied()
            .unwrap_or(0.0)
    }

    /// Prey length window `[min, max)` of a predator.
    pub fn size_window(&self, table: &SpeciesTable, predator: &dyn Aggregation) -> (f64, f64) {
        let length = predator.length();
        let (ratio_min, ratio_max) = match predator.group() {
            Group::Focal(species) => {
                let params = &table.species[species];
                let stage = predator
                    .feeding_stage()
                    .min(params.size_ratio_min.len().saturating_sub(1));
                (params.size_ratio_min[stage], params.size_ratio_max[stage])
            }
            Group::Background(idx) => {
                let bkg = &table.background[idx];
                (bkg.size_ratio_min, bkg.size_ratio_max)
            }
            Group::Plankton(_) => return (0.0, 0.0),
        };
        (length / ratio_max, length / ratio_min)
    }

    /// Fill `out` with the accessibility of every pool member to `predator`,
    /// whose own pool position is `self_index`.
    pub fn accessibility_vector(
        &self,
        table: &SpeciesTable,
        predator: &dyn Aggregation,
        self_index: usize,
        pool: &[&dyn Aggregation],
        out: &mut Vec<f64>,
    ) {
        out.clear();
        out.resize(pool.len(), 0.0);
        if predator.is_egg() {
            return;
        }
        let (window_min, window_max) = self.size_window(table, predator);
        let predator_group = predator.group();
        let predator_stage = predator.accessibility_stage();
        for (idx, prey) in pool.iter().enumerate() {
            if idx == self_index {
                continue;
            }
            let prey_group = prey.group();
            let coeff = self.coefficient(
                predator_group,
                predator_stage,
                prey_group,
                prey.accessibility_stage(),
            );
            if coeff <= 0.0 {
                continue;
            }
            out[idx] = match prey_group {
                Group::Plankton(group) => {
                    let cfg = &table.plankton[group];
                    coeff * percent_overlap(window_min, window_max, cfg.size_min, cfg.size_max)
                }
                _ => {
                    let length = prey.length();
                    if length >= window_min && length < window_max {
                        coeff
                    } else {
                        0.0
                    }
                }
            };
        }
    }
}

/// Fraction of a plankton group's size range `[group_min, group_max]` that
/// falls inside a predator's prey window `[window_min, window_max)`.
pub fn percent_overlap(window_min: f64, window_max: f64, group_min: f64, group_max: f64) -> f64 {
    if group_max <= group_min {
        return if group_min >= window_min && group_min < window_max {
            1.0
        } else {
            0.0
        };
    }
    let overlap = window_max.min(group_max) - window_min.max(group_min);
    if overlap <= 0.0 {
        0.0
    } else {
        (overlap / (group_max - group_min)).min(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::Swarm;
    use crate::school::School;

    fn setup() -> (SimConfig, SpeciesTable, FoodWeb) {
        let config = SimConfig::default();
        let table = SpeciesTable::from_config(&config);
        let web = FoodWeb::from_config(&config, &table);
        (config, table, web)
    }

    #[test]
    fn overlap_fraction_cases() {
        assert_eq!(percent_overlap(0.0, 1.0, 2.0, 3.0), 0.0);
        assert_eq!(percent_overlap(0.0, 10.0, 2.0, 3.0), 1.0);
        assert!((percent_overlap(0.0, 2.5, 2.0, 3.0) - 0.5).abs() < 1e-12);
        assert!((percent_overlap(2.25, 2.5, 2.0, 3.0) - 0.25).abs() < 1e-12);
        assert_eq!(percent_overlap(0.0, 1.0, 0.5, 0.5), 1.0);
        assert_eq!(percent_overlap(0.0, 1.0, 1.0, 1.0), 0.0);
    }

    #[test]
    fn coefficient_reads_prey_rows_and_predator_columns() {
        let (config, _, web) = setup();
        // Hake adults (column 5) eating anchovy juveniles (row 0).
        assert_eq!(
            web.coefficient(Group::Focal(2), 1, Group::Focal(0), 0),
            config.accessibility[0][5]
        );
        // Mesopelagic (column 6) eating large zooplankton (row 8).
        assert_eq!(
            web.coefficient(Group::Background(0), 0, Group::Plankton(1), 0),
            config.accessibility[8][6]
        );
        assert_eq!(web.coefficient(Group::Plankton(0), 0, Group::Focal(0), 0), 0.0);
    }

    #[test]
    fn size_window_filters_school_prey() {
        let (_, table, web) = setup();
        let hake = School::new(1, &table.species[2], 48, 40.0, 100.0, Some(0));
        let (min, max) = web.size_window(&table, &hake);
        assert!((min - 40.0 / 30.0).abs() < 1e-12);
        assert!((max - 16.0).abs() < 1e-12);

        let small = School::new(2, &table.species[0], 4, 1.0, 100.0, Some(0));
        let fit = School::new(3, &table.species[0], 4, 8.0, 100.0, Some(0));
        let big = School::new(4, &table.species[0], 40, 16.0, 100.0, Some(0));
        let pool: Vec<&dyn Aggregation> = vec![&hake, &small, &fit, &big];
        let mut out = Vec::new();
        web.accessibility_vector(&table, &hake, 0, &pool, &mut out);
        assert_eq!(out[0], 0.0);
        assert_eq!(out[1], 0.0);
        assert_eq!(out[2], 0.8);
        assert_eq!(out[3], 0.0);
    }

    #[test]
    fn plankton_accessibility_scales_with_overlap() {
        let (config, table, web) = setup();
        // Anchovy juvenile of 7 cm: window [0.07, 2.0).
        let anchovy = School::new(1, &table.species[0], 6, 7.0, 100.0, Some(0));
        let small = Swarm::new(0, &config.plankton[0], 10.0);
        let large = Swarm::new(1, &config.plankton[1], 10.0);
        let pool: Vec<&dyn Aggregation> = vec![&anchovy, &small, &large];
        let mut out = Vec::new();
        web.accessibility_vector(&table, &anchovy, 0, &pool, &mut out);
        let expected_small = 0.8 * (0.2 - 0.07) / (0.2 - 0.02);
        assert!((out[1] - expected_small).abs() < 1e-12);
        assert!((out[2] - 0.8).abs() < 1e-12);
    }

    #[test]
    fn eggs_have_no_accessible_prey() {
        let (config, table, web) = setup();
        let egg = School::egg(1, &table.species[2], 1e6, 0);
        let swarm = Swarm::new(0, &config.plankton[0], 10.0);
        let pool: Vec<&dyn Aggregation> = vec![&egg, &swarm];
        let mut out = vec![1.0; 7];
        web.accessibility_vector(&table, &egg, 0, &pool, &mut out);
        assert_eq!(out, vec![0.0, 0.0]);
    }
}

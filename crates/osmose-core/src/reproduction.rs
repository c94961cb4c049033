use crate::constants::{EXTINCTION_ABUNDANCE, GRAMS_PER_TON};
use crate::school::School;
use crate::species::SpeciesTable;
use rand::Rng;
use rand_chacha::ChaCha12Rng;

/// Once-per-step creation of new schools. Returned schools get their ids from
/// the population when they are added.
pub trait ReproductionProcess: Send + Sync {
    fn reproduce(
        &self,
        step: usize,
        table: &SpeciesTable,
        schools: &[School],
        ocean_cells: &[usize],
        rng: &mut ChaCha12Rng,
    ) -> Vec<School>;
}

/// Egg production proportional to the spawning stock biomass.
#[derive(Clone, Copy, Debug, Default)]
pub struct SsbReproduction;

impl SsbReproduction {
    /// Biomass (tons) of live schools at or above maturity size.
    pub fn spawning_stock_biomass(table: &SpeciesTable, schools: &[School], species: usize) -> f64 {
        let maturity = table.species[species].maturity_size;
        schools
            .iter()
            .filter(|s| s.alive && s.species == species && s.length >= maturity)
            .map(School::biomass)
            .sum()
    }

    pub fn egg_count(table: &SpeciesTable, schools: &[School], species: usize, step: usize) -> f64 {
        let params = &table.species[species];
        let ssb_grams = Self::spawning_stock_biomass(table, schools, species) * GRAMS_PER_TON;
        params.sex_ratio * params.relative_fecundity * ssb_grams * params.spawning_fraction(step)
    }
}

impl ReproductionProcess for SsbReproduction {
    fn reproduce(
        &self,
        step: usize,
        table: &SpeciesTable,
        schools: &[School],
        ocean_cells: &[usize],
        rng: &mut ChaCha12Rng,
    ) -> Vec<School> {
        let mut eggs = Vec::new();
        if ocean_cells.is_empty() {
            return eggs;
        }
        for params in &table.species {
            let n_eggs = Self::egg_count(table, schools, params.index, step);
            let per_school = n_eggs / params.schools_per_spawn as f64;
            if per_school < EXTINCTION_ABUNDANCE {
                continue;
            }
            for _ in 0..params.schools_per_spawn {
                let cell = ocean_cells[rng.random_range(0..ocean_cells.len())];
                eggs.push(School::egg(0, params, per_school, cell));
            }
        }
        eggs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::rng::create_rng;

    fn table() -> SpeciesTable {
        SpeciesTable::from_config(&SimConfig::default())
    }

    #[test]
    fn only_mature_schools_spawn() {
        let table = table();
        let p = &table.species[0];
        let immature = School::new(0, p, 10, p.maturity_size - 1.0, 1e6, Some(4));
        let mature = School::new(1, p, 40, p.maturity_size + 1.0, 1e4, Some(4));
        let schools = vec![immature, mature.clone()];
        let ssb = SsbReproduction::spawning_stock_biomass(&table, &schools, 0);
        assert!((ssb - mature.biomass()).abs() < 1e-12);
        let expected = p.sex_ratio * p.relative_fecundity * ssb * GRAMS_PER_TON / 24.0;
        assert!((SsbReproduction::egg_count(&table, &schools, 0, 5) - expected).abs() < 1e-6);
    }

    #[test]
    fn eggs_are_split_and_placed_in_ocean_cells() {
        let table = table();
        let p = &table.species[1];
        let schools = vec![School::new(0, p, 60, 20.0, 1e5, Some(9))];
        let ocean = vec![9, 10, 11];
        let mut rng = create_rng(1);
        let eggs = SsbReproduction.reproduce(0, &table, &schools, &ocean, &mut rng);
        assert_eq!(eggs.len(), p.schools_per_spawn);
        let total: f64 = eggs.iter().map(|e| e.abundance).sum();
        assert!((total - SsbReproduction::egg_count(&table, &schools, 1, 0)).abs() < 1e-6);
        for egg in &eggs {
            assert!(egg.is_egg());
            assert_eq!(egg.species, 1);
            assert!(ocean.contains(&egg.cell.unwrap()));
        }
    }

    #[test]
    fn no_stock_no_eggs() {
        let table = table();
        let mut rng = create_rng(1);
        assert!(SsbReproduction
            .reproduce(0, &table, &[], &[1, 2], &mut rng)
            .is_empty());
    }
}

use super::*;
use crate::config::{FishingConfig, MortalityAlgorithm, MpaConfig};
use crate::forcing::UniformForcing;
use crate::mortality::MortalityCause;
use crate::species::SpeciesParams;

const ANCHOVY: usize = 0;
const HAKE: usize = 2;

struct NoReproduction;

impl ReproductionProcess for NoReproduction {
    fn reproduce(
        &self,
        _step: usize,
        _table: &SpeciesTable,
        _schools: &[School],
        _ocean_cells: &[usize],
        _rng: &mut ChaCha12Rng,
    ) -> Vec<School> {
        Vec::new()
    }
}

struct FixedGrowth(f64);

impl GrowthProcess for FixedGrowth {
    fn grow(&self, school: &mut School, params: &SpeciesParams) {
        school.length += self.0;
        school.weight = params.weight_at(school.length);
    }
}

/// Growth that leaves schools without a usable weight.
struct NanWeightGrowth;

impl GrowthProcess for NanWeightGrowth {
    fn grow(&self, school: &mut School, _params: &SpeciesParams) {
        school.weight = f64::NAN;
    }
}

fn make_config(n_years: usize, steps_per_year: usize) -> SimConfig {
    SimConfig {
        n_years,
        steps_per_year,
        ..SimConfig::default()
    }
}

fn make_forcing() -> Box<dyn Forcing> {
    Box::new(UniformForcing::new(vec![40.0, 20.0], vec![5.0]))
}

fn make_simulation(config: SimConfig) -> Simulation {
    let mut sim = Simulation::new(config, make_forcing()).unwrap();
    sim.set_reproduction_process(Box::new(NoReproduction));
    sim
}

fn snapshot(sim: &Simulation, id: u64) -> &SchoolSnapshot {
    sim.snapshots().iter().find(|s| s.id == id).unwrap()
}

#[test]
fn new_returns_err_on_invalid_config() {
    let mut config = make_config(1, 24);
    config.species.clear();
    assert!(matches!(
        Simulation::new(config, make_forcing()),
        Err(SimulationError::Config(ConfigError::NoSpecies))
    ));
}

#[test]
fn seed_school_rejects_unknown_species_and_land() {
    let mut sim = make_simulation(make_config(1, 24));
    assert!(matches!(
        sim.seed_school(9, 24, 10.0, 100.0, Some(10)),
        Err(SimulationError::UnknownSpecies { species: 9 })
    ));
    assert!(matches!(
        sim.seed_school(ANCHOVY, 24, 10.0, 100.0, Some(0)),
        Err(SimulationError::InvalidCell { cell: 0 })
    ));
    assert!(matches!(
        sim.seed_school(ANCHOVY, 24, 10.0, 100.0, Some(64)),
        Err(SimulationError::InvalidCell { cell: 64 })
    ));
    let id = sim.seed_school(ANCHOVY, 24, 10.0, 100.0, None).unwrap();
    assert_eq!(sim.population().get(id).unwrap().cell, None);
}

#[test]
fn seed_school_rejects_non_physical_sizes() {
    let mut sim = make_simulation(make_config(1, 24));
    assert!(matches!(
        sim.seed_school(ANCHOVY, 24, f64::NAN, 100.0, Some(10)),
        Err(SimulationError::InvalidSchool { field: "length", .. })
    ));
    assert!(matches!(
        sim.seed_school(ANCHOVY, 24, -3.0, 100.0, Some(10)),
        Err(SimulationError::InvalidSchool { field: "length", .. })
    ));
    assert!(matches!(
        sim.seed_school(ANCHOVY, 24, 10.0, f64::INFINITY, Some(10)),
        Err(SimulationError::InvalidSchool { field: "abundance", .. })
    ));
    assert!(matches!(
        sim.seed_school(ANCHOVY, 24, 10.0, -1.0, Some(10)),
        Err(SimulationError::InvalidSchool { field: "abundance", .. })
    ));
    assert!(sim.population().is_empty());
    assert!(sim.seed_school(ANCHOVY, 24, 10.0, 0.0, Some(10)).is_ok());
}

#[test]
fn failed_mortality_halts_the_run() {
    let mut sim = make_simulation(make_config(1, 24));
    sim.set_growth_process(Box::new(NanWeightGrowth));
    let id = sim.seed_school(ANCHOVY, 24, 12.0, 1.0e5, Some(10)).unwrap();
    sim.step().unwrap();
    assert!(sim.population().get(id).unwrap().weight.is_nan());

    assert!(matches!(
        sim.step(),
        Err(SimulationError::NonFiniteState { cell: 10, .. })
    ));
    assert_eq!(sim.halted_at(), Some(1));
    assert_eq!(sim.current_step(), 1);
    assert!(sim.population().get(id).is_some());
    assert!(matches!(sim.step(), Err(SimulationError::Halted { step: 1 })));
    assert!(matches!(sim.run(), Err(SimulationError::Halted { step: 1 })));
}

#[test]
fn step_after_last_returns_finished() {
    let mut sim = make_simulation(make_config(1, 2));
    sim.seed_school(ANCHOVY, 24, 12.0, 1.0e5, Some(10)).unwrap();
    let run = sim.run().unwrap();
    assert_eq!(run.n_steps, 2);
    assert!(sim.is_finished());
    assert!(matches!(
        sim.step(),
        Err(SimulationError::Finished { n_steps: 2 })
    ));
}

#[test]
fn predator_eats_prey_sharing_its_cell() {
    let mut sim = make_simulation(make_config(1, 24));
    let hake = sim.seed_school(HAKE, 48, 40.0, 1.0e4, Some(10)).unwrap();
    let anchovy = sim.seed_school(ANCHOVY, 6, 5.0, 1.0e6, Some(10)).unwrap();
    sim.step().unwrap();

    let prey = snapshot(&sim, anchovy);
    assert!(prey.deaths.get(MortalityCause::Predation) > 0.0);
    let predator = snapshot(&sim, hake);
    assert!(predator.pred_success_rate > 0.0);
    assert!(predator.pred_success_rate <= 1.0 + 1e-12);
    assert_eq!(predator.deaths.get(MortalityCause::Predation), 0.0);
}

#[test]
fn school_below_one_fish_is_reported_then_removed() {
    let mut config = make_config(1, 24);
    config.species[ANCHOVY].additional_mortality_rate = 1.0e4;
    let mut sim = make_simulation(config);
    let doomed = sim.seed_school(ANCHOVY, 24, 12.0, 1000.0, Some(10)).unwrap();
    let survivor = sim.seed_school(HAKE, 48, 40.0, 1.0e4, Some(20)).unwrap();

    let summary = sim.step().unwrap();
    assert_eq!(summary.removed_schools, 1);
    let gone = snapshot(&sim, doomed);
    assert!(!gone.alive);
    assert_eq!(gone.abundance, 0.0);
    assert!(gone.deaths.total() <= 1000.0 + 1e-9);
    assert!(gone.deaths.get(MortalityCause::Additional) > 0.0);
    assert!(sim.population().get(doomed).is_none());
    assert!(sim.population().get(survivor).is_some());

    sim.step().unwrap();
    assert!(sim.snapshots().iter().all(|s| s.id != doomed));
}

#[test]
fn deaths_never_exceed_abundance_at_step_start() {
    let mut sim = make_simulation(make_config(1, 6));
    for cell in [10, 11] {
        sim.seed_school(ANCHOVY, 6, 5.0, 5.0e5, Some(cell)).unwrap();
        sim.seed_school(ANCHOVY, 30, 13.0, 2.0e5, Some(cell)).unwrap();
        sim.seed_school(1, 30, 16.0, 1.0e5, Some(cell)).unwrap();
        sim.seed_school(HAKE, 48, 40.0, 5.0e3, Some(cell)).unwrap();
    }
    while !sim.is_finished() {
        let before: Vec<(u64, f64)> = sim.population().iter().map(|s| (s.id, s.abundance)).collect();
        sim.step().unwrap();
        for (id, abundance) in before {
            let after = snapshot(&sim, id);
            assert!(after.abundance >= 0.0);
            assert!(after.deaths.is_finite());
            assert!(after.deaths.total() <= abundance + 1e-6);
            if after.alive {
                let expected = abundance - after.deaths.total();
                assert!((after.abundance - expected).abs() <= 1e-6 * abundance.max(1.0));
            }
        }
    }
}

#[test]
fn same_seed_gives_identical_runs() {
    let build = || {
        let mut sim = Simulation::new(make_config(1, 4), make_forcing()).unwrap();
        for cell in [10, 11, 27] {
            sim.seed_school(ANCHOVY, 6, 5.0, 5.0e5, Some(cell)).unwrap();
            sim.seed_school(ANCHOVY, 30, 13.0, 2.0e5, Some(cell)).unwrap();
            sim.seed_school(HAKE, 48, 40.0, 5.0e3, Some(cell)).unwrap();
        }
        sim
    };
    let mut a = build();
    let mut b = build();
    let run_a = a.run().unwrap();
    let run_b = b.run().unwrap();
    assert_eq!(run_a, run_b);
    assert_eq!(a.snapshots(), b.snapshots());
}

#[test]
fn protected_area_shields_schools_from_fishing() {
    let mut config = make_config(1, 24);
    config.mpas = vec![MpaConfig {
        cells: vec![10],
        start_year: 0,
        end_year: 0,
    }];
    let mut sim = make_simulation(config);
    let protected = sim.seed_school(ANCHOVY, 24, 15.0, 1.0e6, Some(10)).unwrap();
    let exposed = sim.seed_school(ANCHOVY, 24, 15.0, 1.0e6, Some(20)).unwrap();
    sim.step().unwrap();
    assert_eq!(
        snapshot(&sim, protected).deaths.get(MortalityCause::Fishing),
        0.0
    );
    assert!(snapshot(&sim, exposed).deaths.get(MortalityCause::Fishing) > 0.0);
}

#[test]
fn catches_are_taken_in_full_when_stock_allows() {
    let mut config = make_config(1, 24);
    config.species[HAKE].fishing = FishingConfig::Catches {
        per_step: vec![2.0],
    };
    let mut sim = make_simulation(config);
    for cell in [10, 20, 30] {
        sim.seed_school(HAKE, 48, 40.0, 1.0e5, Some(cell)).unwrap();
    }
    let summary = sim.step().unwrap();
    let yield_tons = summary.species[HAKE].yield_biomass;
    assert!((yield_tons - 2.0).abs() < 1e-9, "yield {yield_tons}");
}

#[test]
fn schools_outside_the_domain_only_suffer_out_mortality() {
    let mut config = make_config(1, 24);
    config.species[ANCHOVY].out_mortality_rate = 2.0;
    let mut sim = make_simulation(config);
    let away = sim.seed_school(ANCHOVY, 24, 12.0, 1.0e5, None).unwrap();
    sim.step().unwrap();
    let deaths = snapshot(&sim, away).deaths;
    assert!(deaths.get(MortalityCause::Out) > 0.0);
    assert_eq!(deaths.total(), deaths.get(MortalityCause::Out));
}

#[test]
fn starvation_follows_previous_step_success() {
    let config = make_config(1, 24);
    let forcing = Box::new(UniformForcing::new(vec![0.0, 0.0], vec![0.0]));
    let mut sim = Simulation::new(config, forcing).unwrap();
    sim.set_reproduction_process(Box::new(NoReproduction));
    let id = sim.seed_school(ANCHOVY, 24, 12.0, 1.0e5, Some(10)).unwrap();

    sim.step().unwrap();
    let first = snapshot(&sim, id).clone();
    assert_eq!(first.deaths.get(MortalityCause::Starvation), 0.0);
    assert_eq!(first.pred_success_rate, 0.0);
    assert_eq!(first.length, 12.0);

    sim.step().unwrap();
    assert!(snapshot(&sim, id).deaths.get(MortalityCause::Starvation) > 0.0);
}

#[test]
fn schools_past_lifespan_are_retired() {
    let mut sim = make_simulation(make_config(1, 24));
    let lifespan = sim.species_table().species[ANCHOVY].lifespan_dt;
    let old = sim.seed_school(ANCHOVY, lifespan, 18.0, 1.0e4, Some(10)).unwrap();
    let young = sim.seed_school(ANCHOVY, 24, 12.0, 1.0e4, Some(11)).unwrap();
    let summary = sim.step().unwrap();
    assert_eq!(summary.removed_schools, 1);
    assert!(sim.population().get(old).is_none());
    assert_eq!(sim.population().get(young).unwrap().age_dt, 25);
}

#[test]
fn spawning_adds_egg_schools_for_next_step() {
    let mut sim = Simulation::new(make_config(1, 24), make_forcing()).unwrap();
    sim.seed_school(ANCHOVY, 24, 15.0, 1.0e6, Some(10)).unwrap();
    let summary = sim.step().unwrap();
    let per_spawn = sim.species_table().species[ANCHOVY].schools_per_spawn;
    assert_eq!(summary.new_schools, per_spawn);
    let eggs: Vec<&School> = sim.population().iter().filter(|s| s.is_egg()).collect();
    assert_eq!(eggs.len(), per_spawn);
    for egg in eggs {
        let cell = egg.cell.unwrap();
        assert!(!sim.grid().is_land(cell));
        assert!(egg.abundance >= 1.0);
    }

    // Eggs pay the larval rate once and are then exposed.
    sim.step().unwrap();
    assert!(sim
        .snapshots()
        .iter()
        .filter(|s| s.age_dt == 1)
        .all(|s| s.deaths.get(MortalityCause::Additional) > 0.0));
}

#[test]
fn custom_growth_process_is_used() {
    let mut sim = make_simulation(make_config(1, 24));
    sim.set_growth_process(Box::new(FixedGrowth(1.0)));
    let id = sim.seed_school(ANCHOVY, 24, 12.0, 1.0e5, Some(10)).unwrap();
    sim.step().unwrap();
    assert!((sim.population().get(id).unwrap().length - 13.0).abs() < 1e-12);
}

#[test]
fn iterative_algorithm_keeps_state_finite_and_non_negative() {
    let mut config = make_config(1, 6);
    config.algorithm = MortalityAlgorithm::Iterative;
    let mut sim = make_simulation(config);
    for cell in [10, 11] {
        sim.seed_school(ANCHOVY, 6, 5.0, 5.0e5, Some(cell)).unwrap();
        sim.seed_school(1, 30, 16.0, 1.0e5, Some(cell)).unwrap();
        sim.seed_school(HAKE, 48, 40.0, 5.0e3, Some(cell)).unwrap();
    }
    let run = sim.run().unwrap();
    assert_eq!(run.n_steps, 6);
    for school in sim.population().iter() {
        assert!(school.abundance.is_finite() && school.abundance >= 1.0);
        assert!(school.length.is_finite());
    }
    assert!(run.total_yield.iter().all(|y| y.is_finite() && *y >= 0.0));
}

#[test]
fn diet_is_recorded_when_enabled() {
    let mut config = make_config(1, 24);
    config.record_diet = true;
    let mut sim = make_simulation(config);
    sim.seed_school(HAKE, 48, 40.0, 1.0e4, Some(10)).unwrap();
    sim.seed_school(ANCHOVY, 6, 5.0, 1.0e6, Some(10)).unwrap();
    let summary = sim.step().unwrap();
    assert_eq!(summary.diet.len(), sim.species_table().n_species());
    assert!(summary.diet[HAKE].iter().sum::<f64>() > 0.0);
}

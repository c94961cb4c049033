//! Capability shared by everything that can be eaten (and, for schools and
//! background schools, that can eat) inside a cell.

use crate::config::{BackgroundSpeciesConfig, PlanktonConfig};
use crate::constants::GRAMS_PER_TON;
use crate::mortality::MortalityCause;
use crate::school::School;

/// Which table an aggregation belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Group {
    Focal(usize),
    Background(usize),
    Plankton(usize),
}

pub trait Aggregation {
    fn group(&self) -> Group;
    /// Representative length (cm). Plankton report the middle of their range.
    fn length(&self) -> f64;
    fn trophic_level(&self) -> f64;
    /// Biomass (tons) available in the current sub-step.
    fn instantaneous_biomass(&self) -> f64;
    fn biom2abd(&self, biomass: f64) -> f64;
    fn abd2biom(&self, abundance: f64) -> f64;
    /// Record losses; returns what was actually recorded after capping.
    fn increment_dead(&mut self, cause: MortalityCause, abundance: f64) -> f64;

    fn accessibility_stage(&self) -> usize {
        0
    }

    fn feeding_stage(&self) -> usize {
        0
    }

    fn diet_stage(&self) -> usize {
        0
    }

    fn is_egg(&self) -> bool {
        false
    }
}

impl Aggregation for School {
    fn group(&self) -> Group {
        Group::Focal(self.species)
    }

    fn length(&self) -> f64 {
        self.length
    }

    fn trophic_level(&self) -> f64 {
        self.trophic_level
    }

    fn instantaneous_biomass(&self) -> f64 {
        School::instantaneous_biomass(self)
    }

    fn biom2abd(&self, biomass: f64) -> f64 {
        School::biom2abd(self, biomass)
    }

    fn abd2biom(&self, abundance: f64) -> f64 {
        School::abd2biom(self, abundance)
    }

    fn increment_dead(&mut self, cause: MortalityCause, abundance: f64) -> f64 {
        School::increment_dead(self, cause, abundance)
    }

    fn accessibility_stage(&self) -> usize {
        self.accessibility_stage
    }

    fn feeding_stage(&self) -> usize {
        self.feeding_stage
    }

    fn diet_stage(&self) -> usize {
        self.diet_stage
    }

    fn is_egg(&self) -> bool {
        School::is_egg(self)
    }
}

/// Unmanaged species whose biomass in a cell comes from forcing. It preys and
/// is preyed upon, but is neither fished nor grown.
#[derive(Clone, Debug, PartialEq)]
pub struct BackgroundSchool {
    pub species: usize,
    pub length: f64,
    pub weight: f64,
    pub trophic_level: f64,
    pub biomass: f64,
    pub(crate) dead: f64,
}

impl BackgroundSchool {
    pub fn new(species: usize, config: &BackgroundSpeciesConfig, biomass: f64) -> Self {
        Self {
            species,
            length: config.length,
            weight: config.weight,
            trophic_level: config.trophic_level,
            biomass: biomass.max(0.0),
            dead: 0.0,
        }
    }

    pub fn abundance(&self) -> f64 {
        self.biomass * GRAMS_PER_TON / self.weight
    }
}

impl Aggregation for BackgroundSchool {
    fn group(&self) -> Group {
        Group::Background(self.species)
    }

    fn length(&self) -> f64 {
        self.length
    }

    fn trophic_level(&self) -> f64 {
        self.trophic_level
    }

    fn instantaneous_biomass(&self) -> f64 {
        self.abd2biom((self.abundance() - self.dead).max(0.0))
    }

    fn biom2abd(&self, biomass: f64) -> f64 {
        biomass * GRAMS_PER_TON / self.weight
    }

    fn abd2biom(&self, abundance: f64) -> f64 {
        abundance * self.weight / GRAMS_PER_TON
    }

    fn increment_dead(&mut self, _cause: MortalityCause, abundance: f64) -> f64 {
        if abundance.is_nan() || abundance <= 0.0 {
            return 0.0;
        }
        let applied = abundance.min((self.abundance() - self.dead).max(0.0));
        self.dead += applied;
        applied
    }
}

/// Plankton biomass of one group in one cell. Abundance and biomass are the
/// same quantity for swarms.
#[derive(Clone, Debug, PartialEq)]
pub struct Swarm {
    pub group: usize,
    pub size_min: f64,
    pub size_max: f64,
    pub trophic_level: f64,
    /// Accessible biomass (tons) for the current time step.
    pub biomass: f64,
    pub(crate) eaten: f64,
}

impl Swarm {
    /// `forcing_biomass` is scaled by the group's accessibility coefficient.
    pub fn new(group: usize, config: &PlanktonConfig, forcing_biomass: f64) -> Self {
        Self {
            group,
            size_min: config.size_min,
            size_max: config.size_max,
            trophic_level: config.trophic_level,
            biomass: (forcing_biomass * config.accessibility_coefficient).max(0.0),
            eaten: 0.0,
        }
    }

    pub fn eaten(&self) -> f64 {
        self.eaten
    }
}

impl Aggregation for Swarm {
    fn group(&self) -> Group {
        Group::Plankton(self.group)
    }

    fn length(&self) -> f64 {
        0.5 * (self.size_min + self.size_max)
    }

    fn trophic_level(&self) -> f64 {
        self.trophic_level
    }

    fn instantaneous_biomass(&self) -> f64 {
        (self.biomass - self.eaten).max(0.0)
    }

    fn biom2abd(&self, biomass: f64) -> f64 {
        biomass
    }

    fn abd2biom(&self, abundance: f64) -> f64 {
        abundance
    }

    fn increment_dead(&mut self, _cause: MortalityCause, biomass: f64) -> f64 {
        if biomass.is_nan() || biomass <= 0.0 {
            return 0.0;
        }
        let applied = biomass.min(self.instantaneous_biomass());
        self.eaten += applied;
        applied
    }
}

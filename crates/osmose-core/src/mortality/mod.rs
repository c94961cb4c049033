//! Mortality causes and their per-cause estimators.
//!
//! Estimators are pure: they turn school state and static parameters into a
//! rate or a number of dead fish, and the scheduler records the result.

use serde::{Deserialize, Serialize};

pub mod additional;
pub mod fishing;
pub mod foraging;
pub mod out;
pub mod starvation;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MortalityCause {
    Predation,
    Starvation,
    Additional,
    Fishing,
    Foraging,
    Out,
}

impl MortalityCause {
    pub const COUNT: usize = 6;

    pub const ALL: [MortalityCause; Self::COUNT] = [
        MortalityCause::Predation,
        MortalityCause::Starvation,
        MortalityCause::Additional,
        MortalityCause::Fishing,
        MortalityCause::Foraging,
        MortalityCause::Out,
    ];

    /// Causes that compete inside a cell. `Out` only concerns schools without a cell.
    pub const COMPETING: [MortalityCause; 5] = [
        MortalityCause::Predation,
        MortalityCause::Starvation,
        MortalityCause::Additional,
        MortalityCause::Fishing,
        MortalityCause::Foraging,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            MortalityCause::Predation => "predation",
            MortalityCause::Starvation => "starvation",
            MortalityCause::Additional => "additional",
            MortalityCause::Fishing => "fishing",
            MortalityCause::Foraging => "foraging",
            MortalityCause::Out => "out",
        }
    }
}

/// Number of dead fish per cause.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DeathCounts([f64; MortalityCause::COUNT]);

impl DeathCounts {
    pub fn get(&self, cause: MortalityCause) -> f64 {
        self.0[cause.index()]
    }

    pub fn add(&mut self, cause: MortalityCause, n: f64) {
        self.0[cause.index()] += n;
    }

    pub fn total(&self) -> f64 {
        self.0.iter().sum()
    }

    pub fn reset(&mut self) {
        self.0 = [0.0; MortalityCause::COUNT];
    }

    pub fn merge(&mut self, other: &DeathCounts) {
        for (acc, n) in self.0.iter_mut().zip(other.0.iter()) {
            *acc += n;
        }
    }

    pub fn scaled(&self, factor: f64) -> DeathCounts {
        DeathCounts(self.0.map(|n| n * factor))
    }

    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|n| n.is_finite())
    }

    pub fn iter(&self) -> impl Iterator<Item = (MortalityCause, f64)> + '_ {
        MortalityCause::ALL.iter().map(move |&c| (c, self.0[c.index()]))
    }
}

/// Fish dying out of `abundance` under an instantaneous `rate` applied over
/// one sub-step of a time step split into `subdt` sub-steps.
pub fn deaths_from_rate(abundance: f64, rate: f64, subdt: usize) -> f64 {
    if abundance <= 0.0 || rate <= 0.0 || subdt == 0 {
        return 0.0;
    }
    abundance * (1.0 - (-rate / subdt as f64).exp())
}

//! Low-trophic-level forcing consumed once per time step.

use std::f64::consts::PI;

/// Source of the biomass (tons) of plankton groups and background species per
/// cell. Read from every worker; implementations must not rely on interior
/// mutation during a step.
pub trait Forcing: Send + Sync {
    fn plankton_biomass(&self, group: usize, cell: usize, step: usize) -> f64;
    fn background_biomass(&self, species: usize, cell: usize, step: usize) -> f64;
}

/// Same biomass in every ocean cell, optionally modulated by a yearly cycle.
#[derive(Clone, Debug)]
pub struct UniformForcing {
    plankton: Vec<f64>,
    background: Vec<f64>,
    amplitude: f64,
    steps_per_year: usize,
}

impl UniformForcing {
    pub fn new(plankton: Vec<f64>, background: Vec<f64>) -> Self {
        Self {
            plankton,
            background,
            amplitude: 0.0,
            steps_per_year: 1,
        }
    }

    /// Plankton biomass follows `1 + amplitude * cos(2π t)` over the year.
    pub fn with_seasonality(mut self, amplitude: f64, steps_per_year: usize) -> Self {
        self.amplitude = amplitude.clamp(0.0, 1.0);
        self.steps_per_year = steps_per_year.max(1);
        self
    }

    fn season(&self, step: usize) -> f64 {
        let phase = (step % self.steps_per_year) as f64 / self.steps_per_year as f64;
        1.0 + self.amplitude * (2.0 * PI * phase).cos()
    }
}

impl Forcing for UniformForcing {
    fn plankton_biomass(&self, group: usize, _cell: usize, step: usize) -> f64 {
        self.plankton.get(group).copied().unwrap_or(0.0) * self.season(step)
    }

    fn background_biomass(&self, species: usize, _cell: usize, _step: usize) -> f64 {
        self.background.get(species).copied().unwrap_or(0.0)
    }
}

use super::deaths_from_rate;
use crate::constants::GRAMS_PER_TON;

/// Fishing pressure on one species during one sub-step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FishingPressure {
    /// Instantaneous fishing mortality for the whole time step.
    Rate(f64),
    /// Catches (tons) to take during this sub-step, shared among schools in
    /// proportion to their part of the species' fishable biomass.
    Catches {
        substep_catches: f64,
        fishable_biomass: f64,
    },
}

/// Per-species pressure, assessed by the driver before a sub-step is dispatched.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FishingPlan {
    pressures: Vec<FishingPressure>,
}

impl FishingPlan {
    pub fn new(pressures: Vec<FishingPressure>) -> Self {
        Self { pressures }
    }

    pub fn pressure(&self, species: usize) -> FishingPressure {
        self.pressures
            .get(species)
            .copied()
            .unwrap_or(FishingPressure::Rate(0.0))
    }
}

/// Recruited, outside any protected area, and located in the domain.
pub fn is_fishable(
    age_dt: usize,
    recruitment_age_dt: usize,
    catchable: bool,
    in_domain: bool,
) -> bool {
    age_dt >= recruitment_age_dt && catchable && in_domain
}

/// Fish caught from a school. `assessed_biomass` is the school biomass
/// (tons) at the start of the sub-step, the same quantity summed into the
/// plan's fishable biomass.
pub fn deaths(
    pressure: FishingPressure,
    abundance: f64,
    assessed_biomass: f64,
    weight: f64,
    subdt: usize,
) -> f64 {
    match pressure {
        FishingPressure::Rate(rate) => deaths_from_rate(abundance, rate, subdt),
        FishingPressure::Catches {
            substep_catches,
            fishable_biomass,
        } => {
            if fishable_biomass <= 0.0 || weight <= 0.0 || substep_catches <= 0.0 {
                return 0.0;
            }
            let tons = substep_catches * assessed_biomass / fishable_biomass;
            (tons * GRAMS_PER_TON / weight).clamp(0.0, abundance.max(0.0))
        }
    }
}

use super::deaths_from_rate;

/// Background mortality of a post-egg school over one sub-step.
pub fn deaths(abundance: f64, rate: f64, subdt: usize) -> f64 {
    deaths_from_rate(abundance, rate, subdt)
}

/// Egg mortality applied once per time step, before eggs are exposed to
/// predators.
pub fn larval_deaths(abundance: f64, rate: f64) -> f64 {
    deaths_from_rate(abundance, rate, 1)
}

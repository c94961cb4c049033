use super::deaths_from_rate;

/// Mortality of a school located outside the simulated domain.
pub fn deaths(abundance: f64, rate: f64, subdt: usize) -> f64 {
    deaths_from_rate(abundance, rate, subdt)
}

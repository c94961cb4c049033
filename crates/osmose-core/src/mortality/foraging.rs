use super::deaths_from_rate;

/// Mortality paid for foraging activity. Eggs do not forage.
pub fn deaths(abundance: f64, rate: f64, subdt: usize, is_egg: bool) -> f64 {
    if is_egg {
        return 0.0;
    }
    deaths_from_rate(abundance, rate, subdt)
}

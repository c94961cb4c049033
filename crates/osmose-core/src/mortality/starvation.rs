use super::deaths_from_rate;

/// Starvation rate for one time step. Zero at or above `critical`, rising
/// linearly to `max_rate` when predation success is zero.
pub fn rate(pred_success: f64, critical: f64, max_rate: f64) -> f64 {
    if critical <= 0.0 || pred_success >= critical {
        return 0.0;
    }
    let success = pred_success.max(0.0);
    (max_rate * (1.0 - success / critical)).max(0.0)
}

pub fn deaths(abundance: f64, rate: f64, subdt: usize) -> f64 {
    deaths_from_rate(abundance, rate, subdt)
}

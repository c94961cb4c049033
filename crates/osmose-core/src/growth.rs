use crate::school::School;
use crate::species::SpeciesParams;

/// Once-per-step update of length and weight after mortality.
pub trait GrowthProcess: Send + Sync {
    fn grow(&self, school: &mut School, params: &SpeciesParams);
}

/// Von Bertalanffy growth modulated by predation success. Below the critical
/// success a school does not grow; above it the increment rises linearly up
/// to `growth_max_delta_factor` times the mean von Bertalanffy increment.
/// Eggs grow to the mean larval length regardless of feeding.
#[derive(Clone, Copy, Debug, Default)]
pub struct VonBertalanffyGrowth;

impl VonBertalanffyGrowth {
    pub fn mean_increment(params: &SpeciesParams, school: &School) -> f64 {
        let next = params.vb_length(school.age_dt + 1);
        if school.is_egg() {
            (next - school.length).max(0.0)
        } else {
            (next - params.vb_length(school.age_dt)).max(0.0)
        }
    }
}

impl GrowthProcess for VonBertalanffyGrowth {
    fn grow(&self, school: &mut School, params: &SpeciesParams) {
        if !school.alive {
            return;
        }
        let delta = Self::mean_increment(params, school);
        let increment = if school.is_egg() {
            delta
        } else {
            let critical = params.critical_pred_success;
            let success = school.pred_success_rate;
            if success < critical {
                return;
            }
            delta * params.growth_max_delta_factor * (success - critical) / (1.0 - critical)
        };
        if increment > 0.0 {
            school.length += increment;
            school.weight = params.weight_at(school.length);
        }
    }
}

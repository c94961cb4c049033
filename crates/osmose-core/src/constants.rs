/// Grams per metric ton. School biomass is `abundance * weight / GRAMS_PER_TON`.
pub const GRAMS_PER_TON: f64 = 1_000_000.0;

/// A school whose abundance falls below this count is considered extinct.
pub const EXTINCTION_ABUNDANCE: f64 = 1.0;

/// Trophic level assigned to eggs and freshly hatched larvae when eaten.
pub const TL_EGG: f64 = 3.0;

/// Prime multipliers used to derive per-cell RNG streams from a base seed.
/// Distinct primes per coordinate keep (step, sub-step, cell) streams apart.
pub const RNG_STEP_PRIME: u64 = 0x9E37_79B9_7F4A_7C15;
pub const RNG_SUBSTEP_PRIME: u64 = 0xC2B2_AE3D_27D4_EB4F;
pub const RNG_CELL_PRIME: u64 = 0x1656_67B1_9E37_79F9;

/// Upper bound on an instantaneous rate derived from a fractional loss.
/// Reached only when a prey is entirely consumed within one sub-step.
pub const MAX_INSTANTANEOUS_RATE: f64 = 50.0;

use crate::constants::{RNG_CELL_PRIME, RNG_STEP_PRIME, RNG_SUBSTEP_PRIME};
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;

/// Create a deterministic RNG from a seed.
pub fn create_rng(seed: u64) -> ChaCha12Rng {
    ChaCha12Rng::seed_from_u64(seed)
}

/// Derive the mortality RNG of one cell for one sub-step.
///
/// Streams depend only on the simulation coordinates, never on which worker
/// processes the cell, so results do not change with the number of threads.
pub fn derive_cell_rng(base_seed: u64, step: usize, substep: usize, cell: usize) -> ChaCha12Rng {
    let mixed = base_seed
        .wrapping_add((step as u64).wrapping_add(1).wrapping_mul(RNG_STEP_PRIME))
        .wrapping_add((substep as u64).wrapping_add(1).wrapping_mul(RNG_SUBSTEP_PRIME))
        .wrapping_add((cell as u64).wrapping_add(1).wrapping_mul(RNG_CELL_PRIME));
    ChaCha12Rng::seed_from_u64(mixed)
}

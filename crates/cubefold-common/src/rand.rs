pub use rand::{Rng, SeedableRng, rngs::StdRng};

/// Seed used when reproducible data is required.
pub const DEFAULT_SEED: u64 = 42;

/// Returns a random number generator seeded with [DEFAULT_SEED].
///
/// Test data built from it is identical from one run to the next, which keeps failures
/// reproducible.
#[inline(always)]
pub fn get_seeded_rng() -> StdRng {
    StdRng::seed_from_u64(DEFAULT_SEED)
}

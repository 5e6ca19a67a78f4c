//! Deterministic Gaussian noise source for the aperiodic excitation
//!
//! Seeded PCG stream so a decode call is a pure function of its inputs:
//! two calls with identical parameters produce bit-identical waveforms.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

/// Seed applied at the start of every synthesis call.
pub const SYNTHESIS_SEED: u64 = 0x9e3779b97f4a7c15;

/// Gaussian noise generator backed by a PCG stream.
pub struct NoiseSource {
    rng: Pcg32,
}

impl NoiseSource {
    /// Create a source with the given seed
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Next approximately standard-normal sample (sum of 12 uniforms)
    pub fn next_gaussian(&mut self) -> f64 {
        let mut acc = 0.0;
        for _ in 0..12 {
            acc += self.rng.gen::<f64>();
        }
        acc - 6.0
    }
}

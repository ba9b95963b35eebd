//! Deterministic angular jitter for synthetic fixations.
//!
//! The functions here avoid `thread_rng` and do not depend on the internal
//! algorithm of `rand` RNGs. This keeps synthetic recordings stable across
//! versions and platforms.

use crate::Real;

/// Deterministic uniform angular jitter in `[-max_abs_deg, +max_abs_deg]`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AngularJitter {
    /// Base seed controlling the pseudo-random sequence.
    pub seed: u64,
    /// Maximum absolute angular offset (degrees).
    pub max_abs_deg: Real,
}

impl AngularJitter {
    /// Offset (degrees) for a given `(target_idx, sample_idx)` key.
    #[inline]
    pub fn sample(&self, target_idx: usize, sample_idx: usize) -> Real {
        let max_abs = self.max_abs_deg.abs();
        if max_abs == 0.0 {
            return 0.0;
        }
        let u = u64_to_unit_f64(splitmix64(mix_key(self.seed, target_idx, sample_idx)));
        (u - 0.5) * 2.0 * max_abs
    }

    /// Offsets for `n` consecutive samples of one target.
    pub fn offsets(&self, target_idx: usize, n: usize) -> Vec<Real> {
        (0..n).map(|i| self.sample(target_idx, i)).collect()
    }
}

#[inline]
fn mix_key(seed: u64, target_idx: usize, sample_idx: usize) -> u64 {
    seed ^ (target_idx as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
        ^ (sample_idx as u64).wrapping_mul(0xBF58_476D_1CE4_E5B9)
}

#[inline]
fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

#[inline]
fn u64_to_unit_f64(x: u64) -> Real {
    // Top 53 bits -> [0, 1).
    let mantissa = x >> 11;
    (mantissa as Real) * (1.0 / ((1u64 << 53) as Real))
}

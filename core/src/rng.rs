//! Deterministic random number generation.
//!
//! RULE: Nothing in the pipeline may call any platform RNG.
//! All randomness flows through StageRng instances derived
//! from the single master seed in PipelineConfig.
//!
//! Each stage gets its own RNG stream, seeded deterministically
//! from (master_seed XOR stage_index). This means:
//!   - Adding a new stage never changes existing stages' streams.
//!   - Each stage's stream is fully reproducible in isolation.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;

/// A named, deterministic RNG for a single pipeline stage.
pub struct StageRng {
    pub name: &'static str,
    inner: Pcg64Mcg,
}

impl StageRng {
    /// Create a stage RNG from the master seed and a stable
    /// stage index. The index must never change once assigned.
    pub fn new(master_seed: u64, stage_index: u64) -> Self {
        let derived_seed = master_seed ^ (stage_index.wrapping_mul(0x9e37_79b9_7f4a_7c15));
        Self {
            name: "unnamed",
            inner: Pcg64Mcg::seed_from_u64(derived_seed),
        }
    }

    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        use rand::RngCore;
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Roll a u64 in [0, n).
    pub fn next_u64_below(&mut self, n: u64) -> u64 {
        use rand::RngCore;
        assert!(n > 0, "n must be > 0");
        self.inner.next_u64() % n
    }

    /// Roll an integer in [lo, hi], both ends inclusive.
    pub fn int_inclusive(&mut self, lo: u32, hi: u32) -> u32 {
        assert!(lo <= hi, "empty integer range {lo}..={hi}");
        lo + self.next_u64_below(u64::from(hi - lo) + 1) as u32
    }

    /// Roll a float in [lo, hi).
    pub fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }

    /// Bernoulli trial: returns true with probability p.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Normal sample via the Box-Muller transform.
    /// Consumes exactly two uniforms per call so the stream stays aligned.
    pub fn gaussian(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-300);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos();
        mean + std_dev * z
    }

    /// Poisson sample by multiplying uniforms (Knuth).
    /// Fine for the small means the generator uses.
    pub fn poisson(&mut self, lambda: f64) -> u32 {
        let limit = (-lambda).exp();
        let mut k = 0u32;
        let mut p = self.next_f64();
        while p > limit {
            k += 1;
            p *= self.next_f64();
        }
        k
    }

    /// Pick an index with probability proportional to `weights`.
    /// Falls back to the last index if rounding leaves a gap.
    pub fn weighted_index(&mut self, weights: &[f64]) -> usize {
        assert!(!weights.is_empty(), "weights must not be empty");
        let total: f64 = weights.iter().sum();
        let roll = self.next_f64() * total;
        let mut cumulative = 0.0;
        for (i, w) in weights.iter().enumerate() {
            cumulative += w;
            if roll < cumulative {
                return i;
            }
        }
        weights.len() - 1
    }

    /// Shuffle a slice in place.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.inner);
    }
}

/// All stage RNGs for a single run, indexed by stable slot.
pub struct RngBank {
    master_seed: u64,
}

impl RngBank {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn for_stage(&self, slot: StageSlot) -> StageRng {
        StageRng::new(self.master_seed, slot as u64).with_name(slot.name())
    }
}

/// Stable stage slot assignments.
/// NEVER reorder or remove entries. Only append.
/// Reordering changes every stage's seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum StageSlot {
    Generator = 0,
    Split = 1,
}

impl StageSlot {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Generator => "generator",
            Self::Split => "split",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_stream() {
        let mut a = StageRng::new(42, 0);
        let mut b = StageRng::new(42, 0);
        for _ in 0..100 {
            assert_eq!(a.next_f64().to_bits(), b.next_f64().to_bits());
        }
    }

    #[test]
    fn slots_are_independent_streams() {
        let bank = RngBank::new(42);
        let mut generator = bank.for_stage(StageSlot::Generator);
        let mut split = bank.for_stage(StageSlot::Split);
        let a: Vec<u64> = (0..8).map(|_| generator.next_u64_below(1_000_000)).collect();
        let b: Vec<u64> = (0..8).map(|_| split.next_u64_below(1_000_000)).collect();
        assert_ne!(a, b);
        assert_eq!(generator.name, "generator");
    }

    #[test]
    fn int_inclusive_hits_both_ends() {
        let mut rng = StageRng::new(7, 0);
        let draws: Vec<u32> = (0..2_000).map(|_| rng.int_inclusive(1, 5)).collect();
        assert!(draws.iter().all(|&d| (1..=5).contains(&d)));
        assert!(draws.contains(&1));
        assert!(draws.contains(&5));
    }

    #[test]
    fn poisson_mean_is_close_to_lambda() {
        let mut rng = StageRng::new(11, 0);
        let n = 20_000;
        let total: u64 = (0..n).map(|_| u64::from(rng.poisson(2.0))).sum();
        let mean = total as f64 / n as f64;
        assert!((mean - 2.0).abs() < 0.05, "poisson mean {mean}");
    }

    #[test]
    fn gaussian_moments() {
        let mut rng = StageRng::new(3, 0);
        let n = 20_000;
        let draws: Vec<f64> = (0..n).map(|_| rng.gaussian(0.0, 0.05)).collect();
        let mean = draws.iter().sum::<f64>() / n as f64;
        let var = draws.iter().map(|d| (d - mean).powi(2)).sum::<f64>() / n as f64;
        assert!(mean.abs() < 0.002, "mean {mean}");
        assert!((var.sqrt() - 0.05).abs() < 0.002, "std {}", var.sqrt());
    }
}

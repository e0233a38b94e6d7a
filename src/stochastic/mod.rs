//! # Stochastic Module
//!
//! Random number sources for Monte Carlo transport.
//!
//! ## Sampling Formulas
//!
//! ### Free flight
//! ```text
//! d = -ln(ξ) / Σ        ξ ~ U[0, 1)
//! ```
//!
//! ### Isotropic direction
//! ```text
//! μ = 2ξ₁ - 1,   φ = 2πξ₂
//! Ω = (√(1-μ²) cos φ, √(1-μ²) sin φ, μ)
//! ```
//!
//! Transport code draws through the [`UniformSource`] trait, so any
//! `rand::RngCore` works as well as the built-in [`RandomGenerator`].
//!
//! ## References
//!
//! [1] Blackman & Vigna, "Scrambled linear pseudorandom number generators", 2021
//! [2] Lux & Koblinger, "Monte Carlo Particle Transport Methods"

use std::f64::consts::PI;

use rand::RngCore;

use crate::types::Vec3;

/// Pseudo-random number generator (xoshiro256**)
///
/// Fast, high-quality PRNG suitable for Monte Carlo simulations.
/// Period: 2^256 - 1
#[derive(Debug, Clone)]
pub struct RandomGenerator {
    state: [u64; 4],
}

impl RandomGenerator {
    /// Create new RNG with seed
    pub fn new(seed: u64) -> Self {
        // Initialize state using SplitMix64
        let mut s = seed;
        let mut state = [0u64; 4];
        for slot in state.iter_mut() {
            s = s.wrapping_add(0x9e3779b97f4a7c15);
            let mut z = s;
            z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
            z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
            *slot = z ^ (z >> 31);
        }
        Self { state }
    }

    #[inline]
    fn step(&mut self) -> u64 {
        let result = self.state[1].wrapping_mul(5).rotate_left(7).wrapping_mul(9);
        let t = self.state[1] << 17;

        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);

        result
    }
}

impl Default for RandomGenerator {
    fn default() -> Self {
        Self::new(42) // Reproducible default
    }
}

impl RngCore for RandomGenerator {
    fn next_u32(&mut self) -> u32 {
        (self.step() >> 32) as u32
    }

    fn next_u64(&mut self) -> u64 {
        self.step()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(8) {
            let bytes = self.step().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

// ============================================================================
// UNIFORM SOURCE
// ============================================================================

/// Stream of uniform variates in `[0, 1)`
pub trait UniformSource {
    fn next_uniform(&mut self) -> f64;

    /// Uniform in `[a, b)`
    fn uniform_range(&mut self, a: f64, b: f64) -> f64 {
        a + (b - a) * self.next_uniform()
    }

    /// Exponential variate with rate `lambda`
    fn exponential(&mut self, lambda: f64) -> f64 {
        -self.next_uniform().max(1e-300).ln() / lambda // Avoid log(0)
    }

    /// Unit vector uniform on the sphere
    fn isotropic_direction(&mut self) -> Vec3 {
        let mu = 2.0 * self.next_uniform() - 1.0;
        let phi = 2.0 * PI * self.next_uniform();
        let sin_theta = (1.0 - mu * mu).max(0.0).sqrt();
        Vec3::new(sin_theta * phi.cos(), sin_theta * phi.sin(), mu)
    }
}

impl<R: RngCore> UniformSource for R {
    fn next_uniform(&mut self) -> f64 {
        rand::Rng::gen::<f64>(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_rng_uniform() {
        let mut rng = RandomGenerator::new(12345);

        let samples: Vec<f64> = (0..10000).map(|_| rng.next_uniform()).collect();

        // Check range [0, 1)
        assert!(samples.iter().all(|&x| (0.0..1.0).contains(&x)));

        let mean: f64 = samples.iter().sum::<f64>() / samples.len() as f64;
        assert!((mean - 0.5).abs() < 0.02, "Mean {} should be ~0.5", mean);
    }

    #[test]
    fn test_seed_reproducible() {
        let mut a = RandomGenerator::new(7);
        let mut b = RandomGenerator::new(7);
        let mut c = RandomGenerator::new(8);
        let xs: Vec<f64> = (0..5).map(|_| a.next_uniform()).collect();
        let ys: Vec<f64> = (0..5).map(|_| b.next_uniform()).collect();
        let zs: Vec<f64> = (0..5).map(|_| c.next_uniform()).collect();
        assert_eq!(xs, ys);
        assert_ne!(xs, zs);
    }

    #[test]
    fn test_fill_bytes_partial_chunk() {
        let mut rng = RandomGenerator::new(1);
        let mut buf = [0u8; 13];
        rng.fill_bytes(&mut buf);
        assert!(buf.iter().any(|&b| b != 0));
    }

    #[test]
    fn test_exponential_mean() {
        let mut rng = RandomGenerator::new(99);
        let n = 20000;
        let mean = (0..n).map(|_| rng.exponential(2.0)).sum::<f64>() / n as f64;
        assert!((mean - 0.5).abs() < 0.02, "Mean {} should be ~0.5", mean);
    }

    #[test]
    fn test_isotropic_direction_is_unit_and_unbiased() {
        let mut rng = StdRng::seed_from_u64(3);
        let n = 20000;
        let mut sum = Vec3::zero();
        for _ in 0..n {
            let d = rng.isotropic_direction();
            assert!((d.mag() - 1.0).abs() < 1e-12);
            sum += d;
        }
        let mean = sum * (1.0 / n as f64);
        assert!(mean.mag() < 0.03, "Mean direction {} should be ~0", mean);
    }
}
